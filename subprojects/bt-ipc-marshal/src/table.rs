//! Memory-option tables and return-value copy-back.
//!
//! A synchronous command leaves its result in a small ret region. The size
//! of that result is looked up per action code in an [`ActMemOption`] table,
//! and the profile then copies it out into the caller's parameter, either
//! into the root struct or through one of its out pointers.
//!
//! Tables end with a `{ *_MAX, 0 }` sentinel entry. Lookups stop there even
//! when the slice is longer.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::arena::{Arena, Ptr, Ref, ResolveError};

/// Fixed ret size of one action code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActMemOption {
    pub act: u16,
    pub size: u32,
}

/// Fixed parameter size of one event code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvtMemOption {
    pub evt: u16,
    pub size: u32,
}

impl ActMemOption {
    pub const fn new(act: u16, size: u32) -> Self {
        Self { act, size }
    }
}

impl EvtMemOption {
    pub const fn new(evt: u16, size: u32) -> Self {
        Self { evt, size }
    }
}

/// Ret size of `act`, or 0 when the table has no entry for it.
pub fn act_ret_param_size(table: &[ActMemOption], sentinel: u16, act: u16) -> u32 {
    table
        .iter()
        .take_while(|entry| entry.act != sentinel)
        .find(|entry| entry.act == act)
        .map_or(0, |entry| entry.size)
}

/// Parameter size of `evt`, or `None` when the table has no entry for it.
///
/// The sentinel code itself answers `Some(0)`.
pub fn evt_mem_size(table: &[EvtMemOption], sentinel: u16, evt: u16) -> Option<u32> {
    if evt == sentinel {
        return Some(0);
    }
    let size = table
        .iter()
        .take_while(|entry| entry.evt != sentinel)
        .find(|entry| entry.evt == evt)
        .map(|entry| entry.size);
    if size.is_none() {
        warn!("no mem option for evt {:#x}", evt);
    }
    size
}

/// `len` bytes of the ret region starting at `offset`.
pub fn ret_at(ret: &[u8], offset: usize, len: usize) -> Result<&[u8], CopyBackError> {
    let required = offset.saturating_add(len);
    ret.get(offset..required).ok_or(CopyBackError::RetTooShort {
        required,
        available: ret.len(),
    })
}

/// Copy the leading `T` of `ret` into `target`.
pub fn copy_into<T>(dst: &mut Arena, target: Ref<T>, ret: &[u8]) -> Result<(), CopyBackError>
where
    T: FromBytes + IntoBytes + KnownLayout,
{
    let (value, _) = T::read_from_prefix(ret).map_err(|_| CopyBackError::RetTooShort {
        required: size_of::<T>(),
        available: ret.len(),
    })?;
    *dst.resolve_mut(target)? = value;
    Ok(())
}

/// Copy the leading `T` of `ret` through the out pointer `out`.
pub fn copy_through<T>(dst: &mut Arena, out: Ptr<T>, ret: &[u8]) -> Result<(), CopyBackError>
where
    T: FromBytes + IntoBytes + KnownLayout,
{
    let target = out.get().ok_or(CopyBackError::NullOutput)?;
    copy_into(dst, target, ret)
}

/// Copy `count` leading elements of `ret` through the array pointer `out`.
pub fn copy_slice_through<T>(
    dst: &mut Arena,
    out: Ptr<[T]>,
    count: usize,
    ret: &[u8],
) -> Result<(), CopyBackError>
where
    T: FromBytes + IntoBytes,
{
    let target = out.get().ok_or(CopyBackError::NullOutput)?;
    let src = ret_at(ret, 0, count.saturating_mul(size_of::<T>()))?;
    dst.resolve_slice_mut(target, count)?
        .as_mut_bytes()
        .copy_from_slice(src);
    Ok(())
}

/// Error copying a command result back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CopyBackError {
    /// The ret region is shorter than the result
    #[error("ret too short: need {required} bytes, have {available}")]
    RetTooShort {
        /// Bytes needed
        required: usize,
        /// Bytes in the ret region
        available: usize,
    },
    /// The caller passed a null out pointer
    #[error("null output pointer")]
    NullOutput,
    /// An out pointer does not resolve inside the caller's block
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}
