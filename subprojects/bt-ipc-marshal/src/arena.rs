//! Offset-based references into a flat parameter block.
//!
//! Every pointer field of a marshaled parameter is stored as a byte offset
//! from the start of the block that holds the root struct. While a caller is
//! building a parameter the block is an [`Arena`]; once pushed, it is the
//! envelope's parameter buffer. The encoding is identical in both places, so
//! rebasing on the receiving core is a bounds check rather than a rewrite.
//!
//! `u32::MAX` is the null offset.

use alloc::vec::Vec;
use core::{fmt, marker::PhantomData};

use static_assertions::const_assert_eq;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, little_endian::U32};

/// Alignment of every block written into a parameter buffer.
pub const ALIGN: usize = 4;

/// Offset value encoding a null pointer.
pub const NULL_OFFSET: u32 = u32::MAX;

/// Round `value` up to the next multiple of [`ALIGN`].
pub const fn align_up(value: usize) -> usize {
    (value + (ALIGN - 1)) & !(ALIGN - 1)
}

/// Typed offset of a `T` inside a parameter block.
pub struct Ref<T: ?Sized> {
    offset: u32,
    _ty: PhantomData<fn(&T)>,
}

impl<T: ?Sized> Ref<T> {
    pub const fn from_offset(offset: u32) -> Self {
        Self {
            offset,
            _ty: PhantomData,
        }
    }

    pub const fn offset(self) -> u32 {
        self.offset
    }

    /// Reinterpret the referent type. The offset is unchanged.
    pub const fn cast<U: ?Sized>(self) -> Ref<U> {
        Ref::from_offset(self.offset)
    }

    /// Reference to a field located `byte_offset` bytes into the referent.
    ///
    /// Saturates at [`NULL_OFFSET`], which never resolves.
    pub const fn field<U: ?Sized>(self, byte_offset: usize) -> Ref<U> {
        Ref::from_offset(offset_add(self.offset, byte_offset))
    }
}

impl<T> Ref<[T]> {
    /// Reference to element `index` of an array. Saturates like [`Ref::field`].
    pub const fn at(self, index: usize) -> Ref<T> {
        Ref::from_offset(offset_add(self.offset, index.saturating_mul(size_of::<T>())))
    }
}

const fn offset_add(offset: u32, delta: usize) -> u32 {
    if delta > u32::MAX as usize {
        NULL_OFFSET
    } else {
        offset.saturating_add(delta as u32)
    }
}

impl<T: ?Sized> Clone for Ref<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for Ref<T> {}

impl<T: ?Sized> PartialEq for Ref<T> {
    fn eq(&self, other: &Self) -> bool {
        self.offset == other.offset
    }
}

impl<T: ?Sized> Eq for Ref<T> {}

impl<T: ?Sized> fmt::Debug for Ref<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ref({:#x})", self.offset)
    }
}

/// Pointer field of a wire struct (4 bytes, little endian).
///
/// Holds the block-relative offset of its referent, or [`NULL_OFFSET`].
/// Note that a zeroed `Ptr` is *not* null: it points at the block start.
#[derive(FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(transparent)]
pub struct Ptr<T: ?Sized> {
    raw: U32,
    _ty: PhantomData<fn(&T)>,
}

// Verify struct size
const_assert_eq!(size_of::<Ptr<[u8]>>(), 4);

impl<T: ?Sized> Ptr<T> {
    pub const fn null() -> Self {
        Self {
            raw: U32::new(NULL_OFFSET),
            _ty: PhantomData,
        }
    }

    pub fn new(target: Option<Ref<T>>) -> Self {
        let mut ptr = Self::null();
        ptr.set(target);
        ptr
    }

    pub fn get(&self) -> Option<Ref<T>> {
        match self.raw.get() {
            NULL_OFFSET => None,
            offset => Some(Ref::from_offset(offset)),
        }
    }

    pub fn set(&mut self, target: Option<Ref<T>>) {
        self.raw = U32::new(target.map_or(NULL_OFFSET, Ref::offset));
    }

    pub fn is_null(&self) -> bool {
        self.raw.get() == NULL_OFFSET
    }
}

impl<T: ?Sized> From<Ref<T>> for Ptr<T> {
    fn from(target: Ref<T>) -> Self {
        Self::new(Some(target))
    }
}

impl<T: ?Sized> Clone for Ptr<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for Ptr<T> {}

impl<T: ?Sized> Default for Ptr<T> {
    fn default() -> Self {
        Self::null()
    }
}

impl<T: ?Sized> fmt::Debug for Ptr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(target) => write!(f, "Ptr({:#x})", target.offset()),
            None => f.write_str("Ptr(null)"),
        }
    }
}

/// Growable block in which a caller builds a parameter graph.
///
/// Allocations are placed at [`ALIGN`]-byte boundaries. The arena never
/// shrinks, so every [`Ref`] it hands out stays valid for its lifetime.
#[derive(Debug, Clone, Default)]
pub struct Arena {
    bytes: Vec<u8>,
}

impl Arena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
        }
    }

    /// Copy `value` into the arena.
    pub fn alloc<T: IntoBytes + Immutable>(&mut self, value: &T) -> Ref<T> {
        Ref::from_offset(self.alloc_raw(value.as_bytes()))
    }

    pub fn alloc_bytes(&mut self, bytes: &[u8]) -> Ref<[u8]> {
        Ref::from_offset(self.alloc_raw(bytes))
    }

    pub fn alloc_slice<T: IntoBytes + Immutable>(&mut self, items: &[T]) -> Ref<[T]> {
        Ref::from_offset(self.alloc_raw(items.as_bytes()))
    }

    /// Copy `s` followed by a NUL terminator.
    pub fn alloc_cstr(&mut self, s: &str) -> Ref<[u8]> {
        let offset = self.alloc_raw(s.as_bytes());
        self.bytes.truncate(offset as usize + s.len());
        self.bytes.push(0);
        self.pad();
        Ref::from_offset(offset)
    }

    fn alloc_raw(&mut self, bytes: &[u8]) -> u32 {
        self.pad();
        let offset = self.bytes.len() as u32;
        self.bytes.extend_from_slice(bytes);
        self.pad();
        offset
    }

    fn pad(&mut self) {
        self.bytes.resize(align_up(self.bytes.len()), 0);
    }

    pub fn resolve<T>(&self, target: Ref<T>) -> Result<&T, ResolveError>
    where
        T: FromBytes + KnownLayout + Immutable,
    {
        resolve_in(&self.bytes, target)
    }

    pub fn resolve_mut<T>(&mut self, target: Ref<T>) -> Result<&mut T, ResolveError>
    where
        T: FromBytes + IntoBytes + KnownLayout,
    {
        let len = self.bytes.len();
        let offset = target.offset() as usize;
        let tail = self
            .bytes
            .get_mut(offset..)
            .ok_or(ResolveError::OutOfBounds {
                offset,
                size: size_of::<T>(),
                len,
            })?;
        T::mut_from_prefix(tail)
            .map(|(value, _)| value)
            .map_err(|_| ResolveError::OutOfBounds {
                offset,
                size: size_of::<T>(),
                len,
            })
    }

    pub fn resolve_slice<T>(&self, target: Ref<[T]>, count: usize) -> Result<&[T], ResolveError>
    where
        T: FromBytes + Immutable,
    {
        resolve_slice_in(&self.bytes, target, count)
    }

    pub fn resolve_slice_mut<T>(
        &mut self,
        target: Ref<[T]>,
        count: usize,
    ) -> Result<&mut [T], ResolveError>
    where
        T: FromBytes + IntoBytes,
    {
        let len = self.bytes.len();
        let offset = target.offset() as usize;
        let size = count.saturating_mul(size_of::<T>());
        let tail = self
            .bytes
            .get_mut(offset..)
            .ok_or(ResolveError::OutOfBounds { offset, size, len })?;
        <[T]>::mut_from_prefix_with_elems(tail, count)
            .map(|(items, _)| items)
            .map_err(|_| ResolveError::OutOfBounds { offset, size, len })
    }

    /// Follow a pointer field to its referent.
    pub fn follow<T>(&self, ptr: &Ptr<T>) -> Result<&T, ResolveError>
    where
        T: FromBytes + KnownLayout + Immutable,
    {
        self.resolve(ptr.get().ok_or(ResolveError::Null)?)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn view(&self) -> View<'_> {
        View::new(&self.bytes)
    }
}

/// Read-only view of a parameter block, typically a received buffer.
#[derive(Debug, Clone, Copy)]
pub struct View<'a> {
    bytes: &'a [u8],
}

impl<'a> View<'a> {
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// The root struct, which always sits at offset 0.
    pub fn root<T>(&self) -> Result<&'a T, ResolveError>
    where
        T: FromBytes + KnownLayout + Immutable,
    {
        resolve_in(self.bytes, Ref::from_offset(0))
    }

    pub fn resolve<T>(&self, target: Ref<T>) -> Result<&'a T, ResolveError>
    where
        T: FromBytes + KnownLayout + Immutable,
    {
        resolve_in(self.bytes, target)
    }

    pub fn resolve_slice<T>(&self, target: Ref<[T]>, count: usize) -> Result<&'a [T], ResolveError>
    where
        T: FromBytes + Immutable,
    {
        resolve_slice_in(self.bytes, target, count)
    }

    pub fn follow<T>(&self, ptr: &Ptr<T>) -> Result<&'a T, ResolveError>
    where
        T: FromBytes + KnownLayout + Immutable,
    {
        self.resolve(ptr.get().ok_or(ResolveError::Null)?)
    }

    /// Follow an array pointer holding `count` elements.
    pub fn follow_slice<T>(&self, ptr: &Ptr<[T]>, count: usize) -> Result<&'a [T], ResolveError>
    where
        T: FromBytes + Immutable,
    {
        self.resolve_slice(ptr.get().ok_or(ResolveError::Null)?, count)
    }

    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }
}

fn resolve_in<T>(bytes: &[u8], target: Ref<T>) -> Result<&T, ResolveError>
where
    T: FromBytes + KnownLayout + Immutable,
{
    let offset = target.offset() as usize;
    let err = ResolveError::OutOfBounds {
        offset,
        size: size_of::<T>(),
        len: bytes.len(),
    };
    let tail = bytes.get(offset..).ok_or(err)?;
    T::ref_from_prefix(tail).map(|(value, _)| value).map_err(|_| err)
}

fn resolve_slice_in<T>(bytes: &[u8], target: Ref<[T]>, count: usize) -> Result<&[T], ResolveError>
where
    T: FromBytes + Immutable,
{
    let offset = target.offset() as usize;
    let err = ResolveError::OutOfBounds {
        offset,
        size: count.saturating_mul(size_of::<T>()),
        len: bytes.len(),
    };
    let tail = bytes.get(offset..).ok_or(err)?;
    <[T]>::ref_from_prefix_with_elems(tail, count)
        .map(|(items, _)| items)
        .map_err(|_| err)
}

/// Error resolving a [`Ref`] or following a [`Ptr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResolveError {
    /// Followed a null pointer
    #[error("null pointer")]
    Null,
    /// Referent extends past the end of the block
    #[error("referent at {offset:#x} ({size} bytes) exceeds block of {len} bytes")]
    OutOfBounds {
        /// Offset of the referent
        offset: usize,
        /// Size of the referent
        size: usize,
        /// Length of the block
        len: usize,
    },
}

#[cfg(test)]
mod tests {
    use zerocopy::little_endian::U16;

    use super::*;

    #[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
    #[repr(C)]
    struct Entry {
        value: U16,
        _padding: [u8; 2],
        extra: Ptr<U16>,
    }

    #[test]
    fn test_align_up() {
        assert_eq!(align_up(0), 0);
        assert_eq!(align_up(1), 4);
        assert_eq!(align_up(4), 4);
        assert_eq!(align_up(17), 20);
    }

    #[test]
    fn test_ptr_null_round_trip() {
        let mut ptr = Ptr::<u8>::null();
        assert!(ptr.is_null());
        assert_eq!(ptr.get(), None);

        ptr.set(Some(Ref::from_offset(8)));
        assert_eq!(ptr.get(), Some(Ref::from_offset(8)));
        assert_eq!(ptr.as_bytes(), &[8, 0, 0, 0]);

        ptr.set(None);
        assert_eq!(ptr.as_bytes(), &[0xFF; 4]);
    }

    #[test]
    fn test_arena_allocations_are_aligned() {
        let mut arena = Arena::new();
        let a = arena.alloc_bytes(&[1, 2, 3]);
        let b = arena.alloc_bytes(&[4]);
        let c = arena.alloc_cstr("hi");
        let d = arena.alloc_bytes(&[]);

        assert_eq!(a.offset(), 0);
        assert_eq!(b.offset(), 4);
        assert_eq!(c.offset(), 8);
        assert_eq!(d.offset(), 12);
        assert_eq!(&arena.as_bytes()[8..11], b"hi\0");
    }

    #[test]
    fn test_arena_follow_pointer_fields() {
        let mut arena = Arena::new();
        let extra = arena.alloc(&U16::new(2));
        let linked = arena.alloc(&Entry {
            value: U16::new(1),
            _padding: [0; 2],
            extra: extra.into(),
        });
        let unlinked = arena.alloc(&Entry {
            value: U16::new(3),
            _padding: [0; 2],
            extra: Ptr::null(),
        });

        let entry = arena.resolve(linked).unwrap();
        assert_eq!(entry.value.get(), 1);
        assert_eq!(arena.follow(&entry.extra).unwrap().get(), 2);

        let entry = arena.resolve(unlinked).unwrap();
        assert_eq!(arena.follow(&entry.extra).unwrap_err(), ResolveError::Null);
    }

    #[test]
    fn test_arena_resolve_mut_and_slices() {
        let mut arena = Arena::new();
        let handles = arena.alloc_slice(&[U16::new(0x10), U16::new(0x20), U16::new(0x30)]);

        arena.resolve_mut(handles.at(1)).unwrap().set(0x21);

        let items = arena.resolve_slice(handles, 3).unwrap();
        assert_eq!(items[1].get(), 0x21);
        assert!(matches!(
            arena.resolve_slice(handles, 4),
            Err(ResolveError::OutOfBounds { size: 8, .. })
        ));
    }

    #[test]
    fn test_ref_offsets_saturate() {
        let handles = Ref::<[U16]>::from_offset(8);
        assert_eq!(handles.at(2).offset(), 12);
        assert_eq!(handles.at(usize::MAX).offset(), NULL_OFFSET);
        assert_eq!(
            Ref::<U32>::from_offset(u32::MAX - 2).field::<u8>(8).offset(),
            NULL_OFFSET
        );

        let bytes = [0u8; 8];
        let view = View::new(&bytes);
        assert!(view.resolve(handles.at(usize::MAX / 2)).is_err());
        assert!(matches!(
            view.resolve_slice(handles, usize::MAX),
            Err(ResolveError::OutOfBounds {
                size: usize::MAX,
                ..
            })
        ));
    }

    #[test]
    fn test_view_rejects_out_of_bounds() {
        let bytes = [0u8; 6];
        let view = View::new(&bytes);
        assert!(view.resolve::<U32>(Ref::from_offset(2)).is_ok());
        assert_eq!(
            view.resolve::<U32>(Ref::from_offset(4)).unwrap_err(),
            ResolveError::OutOfBounds {
                offset: 4,
                size: 4,
                len: 6
            }
        );
    }
}
