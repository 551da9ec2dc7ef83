//! Request envelopes carried by the IPC transport.
//!
//! An envelope owns one fixed-capacity parameter buffer. It is allocated per
//! call, filled once, and handed to the transport; a failed push drops it
//! before the error is returned, so it is released exactly once either way.

use alloc::vec::Vec;
use core::marker::PhantomData;

use crate::{
    push::{PushError, push},
    schema::{Frame, Schema},
};

/// Parameter buffer capacity of a host to device request.
pub const IPC_HOST_API_DATA_MAX: usize = 1024;

/// Parameter buffer capacity of a device to host request.
pub const IPC_DEV_API_DATA_MAX: usize = 1024;

/// Transfer direction of an envelope.
pub trait Direction {
    const NAME: &'static str;
    const CAPACITY: usize;
}

/// Host to device: action commands.
#[derive(Debug)]
pub enum Host {}

/// Device to host: events.
#[derive(Debug)]
pub enum Dev {}

impl Direction for Host {
    const NAME: &'static str = "host";
    const CAPACITY: usize = IPC_HOST_API_DATA_MAX;
}

impl Direction for Dev {
    const NAME: &'static str = "dev";
    const CAPACITY: usize = IPC_DEV_API_DATA_MAX;
}

pub type HostRequest = Envelope<Host>;
pub type DevRequest = Envelope<Dev>;

#[derive(Debug)]
pub struct Envelope<D: Direction> {
    param_buf: Vec<u8>,
    actual_size: usize,
    _dir: PhantomData<D>,
}

impl<D: Direction> Envelope<D> {
    /// Allocate an envelope with a zeroed parameter buffer.
    pub fn try_new() -> Result<Self, PushError> {
        let mut param_buf = Vec::new();
        param_buf
            .try_reserve_exact(D::CAPACITY)
            .map_err(|_| PushError::Alloc { size: D::CAPACITY })?;
        param_buf.resize(D::CAPACITY, 0);
        Ok(Self {
            param_buf,
            actual_size: 0,
            _dir: PhantomData,
        })
    }

    /// Build an envelope for the parameter at `root` in `src`.
    ///
    /// With a schema the parameter is deep copied. Without one, `buf_len`
    /// bytes are copied verbatim.
    pub fn push(
        schema: Option<&'static Schema>,
        src: &[u8],
        root: usize,
        buf_len: usize,
    ) -> Result<Self, PushError> {
        let mut envelope = Self::try_new().inspect_err(|err| {
            error!("{} envelope: {}", D::NAME, err);
        })?;
        let result = match schema {
            Some(schema) => push(schema, src, root, &mut envelope.param_buf),
            None => envelope.copy_flat(src, root, buf_len),
        };
        match result {
            Ok(actual_size) => {
                envelope.actual_size = actual_size;
                Ok(envelope)
            }
            Err(err) => {
                warn!(
                    "{} request: {} is over deep copy buf: {}",
                    D::NAME,
                    schema.map_or("flat param", |s| s.name),
                    err
                );
                Err(err)
            }
        }
    }

    fn copy_flat(&mut self, src: &[u8], root: usize, buf_len: usize) -> Result<usize, PushError> {
        if buf_len > self.param_buf.len() {
            return Err(PushError::Overflow {
                required: buf_len,
                available: self.param_buf.len(),
            });
        }
        let bytes = Frame::new(src, root).bytes(0, buf_len)?;
        self.param_buf[..buf_len].copy_from_slice(bytes);
        Ok(buf_len)
    }

    /// Bytes actually used by the parameter.
    pub fn payload(&self) -> &[u8] {
        &self.param_buf[..self.actual_size]
    }

    pub fn actual_size(&self) -> usize {
        self.actual_size
    }

    pub fn param_buf(&self) -> &[u8] {
        &self.param_buf
    }

    pub fn capacity(&self) -> usize {
        self.param_buf.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        arena::Arena,
        schema::{Field, Len},
    };

    static BLOB: Schema = Schema {
        name: "Blob",
        size: 8,
        fields: &[Field::bytes(0, Len::u32(4))],
    };

    #[test]
    fn test_envelope_capacity() {
        let host = HostRequest::try_new().unwrap();
        let dev = DevRequest::try_new().unwrap();
        assert_eq!(host.capacity(), IPC_HOST_API_DATA_MAX);
        assert_eq!(dev.capacity(), IPC_DEV_API_DATA_MAX);
        assert!(host.param_buf().iter().all(|&b| b == 0));
        assert_eq!(host.actual_size(), 0);
    }

    #[test]
    fn test_flat_push_is_verbatim() {
        let mut arena = Arena::new();
        let param = arena.alloc(&[0x11u8, 0x22, 0x33, 0x44, 0x55, 0x66]);

        let envelope = HostRequest::push(None, arena.as_bytes(), param.offset() as usize, 6).unwrap();
        assert_eq!(envelope.actual_size(), 6);
        assert_eq!(envelope.payload(), &[0x11, 0x22, 0x33, 0x44, 0x55, 0x66]);
    }

    #[test]
    fn test_flat_push_over_capacity() {
        let src = alloc::vec![0u8; IPC_HOST_API_DATA_MAX + 1];
        let err = HostRequest::push(None, &src, 0, src.len()).unwrap_err();
        assert_eq!(
            err,
            PushError::Overflow {
                required: IPC_HOST_API_DATA_MAX + 1,
                available: IPC_HOST_API_DATA_MAX
            }
        );
    }

    #[test]
    fn test_deep_push_overflow_at_limit() {
        // root (8) plus a payload that lands exactly one byte past the end
        let len = IPC_DEV_API_DATA_MAX - 8 + 1;
        let mut src = alloc::vec![0u8; 8 + len];
        src[0..4].copy_from_slice(&8u32.to_le_bytes());
        src[4..8].copy_from_slice(&(len as u32).to_le_bytes());

        let err = DevRequest::push(Some(&BLOB), &src, 0, 8).unwrap_err();
        assert_eq!(
            err,
            PushError::Overflow {
                required: IPC_DEV_API_DATA_MAX + 1,
                available: IPC_DEV_API_DATA_MAX
            }
        );

        src[4..8].copy_from_slice(&((len - 1) as u32).to_le_bytes());
        let envelope = DevRequest::push(Some(&BLOB), &src, 0, 8).unwrap();
        assert_eq!(envelope.actual_size(), IPC_DEV_API_DATA_MAX);
    }
}
