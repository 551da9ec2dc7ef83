//! Bluetooth profile parameters for the dual-core IPC
//!
//! One module per API group of the Bluetooth stack. Each declares the
//! group's action and event codes, the wire layout of every parameter that
//! carries pointers, the [`Schema`](bt_ipc_marshal::Schema) used to deep copy
//! it, and the ret and event size tables. The group's
//! [`Profile`](bt_ipc_marshal::Profile) impl ties these together.
//!
//! [`ProfileId`] routes a `(group, code)` pair to the right module, the way
//! the IPC task sees it.
//!
//! # Features
//!
//! - `le-iso`: LE isochronous channels ([`le_iso`]).
//! - `le-audio`: LE Audio ([`le_audio`]); implies `le-iso`. Also enables the
//!   LE Audio ids returned by [`device::acts::BT_ENABLE`].
//! - `log` / `defmt`: diagnostics backend.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod a2dp;
pub mod avrcp;
pub mod br_gap;
pub mod device;
pub mod gap;
pub mod gatt;
pub mod gattc;
pub mod gatts;
pub mod hfp;
pub mod le_gap;
pub mod sdp;
pub mod spp;

#[cfg(feature = "le-audio")]
pub mod le_audio;
#[cfg(feature = "le-iso")]
pub mod le_iso;

use bt_ipc_marshal::{
    Arena, CopyBackError, DevRequest, HostRequest, PopError, Profile, PushError, Ref, View,
};

/// API group of a request, as carried in the IPC message header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ProfileId {
    Device = 0x00,
    Gap = 0x01,
    LeGap = 0x02,
    Gatts = 0x03,
    Gattc = 0x04,
    BrGap = 0x05,
    A2dp = 0x06,
    Avrcp = 0x07,
    Spp = 0x08,
    Sdp = 0x09,
    Hfp = 0x0A,
    #[cfg(feature = "le-iso")]
    LeIso = 0x0B,
    #[cfg(feature = "le-audio")]
    LeAudio = 0x0C,
}

impl TryFrom<u8> for ProfileId {
    type Error = DispatchError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Ok(match id {
            0x00 => Self::Device,
            0x01 => Self::Gap,
            0x02 => Self::LeGap,
            0x03 => Self::Gatts,
            0x04 => Self::Gattc,
            0x05 => Self::BrGap,
            0x06 => Self::A2dp,
            0x07 => Self::Avrcp,
            0x08 => Self::Spp,
            0x09 => Self::Sdp,
            0x0A => Self::Hfp,
            #[cfg(feature = "le-iso")]
            0x0B => Self::LeIso,
            #[cfg(feature = "le-audio")]
            0x0C => Self::LeAudio,
            _ => {
                warn!("unknown profile {:#x}", id);
                return Err(DispatchError::UnknownProfile { id });
            }
        })
    }
}

/// Evaluate `$body` with `$p` bound to the [`Profile`] of `$id`.
macro_rules! with_profile {
    ($id:expr, $p:ident => $body:expr) => {
        match $id {
            ProfileId::Device => {
                type $p = device::Device;
                $body
            }
            ProfileId::Gap => {
                type $p = gap::Gap;
                $body
            }
            ProfileId::LeGap => {
                type $p = le_gap::LeGap;
                $body
            }
            ProfileId::Gatts => {
                type $p = gatts::Gatts;
                $body
            }
            ProfileId::Gattc => {
                type $p = gattc::Gattc;
                $body
            }
            ProfileId::BrGap => {
                type $p = br_gap::BrGap;
                $body
            }
            ProfileId::A2dp => {
                type $p = a2dp::A2dp;
                $body
            }
            ProfileId::Avrcp => {
                type $p = avrcp::Avrcp;
                $body
            }
            ProfileId::Spp => {
                type $p = spp::Spp;
                $body
            }
            ProfileId::Sdp => {
                type $p = sdp::Sdp;
                $body
            }
            ProfileId::Hfp => {
                type $p = hfp::Hfp;
                $body
            }
            #[cfg(feature = "le-iso")]
            ProfileId::LeIso => {
                type $p = le_iso::LeIso;
                $body
            }
            #[cfg(feature = "le-audio")]
            ProfileId::LeAudio => {
                type $p = le_audio::LeAudio;
                $body
            }
        }
    };
}

impl ProfileId {
    pub fn name(self) -> &'static str {
        with_profile!(self, P => P::NAME)
    }

    pub fn act_ret_param_size(self, act: u16) -> u32 {
        with_profile!(self, P => P::act_ret_param_size(act))
    }

    pub fn evt_mem_size(self, evt: u16) -> Option<u32> {
        with_profile!(self, P => P::evt_mem_size(evt))
    }

    pub fn push_cmd<T: ?Sized>(
        self,
        act: u16,
        src: &Arena,
        param: Ref<T>,
        buf_len: usize,
    ) -> Result<HostRequest, DispatchError> {
        Ok(with_profile!(self, P => P::push_cmd(act, src, param, buf_len))?)
    }

    pub fn pop_cmd(self, act: u16, bytes: &[u8]) -> Result<View<'_>, DispatchError> {
        Ok(with_profile!(self, P => P::pop_cmd(act, bytes))?)
    }

    pub fn push_event<T: ?Sized>(
        self,
        evt: u16,
        src: &Arena,
        param: Ref<T>,
        buf_len: usize,
    ) -> Result<DevRequest, DispatchError> {
        Ok(with_profile!(self, P => P::push_event(evt, src, param, buf_len))?)
    }

    pub fn pop_event(self, evt: u16, bytes: &[u8]) -> Result<View<'_>, DispatchError> {
        Ok(with_profile!(self, P => P::pop_event(evt, bytes))?)
    }

    /// Copy the result of `act` into the caller's parameter. `ret` must hold
    /// at least [`Self::act_ret_param_size`] bytes.
    pub fn copy_act_ret_param(
        self,
        act: u16,
        dst: &mut Arena,
        param: Ref<[u8]>,
        ret: &[u8],
    ) -> Result<(), DispatchError> {
        with_profile!(self, P => P::copy_act_ret_param(act, dst, param, ret)).inspect_err(|err| {
            warn!("{} act {:#x}: copy back failed: {}", self.name(), act, err);
        })?;
        Ok(())
    }
}

/// Error routing a request to its profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DispatchError {
    /// The group id names no profile built into this crate
    #[error("unknown profile {id:#x}")]
    UnknownProfile {
        /// Group id from the message header
        id: u8,
    },
    #[error(transparent)]
    Push(#[from] PushError),
    #[error(transparent)]
    Pop(#[from] PopError),
    #[error(transparent)]
    CopyBack(#[from] CopyBackError),
}

#[cfg(test)]
mod tests {
    use bt_ipc_marshal::IPC_HOST_API_DATA_MAX;

    use super::*;

    #[test]
    fn test_profile_id_from_group() {
        assert_eq!(ProfileId::try_from(0x0A).unwrap(), ProfileId::Hfp);
        assert_eq!(ProfileId::try_from(0x02).unwrap().name(), "le_gap");
        assert_eq!(
            ProfileId::try_from(0x7F).unwrap_err(),
            DispatchError::UnknownProfile { id: 0x7F }
        );
    }

    #[test]
    fn test_dispatch_routes_to_module() {
        let mut arena = Arena::new();
        let data = arena.alloc_bytes(b"hello");
        let param = arena.alloc(&spp::SendData::new([1; 6], 2, data.into(), 5));

        let request = ProfileId::Spp
            .push_cmd(spp::acts::SEND_DATA, &arena, param, 0)
            .unwrap();
        assert_eq!(request.actual_size(), 16 + 8);
        let view = ProfileId::Spp
            .pop_cmd(spp::acts::SEND_DATA, request.payload())
            .unwrap();
        let root = view.root::<spp::SendData>().unwrap();
        assert_eq!(view.follow_slice(&root.data, 5).unwrap(), b"hello");
    }

    #[test]
    fn test_dispatch_wraps_errors() {
        let mut arena = Arena::new();
        let data = arena.alloc_bytes(&[0; IPC_HOST_API_DATA_MAX]);
        let param = arena.alloc(&hfp::ScoDataSend::new([0; 6], 0, data.into(), 1024));

        let err = ProfileId::Hfp
            .push_cmd(hfp::acts::SEND_SCO_DATA, &arena, param, 0)
            .unwrap_err();
        assert_eq!(
            err,
            DispatchError::Push(PushError::Overflow {
                required: 16 + 1024,
                available: IPC_HOST_API_DATA_MAX,
            })
        );

        let addr = arena.alloc(&br_gap::BdAddr { addr: [0; 6] });
        let act = br_gap::acts::GET_DEVICE_ADDR;
        let err = ProfileId::BrGap
            .copy_act_ret_param(act, &mut arena, addr.cast(), &[1, 2])
            .unwrap_err();
        assert_eq!(
            err,
            DispatchError::CopyBack(CopyBackError::RetTooShort {
                required: 6,
                available: 2,
            })
        );
    }

    #[test]
    fn test_dispatch_tables_and_copy_back() {
        assert_eq!(
            ProfileId::BrGap.act_ret_param_size(br_gap::acts::GET_DEVICE_ADDR),
            6
        );
        assert_eq!(ProfileId::Sdp.act_ret_param_size(sdp::acts::RECORD_ADD), 0);
        assert_eq!(ProfileId::Hfp.evt_mem_size(hfp::evts::CALLER_ID_IND), Some(28));
        assert_eq!(ProfileId::Sdp.evt_mem_size(0), None);

        let mut arena = Arena::new();
        let addr = arena.alloc(&br_gap::BdAddr { addr: [0; 6] });
        ProfileId::BrGap
            .copy_act_ret_param(
                br_gap::acts::GET_DEVICE_ADDR,
                &mut arena,
                addr.cast(),
                &[6, 5, 4, 3, 2, 1],
            )
            .unwrap();
        assert_eq!(arena.resolve(addr).unwrap().addr, [6, 5, 4, 3, 2, 1]);
    }

    #[test]
    fn test_flat_event_through_dispatch() {
        let mut arena = Arena::new();
        let ind = arena.alloc(&[0xA0u8, 0xA1, 0xA2, 0xA3, 0xA4, 0xA5]);
        let evt = br_gap::evts::ACL_CONN_IND;
        let size = ProfileId::BrGap.evt_mem_size(evt).unwrap() as usize;

        let event = ProfileId::BrGap.push_event(evt, &arena, ind, size).unwrap();
        assert_eq!(event.payload(), &[0xA0, 0xA1, 0xA2, 0xA3, 0xA4, 0xA5]);
        let view = ProfileId::BrGap.pop_event(evt, event.payload()).unwrap();
        assert_eq!(view.bytes(), event.payload());
    }

    #[cfg(feature = "le-audio")]
    #[test]
    fn test_le_audio_reachable() {
        assert_eq!(ProfileId::try_from(0x0C).unwrap(), ProfileId::LeAudio);
        assert_eq!(
            ProfileId::LeAudio.act_ret_param_size(le_audio::acts::BROADCAST_SOURCE_CREATE),
            22
        );
    }
}
