//! SPP parameters.

use core::mem::offset_of;

use bt_ipc_marshal::{ActMemOption, EvtMemOption, Field, Len, Profile, Ptr, Schema};
use static_assertions::const_assert_eq;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, little_endian::*};

use crate::le_gap::BD_ADDR_LEN;

pub mod acts {
    pub const SRV_CFG: u16 = 0x01;
    pub const CONNECT: u16 = 0x02;
    pub const DISCONNECT: u16 = 0x03;
    pub const DISCONNECT_ALL: u16 = 0x04;
    pub const SEND_DATA: u16 = 0x05;
    pub const GIVE_CREDITS: u16 = 0x06;
    pub const MAX: u16 = 0x07;
}

pub mod evts {
    pub const CONN_COMPL: u16 = 0x01;
    pub const CREDIT_RCVD: u16 = 0x02;
    pub const DATA_IND: u16 = 0x03;
    pub const DATA_RSP: u16 = 0x04;
    pub const CONN_IND: u16 = 0x05;
    pub const DISCONN_CMPL: u16 = 0x06;
    pub const SDP_ATTR_INFO: u16 = 0x07;
    pub const SDP_DISCOV_CMPL: u16 = 0x08;
    pub const MAX: u16 = 0x09;
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct SendData {
    pub bd_addr: [u8; BD_ADDR_LEN],
    pub local_server_chann: u8,
    _padding: u8,
    pub data: Ptr<[u8]>,
    pub len: U16,
    _padding2: [u8; 2],
}

// Verify struct size
const_assert_eq!(size_of::<SendData>(), 16);

impl SendData {
    pub fn new(bd_addr: [u8; BD_ADDR_LEN], local_server_chann: u8, data: Ptr<[u8]>, len: u16) -> Self {
        Self {
            bd_addr,
            local_server_chann,
            _padding: 0,
            data,
            len: U16::new(len),
            _padding2: [0; 2],
        }
    }
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct ConnCmpl {
    pub bd_addr: [u8; BD_ADDR_LEN],
    pub local_server_chann: u8,
    pub link_credit: u8,
    pub frame_size: U16,
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct CreditRcvd {
    pub bd_addr: [u8; BD_ADDR_LEN],
    pub local_server_chann: u8,
    pub link_credit: u8,
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct DataInd {
    pub bd_addr: [u8; BD_ADDR_LEN],
    pub local_server_chann: u8,
    _padding: u8,
    pub len: U16,
    _padding2: [u8; 2],
    /// Not deep copied: points into memory the receiver already owns
    pub data: Ptr<[u8]>,
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct DataRsp {
    pub bd_addr: [u8; BD_ADDR_LEN],
    pub local_server_chann: u8,
    _padding: u8,
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct ConnIndEvt {
    pub bd_addr: [u8; BD_ADDR_LEN],
    pub local_server_chann: u8,
    _padding: u8,
    pub frame_size: U16,
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct DisconnCmpl {
    pub bd_addr: [u8; BD_ADDR_LEN],
    pub local_server_chann: u8,
    _padding: u8,
    pub cause: U16,
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct AttrInfo {
    pub bd_addr: [u8; BD_ADDR_LEN],
    pub srv_class_uuid_type: u8,
    pub server_channel: u8,
    pub srv_class_uuid_data: [u8; 16],
    pub supported_feat: U16,
    _padding: [u8; 2],
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct SdpDiscovCmpl {
    pub bd_addr: [u8; BD_ADDR_LEN],
    pub cause: U16,
}

pub static SEND_DATA_SCHEMA: Schema = Schema {
    name: "SppSendData",
    size: size_of::<SendData>(),
    fields: &[Field::bytes(offset_of!(SendData, data), Len::u16(offset_of!(SendData, len)))],
};

#[derive(Debug)]
pub enum Spp {}

impl Profile for Spp {
    const NAME: &'static str = "spp";
    const ACT_MAX: u16 = acts::MAX;
    const EVT_MAX: u16 = evts::MAX;
    const ACT_RET_SIZES: &'static [ActMemOption] = &[ActMemOption::new(acts::MAX, 0)];
    const EVT_MEM_SIZES: &'static [EvtMemOption] = &[
        EvtMemOption::new(evts::CONN_COMPL, size_of::<ConnCmpl>() as u32),
        EvtMemOption::new(evts::CREDIT_RCVD, size_of::<CreditRcvd>() as u32),
        EvtMemOption::new(evts::DATA_IND, size_of::<DataInd>() as u32),
        EvtMemOption::new(evts::DATA_RSP, size_of::<DataRsp>() as u32),
        EvtMemOption::new(evts::CONN_IND, size_of::<ConnIndEvt>() as u32),
        EvtMemOption::new(evts::DISCONN_CMPL, size_of::<DisconnCmpl>() as u32),
        EvtMemOption::new(evts::SDP_ATTR_INFO, size_of::<AttrInfo>() as u32),
        EvtMemOption::new(evts::SDP_DISCOV_CMPL, size_of::<SdpDiscovCmpl>() as u32),
        EvtMemOption::new(evts::MAX, 0),
    ];

    fn cmd_schema(act: u16) -> Option<&'static Schema> {
        match act {
            acts::SEND_DATA => Some(&SEND_DATA_SCHEMA),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use bt_ipc_marshal::{Arena, PushError, Ref};

    use super::*;

    const PEER: [u8; BD_ADDR_LEN] = [6, 5, 4, 3, 2, 1];

    #[test]
    fn test_send_data_round_trip() {
        let mut arena = Arena::new();
        let data = arena.alloc_bytes(b"AT+BRSF=0\r");
        let param = arena.alloc(&SendData::new(PEER, 3, data.into(), 10));

        let request = Spp::push_cmd(acts::SEND_DATA, &arena, param, 0).unwrap();
        assert_eq!(request.actual_size(), 16 + 12);

        let view = Spp::pop_cmd(acts::SEND_DATA, request.payload()).unwrap();
        let root = view.root::<SendData>().unwrap();
        assert_eq!(root.local_server_chann, 3);
        assert_eq!(root.data.get(), Some(Ref::from_offset(16)));
        assert_eq!(view.follow_slice(&root.data, 10).unwrap(), b"AT+BRSF=0\r");
    }

    #[test]
    fn test_send_data_over_capacity() {
        let mut arena = Arena::new();
        let data = arena.alloc_bytes(&[0; 1024]);
        let param = arena.alloc(&SendData::new(PEER, 3, data.into(), 1024));

        let err = Spp::push_cmd(acts::SEND_DATA, &arena, param, 0).unwrap_err();
        assert_eq!(
            err,
            PushError::Overflow {
                required: 16 + 1024,
                available: 1024,
            }
        );
    }

    #[test]
    fn test_tables() {
        assert_eq!(Spp::act_ret_param_size(acts::SEND_DATA), 0);
        assert_eq!(Spp::evt_mem_size(evts::DATA_IND), Some(16));
        assert_eq!(Spp::evt_mem_size(evts::SDP_ATTR_INFO), Some(28));
    }
}
