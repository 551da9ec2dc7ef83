//! BR/EDR GAP parameters.

use core::mem::offset_of;

use bt_ipc_marshal::{
    ActMemOption, Arena, CopyBackError, EvtMemOption, Field, Len, Profile, Ptr, Ref, Schema,
    table::copy_into,
};
use static_assertions::const_assert_eq;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, little_endian::*};

use crate::le_gap::BD_ADDR_LEN;

pub mod acts {
    pub const ENABLE: u16 = 0x01;
    pub const DISABLE: u16 = 0x02;
    pub const GET_DEVICE_ADDR: u16 = 0x03;
    pub const SET_DEVICE_NAME: u16 = 0x04;
    pub const SET_PAGE_PARAM: u16 = 0x05;
    pub const SET_INQUIRY_PARAM: u16 = 0x06;
    pub const START_INQUIRY: u16 = 0x07;
    pub const STOP_INQUIRY: u16 = 0x08;
    pub const SET_RADIO_MODE: u16 = 0x09;
    pub const DISCONNECT: u16 = 0x0A;
    pub const MAX: u16 = 0x0B;
}

pub mod evts {
    pub const INQUIRY_RESULT: u16 = 0x01;
    pub const ACL_CONN_IND: u16 = 0x02;
    pub const ACL_CONN_SUCCESS: u16 = 0x03;
    pub const ACL_DISCONN: u16 = 0x04;
    pub const MAX: u16 = 0x05;
}

pub const NAME_LEN: usize = 40;

/// Result of [`acts::GET_DEVICE_ADDR`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct BdAddr {
    pub addr: [u8; BD_ADDR_LEN],
}

// Verify struct size
const_assert_eq!(size_of::<BdAddr>(), 6);

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct InquiryResult {
    pub bd_addr: [u8; BD_ADDR_LEN],
    pub name: [u8; NAME_LEN],
    pub rssi: i8,
    _padding: u8,
    pub cod: U32,
    pub eir_len: U16,
    _padding2: [u8; 2],
    pub p_eir: Ptr<[u8]>,
}

// Verify struct size
const_assert_eq!(size_of::<InquiryResult>(), 60);

impl InquiryResult {
    pub fn new(
        bd_addr: [u8; BD_ADDR_LEN],
        name: [u8; NAME_LEN],
        rssi: i8,
        cod: u32,
        p_eir: Ptr<[u8]>,
        eir_len: u16,
    ) -> Self {
        Self {
            bd_addr,
            name,
            rssi,
            _padding: 0,
            cod: U32::new(cod),
            eir_len: U16::new(eir_len),
            _padding2: [0; 2],
            p_eir,
        }
    }
}

pub static INQUIRY_RESULT_SCHEMA: Schema = Schema {
    name: "InquiryResult",
    size: size_of::<InquiryResult>(),
    fields: &[Field::bytes(
        offset_of!(InquiryResult, p_eir),
        Len::u16(offset_of!(InquiryResult, eir_len)),
    )],
};

#[derive(Debug)]
pub enum BrGap {}

impl Profile for BrGap {
    const NAME: &'static str = "br_gap";
    const ACT_MAX: u16 = acts::MAX;
    const EVT_MAX: u16 = evts::MAX;
    const ACT_RET_SIZES: &'static [ActMemOption] = &[
        ActMemOption::new(acts::GET_DEVICE_ADDR, size_of::<BdAddr>() as u32),
        ActMemOption::new(acts::MAX, 0),
    ];
    const EVT_MEM_SIZES: &'static [EvtMemOption] = &[
        EvtMemOption::new(evts::INQUIRY_RESULT, size_of::<InquiryResult>() as u32),
        EvtMemOption::new(evts::ACL_CONN_IND, BD_ADDR_LEN as u32),
        EvtMemOption::new(evts::ACL_CONN_SUCCESS, BD_ADDR_LEN as u32),
        EvtMemOption::new(evts::ACL_DISCONN, BD_ADDR_LEN as u32),
        EvtMemOption::new(evts::MAX, 0),
    ];

    fn event_schema(evt: u16) -> Option<&'static Schema> {
        match evt {
            evts::INQUIRY_RESULT => Some(&INQUIRY_RESULT_SCHEMA),
            _ => None,
        }
    }

    fn copy_act_ret_param(
        act: u16,
        dst: &mut Arena,
        param: Ref<[u8]>,
        ret: &[u8],
    ) -> Result<(), CopyBackError> {
        match act {
            acts::GET_DEVICE_ADDR => copy_into(dst, param.cast::<BdAddr>(), ret),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PEER: [u8; BD_ADDR_LEN] = [0xA1, 0xA2, 0xA3, 0xA4, 0xA5, 0xA6];

    #[test]
    fn test_inquiry_result_round_trip() {
        let mut arena = Arena::new();
        let eir = arena.alloc_bytes(&[0x05, 0x09, b'r', b't', b'k', b'0']);
        let mut name = [0; NAME_LEN];
        name[..4].copy_from_slice(b"head");
        let ind = arena.alloc(&InquiryResult::new(PEER, name, -70, 0x240404, eir.into(), 6));

        let event = BrGap::push_event(evts::INQUIRY_RESULT, &arena, ind, 0).unwrap();
        assert_eq!(event.actual_size(), 60 + 8);

        let view = BrGap::pop_event(evts::INQUIRY_RESULT, event.payload()).unwrap();
        let root = view.root::<InquiryResult>().unwrap();
        assert_eq!(root.bd_addr, PEER);
        assert_eq!(root.cod.get(), 0x240404);
        assert_eq!(root.p_eir.get(), Some(Ref::from_offset(60)));
        assert_eq!(view.follow_slice(&root.p_eir, 6).unwrap()[2..5], *b"rtk");
    }

    #[test]
    fn test_acl_events_are_flat() {
        let mut arena = Arena::new();
        let addr = arena.alloc(&BdAddr { addr: PEER });
        let event = BrGap::push_event(evts::ACL_CONN_IND, &arena, addr, BD_ADDR_LEN).unwrap();
        assert_eq!(event.payload(), &PEER);
        assert_eq!(BrGap::evt_mem_size(evts::ACL_DISCONN), Some(6));
    }

    #[test]
    fn test_get_device_addr_copy_back() {
        let mut arena = Arena::new();
        let param = arena.alloc(&BdAddr { addr: [0; BD_ADDR_LEN] });

        assert_eq!(BrGap::act_ret_param_size(acts::GET_DEVICE_ADDR), 6);
        BrGap::copy_act_ret_param(acts::GET_DEVICE_ADDR, &mut arena, param.cast(), &PEER).unwrap();
        assert_eq!(arena.resolve(param).unwrap().addr, PEER);
    }
}
