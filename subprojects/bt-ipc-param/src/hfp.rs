//! HFP parameters.
//!
//! The hands-free and audio gateway roles share one code space. Only the SCO
//! payload of [`acts::SEND_SCO_DATA`] is deep copied.

use core::mem::offset_of;

use bt_ipc_marshal::{ActMemOption, EvtMemOption, Field, Len, Profile, Ptr, Schema};
use static_assertions::const_assert_eq;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, little_endian::*};

use crate::le_gap::BD_ADDR_LEN;

pub mod acts {
    pub const CONNECT: u16 = 0x01;
    pub const DISCONNECT: u16 = 0x02;
    pub const SCO_CONNECT: u16 = 0x03;
    pub const SCO_DISCONNECT: u16 = 0x04;
    pub const CALL_INCOMING: u16 = 0x05;
    pub const CALL_ANSWER: u16 = 0x06;
    pub const CALL_TERMINATE: u16 = 0x07;
    pub const SEND_SCO_DATA: u16 = 0x08;
    pub const MAX: u16 = 0x09;
}

pub mod evts {
    pub const SDP_ATTR_INFO: u16 = 0x01;
    pub const CONN_IND: u16 = 0x02;
    pub const CONN_CMPL: u16 = 0x03;
    pub const CALL_STATUS: u16 = 0x04;
    pub const CALLER_ID_IND: u16 = 0x05;
    pub const DISCONN_CMPL: u16 = 0x06;
    pub const SCO_CONN_IND: u16 = 0x07;
    pub const SCO_CONN_CMPL: u16 = 0x08;
    pub const SCO_DATA_IND: u16 = 0x09;
    pub const SCO_DISCONNECTED_IND: u16 = 0x0A;
    pub const AG_CONN_IND: u16 = 0x0B;
    pub const AG_CONN_CMPL: u16 = 0x0C;
    pub const AG_DISCONN_CMPL: u16 = 0x0D;
    pub const AG_INDICATORS_STATUS_REQ: u16 = 0x0E;
    pub const AG_CURR_CALLS_LIST_QUERY: u16 = 0x0F;
    pub const AG_DIAL_LAST_NUMBER: u16 = 0x10;
    pub const AG_CALL_ANSWER_REQ: u16 = 0x11;
    pub const AG_CALL_TERMINATE_REQ: u16 = 0x12;
    pub const AG_CALL_STATUS: u16 = 0x13;
    pub const MAX: u16 = 0x14;
}

pub const CALLER_ID_LEN: usize = 20;

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct ScoDataSend {
    pub bd_addr: [u8; BD_ADDR_LEN],
    pub seq_num: U16,
    pub buf: Ptr<[u8]>,
    pub len: U16,
    _padding: [u8; 2],
}

// Verify struct size
const_assert_eq!(size_of::<ScoDataSend>(), 16);

impl ScoDataSend {
    pub fn new(bd_addr: [u8; BD_ADDR_LEN], seq_num: u16, buf: Ptr<[u8]>, len: u16) -> Self {
        Self {
            bd_addr,
            seq_num: U16::new(seq_num),
            buf,
            len: U16::new(len),
            _padding: [0; 2],
        }
    }
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct SdpAttrInfo {
    pub bd_addr: [u8; BD_ADDR_LEN],
    pub srv_class_uuid_type: u8,
    pub server_channel: u8,
    pub srv_class_uuid_data: [u8; 16],
    pub supported_feat: U16,
    _padding: [u8; 2],
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct ConnInd {
    pub bd_addr: [u8; BD_ADDR_LEN],
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct DisconnInd {
    pub bd_addr: [u8; BD_ADDR_LEN],
    pub cause: U16,
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct CallStatusInd {
    pub bd_addr: [u8; BD_ADDR_LEN],
    pub prev_status: u8,
    pub curr_status: u8,
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct CallerIdInd {
    pub bd_addr: [u8; BD_ADDR_LEN],
    pub number: [u8; CALLER_ID_LEN],
    pub type_: u8,
    _padding: u8,
}

/// SCO codec negotiated on [`evts::SCO_CONN_CMPL`].
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct Codec {
    pub codec_type: u8,
    pub sample_rate: u8,
    pub bd_addr: [u8; BD_ADDR_LEN],
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct ScoDataInd {
    pub bd_addr: [u8; BD_ADDR_LEN],
    pub status: u8,
    _padding: u8,
    pub length: U16,
    _padding2: [u8; 2],
    /// Not deep copied: points into memory the receiver already owns
    pub data: Ptr<[u8]>,
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct AgIndicatorsStatusReq {
    pub bd_addr: [u8; BD_ADDR_LEN],
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct AgCurrCallsListQuery {
    pub bd_addr: [u8; BD_ADDR_LEN],
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct AgDialLastNumberInd {
    pub bd_addr: [u8; BD_ADDR_LEN],
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct AgCallAnswerReqInd {
    pub bd_addr: [u8; BD_ADDR_LEN],
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct AgCallTerminateReqInd {
    pub bd_addr: [u8; BD_ADDR_LEN],
}

pub static SCO_DATA_SEND_SCHEMA: Schema = Schema {
    name: "ScoDataSend",
    size: size_of::<ScoDataSend>(),
    fields: &[Field::bytes(
        offset_of!(ScoDataSend, buf),
        Len::u16(offset_of!(ScoDataSend, len)),
    )],
};

#[derive(Debug)]
pub enum Hfp {}

impl Profile for Hfp {
    const NAME: &'static str = "hfp";
    const ACT_MAX: u16 = acts::MAX;
    const EVT_MAX: u16 = evts::MAX;
    const ACT_RET_SIZES: &'static [ActMemOption] = &[ActMemOption::new(acts::MAX, 0)];
    const EVT_MEM_SIZES: &'static [EvtMemOption] = &[
        EvtMemOption::new(evts::SDP_ATTR_INFO, size_of::<SdpAttrInfo>() as u32),
        EvtMemOption::new(evts::CONN_IND, size_of::<ConnInd>() as u32),
        EvtMemOption::new(evts::CONN_CMPL, size_of::<ConnInd>() as u32),
        EvtMemOption::new(evts::CALL_STATUS, size_of::<CallStatusInd>() as u32),
        EvtMemOption::new(evts::CALLER_ID_IND, size_of::<CallerIdInd>() as u32),
        EvtMemOption::new(evts::DISCONN_CMPL, size_of::<DisconnInd>() as u32),
        EvtMemOption::new(evts::SCO_CONN_IND, size_of::<ConnInd>() as u32),
        EvtMemOption::new(evts::SCO_CONN_CMPL, size_of::<Codec>() as u32),
        EvtMemOption::new(evts::SCO_DATA_IND, size_of::<ScoDataInd>() as u32),
        EvtMemOption::new(evts::SCO_DISCONNECTED_IND, size_of::<DisconnInd>() as u32),
        EvtMemOption::new(evts::AG_CONN_IND, size_of::<ConnInd>() as u32),
        EvtMemOption::new(evts::AG_CONN_CMPL, size_of::<ConnInd>() as u32),
        EvtMemOption::new(evts::AG_DISCONN_CMPL, size_of::<DisconnInd>() as u32),
        EvtMemOption::new(
            evts::AG_INDICATORS_STATUS_REQ,
            size_of::<AgIndicatorsStatusReq>() as u32,
        ),
        EvtMemOption::new(
            evts::AG_CURR_CALLS_LIST_QUERY,
            size_of::<AgCurrCallsListQuery>() as u32,
        ),
        EvtMemOption::new(evts::AG_DIAL_LAST_NUMBER, size_of::<AgDialLastNumberInd>() as u32),
        EvtMemOption::new(evts::AG_CALL_ANSWER_REQ, size_of::<AgCallAnswerReqInd>() as u32),
        EvtMemOption::new(
            evts::AG_CALL_TERMINATE_REQ,
            size_of::<AgCallTerminateReqInd>() as u32,
        ),
        EvtMemOption::new(evts::AG_CALL_STATUS, size_of::<CallStatusInd>() as u32),
        EvtMemOption::new(evts::MAX, 0),
    ];

    fn cmd_schema(act: u16) -> Option<&'static Schema> {
        match act {
            acts::SEND_SCO_DATA => Some(&SCO_DATA_SEND_SCHEMA),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use bt_ipc_marshal::Arena;

    use super::*;

    const AG: [u8; BD_ADDR_LEN] = [0xC0, 0xC1, 0xC2, 0xC3, 0xC4, 0xC5];

    #[test]
    fn test_sco_data_round_trip() {
        let mut arena = Arena::new();
        let frame: [u8; 60] = core::array::from_fn(|i| i as u8);
        let buf = arena.alloc_bytes(&frame);
        let param = arena.alloc(&ScoDataSend::new(AG, 42, buf.into(), 60));

        let request = Hfp::push_cmd(acts::SEND_SCO_DATA, &arena, param, 0).unwrap();
        assert_eq!(request.actual_size(), 16 + 60);

        let view = Hfp::pop_cmd(acts::SEND_SCO_DATA, request.payload()).unwrap();
        let root = view.root::<ScoDataSend>().unwrap();
        assert_eq!(root.seq_num.get(), 42);
        assert_eq!(view.follow_slice(&root.buf, 60).unwrap(), &frame);
    }

    #[test]
    fn test_null_sco_buffer_stays_null() {
        let mut arena = Arena::new();
        let param = arena.alloc(&ScoDataSend::new(AG, 0, Ptr::null(), 0));

        let request = Hfp::push_cmd(acts::SEND_SCO_DATA, &arena, param, 0).unwrap();
        assert_eq!(request.actual_size(), 16);
        let view = Hfp::pop_cmd(acts::SEND_SCO_DATA, request.payload()).unwrap();
        assert!(view.root::<ScoDataSend>().unwrap().buf.is_null());
    }

    #[test]
    fn test_tables() {
        assert_eq!(Hfp::evt_mem_size(evts::CALLER_ID_IND), Some(28));
        assert_eq!(Hfp::evt_mem_size(evts::SCO_DATA_IND), Some(16));
        assert_eq!(Hfp::evt_mem_size(evts::AG_CALL_STATUS), Some(8));
        assert_eq!(Hfp::evt_mem_size(0x30), None);
    }
}
