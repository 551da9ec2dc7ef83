//! Common GAP parameters: L2CAP enhanced credit based channels.

use core::mem::offset_of;

use bt_ipc_marshal::{
    ActMemOption, Arena, CopyBackError, EvtMemOption, Field, Len, Profile, Ptr, Ref, Schema,
    table::copy_through,
};
use static_assertions::const_assert_eq;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, little_endian::*};

use crate::le_gap::BD_ADDR_LEN;

/// GAP action codes.
pub mod acts {
    pub const ECFC_SET_PARAM: u16 = 0x01;
    pub const ECFC_SEC_REG_REQ: u16 = 0x02;
    pub const ECFC_REGISTER: u16 = 0x03;
    pub const ECFC_CONN_REQ: u16 = 0x04;
    pub const ECFC_CONN_CFM: u16 = 0x05;
    pub const ECFC_DISCONN_REQ: u16 = 0x06;
    pub const ECFC_SEND_DATA: u16 = 0x07;
    pub const ECFC_RECONF_REQ: u16 = 0x08;
    pub const MAX: u16 = 0x09;
}

/// GAP event codes.
pub mod evts {
    pub const ECFC_CONN_CMPL_IND: u16 = 0x01;
    pub const ECFC_DATA_IND: u16 = 0x02;
    pub const ECFC_CONN_REQ_IND: u16 = 0x03;
    pub const ECFC_DISCONN_IND: u16 = 0x04;
    pub const ECFC_RECONF_REQ_IND: u16 = 0x05;
    pub const ECFC_RECONF_RSP_IND: u16 = 0x06;
    pub const MAX: u16 = 0x07;
}

pub const ECFC_MAX_CHANN_NUM: usize = 5;

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct EcfcRegister {
    pub psm: U16,
    pub is_le: u8,
    _padding: u8,
    /// Receives the protocol id
    pub p_proto_id: Ptr<U16>,
}

impl EcfcRegister {
    pub fn new(psm: u16, is_le: bool, p_proto_id: Ptr<U16>) -> Self {
        Self {
            psm: U16::new(psm),
            is_le: is_le.into(),
            _padding: 0,
            p_proto_id,
        }
    }
}

/// Parameter of [`acts::ECFC_SEND_DATA`].
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct EcfcSendData {
    pub conn_handle: U16,
    pub cid: U16,
    pub p_data: Ptr<[u8]>,
    pub length: U16,
    _padding: [u8; 2],
}

// Verify struct size
const_assert_eq!(size_of::<EcfcSendData>(), 12);

impl EcfcSendData {
    pub fn new(conn_handle: u16, cid: u16, p_data: Ptr<[u8]>, length: u16) -> Self {
        Self {
            conn_handle: U16::new(conn_handle),
            cid: U16::new(cid),
            p_data,
            length: U16::new(length),
            _padding: [0; 2],
        }
    }
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct EcfcConnCmplInd {
    pub proto_id: U16,
    pub err: U16,
    pub conn_handle: U16,
    pub remote_mtu: U16,
    pub local_mtu: U16,
    pub local_initial_credits: U16,
    pub bd_addr: [u8; BD_ADDR_LEN],
    pub bd_type: u8,
    pub cid_num: u8,
    pub cid: [U16; ECFC_MAX_CHANN_NUM],
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct EcfcDataInd {
    pub proto_id: U16,
    pub conn_handle: U16,
    pub cid: U16,
    pub length: U16,
    pub data: Ptr<[u8]>,
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct EcfcConnReqInd {
    pub proto_id: U16,
    pub conn_handle: U16,
    pub remote_mtu: U16,
    pub bd_addr: [u8; BD_ADDR_LEN],
    pub bd_type: u8,
    pub cid_num: u8,
    pub identity_id: u8,
    _padding: u8,
    pub cid: [U16; ECFC_MAX_CHANN_NUM],
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct EcfcDisconnInd {
    pub proto_id: U16,
    pub conn_handle: U16,
    pub cid: U16,
    pub cause: U16,
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct EcfcReconfReqInd {
    pub proto_id: U16,
    pub conn_handle: U16,
    pub remote_mtu: U16,
    pub cid_num: u8,
    _padding: u8,
    pub cid: [U16; ECFC_MAX_CHANN_NUM],
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct EcfcReconfRspInd {
    pub proto_id: U16,
    pub conn_handle: U16,
    pub cause: U16,
    pub local_mtu: U16,
    pub cid_num: u8,
    _padding: u8,
    pub cid: [U16; ECFC_MAX_CHANN_NUM],
}

pub static ECFC_SEND_DATA_SCHEMA: Schema = Schema {
    name: "EcfcSendData",
    size: size_of::<EcfcSendData>(),
    fields: &[Field::bytes(
        offset_of!(EcfcSendData, p_data),
        Len::u16(offset_of!(EcfcSendData, length)),
    )],
};

/// Common GAP profile.
#[derive(Debug)]
pub enum Gap {}

impl Profile for Gap {
    const NAME: &'static str = "gap";
    const ACT_MAX: u16 = acts::MAX;
    const EVT_MAX: u16 = evts::MAX;
    const ACT_RET_SIZES: &'static [ActMemOption] = &[
        ActMemOption::new(acts::ECFC_REGISTER, size_of::<u16>() as u32),
        ActMemOption::new(acts::MAX, 0),
    ];
    const EVT_MEM_SIZES: &'static [EvtMemOption] = &[
        EvtMemOption::new(evts::ECFC_CONN_CMPL_IND, size_of::<EcfcConnCmplInd>() as u32),
        EvtMemOption::new(evts::ECFC_DATA_IND, size_of::<EcfcDataInd>() as u32),
        EvtMemOption::new(evts::ECFC_CONN_REQ_IND, size_of::<EcfcConnReqInd>() as u32),
        EvtMemOption::new(evts::ECFC_DISCONN_IND, size_of::<EcfcDisconnInd>() as u32),
        EvtMemOption::new(evts::ECFC_RECONF_REQ_IND, size_of::<EcfcReconfReqInd>() as u32),
        EvtMemOption::new(evts::ECFC_RECONF_RSP_IND, size_of::<EcfcReconfRspInd>() as u32),
        EvtMemOption::new(evts::MAX, 0),
    ];

    fn cmd_schema(act: u16) -> Option<&'static Schema> {
        match act {
            acts::ECFC_SEND_DATA => Some(&ECFC_SEND_DATA_SCHEMA),
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
            acts::ECFC_REGISTER => {
                let out = dst.resolve(param.cast::<EcfcRegister>())?.p_proto_id;
                copy_through(dst, out, ret)
            }
            _ => Ok(()),
        }
    }
}
