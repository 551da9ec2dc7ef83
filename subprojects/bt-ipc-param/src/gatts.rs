//! GATT server parameters.

use core::mem::offset_of;

use bt_ipc_marshal::{ActMemOption, EvtMemOption, Field, Len, Profile, Ptr, Schema};
use static_assertions::const_assert_eq;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, little_endian::*};

use crate::gatt::SERVICE_SCHEMA;

/// GATT server action codes.
pub mod acts {
    pub const REGISTER_SERVICE: u16 = 0x01;
    pub const INDICATE: u16 = 0x02;
    pub const NOTIFY: u16 = 0x03;
    pub const READ_RSP: u16 = 0x04;
    pub const WRITE_RSP: u16 = 0x05;
    pub const MAX: u16 = 0x06;
}

/// GATT server event codes.
pub mod evts {
    pub const REGISTER_SERVICE: u16 = 0x01;
    pub const MTU_EXCHANGE: u16 = 0x02;
    pub const READ_IND: u16 = 0x03;
    pub const WRITE_IND: u16 = 0x04;
    pub const CCCD_IND: u16 = 0x05;
    pub const INDICATE_COMPLETE_IND: u16 = 0x06;
    pub const NOTIFY_COMPLETE_IND: u16 = 0x07;
    pub const CLIENT_SUPPORTED_FEATURES: u16 = 0x08;
    pub const MAX: u16 = 0x09;
}

/// Parameter of [`acts::NOTIFY`] and [`acts::INDICATE`].
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct NtfAndIndParam {
    pub app_id: U16,
    pub conn_handle: U16,
    /// Attribute index within the service
    pub index: U16,
    pub seq: U16,
    pub data: Ptr<[u8]>,
    pub len: U16,
    pub cid: U16,
}

// Verify struct size
const_assert_eq!(size_of::<NtfAndIndParam>(), 16);

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct ReadRspParam {
    pub app_id: U16,
    pub conn_handle: U16,
    pub cid: U16,
    pub index: U16,
    pub data: Ptr<[u8]>,
    pub len: U16,
    pub err_code: u8,
    _padding: u8,
}

// Verify struct size
const_assert_eq!(size_of::<ReadRspParam>(), 16);

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct WriteRspParam {
    pub app_id: U16,
    pub conn_handle: U16,
    pub cid: U16,
    pub index: U16,
    pub type_: u8,
    pub err_code: u8,
    _padding: [u8; 2],
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct RegSrvInd {
    pub app_id: U16,
    pub reg_status: U16,
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct MtuExchangeInd {
    pub result: U16,
    pub conn_handle: U16,
    pub mtu_size: U16,
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct ReadInd {
    pub app_id: U16,
    pub conn_handle: U16,
    pub cid: U16,
    pub index: U16,
    pub offset: U16,
}

/// Parameter of [`evts::WRITE_IND`].
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct WriteInd {
    pub app_id: U16,
    pub conn_handle: U16,
    pub cid: U16,
    pub index: U16,
    pub type_: u8,
    _padding: u8,
    pub len: U16,
    pub value: Ptr<[u8]>,
}

// Verify struct size
const_assert_eq!(size_of::<WriteInd>(), 16);

impl WriteInd {
    pub fn new(conn_handle: u16, index: u16, value: Ptr<[u8]>, len: u16) -> Self {
        Self {
            app_id: U16::new(0),
            conn_handle: U16::new(conn_handle),
            cid: U16::new(0),
            index: U16::new(index),
            type_: 0,
            _padding: 0,
            len: U16::new(len),
            value,
        }
    }
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct CccdInd {
    pub app_id: U16,
    pub conn_handle: U16,
    pub cid: U16,
    pub index: U16,
    pub value: U16,
}

/// Completion of a notification or indication.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct CmplInd {
    pub app_id: U16,
    pub conn_handle: U16,
    pub cid: U16,
    pub index: U16,
    pub seq: U16,
    pub err_code: U16,
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct ClientSupportedFeaturesInd {
    pub conn_handle: U16,
    pub features: u8,
    _padding: u8,
}

pub static NTF_AND_IND_SCHEMA: Schema = Schema {
    name: "NtfAndIndParam",
    size: size_of::<NtfAndIndParam>(),
    fields: &[Field::bytes(
        offset_of!(NtfAndIndParam, data),
        Len::u16(offset_of!(NtfAndIndParam, len)),
    )],
};

pub static READ_RSP_SCHEMA: Schema = Schema {
    name: "ReadRspParam",
    size: size_of::<ReadRspParam>(),
    fields: &[Field::bytes(
        offset_of!(ReadRspParam, data),
        Len::u16(offset_of!(ReadRspParam, len)),
    )],
};

pub static WRITE_IND_SCHEMA: Schema = Schema {
    name: "WriteInd",
    size: size_of::<WriteInd>(),
    fields: &[Field::bytes(
        offset_of!(WriteInd, value),
        Len::u16(offset_of!(WriteInd, len)),
    )],
};

/// GATT server profile.
#[derive(Debug)]
pub enum Gatts {}

impl Profile for Gatts {
    const NAME: &'static str = "gatts";
    const ACT_MAX: u16 = acts::MAX;
    const EVT_MAX: u16 = evts::MAX;
    const ACT_RET_SIZES: &'static [ActMemOption] = &[ActMemOption::new(acts::MAX, 0)];
    const EVT_MEM_SIZES: &'static [EvtMemOption] = &[
        EvtMemOption::new(evts::REGISTER_SERVICE, size_of::<RegSrvInd>() as u32),
        EvtMemOption::new(evts::MTU_EXCHANGE, size_of::<MtuExchangeInd>() as u32),
        EvtMemOption::new(evts::READ_IND, size_of::<ReadInd>() as u32),
        EvtMemOption::new(evts::WRITE_IND, size_of::<WriteInd>() as u32),
        EvtMemOption::new(evts::CCCD_IND, size_of::<CccdInd>() as u32),
        EvtMemOption::new(evts::INDICATE_COMPLETE_IND, size_of::<CmplInd>() as u32),
        EvtMemOption::new(evts::NOTIFY_COMPLETE_IND, size_of::<CmplInd>() as u32),
        EvtMemOption::new(
            evts::CLIENT_SUPPORTED_FEATURES,
            size_of::<ClientSupportedFeaturesInd>() as u32,
        ),
        EvtMemOption::new(evts::MAX, 0),
    ];

    fn cmd_schema(act: u16) -> Option<&'static Schema> {
        match act {
            acts::REGISTER_SERVICE => Some(&SERVICE_SCHEMA),
            acts::INDICATE | acts::NOTIFY => Some(&NTF_AND_IND_SCHEMA),
            acts::READ_RSP => Some(&READ_RSP_SCHEMA),
            _ => None,
        }
    }

    fn event_schema(evt: u16) -> Option<&'static Schema> {
        match evt {
            evts::WRITE_IND => Some(&WRITE_IND_SCHEMA),
            _ => None,
        }
    }
}
