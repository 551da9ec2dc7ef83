//! GATT client parameters.
//!
//! Read and find requests carry a C union selected by their `type_` field.
//! The union is kept as raw bytes on the wire and viewed through one struct
//! per arm, each padded to the full union size.

use core::mem::offset_of;

use bt_ipc_marshal::{
    ActMemOption, Arena, Arm, CopyBackError, EvtMemOption, Field, Len, Profile, Ptr, Ref, Schema,
    Tag, Width,
    table::{copy_into, copy_through, ret_at},
};
use static_assertions::const_assert_eq;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, little_endian::*};

use crate::gatts::MtuExchangeInd;

/// GATT client action codes.
pub mod acts {
    pub const REGISTER_PROFILE: u16 = 0x01;
    pub const UNREGISTER_PROFILE: u16 = 0x02;
    pub const EXCHANGE_MTU: u16 = 0x03;
    pub const DISCOVER: u16 = 0x04;
    pub const READ: u16 = 0x05;
    pub const WRITE: u16 = 0x06;
    pub const CCCD_ENABLE: u16 = 0x07;
    pub const CCCD_DISABLE: u16 = 0x08;
    pub const CONFIRM: u16 = 0x09;
    pub const FIND: u16 = 0x0A;
    pub const MAX: u16 = 0x0B;
}

/// GATT client event codes.
pub mod evts {
    pub const DISCOVER_RESULT_IND: u16 = 0x01;
    pub const READ_RESULT_IND: u16 = 0x02;
    pub const WRITE_RESULT_IND: u16 = 0x03;
    pub const NOTIFY_IND: u16 = 0x04;
    pub const INDICATE_IND: u16 = 0x05;
    pub const CCCD_ENABLE_IND: u16 = 0x06;
    pub const CCCD_DISABLE_IND: u16 = 0x07;
    pub const MTU_EXCHANGE: u16 = 0x08;
    pub const MAX: u16 = 0x09;
}

/// Read types, the `type_` of [`ReadParam`] and [`ReadInd`].
pub mod read_type {
    pub const BY_HANDLE: u32 = 0;
    pub const BY_UUID: u32 = 1;
    pub const MULTIPLE: u32 = 2;
    pub const MULTIPLE_VARIABLE: u32 = 3;
}

/// Find types, the `type_` of [`FindParam`].
pub mod find_type {
    pub const CHARACTERISTIC_HANDLE: u32 = 0;
    pub const CHARACTERISTIC_DESC_RANGE: u32 = 1;
    pub const CHARACTERISTIC_CCCD_HANDLE: u32 = 2;
    pub const INCLUDE_SERVICE: u32 = 3;
}

pub const READ_UNION_SIZE: usize = 24;
pub const FIND_UNION_SIZE: usize = 60;
pub const INCLUDE_INSTANCE_MAX: usize = 20;

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct GattcUuid {
    pub is_uuid16: u8,
    pub instance_id: u8,
    /// uuid16 in the first two bytes, or a full uuid128
    pub p: [u8; 16],
}

// Verify struct size
const_assert_eq!(size_of::<GattcUuid>(), 18);

impl GattcUuid {
    pub const fn uuid16(uuid: u16, instance_id: u8) -> Self {
        let le = uuid.to_le_bytes();
        let mut p = [0; 16];
        p[0] = le[0];
        p[1] = le[1];
        Self {
            is_uuid16: 1,
            instance_id,
            p,
        }
    }
}

/// Parameter of [`acts::READ`].
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct ReadParam {
    pub profile_id: U16,
    pub conn_handle: U16,
    pub seq: U16,
    _padding: [u8; 2],
    /// One of [`read_type`]
    pub type_: U32,
    data: [u8; READ_UNION_SIZE],
}

// Verify struct size
const_assert_eq!(size_of::<ReadParam>(), 36);

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct ReadByHandle {
    pub handle: U16,
    _padding: [u8; 22],
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct ReadByUuid {
    pub start_handle: U16,
    pub end_handle: U16,
    pub uuid: [u8; 16],
    pub uuid_type: U32,
}

/// Arm of [`read_type::MULTIPLE`] and [`read_type::MULTIPLE_VARIABLE`].
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct ReadMultiple {
    pub handle_count: U32,
    pub handles: Ptr<[U16]>,
    _padding: [u8; 16],
}

const_assert_eq!(size_of::<ReadByHandle>(), READ_UNION_SIZE);
const_assert_eq!(size_of::<ReadByUuid>(), READ_UNION_SIZE);
const_assert_eq!(size_of::<ReadMultiple>(), READ_UNION_SIZE);

impl ReadParam {
    fn with(conn_handle: u16, type_: u32, data: [u8; READ_UNION_SIZE]) -> Self {
        Self {
            profile_id: U16::new(0),
            conn_handle: U16::new(conn_handle),
            seq: U16::new(0),
            _padding: [0; 2],
            type_: U32::new(type_),
            data,
        }
    }

    pub fn by_handle(conn_handle: u16, handle: u16) -> Self {
        let arm = ReadByHandle {
            handle: U16::new(handle),
            _padding: [0; 22],
        };
        Self::with(conn_handle, read_type::BY_HANDLE, zerocopy::transmute!(arm))
    }

    pub fn by_uuid(conn_handle: u16, arm: ReadByUuid) -> Self {
        Self::with(conn_handle, read_type::BY_UUID, zerocopy::transmute!(arm))
    }

    /// `type_` is [`read_type::MULTIPLE`] or [`read_type::MULTIPLE_VARIABLE`].
    pub fn multiple(conn_handle: u16, type_: u32, handles: Ptr<[U16]>, handle_count: u32) -> Self {
        let arm = ReadMultiple {
            handle_count: U32::new(handle_count),
            handles,
            _padding: [0; 16],
        };
        Self::with(conn_handle, type_, zerocopy::transmute!(arm))
    }

    pub fn as_by_handle(&self) -> &ReadByHandle {
        zerocopy::transmute_ref!(&self.data)
    }

    pub fn as_by_uuid(&self) -> &ReadByUuid {
        zerocopy::transmute_ref!(&self.data)
    }

    pub fn as_multiple(&self) -> &ReadMultiple {
        zerocopy::transmute_ref!(&self.data)
    }
}

/// Parameter of [`acts::WRITE`].
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct WriteParam {
    pub profile_id: U16,
    pub conn_handle: U16,
    pub seq: U16,
    _padding: [u8; 2],
    pub type_: U32,
    pub handle: U16,
    pub length: U16,
    pub data: Ptr<[u8]>,
}

// Verify struct size
const_assert_eq!(size_of::<WriteParam>(), 20);

impl WriteParam {
    pub fn new(conn_handle: u16, type_: u32, handle: u16, data: Ptr<[u8]>, length: u16) -> Self {
        Self {
            profile_id: U16::new(0),
            conn_handle: U16::new(conn_handle),
            seq: U16::new(0),
            _padding: [0; 2],
            type_: U32::new(type_),
            handle: U16::new(handle),
            length: U16::new(length),
            data,
        }
    }
}

/// Parameter of [`acts::FIND`].
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct FindParam {
    pub conn_handle: U16,
    _padding: [u8; 2],
    /// One of [`find_type`]
    pub type_: U32,
    data: [u8; FIND_UNION_SIZE],
}

// Verify struct size
const_assert_eq!(size_of::<FindParam>(), 68);

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct FindChar {
    pub srv_uuid: GattcUuid,
    pub char_uuid: GattcUuid,
    pub p_handle: Ptr<U16>,
    _padding: [u8; 20],
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct FindCharRange {
    pub srv_uuid: GattcUuid,
    pub char_uuid: GattcUuid,
    pub p_handle_start: Ptr<U16>,
    pub p_handle_end: Ptr<U16>,
    _padding: [u8; 16],
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct FindCharCccd {
    pub srv_uuid: GattcUuid,
    pub char_uuid: GattcUuid,
    pub p_handle: Ptr<U16>,
    pub p_notify: Ptr<u8>,
    pub p_indicate: Ptr<u8>,
    _padding: [u8; 12],
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct FindIncludeSrv {
    pub primary_uuid: GattcUuid,
    pub include_uuid: GattcUuid,
    pub p_instance_num: Ptr<u8>,
    /// Filled in place by the copy-back
    pub instance_id: [u8; INCLUDE_INSTANCE_MAX],
}

const_assert_eq!(size_of::<FindChar>(), FIND_UNION_SIZE);
const_assert_eq!(size_of::<FindCharRange>(), FIND_UNION_SIZE);
const_assert_eq!(size_of::<FindCharCccd>(), FIND_UNION_SIZE);
const_assert_eq!(size_of::<FindIncludeSrv>(), FIND_UNION_SIZE);

impl FindChar {
    pub fn new(srv_uuid: GattcUuid, char_uuid: GattcUuid, p_handle: Ptr<U16>) -> Self {
        Self {
            srv_uuid,
            char_uuid,
            p_handle,
            _padding: [0; 20],
        }
    }
}

impl FindCharRange {
    pub fn new(
        srv_uuid: GattcUuid,
        char_uuid: GattcUuid,
        p_handle_start: Ptr<U16>,
        p_handle_end: Ptr<U16>,
    ) -> Self {
        Self {
            srv_uuid,
            char_uuid,
            p_handle_start,
            p_handle_end,
            _padding: [0; 16],
        }
    }
}

impl FindCharCccd {
    pub fn new(
        srv_uuid: GattcUuid,
        char_uuid: GattcUuid,
        p_handle: Ptr<U16>,
        p_notify: Ptr<u8>,
        p_indicate: Ptr<u8>,
    ) -> Self {
        Self {
            srv_uuid,
            char_uuid,
            p_handle,
            p_notify,
            p_indicate,
            _padding: [0; 12],
        }
    }
}

impl FindParam {
    fn with(conn_handle: u16, type_: u32, data: [u8; FIND_UNION_SIZE]) -> Self {
        Self {
            conn_handle: U16::new(conn_handle),
            _padding: [0; 2],
            type_: U32::new(type_),
            data,
        }
    }

    pub fn find_char(conn_handle: u16, arm: FindChar) -> Self {
        Self::with(conn_handle, find_type::CHARACTERISTIC_HANDLE, zerocopy::transmute!(arm))
    }

    pub fn find_char_range(conn_handle: u16, arm: FindCharRange) -> Self {
        Self::with(conn_handle, find_type::CHARACTERISTIC_DESC_RANGE, zerocopy::transmute!(arm))
    }

    pub fn find_char_cccd(conn_handle: u16, arm: FindCharCccd) -> Self {
        Self::with(conn_handle, find_type::CHARACTERISTIC_CCCD_HANDLE, zerocopy::transmute!(arm))
    }

    pub fn find_include_srv(conn_handle: u16, arm: FindIncludeSrv) -> Self {
        Self::with(conn_handle, find_type::INCLUDE_SERVICE, zerocopy::transmute!(arm))
    }

    pub fn as_find_char(&self) -> &FindChar {
        zerocopy::transmute_ref!(&self.data)
    }

    pub fn as_find_char_range(&self) -> &FindCharRange {
        zerocopy::transmute_ref!(&self.data)
    }

    pub fn as_find_char_cccd(&self) -> &FindCharCccd {
        zerocopy::transmute_ref!(&self.data)
    }

    pub fn as_find_include_srv(&self) -> &FindIncludeSrv {
        zerocopy::transmute_ref!(&self.data)
    }
}

impl FindIncludeSrv {
    pub fn new(primary_uuid: GattcUuid, include_uuid: GattcUuid, p_instance_num: Ptr<u8>) -> Self {
        Self {
            primary_uuid,
            include_uuid,
            p_instance_num,
            instance_id: [0; INCLUDE_INSTANCE_MAX],
        }
    }
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct DiscoverInd {
    pub profile_id: U16,
    pub conn_handle: U16,
    pub seq: U16,
    _padding: [u8; 2],
    pub type_: U32,
    pub status: U32,
    pub err_code: U16,
    _padding2: [u8; 2],
    /// Per-type discovery result
    pub data: [u8; 24],
}

/// Parameter of [`evts::READ_RESULT_IND`].
///
/// Every read type reports `{handle, len, value}` at the same place.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct ReadInd {
    pub profile_id: U16,
    pub conn_handle: U16,
    pub seq: U16,
    _padding: [u8; 2],
    pub type_: U32,
    pub status: U32,
    pub err_code: U16,
    _padding2: [u8; 2],
    pub handle: U16,
    pub len: U16,
    pub value: Ptr<[u8]>,
}

// Verify struct size
const_assert_eq!(size_of::<ReadInd>(), 28);

impl ReadInd {
    pub fn new(conn_handle: u16, type_: u32, handle: u16, value: Ptr<[u8]>, len: u16) -> Self {
        Self {
            profile_id: U16::new(0),
            conn_handle: U16::new(conn_handle),
            seq: U16::new(0),
            _padding: [0; 2],
            type_: U32::new(type_),
            status: U32::new(0),
            err_code: U16::new(0),
            _padding2: [0; 2],
            handle: U16::new(handle),
            len: U16::new(len),
            value,
        }
    }
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct WriteInd {
    pub profile_id: U16,
    pub conn_handle: U16,
    pub seq: U16,
    _padding: [u8; 2],
    pub type_: U32,
    pub status: U32,
    pub err_code: U16,
    pub handle: U16,
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct CccdUpdateInd {
    pub profile_id: U16,
    pub conn_handle: U16,
    pub seq: U16,
    _padding: [u8; 2],
    pub status: U32,
    pub err_code: U16,
    pub cccd_handle: U16,
    pub bnotify: u8,
    pub bindicate: u8,
    _padding2: [u8; 2],
}

/// Parameter of [`evts::NOTIFY_IND`] and [`evts::INDICATE_IND`].
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct CccdValueInd {
    pub profile_id: U16,
    pub conn_handle: U16,
    pub value_handle: U16,
    pub len: U16,
    pub value: Ptr<[u8]>,
}

// Verify struct size
const_assert_eq!(size_of::<CccdValueInd>(), 12);

const READ_UNION: usize = offset_of!(ReadParam, data);

static NO_FIELDS: [Field; 0] = [];

static READ_HANDLES: [Field; 1] = [Field::bytes(
    READ_UNION + offset_of!(ReadMultiple, handles),
    Len::scaled(
        READ_UNION + offset_of!(ReadMultiple, handle_count),
        Width::U32,
        size_of::<U16>(),
    ),
)];

pub static READ_PARAM_SCHEMA: Schema = Schema {
    name: "ReadParam",
    size: size_of::<ReadParam>(),
    fields: &[Field::Switch {
        tag: Tag::Field {
            at: offset_of!(ReadParam, type_),
            width: Width::U32,
        },
        arms: &[
            Arm {
                value: read_type::MULTIPLE,
                fields: &READ_HANDLES,
            },
            Arm {
                value: read_type::MULTIPLE_VARIABLE,
                fields: &READ_HANDLES,
            },
        ],
        default: Some(&NO_FIELDS),
    }],
};

pub static WRITE_PARAM_SCHEMA: Schema = Schema {
    name: "WriteParam",
    size: size_of::<WriteParam>(),
    fields: &[Field::bytes(
        offset_of!(WriteParam, data),
        Len::u16(offset_of!(WriteParam, length)),
    )],
};

static READ_RESULT_VALUE: [Field; 1] = [Field::bytes(
    offset_of!(ReadInd, value),
    Len::u16(offset_of!(ReadInd, len)),
)];

/// Unknown read types are rejected rather than copied flat.
pub static READ_IND_SCHEMA: Schema = Schema {
    name: "ReadInd",
    size: size_of::<ReadInd>(),
    fields: &[Field::Switch {
        tag: Tag::Field {
            at: offset_of!(ReadInd, type_),
            width: Width::U32,
        },
        arms: &[
            Arm {
                value: read_type::BY_HANDLE,
                fields: &READ_RESULT_VALUE,
            },
            Arm {
                value: read_type::BY_UUID,
                fields: &READ_RESULT_VALUE,
            },
            Arm {
                value: read_type::MULTIPLE,
                fields: &READ_RESULT_VALUE,
            },
            Arm {
                value: read_type::MULTIPLE_VARIABLE,
                fields: &READ_RESULT_VALUE,
            },
        ],
        default: None,
    }],
};

pub static CCCD_VALUE_IND_SCHEMA: Schema = Schema {
    name: "CccdValueInd",
    size: size_of::<CccdValueInd>(),
    fields: &[Field::bytes(
        offset_of!(CccdValueInd, value),
        Len::u16(offset_of!(CccdValueInd, len)),
    )],
};

/// GATT client profile.
#[derive(Debug)]
pub enum Gattc {}

impl Profile for Gattc {
    const NAME: &'static str = "gattc";
    const ACT_MAX: u16 = acts::MAX;
    const EVT_MAX: u16 = evts::MAX;
    // instance count plus the instance id array
    const ACT_RET_SIZES: &'static [ActMemOption] = &[
        ActMemOption::new(acts::FIND, 1 + INCLUDE_INSTANCE_MAX as u32),
        ActMemOption::new(acts::MAX, 0),
    ];
    const EVT_MEM_SIZES: &'static [EvtMemOption] = &[
        EvtMemOption::new(evts::DISCOVER_RESULT_IND, size_of::<DiscoverInd>() as u32),
        EvtMemOption::new(evts::READ_RESULT_IND, size_of::<ReadInd>() as u32),
        EvtMemOption::new(evts::WRITE_RESULT_IND, size_of::<WriteInd>() as u32),
        EvtMemOption::new(evts::CCCD_ENABLE_IND, size_of::<CccdUpdateInd>() as u32),
        EvtMemOption::new(evts::CCCD_DISABLE_IND, size_of::<CccdUpdateInd>() as u32),
        EvtMemOption::new(evts::NOTIFY_IND, size_of::<CccdValueInd>() as u32),
        EvtMemOption::new(evts::INDICATE_IND, size_of::<CccdValueInd>() as u32),
        EvtMemOption::new(evts::MTU_EXCHANGE, size_of::<MtuExchangeInd>() as u32),
        EvtMemOption::new(evts::MAX, 0),
    ];

    fn cmd_schema(act: u16) -> Option<&'static Schema> {
        match act {
            acts::READ => Some(&READ_PARAM_SCHEMA),
            acts::WRITE => Some(&WRITE_PARAM_SCHEMA),
            _ => None,
        }
    }

    fn event_schema(evt: u16) -> Option<&'static Schema> {
        match evt {
            evts::READ_RESULT_IND => Some(&READ_IND_SCHEMA),
            evts::NOTIFY_IND | evts::INDICATE_IND => Some(&CCCD_VALUE_IND_SCHEMA),
            _ => None,
        }
    }

    fn copy_act_ret_param(
        act: u16,
        dst: &mut Arena,
        param: Ref<[u8]>,
        ret: &[u8],
    ) -> Result<(), CopyBackError> {
        if act != acts::FIND {
            return Ok(());
        }
        let find = *dst.resolve(param.cast::<FindParam>())?;
        match find.type_.get() {
            find_type::CHARACTERISTIC_HANDLE => {
                copy_through(dst, find.as_find_char().p_handle, ret)
            }
            find_type::CHARACTERISTIC_DESC_RANGE => {
                let range = find.as_find_char_range();
                copy_through(dst, range.p_handle_start, ret_at(ret, 0, 2)?)?;
                copy_through(dst, range.p_handle_end, ret_at(ret, 2, 2)?)
            }
            find_type::CHARACTERISTIC_CCCD_HANDLE => {
                let cccd = find.as_find_char_cccd();
                copy_through(dst, cccd.p_handle, ret_at(ret, 0, 2)?)?;
                copy_through(dst, cccd.p_notify, ret_at(ret, 2, 1)?)?;
                copy_through(dst, cccd.p_indicate, ret_at(ret, 3, 1)?)
            }
            find_type::INCLUDE_SERVICE => {
                copy_through(dst, find.as_find_include_srv().p_instance_num, ret_at(ret, 0, 1)?)?;
                let instance_id = param.field::<[u8; INCLUDE_INSTANCE_MAX]>(
                    offset_of!(FindParam, data) + offset_of!(FindIncludeSrv, instance_id),
                );
                copy_into(dst, instance_id, ret_at(ret, 1, INCLUDE_INSTANCE_MAX)?)
            }
            other => {
                warn!("gattc find: bad type {}", other);
                Ok(())
            }
        }
    }
}
