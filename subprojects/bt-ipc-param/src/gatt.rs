//! GATT attribute model shared by the server and client profiles.
//!
//! A service is registered as a table of attributes. Each attribute points at
//! its type uuid and, depending on that type, at user data of a different
//! shape: a service uuid, a characteristic declaration (which points at the
//! characteristic uuid), an aggregate format handle list, and so on.

use core::mem::offset_of;

use bitflags::bitflags;
use bt_ipc_marshal::{Arm, Field, Frame, Len, Ptr, Schema, Tag, WalkError, Width};
use static_assertions::const_assert_eq;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, little_endian::*};

pub const BT_UUID_TYPE_16: u8 = 0;
pub const BT_UUID_TYPE_32: u8 = 1;
pub const BT_UUID_TYPE_128: u8 = 2;

/// 16-bit attribute types with a typed user data layout.
pub mod uuids {
    pub const PRIMARY: u16 = 0x2800;
    pub const SECONDARY: u16 = 0x2801;
    pub const INCLUDE: u16 = 0x2802;
    pub const CHRC: u16 = 0x2803;
    /// Characteristic Extended Properties
    pub const CEP: u16 = 0x2900;
    /// Characteristic User Description
    pub const CUD: u16 = 0x2901;
    /// Client Characteristic Configuration
    pub const CCC: u16 = 0x2902;
    /// Server Characteristic Configuration
    pub const SCC: u16 = 0x2903;
    /// Characteristic Presentation Format
    pub const CPF: u16 = 0x2904;
    /// Characteristic Aggregate Format
    pub const CAF: u16 = 0x2905;
}

/// 16-bit uuid.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct BtUuid16 {
    pub type_: u8,
    _padding: u8,
    pub val: U16,
}

// Verify struct size
const_assert_eq!(size_of::<BtUuid16>(), 4);

impl BtUuid16 {
    pub const fn new(val: u16) -> Self {
        Self {
            type_: BT_UUID_TYPE_16,
            _padding: 0,
            val: U16::new(val),
        }
    }
}

/// 128-bit uuid, little endian.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct BtUuid128 {
    pub type_: u8,
    pub val: [u8; 16],
}

// Verify struct size
const_assert_eq!(size_of::<BtUuid128>(), 17);

impl BtUuid128 {
    pub const fn new(val: [u8; 16]) -> Self {
        Self {
            type_: BT_UUID_TYPE_128,
            val,
        }
    }
}

/// One entry of a service's attribute table.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct GattAttr {
    /// Attribute type ([`BtUuid16`] or [`BtUuid128`])
    pub uuid: Ptr<[u8]>,
    /// Type dependent data, may be null
    pub user_data: Ptr<[u8]>,
    pub handle: U16,
    /// Length of `user_data` for attribute types without a fixed layout
    pub len: U16,
    pub perm: u8,
    pub flag: u8,
    _padding: [u8; 2],
}

// Verify struct size
const_assert_eq!(size_of::<GattAttr>(), 16);

impl GattAttr {
    pub fn new(uuid: Ptr<[u8]>, user_data: Ptr<[u8]>, len: u16, perm: u8) -> Self {
        Self {
            uuid,
            user_data,
            handle: U16::new(0),
            len: U16::new(len),
            perm,
            flag: 0,
            _padding: [0; 2],
        }
    }
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct GattService {
    pub type_: u8,
    _padding: u8,
    pub app_id: U16,
    pub attrs: Ptr<[GattAttr]>,
    pub attr_count: U32,
    pub server_info: U32,
}

// Verify struct size
const_assert_eq!(size_of::<GattService>(), 16);

impl GattService {
    pub fn new(app_id: u16, attrs: Ptr<[GattAttr]>, attr_count: u32) -> Self {
        Self {
            type_: 0,
            _padding: 0,
            app_id: U16::new(app_id),
            attrs,
            attr_count: U32::new(attr_count),
            server_info: U32::new(0),
        }
    }
}

bitflags! {
    /// Characteristic properties.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ChrcProperties: u8 {
        const BROADCAST = 1 << 0;
        const READ = 1 << 1;
        const WRITE_WITHOUT_RESP = 1 << 2;
        const WRITE = 1 << 3;
        const NOTIFY = 1 << 4;
        const INDICATE = 1 << 5;
        /// Authenticated signed writes
        const AUTH = 1 << 6;
        /// Extended properties descriptor present
        const EXT_PROP = 1 << 7;
    }
}

/// Characteristic declaration.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct Chrc {
    pub uuid: Ptr<[u8]>,
    pub value_handle: U16,
    properties: u8,
    _padding: u8,
}

// Verify struct size
const_assert_eq!(size_of::<Chrc>(), 8);

impl Chrc {
    pub fn new(uuid: Ptr<[u8]>, properties: ChrcProperties) -> Self {
        Self {
            uuid,
            value_handle: U16::new(0),
            properties: properties.bits(),
            _padding: 0,
        }
    }

    pub fn properties(&self) -> ChrcProperties {
        ChrcProperties::from_bits_retain(self.properties)
    }
}

/// Characteristic Extended Properties.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct Cep {
    pub properties: U16,
}

/// Server Characteristic Configuration.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct Scc {
    pub flags: U16,
}

/// Characteristic Presentation Format.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct Cpf {
    pub format: u8,
    pub exponent: i8,
    pub unit: U16,
    pub name_space: u8,
    _padding: u8,
    pub description: U16,
}

// Verify struct size
const_assert_eq!(size_of::<Cpf>(), 8);

/// Characteristic Aggregate Format: handles of the aggregated CPF attributes.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct Caf {
    pub count: U16,
    _padding: [u8; 2],
    pub handles: Ptr<[U16]>,
}

// Verify struct size
const_assert_eq!(size_of::<Caf>(), 8);

impl Caf {
    pub fn new(handles: Ptr<[U16]>, count: u16) -> Self {
        Self {
            count: U16::new(count),
            _padding: [0; 2],
            handles,
        }
    }
}

/// Size of the uuid whose type byte starts `uuid`.
///
/// 32-bit uuids are not carried across: their size is 0, so the pointer is
/// kept but nothing is copied. Unknown type bytes are an error.
pub fn uuid_size(uuid: &Frame<'_>) -> Result<usize, WalkError> {
    match uuid.u8(0)? {
        BT_UUID_TYPE_16 => Ok(size_of::<BtUuid16>()),
        BT_UUID_TYPE_32 => Ok(0),
        BT_UUID_TYPE_128 => Ok(size_of::<BtUuid128>()),
        value => Err(WalkError::InvalidDiscriminant {
            value: value.into(),
        }),
    }
}

fn uuid_len(_owner: &Frame<'_>, uuid: &Frame<'_>) -> Result<usize, WalkError> {
    uuid_size(uuid)
}

/// 16-bit type of the attribute at `attr`. 128-bit and missing types have
/// no typed user data.
fn attr_type(attr: &Frame<'_>) -> Result<Option<u32>, WalkError> {
    let Some(uuid) = attr.deref(offset_of!(GattAttr, uuid))? else {
        return Ok(None);
    };
    match uuid.u8(0)? {
        BT_UUID_TYPE_16 => Ok(Some(uuid.u16(offset_of!(BtUuid16, val))?.into())),
        _ => Ok(None),
    }
}

pub static CHRC_SCHEMA: Schema = Schema {
    name: "Chrc",
    size: size_of::<Chrc>(),
    fields: &[Field::bytes(offset_of!(Chrc, uuid), Len::With(uuid_len))],
};

pub static CAF_SCHEMA: Schema = Schema {
    name: "Caf",
    size: size_of::<Caf>(),
    fields: &[Field::bytes(
        offset_of!(Caf, handles),
        Len::scaled(offset_of!(Caf, count), Width::U16, size_of::<U16>()),
    )],
};

const USER_DATA: usize = offset_of!(GattAttr, user_data);

static USER_DATA_ARMS: [Arm; 10] = [
    Arm {
        value: uuids::PRIMARY as u32,
        fields: &[Field::bytes(USER_DATA, Len::With(uuid_len))],
    },
    Arm {
        value: uuids::SECONDARY as u32,
        fields: &[Field::bytes(USER_DATA, Len::With(uuid_len))],
    },
    Arm {
        value: uuids::INCLUDE as u32,
        fields: &[Field::bytes(USER_DATA, Len::Const(size_of::<GattService>()))],
    },
    Arm {
        value: uuids::CHRC as u32,
        fields: &[Field::one(USER_DATA, &CHRC_SCHEMA)],
    },
    Arm {
        value: uuids::CEP as u32,
        fields: &[Field::bytes(USER_DATA, Len::Const(size_of::<Cep>()))],
    },
    Arm {
        value: uuids::CUD as u32,
        fields: &[Field::bytes(USER_DATA, Len::CStr)],
    },
    Arm {
        value: uuids::CCC as u32,
        fields: &[Field::bytes(USER_DATA, Len::Const(0))],
    },
    Arm {
        value: uuids::SCC as u32,
        fields: &[Field::bytes(USER_DATA, Len::Const(size_of::<Scc>()))],
    },
    Arm {
        value: uuids::CPF as u32,
        fields: &[Field::bytes(USER_DATA, Len::Const(size_of::<Cpf>()))],
    },
    Arm {
        value: uuids::CAF as u32,
        fields: &[Field::one(USER_DATA, &CAF_SCHEMA)],
    },
];

/// Any other type: `len` opaque bytes.
static USER_DATA_DEFAULT: [Field; 1] = [Field::bytes(USER_DATA, Len::u16(offset_of!(GattAttr, len)))];

pub static ATTR_SCHEMA: Schema = Schema {
    name: "GattAttr",
    size: size_of::<GattAttr>(),
    fields: &[
        Field::bytes(offset_of!(GattAttr, uuid), Len::With(uuid_len)),
        Field::Switch {
            tag: Tag::With(attr_type),
            arms: &USER_DATA_ARMS,
            default: Some(&USER_DATA_DEFAULT),
        },
    ],
};

pub static SERVICE_SCHEMA: Schema = Schema {
    name: "GattService",
    size: size_of::<GattService>(),
    fields: &[Field::array(
        offset_of!(GattService, attrs),
        &ATTR_SCHEMA,
        Len::u32(offset_of!(GattService, attr_count)),
    )],
};
