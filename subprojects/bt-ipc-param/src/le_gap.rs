//! LE GAP parameters.
//!
//! Most LE GAP actions are flat. The ones that carry advertising or filter
//! payloads are deep copied, and the getters copy their result back either
//! into the parameter itself or through its out pointers.

use core::mem::offset_of;

use bt_ipc_marshal::{
    ActMemOption, Arena, CopyBackError, EvtMemOption, Field, Len, Profile, Ptr, Ref, Schema,
    table::{copy_into, copy_slice_through, copy_through, ret_at},
};
use static_assertions::const_assert_eq;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, little_endian::*};

/// LE GAP action codes.
pub mod acts {
    pub const GET_VERSION: u16 = 0x01;
    pub const GET_DEVICE_ADDR: u16 = 0x02;
    pub const SET_ADV_DATA: u16 = 0x03;
    pub const START_ADV: u16 = 0x04;
    pub const STOP_ADV: u16 = 0x05;
    pub const SCAN_INFO_FILTER: u16 = 0x06;
    pub const START_SCAN: u16 = 0x07;
    pub const STOP_SCAN: u16 = 0x08;
    pub const CONNECT: u16 = 0x09;
    pub const DISCONNECT: u16 = 0x0A;
    pub const READ_RSSI: u16 = 0x0B;
    pub const GET_BOND_NUM: u16 = 0x0C;
    pub const GET_BOND_INFO: u16 = 0x0D;
    pub const GET_CONN_INFO: u16 = 0x0E;
    pub const GET_DEV_STATE: u16 = 0x0F;
    pub const GET_ACTIVE_CONN: u16 = 0x10;
    pub const GET_CONN_HANDLE_BY_ADDR: u16 = 0x11;
    pub const GET_MTU_SIZE: u16 = 0x12;
    pub const GET_TX_PENDING_NUM: u16 = 0x13;
    pub const VENDOR_CMD_REQ: u16 = 0x14;
    pub const CREATE_EXT_ADV: u16 = 0x15;
    pub const SET_EXT_ADV_DATA: u16 = 0x16;
    pub const SET_EXT_SCAN_RSP_DATA: u16 = 0x17;
    pub const START_EXT_ADV: u16 = 0x18;
    pub const STOP_EXT_ADV: u16 = 0x19;
    pub const START_PA: u16 = 0x1A;
    pub const STOP_PA: u16 = 0x1B;
    pub const UPDATE_PA: u16 = 0x1C;
    pub const PA_SYNC_CREATE: u16 = 0x1D;
    pub const PA_SYNC_TERMINATE: u16 = 0x1E;
    pub const PA_SYNC_GET_PARAM: u16 = 0x1F;
    pub const READ_LOCAL_TX_POWER: u16 = 0x20;
    pub const MAX: u16 = 0x21;
}

/// LE GAP event codes.
pub mod evts {
    pub const ADV_START_IND: u16 = 0x01;
    pub const ADV_STOP_IND: u16 = 0x02;
    pub const CONNECT_IND: u16 = 0x03;
    pub const DISCONN_IND: u16 = 0x04;
    pub const SCAN_START_IND: u16 = 0x05;
    pub const SCAN_RES_IND: u16 = 0x06;
    pub const SCAN_STOP_IND: u16 = 0x07;
    pub const CONN_UPDATE_IND: u16 = 0x08;
    pub const PHY_UPDATE_IND: u16 = 0x09;
    pub const AUTH_COMPLETE_IND: u16 = 0x0A;
    pub const EXT_ADV_IND: u16 = 0x0B;
    pub const EXT_SCAN_RES_IND: u16 = 0x0C;
    pub const PA_SYNC_STATE_IND: u16 = 0x0D;
    pub const PA_ADV_REPORT_IND: u16 = 0x0E;
    pub const MAX: u16 = 0x0F;
}

pub const BD_ADDR_LEN: usize = 6;
pub const MAX_LINKS: usize = 4;

/// Parameter types of [`acts::PA_SYNC_GET_PARAM`].
pub mod pa_sync_param {
    pub const PERIODIC_ADV_LIST_SIZE: u8 = 0;
    pub const DEV_STATE: u8 = 1;
    pub const SYNCHRONIZED_PARAM: u8 = 2;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct LeAddr {
    pub type_: u8,
    pub addr_val: [u8; BD_ADDR_LEN],
}

// Verify struct size
const_assert_eq!(size_of::<LeAddr>(), 7);

impl LeAddr {
    pub const fn new(type_: u8, addr_val: [u8; BD_ADDR_LEN]) -> Self {
        Self { type_, addr_val }
    }
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct VersionInfo {
    pub hci_revision: U16,
    pub lmp_subversion: U16,
    pub btgap_revision: U16,
    pub btgap_buildnum: U16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct BondInfo {
    pub addr: LeAddr,
    pub is_connected: u8,
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct ConnInfo {
    pub role: u8,
    pub remote: LeAddr,
    pub interval: U16,
    pub latency: U16,
    pub timeout: U16,
    pub tx_phy: u8,
    pub rx_phy: u8,
}

// Verify struct size
const_assert_eq!(size_of::<ConnInfo>(), 16);

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct DevState {
    pub gap_init_state: u8,
    pub gap_adv_state: u8,
    pub gap_scan_state: u8,
    pub gap_conn_state: u8,
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct ActiveConn {
    pub conn_handle: [U16; MAX_LINKS],
    pub conn_num: U16,
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct ReadRssiParam {
    pub conn_handle: U16,
    _padding: [u8; 2],
    pub p_rssi: Ptr<i8>,
}

impl ReadRssiParam {
    pub fn new(conn_handle: u16, p_rssi: Ptr<i8>) -> Self {
        Self {
            conn_handle: U16::new(conn_handle),
            _padding: [0; 2],
            p_rssi,
        }
    }
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct GetConnInfoParam {
    pub conn_handle: U16,
    _padding: [u8; 2],
    pub p_conn_info: Ptr<ConnInfo>,
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct GetBondInfoParam {
    pub p_bond_info: Ptr<[BondInfo]>,
    pub p_size: Ptr<u8>,
    /// Capacity of `p_bond_info`
    pub size: u8,
    _padding: [u8; 3],
}

// Verify struct size
const_assert_eq!(size_of::<GetBondInfoParam>(), 12);

impl GetBondInfoParam {
    pub fn new(p_bond_info: Ptr<[BondInfo]>, p_size: Ptr<u8>, size: u8) -> Self {
        Self {
            p_bond_info,
            p_size,
            size,
            _padding: [0; 3],
        }
    }
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct GetConnHandleByAddrParam {
    pub addr: LeAddr,
    _padding: u8,
    pub p_conn_handle: Ptr<U16>,
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct GetMtuSizeParam {
    pub conn_handle: U16,
    _padding: [u8; 2],
    pub p_mtu_size: Ptr<U16>,
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct GetTxPendingNumParam {
    pub conn_handle: U16,
    _padding: [u8; 2],
    pub p_tx_pending_num: Ptr<U16>,
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct PaSyncCreate {
    pub options: u8,
    pub sync_cte_type: u8,
    pub adv_sid: u8,
    pub adv_addr: LeAddr,
    pub skip: U16,
    pub sync_timeout: U16,
    _padding: [u8; 2],
    pub p_sync_id: Ptr<u8>,
}

// Verify struct size
const_assert_eq!(size_of::<PaSyncCreate>(), 20);

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct PaSyncGetParam {
    /// One of [`pa_sync_param`]
    pub type_: u8,
    pub sync_id: u8,
    _padding: [u8; 2],
    pub p_value: Ptr<[u8]>,
}

impl PaSyncGetParam {
    pub fn new(type_: u8, sync_id: u8, p_value: Ptr<[u8]>) -> Self {
        Self {
            type_,
            sync_id,
            _padding: [0; 2],
            p_value,
        }
    }
}

/// Value of [`pa_sync_param::SYNCHRONIZED_PARAM`].
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct PaSyncSyncParam {
    pub sync_handle: U16,
    pub adv_sid: u8,
    pub adv_addr: LeAddr,
    pub skip: U16,
    pub sync_timeout: U16,
    pub sync_cte_type: u8,
    pub adv_phy: u8,
    pub adv_clock_accuracy: u8,
    pub periodic_adv_interval: U16,
    _padding: u8,
}

// Verify struct size
const_assert_eq!(size_of::<PaSyncSyncParam>(), 20);

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct TxPowerReadLocal {
    pub conn_handle: U16,
    pub phy: u8,
    _padding: u8,
    pub cur_txpower: Ptr<i8>,
    pub max_txpower: Ptr<i8>,
}

impl TxPowerReadLocal {
    pub fn new(conn_handle: u16, phy: u8, cur_txpower: Ptr<i8>, max_txpower: Ptr<i8>) -> Self {
        Self {
            conn_handle: U16::new(conn_handle),
            phy,
            _padding: 0,
            cur_txpower,
            max_txpower,
        }
    }
}

/// Parameter of [`acts::SCAN_INFO_FILTER`].
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct ScanInfoFilterParam {
    pub enable: u8,
    /// Start of the compared range within the scan info
    pub offset: u8,
    pub len: u8,
    _padding: u8,
    pub p_filter: Ptr<[u8]>,
}

// Verify struct size
const_assert_eq!(size_of::<ScanInfoFilterParam>(), 8);

impl ScanInfoFilterParam {
    pub fn new(offset: u8, p_filter: Ptr<[u8]>, len: u8) -> Self {
        Self {
            enable: 1,
            offset,
            len,
            _padding: 0,
            p_filter,
        }
    }
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct VendorCmdParam {
    pub op: U16,
    pub len: u8,
    _padding: u8,
    pub cmd_param: Ptr<[u8]>,
}

impl VendorCmdParam {
    pub fn new(op: u16, cmd_param: Ptr<[u8]>, len: u8) -> Self {
        Self {
            op: U16::new(op),
            len,
            _padding: 0,
            cmd_param,
        }
    }
}

/// Parameter of [`acts::SET_EXT_ADV_DATA`] and [`acts::SET_EXT_SCAN_RSP_DATA`].
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct ExtAdvData {
    pub idx: u8,
    _padding: [u8; 3],
    pub pdata: Ptr<[u8]>,
    pub len: U16,
    _padding2: [u8; 2],
}

// Verify struct size
const_assert_eq!(size_of::<ExtAdvData>(), 12);

impl ExtAdvData {
    pub fn new(idx: u8, pdata: Ptr<[u8]>, len: u16) -> Self {
        Self {
            idx,
            _padding: [0; 3],
            pdata,
            len: U16::new(len),
            _padding2: [0; 2],
        }
    }
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct PaParam {
    pub idx: u8,
    _padding: u8,
    pub pa_interval_min: U16,
    pub pa_interval_max: U16,
    pub pa_prop: U16,
    pub pa_data: Ptr<[u8]>,
    pub pa_len: U16,
    _padding2: [u8; 2],
}

// Verify struct size
const_assert_eq!(size_of::<PaParam>(), 16);

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct PaUpdate {
    pub adv_handle: u8,
    pub update_did_only: u8,
    _padding: [u8; 2],
    pub pa_data: Ptr<[u8]>,
    pub pa_len: U16,
    _padding2: [u8; 2],
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct AdvStartInd {
    pub err: U16,
    pub adv_type: u8,
    _padding: u8,
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct AdvStopInd {
    pub err: U16,
    pub stop_reason: U16,
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct ConnInd {
    pub err: U16,
    pub role: u8,
    pub peer_addr: LeAddr,
    pub conn_handle: U16,
    pub conn_interval: U16,
    pub conn_latency: U16,
    pub supv_timeout: U16,
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct DisconnInd {
    pub reason: U16,
    pub conn_handle: U16,
    pub role: u8,
    pub peer_addr: LeAddr,
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct ScanResInd {
    pub adv_report: LeAddr,
    pub evt_type: u8,
    pub rssi: i8,
    pub len: u8,
    pub data: [u8; 31],
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct ConnUpdateInd {
    pub err: U16,
    pub conn_handle: U16,
    pub conn_interval: U16,
    pub conn_latency: U16,
    pub supv_timeout: U16,
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct PhyUpdateInd {
    pub err: U16,
    pub conn_handle: U16,
    pub tx_phy: u8,
    pub rx_phy: u8,
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct AuthCompleteInd {
    pub conn_handle: U16,
    pub err: U16,
    pub dev_ltk_length: u8,
    pub dev_ltk: [u8; 32],
    _padding: u8,
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct ExtAdvInd {
    pub adv_handle: u8,
    pub is_start: u8,
    pub err: U16,
    pub stop_reason: U16,
}

/// Parameter of [`evts::EXT_SCAN_RES_IND`].
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct ExtScanResInd {
    pub evt_type: U16,
    pub addr: LeAddr,
    pub direct_addr: LeAddr,
    pub rssi: i8,
    pub primary_phy: u8,
    pub secondary_phy: u8,
    pub adv_sid: u8,
    pub tx_power: i8,
    _padding: u8,
    pub peri_adv_interval: U16,
    pub len: U16,
    _padding2: [u8; 2],
    pub data: Ptr<[u8]>,
}

// Verify struct size
const_assert_eq!(size_of::<ExtScanResInd>(), 32);

impl ExtScanResInd {
    pub fn new(addr: LeAddr, rssi: i8, data: Ptr<[u8]>, len: u16) -> Self {
        Self {
            evt_type: U16::new(0),
            addr,
            direct_addr: LeAddr::new(0, [0; BD_ADDR_LEN]),
            rssi,
            primary_phy: 1,
            secondary_phy: 0,
            adv_sid: 0,
            tx_power: 0x7F,
            _padding: 0,
            peri_adv_interval: U16::new(0),
            len: U16::new(len),
            _padding2: [0; 2],
            data,
        }
    }
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct PaSyncInd {
    pub sync_id: u8,
    pub state: u8,
    pub sync_handle: U16,
    pub cause: U16,
}

/// Parameter of [`evts::PA_ADV_REPORT_IND`].
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct PaAdvReportInd {
    pub sync_id: u8,
    _padding: u8,
    pub sync_handle: U16,
    pub tx_power: i8,
    pub rssi: i8,
    pub cte_type: u8,
    pub data_status: u8,
    pub data_len: u8,
    _padding2: [u8; 3],
    pub p_data: Ptr<[u8]>,
}

// Verify struct size
const_assert_eq!(size_of::<PaAdvReportInd>(), 16);

pub static SCAN_INFO_FILTER_SCHEMA: Schema = Schema {
    name: "ScanInfoFilterParam",
    size: size_of::<ScanInfoFilterParam>(),
    fields: &[Field::bytes(
        offset_of!(ScanInfoFilterParam, p_filter),
        Len::u8(offset_of!(ScanInfoFilterParam, len)),
    )],
};

pub static VENDOR_CMD_SCHEMA: Schema = Schema {
    name: "VendorCmdParam",
    size: size_of::<VendorCmdParam>(),
    fields: &[Field::bytes(
        offset_of!(VendorCmdParam, cmd_param),
        Len::u8(offset_of!(VendorCmdParam, len)),
    )],
};

pub static EXT_ADV_DATA_SCHEMA: Schema = Schema {
    name: "ExtAdvData",
    size: size_of::<ExtAdvData>(),
    fields: &[Field::bytes(
        offset_of!(ExtAdvData, pdata),
        Len::u16(offset_of!(ExtAdvData, len)),
    )],
};

pub static PA_PARAM_SCHEMA: Schema = Schema {
    name: "PaParam",
    size: size_of::<PaParam>(),
    fields: &[Field::bytes(
        offset_of!(PaParam, pa_data),
        Len::u16(offset_of!(PaParam, pa_len)),
    )],
};

pub static PA_UPDATE_SCHEMA: Schema = Schema {
    name: "PaUpdate",
    size: size_of::<PaUpdate>(),
    fields: &[Field::bytes(
        offset_of!(PaUpdate, pa_data),
        Len::u16(offset_of!(PaUpdate, pa_len)),
    )],
};

pub static EXT_SCAN_RES_SCHEMA: Schema = Schema {
    name: "ExtScanResInd",
    size: size_of::<ExtScanResInd>(),
    fields: &[Field::bytes(
        offset_of!(ExtScanResInd, data),
        Len::u16(offset_of!(ExtScanResInd, len)),
    )],
};

pub static PA_ADV_REPORT_SCHEMA: Schema = Schema {
    name: "PaAdvReportInd",
    size: size_of::<PaAdvReportInd>(),
    fields: &[Field::bytes(
        offset_of!(PaAdvReportInd, p_data),
        Len::u8(offset_of!(PaAdvReportInd, data_len)),
    )],
};

/// Size of the value returned for a [`pa_sync_param`] type.
fn pa_sync_value_size(type_: u8) -> Option<usize> {
    match type_ {
        pa_sync_param::PERIODIC_ADV_LIST_SIZE | pa_sync_param::DEV_STATE => Some(1),
        pa_sync_param::SYNCHRONIZED_PARAM => Some(size_of::<PaSyncSyncParam>()),
        _ => None,
    }
}

/// LE GAP profile.
#[derive(Debug)]
pub enum LeGap {}

impl Profile for LeGap {
    const NAME: &'static str = "le_gap";
    const ACT_MAX: u16 = acts::MAX;
    const EVT_MAX: u16 = evts::MAX;
    const ACT_RET_SIZES: &'static [ActMemOption] = &[
        ActMemOption::new(acts::GET_VERSION, size_of::<VersionInfo>() as u32),
        ActMemOption::new(acts::GET_DEVICE_ADDR, size_of::<LeAddr>() as u32),
        ActMemOption::new(acts::READ_RSSI, size_of::<i8>() as u32),
        ActMemOption::new(acts::GET_BOND_NUM, size_of::<u8>() as u32),
        ActMemOption::new(acts::GET_BOND_INFO, size_of::<BondInfo>() as u32),
        ActMemOption::new(acts::GET_CONN_INFO, size_of::<ConnInfo>() as u32),
        ActMemOption::new(acts::GET_DEV_STATE, size_of::<DevState>() as u32),
        ActMemOption::new(acts::GET_ACTIVE_CONN, size_of::<ActiveConn>() as u32),
        ActMemOption::new(acts::GET_CONN_HANDLE_BY_ADDR, size_of::<u16>() as u32),
        ActMemOption::new(acts::GET_MTU_SIZE, size_of::<u16>() as u32),
        ActMemOption::new(acts::CREATE_EXT_ADV, size_of::<u8>() as u32),
        ActMemOption::new(acts::PA_SYNC_CREATE, size_of::<u8>() as u32),
        ActMemOption::new(acts::GET_TX_PENDING_NUM, size_of::<u16>() as u32),
        ActMemOption::new(acts::MAX, 0),
    ];
    const EVT_MEM_SIZES: &'static [EvtMemOption] = &[
        EvtMemOption::new(evts::ADV_START_IND, size_of::<AdvStartInd>() as u32),
        EvtMemOption::new(evts::ADV_STOP_IND, size_of::<AdvStopInd>() as u32),
        EvtMemOption::new(evts::CONNECT_IND, size_of::<ConnInd>() as u32),
        EvtMemOption::new(evts::DISCONN_IND, size_of::<DisconnInd>() as u32),
        EvtMemOption::new(evts::SCAN_START_IND, size_of::<u16>() as u32),
        EvtMemOption::new(evts::SCAN_RES_IND, size_of::<ScanResInd>() as u32),
        EvtMemOption::new(evts::SCAN_STOP_IND, size_of::<u16>() as u32),
        EvtMemOption::new(evts::CONN_UPDATE_IND, size_of::<ConnUpdateInd>() as u32),
        EvtMemOption::new(evts::PHY_UPDATE_IND, size_of::<PhyUpdateInd>() as u32),
        EvtMemOption::new(evts::AUTH_COMPLETE_IND, size_of::<AuthCompleteInd>() as u32),
        EvtMemOption::new(evts::EXT_ADV_IND, size_of::<ExtAdvInd>() as u32),
        EvtMemOption::new(evts::EXT_SCAN_RES_IND, size_of::<ExtScanResInd>() as u32),
        EvtMemOption::new(evts::PA_SYNC_STATE_IND, size_of::<PaSyncInd>() as u32),
        EvtMemOption::new(evts::PA_ADV_REPORT_IND, size_of::<PaAdvReportInd>() as u32),
        EvtMemOption::new(evts::MAX, 0),
    ];

    fn cmd_schema(act: u16) -> Option<&'static Schema> {
        match act {
            acts::SCAN_INFO_FILTER => Some(&SCAN_INFO_FILTER_SCHEMA),
            acts::VENDOR_CMD_REQ => Some(&VENDOR_CMD_SCHEMA),
            acts::SET_EXT_ADV_DATA | acts::SET_EXT_SCAN_RSP_DATA => Some(&EXT_ADV_DATA_SCHEMA),
            acts::START_PA => Some(&PA_PARAM_SCHEMA),
            acts::UPDATE_PA => Some(&PA_UPDATE_SCHEMA),
            _ => None,
        }
    }

    fn event_schema(evt: u16) -> Option<&'static Schema> {
        match evt {
            evts::EXT_SCAN_RES_IND => Some(&EXT_SCAN_RES_SCHEMA),
            evts::PA_ADV_REPORT_IND => Some(&PA_ADV_REPORT_SCHEMA),
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
            acts::GET_VERSION => copy_into(dst, param.cast::<VersionInfo>(), ret),
            acts::GET_DEVICE_ADDR => copy_into(dst, param.cast::<LeAddr>(), ret),
            acts::GET_BOND_NUM | acts::CREATE_EXT_ADV => copy_into(dst, param.cast::<u8>(), ret),
            acts::GET_DEV_STATE => copy_into(dst, param.cast::<DevState>(), ret),
            acts::GET_ACTIVE_CONN => copy_into(dst, param.cast::<ActiveConn>(), ret),
            acts::READ_RSSI => {
                let out = dst.resolve(param.cast::<ReadRssiParam>())?.p_rssi;
                copy_through(dst, out, ret)
            }
            acts::GET_CONN_INFO => {
                let out = dst.resolve(param.cast::<GetConnInfoParam>())?.p_conn_info;
                copy_through(dst, out, ret)
            }
            acts::GET_CONN_HANDLE_BY_ADDR => {
                let out = dst.resolve(param.cast::<GetConnHandleByAddrParam>())?.p_conn_handle;
                copy_through(dst, out, ret)
            }
            acts::GET_MTU_SIZE => {
                let out = dst.resolve(param.cast::<GetMtuSizeParam>())?.p_mtu_size;
                copy_through(dst, out, ret)
            }
            acts::GET_TX_PENDING_NUM => {
                let out = dst.resolve(param.cast::<GetTxPendingNumParam>())?.p_tx_pending_num;
                copy_through(dst, out, ret)
            }
            acts::PA_SYNC_CREATE => {
                let out = dst.resolve(param.cast::<PaSyncCreate>())?.p_sync_id;
                copy_through(dst, out, ret)
            }
            acts::GET_BOND_INFO => {
                // count at ret[0], entries from ret[4]
                let info = *dst.resolve(param.cast::<GetBondInfoParam>())?;
                copy_through(dst, info.p_size, ret)?;
                let count = usize::from(*dst.follow(&info.p_size)?);
                let entries = ret_at(ret, 4, count * size_of::<BondInfo>())?;
                copy_slice_through(dst, info.p_bond_info, count, entries)
            }
            acts::PA_SYNC_GET_PARAM => {
                let get = *dst.resolve(param.cast::<PaSyncGetParam>())?;
                match pa_sync_value_size(get.type_) {
                    Some(size) => copy_slice_through(dst, get.p_value, size, ret),
                    None => {
                        warn!("pa sync get param: bad type {}", get.type_);
                        Ok(())
                    }
                }
            }
            acts::READ_LOCAL_TX_POWER => {
                let read = *dst.resolve(param.cast::<TxPowerReadLocal>())?;
                copy_through(dst, read.cur_txpower, ret_at(ret, 0, 1)?)?;
                copy_through(dst, read.max_txpower, ret_at(ret, 1, 1)?)
            }
            _ => Ok(()),
        }
    }
}
