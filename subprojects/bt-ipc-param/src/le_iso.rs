//! LE isochronous channel parameters (CIG and BIG).
//!
//! Every getter returns its result through an out pointer held in the
//! command parameter; the ret table gives the size of the pointee.

use core::mem::offset_of;

use bt_ipc_marshal::{
    ActMemOption, Arena, CopyBackError, EvtMemOption, Field, Len, Profile, Ptr, Ref, Schema,
    table::copy_through,
};
use static_assertions::const_assert_eq;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, little_endian::*};

pub mod acts {
    pub const CIG_SETUP_PATH: u16 = 0x01;
    pub const CIG_REMOVE_PATH: u16 = 0x02;
    pub const CIG_DISCONNECT: u16 = 0x03;
    pub const CIG_READ_ISO_TX_SYNC: u16 = 0x04;
    pub const CIG_READ_LINK_QUALITY: u16 = 0x05;
    pub const CIG_INITIATOR_START_SETTING: u16 = 0x06;
    pub const CIG_INITIATOR_CREATE_CIS_BY_CIG_ID: u16 = 0x07;
    pub const CIG_INITIATOR_CREATE_CIS_BY_CIG_CONN_HANDLE: u16 = 0x08;
    pub const CIG_GET_CONN_ID: u16 = 0x09;
    pub const CIG_GET_CIS_INFO: u16 = 0x0A;
    pub const CIG_GET_ISOCH_INFO: u16 = 0x0B;
    pub const CIG_INITIATOR_GET_CIS_CONN_HANDLE: u16 = 0x0C;
    pub const CIG_ACCEPTOR_ACCEPT_CIS: u16 = 0x0D;
    pub const CIG_ACCEPTOR_REJECT_CIS: u16 = 0x0E;
    pub const BIG_SETUP_PATH: u16 = 0x0F;
    pub const BIG_REMOVE_PATH: u16 = 0x10;
    pub const BIG_BROADCASTER_CREATE: u16 = 0x11;
    pub const BIG_BROADCASTER_TERMINATE: u16 = 0x12;
    pub const BIG_BROADCASTER_READ_TX_SYNC: u16 = 0x13;
    pub const BIG_RECEIVER_CREATE_SYNC: u16 = 0x14;
    pub const BIG_RECEIVER_TERMINATE_SYNC: u16 = 0x15;
    pub const BIG_RECEIVER_READ_LINK_QUALITY: u16 = 0x16;
    pub const ISO_DATA_SEND: u16 = 0x17;
    pub const MAX: u16 = 0x18;
}

pub mod evts {
    pub const CIG_DISCONNECT_INFO: u16 = 0x01;
    pub const CIG_CIS_ESTABLISHED_INFO: u16 = 0x02;
    pub const CIG_ACCEPTOR_REQUEST_CIS_IND: u16 = 0x03;
    pub const BIG_BROADCASTER_CREATE_CMPL_INFO: u16 = 0x04;
    pub const BIG_BROADCASTER_SYNC_STATE_IND: u16 = 0x05;
    pub const BIG_RECEIVER_SYNC_ESTABLISHED_INFO: u16 = 0x06;
    pub const BIG_RECEIVER_SYNC_STATE_IND: u16 = 0x07;
    pub const DATA_RECEIVE_IND: u16 = 0x08;
    pub const MAX: u16 = 0x09;
}

/// BISes per BIG
pub const ISO_MAX_BIS_NUM: usize = 4;
pub const BROADCAST_CODE_LEN: usize = 16;

/// Parameter of [`acts::CIG_SETUP_PATH`] and [`acts::BIG_SETUP_PATH`].
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct SetupPath {
    pub iso_mode: u8,
    pub data_path_direction: u8,
    pub iso_conn_handle: U16,
    pub data_path_id: u8,
    pub codec_id: [u8; 5],
    _padding: [u8; 2],
    pub controller_delay: U32,
    pub codec_config_len: u8,
    _padding2: [u8; 3],
    pub p_codec_config: Ptr<[u8]>,
}

// Verify struct size
const_assert_eq!(size_of::<SetupPath>(), 24);

impl SetupPath {
    pub fn new(
        iso_mode: u8,
        iso_conn_handle: u16,
        codec_id: [u8; 5],
        p_codec_config: Ptr<[u8]>,
        codec_config_len: u8,
    ) -> Self {
        Self {
            iso_mode,
            data_path_direction: 0,
            iso_conn_handle: U16::new(iso_conn_handle),
            data_path_id: 0,
            codec_id,
            _padding: [0; 2],
            controller_delay: U32::new(0),
            codec_config_len,
            _padding2: [0; 3],
            p_codec_config,
        }
    }
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct BigBroadcasterParam {
    pub num_bis: u8,
    _padding: [u8; 3],
    pub sdu_interval: U32,
    pub max_sdu: U16,
    pub max_transport_latency: U16,
    pub rtn: u8,
    pub phy: u8,
    pub packing: u8,
    pub framing: u8,
    pub encryption: u8,
    pub broadcast_code: [u8; BROADCAST_CODE_LEN],
    _padding2: [u8; 3],
}

// Verify struct size
const_assert_eq!(size_of::<BigBroadcasterParam>(), 36);

impl BigBroadcasterParam {
    pub fn new(num_bis: u8, sdu_interval: u32, max_sdu: u16, phy: u8) -> Self {
        Self {
            num_bis,
            _padding: [0; 3],
            sdu_interval: U32::new(sdu_interval),
            max_sdu: U16::new(max_sdu),
            max_transport_latency: U16::new(0),
            rtn: 0,
            phy,
            packing: 0,
            framing: 0,
            encryption: 0,
            broadcast_code: [0; BROADCAST_CODE_LEN],
            _padding2: [0; 3],
        }
    }
}

/// Parameter of [`acts::BIG_BROADCASTER_CREATE`].
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct BigBroadcasterCreate {
    pub adv_handle: u8,
    _padding: [u8; 3],
    pub p_big_param: Ptr<BigBroadcasterParam>,
    /// Receives the BIG handle
    pub big_handle: Ptr<u8>,
}

// Verify struct size
const_assert_eq!(size_of::<BigBroadcasterCreate>(), 12);

impl BigBroadcasterCreate {
    pub fn new(adv_handle: u8, p_big_param: Ptr<BigBroadcasterParam>, big_handle: Ptr<u8>) -> Self {
        Self {
            adv_handle,
            _padding: [0; 3],
            p_big_param,
            big_handle,
        }
    }
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct BigReceiverCreateSyncParam {
    pub encryption: u8,
    pub broadcast_code: [u8; BROADCAST_CODE_LEN],
    pub mse: u8,
    pub big_sync_timeout: U16,
    pub num_bis: u8,
    pub bis: [u8; ISO_MAX_BIS_NUM],
    _padding: [u8; 3],
}

// Verify struct size
const_assert_eq!(size_of::<BigReceiverCreateSyncParam>(), 28);

impl BigReceiverCreateSyncParam {
    pub fn new(big_sync_timeout: u16, num_bis: u8, bis: [u8; ISO_MAX_BIS_NUM]) -> Self {
        Self {
            encryption: 0,
            broadcast_code: [0; BROADCAST_CODE_LEN],
            mse: 0,
            big_sync_timeout: U16::new(big_sync_timeout),
            num_bis,
            bis,
            _padding: [0; 3],
        }
    }
}

/// Parameter of [`acts::BIG_RECEIVER_CREATE_SYNC`].
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct BigReceiverCreateSync {
    pub sync_handle: U16,
    _padding: [u8; 2],
    pub p_sync_param: Ptr<BigReceiverCreateSyncParam>,
    /// Receives the BIG handle
    pub p_big_handle: Ptr<u8>,
}

impl BigReceiverCreateSync {
    pub fn new(
        sync_handle: u16,
        p_sync_param: Ptr<BigReceiverCreateSyncParam>,
        p_big_handle: Ptr<u8>,
    ) -> Self {
        Self {
            sync_handle: U16::new(sync_handle),
            _padding: [0; 2],
            p_sync_param,
            p_big_handle,
        }
    }
}

/// Parameter of [`acts::ISO_DATA_SEND`].
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct DataSendInfo {
    pub iso_conn_handle: U16,
    pub ts_flag: u8,
    _padding: u8,
    pub time_stamp: U32,
    pub pkt_seq_num: U16,
    pub data_len: U16,
    pub p_data: Ptr<[u8]>,
}

// Verify struct size
const_assert_eq!(size_of::<DataSendInfo>(), 16);

impl DataSendInfo {
    pub fn new(iso_conn_handle: u16, pkt_seq_num: u16, p_data: Ptr<[u8]>, data_len: u16) -> Self {
        Self {
            iso_conn_handle: U16::new(iso_conn_handle),
            ts_flag: 0,
            _padding: 0,
            time_stamp: U32::new(0),
            pkt_seq_num: U16::new(pkt_seq_num),
            data_len: U16::new(data_len),
            p_data,
        }
    }
}

/// Event of [`evts::DATA_RECEIVE_IND`].
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct DirectIsoDataInd {
    pub iso_handle: U16,
    pub pkt_status_flag: u8,
    _padding: u8,
    pub offset: U16,
    pub iso_sdu_len: U16,
    pub pkt_seq_num: U16,
    pub ts_flag: u8,
    _padding2: u8,
    pub time_stamp: U32,
    pub buf_len: U16,
    _padding3: [u8; 2],
    pub p_buf: Ptr<[u8]>,
}

// Verify struct size
const_assert_eq!(size_of::<DirectIsoDataInd>(), 24);

impl DirectIsoDataInd {
    pub fn new(iso_handle: u16, pkt_seq_num: u16, p_buf: Ptr<[u8]>, buf_len: u16) -> Self {
        Self {
            iso_handle: U16::new(iso_handle),
            pkt_status_flag: 0,
            _padding: 0,
            offset: U16::new(0),
            iso_sdu_len: U16::new(buf_len),
            pkt_seq_num: U16::new(pkt_seq_num),
            ts_flag: 0,
            _padding2: 0,
            time_stamp: U32::new(0),
            buf_len: U16::new(buf_len),
            _padding3: [0; 2],
            p_buf,
        }
    }
}

// Getter results

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct IsoTxSyncInfo {
    pub conn_handle: U16,
    pub packet_sequence_number: U16,
    pub time_stamp: U32,
    pub time_offset: U32,
}

// Verify struct size
const_assert_eq!(size_of::<IsoTxSyncInfo>(), 12);

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct CigLinkQualityInfo {
    pub tx_unacked_packets: U32,
    pub tx_flushed_packets: U32,
    pub tx_last_subevent_packets: U32,
    pub retransmitted_packets: U32,
    pub crc_error_packets: U32,
    pub rx_unreceived_packets: U32,
    pub duplicate_packets: U32,
}

// Verify struct size
const_assert_eq!(size_of::<CigLinkQualityInfo>(), 28);

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct CisInfo {
    pub cig_id: u8,
    pub cis_id: u8,
    pub data_path_flags: u8,
    pub state: u8,
    pub conn_id: U16,
    _padding: [u8; 2],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct CisChannelInfo {
    pub state: u8,
    pub cig_id: u8,
    pub cis_id: u8,
    pub data_path_flags: u8,
    pub cig_sync_delay: U32,
    pub cis_sync_delay: U32,
    pub transport_latency_m_s: U32,
    pub transport_latency_s_m: U32,
    pub phy_m_s: u8,
    pub phy_s_m: u8,
    pub nse: u8,
    pub bn_m_s: u8,
    pub bn_s_m: u8,
    pub ft_m_s: u8,
    pub ft_s_m: u8,
    _padding: u8,
    pub max_pdu_m_s: U16,
    pub max_pdu_s_m: U16,
    pub iso_interval: U16,
    _padding2: [u8; 2],
}

// Verify struct size
const_assert_eq!(size_of::<CisChannelInfo>(), 36);

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct BigTxSyncInfo {
    pub big_handle: u8,
    pub adv_handle: u8,
    pub bis_conn_handle: U16,
    pub packet_sequence_number: U16,
    _padding: [u8; 2],
    pub time_stamp: U32,
    pub time_offset: U32,
}

// Verify struct size
const_assert_eq!(size_of::<BigTxSyncInfo>(), 16);

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct BigLinkQualityInfo {
    pub rx_unreceived_packets: U32,
    pub crc_error_packets: U32,
    pub duplicate_packets: U32,
}

// Getter parameters

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct CigReadIsoTxSync {
    pub cis_conn_handle: U16,
    _padding: [u8; 2],
    pub p_tx_sync_info: Ptr<IsoTxSyncInfo>,
}

impl CigReadIsoTxSync {
    pub fn new(cis_conn_handle: u16, p_tx_sync_info: Ptr<IsoTxSyncInfo>) -> Self {
        Self {
            cis_conn_handle: U16::new(cis_conn_handle),
            _padding: [0; 2],
            p_tx_sync_info,
        }
    }
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct CigReadLinkQuality {
    pub cis_conn_handle: U16,
    _padding: [u8; 2],
    pub p_link_quality_info: Ptr<CigLinkQualityInfo>,
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct CigInitiatorCreateCisByCigConnHandle {
    pub cig_id: u8,
    pub cis_id: u8,
    pub conn_handle: U16,
    pub p_cis_conn_handle: Ptr<U16>,
}

impl CigInitiatorCreateCisByCigConnHandle {
    pub fn new(cig_id: u8, cis_id: u8, conn_handle: u16, p_cis_conn_handle: Ptr<U16>) -> Self {
        Self {
            cig_id,
            cis_id,
            conn_handle: U16::new(conn_handle),
            p_cis_conn_handle,
        }
    }
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct CigGetConnId {
    pub cis_conn_handle: U16,
    _padding: [u8; 2],
    pub p_conn_id: Ptr<u8>,
}

impl CigGetConnId {
    pub fn new(cis_conn_handle: u16, p_conn_id: Ptr<u8>) -> Self {
        Self {
            cis_conn_handle: U16::new(cis_conn_handle),
            _padding: [0; 2],
            p_conn_id,
        }
    }
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct CigGetCisInfo {
    pub cis_conn_handle: U16,
    _padding: [u8; 2],
    pub p_cis_info: Ptr<CisInfo>,
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct CigGetIsochInfo {
    pub cis_conn_handle: U16,
    _padding: [u8; 2],
    pub p_isoch_info: Ptr<CisChannelInfo>,
}

impl CigGetIsochInfo {
    pub fn new(cis_conn_handle: u16, p_isoch_info: Ptr<CisChannelInfo>) -> Self {
        Self {
            cis_conn_handle: U16::new(cis_conn_handle),
            _padding: [0; 2],
            p_isoch_info,
        }
    }
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct CigInitiatorGetCisHandle {
    pub cis_id: u8,
    _padding: [u8; 3],
    pub p_cis_handle: Ptr<U16>,
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct BigBroadcasterReadTxSync {
    pub big_handle: u8,
    pub bis_idx: u8,
    _padding: [u8; 2],
    pub p_tx_sync_info: Ptr<BigTxSyncInfo>,
}

impl BigBroadcasterReadTxSync {
    pub fn new(big_handle: u8, bis_idx: u8, p_tx_sync_info: Ptr<BigTxSyncInfo>) -> Self {
        Self {
            big_handle,
            bis_idx,
            _padding: [0; 2],
            p_tx_sync_info,
        }
    }
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct BigReceiverReadLinkQuality {
    pub bis_conn_handle: U16,
    _padding: [u8; 2],
    pub p_link_quality_info: Ptr<BigLinkQualityInfo>,
}

impl BigReceiverReadLinkQuality {
    pub fn new(bis_conn_handle: u16, p_link_quality_info: Ptr<BigLinkQualityInfo>) -> Self {
        Self {
            bis_conn_handle: U16::new(bis_conn_handle),
            _padding: [0; 2],
            p_link_quality_info,
        }
    }
}

// Events

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct CigDisconnectInfo {
    pub cis_conn_handle: U16,
    pub cause: U16,
    pub conn_handle: U16,
    pub cig_id: u8,
    pub cis_id: u8,
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct CigCisEstablishedInfo {
    pub cause: U16,
    pub cis_conn_handle: U16,
    pub conn_handle: U16,
    pub cig_id: u8,
    pub cis_id: u8,
    pub cig_sync_delay: U32,
    pub cis_sync_delay: U32,
    pub transport_latency_m_s: U32,
    pub transport_latency_s_m: U32,
    pub phy_m_s: u8,
    pub phy_s_m: u8,
    pub nse: u8,
    pub bn_m_s: u8,
    pub bn_s_m: u8,
    pub ft_m_s: u8,
    pub ft_s_m: u8,
    _padding: u8,
    pub max_pdu_m_s: U16,
    pub max_pdu_s_m: U16,
    pub iso_interval: U16,
    _padding2: [u8; 2],
}

// Verify struct size
const_assert_eq!(size_of::<CigCisEstablishedInfo>(), 40);

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct CigAcceptorRequestCisInd {
    pub cis_conn_handle: U16,
    pub conn_handle: U16,
    pub cig_id: u8,
    pub cis_id: u8,
    _padding: [u8; 2],
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct BigBroadcasterCreateCmplInfo {
    pub cause: U16,
    pub big_handle: u8,
    pub adv_handle: u8,
    pub big_sync_delay: U32,
    pub transport_latency_big: U32,
    pub phy: u8,
    pub nse: u8,
    pub bn: u8,
    pub pto: u8,
    pub irc: u8,
    _padding: u8,
    pub max_pdu: U16,
    pub iso_interval: U16,
    pub num_bis: u8,
    _padding2: u8,
    pub bis_conn_handle: [U16; ISO_MAX_BIS_NUM],
}

// Verify struct size
const_assert_eq!(size_of::<BigBroadcasterCreateCmplInfo>(), 32);

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct BigBroadcasterSyncStateInd {
    pub big_handle: u8,
    pub adv_handle: u8,
    pub sync_state: u8,
    _padding: u8,
    pub cause: U16,
    _padding2: [u8; 2],
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct BigReceiverSyncEstablishedInfo {
    pub cause: U16,
    pub sync_handle: U16,
    pub big_handle: u8,
    pub nse: u8,
    pub bn: u8,
    pub pto: u8,
    pub transport_latency_big: U32,
    pub irc: u8,
    _padding: u8,
    pub max_pdu: U16,
    pub iso_interval: U16,
    pub num_bis: u8,
    _padding2: u8,
    pub bis_conn_handle: [U16; ISO_MAX_BIS_NUM],
}

// Verify struct size
const_assert_eq!(size_of::<BigReceiverSyncEstablishedInfo>(), 28);

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct BigReceiverSyncStateInd {
    pub big_handle: u8,
    pub sync_state: u8,
    pub sync_handle: U16,
    pub cause: U16,
    _padding: [u8; 2],
}

pub static SETUP_PATH_SCHEMA: Schema = Schema {
    name: "IsoSetupPath",
    size: size_of::<SetupPath>(),
    fields: &[Field::bytes(
        offset_of!(SetupPath, p_codec_config),
        Len::u8(offset_of!(SetupPath, codec_config_len)),
    )],
};

static BIG_BROADCASTER_PARAM_SCHEMA: Schema =
    Schema::flat("BigBroadcasterParam", size_of::<BigBroadcasterParam>());

pub static BIG_BROADCASTER_CREATE_SCHEMA: Schema = Schema {
    name: "BigBroadcasterCreate",
    size: size_of::<BigBroadcasterCreate>(),
    fields: &[Field::one(
        offset_of!(BigBroadcasterCreate, p_big_param),
        &BIG_BROADCASTER_PARAM_SCHEMA,
    )],
};

static BIG_RECEIVER_CREATE_SYNC_PARAM_SCHEMA: Schema =
    Schema::flat("BigReceiverCreateSyncParam", size_of::<BigReceiverCreateSyncParam>());

pub static BIG_RECEIVER_CREATE_SYNC_SCHEMA: Schema = Schema {
    name: "BigReceiverCreateSync",
    size: size_of::<BigReceiverCreateSync>(),
    fields: &[Field::one(
        offset_of!(BigReceiverCreateSync, p_sync_param),
        &BIG_RECEIVER_CREATE_SYNC_PARAM_SCHEMA,
    )],
};

pub static DATA_SEND_SCHEMA: Schema = Schema {
    name: "IsoDataSendInfo",
    size: size_of::<DataSendInfo>(),
    fields: &[Field::bytes(
        offset_of!(DataSendInfo, p_data),
        Len::u16(offset_of!(DataSendInfo, data_len)),
    )],
};

pub static DIRECT_ISO_DATA_IND_SCHEMA: Schema = Schema {
    name: "DirectIsoDataInd",
    size: size_of::<DirectIsoDataInd>(),
    fields: &[Field::bytes(
        offset_of!(DirectIsoDataInd, p_buf),
        Len::u16(offset_of!(DirectIsoDataInd, buf_len)),
    )],
};

#[derive(Debug)]
pub enum LeIso {}

impl Profile for LeIso {
    const NAME: &'static str = "le_iso";
    const ACT_MAX: u16 = acts::MAX;
    const EVT_MAX: u16 = evts::MAX;
    const ACT_RET_SIZES: &'static [ActMemOption] = &[
        ActMemOption::new(acts::CIG_READ_ISO_TX_SYNC, size_of::<IsoTxSyncInfo>() as u32),
        ActMemOption::new(acts::CIG_READ_LINK_QUALITY, size_of::<CigLinkQualityInfo>() as u32),
        ActMemOption::new(acts::CIG_INITIATOR_CREATE_CIS_BY_CIG_CONN_HANDLE, 2),
        ActMemOption::new(acts::CIG_GET_CONN_ID, 1),
        ActMemOption::new(acts::CIG_GET_CIS_INFO, size_of::<CisInfo>() as u32),
        ActMemOption::new(acts::CIG_GET_ISOCH_INFO, size_of::<CisChannelInfo>() as u32),
        ActMemOption::new(acts::CIG_INITIATOR_GET_CIS_CONN_HANDLE, 2),
        ActMemOption::new(acts::BIG_BROADCASTER_CREATE, 1),
        ActMemOption::new(acts::BIG_BROADCASTER_READ_TX_SYNC, size_of::<BigTxSyncInfo>() as u32),
        ActMemOption::new(acts::BIG_RECEIVER_CREATE_SYNC, 1),
        ActMemOption::new(
            acts::BIG_RECEIVER_READ_LINK_QUALITY,
            size_of::<BigLinkQualityInfo>() as u32,
        ),
        ActMemOption::new(acts::MAX, 0),
    ];
    const EVT_MEM_SIZES: &'static [EvtMemOption] = &[
        EvtMemOption::new(evts::CIG_DISCONNECT_INFO, size_of::<CigDisconnectInfo>() as u32),
        EvtMemOption::new(
            evts::CIG_CIS_ESTABLISHED_INFO,
            size_of::<CigCisEstablishedInfo>() as u32,
        ),
        EvtMemOption::new(
            evts::CIG_ACCEPTOR_REQUEST_CIS_IND,
            size_of::<CigAcceptorRequestCisInd>() as u32,
        ),
        EvtMemOption::new(
            evts::BIG_BROADCASTER_CREATE_CMPL_INFO,
            size_of::<BigBroadcasterCreateCmplInfo>() as u32,
        ),
        EvtMemOption::new(
            evts::BIG_BROADCASTER_SYNC_STATE_IND,
            size_of::<BigBroadcasterSyncStateInd>() as u32,
        ),
        EvtMemOption::new(
            evts::BIG_RECEIVER_SYNC_ESTABLISHED_INFO,
            size_of::<BigReceiverSyncEstablishedInfo>() as u32,
        ),
        EvtMemOption::new(
            evts::BIG_RECEIVER_SYNC_STATE_IND,
            size_of::<BigReceiverSyncStateInd>() as u32,
        ),
        EvtMemOption::new(evts::DATA_RECEIVE_IND, size_of::<DirectIsoDataInd>() as u32),
        EvtMemOption::new(evts::MAX, 0),
    ];

    fn cmd_schema(act: u16) -> Option<&'static Schema> {
        match act {
            acts::CIG_SETUP_PATH | acts::BIG_SETUP_PATH => Some(&SETUP_PATH_SCHEMA),
            acts::BIG_BROADCASTER_CREATE => Some(&BIG_BROADCASTER_CREATE_SCHEMA),
            acts::BIG_RECEIVER_CREATE_SYNC => Some(&BIG_RECEIVER_CREATE_SYNC_SCHEMA),
            acts::ISO_DATA_SEND => Some(&DATA_SEND_SCHEMA),
            _ => None,
        }
    }

    fn event_schema(evt: u16) -> Option<&'static Schema> {
        match evt {
            evts::DATA_RECEIVE_IND => Some(&DIRECT_ISO_DATA_IND_SCHEMA),
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
            acts::CIG_READ_ISO_TX_SYNC => {
                let out = dst.resolve(param.cast::<CigReadIsoTxSync>())?.p_tx_sync_info;
                copy_through(dst, out, ret)
            }
            acts::CIG_READ_LINK_QUALITY => {
                let out = dst.resolve(param.cast::<CigReadLinkQuality>())?.p_link_quality_info;
                copy_through(dst, out, ret)
            }
            acts::CIG_INITIATOR_CREATE_CIS_BY_CIG_CONN_HANDLE => {
                let out = dst
                    .resolve(param.cast::<CigInitiatorCreateCisByCigConnHandle>())?
                    .p_cis_conn_handle;
                copy_through(dst, out, ret)
            }
            acts::CIG_GET_CONN_ID => {
                let out = dst.resolve(param.cast::<CigGetConnId>())?.p_conn_id;
                copy_through(dst, out, ret)
            }
            acts::CIG_GET_CIS_INFO => {
                let out = dst.resolve(param.cast::<CigGetCisInfo>())?.p_cis_info;
                copy_through(dst, out, ret)
            }
            acts::CIG_GET_ISOCH_INFO => {
                let out = dst.resolve(param.cast::<CigGetIsochInfo>())?.p_isoch_info;
                copy_through(dst, out, ret)
            }
            acts::CIG_INITIATOR_GET_CIS_CONN_HANDLE => {
                let out = dst.resolve(param.cast::<CigInitiatorGetCisHandle>())?.p_cis_handle;
                copy_through(dst, out, ret)
            }
            acts::BIG_BROADCASTER_CREATE => {
                let out = dst.resolve(param.cast::<BigBroadcasterCreate>())?.big_handle;
                copy_through(dst, out, ret)
            }
            acts::BIG_BROADCASTER_READ_TX_SYNC => {
                let out = dst.resolve(param.cast::<BigBroadcasterReadTxSync>())?.p_tx_sync_info;
                copy_through(dst, out, ret)
            }
            acts::BIG_RECEIVER_CREATE_SYNC => {
                let out = dst.resolve(param.cast::<BigReceiverCreateSync>())?.p_big_handle;
                copy_through(dst, out, ret)
            }
            acts::BIG_RECEIVER_READ_LINK_QUALITY => {
                let out = dst
                    .resolve(param.cast::<BigReceiverReadLinkQuality>())?
                    .p_link_quality_info;
                copy_through(dst, out, ret)
            }
            _ => Ok(()),
        }
    }
}
