//! LE Audio parameters (BAP broadcast source and sink, CSIS, MCS, VCS).
//!
//! [`acts::BROADCAST_SOURCE_CREATE`] is the deepest graph on the link: up to
//! two groups, each with up to two subgroups of up to four BISes, all embedded
//! in the command struct. Every subgroup owns a level 2 codec config and
//! metadata, every BIS a level 3 codec config. The device assigns an index to
//! each node and returns them as one nested table, written back through the
//! index pointers held in the caller's tree.
//!
//! ISO data uses the layouts of [`crate::le_iso`].

use core::{mem::offset_of, slice};

use bt_ipc_marshal::{
    ActMemOption, Arena, Arm, CopyBackError, EvtMemOption, Field, Len, Profile, Ptr, Ref, Schema,
    Tag, Width,
    table::{copy_into, copy_through},
};
use static_assertions::const_assert_eq;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, little_endian::*};

use crate::{
    le_gap::{LeAddr, PA_ADV_REPORT_SCHEMA, PaAdvReportInd},
    le_iso::{
        DATA_SEND_SCHEMA, DIRECT_ISO_DATA_IND_SCHEMA, DataSendInfo, DirectIsoDataInd,
        ISO_MAX_BIS_NUM,
    },
};

pub mod acts {
    pub const ISO_DATA_SEND: u16 = 0x01;
    pub const CSIS_GEN_RSI: u16 = 0x02;
    pub const MCS_MEDIA_PLAYER_INFO_SET: u16 = 0x03;
    pub const MCS_MEDIA_TRACK_INFO_SET: u16 = 0x04;
    pub const SYNC_CREATE: u16 = 0x05;
    pub const SYNC_RELEASE: u16 = 0x06;
    pub const SYNC_SETUP_DATA_PATH: u16 = 0x07;
    pub const SYNC_REMOVE_DATA_PATH: u16 = 0x08;
    pub const SYNC_GET_BIG_INFO: u16 = 0x09;
    pub const SYNC_GET_BIS_CODEC_CFG: u16 = 0x0A;
    pub const SYNC_GET_BIS_INFO: u16 = 0x0B;
    pub const BROADCAST_SOURCE_CREATE: u16 = 0x0C;
    pub const BROADCAST_SOURCE_GET_INFO: u16 = 0x0D;
    pub const BROADCAST_SOURCE_CONFIG: u16 = 0x0E;
    pub const BROADCAST_SOURCE_ENABLE: u16 = 0x0F;
    pub const BROADCAST_SOURCE_DISABLE: u16 = 0x10;
    pub const BROADCAST_SOURCE_RELEASE: u16 = 0x11;
    pub const BROADCAST_SOURCE_SETUP_DATA_PATH: u16 = 0x12;
    pub const BROADCAST_SOURCE_REMOVE_DATA_PATH: u16 = 0x13;
    pub const BROADCAST_SOURCE_RECONFIG: u16 = 0x14;
    pub const BROADCAST_SOURCE_GET_CONN_HANDLE: u16 = 0x15;
    pub const VCS_PARAM_SET: u16 = 0x16;
    pub const VCS_PARAM_GET: u16 = 0x17;
    pub const VCS_GET_VOLUME_STATE: u16 = 0x18;
    pub const MAX: u16 = 0x19;
}

pub mod evts {
    pub const CODEC_CFG_IND: u16 = 0x01;
    pub const QOS_CFG_IND: u16 = 0x02;
    pub const ENABLE_IND: u16 = 0x03;
    pub const DISABLE_IND: u16 = 0x04;
    pub const RELEASE_IND: u16 = 0x05;
    pub const ISO_DATA_RECEIVE_IND: u16 = 0x06;
    pub const MCS_CLIENT_DISCOVERY_DONE_IND: u16 = 0x07;
    pub const MCS_CLIENT_READ_RESULT_IND: u16 = 0x08;
    pub const MCS_CLIENT_NOTIFY_RESULT_IND: u16 = 0x09;
    pub const PA_SYNC_STATE_IND: u16 = 0x0A;
    pub const BIG_SYNC_STATE_IND: u16 = 0x0B;
    pub const PA_BIG_INFO_IND: u16 = 0x0C;
    pub const PA_ADV_REPORT_IND: u16 = 0x0D;
    pub const BASS_GET_PA_SYNC_PARAM_IND: u16 = 0x0E;
    pub const BASS_GET_BIG_SYNC_PARAM_IND: u16 = 0x0F;
    pub const BASS_GET_BROADCAST_CODE_IND: u16 = 0x10;
    pub const BASS_GET_PREFER_BIS_SYNC_IND: u16 = 0x11;
    pub const BROADCAST_SOURCE_STATE_IND: u16 = 0x12;
    pub const MAX: u16 = 0x13;
}

/// MCS characteristic uuids.
///
/// The device stack reports the icon URL string under
/// [`MEDIA_PLAYER_ICON_OBJ_ID`](mcs_uuid::MEDIA_PLAYER_ICON_OBJ_ID) and the
/// track title string under
/// [`MEDIA_PLAYER_ICON_URL`](mcs_uuid::MEDIA_PLAYER_ICON_URL).
/// [`TRACK_TITLE`](mcs_uuid::TRACK_TITLE) results carry no string.
pub mod mcs_uuid {
    pub const MEDIA_PLAYER_NAME: u16 = 0x2B93;
    pub const MEDIA_PLAYER_ICON_OBJ_ID: u16 = 0x2B94;
    pub const MEDIA_PLAYER_ICON_URL: u16 = 0x2B95;
    pub const TRACK_TITLE: u16 = 0x2B97;

    /// Uuids whose result value is an [`McsString`](super::McsString).
    pub const WITH_STRING: [u16; 3] = [MEDIA_PLAYER_NAME, MEDIA_PLAYER_ICON_OBJ_ID, MEDIA_PLAYER_ICON_URL];
}

/// Resolvable set identifier
pub const CSIS_RSI_LEN: usize = 6;
pub const BROADCAST_GROUP_NUM: usize = 2;
pub const BROADCAST_SUBGROUP_NUM: usize = 2;
pub const CODEC_ID_LEN: usize = 5;

// Broadcast source hierarchy

/// One BIS of a broadcast subgroup.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct BroadcastBis {
    pub codec_cfg_l3_len: u8,
    _padding: [u8; 3],
    pub p_codec_cfg_l3: Ptr<[u8]>,
    /// Receives the BIS index
    pub bis_idx: Ptr<u8>,
}

// Verify struct size
const_assert_eq!(size_of::<BroadcastBis>(), 12);

impl BroadcastBis {
    pub const EMPTY: Self = Self {
        codec_cfg_l3_len: 0,
        _padding: [0; 3],
        p_codec_cfg_l3: Ptr::null(),
        bis_idx: Ptr::null(),
    };

    pub fn new(p_codec_cfg_l3: Ptr<[u8]>, codec_cfg_l3_len: u8, bis_idx: Ptr<u8>) -> Self {
        Self {
            codec_cfg_l3_len,
            p_codec_cfg_l3,
            bis_idx,
            ..Self::EMPTY
        }
    }
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct BroadcastSubgroup {
    pub num_bis: u8,
    _padding: [u8; 3],
    pub bis: [BroadcastBis; ISO_MAX_BIS_NUM],
    pub codec_id: [u8; CODEC_ID_LEN],
    pub codec_cfg_l2_len: u8,
    _padding2: [u8; 2],
    pub p_codec_cfg_l2: Ptr<[u8]>,
    pub metadata_len: u8,
    _padding3: [u8; 3],
    pub p_metadata: Ptr<[u8]>,
    /// Receives the subgroup index
    pub subgroup_idx: Ptr<u8>,
}

// Verify struct size
const_assert_eq!(size_of::<BroadcastSubgroup>(), 76);

impl BroadcastSubgroup {
    pub const EMPTY: Self = Self {
        num_bis: 0,
        _padding: [0; 3],
        bis: [BroadcastBis::EMPTY; ISO_MAX_BIS_NUM],
        codec_id: [0; CODEC_ID_LEN],
        codec_cfg_l2_len: 0,
        _padding2: [0; 2],
        p_codec_cfg_l2: Ptr::null(),
        metadata_len: 0,
        _padding3: [0; 3],
        p_metadata: Ptr::null(),
        subgroup_idx: Ptr::null(),
    };

    /// Subgroup holding the leading [`ISO_MAX_BIS_NUM`] entries of `bis`.
    pub fn new(
        codec_id: [u8; CODEC_ID_LEN],
        p_codec_cfg_l2: Ptr<[u8]>,
        codec_cfg_l2_len: u8,
        p_metadata: Ptr<[u8]>,
        metadata_len: u8,
        bis: &[BroadcastBis],
        subgroup_idx: Ptr<u8>,
    ) -> Self {
        let mut subgroup = Self {
            codec_id,
            codec_cfg_l2_len,
            p_codec_cfg_l2,
            metadata_len,
            p_metadata,
            subgroup_idx,
            ..Self::EMPTY
        };
        for (slot, b) in subgroup.bis.iter_mut().zip(bis) {
            *slot = *b;
            subgroup.num_bis += 1;
        }
        subgroup
    }
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct BroadcastGroup {
    pub presentation_delay: U32,
    pub num_subgroups: u8,
    _padding: [u8; 3],
    pub subgroup: [BroadcastSubgroup; BROADCAST_SUBGROUP_NUM],
    /// Receives the group index
    pub group_idx: Ptr<u8>,
}

// Verify struct size
const_assert_eq!(size_of::<BroadcastGroup>(), 164);

impl BroadcastGroup {
    pub const EMPTY: Self = Self {
        presentation_delay: U32::ZERO,
        num_subgroups: 0,
        _padding: [0; 3],
        subgroup: [BroadcastSubgroup::EMPTY; BROADCAST_SUBGROUP_NUM],
        group_idx: Ptr::null(),
    };

    pub fn new(presentation_delay: u32, subgroup: &[BroadcastSubgroup], group_idx: Ptr<u8>) -> Self {
        let mut group = Self {
            presentation_delay: U32::new(presentation_delay),
            group_idx,
            ..Self::EMPTY
        };
        for (slot, s) in group.subgroup.iter_mut().zip(subgroup) {
            *slot = *s;
            group.num_subgroups += 1;
        }
        group
    }
}

/// Parameter of [`acts::BROADCAST_SOURCE_CREATE`].
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct BroadcastSourceCreate {
    pub num_groups: u8,
    _padding: [u8; 3],
    pub group: [BroadcastGroup; BROADCAST_GROUP_NUM],
}

// Verify struct size
const_assert_eq!(size_of::<BroadcastSourceCreate>(), 332);

impl BroadcastSourceCreate {
    pub fn new(group: &[BroadcastGroup]) -> Self {
        let mut create = Self {
            num_groups: 0,
            _padding: [0; 3],
            group: [BroadcastGroup::EMPTY; BROADCAST_GROUP_NUM],
        };
        for (slot, g) in create.group.iter_mut().zip(group) {
            *slot = *g;
            create.num_groups += 1;
        }
        create
    }
}

/// Indices assigned by [`acts::BROADCAST_SOURCE_CREATE`], mirroring the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct BroadcastSourceCreateRet {
    pub group: [GroupIdx; BROADCAST_GROUP_NUM],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct GroupIdx {
    pub subgroup: [SubgroupIdx; BROADCAST_SUBGROUP_NUM],
    pub group_idx: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct SubgroupIdx {
    pub bis_idx: [u8; ISO_MAX_BIS_NUM],
    pub subgroup_idx: u8,
}

// Verify struct size
const_assert_eq!(size_of::<BroadcastSourceCreateRet>(), 22);

/// Codec config of a data path, embedded in the setup parameters.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct BisSetupDataPath {
    pub codec_id: [u8; CODEC_ID_LEN],
    _padding: [u8; 3],
    pub controller_delay: U32,
    pub codec_config_len: u8,
    _padding2: [u8; 3],
    pub p_codec_config: Ptr<[u8]>,
}

// Verify struct size
const_assert_eq!(size_of::<BisSetupDataPath>(), 20);

impl BisSetupDataPath {
    pub fn new(codec_id: [u8; CODEC_ID_LEN], p_codec_config: Ptr<[u8]>, codec_config_len: u8) -> Self {
        Self {
            codec_id,
            _padding: [0; 3],
            controller_delay: U32::new(0),
            codec_config_len,
            _padding2: [0; 3],
            p_codec_config,
        }
    }
}

/// Parameter of [`acts::SYNC_SETUP_DATA_PATH`].
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct SyncSetupDataPath {
    pub sync_handle_id: u8,
    pub bis_idx: u8,
    _padding: [u8; 2],
    pub setup_param: BisSetupDataPath,
}

// Verify struct size
const_assert_eq!(size_of::<SyncSetupDataPath>(), 24);

impl SyncSetupDataPath {
    pub fn new(sync_handle_id: u8, bis_idx: u8, setup_param: BisSetupDataPath) -> Self {
        Self {
            sync_handle_id,
            bis_idx,
            _padding: [0; 2],
            setup_param,
        }
    }
}

/// Parameter of [`acts::BROADCAST_SOURCE_SETUP_DATA_PATH`].
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct BroadcastSourceSetupDataPath {
    pub broadcast_source_handle: U32,
    pub bis_idx: u8,
    _padding: [u8; 3],
    pub setup_param: BisSetupDataPath,
}

// Verify struct size
const_assert_eq!(size_of::<BroadcastSourceSetupDataPath>(), 28);

impl BroadcastSourceSetupDataPath {
    pub fn new(broadcast_source_handle: u32, bis_idx: u8, setup_param: BisSetupDataPath) -> Self {
        Self {
            broadcast_source_handle: U32::new(broadcast_source_handle),
            bis_idx,
            _padding: [0; 3],
            setup_param,
        }
    }
}

/// Parameter of [`acts::BROADCAST_SOURCE_RECONFIG`]: new metadata for one
/// subgroup.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct BroadcastSourceReconfig {
    pub broadcast_source_handle: U32,
    pub group_idx: u8,
    pub subgroup_idx: u8,
    pub metadata_len: u8,
    _padding: u8,
    pub p_metadata: Ptr<[u8]>,
}

// Verify struct size
const_assert_eq!(size_of::<BroadcastSourceReconfig>(), 12);

impl BroadcastSourceReconfig {
    pub fn new(
        broadcast_source_handle: u32,
        group_idx: u8,
        subgroup_idx: u8,
        p_metadata: Ptr<[u8]>,
        metadata_len: u8,
    ) -> Self {
        Self {
            broadcast_source_handle: U32::new(broadcast_source_handle),
            group_idx,
            subgroup_idx,
            metadata_len,
            _padding: 0,
            p_metadata,
        }
    }
}

// MCS server

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct MediaPlayerInfo {
    pub player_name_len: U16,
    pub icon_fmt_len: U16,
    pub url_len: U16,
    _padding: [u8; 2],
    pub p_player_name: Ptr<[u8]>,
    pub p_icon_fmt: Ptr<[u8]>,
    pub p_url: Ptr<[u8]>,
}

/// Parameter of [`acts::MCS_MEDIA_PLAYER_INFO_SET`].
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct McsMediaPlayerInfoSet {
    pub service_id: u8,
    _padding: [u8; 3],
    pub media_player_info: MediaPlayerInfo,
}

// Verify struct size
const_assert_eq!(size_of::<McsMediaPlayerInfoSet>(), 24);

impl McsMediaPlayerInfoSet {
    pub fn new(
        service_id: u8,
        name: (Ptr<[u8]>, u16),
        icon_fmt: (Ptr<[u8]>, u16),
        url: (Ptr<[u8]>, u16),
    ) -> Self {
        Self {
            service_id,
            _padding: [0; 3],
            media_player_info: MediaPlayerInfo {
                player_name_len: U16::new(name.1),
                icon_fmt_len: U16::new(icon_fmt.1),
                url_len: U16::new(url.1),
                _padding: [0; 2],
                p_player_name: name.0,
                p_icon_fmt: icon_fmt.0,
                p_url: url.0,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct MediaTrackInfo {
    pub track_duration: I32,
    pub track_position: I32,
    pub title_len: U16,
    _padding: [u8; 2],
    pub p_title: Ptr<[u8]>,
}

/// Parameter of [`acts::MCS_MEDIA_TRACK_INFO_SET`].
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct McsMediaTrackInfoSet {
    pub service_id: u8,
    _padding: [u8; 3],
    pub media_track_info: MediaTrackInfo,
}

// Verify struct size
const_assert_eq!(size_of::<McsMediaTrackInfoSet>(), 20);

impl McsMediaTrackInfoSet {
    pub fn new(service_id: u8, track_duration: i32, p_title: Ptr<[u8]>, title_len: u16) -> Self {
        Self {
            service_id,
            _padding: [0; 3],
            media_track_info: MediaTrackInfo {
                track_duration: I32::new(track_duration),
                track_position: I32::new(0),
                title_len: U16::new(title_len),
                _padding: [0; 2],
                p_title,
            },
        }
    }
}

// Getter results

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct BigInfo {
    pub num_bis: u8,
    pub nse: u8,
    pub bn: u8,
    pub pto: u8,
    pub irc: u8,
    pub framing: u8,
    pub encryption: u8,
    pub phy: u8,
    pub iso_interval: U16,
    pub max_pdu: U16,
    pub sdu_interval: U32,
    pub max_sdu: U16,
    _padding: [u8; 2],
}

// Verify struct size
const_assert_eq!(size_of::<BigInfo>(), 20);

/// LC3 codec configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct CfgCodec {
    pub type_exist: U16,
    pub frame_duration: u8,
    pub codec_frame_blocks_per_sdu: u8,
    pub sample_frequency: U32,
    pub audio_channel_allocation: U32,
    pub octets_per_codec_frame: U16,
    _padding: [u8; 2],
}

// Verify struct size
const_assert_eq!(size_of::<CfgCodec>(), 16);

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct BisInfo {
    pub bis_idx: u8,
    pub subgroup_idx: u8,
    pub bis_conn_handle: U16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct SyncBisInfo {
    pub num_bis: u8,
    _padding: [u8; 3],
    pub bis_info: [BisInfo; ISO_MAX_BIS_NUM],
}

// Verify struct size
const_assert_eq!(size_of::<SyncBisInfo>(), 20);

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct BroadcastSourceInfo {
    pub state: u8,
    pub adv_sid: u8,
    pub adv_handle: u8,
    pub big_handle: u8,
    pub broadcast_id: [u8; 3],
    _padding: u8,
}

/// VCS server state. [`acts::VCS_PARAM_GET`] fills the parameter itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct VcsParam {
    pub volume_setting: u8,
    pub mute: u8,
    pub change_counter: u8,
    pub volume_flags: u8,
    pub step_size: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct VcsVolumeState {
    pub volume_setting: u8,
    pub mute: u8,
    pub change_counter: u8,
}

// Getter parameters

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct CsisGenRsi {
    pub service_id: u8,
    _padding: [u8; 3],
    pub p_rsik: Ptr<[u8; CSIS_RSI_LEN]>,
}

impl CsisGenRsi {
    pub fn new(service_id: u8, p_rsik: Ptr<[u8; CSIS_RSI_LEN]>) -> Self {
        Self {
            service_id,
            _padding: [0; 3],
            p_rsik,
        }
    }
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct SyncCreate {
    pub adv_addr: LeAddr,
    pub adv_sid: u8,
    pub sync_handle_id: Ptr<u8>,
}

// Verify struct size
const_assert_eq!(size_of::<SyncCreate>(), 12);

impl SyncCreate {
    pub fn new(adv_addr: LeAddr, adv_sid: u8, sync_handle_id: Ptr<u8>) -> Self {
        Self {
            adv_addr,
            adv_sid,
            sync_handle_id,
        }
    }
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct SyncGetBigInfo {
    pub sync_handle_id: u8,
    _padding: [u8; 3],
    pub p_big_info: Ptr<BigInfo>,
}

impl SyncGetBigInfo {
    pub fn new(sync_handle_id: u8, p_big_info: Ptr<BigInfo>) -> Self {
        Self {
            sync_handle_id,
            _padding: [0; 3],
            p_big_info,
        }
    }
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct SyncGetBisCodecCfg {
    pub sync_handle_id: u8,
    pub bis_idx: u8,
    _padding: [u8; 2],
    pub p_codec_cfg: Ptr<CfgCodec>,
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct SyncGetBisInfo {
    pub sync_handle_id: u8,
    _padding: [u8; 3],
    pub p_bis_info: Ptr<SyncBisInfo>,
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct BroadcastSourceInfoGet {
    pub broadcast_source_handle: U32,
    pub p_info: Ptr<BroadcastSourceInfo>,
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct BroadcastSourceConnHandleGet {
    pub broadcast_source_handle: U32,
    pub bis_idx: u8,
    _padding: [u8; 3],
    pub p_bis_conn_handle: Ptr<U16>,
}

impl BroadcastSourceConnHandleGet {
    pub fn new(broadcast_source_handle: u32, bis_idx: u8, p_bis_conn_handle: Ptr<U16>) -> Self {
        Self {
            broadcast_source_handle: U32::new(broadcast_source_handle),
            bis_idx,
            _padding: [0; 3],
            p_bis_conn_handle,
        }
    }
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct VcsGetVolumeState {
    pub conn_handle: U16,
    _padding: [u8; 2],
    pub p_vcs_volume_state: Ptr<VcsVolumeState>,
}

impl VcsGetVolumeState {
    pub fn new(conn_handle: u16, p_vcs_volume_state: Ptr<VcsVolumeState>) -> Self {
        Self {
            conn_handle: U16::new(conn_handle),
            _padding: [0; 2],
            p_vcs_volume_state,
        }
    }
}

// Events

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct CodecCfgInd {
    pub conn_handle: U16,
    pub ase_id: u8,
    _padding: u8,
    pub codec_cfg: CfgCodec,
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct QosCfgInd {
    pub conn_handle: U16,
    pub ase_id: u8,
    _padding: u8,
    pub presentation_delay: U32,
    pub sdu_interval: U32,
    pub max_sdu: U16,
    pub retransmission_number: u8,
    pub framing: u8,
}

// Verify struct size
const_assert_eq!(size_of::<QosCfgInd>(), 16);

/// ASE enable, disable and release indications.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct AseInd {
    pub conn_handle: U16,
    pub ase_id: u8,
    pub direction: u8,
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct McsClientDiscoveryDoneInd {
    pub conn_handle: U16,
    pub is_found: u8,
    pub load_from_ftl: u8,
    pub srv_num: u8,
    _padding: [u8; 3],
}

/// String value of an MCS characteristic.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct McsString {
    pub len: U16,
    _padding: [u8; 2],
    pub p_value: Ptr<[u8]>,
}

// Verify struct size
const_assert_eq!(size_of::<McsString>(), 8);

/// Read or notified value of an MCS characteristic.
///
/// `value` is a union selected by `uuid`: an [`McsString`] for
/// [`mcs_uuid::WITH_STRING`], scalars for the others.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct McsClientResultInd {
    pub conn_handle: U16,
    pub cause: U16,
    pub uuid: U16,
    _padding: [u8; 2],
    pub value: [u8; 8],
}

// Verify struct size
const_assert_eq!(size_of::<McsClientResultInd>(), 16);

impl McsClientResultInd {
    pub fn with_string(conn_handle: u16, uuid: u16, p_value: Ptr<[u8]>, len: u16) -> Self {
        let string = McsString {
            len: U16::new(len),
            _padding: [0; 2],
            p_value,
        };
        Self::with_value(conn_handle, uuid, zerocopy::transmute!(string))
    }

    pub fn with_value(conn_handle: u16, uuid: u16, value: [u8; 8]) -> Self {
        Self {
            conn_handle: U16::new(conn_handle),
            cause: U16::new(0),
            uuid: U16::new(uuid),
            _padding: [0; 2],
            value,
        }
    }

    /// The string value, for the characteristics that carry one.
    pub fn string(&self) -> Option<&McsString> {
        mcs_uuid::WITH_STRING
            .contains(&self.uuid.get())
            .then(|| zerocopy::transmute_ref!(&self.value))
    }
}

/// PA and BIG sync state changes.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct SyncStateInd {
    pub sync_handle_id: u8,
    pub sync_state: u8,
    pub cause: U16,
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct PaBigInfoInd {
    pub sync_handle_id: u8,
    _padding: [u8; 3],
    pub big_info: BigInfo,
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct BassGetPaSyncParamInd {
    pub sync_handle_id: u8,
    pub source_id: u8,
    pub is_past: u8,
    _padding: u8,
    pub pa_interval: U16,
    _padding2: [u8; 2],
}

/// BASS requests for BIG sync parameters or a broadcast code.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct BassSourceInd {
    pub sync_handle_id: u8,
    pub source_id: u8,
    _padding: [u8; 2],
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct BassGetPreferBisSyncInd {
    pub sync_handle_id: u8,
    pub source_id: u8,
    pub num_subgroups: u8,
    _padding: u8,
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct BroadcastSourceStateInd {
    pub broadcast_source_handle: U32,
    pub state: u8,
    _padding: u8,
    pub cause: U16,
}

static BROADCAST_BIS_SCHEMA: Schema = Schema {
    name: "BroadcastBis",
    size: size_of::<BroadcastBis>(),
    fields: &[Field::bytes(
        offset_of!(BroadcastBis, p_codec_cfg_l3),
        Len::u8(offset_of!(BroadcastBis, codec_cfg_l3_len)),
    )],
};

static BROADCAST_SUBGROUP_SCHEMA: Schema = Schema {
    name: "BroadcastSubgroup",
    size: size_of::<BroadcastSubgroup>(),
    fields: &[
        Field::bytes(
            offset_of!(BroadcastSubgroup, p_codec_cfg_l2),
            Len::u8(offset_of!(BroadcastSubgroup, codec_cfg_l2_len)),
        ),
        Field::bytes(
            offset_of!(BroadcastSubgroup, p_metadata),
            Len::u8(offset_of!(BroadcastSubgroup, metadata_len)),
        ),
        Field::inline(
            offset_of!(BroadcastSubgroup, bis),
            &BROADCAST_BIS_SCHEMA,
            Len::u8(offset_of!(BroadcastSubgroup, num_bis)),
            ISO_MAX_BIS_NUM,
        ),
    ],
};

static BROADCAST_GROUP_SCHEMA: Schema = Schema {
    name: "BroadcastGroup",
    size: size_of::<BroadcastGroup>(),
    fields: &[Field::inline(
        offset_of!(BroadcastGroup, subgroup),
        &BROADCAST_SUBGROUP_SCHEMA,
        Len::u8(offset_of!(BroadcastGroup, num_subgroups)),
        BROADCAST_SUBGROUP_NUM,
    )],
};

pub static BROADCAST_SOURCE_CREATE_SCHEMA: Schema = Schema {
    name: "BroadcastSourceCreate",
    size: size_of::<BroadcastSourceCreate>(),
    fields: &[Field::inline(
        offset_of!(BroadcastSourceCreate, group),
        &BROADCAST_GROUP_SCHEMA,
        Len::u8(offset_of!(BroadcastSourceCreate, num_groups)),
        BROADCAST_GROUP_NUM,
    )],
};

static BIS_SETUP_DATA_PATH_SCHEMA: Schema = Schema {
    name: "BisSetupDataPath",
    size: size_of::<BisSetupDataPath>(),
    fields: &[Field::bytes(
        offset_of!(BisSetupDataPath, p_codec_config),
        Len::u8(offset_of!(BisSetupDataPath, codec_config_len)),
    )],
};

pub static SYNC_SETUP_DATA_PATH_SCHEMA: Schema = Schema {
    name: "SyncSetupDataPath",
    size: size_of::<SyncSetupDataPath>(),
    fields: &[Field::inline(
        offset_of!(SyncSetupDataPath, setup_param),
        &BIS_SETUP_DATA_PATH_SCHEMA,
        Len::Const(1),
        1,
    )],
};

pub static BROADCAST_SOURCE_SETUP_DATA_PATH_SCHEMA: Schema = Schema {
    name: "BroadcastSourceSetupDataPath",
    size: size_of::<BroadcastSourceSetupDataPath>(),
    fields: &[Field::inline(
        offset_of!(BroadcastSourceSetupDataPath, setup_param),
        &BIS_SETUP_DATA_PATH_SCHEMA,
        Len::Const(1),
        1,
    )],
};

pub static BROADCAST_SOURCE_RECONFIG_SCHEMA: Schema = Schema {
    name: "BroadcastSourceReconfig",
    size: size_of::<BroadcastSourceReconfig>(),
    fields: &[Field::bytes(
        offset_of!(BroadcastSourceReconfig, p_metadata),
        Len::u8(offset_of!(BroadcastSourceReconfig, metadata_len)),
    )],
};

pub static MCS_MEDIA_PLAYER_INFO_SET_SCHEMA: Schema = Schema {
    name: "McsMediaPlayerInfoSet",
    size: size_of::<McsMediaPlayerInfoSet>(),
    fields: &[
        Field::bytes(
            offset_of!(McsMediaPlayerInfoSet, media_player_info.p_player_name),
            Len::u16(offset_of!(McsMediaPlayerInfoSet, media_player_info.player_name_len)),
        ),
        Field::bytes(
            offset_of!(McsMediaPlayerInfoSet, media_player_info.p_icon_fmt),
            Len::u16(offset_of!(McsMediaPlayerInfoSet, media_player_info.icon_fmt_len)),
        ),
        Field::bytes(
            offset_of!(McsMediaPlayerInfoSet, media_player_info.p_url),
            Len::u16(offset_of!(McsMediaPlayerInfoSet, media_player_info.url_len)),
        ),
    ],
};

pub static MCS_MEDIA_TRACK_INFO_SET_SCHEMA: Schema = Schema {
    name: "McsMediaTrackInfoSet",
    size: size_of::<McsMediaTrackInfoSet>(),
    fields: &[Field::bytes(
        offset_of!(McsMediaTrackInfoSet, media_track_info.p_title),
        Len::u16(offset_of!(McsMediaTrackInfoSet, media_track_info.title_len)),
    )],
};

static MCS_STRING_VALUE: [Field; 1] = [Field::bytes(
    offset_of!(McsClientResultInd, value) + offset_of!(McsString, p_value),
    Len::u16(offset_of!(McsClientResultInd, value) + offset_of!(McsString, len)),
)];

static NO_FIELDS: [Field; 0] = [];

pub static MCS_CLIENT_RESULT_IND_SCHEMA: Schema = Schema {
    name: "McsClientResultInd",
    size: size_of::<McsClientResultInd>(),
    fields: &[Field::Switch {
        tag: Tag::Field {
            at: offset_of!(McsClientResultInd, uuid),
            width: Width::U16,
        },
        arms: &[
            Arm {
                value: mcs_uuid::MEDIA_PLAYER_NAME as u32,
                fields: &MCS_STRING_VALUE,
            },
            Arm {
                value: mcs_uuid::MEDIA_PLAYER_ICON_OBJ_ID as u32,
                fields: &MCS_STRING_VALUE,
            },
            Arm {
                value: mcs_uuid::MEDIA_PLAYER_ICON_URL as u32,
                fields: &MCS_STRING_VALUE,
            },
        ],
        default: Some(&NO_FIELDS),
    }],
};

/// Write the indices of a created broadcast source through the index
/// pointers of each group, subgroup and BIS in use.
fn write_broadcast_indices(
    dst: &mut Arena,
    create: &BroadcastSourceCreate,
    ret: &BroadcastSourceCreateRet,
) -> Result<(), CopyBackError> {
    let groups = create.group.iter().zip(&ret.group);
    for (group, group_ret) in groups.take(create.num_groups.into()) {
        copy_through(dst, group.group_idx, slice::from_ref(&group_ret.group_idx))?;
        let subgroups = group.subgroup.iter().zip(&group_ret.subgroup);
        for (subgroup, subgroup_ret) in subgroups.take(group.num_subgroups.into()) {
            copy_through(dst, subgroup.subgroup_idx, slice::from_ref(&subgroup_ret.subgroup_idx))?;
            let bises = subgroup.bis.iter().zip(&subgroup_ret.bis_idx);
            for (bis, bis_idx) in bises.take(subgroup.num_bis.into()) {
                copy_through(dst, bis.bis_idx, slice::from_ref(bis_idx))?;
            }
        }
    }
    Ok(())
}

#[derive(Debug)]
pub enum LeAudio {}

impl Profile for LeAudio {
    const NAME: &'static str = "le_audio";
    const ACT_MAX: u16 = acts::MAX;
    const EVT_MAX: u16 = evts::MAX;
    const ACT_RET_SIZES: &'static [ActMemOption] = &[
        ActMemOption::new(acts::CSIS_GEN_RSI, CSIS_RSI_LEN as u32),
        ActMemOption::new(acts::SYNC_CREATE, 1),
        ActMemOption::new(acts::SYNC_GET_BIG_INFO, size_of::<BigInfo>() as u32),
        ActMemOption::new(acts::SYNC_GET_BIS_CODEC_CFG, size_of::<CfgCodec>() as u32),
        ActMemOption::new(acts::SYNC_GET_BIS_INFO, size_of::<SyncBisInfo>() as u32),
        ActMemOption::new(
            acts::BROADCAST_SOURCE_CREATE,
            size_of::<BroadcastSourceCreateRet>() as u32,
        ),
        ActMemOption::new(
            acts::BROADCAST_SOURCE_GET_INFO,
            size_of::<BroadcastSourceInfo>() as u32,
        ),
        ActMemOption::new(acts::BROADCAST_SOURCE_GET_CONN_HANDLE, 2),
        ActMemOption::new(acts::VCS_PARAM_GET, size_of::<VcsParam>() as u32),
        ActMemOption::new(acts::VCS_GET_VOLUME_STATE, size_of::<VcsVolumeState>() as u32),
        ActMemOption::new(acts::MAX, 0),
    ];
    const EVT_MEM_SIZES: &'static [EvtMemOption] = &[
        EvtMemOption::new(evts::CODEC_CFG_IND, size_of::<CodecCfgInd>() as u32),
        EvtMemOption::new(evts::QOS_CFG_IND, size_of::<QosCfgInd>() as u32),
        EvtMemOption::new(evts::ENABLE_IND, size_of::<AseInd>() as u32),
        EvtMemOption::new(evts::DISABLE_IND, size_of::<AseInd>() as u32),
        EvtMemOption::new(evts::RELEASE_IND, size_of::<AseInd>() as u32),
        EvtMemOption::new(evts::ISO_DATA_RECEIVE_IND, size_of::<DirectIsoDataInd>() as u32),
        EvtMemOption::new(
            evts::MCS_CLIENT_DISCOVERY_DONE_IND,
            size_of::<McsClientDiscoveryDoneInd>() as u32,
        ),
        EvtMemOption::new(
            evts::MCS_CLIENT_READ_RESULT_IND,
            size_of::<McsClientResultInd>() as u32,
        ),
        EvtMemOption::new(
            evts::MCS_CLIENT_NOTIFY_RESULT_IND,
            size_of::<McsClientResultInd>() as u32,
        ),
        EvtMemOption::new(evts::PA_SYNC_STATE_IND, size_of::<SyncStateInd>() as u32),
        EvtMemOption::new(evts::BIG_SYNC_STATE_IND, size_of::<SyncStateInd>() as u32),
        EvtMemOption::new(evts::PA_BIG_INFO_IND, size_of::<PaBigInfoInd>() as u32),
        EvtMemOption::new(evts::PA_ADV_REPORT_IND, size_of::<PaAdvReportInd>() as u32),
        EvtMemOption::new(
            evts::BASS_GET_PA_SYNC_PARAM_IND,
            size_of::<BassGetPaSyncParamInd>() as u32,
        ),
        EvtMemOption::new(evts::BASS_GET_BIG_SYNC_PARAM_IND, size_of::<BassSourceInd>() as u32),
        EvtMemOption::new(evts::BASS_GET_BROADCAST_CODE_IND, size_of::<BassSourceInd>() as u32),
        EvtMemOption::new(
            evts::BASS_GET_PREFER_BIS_SYNC_IND,
            size_of::<BassGetPreferBisSyncInd>() as u32,
        ),
        EvtMemOption::new(
            evts::BROADCAST_SOURCE_STATE_IND,
            size_of::<BroadcastSourceStateInd>() as u32,
        ),
        EvtMemOption::new(evts::MAX, 0),
    ];

    fn cmd_schema(act: u16) -> Option<&'static Schema> {
        match act {
            acts::ISO_DATA_SEND => Some(&DATA_SEND_SCHEMA),
            acts::MCS_MEDIA_PLAYER_INFO_SET => Some(&MCS_MEDIA_PLAYER_INFO_SET_SCHEMA),
            acts::MCS_MEDIA_TRACK_INFO_SET => Some(&MCS_MEDIA_TRACK_INFO_SET_SCHEMA),
            acts::SYNC_SETUP_DATA_PATH => Some(&SYNC_SETUP_DATA_PATH_SCHEMA),
            acts::BROADCAST_SOURCE_CREATE => Some(&BROADCAST_SOURCE_CREATE_SCHEMA),
            acts::BROADCAST_SOURCE_SETUP_DATA_PATH => Some(&BROADCAST_SOURCE_SETUP_DATA_PATH_SCHEMA),
            acts::BROADCAST_SOURCE_RECONFIG => Some(&BROADCAST_SOURCE_RECONFIG_SCHEMA),
            _ => None,
        }
    }

    fn event_schema(evt: u16) -> Option<&'static Schema> {
        match evt {
            evts::ISO_DATA_RECEIVE_IND => Some(&DIRECT_ISO_DATA_IND_SCHEMA),
            evts::MCS_CLIENT_READ_RESULT_IND | evts::MCS_CLIENT_NOTIFY_RESULT_IND => {
                Some(&MCS_CLIENT_RESULT_IND_SCHEMA)
            }
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
            acts::CSIS_GEN_RSI => {
                let out = dst.resolve(param.cast::<CsisGenRsi>())?.p_rsik;
                copy_through(dst, out, ret)
            }
            acts::SYNC_CREATE => {
                let out = dst.resolve(param.cast::<SyncCreate>())?.sync_handle_id;
                copy_through(dst, out, ret)
            }
            acts::SYNC_GET_BIG_INFO => {
                let out = dst.resolve(param.cast::<SyncGetBigInfo>())?.p_big_info;
                copy_through(dst, out, ret)
            }
            acts::SYNC_GET_BIS_CODEC_CFG => {
                let out = dst.resolve(param.cast::<SyncGetBisCodecCfg>())?.p_codec_cfg;
                copy_through(dst, out, ret)
            }
            acts::SYNC_GET_BIS_INFO => {
                let out = dst.resolve(param.cast::<SyncGetBisInfo>())?.p_bis_info;
                copy_through(dst, out, ret)
            }
            acts::BROADCAST_SOURCE_CREATE => {
                let (indices, _) = BroadcastSourceCreateRet::read_from_prefix(ret).map_err(|_| {
                    CopyBackError::RetTooShort {
                        required: size_of::<BroadcastSourceCreateRet>(),
                        available: ret.len(),
                    }
                })?;
                let create = *dst.resolve(param.cast::<BroadcastSourceCreate>())?;
                write_broadcast_indices(dst, &create, &indices)
            }
            acts::BROADCAST_SOURCE_GET_INFO => {
                let out = dst.resolve(param.cast::<BroadcastSourceInfoGet>())?.p_info;
                copy_through(dst, out, ret)
            }
            acts::BROADCAST_SOURCE_GET_CONN_HANDLE => {
                let out = dst
                    .resolve(param.cast::<BroadcastSourceConnHandleGet>())?
                    .p_bis_conn_handle;
                copy_through(dst, out, ret)
            }
            acts::VCS_PARAM_GET => copy_into(dst, param.cast::<VcsParam>(), ret),
            acts::VCS_GET_VOLUME_STATE => {
                let out = dst.resolve(param.cast::<VcsGetVolumeState>())?.p_vcs_volume_state;
                copy_through(dst, out, ret)
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use bt_ipc_marshal::{PushError, WalkError, align_up};
    use zerocopy::FromZeros;

    use super::*;

    const LC3: [u8; CODEC_ID_LEN] = [0x06, 0, 0, 0, 0];

    /// Caller side of a 2x2x2 broadcast source: the command and every
    /// index cell, in tree order.
    struct Tree {
        param: Ref<BroadcastSourceCreate>,
        group_idx: [Ref<u8>; 2],
        subgroup_idx: [Ref<u8>; 4],
        bis_idx: [Ref<u8>; 8],
    }

    fn leaf_cfg(leaf: usize) -> [u8; 6] {
        [leaf as u8 + 1; 6]
    }

    fn tree(arena: &mut Arena) -> Tree {
        let group_idx = [0; 2].map(|_| arena.alloc(&0xFFu8));
        let subgroup_idx = [0; 4].map(|_| arena.alloc(&0xFFu8));
        let bis_idx = [0; 8].map(|_| arena.alloc(&0xFFu8));

        let mut groups = [BroadcastGroup::EMPTY; 2];
        for (g, group) in groups.iter_mut().enumerate() {
            let mut subgroups = [BroadcastSubgroup::EMPTY; 2];
            for (s, subgroup) in subgroups.iter_mut().enumerate() {
                let sg = g * 2 + s;
                let mut bises = [BroadcastBis::EMPTY; 2];
                for (b, bis) in bises.iter_mut().enumerate() {
                    let leaf = sg * 2 + b;
                    let l3 = arena.alloc_bytes(&leaf_cfg(leaf));
                    *bis = BroadcastBis::new(l3.into(), 6, bis_idx[leaf].into());
                }
                let l2 = arena.alloc_bytes(&[0x02, 0x01, 0x03, 0x02, sg as u8]);
                let metadata = arena.alloc_bytes(&[0x03, 0x02, sg as u8]);
                *subgroup = BroadcastSubgroup::new(
                    LC3,
                    l2.into(),
                    5,
                    metadata.into(),
                    3,
                    &bises,
                    subgroup_idx[sg].into(),
                );
            }
            *group = BroadcastGroup::new(40_000, &subgroups, group_idx[g].into());
        }
        let param = arena.alloc(&BroadcastSourceCreate::new(&groups));
        Tree {
            param,
            group_idx,
            subgroup_idx,
            bis_idx,
        }
    }

    #[test]
    fn test_broadcast_source_create_round_trip() {
        let mut arena = Arena::new();
        let tree = tree(&mut arena);

        let act = acts::BROADCAST_SOURCE_CREATE;
        let request = LeAudio::push_cmd(act, &arena, tree.param, 0).unwrap();
        // Per subgroup: l2, metadata, then both l3 configs
        let per_subgroup = align_up(5) + align_up(3) + 2 * align_up(6);
        assert_eq!(request.actual_size(), 332 + 4 * per_subgroup);

        let view = LeAudio::pop_cmd(act, request.payload()).unwrap();
        let root = view.root::<BroadcastSourceCreate>().unwrap();
        assert_eq!(root.num_groups, 2);
        for (g, group) in root.group.iter().enumerate() {
            assert_eq!(group.num_subgroups, 2);
            assert_eq!(group.group_idx.get(), Some(tree.group_idx[g]));
            for (s, subgroup) in group.subgroup.iter().enumerate() {
                let sg = g * 2 + s;
                assert_eq!(view.follow_slice(&subgroup.p_codec_cfg_l2, 5).unwrap()[4], sg as u8);
                assert_eq!(view.follow_slice(&subgroup.p_metadata, 3).unwrap()[2], sg as u8);
                for (b, bis) in subgroup.bis[..2].iter().enumerate() {
                    let leaf = sg * 2 + b;
                    assert_eq!(view.follow_slice(&bis.p_codec_cfg_l3, 6).unwrap(), &leaf_cfg(leaf));
                }
            }
        }

        // Depth first within the first subgroup
        let first = &root.group[0].subgroup[0];
        assert_eq!(first.p_codec_cfg_l2.get(), Some(Ref::from_offset(332)));
        assert_eq!(first.p_metadata.get(), Some(Ref::from_offset(340)));
        assert_eq!(first.bis[0].p_codec_cfg_l3.get(), Some(Ref::from_offset(344)));
        assert_eq!(first.bis[1].p_codec_cfg_l3.get(), Some(Ref::from_offset(352)));
        assert_eq!(
            root.group[0].subgroup[1].p_codec_cfg_l2.get(),
            Some(Ref::from_offset(360))
        );
    }

    #[test]
    fn test_broadcast_source_create_rejects_excess_bis() {
        let mut arena = Arena::new();
        let subgroup = BroadcastSubgroup {
            num_bis: 5,
            ..BroadcastSubgroup::EMPTY
        };
        let group = BroadcastGroup::new(0, &[subgroup], Ptr::null());
        let param = arena.alloc(&BroadcastSourceCreate::new(&[group]));

        let err = LeAudio::push_cmd(acts::BROADCAST_SOURCE_CREATE, &arena, param, 0).unwrap_err();
        assert_eq!(
            err,
            PushError::Walk(WalkError::CountOutOfRange {
                count: 5,
                max: ISO_MAX_BIS_NUM,
            })
        );
    }

    #[test]
    fn test_broadcast_source_create_writes_indices() {
        let mut arena = Arena::new();
        let tree = tree(&mut arena);

        // group, subgroup and bis indices, numbered in tree order
        let mut ret = BroadcastSourceCreateRet::new_zeroed();
        for (g, group) in ret.group.iter_mut().enumerate() {
            group.group_idx = 10 + g as u8;
            for (s, subgroup) in group.subgroup.iter_mut().enumerate() {
                let sg = g * 2 + s;
                subgroup.subgroup_idx = 20 + sg as u8;
                subgroup.bis_idx = [30 + 2 * sg as u8, 31 + 2 * sg as u8, 0, 0];
            }
        }

        let act = acts::BROADCAST_SOURCE_CREATE;
        assert_eq!(LeAudio::act_ret_param_size(act), 22);
        LeAudio::copy_act_ret_param(act, &mut arena, tree.param.cast(), ret.as_bytes()).unwrap();

        let read = |r: &Ref<u8>| *arena.resolve(*r).unwrap();
        assert_eq!(tree.group_idx.map(|r| read(&r)), [10, 11]);
        assert_eq!(tree.subgroup_idx.map(|r| read(&r)), [20, 21, 22, 23]);
        assert_eq!(tree.bis_idx.map(|r| read(&r)), [30, 31, 32, 33, 34, 35, 36, 37]);
    }

    #[test]
    fn test_broadcast_source_create_skips_unused_nodes() {
        let mut arena = Arena::new();
        let group_idx = arena.alloc(&0xFFu8);
        let subgroup_idx = arena.alloc(&0xFFu8);
        let bis_idx = arena.alloc(&0xFFu8);
        let bis = BroadcastBis::new(Ptr::null(), 0, bis_idx.into());
        let subgroup =
            BroadcastSubgroup::new(LC3, Ptr::null(), 0, Ptr::null(), 0, &[bis], subgroup_idx.into());
        let group = BroadcastGroup::new(0, &[subgroup], group_idx.into());
        let param = arena.alloc(&BroadcastSourceCreate::new(&[group]));

        let ret: [u8; 22] = core::array::from_fn(|i| i as u8);
        let act = acts::BROADCAST_SOURCE_CREATE;
        LeAudio::copy_act_ret_param(act, &mut arena, param.cast(), &ret).unwrap();
        // bis_idx[0], subgroup_idx, group_idx of the first group
        assert_eq!(*arena.resolve(bis_idx).unwrap(), 0);
        assert_eq!(*arena.resolve(subgroup_idx).unwrap(), 4);
        assert_eq!(*arena.resolve(group_idx).unwrap(), 10);

        let err = LeAudio::copy_act_ret_param(act, &mut arena, param.cast(), &ret[..10]).unwrap_err();
        assert_eq!(
            err,
            CopyBackError::RetTooShort {
                required: 22,
                available: 10,
            }
        );
    }

    #[test]
    fn test_setup_data_paths_walk_embedded_config() {
        let mut arena = Arena::new();
        let config = arena.alloc_bytes(&[0x02, 0x01, 0x08]);
        let setup = BisSetupDataPath::new(LC3, config.into(), 3);
        let sync = arena.alloc(&SyncSetupDataPath::new(1, 2, setup));
        let source = arena.alloc(&BroadcastSourceSetupDataPath::new(0x1000, 1, setup));

        let request = LeAudio::push_cmd(acts::SYNC_SETUP_DATA_PATH, &arena, sync, 0).unwrap();
        assert_eq!(request.actual_size(), 24 + 4);
        let view = LeAudio::pop_cmd(acts::SYNC_SETUP_DATA_PATH, request.payload()).unwrap();
        let root = view.root::<SyncSetupDataPath>().unwrap();
        assert_eq!(root.bis_idx, 2);
        assert_eq!(view.follow_slice(&root.setup_param.p_codec_config, 3).unwrap(), &[2, 1, 8]);

        let act = acts::BROADCAST_SOURCE_SETUP_DATA_PATH;
        let request = LeAudio::push_cmd(act, &arena, source, 0).unwrap();
        assert_eq!(request.actual_size(), 28 + 4);
        let view = LeAudio::pop_cmd(act, request.payload()).unwrap();
        let root = view.root::<BroadcastSourceSetupDataPath>().unwrap();
        assert_eq!(root.setup_param.p_codec_config.get(), Some(Ref::from_offset(28)));
    }

    #[test]
    fn test_reconfig_metadata() {
        let mut arena = Arena::new();
        let metadata = arena.alloc_bytes(&[0x03, 0x02, 0x04, 0x00]);
        let param = arena.alloc(&BroadcastSourceReconfig::new(0x1000, 0, 1, metadata.into(), 4));

        let act = acts::BROADCAST_SOURCE_RECONFIG;
        let request = LeAudio::push_cmd(act, &arena, param, 0).unwrap();
        assert_eq!(request.actual_size(), 12 + 4);
        let view = LeAudio::pop_cmd(act, request.payload()).unwrap();
        let root = view.root::<BroadcastSourceReconfig>().unwrap();
        assert_eq!(root.subgroup_idx, 1);
        assert_eq!(view.follow_slice(&root.p_metadata, 4).unwrap(), &[3, 2, 4, 0]);
    }

    #[test]
    fn test_media_player_info_three_strings() {
        let mut arena = Arena::new();
        let name = arena.alloc_bytes(b"Player");
        let fmt = arena.alloc_bytes(b"png");
        let url = arena.alloc_bytes(b"http://x/i.png");
        let param = arena.alloc(&McsMediaPlayerInfoSet::new(
            1,
            (name.into(), 6),
            (fmt.into(), 3),
            (url.into(), 14),
        ));

        let act = acts::MCS_MEDIA_PLAYER_INFO_SET;
        let request = LeAudio::push_cmd(act, &arena, param, 0).unwrap();
        assert_eq!(request.actual_size(), 24 + 8 + 4 + 16);

        let view = LeAudio::pop_cmd(act, request.payload()).unwrap();
        let info = view.root::<McsMediaPlayerInfoSet>().unwrap().media_player_info;
        assert_eq!(view.follow_slice(&info.p_player_name, 6).unwrap(), b"Player");
        assert_eq!(view.follow_slice(&info.p_icon_fmt, 3).unwrap(), b"png");
        assert_eq!(view.follow_slice(&info.p_url, 14).unwrap(), b"http://x/i.png");
        assert_eq!(info.p_url.get(), Some(Ref::from_offset(36)));
    }

    #[test]
    fn test_media_track_info_title() {
        let mut arena = Arena::new();
        let title = arena.alloc_bytes(b"Track 01");
        let param = arena.alloc(&McsMediaTrackInfoSet::new(1, 180_000, title.into(), 8));

        let act = acts::MCS_MEDIA_TRACK_INFO_SET;
        let request = LeAudio::push_cmd(act, &arena, param, 0).unwrap();
        assert_eq!(request.actual_size(), 20 + 8);
        let view = LeAudio::pop_cmd(act, request.payload()).unwrap();
        let track = view.root::<McsMediaTrackInfoSet>().unwrap().media_track_info;
        assert_eq!(track.track_duration.get(), 180_000);
        assert_eq!(view.follow_slice(&track.p_title, 8).unwrap(), b"Track 01");
    }

    #[test]
    fn test_mcs_result_switches_on_uuid() {
        let mut arena = Arena::new();
        let url = arena.alloc_bytes(b"http://x/icon");
        let icon = arena.alloc(&McsClientResultInd::with_string(
            0x40,
            mcs_uuid::MEDIA_PLAYER_ICON_OBJ_ID,
            url.into(),
            13,
        ));

        for evt in [evts::MCS_CLIENT_READ_RESULT_IND, evts::MCS_CLIENT_NOTIFY_RESULT_IND] {
            let event = LeAudio::push_event(evt, &arena, icon, 0).unwrap();
            assert_eq!(event.actual_size(), 16 + 16);
            let view = LeAudio::pop_event(evt, event.payload()).unwrap();
            let string = view.root::<McsClientResultInd>().unwrap().string().unwrap();
            assert_eq!(string.p_value.get().unwrap().offset(), 16);
            assert_eq!(view.follow_slice(&string.p_value, 13).unwrap(), b"http://x/icon");
        }

        // The icon URL uuid carries the track title string
        let title = arena.alloc_bytes(b"Track 01");
        let track = arena.alloc(&McsClientResultInd::with_string(
            0x40,
            mcs_uuid::MEDIA_PLAYER_ICON_URL,
            title.into(),
            8,
        ));
        let evt = evts::MCS_CLIENT_READ_RESULT_IND;
        let event = LeAudio::push_event(evt, &arena, track, 0).unwrap();
        assert_eq!(event.actual_size(), 16 + 8);
        let view = LeAudio::pop_event(evt, event.payload()).unwrap();
        let string = view.root::<McsClientResultInd>().unwrap().string().unwrap();
        assert_eq!(view.follow_slice(&string.p_value, 8).unwrap(), b"Track 01");

        // Track title results have no string arm: the value travels as is
        let untouched = arena.alloc(&McsClientResultInd::with_string(
            0x40,
            mcs_uuid::TRACK_TITLE,
            title.into(),
            8,
        ));
        let event = LeAudio::push_event(evt, &arena, untouched, 0).unwrap();
        assert_eq!(event.actual_size(), 16);
        let root = LeAudio::pop_event(evt, event.payload())
            .unwrap()
            .root::<McsClientResultInd>()
            .unwrap();
        assert!(root.string().is_none());
        assert_eq!(root.value, arena.resolve(untouched).unwrap().value);

        // Track duration: the value is a scalar and travels in place
        let duration = 180_000i32.to_le_bytes();
        let value = [duration[0], duration[1], duration[2], duration[3], 0, 0, 0, 0];
        let scalar = arena.alloc(&McsClientResultInd::with_value(0x40, 0x2B98, value));
        let evt = evts::MCS_CLIENT_NOTIFY_RESULT_IND;
        let event = LeAudio::push_event(evt, &arena, scalar, 0).unwrap();
        assert_eq!(event.actual_size(), 16);
        let view = LeAudio::pop_event(evt, event.payload()).unwrap();
        let root = view.root::<McsClientResultInd>().unwrap();
        assert!(root.string().is_none());
        assert_eq!(root.value, value);
    }

    #[test]
    fn test_iso_and_pa_reports() {
        let mut arena = Arena::new();
        let sdu = arena.alloc_bytes(&[0x11; 40]);
        let send = arena.alloc(&DataSendInfo::new(0x20, 1, sdu.into(), 40));
        let request = LeAudio::push_cmd(acts::ISO_DATA_SEND, &arena, send, 0).unwrap();
        assert_eq!(request.actual_size(), 16 + 40);

        let ind = arena.alloc(&DirectIsoDataInd::new(0x20, 1, sdu.into(), 40));
        let event = LeAudio::push_event(evts::ISO_DATA_RECEIVE_IND, &arena, ind, 0).unwrap();
        let view = LeAudio::pop_event(evts::ISO_DATA_RECEIVE_IND, event.payload()).unwrap();
        let root = view.root::<DirectIsoDataInd>().unwrap();
        assert_eq!(view.follow_slice(&root.p_buf, 40).unwrap(), &[0x11; 40]);

        let adv = arena.alloc_bytes(&[0x05, 0x16, 0x51, 0x18, 0x01, 0x02]);
        let mut report = PaAdvReportInd::new_zeroed();
        report.sync_handle = U16::new(3);
        report.data_len = 6;
        report.p_data = adv.into();
        let report = arena.alloc(&report);
        let event = LeAudio::push_event(evts::PA_ADV_REPORT_IND, &arena, report, 0).unwrap();
        assert_eq!(event.actual_size(), 16 + 8);
        let view = LeAudio::pop_event(evts::PA_ADV_REPORT_IND, event.payload()).unwrap();
        let root = view.root::<PaAdvReportInd>().unwrap();
        assert_eq!(view.follow_slice(&root.p_data, 6).unwrap()[2], 0x51);
    }

    #[test]
    fn test_getters() {
        let mut arena = Arena::new();

        let rsik = arena.alloc(&[0u8; CSIS_RSI_LEN]);
        let param = arena.alloc(&CsisGenRsi::new(0, rsik.into()));
        let rsi = [0xA1, 0xA2, 0xA3, 0xA4, 0xA5, 0xA6];
        assert_eq!(LeAudio::act_ret_param_size(acts::CSIS_GEN_RSI), 6);
        LeAudio::copy_act_ret_param(acts::CSIS_GEN_RSI, &mut arena, param.cast(), &rsi).unwrap();
        assert_eq!(*arena.resolve(rsik).unwrap(), rsi);

        let sync_handle = arena.alloc(&0xFFu8);
        let addr = LeAddr::new(0, [1, 2, 3, 4, 5, 6]);
        let param = arena.alloc(&SyncCreate::new(addr, 1, sync_handle.into()));
        LeAudio::copy_act_ret_param(acts::SYNC_CREATE, &mut arena, param.cast(), &[7]).unwrap();
        assert_eq!(*arena.resolve(sync_handle).unwrap(), 7);

        let big_info = arena.alloc(&BigInfo::new_zeroed());
        let param = arena.alloc(&SyncGetBigInfo::new(7, big_info.into()));
        let mut expected = BigInfo::new_zeroed();
        expected.num_bis = 2;
        expected.sdu_interval = U32::new(10_000);
        let act = acts::SYNC_GET_BIG_INFO;
        LeAudio::copy_act_ret_param(act, &mut arena, param.cast(), expected.as_bytes()).unwrap();
        assert_eq!(*arena.resolve(big_info).unwrap(), expected);

        let handle = arena.alloc(&U16::new(0));
        let param = arena.alloc(&BroadcastSourceConnHandleGet::new(0x1000, 1, handle.into()));
        let act = acts::BROADCAST_SOURCE_GET_CONN_HANDLE;
        LeAudio::copy_act_ret_param(act, &mut arena, param.cast(), &[0x31, 0x00]).unwrap();
        assert_eq!(arena.resolve(handle).unwrap().get(), 0x31);

        let state = arena.alloc(&VcsVolumeState::new_zeroed());
        let param = arena.alloc(&VcsGetVolumeState::new(0x40, state.into()));
        let act = acts::VCS_GET_VOLUME_STATE;
        LeAudio::copy_act_ret_param(act, &mut arena, param.cast(), &[100, 1, 9]).unwrap();
        assert_eq!(
            *arena.resolve(state).unwrap(),
            VcsVolumeState {
                volume_setting: 100,
                mute: 1,
                change_counter: 9,
            }
        );
    }

    #[test]
    fn test_vcs_param_get_fills_root() {
        let mut arena = Arena::new();
        let param = arena.alloc(&VcsParam::new_zeroed());
        let act = acts::VCS_PARAM_GET;
        assert_eq!(LeAudio::act_ret_param_size(act), 5);
        LeAudio::copy_act_ret_param(act, &mut arena, param.cast(), &[50, 0, 3, 1, 10]).unwrap();
        let vcs = arena.resolve(param).unwrap();
        assert_eq!(vcs.volume_setting, 50);
        assert_eq!(vcs.step_size, 10);
    }

    #[test]
    fn test_tables() {
        assert_eq!(LeAudio::act_ret_param_size(acts::SYNC_GET_BIS_INFO), 20);
        assert_eq!(LeAudio::act_ret_param_size(acts::BROADCAST_SOURCE_ENABLE), 0);
        assert_eq!(LeAudio::evt_mem_size(evts::MCS_CLIENT_READ_RESULT_IND), Some(16));
        assert_eq!(LeAudio::evt_mem_size(evts::PA_BIG_INFO_IND), Some(24));
        assert_eq!(LeAudio::evt_mem_size(0x40), None);
    }
}
