//! Device level parameters: enabling and disabling the stack.
//!
//! [`acts::BT_ENABLE`] carries the whole application configuration. With LE
//! Audio built in, the device registers the PACS records (and optionally the
//! MCS service) while enabling, and hands back their ids in the ret region.
//! They are written through the out pointers held in the configuration.

use bitflags::bitflags;
#[cfg(feature = "le-audio")]
use bt_ipc_marshal::table::{copy_through, ret_at};
use bt_ipc_marshal::{ActMemOption, Arena, CopyBackError, EvtMemOption, Profile, Ptr, Ref};
use static_assertions::const_assert_eq;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, little_endian::*};

pub mod acts {
    pub const BT_ENABLE: u16 = 0x01;
    pub const BT_DISABLE: u16 = 0x02;
    pub const MAX: u16 = 0x03;
}

pub mod evts {
    pub const MAX: u16 = 0x01;
}

bitflags! {
    /// LE Audio profiles an application asks the stack to register.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct LeAudioProfile: u32 {
        const PACS = 1 << 0;
        const ASCS = 1 << 1;
        const BASS = 1 << 2;
        const CSIS = 1 << 3;
        const VCS = 1 << 4;
        const MCS = 1 << 5;
        const BAP = 1 << 6;
        const CAP = 1 << 7;
        const VCP = 1 << 8;
        const MCP = 1 << 9;
    }
}

/// PACS registration. The ids are outputs of [`acts::BT_ENABLE`].
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct PacsParam {
    pub sink_audio_location: U32,
    pub source_audio_location: U32,
    pub sink_available_contexts: U16,
    pub source_available_contexts: U16,
    pub sink_supported_contexts: U16,
    pub source_supported_contexts: U16,
    pub p_sink_pac_id: Ptr<i8>,
    pub p_pac_sink_codec: Ptr<i8>,
    pub p_source_pac_id: Ptr<i8>,
    pub p_pac_source_codec: Ptr<i8>,
}

// Verify struct size
const_assert_eq!(size_of::<PacsParam>(), 32);

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct McsParam {
    pub general_mcs: u8,
    _padding: [u8; 3],
    pub char_media_control_point_opcodes_supported: U32,
    pub p_mcs_id: Ptr<i8>,
}

// Verify struct size
const_assert_eq!(size_of::<McsParam>(), 12);

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct LeAudioAppConf {
    profile_support: U32,
    pub pacs_param: PacsParam,
    pub mcs_param: McsParam,
}

impl LeAudioAppConf {
    pub fn new(profile_support: LeAudioProfile, pacs_param: PacsParam, mcs_param: McsParam) -> Self {
        Self {
            profile_support: U32::new(profile_support.bits()),
            pacs_param,
            mcs_param,
        }
    }

    pub fn profile_support(&self) -> LeAudioProfile {
        LeAudioProfile::from_bits_retain(self.profile_support.get())
    }
}

/// Parameter of [`acts::BT_ENABLE`].
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct AppConf {
    pub app_profile_support: U32,
    pub mtu_size: U16,
    pub prefer_all_phy: u8,
    pub prefer_tx_phy: u8,
    pub prefer_rx_phy: u8,
    _padding: u8,
    pub max_tx_octets: U16,
    pub max_tx_time: U16,
    pub user_def_service: u8,
    pub cccd_not_check: u8,
    pub le_audio_app_conf: LeAudioAppConf,
}

// Verify struct size
const_assert_eq!(size_of::<AppConf>(), 64);

impl AppConf {
    pub fn new(app_profile_support: u32, mtu_size: u16, le_audio_app_conf: LeAudioAppConf) -> Self {
        Self {
            app_profile_support: U32::new(app_profile_support),
            mtu_size: U16::new(mtu_size),
            prefer_all_phy: 0,
            prefer_tx_phy: 0,
            prefer_rx_phy: 0,
            _padding: 0,
            max_tx_octets: U16::new(0),
            max_tx_time: U16::new(0),
            user_def_service: 0,
            cccd_not_check: 0,
            le_audio_app_conf,
        }
    }
}

impl PacsParam {
    pub fn new(
        p_sink_pac_id: Ptr<i8>,
        p_pac_sink_codec: Ptr<i8>,
        p_source_pac_id: Ptr<i8>,
        p_pac_source_codec: Ptr<i8>,
    ) -> Self {
        Self {
            sink_audio_location: U32::new(0),
            source_audio_location: U32::new(0),
            sink_available_contexts: U16::new(0),
            source_available_contexts: U16::new(0),
            sink_supported_contexts: U16::new(0),
            source_supported_contexts: U16::new(0),
            p_sink_pac_id,
            p_pac_sink_codec,
            p_source_pac_id,
            p_pac_source_codec,
        }
    }
}

impl McsParam {
    pub fn new(general_mcs: bool, p_mcs_id: Ptr<i8>) -> Self {
        Self {
            general_mcs: general_mcs.into(),
            _padding: [0; 3],
            char_media_control_point_opcodes_supported: U32::new(0),
            p_mcs_id,
        }
    }
}

/// Stack enable/disable.
#[derive(Debug)]
pub enum Device {}

impl Profile for Device {
    const NAME: &'static str = "device";
    const ACT_MAX: u16 = acts::MAX;
    const EVT_MAX: u16 = evts::MAX;
    #[cfg(feature = "le-audio")]
    const ACT_RET_SIZES: &'static [ActMemOption] = &[
        // Four PACS ids, then the MCS id
        ActMemOption::new(acts::BT_ENABLE, 5),
        ActMemOption::new(acts::MAX, 0),
    ];
    #[cfg(not(feature = "le-audio"))]
    const ACT_RET_SIZES: &'static [ActMemOption] = &[ActMemOption::new(acts::MAX, 0)];
    const EVT_MEM_SIZES: &'static [EvtMemOption] = &[EvtMemOption::new(evts::MAX, 0)];

    fn copy_act_ret_param(
        act: u16,
        dst: &mut Arena,
        param: Ref<[u8]>,
        ret: &[u8],
    ) -> Result<(), CopyBackError> {
        match act {
            #[cfg(feature = "le-audio")]
            acts::BT_ENABLE => {
                let conf = dst.resolve(param.cast::<AppConf>())?.le_audio_app_conf;
                let pacs = conf.pacs_param;
                copy_through(dst, pacs.p_sink_pac_id, ret_at(ret, 0, 1)?)?;
                copy_through(dst, pacs.p_pac_sink_codec, ret_at(ret, 1, 1)?)?;
                copy_through(dst, pacs.p_source_pac_id, ret_at(ret, 2, 1)?)?;
                copy_through(dst, pacs.p_pac_source_codec, ret_at(ret, 3, 1)?)?;
                if conf.profile_support().contains(LeAudioProfile::MCS) {
                    copy_through(dst, conf.mcs_param.p_mcs_id, ret_at(ret, 4, 1)?)?;
                }
                Ok(())
            }
            _ => {
                let _ = (dst, param, ret);
                Ok(())
            }
        }
    }
}
