//! A2DP parameters.
//!
//! Only the outgoing media frame is deep copied. Incoming stream data and
//! every other event travel flat.

use core::mem::offset_of;

use bt_ipc_marshal::{ActMemOption, EvtMemOption, Field, Len, Profile, Ptr, Schema};
use static_assertions::const_assert_eq;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, little_endian::*};

use crate::le_gap::BD_ADDR_LEN;

pub mod acts {
    pub const SDP_DISCOVER: u16 = 0x01;
    pub const CONNECT: u16 = 0x02;
    pub const DISCONNECT: u16 = 0x03;
    pub const START: u16 = 0x04;
    pub const SUSPEND: u16 = 0x05;
    pub const SEND_DATA: u16 = 0x06;
    pub const MAX: u16 = 0x07;
}

pub mod evts {
    pub const CONN_IND: u16 = 0x01;
    pub const CONN_CMPL: u16 = 0x02;
    pub const DISCONN_CMPL: u16 = 0x03;
    pub const CONFIG_CMPL: u16 = 0x04;
    pub const STREAM_OPEN: u16 = 0x05;
    pub const STREAM_START_IND: u16 = 0x06;
    pub const STREAM_START_RSP: u16 = 0x07;
    pub const STREAM_STOP: u16 = 0x08;
    pub const STREAM_CLOSE: u16 = 0x09;
    pub const STREAM_DATA_IND: u16 = 0x0A;
    pub const STREAM_DATA_RSP: u16 = 0x0B;
    pub const SDP_ATTR_INFO: u16 = 0x0C;
    pub const MAX: u16 = 0x0D;
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct StreamDataSend {
    pub bd_addr: [u8; BD_ADDR_LEN],
    pub seq_num: U16,
    pub time_stamp: U32,
    pub frame_num: u8,
    _padding: u8,
    pub len: U16,
    pub frame_buf: Ptr<[u8]>,
}

// Verify struct size
const_assert_eq!(size_of::<StreamDataSend>(), 20);

impl StreamDataSend {
    pub fn new(
        bd_addr: [u8; BD_ADDR_LEN],
        seq_num: u16,
        time_stamp: u32,
        frame_num: u8,
        frame_buf: Ptr<[u8]>,
        len: u16,
    ) -> Self {
        Self {
            bd_addr,
            seq_num: U16::new(seq_num),
            time_stamp: U32::new(time_stamp),
            frame_num,
            _padding: 0,
            len: U16::new(len),
            frame_buf,
        }
    }
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

/// SBC codec configuration reported by [`evts::CONFIG_CMPL`].
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct Codec {
    pub codec_type: u8,
    pub sampling_frequency_mask: u8,
    pub channel_mode_mask: u8,
    pub block_length_mask: u8,
    pub subbands_mask: u8,
    pub allocation_method_mask: u8,
    pub min_bitpool: u8,
    pub max_bitpool: u8,
    pub bd_addr: [u8; BD_ADDR_LEN],
    _padding: [u8; 2],
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct StreamStart {
    pub bd_addr: [u8; BD_ADDR_LEN],
    pub active_a2dp_idx: u8,
    pub stream_cfg: u8,
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct StreamDataInd {
    pub bd_addr: [u8; BD_ADDR_LEN],
    pub seq_num: U16,
    pub timestamp: U32,
    pub frame_num: U16,
    pub len: U16,
    /// Not deep copied: points into memory the receiver already owns
    pub payload: Ptr<[u8]>,
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct StreamDataRsp {
    pub bd_addr: [u8; BD_ADDR_LEN],
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct SdpAttrInfo {
    pub bd_addr: [u8; BD_ADDR_LEN],
    pub srv_class_uuid_type: u8,
    _padding: u8,
    pub srv_class_uuid_data: [u8; 16],
    pub server_channel: u8,
    pub supported_repos: u8,
    pub l2c_psm: U16,
    pub protocol_version: U16,
    pub supported_feat: U16,
}

pub static STREAM_DATA_SEND_SCHEMA: Schema = Schema {
    name: "StreamDataSend",
    size: size_of::<StreamDataSend>(),
    fields: &[Field::bytes(
        offset_of!(StreamDataSend, frame_buf),
        Len::u16(offset_of!(StreamDataSend, len)),
    )],
};

#[derive(Debug)]
pub enum A2dp {}

impl Profile for A2dp {
    const NAME: &'static str = "a2dp";
    const ACT_MAX: u16 = acts::MAX;
    const EVT_MAX: u16 = evts::MAX;
    const ACT_RET_SIZES: &'static [ActMemOption] = &[ActMemOption::new(acts::MAX, 0)];
    const EVT_MEM_SIZES: &'static [EvtMemOption] = &[
        EvtMemOption::new(evts::CONN_IND, size_of::<ConnInd>() as u32),
        EvtMemOption::new(evts::CONN_CMPL, size_of::<ConnInd>() as u32),
        EvtMemOption::new(evts::DISCONN_CMPL, size_of::<DisconnInd>() as u32),
        EvtMemOption::new(evts::CONFIG_CMPL, size_of::<Codec>() as u32),
        EvtMemOption::new(evts::STREAM_OPEN, 0),
        EvtMemOption::new(evts::STREAM_START_IND, size_of::<StreamStart>() as u32),
        EvtMemOption::new(evts::STREAM_START_RSP, size_of::<StreamStart>() as u32),
        EvtMemOption::new(evts::STREAM_STOP, size_of::<ConnInd>() as u32),
        EvtMemOption::new(evts::STREAM_CLOSE, size_of::<ConnInd>() as u32),
        EvtMemOption::new(evts::STREAM_DATA_IND, size_of::<StreamDataInd>() as u32),
        EvtMemOption::new(evts::STREAM_DATA_RSP, size_of::<StreamDataRsp>() as u32),
        EvtMemOption::new(evts::SDP_ATTR_INFO, size_of::<SdpAttrInfo>() as u32),
        EvtMemOption::new(evts::MAX, 0),
    ];

    fn cmd_schema(act: u16) -> Option<&'static Schema> {
        match act {
            acts::SEND_DATA => Some(&STREAM_DATA_SEND_SCHEMA),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use bt_ipc_marshal::{Arena, Ref, align_up};

    use super::*;

    const SINK: [u8; BD_ADDR_LEN] = [0x10, 0x20, 0x30, 0x40, 0x50, 0x60];

    #[test]
    fn test_send_data_round_trip() {
        let mut arena = Arena::new();
        let frame = arena.alloc_bytes(&[0x9C; 119]);
        let param = arena.alloc(&StreamDataSend::new(SINK, 7, 0x1000, 1, frame.into(), 119));

        let request = A2dp::push_cmd(acts::SEND_DATA, &arena, param, 0).unwrap();
        assert_eq!(request.actual_size(), 20 + align_up(119));

        let view = A2dp::pop_cmd(acts::SEND_DATA, request.payload()).unwrap();
        let root = view.root::<StreamDataSend>().unwrap();
        assert_eq!(root.seq_num.get(), 7);
        assert_eq!(view.follow_slice(&root.frame_buf, 119).unwrap(), &[0x9C; 119]);
    }

    #[test]
    fn test_send_data_zero_length() {
        let mut arena = Arena::new();
        let frame = arena.alloc_bytes(&[]);
        let param = arena.alloc(&StreamDataSend::new(SINK, 0, 0, 0, frame.into(), 0));

        let request = A2dp::push_cmd(acts::SEND_DATA, &arena, param, 0).unwrap();
        assert_eq!(request.actual_size(), align_up(size_of::<StreamDataSend>()));

        let view = A2dp::pop_cmd(acts::SEND_DATA, request.payload()).unwrap();
        let root = view.root::<StreamDataSend>().unwrap();
        assert_eq!(root.frame_buf.get(), Some(Ref::from_offset(20)));
        assert!(view.follow_slice(&root.frame_buf, 0).unwrap().is_empty());
    }

    #[test]
    fn test_tables() {
        assert_eq!(A2dp::act_ret_param_size(acts::SEND_DATA), 0);
        assert_eq!(A2dp::evt_mem_size(evts::STREAM_OPEN), Some(0));
        assert_eq!(A2dp::evt_mem_size(evts::CONFIG_CMPL), Some(16));
        assert_eq!(A2dp::evt_mem_size(0x40), None);
    }
}
