//! AVRCP parameters. Every command and event is flat.

use bt_ipc_marshal::{ActMemOption, EvtMemOption, Profile};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::le_gap::BD_ADDR_LEN;

pub mod acts {
    pub const CONNECT: u16 = 0x01;
    pub const DISCONNECT: u16 = 0x02;
    pub const PLAY: u16 = 0x03;
    pub const PAUSE: u16 = 0x04;
    pub const STOP: u16 = 0x05;
    pub const FORWARD: u16 = 0x06;
    pub const BACKWARD: u16 = 0x07;
    pub const REWIND_START: u16 = 0x08;
    pub const REWIND_STOP: u16 = 0x09;
    pub const FAST_FORWARD_START: u16 = 0x0A;
    pub const FAST_FORWARD_STOP: u16 = 0x0B;
    pub const ABSOLUTE_VOLUME_SET: u16 = 0x0C;
    pub const VOLUME_CHANGE_REQ: u16 = 0x0D;
    pub const MAX: u16 = 0x0E;
}

pub mod evts {
    pub const CONN_IND: u16 = 0x01;
    pub const ABSOLUTE_VOLUME_SET: u16 = 0x02;
    pub const VOLUME_CHANGED: u16 = 0x03;
    pub const VOLUME_UP: u16 = 0x04;
    pub const VOLUME_DOWN: u16 = 0x05;
    pub const REG_VOLUME_CHANGED: u16 = 0x06;
    pub const CONN_CMPL: u16 = 0x07;
    pub const PLAY_STATUS_CHANGED: u16 = 0x08;
    pub const MAX: u16 = 0x09;
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct ConnInd {
    pub bd_addr: [u8; BD_ADDR_LEN],
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct AbsoluteVolumeSet {
    pub bd_addr: [u8; BD_ADDR_LEN],
    pub volume: u8,
    _padding: u8,
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct Volume {
    pub volume: u8,
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct SubEvent {
    pub avrcp_sub_event: u8,
}

#[derive(Debug)]
pub enum Avrcp {}

impl Profile for Avrcp {
    const NAME: &'static str = "avrcp";
    const ACT_MAX: u16 = acts::MAX;
    const EVT_MAX: u16 = evts::MAX;
    const ACT_RET_SIZES: &'static [ActMemOption] = &[ActMemOption::new(acts::MAX, 0)];
    const EVT_MEM_SIZES: &'static [EvtMemOption] = &[
        EvtMemOption::new(evts::CONN_IND, size_of::<ConnInd>() as u32),
        EvtMemOption::new(evts::ABSOLUTE_VOLUME_SET, size_of::<AbsoluteVolumeSet>() as u32),
        EvtMemOption::new(evts::VOLUME_CHANGED, size_of::<Volume>() as u32),
        EvtMemOption::new(evts::VOLUME_UP, 0),
        EvtMemOption::new(evts::VOLUME_DOWN, 0),
        EvtMemOption::new(evts::REG_VOLUME_CHANGED, 0),
        EvtMemOption::new(evts::CONN_CMPL, 0),
        EvtMemOption::new(evts::PLAY_STATUS_CHANGED, size_of::<SubEvent>() as u32),
        EvtMemOption::new(evts::MAX, 0),
    ];
}
