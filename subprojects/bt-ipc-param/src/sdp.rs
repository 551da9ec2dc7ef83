//! SDP parameters. Both size tables hold only their sentinel.

use bt_ipc_marshal::{ActMemOption, EvtMemOption, Profile};

pub mod acts {
    pub const RECORD_ADD: u16 = 0x01;
    pub const MAX: u16 = 0x02;
}

pub mod evts {
    pub const MAX: u16 = 0x01;
}

#[derive(Debug)]
pub enum Sdp {}

impl Profile for Sdp {
    const NAME: &'static str = "sdp";
    const ACT_MAX: u16 = acts::MAX;
    const EVT_MAX: u16 = evts::MAX;
    const ACT_RET_SIZES: &'static [ActMemOption] = &[ActMemOption::new(acts::MAX, 0)];
    const EVT_MEM_SIZES: &'static [EvtMemOption] = &[EvtMemOption::new(evts::MAX, 0)];
}
