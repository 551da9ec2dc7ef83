//! Per-profile dispatch.
//!
//! Each Bluetooth profile implements [`Profile`] once: which action and
//! event codes carry pointers (and their schemas), the ret and event size
//! tables, and how a command's result is copied back. Codes without a
//! schema take the flat path and are copied verbatim.

use crate::{
    arena::{Arena, Ref, View},
    envelope::{DevRequest, HostRequest},
    pop::{PopError, pop},
    push::PushError,
    schema::Schema,
    table::{self, ActMemOption, CopyBackError, EvtMemOption},
};

pub trait Profile {
    /// Profile name, used in diagnostics
    const NAME: &'static str;
    /// Sentinel terminating [`Self::ACT_RET_SIZES`]
    const ACT_MAX: u16;
    /// Sentinel terminating [`Self::EVT_MEM_SIZES`]
    const EVT_MAX: u16;
    /// Host side ret sizes of synchronous commands
    const ACT_RET_SIZES: &'static [ActMemOption];
    /// Device side parameter sizes of events
    const EVT_MEM_SIZES: &'static [EvtMemOption];

    /// Schema of the command parameter of `act`, if it holds pointers.
    fn cmd_schema(act: u16) -> Option<&'static Schema> {
        let _ = act;
        None
    }

    /// Schema of the event parameter of `evt`, if it holds pointers.
    fn event_schema(evt: u16) -> Option<&'static Schema> {
        let _ = evt;
        None
    }

    /// Copy the result of `act` from `ret` into the caller's parameter at
    /// `param`. Codes without a result are a no-op.
    fn copy_act_ret_param(
        act: u16,
        dst: &mut Arena,
        param: Ref<[u8]>,
        ret: &[u8],
    ) -> Result<(), CopyBackError> {
        let _ = (act, dst, param, ret);
        Ok(())
    }

    fn act_ret_param_size(act: u16) -> u32 {
        table::act_ret_param_size(Self::ACT_RET_SIZES, Self::ACT_MAX, act)
    }

    fn evt_mem_size(evt: u16) -> Option<u32> {
        table::evt_mem_size(Self::EVT_MEM_SIZES, Self::EVT_MAX, evt)
    }

    /// Build the host request for command `act` whose parameter sits at
    /// `param` in `src`. `buf_len` is the flat size used when `act` has no
    /// schema.
    fn push_cmd<T: ?Sized>(
        act: u16,
        src: &Arena,
        param: Ref<T>,
        buf_len: usize,
    ) -> Result<HostRequest, PushError> {
        let schema = Self::cmd_schema(act);
        trace!(
            "{} act {:#x}: {}",
            Self::NAME,
            act,
            schema.map_or("flat", |s| s.name)
        );
        HostRequest::push(schema, src.as_bytes(), param.offset() as usize, buf_len)
    }

    /// Validate a received command parameter.
    fn pop_cmd(act: u16, bytes: &[u8]) -> Result<View<'_>, PopError> {
        match Self::cmd_schema(act) {
            Some(schema) => pop(schema, bytes),
            None => Ok(View::new(bytes)),
        }
    }

    /// Build the device request for event `evt`.
    fn push_event<T: ?Sized>(
        evt: u16,
        src: &Arena,
        param: Ref<T>,
        buf_len: usize,
    ) -> Result<DevRequest, PushError> {
        let schema = Self::event_schema(evt);
        trace!(
            "{} evt {:#x}: {}",
            Self::NAME,
            evt,
            schema.map_or("flat", |s| s.name)
        );
        DevRequest::push(schema, src.as_bytes(), param.offset() as usize, buf_len)
    }

    /// Validate a received event parameter.
    fn pop_event(evt: u16, bytes: &[u8]) -> Result<View<'_>, PopError> {
        match Self::event_schema(evt) {
            Some(schema) => pop(schema, bytes),
            None => Ok(View::new(bytes)),
        }
    }
}

#[cfg(test)]
mod tests {
    use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, little_endian::U16};

    use super::*;
    use crate::{
        arena::Ptr,
        schema::{Field, Len},
        table::copy_through,
    };

    const ECHO_ACT_SEND: u16 = 0x01;
    const ECHO_ACT_COUNT: u16 = 0x02;
    const ECHO_ACT_RESET: u16 = 0x03;
    const ECHO_ACT_MAX: u16 = 0x04;

    const ECHO_EVT_DATA: u16 = 0x01;
    const ECHO_EVT_MAX: u16 = 0x02;

    #[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
    #[repr(C)]
    struct Send {
        data: Ptr<[u8]>,
        len: U16,
        _padding: [u8; 2],
    }

    #[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
    #[repr(C)]
    struct Count {
        p_count: Ptr<U16>,
    }

    static SEND: Schema = Schema {
        name: "Send",
        size: size_of::<Send>(),
        fields: &[Field::bytes(0, Len::u16(4))],
    };

    enum Echo {}

    impl Profile for Echo {
        const NAME: &'static str = "echo";
        const ACT_MAX: u16 = ECHO_ACT_MAX;
        const EVT_MAX: u16 = ECHO_EVT_MAX;
        const ACT_RET_SIZES: &'static [ActMemOption] = &[
            ActMemOption::new(ECHO_ACT_COUNT, 2),
            ActMemOption::new(ECHO_ACT_MAX, 0),
        ];
        const EVT_MEM_SIZES: &'static [EvtMemOption] = &[
            EvtMemOption::new(ECHO_EVT_DATA, size_of::<Send>() as u32),
            EvtMemOption::new(ECHO_EVT_MAX, 0),
        ];

        fn cmd_schema(act: u16) -> Option<&'static Schema> {
            match act {
                ECHO_ACT_SEND => Some(&SEND),
                _ => None,
            }
        }

        fn event_schema(evt: u16) -> Option<&'static Schema> {
            match evt {
                ECHO_EVT_DATA => Some(&SEND),
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
                ECHO_ACT_COUNT => {
                    let p_count = dst.resolve(param.cast::<Count>())?.p_count;
                    copy_through(dst, p_count, ret)
                }
                _ => Ok(()),
            }
        }
    }

    #[test]
    fn test_profile_deep_and_flat_paths() {
        let mut arena = Arena::new();
        let data = arena.alloc_bytes(b"ping");
        let send = arena.alloc(&Send {
            data: data.into(),
            len: U16::new(4),
            _padding: [0; 2],
        });

        let request = Echo::push_cmd(ECHO_ACT_SEND, &arena, send, 0).unwrap();
        assert_eq!(request.actual_size(), 12);
        let view = Echo::pop_cmd(ECHO_ACT_SEND, request.payload()).unwrap();
        let received = view.root::<Send>().unwrap();
        assert_eq!(view.follow_slice(&received.data, 4).unwrap(), b"ping");

        let reset = arena.alloc(&[9u8, 8, 7]);
        let request = Echo::push_cmd(ECHO_ACT_RESET, &arena, reset, 3).unwrap();
        assert_eq!(request.payload(), &[9, 8, 7]);
        assert_eq!(
            Echo::pop_cmd(ECHO_ACT_RESET, request.payload()).unwrap().bytes(),
            &[9, 8, 7]
        );

        let event = Echo::push_event(ECHO_EVT_DATA, &arena, send, 0).unwrap();
        assert_eq!(event.payload(), request_bytes(&arena, send));
        assert!(Echo::pop_event(ECHO_EVT_DATA, event.payload()).is_ok());
    }

    fn request_bytes(arena: &Arena, send: Ref<Send>) -> alloc::vec::Vec<u8> {
        Echo::push_cmd(ECHO_ACT_SEND, arena, send, 0)
            .unwrap()
            .payload()
            .to_vec()
    }

    #[test]
    fn test_profile_tables() {
        assert_eq!(Echo::act_ret_param_size(ECHO_ACT_COUNT), 2);
        assert_eq!(Echo::act_ret_param_size(ECHO_ACT_SEND), 0);
        assert_eq!(Echo::evt_mem_size(ECHO_EVT_DATA), Some(8));
        assert_eq!(Echo::evt_mem_size(0x7F), None);
    }

    #[test]
    fn test_profile_copy_back() {
        let mut arena = Arena::new();
        let count = arena.alloc(&U16::new(0));
        let param = arena.alloc(&Count {
            p_count: count.into(),
        });

        Echo::copy_act_ret_param(ECHO_ACT_COUNT, &mut arena, param.cast(), &[5, 0]).unwrap();
        assert_eq!(arena.resolve(count).unwrap().get(), 5);
        Echo::copy_act_ret_param(ECHO_ACT_SEND, &mut arena, param.cast(), &[]).unwrap();
    }
}
