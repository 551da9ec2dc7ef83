//! Parameter marshaling for the Bluetooth dual-core IPC
//!
//! The host core calls into the Bluetooth stack on the device core by
//! sending a request envelope that carries one parameter struct. Many of
//! those structs point at further data: payload buffers, attribute tables,
//! nested descriptors. This crate flattens such a graph into the envelope's
//! fixed-capacity buffer and validates it again on the receiving side.
//!
//! # Wire model
//!
//! Parameters are built in an [`Arena`](arena::Arena), where every pointer
//! field is a [`Ptr`](arena::Ptr) holding an offset from the start of the
//! arena. The envelope buffer uses the same encoding with offsets from its
//! own start, so:
//!
//! - [`push`](push::push) copies the root, then each referent at the next
//!   4-byte boundary, patching offsets as it goes.
//! - [`pop`](pop::pop) checks that every offset lies where push would have
//!   put it and returns a [`View`](arena::View) over the bytes.
//!
//! Which fields are pointers, and how long their referents are, is described
//! per struct by a static [`Schema`](schema::Schema).
//!
//! # Profiles
//!
//! Each Bluetooth profile implements [`Profile`](dispatch::Profile), mapping
//! action and event codes to schemas, and carries the ret size tables used to
//! copy synchronous results back to the caller (see [`table`]).

#![cfg_attr(not(test), no_std)]

extern crate alloc;

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod arena;
pub mod dispatch;
pub mod envelope;
pub mod pop;
pub mod push;
pub mod schema;
pub mod table;

pub use self::{
    arena::{ALIGN, Arena, NULL_OFFSET, Ptr, Ref, ResolveError, View, align_up},
    dispatch::Profile,
    envelope::{DevRequest, Envelope, HostRequest, IPC_DEV_API_DATA_MAX, IPC_HOST_API_DATA_MAX},
    pop::{PopError, pop},
    push::{PushError, push},
    schema::{Arm, Field, Frame, Kind, Len, Schema, Tag, Width, WalkError},
    table::{ActMemOption, CopyBackError, EvtMemOption},
};
