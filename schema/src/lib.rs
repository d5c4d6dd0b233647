//! Static protocol schema for the dm_26 demo format.
//!
//! This crate holds the parts of the protocol that are fixed for the
//! lifetime of a process: the ordered delta field tables for player
//! state, entity state, and user commands, and the numeric constants of
//! the wire format. Everything here is read-only data; the codec crates
//! interpret it.
//!
//! # Design Principles
//!
//! - **Order is contract** - Table entry order defines the bit layout of
//!   every delta; it must never change.
//! - **No behavior** - This crate carries descriptions, not encoders.

mod field;
pub mod limits;
mod tables;

pub use field::{FieldKind, NetField};
pub use tables::{ENTITY_FIELDS, PLAYER_FIELDS, USERCMD_FIELDS};
