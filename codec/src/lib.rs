//! Message decoding, delta compression, and snapshot assembly for
//! dm_26 demos.
//!
//! This crate turns decoded message payloads into typed instructions
//! and resolves delta-compressed snapshots into complete world states:
//!
//! - the state model: player, entity, trajectory, user command,
//!   gamestate, snapshot;
//! - the delta codec driven by the ordered field tables in [`schema`];
//! - opcode dispatch over one message payload;
//! - the snapshot assembler with its bounded baseline window.
//!
//! # Design Principles
//!
//! - **Parse, then resolve** - Deltas are parsed into self-delimiting
//!   patches without their baselines, so messages decode independently
//!   of snapshot resolution order.
//! - **Exact inverses** - Every reader has a writer that reproduces its
//!   input bits.
//! - **Bounded state** - The baseline window is a fixed ring; nothing
//!   grows with demo length.

mod assembler;
mod delta;
mod entity;
mod error;
mod gamestate;
mod instruction;
mod player;
mod snapshot;
mod trajectory;
mod usercmd;

pub use assembler::SnapshotAssembler;
pub use delta::{
    apply_entity_ops, apply_field_patch, apply_player_patch, diff_entity_map, diff_fields,
    diff_player, read_cmd_patch, read_delta, read_entity_ops, read_field_patch,
    read_player_patch, write_cmd_patch, write_delta, write_entity_ops, write_field_patch,
    write_player_patch, ArrayDeltas, DeltaState, EntityOp, EntityPatch, FieldPatch, FieldValue,
    PlayerPatch,
};
pub use entity::EntityState;
pub use error::{CodecError, CodecResult, Violation};
pub use gamestate::{info_value, GameState};
pub use instruction::{opcodes, parse_message, write_instructions, Instruction, ParseOptions};
pub use player::PlayerState;
pub use snapshot::{read_raw_snapshot, write_raw_snapshot, RawSnapshot, Snapshot};
pub use trajectory::{Trajectory, TrajectoryKind, Vec3};
pub use usercmd::UserCmd;
