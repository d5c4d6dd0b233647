//! Inspection and export tools for demo recordings.
//!
//! This crate projects the decoded data model into human-readable
//! summaries and JSON. The JSON shape follows the field tables: state
//! objects are keyed by canonical wire field names.

use codec::{DeltaState, EntityState, FieldValue, GameState, Instruction, RawSnapshot};
use serde_json::{json, Map, Value};

/// Projects a delta-codable state into a JSON object keyed by wire
/// field names.
#[must_use]
pub fn state_fields_json<T: DeltaState>(state: &T) -> Value {
    let mut fields = Map::new();
    for (index, field) in T::table().iter().enumerate() {
        let value = match state.field(index) {
            FieldValue::Int(v) => json!(v),
            FieldValue::Float(v) => json!(v),
        };
        fields.insert(field.name.to_string(), value);
    }
    Value::Object(fields)
}

fn entity_json(state: &EntityState) -> Value {
    let mut object = Map::new();
    object.insert("number".to_string(), json!(state.number));
    object.insert("fields".to_string(), state_fields_json(state));
    if !state.extensions.is_empty() {
        object.insert("extensions".to_string(), json!(state.extensions));
    }
    Value::Object(object)
}

fn gamestate_json(gamestate: &GameState) -> Value {
    let config_strings: Map<String, Value> = gamestate
        .config_strings
        .iter()
        .map(|(index, text)| (index.to_string(), json!(text)))
        .collect();
    json!({
        "type": "gamestate",
        "command_sequence": gamestate.command_sequence,
        "client_num": gamestate.client_num,
        "checksum_feed": gamestate.checksum_feed,
        "config_strings": config_strings,
        "baselines": gamestate.baselines.values().map(entity_json).collect::<Vec<_>>(),
    })
}

fn snapshot_json(snapshot: &RawSnapshot) -> Value {
    let (updated, removed) = snapshot.entity_ops.iter().fold((0, 0), |(u, r), op| match op {
        codec::EntityOp::Update { .. } => (u + 1, r),
        codec::EntityOp::Remove { .. } => (u, r + 1),
    });
    json!({
        "type": "snapshot",
        "server_time": snapshot.server_time,
        "delta_num": snapshot.delta_num,
        "snap_flags": snapshot.snap_flags,
        "area_mask_len": snapshot.area_mask.len(),
        "entities_updated": updated,
        "entities_removed": removed,
        "has_vehicle": snapshot.vehicle_delta.is_some(),
        "commands": snapshot.commands.as_ref().map_or(0, Vec::len),
    })
}

/// Projects one instruction into JSON.
#[must_use]
pub fn instruction_json(instruction: &Instruction) -> Value {
    match instruction {
        Instruction::Nop => json!({ "type": "nop" }),
        Instruction::GameState(gamestate) => gamestate_json(gamestate),
        Instruction::ConfigString { index, text } => json!({
            "type": "configstring",
            "index": index,
            "text": text,
        }),
        Instruction::Baseline { index, state } => json!({
            "type": "baseline",
            "index": index,
            "entity": entity_json(state),
        }),
        Instruction::ServerCommand { sequence, text } => json!({
            "type": "server_command",
            "sequence": sequence,
            "command": text,
        }),
        Instruction::Download { block } => json!({
            "type": "download",
            "size": block.len(),
        }),
        Instruction::Snapshot(snapshot) => snapshot_json(snapshot),
        Instruction::SetGame { path } => json!({
            "type": "set_game",
            "path": path,
        }),
        Instruction::MapChange => json!({ "type": "map_change" }),
        Instruction::EndOfFile => json!({ "type": "end_of_file" }),
    }
}

/// Projects a whole demo into the export shape:
/// `[{index, size, instructions: [...]}]`.
#[must_use]
pub fn demo_json(demo: &mut demo::Demo) -> Value {
    let mut messages = Vec::new();
    for index in 0..demo.message_count() {
        let size = demo.message_size(index).unwrap_or(0);
        let instructions: Vec<Value> = demo
            .message(index)
            .unwrap_or(&[])
            .iter()
            .map(instruction_json)
            .collect();
        messages.push(json!({
            "index": index,
            "size": size,
            "instructions": instructions,
        }));
    }
    Value::Array(messages)
}

/// One summary line for an instruction, for terminal listings.
#[must_use]
pub fn instruction_summary(instruction: &Instruction) -> String {
    match instruction {
        Instruction::Nop => "[Nop]".to_string(),
        Instruction::GameState(gamestate) => format!(
            "[Gamestate] client={} configstrings={} baselines={}",
            gamestate.client_num,
            gamestate.config_strings.len(),
            gamestate.baselines.len()
        ),
        Instruction::ConfigString { index, text } => {
            format!("[ConfigString] index={index} text={text:?}")
        }
        Instruction::Baseline { index, .. } => format!("[Baseline] entity={index}"),
        Instruction::ServerCommand { sequence, text } => {
            format!("[ServerCmd] seq={sequence} cmd={text:?}")
        }
        Instruction::Download { block } => format!("[Download] size={}", block.len()),
        Instruction::Snapshot(snapshot) => format!(
            "[Snapshot] serverTime={} delta={} flags={}",
            snapshot.server_time, snapshot.delta_num, snapshot.snap_flags
        ),
        Instruction::SetGame { path } => format!("[SetGame] path={path:?}"),
        Instruction::MapChange => "[MapChange]".to_string(),
        Instruction::EndOfFile => "[EOF]".to_string(),
    }
}
