//! Snapshot payloads: the wire-shaped form and the resolved world state.

use std::collections::BTreeMap;

use bitstream::{BitReader, BitWriter};
use schema::limits::MAX_AREAMASK_BYTES;

use crate::delta::{
    read_cmd_patch, read_entity_ops, read_player_patch, write_cmd_patch, write_entity_ops,
    write_player_patch, EntityOp, FieldPatch, PlayerPatch,
};
use crate::entity::EntityState;
use crate::error::{CodecResult, Violation};
use crate::instruction::ParseOptions;
use crate::player::PlayerState;
use crate::usercmd::UserCmd;

/// A snapshot as it appears on the wire: deltas not yet resolved
/// against their baselines.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawSnapshot {
    pub server_time: i32,
    /// Backward offset to the delta baseline message; 0 means the
    /// snapshot is not delta-compressed.
    pub delta_num: u8,
    pub snap_flags: u8,
    /// Visibility area mask, at most 32 bytes.
    pub area_mask: Vec<u8>,
    pub player_delta: PlayerPatch,
    /// Present only while the viewed entity pilots a vehicle.
    pub vehicle_delta: Option<PlayerPatch>,
    /// Entity-list operations in wire order.
    pub entity_ops: Vec<EntityOp>,
    /// Embedded user commands: `(client number, command delta)`.
    pub commands: Option<Vec<(u8, FieldPatch)>>,
}

impl RawSnapshot {
    /// Whether this snapshot deltas against a prior message.
    #[must_use]
    pub const fn is_delta(&self) -> bool {
        self.delta_num != 0
    }
}

/// A fully resolved world snapshot.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    pub server_time: i32,
    /// Message index of the delta baseline, `None` for an init snapshot.
    pub delta_from: Option<usize>,
    pub snap_flags: u8,
    pub area_mask: Vec<u8>,
    pub player_state: PlayerState,
    pub vehicle_state: Option<PlayerState>,
    pub entities: BTreeMap<u16, EntityState>,
    /// User commands observed since the previous snapshot.
    pub commands: Vec<(u8, UserCmd)>,
}

/// Reads a snapshot payload in wire order.
///
/// # Errors
///
/// Returns a protocol violation for an oversized area mask, and
/// propagates bit-level and delta errors.
pub fn read_raw_snapshot(
    reader: &mut BitReader<'_>,
    options: &ParseOptions,
) -> CodecResult<RawSnapshot> {
    let server_time = reader.read_long()?;
    let delta_num = reader.read_byte()?;
    let snap_flags = reader.read_byte()?;

    let mask_len = usize::from(reader.read_byte()?);
    if mask_len > MAX_AREAMASK_BYTES {
        return Err(Violation::AreaMaskLength { len: mask_len }.into());
    }
    let area_mask = reader.read_data(mask_len)?;

    let player_delta = read_player_patch(reader)?;
    let vehicle_delta = if reader.read_bool()? {
        Some(read_player_patch(reader)?)
    } else {
        None
    };

    let entity_ops = read_entity_ops(reader, options.strict)?;

    let commands = if reader.read_bool()? {
        let count = reader.read_byte()?;
        let key = (options.cmd_key)(server_time);
        let mut commands = Vec::with_capacity(usize::from(count));
        for _ in 0..count {
            let client = reader.read_bits(5)? as u8;
            commands.push((client, read_cmd_patch(reader, key)?));
        }
        Some(commands)
    } else {
        None
    };

    Ok(RawSnapshot {
        server_time,
        delta_num,
        snap_flags,
        area_mask,
        player_delta,
        vehicle_delta,
        entity_ops,
        commands,
    })
}

/// Writes a snapshot payload in wire order; the exact inverse of
/// [`read_raw_snapshot`].
///
/// # Errors
///
/// Returns a protocol violation for an oversized area mask, and
/// propagates bit-level and delta errors.
pub fn write_raw_snapshot(
    writer: &mut BitWriter,
    snapshot: &RawSnapshot,
    options: &ParseOptions,
) -> CodecResult<()> {
    writer.write_long(snapshot.server_time)?;
    writer.write_byte(snapshot.delta_num)?;
    writer.write_byte(snapshot.snap_flags)?;

    if snapshot.area_mask.len() > MAX_AREAMASK_BYTES {
        return Err(Violation::AreaMaskLength {
            len: snapshot.area_mask.len(),
        }
        .into());
    }
    writer.write_byte(snapshot.area_mask.len() as u8)?;
    writer.write_data(&snapshot.area_mask)?;

    write_player_patch(writer, &snapshot.player_delta)?;
    match &snapshot.vehicle_delta {
        Some(patch) => {
            writer.write_bool(true)?;
            write_player_patch(writer, patch)?;
        }
        None => writer.write_bool(false)?,
    }

    write_entity_ops(writer, &snapshot.entity_ops)?;

    match &snapshot.commands {
        Some(commands) => {
            writer.write_bool(true)?;
            writer.write_byte(commands.len() as u8)?;
            let key = (options.cmd_key)(snapshot.server_time);
            for (client, patch) in commands {
                writer.write_bits(u32::from(*client), 5)?;
                write_cmd_patch(writer, patch, key)?;
            }
        }
        None => writer.write_bool(false)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delta::{EntityPatch, FieldValue};

    fn roundtrip(snapshot: &RawSnapshot, options: &ParseOptions) -> RawSnapshot {
        let mut writer = BitWriter::with_capacity(8192);
        write_raw_snapshot(&mut writer, snapshot, options).unwrap();
        let bytes = writer.finish();
        let mut reader = BitReader::new(&bytes);
        read_raw_snapshot(&mut reader, options).unwrap()
    }

    #[test]
    fn minimal_snapshot_roundtrips() {
        let snapshot = RawSnapshot {
            server_time: 5000,
            delta_num: 0,
            snap_flags: 0,
            area_mask: vec![0xFF],
            ..RawSnapshot::default()
        };
        assert_eq!(roundtrip(&snapshot, &ParseOptions::default()), snapshot);
    }

    #[test]
    fn full_snapshot_roundtrips() {
        let snapshot = RawSnapshot {
            server_time: 123_456,
            delta_num: 3,
            snap_flags: 0x40,
            area_mask: vec![1, 2, 3, 4],
            player_delta: PlayerPatch {
                fields: vec![(0, FieldValue::Int(123_456)), (2, FieldValue::Float(64.0))],
                arrays: None,
            },
            vehicle_delta: Some(PlayerPatch::default()),
            entity_ops: vec![
                EntityOp::Update {
                    number: 9,
                    patch: EntityPatch {
                        fields: vec![(45, FieldValue::Int(2))],
                        extensions: Vec::new(),
                    },
                },
                EntityOp::Remove { number: 12 },
            ],
            commands: Some(vec![(4, vec![(0, FieldValue::Int(123_000))])]),
        };
        assert_eq!(roundtrip(&snapshot, &ParseOptions::default()), snapshot);
    }

    #[test]
    fn oversized_area_mask_is_rejected() {
        let snapshot = RawSnapshot {
            area_mask: vec![0; 33],
            ..RawSnapshot::default()
        };
        let mut writer = BitWriter::with_capacity(8192);
        let err = write_raw_snapshot(&mut writer, &snapshot, &ParseOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            crate::CodecError::ProtocolViolation(Violation::AreaMaskLength { len: 33 })
        ));
    }

    #[test]
    fn commands_respect_the_key_hook() {
        fn key_from_time(time: i32) -> u8 {
            (time & 0xFF) as u8
        }
        let options = ParseOptions {
            strict: false,
            cmd_key: key_from_time,
        };
        let snapshot = RawSnapshot {
            server_time: 0x1234,
            commands: Some(vec![(1, vec![(8, FieldValue::Int(5))])]),
            ..RawSnapshot::default()
        };
        assert_eq!(roundtrip(&snapshot, &options), snapshot);

        // Decoding with the wrong key must change the payload.
        let mut writer = BitWriter::with_capacity(8192);
        write_raw_snapshot(&mut writer, &snapshot, &options).unwrap();
        let bytes = writer.finish();
        let mut reader = BitReader::new(&bytes);
        let wrong = read_raw_snapshot(&mut reader, &ParseOptions::default()).unwrap();
        assert_ne!(wrong, snapshot);
    }
}
