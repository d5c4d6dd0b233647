//! Opcode dispatch: one decoded payload in, typed instructions out.

use bitstream::{BitReader, BitWriter};
use schema::limits::{
    BIG_INFO_STRING, GENTITYNUM_BITS, MAX_CONFIGSTRINGS, MAX_MSGLEN, MAX_STRING_CHARS,
};
use schema::ENTITY_FIELDS;

use crate::delta::{apply_field_patch, diff_fields, read_field_patch, write_field_patch};
use crate::entity::EntityState;
use crate::error::{CodecError, CodecResult, Violation};
use crate::gamestate::GameState;
use crate::snapshot::{read_raw_snapshot, write_raw_snapshot, RawSnapshot};

/// Wire opcodes of a message payload.
pub mod opcodes {
    pub const BAD: u8 = 0;
    pub const NOP: u8 = 1;
    pub const GAMESTATE: u8 = 2;
    pub const CONFIGSTRING: u8 = 3;
    pub const BASELINE: u8 = 4;
    pub const SERVERCOMMAND: u8 = 5;
    pub const DOWNLOAD: u8 = 6;
    pub const SNAPSHOT: u8 = 7;
    pub const SETGAME: u8 = 8;
    pub const MAPCHANGE: u8 = 9;
    pub const EOF: u8 = 10;
}

/// Parsing knobs threaded through message decode.
#[derive(Debug, Clone, Copy)]
pub struct ParseOptions {
    /// Reject mod-extended fields instead of storing them.
    pub strict: bool,
    /// Derives the user-command XOR key from the snapshot server time.
    /// Defaults to no obfuscation.
    pub cmd_key: fn(i32) -> u8,
}

const fn no_key(_server_time: i32) -> u8 {
    0
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            strict: false,
            cmd_key: no_key,
        }
    }
}

/// One typed unit of a decoded message payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    Nop,
    GameState(GameState),
    ConfigString {
        index: u16,
        text: String,
    },
    Baseline {
        index: u16,
        state: EntityState,
    },
    ServerCommand {
        sequence: i32,
        text: String,
    },
    /// An opaque download block, passed through unchanged.
    Download {
        block: Vec<u8>,
    },
    Snapshot(RawSnapshot),
    SetGame {
        path: String,
    },
    MapChange,
    EndOfFile,
}

impl Instruction {
    /// A short lowercase tag naming the variant.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Nop => "nop",
            Self::GameState(_) => "gamestate",
            Self::ConfigString { .. } => "configstring",
            Self::Baseline { .. } => "baseline",
            Self::ServerCommand { .. } => "server_command",
            Self::Download { .. } => "download",
            Self::Snapshot(_) => "snapshot",
            Self::SetGame { .. } => "set_game",
            Self::MapChange => "map_change",
            Self::EndOfFile => "end_of_file",
        }
    }
}

fn read_baseline(reader: &mut BitReader<'_>, strict: bool) -> CodecResult<(u16, EntityState)> {
    let index = reader.read_bits(GENTITYNUM_BITS)? as u16;
    let patch = read_field_patch(reader, ENTITY_FIELDS)?;
    let extensions = crate::delta::read_entity_extensions(reader, strict)?;
    let mut state = EntityState::with_number(index);
    apply_field_patch(&mut state, &patch);
    for (name, value) in extensions {
        state.extensions.insert(name, value);
    }
    Ok((index, state))
}

fn write_baseline(writer: &mut BitWriter, index: u16, state: &EntityState) -> CodecResult<()> {
    writer.write_bits(u32::from(index), GENTITYNUM_BITS)?;
    let zero = EntityState::with_number(index);
    write_field_patch(writer, ENTITY_FIELDS, &diff_fields(&zero, state))?;
    let extensions: Vec<(String, i64)> = state
        .extensions
        .iter()
        .map(|(name, value)| (name.clone(), *value))
        .collect();
    crate::delta::write_entity_extensions(writer, &extensions)
}

fn read_gamestate(reader: &mut BitReader<'_>, options: &ParseOptions) -> CodecResult<GameState> {
    let mut gamestate = GameState {
        command_sequence: reader.read_long()?,
        ..GameState::default()
    };

    loop {
        match reader.read_byte()? {
            opcodes::EOF => break,
            opcodes::CONFIGSTRING => {
                let index = reader.read_short()?;
                if usize::from(index) >= MAX_CONFIGSTRINGS {
                    return Err(Violation::ConfigStringIndex {
                        index: u32::from(index),
                    }
                    .into());
                }
                let text = reader.read_string(BIG_INFO_STRING)?;
                gamestate.set_config_string(index, text)?;
            }
            opcodes::BASELINE => {
                let (index, state) = read_baseline(reader, options.strict)?;
                gamestate.baselines.insert(index, state);
            }
            opcode => return Err(CodecError::InvalidOpcode { opcode }),
        }
    }

    gamestate.client_num = reader.read_long()?;
    gamestate.checksum_feed = reader.read_long()?;
    Ok(gamestate)
}

fn write_gamestate(writer: &mut BitWriter, gamestate: &GameState) -> CodecResult<()> {
    writer.write_long(gamestate.command_sequence)?;
    for (index, text) in &gamestate.config_strings {
        writer.write_byte(opcodes::CONFIGSTRING)?;
        writer.write_short(*index)?;
        writer.write_string(text, BIG_INFO_STRING)?;
    }
    for (index, state) in &gamestate.baselines {
        writer.write_byte(opcodes::BASELINE)?;
        write_baseline(writer, *index, state)?;
    }
    writer.write_byte(opcodes::EOF)?;
    writer.write_long(gamestate.client_num)?;
    writer.write_long(gamestate.checksum_feed)?;
    Ok(())
}

/// Parses one decoded message payload into its instruction sequence.
///
/// Parsing stops at the end-of-file opcode; trailing bytes (Huffman
/// padding artifacts) are ignored.
///
/// # Errors
///
/// Returns [`CodecError::InvalidOpcode`] for opcode 0 or any unknown
/// opcode; the whole message is considered failed.
pub fn parse_message(payload: &[u8], options: &ParseOptions) -> CodecResult<Vec<Instruction>> {
    let mut reader = BitReader::new(payload);
    let mut instructions = Vec::new();

    loop {
        let opcode = reader.read_byte()?;
        match opcode {
            opcodes::NOP => instructions.push(Instruction::Nop),
            opcodes::GAMESTATE => {
                instructions.push(Instruction::GameState(read_gamestate(&mut reader, options)?));
            }
            opcodes::CONFIGSTRING => {
                let index = reader.read_short()?;
                if usize::from(index) >= MAX_CONFIGSTRINGS {
                    return Err(Violation::ConfigStringIndex {
                        index: u32::from(index),
                    }
                    .into());
                }
                let text = reader.read_string(BIG_INFO_STRING)?;
                instructions.push(Instruction::ConfigString { index, text });
            }
            opcodes::BASELINE => {
                let (index, state) = read_baseline(&mut reader, options.strict)?;
                instructions.push(Instruction::Baseline { index, state });
            }
            opcodes::SERVERCOMMAND => {
                let sequence = reader.read_long()?;
                let text = reader.read_string(MAX_STRING_CHARS)?;
                instructions.push(Instruction::ServerCommand { sequence, text });
            }
            opcodes::DOWNLOAD => {
                let size = usize::from(reader.read_short()?);
                let block = reader.read_data(size)?;
                instructions.push(Instruction::Download { block });
            }
            opcodes::SNAPSHOT => {
                instructions.push(Instruction::Snapshot(read_raw_snapshot(
                    &mut reader,
                    options,
                )?));
            }
            opcodes::SETGAME => {
                let path = reader.read_string(MAX_STRING_CHARS)?;
                instructions.push(Instruction::SetGame { path });
            }
            opcodes::MAPCHANGE => instructions.push(Instruction::MapChange),
            opcodes::EOF => {
                instructions.push(Instruction::EndOfFile);
                break;
            }
            opcode => return Err(CodecError::InvalidOpcode { opcode }),
        }
    }

    Ok(instructions)
}

/// Re-emits instructions as a decoded payload; the exact inverse of
/// [`parse_message`].
///
/// A terminating end-of-file opcode is appended if the sequence does
/// not already end with one.
///
/// # Errors
///
/// Propagates bit-level and delta errors.
pub fn write_instructions(
    instructions: &[Instruction],
    options: &ParseOptions,
) -> CodecResult<Vec<u8>> {
    let mut writer = BitWriter::with_capacity(MAX_MSGLEN);

    for instruction in instructions {
        match instruction {
            Instruction::Nop => writer.write_byte(opcodes::NOP)?,
            Instruction::GameState(gamestate) => {
                writer.write_byte(opcodes::GAMESTATE)?;
                write_gamestate(&mut writer, gamestate)?;
            }
            Instruction::ConfigString { index, text } => {
                writer.write_byte(opcodes::CONFIGSTRING)?;
                writer.write_short(*index)?;
                writer.write_string(text, BIG_INFO_STRING)?;
            }
            Instruction::Baseline { index, state } => {
                writer.write_byte(opcodes::BASELINE)?;
                write_baseline(&mut writer, *index, state)?;
            }
            Instruction::ServerCommand { sequence, text } => {
                writer.write_byte(opcodes::SERVERCOMMAND)?;
                writer.write_long(*sequence)?;
                writer.write_string(text, MAX_STRING_CHARS)?;
            }
            Instruction::Download { block } => {
                writer.write_byte(opcodes::DOWNLOAD)?;
                writer.write_short(block.len() as u16)?;
                writer.write_data(block)?;
            }
            Instruction::Snapshot(snapshot) => {
                writer.write_byte(opcodes::SNAPSHOT)?;
                write_raw_snapshot(&mut writer, snapshot, options)?;
            }
            Instruction::SetGame { path } => {
                writer.write_byte(opcodes::SETGAME)?;
                writer.write_string(path, MAX_STRING_CHARS)?;
            }
            Instruction::MapChange => writer.write_byte(opcodes::MAPCHANGE)?,
            Instruction::EndOfFile => {
                writer.write_byte(opcodes::EOF)?;
                return Ok(writer.finish());
            }
        }
    }

    writer.write_byte(opcodes::EOF)?;
    Ok(writer.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delta::{EntityOp, EntityPatch, FieldValue};

    fn roundtrip(instructions: &[Instruction]) -> Vec<Instruction> {
        let options = ParseOptions::default();
        let payload = write_instructions(instructions, &options).unwrap();
        parse_message(&payload, &options).unwrap()
    }

    #[test]
    fn empty_message_is_a_lone_eof() {
        let parsed = roundtrip(&[]);
        assert_eq!(parsed, vec![Instruction::EndOfFile]);
    }

    #[test]
    fn server_command_roundtrips() {
        let instructions = vec![
            Instruction::ServerCommand {
                sequence: 17,
                text: "cs 21 \"1000\"".to_string(),
            },
            Instruction::EndOfFile,
        ];
        assert_eq!(roundtrip(&instructions), instructions);
    }

    #[test]
    fn gamestate_roundtrips() {
        let mut gamestate = GameState {
            command_sequence: 99,
            client_num: 4,
            checksum_feed: -12345,
            ..GameState::default()
        };
        gamestate
            .set_config_string(2, "mapname\\ctf_yavin\\".to_string())
            .unwrap();
        gamestate
            .set_config_string(21, "1000".to_string())
            .unwrap();
        let mut baseline = EntityState::with_number(64);
        baseline.e_type = 2;
        baseline.pos.base = [100.0, 0.0, 64.0];
        gamestate.baselines.insert(64, baseline);

        let instructions = vec![Instruction::GameState(gamestate), Instruction::EndOfFile];
        assert_eq!(roundtrip(&instructions), instructions);
    }

    #[test]
    fn snapshot_and_commands_roundtrip() {
        let instructions = vec![
            Instruction::Snapshot(RawSnapshot {
                server_time: 5000,
                area_mask: vec![0xFF],
                entity_ops: vec![EntityOp::Update {
                    number: 5,
                    patch: EntityPatch {
                        fields: vec![(3, FieldValue::Float(100.0))],
                        extensions: Vec::new(),
                    },
                }],
                ..RawSnapshot::default()
            }),
            Instruction::EndOfFile,
        ];
        assert_eq!(roundtrip(&instructions), instructions);
    }

    #[test]
    fn download_passes_bytes_through() {
        let instructions = vec![
            Instruction::Download {
                block: vec![0, 1, 2, 0xFF, 0x80],
            },
            Instruction::EndOfFile,
        ];
        assert_eq!(roundtrip(&instructions), instructions);
    }

    #[test]
    fn bad_opcode_is_fatal() {
        let payload = [opcodes::BAD];
        let err = parse_message(&payload, &ParseOptions::default()).unwrap_err();
        assert!(matches!(err, CodecError::InvalidOpcode { opcode: 0 }));
    }

    #[test]
    fn unknown_opcode_is_fatal() {
        let payload = [42u8];
        let err = parse_message(&payload, &ParseOptions::default()).unwrap_err();
        assert!(matches!(err, CodecError::InvalidOpcode { opcode: 42 }));
    }

    #[test]
    fn trailing_padding_after_eof_is_ignored() {
        let mut payload = write_instructions(&[Instruction::Nop], &ParseOptions::default()).unwrap();
        payload.extend_from_slice(&[0xAA, 0xBB, 0xCC]);
        let parsed = parse_message(&payload, &ParseOptions::default()).unwrap();
        assert_eq!(parsed, vec![Instruction::Nop, Instruction::EndOfFile]);
    }

    #[test]
    fn configstring_index_out_of_range_is_a_violation() {
        let mut writer = BitWriter::with_capacity(64);
        writer.write_byte(opcodes::CONFIGSTRING).unwrap();
        writer.write_short(1700).unwrap();
        writer.write_string("x", 16).unwrap();
        let payload = writer.finish();
        let err = parse_message(&payload, &ParseOptions::default()).unwrap_err();
        assert!(matches!(err, CodecError::ProtocolViolation(_)));
    }

    #[test]
    fn map_change_and_set_game_roundtrip() {
        let instructions = vec![
            Instruction::SetGame {
                path: "base".to_string(),
            },
            Instruction::MapChange,
            Instruction::EndOfFile,
        ];
        assert_eq!(roundtrip(&instructions), instructions);
    }

    #[test]
    fn instruction_tags_are_stable() {
        assert_eq!(Instruction::Nop.tag(), "nop");
        assert_eq!(Instruction::MapChange.tag(), "map_change");
        assert_eq!(Instruction::EndOfFile.tag(), "end_of_file");
    }
}
