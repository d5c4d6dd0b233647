//! Process-wide protocol constants.
//!
//! These values are part of the dm_26 wire format and must never change.

/// Maximum decoded length of a message payload, in bytes.
pub const MAX_MSGLEN: usize = 49152;

/// Maximum length of an ordinary string field, excluding the terminator.
pub const MAX_STRING_CHARS: usize = 1024;

/// Maximum length of a big info string (server/system info).
pub const BIG_INFO_STRING: usize = 8192;

/// Number of configuration string slots.
pub const MAX_CONFIGSTRINGS: usize = 1700;

/// Number of entity slots; entity numbers are 10 bits.
pub const MAX_GENTITIES: usize = 1024;

/// Bit width of an entity number on the wire.
pub const GENTITYNUM_BITS: u8 = 10;

/// Entity number reserved to mean "no entity" and to terminate entity
/// lists.
pub const ENTITYNUM_NONE: u16 = (MAX_GENTITIES - 1) as u16;

/// Number of client slots; client numbers in command blocks are 5 bits.
pub const MAX_CLIENTS: usize = 32;

/// Bit width of the integer-encoded form of a float field.
pub const FLOAT_INT_BITS: u8 = 13;

/// Bias added to the integer-encoded form of a float field.
pub const FLOAT_INT_BIAS: i32 = 4096;

/// Configuration string slot holding the server info (including `mapname`).
pub const CS_SERVERINFO: u16 = 2;

/// Configuration string slot holding the level start time.
pub const CS_LEVEL_START_TIME: u16 = 21;

/// Default gravity, world units per second squared.
pub const DEFAULT_GRAVITY: f32 = 800.0;

/// Maximum byte length of a snapshot area mask.
pub const MAX_AREAMASK_BYTES: usize = 32;

/// Number of decoded snapshots retained for delta resolution.
pub const BASELINE_WINDOW: usize = 32;

/// Number of slots in each player-state array (stats, persistant, ammo,
/// powerups).
pub const PLAYER_ARRAY_SLOTS: usize = 16;
