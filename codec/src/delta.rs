//! Delta encoding and decoding against ordered field tables.
//!
//! Every state delta is framed as one `changed?` bit per table entry, in
//! table order, each set bit followed by that field's payload. Because
//! the framing is self-delimiting, a delta can be parsed into a
//! [`FieldPatch`] without the baseline in hand and applied later; the
//! assembler relies on this to separate message parsing from snapshot
//! resolution.

use bitstream::{BitReader, BitWriter};
use schema::limits::{
    ENTITYNUM_NONE, FLOAT_INT_BIAS, FLOAT_INT_BITS, GENTITYNUM_BITS, MAX_STRING_CHARS,
    PLAYER_ARRAY_SLOTS,
};
use schema::{FieldKind, NetField, ENTITY_FIELDS, PLAYER_FIELDS, USERCMD_FIELDS};

use crate::error::{CodecError, CodecResult};

/// A decoded field payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    /// Integer payload: raw, quantized-angle, entity, or time fields.
    Int(i32),
    /// Float payload: scalar floats and vector components.
    Float(f32),
}

impl FieldValue {
    /// Bitwise equality; floats compare by representation so negative
    /// zero and NaN payloads survive change detection.
    #[must_use]
    pub fn bits_eq(self, other: Self) -> bool {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            _ => false,
        }
    }
}

/// A state type that exposes its fields in table order.
pub trait DeltaState: Clone + Default {
    /// The field table governing this state's wire layout.
    fn table() -> &'static [NetField];

    /// Reads the field at a table index.
    fn field(&self, index: usize) -> FieldValue;

    /// Writes the field at a table index.
    fn set_field(&mut self, index: usize, value: FieldValue);
}

/// An ordered list of changed fields: `(table index, new value)`.
pub type FieldPatch = Vec<(u16, FieldValue)>;

/// A parsed entity-state delta, including mod-extension fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EntityPatch {
    /// Changed table fields in ascending index order.
    pub fields: FieldPatch,
    /// Mod-extended fields, kept for round-trip fidelity.
    pub extensions: Vec<(String, i64)>,
}

/// One operation of a snapshot's entity list, in wire order.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityOp {
    /// Erase the entity from the working set.
    Remove {
        /// The entity number.
        number: u16,
    },
    /// Apply a field delta against the entity's prior state.
    Update {
        /// The entity number.
        number: u16,
        /// The parsed delta.
        patch: EntityPatch,
    },
}

impl EntityOp {
    /// The entity number this operation targets.
    #[must_use]
    pub const fn number(&self) -> u16 {
        match self {
            Self::Remove { number } | Self::Update { number, .. } => *number,
        }
    }
}

/// Per-slot changes to the player-state arrays.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArrayDeltas {
    /// Changed `stats` slots.
    pub stats: Vec<(u8, i32)>,
    /// Changed `persistant` slots.
    pub persistant: Vec<(u8, i32)>,
    /// Changed `ammo` slots.
    pub ammo: Vec<(u8, i32)>,
    /// Changed `powerups` slots.
    pub powerups: Vec<(u8, i32)>,
}

impl ArrayDeltas {
    /// Returns `true` if no slot changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
            && self.persistant.is_empty()
            && self.ammo.is_empty()
            && self.powerups.is_empty()
    }
}

/// A parsed player-state delta.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlayerPatch {
    /// Changed scalar fields.
    pub fields: FieldPatch,
    /// The array block, when present on the wire.
    pub arrays: Option<ArrayDeltas>,
}

// ---------------------------------------------------------------------------
// Field payloads

fn int_form_value(value: f32) -> Option<i32> {
    let truncated = value as i32;
    if (-FLOAT_INT_BIAS..FLOAT_INT_BIAS).contains(&truncated)
        && (truncated as f32).to_bits() == value.to_bits()
    {
        Some(truncated)
    } else {
        None
    }
}

fn write_float_field(writer: &mut BitWriter, value: f32) -> CodecResult<()> {
    match int_form_value(value) {
        Some(whole) => {
            writer.write_bool(false)?;
            writer.write_bits((whole + FLOAT_INT_BIAS) as u32, FLOAT_INT_BITS)?;
        }
        None => {
            writer.write_bool(true)?;
            writer.write_bits(value.to_bits(), 32)?;
        }
    }
    Ok(())
}

fn read_float_field(reader: &mut BitReader<'_>) -> CodecResult<f32> {
    if reader.read_bool()? {
        Ok(f32::from_bits(reader.read_bits(32)?))
    } else {
        let biased = reader.read_bits(FLOAT_INT_BITS)? as i32;
        Ok((biased - FLOAT_INT_BIAS) as f32)
    }
}

fn write_field_payload(
    writer: &mut BitWriter,
    field: &NetField,
    value: FieldValue,
) -> CodecResult<()> {
    match (field.kind, value) {
        (FieldKind::Int { bits, signed: true }, FieldValue::Int(v)) => {
            writer.write_signed(v, bits)?;
        }
        (FieldKind::Int { bits, signed: false }, FieldValue::Int(v)) => {
            writer.write_bits(v as u32, bits)?;
        }
        (FieldKind::Time, FieldValue::Int(v)) => {
            writer.write_signed(v, 32)?;
        }
        (FieldKind::Entity, FieldValue::Int(v)) => {
            writer.write_bits(v as u32, GENTITYNUM_BITS)?;
        }
        (FieldKind::Angle { bits }, FieldValue::Int(v)) => {
            writer.write_bits(v as u32, bits)?;
        }
        (FieldKind::Float | FieldKind::Origin | FieldKind::Vector, FieldValue::Float(v)) => {
            write_float_field(writer, v)?;
        }
        _ => {
            return Err(CodecError::InvalidField {
                name: field.name.to_string(),
            })
        }
    }
    Ok(())
}

fn read_field_payload(reader: &mut BitReader<'_>, field: &NetField) -> CodecResult<FieldValue> {
    let value = match field.kind {
        FieldKind::Int { bits, signed: true } => FieldValue::Int(reader.read_signed(bits)?),
        FieldKind::Int { bits, signed: false } => FieldValue::Int(reader.read_bits(bits)? as i32),
        FieldKind::Time => FieldValue::Int(reader.read_signed(32)?),
        FieldKind::Entity => FieldValue::Int(reader.read_bits(GENTITYNUM_BITS)? as i32),
        FieldKind::Angle { bits } => FieldValue::Int(reader.read_bits(bits)? as i32),
        FieldKind::Float | FieldKind::Origin | FieldKind::Vector => {
            FieldValue::Float(read_float_field(reader)?)
        }
    };
    Ok(value)
}

// ---------------------------------------------------------------------------
// Generic table-ordered patches

/// Computes the changed fields between two states, in table order.
#[must_use]
pub fn diff_fields<T: DeltaState>(from: &T, to: &T) -> FieldPatch {
    let mut patch = Vec::new();
    for index in 0..T::table().len() {
        let new = to.field(index);
        if !from.field(index).bits_eq(new) {
            patch.push((index as u16, new));
        }
    }
    patch
}

/// Writes a field patch as the per-field `changed?` bit stream.
pub fn write_field_patch(
    writer: &mut BitWriter,
    table: &[NetField],
    patch: &FieldPatch,
) -> CodecResult<()> {
    let mut pending = patch.iter().peekable();
    for (index, field) in table.iter().enumerate() {
        match pending.peek() {
            Some((next, value)) if usize::from(*next) == index => {
                writer.write_bool(true)?;
                write_field_payload(writer, field, *value)?;
                pending.next();
            }
            _ => writer.write_bool(false)?,
        }
    }
    Ok(())
}

/// Reads a field patch from the per-field `changed?` bit stream.
pub fn read_field_patch(reader: &mut BitReader<'_>, table: &[NetField]) -> CodecResult<FieldPatch> {
    let mut patch = Vec::new();
    for (index, field) in table.iter().enumerate() {
        if reader.read_bool()? {
            patch.push((index as u16, read_field_payload(reader, field)?));
        }
    }
    Ok(patch)
}

/// Applies a patch to a state in place.
pub fn apply_field_patch<T: DeltaState>(state: &mut T, patch: &FieldPatch) {
    for (index, value) in patch {
        state.set_field(usize::from(*index), *value);
    }
}

/// Encodes `to` as a delta against `from`.
pub fn write_delta<T: DeltaState>(writer: &mut BitWriter, from: &T, to: &T) -> CodecResult<()> {
    write_field_patch(writer, T::table(), &diff_fields(from, to))
}

/// Decodes a delta against `from`, producing the new state.
pub fn read_delta<T: DeltaState>(reader: &mut BitReader<'_>, from: &T) -> CodecResult<T> {
    let patch = read_field_patch(reader, T::table())?;
    let mut to = from.clone();
    apply_field_patch(&mut to, &patch);
    Ok(to)
}

// ---------------------------------------------------------------------------
// Player-state array block

fn write_array_slots(writer: &mut BitWriter, slots: &[(u8, i32)]) -> CodecResult<()> {
    if slots.is_empty() {
        writer.write_bool(false)?;
        return Ok(());
    }
    writer.write_bool(true)?;
    let mut mask = 0u32;
    for (slot, _) in slots {
        mask |= 1 << slot;
    }
    writer.write_bits(mask, PLAYER_ARRAY_SLOTS as u8)?;
    for (_, value) in slots {
        writer.write_signed(*value, 16)?;
    }
    Ok(())
}

fn read_array_slots(reader: &mut BitReader<'_>) -> CodecResult<Vec<(u8, i32)>> {
    if !reader.read_bool()? {
        return Ok(Vec::new());
    }
    let mask = reader.read_bits(PLAYER_ARRAY_SLOTS as u8)?;
    let mut slots = Vec::new();
    for slot in 0..PLAYER_ARRAY_SLOTS as u8 {
        if mask & (1 << slot) != 0 {
            slots.push((slot, reader.read_signed(16)?));
        }
    }
    Ok(slots)
}

/// Writes a full player-state patch: scalar fields then the array block.
pub fn write_player_patch(writer: &mut BitWriter, patch: &PlayerPatch) -> CodecResult<()> {
    write_field_patch(writer, PLAYER_FIELDS, &patch.fields)?;
    match &patch.arrays {
        None => writer.write_bool(false)?,
        Some(arrays) => {
            writer.write_bool(true)?;
            write_array_slots(writer, &arrays.stats)?;
            write_array_slots(writer, &arrays.persistant)?;
            write_array_slots(writer, &arrays.ammo)?;
            write_array_slots(writer, &arrays.powerups)?;
        }
    }
    Ok(())
}

/// Reads a full player-state patch.
pub fn read_player_patch(reader: &mut BitReader<'_>) -> CodecResult<PlayerPatch> {
    let fields = read_field_patch(reader, PLAYER_FIELDS)?;
    let arrays = if reader.read_bool()? {
        Some(ArrayDeltas {
            stats: read_array_slots(reader)?,
            persistant: read_array_slots(reader)?,
            ammo: read_array_slots(reader)?,
            powerups: read_array_slots(reader)?,
        })
    } else {
        None
    };
    Ok(PlayerPatch { fields, arrays })
}

/// Computes a full player patch, including the array block.
#[must_use]
pub fn diff_player(
    from: &crate::player::PlayerState,
    to: &crate::player::PlayerState,
) -> PlayerPatch {
    fn diff_slots(from: &[i32; 16], to: &[i32; 16]) -> Vec<(u8, i32)> {
        (0..16)
            .filter(|&i| from[i] != to[i])
            .map(|i| (i as u8, to[i]))
            .collect()
    }

    let arrays = ArrayDeltas {
        stats: diff_slots(&from.stats, &to.stats),
        persistant: diff_slots(&from.persistant, &to.persistant),
        ammo: diff_slots(&from.ammo, &to.ammo),
        powerups: diff_slots(&from.powerups, &to.powerups),
    };
    PlayerPatch {
        fields: diff_fields(from, to),
        arrays: if arrays.is_empty() { None } else { Some(arrays) },
    }
}

/// Applies a player patch, fields then array slots.
pub fn apply_player_patch(state: &mut crate::player::PlayerState, patch: &PlayerPatch) {
    apply_field_patch(state, &patch.fields);
    if let Some(arrays) = &patch.arrays {
        for (slot, value) in &arrays.stats {
            state.stats[usize::from(*slot)] = *value;
        }
        for (slot, value) in &arrays.persistant {
            state.persistant[usize::from(*slot)] = *value;
        }
        for (slot, value) in &arrays.ammo {
            state.ammo[usize::from(*slot)] = *value;
        }
        for (slot, value) in &arrays.powerups {
            state.powerups[usize::from(*slot)] = *value;
        }
    }
}

// ---------------------------------------------------------------------------
// Entity list

/// Writes the entity operations of a snapshot, terminated by the
/// end-of-list sentinel.
pub fn write_entity_ops(writer: &mut BitWriter, ops: &[EntityOp]) -> CodecResult<()> {
    for op in ops {
        writer.write_bits(u32::from(op.number()), GENTITYNUM_BITS)?;
        match op {
            EntityOp::Remove { .. } => writer.write_bool(true)?,
            EntityOp::Update { patch, .. } => {
                writer.write_bool(false)?;
                write_field_patch(writer, ENTITY_FIELDS, &patch.fields)?;
                write_entity_extensions(writer, &patch.extensions)?;
            }
        }
    }
    writer.write_bits(u32::from(ENTITYNUM_NONE), GENTITYNUM_BITS)?;
    Ok(())
}

/// Reads the entity operations of a snapshot up to the sentinel.
///
/// Entity numbers are expected in ascending order; violations are
/// tolerated and logged.
pub fn read_entity_ops(reader: &mut BitReader<'_>, strict: bool) -> CodecResult<Vec<EntityOp>> {
    let mut ops = Vec::new();
    let mut last: Option<u16> = None;
    loop {
        let number = reader.read_bits(GENTITYNUM_BITS)? as u16;
        if number == ENTITYNUM_NONE {
            break;
        }
        if let Some(prev) = last {
            if number <= prev {
                log::warn!("entity list out of order: {number} after {prev}");
            }
        }
        last = Some(number);

        if reader.read_bool()? {
            ops.push(EntityOp::Remove { number });
        } else {
            let fields = read_field_patch(reader, ENTITY_FIELDS)?;
            let extensions = read_entity_extensions(reader, strict)?;
            ops.push(EntityOp::Update {
                number,
                patch: EntityPatch { fields, extensions },
            });
        }
    }
    Ok(ops)
}

/// Computes the entity operations turning `from` into `to`: removals
/// for vanished entities, field deltas for changed or new ones, in
/// ascending entity order.
#[must_use]
pub fn diff_entity_map(
    from: &std::collections::BTreeMap<u16, crate::entity::EntityState>,
    to: &std::collections::BTreeMap<u16, crate::entity::EntityState>,
) -> Vec<EntityOp> {
    let mut ops = Vec::new();
    let mut numbers: Vec<u16> = from.keys().chain(to.keys()).copied().collect();
    numbers.sort_unstable();
    numbers.dedup();

    for number in numbers {
        match (from.get(&number), to.get(&number)) {
            (Some(_), None) => ops.push(EntityOp::Remove { number }),
            (old, Some(new)) => {
                let base = old.cloned().unwrap_or_else(|| {
                    crate::entity::EntityState::with_number(number)
                });
                let fields = diff_fields(&base, new);
                let extensions: Vec<(String, i64)> = new
                    .extensions
                    .iter()
                    .filter(|(name, value)| base.extensions.get(*name) != Some(value))
                    .map(|(name, value)| (name.clone(), *value))
                    .collect();
                if old.is_none() || !fields.is_empty() || !extensions.is_empty() {
                    ops.push(EntityOp::Update {
                        number,
                        patch: EntityPatch { fields, extensions },
                    });
                }
            }
            (None, None) => {}
        }
    }
    ops
}

/// Applies entity operations to a working set. Entities referenced but
/// absent start from a zero state; callers wanting gamestate-baseline
/// fallback should seed the map first.
pub fn apply_entity_ops(
    entities: &mut std::collections::BTreeMap<u16, crate::entity::EntityState>,
    ops: &[EntityOp],
) {
    for op in ops {
        match op {
            EntityOp::Remove { number } => {
                entities.remove(number);
            }
            EntityOp::Update { number, patch } => {
                let mut state = entities
                    .get(number)
                    .cloned()
                    .unwrap_or_else(|| crate::entity::EntityState::with_number(*number));
                state.number = *number;
                apply_field_patch(&mut state, &patch.fields);
                for (name, value) in &patch.extensions {
                    state.extensions.insert(name.clone(), *value);
                }
                entities.insert(*number, state);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Mod-extension fields

pub(crate) fn write_entity_extensions(
    writer: &mut BitWriter,
    extensions: &[(String, i64)],
) -> CodecResult<()> {
    for (name, value) in extensions {
        writer.write_bool(true)?;
        writer.write_string(name, MAX_STRING_CHARS)?;
        writer.write_bits(*value as u32, 32)?;
        writer.write_bits((*value >> 32) as u32, 32)?;
    }
    writer.write_bool(false)?;
    Ok(())
}

pub(crate) fn read_entity_extensions(
    reader: &mut BitReader<'_>,
    strict: bool,
) -> CodecResult<Vec<(String, i64)>> {
    let mut extensions = Vec::new();
    while reader.read_bool()? {
        let name = reader.read_string(MAX_STRING_CHARS)?;
        let low = u64::from(reader.read_bits(32)?);
        let high = u64::from(reader.read_bits(32)?);
        if strict {
            return Err(CodecError::InvalidField { name });
        }
        extensions.push((name, (low | (high << 32)) as i64));
    }
    Ok(extensions)
}

// ---------------------------------------------------------------------------
// User commands

/// Derives the per-field raw bit width of a user-command table entry.
const fn usercmd_width(kind: FieldKind) -> u8 {
    match kind {
        FieldKind::Int { bits, .. } | FieldKind::Angle { bits } => bits,
        _ => 32,
    }
}

/// Replicates an XOR key across a field of the given width.
fn key_mask(key: u8, bits: u8) -> u32 {
    if key == 0 {
        return 0;
    }
    let spread = u32::from(key) * 0x0101_0101;
    if bits >= 32 {
        spread
    } else {
        spread & ((1u32 << bits) - 1)
    }
}

/// Writes a user-command patch: a changed-mask of one bit per field,
/// then the payloads of set fields, each XOR-obfuscated with `key`.
pub fn write_cmd_patch(writer: &mut BitWriter, patch: &FieldPatch, key: u8) -> CodecResult<()> {
    let mut mask = 0u32;
    for (index, _) in patch {
        mask |= 1 << index;
    }
    writer.write_bits(mask, USERCMD_FIELDS.len() as u8)?;
    for (index, value) in patch {
        let field = &USERCMD_FIELDS[usize::from(*index)];
        let bits = usercmd_width(field.kind);
        let FieldValue::Int(v) = value else {
            return Err(CodecError::InvalidField {
                name: field.name.to_string(),
            });
        };
        let raw = if bits >= 32 {
            *v as u32
        } else {
            (*v as u32) & ((1u32 << bits) - 1)
        };
        writer.write_bits(raw ^ key_mask(key, bits), bits)?;
    }
    Ok(())
}

/// Reads a user-command patch.
pub fn read_cmd_patch(reader: &mut BitReader<'_>, key: u8) -> CodecResult<FieldPatch> {
    let mask = reader.read_bits(USERCMD_FIELDS.len() as u8)?;
    let mut patch = Vec::new();
    for (index, field) in USERCMD_FIELDS.iter().enumerate() {
        if mask & (1 << index) == 0 {
            continue;
        }
        let bits = usercmd_width(field.kind);
        let raw = reader.read_bits(bits)? ^ key_mask(key, bits);
        let value = match field.kind {
            FieldKind::Int { signed: true, .. } | FieldKind::Time => {
                let sign = 1u32 << (bits - 1);
                if bits < 32 && raw & sign != 0 {
                    (raw | !(sign | (sign - 1))) as i32
                } else {
                    raw as i32
                }
            }
            _ => raw as i32,
        };
        patch.push((index as u16, FieldValue::Int(value)));
    }
    Ok(patch)
}
