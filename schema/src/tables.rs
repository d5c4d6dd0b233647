//! The dm_26 delta field tables.
//!
//! Entry order is the wire contract: the per-field `changed?` bits and
//! payloads of every state delta are emitted in exactly this order.
//! Vector-valued fields are expanded into one entry per component.

use crate::field::{FieldKind, NetField};

const fn int(name: &'static str, bits: u8) -> NetField {
    NetField::new(name, FieldKind::Int { bits, signed: true })
}

const fn uint(name: &'static str, bits: u8) -> NetField {
    NetField::new(name, FieldKind::Int { bits, signed: false })
}

const fn time(name: &'static str) -> NetField {
    NetField::new(name, FieldKind::Time)
}

const fn entity(name: &'static str) -> NetField {
    NetField::new(name, FieldKind::Entity)
}

const fn angle(name: &'static str) -> NetField {
    NetField::with_divisor(name, FieldKind::Angle { bits: 16 }, 360)
}

const fn origin(name: &'static str) -> NetField {
    NetField::with_divisor(name, FieldKind::Origin, 8)
}

const fn vector(name: &'static str) -> NetField {
    NetField::new(name, FieldKind::Vector)
}

/// Player-state delta fields. The same table serves the vehicle pilot
/// state, which shares the player-state shape.
pub const PLAYER_FIELDS: &[NetField] = &[
    time("commandTime"),
    uint("pm_type", 8),
    origin("origin[0]"),
    origin("origin[1]"),
    origin("origin[2]"),
    vector("velocity[0]"),
    vector("velocity[1]"),
    vector("velocity[2]"),
    int("weaponTime", 16),
    int("gravity", 16),
    int("speed", 16),
    angle("delta_angles[0]"),
    angle("delta_angles[1]"),
    angle("delta_angles[2]"),
    entity("groundEntityNum"),
    uint("legsAnim", 10),
    uint("torsoAnim", 10),
    uint("movementDir", 8),
    uint("eFlags", 16),
    uint("eventSequence", 16),
    uint("events", 16),
    uint("eventParms", 16),
    uint("externalEvent", 10),
    uint("externalEventParm", 8),
    uint("clientNum", 8),
    uint("weapon", 8),
    angle("viewangles[0]"),
    angle("viewangles[1]"),
    angle("viewangles[2]"),
    uint("damageEvent", 8),
    uint("damageYaw", 8),
    uint("damagePitch", 8),
    uint("damageCount", 8),
    uint("generic1", 8),
    uint("loopSound", 16),
    entity("jumppad_ent"),
];

/// Entity-state delta fields. The entity number is not listed: it frames
/// the entity list itself (10 bits, 1023 terminating).
pub const ENTITY_FIELDS: &[NetField] = &[
    uint("pos.trType", 8),
    time("pos.trTime"),
    int("pos.trDuration", 32),
    origin("pos.trBase[0]"),
    origin("pos.trBase[1]"),
    origin("pos.trBase[2]"),
    vector("pos.trDelta[0]"),
    vector("pos.trDelta[1]"),
    vector("pos.trDelta[2]"),
    uint("apos.trType", 8),
    time("apos.trTime"),
    int("apos.trDuration", 32),
    vector("apos.trBase[0]"),
    vector("apos.trBase[1]"),
    vector("apos.trBase[2]"),
    vector("apos.trDelta[0]"),
    vector("apos.trDelta[1]"),
    vector("apos.trDelta[2]"),
    time("time"),
    time("time2"),
    origin("origin[0]"),
    origin("origin[1]"),
    origin("origin[2]"),
    origin("origin2[0]"),
    origin("origin2[1]"),
    origin("origin2[2]"),
    angle("angles[0]"),
    angle("angles[1]"),
    angle("angles[2]"),
    angle("angles2[0]"),
    angle("angles2[1]"),
    angle("angles2[2]"),
    entity("otherEntityNum"),
    entity("otherEntityNum2"),
    entity("groundEntityNum"),
    uint("loopSound", 8),
    uint("constantLight", 32),
    uint("modelindex", 8),
    uint("modelindex2", 8),
    uint("clientNum", 8),
    uint("frame", 16),
    uint("solid", 24),
    uint("event", 10),
    uint("eventParm", 8),
    uint("powerups", 16),
    uint("weapon", 8),
    uint("legsAnim", 10),
    uint("torsoAnim", 10),
    uint("eType", 8),
    uint("eFlags", 32),
    uint("generic1", 8),
];

/// User-command delta fields. The delta framing is a single changed-mask
/// of one bit per entry (LSB = the first entry), then payloads in order.
pub const USERCMD_FIELDS: &[NetField] = &[
    time("serverTime"),
    angle("angles[0]"),
    angle("angles[1]"),
    angle("angles[2]"),
    int("forwardmove", 8),
    int("rightmove", 8),
    int("upmove", 8),
    uint("buttons", 32),
    uint("weapon", 8),
    uint("generic_cmd", 8),
];
