//! Player state, shared by the viewed player and the vehicle pilot.

use schema::{NetField, PLAYER_FIELDS};

use crate::delta::{DeltaState, FieldValue};
use crate::trajectory::Vec3;

/// Authoritative per-player state.
///
/// Angles are stored network-quantized (16-bit turns over 360 degrees);
/// positions and velocities are world-unit floats whose wire form uses
/// the float/int selector encoding. The vehicle pilot state shares this
/// shape and table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlayerState {
    pub command_time: i32,
    pub pm_type: i32,
    pub origin: Vec3,
    pub velocity: Vec3,
    pub weapon_time: i32,
    pub gravity: i32,
    pub speed: i32,
    /// Quantized angle corrections, one per axis.
    pub delta_angles: [i32; 3],
    pub ground_entity_num: i32,
    pub legs_anim: i32,
    pub torso_anim: i32,
    pub movement_dir: i32,
    pub e_flags: i32,
    pub event_sequence: i32,
    pub events: i32,
    pub event_parms: i32,
    pub external_event: i32,
    pub external_event_parm: i32,
    pub client_num: i32,
    pub weapon: i32,
    /// Quantized view angles, one per axis.
    pub viewangles: [i32; 3],
    pub damage_event: i32,
    pub damage_yaw: i32,
    pub damage_pitch: i32,
    pub damage_count: i32,
    pub generic1: i32,
    pub loop_sound: i32,
    pub jumppad_ent: i32,

    pub stats: [i32; 16],
    pub persistant: [i32; 16],
    pub ammo: [i32; 16],
    pub powerups: [i32; 16],
}

impl PlayerState {
    /// A view angle in degrees, from its quantized form.
    #[must_use]
    pub fn viewangle_degrees(&self, axis: usize) -> f32 {
        self.viewangles[axis] as f32 * 360.0 / 65536.0
    }
}

impl DeltaState for PlayerState {
    fn table() -> &'static [NetField] {
        PLAYER_FIELDS
    }

    fn field(&self, index: usize) -> FieldValue {
        match index {
            0 => FieldValue::Int(self.command_time),
            1 => FieldValue::Int(self.pm_type),
            2 => FieldValue::Float(self.origin[0]),
            3 => FieldValue::Float(self.origin[1]),
            4 => FieldValue::Float(self.origin[2]),
            5 => FieldValue::Float(self.velocity[0]),
            6 => FieldValue::Float(self.velocity[1]),
            7 => FieldValue::Float(self.velocity[2]),
            8 => FieldValue::Int(self.weapon_time),
            9 => FieldValue::Int(self.gravity),
            10 => FieldValue::Int(self.speed),
            11 => FieldValue::Int(self.delta_angles[0]),
            12 => FieldValue::Int(self.delta_angles[1]),
            13 => FieldValue::Int(self.delta_angles[2]),
            14 => FieldValue::Int(self.ground_entity_num),
            15 => FieldValue::Int(self.legs_anim),
            16 => FieldValue::Int(self.torso_anim),
            17 => FieldValue::Int(self.movement_dir),
            18 => FieldValue::Int(self.e_flags),
            19 => FieldValue::Int(self.event_sequence),
            20 => FieldValue::Int(self.events),
            21 => FieldValue::Int(self.event_parms),
            22 => FieldValue::Int(self.external_event),
            23 => FieldValue::Int(self.external_event_parm),
            24 => FieldValue::Int(self.client_num),
            25 => FieldValue::Int(self.weapon),
            26 => FieldValue::Int(self.viewangles[0]),
            27 => FieldValue::Int(self.viewangles[1]),
            28 => FieldValue::Int(self.viewangles[2]),
            29 => FieldValue::Int(self.damage_event),
            30 => FieldValue::Int(self.damage_yaw),
            31 => FieldValue::Int(self.damage_pitch),
            32 => FieldValue::Int(self.damage_count),
            33 => FieldValue::Int(self.generic1),
            34 => FieldValue::Int(self.loop_sound),
            35 => FieldValue::Int(self.jumppad_ent),
            _ => FieldValue::Int(0),
        }
    }

    fn set_field(&mut self, index: usize, value: FieldValue) {
        let int = match value {
            FieldValue::Int(v) => v,
            FieldValue::Float(_) => 0,
        };
        let float = match value {
            FieldValue::Float(v) => v,
            FieldValue::Int(_) => 0.0,
        };
        match index {
            0 => self.command_time = int,
            1 => self.pm_type = int,
            2 => self.origin[0] = float,
            3 => self.origin[1] = float,
            4 => self.origin[2] = float,
            5 => self.velocity[0] = float,
            6 => self.velocity[1] = float,
            7 => self.velocity[2] = float,
            8 => self.weapon_time = int,
            9 => self.gravity = int,
            10 => self.speed = int,
            11 => self.delta_angles[0] = int,
            12 => self.delta_angles[1] = int,
            13 => self.delta_angles[2] = int,
            14 => self.ground_entity_num = int,
            15 => self.legs_anim = int,
            16 => self.torso_anim = int,
            17 => self.movement_dir = int,
            18 => self.e_flags = int,
            19 => self.event_sequence = int,
            20 => self.events = int,
            21 => self.event_parms = int,
            22 => self.external_event = int,
            23 => self.external_event_parm = int,
            24 => self.client_num = int,
            25 => self.weapon = int,
            26 => self.viewangles[0] = int,
            27 => self.viewangles[1] = int,
            28 => self.viewangles[2] = int,
            29 => self.damage_event = int,
            30 => self.damage_yaw = int,
            31 => self.damage_pitch = int,
            32 => self.damage_count = int,
            33 => self.generic1 = int,
            34 => self.loop_sound = int,
            35 => self.jumppad_ent = int,
            _ => {}
        }
    }
}
