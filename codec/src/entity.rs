//! Per-entity network state.

use std::collections::BTreeMap;

use schema::{NetField, ENTITY_FIELDS};

use crate::delta::{DeltaState, FieldValue};
use crate::trajectory::Trajectory;

/// The network state of one entity slot.
///
/// `number` frames the entity inside the snapshot list and is not part
/// of the delta table. Unknown mod-extended wire fields round-trip
/// through `extensions`, keyed by canonical name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EntityState {
    pub number: u16,
    /// Positional trajectory.
    pub pos: Trajectory,
    /// Angular trajectory.
    pub apos: Trajectory,
    pub time: i32,
    pub time2: i32,
    pub origin: [f32; 3],
    pub origin2: [f32; 3],
    /// Quantized angles.
    pub angles: [i32; 3],
    /// Quantized secondary angles.
    pub angles2: [i32; 3],
    pub other_entity_num: i32,
    pub other_entity_num2: i32,
    pub ground_entity_num: i32,
    pub loop_sound: i32,
    pub constant_light: i32,
    pub model_index: i32,
    pub model_index2: i32,
    pub client_num: i32,
    pub frame: i32,
    pub solid: i32,
    pub event: i32,
    pub event_parm: i32,
    pub powerups: i32,
    pub weapon: i32,
    pub legs_anim: i32,
    pub torso_anim: i32,
    pub e_type: i32,
    pub e_flags: i32,
    pub generic1: i32,

    /// Mod-extended fields preserved for re-encoding.
    pub extensions: BTreeMap<String, i64>,
}

impl EntityState {
    /// Creates a zeroed state for the given entity slot.
    #[must_use]
    pub fn with_number(number: u16) -> Self {
        Self {
            number,
            ..Self::default()
        }
    }
}

impl DeltaState for EntityState {
    fn table() -> &'static [NetField] {
        ENTITY_FIELDS
    }

    fn field(&self, index: usize) -> FieldValue {
        match index {
            0 => FieldValue::Int(i32::from(self.pos.tr_type)),
            1 => FieldValue::Int(self.pos.start_time),
            2 => FieldValue::Int(self.pos.duration),
            3 => FieldValue::Float(self.pos.base[0]),
            4 => FieldValue::Float(self.pos.base[1]),
            5 => FieldValue::Float(self.pos.base[2]),
            6 => FieldValue::Float(self.pos.delta[0]),
            7 => FieldValue::Float(self.pos.delta[1]),
            8 => FieldValue::Float(self.pos.delta[2]),
            9 => FieldValue::Int(i32::from(self.apos.tr_type)),
            10 => FieldValue::Int(self.apos.start_time),
            11 => FieldValue::Int(self.apos.duration),
            12 => FieldValue::Float(self.apos.base[0]),
            13 => FieldValue::Float(self.apos.base[1]),
            14 => FieldValue::Float(self.apos.base[2]),
            15 => FieldValue::Float(self.apos.delta[0]),
            16 => FieldValue::Float(self.apos.delta[1]),
            17 => FieldValue::Float(self.apos.delta[2]),
            18 => FieldValue::Int(self.time),
            19 => FieldValue::Int(self.time2),
            20 => FieldValue::Float(self.origin[0]),
            21 => FieldValue::Float(self.origin[1]),
            22 => FieldValue::Float(self.origin[2]),
            23 => FieldValue::Float(self.origin2[0]),
            24 => FieldValue::Float(self.origin2[1]),
            25 => FieldValue::Float(self.origin2[2]),
            26 => FieldValue::Int(self.angles[0]),
            27 => FieldValue::Int(self.angles[1]),
            28 => FieldValue::Int(self.angles[2]),
            29 => FieldValue::Int(self.angles2[0]),
            30 => FieldValue::Int(self.angles2[1]),
            31 => FieldValue::Int(self.angles2[2]),
            32 => FieldValue::Int(self.other_entity_num),
            33 => FieldValue::Int(self.other_entity_num2),
            34 => FieldValue::Int(self.ground_entity_num),
            35 => FieldValue::Int(self.loop_sound),
            36 => FieldValue::Int(self.constant_light),
            37 => FieldValue::Int(self.model_index),
            38 => FieldValue::Int(self.model_index2),
            39 => FieldValue::Int(self.client_num),
            40 => FieldValue::Int(self.frame),
            41 => FieldValue::Int(self.solid),
            42 => FieldValue::Int(self.event),
            43 => FieldValue::Int(self.event_parm),
            44 => FieldValue::Int(self.powerups),
            45 => FieldValue::Int(self.weapon),
            46 => FieldValue::Int(self.legs_anim),
            47 => FieldValue::Int(self.torso_anim),
            48 => FieldValue::Int(self.e_type),
            49 => FieldValue::Int(self.e_flags),
            50 => FieldValue::Int(self.generic1),
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
            0 => self.pos.tr_type = int as u8,
            1 => self.pos.start_time = int,
            2 => self.pos.duration = int,
            3 => self.pos.base[0] = float,
            4 => self.pos.base[1] = float,
            5 => self.pos.base[2] = float,
            6 => self.pos.delta[0] = float,
            7 => self.pos.delta[1] = float,
            8 => self.pos.delta[2] = float,
            9 => self.apos.tr_type = int as u8,
            10 => self.apos.start_time = int,
            11 => self.apos.duration = int,
            12 => self.apos.base[0] = float,
            13 => self.apos.base[1] = float,
            14 => self.apos.base[2] = float,
            15 => self.apos.delta[0] = float,
            16 => self.apos.delta[1] = float,
            17 => self.apos.delta[2] = float,
            18 => self.time = int,
            19 => self.time2 = int,
            20 => self.origin[0] = float,
            21 => self.origin[1] = float,
            22 => self.origin[2] = float,
            23 => self.origin2[0] = float,
            24 => self.origin2[1] = float,
            25 => self.origin2[2] = float,
            26 => self.angles[0] = int,
            27 => self.angles[1] = int,
            28 => self.angles[2] = int,
            29 => self.angles2[0] = int,
            30 => self.angles2[1] = int,
            31 => self.angles2[2] = int,
            32 => self.other_entity_num = int,
            33 => self.other_entity_num2 = int,
            34 => self.ground_entity_num = int,
            35 => self.loop_sound = int,
            36 => self.constant_light = int,
            37 => self.model_index = int,
            38 => self.model_index2 = int,
            39 => self.client_num = int,
            40 => self.frame = int,
            41 => self.solid = int,
            42 => self.event = int,
            43 => self.event_parm = int,
            44 => self.powerups = int,
            45 => self.weapon = int,
            46 => self.legs_anim = int,
            47 => self.torso_anim = int,
            48 => self.e_type = int,
            49 => self.e_flags = int,
            50 => self.generic1 = int,
            _ => {}
        }
    }
}
