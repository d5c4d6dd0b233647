//! Player input commands embedded in snapshots.

use schema::{NetField, USERCMD_FIELDS};

use crate::delta::{DeltaState, FieldValue};

/// One tick of player input.
///
/// View angles are network-quantized 16-bit turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UserCmd {
    pub server_time: i32,
    /// Quantized view angles (pitch, yaw, roll).
    pub angles: [u16; 3],
    pub forwardmove: i8,
    pub rightmove: i8,
    pub upmove: i8,
    pub buttons: u32,
    pub weapon: u8,
    pub generic_cmd: u8,
}

impl UserCmd {
    /// A view angle in degrees, from its quantized form.
    #[must_use]
    pub fn angle_degrees(&self, axis: usize) -> f32 {
        f32::from(self.angles[axis]) * 360.0 / 65536.0
    }
}

impl DeltaState for UserCmd {
    fn table() -> &'static [NetField] {
        USERCMD_FIELDS
    }

    fn field(&self, index: usize) -> FieldValue {
        FieldValue::Int(match index {
            0 => self.server_time,
            1 => i32::from(self.angles[0]),
            2 => i32::from(self.angles[1]),
            3 => i32::from(self.angles[2]),
            4 => i32::from(self.forwardmove),
            5 => i32::from(self.rightmove),
            6 => i32::from(self.upmove),
            7 => self.buttons as i32,
            8 => i32::from(self.weapon),
            9 => i32::from(self.generic_cmd),
            _ => 0,
        })
    }

    fn set_field(&mut self, index: usize, value: FieldValue) {
        let FieldValue::Int(v) = value else { return };
        match index {
            0 => self.server_time = v,
            1 => self.angles[0] = v as u16,
            2 => self.angles[1] = v as u16,
            3 => self.angles[2] = v as u16,
            4 => self.forwardmove = v as i8,
            5 => self.rightmove = v as i8,
            6 => self.upmove = v as i8,
            7 => self.buttons = v as u32,
            8 => self.weapon = v as u8,
            9 => self.generic_cmd = v as u8,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_cover_the_whole_table() {
        let mut cmd = UserCmd::default();
        for index in 0..USERCMD_FIELDS.len() {
            cmd.set_field(index, FieldValue::Int(3));
            assert!(
                cmd.field(index).bits_eq(FieldValue::Int(3)),
                "field {index} did not roundtrip"
            );
        }
    }

    #[test]
    fn negative_moves_survive() {
        let mut cmd = UserCmd::default();
        cmd.set_field(4, FieldValue::Int(-127));
        assert_eq!(cmd.forwardmove, -127);
        assert!(cmd.field(4).bits_eq(FieldValue::Int(-127)));
    }

    #[test]
    fn buttons_keep_all_32_bits() {
        let mut cmd = UserCmd::default();
        cmd.set_field(7, FieldValue::Int(-1));
        assert_eq!(cmd.buttons, u32::MAX);
    }

    #[test]
    fn angle_degrees_converts_turns() {
        let cmd = UserCmd {
            angles: [0, 16384, 0],
            ..UserCmd::default()
        };
        assert_eq!(cmd.angle_degrees(1), 90.0);
    }
}
