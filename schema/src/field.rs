//! Field descriptors for delta-coded state.

/// The wire encoding of a single delta-coded field.
///
/// Compound fields (vectors, trajectories) do not appear here; the tables
/// expand them into one entry per component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Fixed-width integer, raw bits; signed values sign-extend.
    Int {
        /// Field width in bits (1..=32).
        bits: u8,
        /// Whether the top bit carries the sign.
        signed: bool,
    },

    /// Scalar float: selector bit, then either the biased 13-bit integer
    /// form or 32 raw IEEE-754 bits.
    Float,

    /// Quantized angle: raw bits over a full 360-degree turn. The model
    /// stores the quantized value.
    Angle {
        /// Field width in bits.
        bits: u8,
    },

    /// One component of a position, float-coded with a coordinate grid
    /// divisor.
    Origin,

    /// One component of a direction or velocity, float-coded.
    Vector,

    /// Millisecond timestamp, 32 signed bits.
    Time,

    /// Entity number: 10 raw bits, 1023 meaning "none".
    Entity,
}

impl FieldKind {
    /// Returns `true` if the payload of this kind is a float value.
    #[must_use]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::Float | Self::Origin | Self::Vector)
    }
}

/// One entry of a delta field table.
///
/// The declared order of entries is part of the wire contract for
/// protocol dm_26 and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetField {
    /// Canonical wire name.
    pub name: &'static str,
    /// Wire encoding.
    pub kind: FieldKind,
    /// Quantization divisor for positional fields (world units per
    /// 1/divisor grid step); 1 when not applicable.
    pub divisor: u32,
}

impl NetField {
    pub(crate) const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            divisor: 1,
        }
    }

    pub(crate) const fn with_divisor(name: &'static str, kind: FieldKind, divisor: u32) -> Self {
        Self {
            name,
            kind,
            divisor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_kinds() {
        assert!(FieldKind::Float.is_float());
        assert!(FieldKind::Origin.is_float());
        assert!(FieldKind::Vector.is_float());
        assert!(!FieldKind::Time.is_float());
        assert!(!FieldKind::Entity.is_float());
        assert!(!FieldKind::Int {
            bits: 8,
            signed: false
        }
        .is_float());
    }

    #[test]
    fn netfield_defaults_divisor_to_one() {
        let field = NetField::new("weapon", FieldKind::Int {
            bits: 8,
            signed: false,
        });
        assert_eq!(field.divisor, 1);
    }
}
