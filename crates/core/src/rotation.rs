//! Quarter-turn block rotations.
//!
//! A [`Rotation`] is a yaw/pitch/roll triple of quarter turns. Applying it to
//! a side performs roll first, then pitch, then yaw. Several triples describe
//! the same orientation; [`Rotation::all`] lists the 24 distinct ones.

use crate::side::{Side, SideFlags};
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! quarter_turn {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            Default,
            Serialize,
            Deserialize,
        )]
        #[repr(u8)]
        pub enum $name {
            /// No rotation.
            #[default]
            None = 0,
            /// A quarter turn clockwise.
            Clockwise90 = 1,
            /// A half turn.
            Clockwise180 = 2,
            /// Three quarter turns clockwise.
            Clockwise270 = 3,
        }

        impl $name {
            /// Every value in increment order.
            pub const ALL: [$name; 4] = [
                $name::None,
                $name::Clockwise90,
                $name::Clockwise180,
                $name::Clockwise270,
            ];

            /// Number of clockwise quarter turns.
            pub const fn increments(self) -> u8 {
                self as u8
            }

            /// Value for a number of quarter turns (taken modulo 4).
            pub const fn from_increments(turns: u8) -> Self {
                match turns % 4 {
                    0 => Self::None,
                    1 => Self::Clockwise90,
                    2 => Self::Clockwise180,
                    _ => Self::Clockwise270,
                }
            }

            /// Sum of two rotations about the same axis.
            pub const fn plus(self, other: Self) -> Self {
                Self::from_increments(self.increments() + other.increments())
            }

            /// Angle in degrees.
            pub const fn degrees(self) -> u16 {
                self as u16 * 90
            }
        }
    };
}

quarter_turn!(
    /// Rotation about the vertical axis.
    Yaw
);
quarter_turn!(
    /// Rotation about the left/right axis.
    Pitch
);
quarter_turn!(
    /// Rotation about the front/back axis.
    Roll
);

/// A block orientation expressed as quarter turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Rotation {
    /// Turns about the vertical axis, applied last.
    pub yaw: Yaw,
    /// Turns about the left/right axis.
    pub pitch: Pitch,
    /// Turns about the front/back axis, applied first.
    pub roll: Roll,
}

impl Rotation {
    /// The identity rotation.
    pub const NONE: Self = Self::new(Yaw::None, Pitch::None, Roll::None);

    /// Construct from the three components.
    pub const fn new(yaw: Yaw, pitch: Pitch, roll: Roll) -> Self {
        Self { yaw, pitch, roll }
    }

    /// Yaw-only rotation.
    pub const fn from_yaw(yaw: Yaw) -> Self {
        Self::new(yaw, Pitch::None, Roll::None)
    }

    /// Pitch-only rotation.
    pub const fn from_pitch(pitch: Pitch) -> Self {
        Self::new(Yaw::None, pitch, Roll::None)
    }

    /// Roll-only rotation.
    pub const fn from_roll(roll: Roll) -> Self {
        Self::new(Yaw::None, Pitch::None, roll)
    }

    /// The four yaw rotations: none, 90, 180, 270.
    pub const fn horizontal() -> [Rotation; 4] {
        [
            Self::from_yaw(Yaw::None),
            Self::from_yaw(Yaw::Clockwise90),
            Self::from_yaw(Yaw::Clockwise180),
            Self::from_yaw(Yaw::Clockwise270),
        ]
    }

    /// Every yaw/pitch/roll triple, yaw-major.
    pub fn combinations() -> impl Iterator<Item = Rotation> {
        Yaw::ALL.into_iter().flat_map(|yaw| {
            Pitch::ALL.into_iter().flat_map(move |pitch| {
                Roll::ALL
                    .into_iter()
                    .map(move |roll| Rotation::new(yaw, pitch, roll))
            })
        })
    }

    /// Every triple, fewest pitch/roll components first, so a yaw-only
    /// triple always precedes an equivalent one that uses pitch or roll.
    fn canonical_order() -> Vec<Rotation> {
        let mut ordered: Vec<Rotation> = Self::combinations().collect();
        ordered.sort_by_key(|r| u8::from(r.pitch != Pitch::None) + u8::from(r.roll != Roll::None));
        ordered
    }

    /// The 24 distinct orientations, each represented by its first triple
    /// in canonical order (yaw-only triples win).
    pub fn all() -> Vec<Rotation> {
        let mut distinct: Vec<Rotation> = Vec::with_capacity(24);
        for rotation in Self::canonical_order() {
            if !distinct.iter().any(|seen| seen.same_orientation(rotation)) {
                distinct.push(rotation);
            }
        }
        distinct
    }

    /// Whether the rotation only turns about the vertical axis.
    pub const fn is_horizontal(self) -> bool {
        matches!(self.pitch, Pitch::None) && matches!(self.roll, Roll::None)
    }

    /// Where `side` ends up after this rotation.
    pub fn rotate(self, side: Side) -> Side {
        side.roll_clockwise(self.roll.increments())
            .pitch_clockwise(self.pitch.increments())
            .yaw_clockwise(self.yaw.increments())
    }

    /// Rotate every side present in `mask`.
    pub fn rotate_flags(self, mask: SideFlags) -> SideFlags {
        mask.sides().map(|side| self.rotate(side)).collect()
    }

    /// Whether both rotations move every side to the same place.
    ///
    /// The images of two non-parallel sides fix an orientation, so only
    /// [`Side::Top`] and [`Side::Front`] are compared.
    pub fn same_orientation(self, other: Rotation) -> bool {
        self.rotate(Side::Top) == other.rotate(Side::Top)
            && self.rotate(Side::Front) == other.rotate(Side::Front)
    }

    /// A rotation equivalent to applying `self` and then `next`.
    pub fn then(self, next: Rotation) -> Rotation {
        let top = next.rotate(self.rotate(Side::Top));
        let front = next.rotate(self.rotate(Side::Front));
        Self::find(top, front)
    }

    /// A rotation that undoes `self`.
    pub fn inverse(self) -> Rotation {
        Self::canonical_order()
            .into_iter()
            .find(|candidate| self.then(*candidate).same_orientation(Rotation::NONE))
            .unwrap_or(Rotation::NONE)
    }

    /// The first triple in canonical order mapping TOP to `top` and FRONT
    /// to `front`. Falls back to the identity for parallel sides, which no
    /// composition of rotations produces.
    fn find(top: Side, front: Side) -> Rotation {
        Self::canonical_order()
            .into_iter()
            .find(|r| r.rotate(Side::Top) == top && r.rotate(Side::Front) == front)
            .unwrap_or(Rotation::NONE)
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "yaw {} pitch {} roll {}",
            self.yaw.degrees(),
            self.pitch.degrees(),
            self.roll.degrees()
        )
    }
}
