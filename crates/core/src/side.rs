//! Block sides and side bit flags.
//!
//! A [`Side`] names one of the six axis-aligned faces of a block. Every side
//! owns a single bit in [`SideFlags`], which is how connectable families key
//! their variants: the set of connected neighbours becomes one byte.

use bitflags::bitflags;
use glam::{IVec3, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the six faces of a block.
///
/// The discriminant is the side's ordinal and also its bit position in
/// [`SideFlags`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Side {
    /// Positive Y.
    Top = 0,
    /// Negative Y.
    Bottom = 1,
    /// Negative X.
    Left = 2,
    /// Positive X.
    Right = 3,
    /// Negative Z.
    Front = 4,
    /// Positive Z.
    Back = 5,
}

impl Side {
    /// All sides in ordinal order.
    pub const ALL: [Side; 6] = [
        Side::Top,
        Side::Bottom,
        Side::Left,
        Side::Right,
        Side::Front,
        Side::Back,
    ];

    /// The four sides perpendicular to the vertical axis.
    pub const HORIZONTAL: [Side; 4] = [Side::Left, Side::Right, Side::Front, Side::Back];

    /// Stable ordinal (0-5).
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Inverse of [`Side::as_u8`].
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Top),
            1 => Some(Self::Bottom),
            2 => Some(Self::Left),
            3 => Some(Self::Right),
            4 => Some(Self::Front),
            5 => Some(Self::Back),
            _ => None,
        }
    }

    /// The single bit this side occupies in a connection mask.
    pub const fn flag(self) -> SideFlags {
        SideFlags::from_bits_retain(1 << self as u8)
    }

    /// Canonical upper-case name, used as a block URI identifier.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Top => "TOP",
            Self::Bottom => "BOTTOM",
            Self::Left => "LEFT",
            Self::Right => "RIGHT",
            Self::Front => "FRONT",
            Self::Back => "BACK",
        }
    }

    /// Whether the side lies in the horizontal plane.
    pub const fn is_horizontal(self) -> bool {
        matches!(self, Self::Left | Self::Right | Self::Front | Self::Back)
    }

    /// The opposite side.
    pub const fn reverse(self) -> Self {
        match self {
            Self::Top => Self::Bottom,
            Self::Bottom => Self::Top,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
            Self::Front => Self::Back,
            Self::Back => Self::Front,
        }
    }

    /// Unit offset pointing out of this face.
    pub const fn direction(self) -> IVec3 {
        match self {
            Self::Top => IVec3::new(0, 1, 0),
            Self::Bottom => IVec3::new(0, -1, 0),
            Self::Left => IVec3::new(-1, 0, 0),
            Self::Right => IVec3::new(1, 0, 0),
            Self::Front => IVec3::new(0, 0, -1),
            Self::Back => IVec3::new(0, 0, 1),
        }
    }

    /// The side whose axis dominates the given direction.
    ///
    /// Ties fall through to the later axis (x, then y, then z), so a zero
    /// vector resolves to [`Side::Front`].
    pub fn in_direction(x: f32, y: f32, z: f32) -> Self {
        if x.abs() > y.abs() {
            if x.abs() > z.abs() {
                return if x > 0.0 { Self::Right } else { Self::Left };
            }
        } else if y.abs() > z.abs() {
            return if y > 0.0 { Self::Top } else { Self::Bottom };
        }
        if z > 0.0 {
            Self::Back
        } else {
            Self::Front
        }
    }

    /// [`Side::in_direction`] for a vector.
    pub fn in_direction_vec(dir: Vec3) -> Self {
        Self::in_direction(dir.x, dir.y, dir.z)
    }

    /// Rotate about the vertical axis by `turns` clockwise quarter turns.
    pub fn yaw_clockwise(self, turns: u8) -> Self {
        let mut side = self;
        for _ in 0..turns % 4 {
            side = match side {
                Self::Front => Self::Left,
                Self::Left => Self::Back,
                Self::Back => Self::Right,
                Self::Right => Self::Front,
                vertical => vertical,
            };
        }
        side
    }

    /// Rotate about the left/right axis by `turns` clockwise quarter turns.
    pub fn pitch_clockwise(self, turns: u8) -> Self {
        let mut side = self;
        for _ in 0..turns % 4 {
            side = match side {
                Self::Front => Self::Top,
                Self::Top => Self::Back,
                Self::Back => Self::Bottom,
                Self::Bottom => Self::Front,
                other => other,
            };
        }
        side
    }

    /// Rotate about the front/back axis by `turns` clockwise quarter turns.
    pub fn roll_clockwise(self, turns: u8) -> Self {
        let mut side = self;
        for _ in 0..turns % 4 {
            side = match side {
                Self::Top => Self::Left,
                Self::Left => Self::Bottom,
                Self::Bottom => Self::Right,
                Self::Right => Self::Top,
                other => other,
            };
        }
        side
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a side name cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown side name `{0}`")]
pub struct ParseSideError(pub String);

impl FromStr for Side {
    type Err = ParseSideError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Side::ALL
            .into_iter()
            .find(|side| side.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseSideError(s.to_string()))
    }
}

bitflags! {
    /// Set of sides packed into one byte.
    ///
    /// Used as the connectivity mask of multi-connect families: bit `n` is
    /// set when the side with ordinal `n` connects to its neighbour.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
    pub struct SideFlags: u8 {
        /// [`Side::Top`].
        const TOP = 1 << 0;
        /// [`Side::Bottom`].
        const BOTTOM = 1 << 1;
        /// [`Side::Left`].
        const LEFT = 1 << 2;
        /// [`Side::Right`].
        const RIGHT = 1 << 3;
        /// [`Side::Front`].
        const FRONT = 1 << 4;
        /// [`Side::Back`].
        const BACK = 1 << 5;
        /// Every horizontal side.
        const HORIZONTAL =
            Self::LEFT.bits() | Self::RIGHT.bits() | Self::FRONT.bits() | Self::BACK.bits();
    }
}

impl SideFlags {
    /// Build a mask from any collection of sides.
    pub fn from_sides<I: IntoIterator<Item = Side>>(sides: I) -> Self {
        sides
            .into_iter()
            .fold(SideFlags::empty(), |mask, side| mask | side.flag())
    }

    /// The sides contained in this mask, in ordinal order.
    pub fn sides(self) -> impl Iterator<Item = Side> {
        Side::ALL
            .into_iter()
            .filter(move |side| self.contains(side.flag()))
    }

    /// Whether the given side's bit is set.
    pub fn has_side(self, side: Side) -> bool {
        self.contains(side.flag())
    }
}

impl From<Side> for SideFlags {
    fn from(side: Side) -> Self {
        side.flag()
    }
}

impl FromIterator<Side> for SideFlags {
    fn from_iter<T: IntoIterator<Item = Side>>(iter: T) -> Self {
        Self::from_sides(iter)
    }
}
