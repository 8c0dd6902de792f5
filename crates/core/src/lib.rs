#![warn(missing_docs)]
//! Core primitives shared across the workspace: sides, rotations and block URIs.

pub mod rotation;
pub mod side;
pub mod uri;

pub use rotation::{Pitch, Roll, Rotation, Yaw};
pub use side::{ParseSideError, Side, SideFlags};
pub use uri::{BlockUri, BlockUriError, DEFAULT_MODULE};
