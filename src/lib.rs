#![warn(missing_docs)]
//! terablock: block families, connection resolution and structured binary
//! persistence for voxel worlds.
//!
//! The member crates carry the engine; this crate wires them to runtime
//! configuration, logging and chunk palettes.

mod config;
mod families;
mod logging;
mod palette;

pub use config::*;
pub use families::*;
pub use logging::*;
pub use palette::*;
