#![warn(missing_docs)]
//! Block families: the variants of a logical block type and the rules that
//! pick one of them for a placement or a neighbour change.

mod attached_to_surface;
mod block;
mod ceiling_supporting;
mod connectivity;
mod definition;
mod family;
mod horizontal;
mod library;
mod multi_connect;
mod symmetric;

pub use attached_to_surface::*;
pub use block::*;
pub use ceiling_supporting::*;
pub use connectivity::*;
pub use definition::*;
pub use family::*;
pub use horizontal::*;
pub use library::*;
pub use multi_connect::*;
pub use symmetric::*;
