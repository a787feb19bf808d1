//! Roll lifecycle tracking.
//!
//! Records every stage transition of a roll so an aborted run can name
//! the stage to resume from.

mod events;
mod journal;

pub use events::*;
pub use journal::*;
