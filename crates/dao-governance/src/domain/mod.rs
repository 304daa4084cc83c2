//! # Domain Layer (Inner Hexagon)
//!
//! Pure governance concepts: records, value objects, typed arguments, the
//! tally computation and invariant checks.
//! NO host access, NO I/O.

pub mod args;
pub mod entities;
pub mod invariants;
pub mod tally;
pub mod value_objects;

pub use args::*;
pub use entities::*;
pub use invariants::*;
pub use tally::*;
pub use value_objects::*;
