//! Core timetable model and departure resolution for the peron metro board.

/// Fixed-offset clock adapter for Yekaterinburg time.
pub mod clock;
/// Domain models for the timetable and resolver results.
pub mod model;
/// Traits describing the schedule source interface.
pub mod ports;
/// Day-type and next-departure resolution.
pub mod resolve;

pub use clock::*;
pub use model::*;
pub use ports::*;
pub use resolve::*;
