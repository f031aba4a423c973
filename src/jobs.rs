//! Job contract, per-phase registry, and the outcome records produced by dispatch.

pub mod job;
pub mod outcome;
pub mod registry;
