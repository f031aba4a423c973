//! Runtime glue: installation config, shared run context, outcome logging,
//! duration accounting, telemetry, and the component install runner.

pub mod config;
pub mod context;
pub mod duration;
pub mod logger;
pub mod runner;
pub mod telemetry;
