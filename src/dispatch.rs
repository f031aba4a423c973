//! Concurrent dispatch of registered jobs and the manager that owns the
//! registry, context and accumulated records.

pub mod dispatcher;
pub mod manager;
