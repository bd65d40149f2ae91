//! Non-I/O application services.

pub mod analytics;
