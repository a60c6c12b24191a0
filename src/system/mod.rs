//! System-level modules: logging initialization.

pub mod logging;
