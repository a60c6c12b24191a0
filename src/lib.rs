//! Shortgate - a self-documenting URL shortener
//!
//! This library provides the core functionality for the Shortgate service:
//! shortcode creation and resolution with audit records, GitHub-gated
//! admin routes, and a documentation page that doubles as the fallback for
//! unknown codes.
//!
//! # Architecture
//! - `storage`: key-value namespaces and their backends
//! - `services`: HTTP handlers (create, redirect, auth, admin, docs, flag)
//! - `middleware`: session guard for the admin scope
//! - `session`: signed session tokens
//! - `config`: configuration management
//! - `system`: logging setup

pub mod config;
pub mod errors;
pub mod middleware;
pub mod services;
pub mod session;
pub mod storage;
pub mod system;
pub mod utils;
