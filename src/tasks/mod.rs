//! Background Tasks Module
//!
//! # Tasks
//! - Expiry sweep: purges expired entries from the in-memory store

mod cleanup;

pub use cleanup::spawn_cleanup_task;
