//! Domain model for todo blocks, days and routines.
//!
//! # Responsibility
//! - Define canonical value objects used by repositories and services.
//! - Keep ownership edges explicit: every child carries its parent id.
//!
//! # Invariants
//! - Every entity is identified by a stable v4 UUID.
//! - A child (day todo, routine instance, routine todo instance, todo) never
//!   exists without its owning parent.

pub mod common;
pub mod day;
pub mod routine;
pub mod todo;
