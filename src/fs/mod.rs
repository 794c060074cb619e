//! Filesystem utilities for fsmutex.
//!
//! This module provides the [`FileStore`] abstraction the mutex runs on and
//! the atomic write primitives behind the default local implementation.

pub mod atomic;
mod store;

pub use atomic::{atomic_create, atomic_write};
pub use store::{FileStore, LocalFileStore};
