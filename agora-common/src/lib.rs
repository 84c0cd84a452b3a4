//! # Agora Common Library
//!
//! Shared code for the Agora debate reader including:
//! - Domain model (topics, viewpoints, stance groups)
//! - Configuration loading and the revalidation window policy
//! - Common error type

pub mod config;
pub mod error;
pub mod models;

pub use error::{Error, Result};
pub use models::{Stance, StanceGroup, Topic, Viewpoint};
