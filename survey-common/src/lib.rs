//! # Survey Common Library
//!
//! Shared code for the survey service including:
//! - Entity model (surveys, questions, closed choices, replies, answers)
//! - Authoring and reply validation
//! - Reply reconstruction from flat answer rows
//! - Database schema and queries
//! - Admin credential hashing
//! - Configuration loading

pub mod assembly;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod model;
pub mod validation;

pub use error::{Error, Result};
