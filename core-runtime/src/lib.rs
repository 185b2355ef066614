//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the recitation playback
//! core:
//! - Logging and tracing infrastructure
//! - Configuration management
//! - Event bus system
//!
//! ## Overview
//!
//! This crate contains the runtime utilities the other modules depend on. It
//! establishes the logging conventions, the typed event broadcasting used to
//! notify UI layers of playback state, and the fail-fast configuration
//! builder through which hosts inject their bridge implementations.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
