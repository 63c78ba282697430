//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into session-level operations.
//! - Keep presentation adapters decoupled from storage details.

pub mod autosave;
pub mod export;
pub mod session;
pub mod text;
