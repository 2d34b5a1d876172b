//! Reelflow Core
//!
//! Core types and abstractions for the Reelflow studio client.
//!
//! This crate contains:
//! - Domain types: remote generation jobs, their status and the wizard steps
//! - DTOs: tolerant parsing of the status bodies returned by the backend

pub mod domain;
pub mod dto;
pub mod error;

pub use error::CoreError;
