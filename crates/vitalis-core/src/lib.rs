//! # vitalis-core
//!
//! Core types, ports, configuration, and error handling for Vitalis.

pub mod calendar;
pub mod config;
pub mod error;
pub mod reminder;
pub mod traits;

pub use config::shellexpand;
