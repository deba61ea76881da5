//! # Locator Support
//!
//! Shared utilities for the Locator service container.
//!
//! This crate provides:
//! - Presentation of callable definitions for error messages
//! - Type-name shortening and "did you mean?" suggestions

pub mod rendering;
