//! Core types shared across talkplan facilities
//!
//! This crate provides foundational types used by both error handling
//! and logging facilities:
//!
//! - **Schema constants**: Canonical field keys and event names
//! - **Sensitive data**: `Sensitive<T>` marker for automatic redaction of
//!   speaker contact details

pub mod schema;
pub mod sensitive;

pub use sensitive::Sensitive;
