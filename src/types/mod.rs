//! Core types for cadre.

pub mod message;

pub use message::*;
