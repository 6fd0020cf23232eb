//! Utility modules: timeout and cancellation guards.

pub mod timeout;
