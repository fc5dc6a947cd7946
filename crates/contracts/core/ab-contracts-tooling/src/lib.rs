//! Interface generation pipeline for annotated contracts.
//!
//! Ties together ABI generation, read-only verification and dispatcher generation, and handles
//! front end inputs and generated outputs on disk.

pub mod input;
pub mod output;
pub mod pipeline;
