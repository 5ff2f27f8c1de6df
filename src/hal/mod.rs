//! Hardware Abstraction Layer
//!
//! This module holds the traits the scheduler uses to reach the hardware.
//! The crate itself contains no register access; a board or chip crate
//! implements these for the real controller.
//!
//! # Modules
//!
//! - [`engine`]: The DMA engine the program queues run on

pub mod engine;

// Re-export commonly used types
pub use engine::DmaEngine;
