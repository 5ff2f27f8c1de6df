//! Core driver components for the LMAC DMA HAL.
//!
//! - [`config`] - Queue selectors, transfer status and configuration
//! - [`descriptor`] - Descriptor wrappers, handles and completion actions
//! - [`error`] - Error types and result aliases
//! - [`pool`] - Fixed descriptor arena and free-list
//! - [`scheduler`] - The [`HalDma`] program-queue scheduler
//! - [`stats`] - Event counters
//!
//! # Example
//!
//! ```ignore
//! use lmac_dma::driver::{HalDma, HalDmaConfig, ViolationPolicy};
//!
//! let config = HalDmaConfig::new().with_violation_policy(ViolationPolicy::Report);
//! let mut dma: HalDma<LmacEngine, Callback<u16>> = HalDma::new(LmacEngine::new(), config);
//! ```

// Submodules
pub mod config;
pub mod descriptor;
pub mod error;
pub mod pool;
pub mod scheduler;
pub mod stats;

// Re-exports for convenience
pub use config::{HalDmaConfig, Queue, State, TransferStatus, ViolationPolicy};
pub use descriptor::{Callback, Completion, DescHandle, DescriptorWrapper, Membership};
pub use error::{
    ConfigError, ConfigResult, DmaError, DmaResult, EngineError, Error, ProtocolError,
    ProtocolResult, Result, SubmitError,
};
pub use pool::DescriptorPool;
pub use scheduler::{Descriptor, HalDma};
pub use stats::DmaStats;
