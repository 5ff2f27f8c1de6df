//! Synchronization and Concurrency Support
//!
//! This module provides the pieces needed to share one scheduler between
//! thread mode and the DMA interrupt:
//!
//! - **Primitives** (`primitives`): Low-level synchronization types
//!   - [`CriticalSectionCell`] - ISR-safe interior mutability
//!
//! - **Shared Wrappers** (`shared`): ISR-safe scheduler wrapper
//!   - [`SharedHalDma`] - Critical-section protected [`HalDma`](crate::HalDma)
//!
//! # Feature Flags
//!
//! - `critical-section`: Enables this module
//!
//! # Example
//!
//! ```ignore
//! use lmac_dma::sync::SharedHalDma;
//!
//! static DMA: SharedHalDma<LmacEngine, Callback<u16>> =
//!     SharedHalDma::new(LmacEngine::new(), HalDmaConfig::new());
//!
//! fn main() {
//!     DMA.initialize().unwrap();
//! }
//!
//! #[interrupt]
//! fn DMA_IRQ() {
//!     // Completions run outside the critical section
//!     DMA.service(Queue::Prog0, TransferStatus::Success).ok();
//! }
//! ```

mod primitives;

pub use primitives::CriticalSectionCell;

mod shared;

pub use shared::SharedHalDma;
