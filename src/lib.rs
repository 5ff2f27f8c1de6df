//! LMAC DMA HAL
//!
//! A `no_std`, `no_alloc` descriptor pool and program-queue scheduler for the
//! general purpose DMA engine of the BL602 lower MAC.
//!
//! The crate manages a fixed set of descriptor wrappers, schedules them onto
//! two FIFO program queues and runs each descriptor's completion action when
//! the engine reports it finished. It never touches registers and never
//! interprets transfer contents; the hardware side is reached through the
//! [`DmaEngine`] trait.
//!
//! # Architecture
//!
//! 1. **Descriptor Pool** ([`driver::pool`]): fixed arena plus free-list
//! 2. **Program Scheduler** ([`driver::scheduler`]): two queues, in-flight
//!    counters, idle-to-active engine arming, completion dispatch
//! 3. **HAL Layer** ([`hal`]): the engine trait implemented by the chip driver
//! 4. **Sync Layer** (`sync`): critical-section wrapper for ISR sharing
//!
//! # Descriptor Lifecycle
//!
//! ```text
//!  Unallocated --initialize--> Free --acquire--> Held --submit--> Queued(q)
//!                               ^                  |                  |
//!                               +----release-------+                  |
//!                               +----------------completion-----------+
//! ```
//!
//! # Features
//!
//! - `defmt`: Enable defmt formatting and logging
//! - `log`: Enable logging through the `log` facade (ignored with `defmt`)
//! - `critical-section`: Enable the ISR-safe `SharedHalDma` wrapper
//!
//! # Example
//!
//! ```ignore
//! use lmac_dma::{Callback, HalDma, HalDmaConfig, Queue, TransferStatus};
//!
//! fn tx_done(frame: u16, status: TransferStatus) { /* ... */ }
//!
//! let mut dma: HalDma<LmacEngine, Callback<u16>> =
//!     HalDma::new(LmacEngine::new(), HalDmaConfig::new());
//! dma.initialize().unwrap();
//!
//! // Thread mode: acquire, fill, submit
//! if let Some(handle) = dma.acquire() {
//!     dma.submit(handle, Queue::Prog0, desc_addr, Callback::new(tx_done, 3))
//!         .map_err(lmac_dma::Error::from)?;
//! }
//!
//! // DMA interrupt: complete everything the engine finished
//! dma.service(Queue::Prog0, TransferStatus::Success).ok();
//! ```
//!
//! # Memory Requirements
//!
//! Everything is embedded in the [`HalDma`] value: `N` wrappers (payload
//! handle, completion, link and tag each) plus a few dozen bytes of queue
//! state. Nothing is allocated.

#![no_std]
#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::correctness)]
#![warn(
    clippy::suspicious,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::cloned_instead_of_copied,
    clippy::explicit_iter_loop,
    clippy::implicit_clone,
    clippy::inconsistent_struct_constructor,
    clippy::manual_assert,
    clippy::manual_let_else,
    clippy::match_same_arms,
    clippy::needless_pass_by_value,
    clippy::semicolon_if_nothing_returned,
    clippy::uninlined_format_args,
    clippy::unnested_or_patterns,
    clippy::std_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::alloc_instead_of_core
)]
#![allow(
    clippy::mod_module_files,
    clippy::self_named_module_files,
    clippy::similar_names,
    clippy::type_complexity,
    clippy::must_use_candidate,
    clippy::assertions_on_constants,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::cast_lossless,
    clippy::panic_in_result_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::module_name_repetitions,
    clippy::items_after_statements
)]

// Logging macros must come first so every module sees them
#[macro_use]
mod fmt;

// =============================================================================
// Modules
// =============================================================================

pub mod driver;
pub mod hal;

// Internal implementation details (pub(crate) only)
mod internal;

#[cfg(feature = "critical-section")]
#[cfg_attr(docsrs, doc(cfg(feature = "critical-section")))]
pub mod sync;

// Test doubles (only available during testing)
#[cfg(test)]
mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use driver::config::{HalDmaConfig, Queue, State, TransferStatus, ViolationPolicy};
pub use driver::descriptor::{Callback, Completion, DescHandle, DescriptorWrapper, Membership};
pub use driver::error::{
    ConfigError, ConfigResult, DmaError, DmaResult, EngineError, Error, ProtocolError,
    ProtocolResult, Result, SubmitError,
};
pub use driver::pool::DescriptorPool;
pub use driver::scheduler::{Descriptor, HalDma};
pub use driver::stats::DmaStats;
pub use hal::DmaEngine;

// Re-export sync types when critical-section is enabled
#[cfg(feature = "critical-section")]
pub use sync::{CriticalSectionCell, SharedHalDma};

/// Shared sizing constants.
pub mod constants {
    pub use crate::internal::constants::{DEFAULT_POOL_SIZE, MAX_POOL_SIZE, QUEUE_COUNT};
}

// =============================================================================
// Macro Helpers
// =============================================================================

/// Declare a static, ISR-safe scheduler instance.
///
/// Expands to a [`SharedHalDma`](crate::sync::SharedHalDma) static. The pool
/// size defaults to [`DEFAULT_POOL_SIZE`](crate::constants::DEFAULT_POOL_SIZE)
/// and the configuration to [`HalDmaConfig::new`].
///
/// # Examples
///
/// ```ignore
/// lmac_dma::hal_dma_static!(DMA, LmacEngine, Callback<u16>, LmacEngine::new());
/// lmac_dma::hal_dma_static!(BIG_DMA, LmacEngine, Callback<u16>, LmacEngine::new(), 16);
///
/// DMA.initialize().unwrap();
/// ```
#[cfg(feature = "critical-section")]
#[macro_export]
macro_rules! hal_dma_static {
    ($name:ident, $engine:ty, $completion:ty, $engine_init:expr) => {
        $crate::hal_dma_static!(
            $name,
            $engine,
            $completion,
            $engine_init,
            $crate::constants::DEFAULT_POOL_SIZE
        );
    };
    ($name:ident, $engine:ty, $completion:ty, $engine_init:expr, $n:expr) => {
        $crate::hal_dma_static!(
            $name,
            $engine,
            $completion,
            $engine_init,
            $n,
            $crate::HalDmaConfig::new()
        );
    };
    ($name:ident, $engine:ty, $completion:ty, $engine_init:expr, $n:expr, $config:expr) => {
        static $name: $crate::sync::SharedHalDma<$engine, $completion, { $n }> =
            $crate::sync::SharedHalDma::new($engine_init, $config);
    };
}
