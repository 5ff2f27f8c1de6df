//! Error types for the DMA HAL
//!
//! Errors are organized by domain for better diagnostics:
//! - [`ConfigError`]: Bad queue selectors and other configuration input
//! - [`DmaError`]: Runtime conditions (exhaustion, spurious completions,
//!   hardware submission failures)
//! - [`ProtocolError`]: Programmer errors against the descriptor lifecycle
//! - [`EngineError`]: Failures reported by the hardware descriptor driver
//!
//! The unified [`Error`] enum wraps all domain errors and is returned
//! by most scheduler methods.

use crate::driver::descriptor::DescHandle;

// =============================================================================
// Configuration Errors
// =============================================================================

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Queue selector outside the two program queues
    InvalidQueue,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ConfigError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ConfigError::InvalidQueue => "invalid program queue",
        }
    }
}

// =============================================================================
// Engine Errors
// =============================================================================

/// Failure reported by the hardware descriptor driver when arming or
/// chaining a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EngineError {
    /// Engine channel is busy with work this layer did not submit
    Busy,
    /// Descriptor payload rejected by the driver (bad address, alignment)
    InvalidDescriptor,
    /// Bus or controller fault
    Fault,
}

impl core::fmt::Display for EngineError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl EngineError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            EngineError::Busy => "engine busy",
            EngineError::InvalidDescriptor => "descriptor rejected by engine",
            EngineError::Fault => "engine fault",
        }
    }
}

// =============================================================================
// DMA Errors
// =============================================================================

/// Runtime DMA scheduling errors
///
/// These are recoverable at the caller's boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DmaError {
    /// Descriptor pool exhausted (backpressure, retry later)
    NoDescriptorsAvailable,
    /// Completion signalled for a queue with nothing in flight
    SpuriousCompletion,
    /// Hardware refused to start or chain the descriptor
    SubmitFailed(EngineError),
    /// Descriptors still queued or held by callers
    Busy,
}

impl core::fmt::Display for DmaError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DmaError::SubmitFailed(e) => write!(f, "{}: {}", self.as_str(), e.as_str()),
            _ => f.write_str(self.as_str()),
        }
    }
}

impl DmaError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            DmaError::NoDescriptorsAvailable => "no descriptors available",
            DmaError::SpuriousCompletion => "spurious completion",
            DmaError::SubmitFailed(_) => "hardware submission failed",
            DmaError::Busy => "descriptors outstanding",
        }
    }
}

// =============================================================================
// Protocol Errors
// =============================================================================

/// Descriptor lifecycle violations.
///
/// These indicate a bug in the caller. Depending on the configured
/// [`ViolationPolicy`](crate::ViolationPolicy) they either panic or are
/// returned without any state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProtocolError {
    /// `initialize` called on a ready scheduler
    AlreadyInitialized,
    /// Operation attempted before `initialize`
    NotInitialized,
    /// Descriptor submitted without a completion action
    MissingCompletion,
    /// Descriptor submitted without a hardware payload
    MissingPayload,
    /// Descriptor is not held by the caller
    DescriptorNotHeld,
    /// Descriptor is linked into a program queue
    DescriptorLinked,
    /// Descriptor is already in the free pool
    DoubleRelease,
    /// Handle does not name a slot of this pool
    InvalidDescriptor,
}

impl core::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ProtocolError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ProtocolError::AlreadyInitialized => "already initialized",
            ProtocolError::NotInitialized => "not initialized",
            ProtocolError::MissingCompletion => "missing completion callback",
            ProtocolError::MissingPayload => "missing hardware descriptor",
            ProtocolError::DescriptorNotHeld => "descriptor not held",
            ProtocolError::DescriptorLinked => "descriptor linked into a queue",
            ProtocolError::DoubleRelease => "descriptor released twice",
            ProtocolError::InvalidDescriptor => "invalid descriptor handle",
        }
    }
}

// =============================================================================
// Unified Error Type
// =============================================================================

/// This enum wraps all domain-specific errors for unified error handling.
///
/// Match on the inner domain error for specific handling:
/// ```ignore
/// match result {
///     Err(Error::Dma(DmaError::NoDescriptorsAvailable)) => { /* defer */ }
///     Err(Error::Dma(DmaError::SubmitFailed(e))) => { /* reset engine */ }
///     Err(Error::Protocol(e)) => { /* caller bug */ }
///     _ => {}
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Configuration error
    Config(ConfigError),
    /// DMA scheduling error
    Dma(DmaError),
    /// Descriptor lifecycle violation
    Protocol(ProtocolError),
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Config(e) => write!(f, "config: {e}"),
            Error::Dma(e) => write!(f, "dma: {e}"),
            Error::Protocol(e) => write!(f, "protocol: {e}"),
        }
    }
}

// From impls for automatic conversion
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<DmaError> for Error {
    fn from(e: DmaError) -> Self {
        Error::Dma(e)
    }
}

impl From<ProtocolError> for Error {
    fn from(e: ProtocolError) -> Self {
        Error::Protocol(e)
    }
}

impl From<EngineError> for Error {
    fn from(e: EngineError) -> Self {
        Error::Dma(DmaError::SubmitFailed(e))
    }
}

// =============================================================================
// Submit Error
// =============================================================================

/// A rejected submission.
///
/// The descriptor stays held by the caller, so the handle travels back
/// inside the error. Recover it with [`SubmitError::into_handle`] to retry
/// or release it; dropping the error leaks the descriptor until teardown.
#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[must_use = "dropping a SubmitError leaks the descriptor it carries"]
pub struct SubmitError {
    error: Error,
    handle: DescHandle,
}

impl SubmitError {
    pub(crate) fn new(error: Error, handle: DescHandle) -> Self {
        Self { error, handle }
    }

    /// Why the submission was rejected
    pub const fn error(&self) -> Error {
        self.error
    }

    /// Take back the descriptor handle
    pub fn into_handle(self) -> DescHandle {
        self.handle
    }

    /// Split into the error and the descriptor handle
    pub fn into_parts(self) -> (Error, DescHandle) {
        (self.error, self.handle)
    }
}

impl core::fmt::Display for SubmitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "submit rejected: {}", self.error)
    }
}

impl From<SubmitError> for Error {
    fn from(e: SubmitError) -> Self {
        e.error
    }
}

/// Result type alias for scheduler operations
pub type Result<T> = core::result::Result<T, Error>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = core::result::Result<T, ConfigError>;

/// Result type alias for DMA operations
pub type DmaResult<T> = core::result::Result<T, DmaError>;

/// Result type alias for descriptor lifecycle checks
pub type ProtocolResult<T> = core::result::Result<T, ProtocolError>;

// =============================================================================
// Unit Tests
// =============================================================================
