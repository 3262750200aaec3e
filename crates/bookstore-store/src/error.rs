//! # Store Error Types
//!
//! Error types for the stateful store layer.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                            │
//! │                                                                 │
//! │  CoreError / ValidationError (bookstore-core)                   │
//! │       │                                                         │
//! │       ▼                                                         │
//! │  StoreError (this module) ← adds session/persistence context    │
//! │       │                                                         │
//! │       ▼                                                         │
//! │  Host UI surfaces the message inline and lets the user retry    │
//! │                                                                 │
//! │  Nothing is fatal: every failure is locally recoverable.        │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use bookstore_core::CoreError;

// =============================================================================
// Storage Error
// =============================================================================

/// Persistence failures.
///
/// Malformed stored JSON is deliberately NOT an error: the loaders treat
/// it as "no saved data" and log a warning, so a corrupt slice can never
/// wedge the session.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing medium failed.
    #[error("Storage I/O failed for key '{key}': {reason}")]
    Io { key: String, reason: String },

    /// A slice could not be serialized before writing.
    #[error("Could not serialize slice for key '{key}': {reason}")]
    Serialize { key: String, reason: String },
}

impl StorageError {
    pub fn io(key: impl Into<String>, reason: impl ToString) -> Self {
        StorageError::Io {
            key: key.into(),
            reason: reason.to_string(),
        }
    }

    pub fn serialize(key: impl Into<String>, reason: impl ToString) -> Self {
        StorageError::Serialize {
            key: key.into(),
            reason: reason.to_string(),
        }
    }
}

// =============================================================================
// Store Error
// =============================================================================

/// What the host UI sees when a store mutator fails.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Domain rule violation (wraps bookstore-core errors).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Persistence failure.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The operation needs an authenticated user.
    #[error("No user is logged in")]
    NotLoggedIn,

    /// A checkout is already in flight for this cart.
    #[error("An order is already being placed")]
    CheckoutInProgress,

    /// Checkout was attempted with nothing to order.
    #[error("Cart is empty")]
    EmptyCart,
}

impl From<bookstore_core::ValidationError> for StoreError {
    fn from(err: bookstore_core::ValidationError) -> Self {
        StoreError::Core(CoreError::Validation(err))
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
