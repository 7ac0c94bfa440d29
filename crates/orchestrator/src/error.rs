//! The orchestrator's error taxonomy.

use topology::Domain;

/// Every way a public orchestrator operation can fail.
///
/// Validation errors (`UnknownName`, `InvalidArgument`, `BatchFrozen`,
/// `NotReady`, `NotSaved`) abort the call with no state change. `Io`
/// errors reported by a provider during push or one-shot read/write
/// trigger fallback to the next resolved candidate; once every candidate
/// is exhausted the failures are concatenated into one `InvalidArgument`.
/// `NotImplemented` from a provider is "proceed" during push/save/restore,
/// never a hard failure on its own.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// No provider declares this name at all.
    #[error("unknown name '{name}' (operation: {operation})")]
    UnknownName {
        /// The operation that was attempted.
        operation: String,
        /// The name that was requested.
        name: String,
    },

    /// The name is known, but no provider supports it at the requested
    /// domain, even after considering cross-domain conversion.
    #[error("no provider for '{name}' at domain {domain:?}[{idx}] (operation: {operation})")]
    NoProvider {
        /// The operation that was attempted.
        operation: String,
        /// The name that was requested.
        name: String,
        /// The requested domain.
        domain: Domain,
        /// The requested domain index.
        idx: usize,
    },

    /// The arguments given to the operation are invalid (bad domain index,
    /// non-finite setting, malformed save file, or every fallback
    /// candidate failed).
    #[error("invalid argument (operation: {operation}, reason: {message})")]
    InvalidArgument {
        /// The operation that was attempted.
        operation: String,
        /// Human-readable reason, possibly concatenating several
        /// per-candidate diagnostics.
        message: String,
    },

    /// A push was attempted after the first `read_batch` or `adjust`.
    #[error("batch frozen, pushing is no longer permitted (operation: {operation})")]
    BatchFrozen {
        /// The operation that was attempted.
        operation: String,
    },

    /// `sample` was called before any `read_batch`.
    #[error("not ready, no prior read_batch (operation: {operation})")]
    NotReady {
        /// The operation that was attempted.
        operation: String,
    },

    /// `restore_controls` was called without a prior `save_controls`.
    #[error("not saved, no prior save_controls (operation: {operation})")]
    NotSaved {
        /// The operation that was attempted.
        operation: String,
    },

    /// The operation is intentionally unavailable.
    #[error("not implemented (operation: {operation})")]
    NotImplemented {
        /// The operation that was attempted.
        operation: String,
    },

    /// A provider-reported read/write failure propagated unchanged (batch
    /// read/write, save, restore; these are not retried).
    #[error("io error (operation: {operation}, reason: {message})")]
    Io {
        /// The operation that was attempted.
        operation: String,
        /// Human-readable reason.
        message: String,
    },

    /// An unexpected failure, either from a provider or from the
    /// orchestrator itself.
    #[error("runtime error (operation: {operation}, reason: {message})")]
    Runtime {
        /// The operation that was attempted.
        operation: String,
        /// Human-readable reason.
        message: String,
    },
}

impl Error {
    /// Maps a `provider::Error` reported during `operation` into the
    /// corresponding orchestrator error, preserving its category.
    pub(crate) fn from_provider(operation: &str, err: provider::Error) -> Self {
        match err {
            provider::Error::UnknownName { name, .. } => Error::UnknownName {
                operation: operation.to_string(),
                name,
            },
            provider::Error::InvalidArgument { message, .. } => Error::InvalidArgument {
                operation: operation.to_string(),
                message,
            },
            provider::Error::NotImplemented { .. } => Error::NotImplemented {
                operation: operation.to_string(),
            },
            provider::Error::Io { message, .. } => Error::Io {
                operation: operation.to_string(),
                message,
            },
            provider::Error::Runtime { message, .. } => Error::Runtime {
                operation: operation.to_string(),
                message,
            },
        }
    }

    /// Maps a `topology::Error` reported during `operation` into
    /// `InvalidArgument`: every topology failure (bad nesting, bad index)
    /// is a validation error from the orchestrator's point of view.
    pub(crate) fn from_topology(operation: &str, err: topology::Error) -> Self {
        Error::InvalidArgument {
            operation: operation.to_string(),
            message: err.to_string(),
        }
    }
}
