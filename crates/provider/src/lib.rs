#![deny(
    trivial_numeric_casts,
    missing_docs,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications,
    unused_extern_crates,
    unused_results
)]
#![warn(rust_2021_compatibility, unreachable_pub)]

//! Definition of the `Provider` trait: the uniform backend interface the
//! orchestrator composes.
//!
//! A provider owns a namespace of signal and control names, each tied to a
//! native topology domain, and exposes per-name metadata (aggregation hint,
//! format hint, description, behavior class) alongside the read/write/batch
//! operations. Concrete providers (MSR, sysfs, GPU libraries, constant
//! tables) implement this trait; this crate only specifies the boundary.

use std::collections::BTreeSet;

use topology::Domain;

/// Errors a `Provider` can report.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The provider does not know this signal or control name.
    #[error("unknown name '{name}' (provider: {provider})")]
    UnknownName {
        /// The provider that was asked.
        provider: String,
        /// The name that was requested.
        name: String,
    },

    /// The arguments given to the operation are invalid.
    #[error("invalid argument (provider: {provider}, reason: {message})")]
    InvalidArgument {
        /// The provider that was asked.
        provider: String,
        /// Human-readable reason.
        message: String,
    },

    /// The operation is intentionally unavailable on this provider.
    #[error("not implemented (provider: {provider}, operation: {operation})")]
    NotImplemented {
        /// The provider that was asked.
        provider: String,
        /// The operation that is unavailable.
        operation: String,
    },

    /// A read or write against the underlying hardware failed.
    #[error("io error (provider: {provider}, reason: {message})")]
    Io {
        /// The provider that was asked.
        provider: String,
        /// Human-readable reason.
        message: String,
    },

    /// An unexpected failure occurred inside the provider.
    #[error("runtime error (provider: {provider}, reason: {message})")]
    Runtime {
        /// The provider that was asked.
        provider: String,
        /// Human-readable reason.
        message: String,
    },
}

/// A handle returned by a provider's own `push_signal` / `push_control`,
/// opaque to everything except that provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProviderHandle(pub usize);

/// How the orchestrator should combine per-sub-domain values of a signal
/// (or divide a setting across sub-domains of a control) when the
/// requested domain is coarser than the provider's native domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum AggregationKind {
    /// Sum of the sub-values.
    Sum,
    /// Arithmetic mean of the sub-values.
    Average,
    /// Minimum of the sub-values.
    Min,
    /// Maximum of the sub-values.
    Max,
    /// The first sub-value, irrespective of the others.
    SelectFirst,
    /// All sub-values are expected to be identical; the first is returned.
    ExpectSame,
}

impl AggregationKind {
    /// Reduces a vector of per-sub-domain samples into one scalar according
    /// to this aggregation hint.
    ///
    /// Called with an empty slice only when a `CombinedSignal`/
    /// `CombinedControl` has no sub-handles, which the orchestrator never
    /// constructs (`nested` always yields at least the requesting index).
    pub fn reduce(self, values: &[f64]) -> f64 {
        match self {
            AggregationKind::Sum => values.iter().sum(),
            AggregationKind::Average => values.iter().sum::<f64>() / values.len() as f64,
            AggregationKind::Min => values.iter().cloned().fold(f64::INFINITY, f64::min),
            AggregationKind::Max => values.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
            AggregationKind::SelectFirst | AggregationKind::ExpectSame => values[0],
        }
    }

    /// True when this aggregation kind is `Sum`, the case in which
    /// cross-domain disaggregation divides a setting across sub-controls.
    pub fn is_sum(self) -> bool {
        matches!(self, AggregationKind::Sum)
    }
}

/// How a signal's value should be rendered as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum FormatHint {
    /// Render with full floating-point precision.
    Float,
    /// Truncate and render as an integer.
    Integer,
    /// Render as a hexadecimal integer literal.
    Hex,
    /// Render using the default `f64` `Display` implementation.
    Raw,
}

impl FormatHint {
    /// Renders `value` according to this hint.
    pub fn format(self, value: f64) -> String {
        match self {
            FormatHint::Float => format!("{value:.6}"),
            FormatHint::Integer => format!("{}", value as i64),
            FormatHint::Hex => format!("0x{:x}", value as i64 as u64),
            FormatHint::Raw => value.to_string(),
        }
    }
}

/// Reporting-facing classification of a signal's runtime behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum BehaviorClass {
    /// The signal never changes.
    Constant,
    /// The signal only ever increases.
    Monotone,
    /// The signal varies up and down over time.
    Variable,
    /// The signal is not meaningfully summarized over time.
    Label,
}

/// The uniform backend interface the orchestrator composes.
///
/// All operations are bounded to the provider's own namespace of names;
/// the orchestrator is responsible for resolving a name to a provider
/// before calling into it. Every operation is synchronous: a provider may
/// block the calling thread doing kernel I/O, but never suspends or
/// spawns background work.
pub trait Provider: Send {
    /// A short, stable identifier for this provider (used to derive
    /// persistence file names and in diagnostics).
    fn name(&self) -> &str;

    /// The set of signal names this provider supplies.
    fn signal_names(&self) -> BTreeSet<String>;

    /// The set of control names this provider supplies.
    fn control_names(&self) -> BTreeSet<String>;

    /// The native domain at which `name` is implemented.
    fn signal_domain(&self, name: &str) -> Result<Domain, Error>;

    /// The native domain at which `name` is implemented.
    fn control_domain(&self, name: &str) -> Result<Domain, Error>;

    /// The aggregation hint declared for `name` (signal or control).
    fn aggregation(&self, name: &str) -> Result<AggregationKind, Error>;

    /// The format hint declared for `name`.
    fn format_hint(&self, name: &str) -> Result<FormatHint, Error>;

    /// A human-readable description of signal `name`.
    fn describe_signal(&self, name: &str) -> Result<String, Error>;

    /// A human-readable description of control `name`.
    fn describe_control(&self, name: &str) -> Result<String, Error>;

    /// The behavior class declared for signal `name`.
    fn behavior(&self, name: &str) -> Result<BehaviorClass, Error>;

    /// Reads `name` at `(domain, idx)` immediately, without affecting any
    /// batch slot.
    fn read_signal(&mut self, name: &str, domain: Domain, idx: usize) -> Result<f64, Error>;

    /// Writes `setting` to `name` at `(domain, idx)` immediately, without
    /// affecting any batch slot.
    fn write_control(&mut self, name: &str, domain: Domain, idx: usize, setting: f64) -> Result<(), Error>;

    /// Registers `name` at `(domain, idx)` as a batch-read slot, returning a
    /// provider-local handle stable for the life of the provider.
    fn push_signal(&mut self, name: &str, domain: Domain, idx: usize) -> Result<ProviderHandle, Error>;

    /// Registers `name` at `(domain, idx)` as a batch-write slot, returning
    /// a provider-local handle stable for the life of the provider.
    fn push_control(&mut self, name: &str, domain: Domain, idx: usize) -> Result<ProviderHandle, Error>;

    /// Refreshes every pushed signal so that `sample` reflects current
    /// hardware state.
    fn read_batch(&mut self) -> Result<(), Error>;

    /// Writes every adjusted control to hardware.
    fn write_batch(&mut self) -> Result<(), Error>;

    /// Returns the value last read by `read_batch` for `handle`.
    fn sample(&mut self, handle: ProviderHandle) -> Result<f64, Error>;

    /// Stages `setting` for `handle`, to be written on the next
    /// `write_batch`. Performs no I/O.
    fn adjust(&mut self, handle: ProviderHandle, setting: f64) -> Result<(), Error>;

    /// Captures the current value of every control this provider owns, so
    /// a later `restore` can put them back. A no-op for read-only
    /// providers.
    fn save(&mut self) -> Result<(), Error> {
        Ok(())
    }

    /// Writes back the values captured by the last `save`. A no-op for
    /// read-only providers.
    fn restore(&mut self) -> Result<(), Error> {
        Ok(())
    }
}
