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

//! `CombinedSignal` and `CombinedControl`: the virtual batch-slot
//! primitives that fan a cross-domain request out to several
//! provider-backed sub-slots.
//!
//! Both reference their sub-slots by integer handle only, never by
//! back-pointer, so the dependency graph rooted at any batch slot is a
//! strict DAG with an explicit, acyclic traversal order.

use provider::AggregationKind;

/// A generic batch-slot handle. Combined primitives are agnostic to
/// whether a handle refers to a provider-backed slot or to another
/// combined slot; that distinction is the registry's concern.
pub type Handle = usize;

/// A virtual signal derived from the aggregation of N sub-signal handles.
///
/// Created when `push_signal` is asked for a domain coarser than a
/// signal's native domain. Sampling a `CombinedSignal` recursively samples
/// every sub-handle and reduces the resulting vector with the declared
/// aggregation function.
#[derive(Debug, Clone)]
pub struct CombinedSignal {
    aggregation: AggregationKind,
    subs: Vec<Handle>,
}

impl CombinedSignal {
    /// Creates a combined signal over `subs`, reduced with `aggregation`.
    pub fn new(aggregation: AggregationKind, subs: Vec<Handle>) -> Self {
        Self { aggregation, subs }
    }

    /// The sub-signal handles this combined signal fans out to, in the
    /// order they must be sampled.
    pub fn subs(&self) -> &[Handle] {
        &self.subs
    }

    /// Reduces already-sampled sub-values (one per `subs()` entry, same
    /// order) into the combined signal's scalar value.
    pub fn combine(&self, sub_values: &[f64]) -> f64 {
        self.aggregation.reduce(sub_values)
    }
}

/// A virtual control driving N sub-controls.
///
/// Created when `push_control` is asked for a domain coarser than a
/// control's native domain. Adjusting a `CombinedControl` forwards a
/// (possibly scaled) setting to every sub-control.
#[derive(Debug, Clone)]
pub struct CombinedControl {
    factor: f64,
    subs: Vec<Handle>,
}

impl CombinedControl {
    /// Creates a combined control over `subs`, scaling any adjusted
    /// setting by `factor` before forwarding it.
    ///
    /// `factor` is `1` unless the control's aggregation hint is *sum*, in
    /// which case it is `1 / subs.len()`.
    pub fn new(factor: f64, subs: Vec<Handle>) -> Self {
        Self { factor, subs }
    }

    /// The sub-control handles this combined control fans out to.
    pub fn subs(&self) -> &[Handle] {
        &self.subs
    }

    /// The scaling factor applied to a setting before it is forwarded.
    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// Scales `setting` by this combined control's factor.
    pub fn scale(&self, setting: f64) -> f64 {
        self.factor * setting
    }
}
