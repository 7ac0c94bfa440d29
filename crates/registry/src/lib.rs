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

//! The orchestrator's bookkeeping: the ordered provider list, the
//! Fingerprint memoization table, and the batch-slot tables for signals
//! and controls.
//!
//! `Registry` holds no lifecycle policy of its own (freeze rules, state
//! machine transitions). That enforcement lives in the orchestrator,
//! which is the only thing that knows when a mutation is permitted. This
//! keeps `Registry` a plain, testable data structure.

use std::collections::HashMap;

use combined::{CombinedControl, CombinedSignal};
use provider::{Provider, ProviderHandle};
use topology::Domain;

/// The `(name, domain, idx)` triple used to key the memoization table, so
/// a repeated push of the same tuple returns the same handle.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    /// The signal or control name.
    pub name: String,
    /// The requested topology domain.
    pub domain: Domain,
    /// The requested domain index.
    pub idx: usize,
}

impl Fingerprint {
    /// Creates a new fingerprint.
    pub fn new(name: impl Into<String>, domain: Domain, idx: usize) -> Self {
        Self {
            name: name.into(),
            domain,
            idx,
        }
    }
}

/// An active signal batch slot: either backed directly by one provider, or
/// a `CombinedSignal` fanning out to several sub-slots.
#[derive(Debug)]
pub enum SignalSlot {
    /// Backed directly by a single provider.
    Provider {
        /// Index into the registry's provider list.
        provider_idx: usize,
        /// The provider-local handle returned by that provider's
        /// `push_signal`.
        handle: ProviderHandle,
    },
    /// A virtual slot fanning out to sub-signal handles.
    Combined(CombinedSignal),
}

/// An active control batch slot: either backed directly by one provider,
/// or a `CombinedControl` fanning out to several sub-slots.
#[derive(Debug)]
pub enum ControlSlot {
    /// Backed directly by a single provider.
    Provider {
        /// Index into the registry's provider list.
        provider_idx: usize,
        /// The provider-local handle returned by that provider's
        /// `push_control`.
        handle: ProviderHandle,
    },
    /// A virtual slot fanning out to sub-control handles.
    Combined(CombinedControl),
}

/// The ordered provider list, the Fingerprint memoization table, and the
/// signal/control batch-slot tables.
#[derive(Default)]
pub struct Registry {
    providers: Vec<Box<dyn Provider>>,
    signal_memo: HashMap<Fingerprint, usize>,
    control_memo: HashMap<Fingerprint, usize>,
    signal_slots: Vec<SignalSlot>,
    control_slots: Vec<ControlSlot>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `provider` to the registration order, returning its index.
    ///
    /// Registration order is stable and visible through resolution
    /// priority; whether a new provider may still be registered is the
    /// caller's (orchestrator's) concern.
    pub fn register_provider(&mut self, provider: Box<dyn Provider>) -> usize {
        self.providers.push(provider);
        self.providers.len() - 1
    }

    /// The registered providers, in registration order.
    pub fn providers(&self) -> &[Box<dyn Provider>] {
        &self.providers
    }

    /// The registered providers, in registration order, mutably.
    pub fn providers_mut(&mut self) -> &mut [Box<dyn Provider>] {
        &mut self.providers
    }

    /// The provider at `idx`.
    pub fn provider(&self, idx: usize) -> &dyn Provider {
        self.providers[idx].as_ref()
    }

    /// The provider at `idx`, mutably.
    pub fn provider_mut(&mut self, idx: usize) -> &mut (dyn Provider + 'static) {
        self.providers[idx].as_mut()
    }

    /// Iterates provider indices in reverse registration order (most
    /// recently registered first), the order resolution scans in.
    pub fn indices_most_recent_first(&self) -> impl Iterator<Item = usize> {
        (0..self.providers.len()).rev()
    }

    /// Looks up a previously memoized signal handle for `fingerprint`.
    pub fn memoized_signal(&self, fingerprint: &Fingerprint) -> Option<usize> {
        self.signal_memo.get(fingerprint).copied()
    }

    /// Looks up a previously memoized control handle for `fingerprint`.
    pub fn memoized_control(&self, fingerprint: &Fingerprint) -> Option<usize> {
        self.control_memo.get(fingerprint).copied()
    }

    /// Appends a new signal slot, memoizes it under `fingerprint`, and
    /// returns its handle.
    pub fn push_signal_slot(&mut self, fingerprint: Fingerprint, slot: SignalSlot) -> usize {
        let handle = self.signal_slots.len();
        self.signal_slots.push(slot);
        let _ = self.signal_memo.insert(fingerprint, handle);
        handle
    }

    /// Appends a new control slot, memoizes it under `fingerprint`, and
    /// returns its handle.
    pub fn push_control_slot(&mut self, fingerprint: Fingerprint, slot: ControlSlot) -> usize {
        let handle = self.control_slots.len();
        self.control_slots.push(slot);
        let _ = self.control_memo.insert(fingerprint, handle);
        handle
    }

    /// The signal slot at `handle`, if it exists.
    pub fn signal_slot(&self, handle: usize) -> Option<&SignalSlot> {
        self.signal_slots.get(handle)
    }

    /// The control slot at `handle`, if it exists.
    pub fn control_slot(&self, handle: usize) -> Option<&ControlSlot> {
        self.control_slots.get(handle)
    }

    /// The number of active signal batch slots.
    pub fn num_signal_slots(&self) -> usize {
        self.signal_slots.len()
    }

    /// The number of active control batch slots.
    pub fn num_control_slots(&self) -> usize {
        self.control_slots.len()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn fingerprint_equality_is_by_value() {
        let a = Fingerprint::new("FREQ", Domain::Cpu, 2);
        let b = Fingerprint::new("FREQ", Domain::Cpu, 2);
        assert_eq!(a, b);
        let mut memo = HashMap::new();
        let _ = memo.insert(a, 7usize);
        assert_eq!(memo.get(&b), Some(&7));
    }

    #[test]
    fn slot_handles_are_assigned_sequentially() {
        let mut registry = Registry::new();
        let h0 = registry.push_signal_slot(
            Fingerprint::new("A", Domain::Cpu, 0),
            SignalSlot::Provider {
                provider_idx: 0,
                handle: ProviderHandle(0),
            },
        );
        let h1 = registry.push_signal_slot(
            Fingerprint::new("B", Domain::Cpu, 0),
            SignalSlot::Provider {
                provider_idx: 0,
                handle: ProviderHandle(1),
            },
        );
        assert_eq!(h0, 0);
        assert_eq!(h1, 1);
        assert_eq!(registry.num_signal_slots(), 2);
    }
}
