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

//! The orchestrator: discovers and composes heterogeneous `Provider`s,
//! resolves `(name, domain, idx)` requests to the best provider, manages
//! batched signal/control I/O under strict lifecycle rules, performs
//! cross-domain aggregation/disaggregation, and save/restores mutable
//! hardware state across sessions.
//!
//! Single-threaded, synchronous, no internal suspension: one caller
//! drives the orchestrator, every call completes or fails before
//! returning.

pub mod error;
mod batch_server;
mod persistence;

use std::{collections::BTreeSet, path::Path, sync::Arc};

use combined::{CombinedControl, CombinedSignal};
use provider::{AggregationKind, BehaviorClass, FormatHint, Provider};
use registry::{ControlSlot, Fingerprint, Registry, SignalSlot};
use topology::{Domain, TopologyOracle};

pub use error::Error;

enum Resolved {
    /// Nothing in the provider list declares this name.
    Unclaimed,
    /// At least one provider declares this name; `1` is its native
    /// domain, `2` the indices (most-recently-registered first) of every
    /// provider agreeing on that native domain.
    Found(Domain, Vec<usize>),
}

enum SignalSlotKind {
    Provider(usize, provider::ProviderHandle),
    Combined(CombinedSignal),
}

enum ControlSlotKind {
    Provider(usize, provider::ProviderHandle),
    Combined(CombinedControl),
}

/// The orchestrator: the public contract consumers of this crate drive.
pub struct Orchestrator {
    registry: Registry,
    topology: Arc<dyn TopologyOracle>,
    config: config::Config,

    /// No new push permitted after the first `read_batch` or `adjust`.
    push_frozen: bool,
    /// `sample` is defined only after at least one `read_batch`.
    has_read_batch: bool,
    /// Folds "no new provider after save" and "restore requires a prior
    /// save" into one flag, set only by the in-process `save_controls`
    /// (never by `save_controls_to`, and never checked by
    /// `restore_controls_from` either; see DESIGN.md for the Open
    /// Question this resolves).
    do_restore: bool,
    /// Once a signal name has been validated by a successful read for
    /// any prior fingerprint, later pushes of the same name skip the
    /// validation read.
    validated_signals: BTreeSet<String>,
    validated_controls: BTreeSet<String>,
}

impl Orchestrator {
    /// Creates an orchestrator with no providers registered yet.
    pub fn new(topology: Arc<dyn TopologyOracle>, config: config::Config) -> Self {
        Self {
            registry: Registry::new(),
            topology,
            config,
            push_frozen: false,
            has_read_batch: false,
            do_restore: false,
            validated_signals: BTreeSet::new(),
            validated_controls: BTreeSet::new(),
        }
    }

    /// The configuration this orchestrator was constructed with.
    pub fn config(&self) -> &config::Config {
        &self.config
    }

    // ---- registration -----------------------------------------------

    /// Registers `provider`, appending it to the registration order.
    ///
    /// Fails with `InvalidArgument` if a `save_controls` has already
    /// happened.
    pub fn register_provider(&mut self, provider: Box<dyn Provider>) -> Result<(), Error> {
        if self.do_restore {
            return Err(Error::InvalidArgument {
                operation: "register_provider".to_string(),
                message: "a provider cannot be registered after save_controls has been called".to_string(),
            });
        }
        let _ = self.registry.register_provider(provider);
        Ok(())
    }

    // ---- enumeration and classification ------------------------------

    /// The union of every registered provider's signal names.
    pub fn signal_names(&self) -> BTreeSet<String> {
        self.registry.providers().iter().flat_map(|p| p.signal_names()).collect()
    }

    /// The union of every registered provider's control names.
    pub fn control_names(&self) -> BTreeSet<String> {
        self.registry.providers().iter().flat_map(|p| p.control_names()).collect()
    }

    /// The native domain of the most-recently-registered provider that
    /// declares signal `name`.
    pub fn signal_domain(&self, name: &str) -> Result<Domain, Error> {
        match self.resolve_signal(name)? {
            Resolved::Unclaimed => Err(Error::UnknownName {
                operation: "signal_domain".to_string(),
                name: name.to_string(),
            }),
            Resolved::Found(domain, _) => Ok(domain),
        }
    }

    /// The native domain of the most-recently-registered provider that
    /// declares control `name`.
    pub fn control_domain(&self, name: &str) -> Result<Domain, Error> {
        match self.resolve_control(name)? {
            Resolved::Unclaimed => Err(Error::UnknownName {
                operation: "control_domain".to_string(),
                name: name.to_string(),
            }),
            Resolved::Found(domain, _) => Ok(domain),
        }
    }

    /// True unless `name`'s aggregation hint is *sum*. Drives whether
    /// cross-domain disaggregation divides the setting.
    pub fn is_adjust_same(&self, name: &str) -> Result<bool, Error> {
        Ok(!self.aggregation_of_control(name)?.is_sum())
    }

    // ---- provider resolution ------------------------------------------

    fn resolve_signal(&self, name: &str) -> Result<Resolved, Error> {
        self.resolve(name, "signal_domain", |p| p.signal_names(), |p, n| p.signal_domain(n))
    }

    fn resolve_control(&self, name: &str) -> Result<Resolved, Error> {
        self.resolve(name, "control_domain", |p| p.control_names(), |p, n| p.control_domain(n))
    }

    fn resolve(
        &self,
        name: &str,
        operation: &str,
        names_of: impl Fn(&dyn Provider) -> BTreeSet<String>,
        domain_of: impl Fn(&dyn Provider, &str) -> Result<Domain, provider::Error>,
    ) -> Result<Resolved, Error> {
        let mut native: Option<Domain> = None;
        let mut candidates = Vec::new();
        for idx in self.registry.indices_most_recent_first() {
            let provider = self.registry.provider(idx);
            if !names_of(provider).contains(name) {
                continue;
            }
            let declared = domain_of(provider, name).map_err(|e| Error::from_provider(operation, e))?;
            match native {
                None => {
                    native = Some(declared);
                    candidates.push(idx);
                }
                Some(nd) if nd == declared => candidates.push(idx),
                Some(_) => {
                    tracing::warn!(
                        provider = provider.name(),
                        %name,
                        "native domain differs from the first candidate; dropped from fallback"
                    );
                }
            }
        }
        match native {
            Some(domain) => Ok(Resolved::Found(domain, candidates)),
            None => Ok(Resolved::Unclaimed),
        }
    }

    fn aggregation_of_signal(&self, name: &str) -> Result<AggregationKind, Error> {
        match self.resolve_signal(name)? {
            Resolved::Unclaimed => Err(Error::UnknownName {
                operation: "aggregator_of".to_string(),
                name: name.to_string(),
            }),
            Resolved::Found(_, candidates) => self
                .registry
                .provider(candidates[0])
                .aggregation(name)
                .map_err(|e| Error::from_provider("aggregator_of", e)),
        }
    }

    fn aggregation_of_control(&self, name: &str) -> Result<AggregationKind, Error> {
        match self.resolve_control(name)? {
            Resolved::Unclaimed => Err(Error::UnknownName {
                operation: "is_adjust_same".to_string(),
                name: name.to_string(),
            }),
            Resolved::Found(_, candidates) => self
                .registry
                .provider(candidates[0])
                .aggregation(name)
                .map_err(|e| Error::from_provider("is_adjust_same", e)),
        }
    }

    fn validate_domain_idx(&self, operation: &str, domain: Domain, idx: usize) -> Result<(), Error> {
        let count = self.topology.count(domain);
        if idx >= count {
            return Err(Error::InvalidArgument {
                operation: operation.to_string(),
                message: format!("domain index {idx} out of range for domain {domain:?} (count: {count})"),
            });
        }
        Ok(())
    }

    // ---- push_signal / push_control ------------------------------------

    /// Pushes a signal subscription, returning a handle stable for
    /// repeated pushes of the same `(name, domain, idx)`.
    pub fn push_signal(&mut self, name: &str, domain: Domain, idx: usize) -> Result<usize, Error> {
        self.validate_domain_idx("push_signal", domain, idx)?;
        let fingerprint = Fingerprint::new(name, domain, idx);
        if let Some(handle) = self.registry.memoized_signal(&fingerprint) {
            return Ok(handle);
        }
        if self.push_frozen {
            return Err(Error::BatchFrozen {
                operation: "push_signal".to_string(),
            });
        }

        let (native, candidates) = match self.resolve_signal(name)? {
            Resolved::Unclaimed => {
                return Err(Error::NoProvider {
                    operation: "push_signal".to_string(),
                    name: name.to_string(),
                    domain,
                    idx,
                })
            }
            Resolved::Found(native, candidates) => (native, candidates),
        };

        if native == domain {
            let mut diagnostics = Vec::new();
            for provider_idx in candidates {
                let skip_validation = self.validated_signals.contains(name);
                let provider = self.registry.provider_mut(provider_idx);
                let proceed = if skip_validation {
                    true
                } else {
                    match provider.read_signal(name, domain, idx) {
                        Ok(_) => true,
                        Err(provider::Error::NotImplemented { .. }) => true,
                        Err(e) => {
                            diagnostics.push(format!("{}: {e}", provider.name()));
                            false
                        }
                    }
                };
                if !proceed {
                    continue;
                }
                match provider.push_signal(name, domain, idx) {
                    Ok(handle) => {
                        let _ = self.validated_signals.insert(name.to_string());
                        let slot = SignalSlot::Provider { provider_idx, handle };
                        return Ok(self.registry.push_signal_slot(fingerprint, slot));
                    }
                    Err(e) => diagnostics.push(format!("{}: {e}", self.registry.provider(provider_idx).name())),
                }
            }
            Err(Error::InvalidArgument {
                operation: "push_signal".to_string(),
                message: diagnostics.join("; "),
            })
        } else {
            self.push_signal_convert_domain(name, domain, idx, native, fingerprint)
        }
    }

    fn push_signal_convert_domain(
        &mut self,
        name: &str,
        domain: Domain,
        idx: usize,
        native: Domain,
        fingerprint: Fingerprint,
    ) -> Result<usize, Error> {
        if !Domain::contains(domain, native) {
            return Err(Error::InvalidArgument {
                operation: "push_signal".to_string(),
                message: format!("domain {domain:?} does not contain native domain {native:?} for signal '{name}'"),
            });
        }
        let sub_indices = self
            .topology
            .nested(native, domain, idx)
            .map_err(|e| Error::from_topology("push_signal", e))?;
        let mut subs = Vec::with_capacity(sub_indices.len());
        for sub_idx in sub_indices {
            subs.push(self.push_signal(name, native, sub_idx)?);
        }
        let aggregation = self.aggregation_of_signal(name)?;
        let combined = CombinedSignal::new(aggregation, subs);
        Ok(self.registry.push_signal_slot(fingerprint, SignalSlot::Combined(combined)))
    }

    /// Pushes a control subscription, returning a handle stable for
    /// repeated pushes of the same `(name, domain, idx)`.
    pub fn push_control(&mut self, name: &str, domain: Domain, idx: usize) -> Result<usize, Error> {
        self.validate_domain_idx("push_control", domain, idx)?;
        let fingerprint = Fingerprint::new(name, domain, idx);
        if let Some(handle) = self.registry.memoized_control(&fingerprint) {
            return Ok(handle);
        }
        if self.push_frozen {
            return Err(Error::BatchFrozen {
                operation: "push_control".to_string(),
            });
        }

        let (native, candidates) = match self.resolve_control(name)? {
            Resolved::Unclaimed => {
                return Err(Error::NoProvider {
                    operation: "push_control".to_string(),
                    name: name.to_string(),
                    domain,
                    idx,
                })
            }
            Resolved::Found(native, candidates) => (native, candidates),
        };

        if native == domain {
            let mut diagnostics = Vec::new();
            for provider_idx in candidates {
                let skip_validation = self.validated_controls.contains(name);
                let provider = self.registry.provider_mut(provider_idx);
                let proceed = if skip_validation {
                    true
                } else {
                    match provider.read_signal(name, domain, idx) {
                        Ok(value) => match provider.write_control(name, domain, idx, value) {
                            Ok(()) => true,
                            Err(provider::Error::NotImplemented { .. }) => true,
                            Err(e) => {
                                diagnostics.push(format!("{}: {e}", provider.name()));
                                false
                            }
                        },
                        Err(provider::Error::NotImplemented { .. }) => true,
                        Err(e) => {
                            diagnostics.push(format!("{}: {e}", provider.name()));
                            false
                        }
                    }
                };
                if !proceed {
                    continue;
                }
                match provider.push_control(name, domain, idx) {
                    Ok(handle) => {
                        let _ = self.validated_controls.insert(name.to_string());
                        let slot = ControlSlot::Provider { provider_idx, handle };
                        return Ok(self.registry.push_control_slot(fingerprint, slot));
                    }
                    Err(e) => diagnostics.push(format!("{}: {e}", self.registry.provider(provider_idx).name())),
                }
            }
            Err(Error::InvalidArgument {
                operation: "push_control".to_string(),
                message: diagnostics.join("; "),
            })
        } else {
            self.push_control_convert_domain(name, domain, idx, native, fingerprint)
        }
    }

    fn push_control_convert_domain(
        &mut self,
        name: &str,
        domain: Domain,
        idx: usize,
        native: Domain,
        fingerprint: Fingerprint,
    ) -> Result<usize, Error> {
        if !Domain::contains(domain, native) {
            return Err(Error::InvalidArgument {
                operation: "push_control".to_string(),
                message: format!("domain {domain:?} does not contain native domain {native:?} for control '{name}'"),
            });
        }
        let sub_indices = self
            .topology
            .nested(native, domain, idx)
            .map_err(|e| Error::from_topology("push_control", e))?;
        let mut subs = Vec::with_capacity(sub_indices.len());
        for sub_idx in sub_indices {
            subs.push(self.push_control(name, native, sub_idx)?);
        }
        let aggregation = self.aggregation_of_control(name)?;
        let factor = if aggregation.is_sum() { 1.0 / subs.len() as f64 } else { 1.0 };
        let combined = CombinedControl::new(factor, subs);
        Ok(self.registry.push_control_slot(fingerprint, ControlSlot::Combined(combined)))
    }

    // ---- read_batch / write_batch ---------------------------------------

    /// Reads every pushed signal from its provider, in registration
    /// order, so `sample` reflects current hardware state.
    pub fn read_batch(&mut self) -> Result<(), Error> {
        self.push_frozen = true;
        self.has_read_batch = true;
        for idx in 0..self.registry.providers().len() {
            self.registry
                .provider_mut(idx)
                .read_batch()
                .map_err(|e| Error::from_provider("read_batch", e))?;
        }
        Ok(())
    }

    /// Writes every adjusted control to its provider, in registration
    /// order.
    pub fn write_batch(&mut self) -> Result<(), Error> {
        for idx in 0..self.registry.providers().len() {
            self.registry
                .provider_mut(idx)
                .write_batch()
                .map_err(|e| Error::from_provider("write_batch", e))?;
        }
        Ok(())
    }

    // ---- sample / adjust ------------------------------------------------

    /// Returns the value of signal `handle` as of the last `read_batch`.
    ///
    /// Fails with `NotReady` if no `read_batch` has happened yet.
    pub fn sample(&mut self, handle: usize) -> Result<f64, Error> {
        if !self.has_read_batch {
            return Err(Error::NotReady {
                operation: "sample".to_string(),
            });
        }
        let kind = match self.registry.signal_slot(handle) {
            None => {
                return Err(Error::InvalidArgument {
                    operation: "sample".to_string(),
                    message: format!("signal handle {handle} out of range"),
                })
            }
            Some(SignalSlot::Provider { provider_idx, handle }) => SignalSlotKind::Provider(*provider_idx, *handle),
            Some(SignalSlot::Combined(combined)) => SignalSlotKind::Combined(combined.clone()),
        };
        match kind {
            SignalSlotKind::Provider(provider_idx, provider_handle) => self
                .registry
                .provider_mut(provider_idx)
                .sample(provider_handle)
                .map_err(|e| Error::from_provider("sample", e)),
            SignalSlotKind::Combined(combined) => {
                let mut values = Vec::with_capacity(combined.subs().len());
                for sub in combined.subs() {
                    values.push(self.sample(*sub)?);
                }
                Ok(combined.combine(&values))
            }
        }
    }

    /// Stages `setting` for control `handle`, to be written on the next
    /// `write_batch`. Performs no I/O.
    pub fn adjust(&mut self, handle: usize, setting: f64) -> Result<(), Error> {
        if !setting.is_finite() {
            return Err(Error::InvalidArgument {
                operation: "adjust".to_string(),
                message: "setting is not finite".to_string(),
            });
        }
        let kind = match self.registry.control_slot(handle) {
            None => {
                return Err(Error::InvalidArgument {
                    operation: "adjust".to_string(),
                    message: format!("control handle {handle} out of range"),
                })
            }
            Some(ControlSlot::Provider { provider_idx, handle }) => ControlSlotKind::Provider(*provider_idx, *handle),
            Some(ControlSlot::Combined(combined)) => ControlSlotKind::Combined(combined.clone()),
        };
        self.push_frozen = true;
        match kind {
            ControlSlotKind::Provider(provider_idx, provider_handle) => self
                .registry
                .provider_mut(provider_idx)
                .adjust(provider_handle, setting)
                .map_err(|e| Error::from_provider("adjust", e)),
            ControlSlotKind::Combined(combined) => {
                let scaled = combined.scale(setting);
                for sub in combined.subs() {
                    self.adjust(*sub, scaled)?;
                }
                Ok(())
            }
        }
    }

    // ---- one-shot read_signal / write_control ---------------------------

    /// Reads `name` at `(domain, idx)` immediately, falling back across
    /// resolved candidates and performing inline cross-domain
    /// aggregation without allocating a batch slot.
    pub fn read_signal(&mut self, name: &str, domain: Domain, idx: usize) -> Result<f64, Error> {
        self.validate_domain_idx("read_signal", domain, idx)?;
        let (native, candidates) = match self.resolve_signal(name)? {
            Resolved::Unclaimed => {
                return Err(Error::NoProvider {
                    operation: "read_signal".to_string(),
                    name: name.to_string(),
                    domain,
                    idx,
                })
            }
            Resolved::Found(native, candidates) => (native, candidates),
        };
        if native == domain {
            let mut diagnostics = Vec::new();
            for provider_idx in candidates {
                match self.registry.provider_mut(provider_idx).read_signal(name, domain, idx) {
                    Ok(value) => return Ok(value),
                    Err(e) => diagnostics.push(format!("{}: {e}", self.registry.provider(provider_idx).name())),
                }
            }
            Err(Error::InvalidArgument {
                operation: "read_signal".to_string(),
                message: diagnostics.join("; "),
            })
        } else {
            if !Domain::contains(domain, native) {
                return Err(Error::InvalidArgument {
                    operation: "read_signal".to_string(),
                    message: format!("domain {domain:?} does not contain native domain {native:?} for signal '{name}'"),
                });
            }
            let sub_indices = self
                .topology
                .nested(native, domain, idx)
                .map_err(|e| Error::from_topology("read_signal", e))?;
            let mut values = Vec::with_capacity(sub_indices.len());
            for sub_idx in sub_indices {
                values.push(self.read_signal(name, native, sub_idx)?);
            }
            let aggregation = self.aggregation_of_signal(name)?;
            Ok(aggregation.reduce(&values))
        }
    }

    /// Writes `setting` to `name` at `(domain, idx)` immediately, falling
    /// back across resolved candidates and performing inline disaggregation.
    pub fn write_control(&mut self, name: &str, domain: Domain, idx: usize, setting: f64) -> Result<(), Error> {
        if !setting.is_finite() {
            return Err(Error::InvalidArgument {
                operation: "write_control".to_string(),
                message: "setting is not finite".to_string(),
            });
        }
        self.validate_domain_idx("write_control", domain, idx)?;
        let (native, candidates) = match self.resolve_control(name)? {
            Resolved::Unclaimed => {
                return Err(Error::NoProvider {
                    operation: "write_control".to_string(),
                    name: name.to_string(),
                    domain,
                    idx,
                })
            }
            Resolved::Found(native, candidates) => (native, candidates),
        };
        if native == domain {
            let mut diagnostics = Vec::new();
            for provider_idx in candidates {
                match self
                    .registry
                    .provider_mut(provider_idx)
                    .write_control(name, domain, idx, setting)
                {
                    Ok(()) => return Ok(()),
                    Err(e) => diagnostics.push(format!("{}: {e}", self.registry.provider(provider_idx).name())),
                }
            }
            Err(Error::InvalidArgument {
                operation: "write_control".to_string(),
                message: diagnostics.join("; "),
            })
        } else {
            if !Domain::contains(domain, native) {
                return Err(Error::InvalidArgument {
                    operation: "write_control".to_string(),
                    message: format!("domain {domain:?} does not contain native domain {native:?} for control '{name}'"),
                });
            }
            let sub_indices = self
                .topology
                .nested(native, domain, idx)
                .map_err(|e| Error::from_topology("write_control", e))?;
            let aggregation = self.aggregation_of_control(name)?;
            let scaled = if aggregation.is_sum() {
                setting / sub_indices.len() as f64
            } else {
                setting
            };
            for sub_idx in sub_indices {
                self.write_control(name, native, sub_idx, scaled)?;
            }
            Ok(())
        }
    }

    // ---- save / restore -------------------------------------------------

    /// Captures every provider's current control state in-process and
    /// marks this orchestrator restorable. Freezes provider registration:
    /// `register_provider` fails once this has been called.
    pub fn save_controls(&mut self) -> Result<(), Error> {
        self.do_restore = true;
        for idx in 0..self.registry.providers().len() {
            self.registry
                .provider_mut(idx)
                .save()
                .map_err(|e| Error::from_provider("save_controls", e))?;
        }
        Ok(())
    }

    /// Restores every provider's control state, in reverse registration
    /// order (dependents unwind first). Fails with `NotSaved` unless a
    /// prior `save_controls` succeeded.
    pub fn restore_controls(&mut self) -> Result<(), Error> {
        if !self.do_restore {
            return Err(Error::NotSaved {
                operation: "restore_controls".to_string(),
            });
        }
        for idx in self.registry.indices_most_recent_first() {
            self.registry
                .provider_mut(idx)
                .restore()
                .map_err(|e| Error::from_provider("restore_controls", e))?;
        }
        Ok(())
    }

    /// Writes one JSON file per provider under `dir`, each containing
    /// every control in that provider's own namespace, read at its
    /// native domain across every index the topology reports.
    ///
    /// Does not set the in-process restore flag and does not freeze
    /// provider registration. The files, not this orchestrator's
    /// memory, are the authoritative record (see DESIGN.md).
    pub fn save_controls_to(&mut self, dir: &Path) -> Result<(), Error> {
        std::fs::create_dir_all(dir).map_err(|e| Error::Io {
            operation: "save_controls_to".to_string(),
            message: e.to_string(),
        })?;
        for idx in 0..self.registry.providers().len() {
            let provider_name = self.registry.provider(idx).name().to_string();
            let records = persistence::capture(self.registry.provider_mut(idx), self.topology.as_ref())?;
            persistence::write_json(dir, &provider_name, &records)?;
        }
        Ok(())
    }

    /// Applies every record in each provider's `<dir>/<name>-save-control.json`
    /// via that provider's immediate `write_control`, in registration
    /// order.
    ///
    /// Does not check the in-process restore flag: a directory of save
    /// files is restorable on its own merits, independent of whether
    /// `save_controls` was ever called on this orchestrator instance.
    pub fn restore_controls_from(&mut self, dir: &Path) -> Result<(), Error> {
        for idx in 0..self.registry.providers().len() {
            let provider_name = self.registry.provider(idx).name().to_string();
            let records = persistence::read_json(dir, &provider_name)?;
            for (name, domain, domain_idx, setting) in records {
                self.registry
                    .provider_mut(idx)
                    .write_control(&name, domain, domain_idx, setting)
                    .map_err(|e| Error::from_provider("restore_controls_from", e))?;
            }
        }
        Ok(())
    }

    // ---- metadata passthrough -----------------------------------------

    /// A boxed reducer equivalent to `name`'s declared aggregation hint.
    pub fn aggregator_of(&self, name: &str) -> Result<Box<dyn Fn(&[f64]) -> f64>, Error> {
        let kind = self.aggregation_of_signal(name)?;
        Ok(Box::new(move |values: &[f64]| kind.reduce(values)))
    }

    /// A boxed formatter equivalent to `name`'s declared format hint.
    pub fn formatter_of(&self, name: &str) -> Result<Box<dyn Fn(f64) -> String>, Error> {
        let hint = self.format_hint_of(name)?;
        Ok(Box::new(move |value: f64| hint.format(value)))
    }

    fn format_hint_of(&self, name: &str) -> Result<FormatHint, Error> {
        match self.resolve_signal(name)? {
            Resolved::Unclaimed => Err(Error::UnknownName {
                operation: "formatter_of".to_string(),
                name: name.to_string(),
            }),
            Resolved::Found(_, candidates) => self
                .registry
                .provider(candidates[0])
                .format_hint(name)
                .map_err(|e| Error::from_provider("formatter_of", e)),
        }
    }

    /// The description declared for signal `name`.
    pub fn describe_signal(&self, name: &str) -> Result<String, Error> {
        match self.resolve_signal(name)? {
            Resolved::Unclaimed => Err(Error::UnknownName {
                operation: "describe_signal".to_string(),
                name: name.to_string(),
            }),
            Resolved::Found(_, candidates) => self
                .registry
                .provider(candidates[0])
                .describe_signal(name)
                .map_err(|e| Error::from_provider("describe_signal", e)),
        }
    }

    /// The description declared for control `name`.
    pub fn describe_control(&self, name: &str) -> Result<String, Error> {
        match self.resolve_control(name)? {
            Resolved::Unclaimed => Err(Error::UnknownName {
                operation: "describe_control".to_string(),
                name: name.to_string(),
            }),
            Resolved::Found(_, candidates) => self
                .registry
                .provider(candidates[0])
                .describe_control(name)
                .map_err(|e| Error::from_provider("describe_control", e)),
        }
    }

    /// The behavior class declared for signal `name`.
    pub fn behavior_of(&self, name: &str) -> Result<BehaviorClass, Error> {
        match self.resolve_signal(name)? {
            Resolved::Unclaimed => Err(Error::UnknownName {
                operation: "behavior_of".to_string(),
                name: name.to_string(),
            }),
            Resolved::Found(_, candidates) => self
                .registry
                .provider(candidates[0])
                .behavior(name)
                .map_err(|e| Error::from_provider("behavior_of", e)),
        }
    }

    // ---- historical batch-server hooks ---------------------------------

    /// Always fails with `NotImplemented`; out-of-process batching is not
    /// part of this orchestrator's contract.
    pub fn start_batch_server(&self) -> Result<(), Error> {
        batch_server::start_batch_server()
    }

    /// Delivers a termination signal to a previously started out-of-process
    /// batch server by PID.
    pub fn stop_batch_server(&self, server_pid: i32) -> Result<(), Error> {
        batch_server::stop_batch_server(server_pid)
    }
}
