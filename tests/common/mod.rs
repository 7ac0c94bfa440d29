//! A small in-memory fake `Provider` used by the integration tests: enough
//! behavior to exercise the orchestrator's contract without touching real
//! hardware.

use std::collections::{BTreeSet, HashMap};

use platform_io::provider::{AggregationKind, BehaviorClass, Error, FormatHint, Provider, ProviderHandle};
use platform_io::topology::Domain;

struct NamedSeries {
    domain: Domain,
    aggregation: AggregationKind,
    values: Vec<f64>,
}

/// A fake provider holding a fixed table of named, per-index values for
/// signals and controls, each tied to one native domain and aggregation
/// hint. Reads of a name in `failing_reads` report `Error::Io`, to exercise
/// the orchestrator's fallback-to-next-candidate behavior.
pub struct FakeProvider {
    name: String,
    signals: HashMap<String, NamedSeries>,
    controls: HashMap<String, NamedSeries>,
    failing_reads: BTreeSet<String>,
    signal_slots: Vec<(String, usize)>,
    control_slots: Vec<(String, usize)>,
    samples: Vec<f64>,
    staged: Vec<Option<f64>>,
    saved: Option<HashMap<String, Vec<f64>>>,
}

impl FakeProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            signals: HashMap::new(),
            controls: HashMap::new(),
            failing_reads: BTreeSet::new(),
            signal_slots: Vec::new(),
            control_slots: Vec::new(),
            samples: Vec::new(),
            staged: Vec::new(),
            saved: None,
        }
    }

    pub fn with_signal(mut self, name: &str, domain: Domain, aggregation: AggregationKind, values: Vec<f64>) -> Self {
        let _ = self.signals.insert(
            name.to_string(),
            NamedSeries {
                domain,
                aggregation,
                values,
            },
        );
        self
    }

    pub fn with_control(mut self, name: &str, domain: Domain, aggregation: AggregationKind, values: Vec<f64>) -> Self {
        let _ = self.controls.insert(
            name.to_string(),
            NamedSeries {
                domain,
                aggregation,
                values,
            },
        );
        self
    }

    /// Every `read_signal` of `name` on this provider reports `Error::Io`.
    pub fn failing_on(mut self, name: &str) -> Self {
        let _ = self.failing_reads.insert(name.to_string());
        self
    }

    pub fn control_value(&self, name: &str, idx: usize) -> f64 {
        self.controls[name].values[idx]
    }
}

impl Provider for FakeProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn signal_names(&self) -> BTreeSet<String> {
        // Every control is also readable as a signal (the same register that
        // accepts `write_control` reports its current value through
        // `read_signal`).
        self.signals.keys().chain(self.controls.keys()).cloned().collect()
    }

    fn control_names(&self) -> BTreeSet<String> {
        self.controls.keys().cloned().collect()
    }

    fn signal_domain(&self, name: &str) -> Result<Domain, Error> {
        if let Some(s) = self.signals.get(name) {
            return Ok(s.domain);
        }
        if let Some(s) = self.controls.get(name) {
            return Ok(s.domain);
        }
        Err(Error::UnknownName {
            provider: self.name.clone(),
            name: name.to_string(),
        })
    }

    fn control_domain(&self, name: &str) -> Result<Domain, Error> {
        self.controls
            .get(name)
            .map(|s| s.domain)
            .ok_or_else(|| Error::UnknownName {
                provider: self.name.clone(),
                name: name.to_string(),
            })
    }

    fn aggregation(&self, name: &str) -> Result<AggregationKind, Error> {
        if let Some(s) = self.signals.get(name) {
            return Ok(s.aggregation);
        }
        if let Some(s) = self.controls.get(name) {
            return Ok(s.aggregation);
        }
        Err(Error::UnknownName {
            provider: self.name.clone(),
            name: name.to_string(),
        })
    }

    fn format_hint(&self, _name: &str) -> Result<FormatHint, Error> {
        Ok(FormatHint::Float)
    }

    fn describe_signal(&self, name: &str) -> Result<String, Error> {
        Ok(format!("fake signal {name}"))
    }

    fn describe_control(&self, name: &str) -> Result<String, Error> {
        Ok(format!("fake control {name}"))
    }

    fn behavior(&self, _name: &str) -> Result<BehaviorClass, Error> {
        Ok(BehaviorClass::Variable)
    }

    fn read_signal(&mut self, name: &str, _domain: Domain, idx: usize) -> Result<f64, Error> {
        if self.failing_reads.contains(name) {
            return Err(Error::Io {
                provider: self.name.clone(),
                message: format!("simulated read failure for '{name}'"),
            });
        }
        if let Some(series) = self.signals.get(name) {
            return series.values.get(idx).copied().ok_or_else(|| Error::InvalidArgument {
                provider: self.name.clone(),
                message: format!("index {idx} out of range"),
            });
        }
        if let Some(series) = self.controls.get(name) {
            return series.values.get(idx).copied().ok_or_else(|| Error::InvalidArgument {
                provider: self.name.clone(),
                message: format!("index {idx} out of range"),
            });
        }
        Err(Error::UnknownName {
            provider: self.name.clone(),
            name: name.to_string(),
        })
    }

    fn write_control(&mut self, name: &str, _domain: Domain, idx: usize, setting: f64) -> Result<(), Error> {
        let series = self.controls.get_mut(name).ok_or_else(|| Error::UnknownName {
            provider: self.name.clone(),
            name: name.to_string(),
        })?;
        *series.values.get_mut(idx).ok_or_else(|| Error::InvalidArgument {
            provider: self.name.clone(),
            message: format!("index {idx} out of range"),
        })? = setting;
        Ok(())
    }

    fn push_signal(&mut self, name: &str, _domain: Domain, idx: usize) -> Result<ProviderHandle, Error> {
        self.signal_slots.push((name.to_string(), idx));
        self.samples.push(0.0);
        Ok(ProviderHandle(self.signal_slots.len() - 1))
    }

    fn push_control(&mut self, name: &str, _domain: Domain, idx: usize) -> Result<ProviderHandle, Error> {
        self.control_slots.push((name.to_string(), idx));
        self.staged.push(None);
        Ok(ProviderHandle(self.control_slots.len() - 1))
    }

    fn read_batch(&mut self) -> Result<(), Error> {
        for (slot, (name, idx)) in self.signal_slots.clone().into_iter().enumerate() {
            self.samples[slot] = match self.signals.get(&name) {
                Some(series) => series.values[idx],
                None => self.controls[&name].values[idx],
            };
        }
        Ok(())
    }

    fn write_batch(&mut self) -> Result<(), Error> {
        for slot in 0..self.control_slots.len() {
            if let Some(setting) = self.staged[slot].take() {
                let (name, idx) = self.control_slots[slot].clone();
                self.controls.get_mut(&name).unwrap().values[idx] = setting;
            }
        }
        Ok(())
    }

    fn sample(&mut self, handle: ProviderHandle) -> Result<f64, Error> {
        Ok(self.samples[handle.0])
    }

    fn adjust(&mut self, handle: ProviderHandle, setting: f64) -> Result<(), Error> {
        self.staged[handle.0] = Some(setting);
        Ok(())
    }

    fn save(&mut self) -> Result<(), Error> {
        self.saved = Some(self.controls.iter().map(|(k, v)| (k.clone(), v.values.clone())).collect());
        Ok(())
    }

    fn restore(&mut self) -> Result<(), Error> {
        if let Some(saved) = self.saved.clone() {
            for (name, values) in saved {
                if let Some(series) = self.controls.get_mut(&name) {
                    series.values = values;
                }
            }
        }
        Ok(())
    }
}
