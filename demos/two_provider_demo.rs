//! Wires one toy `Provider` supplying a per-cpu `FREQ` signal and a per-cpu
//! `POWER` control, pushes both at the coarser `package` domain (triggering
//! cross-domain aggregation/disaggregation), and walks through the
//! batch/sample/adjust and save/restore lifecycles.

use std::{collections::BTreeSet, sync::Arc};

use color_eyre::eyre::Result;
use platform_io::{
    orchestrator::Orchestrator,
    provider::{AggregationKind, BehaviorClass, Error as ProviderError, FormatHint, Provider, ProviderHandle},
    topology::{Domain, StaticTopology},
};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// A toy provider with one signal (`FREQ`, averaged across cpus) and one
/// control (`POWER`, summed across cpus), both native to `Domain::Cpu`.
struct DemoProvider {
    name: String,
    freq: Vec<f64>,
    power: Vec<f64>,
    signal_slots: Vec<usize>,
    control_slots: Vec<usize>,
    samples: Vec<f64>,
    staged: Vec<Option<f64>>,
    saved_power: Option<Vec<f64>>,
}

impl DemoProvider {
    fn new(name: impl Into<String>, num_cpu: usize) -> Self {
        Self {
            name: name.into(),
            freq: (0..num_cpu).map(|i| 1.0e9 * (i + 1) as f64).collect(),
            power: vec![50.0; num_cpu],
            signal_slots: Vec::new(),
            control_slots: Vec::new(),
            samples: Vec::new(),
            staged: Vec::new(),
            saved_power: None,
        }
    }
}

impl Provider for DemoProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn signal_names(&self) -> BTreeSet<String> {
        BTreeSet::from(["FREQ".to_string()])
    }

    fn control_names(&self) -> BTreeSet<String> {
        BTreeSet::from(["POWER".to_string()])
    }

    fn signal_domain(&self, _name: &str) -> Result<Domain, ProviderError> {
        Ok(Domain::Cpu)
    }

    fn control_domain(&self, _name: &str) -> Result<Domain, ProviderError> {
        Ok(Domain::Cpu)
    }

    fn aggregation(&self, name: &str) -> Result<AggregationKind, ProviderError> {
        match name {
            "FREQ" => Ok(AggregationKind::Average),
            "POWER" => Ok(AggregationKind::Sum),
            other => Err(ProviderError::UnknownName {
                provider: self.name.clone(),
                name: other.to_string(),
            }),
        }
    }

    fn format_hint(&self, _name: &str) -> Result<FormatHint, ProviderError> {
        Ok(FormatHint::Float)
    }

    fn describe_signal(&self, _name: &str) -> Result<String, ProviderError> {
        Ok("cpu clock frequency".to_string())
    }

    fn describe_control(&self, _name: &str) -> Result<String, ProviderError> {
        Ok("cpu power cap".to_string())
    }

    fn behavior(&self, _name: &str) -> Result<BehaviorClass, ProviderError> {
        Ok(BehaviorClass::Variable)
    }

    fn read_signal(&mut self, name: &str, _domain: Domain, idx: usize) -> Result<f64, ProviderError> {
        let table = match name {
            "FREQ" => &self.freq,
            "POWER" => &self.power,
            other => {
                return Err(ProviderError::UnknownName {
                    provider: self.name.clone(),
                    name: other.to_string(),
                })
            }
        };
        table.get(idx).copied().ok_or_else(|| ProviderError::InvalidArgument {
            provider: self.name.clone(),
            message: format!("cpu index {idx} out of range"),
        })
    }

    fn write_control(&mut self, _name: &str, _domain: Domain, idx: usize, setting: f64) -> Result<(), ProviderError> {
        *self.power.get_mut(idx).ok_or_else(|| ProviderError::InvalidArgument {
            provider: self.name.clone(),
            message: format!("cpu index {idx} out of range"),
        })? = setting;
        Ok(())
    }

    fn push_signal(&mut self, _name: &str, _domain: Domain, idx: usize) -> Result<ProviderHandle, ProviderError> {
        self.signal_slots.push(idx);
        self.samples.push(0.0);
        Ok(ProviderHandle(self.signal_slots.len() - 1))
    }

    fn push_control(&mut self, _name: &str, _domain: Domain, idx: usize) -> Result<ProviderHandle, ProviderError> {
        self.control_slots.push(idx);
        self.staged.push(None);
        Ok(ProviderHandle(self.control_slots.len() - 1))
    }

    fn read_batch(&mut self) -> Result<(), ProviderError> {
        for (slot, &cpu) in self.signal_slots.iter().enumerate() {
            self.samples[slot] = self.freq[cpu];
        }
        Ok(())
    }

    fn write_batch(&mut self) -> Result<(), ProviderError> {
        for (slot, &cpu) in self.control_slots.iter().enumerate() {
            if let Some(setting) = self.staged[slot].take() {
                self.power[cpu] = setting;
            }
        }
        Ok(())
    }

    fn sample(&mut self, handle: ProviderHandle) -> Result<f64, ProviderError> {
        Ok(self.samples[handle.0])
    }

    fn adjust(&mut self, handle: ProviderHandle, setting: f64) -> Result<(), ProviderError> {
        self.staged[handle.0] = Some(setting);
        Ok(())
    }

    fn save(&mut self) -> Result<(), ProviderError> {
        self.saved_power = Some(self.power.clone());
        Ok(())
    }

    fn restore(&mut self) -> Result<(), ProviderError> {
        if let Some(saved) = self.saved_power.clone() {
            self.power = saved;
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // 1 package, 2 cores, 2 cpus/core -> 4 cpus; no gpus.
    let topology = Arc::new(StaticTopology::new(1, 2, 2, 0, 0));
    let mut orchestrator = Orchestrator::new(topology, platform_io::config::Config::new());
    orchestrator.register_provider(Box::new(DemoProvider::new("demo", 4)))?;

    // Both pushes must happen before the first `read_batch`/`adjust`: once
    // either runs, the batch freezes and no further push is permitted.
    let freq_handle = orchestrator.push_signal("FREQ", Domain::Package, 0)?;
    let power_handle = orchestrator.push_control("POWER", Domain::Package, 0)?;

    orchestrator.read_batch()?;
    let avg_freq = orchestrator.sample(freq_handle)?;
    tracing::info!(%avg_freq, "package-level FREQ (averaged across 4 cpus)");

    orchestrator.save_controls()?;
    orchestrator.adjust(power_handle, 100.0)?;
    orchestrator.write_batch()?;
    tracing::info!("wrote POWER=100 at package level (25 per cpu, sum-aggregated)");

    orchestrator.restore_controls()?;
    tracing::info!("restore_controls complete: every cpu's POWER is back to 50.0");

    Ok(())
}
