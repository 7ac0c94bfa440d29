//! Save/restore persistence format: one JSON file per provider.
//!
//! File name is `<provider-name>-save-control.json`; content is a JSON
//! array of `{name, domain_type, domain_idx, setting}` records, in the
//! shape of GEOPM's `SaveControl::json`/`SaveControl::settings`.

use std::{fs, path::Path};

use provider::Provider;
use serde::{Deserialize, Serialize};
use topology::{Domain, TopologyOracle};

use crate::error::Error;

/// One captured `write_control` call, as persisted to disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingRecord {
    /// The control name.
    pub name: String,
    /// The control's native domain, as the `PlatformTopo`-style integer
    /// code used by the original save-file schema.
    pub domain_type: i32,
    /// The domain index.
    pub domain_idx: usize,
    /// The value to restore.
    pub setting: f64,
}

fn domain_type_code(domain: Domain) -> i32 {
    match domain {
        Domain::Cpu => 0,
        Domain::Core => 1,
        Domain::Package => 2,
        Domain::Memory => 3,
        Domain::GpuChip => 4,
        Domain::Gpu => 5,
        Domain::Board => 6,
    }
}

fn domain_from_code(code: i32, operation: &str) -> Result<Domain, Error> {
    match code {
        0 => Ok(Domain::Cpu),
        1 => Ok(Domain::Core),
        2 => Ok(Domain::Package),
        3 => Ok(Domain::Memory),
        4 => Ok(Domain::GpuChip),
        5 => Ok(Domain::Gpu),
        6 => Ok(Domain::Board),
        other => Err(Error::InvalidArgument {
            operation: operation.to_string(),
            message: format!("unrecognized domain_type code {other} in save file"),
        }),
    }
}

fn file_path(dir: &Path, provider_name: &str) -> std::path::PathBuf {
    dir.join(format!("{provider_name}-save-control.json"))
}

/// Captures every control in `provider`'s own namespace (names prefixed
/// `"{provider_name}::"`) at its native domain, across every index the
/// topology reports for that domain.
pub fn capture(provider: &mut dyn Provider, topology: &dyn TopologyOracle) -> Result<Vec<SettingRecord>, Error> {
    let prefix = format!("{}::", provider.name());
    let mut records = Vec::new();
    for name in provider.control_names() {
        if !name.starts_with(&prefix) {
            continue;
        }
        let domain = provider
            .control_domain(&name)
            .map_err(|e| Error::from_provider("save_controls_to", e))?;
        let count = topology.count(domain);
        for idx in 0..count {
            let setting = provider
                .read_signal(&name, domain, idx)
                .map_err(|e| Error::from_provider("save_controls_to", e))?;
            records.push(SettingRecord {
                name: name.clone(),
                domain_type: domain_type_code(domain),
                domain_idx: idx,
                setting,
            });
        }
    }
    Ok(records)
}

/// Serializes `records` and writes them to
/// `<dir>/<provider_name>-save-control.json`, overwriting any existing
/// file.
pub fn write_json(dir: &Path, provider_name: &str, records: &[SettingRecord]) -> Result<(), Error> {
    let json = serde_json::to_string(records).map_err(|e| Error::InvalidArgument {
        operation: "save_controls_to".to_string(),
        message: e.to_string(),
    })?;
    fs::write(file_path(dir, provider_name), json).map_err(|e| Error::Io {
        operation: "save_controls_to".to_string(),
        message: e.to_string(),
    })
}

/// Reads and parses `<dir>/<provider_name>-save-control.json`.
pub fn read_json(dir: &Path, provider_name: &str) -> Result<Vec<(String, Domain, usize, f64)>, Error> {
    let path = file_path(dir, provider_name);
    let content = fs::read_to_string(&path).map_err(|e| Error::Io {
        operation: "restore_controls_from".to_string(),
        message: format!("{} ({e})", path.display()),
    })?;
    let raw: Vec<SettingRecord> = serde_json::from_str(&content).map_err(|e| Error::InvalidArgument {
        operation: "restore_controls_from".to_string(),
        message: e.to_string(),
    })?;
    raw.into_iter()
        .map(|r| {
            let domain = domain_from_code(r.domain_type, "restore_controls_from")?;
            Ok((r.name, domain, r.domain_idx, r.setting))
        })
        .collect()
}
