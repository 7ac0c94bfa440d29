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

//! The topology taxonomy and the `TopologyOracle` trait consumed by the
//! orchestrator.
//!
//! The orchestrator does not discover hardware itself: it asks an oracle
//! "how many of domain D" and "which atomic units of `inner` are nested in
//! `(outer, outer_idx)`". This crate defines the closed domain taxonomy, the
//! oracle contract, and a reference, arithmetic-based implementation
//! (`StaticTopology`) suitable for hosts whose shape is known up front and
//! for tests.

use std::collections::BTreeSet;

/// A symbolic hardware unit kind.
///
/// Domains form a partial order: `Board` contains `Package`, `Memory`, and
/// `Gpu`; `Package` contains `Core`; `Core` contains `Cpu`; `Gpu` contains
/// `GpuChip`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[non_exhaustive]
pub enum Domain {
    /// A single logical CPU thread.
    Cpu,
    /// A physical core, containing one or more `Cpu`.
    Core,
    /// A CPU package (socket), containing one or more `Core`.
    Package,
    /// A memory domain (e.g. a NUMA node), nested directly under `Board`.
    Memory,
    /// A GPU compute chip, nested under `Gpu`.
    GpuChip,
    /// A GPU device, containing one or more `GpuChip`.
    Gpu,
    /// The entire compute node.
    Board,
}

impl Domain {
    /// Returns the immediate parent domain in the taxonomy, or `None` for
    /// `Board`, which has no parent.
    pub fn parent(self) -> Option<Domain> {
        match self {
            Domain::Cpu => Some(Domain::Core),
            Domain::Core => Some(Domain::Package),
            Domain::Package => Some(Domain::Board),
            Domain::Memory => Some(Domain::Board),
            Domain::GpuChip => Some(Domain::Gpu),
            Domain::Gpu => Some(Domain::Board),
            Domain::Board => None,
        }
    }

    /// Returns true if `outer` contains `inner`, reflexively (every domain
    /// contains itself) and transitively.
    pub fn contains(outer: Domain, inner: Domain) -> bool {
        let mut current = inner;
        loop {
            if current == outer {
                return true;
            }
            match current.parent() {
                Some(next) => current = next,
                None => return false,
            }
        }
    }
}

/// Errors raised while answering topology queries.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// `inner` is not nested within `outer` per the domain taxonomy.
    #[error("domain '{inner:?}' is not nested within domain '{outer:?}'")]
    NotNested {
        /// The domain that was requested as the containee.
        inner: Domain,
        /// The domain that was requested as the container.
        outer: Domain,
    },

    /// The given domain index is out of range for the domain's count on
    /// this host.
    #[error("domain index {idx} out of range for domain '{domain:?}' (count: {count})")]
    IndexOutOfRange {
        /// The domain being indexed.
        domain: Domain,
        /// The index that was requested.
        idx: usize,
        /// The number of atomic units of this domain on the host.
        count: usize,
    },
}

/// Answers topology queries for a host: how many atomic units of a domain
/// exist, and which units of an inner domain are nested in a given outer
/// unit.
pub trait TopologyOracle: Send + Sync {
    /// Number of atomic units of `domain` on this host.
    fn count(&self, domain: Domain) -> usize;

    /// The set of `inner`-domain indices contained in `(outer, outer_idx)`.
    ///
    /// Fails with `Error::NotNested` if `inner` is not contained within
    /// `outer` per the domain taxonomy, and with `Error::IndexOutOfRange`
    /// if `outer_idx` is out of range for `outer`.
    fn nested(&self, inner: Domain, outer: Domain, outer_idx: usize) -> Result<BTreeSet<usize>, Error>;
}

/// A reference `TopologyOracle` for hosts with a uniform, statically known
/// shape: every package has the same number of cores, every core the same
/// number of cpus, every gpu the same number of chips, and memory domains
/// map one-to-one onto packages.
#[derive(Debug, Clone, Copy)]
pub struct StaticTopology {
    num_package: usize,
    num_core_per_package: usize,
    num_cpu_per_core: usize,
    num_gpu: usize,
    num_gpu_chip_per_gpu: usize,
}

impl StaticTopology {
    /// Creates a topology describing a single board with `num_package`
    /// packages, each with `num_core_per_package` cores of
    /// `num_cpu_per_core` cpus each, `num_gpu` gpus of
    /// `num_gpu_chip_per_gpu` chips each, and one memory domain per package.
    pub fn new(
        num_package: usize,
        num_core_per_package: usize,
        num_cpu_per_core: usize,
        num_gpu: usize,
        num_gpu_chip_per_gpu: usize,
    ) -> Self {
        Self {
            num_package,
            num_core_per_package,
            num_cpu_per_core,
            num_gpu,
            num_gpu_chip_per_gpu,
        }
    }

    fn num_core(&self) -> usize {
        self.num_package * self.num_core_per_package
    }

    fn num_cpu(&self) -> usize {
        self.num_core() * self.num_cpu_per_core
    }

    fn num_gpu_chip(&self) -> usize {
        self.num_gpu * self.num_gpu_chip_per_gpu
    }

    fn check_idx(&self, domain: Domain, idx: usize) -> Result<(), Error> {
        let count = self.count(domain);
        if idx >= count {
            return Err(Error::IndexOutOfRange { domain, idx, count });
        }
        Ok(())
    }
}

impl TopologyOracle for StaticTopology {
    fn count(&self, domain: Domain) -> usize {
        match domain {
            Domain::Board => 1,
            Domain::Package => self.num_package,
            Domain::Memory => self.num_package,
            Domain::Core => self.num_core(),
            Domain::Cpu => self.num_cpu(),
            Domain::Gpu => self.num_gpu,
            Domain::GpuChip => self.num_gpu_chip(),
        }
    }

    fn nested(&self, inner: Domain, outer: Domain, outer_idx: usize) -> Result<BTreeSet<usize>, Error> {
        if !Domain::contains(outer, inner) {
            return Err(Error::NotNested { inner, outer });
        }
        self.check_idx(outer, outer_idx)?;

        if inner == outer {
            let mut set = BTreeSet::new();
            let _ = set.insert(outer_idx);
            return Ok(set);
        }

        let result = match (inner, outer) {
            (Domain::Cpu, Domain::Core) => {
                let base = outer_idx * self.num_cpu_per_core;
                (base..base + self.num_cpu_per_core).collect()
            }
            (Domain::Cpu, Domain::Package) => {
                let cores = self.nested(Domain::Core, Domain::Package, outer_idx)?;
                cores
                    .into_iter()
                    .flat_map(|core_idx| self.nested(Domain::Cpu, Domain::Core, core_idx).into_iter().flatten())
                    .collect()
            }
            (Domain::Cpu, Domain::Board) => (0..self.num_cpu()).collect(),
            (Domain::Core, Domain::Package) => {
                let base = outer_idx * self.num_core_per_package;
                (base..base + self.num_core_per_package).collect()
            }
            (Domain::Core, Domain::Board) => (0..self.num_core()).collect(),
            (Domain::Package, Domain::Board) => (0..self.num_package).collect(),
            (Domain::Memory, Domain::Board) => (0..self.num_package).collect(),
            (Domain::GpuChip, Domain::Gpu) => {
                let base = outer_idx * self.num_gpu_chip_per_gpu;
                (base..base + self.num_gpu_chip_per_gpu).collect()
            }
            (Domain::GpuChip, Domain::Board) => (0..self.num_gpu_chip()).collect(),
            (Domain::Gpu, Domain::Board) => (0..self.num_gpu).collect(),
            _ => unreachable!("Domain::contains guarantees a handled (inner, outer) pair"),
        };
        Ok(result)
    }
}
