#![doc = include_str!("../README.md")]
#![deny(
    trivial_numeric_casts,
    missing_docs,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications,
    unused_extern_crates,
    unused_results,
    variant_size_differences
)]
#![warn(rust_2021_compatibility, unreachable_pub)]

//! `platform-io` composes heterogeneous telemetry/control **providers**
//! (CPU model-specific registers, Linux `sysfs` drivers, GPU management
//! libraries, constant-config tables, ...) behind one uniform interface: a
//! caller asks for a signal or control by `(name, domain, index)` and the
//! [`orchestrator::Orchestrator`] resolves it to the best-priority provider
//! that supports it, aggregating or disaggregating across sub-domains when
//! the requested domain is coarser than the provider's native one.
//!
//! The orchestrator is single-threaded and synchronous (no internal
//! suspension, no background work): one caller drives it, and every call
//! either completes or fails before returning. Concurrent access must be
//! serialized by the embedding application.
//!
//! See [`orchestrator::Orchestrator`] for the public contract, [`topology`]
//! for the domain taxonomy and [`topology::TopologyOracle`], and
//! [`provider::Provider`] for the backend interface concrete providers
//! implement.

pub use combined;
pub use config;
pub use orchestrator;
pub use provider;
pub use registry;
pub use topology;
