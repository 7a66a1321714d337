//! # usersmoke-core
//!
//! User-space conformance probes for kernel bring-up: a process launched by a
//! kernel under development checks, from user space and without syscalls
//! beyond output, that the loader and context-switch machinery delivered the
//! environment it is entitled to.
//!
//! Layout:
//! - [`checkpoint`]: verdict reporting (`PASS`/`WARN`/`FAIL` lines, records,
//!   summary, JSONL rendering)
//! - [`image`]: loader-owned cells, pre-main capture, the [`SuiteEnv`] handle
//! - [`probes`]: assert-and-report checks over static and execution-context
//!   state
//! - [`register_load`]: the sustained-load determinism probe
//! - [`workload`]: collaborator-library pressure probes (bignum, AEAD, JSON,
//!   compression)
//! - [`suite`]: the fixed-order orchestrator

pub mod checkpoint;
pub mod image;
pub mod probes;
pub mod register_load;
pub mod suite;
pub mod workload;

pub use checkpoint::{ProbeRecord, RunSummary, Transcript, Verdict};
pub use image::{ProcessImage, SuiteEnv};
pub use suite::{COMPLETION_BANNER, OPENING_BANNER, run_suite};
