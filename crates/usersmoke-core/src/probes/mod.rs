//! Assert-and-report probes over loader- and kernel-owned state.

pub mod exec_context;
pub mod static_state;
