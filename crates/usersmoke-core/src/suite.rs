//! Fixed-order probe orchestration.
//!
//! Probes are independent units with a uniform `(name, run)` shape; no probe
//! result gates another, and the order below is the order they always run in
//! (mirroring the sequence operators already know from serial logs).

use crate::checkpoint::{RunSummary, Transcript};
use crate::image::SuiteEnv;
use crate::probes::{exec_context, static_state};
use crate::{register_load, workload};

/// First line of every transcript.
pub const OPENING_BANNER: &str = "=== usersmoke: user-space conformance probes ===";

/// Last line of every complete transcript; its absence means the process
/// faulted before finishing.
pub const COMPLETION_BANNER: &str = "=== All probes completed ===";

/// One orchestratable probe unit.
pub struct Probe {
    pub name: &'static str,
    pub run: fn(&SuiteEnv, &mut Transcript),
}

/// The fixed probe sequence.
#[must_use]
pub fn registry() -> Vec<Probe> {
    vec![
        Probe { name: "arguments", run: exec_context::arguments },
        Probe { name: "constructor-order", run: static_state::constructor_order },
        Probe { name: "thread-local", run: exec_context::thread_local_cell },
        Probe { name: "atomic-rmw", run: exec_context::atomic_rmw },
        Probe { name: "data-segment", run: static_state::data_segment },
        Probe { name: "zero-segment", run: static_state::zero_segment },
        Probe { name: "stack-recursion", run: exec_context::stack_recursion },
        Probe { name: "fp-chain", run: exec_context::fp_chain },
        Probe { name: "string-format", run: exec_context::string_format },
        Probe { name: "comparator-sort", run: exec_context::comparator_sort },
        Probe { name: "sustained-load", run: register_load::sustained_load },
        Probe { name: "bignum", run: workload::bignum_probe },
        Probe { name: "sealing", run: workload::sealing_probe },
        Probe { name: "json-parse", run: workload::parsing_probe },
        Probe { name: "compression", run: workload::compression_probe },
    ]
}

/// Run every probe in order and close the transcript with a summary line and
/// the completion banner. Individual verdicts never stop the sequence.
pub fn run_suite(env: &SuiteEnv, t: &mut Transcript) -> RunSummary {
    t.banner(OPENING_BANNER);
    for probe in registry() {
        (probe.run)(env, t);
    }
    let summary = t.summary();
    t.banner(&format!(
        "summary: {} checkpoints, {} passed, {} warned, {} failed",
        summary.total, summary.passed, summary.warned, summary.failed
    ));
    t.banner(COMPLETION_BANNER);
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_order_is_fixed() {
        let names: Vec<&str> = registry().iter().map(|p| p.name).collect();
        assert_eq!(
            names,
            vec![
                "arguments",
                "constructor-order",
                "thread-local",
                "atomic-rmw",
                "data-segment",
                "zero-segment",
                "stack-recursion",
                "fp-chain",
                "string-format",
                "comparator-sort",
                "sustained-load",
                "bignum",
                "sealing",
                "json-parse",
                "compression",
            ]
        );
    }
}
