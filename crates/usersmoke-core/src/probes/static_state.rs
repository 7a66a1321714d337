//! Probes over state the loader initializes before the program runs: the
//! initialized data segment, the zero-fill segment, and pre-main initializer
//! ordering.

use crate::checkpoint::Transcript;
use crate::image::{DATA_CELL_PATTERN, PremainMechanism, SuiteEnv};

/// The initialized-data cell must hold its compiled-in constant; anything else
/// means the loader did not map or copy the `.data` segment correctly.
pub fn data_segment(env: &SuiteEnv, t: &mut Transcript) {
    let value = env.data_cell();
    t.check_with(
        "data-segment",
        value == DATA_CELL_PATTERN,
        format!("initialized cell 0x{value:08X}, expected 0x{DATA_CELL_PATTERN:08X}"),
    );
}

/// The uninitialized cell must read zero before any write; a nonzero read
/// means the zero-fill contract for `.bss` was not upheld.
pub fn zero_segment(env: &SuiteEnv, t: &mut Transcript) {
    let value = env.zero_cell();
    t.check_with(
        "zero-segment",
        value == 0,
        format!("uninitialized cell reads {value}"),
    );
}

/// The constructor-run flag must already be set the first time any probe
/// observes it; the ordering guarantee is the point, not mere presence.
pub fn constructor_order(env: &SuiteEnv, t: &mut Transcript) {
    let (ok, detail) = match env.premain_state() {
        PremainMechanism::Loader => (true, "flag set by .init_array before program entry"),
        PremainMechanism::Orchestrator => (true, "flag set by explicit pre-suite hook step"),
        PremainMechanism::NotRun => (false, "pre-main initializers never ran"),
    };
    t.check_with("constructor-order", ok, detail.to_string());
}
