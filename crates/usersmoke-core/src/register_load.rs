//! Sustained-load determinism probe.
//!
//! Eight scalars (four integer, four floating) are evolved in registers over a
//! large fixed iteration count and folded into two checksums. The working set
//! deliberately fits in registers with no array or heap traffic: a context
//! switch that fails to save or restore a general-purpose or floating/vector
//! register perturbs at least one accumulator with high probability, and the
//! checksums stop being reproducible run-to-run. The arithmetic here is the
//! detector itself; changing any operation, constant, or the cross-domain
//! cadence changes its sensitivity, so treat the loop body as fixed.

use sha2::{Digest, Sha256};

use crate::checkpoint::Transcript;
use crate::image::SuiteEnv;

/// Iteration count used by the shipped suite binary.
pub const DEFAULT_ITERATIONS: u64 = 10_000_000;

/// Cross-domain mixing (and liveness tick) cadence: every 2^20 iterations.
const CROSS_DOMAIN_MASK: u64 = (1 << 20) - 1;

// Fixed seeds. Integer words carry distinct bit patterns so a dropped or
// swapped register cannot cancel out of the XOR fold.
const G1_SEED: u64 = 0x1234_5678_9ABC_DEF0;
const G2_SEED: u64 = 0x0FED_CBA9_8765_4321;
const G3_SEED: u64 = 0xA5A5_A5A5_5A5A_5A5A;
const G4_SEED: u64 = 0xFF00_FF00_00FF_00FF;

const F1_SEED: f64 = 1.000_000_1;
const F2_SEED: f64 = 0.999_999_9;
const F3_SEED: f64 = 3.141_592_6;
const F4_SEED: f64 = 2.718_281_8;

/// Final checksums of one sustained-load run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadChecksums {
    /// XOR fold of the four integer accumulators.
    pub integer: u64,
    /// Sum of the four floating accumulators.
    pub floating: f64,
}

impl LoadChecksums {
    /// Bit-exact equality; the floating checksum is compared by bit pattern,
    /// not by numeric tolerance.
    #[must_use]
    pub fn bitwise_eq(&self, other: &Self) -> bool {
        self.integer == other.integer && self.floating.to_bits() == other.floating.to_bits()
    }

    /// SHA-256 over both checksums, hex-encoded: one token an operator can
    /// diff across runs or across serial logs.
    #[must_use]
    pub fn digest_hex(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.integer.to_le_bytes());
        hasher.update(self.floating.to_bits().to_le_bytes());
        hasher
            .finalize()
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect()
    }
}

/// Run the register-resident loop for `iterations` steps. `tick` fires at the
/// cross-domain cadence so callers can emit liveness markers.
pub fn run(iterations: u64, mut tick: impl FnMut()) -> LoadChecksums {
    let mut g1 = G1_SEED;
    let mut g2 = G2_SEED;
    let mut g3 = G3_SEED;
    let mut g4 = G4_SEED;

    let mut f1 = F1_SEED;
    let mut f2 = F2_SEED;
    let mut f3 = F3_SEED;
    let mut f4 = F4_SEED;

    for i in 0..iterations {
        // Integer mix: xorshift-style updates plus a rotate, with the loop
        // counter folded in so every iteration is distinguishable.
        g1 ^= g2 << 13;
        g2 ^= g3 >> 7;
        g3 = g3.wrapping_add(g4);
        g4 = g4.rotate_left(3);
        g1 = g1.wrapping_add(i);

        // Floating mix: dependent multiply/add/divide chains with small fixed
        // deltas; each accumulator feeds its own next value.
        f1 = f1 * f2 + 1.0e-13;
        f2 += 1.0e-13;
        f3 = f3 / 1.000_000_01 + f4 * 1.0e-8;
        f4 -= 1.0e-13;

        // Cross-domain step: move bits between the integer and floating
        // register files (cvt/movq traffic) at a fixed cadence.
        if i & CROSS_DOMAIN_MASK == 0 {
            f1 += ((g1 & 0xFF) as f64) * 1.0e-7;
            g4 ^= f2.to_bits() >> 32;
            tick();
        }
    }

    LoadChecksums {
        integer: g1 ^ g2 ^ g3 ^ g4,
        floating: f1 + f2 + f3 + f4,
    }
}

/// Probe entry: run the loop twice back-to-back and require bit-identical
/// checksums. A context-switch bug shows up as drift between the two runs or
/// as a digest that changes across process invocations.
pub fn sustained_load(env: &SuiteEnv, t: &mut Transcript) {
    let iterations = env.load_iterations();
    t.progress("sustained-load progress ");
    let first = run(iterations, || t.progress("."));
    let second = run(iterations, || ());
    t.progress(" done\n");

    if first.bitwise_eq(&second) {
        t.check_with(
            "sustained-load",
            true,
            format!(
                "checksums stable over {iterations} iterations x2 (gpr=0x{:016x} fpu={:.15} digest={})",
                first.integer,
                first.floating,
                &first.digest_hex()[..16]
            ),
        );
    } else {
        t.check_with(
            "sustained-load",
            false,
            format!(
                "checksum drift between back-to-back runs: gpr 0x{:016x} vs 0x{:016x}, fpu bits 0x{:016x} vs 0x{:016x}",
                first.integer,
                second.integer,
                first.floating.to_bits(),
                second.floating.to_bits()
            ),
        );
    }
}
