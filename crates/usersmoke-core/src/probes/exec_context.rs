//! Probes over the execution context the kernel hands a running process:
//! argument/environment delivery, thread-local storage, atomics, stack
//! growth under deep recursion, floating-point arithmetic, formatting, and
//! callback-driven ordering.

use std::cmp::Ordering as CmpOrdering;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::checkpoint::Transcript;
use crate::image::SuiteEnv;

const FIB_INPUT: u64 = 20;
const FIB_EXPECTED: u64 = 6765;

/// Argument/environment delivery. A null argv pointer below the reported
/// count is a hard failure of the loader's initial stack layout; an empty
/// environment is legitimate and only worth a warning.
pub fn arguments(env: &SuiteEnv, t: &mut Transcript) {
    let image = env.image();
    let nulls = image.null_arg_indices();
    if nulls.is_empty() {
        let argv0 = image
            .args
            .first()
            .and_then(|a| a.as_deref())
            .unwrap_or("<absent>");
        t.check_with(
            "arguments",
            true,
            format!("argc={}, argv[0]={argv0:?}", image.argc),
        );
    } else {
        t.check_with(
            "arguments",
            false,
            format!(
                "null argv pointer at {nulls:?} below argc={}",
                image.argc
            ),
        );
    }

    if image.env_count > 0 {
        let first = image.first_env.as_deref().unwrap_or("");
        t.check_with(
            "environment",
            true,
            format!("{} entries, first {first:?}", image.env_count),
        );
    } else {
        t.warn(
            "environment",
            "no environment entries inherited".to_string(),
        );
    }
}

/// Thread-local storage read/increment/read. A wrong post-increment value
/// means the per-thread storage area is not mapped or addressed correctly.
pub fn thread_local_cell(env: &SuiteEnv, t: &mut Transcript) {
    let (before, after) = env.tls_increment();
    t.check_with(
        "thread-local",
        after == before.wrapping_add(1),
        format!("cell {before} -> {after}"),
    );
}

/// Atomic fetch-and-add on a local cell: the returned old value and the
/// stored new value must match the documented semantics exactly.
pub fn atomic_rmw(_env: &SuiteEnv, t: &mut Transcript) {
    let cell = AtomicU32::new(10);
    let old = cell.fetch_add(5, Ordering::SeqCst);
    let new = cell.load(Ordering::SeqCst);
    t.check_with(
        "atomic-rmw",
        old == 10 && new == 15,
        format!("fetch_add returned {old}, cell now {new}"),
    );
}

fn fib_padded(n: u64) -> u64 {
    // Fixed-size frame padding forces real stack growth and keeps the
    // recursion from collapsing into a loop or being fully inlined.
    let mut padding = [0u8; 64];
    padding[0] = n as u8;
    std::hint::black_box(&mut padding);
    if n <= 1 {
        n
    } else {
        fib_padded(n - 1) + fib_padded(n - 2)
    }
}

/// Deep recursion with padded frames: a wrong result (or a crash before the
/// verdict line) points at stack-pointer corruption, misaligned frames, or an
/// undersized stack mapping.
pub fn stack_recursion(_env: &SuiteEnv, t: &mut Transcript) {
    let result = fib_padded(FIB_INPUT);
    t.check_with(
        "stack-recursion",
        result == FIB_EXPECTED,
        format!("fib({FIB_INPUT}) = {result}, expected {FIB_EXPECTED}"),
    );
}

/// Chained dependent floating-point operations. The bound is deliberately
/// weak (strictly positive) since exact values are rounding-sensitive; a
/// non-positive accumulator means FPU context corruption outranks rounding.
pub fn fp_chain(_env: &SuiteEnv, t: &mut Transcript) {
    let mut a = 123.456_f64;
    let b = 789.012_f64;
    let mut acc = 0.0_f64;
    for _ in 0..1000 {
        acc += (a * b) / (a + 1.0);
        a += 0.001;
    }
    let acc = std::hint::black_box(acc);
    t.check_with("fp-chain", acc > 0.0, format!("accumulator {acc:.6}"));
}

/// Pure in-memory formatting: integer, hex, and fixed-precision float
/// rendered into one string and compared against the exact expected literal.
pub fn string_format(_env: &SuiteEnv, t: &mut Transcript) {
    const EXPECTED: &str = "Integer: 1234, Hex: 0xFE, Float: 3.14";
    let rendered = format!(
        "Integer: {}, Hex: 0x{:X}, Float: {:.2}",
        1234, 254, 3.141_59
    );
    let ok = rendered == EXPECTED;
    let detail = if ok {
        rendered
    } else {
        format!("expected {EXPECTED:?}, actual {rendered:?}")
    };
    t.check_with("string-format", ok, detail);
}

/// Generic ordering through a function-valued comparison parameter.
pub fn sort_with<T>(items: &mut [T], mut cmp: impl FnMut(&T, &T) -> CmpOrdering) {
    items.sort_by(|a, b| cmp(a, b));
}

/// Callback-driven sort over a fixed array, compared against the known
/// ordering.
pub fn comparator_sort(_env: &SuiteEnv, t: &mut Transcript) {
    let mut values = [88, 56, 100, 2, 25];
    sort_with(&mut values, |a: &i32, b: &i32| a.cmp(b));
    t.check_with(
        "comparator-sort",
        values == [2, 25, 56, 88, 100],
        format!("{values:?}"),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkpoint::Verdict;
    use crate::image::ProcessImage;

    fn env_of(image: ProcessImage) -> SuiteEnv {
        SuiteEnv::with_image(image, 1)
    }

    #[test]
    fn fibonacci_base_and_probe_values() {
        assert_eq!(fib_padded(0), 0);
        assert_eq!(fib_padded(1), 1);
        assert_eq!(fib_padded(10), 55);
        assert_eq!(fib_padded(FIB_INPUT), FIB_EXPECTED);
    }

    #[test]
    fn null_argv_below_argc_fails() {
        let env = env_of(ProcessImage::synthetic(
            vec![Some("usersmoke".to_string()), None],
            &["A=1"],
        ));
        let mut t = Transcript::in_memory();
        arguments(&env, &mut t);
        assert_eq!(t.records()[0].verdict, Verdict::Fail);
    }

    #[test]
    fn empty_environment_warns_instead_of_failing() {
        let env = env_of(ProcessImage::synthetic(
            vec![Some("usersmoke".to_string())],
            &[],
        ));
        let mut t = Transcript::in_memory();
        arguments(&env, &mut t);
        let verdicts: Vec<Verdict> = t.records().iter().map(|r| r.verdict).collect();
        assert_eq!(verdicts, vec![Verdict::Pass, Verdict::Warn]);
    }

    #[test]
    fn atomic_and_tls_probes_pass() {
        let env = env_of(ProcessImage::synthetic(
            vec![Some("usersmoke".to_string())],
            &["A=1"],
        ));
        let mut t = Transcript::in_memory();
        atomic_rmw(&env, &mut t);
        thread_local_cell(&env, &mut t);
        assert!(t.records().iter().all(|r| r.verdict == Verdict::Pass));
    }

    #[test]
    fn sort_with_honors_the_supplied_comparator() {
        let mut forward = [88, 56, 100, 2, 25];
        sort_with(&mut forward, |a: &i32, b: &i32| a.cmp(b));
        assert_eq!(forward, [2, 25, 56, 88, 100]);

        let mut reverse = [88, 56, 100, 2, 25];
        sort_with(&mut reverse, |a: &i32, b: &i32| b.cmp(a));
        assert_eq!(reverse, [100, 88, 56, 25, 2]);
    }

    #[test]
    fn format_probe_literal_matches() {
        let rendered = format!(
            "Integer: {}, Hex: 0x{:X}, Float: {:.2}",
            1234, 254, 3.141_59
        );
        assert_eq!(rendered, "Integer: 1234, Hex: 0xFE, Float: 3.14");
    }
}
