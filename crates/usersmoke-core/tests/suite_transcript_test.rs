//! End-to-end transcript scenarios over an in-memory sink.

use usersmoke_core::image::ProcessImage;
use usersmoke_core::{COMPLETION_BANNER, OPENING_BANNER, SuiteEnv, Transcript, Verdict, run_suite};

// Keep the register loop short here; determinism at full scale is covered by
// the module's own tests and the suite binary.
const TEST_LOAD_ITERATIONS: u64 = 1 << 16;

fn env_with(envs: &[&str]) -> SuiteEnv {
    let image = ProcessImage::synthetic(vec![Some("usersmoke".to_string())], envs);
    SuiteEnv::with_image(image, TEST_LOAD_ITERATIONS)
}

#[test]
fn populated_environment_produces_no_fail_and_ends_with_banner() {
    let mut t = Transcript::in_memory();
    let summary = run_suite(&env_with(&["PATH=/bin"]), &mut t);

    assert!(summary.all_clear());
    assert_eq!(summary.warned, 0);

    let text = t.rendered().unwrap();
    assert!(!text.lines().any(|l| l.starts_with("FAIL")));
    assert_eq!(text.lines().next().unwrap(), OPENING_BANNER);
    assert_eq!(text.lines().last().unwrap(), COMPLETION_BANNER);
}

#[test]
fn empty_environment_yields_exactly_one_warn_and_still_completes() {
    let mut t = Transcript::in_memory();
    let summary = run_suite(&env_with(&[]), &mut t);

    assert!(summary.all_clear());
    assert_eq!(summary.warned, 1);

    let text = t.rendered().unwrap();
    assert_eq!(text.lines().filter(|l| l.starts_with("WARN")).count(), 1);
    assert!(!text.lines().any(|l| l.starts_with("FAIL")));
    assert_eq!(text.lines().last().unwrap(), COMPLETION_BANNER);
}

#[test]
fn null_argv_slot_fails_without_stopping_later_probes() {
    let image = ProcessImage::synthetic(
        vec![Some("usersmoke".to_string()), None],
        &["PATH=/bin"],
    );
    let env = SuiteEnv::with_image(image, TEST_LOAD_ITERATIONS);
    let mut t = Transcript::in_memory();
    let summary = run_suite(&env, &mut t);

    assert_eq!(summary.failed, 1);
    // every later probe still ran and reported
    assert!(
        t.records()
            .iter()
            .any(|r| r.probe == "compression" && r.verdict == Verdict::Pass)
    );
    let text = t.rendered().unwrap();
    assert_eq!(text.lines().last().unwrap(), COMPLETION_BANNER);
}

#[test]
fn jsonl_rendering_matches_record_count() {
    let mut t = Transcript::in_memory();
    run_suite(&env_with(&["PATH=/bin"]), &mut t);
    assert_eq!(t.to_jsonl().lines().count(), t.records().len());
}

#[test]
fn summary_line_precedes_completion_banner() {
    let mut t = Transcript::in_memory();
    run_suite(&env_with(&["PATH=/bin"]), &mut t);
    let text = t.rendered().unwrap();
    let lines: Vec<&str> = text.lines().collect();
    let last = lines.len() - 1;
    assert!(lines[last - 1].starts_with("summary: "));
    assert_eq!(lines[last], COMPLETION_BANNER);
}
