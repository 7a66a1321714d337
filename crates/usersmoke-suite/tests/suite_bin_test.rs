//! Spawns the built suite binary and checks the end-to-end contract.

use std::process::Command;

#[test]
fn binary_exits_zero_and_reaches_the_completion_banner() {
    let output = Command::new(env!("CARGO_BIN_EXE_usersmoke"))
        .output()
        .expect("spawn usersmoke");

    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.lines().any(|l| l.starts_with("PASS arguments")));
    assert!(stdout.lines().any(|l| l.starts_with("PASS sustained-load")));
    assert!(!stdout.lines().any(|l| l.starts_with("FAIL")));
    assert_eq!(
        stdout.lines().last().unwrap(),
        "=== All probes completed ==="
    );
}
