//! Collaborator-library workload probes.
//!
//! Each probe drives one external library through its canonical operation and
//! asserts the library's own success contract. The libraries are not under
//! test; the point is the heavy instruction/register/memory pressure they
//! generate — arbitrary-precision carries, AES rounds over the vector file,
//! parser pointer-chasing, sliding-window compression — while the rest of the
//! suite's state must survive untouched.

use thiserror::Error;

use crate::checkpoint::Transcript;
use crate::image::SuiteEnv;

pub mod bignum;
pub mod compression;
pub mod parsing;
pub mod sealing;

/// Fixed message sealed by the AEAD probe.
pub const SEAL_MESSAGE: &[u8] = b"kernel-user-space-stress-probe";

/// Fixed document parsed by the JSON probe.
pub const JSON_DOC: &str = r#"{"test": "pass", "value": 12345}"#;

/// Fixed repetitive input for the compression round trip.
pub const COMPRESSION_INPUT: &[u8] =
    b"Repeatable string data. Repeatable string data. Repeatable string data.";

/// Failure surface of the workload wrappers, converted to FAIL verdicts.
#[derive(Debug, Error)]
pub enum WorkloadError {
    #[error("aead seal/open rejected the message")]
    Aead,
    #[error("opened payload diverges from the original message")]
    SealMismatch,
    #[error("compression stream error: {0}")]
    Stream(#[from] std::io::Error),
    #[error("decompressed bytes diverge from the original input")]
    InflateMismatch,
    #[error("json parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("json field `{0}` missing or not an integer")]
    JsonField(&'static str),
}

/// Arbitrary-precision arithmetic: a large power's bit length and the decimal
/// prefix of a transcendental constant computed from an integer series.
pub fn bignum_probe(_env: &SuiteEnv, t: &mut Transcript) {
    t.check_eq("bignum-pow2", 1025, bignum::pow2_bit_length(1024));

    let pi = bignum::pi_digits(50);
    t.check_with(
        "bignum-pi",
        pi.starts_with("3.1415926535"),
        format!("pi = {}...", &pi[..13]),
    );
}

/// Authenticated encryption with a fresh random key and nonce, round-tripped.
pub fn sealing_probe(_env: &SuiteEnv, t: &mut Transcript) {
    match sealing::seal_round_trip(SEAL_MESSAGE) {
        Ok(sealed_len) => {
            t.check_with(
                "sealing",
                true,
                format!(
                    "{} bytes sealed to {sealed_len} (tag included), opened intact",
                    SEAL_MESSAGE.len()
                ),
            );
        }
        Err(err) => {
            t.check_with("sealing", false, err.to_string());
        }
    }
}

/// Parse the fixed document and extract its integer field.
pub fn parsing_probe(_env: &SuiteEnv, t: &mut Transcript) {
    match parsing::extract_integer(JSON_DOC, "value") {
        Ok(value) => {
            t.check_eq("json-parse", 12345, value);
        }
        Err(err) => {
            t.check_with("json-parse", false, err.to_string());
        }
    }
}

/// Compress the fixed input and require the exact original bytes back.
pub fn compression_probe(_env: &SuiteEnv, t: &mut Transcript) {
    match compression::round_trip(COMPRESSION_INPUT) {
        Ok(compressed_len) => {
            t.check_with(
                "compression",
                true,
                format!(
                    "{} bytes -> {compressed_len} compressed and back intact",
                    COMPRESSION_INPUT.len()
                ),
            );
        }
        Err(err) => {
            t.check_with("compression", false, err.to_string());
        }
    }
}
