//! Authenticated-encryption workload (AES-256-GCM).
//!
//! AES rounds and GHASH keep the vector register file hot (AES-NI/CLMUL on
//! x86), which is exactly the state a faulty context switch clobbers.

use aes_gcm::Aes256Gcm;
use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};

use super::WorkloadError;

/// Seal `message` under a fresh random key/nonce, open it again, and require
/// the opened bytes to equal the original. Returns the sealed length
/// (message plus tag).
pub fn seal_round_trip(message: &[u8]) -> Result<usize, WorkloadError> {
    let key = Aes256Gcm::generate_key(&mut OsRng);
    let cipher = Aes256Gcm::new(&key);
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let sealed = cipher
        .encrypt(&nonce, message)
        .map_err(|_| WorkloadError::Aead)?;
    let opened = cipher
        .decrypt(&nonce, sealed.as_ref())
        .map_err(|_| WorkloadError::Aead)?;

    if opened != message {
        return Err(WorkloadError::SealMismatch);
    }
    Ok(sealed.len())
}
