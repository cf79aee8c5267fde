//! Short code generation and shape validation.
//!
//! Codes are capability-like identifiers for anonymous links, so they are
//! drawn from the operating system's CSPRNG rather than a seeded
//! pseudo-random generator.

use rand::TryRngCore;
use rand::rngs::OsRng;

/// Alphabet the codes are drawn from: `0-9A-Za-z`.
pub const CODE_ALPHABET: &[u8] =
    b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Fixed length of every issued code.
pub const CODE_LENGTH: usize = 6;

/// Largest byte value accepted by the sampler; bytes at or above this are
/// discarded so that `byte % 62` stays uniform.
const REJECT_THRESHOLD: u8 = (u8::MAX / CODE_ALPHABET.len() as u8) * CODE_ALPHABET.len() as u8;

/// Generates a random short code of [`CODE_LENGTH`] characters.
///
/// Each character is drawn uniformly and independently from
/// [`CODE_ALPHABET`] using the OS random number generator, with rejection
/// sampling to avoid modulo bias.
///
/// # Panics
///
/// Panics if the system random number generator fails. Entropy source
/// failure is a fatal process condition, not a recoverable error.
///
/// # Examples
///
/// ```
/// use shortlink_engine::utils::code_generator::{generate_code, is_well_formed_code};
///
/// let code = generate_code();
/// assert_eq!(code.len(), 6);
/// assert!(is_well_formed_code(&code));
/// ```
pub fn generate_code() -> String {
    let mut code = String::with_capacity(CODE_LENGTH);
    let mut buffer = [0u8; 32];

    while code.len() < CODE_LENGTH {
        OsRng
            .try_fill_bytes(&mut buffer)
            .expect("system entropy source failed");

        for byte in buffer {
            if code.len() == CODE_LENGTH {
                break;
            }

            if byte < REJECT_THRESHOLD {
                code.push(CODE_ALPHABET[(byte % CODE_ALPHABET.len() as u8) as usize] as char);
            }
        }
    }

    code
}

/// Checks that `code` has the fixed shape of an issued code:
/// exactly [`CODE_LENGTH`] ASCII-alphanumeric characters.
///
/// Used by the resolver to reject garbage before it reaches the store.
pub fn is_well_formed_code(code: &str) -> bool {
    code.len() == CODE_LENGTH && code.bytes().all(|b| b.is_ascii_alphanumeric())
}
