//! Confirmation codes for remote check-in
//!
//! 6 characters, no 0/O/1/I to keep them readable over the phone.

use rand::Rng;

pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
pub const CODE_LENGTH: usize = 6;

pub fn generate_code() -> String {
    generate_code_with(&mut rand::thread_rng())
}

pub fn generate_code_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..CODE_LENGTH)
        .map(|_| char::from(CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())]))
        .collect()
}

/// Normalise user input: trim and upper-case
pub fn normalize_code(input: &str) -> String {
    input.trim().to_ascii_uppercase()
}
