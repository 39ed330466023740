//! Record identifier generation.
//!
//! Identifiers are 16 random bytes, hex-encoded (32 characters). Collisions
//! are not expected; inserts still guard against them with primary-key
//! constraints.

use rand::RngCore;

/// Number of random bytes per identifier.
pub const ID_BYTES: usize = 16;

/// Generate a fresh random identifier.
pub fn generate() -> String {
    let mut bytes = [0u8; ID_BYTES];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
