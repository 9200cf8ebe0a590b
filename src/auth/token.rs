//! Reset token generation.

use rand_core::{OsRng, RngCore};

/// Number of random bytes in a reset token (256 bits).
pub const RESET_TOKEN_BYTES: usize = 32;

/// Generate a password reset token.
///
/// 32 bytes from the OS RNG, hex-encoded to 64 characters. Unguessable,
/// so possession of the token is the sole proof of the reset request.
pub fn generate_reset_token() -> String {
    let mut bytes = [0u8; RESET_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
