use rand::{rngs::OsRng, RngCore};

/// Number of random bytes in a state token
pub const STATE_TOKEN_BYTES: usize = 20;

/// Generates a new hex encoded anti-CSRF state token
pub fn generate_state_token() -> String {
    let mut bytes = [0u8; STATE_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
