//! Task identifiers.
//!
//! An id is `td-` followed by the first 5 bytes of a SHA-256 digest, in hex.
//! The digest covers the task title, its creation time in microseconds and a
//! random salt, so two tasks created with the same title in the same
//! microsecond still get distinct ids.

use chrono::{DateTime, Utc};
use rand::Rng;
use sha2::{Digest, Sha256};

const PREFIX: &str = "td-";
const DIGEST_BYTES: usize = 5;

pub fn generate_id(title: &str, created_at: DateTime<Utc>) -> String {
    let salt: [u8; 8] = rand::rng().random();
    let digest = Sha256::new()
        .chain_update(title.as_bytes())
        .chain_update(created_at.timestamp_micros().to_le_bytes())
        .chain_update(salt)
        .finalize();

    digest[..DIGEST_BYTES]
        .iter()
        .fold(String::from(PREFIX), |mut id, byte| {
            id.push_str(&format!("{:02x}", byte));
            id
        })
}
