//! Credential digest.
//!
//! Raw PINs and card serials are never stored or logged; the store is keyed
//! by a deterministic BLAKE3 digest instead. This can _not_ protect against
//! brute force: pin codes are short and older 32-bit card serials are only
//! 8 hex characters, so anyone with the user file and some CPU cycles can
//! recover them. The digest merely avoids revealing IDs and their lengths
//! while browsing the file. The domain prefix keeps rainbow tables built for
//! unrelated systems from applying here, nothing more.

use blake3::Hasher;

/// Domain-separation prefix mixed into every credential digest.
const CODE_DOMAIN: &[u8] = b"zonegate-credential-v1:";

/// Digest a raw credential into its stable lookup key.
///
/// Same input always yields the same key, across restarts, so keys computed
/// at provisioning time match keys loaded from the persisted store.
pub fn hash_code(raw: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(CODE_DOMAIN);
    hasher.update(raw.as_bytes());
    let hash = hasher.finalize();
    // Use first 16 bytes as hex string
    hex::encode(&hash.as_bytes()[..16])
}
