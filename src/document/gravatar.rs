//! Gravatar URL derivation
//!
//! The avatar address is a pure function of the PAUSE id: the hash of
//! `<pauseid>@cpan.org` (trimmed, lowercased), served over https at a
//! fixed size with the identicon fallback.

use sha2::{Digest, Sha256};

/// Image edge length in pixels
pub const AVATAR_SIZE: u32 = 130;

/// Fallback image when no avatar is registered for the hash
pub const FALLBACK_IMAGE: &str = "identicon";

const AVATAR_BASE: &str = "https://www.gravatar.com/avatar";

/// Returns the CPAN mail address for a PAUSE id, normalised for hashing.
pub fn cpan_address(pauseid: &str) -> String {
    format!("{}@cpan.org", pauseid.trim()).to_lowercase()
}

/// Builds the avatar URL for a PAUSE id.
pub fn gravatar_url(pauseid: &str) -> String {
    let digest = Sha256::digest(cpan_address(pauseid).as_bytes());
    format!(
        "{}/{:x}?s={}&d={}",
        AVATAR_BASE, digest, AVATAR_SIZE, FALLBACK_IMAGE
    )
}
