use sha1::Digest;

/// Fingerprint of a rules snapshot, used to detect out-of-band edits and to
/// tag revision rows.
pub fn rules_checksum(rules: &str) -> [u8; 20] {
    let mut hasher = sha1::Sha1::new();
    hasher.update(rules.as_bytes());
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_is_stable_and_content_sensitive() {
        let checksum = rules_checksum("||ads.test^$important\n");
        assert_eq!(checksum, rules_checksum("||ads.test^$important\n"));
        assert_ne!(checksum, rules_checksum("||ads.test^$important"));
        assert_ne!(checksum, rules_checksum(""));
    }
}
