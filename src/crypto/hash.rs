use sha2::{Digest, Sha512_256};

/// Menghitung hash SHA-512/256 dari data byte
pub fn sha512_256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha512_256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Hash dengan domain-separation prefix ("TX", "TG", ...)
pub fn sha512_256_prefixed(prefix: &[u8], data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha512_256::new();
    hasher.update(prefix);
    hasher.update(data);
    hasher.finalize().into()
}

/// Menghitung hash SHA-512/256 dan mengembalikan string hex tanpa prefix
pub fn sha512_256_hex(data: &[u8]) -> String {
    hex::encode(sha512_256(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha512_256_hex_matches_empty_string_vector() {
        let digest = sha512_256_hex(b"");
        assert_eq!(
            digest,
            "c672b8d1ef56ed28ab87c3622c5114069bdd3ad7b8f9737498d0c01ecef0967a"
        );
        assert_eq!(digest.len(), 64);
    }

    #[test]
    fn prefixed_hash_equals_hash_of_concatenation() {
        let joined = sha512_256(b"TXtango");
        assert_eq!(sha512_256_prefixed(b"TX", b"tango"), joined);
        assert_eq!(
            sha512_256_hex(b"tango"),
            "3d230393f9e22cefe863691a1ba12d96a2a3663d8359d15e37e3e462227e5244"
        );
    }
}
