use std::fmt;
use std::str::FromStr;

use data_encoding::BASE32_NOPAD;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::crypto::hash::sha512_256;
use crate::error::AppError;

const CHECKSUM_LEN: usize = 4;
pub const ADDRESS_LEN: usize = 58;

/// 32-byte account public key, rendered as base32 with a 4-byte checksum.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Address(pub [u8; 32]);

impl Address {
    pub const ZERO: Address = Address([0u8; 32]);

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// The all-zero sentinel: "no player yet" or "draw".
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, AppError> {
        let key: [u8; 32] = bytes
            .try_into()
            .map_err(|_| AppError::Internal(format!("address needs 32 bytes, got {}", bytes.len())))?;
        Ok(Self(key))
    }

    fn checksum(&self) -> [u8; CHECKSUM_LEN] {
        let digest = sha512_256(&self.0);
        let mut out = [0u8; CHECKSUM_LEN];
        out.copy_from_slice(&digest[32 - CHECKSUM_LEN..]);
        out
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut raw = Vec::with_capacity(32 + CHECKSUM_LEN);
        raw.extend_from_slice(&self.0);
        raw.extend_from_slice(&self.checksum());
        f.write_str(&BASE32_NOPAD.encode(&raw))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl FromStr for Address {
    type Err = AppError;

    /// Accepts any letter case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase();
        if normalized.len() != ADDRESS_LEN {
            return Err(AppError::InvalidInput(format!(
                "Invalid address format: expected {ADDRESS_LEN} characters"
            )));
        }
        let raw = BASE32_NOPAD
            .decode(normalized.as_bytes())
            .map_err(|_| AppError::InvalidInput("Invalid address format".to_string()))?;
        if raw.len() != 32 + CHECKSUM_LEN {
            return Err(AppError::InvalidInput("Invalid address format".to_string()));
        }
        let address = Address::from_slice(&raw[..32])?;
        if raw[32..] != address.checksum() {
            return Err(AppError::InvalidInput("Address checksum mismatch".to_string()));
        }
        Ok(address)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ZERO_ADDRESS: &str = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAY5HFKQ";

    #[test]
    fn zero_address_matches_known_sentinel() {
        assert_eq!(Address::ZERO.to_string(), ZERO_ADDRESS);
        let parsed: Address = ZERO_ADDRESS.parse().expect("zero address parses");
        assert!(parsed.is_zero());
    }

    #[test]
    fn parse_is_case_insensitive_and_round_trips() {
        let original = Address([7u8; 32]);
        let text = original.to_string();
        assert_eq!(text.len(), ADDRESS_LEN);
        let lowered: Address = text.to_lowercase().parse().expect("lowercase parses");
        assert_eq!(lowered, original);
    }

    #[test]
    fn parse_rejects_bad_checksum_and_length() {
        let mut text = Address([9u8; 32]).to_string();
        let last = text.pop().expect("non-empty");
        text.push(if last == 'A' { 'B' } else { 'A' });
        assert!(text.parse::<Address>().is_err());
        assert!("PLAYER1ABCDEFGHIJKLMNOPQRSTUVWXYZ123456".parse::<Address>().is_err());
    }

    #[test]
    fn deployed_contract_address_is_valid() {
        let parsed: std::result::Result<Address, _> =
            crate::constants::DEFAULT_CONTRACT_APP_ADDRESS.parse();
        assert!(parsed.is_ok());
    }
}
