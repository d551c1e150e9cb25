//! ARC-4 method descriptors and the handful of codecs the Tango and Ijarah
//! contracts need: `uint64`, `address`, `string` and fixed tuples of those.

use crate::chain::address::Address;
use crate::constants::{
    METHOD_CLAIM_UJRAH, METHOD_CREATE_GAME, METHOD_GET_GAME, METHOD_GET_GAME_STATUS,
    METHOD_GET_MY_IJARAH_INFO, METHOD_GET_WINNER, METHOD_JOIN_GAME, METHOD_LEASE_VALIDATION_RIGHTS,
    METHOD_SUBMIT_MOVE, METHOD_TERMINATE_LEASE, METHOD_TRANSFER_OWNERSHIP,
};
use crate::crypto::hash::sha512_256;
use crate::error::{AppError, Result};

/// Prefix of the log line carrying an ABI return value.
pub const RETURN_PREFIX: [u8; 4] = [0x15, 0x1f, 0x7c, 0x75];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Method {
    pub name: &'static str,
    pub args: &'static [&'static str],
    pub returns: &'static str,
}

impl Method {
    pub fn signature(&self) -> String {
        format!("{}({}){}", self.name, self.args.join(","), self.returns)
    }

    pub fn selector(&self) -> [u8; 4] {
        let digest = sha512_256(self.signature().as_bytes());
        [digest[0], digest[1], digest[2], digest[3]]
    }

    /// Whether the call touches a per-game box keyed by its first argument.
    pub fn reads_game_box(&self) -> bool {
        matches!(
            self.name,
            METHOD_JOIN_GAME | METHOD_SUBMIT_MOVE | METHOD_GET_GAME | METHOD_GET_GAME_STATUS
                | METHOD_GET_WINNER
        )
    }
}

pub const TANGO_METHODS: [Method; 7] = [
    Method { name: METHOD_CREATE_GAME, args: &[], returns: "uint64" },
    Method { name: METHOD_JOIN_GAME, args: &["uint64"], returns: "string" },
    Method { name: METHOD_SUBMIT_MOVE, args: &["uint64", "uint64"], returns: "string" },
    Method {
        name: METHOD_GET_GAME,
        args: &["uint64"],
        returns: "(address,address,uint64,uint64,uint64,address)",
    },
    Method { name: METHOD_GET_GAME_STATUS, args: &["uint64"], returns: "string" },
    Method { name: METHOD_GET_WINNER, args: &["uint64"], returns: "address" },
    Method { name: METHOD_TRANSFER_OWNERSHIP, args: &["address"], returns: "string" },
];

pub const IJARAH_METHODS: [Method; 4] = [
    Method { name: METHOD_LEASE_VALIDATION_RIGHTS, args: &["pay"], returns: "string" },
    Method { name: METHOD_CLAIM_UJRAH, args: &[], returns: "string" },
    Method { name: METHOD_TERMINATE_LEASE, args: &["uint64"], returns: "string" },
    Method {
        name: METHOD_GET_MY_IJARAH_INFO,
        args: &[],
        returns: "(uint64,uint64,uint64)",
    },
];

pub fn method_by_name(methods: &[Method], name: &str) -> Result<Method> {
    methods
        .iter()
        .copied()
        .find(|m| m.name == name)
        .ok_or_else(|| AppError::Internal(format!("Unknown ABI method: {name}")))
}

/// Argument value for an application call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiArg {
    Uint64(u64),
    Address(Address),
}

impl AbiArg {
    pub fn type_name(&self) -> &'static str {
        match self {
            AbiArg::Uint64(_) => "uint64",
            AbiArg::Address(_) => "address",
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        match self {
            AbiArg::Uint64(value) => value.to_be_bytes().to_vec(),
            AbiArg::Address(address) => address.as_bytes().to_vec(),
        }
    }
}

/// Selector followed by encoded arguments; types are checked against the method.
pub fn encode_call(method: &Method, args: &[AbiArg]) -> Result<Vec<Vec<u8>>> {
    let declared: Vec<&str> = method.args.iter().copied().filter(|t| *t != "pay").collect();
    if declared.len() != args.len() {
        return Err(AppError::Internal(format!(
            "{} expects {} arguments, got {}",
            method.name,
            declared.len(),
            args.len()
        )));
    }
    let mut app_args = Vec::with_capacity(args.len() + 1);
    app_args.push(method.selector().to_vec());
    for (expected, arg) in declared.iter().zip(args) {
        if *expected != arg.type_name() {
            return Err(AppError::Internal(format!(
                "{} argument type mismatch: expected {}, got {}",
                method.name,
                expected,
                arg.type_name()
            )));
        }
        app_args.push(arg.encode());
    }
    Ok(app_args)
}

/// Finds the ABI return value among a transaction's logs (last matching line wins).
pub fn extract_return(logs: &[Vec<u8>]) -> Option<&[u8]> {
    logs.iter()
        .rev()
        .find(|line| line.starts_with(&RETURN_PREFIX))
        .map(|line| &line[RETURN_PREFIX.len()..])
}

pub fn decode_uint64(bytes: &[u8]) -> Result<u64> {
    let raw: [u8; 8] = bytes
        .try_into()
        .map_err(|_| AppError::RemoteFailure(format!("uint64 needs 8 bytes, got {}", bytes.len())))?;
    Ok(u64::from_be_bytes(raw))
}

pub fn decode_string(bytes: &[u8]) -> Result<String> {
    if bytes.len() < 2 {
        return Err(AppError::RemoteFailure("string return is truncated".to_string()));
    }
    let len = u16::from_be_bytes([bytes[0], bytes[1]]) as usize;
    let body = bytes
        .get(2..2 + len)
        .ok_or_else(|| AppError::RemoteFailure("string return is truncated".to_string()))?;
    String::from_utf8(body.to_vec())
        .map_err(|e| AppError::RemoteFailure(format!("string return is not UTF-8: {e}")))
}

pub fn decode_address(bytes: &[u8]) -> Result<Address> {
    Address::from_slice(bytes)
        .map_err(|_| AppError::RemoteFailure(format!("address needs 32 bytes, got {}", bytes.len())))
}

/// Decodes a static tuple of `uint64`s, e.g. `(uint64,uint64,uint64)`.
pub fn decode_uint64_tuple<const N: usize>(bytes: &[u8]) -> Result<[u64; N]> {
    if bytes.len() != N * 8 {
        return Err(AppError::RemoteFailure(format!(
            "tuple of {N} uint64 needs {} bytes, got {}",
            N * 8,
            bytes.len()
        )));
    }
    let mut out = [0u64; N];
    for (slot, chunk) in out.iter_mut().zip(bytes.chunks_exact(8)) {
        *slot = decode_uint64(chunk)?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tango(name: &str) -> Method {
        method_by_name(&TANGO_METHODS, name).expect("method exists")
    }

    #[test]
    fn selectors_match_contract_signatures() {
        assert_eq!(hex::encode(tango("create_game").selector()), "3df3c688");
        assert_eq!(hex::encode(tango("join_game").selector()), "e0173e5b");
        assert_eq!(hex::encode(tango("submit_move").selector()), "9b1d2ec8");
        assert_eq!(hex::encode(tango("get_game").selector()), "c5b01bb2");
        assert_eq!(hex::encode(tango("get_winner").selector()), "3e2ec8e9");
        assert_eq!(hex::encode(tango("transfer_ownership").selector()), "255a86df");
        let lease = method_by_name(&IJARAH_METHODS, "lease_validation_rights").unwrap();
        assert_eq!(lease.signature(), "lease_validation_rights(pay)string");
        assert_eq!(hex::encode(lease.selector()), "0848f029");
    }

    #[test]
    fn return_prefix_is_hash_of_return() {
        assert_eq!(sha512_256(b"return")[..4], RETURN_PREFIX);
    }

    #[test]
    fn encode_call_appends_big_endian_args() {
        let args = encode_call(&tango("submit_move"), &[AbiArg::Uint64(5), AbiArg::Uint64(2)])
            .expect("encodes");
        assert_eq!(args.len(), 3);
        assert_eq!(args[0], hex::decode("9b1d2ec8").unwrap());
        assert_eq!(args[1], vec![0, 0, 0, 0, 0, 0, 0, 5]);
        assert_eq!(args[2], vec![0, 0, 0, 0, 0, 0, 0, 2]);
    }

    #[test]
    fn encode_call_rejects_wrong_arity_and_type() {
        assert!(encode_call(&tango("join_game"), &[]).is_err());
        assert!(encode_call(
            &tango("transfer_ownership"),
            &[AbiArg::Uint64(1)]
        )
        .is_err());
    }

    #[test]
    fn pay_arguments_are_not_app_args() {
        let lease = method_by_name(&IJARAH_METHODS, "lease_validation_rights").unwrap();
        let args = encode_call(&lease, &[]).expect("encodes");
        assert_eq!(args, vec![lease.selector().to_vec()]);
    }

    #[test]
    fn extract_return_picks_last_prefixed_log() {
        let mut first = RETURN_PREFIX.to_vec();
        first.extend_from_slice(&1u64.to_be_bytes());
        let mut second = RETURN_PREFIX.to_vec();
        second.extend_from_slice(&9u64.to_be_bytes());
        let logs = vec![b"debug".to_vec(), first, second];
        let value = extract_return(&logs).expect("return present");
        assert_eq!(decode_uint64(value).unwrap(), 9);
        assert!(extract_return(&[b"plain".to_vec()]).is_none());
    }

    #[test]
    fn decode_string_reads_length_prefix() {
        let mut encoded = vec![0, 12];
        encoded.extend_from_slice(b"Game is full");
        assert_eq!(decode_string(&encoded).unwrap(), "Game is full");
        assert!(decode_string(&[0, 5, b'a']).is_err());
    }

    #[test]
    fn decode_uint64_tuple_splits_words() {
        let mut bytes = Vec::new();
        for v in [1_000_000u64, 1_700_000_000, 2_500] {
            bytes.extend_from_slice(&v.to_be_bytes());
        }
        let [principal, start, unclaimed] = decode_uint64_tuple::<3>(&bytes).unwrap();
        assert_eq!((principal, start, unclaimed), (1_000_000, 1_700_000_000, 2_500));
        assert!(decode_uint64_tuple::<3>(&bytes[..16]).is_err());
    }

    #[test]
    fn game_box_methods_are_flagged() {
        assert!(tango("submit_move").reads_game_box());
        assert!(!tango("create_game").reads_game_box());
        assert!(!tango("transfer_ownership").reads_game_box());
    }
}
