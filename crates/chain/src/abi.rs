//! Minimal ABI encoding for the investment contract.
//!
//! Only what the contract's surface needs: no-argument and single-address
//! calls in, `uint256` and `address[]` out.

use alloy_primitives::{keccak256, Address, Bytes, U256};
use yieldfolio_core::contract::ContractError;

const WORD: usize = 32;

/// First four bytes of the keccak256 hash of the canonical signature.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Encodes a call with no arguments.
pub fn encode_call(signature: &str) -> Bytes {
    Bytes::copy_from_slice(&selector(signature))
}

/// Encodes a call taking a single `address`.
pub fn encode_address_call(signature: &str, address: Address) -> Bytes {
    let mut data = Vec::with_capacity(4 + WORD);
    data.extend_from_slice(&selector(signature));
    data.extend_from_slice(&[0u8; 12]);
    data.extend_from_slice(address.as_slice());
    data.into()
}

fn word(data: &[u8], index: usize) -> Result<&[u8], ContractError> {
    let start = index * WORD;
    data.get(start..start + WORD).ok_or_else(|| {
        ContractError::Decode(format!(
            "expected at least {} bytes, got {}",
            start + WORD,
            data.len()
        ))
    })
}

fn word_to_usize(word: &[u8]) -> Result<usize, ContractError> {
    let value = U256::from_be_slice(word);
    usize::try_from(value).map_err(|_| ContractError::Decode(format!("{} is not a valid offset", value)))
}

/// Decodes a single `uint256` return value.
pub fn decode_uint256(data: &[u8]) -> Result<U256, ContractError> {
    Ok(U256::from_be_slice(word(data, 0)?))
}

/// Decodes a single dynamic `address[]` return value.
pub fn decode_address_array(data: &[u8]) -> Result<Vec<Address>, ContractError> {
    let offset = word_to_usize(word(data, 0)?)?;
    if offset % WORD != 0 {
        return Err(ContractError::Decode(format!("misaligned offset {}", offset)));
    }
    let head = offset / WORD;
    let len = word_to_usize(word(data, head)?)?;

    (0..len)
        .map(|i| {
            let entry = word(data, head + 1 + i)?;
            if entry[..12].iter().any(|b| *b != 0) {
                return Err(ContractError::Decode("address word has dirty high bytes".to_string()));
            }
            Ok(Address::from_slice(&entry[12..]))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::hex;

    #[test]
    fn test_known_selectors() {
        assert_eq!(selector("totalSupply()"), [0x18, 0x16, 0x0d, 0xdd]);
        assert_eq!(selector("balanceOf(address)"), [0x70, 0xa0, 0x82, 0x31]);
    }

    #[test]
    fn test_encode_address_call() {
        let investor = Address::repeat_byte(0x11);
        let data = encode_address_call("balanceOf(address)", investor);
        assert_eq!(data.len(), 36);
        assert_eq!(&data[..4], &[0x70, 0xa0, 0x82, 0x31]);
        assert_eq!(&data[4..16], &[0u8; 12]);
        assert_eq!(&data[16..], investor.as_slice());
    }

    #[test]
    fn test_decode_uint256() {
        let data = hex::decode(
            "0000000000000000000000000000000000000000000000003d7a858762fb0000",
        )
        .unwrap();
        assert_eq!(
            decode_uint256(&data).unwrap(),
            U256::from(4_430_000_000_000_000_000u128)
        );
        assert!(matches!(
            decode_uint256(&data[..31]),
            Err(ContractError::Decode(_))
        ));
    }

    #[test]
    fn test_decode_address_array() {
        let mut data = Vec::new();
        data.extend_from_slice(&U256::from(32u8).to_be_bytes::<32>());
        data.extend_from_slice(&U256::from(2u8).to_be_bytes::<32>());
        for byte in [0xaa, 0x00] {
            data.extend_from_slice(&[0u8; 12]);
            data.extend_from_slice(Address::repeat_byte(byte).as_slice());
        }

        let decoded = decode_address_array(&data).unwrap();
        assert_eq!(
            decoded,
            vec![Address::repeat_byte(0xaa), Address::ZERO]
        );
    }

    #[test]
    fn test_decode_empty_address_array() {
        let mut data = Vec::new();
        data.extend_from_slice(&U256::from(32u8).to_be_bytes::<32>());
        data.extend_from_slice(&U256::ZERO.to_be_bytes::<32>());
        assert!(decode_address_array(&data).unwrap().is_empty());
    }

    #[test]
    fn test_decode_truncated_address_array() {
        let mut data = Vec::new();
        data.extend_from_slice(&U256::from(32u8).to_be_bytes::<32>());
        data.extend_from_slice(&U256::from(3u8).to_be_bytes::<32>());
        assert!(matches!(
            decode_address_array(&data),
            Err(ContractError::Decode(_))
        ));
    }
}
