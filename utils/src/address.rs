//! Address encoding
//!
//! Addresses are Bech32-like with a `:` separator between the network
//! prefix and the data part, and an 8-symbol BCH checksum over GF(2^5).
//! The version byte is prepended to the payload before the 8-to-5 bit
//! repacking.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const CHARSET: &[u8] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";
const CHECKSUM_LENGTH: usize = 8;
const GENERATOR: [u64; 5] = [0x98f2bc8e61, 0x79b76d99e2, 0xf33e5fb3c4, 0xae2eabe2a8, 0x1e4f43e470];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("address is too short to carry a checksum")]
    TooShort,

    #[error("invalid character '{0}' in address")]
    InvalidCharacter(char),

    #[error("address mixes upper and lower case")]
    MixedCase,

    #[error("missing ':' prefix separator")]
    MissingSeparator,

    #[error("unknown address prefix '{0}'")]
    UnknownPrefix(String),

    #[error("checksum verification failed")]
    BadChecksum,

    #[error("address payload is empty")]
    EmptyPayload,
}

/// The network an address belongs to; doubles as the human-readable prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Prefix {
    Mainnet,
    Testnet,
    Devnet,
    Simnet,
}

impl Prefix {
    pub fn as_str(&self) -> &'static str {
        match self {
            Prefix::Mainnet => "vexa",
            Prefix::Testnet => "vexatest",
            Prefix::Devnet => "vexadev",
            Prefix::Simnet => "vexasim",
        }
    }
}

impl FromStr for Prefix {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vexa" => Ok(Prefix::Mainnet),
            "vexatest" => Ok(Prefix::Testnet),
            "vexadev" => Ok(Prefix::Devnet),
            "vexasim" => Ok(Prefix::Simnet),
            other => Err(AddressError::UnknownPrefix(other.to_string())),
        }
    }
}

/// A decoded address: network prefix, version byte and raw payload
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address {
    pub prefix: Prefix,
    pub version: u8,
    pub payload: Vec<u8>,
}

impl Address {
    pub fn new(prefix: Prefix, version: u8, payload: Vec<u8>) -> Self {
        Self { prefix, version, payload }
    }

    /// Encodes to the canonical lowercase string form
    pub fn encode(&self) -> String {
        let mut data = Vec::with_capacity(self.payload.len() + 1);
        data.push(self.version);
        data.extend_from_slice(&self.payload);

        let mut five_bit = convert_8_to_5(&data);
        let checksum = calculate_checksum(self.prefix.as_str(), &five_bit);
        for i in 0..CHECKSUM_LENGTH {
            five_bit.push(((checksum >> (5 * (CHECKSUM_LENGTH - 1 - i))) & 31) as u8);
        }

        let mut out = String::with_capacity(self.prefix.as_str().len() + 1 + five_bit.len());
        out.push_str(self.prefix.as_str());
        out.push(':');
        for value in five_bit {
            out.push(CHARSET[value as usize] as char);
        }
        out
    }

    /// Decodes an address string. Accepts all-lowercase or all-uppercase
    /// input; mixed case is rejected.
    pub fn decode(encoded: &str) -> Result<Self, AddressError> {
        if encoded.len() < CHECKSUM_LENGTH + 2 {
            return Err(AddressError::TooShort);
        }
        if let Some(bad) = encoded.chars().find(|c| !c.is_ascii() || (*c as u8) < 33 || (*c as u8) > 126) {
            return Err(AddressError::InvalidCharacter(bad));
        }

        let lower = encoded.to_lowercase();
        let upper = encoded.to_uppercase();
        if encoded != lower && encoded != upper {
            return Err(AddressError::MixedCase);
        }
        let encoded = lower;

        let colon = encoded.rfind(':').ok_or(AddressError::MissingSeparator)?;
        if colon == 0 || colon + CHECKSUM_LENGTH + 1 > encoded.len() {
            return Err(AddressError::MissingSeparator);
        }
        let prefix_str = &encoded[..colon];
        let data_str = &encoded[colon + 1..];

        let mut values = Vec::with_capacity(data_str.len());
        for c in data_str.bytes() {
            let index = CHARSET.iter().position(|&s| s == c).ok_or(AddressError::InvalidCharacter(c as char))?;
            values.push(index as u8);
        }

        if !verify_checksum(prefix_str, &values) {
            return Err(AddressError::BadChecksum);
        }

        let prefix = Prefix::from_str(prefix_str)?;
        let data = convert_5_to_8(&values[..values.len() - CHECKSUM_LENGTH]);
        let (version, payload) = data.split_first().ok_or(AddressError::EmptyPayload)?;
        Ok(Self { prefix, version: *version, payload: payload.to_vec() })
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

/// The BCH checksum polynomial over GF(2^5)
fn poly_mod(values: &[u8]) -> u64 {
    let mut checksum: u64 = 1;
    for &value in values {
        let top_bits = checksum >> 35;
        checksum = ((checksum & 0x07_ffff_ffff) << 5) ^ value as u64;
        for (i, generator) in GENERATOR.iter().enumerate() {
            if (top_bits >> i) & 1 == 1 {
                checksum ^= generator;
            }
        }
    }
    checksum ^ 1
}

/// Lower 5 bits of every prefix character participate in the checksum
fn prefix_to_uint5(prefix: &str) -> Vec<u8> {
    prefix.bytes().map(|b| b & 0x1f).collect()
}

fn calculate_checksum(prefix: &str, payload: &[u8]) -> u64 {
    let mut values = prefix_to_uint5(prefix);
    values.push(0);
    values.extend_from_slice(payload);
    values.extend_from_slice(&[0; CHECKSUM_LENGTH]);
    poly_mod(&values)
}

fn verify_checksum(prefix: &str, payload_with_checksum: &[u8]) -> bool {
    let mut values = prefix_to_uint5(prefix);
    values.push(0);
    values.extend_from_slice(payload_with_checksum);
    poly_mod(&values) == 0
}

/// Regroups 8-bit bytes into 5-bit symbols, padding the tail
fn convert_8_to_5(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() * 8 / 5 + 1);
    let mut acc: u32 = 0;
    let mut bits: u32 = 0;
    for &byte in data {
        acc = (acc << 8) | byte as u32;
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            out.push(((acc >> bits) & 31) as u8);
        }
    }
    if bits > 0 {
        out.push(((acc << (5 - bits)) & 31) as u8);
    }
    out
}

/// Regroups 5-bit symbols back into bytes, dropping the padding remainder
fn convert_5_to_8(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() * 5 / 8);
    let mut acc: u32 = 0;
    let mut bits: u32 = 0;
    for &value in data {
        acc = (acc << 5) | value as u32;
        bits += 5;
        while bits >= 8 {
            bits -= 8;
            out.push(((acc >> bits) & 0xff) as u8);
        }
    }
    out
}
