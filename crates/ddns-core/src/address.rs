//! Canonical IPv4 addresses
//!
//! An [`Address`] is only ever built from text that passes strict
//! dotted-quad validation: four decimal octets in `[0, 255]`, no leading
//! zeros, no signs. Surrounding whitespace is tolerated and dropped. The
//! `Display` form is the canonical form, so two addresses compare equal
//! exactly when their canonical strings are equal.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use crate::error::Error;

/// A validated, canonical IPv4 address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address(Ipv4Addr);

/// Why a string was refused as an [`Address`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("empty address")]
    Empty,
    #[error("expected 4 octets, found {0}")]
    OctetCount(usize),
    #[error("octet {0:?} is not a decimal number")]
    NotDecimal(String),
    #[error("octet {0:?} has a leading zero")]
    LeadingZero(String),
    #[error("octet {0:?} is out of range")]
    OutOfRange(String),
}

impl Address {
    /// Validate and canonicalize an IPv4 string
    pub fn parse(input: &str) -> Result<Self, AddressError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(AddressError::Empty);
        }

        let parts: Vec<&str> = trimmed.split('.').collect();
        if parts.len() != 4 {
            return Err(AddressError::OctetCount(parts.len()));
        }

        let mut octets = [0u8; 4];
        for (slot, part) in octets.iter_mut().zip(&parts) {
            *slot = parse_octet(part)?;
        }

        Ok(Self(Ipv4Addr::from(octets)))
    }

    pub fn octets(&self) -> [u8; 4] {
        self.0.octets()
    }
}

fn parse_octet(part: &str) -> Result<u8, AddressError> {
    if part.is_empty() || part.len() > 3 || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AddressError::NotDecimal(part.to_string()));
    }
    if part.len() > 1 && part.starts_with('0') {
        return Err(AddressError::LeadingZero(part.to_string()));
    }
    part.parse::<u8>()
        .map_err(|_| AddressError::OutOfRange(part.to_string()))
}

impl From<Ipv4Addr> for Address {
    fn from(ip: Ipv4Addr) -> Self {
        Self(ip)
    }
}

impl From<Address> for Ipv4Addr {
    fn from(address: Address) -> Self {
        address.0
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Address::parse(&raw).map_err(serde::de::Error::custom)
    }
}

impl From<AddressError> for Error {
    fn from(err: AddressError) -> Self {
        Error::probe_invalid_address(err.to_string())
    }
}

/// The address currently published in the zone
///
/// A missing record is a legitimate state: it forces the next write to
/// create the record. It displays as `<none>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Published {
    Absent,
    Present(Address),
}

impl Published {
    pub fn address(&self) -> Option<Address> {
        match self {
            Published::Absent => None,
            Published::Present(address) => Some(*address),
        }
    }
}

impl From<Address> for Published {
    fn from(address: Address) -> Self {
        Published::Present(address)
    }
}

impl fmt::Display for Published {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Published::Absent => f.write_str("<none>"),
            Published::Present(address) => address.fmt(f),
        }
    }
}

impl Serialize for Published {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
