//! Subnet and wildcard mask arithmetic from CIDR prefix lengths.
//!
//! ```
//! use netrelay::mask::{subnet_mask, wildcard_mask};
//!
//! assert_eq!(subnet_mask(24).unwrap(), "255.255.255.0");
//! assert_eq!(wildcard_mask(24).unwrap(), "0.0.0.255");
//! ```

use std::fmt;
use std::net::Ipv4Addr;

use crate::error::SpecError;

/// A CIDR prefix length, guaranteed to be in `1..=32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PrefixLength(u8);

impl PrefixLength {
    /// Validate a prefix length.
    pub fn new(len: u8) -> Result<Self, SpecError> {
        if (1..=32).contains(&len) {
            Ok(Self(len))
        } else {
            Err(SpecError::PrefixOutOfRange { len })
        }
    }

    /// Recover the prefix length from a dotted-quad subnet mask.
    ///
    /// Rejects `0.0.0.0` and masks whose one-bits are not contiguous.
    pub fn from_mask(mask: Ipv4Addr) -> Result<Self, SpecError> {
        let bits = u32::from(mask);
        let len = bits.leading_ones();
        if len == 0 || bits.count_ones() != len {
            return Err(SpecError::InvalidMask {
                token: mask.to_string(),
            });
        }
        Ok(Self(len as u8))
    }

    /// The raw prefix length.
    pub fn get(self) -> u8 {
        self.0
    }

    /// Top `len` bits set.
    pub fn subnet_mask(self) -> Ipv4Addr {
        Ipv4Addr::from(self.mask_bits())
    }

    /// Bottom `32 - len` bits set; the complement of [`subnet_mask`](Self::subnet_mask).
    pub fn wildcard_mask(self) -> Ipv4Addr {
        Ipv4Addr::from(!self.mask_bits())
    }

    fn mask_bits(self) -> u32 {
        u32::MAX << (32 - u32::from(self.0))
    }
}

impl fmt::Display for PrefixLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Dotted-quad subnet mask for `prefix_length`.
pub fn subnet_mask(prefix_length: u8) -> Result<String, SpecError> {
    Ok(PrefixLength::new(prefix_length)?.subnet_mask().to_string())
}

/// Dotted-quad wildcard mask for `prefix_length`.
pub fn wildcard_mask(prefix_length: u8) -> Result<String, SpecError> {
    Ok(PrefixLength::new(prefix_length)?.wildcard_mask().to_string())
}
