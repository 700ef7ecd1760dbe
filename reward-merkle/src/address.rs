// Copyright 2025 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::error::{Error, Result};
use alloy::primitives::Address;
use std::str::FromStr;

const ADDRESS_HEX_LEN: usize = 40;

/// Parses an account address into its canonical form.
///
/// Accepts an optional `0x` prefix followed by 40 hex characters. All-lowercase and
/// all-uppercase input is accepted as is. Mixed-case input is treated as EIP-55 and must
/// carry a valid checksum, so that a typo in a checksummed address is rejected instead of
/// silently mapping to another account.
pub fn canonicalize_address(input: &str) -> Result<Address> {
    let invalid = |reason: &str| Error::InvalidAddress {
        input: input.to_string(),
        reason: reason.to_string(),
    };

    let hex_part = input.strip_prefix("0x").unwrap_or(input);

    if hex_part.len() != ADDRESS_HEX_LEN {
        return Err(invalid(&format!(
            "expected {ADDRESS_HEX_LEN} hex chars, got {}",
            hex_part.len()
        )));
    }
    if !hex_part.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid("contains non-hex characters"));
    }

    let address = Address::from_str(hex_part).map_err(|err| invalid(&err.to_string()))?;

    let has_lower = hex_part.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = hex_part.bytes().any(|b| b.is_ascii_uppercase());
    if has_lower && has_upper {
        let checksummed = address.to_checksum(None);
        if &checksummed[2..] != hex_part {
            return Err(invalid("bad EIP-55 checksum"));
        }
    }

    Ok(address)
}

/// Returns true if `input` would be accepted by [`canonicalize_address`].
pub fn is_address(input: &str) -> bool {
    canonicalize_address(input).is_ok()
}

/// Renders an address in its EIP-55 checksummed form.
pub fn checksummed(address: &Address) -> String {
    address.to_checksum(None)
}
