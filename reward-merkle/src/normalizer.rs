// Copyright 2025 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

//! Turns raw whitelist rows into canonical [`RewardEntry`] values.
//!
//! A whitelist file maps each program name to a list of `[address, amount]` pairs:
//!
//! ```json
//! { "rewardProgram1": [["0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed", 100]] }
//! ```
//!
//! Rows whose address cannot be parsed are skipped with a warning. A bad amount or an
//! address listed twice fails the whole program, since either means the file itself is wrong.

use crate::address::canonicalize_address;
use crate::amount::parse_amount;
use crate::error::{Error, Result};
use crate::leaf::RewardEntry;
use alloy::primitives::{Address, B256, U256};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Program name to raw rows, as read from a whitelist file.
pub type Whitelist = BTreeMap<String, Vec<Value>>;

/// Reads a whitelist file.
pub fn read_whitelist(path: &Path) -> Result<Whitelist> {
    let reader = BufReader::new(File::open(path)?);
    let whitelist: Whitelist = serde_json::from_reader(reader)?;
    debug!(
        "Read {} program(s) from whitelist {path:?}",
        whitelist.len()
    );
    Ok(whitelist)
}

/// A row that was skipped during normalization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RejectedRow {
    /// Position of the row in the program's list
    pub row: usize,
    pub input: String,
    pub reason: String,
}

/// Outcome of normalizing one program's rows.
#[derive(Clone, Debug)]
pub struct NormalizedWhitelist {
    pub program_id: B256,
    /// Accepted entries, in input order
    pub entries: Vec<RewardEntry>,
    pub rejected: Vec<RejectedRow>,
    pub total_amount: U256,
}

impl NormalizedWhitelist {
    pub fn accepted_count(&self) -> usize {
        self.entries.len()
    }
}

/// Validates and canonicalizes the rows of one program.
///
/// # Errors
///
/// * [`Error::InvalidAmount`] if a row with a valid address carries an amount that is not a
///   non-negative integer fitting in `uint256`, or if the total overflows `uint256`.
/// * [`Error::DuplicateEntry`] if the same account appears twice, in any letter case.
pub fn normalize_rows(program_id: B256, rows: &[Value]) -> Result<NormalizedWhitelist> {
    let mut entries = Vec::with_capacity(rows.len());
    let mut rejected = Vec::new();
    let mut seen: HashMap<Address, usize> = HashMap::with_capacity(rows.len());
    let mut total_amount = U256::ZERO;

    for (row, raw) in rows.iter().enumerate() {
        let Some((raw_address, raw_amount)) = split_row(raw) else {
            warn!("Skipping row {row} of program {program_id}: expected [address, amount], got {raw}");
            rejected.push(RejectedRow {
                row,
                input: raw.to_string(),
                reason: "expected an [address, amount] pair".to_string(),
            });
            continue;
        };

        let address = match canonicalize_address(raw_address) {
            Ok(address) => address,
            Err(err) => {
                warn!("Skipping row {row} of program {program_id}: {err}");
                rejected.push(RejectedRow {
                    row,
                    input: raw_address.to_string(),
                    reason: err.to_string(),
                });
                continue;
            }
        };

        let amount = parse_amount(raw_amount).map_err(|reason| Error::InvalidAmount {
            row,
            address: raw_address.to_string(),
            reason,
        })?;

        let entry_index = entries.len();
        if let Some(first) = seen.insert(address, entry_index) {
            return Err(Error::DuplicateEntry {
                program_id,
                address,
                first,
                second: entry_index,
            });
        }

        total_amount = total_amount
            .checked_add(amount)
            .ok_or_else(|| Error::InvalidAmount {
                row,
                address: raw_address.to_string(),
                reason: "total amount overflows uint256".to_string(),
            })?;

        entries.push(RewardEntry::new(program_id, address, amount));
    }

    info!(
        "Program {program_id}: accepted {} entries totalling {total_amount}, rejected {}",
        entries.len(),
        rejected.len()
    );

    Ok(NormalizedWhitelist {
        program_id,
        entries,
        rejected,
        total_amount,
    })
}

fn split_row(raw: &Value) -> Option<(&str, &Value)> {
    match raw.as_array()?.as_slice() {
        [Value::String(address), amount] => Some((address.as_str(), amount)),
        _ => None,
    }
}
