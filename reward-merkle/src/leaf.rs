// Copyright 2025 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use alloy::primitives::{keccak256, Address, B256, U256};
use alloy::sol_types::SolValue;

/// Solidity types of the leaf tuple, in encoding order.
///
/// Recorded in every tree dump so a verifier can rebuild the exact leaf encoding.
pub const LEAF_ENCODING: [&str; 3] = ["bytes32", "address", "uint256"];

/// Derives the id of a reward program from its name: `keccak256(utf8(name))`.
pub fn program_id(name: &str) -> B256 {
    keccak256(name.as_bytes())
}

/// One whitelisted allotment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RewardEntry {
    pub program_id: B256,
    /// Canonical address
    pub address: Address,
    pub amount: U256,
}

impl RewardEntry {
    pub fn new(program_id: B256, address: Address, amount: U256) -> Self {
        Self {
            program_id,
            address,
            amount,
        }
    }

    /// Leaf hash of this entry, see [`encode_leaf`].
    pub fn leaf_hash(&self) -> B256 {
        encode_leaf(self.program_id, self.address, self.amount)
    }
}

/// ABI encoding of `(bytes32, address, uint256)`.
///
/// Three static 32-byte words: the program id as is, the address left padded with zeros
/// and the amount big-endian.
pub fn abi_encode_entry(program_id: B256, address: Address, amount: U256) -> Vec<u8> {
    (program_id, address, amount).abi_encode_params()
}

/// Computes the leaf hash `keccak256(keccak256(abi.encode(program_id, address, amount)))`.
///
/// Hashing twice keeps a 64-byte internal node preimage from ever being accepted as a leaf.
pub fn encode_leaf(program_id: B256, address: Address, amount: U256) -> B256 {
    let inner = keccak256(abi_encode_entry(program_id, address, amount));
    keccak256(inner)
}
