// Copyright 2025 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

//! Merkle proofs for reward whitelists.
//!
//! Trees, leaves and proofs are compatible with OpenZeppelin's `StandardMerkleTree` over the
//! leaf tuple `(bytes32 programId, address account, uint256 amount)`, so a root published
//! on-chain can be checked with `MerkleProof.verify`.

#[macro_use]
extern crate tracing;

pub mod address;
pub mod amount;
pub mod dump;
pub mod error;
pub mod leaf;
pub mod normalizer;
pub mod query;
pub mod registry;
pub mod tree;

pub use address::{canonicalize_address, checksummed, is_address};
pub use amount::JsonAmount;
pub use dump::{DumpValue, TreeDump, STANDARD_V1_FORMAT};
pub use error::{Error, Result};
pub use leaf::{encode_leaf, program_id, RewardEntry, LEAF_ENCODING};
pub use normalizer::{normalize_rows, read_whitelist, NormalizedWhitelist, RejectedRow, Whitelist};
pub use query::{ProgramProof, ProofQueryService, ProofResponse};
pub use registry::{ProgramRegistry, RegisteredProgram};
pub use tree::{hash_pair, verify_proof, RewardMerkleTree, TreeOptions};

pub use alloy::primitives::{Address, B256, U256};
