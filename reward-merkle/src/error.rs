// Copyright 2025 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use alloy::primitives::{Address, B256};
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised while building, loading or querying reward trees.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum Error {
    // ---------- Caller errors
    #[error("Invalid address {input:?}: {reason}")]
    InvalidAddress { input: String, reason: String },

    #[error("No tree registered for program {0}")]
    UnknownProgram(String),

    #[error("Address {address} is not in the whitelist of program {program_id}")]
    NotFound { program_id: B256, address: Address },

    // ---------- Data integrity errors, fatal to a program's registration
    #[error("Address {address} appears more than once in program {program_id} (entries {first} and {second})")]
    DuplicateEntry {
        program_id: B256,
        address: Address,
        first: usize,
        second: usize,
    },

    #[error("Invalid amount for {address} at row {row}: {reason}")]
    InvalidAmount {
        row: usize,
        address: String,
        reason: String,
    },

    #[error("Entries belong to more than one program: {expected} and {found}")]
    MixedProgramIds { expected: B256, found: B256 },

    #[error("Program {0} is already registered")]
    ProgramAlreadyRegistered(B256),

    #[error("Cannot build a Merkle tree without leaves")]
    EmptyTree,

    // ---------- Internal invariants
    #[error("Index {index} is out of range (length {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Merkle tree failed validation: {0}")]
    InvalidTree(String),

    // ---------- Dump errors
    #[error("Unsupported tree dump format {0:?}")]
    UnsupportedDumpFormat(String),

    #[error("Unsupported leaf encoding {0:?}")]
    UnsupportedLeafEncoding(Vec<String>),

    #[error("Malformed tree dump: {0}")]
    InvalidDump(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
