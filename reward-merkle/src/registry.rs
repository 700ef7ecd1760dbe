// Copyright 2025 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::error::{Error, Result};
use crate::leaf::program_id;
use crate::normalizer::normalize_rows;
use crate::tree::{RewardMerkleTree, TreeOptions};
use alloy::primitives::{Address, B256, U256};
use serde_json::Value;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// A program's tree together with its address index.
#[derive(Clone, Debug)]
pub struct RegisteredProgram {
    pub program_id: B256,
    /// Human readable name, when the program was registered from a whitelist
    pub name: Option<String>,
    pub tree: RewardMerkleTree,
    index: HashMap<Address, usize>,
    pub total_amount: U256,
}

impl RegisteredProgram {
    /// Builds the address index in a single pass over the tree's entries.
    fn index(name: Option<String>, tree: RewardMerkleTree) -> Result<Self> {
        let mut entries = tree.entries();
        let Some((_, first)) = entries.next() else {
            return Err(Error::EmptyTree);
        };
        let program_id = first.program_id;

        let mut index = HashMap::with_capacity(tree.len());
        index.insert(first.address, 0);
        let mut total_amount = first.amount;

        for (entry_index, entry) in entries {
            if entry.program_id != program_id {
                return Err(Error::MixedProgramIds {
                    expected: program_id,
                    found: entry.program_id,
                });
            }
            if let Some(first) = index.insert(entry.address, entry_index) {
                return Err(Error::DuplicateEntry {
                    program_id,
                    address: entry.address,
                    first,
                    second: entry_index,
                });
            }
            total_amount = total_amount
                .checked_add(entry.amount)
                .ok_or_else(|| Error::InvalidAmount {
                    row: entry_index,
                    address: entry.address.to_string(),
                    reason: "total amount overflows uint256".to_string(),
                })?;
        }

        Ok(Self {
            program_id,
            name,
            tree,
            index,
            total_amount,
        })
    }

    /// Insertion-order position of `address` in this program, if whitelisted.
    pub fn index_of(&self, address: &Address) -> Option<usize> {
        self.index.get(address).copied()
    }

    pub fn root(&self) -> B256 {
        self.tree.root()
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Name if known, otherwise the program id.
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| self.program_id.to_string())
    }
}

/// All programs served by this process, keyed by program id.
///
/// Populated once at startup, then shared read-only.
#[derive(Clone, Debug, Default)]
pub struct ProgramRegistry {
    programs: HashMap<B256, RegisteredProgram>,
}

impl ProgramRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an already built tree.
    ///
    /// The program only becomes visible once its index is complete; on error the registry
    /// is left untouched.
    ///
    /// # Errors
    ///
    /// * [`Error::EmptyTree`] if the tree has no entries.
    /// * [`Error::MixedProgramIds`] if entries carry different program ids.
    /// * [`Error::DuplicateEntry`] if an address appears twice.
    /// * [`Error::InvalidAmount`] if the amounts add up to more than `uint256` holds.
    /// * [`Error::ProgramAlreadyRegistered`] if the program id is already present.
    pub fn register(
        &mut self,
        name: Option<String>,
        tree: RewardMerkleTree,
    ) -> Result<&RegisteredProgram> {
        let program = RegisteredProgram::index(name, tree)?;

        match self.programs.entry(program.program_id) {
            Entry::Occupied(_) => Err(Error::ProgramAlreadyRegistered(program.program_id)),
            Entry::Vacant(slot) => {
                info!(
                    "Registered program {} ({}) with {} entries, root {}",
                    program.display_name(),
                    program.program_id,
                    program.len(),
                    program.root()
                );
                Ok(slot.insert(program))
            }
        }
    }

    /// Normalizes the raw rows of program `name`, builds its tree and registers it.
    pub fn register_whitelist(&mut self, name: &str, rows: &[Value]) -> Result<&RegisteredProgram> {
        let id = program_id(name);
        if self.programs.contains_key(&id) {
            return Err(Error::ProgramAlreadyRegistered(id));
        }

        let normalized = normalize_rows(id, rows)?;
        let tree = RewardMerkleTree::of(normalized.entries, TreeOptions::default())?;
        self.register(Some(name.to_string()), tree)
    }

    pub fn get(&self, program_id: &B256) -> Option<&RegisteredProgram> {
        self.programs.get(program_id)
    }

    /// Registered programs, in no particular order.
    pub fn programs(&self) -> impl Iterator<Item = &RegisteredProgram> {
        self.programs.values()
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }
}
