// Copyright 2025 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

//! Tree dumps in the `standard-v1` JSON format of `@openzeppelin/merkle-tree`.
//!
//! A dump carries the leaf encoding, the full node array and every entry with the index of
//! its leaf, so a tree can be reloaded without rehashing anything.

use crate::address::{canonicalize_address, checksummed};
use crate::amount::JsonAmount;
use crate::error::{Error, Result};
use crate::leaf::{RewardEntry, LEAF_ENCODING};
use crate::tree::{RewardMerkleTree, TreeValue};
use alloy::primitives::B256;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;

/// The only dump format produced and accepted.
pub const STANDARD_V1_FORMAT: &str = "standard-v1";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeDump {
    pub format: String,
    pub leaf_encoding: Vec<String>,
    pub tree: Vec<B256>,
    pub values: Vec<DumpValue>,
}

/// One entry: `[program id, checksummed address, amount]` and the index of its leaf.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DumpValue {
    pub value: (B256, String, JsonAmount),
    pub tree_index: usize,
}

impl RewardMerkleTree {
    /// Capture this tree as a `standard-v1` dump.
    pub fn dump(&self) -> TreeDump {
        TreeDump {
            format: STANDARD_V1_FORMAT.to_string(),
            leaf_encoding: LEAF_ENCODING.iter().map(|s| s.to_string()).collect(),
            tree: self.nodes().to_vec(),
            values: self
                .values()
                .iter()
                .map(|value| DumpValue {
                    value: (
                        value.entry.program_id,
                        checksummed(&value.entry.address),
                        JsonAmount(value.entry.amount),
                    ),
                    tree_index: value.tree_index,
                })
                .collect(),
        }
    }

    /// Rebuild a tree from a dump without rehashing.
    ///
    /// Checks the format, the leaf encoding and the shape of the node array, and that every
    /// entry points at a distinct leaf. Use [`RewardMerkleTree::validate`] afterwards to also
    /// check the hashes.
    pub fn load(dump: TreeDump) -> Result<Self> {
        if dump.format != STANDARD_V1_FORMAT {
            return Err(Error::UnsupportedDumpFormat(dump.format));
        }
        if dump.leaf_encoding != LEAF_ENCODING {
            return Err(Error::UnsupportedLeafEncoding(dump.leaf_encoding));
        }
        if dump.values.is_empty() {
            return Err(Error::EmptyTree);
        }
        let expected_nodes = 2 * dump.values.len() - 1;
        if dump.tree.len() != expected_nodes {
            return Err(Error::InvalidDump(format!(
                "{} values need {expected_nodes} nodes, found {}",
                dump.values.len(),
                dump.tree.len()
            )));
        }

        let first_leaf = dump.tree.len() - dump.values.len();
        let mut seen = HashSet::with_capacity(dump.values.len());
        let mut values = Vec::with_capacity(dump.values.len());

        for (entry_index, value) in dump.values.into_iter().enumerate() {
            let tree_index = value.tree_index;
            if tree_index < first_leaf || tree_index >= dump.tree.len() {
                return Err(Error::InvalidDump(format!(
                    "entry {entry_index} points at node {tree_index}, which is not a leaf"
                )));
            }
            if !seen.insert(tree_index) {
                return Err(Error::InvalidDump(format!(
                    "entry {entry_index} shares leaf {tree_index} with another entry"
                )));
            }

            let (program_id, address, amount) = value.value;
            let address = canonicalize_address(&address)
                .map_err(|err| Error::InvalidDump(format!("entry {entry_index}: {err}")))?;

            values.push(TreeValue {
                entry: RewardEntry::new(program_id, address, amount.0),
                tree_index,
            });
        }

        Ok(RewardMerkleTree::from_parts(dump.tree, values))
    }

    /// Write the dump of this tree to `path` as JSON.
    ///
    /// Writes to a temporary file next to `path` first, then renames it into place.
    pub fn write_dump(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string(&self.dump())?;

        let temp_path = path.with_extension("json.tmp");
        let mut file = File::create(&temp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
        std::fs::rename(&temp_path, path)?;

        info!("Wrote tree dump with root {} to {path:?}", self.root());
        Ok(())
    }

    /// Read and [`load`](Self::load) a dump from `path`.
    pub fn read_dump(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let dump: TreeDump = serde_json::from_reader(reader)?;
        let tree = Self::load(dump)?;
        debug!("Loaded tree with root {} from {path:?}", tree.root());
        Ok(tree)
    }
}
