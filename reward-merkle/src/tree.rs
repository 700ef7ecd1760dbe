// Copyright 2025 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

//! Merkle tree over reward entries.
//!
//! The layout follows OpenZeppelin's `StandardMerkleTree`, which is what the on-chain
//! verifier expects:
//! - The tree is a flat array of `2n - 1` nodes in heap order: the root is at `0` and the
//!   children of node `i` are at `2i + 1` and `2i + 2`.
//! - Leaf `i` (in build order) is stored at `len - 1 - i`. This fills the bottom of the
//!   tree right to left, so a leaf count that is not a power of two yields a complete
//!   binary tree with no padding leaves and no duplicated nodes.
//! - Internal nodes are `keccak256(min(a, b) || max(a, b))`, so a verifier never needs to
//!   know whether a sibling was on the left or on the right.

use crate::error::{Error, Result};
use crate::leaf::RewardEntry;
use alloy::primitives::{Keccak256, B256};

/// Options for [`RewardMerkleTree::of`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TreeOptions {
    /// Order leaves by hash before building. The resulting root does not depend on the
    /// order of the whitelist rows.
    pub sort_leaves: bool,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self { sort_leaves: true }
    }
}

/// Order independent combination of two nodes.
pub fn hash_pair(a: &B256, b: &B256) -> B256 {
    let (first, second) = if a <= b { (a, b) } else { (b, a) };
    let mut hasher = Keccak256::new();
    hasher.update(first);
    hasher.update(second);
    hasher.finalize()
}

fn left_child_index(i: usize) -> usize {
    2 * i + 1
}

fn right_child_index(i: usize) -> usize {
    2 * i + 2
}

fn parent_index(i: usize) -> usize {
    (i - 1) / 2
}

fn sibling_index(i: usize) -> usize {
    if i % 2 == 1 {
        i + 1
    } else {
        i - 1
    }
}

fn is_internal_node(tree: &[B256], i: usize) -> bool {
    left_child_index(i) < tree.len()
}

/// Leaves occupy the tail of the node array, anything before it is out of range for a proof.
fn check_leaf_node(tree: &[B256], i: usize) -> Result<()> {
    if i >= tree.len() || is_internal_node(tree, i) {
        return Err(Error::IndexOutOfRange {
            index: i,
            len: tree.len(),
        });
    }
    Ok(())
}

/// Builds the node array for `leaves`, see the module docs for the layout.
pub fn make_merkle_tree(leaves: &[B256]) -> Result<Vec<B256>> {
    if leaves.is_empty() {
        return Err(Error::EmptyTree);
    }

    let len = 2 * leaves.len() - 1;
    let mut tree = vec![B256::ZERO; len];

    for (i, leaf) in leaves.iter().enumerate() {
        tree[len - 1 - i] = *leaf;
    }
    for i in (0..len - leaves.len()).rev() {
        tree[i] = hash_pair(&tree[left_child_index(i)], &tree[right_child_index(i)]);
    }

    Ok(tree)
}

/// Sibling hashes from the leaf at `tree_index` up to, but excluding, the root.
///
/// # Errors
///
/// - `IndexOutOfRange` if `tree_index` is outside the node array or points to an internal node
pub fn get_proof(tree: &[B256], tree_index: usize) -> Result<Vec<B256>> {
    check_leaf_node(tree, tree_index)?;

    let mut proof = Vec::new();
    let mut i = tree_index;
    while i > 0 {
        proof.push(tree[sibling_index(i)]);
        i = parent_index(i);
    }
    Ok(proof)
}

/// Folds `proof` over `leaf`, returning the root it implies.
pub fn process_proof(leaf: B256, proof: &[B256]) -> B256 {
    proof
        .iter()
        .fold(leaf, |node, sibling| hash_pair(&node, sibling))
}

/// What a verifier holding only `root` does with a leaf and its proof.
pub fn verify_proof(root: &B256, leaf: B256, proof: &[B256]) -> bool {
    process_proof(leaf, proof) == *root
}

/// Checks every internal node against its children.
pub fn is_valid_merkle_tree(tree: &[B256]) -> bool {
    if tree.is_empty() {
        return false;
    }
    (0..tree.len())
        .take_while(|&i| is_internal_node(tree, i))
        .all(|i| {
            let right = right_child_index(i);
            right < tree.len() && tree[i] == hash_pair(&tree[left_child_index(i)], &tree[right])
        })
}

/// Draws the node array as an indented tree, one node per line.
pub fn render_merkle_tree(tree: &[B256]) -> Result<String> {
    if tree.is_empty() {
        return Err(Error::EmptyTree);
    }

    let mut lines = Vec::with_capacity(tree.len());
    // (node, path) where each path element is true if more siblings follow
    let mut stack: Vec<(usize, Vec<bool>)> = vec![(0, Vec::new())];

    while let Some((i, path)) = stack.pop() {
        let mut line = String::new();
        if let Some((last, ancestors)) = path.split_last() {
            for &more in ancestors {
                line.push_str(if more { "│  " } else { "   " });
            }
            line.push_str(if *last { "├─ " } else { "└─ " });
        }
        line.push_str(&format!("{i}) {}", tree[i]));
        lines.push(line);

        if right_child_index(i) < tree.len() {
            let mut right = path.clone();
            right.push(false);
            stack.push((right_child_index(i), right));
            let mut left = path;
            left.push(true);
            stack.push((left_child_index(i), left));
        }
    }

    Ok(lines.join("\n"))
}

/// A whitelist entry together with the position of its leaf in the node array.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TreeValue {
    pub entry: RewardEntry,
    pub tree_index: usize,
}

/// A Merkle tree built from reward entries.
///
/// Entries keep their insertion order, so an entry index refers to the same row of the
/// whitelist regardless of where its leaf ended up in the tree. The tree is immutable:
/// changing the whitelist means building a new tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RewardMerkleTree {
    tree: Vec<B256>,
    values: Vec<TreeValue>,
}

impl RewardMerkleTree {
    /// Build a tree from entries.
    ///
    /// # Errors
    ///
    /// - `EmptyTree` if `entries` is empty
    ///
    /// # Example
    ///
    /// ```ignore
    /// let id = program_id("rewardProgram1");
    /// let entries = vec![
    ///     RewardEntry::new(id, canonicalize_address("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed")?, U256::from(100)),
    ///     RewardEntry::new(id, canonicalize_address("0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359")?, U256::from(200)),
    /// ];
    ///
    /// let tree = RewardMerkleTree::of(entries, TreeOptions::default())?;
    /// println!("Root: {}", tree.root());
    /// ```
    pub fn of(entries: Vec<RewardEntry>, options: TreeOptions) -> Result<Self> {
        let mut hashed: Vec<(usize, B256)> = entries
            .iter()
            .enumerate()
            .map(|(value_index, entry)| (value_index, entry.leaf_hash()))
            .collect();

        if options.sort_leaves {
            hashed.sort_by(|a, b| a.1.cmp(&b.1));
        }

        let leaves: Vec<B256> = hashed.iter().map(|(_, hash)| *hash).collect();
        let tree = make_merkle_tree(&leaves)?;

        let mut values: Vec<TreeValue> = entries
            .into_iter()
            .map(|entry| TreeValue {
                entry,
                tree_index: 0,
            })
            .collect();
        for (leaf_index, (value_index, _)) in hashed.iter().enumerate() {
            values[*value_index].tree_index = tree.len() - 1 - leaf_index;
        }

        debug!(
            "Built Merkle tree with {} leaves, root {}",
            values.len(),
            tree[0]
        );

        Ok(Self { tree, values })
    }

    /// Assemble a tree from parts without rehashing. Callers check the shape.
    pub(crate) fn from_parts(tree: Vec<B256>, values: Vec<TreeValue>) -> Self {
        Self { tree, values }
    }

    /// The root hash, as committed on-chain.
    pub fn root(&self) -> B256 {
        self.tree[0]
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The node array, see the module docs for its layout.
    pub fn nodes(&self) -> &[B256] {
        &self.tree
    }

    pub fn values(&self) -> &[TreeValue] {
        &self.values
    }

    /// Entries in insertion order with their index.
    pub fn entries(&self) -> impl Iterator<Item = (usize, &RewardEntry)> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(|(index, value)| (index, &value.entry))
    }

    pub fn entry(&self, entry_index: usize) -> Option<&RewardEntry> {
        self.values.get(entry_index).map(|value| &value.entry)
    }

    fn value(&self, entry_index: usize) -> Result<&TreeValue> {
        self.values.get(entry_index).ok_or(Error::IndexOutOfRange {
            index: entry_index,
            len: self.values.len(),
        })
    }

    /// The leaf stored for the entry at `entry_index`.
    pub fn leaf_hash(&self, entry_index: usize) -> Result<B256> {
        let value = self.value(entry_index)?;
        Ok(self.tree[value.tree_index])
    }

    /// Generate the proof for the entry at `entry_index` (insertion order).
    ///
    /// # Errors
    ///
    /// - `IndexOutOfRange` if `entry_index >= len()`
    pub fn proof(&self, entry_index: usize) -> Result<Vec<B256>> {
        let value = self.value(entry_index)?;
        get_proof(&self.tree, value.tree_index)
    }

    /// Check `proof` for the entry at `entry_index` against this tree's root.
    pub fn verify(&self, entry_index: usize, proof: &[B256]) -> Result<bool> {
        let value = self.value(entry_index)?;
        Ok(verify_proof(&self.root(), value.entry.leaf_hash(), proof))
    }

    /// Full integrity check: rehashes every entry and every internal node.
    ///
    /// Loading a dump skips this, call it when the dump source is not trusted.
    pub fn validate(&self) -> Result<()> {
        for (entry_index, value) in self.values.iter().enumerate() {
            check_leaf_node(&self.tree, value.tree_index)?;
            if value.entry.leaf_hash() != self.tree[value.tree_index] {
                return Err(Error::InvalidTree(format!(
                    "leaf of entry {entry_index} does not match node {}",
                    value.tree_index
                )));
            }
        }
        if !is_valid_merkle_tree(&self.tree) {
            return Err(Error::InvalidTree(
                "internal node does not match its children".to_string(),
            ));
        }
        Ok(())
    }

    /// See [`render_merkle_tree`].
    pub fn render(&self) -> Result<String> {
        render_merkle_tree(&self.tree)
    }
}
