// Copyright 2025 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::address::canonicalize_address;
use crate::amount::JsonAmount;
use crate::error::{Error, Result};
use crate::registry::ProgramRegistry;
use alloy::primitives::B256;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;

/// Everything a claimant needs to prove an allotment on-chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofResponse {
    pub proof: Vec<B256>,
    pub reward_amount: JsonAmount,
    pub program_id: B256,
}

/// A proof in one of the programs an address is whitelisted in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramProof {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub response: ProofResponse,
}

/// Answers proof lookups against a populated [`ProgramRegistry`].
#[derive(Clone, Debug)]
pub struct ProofQueryService {
    registry: Arc<ProgramRegistry>,
}

impl ProofQueryService {
    pub fn new(registry: Arc<ProgramRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ProgramRegistry {
        &self.registry
    }

    /// Look up the proof and amount of `address` in program `program_id`.
    ///
    /// The address may be in any letter case, with or without `0x`. The program id is the
    /// `0x` prefixed hex form of `keccak256(name)`.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidAddress`] if `address` is not an account address.
    /// * [`Error::UnknownProgram`] if `program_id` is malformed or not registered.
    /// * [`Error::NotFound`] if the address is not whitelisted in that program.
    pub fn query_proof(&self, program_id: &str, address: &str) -> Result<ProofResponse> {
        let address = canonicalize_address(address)?;

        let program = B256::from_str(program_id.trim())
            .ok()
            .and_then(|id| self.registry.get(&id))
            .ok_or_else(|| Error::UnknownProgram(program_id.to_string()))?;

        let entry_index = program.index_of(&address).ok_or(Error::NotFound {
            program_id: program.program_id,
            address,
        })?;

        let proof = program.tree.proof(entry_index)?;
        let entry = program
            .tree
            .entry(entry_index)
            .ok_or(Error::IndexOutOfRange {
                index: entry_index,
                len: program.len(),
            })?;

        trace!(
            "Served proof of {} nodes for {address} in program {}",
            proof.len(),
            program.program_id
        );

        Ok(ProofResponse {
            proof,
            reward_amount: JsonAmount(entry.amount),
            program_id: program.program_id,
        })
    }

    /// Proofs of `address` in every program that whitelists it, ordered by program id.
    ///
    /// An address found in no program yields an empty list.
    pub fn query_all(&self, address: &str) -> Result<Vec<ProgramProof>> {
        let address = canonicalize_address(address)?;

        let mut proofs = Vec::new();
        for program in self.registry.programs() {
            let Some(entry_index) = program.index_of(&address) else {
                continue;
            };
            let amount = program
                .tree
                .entry(entry_index)
                .map(|entry| entry.amount)
                .ok_or(Error::IndexOutOfRange {
                    index: entry_index,
                    len: program.len(),
                })?;
            proofs.push(ProgramProof {
                name: program.name.clone(),
                response: ProofResponse {
                    proof: program.tree.proof(entry_index)?,
                    reward_amount: JsonAmount(amount),
                    program_id: program.program_id,
                },
            });
        }
        proofs.sort_by(|a, b| a.response.program_id.cmp(&b.response.program_id));

        trace!("Found {address} in {} program(s)", proofs.len());
        Ok(proofs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaf::{encode_leaf, program_id};
    use crate::tree::verify_proof;
    use alloy::primitives::{b256, U256};
    use serde_json::{json, Value};

    const A: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
    const B: &str = "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359";
    const C: &str = "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB";

    fn service() -> ProofQueryService {
        let mut registry = ProgramRegistry::new();
        let rows: Vec<Value> = vec![json!([A, 100]), json!([B, 200]), json!([C, 300])];
        registry.register_whitelist("rewardProgram1", &rows).unwrap();
        ProofQueryService::new(Arc::new(registry))
    }

    fn program1() -> String {
        program_id("rewardProgram1").to_string()
    }

    #[test]
    fn test_query_returns_golden_proof() {
        let response = service().query_proof(&program1(), A).unwrap();

        assert_eq!(
            response.proof,
            vec![
                b256!("94b864311e36e9678f0b1c17a7bb410d95099421ccdaa88a27509dd0f34f6a05"),
                b256!("d301256d6a43a54792f499505835d15834df7e331fb9200d28ffac6de0cf2eee"),
            ]
        );
        assert_eq!(response.reward_amount, JsonAmount(U256::from(100)));
        assert_eq!(response.program_id, program_id("rewardProgram1"));

        let leaf = encode_leaf(
            response.program_id,
            canonicalize_address(A).unwrap(),
            U256::from(100),
        );
        let root = b256!("f690e54e17b3d6df8566486ba7abe96f560a1a5ded6ca17fc8bcf5d9e85f0bd1");
        assert!(verify_proof(&root, leaf, &response.proof));
    }

    #[test]
    fn test_address_case_does_not_matter() {
        let service = service();
        let expected = service.query_proof(&program1(), B).unwrap();

        for variant in [
            B.to_lowercase(),
            format!("0x{}", B[2..].to_uppercase()),
            B[2..].to_lowercase(),
        ] {
            assert_eq!(service.query_proof(&program1(), &variant).unwrap(), expected);
        }
    }

    #[test]
    fn test_program_id_case_does_not_matter() {
        let service = service();
        let upper = format!("0x{}", program1()[2..].to_uppercase());
        assert!(service.query_proof(&upper, C).is_ok());
    }

    #[test]
    fn test_not_in_reward_list() {
        let err = service()
            .query_proof(&program1(), "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb")
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[test]
    fn test_unknown_and_malformed_program() {
        let service = service();
        let unknown = program_id("usde-week24").to_string();
        assert!(matches!(
            service.query_proof(&unknown, A),
            Err(Error::UnknownProgram(_))
        ));
        assert!(matches!(
            service.query_proof("rewardProgram1", A),
            Err(Error::UnknownProgram(_))
        ));
    }

    #[test]
    fn test_invalid_address_is_checked_first() {
        let err = service().query_proof("garbage", "0x1234").unwrap_err();
        assert!(matches!(err, Error::InvalidAddress { .. }));
    }

    #[test]
    fn test_query_all_programs() {
        let mut registry = ProgramRegistry::new();
        let first: Vec<Value> = vec![json!([A, 100]), json!([B, 200])];
        let second: Vec<Value> = vec![json!([A, "5000"]), json!([C, 1])];
        registry.register_whitelist("rewardProgram1", &first).unwrap();
        registry.register_whitelist("usde-week24", &second).unwrap();
        let service = ProofQueryService::new(Arc::new(registry));

        let proofs = service.query_all(&A.to_lowercase()).unwrap();
        assert_eq!(proofs.len(), 2);
        // 0x4486.. sorts before 0x96ad..
        assert_eq!(proofs[0].name.as_deref(), Some("usde-week24"));
        assert_eq!(proofs[0].response.reward_amount, JsonAmount(U256::from(5000)));
        assert_eq!(proofs[1].name.as_deref(), Some("rewardProgram1"));
        for proof in &proofs {
            let single = service
                .query_proof(&proof.response.program_id.to_string(), A)
                .unwrap();
            assert_eq!(single, proof.response);
        }

        assert_eq!(service.query_all(B).unwrap().len(), 1);
        assert!(service
            .query_all("0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb")
            .unwrap()
            .is_empty());
        assert!(matches!(
            service.query_all("nope"),
            Err(Error::InvalidAddress { .. })
        ));
    }

    #[test]
    fn test_response_json() {
        let response = service().query_proof(&program1(), C).unwrap();
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["rewardAmount"], 300);
        assert_eq!(
            json["programId"],
            "0x96adf373413c3ec927a30419a752c09b592d1aeff97014b822cda8f1340ea6d7"
        );
        assert_eq!(json["proof"].as_array().unwrap().len(), response.proof.len());
    }
}
