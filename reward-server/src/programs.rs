// Copyright 2025 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

//! Populating the program registry at startup.
//!
//! Each program is built on its own: a program whose whitelist or dump is broken is logged and
//! left out, and every other program is still served.

use crate::config::ProgramsConfig;
use color_eyre::eyre::{eyre, Result};
use reward_merkle::{
    read_whitelist, JsonAmount, ProgramRegistry, RegisteredProgram, RewardMerkleTree, Whitelist,
    B256,
};
use serde::Serialize;
use std::path::Path;

/// Operator facing description of a registered program.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramSummary {
    pub program_id: B256,
    pub name: Option<String>,
    pub root: B256,
    pub entries: usize,
    pub total_amount: JsonAmount,
}

impl From<&RegisteredProgram> for ProgramSummary {
    fn from(program: &RegisteredProgram) -> Self {
        Self {
            program_id: program.program_id,
            name: program.name.clone(),
            root: program.root(),
            entries: program.len(),
            total_amount: JsonAmount(program.total_amount),
        }
    }
}

/// Summaries of all registered programs, ordered by name then id.
pub fn summaries(registry: &ProgramRegistry) -> Vec<ProgramSummary> {
    let mut summaries: Vec<ProgramSummary> =
        registry.programs().map(ProgramSummary::from).collect();
    summaries.sort_by(|a, b| (&a.name, a.program_id).cmp(&(&b.name, b.program_id)));
    summaries
}

/// Builds the registry from the configured whitelist, or from existing dumps when
/// `from_dumps` is set.
pub fn load_registry(config: &ProgramsConfig) -> Result<ProgramRegistry> {
    if config.from_dumps {
        return registry_from_dumps(config);
    }

    let whitelist = read_whitelist(&config.whitelist)
        .map_err(|err| eyre!("Failed to read whitelist {:?}: {err}", config.whitelist))?;
    Ok(registry_from_whitelist(&whitelist, config))
}

/// Registers every program of `whitelist` under its configured program name, writing a dump
/// of each tree named after its whitelist key unless `no_dumps` is set.
pub fn registry_from_whitelist(whitelist: &Whitelist, config: &ProgramsConfig) -> ProgramRegistry {
    let mut registry = ProgramRegistry::new();

    for (key, rows) in whitelist {
        let name = config.program_name(key);
        let program = match registry.register_whitelist(name, rows) {
            Ok(program) => program,
            Err(err) => {
                error!("Skipping program {name} (whitelist key {key}): {err}");
                continue;
            }
        };

        if !config.no_dumps {
            let path = config.dump_path(key);
            if let Err(err) = write_dump(&program.tree, &path) {
                // the program is still served, only the dump is missing
                error!("Failed to write dump of program {name} to {path:?}: {err}");
            }
        }
    }

    info!(
        "Registered {} of {} program(s) from the whitelist",
        registry.len(),
        whitelist.len()
    );
    registry
}

fn write_dump(tree: &RewardMerkleTree, path: &Path) -> reward_merkle::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    tree.write_dump(path)
}

/// Registers every `*.json` dump found in the dump directory, named after the file stem or
/// the program name it maps to.
///
/// Dumps are fully validated before registration since they may have been edited by hand.
pub fn registry_from_dumps(config: &ProgramsConfig) -> Result<ProgramRegistry> {
    let dir = &config.dump_dir;
    let mut paths: Vec<_> = std::fs::read_dir(dir)
        .map_err(|err| eyre!("Failed to read dump directory {dir:?}: {err}"))?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    let mut registry = ProgramRegistry::new();
    for path in &paths {
        let Some(stem) = path.file_stem().map(|stem| stem.to_string_lossy().into_owned()) else {
            continue;
        };
        let name = config.program_name(&stem).to_string();

        let result = RewardMerkleTree::read_dump(path).and_then(|tree| {
            tree.validate()?;
            registry.register(Some(name), tree).map(|_| ())
        });
        if let Err(err) = result {
            error!("Skipping dump {path:?}: {err}");
        }
    }

    info!(
        "Registered {} of {} dump(s) from {dir:?}",
        registry.len(),
        paths.len()
    );
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reward_merkle::{program_id, U256};
    use serde_json::json;

    const A: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
    const B: &str = "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359";

    fn whitelist() -> Whitelist {
        serde_json::from_value(json!({
            "rewardProgram1": [[A, 100], [B, 200], ["0xnotanaddress", 5]],
            "usde-week24": [[A, 1], [A.to_lowercase(), 2]],
            "broken": [[A, -1]],
        }))
        .unwrap()
    }

    fn without_dumps() -> ProgramsConfig {
        ProgramsConfig {
            no_dumps: true,
            ..ProgramsConfig::default()
        }
    }

    #[test]
    fn test_broken_programs_are_skipped() {
        let registry = registry_from_whitelist(&whitelist(), &without_dumps());

        assert_eq!(registry.len(), 1);
        let program = registry.get(&program_id("rewardProgram1")).unwrap();
        assert_eq!(program.len(), 2);
        assert_eq!(program.total_amount, U256::from(300));
        assert!(registry.get(&program_id("usde-week24")).is_none());
        assert!(registry.get(&program_id("broken")).is_none());
    }

    #[test]
    fn test_dumps_reload_into_the_same_registry() {
        let dir = tempfile::tempdir().unwrap();
        let config = ProgramsConfig {
            dump_dir: dir.path().join("dumps"),
            ..ProgramsConfig::default()
        };

        let built = registry_from_whitelist(&whitelist(), &config);
        assert!(config.dump_path("rewardProgram1").exists());
        assert!(!config.dump_path("broken").exists());

        // an unrelated or corrupt file does not stop the others
        std::fs::write(config.dump_dir.join("garbage.json"), "{}").unwrap();
        std::fs::write(config.dump_dir.join("notes.txt"), "hello").unwrap();

        let reloaded = registry_from_dumps(&config).unwrap();
        assert_eq!(summaries(&reloaded), summaries(&built));
    }

    #[test]
    fn test_whitelist_key_mapped_to_program_name() {
        let dir = tempfile::tempdir().unwrap();
        let whitelist: Whitelist = serde_json::from_value(json!({
            "rewardProgram1": [[A, 100], [B, 200]],
            "usdeWeek24": [[A, 1], [B, 2]],
        }))
        .unwrap();
        let config = ProgramsConfig {
            dump_dir: dir.path().to_path_buf(),
            program_names: vec![("usdeWeek24".to_string(), "usde-week24".to_string())],
            ..ProgramsConfig::default()
        };

        let registry = registry_from_whitelist(&whitelist, &config);
        assert_eq!(registry.len(), 2);

        let usde_id: B256 = "0x4486940b210d017fe91b72846254afd5ce9bcfcb960e9089d17074ff30cbe7aa"
            .parse()
            .unwrap();
        let program = registry.get(&usde_id).unwrap();
        assert_eq!(program.name.as_deref(), Some("usde-week24"));
        assert!(program.tree.entries().all(|(_, entry)| entry.program_id == usde_id));
        assert!(registry.get(&program_id("usdeWeek24")).is_none());

        // the dump keeps the whitelist key as its file name
        assert!(config.dump_path("usdeWeek24").exists());
        let reloaded = registry_from_dumps(&config).unwrap();
        assert_eq!(summaries(&reloaded), summaries(&registry));
    }

    #[test]
    fn test_load_registry_reports_missing_whitelist() {
        let dir = tempfile::tempdir().unwrap();
        let config = ProgramsConfig {
            whitelist: dir.path().join("missing.json"),
            dump_dir: dir.path().to_path_buf(),
            ..ProgramsConfig::default()
        };
        assert!(load_registry(&config).is_err());
    }

    #[test]
    fn test_summary_json() {
        let registry = registry_from_whitelist(&whitelist(), &without_dumps());
        let json = serde_json::to_value(summaries(&registry)).unwrap();
        assert_eq!(
            json,
            json!([{
                "programId": "0x96adf373413c3ec927a30419a752c09b592d1aeff97014b822cda8f1340ea6d7",
                "name": "rewardProgram1",
                "root": registry.get(&program_id("rewardProgram1")).unwrap().root().to_string(),
                "entries": 2,
                "totalAmount": 300
            }])
        );
    }
}
