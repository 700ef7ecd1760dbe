// Copyright 2025 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use clap::Args;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 9192;
pub const DEFAULT_WHITELIST_PATH: &str = "config/wl.json";
pub const DEFAULT_DUMP_DIR: &str = "config";
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";

/// Preflight responses may be cached for a day.
pub const CORS_MAX_AGE_SECS: u64 = 86_400;

/// Where program whitelists are read from and tree dumps written to.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ProgramsConfig {
    /// Path of the whitelist file.
    ///
    /// The file maps each program name to a list of `[address, amount]` pairs.
    #[clap(long, env = "REWARD_WHITELIST", default_value = DEFAULT_WHITELIST_PATH)]
    pub whitelist: PathBuf,

    /// Directory holding one `standard-v1` tree dump per program, named `<program>.json`.
    #[clap(long, env = "REWARD_DUMP_DIR", default_value = DEFAULT_DUMP_DIR)]
    pub dump_dir: PathBuf,

    /// Load trees from the dumps in the dump directory instead of rebuilding them from the
    /// whitelist.
    #[clap(long, default_value = "false")]
    pub from_dumps: bool,

    /// Do not write tree dumps after building.
    #[clap(long, default_value = "false", conflicts_with = "from_dumps")]
    pub no_dumps: bool,

    /// Program name to hash into the program id, for a whitelist key that differs from it.
    ///
    /// Given as `KEY=NAME`, e.g. `usdeWeek24=usde-week24`. Keys without a mapping are used as
    /// the program name. Also applies to dump file stems with `--from-dumps`.
    ///
    /// Alternatively, the `REWARD_PROGRAM_NAMES` environment variable can provide a
    /// comma-separated list.
    #[clap(
        long = "program-name",
        env = "REWARD_PROGRAM_NAMES",
        value_delimiter = ',',
        value_parser = parse_program_name
    )]
    pub program_names: Vec<(String, String)>,
}

fn parse_program_name(val: &str) -> Result<(String, String), String> {
    match val.split_once('=') {
        Some((key, name)) if !key.trim().is_empty() && !name.trim().is_empty() => {
            Ok((key.trim().to_string(), name.trim().to_string()))
        }
        _ => Err(format!("expected KEY=NAME, got {val:?}")),
    }
}

impl Default for ProgramsConfig {
    fn default() -> Self {
        Self {
            whitelist: PathBuf::from(DEFAULT_WHITELIST_PATH),
            dump_dir: PathBuf::from(DEFAULT_DUMP_DIR),
            from_dumps: false,
            no_dumps: false,
            program_names: Vec::new(),
        }
    }
}

impl ProgramsConfig {
    /// Path of the dump of program `name`.
    pub fn dump_path(&self, name: &str) -> PathBuf {
        self.dump_dir.join(format!("{name}.json"))
    }

    /// Program name for whitelist key `key`.
    pub fn program_name<'a>(&'a self, key: &'a str) -> &'a str {
        self.program_names
            .iter()
            .find(|(mapped, _)| mapped == key)
            .map_or(key, |(_, name)| name.as_str())
    }
}

/// HTTP listener settings.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Port to listen on.
    #[clap(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Address to bind to.
    #[clap(long, env = "REWARD_BIND_ADDR", default_value = "0.0.0.0")]
    pub bind_addr: IpAddr,

    /// Origin(s) allowed to query the service from a browser.
    ///
    /// Alternatively, the `REWARD_CORS_ORIGINS` environment variable can provide a
    /// comma-separated list.
    #[clap(
        long = "cors-origin",
        env = "REWARD_CORS_ORIGINS",
        value_delimiter = ',',
        default_value = DEFAULT_CORS_ORIGIN
    )]
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            cors_origins: vec![DEFAULT_CORS_ORIGIN.to_string()],
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}
