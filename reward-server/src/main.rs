// Copyright 2025 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

#[macro_use]
extern crate tracing;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{eyre, Result};
use reward_server::log::{LogBuilder, LogFormat, LogOutputDest};
use reward_server::programs::{load_registry, summaries};
use reward_server::{cors_layer, router, ProgramsConfig, ServerConfig};
use reward_merkle::ProofQueryService;
use std::sync::Arc;
use tracing::Level;

#[derive(Parser, Debug)]
#[command(disable_version_flag = true)]
#[command(author, version, about, long_about = None)]
struct Opt {
    #[clap(subcommand)]
    command: Option<SubCmd>,

    /// Print the crate version.
    #[clap(long)]
    crate_version: bool,

    /// Specify the logging format.
    ///
    /// Valid values are "default" or "json".
    ///
    /// If the argument is not used, the default format will be applied.
    #[clap(long, value_parser = LogFormat::parse_from_str, verbatim_doc_comment, global = true)]
    log_format: Option<LogFormat>,

    /// Specify the logging output destination.
    ///
    /// Valid values are "stderr", "stdout", "data-dir", or a custom path.
    ///
    /// `stderr` is the default value.
    ///
    /// The data directory location is platform specific:
    ///  - Linux: $HOME/.local/share/reward-server/logs
    ///  - macOS: $HOME/Library/Application Support/reward-server/logs
    ///  - Windows: C:\Users\<username>\AppData\Roaming\reward-server\logs
    #[allow(rustdoc::invalid_html_tags)]
    #[clap(long, value_parser = LogOutputDest::parse_from_str, verbatim_doc_comment, default_value = "stderr", global = true)]
    log_output_dest: LogOutputDest,
}

#[derive(Subcommand, Debug)]
enum SubCmd {
    /// Build the tree of every program in the whitelist, write the dumps and print the roots.
    Build {
        #[command(flatten)]
        programs: ProgramsConfig,

        /// Also print each program's tree, node by node.
        #[clap(long)]
        render: bool,
    },

    /// Build or load the trees, then serve proofs over HTTP.
    Serve {
        #[command(flatten)]
        programs: ProgramsConfig,

        #[command(flatten)]
        server: ServerConfig,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let opt = Opt::parse();

    if opt.crate_version {
        println!("{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let mut log_builder = LogBuilder::new(vec![
        ("reward_server".to_string(), Level::INFO),
        ("reward_merkle".to_string(), Level::INFO),
    ]);
    log_builder.output_dest(opt.log_output_dest.clone());
    if let Some(format) = opt.log_format {
        log_builder.format(format);
    }
    let _log_guard = log_builder.initialize()?;

    match opt.command {
        Some(SubCmd::Build { programs, render }) => build(&programs, render),
        Some(SubCmd::Serve { programs, server }) => serve(&programs, &server).await,
        None => Err(eyre!("No subcommand given, see --help")),
    }
}

fn build(config: &ProgramsConfig, render: bool) -> Result<()> {
    if config.from_dumps {
        return Err(eyre!("--from-dumps cannot be used with the build command"));
    }
    let registry = load_registry(config)?;

    for summary in summaries(&registry) {
        println!("program:     {}", summary.name.as_deref().unwrap_or("-"));
        println!("id:          {}", summary.program_id);
        println!("root:        {}", summary.root);
        println!("entries:     {}", summary.entries);
        println!("totalAmount: {}", summary.total_amount.0);
        if render {
            if let Some(program) = registry.get(&summary.program_id) {
                println!("{}", program.tree.render()?);
            }
        }
        println!();
    }

    if registry.is_empty() {
        return Err(eyre!("No program could be built from {:?}", config.whitelist));
    }
    Ok(())
}

async fn serve(programs: &ProgramsConfig, server: &ServerConfig) -> Result<()> {
    let registry = load_registry(programs)?;
    if registry.is_empty() {
        warn!("No program registered, every proof query will fail");
    }
    let service = ProofQueryService::new(Arc::new(registry));
    let app = router(service, cors_layer(server));

    let addr = server.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|err| eyre!("Failed to bind {addr}: {err}"))?;
    info!("Serving proofs on {addr}");
    println!("server running on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for the shutdown signal: {err}");
        // without a signal handler, run until killed
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
