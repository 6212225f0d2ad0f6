use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use friend_graph::artifacts::{self, ArtifactPaths};
use friend_graph::config::{DEFAULT_API_URL, DEFAULT_API_VERSION, DEFAULT_TIMEOUT_SECS};
use friend_graph::{
    assemble, discover_edges, export, fetch_neighbors, ApiConfig, CenterUser, Error, VkClient,
};

#[derive(Parser)]
#[command(name = "friend-graph")]
#[command(about = "Collect a VK friend network and export it as a graph", long_about = None)]
#[command(version)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch friends and their connections, store the intermediate files
    Collect(CollectArgs),

    /// Build the graph from stored intermediate files and export it
    Assemble(AssembleArgs),

    /// Collect, then assemble
    Run {
        #[command(flatten)]
        collect: CollectArgs,

        /// Directory for graph.gexf and the visualization
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
    },
}

#[derive(Args)]
struct CollectArgs {
    /// VK access token
    #[arg(long, env = "VK_ACCESS_TOKEN", hide_env_values = true)]
    access_token: String,

    /// Your first name as shown on VK
    #[arg(long, env = "VK_FIRST_NAME")]
    first_name: String,

    /// Your last name as shown on VK
    #[arg(long, env = "VK_LAST_NAME")]
    last_name: String,

    #[arg(long, env = "VK_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    #[arg(long, default_value = DEFAULT_API_VERSION)]
    api_version: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// Directory for the intermediate files
    #[arg(long, default_value = ".")]
    work_dir: PathBuf,
}

#[derive(Args)]
struct AssembleArgs {
    /// Directory holding the intermediate files
    #[arg(long, default_value = ".")]
    work_dir: PathBuf,

    /// Directory for graph.gexf and the visualization
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,
}

fn collect(args: CollectArgs) -> friend_graph::Result<()> {
    let center = CenterUser {
        first_name: args.first_name,
        last_name: args.last_name,
    };
    let mut config = ApiConfig::new(args.access_token);
    config.base_url = args.api_url;
    config.version = args.api_version;
    config.timeout_secs = args.timeout_secs;

    let client = VkClient::new(config)?;
    client.authenticate().map_err(Error::Authentication)?;

    let primary = fetch_neighbors(&client, None).map_err(|e| {
        if e.is_auth_failure() {
            Error::Authentication(e)
        } else {
            Error::Api(e)
        }
    })?;
    info!("{} has {} friends", center.excluded_name(), primary.len());

    artifacts::ensure_dir(&args.work_dir)?;
    let paths = ArtifactPaths::in_dir(&args.work_dir);
    // Checkpoint the primary set; rewritten below once n_friends is known.
    artifacts::store_friends(&paths.friends, &primary)?;

    let discovery = discover_edges(&client, primary, &center.excluded_name());
    if !discovery.failed.is_empty() {
        warn!(
            "{} of {} friends could not be fetched",
            discovery.failed.len(),
            discovery.friends.len()
        );
    }

    artifacts::store_friends(&paths.friends, &discovery.friends)?;
    artifacts::store_edges(&paths, &discovery.edges, &discovery.mutual_counts)?;
    Ok(())
}

fn assemble_and_export(work_dir: &Path, output_dir: &Path) -> friend_graph::Result<()> {
    let paths = ArtifactPaths::in_dir(work_dir);
    let friends = artifacts::load_friends(&paths.friends)?;
    let (edges, mutual_counts) = artifacts::load_edges(&paths)?;

    let graph = assemble(friends, &edges, &mutual_counts)?;
    export::export_all(&graph, output_dir)?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "friend_graph=debug"
    } else {
        "friend_graph=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Collect(args) => collect(args).context("collection failed")?,
        Commands::Assemble(args) => assemble_and_export(&args.work_dir, &args.output_dir)
            .context("graph assembly failed")?,
        Commands::Run {
            collect: args,
            output_dir,
        } => {
            let work_dir = args.work_dir.clone();
            collect(args).context("collection failed")?;
            assemble_and_export(&work_dir, &output_dir).context("graph assembly failed")?;
        }
    }

    Ok(())
}
