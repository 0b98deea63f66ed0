mod topology;

use anyhow::{anyhow, Result};
use clap::Parser;
use logchain::{Node, Registry};
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use topology::Topology;
use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Logchain - pipe stdin through a graph of chained loggers
#[derive(Parser, Debug)]
#[command(name = "logchain")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to topology file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Node that receives stdin lines (overrides topology entry)
    #[arg(short, long)]
    node: Option<String>,

    /// Level every stdin line is logged at
    #[arg(short, long, default_value = "info")]
    level: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Print the default topology and exit
    #[arg(long)]
    print_config: bool,
}

fn parse_level(level: &str) -> Option<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

/// Log every non-empty line of `reader` at `level` through `node`
///
/// Dispatch failures are reported and reading continues. Returns the
/// number of lines logged.
async fn pipe_lines<R>(reader: R, node: &Node, level: &str) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut count = 0;

    while let Some(line) = lines.next_line().await? {
        if line.is_empty() {
            continue;
        }

        debug!(tag = %node.tag(), content = %line, "Received line");
        if let Err(e) = node.log(level, line) {
            eprintln!("Dispatch error: {}", e);
        }
        count += 1;
    }

    Ok(count)
}

/// Flush every registered node's sink
fn flush_all(registry: &Registry) -> Result<()> {
    for tag in registry.tags() {
        if let Some(node) = registry.get(&tag) {
            node.flush()?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Handle --print-config
    if args.print_config {
        println!("{}", Topology::default().to_toml()?);
        return Ok(());
    }

    // Load topology
    let topology = if let Some(ref path) = args.config {
        Topology::from_file(path)?
    } else {
        Topology::default()
    };

    // CLI --verbose flag overrides the topology log level
    let level = if args.verbose {
        Level::DEBUG
    } else {
        parse_level(&topology.general.log_level).unwrap_or(Level::WARN)
    };
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let registry = topology.build()?;
    let entry = args
        .node
        .as_deref()
        .or_else(|| topology.entry())
        .ok_or_else(|| anyhow!("Topology defines no nodes"))?;
    let node = registry
        .get(entry)
        .ok_or_else(|| anyhow!("Unknown node '{}'", entry))?;

    if node.level(&args.level).is_none() {
        warn!(tag = %node.tag(), level = %args.level, "Level is not installed on the entry node");
    }

    info!(
        entry = %node.tag(),
        downstream = ?node.downstream().iter().map(|n| n.tag().to_string()).collect::<Vec<_>>(),
        "Piping stdin"
    );

    let count = pipe_lines(BufReader::new(tokio::io::stdin()), &node, &args.level).await?;
    flush_all(&registry)?;
    info!(lines = count, "Processing complete");

    Ok(())
}
