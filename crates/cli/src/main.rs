use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use shortid_backfill::{BackfillConfig, BackfillError, BackfillRunner, JsonFileStore};
use shortid_codec::{
    classify, generate, generate_for_prefix, parse, prefix_for, EntityKind, PrefixLookup,
    ResolverConfig,
};
use shortid_phase::{requirements_for, MigrationPhase};
use std::path::PathBuf;
use std::sync::Arc;

mod progress;
mod render;

#[derive(Parser)]
#[command(name = "shortid")]
#[command(about = "Display identifier tooling: mint, parse, backfill", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Assign display identifiers to unmigrated records in a snapshot
    Backfill {
        /// Path to a JSON record snapshot
        #[arg(long)]
        store: PathBuf,

        /// Records per page
        #[arg(long, default_value_t = 100)]
        page_size: usize,

        /// Restrict the run to these kinds (repeatable; default: all kinds
        /// in declared order)
        #[arg(long = "kind")]
        kinds: Vec<String>,

        /// Print the final report as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Mint display identifiers
    Generate {
        /// Kind name; unregistered names get a derived prefix
        #[arg(long)]
        kind: String,

        #[arg(long, default_value_t = 1)]
        count: usize,
    },

    /// Parse and classify an identifier
    Parse {
        /// The identifier to inspect
        id: String,
    },

    /// Show a migration phase's guarantees and its successor
    Phase {
        /// Phase name, e.g. `backfilling`
        #[arg(long)]
        current: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.quiet {
        "warn"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match cli.command {
        Commands::Backfill {
            store,
            page_size,
            kinds,
            json,
        } => run_backfill(store, page_size, &kinds, json).await,
        Commands::Generate { kind, count } => run_generate(&kind, count),
        Commands::Parse { id } => run_parse(&id),
        Commands::Phase { current } => run_phase(&current),
    }
}

async fn run_backfill(
    store_path: PathBuf,
    page_size: usize,
    kind_names: &[String],
    json: bool,
) -> Result<()> {
    let kinds = if kind_names.is_empty() {
        EntityKind::ALL.to_vec()
    } else {
        parse_kinds(kind_names)?
    };

    let store = JsonFileStore::open(&store_path)
        .await
        .with_context(|| format!("failed to open record snapshot {}", store_path.display()))?;

    let runner = BackfillRunner::new(
        Arc::new(store),
        BackfillConfig {
            kinds,
            page_size,
            ..BackfillConfig::default()
        },
    );

    let sink = progress::BarSink::new(json);
    let report = match runner.run(&sink).await {
        Ok(report) => report,
        Err(err @ BackfillError::StoreUnavailable(_)) => {
            return Err(anyhow!(err).context("backfill aborted"));
        }
    };
    sink.clear();

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render::render_report(&report));
    }

    // Per-record errors and skips are retryable outcomes, not run failures.
    // Only a failed uniqueness validation fails the exit code here.
    if !report.all_unique {
        bail!("duplicate display identifiers detected; see report above");
    }
    Ok(())
}

fn run_generate(kind_name: &str, count: usize) -> Result<()> {
    let lookup = prefix_for(kind_name);
    if let PrefixLookup::Derived(prefix) = lookup {
        log::warn!("{kind_name} is not a registered kind; using derived prefix {prefix}");
    }

    for _ in 0..count {
        let id = match lookup {
            PrefixLookup::Registered(kind) => generate(kind),
            PrefixLookup::Derived(prefix) => generate_for_prefix(prefix),
        };
        println!("{id}");
    }
    Ok(())
}

fn run_parse(id: &str) -> Result<()> {
    let shape = classify(id, &ResolverConfig::default());

    if shape.looks_like_internal_key {
        println!("shape:  internal key");
        println!("length: {}", id.len());
        return Ok(());
    }

    let Some(parsed) = parse(id) else {
        bail!("{id} is neither a display identifier nor an internal key");
    };

    println!("shape:     display identifier");
    println!("prefix:    {}", parsed.prefix);
    match parsed.kind {
        Some(kind) => println!("kind:      {kind}"),
        None => println!("kind:      unknown (unregistered prefix)"),
    }
    match parsed.timestamp_millis() {
        Some(millis) => println!("timestamp: {} ({millis} ms since epoch)", parsed.timestamp_part),
        None => println!("timestamp: {}", parsed.timestamp_part),
    }
    println!("suffix:    {}", parsed.random_part);
    Ok(())
}

fn run_phase(name: &str) -> Result<()> {
    let Some(phase) = MigrationPhase::from_name(name) else {
        let known: Vec<&str> = MigrationPhase::ALL.iter().map(|p| p.name()).collect();
        bail!("unknown phase {name}; expected one of: {}", known.join(", "));
    };

    let req = requirements_for(phase);
    println!("phase:                  {phase}");
    println!("dual read:              {}", req.dual_read);
    println!("dual write:             {}", req.dual_write);
    println!("internal key removable: {}", req.internal_key_removable);
    match phase.next() {
        Some(next) => println!("next phase:             {next}"),
        None => println!("next phase:             none (terminal)"),
    }
    Ok(())
}

fn parse_kinds(names: &[String]) -> Result<Vec<EntityKind>> {
    names
        .iter()
        .map(|name| {
            EntityKind::from_name(name)
                .ok_or_else(|| anyhow!("unknown entity kind: {name}"))
        })
        .collect()
}
