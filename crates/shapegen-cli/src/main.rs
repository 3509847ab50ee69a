//! shapegen CLI
//!
//! - `load`: parse an RDF file into a named graph of a directory store
//! - `generate`: infer SHACL shapes from a data graph into a shapes graph
//! - `export`: dump a graph as sorted N-Triples
//! - `graphs`: list the graphs of a store

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use clap::{ArgAction, Args, Parser, Subcommand};
use colored::Colorize;
use shapegen_core::config::{is_absolute_iri, parse_ignore_list};
use shapegen_core::prefixes::PrefixDirectory;
use shapegen_core::{
    ExistingGraphPolicy, GraphStore, ImportOutcome, PrefixResolver, RunSummary, ShapesConfig,
    ShapesEngine, WriteMode,
};
use shapegen_rdf::{write_ntriples, DirectoryStore};
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

#[cfg(feature = "remote-prefixes")]
mod prefix_cc;

#[derive(Parser)]
#[command(name = "shapegen")]
#[command(
    author,
    version,
    about = "shapegen: infer SHACL shapes from RDF instance data"
)]
struct Cli {
    /// More log output (`-v` info, `-vv` debug).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse an RDF file (nt, ttl, nq, trig, rdf/owl/xml) into a named graph.
    Load {
        /// Store directory
        #[arg(long)]
        store: PathBuf,
        /// Target graph IRI
        #[arg(long)]
        graph: String,
        /// Merge into the graph instead of replacing it
        #[arg(long)]
        add: bool,
        /// Input RDF file
        input: PathBuf,
    },

    /// Infer shapes from a data graph and write them to a shapes graph.
    Generate(GenerateArgs),

    /// Write a graph as sorted N-Triples.
    Export {
        #[arg(long)]
        store: PathBuf,
        #[arg(long)]
        graph: String,
        /// Output file (default: stdout)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// List the graphs of a store.
    Graphs {
        #[arg(long)]
        store: PathBuf,
    },
}

/// Flags override values from `--config`.
#[derive(Args)]
struct GenerateArgs {
    #[arg(long)]
    store: PathBuf,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    data_graph: Option<String>,

    #[arg(long)]
    shapes_graph: Option<String>,

    /// Catalog label (default: `Shapes for: <data graph>`)
    #[arg(long)]
    label: Option<String>,

    /// replace, append or stop
    #[arg(long)]
    existing_graph: Option<ExistingGraphPolicy>,

    /// Add `owl:imports` for the shapes graph to the central catalog
    #[arg(long)]
    import: bool,

    #[arg(long)]
    central_catalog: Option<String>,

    /// Fetch prefixes from the remote prefix directory
    #[arg(long)]
    remote_prefixes: bool,

    #[arg(long)]
    prefix_directory: Option<String>,

    /// Project prefix (repeatable)
    #[arg(long = "prefix", value_name = "PREFIX=NAMESPACE")]
    prefixes: Vec<String>,

    /// File with one property IRI per line to skip
    #[arg(long)]
    ignore_properties: Option<PathBuf>,

    /// Property IRI to skip (repeatable)
    #[arg(long = "ignore", value_name = "IRI")]
    ignore: Vec<String>,

    /// Attach a provenance block
    #[arg(long)]
    provenance: bool,

    /// Profile rdf:type like any other property
    #[arg(long)]
    model_rdf_type: bool,

    /// Also generate shapes for incoming properties
    #[arg(long)]
    inverse: bool,

    /// Print the run summary as JSON on stdout
    #[arg(long)]
    json: bool,
}

impl GenerateArgs {
    fn to_config(&self) -> Result<ShapesConfig> {
        let mut config = match &self.config {
            Some(path) => ShapesConfig::from_json_file(path)
                .with_context(|| format!("failed to read config {}", path.display()))?,
            None => ShapesConfig::default(),
        };

        if let Some(iri) = &self.data_graph {
            config.data_graph_iri = iri.clone();
        }
        if let Some(iri) = &self.shapes_graph {
            config.shapes_graph_iri = iri.clone();
        }
        if let Some(label) = &self.label {
            config.label = Some(label.clone());
        }
        if let Some(policy) = self.existing_graph {
            config.existing_graph = policy;
        }
        if let Some(iri) = &self.central_catalog {
            config.central_catalog_iri = iri.clone();
        }
        if let Some(url) = &self.prefix_directory {
            config.prefix_directory_url = url.clone();
        }
        config.import_shapes |= self.import;
        config.remote_prefixes |= self.remote_prefixes;
        config.include_provenance |= self.provenance;
        config.model_rdf_type |= self.model_rdf_type;
        config.inverse_properties |= self.inverse;

        for entry in &self.prefixes {
            let (prefix, namespace) = entry
                .split_once('=')
                .ok_or_else(|| anyhow!("invalid --prefix {entry:?} (expected PREFIX=NAMESPACE)"))?;
            config
                .project_prefixes
                .insert(prefix.trim().to_string(), namespace.trim().to_string());
        }

        if let Some(path) = &self.ignore_properties {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read ignore-list {}", path.display()))?;
            config.ignore_properties.extend(parse_ignore_list(&text));
        }
        config.ignore_properties.extend(self.ignore.iter().cloned());

        Ok(config)
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => tracing::Level::ERROR,
        (false, 0) => tracing::Level::WARN,
        (false, 1) => tracing::Level::INFO,
        (false, _) => tracing::Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Load {
            store,
            graph,
            add,
            input,
        } => cmd_load(&store, &graph, &input, add),
        Commands::Generate(args) => cmd_generate(&args),
        Commands::Export { store, graph, out } => cmd_export(&store, &graph, out.as_deref()),
        Commands::Graphs { store } => cmd_graphs(&store),
    }
}

fn cmd_load(store: &Path, graph: &str, input: &Path, add: bool) -> Result<()> {
    if !is_absolute_iri(graph) {
        return Err(anyhow!("graph IRI is invalid: {graph:?}"));
    }
    let mut store = DirectoryStore::open(store)?;
    let mode = if add { WriteMode::Add } else { WriteMode::Replace };
    let count = store.load_file(graph, input, mode)?;
    eprintln!(
        "{} loaded {} into <{}> ({count} triples)",
        "ok".green().bold(),
        input.display(),
        graph.bold()
    );
    Ok(())
}

#[cfg(feature = "remote-prefixes")]
fn remote_directory(config: &ShapesConfig) -> Option<Box<dyn PrefixDirectory>> {
    config.remote_prefixes.then(|| {
        Box::new(prefix_cc::PrefixCcDirectory::new(
            config.prefix_directory_url.clone(),
            std::time::Duration::from_secs(10),
        )) as Box<dyn PrefixDirectory>
    })
}

#[cfg(not(feature = "remote-prefixes"))]
fn remote_directory(config: &ShapesConfig) -> Option<Box<dyn PrefixDirectory>> {
    if config.remote_prefixes {
        tracing::warn!("built without remote-prefixes; using local prefixes");
    }
    None
}

fn cmd_generate(args: &GenerateArgs) -> Result<()> {
    let config = args.to_config()?;
    config.validate()?;

    let directory = remote_directory(&config);
    let prefixes = PrefixResolver::for_config(&config, directory.as_deref())?;
    let engine = ShapesEngine::new(config, prefixes)?;

    let mut store = DirectoryStore::open(&args.store)?;
    let summary = engine.run(&mut store, Utc::now())?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }
    if let ImportOutcome::Failed { catalog, message } = &summary.import {
        eprintln!(
            "{} shapes were written but not imported into <{catalog}>: {message}",
            "warning".yellow().bold()
        );
    }
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    eprintln!(
        "{} <{}> → <{}>",
        "ok".green().bold(),
        summary.data_graph,
        summary.shapes_graph.bold()
    );
    println!(
        "  {} {} classes, {} node shapes, {} property shapes",
        "→".cyan(),
        summary.classes,
        summary.node_shapes,
        summary.property_shapes
    );
    println!(
        "  {} {} triples written (policy: {}, previous graph: {:?})",
        "→".cyan(),
        summary.triples_written,
        summary.policy,
        summary.previous_state
    );
    if let ImportOutcome::Imported { catalog } = &summary.import {
        println!("  {} imported into <{catalog}>", "→".cyan());
    }
}

fn cmd_export(store: &Path, graph: &str, out: Option<&Path>) -> Result<()> {
    let store = DirectoryStore::open(store)?;
    let triples = store.read_graph(graph)?;
    match out {
        Some(path) => {
            let mut writer = BufWriter::new(
                fs::File::create(path)
                    .with_context(|| format!("failed to create {}", path.display()))?,
            );
            write_ntriples(&triples, &mut writer)?;
            writer.flush()?;
            eprintln!("{} {}", "wrote".green().bold(), path.display().to_string().bold());
        }
        None => {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            write_ntriples(&triples, &mut lock)?;
        }
    }
    Ok(())
}

fn cmd_graphs(store: &Path) -> Result<()> {
    let store = DirectoryStore::open(store)?;
    for graph in store.list_graphs()? {
        let count = store.read_graph(&graph)?.len();
        println!("{graph}\t{count}");
    }
    Ok(())
}
