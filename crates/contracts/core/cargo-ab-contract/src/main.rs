use ab_cli_utils::init_logger;
use ab_contracts_read_only::Policy;
use ab_contracts_tooling::input::{load_call_graph, load_declarations, load_ricardian};
use ab_contracts_tooling::pipeline::{Artifacts, GenerateOptions, generate};
use anyhow::Context;
use clap::{Args, Parser};
use std::path::{Path, PathBuf};

/// Cargo extension for generating interfaces of annotated contracts
#[derive(Debug, Parser)]
#[clap(about, version)]
enum Command {
    /// Generate ABI document
    Abigen {
        #[clap(flatten)]
        input: InputArgs,
        /// Output file for ABI document
        #[arg(long, short)]
        output: PathBuf,
    },
    /// Generate dispatchers
    Codegen {
        #[clap(flatten)]
        input: InputArgs,
        /// Output file for generated Rust source
        #[arg(long, short)]
        output: PathBuf,
        /// Don't embed ABI document into generated source
        #[arg(long)]
        no_abi_embedding: bool,
    },
    /// Generate ABI document and dispatchers
    Generate {
        #[clap(flatten)]
        input: InputArgs,
        /// Output file for ABI document
        #[arg(long)]
        abi: PathBuf,
        /// Output file for generated Rust source
        #[arg(long)]
        dispatchers: PathBuf,
        /// Don't embed ABI document into generated source
        #[arg(long)]
        no_abi_embedding: bool,
    },
}

#[derive(Debug, Args)]
struct InputArgs {
    /// Declaration graph JSON file produced by the front end
    declarations: PathBuf,
    /// Name of the contract class
    #[arg(long)]
    contract: String,
    /// Call graph JSON file, read-only operations are verified when provided
    #[arg(long)]
    call_graph: Option<PathBuf>,
    /// Report read-only violations as warnings instead of errors
    #[arg(long)]
    warn_action_read_only: bool,
    /// JSON file with ricardian contracts and clauses
    #[arg(long)]
    ricardian: Option<PathBuf>,
    /// Don't warn about actions without ricardian contract
    #[arg(long)]
    suppress_ricardian_warnings: bool,
    /// Path of the runtime module used by generated dispatchers
    #[arg(long)]
    runtime_path: Option<String>,
}

fn run(input: InputArgs, embed_abi: bool) -> anyhow::Result<Artifacts> {
    let InputArgs {
        declarations,
        contract,
        call_graph,
        warn_action_read_only,
        ricardian,
        suppress_ricardian_warnings,
        runtime_path,
    } = input;

    let declarations = load_declarations(&declarations)?;
    let call_graph = call_graph.as_deref().map(load_call_graph).transpose()?;

    let mut options = GenerateOptions::new(contract);
    if let Some(ricardian) = ricardian {
        options.collector.ricardian = load_ricardian(&ricardian)?;
    }
    options.collector.suppress_ricardian_warnings = suppress_ricardian_warnings;
    if let Some(runtime_path) = runtime_path {
        options.codegen.runtime_path = runtime_path;
    }
    if warn_action_read_only {
        options.read_only_policy = Policy::Lenient;
    }
    options.embed_abi = embed_abi;

    generate(&declarations, call_graph.as_ref(), options)
}

fn write(
    artifacts: &Artifacts,
    abi: Option<&Path>,
    dispatchers: Option<&Path>,
) -> anyhow::Result<()> {
    artifacts
        .write(abi, dispatchers)
        .context("Failed to write outputs")?;

    if let Some(abi) = abi {
        println!("ABI: {}", abi.display());
    }
    if let Some(dispatchers) = dispatchers {
        println!("Dispatchers: {}", dispatchers.display());
    }
    Ok(())
}

pub fn main() -> anyhow::Result<()> {
    init_logger();

    let command = Command::parse();

    match command {
        Command::Abigen { input, output } => {
            let artifacts = run(input, false)?;
            write(&artifacts, Some(output.as_path()), None)
        }
        Command::Codegen {
            input,
            output,
            no_abi_embedding,
        } => {
            let artifacts = run(input, !no_abi_embedding)?;
            write(&artifacts, None, Some(output.as_path()))
        }
        Command::Generate {
            input,
            abi,
            dispatchers,
            no_abi_embedding,
        } => {
            let artifacts = run(input, !no_abi_embedding)?;
            write(&artifacts, Some(abi.as_path()), Some(dispatchers.as_path()))
        }
    }
}
