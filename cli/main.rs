#![deny(unused_variables)]
#![deny(dead_code)]
#![deny(unused_imports)]
#![deny(clippy::no_effect_underscore_binding)]

use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process;
use std::time::Instant;

use generank::config::ScoringConfig;
use generank::io::{load_genes, write_ranked_genes};
use generank::scorer::{GeneScorer, PriorityCombination};
use generank::types::ModeOfInheritance;

#[derive(Clone, Copy, ValueEnum)]
pub enum ModeOfInheritanceCli {
    Uninitialized,
    AutosomalDominant,
    AutosomalRecessive,
    XDominant,
    XRecessive,
    Mitochondrial,
}

impl From<ModeOfInheritanceCli> for ModeOfInheritance {
    fn from(mode: ModeOfInheritanceCli) -> Self {
        match mode {
            ModeOfInheritanceCli::Uninitialized => ModeOfInheritance::Uninitialized,
            ModeOfInheritanceCli::AutosomalDominant => ModeOfInheritance::AutosomalDominant,
            ModeOfInheritanceCli::AutosomalRecessive => ModeOfInheritance::AutosomalRecessive,
            ModeOfInheritanceCli::XDominant => ModeOfInheritance::XDominant,
            ModeOfInheritanceCli::XRecessive => ModeOfInheritance::XRecessive,
            ModeOfInheritanceCli::Mitochondrial => ModeOfInheritance::Mitochondrial,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum PriorityCombinationCli {
    Product,
    Mean,
    Max,
}

impl From<PriorityCombinationCli> for PriorityCombination {
    fn from(combination: PriorityCombinationCli) -> Self {
        match combination {
            PriorityCombinationCli::Product => PriorityCombination::Product,
            PriorityCombinationCli::Mean => PriorityCombination::Mean,
            PriorityCombinationCli::Max => PriorityCombination::Max,
        }
    }
}

#[derive(Args)]
pub struct RankArgs {
    /// Tab-separated variant table (optionally .gz) with gene_symbol, entrez_id, chrom, pos, ref, alt columns
    #[arg(value_name = "VARIANTS")]
    pub variants: PathBuf,

    /// Tab-separated priority table with gene_symbol, entrez_id, prioritizer, score columns
    #[arg(long, value_name = "PATH")]
    pub priorities: Option<PathBuf>,

    /// Scoring configuration (.toml); command-line flags override its values
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Mode of inheritance assumed while scoring
    #[arg(long, value_enum)]
    pub mode: Option<ModeOfInheritanceCli>,

    /// How scores from several prioritizers on one gene are merged
    #[arg(long, value_enum)]
    pub priority_combination: Option<PriorityCombinationCli>,

    /// Number of scoring threads (defaults to all cores)
    #[arg(long, value_name = "N")]
    pub threads: Option<usize>,

    /// Score genes on a single thread
    #[arg(long)]
    pub sequential: bool,

    /// Write the ranked table here instead of stdout
    #[arg(long, short, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Save the effective configuration to this path before scoring
    #[arg(long, value_name = "PATH")]
    pub write_config: Option<PathBuf>,
}

#[derive(Parser)]
#[command(
    name = "generank",
    version,
    about = "Rank candidate genes from filtered variants and prioritizer scores."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Score and rank genes
    #[command(about = "Score and rank genes (outputs: ranked TSV)")]
    Rank(RankArgs),

    /// Display version information
    #[command(about = "Display version information")]
    Version,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let Cli { command } = cli;

    let result = match command {
        Some(Commands::Rank(args)) => rank(args),
        Some(Commands::Version) => {
            println!("generank {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        None => Cli::command()
            .print_help()
            .map(|()| println!())
            .map_err(Into::into),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn effective_config(args: &RankArgs) -> Result<ScoringConfig, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => ScoringConfig::load(path)?,
        None => ScoringConfig::default(),
    };
    if let Some(mode) = args.mode {
        config.mode_of_inheritance = mode.into();
    }
    if let Some(combination) = args.priority_combination {
        config.priority_combination = combination.into();
    }
    if let Some(threads) = args.threads {
        config.threads = Some(threads);
    }
    if args.sequential {
        config.parallel = false;
    }
    config.validate()?;
    Ok(config)
}

fn rank(args: RankArgs) -> Result<(), Box<dyn std::error::Error>> {
    let start = Instant::now();
    let config = effective_config(&args)?;
    if let Some(path) = &args.write_config {
        config.save(path)?;
        log::info!("Wrote scoring configuration to {}", path.display());
    }

    let genes = load_genes(&args.variants, args.priorities.as_deref())?;
    let scorer = config.scorer();
    let mode = config.mode_of_inheritance;
    let ranked = match config.thread_pool()? {
        Some(pool) => pool.install(|| scorer.score_genes(genes, mode)),
        None => scorer.score_genes(genes, mode),
    };

    match &args.output {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            write_ranked_genes(&mut writer, &ranked)?;
            log::info!("Ranked genes written to {}", path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            write_ranked_genes(&mut writer, &ranked)?;
            writer.flush()?;
        }
    }

    log::info!(
        "Ranked {} genes in {:.2?}",
        ranked.len(),
        start.elapsed()
    );
    Ok(())
}
