//! `assess`: play multiple-choice question banks in the terminal.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use assess_core::AssessmentEngine;
use assess_core::model::{ExamConfig, RevealPolicy};
use services::{Clock, ExamService, QuestionBank, load_exam_config};

mod play;

use play::{PlayExit, play, render_report};

#[derive(Parser)]
#[command(name = "assess", version, about = "Multiple-choice assessments in the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a question bank interactively
    Run {
        /// JSON question bank
        #[arg(long, env = "ASSESS_BANK")]
        bank: PathBuf,

        /// TOML exam config (question count, time limit, pass mark, categories)
        #[arg(long, env = "ASSESS_CONFIG")]
        config: Option<PathBuf>,

        /// Number of questions (overrides the config)
        #[arg(long)]
        count: Option<usize>,

        /// Seed for reproducible question selection
        #[arg(long)]
        seed: Option<u64>,

        /// When explanations are shown (overrides the config)
        #[arg(long, value_enum)]
        reveal: Option<RevealArg>,

        /// Print the final report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that a question bank loads and validates
    Validate {
        /// JSON question bank
        #[arg(long, env = "ASSESS_BANK")]
        bank: PathBuf,
    },

    /// List the categories in a question bank
    Categories {
        /// JSON question bank
        #[arg(long, env = "ASSESS_BANK")]
        bank: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RevealArg {
    Immediate,
    AtEnd,
}

impl From<RevealArg> for RevealPolicy {
    fn from(arg: RevealArg) -> Self {
        match arg {
            RevealArg::Immediate => RevealPolicy::Immediate,
            RevealArg::AtEnd => RevealPolicy::AtEnd,
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("ASSESS_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn load_bank(path: &Path) -> Result<QuestionBank> {
    QuestionBank::from_json_file(path)
        .with_context(|| format!("cannot load question bank {}", path.display()))
}

fn build_config(
    bank_path: &Path,
    bank: &QuestionBank,
    config: Option<&Path>,
    count: Option<usize>,
    reveal: Option<RevealArg>,
) -> Result<ExamConfig> {
    let mut config = match config {
        Some(path) => load_exam_config(path)
            .with_context(|| format!("cannot load exam config {}", path.display()))?,
        None => {
            let title = bank_path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            ExamConfig::new("quiz", title, bank.len().max(1))?
        }
    };
    if let Some(count) = count {
        config = config.with_total_questions(count);
    }
    if let Some(reveal) = reveal {
        config = config.with_reveal(reveal.into());
    }
    Ok(config)
}

fn play_session(
    engine: &mut AssessmentEngine,
    config: &ExamConfig,
    out: &mut impl Write,
) -> Result<PlayExit> {
    if !config.title().is_empty() {
        writeln!(out, "{}", config.title())?;
    }
    if let Some(limit) = config.time_limit_secs() {
        writeln!(out, "Time limit: {} minutes", limit.div_ceil(60))?;
    }
    Ok(play(engine, io::stdin().lock(), out)?)
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Run {
            bank: bank_path,
            config,
            count,
            seed,
            reveal,
            json,
        } => {
            let bank = load_bank(&bank_path)?;
            let config = build_config(&bank_path, &bank, config.as_deref(), count, reveal)?;

            let mut service = ExamService::new(Clock::system());
            if let Some(seed) = seed {
                service = service.with_rng_seed(seed);
            }
            let mut engine = service.start_exam(&bank, &config)?;
            tracing::debug!(session = %engine.session().id(), "starting interactive run");

            // With --json, stdout carries only the report.
            let exit = if json {
                play_session(&mut engine, &config, &mut io::stderr().lock())?
            } else {
                play_session(&mut engine, &config, &mut io::stdout().lock())?
            };
            if exit == PlayExit::Quit && engine.progress().answered == 0 {
                return Ok(());
            }

            let report = service.report(&engine, &config);
            let mut stdout = io::stdout().lock();
            if json {
                serde_json::to_writer_pretty(&mut stdout, &report)?;
                writeln!(stdout)?;
            } else {
                render_report(&mut stdout, &engine, &report)?;
            }
            Ok(())
        }
        Commands::Validate { bank } => {
            let loaded = load_bank(&bank)?;
            println!(
                "{}: {} questions in {} categories",
                bank.display(),
                loaded.len(),
                loaded.categories().len()
            );
            Ok(())
        }
        Commands::Categories { bank } => {
            let loaded = load_bank(&bank)?;
            for category in loaded.categories() {
                println!("{category}\t{}", loaded.by_category(category).count());
            }
            let uncategorised = loaded
                .questions()
                .iter()
                .filter(|q| q.category().is_none())
                .count();
            if uncategorised > 0 {
                println!("{}\t{uncategorised}", services::exam::UNCATEGORISED);
            }
            Ok(())
        }
    }
}

fn main() {
    init_logging();
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        // Printed once at the binary edge.
        eprintln!("error: {err:#}");
        process::exit(2);
    }
}
