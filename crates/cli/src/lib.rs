use anyhow::{Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use note_section_eval::{EvalConfig, Evaluator, Task};
use note_section_tagger::{PatternTable, SectionTagger};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

mod render;
mod split;
mod submission;

pub use split::{split_file, SplitOutputs};
pub use submission::{check_submission, SubmissionError};

fn print_stdout(text: &str) -> Result<()> {
    use std::io::Write;

    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

#[derive(Parser)]
#[command(name = "notesect")]
#[command(about = "Tag and evaluate sections of clinical notes", long_about = None)]
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

    /// Header lexicon file (TOML or JSON) replacing the builtin one
    #[arg(long, global = true)]
    lexicon: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every section header found in a note
    Tag(TagArgs),

    /// Print the meta-section division of a note
    Divide(DivideArgs),

    /// Split a dataset CSV into src/tgt/metadata files and per-encounter text files
    Split(SplitArgs),

    /// Validate a shared-task run file
    #[command(name = "check-submission")]
    CheckSubmission(CheckSubmissionArgs),

    /// Score system notes against gold notes
    Evaluate(EvaluateArgs),
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum TagFormat {
    Brat,
    Json,
}

#[derive(Args)]
struct TagArgs {
    /// Note text file
    file: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value = "brat")]
    format: TagFormat,
}

#[derive(Args)]
struct DivideArgs {
    /// Note text file
    file: PathBuf,
}

#[derive(Args)]
struct SplitArgs {
    /// Dataset CSV with dialogue and/or note columns
    file: PathBuf,

    /// Column naming each encounter
    #[arg(long, default_value = "encounter_id")]
    id_column: String,
}

#[derive(Args)]
struct CheckSubmissionArgs {
    /// Run file to validate
    file: PathBuf,
}

#[derive(Args)]
struct EvaluateArgs {
    /// Gold references CSV (id and note columns)
    #[arg(long)]
    fn_gold: PathBuf,

    /// System outputs CSV (id and note columns)
    #[arg(long)]
    fn_sys: PathBuf,

    /// Metadata CSV (id and dataset columns)
    #[arg(long)]
    metadata_file: Option<PathBuf>,

    /// Summarization task: taskA, taskB or taskC
    #[arg(long, default_value = "taskB")]
    task: Task,

    /// Column identifying the encounter
    #[arg(long, default_value = "TestID")]
    id_column: String,

    /// Column holding the note
    #[arg(long, default_value = "SystemOutput")]
    note_column: String,

    /// Column holding the dialogue
    #[arg(long, default_value = "dialogue")]
    dialogue_column: String,

    /// Fail when no section division is detected in the system output
    #[arg(long)]
    use_section_check: bool,

    /// Dialogues up to this many words count as short
    #[arg(long, default_value_t = 512)]
    note_length_cutoff: usize,

    /// Prefix for the results file
    #[arg(long, default_value = "default")]
    experiment: String,

    /// Allow a partial test split
    #[arg(long)]
    debug: bool,
}

impl EvaluateArgs {
    fn config(&self) -> EvalConfig {
        EvalConfig {
            task: self.task,
            id_column: self.id_column.clone(),
            note_column: self.note_column.clone(),
            dialogue_column: self.dialogue_column.clone(),
            use_section_check: self.use_section_check,
            note_length_cutoff: self.note_length_cutoff,
            experiment: self.experiment.clone(),
            debug: self.debug,
        }
    }
}

pub fn main_entry() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    match &cli.command {
        Commands::Tag(args) => run_tag(&cli, args),
        Commands::Divide(args) => run_divide(&cli, args),
        Commands::Split(args) => run_split(args),
        Commands::CheckSubmission(args) => run_check_submission(args),
        Commands::Evaluate(args) => run_evaluate(&cli, args),
    }
}

fn load_tagger(lexicon: Option<&Path>) -> Result<SectionTagger> {
    let table = match lexicon {
        Some(path) => {
            log::debug!("Loading lexicon from {}", path.display());
            PatternTable::from_path(path)
                .with_context(|| format!("Failed to load lexicon {}", path.display()))?
        }
        None => PatternTable::builtin(),
    };
    SectionTagger::new(&table).context("Failed to compile header patterns")
}

fn read_note(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn run_tag(cli: &Cli, args: &TagArgs) -> Result<()> {
    let tagger = load_tagger(cli.lexicon.as_deref())?;
    let text = read_note(&args.file)?;
    let spans = tagger.tag_sections(&text);
    log::debug!("{} sections in {}", spans.len(), args.file.display());

    let output = match args.format {
        TagFormat::Brat => render::brat(&text, &spans),
        TagFormat::Json => render::spans_json(&spans)?,
    };
    print_stdout(output.trim_end_matches('\n'))
}

fn run_divide(cli: &Cli, args: &DivideArgs) -> Result<()> {
    let tagger = load_tagger(cli.lexicon.as_deref())?;
    let text = read_note(&args.file)?;
    let spans = tagger.divide_note_by_metasections(&text);
    print_stdout(&render::divisions_json(&text, &spans)?)
}

fn run_split(args: &SplitArgs) -> Result<()> {
    log::info!("input csv: {}", args.file.display());
    let outputs = split_file(&args.file, &args.id_column)?;
    log::info!(
        "Wrote {} encounters to {}",
        outputs.encounters,
        outputs.text_dir.display()
    );
    Ok(())
}

fn run_check_submission(args: &CheckSubmissionArgs) -> Result<()> {
    let task = check_submission(&args.file)?;
    log::debug!("{} validated as a {task} run", args.file.display());
    print_stdout("Run file is valid.")
}

fn run_evaluate(cli: &Cli, args: &EvaluateArgs) -> Result<()> {
    let tagger = load_tagger(cli.lexicon.as_deref())?;
    let evaluator = Evaluator::new(tagger, args.config())?;

    let report = evaluator.evaluate_files(
        &args.fn_gold,
        &args.fn_sys,
        args.metadata_file.as_deref(),
    )?;

    let out = PathBuf::from(evaluator.config().results_file_name());
    log::info!("Saving results to {}", out.display());
    report
        .write_json(&out)
        .with_context(|| format!("Failed to write {}", out.display()))?;

    print_stdout(report.to_string().trim_end_matches('\n'))
}
