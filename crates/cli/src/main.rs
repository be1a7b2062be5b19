//! CLI tool for turning lecture documents into slide decks and reading
//! lectures.

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use lecdeck_core::{
    decode_text, extract_discipline_lectures, extract_lectures, format_lectures_module, segment,
    to_json_pretty, DeckSummary, DisciplineRegistry, LectureMap, ScriptFormatter, SegmentOptions,
    SourceFormat,
};
use std::fs::File;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

/// Turn "Тема N" lecture documents into slide decks or reading lectures.
#[derive(Parser, Debug)]
#[command(name = "lecdeck")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build one presentation per topic.
    Slides(SlidesArgs),
    /// Build reading lectures grouped by discipline.
    Lectures(LecturesArgs),
}

#[derive(Args, Debug)]
struct SlidesArgs {
    /// Input document(s) (.docx, .doc or plain text)
    #[arg(required = true)]
    input: Vec<PathBuf>,

    /// Output directory (default: same as input file)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print output to stdout instead of writing to file
    #[arg(short, long)]
    print: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// JSON file with threshold overrides (camelCase keys)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Threshold preset: standard or compact
    #[arg(long, default_value = "standard")]
    profile: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Args, Debug)]
struct LecturesArgs {
    /// Input document (.docx, .doc or plain text)
    input: PathBuf,

    /// Discipline registry: JSON array of {id, name, description}
    #[arg(short, long)]
    registry: PathBuf,

    /// Treat the whole input as this discipline instead of detecting headers
    #[arg(short, long)]
    discipline: Option<String>,

    /// Output file (default: next to the input file)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print output to stdout instead of writing to file
    #[arg(short, long)]
    print: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Pretty-printed JSON
    Json,
    /// JavaScript source (`presentations: [...]` or `var lecturesData = ...`)
    Script,
}

impl OutputFormat {
    fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Script => "js",
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let verbose = match &cli.command {
        Command::Slides(args) => args.verbose,
        Command::Lectures(args) => args.verbose,
    };

    // Initialize logging
    if verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    match cli.command {
        Command::Slides(args) => run_slides(&args),
        Command::Lectures(args) => run_lectures(&args),
    }
}

fn run_slides(args: &SlidesArgs) -> Result<()> {
    let options = load_options(&args.profile, args.config.as_deref())?;

    for input_path in &args.input {
        if args.verbose {
            eprintln!("Processing: {}", input_path.display());
        }

        match process_slides(input_path, args, &options) {
            Ok(output) => {
                if args.print {
                    print!("{}", output);
                } else {
                    let output_path =
                        get_output_path(input_path, args.output.as_deref(), "slides", args.format)?;
                    write_output(&output_path, &output)?;
                    if args.verbose {
                        eprintln!("Written to: {}", output_path.display());
                    }
                }
            }
            Err(e) => {
                eprintln!("Error processing {}: {:#}", input_path.display(), e);
            }
        }
    }

    Ok(())
}

/// Segment a single document.
fn process_slides(input_path: &Path, args: &SlidesArgs, options: &SegmentOptions) -> Result<String> {
    let text = load_document(input_path)?;
    let presentations = segment(&text, options);

    if presentations.is_empty() {
        log::warn!("No \"Тема N\" headers found in {}", input_path.display());
    }
    if args.verbose {
        eprintln!("  {}", DeckSummary::from_presentations(&presentations));
    }

    let output = match args.format {
        OutputFormat::Json => format!("{}\n", to_json_pretty(&presentations)?),
        OutputFormat::Script => ScriptFormatter::new().format(&presentations),
    };

    Ok(output)
}

fn run_lectures(args: &LecturesArgs) -> Result<()> {
    let registry_json = std::fs::read_to_string(&args.registry)
        .with_context(|| format!("Failed to read registry {}", args.registry.display()))?;
    let registry = DisciplineRegistry::from_json(&registry_json)
        .with_context(|| format!("Invalid registry {}", args.registry.display()))?;

    if args.verbose {
        eprintln!("Processing: {}", args.input.display());
    }
    let text = load_document(&args.input)?;

    let lectures: LectureMap = match &args.discipline {
        Some(id) => {
            let discipline = registry
                .get(id)
                .ok_or_else(|| anyhow!("Discipline '{}' is not in the registry", id))?;
            let lectures = extract_discipline_lectures(&text, discipline);
            LectureMap::from([(lectures.id.clone(), lectures)])
        }
        None => extract_lectures(&text, &registry),
    };

    if args.verbose {
        for (id, discipline) in &lectures {
            eprintln!("  {}: {} lectures", id, discipline.lectures.len());
        }
    }

    let output = match args.format {
        OutputFormat::Json => format!("{}\n", to_json_pretty(&lectures)?),
        OutputFormat::Script => format_lectures_module(&lectures)?,
    };

    if args.print {
        print!("{}", output);
        return Ok(());
    }

    let output_path = match &args.output {
        Some(path) => path.clone(),
        None => get_output_path(&args.input, None, "lectures", args.format)?,
    };
    write_output(&output_path, &output)?;
    if args.verbose {
        eprintln!("Written to: {}", output_path.display());
    }

    Ok(())
}

/// Resolve the threshold preset, then overlay the config file's keys.
fn load_options(profile: &str, config: Option<&Path>) -> Result<SegmentOptions> {
    let base = SegmentOptions::preset(profile)
        .ok_or_else(|| anyhow!("Unknown profile '{}' (expected standard or compact)", profile))?;

    let Some(config_path) = config else {
        return Ok(base);
    };

    let overrides = std::fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config {}", config_path.display()))?;
    let overrides: serde_json::Value = serde_json::from_str(&overrides)
        .with_context(|| format!("Invalid JSON in {}", config_path.display()))?;

    let mut merged = serde_json::to_value(&base)?;
    match (merged.as_object_mut(), overrides) {
        (Some(target), serde_json::Value::Object(fields)) => target.extend(fields),
        _ => return Err(anyhow!("Config {} must be a JSON object", config_path.display())),
    }

    let options = SegmentOptions::from_json(&merged.to_string())
        .with_context(|| format!("Invalid options in {}", config_path.display()))?;
    log::debug!("Options: {:?}", options);
    Ok(options)
}

/// Read a document and return its plain text.
fn load_document(input_path: &Path) -> Result<String> {
    let bytes = std::fs::read(input_path)
        .with_context(|| format!("Failed to open {}", input_path.display()))?;

    let filename = input_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown");

    let text = match SourceFormat::detect(&bytes, filename) {
        SourceFormat::Docx => {
            log::debug!("Parsing as DOCX");
            lecdeck_docx::DocxParser::new()
                .extract_text(Cursor::new(bytes))
                .map_err(|e| anyhow!("{}", e))?
        }
        SourceFormat::Doc => {
            log::debug!("Parsing as legacy DOC");
            lecdeck_doc::DocParser::new()
                .extract_text(Cursor::new(bytes))
                .map_err(|e| anyhow!("{}", e))?
        }
        SourceFormat::Text => {
            let decoded = decode_text(&bytes);
            log::debug!("Read as {} text", decoded.encoding_name());
            decoded.text
        }
    };

    Ok(text)
}

/// Determine the output path for a processed file.
fn get_output_path(
    input_path: &Path,
    output_dir: Option<&Path>,
    suffix: &str,
    format: OutputFormat,
) -> Result<PathBuf> {
    let stem = input_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");

    let output_filename = format!("{}.{}.{}", stem, suffix, format.extension());

    let output_path = match output_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
            dir.join(output_filename)
        }
        None => {
            if let Some(parent) = input_path.parent() {
                parent.join(output_filename)
            } else {
                PathBuf::from(output_filename)
            }
        }
    };

    Ok(output_path)
}

/// Write output to a file.
fn write_output(path: &Path, content: &str) -> Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;

    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write to {}", path.display()))?;

    Ok(())
}
