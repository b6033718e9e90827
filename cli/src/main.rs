//! unepub CLI - EPUB to chapter-segmented text tool
//!
//! A command-line tool for converting EPUB books (and loose XHTML files)
//! into clean plain text, one book at a time or a whole directory at once.

use clap::{ArgAction, Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use unepub::batch::{BatchOptions, BookReport, BookStatus, Subset};
use unepub::{render, CleanupOptions, ConvertOptions, Outcome, RenderOptions};

/// EPUB books to chapter-segmented plain text
#[derive(Parser)]
#[command(
    name = "unepub",
    version,
    about = "Convert EPUB books to chapter-segmented plain text",
    long_about = "unepub - EPUB to plain text conversion tool.\n\n\
                  Walks every spine section, strips boilerplate and numbered listings,\n\
                  and writes renumbered chapters with recovered titles.\n\n\
                  Usage:\n  \
                  unepub convert            Convert ./input into ./output\n  \
                  unepub text <file>        Convert one book to stdout\n  \
                  unepub info <file>        Show metadata and statistics"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Only log warnings and errors (RUST_LOG overrides)
    #[arg(long, global = true)]
    silent: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert every EPUB below a directory
    Convert(ConvertArgs),

    /// Convert one document to plain text
    Text {
        /// Input file path
        input: PathBuf,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        cleaning: CleaningArgs,
    },

    /// Convert one document to JSON (metadata, chapters, statistics)
    Json {
        /// Input file path
        input: PathBuf,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output compact JSON (no indentation)
        #[arg(long)]
        compact: bool,

        #[command(flatten)]
        cleaning: CleaningArgs,
    },

    /// Show document metadata and conversion statistics
    Info {
        /// Input file path
        input: PathBuf,

        /// Print the metadata as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

/// Cleaning switches shared by every converting command.
#[derive(clap::Args, Clone)]
struct CleaningArgs {
    /// Prepend the metadata banner to the text
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    write_header: bool,

    /// Normalize text and apply the chapter heuristics
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    clean_output: bool,

    /// Strip front/back matter and page artifacts of public-domain dumps
    #[arg(long)]
    gutenberg_cleaning: bool,

    /// Minimum length of the cleaned text
    #[arg(long, default_value_t = unepub::options::DEFAULT_MINIMUM_OUTPUT_LENGTH)]
    minimum_length: usize,
}

impl CleaningArgs {
    fn convert_options(&self) -> ConvertOptions {
        let cleanup = CleanupOptions::default()
            .with_clean_output(self.clean_output)
            .with_gutenberg_cleaning(self.gutenberg_cleaning);
        ConvertOptions::new()
            .lenient()
            .with_cleanup(cleanup)
            .with_render(RenderOptions::new().with_header(self.write_header))
            .with_minimum_output_length(self.minimum_length)
    }
}

#[derive(clap::Args)]
struct ConvertArgs {
    /// Directory searched recursively for .epub files
    #[arg(long, default_value = "./input")]
    input_dir: PathBuf,

    /// Root directory of the written text files
    #[arg(long, default_value = "./output")]
    output_dir: PathBuf,

    #[command(flatten)]
    cleaning: CleaningArgs,

    /// Write a .metadata sidecar next to each text file
    #[arg(long)]
    write_metadata: bool,

    /// Give every book its own folder
    #[arg(long)]
    separate_folders: bool,

    /// Stop after this many books (0 = all)
    #[arg(long, default_value_t = 0)]
    stop_early: usize,

    /// Skip books whose rights statement claims copyright
    #[arg(long)]
    skip_copyright: bool,

    /// Output grouping: book, author, category or categoryauthor
    #[arg(long, default_value = "book")]
    create_subsets: Subset,

    /// Convert books on all cores
    #[arg(long)]
    parallel: bool,
}

impl ConvertArgs {
    fn batch_options(&self) -> BatchOptions {
        let mut convert = self.cleaning.convert_options();
        if self.skip_copyright {
            convert = convert.skip_restricted();
        }

        let mut options = BatchOptions::new(&self.input_dir, &self.output_dir)
            .with_convert(convert)
            .with_stop_early(self.stop_early)
            .with_subset(self.create_subsets);
        if self.write_metadata {
            options = options.with_metadata_sidecar();
        }
        if self.separate_folders {
            options = options.with_separate_folders();
        }
        if self.parallel {
            options = options.parallel();
        }
        options
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.silent);

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(silent: bool) {
    let fallback = if silent { "warn" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_writer(io::stderr)
                .with_filter(env_filter),
        )
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let Some(command) = cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Convert(args) => run_convert(&args, cli.silent)?,

        Commands::Text {
            input,
            output,
            cleaning,
        } => {
            let options = cleaning.convert_options();
            let pb = create_spinner("Converting book...");
            let outcome = unepub::convert_file(&input, &options)?;
            pb.finish_and_clear();

            if let Some(conversion) = accepted(&outcome) {
                let text = render::render_text(conversion, &options.render);
                write_output(output.as_deref(), &text)?;
                if let Some(path) = output {
                    println!(
                        "{} Converted to text: {} ({} chapters)",
                        "✓".green().bold(),
                        path.display(),
                        conversion.chapter_count()
                    );
                }
            }
        }

        Commands::Json {
            input,
            output,
            compact,
            cleaning,
        } => {
            let mut options = cleaning.convert_options();
            if compact {
                options.render = options.render.compact_json();
            }
            let pb = create_spinner("Converting book...");
            let outcome = unepub::convert_file(&input, &options)?;
            pb.finish_and_clear();

            if let Some(conversion) = accepted(&outcome) {
                let json = render::render_json(conversion, &options.render)?;
                write_output(output.as_deref(), &json)?;
                if let Some(path) = output {
                    println!("{} Converted to JSON: {}", "✓".green().bold(), path.display());
                }
            }
        }

        Commands::Info { input, json } => run_info(&input, json)?,

        Commands::Version => print_version(),
    }

    Ok(())
}

/// Returns the conversion, or explains the rejection on stderr.
fn accepted(outcome: &Outcome) -> Option<&unepub::Conversion> {
    match outcome {
        Outcome::Converted(conversion) => Some(&**conversion),
        Outcome::TooShort { length, .. } => {
            eprintln!(
                "{} Output too short ({} characters), nothing written",
                "!".yellow().bold(),
                length
            );
            None
        }
        Outcome::Restricted => {
            eprintln!("{} Book is copyrighted, nothing written", "!".yellow().bold());
            None
        }
    }
}

fn run_convert(args: &ConvertArgs, silent: bool) -> Result<(), Box<dyn std::error::Error>> {
    let options = args.batch_options();

    let (found, _) = unepub::batch::discover_epubs(&options.input_dir)?;
    let total = match options.stop_early {
        0 => found.len(),
        n => n.min(found.len()),
    };

    let pb = if silent {
        ProgressBar::hidden()
    } else {
        create_progress(total as u64)
    };

    let report = unepub::batch::run_batch_with(&options, |book: &BookReport| {
        if let Some(title) = &book.title {
            pb.set_message(title.clone());
        }
        if let BookStatus::Failed(reason) = &book.status {
            pb.println(format!(
                "{} {}: {}",
                "✗".red().bold(),
                book.source.display(),
                reason
            ));
        }
        pb.inc(1);
    })?;
    pb.finish_and_clear();

    let stats = report.stats;
    println!("{}", "Conversion Complete".green().bold());
    println!("{}", "─".repeat(40));
    println!("{}: {}", "Output".bold(), options.output_dir.display());
    println!("{}: {}", "Files scanned".bold(), stats.files_scanned);
    println!("{}: {}", "Books".bold(), stats.books);
    println!("  {} converted: {}", "✓".green(), stats.converted);
    if stats.too_short > 0 {
        println!("  {} too short: {}", "!".yellow(), stats.too_short);
    }
    if stats.restricted > 0 {
        println!("  {} copyrighted: {}", "!".yellow(), stats.restricted);
    }
    if stats.failed > 0 {
        println!("  {} failed: {}", "✗".red(), stats.failed);
    }

    println!("\n{}", "Statistics".cyan().bold());
    println!("{}", "─".repeat(40));
    println!("{}: {}", "Original characters".bold(), stats.original_chars);
    println!(
        "{}: {} ({:.2}%)",
        "Removed characters".bold(),
        stats.removed_chars,
        stats.removed_percent()
    );
    println!("{}: {:.2?}", "Elapsed".bold(), stats.elapsed);
    println!("{}: {:.0}", "Characters/second".bold(), stats.chars_per_second());

    Ok(())
}

fn run_info(input: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let pb = create_spinner("Analyzing book...");

    let format = unepub::detect_format_from_path(input)?;
    let options = ConvertOptions::new().lenient().with_minimum_output_length(0);
    let book = unepub::read_book(input, &options)?;
    let outcome = unepub::convert_book(&book, &options);

    pb.finish_and_clear();

    if json {
        println!("{}", serde_json::to_string_pretty(&book.metadata)?);
        return Ok(());
    }

    let metadata = &book.metadata;
    println!("{}", "Book Information".cyan().bold());
    println!("{}", "─".repeat(40));
    println!(
        "{}: {}",
        "File".bold(),
        input.file_name().unwrap_or_default().to_string_lossy()
    );
    println!("{}: {:?}", "Format".bold(), format);
    println!("{}: {}", "Sections".bold(), book.sections.len());
    println!("{}: {} bytes", "Markup".bold(), book.markup_len());

    let fields = [
        ("Title", &metadata.title),
        ("Author", &metadata.author),
        ("Publisher", &metadata.publisher),
        ("Language", &metadata.language),
        ("Identifier", &metadata.identifier),
        ("Rights", &metadata.rights),
    ];
    for (label, value) in fields {
        if let Some(value) = value {
            println!("{}: {}", label.bold(), value);
        }
    }
    let categories = metadata.categories();
    if !categories.is_empty() {
        println!("{}: {}", "Categories".bold(), categories.join(", "));
    }
    if metadata.is_restricted() {
        println!("{}: {}", "Copyright".bold(), "Yes (skipped with --skip-copyright)");
    }

    if let Some(conversion) = outcome.converted() {
        println!("\n{}", "Content Statistics".cyan().bold());
        println!("{}", "─".repeat(40));
        println!("{}: {}", "Chapters".bold(), conversion.chapter_count());
        println!("{}: {}", "Original characters".bold(), conversion.original_chars);
        println!("{}: {}", "Cleaned characters".bold(), conversion.cleaned_chars());
        for pass in &conversion.passes {
            println!("  {:<12} {:>10}", pass.pass, -pass.removed());
        }
        if conversion.cleaned_chars() < unepub::options::DEFAULT_MINIMUM_OUTPUT_LENGTH {
            println!("{}", "Below the default minimum length".yellow());
        }
    }

    Ok(())
}

fn print_version() {
    println!("{} {}", "unepub".green().bold(), env!("CARGO_PKG_VERSION"));
    println!("EPUB to chapter-segmented plain text");
    println!();
    println!("Supported formats: EPUB 2/3, XHTML");
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
        .template("{spinner:.blue} {msg}")
    {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn create_progress(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    if let Ok(style) =
        ProgressStyle::default_bar().template("{bar:40.cyan/blue} {pos}/{len} {wide_msg}")
    {
        pb.set_style(style);
    }
    pb
}

fn write_output(path: Option<&Path>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{}", content)?;
        }
    }
    Ok(())
}
