//! gongwen CLI - official document typesetting tool

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use gongwen::render::{standalone_html, stylesheet, to_json};
use gongwen::{
    Genre, Gongwen, JsonFormat, RenderTarget, RenderedOutput, StyleTable, Vocabulary,
};

type CliResult<T = ()> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[derive(Parser)]
#[command(name = "gongwen")]
#[command(version)]
#[command(about = "Typeset Chinese official documents to HTML, DOCX and PDF", long_about = None)]
struct Cli {
    /// Style overrides (JSON file)
    #[arg(long, global = true, value_name = "JSON", env = "GONGWEN_STYLES")]
    styles: Option<PathBuf>,

    /// Classification vocabulary (JSON file)
    #[arg(long, global = true, value_name = "JSON", env = "GONGWEN_VOCABULARY")]
    vocabulary: Option<PathBuf>,

    /// Document title, used verbatim
    #[arg(long, global = true)]
    title: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the HTML preview
    #[command(alias = "html")]
    Preview {
        /// Input text file, or - for stdin
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Emit a full page with the stylesheet
        #[arg(long)]
        standalone: bool,
    },

    /// Render a DOCX document
    #[command(alias = "word")]
    Docx {
        /// Input text file, or - for stdin
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (derived from the title if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Render a PDF document
    Pdf {
        /// Input text file, or - for stdin
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (derived from the title if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Omit page numbers
        #[arg(long)]
        no_page_numbers: bool,
    },

    /// Render every target for each input
    Convert {
        /// Input text files
        #[arg(value_name = "FILE", required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
    },

    /// Show the analysed document as JSON
    Inspect {
        /// Input text file, or - for stdin
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Show the resolved style table
    Styles {
        /// Genre slug (standard, report, notice, minutes, red-header, request, reply)
        #[arg(long)]
        genre: Option<String>,

        /// Print the preview stylesheet instead of JSON
        #[arg(long)]
        css: bool,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = run(cli);

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> CliResult {
    let Some(command) = cli.command else {
        println!("{}", "Usage: gongwen <COMMAND> <FILE>".yellow());
        println!("       gongwen --help for more information");
        return Ok(());
    };

    let styles = load_styles(cli.styles.as_deref())?;
    let title = cli.title.as_deref();

    match command {
        Commands::Version => {
            cmd_version();
            Ok(())
        }
        Commands::Styles { genre, css } => cmd_styles(&styles, genre.as_deref(), css),
        command => {
            let pipeline = build_pipeline(styles, cli.vocabulary.as_deref())?;
            match command {
                Commands::Preview {
                    input,
                    output,
                    standalone,
                } => cmd_preview(&pipeline, &input, output.as_deref(), title, standalone),
                Commands::Docx { input, output } => cmd_binary(
                    &pipeline,
                    &input,
                    output.as_deref(),
                    title,
                    RenderTarget::PageDescription,
                ),
                Commands::Pdf {
                    input,
                    output,
                    no_page_numbers,
                } => {
                    let options = pipeline
                        .render_options()
                        .clone()
                        .with_page_numbers(!no_page_numbers);
                    let pipeline = pipeline.with_render_options(options);
                    cmd_binary(
                        &pipeline,
                        &input,
                        output.as_deref(),
                        title,
                        RenderTarget::PrintDocument,
                    )
                }
                Commands::Convert { inputs, output } => {
                    cmd_convert(&pipeline, &inputs, output.as_deref(), title)
                }
                Commands::Inspect { input, compact } => cmd_inspect(&pipeline, &input, title, compact),
                Commands::Version | Commands::Styles { .. } => Ok(()),
            }
        }
    }
}

fn load_styles(path: Option<&Path>) -> CliResult<StyleTable> {
    match path {
        Some(path) => {
            let json = fs::read_to_string(path)?;
            log::debug!("Loading style overrides from {}", path.display());
            Ok(StyleTable::standard().with_overrides_json(&json)?)
        }
        None => Ok(StyleTable::standard()),
    }
}

fn build_pipeline(styles: StyleTable, vocabulary: Option<&Path>) -> CliResult<Gongwen> {
    let mut pipeline = Gongwen::new().with_styles(styles);
    if let Some(path) = vocabulary {
        let json = fs::read_to_string(path)?;
        pipeline = pipeline.with_vocabulary(Vocabulary::from_json(&json)?);
    }
    Ok(pipeline)
}

fn read_input(input: &Path) -> CliResult<String> {
    if input.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

/// File name stem from the title or input stem; anything other than ASCII
/// alphanumerics and CJK ideographs becomes `_`.
fn output_stem(title: Option<&str>, input: &Path) -> String {
    let source = title
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .or_else(|| {
            input
                .file_stem()
                .filter(|_| input.as_os_str() != "-")
                .map(|s| s.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "document".to_string());

    source
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || ('\u{4e00}'..='\u{9fa5}').contains(&c) {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn cmd_preview(
    pipeline: &Gongwen,
    input: &Path,
    output: Option<&Path>,
    title: Option<&str>,
    standalone: bool,
) -> CliResult {
    let raw = read_input(input)?;
    let doc = pipeline.analyze(&raw, title);
    let rendered = pipeline.render_model(&doc, RenderTarget::PreviewHtml)?;
    let fragment = rendered.as_str().unwrap_or_default();

    let html = if standalone {
        let css = stylesheet(pipeline.styles(), doc.genre);
        standalone_html(fragment, &css, title)
    } else {
        fragment.to_string()
    };

    if let Some(path) = output {
        fs::write(path, &html)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", html);
    }

    Ok(())
}

fn cmd_binary(
    pipeline: &Gongwen,
    input: &Path,
    output: Option<&Path>,
    title: Option<&str>,
    target: RenderTarget,
) -> CliResult {
    let raw = read_input(input)?;
    let rendered = pipeline.render(&raw, title, target)?;

    let path = output.map(Path::to_path_buf).unwrap_or_else(|| {
        PathBuf::from(format!("{}.{}", output_stem(title, input), target.extension()))
    });
    rendered.save(&path)?;

    print_summary(&rendered);
    println!("{} {}", "Saved to".green(), path.display());
    Ok(())
}

fn print_summary(rendered: &RenderedOutput) {
    let stats = &rendered.stats;
    let mut line = format!(
        "{} units, {} headings, {} list items, {} bytes",
        stats.unit_count,
        stats.heading_count,
        stats.list_item_count,
        rendered.len()
    );
    if stats.page_count > 0 {
        line.push_str(&format!(", {} pages", stats.page_count));
    }
    println!("{}", line.dimmed());
}

fn cmd_convert(
    pipeline: &Gongwen,
    inputs: &[PathBuf],
    output: Option<&Path>,
    title: Option<&str>,
) -> CliResult {
    let output_dir = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("gongwen_output"));
    fs::create_dir_all(&output_dir)?;

    let pb = ProgressBar::new((inputs.len() * RenderTarget::ALL.len()) as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let results: Vec<(PathBuf, CliResult<Vec<PathBuf>>)> = inputs
        .par_iter()
        .map(|input| {
            let result = convert_one(pipeline, input, &output_dir, title, &pb);
            (input.clone(), result)
        })
        .collect();

    pb.finish_with_message("Done!");

    println!("\n{}", "Output files:".green().bold());
    let mut failures = 0;
    for (input, result) in &results {
        match result {
            Ok(paths) => {
                for (i, path) in paths.iter().enumerate() {
                    let branch = if i + 1 == paths.len() { "└─" } else { "├─" };
                    println!("  {} {}", branch.dimmed(), path.display());
                }
            }
            Err(e) => {
                failures += 1;
                eprintln!("  {} {}: {}", "✗".red(), input.display(), e);
            }
        }
    }

    if failures > 0 {
        return Err(format!("{} of {} inputs failed", failures, inputs.len()).into());
    }
    Ok(())
}

fn convert_one(
    pipeline: &Gongwen,
    input: &Path,
    output_dir: &Path,
    title: Option<&str>,
    pb: &ProgressBar,
) -> CliResult<Vec<PathBuf>> {
    let raw = read_input(input)?;
    let doc = pipeline.analyze(&raw, title);
    let stem = output_stem(None, input);

    let mut paths = Vec::new();
    for target in RenderTarget::ALL {
        pb.set_message(format!("{} → {}", input.display(), target));
        let rendered = pipeline.render_model(&doc, target)?;
        let path = output_dir.join(format!("{}.{}", stem, target.extension()));
        rendered.save(&path)?;
        paths.push(path);
        pb.inc(1);
    }
    Ok(paths)
}

fn cmd_inspect(pipeline: &Gongwen, input: &Path, title: Option<&str>, compact: bool) -> CliResult {
    let raw = read_input(input)?;
    let doc = pipeline.analyze(&raw, title);

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };
    println!("{}", to_json(&doc, format)?);

    Ok(())
}

fn cmd_styles(styles: &StyleTable, genre: Option<&str>, css: bool) -> CliResult {
    let genre = match genre {
        Some(slug) => Some(Genre::from_slug(slug).ok_or_else(|| format!("Unknown genre: {}", slug))?),
        None => None,
    };

    if css {
        println!("{}", stylesheet(styles, genre.unwrap_or_default()));
        return Ok(());
    }

    let json = match genre {
        Some(genre) => serde_json::to_string_pretty(&styles.rules_for(genre))?,
        None => serde_json::to_string_pretty(styles)?,
    };
    println!("{}", json);
    Ok(())
}

fn cmd_version() {
    println!("{} {}", "gongwen".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Chinese official document typesetting tool");
    println!();
    println!("Targets: preview (HTML), docx, pdf");
    println!("License: MIT");
}
