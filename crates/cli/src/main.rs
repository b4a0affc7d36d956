use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use std::time::Instant;

use anyhow::{Context, bail};
use clap::Parser;
use lumpy_core::{
    ArticleUrl, Document, Extraction, ExtractionStage, Extractor, ExtractorConfig, FetchConfig, LumpyError, Pipeline,
    ReadabilityConfig,
};
use owo_colors::OwoColorize;
use url::Url;

mod echo;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Output format for the extracted record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Json,
    Html,
    Text,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "html" => Ok(Self::Html),
            "text" | "txt" => Ok(Self::Text),
            _ => Err(format!("Invalid format: {}. Valid options: json, html, text", s)),
        }
    }
}

/// Fetch a web article and print it as a normalized record
#[derive(Parser, Debug)]
#[command(name = "lumpy")]
#[command(version)]
#[command(about = "Save web articles for offline reading", long_about = None)]
struct Args {
    /// URL to fetch, local HTML file, or "-" for stdin
    #[arg(value_name = "INPUT")]
    input: String,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Output format (json, html, text)
    #[arg(short, long, default_value = "json", value_name = "FORMAT")]
    format: OutputFormat,

    /// Page URL for file or stdin input; the record's identity and link base
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// HTTP timeout in seconds
    #[arg(long, default_value = "10", value_name = "SECS")]
    timeout: u64,

    /// Custom User-Agent for HTTP requests
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Text length below which a second, relaxed readability attempt runs
    #[arg(long, default_value = "500", value_name = "NUM")]
    char_threshold: usize,

    /// Strip images from extracted content
    #[arg(long)]
    no_images: bool,

    /// Fill imageUrl from og:image for readable pages too
    #[arg(long)]
    og_image: bool,

    /// Print progress and a record summary to stderr
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn extractor_config(&self) -> ExtractorConfig {
        ExtractorConfig {
            readability: ReadabilityConfig::builder()
                .char_threshold(self.char_threshold)
                .preserve_images(!self.no_images)
                .build(),
            og_image_for_readable: self.og_image,
        }
    }

    fn fetch_config(&self) -> FetchConfig {
        let mut config = FetchConfig { timeout: self.timeout, ..Default::default() };
        if let Some(user_agent) = &self.user_agent {
            config.user_agent = user_agent.clone();
        }
        config
    }
}

fn is_remote(input: &str) -> bool {
    Url::parse(input).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
}

/// Attaches the failure class to a pipeline error.
fn classified(err: LumpyError) -> anyhow::Error {
    let kind = err.kind();
    anyhow::Error::new(err).context(format!("Failed to save article ({})", kind))
}

async fn fetch_and_extract(args: &Args) -> anyhow::Result<Extraction> {
    if args.verbose {
        echo::print_step(1, 3, &format!("Fetching {}", args.input.bright_white().underline()));
    }

    let pipeline = Pipeline::new(&args.fetch_config(), args.extractor_config()).map_err(classified)?;
    pipeline.process_detailed(&args.input).await.map_err(classified)
}

fn read_and_extract(args: &Args) -> anyhow::Result<Extraction> {
    let Some(base_url) = &args.base_url else {
        bail!("--base-url is required when reading from a file or stdin");
    };
    let url = ArticleUrl::parse(base_url).map_err(classified)?;

    let html = if args.input == "-" {
        if args.verbose {
            echo::print_step(1, 3, "Reading from stdin");
        }
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer).context("Failed to read from stdin")?;
        buffer
    } else {
        if args.verbose {
            echo::print_step(1, 3, &format!("Reading from file {}", args.input.bright_white()));
        }
        fs::read_to_string(&args.input).with_context(|| format!("Failed to read file: {}", args.input))?
    };

    if args.verbose {
        eprintln!("  {} {}", "Size:".dimmed(), echo::format_size(html.len()).bright_white());
    }

    Ok(Extractor::with_config(args.extractor_config()).extract_detailed(&html, &url, url.url()))
}

fn render(extraction: &Extraction, format: OutputFormat) -> anyhow::Result<String> {
    let record = &extraction.record;
    Ok(match format {
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(record).context("Failed to serialize record")?;
            json.push('\n');
            json
        }
        OutputFormat::Html => record.content.clone(),
        OutputFormat::Text => match extraction.stage {
            ExtractionStage::Readability => Document::parse_fragment(&record.content).text_content(),
            ExtractionStage::Metadata => record.content.clone(),
        },
    })
}

async fn run(args: Args) -> anyhow::Result<()> {
    if args.verbose {
        echo::print_banner();
    }

    let started = Instant::now();
    let extraction = if is_remote(&args.input) { fetch_and_extract(&args).await? } else { read_and_extract(&args)? };

    if args.verbose {
        echo::print_step(2, 3, "Extracted article");
        echo::print_timing("Extraction", started.elapsed());
        if extraction.stage == ExtractionStage::Metadata {
            echo::print_warning("No readable body found; record built from page metadata");
        }
        echo::print_record_details(&extraction.record, extraction.stage);
    }

    let output = render(&extraction, args.format)?;

    if args.verbose {
        echo::print_step(3, 3, "Writing output");
        eprintln!("  {} {}", "Format:".dimmed(), format!("{:?}", args.format).bright_white());
    }

    match &args.output {
        Some(path) => {
            fs::write(path, output).with_context(|| format!("Failed to write to file: {}", path.display()))?;
            echo::print_success(&format!("Output written to {}", path.display().bright_white()));
        }
        None => print!("{}", output),
    }

    if args.verbose {
        echo::print_info(&format!("Done in {:.2?}", started.elapsed()));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            echo::print_error(&format!("{:#}", err));
            ExitCode::FAILURE
        }
    }
}
