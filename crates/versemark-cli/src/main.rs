//! Command-line converter from USFM files to JSON.
use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process;
use versemark_config::Config;
use versemark_engine::{ParseOptions, collect_markers, parse_book};

#[derive(Parser, Debug)]
#[command(name = "versemark")]
#[command(about = "Compile a USFM book into text with style blocks, printed as JSON")]
struct Args {
    /// USFM file to read
    input: PathBuf,

    /// Config file to use instead of ~/.config/versemark/config.toml
    #[arg(long)]
    config: Option<PathBuf>,

    /// USFM style sheet (.sty) overriding the configured one
    #[arg(long)]
    stylesheet: Option<PathBuf>,

    /// Exit with status 1 when any error was collected
    #[arg(long)]
    strict: bool,

    /// Treat '¶' as whitespace
    #[arg(long)]
    pilcrow: bool,

    /// Print the lexed marker list instead of the compiled book
    #[arg(long)]
    markers: bool,

    /// Print JSON on a single line
    #[arg(long)]
    compact: bool,
}

/// JSON output and the number of errors collected while producing it.
struct Output {
    json: String,
    error_count: usize,
}

fn load_config(args: &Args) -> Result<Config> {
    let loaded = match &args.config {
        Some(path) => Config::load_from_path(path)?
            .with_context(|| format!("config file '{}' does not exist", path.display()))?,
        None => Config::load()?.unwrap_or_default(),
    };

    let mut config = loaded;
    if let Some(stylesheet) = &args.stylesheet {
        config.stylesheet = Some(stylesheet.clone());
    }
    config.strict |= args.strict;
    config.pilcrow_whitespace |= args.pilcrow;
    Ok(config)
}

fn to_json<T: serde::Serialize>(value: &T, compact: bool) -> Result<String> {
    let json = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    Ok(json)
}

fn run(args: &Args, config: &Config) -> Result<Output> {
    let source = read_input(&args.input)?;
    let options = ParseOptions {
        catalog: config.catalog()?,
        tokenizer: config.tokenizer_options(),
    };

    if args.markers {
        let (markers, errors) = collect_markers(&source, &options.catalog, options.tokenizer)
            .with_context(|| format!("failed to lex '{}'", args.input.display()))?;
        for err in &errors {
            log::warn!("{err}");
        }
        return Ok(Output {
            json: to_json(&markers, args.compact)?,
            error_count: errors.len(),
        });
    }

    let book = parse_book(&source, &options)
        .with_context(|| format!("failed to parse '{}'", args.input.display()))?;
    Ok(Output {
        json: to_json(&book, args.compact)?,
        error_count: book.error_count(),
    })
}

fn read_input(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read '{}'", path.display()))
}

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    log::debug!("using config {config:?}");

    let output = run(&args, &config)?;
    println!("{}", output.json);

    if output.error_count > 0 {
        log::warn!(
            "{} error(s) collected while reading '{}'",
            output.error_count,
            args.input.display()
        );
        if config.strict {
            process::exit(1);
        }
    }
    Ok(())
}
