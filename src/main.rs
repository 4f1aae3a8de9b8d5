//! Chocolate CLI
//!
//! Usage:
//!   chocolate [OPTIONS] [FILE]
//!
//! Options:
//!   -W, --width <N>      Viewport width in cells (default 80)
//!   -H, --height <N>     Viewport height in cells (default 24)
//!   -t, --theme <FILE>   Theme file with frame styles (TOML format)
//!   -d, --debug          Label panels and log at debug level
//!   --check              Print resolved panel geometry instead of the frame
//!   -h, --help           Print help

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use chocolate::{
    render_with_config, resolve_with_config, DocumentError, RenderConfig, RenderError, Theme,
};

#[derive(Parser)]
#[command(name = "chocolate")]
#[command(about = "Constraint-based layout for terminal panels")]
struct Cli {
    /// Layout document (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Viewport width in cells
    #[arg(short = 'W', long, default_value_t = 80)]
    width: usize,

    /// Viewport height in cells
    #[arg(short = 'H', long, default_value_t = 24)]
    height: usize,

    /// Theme file with frame styles (TOML format)
    #[arg(short, long)]
    theme: Option<PathBuf>,

    /// Label panels with their names and log at debug level
    #[arg(short, long)]
    debug: bool,

    /// Print `name x y width height` for each root panel instead of the frame
    #[arg(long)]
    check: bool,
}

/// Log to stderr, filtered by RUST_LOG (default `warn`)
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let console_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_target(true)
        .with_filter(filter);

    tracing_subscriber::registry().with(console_layer).init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    // Load theme
    let theme = match &cli.theme {
        Some(path) => match Theme::from_file(path) {
            Ok(t) => t,
            Err(e) => {
                eprintln!("Error loading theme '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => Theme::default(),
    };

    // Read input
    let (source, filename) = match &cli.input {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => (content, path.display().to_string()),
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => (buffer, "<stdin>".to_string()),
                Err(e) => {
                    eprintln!("Error reading from stdin: {}", e);
                    std::process::exit(1);
                }
            }
        }
    };

    let config = RenderConfig::new()
        .with_theme(theme)
        .with_size(cli.width, cli.height)
        .with_debug(cli.debug);

    let result = if cli.check {
        resolve_with_config(&source, config).map(|panels| {
            panels
                .iter()
                .map(|(name, g)| format!("{} {} {} {} {}", name, g.x, g.y, g.width, g.height))
                .collect::<Vec<_>>()
                .join("\n")
        })
    } else {
        render_with_config(&source, config)
    };

    match result {
        Ok(output) => println!("{}", output),
        Err(RenderError::Document(DocumentError::Rules { rules, errors })) => {
            for error in &errors {
                eprint!("{}", error.format(&rules, &filename));
            }
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
