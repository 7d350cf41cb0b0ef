//! CLI entry point for `peekdoc`.

use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use humansize::{format_size, BINARY};

use peekdoc::config::PreviewConfig;
use peekdoc::{
    decode_legacy_cjk, decode_mhtml_with, decode_text, detect_charset, resolve_preview_kind,
    CjkVariant, FileMetadata, FsFileSource, PreviewEngine, PreviewError,
};

#[derive(Parser)]
#[command(
    name = "peekdoc",
    version,
    about = "Decode uploaded files for preview: charsets, GBK/BIG5, MHTML and format renderers"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Guess the character encoding of a file
    Detect {
        path: PathBuf,
        /// Advisory charset hint (e.g. gbk, big5, latin1)
        #[arg(long)]
        hint: Option<String>,
        /// Also print the decoded text
        #[arg(long)]
        decode: bool,
    },
    /// Decode a GBK or BIG5 file to UTF-8
    Cjk {
        path: PathBuf,
        #[arg(long, value_enum)]
        variant: VariantArg,
    },
    /// Extract displayable HTML from an MHTML archive
    Mhtml {
        path: PathBuf,
        /// Declared content type, e.g. `multipart/related; boundary=...`
        #[arg(long)]
        content_type: Option<String>,
        /// Write the HTML here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Report which extraction tier produced the HTML
        #[arg(long)]
        tier: bool,
    },
    /// Show the preview kind chosen for a file name
    Kind {
        name: String,
        #[arg(long)]
        content_type: Option<String>,
    },
    /// Print the preview descriptor of a file as JSON
    Preview {
        path: PathBuf,
        #[arg(long)]
        content_type: Option<String>,
        /// Workbook sheet to select
        #[arg(long)]
        sheet: Option<usize>,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate a man page
    Manpage,
}

#[derive(Clone, Copy, ValueEnum)]
enum VariantArg {
    Gbk,
    Big5,
}

impl From<VariantArg> for CjkVariant {
    fn from(arg: VariantArg) -> Self {
        match arg {
            VariantArg::Gbk => CjkVariant::Gbk,
            VariantArg::Big5 => CjkVariant::Big5,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = peekdoc::config::load_config();

    // Configure logging: stderr + optional log file
    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level, &config);

    match cli.command {
        Commands::Detect { path, hint, decode } => cmd_detect(&path, hint.as_deref(), decode),
        Commands::Cjk { path, variant } => cmd_cjk(&path, variant.into()),
        Commands::Mhtml {
            path,
            content_type,
            output,
            tier,
        } => cmd_mhtml(
            &path,
            content_type.as_deref(),
            output.as_deref(),
            tier,
            &config,
        ),
        Commands::Kind { name, content_type } => {
            println!("{}", resolve_preview_kind(&name, content_type.as_deref()));
            Ok(())
        }
        Commands::Preview {
            path,
            content_type,
            sheet,
        } => cmd_preview(&path, content_type, sheet, config),
        Commands::Completions { shell } => cmd_completions(shell),
        Commands::Manpage => cmd_manpage(),
    }
}

/// Set up tracing with stderr output and optional file logging.
fn setup_logging(level: &str, config: &PreviewConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    // Try to set up file logging
    let log_dir = peekdoc::config::cache_dir(config);
    if std::fs::create_dir_all(&log_dir).is_ok() {
        let file_appender = tracing_appender::rolling::never(&log_dir, "peekdoc.log");
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
    } else {
        // Fall back to stderr only
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
    }
}

fn read_input(path: &Path) -> anyhow::Result<Vec<u8>> {
    Ok(std::fs::read(path).map_err(|e| PreviewError::io(path, e))?)
}

/// Print the guessed charset, optionally followed by the decoded text.
fn cmd_detect(path: &Path, hint: Option<&str>, decode: bool) -> anyhow::Result<()> {
    let bytes = read_input(path)?;
    let guess = detect_charset(&bytes, hint);
    println!(
        "{}: {} ({})",
        path.display(),
        guess,
        format_size(bytes.len(), BINARY)
    );
    if decode {
        println!("{}", decode_text(&bytes, hint));
    }
    Ok(())
}

fn cmd_cjk(path: &Path, variant: CjkVariant) -> anyhow::Result<()> {
    let bytes = read_input(path)?;
    println!("{}", decode_legacy_cjk(&bytes, variant));
    Ok(())
}

/// Decode an MHTML archive to HTML on stdout or into `output`.
fn cmd_mhtml(
    path: &Path,
    content_type: Option<&str>,
    output: Option<&Path>,
    show_tier: bool,
    config: &PreviewConfig,
) -> anyhow::Result<()> {
    let bytes = read_input(path)?;
    let outcome = decode_mhtml_with(&bytes, content_type, &config.mhtml_options());
    if show_tier {
        eprintln!("tier: {}", outcome.tier());
    }
    let html = outcome.into_html();
    match output {
        Some(out) => {
            std::fs::write(out, &html).map_err(|e| PreviewError::io(out, e))?;
            eprintln!(
                "Wrote {} to {}",
                format_size(html.len(), BINARY),
                out.display()
            );
        }
        None => println!("{html}"),
    }
    Ok(())
}

/// Build the preview descriptor for a file on disk and print it as JSON.
fn cmd_preview(
    path: &Path,
    content_type: Option<String>,
    sheet: Option<usize>,
    mut config: PreviewConfig,
) -> anyhow::Result<()> {
    if let Some(sheet) = sheet {
        config.render.default_sheet = sheet;
    }
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow::anyhow!("Not a file path: {}", path.display()))?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let engine = PreviewEngine::new(config);
    let metadata = FileMetadata::new(file_name, content_type);
    let descriptor = engine.preview_from(&FsFileSource::new(dir), file_name, &metadata)?;
    println!("{}", serde_json::to_string_pretty(&descriptor)?);
    Ok(())
}

/// Generate shell completions and print to stdout.
fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "peekdoc", &mut std::io::stdout());
    Ok(())
}

/// Generate a man page and print to stdout.
fn cmd_manpage() -> anyhow::Result<()> {
    let cmd = Cli::command();
    let man = clap_mangen::Man::new(cmd);
    let mut buf = Vec::new();
    man.render(&mut buf)?;
    std::io::Write::write_all(&mut std::io::stdout(), &buf)?;
    Ok(())
}
