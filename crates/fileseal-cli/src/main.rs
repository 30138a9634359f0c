//! fileseal: password-protected file envelopes
//!
//! Commands:
//!   encrypt <input> [-o <output>]   - seal a file into <input>.enc
//!   decrypt <input> [-o <output>]   - restore the original bytes and name
//!   inspect <input>                 - show the cleartext name/type of an envelope
//!   config show                     - display the effective configuration

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use secrecy::{ExposeSecret, SecretString};
use std::path::{Path, PathBuf};
use tracing::debug;

use fileseal_core::config::FilesealConfig;

// ── CLI structure ──────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "fileseal",
    version,
    about = "Password-protected file envelopes",
    long_about = "fileseal: encrypt a file with a password (PBKDF2-SHA256 + AES-256-GCM) \
                  and restore it later with its original name and type"
)]
struct Cli {
    /// Path to fileseal.toml configuration file
    #[arg(long, short = 'c', env = "FILESEAL_CONFIG", default_value = "fileseal.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long, env = "FILESEAL_LOG")]
    log: Option<String>,

    /// Log format; overrides the config file
    #[arg(long, env = "FILESEAL_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Encrypt a file into a password-protected envelope
    Encrypt {
        /// File to encrypt
        input: PathBuf,
        /// Destination (default: <input>.enc)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
        /// Overwrite the destination if it exists
        #[arg(long)]
        force: bool,
        /// Password (prompted for when omitted)
        #[arg(long, env = "FILESEAL_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Decrypt an envelope back to the original file
    Decrypt {
        /// Envelope to decrypt
        input: PathBuf,
        /// Destination (default: stored file name, next to the envelope)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
        /// Overwrite the destination if it exists
        #[arg(long)]
        force: bool,
        /// Password (prompted for when omitted)
        #[arg(long, env = "FILESEAL_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Show the cleartext name and type stored in an envelope
    Inspect {
        /// Envelope to inspect
        input: PathBuf,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the active configuration (merged defaults + config file)
    Show,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogFormat {
    Json,
    Text,
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = FilesealConfig::load(&cli.config)
        .await
        .with_context(|| format!("loading config: {}", cli.config.display()))?;

    init_logging(&cli, &config)?;
    debug!(
        version = env!("CARGO_PKG_VERSION"),
        config = %cli.config.display(),
        "fileseal starting"
    );

    match cli.command {
        Commands::Encrypt {
            input,
            output,
            force,
            password,
        } => cmd_encrypt(&config, &input, output.as_deref(), force, password).await,
        Commands::Decrypt {
            input,
            output,
            force,
            password,
        } => cmd_decrypt(&config, &input, output.as_deref(), force, password).await,
        Commands::Inspect { input } => cmd_inspect(&input).await,
        Commands::Config {
            action: ConfigAction::Show,
        } => cmd_config_show(&config, &cli.config),
    }
}

fn init_logging(cli: &Cli, config: &FilesealConfig) -> Result<()> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let level = cli.log.as_deref().unwrap_or(&config.log.level);
    let format = match cli.log_format {
        Some(format) => format,
        None => LogFormat::from_str(&config.log.format, true)
            .map_err(|e| anyhow::anyhow!("log.format: {e}"))?,
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
    Ok(())
}

// ── Password input ────────────────────────────────────────────────────────────

/// Use the flag/env value if given, otherwise prompt on the terminal.
/// `confirm` asks a second time and requires both entries to match.
fn resolve_password(given: Option<String>, confirm: bool) -> Result<SecretString> {
    if let Some(p) = given {
        return Ok(SecretString::from(p));
    }

    let first = SecretString::from(
        rpassword::prompt_password("Password: ").context("reading password")?,
    );
    if confirm {
        let second = SecretString::from(
            rpassword::prompt_password("Confirm password: ").context("reading password")?,
        );
        if first.expose_secret() != second.expose_secret() {
            anyhow::bail!("passwords do not match");
        }
    }
    Ok(first)
}

// ── `fileseal encrypt` ────────────────────────────────────────────────────────

async fn cmd_encrypt(
    config: &FilesealConfig,
    input: &Path,
    output: Option<&Path>,
    force: bool,
    password: Option<String>,
) -> Result<()> {
    let password = resolve_password(password, true)?;

    let report = fileseal_core::artifact::seal_file(config, input, output, password, force)
        .await
        .with_context(|| format!("encrypting {}", input.display()))?;

    println!("Encrypted {} → {}", report.input.display(), report.output.display());
    println!("  name:     {}", report.metadata.name);
    println!("  type:     {}", report.metadata.content_type);
    println!("  payload:  {}", fmt_bytes(report.plaintext_bytes));
    println!("  envelope: {}", fmt_bytes(report.envelope_bytes));
    Ok(())
}

// ── `fileseal decrypt` ────────────────────────────────────────────────────────

async fn cmd_decrypt(
    config: &FilesealConfig,
    input: &Path,
    output: Option<&Path>,
    force: bool,
    password: Option<String>,
) -> Result<()> {
    let password = resolve_password(password, false)?;

    let report = fileseal_core::artifact::open_file(config, input, output, password, force)
        .await
        .with_context(|| format!("decrypting {}", input.display()))?;

    println!("Decrypted {} → {}", report.input.display(), report.output.display());
    println!("  name:    {}", report.metadata.name);
    println!("  type:    {}", report.metadata.content_type);
    println!("  payload: {}", fmt_bytes(report.plaintext_bytes));
    Ok(())
}

// ── `fileseal inspect` ────────────────────────────────────────────────────────

async fn cmd_inspect(input: &Path) -> Result<()> {
    let report = fileseal_core::artifact::inspect_file(input)
        .await
        .with_context(|| format!("inspecting {}", input.display()))?;

    println!("{}", input.display());
    println!("  name:     {}", report.metadata.name);
    println!("  type:     {}", report.metadata.content_type);
    println!("  payload:  {}", fmt_bytes(report.payload_bytes));
    println!("  envelope: {}", fmt_bytes(report.envelope_bytes));
    println!("  (name and type are stored unencrypted and are not tamper-protected)");
    Ok(())
}

// ── `fileseal config show` ────────────────────────────────────────────────────

fn cmd_config_show(config: &FilesealConfig, config_path: &Path) -> Result<()> {
    if config_path.exists() {
        println!("# Configuration from: {}", config_path.display());
    } else {
        println!("# Configuration: defaults (no file at {})", config_path.display());
    }
    println!();
    let rendered = toml::to_string_pretty(config).context("serializing config to TOML")?;
    print!("{rendered}");
    Ok(())
}

// ── Utilities ─────────────────────────────────────────────────────────────────

fn fmt_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
