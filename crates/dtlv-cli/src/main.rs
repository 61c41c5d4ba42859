/// dtlv command-line tool: inspect, validate and encode captured
/// diagnostic record messages.
///
/// # Command overview
///
/// ```text
/// dtlv <COMMAND> [OPTIONS]
///
/// Commands:
///   inspect    Decode a message and print every stored record
///   validate   Check that a message decodes cleanly
///   encode     Build a message from a JSON manifest
///   help       Print help information
///
/// Global options:
///   -v, --verbose    More log output on stderr (repeat for more)
///   -h, --help       Print help
///   -V, --version    Print version
/// ```
///
/// # Exit codes
///
/// | Code | Meaning                                        |
/// |------|------------------------------------------------|
/// | 0    | Success                                        |
/// | 1    | Error (I/O failure, rejected message, etc.)    |
///
/// Logs and error details go to stderr so stdout can be piped cleanly.
/// `RUST_LOG` overrides the level chosen by `-v`.
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod cmd_encode;
mod cmd_inspect;
mod cmd_validate;
mod input;
mod policy;

use policy::PolicyArgs;

// ── CLI root ──────────────────────────────────────────────────────────────────

/// Bounded decoder for untrusted TLV diagnostic records.
#[derive(Parser)]
#[command(name = "dtlv", version, about = "Diagnostic TLV record tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

// ── Sub-commands ──────────────────────────────────────────────────────────────

#[derive(Subcommand)]
enum Commands {
    /// Decode a message and print the report and every stored record.
    Inspect(InspectArgs),
    /// Check that a message decodes completely with nothing rejected.
    Validate(ValidateArgs),
    /// Build a message from a JSON manifest.
    Encode(EncodeArgs),
}

// ── Argument structs ──────────────────────────────────────────────────────────

/// Arguments for `dtlv inspect`.
///
/// ```text
/// ┌────────────────┬───────────────────────────────────────────────────┐
/// │ Flag           │ Effect                                            │
/// ├────────────────┼───────────────────────────────────────────────────┤
/// │ --hex          │ Input file holds hex text instead of raw bytes    │
/// │ --show-payload │ Hex dump of each stored payload, 16 bytes a line  │
/// │ policy flags   │ See `PolicyArgs`                                  │
/// └────────────────┴───────────────────────────────────────────────────┘
/// ```
#[derive(clap::Args)]
pub struct InspectArgs {
    /// Message file to decode.
    pub file: PathBuf,

    /// Read the file as hex text (whitespace ignored).
    #[arg(long)]
    pub hex: bool,

    /// Print a hex dump of each stored payload.
    #[arg(long)]
    pub show_payload: bool,

    #[command(flatten)]
    pub policy: PolicyArgs,
}

/// Arguments for `dtlv validate`.
///
/// Exits 0 only when the message decodes `Complete` with zero rejected
/// records under the given policies.
#[derive(clap::Args)]
pub struct ValidateArgs {
    /// Message file to validate.
    pub file: PathBuf,

    /// Read the file as hex text (whitespace ignored).
    #[arg(long)]
    pub hex: bool,

    #[command(flatten)]
    pub policy: PolicyArgs,
}

/// Arguments for `dtlv encode`.
///
/// Reads a JSON manifest of records and writes the encoded message. See
/// `cmd_encode` for the manifest format.
#[derive(clap::Args)]
pub struct EncodeArgs {
    /// JSON manifest describing the records.
    pub input: PathBuf,

    /// Output message file.
    #[arg(short, long)]
    pub output: PathBuf,

    /// Write lowercase hex text instead of raw bytes.
    #[arg(long)]
    pub hex: bool,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Inspect(args) => cmd_inspect::run(&args),
        Commands::Validate(args) => cmd_validate::run(&args),
        Commands::Encode(args) => cmd_encode::run(&args),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    format!("dtlv={level},dtlv_decoder={level},dtlv_store={level}").into()
                }),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}
