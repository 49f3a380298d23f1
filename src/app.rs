//! Application orchestration and command routing.
//!
//! Handles command-line argument parsing and delegates to appropriate command handlers.

use crate::commands;
use crate::logging;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::process;

/// A terminal-based audio visualizer with a scrolling spectral waterfall
#[derive(Parser)]
#[command(name = "specfall")]
#[command(version)]
#[command(about = "Live microphone spectrum and waveform, rendered as a terminal waterfall")]
#[command(
    long_about = "specfall listens to an audio input device and renders two live views:\n\
a time-domain waveform and a frequency-domain waterfall where each sampling\n\
tick becomes one colorized row that recedes over time.\n\n\
DEFAULT COMMAND:\n    If no command is specified, 'view' is used by default.\n\n\
EXAMPLES:\n    # Visualize the default input device\n    $ specfall\n\n    \
# Visualize a specific device, oscillator disabled\n    $ specfall view --device 2 --no-oscillate\n\n    \
# See which input devices are available\n    $ specfall list-devices\n\n    \
# Edit configuration file\n    $ specfall config"
)]
#[command(
    after_help = "CONFIGURATION:\n    Config file:        ~/.config/specfall/specfall.toml\n    Logs:               ~/.local/state/specfall/specfall.log.*"
)]
struct Cli {
    /// Audio input device: "default", a device name, or a numeric index (view default command)
    #[arg(short, long)]
    device: Option<String>,

    /// Start with the cutoff/zoom oscillator disabled (view default command)
    #[arg(long)]
    no_oscillate: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Visualize live audio (default)
    ///
    /// Press Space to pause, 'o' to toggle the oscillator, arrow keys to
    /// adjust cutoff and zoom, Escape/q to quit.
    #[command(visible_alias = "v")]
    View {
        /// Audio input device: "default", a device name, or a numeric index
        #[arg(short, long)]
        device: Option<String>,

        /// Start with the cutoff/zoom oscillator disabled
        #[arg(long)]
        no_oscillate: bool,
    },

    /// List available audio input devices
    ///
    /// Shows device IDs, names, and configurations to help configure
    /// the correct input device in specfall.toml.
    #[command(name = "list-devices")]
    ListDevices,

    /// Open configuration file in your preferred editor
    ///
    /// Edit audio and view settings. Uses $EDITOR environment variable
    /// or falls back to nano/vi.
    #[command(visible_alias = "c")]
    Config,

    /// Show recent log entries from the application
    ///
    /// Display the last 50 lines of the most recent log file.
    /// Useful for troubleshooting issues.
    Logs,

    /// Generate shell completion script
    ///
    /// Generate completion script for your shell. Save the output to your
    /// shell's completion directory or source it directly.
    ///
    /// Examples:
    ///   specfall completions bash > specfall.bash
    ///   specfall completions zsh > _specfall
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Runs the main application based on command-line arguments.
///
/// # Exit Codes
/// - 0: Success
/// - 1: General error
/// - 2: Usage error (invalid arguments)
///
/// # Errors
/// - If logging initialization fails
/// - If command execution fails (e.g., device acquisition, rendering)
pub async fn run() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Handle commands that don't need logging or config setup
    match &cli.command {
        Some(Commands::Completions { shell }) => {
            generate(*shell, &mut Cli::command(), "specfall", &mut io::stdout());
            return Ok(());
        }
        Some(Commands::ListDevices) => {
            return match commands::handle_list_devices() {
                Ok(()) => Ok(()),
                Err(e) => {
                    eprintln!("Error: {e}");
                    process::exit(1);
                }
            };
        }
        Some(Commands::Logs) => {
            return match commands::handle_logs() {
                Ok(()) => Ok(()),
                Err(e) => {
                    eprintln!("Error: {e}");
                    process::exit(1);
                }
            };
        }
        _ => {}
    }

    // Initialize logging for all other commands
    logging::init_logging()?;

    // Route to appropriate command handler
    match cli.command {
        None | Some(Commands::View { .. }) => {
            // Default command is view
            // Merge top-level options with explicit view command options
            let (device, no_oscillate) = match cli.command {
                Some(Commands::View {
                    device,
                    no_oscillate,
                }) => (device, no_oscillate),
                None => (cli.device, cli.no_oscillate),
                _ => unreachable!(),
            };
            commands::handle_view(device, no_oscillate).await?;
        }
        Some(Commands::Config) => {
            commands::handle_config()?;
        }
        Some(Commands::Completions { .. }) | Some(Commands::ListDevices) | Some(Commands::Logs) => {
            unreachable!("These commands are handled earlier")
        }
    }

    Ok(())
}
