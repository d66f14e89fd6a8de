use crate::config::PostProcess;
use crate::constants::{exit_codes, verbosity};
use clap::{error::ErrorKind, CommandFactory, Parser};
use log::LevelFilter;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = r#"{about-section}
{usage-heading} {usage}

{all-args}
{after-help}
"#;

/// CLI arguments for statil.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Source directory with templates and meta files.
    #[arg(short = 's', long = "src", visible_alias = "dir", value_name = "DIR")]
    pub src: PathBuf,

    /// Destination directory for rendered files.
    #[arg(short, long, value_name = "DIR")]
    pub out: PathBuf,

    /// Options file (.json, .yaml or .yml), or `-` to read JSON from stdin.
    #[arg(short = 'O', long = "opts", value_name = "FILE")]
    pub opts: Option<PathBuf>,

    /// Directories exposed to templates as the `files` map, never rendered.
    #[arg(short = 'D', long = "dirs", value_name = "DIR")]
    pub dirs: Vec<PathBuf>,

    /// MiniJinja pattern for output paths, e.g. `{{ dir }}/{{ name }}.html`.
    #[arg(long, value_name = "PATTERN")]
    pub rename: Option<String>,

    /// Output paths the rename pattern leaves alone.
    #[arg(long = "rename-except", value_name = "PATH")]
    pub rename_except: Vec<String>,

    /// Post-processors applied to each rendered file (comma-separated).
    #[arg(long = "post-process", value_delimiter = ',')]
    #[arg(value_enum)]
    pub post_process: Vec<PostProcess>,

    /// Globs of template paths to leave out of the output.
    #[arg(long = "ignore", value_name = "GLOB")]
    pub ignore: Vec<String>,

    /// Increase logging verbosity (`-v`, `-vv`, `-vvv`).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// List output paths without writing anything.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

/// Parse command line arguments with custom handling for missing required inputs.
pub fn get_args() -> Args {
    Args::try_parse().unwrap_or_else(|e| {
        if e.kind() == ErrorKind::MissingRequiredArgument {
            let mut command = Args::command().help_template(HELP_TEMPLATE);
            if let Err(print_err) = command.print_help() {
                eprintln!("Failed to display help information: {print_err}");
            } else {
                println!();
            }
            std::process::exit(exit_codes::FAILURE);
        } else {
            e.exit();
        }
    })
}

/// Map `-v` counts to the appropriate log level.
pub fn get_log_level_from_verbose(verbose_count: u8) -> LevelFilter {
    match verbose_count {
        verbosity::OFF => LevelFilter::Error,
        verbosity::INFO => LevelFilter::Info,
        verbosity::DEBUG => LevelFilter::Debug,
        verbosity::TRACE.. => LevelFilter::Trace,
    }
}
