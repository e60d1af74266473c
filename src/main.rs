mod config;
mod error;
mod input;
mod output;
mod pipeline;
mod text;

use clap::Parser;
use config::{Config, load_config};
use error::Error;
use log::error;
use output::{Emitter, ResultChannel};
use std::collections::BTreeMap;
use std::path::PathBuf;

// ============================================================================
// CLI
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "keysub",
    about = "Case-insensitive key substitution for text and files",
    long_about = "Replaces wrapped keys in the input text with their values.\n\n\
                  Substitutions come from --set flags, the [substitutions] table of the \
                  config file and INPUT_<KEY> environment variables. Options may also be \
                  given as INPUT__INPUT-TEXT, INPUT__INPUT-FILE, INPUT__OUTPUT-FILE and \
                  INPUT__FORMAT-KEY, which is how GitHub Actions passes step inputs."
)]
struct Cli {
    /// Inline input text; takes precedence over --input-file
    #[arg(short = 't', long)]
    input_text: Option<String>,

    /// Read the input text from this file
    #[arg(short, long)]
    input_file: Option<PathBuf>,

    /// Also write the result to this file, creating parent directories
    #[arg(short, long)]
    output_file: Option<PathBuf>,

    /// Template wrapping each key, e.g. "{{key}}"
    #[arg(short, long)]
    format_key: Option<String>,

    /// Substitution entry, repeatable
    #[arg(short, long = "set", value_name = "KEY=VALUE", value_parser = parse_substitution)]
    substitutions: Vec<(String, String)>,

    /// Config file (defaults to keysub.toml in the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl Cli {
    fn overrides(&self) -> Config {
        Config {
            input_text: self.input_text.clone(),
            input_file: self.input_file.clone(),
            output_file: self.output_file.clone(),
            format_key: self.format_key.clone(),
            substitutions: self.substitutions.iter().cloned().collect::<BTreeMap<_, _>>(),
        }
    }
}

fn parse_substitution(arg: &str) -> Result<(String, String), String> {
    arg.split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("invalid substitution '{arg}', expected KEY=VALUE"))
}

// ============================================================================
// Environment
// ============================================================================

fn env_vars() -> Vec<(String, String)> {
    std::env::vars_os()
        .filter_map(|(name, value)| Some((name.into_string().ok()?, value.into_string().ok()?)))
        .collect()
}

fn in_github_actions() -> bool {
    std::env::var("GITHUB_ACTIONS").as_deref() == Ok("true")
}

fn default_log_level() -> &'static str {
    if std::env::var("RUNNER_DEBUG").as_deref() == Ok("1") {
        "debug"
    } else {
        "info"
    }
}

/// Escape a message for a workflow command such as `::error::`.
fn escape_command_data(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

// ============================================================================
// Main
// ============================================================================

async fn run(cli: Cli) -> Result<(), Error> {
    let config = load_config(cli.config.as_deref(), env_vars(), cli.overrides())?;
    let channel = ResultChannel::from_env(std::env::var("GITHUB_OUTPUT").ok());
    let emitter = Emitter::new(channel, config.output_file());

    pipeline::run(&config, &emitter).await?;
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    env_logger::Builder::from_env(
        env_logger::Env::new().filter_or("KEYSUB_LOG", default_log_level()),
    )
    .init();

    if let Err(e) = run(cli).await {
        error!("{e}");
        if in_github_actions() {
            println!("::error::{}", escape_command_data(&e.to_string()));
        }
        std::process::exit(1);
    }
}
