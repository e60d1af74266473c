use crate::error::Error;
use log::info;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

pub const RESULT_OUTPUT: &str = "result";

/// Where the named result is published.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultChannel {
    /// GitHub Actions step output file (`$GITHUB_OUTPUT`).
    GithubOutput(PathBuf),
    Stdout,
}

impl ResultChannel {
    pub fn from_env(github_output: Option<String>) -> Self {
        match github_output {
            Some(path) if !path.is_empty() => ResultChannel::GithubOutput(PathBuf::from(path)),
            _ => ResultChannel::Stdout,
        }
    }

    pub async fn set_output(&self, name: &str, value: &str) -> Result<(), Error> {
        let channel_error = |source| Error::ResultChannel {
            name: name.to_string(),
            source,
        };

        match self {
            ResultChannel::GithubOutput(path) => {
                let record = output_record(name, value).map_err(channel_error)?;
                let mut file = tokio::fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .await
                    .map_err(channel_error)?;
                file.write_all(record.as_bytes())
                    .await
                    .map_err(channel_error)?;
                file.flush().await.map_err(channel_error)
            }
            ResultChannel::Stdout => {
                let mut stdout = tokio::io::stdout();
                stdout
                    .write_all(value.as_bytes())
                    .await
                    .map_err(channel_error)?;
                stdout.flush().await.map_err(channel_error)
            }
        }
    }
}

/// Multiline `name<<DELIM` record understood by the Actions runner.
fn output_record(name: &str, value: &str) -> std::io::Result<String> {
    let delimiter = format!("ghadelimiter_{}", uuid::Uuid::new_v4());
    if name.contains(&delimiter) || value.contains(&delimiter) {
        return Err(std::io::Error::other(format!(
            "value contains the delimiter {delimiter}"
        )));
    }
    Ok(format!("{name}<<{delimiter}\n{value}\n{delimiter}\n"))
}

pub struct Emitter {
    channel: ResultChannel,
    output_file: Option<PathBuf>,
}

impl Emitter {
    pub fn new(channel: ResultChannel, output_file: Option<&Path>) -> Self {
        Self {
            channel,
            output_file: output_file.map(Path::to_path_buf),
        }
    }

    /// Publish `result`, then mirror it to the output file if one is configured.
    pub async fn emit(&self, result: &str) -> Result<(), Error> {
        self.channel.set_output(RESULT_OUTPUT, result).await?;

        if let Some(path) = &self.output_file {
            write_file(path, result).await?;
            info!("Result written to {}", path.display());
        }
        Ok(())
    }
}

async fn write_file(path: &Path, data: &str) -> Result<(), Error> {
    let write_error = |source| Error::FileWrite {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(write_error)?;
    }
    tokio::fs::write(path, data).await.map_err(write_error)
}
