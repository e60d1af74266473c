use crate::error::Error;
use log::{debug, warn};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// GitHub Actions exposes step inputs as `INPUT_<NAME>` variables.
const INPUT_PREFIX: &str = "INPUT_";
/// Inputs whose name starts with this marker configure the tool itself.
const INTERNAL_MARKER: char = '_';

pub const DEFAULT_FORMAT_KEY: &str = "key";

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub input_text: Option<String>,
    #[serde(default)]
    pub input_file: Option<PathBuf>,
    #[serde(default)]
    pub output_file: Option<PathBuf>,
    #[serde(default)]
    pub format_key: Option<String>,
    #[serde(default)]
    pub substitutions: BTreeMap<String, String>,
}

impl Config {
    /// Template used to wrap each key, falling back to `key` when unset or empty.
    pub fn format_key(&self) -> &str {
        self.format_key
            .as_deref()
            .filter(|template| !template.is_empty())
            .unwrap_or(DEFAULT_FORMAT_KEY)
    }

    /// Output path, ignoring an empty value.
    pub fn output_file(&self) -> Option<&Path> {
        self.output_file
            .as_deref()
            .filter(|path| !path.as_os_str().is_empty())
    }

    /// Overlay `upper` on top of `self`. Set options win; substitution maps merge.
    ///
    /// The input source is taken as a whole: an upper layer naming only an
    /// input file drops inline text from the lower layers.
    pub fn layer(mut self, upper: Config) -> Config {
        if upper.input_text.is_some() {
            self.input_text = upper.input_text;
        } else if upper.input_file.is_some() {
            self.input_text = None;
        }
        if upper.input_file.is_some() {
            self.input_file = upper.input_file;
        }
        if upper.output_file.is_some() {
            self.output_file = upper.output_file;
        }
        if upper.format_key.is_some() {
            self.format_key = upper.format_key;
        }
        self.substitutions.extend(upper.substitutions);
        self
    }

    /// Build a config from the `INPUT_*` namespace.
    pub fn from_env<I>(vars: I) -> Config
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: Vec<(String, String)> = vars.into_iter().collect();
        let raw = |name: &str| -> Option<String> {
            let var = format!("{INPUT_PREFIX}{INTERNAL_MARKER}{}", name.to_uppercase());
            vars.iter()
                .find(|(key, _)| *key == var)
                .map(|(_, value)| value.clone())
        };
        // Paths and templates are trimmed like Actions inputs; the subject text is kept verbatim.
        let option = |name: &str| {
            raw(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Config {
            input_text: raw("input-text"),
            input_file: option("input-file").map(PathBuf::from),
            output_file: option("output-file").map(PathBuf::from),
            format_key: option("format-key"),
            substitutions: substitutions_from_env(vars.iter().cloned()),
        }
    }

    pub fn from_toml(content: &str, path: &Path) -> Result<Config, Error> {
        toml::from_str(content).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Public `INPUT_<KEY>` entries become substitutions keyed by `<KEY>`.
pub fn substitutions_from_env<I>(vars: I) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = (String, String)>,
{
    vars.into_iter()
        .filter_map(|(name, value)| {
            let key = name.strip_prefix(INPUT_PREFIX)?;
            if key.starts_with(INTERNAL_MARKER) {
                return None;
            }
            Some((key.to_string(), value))
        })
        .collect()
}

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("keysub.toml"))
}

/// Read the config file layer.
///
/// An explicit path must exist and parse. The default path is optional, and a
/// broken default file is reported and skipped.
pub fn load_file_layer(explicit: Option<&Path>) -> Result<Config, Error> {
    if let Some(path) = explicit {
        let content = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        return Config::from_toml(&content, path);
    }

    let Some(path) = config_path() else {
        return Ok(Config::default());
    };
    let Ok(content) = std::fs::read_to_string(&path) else {
        return Ok(Config::default());
    };
    match Config::from_toml(&content, &path) {
        Ok(config) => {
            debug!("loaded config from {path:?}");
            Ok(config)
        }
        Err(e) => {
            warn!("{e}");
            Ok(Config::default())
        }
    }
}

/// Resolve the final config: file, then environment, then command line.
pub fn load_config<I>(explicit: Option<&Path>, env: I, cli: Config) -> Result<Config, Error>
where
    I: IntoIterator<Item = (String, String)>,
{
    let config = load_file_layer(explicit)?
        .layer(Config::from_env(env))
        .layer(cli);

    debug!(
        "format_key={:?} substitutions={}",
        config.format_key(),
        config.substitutions.len()
    );
    Ok(config)
}
