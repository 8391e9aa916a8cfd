use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read warnings config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid warnings config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Top level of the configuration file; everything lives under `[warnings]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct ConfigFile {
    warnings: WarningsConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WarningsConfig {
    /// Filter specs, used as regular expressions
    pub filterwarnings: LineList,
    /// Extra categories registered before any spec is parsed
    pub categories: Vec<CategoryDef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDef {
    pub name: String,
    #[serde(default = "default_parent")]
    pub parent: String,
}

fn default_parent() -> String {
    crate::category::ROOT_CATEGORY.to_string()
}

/// A list of non-blank, trimmed lines.
///
/// Accepts either one multi-line string or an array of strings; array items
/// may themselves span lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawLineList", into = "Vec<String>")]
pub struct LineList(Vec<String>);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawLineList {
    Text(String),
    Items(Vec<String>),
}

impl From<RawLineList> for LineList {
    fn from(raw: RawLineList) -> Self {
        let chunks = match raw {
            RawLineList::Text(text) => vec![text],
            RawLineList::Items(items) => items,
        };
        LineList::from_lines(chunks.iter().flat_map(|chunk| chunk.lines()))
    }
}

impl From<LineList> for Vec<String> {
    fn from(list: LineList) -> Self {
        list.0
    }
}

impl LineList {
    pub fn from_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> Self {
        LineList(
            lines
                .into_iter()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn lines(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

pub fn load_config(path: Option<&Path>) -> Result<WarningsConfig, ConfigError> {
    if let Some(path) = path {
        load_config_from_path(path)
    } else {
        Ok(default_config().clone())
    }
}

pub fn load_config_from_path(path: &Path) -> Result<WarningsConfig, ConfigError> {
    let path_display = path.display().to_string();
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path_display.clone(),
        source,
    })?;

    parse_config(&raw).map_err(|source| ConfigError::Parse {
        path: path_display,
        source,
    })
}

pub fn parse_config(raw: &str) -> Result<WarningsConfig, toml::de::Error> {
    toml::from_str::<ConfigFile>(raw).map(|file| file.warnings)
}

pub fn default_config() -> &'static WarningsConfig {
    static DEFAULT_CONFIG: LazyLock<WarningsConfig> = LazyLock::new(WarningsConfig::default);
    &DEFAULT_CONFIG
}
