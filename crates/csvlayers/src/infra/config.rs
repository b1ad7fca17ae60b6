//! Configuration management utilities.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dirs_next::config_dir;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

static DEFAULT_CONFIG: Lazy<&'static str> =
    Lazy::new(|| include_str!("../../assets/default-config.toml"));
static DEFAULT_WORKSPACE_CONFIG_PATH: &str = ".csvlayers/config.toml";

/// Layered configuration loaded from defaults, user, workspace, and env.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub scan: Scan,
    #[serde(default)]
    pub ignore: Ignore,
    #[serde(default)]
    pub fields: Fields,
    #[serde(default)]
    pub layer: Layer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scan {
    /// File extensions shown in the picker, matched case-sensitively.
    #[serde(default = "Scan::default_extensions")]
    pub extensions: Vec<String>,
    #[serde(default = "Scan::default_show_hidden")]
    pub show_hidden: bool,
}

impl Scan {
    fn default_extensions() -> Vec<String> {
        vec!["csv".into(), "tsv".into()]
    }

    fn default_show_hidden() -> bool {
        true
    }
}

impl Default for Scan {
    fn default() -> Self {
        Self {
            extensions: Self::default_extensions(),
            show_hidden: Self::default_show_hidden(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Ignore {
    #[serde(default)]
    pub paths: Vec<String>,
    #[serde(default)]
    pub globs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fields {
    #[serde(default = "Fields::default_x_candidates")]
    pub x_candidates: Vec<String>,
    #[serde(default = "Fields::default_y_candidates")]
    pub y_candidates: Vec<String>,
    #[serde(default)]
    pub x: String,
    #[serde(default)]
    pub y: String,
}

impl Fields {
    fn default_x_candidates() -> Vec<String> {
        vec!["lon".into(), "longitude".into(), "x".into()]
    }

    fn default_y_candidates() -> Vec<String> {
        vec!["lat".into(), "latitude".into(), "y".into()]
    }

    /// Preferred X column names, explicit choice first.
    pub fn x_preferences(&self) -> Vec<&str> {
        preferences(&self.x, &self.x_candidates)
    }

    /// Preferred Y column names, explicit choice first.
    pub fn y_preferences(&self) -> Vec<&str> {
        preferences(&self.y, &self.y_candidates)
    }
}

fn preferences<'a>(explicit: &'a str, candidates: &'a [String]) -> Vec<&'a str> {
    let explicit = explicit.trim();
    std::iter::once(explicit)
        .filter(|name| !name.is_empty())
        .chain(candidates.iter().map(String::as_str))
        .collect()
}

impl Default for Fields {
    fn default() -> Self {
        Self {
            x_candidates: Self::default_x_candidates(),
            y_candidates: Self::default_y_candidates(),
            x: String::new(),
            y: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layer {
    /// Reject files whose coordinate columns hold non-numeric values.
    #[serde(default = "Layer::default_strict_coordinates")]
    pub strict_coordinates: bool,
}

impl Layer {
    fn default_strict_coordinates() -> bool {
        true
    }
}

impl Default for Layer {
    fn default() -> Self {
        Self {
            strict_coordinates: Self::default_strict_coordinates(),
        }
    }
}

/// Environment overrides for the coordinate field preferences.
#[derive(Debug, Default, Clone)]
pub struct EnvOverrides {
    x_field: Option<String>,
    y_field: Option<String>,
}

impl EnvOverrides {
    fn from_env() -> Self {
        Self {
            x_field: env::var("CSVLAYERS_X_FIELD").ok(),
            y_field: env::var("CSVLAYERS_Y_FIELD").ok(),
        }
    }

    #[cfg(test)]
    fn for_tests(x_field: &str, y_field: &str) -> Self {
        Self {
            x_field: Some(x_field.to_owned()),
            y_field: Some(y_field.to_owned()),
        }
    }
}

impl Config {
    /// Load configuration from defaults, user/global config, workspace config, and env overrides.
    pub fn load() -> Result<Self> {
        let env = EnvOverrides::from_env();
        let global = global_config_path();
        let workspace = workspace_config_path()?;
        Self::load_with_layers(global, workspace, env)
    }

    /// Load defaults plus a single explicit file, skipping discovery.
    pub fn load_from(path: &Path) -> Result<Self> {
        Self::load_with_layers(None, Some(path.to_path_buf()), EnvOverrides::from_env())
    }

    fn load_with_layers(
        global: Option<PathBuf>,
        workspace: Option<PathBuf>,
        env_overrides: EnvOverrides,
    ) -> Result<Self> {
        let mut merged = parse_table(&DEFAULT_CONFIG).context("invalid bundled config")?;

        for path in [global, workspace].into_iter().flatten() {
            if path.exists() {
                merge_tables(&mut merged, read_table(&path)?);
            }
        }

        let config: Config = toml::Value::Table(merged)
            .try_into()
            .context("failed to apply layered config")?;
        Ok(apply_env_overrides(config, env_overrides))
    }
}

fn read_table(path: &Path) -> Result<toml::Table> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;
    parse_table(&data).with_context(|| format!("invalid config file: {}", path.display()))
}

fn parse_table(contents: &str) -> Result<toml::Table> {
    let table = contents
        .parse::<toml::Table>()
        .context("failed to parse TOML config")?;
    // Type errors are reported against the file that holds them.
    toml::Value::Table(table.clone())
        .try_into::<Config>()
        .context("config does not match the expected schema")?;
    Ok(table)
}

/// Lay `overlay` over `base`. A key set in `overlay` wins even when it
/// repeats a default, nested tables merge key by key, and the `[ignore]`
/// lists accumulate across layers.
fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(nested)) => {
                if key == "ignore" {
                    union_lists(existing, nested);
                } else {
                    merge_tables(existing, nested);
                }
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

fn union_lists(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Array(existing)), toml::Value::Array(items)) => {
                for item in items {
                    if !existing.contains(&item) {
                        existing.push(item);
                    }
                }
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

fn global_config_path() -> Option<PathBuf> {
    config_dir().map(|base| base.join("csvlayers/config.toml"))
}

fn workspace_config_path() -> Result<Option<PathBuf>> {
    let cwd = env::current_dir()?;
    let root = find_workspace_root(&cwd).unwrap_or(cwd);
    Ok(Some(root.join(DEFAULT_WORKSPACE_CONFIG_PATH)))
}

fn find_workspace_root(start: &Path) -> Option<PathBuf> {
    let mut current = start;
    loop {
        if current.join(DEFAULT_WORKSPACE_CONFIG_PATH).exists() {
            return Some(current.to_path_buf());
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => return None,
        }
    }
}

fn apply_env_overrides(mut config: Config, env: EnvOverrides) -> Config {
    if let Some(x_field) = env.x_field {
        config.fields.x = x_field;
    }
    if let Some(y_field) = env.y_field {
        config.fields.y = y_field;
    }
    config
}
