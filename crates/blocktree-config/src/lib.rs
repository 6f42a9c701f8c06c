use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

/// Tunables for the tree reconciler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    /// Element kinds that are dropped from an incoming tree when they have no children.
    pub collapsible_empty: Vec<String>,
    /// Element kinds that are always replaced wholesale rather than patched in place.
    pub force_replace: Vec<String>,
    /// Kind used for list items (inserted into the preceding list when orphaned).
    pub list_item_kind: String,
    /// Kind used for list containers.
    pub list_kind: String,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            collapsible_empty: strings(&["paragraph", "list", "list-item"]),
            force_replace: strings(&["code", "footnote-definition", "list-item"]),
            list_item_kind: "list-item".to_string(),
            list_kind: "list".to_string(),
        }
    }
}

impl ReconcileConfig {
    pub fn is_collapsible(&self, kind: &str) -> bool {
        self.collapsible_empty.iter().any(|k| k == kind)
    }

    pub fn is_force_replace(&self, kind: &str) -> bool {
        self.force_replace.iter().any(|k| k == kind)
    }
}

/// Tunables for the drag-reorder planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DragConfig {
    /// Element kinds that can own drop boundaries.
    pub allow_list: Vec<String>,
    /// Element kinds that never own drop boundaries.
    pub excluded: Vec<String>,
    /// Kind used for list items; also widens the allow-list while dragging one.
    pub list_item_kind: String,
    /// Kind used for list containers (synthesized when an item leaves its list).
    pub list_kind: String,
    /// Kind of the block following a checkbox inside a checklist item.
    pub paragraph_kind: String,
    /// List attributes copied onto a synthesized single-item list.
    pub inherited_list_attrs: Vec<String>,
    /// Gap added below an owner's bottom edge when placing its `Bottom` boundary.
    pub boundary_margin: f32,
    /// Subtracted from the pointer position before ranking boundaries.
    pub vertical_offset: f32,
    /// Extra marker width shown for list-item owners to convey nesting.
    pub list_item_marker_widening: f32,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            allow_list: strings(&[
                "paragraph",
                "heading",
                "code",
                "blockquote",
                "list",
                "table",
                "html",
                "thematic-break",
                "footnote-definition",
            ]),
            excluded: strings(&["frontmatter"]),
            list_item_kind: "list-item".to_string(),
            list_kind: "list".to_string(),
            paragraph_kind: "paragraph".to_string(),
            inherited_list_attrs: strings(&["ordered", "start", "task"]),
            boundary_margin: 2.0,
            vertical_offset: 0.0,
            list_item_marker_widening: 20.0,
        }
    }
}

impl DragConfig {
    pub fn is_allowed(&self, kind: &str) -> bool {
        self.allow_list.iter().any(|k| k == kind)
    }

    pub fn is_excluded(&self, kind: &str) -> bool {
        self.excluded.iter().any(|k| k == kind)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub reconcile: ReconcileConfig,
    pub drag: DragConfig,
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        Ok(Some(config))
    }

    /// Load the user config, falling back to defaults when no file exists.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();
        Ok(Self::load_from_path(&config_path)?.unwrap_or_default())
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/blocktree");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Expand `~` and environment variables in a user-supplied path.
    pub fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
