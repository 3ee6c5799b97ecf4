//! Configuration loading and management

use crate::core::error::{ConfigError, GridResult};
use serde::{Deserialize, Serialize};

/// Configuration for one dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Singular form (e.g., "product")
    pub singular: String,

    /// Plural form used in URLs (e.g., "products")
    pub plural: String,

    /// Display label (e.g., "Product")
    pub label: String,

    /// Creation affordance label (e.g., "New Product")
    pub button_label: String,
}

/// Complete configuration for an admin panel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelConfig {
    /// Rows per table page
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Directory for filesystem draft snapshots; in-memory when absent
    #[serde(default)]
    pub drafts_dir: Option<String>,

    /// List of dataset configurations
    pub datasets: Vec<DatasetConfig>,
}

fn default_page_size() -> usize {
    10
}

impl PanelConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> GridResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            message: format!("{}: {}", path, e),
        })?;
        let config: Self =
            serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
                file: Some(path.to_string()),
                message: e.to_string(),
            })?;
        Ok(config)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> GridResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Find a dataset configuration by singular key
    pub fn dataset(&self, singular: &str) -> Option<&DatasetConfig> {
        self.datasets.iter().find(|d| d.singular == singular)
    }

    /// Create the default catalog configuration
    pub fn default_config() -> Self {
        let entry = |singular: &str, plural: &str, label: &str| DatasetConfig {
            singular: singular.to_string(),
            plural: plural.to_string(),
            label: label.to_string(),
            button_label: format!("New {}", label),
        };

        Self {
            page_size: default_page_size(),
            drafts_dir: None,
            datasets: vec![
                entry("product", "products", "Product"),
                entry("category", "categories", "Category"),
                entry("category_group", "category_groups", "Category Group"),
                entry("blog_post", "blog_posts", "Blog Post"),
            ],
        }
    }
}
