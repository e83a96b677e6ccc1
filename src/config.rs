//! Loader configuration
//!
//! ```yaml
//! sources:
//!   - "preprocessed_data (76).xlsx"
//!   - /srv/dashboards/preprocessed_data.xlsx
//! columns:
//!   - canonical: BW Allocated
//!     aliases: ["BW Allocated", "Allocated BW"]
//!     kind:
//!       type: numeric
//!       strip:
//!         - pattern: " Mbps"
//! renames:
//!   - from: Site Value
//!     to: Site Value Rs
//! ```
//!
//! Omitted sections fall back to the built-in site bandwidth schema.

use crate::error::{SiteBwError, SiteBwResult};
use crate::loader::{full_load, LoadOutcome};
use crate::schema::{site_bandwidth_columns, site_bandwidth_renames, ColumnSpec, HeaderRename};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Source file looked up relative to the working directory.
pub const DEFAULT_SOURCE: &str = "preprocessed_data (76).xlsx";

fn default_sources() -> Vec<PathBuf> {
    vec![PathBuf::from(DEFAULT_SOURCE)]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Candidate source paths, tried in order.
    #[serde(default = "default_sources")]
    pub sources: Vec<PathBuf>,

    #[serde(default = "site_bandwidth_columns")]
    pub columns: Vec<ColumnSpec>,

    #[serde(default = "site_bandwidth_renames")]
    pub renames: Vec<HeaderRename>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            sources: default_sources(),
            columns: site_bandwidth_columns(),
            renames: site_bandwidth_renames(),
        }
    }
}

impl LoaderConfig {
    /// Read and validate a YAML config file.
    pub fn from_file(path: &Path) -> SiteBwResult<Self> {
        let content = fs::read_to_string(path)?;
        let config: LoaderConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        tracing::debug!(path = %path.display(), columns = config.columns.len(), "loaded config");
        Ok(config)
    }

    /// Replace the candidate list (ignored when `sources` is empty).
    pub fn with_sources(mut self, sources: Vec<PathBuf>) -> Self {
        if !sources.is_empty() {
            self.sources = sources;
        }
        self
    }

    pub fn validate(&self) -> SiteBwResult<()> {
        if self.sources.is_empty() {
            return Err(SiteBwError::Config(
                "At least one source path is required".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for spec in &self.columns {
            if spec.canonical.trim().is_empty() {
                return Err(SiteBwError::Config(
                    "Column spec with empty canonical name".to_string(),
                ));
            }
            if !seen.insert(spec.canonical.as_str()) {
                return Err(SiteBwError::Config(format!(
                    "Duplicate column spec for '{}'",
                    spec.canonical
                )));
            }
        }

        for rename in &self.renames {
            if rename.to.trim().is_empty() {
                return Err(SiteBwError::Config(format!(
                    "Rename of '{}' has an empty target",
                    rename.from
                )));
            }
        }
        Ok(())
    }

    /// Run the full load pipeline with this configuration.
    pub fn load(&self) -> LoadOutcome {
        full_load(&self.sources, &self.columns, &self.renames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = LoaderConfig::default();
        assert_eq!(config.sources, vec![PathBuf::from(DEFAULT_SOURCE)]);
        assert_eq!(config.columns, site_bandwidth_columns());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_uses_builtin_schema() {
        let config: LoaderConfig = serde_yaml::from_str("sources: [a.xlsx, /srv/b.xlsx]").unwrap();
        assert_eq!(
            config.sources,
            vec![PathBuf::from("a.xlsx"), PathBuf::from("/srv/b.xlsx")]
        );
        assert_eq!(config.columns, site_bandwidth_columns());
        assert_eq!(config.renames, site_bandwidth_renames());
    }

    #[test]
    fn test_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("sitebw.yaml");
        fs::write(
            &path,
            r#"
sources: [sites.csv]
columns:
  - canonical: Site Name
  - canonical: BW Allocated
    aliases: ["BW Allocated"]
    kind:
      type: numeric
      strip:
        - pattern: " Mbps"
renames: []
"#,
        )
        .unwrap();

        let config = LoaderConfig::from_file(&path).unwrap();
        assert_eq!(config.columns.len(), 2);
        assert!(config.columns[1].is_numeric());
        assert!(config.renames.is_empty());
    }

    #[test]
    fn test_invalid_regex_rejected_at_config_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.yaml");
        fs::write(
            &path,
            r#"
columns:
  - canonical: BW Allocated
    kind:
      type: numeric
      strip:
        - pattern: "(["
          regex: true
"#,
        )
        .unwrap();
        assert!(LoaderConfig::from_file(&path).is_err());
    }

    #[test]
    fn test_duplicate_canonical_rejected() {
        let mut config = LoaderConfig::default();
        config.columns.push(ColumnSpec::categorical("Site Name", &[]));
        assert!(matches!(config.validate(), Err(SiteBwError::Config(_))));
    }

    #[test]
    fn test_with_sources_ignores_empty() {
        let config = LoaderConfig::default().with_sources(Vec::new());
        assert_eq!(config.sources, vec![PathBuf::from(DEFAULT_SOURCE)]);
        let config = LoaderConfig::default().with_sources(vec![PathBuf::from("x.csv")]);
        assert_eq!(config.sources, vec![PathBuf::from("x.csv")]);
    }
}
