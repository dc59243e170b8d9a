//! Outliner configuration.
//!
//! Configuration is plain data: it can be built in code, or deserialized from
//! TOML with every field optional.
//!
//! ```
//! use horizon_outliner::OutlinerConfig;
//!
//! let config = OutlinerConfig::from_toml_str(r#"
//!     page_size = 25
//!
//!     [context]
//!     include_sub_properties = true
//! "#).unwrap();
//!
//! assert_eq!(config.page_size, 25);
//! assert!(config.context.include_sub_properties);
//! assert!(config.context.include_child_nodes);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::outliner::Dimension;

/// Number of children realized per `fetch_more` call unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Policy deciding which child dimensions items expose.
///
/// Toggling a dimension only takes effect on the next rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelContext {
    /// Expose the direct children of scene nodes.
    pub include_child_nodes: bool,
    /// Expose the sub-properties (parameters, controllers) of objects.
    pub include_sub_properties: bool,
    /// Expose the prim hierarchy of hosted foreign documents.
    pub include_foreign_documents: bool,
}

impl Default for ModelContext {
    fn default() -> Self {
        Self {
            include_child_nodes: true,
            include_sub_properties: false,
            include_foreign_documents: true,
        }
    }
}

impl ModelContext {
    /// Returns `true` if items may bind a strategy of this dimension.
    pub fn allows(&self, dimension: Dimension) -> bool {
        match dimension {
            Dimension::Direct => self.include_child_nodes,
            Dimension::SubProperty => self.include_sub_properties,
            Dimension::Foreign => self.include_foreign_documents,
        }
    }

    /// Returns a copy with the sub-property dimension switched on or off.
    pub fn with_sub_properties(mut self, include: bool) -> Self {
        self.include_sub_properties = include;
        self
    }
}

/// Filter proxy settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Keep rows whose realized descendants match.
    pub recursive: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self { recursive: true }
    }
}

/// Top-level outliner configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlinerConfig {
    /// Children realized per `fetch_more` call.
    pub page_size: usize,
    /// Dimension policy applied when items are wrapped.
    pub context: ModelContext,
    /// Filter proxy settings.
    pub filter: FilterConfig,
}

impl Default for OutlinerConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            context: ModelContext::default(),
            filter: FilterConfig::default(),
        }
    }
}

impl OutlinerConfig {
    /// Parses and validates a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(
            target: "horizon_outliner::config",
            path = %path.display(),
            page_size = config.page_size,
            "loaded outliner config"
        );
        Ok(config)
    }

    /// Serializes the configuration to pretty TOML.
    pub fn to_toml_string(&self) -> String {
        // Plain structs of scalars always serialize.
        toml::to_string_pretty(self).unwrap_or_default()
    }

    /// Checks value ranges that the schema cannot express.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.page_size == 0 {
            return Err(ConfigError::invalid("page_size", "must be greater than zero"));
        }
        Ok(())
    }

    /// Sets the page size.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Sets the context policy.
    pub fn with_context(mut self, context: ModelContext) -> Self {
        self.context = context;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = OutlinerConfig::default();
        assert_eq!(config.page_size, 100);
        assert!(config.context.include_child_nodes);
        assert!(!config.context.include_sub_properties);
        assert!(config.context.include_foreign_documents);
        assert!(config.filter.recursive);
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = OutlinerConfig::from_toml_str("").unwrap();
        assert_eq!(config, OutlinerConfig::default());
    }

    #[test]
    fn test_partial_toml() {
        let config = OutlinerConfig::from_toml_str(
            r#"
            [filter]
            recursive = false
            "#,
        )
        .unwrap();
        assert!(!config.filter.recursive);
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let err = OutlinerConfig::from_toml_str("page_size = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref key, .. } if key == "page_size"));
    }

    #[test]
    fn test_parse_error() {
        let err = OutlinerConfig::from_toml_str("page_size = \"many\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "page_size = 7").unwrap();
        writeln!(file, "[context]").unwrap();
        writeln!(file, "include_foreign_documents = false").unwrap();

        let config = OutlinerConfig::load(file.path()).unwrap();
        assert_eq!(config.page_size, 7);
        assert!(!config.context.allows(Dimension::Foreign));
        assert!(config.context.allows(Dimension::Direct));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = OutlinerConfig::load(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = OutlinerConfig::default()
            .with_page_size(12)
            .with_context(ModelContext::default().with_sub_properties(true));
        let text = config.to_toml_string();
        assert_eq!(OutlinerConfig::from_toml_str(&text).unwrap(), config);
    }
}
