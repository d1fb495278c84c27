//! # Engine Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     MEDIDA_ROUNDING_MODE=half_up                                       │
//! │     MEDIDA_GRAPH_CACHE=false                                           │
//! │     MEDIDA_EDGE_PRECEDENCE=tenant_last                                 │
//! │     MEDIDA_COUNT_CODES=UN,UND,UNIDAD                                   │
//! │                                                                         │
//! │  2. TOML document supplied by the host                                 │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! rounding_mode = "half_up"    # half_up | half_down | ceiling | floor | truncate
//! graph_cache = true
//! edge_precedence = "input_order"  # input_order | tenant_last
//! canonical_count_codes = ["UN", "UND", "UNIDAD"]
//! ```
//!
//! The host reads the file; this crate only parses text.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CoreError, CoreResult};
use crate::graph::EdgePrecedence;
use crate::rounding::{RoundingMode, RoundingPolicy};

pub const ENV_ROUNDING_MODE: &str = "MEDIDA_ROUNDING_MODE";
pub const ENV_GRAPH_CACHE: &str = "MEDIDA_GRAPH_CACHE";
pub const ENV_EDGE_PRECEDENCE: &str = "MEDIDA_EDGE_PRECEDENCE";
pub const ENV_COUNT_CODES: &str = "MEDIDA_COUNT_CODES";

/// Engine-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub rounding_mode: RoundingMode,

    /// Keep one built graph per tenant until invalidated.
    #[serde(default = "default_graph_cache")]
    pub graph_cache: bool,

    #[serde(default)]
    pub edge_precedence: EdgePrecedence,

    /// Codes considered "the" count unit. The first one is recommended in
    /// advisories.
    #[serde(default = "default_count_codes")]
    pub canonical_count_codes: Vec<String>,
}

fn default_graph_cache() -> bool {
    true
}

fn default_count_codes() -> Vec<String> {
    vec!["UN".to_string(), "UND".to_string(), "UNIDAD".to_string()]
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            rounding_mode: RoundingMode::default(),
            graph_cache: default_graph_cache(),
            edge_precedence: EdgePrecedence::default(),
            canonical_count_codes: default_count_codes(),
        }
    }
}

impl EngineConfig {
    /// Parses a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(source: &str) -> CoreResult<Self> {
        let config: EngineConfig =
            toml::from_str(source).map_err(|e| CoreError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by the process environment.
    pub fn from_env() -> CoreResult<Self> {
        EngineConfig::default().with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Applies `MEDIDA_*` overrides read through `lookup`.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> CoreResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(mode) = lookup(ENV_ROUNDING_MODE) {
            self.rounding_mode = mode.parse()?;
            debug!(rounding_mode = %self.rounding_mode, "Rounding mode from environment");
        }

        if let Some(cache) = lookup(ENV_GRAPH_CACHE) {
            self.graph_cache = parse_bool(ENV_GRAPH_CACHE, &cache)?;
            debug!(graph_cache = self.graph_cache, "Graph cache from environment");
        }

        if let Some(precedence) = lookup(ENV_EDGE_PRECEDENCE) {
            self.edge_precedence = precedence.parse()?;
            debug!(edge_precedence = %self.edge_precedence, "Edge precedence from environment");
        }

        if let Some(codes) = lookup(ENV_COUNT_CODES) {
            self.canonical_count_codes = codes
                .split(',')
                .map(|code| code.trim().to_uppercase())
                .filter(|code| !code.is_empty())
                .collect();
        }

        self.validate()?;
        Ok(self)
    }

    pub fn rounding_policy(&self) -> RoundingPolicy {
        RoundingPolicy::new(self.rounding_mode)
    }

    fn validate(&self) -> CoreResult<()> {
        if self.canonical_count_codes.is_empty() {
            return Err(CoreError::InvalidConfig(
                "canonical_count_codes must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_bool(key: &str, value: &str) -> CoreResult<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(CoreError::InvalidConfig(format!(
            "{} must be a boolean, got '{}'",
            key, other
        ))),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.rounding_mode, RoundingMode::HalfUp);
        assert!(config.graph_cache);
        assert_eq!(config.edge_precedence, EdgePrecedence::InputOrder);
        assert_eq!(config.canonical_count_codes[0], "UN");
    }

    #[test]
    fn test_from_toml() {
        let config = EngineConfig::from_toml_str(
            r#"
            rounding_mode = "truncate"
            edge_precedence = "tenant_last"
            "#,
        )
        .unwrap();
        assert_eq!(config.rounding_mode, RoundingMode::Truncate);
        assert_eq!(config.edge_precedence, EdgePrecedence::TenantLast);
        assert!(config.graph_cache);
        assert_eq!(config.canonical_count_codes.len(), 3);
    }

    #[test]
    fn test_from_empty_toml_is_default() {
        assert_eq!(EngineConfig::from_toml_str("").unwrap(), EngineConfig::default());
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            EngineConfig::from_toml_str("rounding_mode = \"bankers\""),
            Err(CoreError::InvalidConfig(_))
        ));
        assert!(matches!(
            EngineConfig::from_toml_str("canonical_count_codes = []"),
            Err(CoreError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_env_overrides_win() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_ROUNDING_MODE, "floor"),
            (ENV_GRAPH_CACHE, "off"),
            (ENV_COUNT_CODES, "pza, un"),
        ]);
        let config = EngineConfig::from_toml_str("rounding_mode = \"ceiling\"")
            .unwrap()
            .with_env_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.rounding_mode, RoundingMode::Floor);
        assert!(!config.graph_cache);
        assert_eq!(config.canonical_count_codes, vec!["PZA", "UN"]);
    }

    #[test]
    fn test_env_bad_bool() {
        let result = EngineConfig::default()
            .with_env_overrides(|key| (key == ENV_GRAPH_CACHE).then(|| "maybe".to_string()));
        assert!(matches!(result, Err(CoreError::InvalidConfig(_))));
    }
}
