//! Canvas configuration
//!
//! Every field has a default, so a config file only needs the keys it
//! overrides:
//!
//! ```json
//! { "default_edge_type": "causes", "layout": { "rank_sep": 80 } }
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::types::{Direction, RelationshipKind};
use crate::canvas::LayoutConfig;

/// Default debounce window for fit-to-view after a resize
pub const DEFAULT_FIT_DEBOUNCE_MS: u64 = 200;

/// Settings for the sync controller and the layout it drives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Relationship used for connect gestures and for edges clicked without one
    pub default_edge_type: RelationshipKind,
    /// Debounce window for fit-to-view after a resize
    pub fit_debounce_ms: u64,
    /// Direction passed to the layout engine
    pub direction: Direction,
    pub layout: LayoutConfig,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            default_edge_type: RelationshipKind::Influences,
            fit_debounce_ms: DEFAULT_FIT_DEBOUNCE_MS,
            direction: Direction::TopToBottom,
            layout: LayoutConfig::default(),
        }
    }
}

impl CanvasConfig {
    /// Parse a JSON config, filling missing keys with defaults
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn fit_debounce(&self) -> Duration {
        Duration::from_millis(self.fit_debounce_ms)
    }

    pub fn with_default_edge_type(mut self, kind: RelationshipKind) -> Self {
        self.default_edge_type = kind;
        self
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CanvasConfig::default();
        assert_eq!(config.default_edge_type, RelationshipKind::Influences);
        assert_eq!(config.fit_debounce(), Duration::from_millis(200));
        assert_eq!(config.direction, Direction::TopToBottom);
        assert_eq!(config.layout.node_width, 172.0);
    }

    #[test]
    fn test_partial_json() {
        let config =
            CanvasConfig::from_json(r#"{"default_edge_type":"causes","layout":{"rank_sep":80}}"#)
                .unwrap();
        assert_eq!(config.default_edge_type, RelationshipKind::Causes);
        assert_eq!(config.layout.rank_sep, 80.0);
        assert_eq!(config.layout.node_sep, 50.0);
        assert_eq!(config.fit_debounce_ms, 200);
    }

    #[test]
    fn test_direction_alias() {
        let config = CanvasConfig::from_json(r#"{"direction":"TD"}"#).unwrap();
        assert_eq!(config.direction, Direction::TopToBottom);
    }
}
