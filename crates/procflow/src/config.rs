//! Configuration types for Procflow generation.
//!
//! This module provides configuration structures that control how processes
//! are laid out, exported, and how external collaborators are called. All
//! types implement [`serde::Deserialize`] for flexible loading from external
//! sources, and every field falls back to its default when omitted.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining the sections below.
//! - [`LayoutConfig`] - Spacing constants for the layout engine.
//! - [`ExportConfig`] - XML emission options.
//! - [`ServiceConfig`] - Collaborator call limits.
//!
//! # Example
//!
//! ```
//! # use procflow::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.layout().spacing(), 200.0);
//! assert_eq!(config.export().indent(), 2);
//! assert_eq!(config.service().timeout().as_secs(), 60);
//! ```

use std::time::Duration;

use serde::Deserialize;

use procflow_core::geometry::Point;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AppConfig {
    /// Layout configuration section.
    #[serde(default)]
    layout: LayoutConfig,

    /// Export configuration section.
    #[serde(default)]
    export: ExportConfig,

    /// Collaborator configuration section.
    #[serde(default)]
    service: ServiceConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(layout: LayoutConfig, export: ExportConfig, service: ServiceConfig) -> Self {
        Self {
            layout,
            export,
            service,
        }
    }

    /// Returns the layout configuration.
    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Returns the export configuration.
    pub fn export(&self) -> &ExportConfig {
        &self.export
    }

    /// Returns the collaborator configuration.
    pub fn service(&self) -> &ServiceConfig {
        &self.service
    }
}

/// Spacing constants for the layout engine.
///
/// The defaults place the first shape at `(100, 100)`, advance 200px per
/// top-level element on a 200px lane, and lay sub-process interiors out with
/// a 50px padding and 120px spacing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    origin_x: f32,
    origin_y: f32,
    spacing: f32,
    lane_height: f32,
    subprocess_padding: f32,
    subprocess_spacing: f32,
    min_gap: f32,
    edge_offset: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            origin_x: 100.0,
            origin_y: 100.0,
            spacing: 200.0,
            lane_height: 200.0,
            subprocess_padding: 50.0,
            subprocess_spacing: 120.0,
            min_gap: 50.0,
            edge_offset: 0.0,
        }
    }
}

impl LayoutConfig {
    /// Where the cursor starts.
    pub fn origin(&self) -> Point {
        Point::new(self.origin_x, self.origin_y)
    }

    /// Cursor advance per top-level element.
    pub fn spacing(&self) -> f32 {
        self.spacing
    }

    pub fn lane_height(&self) -> f32 {
        self.lane_height
    }

    /// Inset of a sub-process interior from its own bounds, on every side.
    pub fn subprocess_padding(&self) -> f32 {
        self.subprocess_padding
    }

    /// Cursor advance per element inside a sub-process.
    pub fn subprocess_spacing(&self) -> f32 {
        self.subprocess_spacing
    }

    /// Smallest horizontal gap between neighbouring shapes.
    pub fn min_gap(&self) -> f32 {
        self.min_gap
    }

    /// Horizontal offset added to the first waypoint of every edge.
    pub fn edge_offset(&self) -> f32 {
        self.edge_offset
    }

    pub fn with_spacing(mut self, spacing: f32) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn with_edge_offset(mut self, edge_offset: f32) -> Self {
        self.edge_offset = edge_offset;
        self
    }
}

/// XML emission options.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    target_namespace: String,
    indent: usize,
    performer_annotations: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            target_namespace: "http://bpmn.io/schema/bpmn".to_string(),
            indent: 2,
            performer_annotations: true,
        }
    }
}

impl ExportConfig {
    /// The `targetNamespace` of the emitted definitions.
    pub fn target_namespace(&self) -> &str {
        &self.target_namespace
    }

    /// Spaces per nesting level; `0` writes the document on one line.
    pub fn indent(&self) -> usize {
        self.indent
    }

    /// Whether task performers are written as `camunda:assignee`.
    pub fn performer_annotations(&self) -> bool {
        self.performer_annotations
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    pub fn with_performer_annotations(mut self, enabled: bool) -> Self {
        self.performer_annotations = enabled;
        self
    }
}

/// Limits for calls to external collaborators.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self { timeout_secs: 60 }
    }
}

impl ServiceConfig {
    /// Upper bound for a single collaborator call.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_sections_keep_defaults() {
        let config: AppConfig = serde_json::from_str(
            r#"{"layout": {"spacing": 250.0}, "export": {"indent": 0}}"#,
        )
        .expect("valid config");

        assert_eq!(config.layout().spacing(), 250.0);
        assert_eq!(config.layout().lane_height(), 200.0);
        assert_eq!(config.layout().origin(), Point::new(100.0, 100.0));
        assert_eq!(config.export().indent(), 0);
        assert!(config.export().performer_annotations());
        assert_eq!(config.service(), &ServiceConfig::default());
    }

    #[test]
    fn test_builders() {
        let layout = LayoutConfig::default().with_edge_offset(5.0);
        assert_eq!(layout.edge_offset(), 5.0);

        let service = ServiceConfig::default().with_timeout_secs(3);
        assert_eq!(service.timeout(), Duration::from_secs(3));
    }
}
