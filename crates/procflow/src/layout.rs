//! Deterministic left-to-right layout.
//!
//! Every scope is a single horizontal lane. Shapes are placed one after the
//! other on a cursor and vertically centred on the lane's centre line. A
//! sub-process lays its body out on its own lane, inset by the configured
//! padding, and grows to fit that body. Sizes are measured bottom-up before
//! anything is placed, so nesting depth is unbounded.
//!
//! Each flow gets two waypoints on its scope's centre line: the right edge of
//! the source (plus the configured offset) and the left edge of the target.

use std::collections::HashMap;

use indexmap::IndexMap;
use log::{debug, trace};

use procflow_core::{
    geometry::{Bounds, Insets, Point, Size},
    semantic::{Node, Process, Scope},
};

use crate::{config::LayoutConfig, error::ProcflowError};

/// Computed geometry, keyed by element and flow id in placement order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layout {
    shapes: IndexMap<String, Bounds>,
    edges: IndexMap<String, Vec<Point>>,
}

impl Layout {
    /// Bounds of the element with the given id.
    pub fn shape(&self, id: &str) -> Option<Bounds> {
        self.shapes.get(id).copied()
    }

    /// Waypoints of the flow with the given id.
    pub fn edge(&self, id: &str) -> Option<&[Point]> {
        self.edges.get(id).map(Vec::as_slice)
    }

    pub fn shapes(&self) -> impl Iterator<Item = (&str, Bounds)> {
        self.shapes.iter().map(|(id, bounds)| (id.as_str(), *bounds))
    }

    pub fn edges(&self) -> impl Iterator<Item = (&str, &[Point])> {
        self.edges
            .iter()
            .map(|(id, points)| (id.as_str(), points.as_slice()))
    }

    /// Smallest bounds containing every shape, or `None` for an empty layout.
    pub fn extent(&self) -> Option<Bounds> {
        self.shapes
            .values()
            .copied()
            .reduce(|acc, bounds| acc.merge(&bounds))
    }
}

/// Places the shapes and routes the edges of a [`Process`].
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    config: LayoutConfig,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    /// Compute the layout of a validated process.
    ///
    /// # Errors
    ///
    /// Returns [`ProcflowError::Layout`] when a flow names an element that has
    /// no shape in its scope.
    pub fn calculate(&self, process: &Process) -> Result<Layout, ProcflowError> {
        let mut sizes = HashMap::new();
        self.measure_scope(process.scope(), self.config.spacing(), &mut sizes);

        let mut layout = Layout::default();
        let origin = self.config.origin();
        let lane_center = origin.y() + self.config.lane_height() / 2.0;

        self.place_scope(
            process.scope(),
            origin,
            lane_center,
            self.config.spacing(),
            &sizes,
            &mut layout,
        );
        self.route_scope(process.scope(), lane_center, &mut layout)?;

        debug!(
            shapes = layout.shapes.len(),
            edges = layout.edges.len();
            "Layout calculated"
        );
        Ok(layout)
    }

    /// Horizontal cursor advance after a shape of the given width.
    fn advance(&self, width: f32, spacing: f32) -> f32 {
        spacing.max(width + self.config.min_gap())
    }

    /// Record the size of every node in the scope and return the extent of
    /// the scope's lane.
    fn measure_scope<'a>(
        &self,
        scope: &'a Scope,
        spacing: f32,
        sizes: &mut HashMap<&'a str, Size>,
    ) -> Size {
        let mut width = 0.0;
        let mut height: f32 = 0.0;
        let last = scope.nodes().len().saturating_sub(1);

        for (index, node) in scope.nodes().iter().enumerate() {
            let size = self.measure_node(node, sizes);
            width += if index == last {
                size.width()
            } else {
                self.advance(size.width(), spacing)
            };
            height = height.max(size.height());
        }

        Size::new(width, height)
    }

    fn measure_node<'a>(&self, node: &'a Node, sizes: &mut HashMap<&'a str, Size>) -> Size {
        let base = node.kind().size();
        let size = match node.subprocess() {
            Some(body) => {
                let interior =
                    self.measure_scope(body, self.config.subprocess_spacing(), sizes);
                let padding = Insets::uniform(self.config.subprocess_padding());
                base.max(interior.add_padding(padding))
            }
            None => base,
        };
        sizes.insert(node.id(), size);
        size
    }

    fn place_scope(
        &self,
        scope: &Scope,
        origin: Point,
        lane_center: f32,
        spacing: f32,
        sizes: &HashMap<&str, Size>,
        layout: &mut Layout,
    ) {
        let mut cursor_x = origin.x();

        for node in scope.nodes() {
            let size = sizes
                .get(node.id())
                .copied()
                .unwrap_or_else(|| node.kind().size());
            let top_left = Point::new(cursor_x, lane_center - size.height() / 2.0);
            let bounds = Bounds::new_from_top_left(top_left, size);
            trace!(id = node.id(), bounds:?; "Placed shape");
            layout.shapes.insert(node.id().to_string(), bounds);

            if let Some(body) = node.subprocess() {
                let padding = self.config.subprocess_padding();
                let interior_origin = top_left.add_point(Point::new(padding, padding));
                let interior_center =
                    interior_origin.y() + (size.height() - 2.0 * padding) / 2.0;
                self.place_scope(
                    body,
                    interior_origin,
                    interior_center,
                    self.config.subprocess_spacing(),
                    sizes,
                    layout,
                );
            }

            cursor_x += self.advance(size.width(), spacing);
        }
    }

    /// Route the flows of a scope, then of its nested bodies.
    fn route_scope(
        &self,
        scope: &Scope,
        lane_center: f32,
        layout: &mut Layout,
    ) -> Result<(), ProcflowError> {
        for flow in scope.flows() {
            let source = self.scoped_shape(layout, scope, flow.source(), flow.id())?;
            let target = self.scoped_shape(layout, scope, flow.target(), flow.id())?;

            let waypoints = vec![
                Point::new(source.max_x() + self.config.edge_offset(), lane_center),
                Point::new(target.min_x(), lane_center),
            ];
            layout.edges.insert(flow.id().to_string(), waypoints);
        }

        for node in scope.nodes() {
            if let Some(body) = node.subprocess() {
                // A body's lane is centred on the sub-process itself.
                let center = layout
                    .shape(node.id())
                    .map_or(lane_center, |bounds| bounds.center().y());
                self.route_scope(body, center, layout)?;
            }
        }

        Ok(())
    }

    fn scoped_shape(
        &self,
        layout: &Layout,
        scope: &Scope,
        id: &str,
        flow: &str,
    ) -> Result<Bounds, ProcflowError> {
        scope
            .node(id)
            .and_then(|node| layout.shape(node.id()))
            .ok_or_else(|| {
                ProcflowError::Layout(format!(
                    "flow `{flow}` references `{id}`, which has no shape in its scope"
                ))
            })
    }
}
