//! Chart viewport geometry: zoom, translation and fit-to-screen.
//!
//! State changes go through [`GeometryController::apply`], a reducer over
//! [`GeometryEvent`]s, so button actions and rendering-surface feedback share
//! one code path. The last event written wins.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::domain::entities::RenderTreeNode;
use crate::domain::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    fn is_finite(&self) -> bool {
        self.width.is_finite() && self.height.is_finite()
    }
}

/// Extent of the drawn tree in its own logical coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A box can drive a fit only if it is finite and has positive area.
    pub fn is_measurable(&self) -> bool {
        [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite())
            && self.width > 0.0
            && self.height > 0.0
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Zoom bounds and spacing used by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryConfig {
    /// Lower bound for button zoom
    pub min_zoom: f64,
    /// Upper bound for button zoom
    pub max_zoom: f64,
    pub zoom_step: f64,
    /// Lower bound for typed zoom and surface-driven zoom
    pub entry_min_zoom: f64,
    /// Upper bound for typed zoom and surface-driven zoom
    pub entry_max_zoom: f64,
    pub default_zoom: f64,
    /// Gap kept between the fitted tree and the viewport edge
    pub fit_padding: f64,
    /// Vertical offset of the root after mounting
    pub top_margin: f64,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            min_zoom: 0.1,
            max_zoom: 3.0,
            zoom_step: 0.1,
            entry_min_zoom: 0.1,
            entry_max_zoom: 2.0,
            default_zoom: 1.0,
            fit_padding: 40.0,
            top_margin: 50.0,
        }
    }
}

impl GeometryConfig {
    /// Reject bounds the controller could not clamp against.
    pub fn validate(&self) -> Result<(), DomainError> {
        let values = [
            self.min_zoom,
            self.max_zoom,
            self.zoom_step,
            self.entry_min_zoom,
            self.entry_max_zoom,
            self.default_zoom,
            self.fit_padding,
            self.top_margin,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(DomainError::InvalidGeometry("values must be finite".into()));
        }
        if self.min_zoom <= 0.0 || self.min_zoom > self.max_zoom {
            return Err(DomainError::InvalidGeometry(format!(
                "zoom bounds [{}, {}]",
                self.min_zoom, self.max_zoom
            )));
        }
        if self.entry_min_zoom <= 0.0 || self.entry_min_zoom > self.entry_max_zoom {
            return Err(DomainError::InvalidGeometry(format!(
                "entry zoom bounds [{}, {}]",
                self.entry_min_zoom, self.entry_max_zoom
            )));
        }
        if self.zoom_step <= 0.0 {
            return Err(DomainError::InvalidGeometry(format!(
                "zoom step {}",
                self.zoom_step
            )));
        }
        if self.min_zoom > 1.0 {
            return Err(DomainError::InvalidGeometry(
                "min zoom above 1 leaves no room to fit".into(),
            ));
        }
        Ok(())
    }
}

/// Zoom and translation applied to the tree's logical origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub zoom: f64,
    pub translate: Point,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeometryEvent {
    ZoomIn,
    ZoomOut,
    /// Zoom typed in directly
    SetZoom(f64),
    /// Drag or scroll feedback from the rendering surface
    SurfaceChanged { zoom: f64, translate: Point },
    /// First render of a non-empty tree
    Mounted(Size),
    FitToScreen {
        container: Size,
        bbox: Option<BoundingBox>,
    },
    Reset,
}

/// Round away float drift from repeated steps.
fn snap(value: f64) -> f64 {
    (value * 1e6).round() / 1e6
}

/// Pure fit computation. None when the box or container cannot be measured.
pub fn fit_transform(
    config: &GeometryConfig,
    container: Size,
    bbox: Option<BoundingBox>,
) -> Option<Transform> {
    let bbox = bbox.filter(BoundingBox::is_measurable)?;
    if !container.is_finite() {
        return None;
    }
    let available_width = container.width - 2.0 * config.fit_padding;
    let available_height = container.height - 2.0 * config.fit_padding;
    let fitted = (available_width / bbox.width)
        .min(available_height / bbox.height)
        .min(1.0);
    let scale = fitted.max(config.min_zoom);
    if scale > fitted {
        debug!(
            fitted,
            min_zoom = config.min_zoom,
            "tree too large to fit at min zoom, edges will be clipped"
        );
    }
    let center = bbox.center();
    Some(Transform {
        zoom: scale,
        translate: Point::new(
            container.width / 2.0 - center.x * scale,
            container.height / 2.0 - center.y * scale,
        ),
    })
}

/// Node box and spacing used to measure a tree without a drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeMetrics {
    pub node_width: f64,
    pub node_height: f64,
    pub sibling_gap: f64,
    pub level_gap: f64,
}

impl Default for NodeMetrics {
    fn default() -> Self {
        Self {
            node_width: 200.0,
            node_height: 100.0,
            sibling_gap: 20.0,
            level_gap: 60.0,
        }
    }
}

fn subtree_width(node: &RenderTreeNode, metrics: &NodeMetrics) -> f64 {
    let children = node.children();
    if children.is_empty() {
        return metrics.node_width;
    }
    let row: f64 = children.iter().map(|c| subtree_width(c, metrics)).sum::<f64>()
        + metrics.sibling_gap * (children.len() - 1) as f64;
    row.max(metrics.node_width)
}

/// Extent of a top-down layout with the root centered on the logical origin.
pub fn measure_tree(tree: &RenderTreeNode, metrics: &NodeMetrics) -> BoundingBox {
    let width = subtree_width(tree, metrics);
    let levels = tree.depth() as f64;
    let height = levels * metrics.node_height + (levels - 1.0) * metrics.level_gap;
    BoundingBox::new(-width / 2.0, 0.0, width, height)
}

/// Owns the interactive zoom/translate state of the chart viewport.
#[derive(Debug, Clone)]
pub struct GeometryController {
    config: GeometryConfig,
    state: Transform,
    mounted: bool,
}

impl Default for GeometryController {
    fn default() -> Self {
        Self::with_valid_config(GeometryConfig::default())
    }
}

impl GeometryController {
    /// Create a controller; bounds the controller cannot clamp against are rejected.
    pub fn new(config: GeometryConfig) -> Result<Self, DomainError> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: GeometryConfig) -> Self {
        Self {
            state: Transform {
                zoom: config.default_zoom,
                translate: Point::default(),
            },
            config,
            mounted: false,
        }
    }

    pub fn config(&self) -> &GeometryConfig {
        &self.config
    }

    pub fn state(&self) -> Transform {
        self.state
    }

    pub fn zoom(&self) -> f64 {
        self.state.zoom
    }

    pub fn translate(&self) -> Point {
        self.state.translate
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Apply one event. Returns whether the state changed.
    pub fn apply(&mut self, event: GeometryEvent) -> bool {
        let before = self.state;
        match event {
            GeometryEvent::ZoomIn => self.step_zoom(self.config.zoom_step),
            GeometryEvent::ZoomOut => self.step_zoom(-self.config.zoom_step),
            GeometryEvent::SetZoom(zoom) => {
                if zoom.is_finite() {
                    self.state.zoom = self.clamp_entry(zoom);
                }
            }
            GeometryEvent::SurfaceChanged { zoom, translate } => {
                if zoom.is_finite() {
                    self.state.zoom = self.clamp_entry(zoom);
                }
                if translate.is_finite() {
                    self.state.translate = translate;
                }
            }
            GeometryEvent::Mounted(container) => {
                if !self.mounted {
                    self.state.translate = self.mount_translate(container);
                    self.mounted = true;
                }
            }
            GeometryEvent::FitToScreen { container, bbox } => {
                self.state = match fit_transform(&self.config, container, bbox) {
                    Some(fitted) => fitted,
                    None => {
                        debug!("bounding box not measurable, falling back to mount defaults");
                        Transform {
                            zoom: self.config.default_zoom,
                            translate: self.mount_translate(container),
                        }
                    }
                };
            }
            GeometryEvent::Reset => {
                self.state = Transform {
                    zoom: self.config.default_zoom,
                    translate: Point::default(),
                };
                self.mounted = false;
            }
        }
        trace!(?event, zoom = self.state.zoom, x = self.state.translate.x, y = self.state.translate.y, "geometry event");
        self.state != before
    }

    pub fn zoom_in(&mut self) -> bool {
        self.apply(GeometryEvent::ZoomIn)
    }

    pub fn zoom_out(&mut self) -> bool {
        self.apply(GeometryEvent::ZoomOut)
    }

    pub fn center_on_mount(&mut self, container: Size) -> bool {
        self.apply(GeometryEvent::Mounted(container))
    }

    pub fn fit_to_screen(&mut self, container: Size, bbox: Option<BoundingBox>) -> Transform {
        self.apply(GeometryEvent::FitToScreen { container, bbox });
        self.state
    }

    fn step_zoom(&mut self, delta: f64) {
        let next = snap(self.state.zoom + delta);
        self.state.zoom = next.clamp(self.config.min_zoom, self.config.max_zoom);
    }

    fn clamp_entry(&self, zoom: f64) -> f64 {
        zoom.clamp(self.config.entry_min_zoom, self.config.entry_max_zoom)
    }

    fn mount_translate(&self, container: Size) -> Point {
        let x = if container.width.is_finite() {
            container.width / 2.0
        } else {
            0.0
        };
        Point::new(x, self.config.top_margin)
    }
}
