//! Domain layer: entities and hierarchy logic
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod convert;
pub mod entities;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod node;

pub use arena::{Forest, HierarchyNode, RootKind};
pub use builder::{build_forest, HierarchyBuilder};
pub use convert::{TreeFormatConverter, TreeNodeConvert, DEFAULT_DATE_FORMAT};
pub use entities::*;
pub use error::DomainError;
pub use geometry::{
    fit_transform, measure_tree, BoundingBox, GeometryConfig, GeometryController, GeometryEvent,
    NodeMetrics, Point, Size, Transform,
};
pub use layout::{optimize, DepthLimit, LayoutOptimizer, LayoutStrategy, PassThrough, SiblingGrouping};
pub use node::{handle_interaction, Interaction, Key, NodeView};

/// Expand `~`, `$VAR` and `${VAR}` in a path string; unknown variables leave it unchanged.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}
