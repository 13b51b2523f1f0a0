//! Chart session service
//!
//! Owns the derived hierarchy for one organization and the viewport geometry
//! drawn over it. Rebuilds run synchronously and are memoized on the member
//! list fingerprint, so geometry churn never rebuilds the forest.

use tracing::{debug, instrument};

use crate::application::hash::members_fingerprint;
use crate::application::{ApplicationError, ApplicationResult};
use crate::config::Settings;
use crate::domain::{
    measure_tree, DomainError, Forest, GeometryConfig, GeometryController, GeometryEvent,
    HierarchyBuilder, Interaction, LayoutOptimizer, Member, NodeMetrics, NodeView,
    RenderTreeNode, Size, Transform, TreeFormatConverter, BoundingBox,
};

/// Page-level state of an org chart: forest, render tree, geometry, selection.
#[derive(Debug)]
pub struct ChartSession {
    organization_name: String,
    builder: HierarchyBuilder,
    converter: TreeFormatConverter,
    optimizer: LayoutOptimizer,
    geometry: GeometryController,
    metrics: NodeMetrics,
    fingerprint: Option<String>,
    generation: u64,
    forest: Forest,
    tree: RenderTreeNode,
    unassigned: Vec<RenderTreeNode>,
    selected: Option<String>,
}

impl ChartSession {
    /// Fails when the geometry bounds are unusable.
    pub fn new(
        organization_name: impl Into<String>,
        converter: TreeFormatConverter,
        optimizer: LayoutOptimizer,
        geometry: GeometryConfig,
    ) -> ApplicationResult<Self> {
        let geometry = GeometryController::new(geometry)?;
        let organization_name = organization_name.into();
        let forest = Forest::default();
        let tree = converter.organization_tree(&organization_name, &forest);
        Ok(Self {
            organization_name,
            builder: HierarchyBuilder::new(),
            converter,
            optimizer,
            geometry,
            metrics: NodeMetrics::default(),
            fingerprint: None,
            generation: 0,
            forest,
            tree,
            unassigned: Vec::new(),
            selected: None,
        })
    }

    /// Session configured from settings; the organization name falls back to `fallback_name`.
    pub fn from_settings(settings: &Settings, fallback_name: &str) -> ApplicationResult<Self> {
        let name = settings
            .organization_name
            .clone()
            .unwrap_or_else(|| fallback_name.to_string());
        Self::new(
            name,
            TreeFormatConverter::new(&settings.date_format),
            LayoutOptimizer::from_limits(settings.layout.max_siblings, settings.layout.max_depth),
            settings.geometry,
        )
        .map(|session| session.with_metrics(settings.layout.metrics))
    }

    pub fn with_metrics(mut self, metrics: NodeMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// Feed the current member list. Returns whether the hierarchy was rebuilt.
    #[instrument(level = "debug", skip(self, members), fields(members = members.len()))]
    pub fn set_members(&mut self, members: &[Member]) -> bool {
        let fingerprint = members_fingerprint(members);
        if self.fingerprint.as_deref() == Some(fingerprint.as_str()) {
            debug!("member list unchanged, keeping hierarchy");
            return false;
        }

        self.forest = self.builder.build_forest(members);
        let raw = self
            .converter
            .organization_tree(&self.organization_name, &self.forest);
        self.tree = self.optimizer.optimize(&raw);
        self.unassigned = self.converter.unassigned_list(&self.forest);
        self.fingerprint = Some(fingerprint);
        self.generation += 1;

        if let Some(selected) = &self.selected {
            if self.forest.find(selected).is_none() {
                self.selected = None;
            }
        }
        debug!(generation = self.generation, "hierarchy rebuilt");
        true
    }

    pub fn organization_name(&self) -> &str {
        &self.organization_name
    }

    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    /// Optimized tree under the synthetic organization root.
    pub fn tree(&self) -> &RenderTreeNode {
        &self.tree
    }

    pub fn unassigned(&self) -> &[RenderTreeNode] {
        &self.unassigned
    }

    /// Bumped on every rebuild; fit requests must carry the current value.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// True when there is no founder hierarchy to draw.
    ///
    /// Decided on the forest, so a layout pass that trims the drawn tree
    /// never hides existing founders.
    pub fn is_empty(&self) -> bool {
        self.forest.founders().is_empty()
    }

    pub fn geometry(&self) -> &GeometryController {
        &self.geometry
    }

    pub fn dispatch(&mut self, event: GeometryEvent) -> bool {
        self.geometry.apply(event)
    }

    /// First successful render: centers the root unless the tree is empty.
    pub fn mounted(&mut self, container: Size) -> bool {
        if self.is_empty() {
            return false;
        }
        self.geometry.center_on_mount(container)
    }

    /// Fit against a box measured for `generation`. Stale measurements are ignored.
    pub fn fit_to_screen(
        &mut self,
        generation: u64,
        container: Size,
        bbox: Option<BoundingBox>,
    ) -> Option<Transform> {
        if generation != self.generation {
            debug!(
                requested = generation,
                current = self.generation,
                "ignoring fit for a stale tree"
            );
            return None;
        }
        Some(self.geometry.fit_to_screen(container, bbox))
    }

    /// Fit using the session's own measurement of the current tree.
    pub fn fit_measured(&mut self, container: Size) -> Transform {
        let bbox = (!self.is_empty()).then(|| self.measure());
        self.geometry.fit_to_screen(container, bbox)
    }

    pub fn measure(&self) -> BoundingBox {
        measure_tree(&self.tree, &self.metrics)
    }

    /// Route a node interaction; a selectable node becomes the selection.
    pub fn interact(&mut self, node: &RenderTreeNode, interaction: Interaction) -> Option<&str> {
        let id = NodeView::new(node).interact(interaction)?.to_string();
        self.selected = Some(id);
        self.selected.as_deref()
    }

    pub fn select(&mut self, member_id: &str) -> ApplicationResult<()> {
        if self.forest.find(member_id).is_none() {
            return Err(ApplicationError::Domain(DomainError::UnknownMember(
                member_id.to_string(),
            )));
        }
        self.selected = Some(member_id.to_string());
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected_member(&self) -> Option<&Member> {
        let idx = self.forest.find(self.selected.as_deref()?)?;
        self.forest.node(idx).map(|node| &node.member)
    }
}
