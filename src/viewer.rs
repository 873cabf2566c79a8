//! # Viewer
//!
//! [`Viewer`] owns all state of one viewport: the scene graph, the camera,
//! and everything derived from the scene (pickable meshes, layer toggles,
//! highlight and selection). It is driven from a single thread; background
//! loads hand their results to [`Viewer::complete_load`].
//!
//! ## Load ordering
//!
//! Every load is issued a [`LoadTicket`] from a monotonically increasing
//! generation counter. What happens to a completion depends on
//! [`LoadOrdering`]:
//!
//! - `LastCompletionWins`: any completion requested after the last
//!   [`Viewer::clear`] is applied, so the completion processed last defines
//!   the scene
//! - `LatestRequestWins`: only the most recently issued ticket is applied
//!
//! Discarded and failed loads leave the current scene untouched.

use crate::config::{LoadOrdering, ViewerConfig};
use crate::error::{LoadError, LoadResult};
use crate::gfx::camera::{frame, CameraManager, FramingOutcome};
use crate::gfx::picking::{self, HighlightState, PickHit, PickableIndex, Selection, ViewportRect};
use crate::gfx::scene::{layers, Aabb, LayerToggle, NodeId, SceneGraph, SceneStatistics};
use crate::loader::{decode, DecodedScene, LoadTicket};

/// Shown when no mesh is selected
pub const NOTHING_SELECTED: &str = "Nothing selected";

/// What [`Viewer::complete_load`] did with a completion
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoadOutcome {
    /// The scene was replaced and framed
    Applied {
        framing: FramingOutcome,
        statistics: SceneStatistics,
    },
    /// The completion was superseded and ignored
    Discarded,
}

pub struct Viewer {
    config: ViewerConfig,
    graph: SceneGraph,
    camera: CameraManager,
    pickables: PickableIndex,
    layers: Vec<LayerToggle>,
    highlight: HighlightState,
    selection: Option<Selection>,
    generation: u64,
    cleared_at: u64,
    last_framing: Option<FramingOutcome>,
}

impl Viewer {
    pub fn new(config: ViewerConfig) -> Self {
        let graph = SceneGraph::new();
        let layers = layers::rebuild(&graph);
        let pickables = PickableIndex::build(&graph);

        Self {
            camera: CameraManager::from_config(&config),
            highlight: HighlightState::new(config.highlight_tint),
            config,
            graph,
            pickables,
            layers,
            selection: None,
            generation: 0,
            cleared_at: 0,
            last_framing: None,
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn camera(&self) -> &CameraManager {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut CameraManager {
        &mut self.camera
    }

    pub fn pickables(&self) -> &PickableIndex {
        &self.pickables
    }

    pub fn layers(&self) -> &[LayerToggle] {
        &self.layers
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    /// Info line for the current selection
    pub fn selection_text(&self) -> String {
        self.selection
            .as_ref()
            .map_or_else(|| NOTHING_SELECTED.to_string(), Selection::describe)
    }

    pub fn highlighted(&self) -> Option<NodeId> {
        self.highlight.current()
    }

    /// Result of the most recent framing, `None` before the first one
    pub fn last_framing(&self) -> Option<FramingOutcome> {
        self.last_framing
    }

    pub fn statistics(&self) -> SceneStatistics {
        self.graph.statistics()
    }

    /// Issues the ticket for a new load request
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        LoadTicket::new(self.generation)
    }

    /// Whether a completion for `ticket` would be applied right now
    pub fn accepts(&self, ticket: LoadTicket) -> bool {
        match self.config.load_ordering {
            LoadOrdering::LastCompletionWins => ticket.generation() > self.cleared_at,
            LoadOrdering::LatestRequestWins => ticket.generation() == self.generation,
        }
    }

    /// Applies the result of the load identified by `ticket`.
    ///
    /// Superseded completions are discarded whether they succeeded or not.
    /// Errors are returned and leave the scene as it was.
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        result: LoadResult<DecodedScene>,
    ) -> LoadResult<LoadOutcome> {
        if !self.accepts(ticket) {
            log::info!(
                "discarding load {} (current generation {})",
                ticket.generation(),
                self.generation
            );
            return Ok(LoadOutcome::Discarded);
        }

        let decoded = result.inspect_err(|e| {
            log::error!("load {} failed: {}", ticket.generation(), e);
        })?;
        Ok(self.install(decoded))
    }

    /// Decodes and applies a document synchronously
    ///
    /// # Arguments
    ///
    /// * `bytes` - The complete document
    /// * `name_hint` - Optional file name or URL used for format detection
    pub fn load_bytes(&mut self, bytes: &[u8], name_hint: Option<&str>) -> LoadResult<LoadOutcome> {
        let ticket = self.begin_load();
        let result = decode(bytes, name_hint).map_err(LoadError::from);
        self.complete_load(ticket, result)
    }

    /// Replaces the scene with an already decoded one
    pub fn load_scene(&mut self, decoded: DecodedScene) -> LoadOutcome {
        self.begin_load();
        self.install(decoded)
    }

    fn install(&mut self, decoded: DecodedScene) -> LoadOutcome {
        // The highlighted mesh is about to disappear with the old arena
        self.highlight.forget();
        self.selection = None;

        self.graph.load_subtree(decoded);
        self.rebuild_derived();
        let framing = self.reset_view();
        let statistics = self.graph.statistics();

        log::info!(
            "scene loaded: {} meshes, {} triangles, {} layers",
            statistics.mesh_count,
            statistics.triangle_count,
            self.layers.len()
        );
        LoadOutcome::Applied {
            framing,
            statistics,
        }
    }

    fn rebuild_derived(&mut self) {
        let pickables = PickableIndex::build(&self.graph);
        let layers = layers::rebuild(&self.graph);
        self.pickables = pickables;
        self.layers = layers;
    }

    /// Removes the model. Loads requested before this call are discarded.
    pub fn clear(&mut self) {
        self.cleared_at = self.generation;
        self.highlight.forget();
        self.selection = None;
        self.graph.clear();
        self.rebuild_derived();
        log::info!("scene cleared");
    }

    /// Frames the whole model
    pub fn reset_view(&mut self) -> FramingOutcome {
        let root = self.graph.root();
        self.frame_node(root).unwrap_or(FramingOutcome::DefaultBox)
    }

    /// Frames one node and its descendants; `None` for stale ids
    pub fn frame_node(&mut self, node: NodeId) -> Option<FramingOutcome> {
        let bounds: Aabb = self.graph.world_bounds(node)?;
        self.camera.controller.stop();
        let outcome = frame(&mut self.camera.camera, bounds, &self.config);
        self.last_framing = Some(outcome);
        Some(outcome)
    }

    /// Picks the mesh under a pointer position and makes it the selection.
    ///
    /// A miss clears the selection and the highlight.
    pub fn pick(&mut self, pointer_x: f32, pointer_y: f32, rect: ViewportRect) -> Option<PickHit> {
        let hit = picking::pick(
            &self.pickables,
            &self.graph,
            &self.camera.camera,
            (pointer_x, pointer_y),
            &rect,
        );
        let node = hit.map(|hit| hit.node);

        self.highlight.apply(&mut self.graph, node);
        self.selection =
            node.and_then(|node| Selection::from_graph(&self.graph, node, self.config.ancestor_depth));

        log::info!("{}", self.selection_text());
        hit
    }

    /// Shows or hides the layer at `index` of [`Viewer::layers`].
    ///
    /// Returns `false` for an unknown index.
    pub fn set_layer_enabled(&mut self, index: usize, enabled: bool) -> bool {
        let Some(toggle) = self.layers.get(index).cloned() else {
            return false;
        };
        if !layers::set_enabled(&mut self.graph, &toggle, enabled) {
            return false;
        }
        log::debug!("layer '{}' enabled: {}", toggle.label, enabled);
        self.layers = layers::rebuild(&self.graph);
        true
    }

    /// Updates the projection for a new viewport size
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.camera.camera.resize_projection(width, height);
            self.camera.camera.update_view_proj();
        }
    }

    /// Applies pending orbit, pan and zoom motion; returns `true` if the camera moved
    pub fn integrate_controls(&mut self) -> bool {
        self.camera.integrate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo;

    #[test]
    fn test_new_viewer_has_whole_model_toggle() {
        let viewer = Viewer::new(ViewerConfig::default());
        assert_eq!(viewer.layers().len(), 1);
        assert_eq!(viewer.layers()[0].label, crate::gfx::scene::WHOLE_MODEL_LABEL);
        assert_eq!(viewer.selection_text(), NOTHING_SELECTED);
        assert!(viewer.last_framing().is_none());
    }

    #[test]
    fn test_clear_discards_older_tickets() {
        let mut viewer = Viewer::new(ViewerConfig::default());
        let before = viewer.begin_load();
        viewer.clear();
        let after = viewer.begin_load();

        assert!(!viewer.accepts(before));
        assert!(viewer.accepts(after));
        assert_eq!(
            viewer.complete_load(before, Ok(demo::demo_scene())).unwrap(),
            LoadOutcome::Discarded
        );
        assert!(viewer.graph().is_empty());
    }

    #[test]
    fn test_latest_request_policy_discards_stale() {
        let config = ViewerConfig::default().with_load_ordering(LoadOrdering::LatestRequestWins);
        let mut viewer = Viewer::new(config);
        let first = viewer.begin_load();
        let second = viewer.begin_load();

        assert_eq!(
            viewer.complete_load(first, Ok(demo::demo_scene())).unwrap(),
            LoadOutcome::Discarded
        );
        assert!(matches!(
            viewer.complete_load(second, Ok(DecodedScene::new())).unwrap(),
            LoadOutcome::Applied { .. }
        ));
    }

    #[test]
    fn test_unknown_layer_index() {
        let mut viewer = Viewer::new(ViewerConfig::default());
        assert!(!viewer.set_layer_enabled(5, false));
        assert!(viewer.set_layer_enabled(0, false));
        assert!(!viewer.layers()[0].enabled);
    }
}
