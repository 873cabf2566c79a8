// src/ui/panel.rs
//! The viewer's control panel
//!
//! The panel only reads the [`Viewer`]; everything the user asks for is
//! returned as [`PanelActions`] and applied after the frame.

use crate::error::LoadResult;
use crate::loader::LoadSource;
use crate::viewer::{LoadOutcome, Viewer};

/// Requests collected from one frame of the panel
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PanelActions {
    /// `(layer index, enabled)` pairs in click order
    pub layer_changes: Vec<(usize, bool)>,
    pub load_url: Option<String>,
    pub reset_view: bool,
    pub clear: bool,
    pub vsync: Option<bool>,
}

impl PanelActions {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Applies the requests that only concern the viewer.
    ///
    /// `load_url` and `vsync` are left for the caller, which owns the load
    /// queue and the surface.
    pub fn apply_to_viewer(&self, viewer: &mut Viewer) {
        for &(index, enabled) in &self.layer_changes {
            if !viewer.set_layer_enabled(index, enabled) {
                log::warn!("layer {} no longer exists", index);
            }
        }
        if self.clear {
            viewer.clear();
        }
        if self.reset_view {
            viewer.reset_view();
        }
    }
}

/// Panel state that outlives a single frame
#[derive(Debug, Clone)]
pub struct PanelState {
    pub url_input: String,
    pub status: String,
    pub vsync: bool,
}

impl PanelState {
    pub fn new(vsync: bool) -> Self {
        Self {
            url_input: String::new(),
            status: "Ready".to_string(),
            vsync,
        }
    }

    pub fn report_loading(&mut self, source: &LoadSource) {
        self.status = format!("Loading {}...", source);
    }

    /// Updates the status line after a completion was handed to the viewer
    pub fn report_load(&mut self, source: &LoadSource, result: &LoadResult<LoadOutcome>) {
        match result {
            Ok(LoadOutcome::Applied { statistics, .. }) => {
                self.status = format!(
                    "Loaded {} ({} meshes, {} triangles)",
                    source, statistics.mesh_count, statistics.triangle_count
                );
            }
            Ok(LoadOutcome::Discarded) => {
                log::debug!("status unchanged for discarded load of {}", source);
            }
            Err(e) => self.status = format!("Failed to load {}: {}", source, e),
        }
    }
}

/// Draws the control panel and returns what the user asked for
pub fn viewer_panel(ui: &imgui::Ui, viewer: &Viewer, state: &mut PanelState) -> PanelActions {
    let mut actions = PanelActions::default();
    let display_size = ui.io().display_size;
    if display_size[0] <= 0.0 || display_size[1] <= 0.0 {
        return actions;
    }

    ui.window("Model")
        .size([320.0, 460.0], imgui::Condition::FirstUseEver)
        .position([12.0, 12.0], imgui::Condition::FirstUseEver)
        .resizable(true)
        .collapsible(true)
        .build(|| {
            render_layers(ui, viewer, &mut actions);
            ui.separator();
            render_selection(ui, viewer);
            ui.separator();
            render_load(ui, state, &mut actions);
            ui.separator();
            render_view(ui, viewer, state, &mut actions);
        });

    actions
}

fn render_layers(ui: &imgui::Ui, viewer: &Viewer, actions: &mut PanelActions) {
    if !ui.collapsing_header("Layers", imgui::TreeNodeFlags::DEFAULT_OPEN) {
        return;
    }
    for (index, toggle) in viewer.layers().iter().enumerate() {
        let mut enabled = toggle.enabled;
        let _id = ui.push_id_usize(index);
        if ui.checkbox(&toggle.label, &mut enabled) {
            actions.layer_changes.push((index, enabled));
        }
    }
}

fn render_selection(ui: &imgui::Ui, viewer: &Viewer) {
    if !ui.collapsing_header("Selection", imgui::TreeNodeFlags::DEFAULT_OPEN) {
        return;
    }
    match viewer.selection() {
        Some(selection) => {
            ui.text(&selection.name);
            ui.text_wrapped(selection.describe());
        }
        None => ui.text_disabled(viewer.selection_text()),
    }
}

fn render_load(ui: &imgui::Ui, state: &mut PanelState, actions: &mut PanelActions) {
    if !ui.collapsing_header("Load", imgui::TreeNodeFlags::DEFAULT_OPEN) {
        return;
    }
    ui.set_next_item_width(-1.0);
    let submitted = ui
        .input_text("##url", &mut state.url_input)
        .hint("URL or path to .glb / .gltf / .obj")
        .enter_returns_true(true)
        .build();
    if (ui.button("Load") || submitted) && !state.url_input.trim().is_empty() {
        actions.load_url = Some(state.url_input.trim().to_string());
    }
    ui.same_line();
    if ui.button("Clear") {
        actions.clear = true;
    }
    ui.text_wrapped(&state.status);
}

fn render_view(ui: &imgui::Ui, viewer: &Viewer, state: &mut PanelState, actions: &mut PanelActions) {
    if ui.button("Reset view") {
        actions.reset_view = true;
    }
    ui.same_line();
    if ui.checkbox("VSync", &mut state.vsync) {
        actions.vsync = Some(state.vsync);
    }

    let stats = viewer.statistics();
    ui.text(format!(
        "{} nodes, {} meshes, {} groups",
        stats.node_count, stats.mesh_count, stats.group_count
    ));
    ui.text(format!(
        "{} triangles, {} vertices",
        stats.triangle_count, stats.vertex_count
    ));
    ui.text(format!("{:.1} FPS", ui.io().framerate));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewerConfig;
    use crate::demo::demo_scene;
    use crate::error::{DecodeError, LoadError};

    #[test]
    fn test_layer_changes_apply_in_order() {
        let mut viewer = Viewer::new(ViewerConfig::default());
        viewer.load_scene(demo_scene());

        let actions = PanelActions {
            layer_changes: vec![(1, false), (1, true), (2, false)],
            ..Default::default()
        };
        actions.apply_to_viewer(&mut viewer);

        let enabled: Vec<_> = viewer.layers().iter().map(|t| t.enabled).collect();
        assert_eq!(enabled, [true, true, false]);
    }

    #[test]
    fn test_clear_action_empties_scene() {
        let mut viewer = Viewer::new(ViewerConfig::default());
        viewer.load_scene(demo_scene());
        assert!(PanelActions::default().is_empty());

        let actions = PanelActions {
            clear: true,
            ..Default::default()
        };
        assert!(!actions.is_empty());
        actions.apply_to_viewer(&mut viewer);
        assert!(viewer.graph().is_empty());
    }

    #[test]
    fn test_status_reports() {
        let mut viewer = Viewer::new(ViewerConfig::default());
        let mut state = PanelState::new(true);
        let source = LoadSource::Url("demo.glb".into());

        state.report_loading(&source);
        assert_eq!(state.status, "Loading demo.glb...");

        let applied = Ok(viewer.load_scene(demo_scene()));
        state.report_load(&source, &applied);
        assert!(state.status.starts_with("Loaded demo.glb (4 meshes"));

        state.report_load(&source, &Ok(LoadOutcome::Discarded));
        assert!(state.status.starts_with("Loaded demo.glb"));

        let failed = Err(LoadError::Decode(DecodeError::Empty));
        state.report_load(&source, &failed);
        assert_eq!(state.status, "Failed to load demo.glb: decode failed: document is empty");
    }
}
