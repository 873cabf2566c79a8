//! End-to-end behaviour of the viewer without a window

mod common;

use std::io::Write;
use std::sync::Arc;

use cgmath::Matrix4;

use strata::demo::demo_scene;
use strata::error::{DecodeError, LoadError};
use strata::gfx::camera::FramingOutcome;
use strata::gfx::geometry::generate_cube;
use strata::gfx::picking::ViewportRect;
use strata::gfx::scene::{Material, WHOLE_MODEL_LABEL};
use strata::loader::{DecodedNode, DecodedScene, Fetcher, HttpFetcher, LoadQueue};
use strata::viewer::NOTHING_SELECTED;
use strata::{LoadOrdering, LoadOutcome, Viewer, ViewerConfig};

const WIDTH: u32 = 800;
const HEIGHT: u32 = 600;

fn viewer(config: ViewerConfig) -> Viewer {
    let mut viewer = Viewer::new(config.with_window_size(WIDTH, HEIGHT));
    viewer.resize(WIDTH, HEIGHT);
    viewer
}

fn rect() -> ViewportRect {
    ViewportRect::from_size(WIDTH, HEIGHT)
}

fn layer_labels(viewer: &Viewer) -> Vec<&str> {
    viewer.layers().iter().map(|t| t.label.as_str()).collect()
}

fn visible_mesh_names(viewer: &Viewer) -> Vec<String> {
    let graph = viewer.graph();
    graph
        .traverse_visible(graph.root())
        .filter(|&id| graph.get(id).is_some_and(|n| n.mesh().is_some()))
        .filter_map(|id| graph.display_name(id).map(str::to_string))
        .collect()
}

#[test]
fn test_demo_layers_hide_and_show_groups() {
    let mut viewer = viewer(ViewerConfig::default());
    viewer.load_scene(demo_scene());

    assert_eq!(layer_labels(&viewer), ["Skin", "Muscles", "Skeleton"]);
    assert!(viewer.layers().iter().all(|t| t.enabled));
    assert_eq!(visible_mesh_names(&viewer), ["Head", "Torso", "Biceps", "Femur"]);

    assert!(viewer.set_layer_enabled(0, false));
    assert_eq!(visible_mesh_names(&viewer), ["Biceps", "Femur"]);
    assert!(!viewer.layers()[0].enabled);

    assert!(viewer.set_layer_enabled(0, true));
    assert_eq!(visible_mesh_names(&viewer).len(), 4);
    assert!(!viewer.set_layer_enabled(3, false));
}

#[test]
fn test_last_completion_wins() {
    let mut viewer = viewer(ViewerConfig::default());
    let first = viewer.begin_load();
    let second = viewer.begin_load();

    let outcome = viewer
        .complete_load(second, Ok(common::stacked_cubes()))
        .unwrap();
    assert!(matches!(outcome, LoadOutcome::Applied { .. }));
    assert_eq!(layer_labels(&viewer), ["Parts"]);

    // The older request finishes later and still replaces the scene
    let outcome = viewer.complete_load(first, Ok(demo_scene())).unwrap();
    assert!(matches!(outcome, LoadOutcome::Applied { .. }));
    assert_eq!(layer_labels(&viewer), ["Skin", "Muscles", "Skeleton"]);
}

#[test]
fn test_latest_request_wins_discards_older_completion() {
    let config = ViewerConfig::default().with_load_ordering(LoadOrdering::LatestRequestWins);
    let mut viewer = viewer(config);
    let first = viewer.begin_load();
    let second = viewer.begin_load();

    viewer.complete_load(second, Ok(common::stacked_cubes())).unwrap();
    let outcome = viewer.complete_load(first, Ok(demo_scene())).unwrap();

    assert_eq!(outcome, LoadOutcome::Discarded);
    assert_eq!(layer_labels(&viewer), ["Parts"]);
}

#[test]
fn test_clear_discards_pending_loads() {
    let mut viewer = viewer(ViewerConfig::default());
    viewer.load_scene(demo_scene());
    let pending = viewer.begin_load();
    viewer.clear();

    let outcome = viewer.complete_load(pending, Ok(demo_scene())).unwrap();
    assert_eq!(outcome, LoadOutcome::Discarded);
    assert!(viewer.graph().is_empty());
    assert_eq!(layer_labels(&viewer), [WHOLE_MODEL_LABEL]);
}

#[test]
fn test_empty_document_frames_default_box() {
    let mut viewer = viewer(ViewerConfig::default());
    let outcome = viewer
        .load_bytes(br#"{"asset": {"version": "2.0"}}"#, Some("empty.gltf"))
        .unwrap();

    let LoadOutcome::Applied { framing, statistics } = outcome else {
        panic!("empty document was discarded");
    };
    assert_eq!(framing, FramingOutcome::DefaultBox);
    assert_eq!(statistics.mesh_count, 0);
    assert_eq!(layer_labels(&viewer), [WHOLE_MODEL_LABEL]);
    assert!(viewer.pick(WIDTH as f32 / 2.0, HEIGHT as f32 / 2.0, rect()).is_none());
}

#[test]
fn test_failed_load_keeps_scene() {
    let mut viewer = viewer(ViewerConfig::default());
    viewer.load_scene(demo_scene());
    let before = viewer.statistics();
    let revision = viewer.graph().revision();

    let ticket = viewer.begin_load();
    let result = viewer.complete_load(ticket, Err(LoadError::Decode(DecodeError::Empty)));
    assert!(result.is_err());

    let result = viewer.load_bytes(b"glTF\x02\0\0\0garbage", None);
    assert!(matches!(result, Err(LoadError::Decode(DecodeError::Gltf(_)))));

    assert_eq!(viewer.statistics(), before);
    assert_eq!(viewer.graph().revision(), revision);
    assert_eq!(layer_labels(&viewer), ["Skin", "Muscles", "Skeleton"]);
}

#[test]
fn test_pick_highlights_nearest_mesh() {
    let config = ViewerConfig::default();
    let tint = config.highlight_tint;
    let mut viewer = viewer(config);
    viewer.load_scene(common::stacked_cubes());

    let hit = viewer
        .pick(WIDTH as f32 / 2.0, HEIGHT as f32 / 2.0, rect())
        .expect("center of the viewport should hit a cube");
    let graph = viewer.graph();
    assert_eq!(graph.display_name(hit.node), Some("Near"));
    assert_eq!(viewer.highlighted(), Some(hit.node));

    let material = &graph.get(hit.node).and_then(|n| n.mesh()).unwrap().material;
    assert_eq!(material.emissive, Some(tint));
    assert!(viewer
        .selection_text()
        .starts_with("Selected Near path Near > Parts"));

    // A miss restores the original emissive color
    assert!(viewer.pick(1.0, 1.0, rect()).is_none());
    let material = &viewer.graph().get(hit.node).and_then(|n| n.mesh()).unwrap().material;
    assert_eq!(material.emissive, Some([0.0; 3]));
    assert_eq!(viewer.highlighted(), None);
    assert_eq!(viewer.selection_text(), NOTHING_SELECTED);
}

#[test]
fn test_hidden_layer_is_not_pickable() {
    let mut viewer = viewer(ViewerConfig::default());
    viewer.load_scene(common::stacked_cubes());
    viewer.set_layer_enabled(0, false);

    assert!(viewer.pick(WIDTH as f32 / 2.0, HEIGHT as f32 / 2.0, rect()).is_none());
    assert!(viewer.selection().is_none());
}

#[test]
fn test_load_bytes_detects_formats() {
    let mut viewer = viewer(ViewerConfig::default());

    viewer.load_bytes(&common::quad_glb(), None).unwrap();
    assert_eq!(layer_labels(&viewer), ["Outer"]);
    assert!(viewer.layers().iter().all(|t| t.enabled));
    assert_eq!(viewer.statistics().triangle_count, 2);

    viewer
        .load_bytes(common::TRIANGLE_OBJ.as_bytes(), Some("wedge.obj"))
        .unwrap();
    assert_eq!(layer_labels(&viewer), [WHOLE_MODEL_LABEL]);
    assert_eq!(visible_mesh_names(&viewer), ["Wedge"]);
}

#[test]
fn test_background_load_from_file() {
    let mut file = tempfile::Builder::new().suffix(".glb").tempfile().unwrap();
    file.write_all(&common::quad_glb()).unwrap();
    let path = file.path().to_string_lossy().into_owned();

    let config = ViewerConfig::default();
    let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::from_config(&config));
    let mut queue = LoadQueue::new(fetcher);
    let mut viewer = viewer(config);

    let ticket = viewer.begin_load();
    queue.spawn_url(ticket, format!("file://{}", path)).unwrap();
    let completion = queue.wait_next().expect("one load in flight");
    assert_eq!(completion.ticket, ticket);

    let outcome = viewer
        .complete_load(completion.ticket, completion.result)
        .unwrap();
    assert!(matches!(outcome, LoadOutcome::Applied { .. }));
    assert_eq!(layer_labels(&viewer), ["Outer"]);
    assert_eq!(queue.in_flight(), 0);
}

#[test]
fn test_tiny_model_is_framed_and_pickable() {
    let mut viewer = viewer(ViewerConfig::default());
    let tiny = common::cube("Grain", [0.0; 3]).with_transform(Matrix4::from_scale(1e-4));
    viewer.load_scene(DecodedScene::new().with_root(DecodedNode::group("Dust").with_child(tiny)));

    let camera = &viewer.camera().camera;
    assert!(camera.znear < camera.distance);

    let hit = viewer.pick(WIDTH as f32 / 2.0, HEIGHT as f32 / 2.0, rect());
    let name = hit.and_then(|hit| viewer.graph().display_name(hit.node));
    assert_eq!(name, Some("Grain"));
}

#[test]
fn test_mesh_without_emissive_is_selected_but_not_highlighted() {
    let mut viewer = viewer(ViewerConfig::default());
    let plain = DecodedNode::mesh(
        "Plain",
        Arc::new(generate_cube().into_mesh()),
        Material::default().without_emissive(),
    );
    viewer.load_scene(DecodedScene::new().with_root(plain));

    let hit = viewer
        .pick(WIDTH as f32 / 2.0, HEIGHT as f32 / 2.0, rect())
        .expect("center of the viewport should hit the cube");
    assert_eq!(viewer.selection().map(|s| s.node), Some(hit.node));
    assert_eq!(viewer.highlighted(), None);

    let material = &viewer.graph().get(hit.node).and_then(|n| n.mesh()).unwrap().material;
    assert_eq!(material.emissive, None);
}
