//! Built-in demo model
//!
//! A small anatomical figure shown when the viewer starts without a model:
//! three top-level groups ("Skin", "Muscles", "Skeleton") so every feature
//! (layers, picking, highlight) can be tried out immediately.

use std::sync::Arc;

use cgmath::{Matrix4, Rad, Vector3};

use crate::gfx::geometry::{generate_capsule, generate_cylinder, generate_sphere};
use crate::gfx::scene::Material;
use crate::loader::{DecodedNode, DecodedScene};

const SKIN_COLOR: u32 = 0xf0c8a0;
const MUSCLE_COLOR: u32 = 0xaa4444;
const BONE_COLOR: u32 = 0xeeeeee;

fn matte(name: &str, color: u32) -> Material {
    Material::from_hex(name, color, 0.0, 1.0)
}

fn translation(x: f32, y: f32, z: f32) -> Matrix4<f32> {
    Matrix4::from_translation(Vector3::new(x, y, z))
}

/// Builds the demo figure
pub fn demo_scene() -> DecodedScene {
    let skin = matte("skin", SKIN_COLOR);

    let head = DecodedNode::mesh(
        "Head",
        Arc::new(generate_sphere(0.12, 32, 32).into_mesh()),
        skin.clone(),
    )
    .with_transform(translation(0.0, 1.7, 0.0));
    let torso = DecodedNode::mesh(
        "Torso",
        Arc::new(generate_capsule(0.18, 0.5, 8, 20).into_mesh()),
        skin,
    )
    .with_transform(translation(0.0, 1.3, 0.0));

    let biceps = DecodedNode::mesh(
        "Biceps",
        Arc::new(generate_capsule(0.06, 0.22, 8, 16).into_mesh()),
        matte("muscle", MUSCLE_COLOR),
    )
    .with_transform(
        translation(0.25, 1.25, 0.0) * Matrix4::from_angle_z(Rad(std::f32::consts::PI * 0.15)),
    );

    let femur = DecodedNode::mesh(
        "Femur",
        Arc::new(generate_cylinder(0.03, 0.4, 24).into_mesh()),
        matte("bone", BONE_COLOR),
    )
    .with_transform(translation(0.1, 0.7, 0.0));

    DecodedScene::new()
        .with_root(DecodedNode::group("Skin").with_children([head, torso]))
        .with_root(DecodedNode::group("Muscles").with_child(biceps))
        .with_root(DecodedNode::group("Skeleton").with_child(femur))
}
