//! Surface description of a mesh node

/// Unpacks `0xRRGGBB` into linear channel values in `[0, 1]`
pub fn rgb_from_hex(rgb: u32) -> [f32; 3] {
    let channel = |shift: u32| ((rgb >> shift) & 0xff) as f32 / 255.0;
    [channel(16), channel(8), channel(0)]
}

/// PBR-style material parameters of a mesh
///
/// `emissive` is `None` for materials without an emissive channel; such
/// meshes can still be selected but are not tinted.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub base_color: [f32; 4],
    pub metallic: f32,
    pub roughness: f32,
    pub emissive: Option<[f32; 3]>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            base_color: [0.8, 0.8, 0.8, 1.0],
            metallic: 0.0,
            roughness: 0.5,
            emissive: Some([0.0, 0.0, 0.0]),
        }
    }
}

impl Material {
    pub fn new(name: impl Into<String>, base_color: [f32; 4], metallic: f32, roughness: f32) -> Self {
        Self {
            name: name.into(),
            base_color,
            metallic: metallic.clamp(0.0, 1.0),
            roughness: roughness.clamp(0.0, 1.0),
            emissive: Some([0.0, 0.0, 0.0]),
        }
    }

    /// Opaque material from a packed `0xRRGGBB` color
    pub fn from_hex(name: impl Into<String>, rgb: u32, metallic: f32, roughness: f32) -> Self {
        let [r, g, b] = rgb_from_hex(rgb);
        Self::new(name, [r, g, b, 1.0], metallic, roughness)
    }

    pub fn with_emission(mut self, emissive: [f32; 3]) -> Self {
        self.emissive = Some(emissive);
        self
    }

    pub fn without_emissive(mut self) -> Self {
        self.emissive = None;
        self
    }

    /// Emissive color used for shading, black when the channel is absent
    pub fn emissive_or_black(&self) -> [f32; 3] {
        self.emissive.unwrap_or([0.0; 3])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex() {
        let material = Material::from_hex("skin", 0xff0080, 0.0, 1.0);
        assert_eq!(material.base_color[0], 1.0);
        assert_eq!(material.base_color[1], 0.0);
        assert!((material.base_color[2] - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(material.emissive, Some([0.0; 3]));
    }

    #[test]
    fn test_new_clamps_factors() {
        let material = Material::new("m", [1.0; 4], 3.0, -1.0);
        assert_eq!(material.metallic, 1.0);
        assert_eq!(material.roughness, 0.0);
        assert_eq!(material.without_emissive().emissive_or_black(), [0.0; 3]);
    }
}
