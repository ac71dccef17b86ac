//! Material assignment strategies for tessellated meshes.
//!
//! The tessellator never decides colours itself; it hands a renderer to a
//! `MaterialAssigner` after building the mesh.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub shader: String,
    pub color: [f32; 4],
}

impl Material {
    pub fn specular(color: [f32; 4]) -> Self {
        Self {
            shader: "Specular".to_string(),
            color,
        }
    }
}

pub const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
pub const RED: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
pub const GREEN: [f32; 4] = [0.0, 1.0, 0.0, 1.0];
pub const BLUE: [f32; 4] = [0.0, 0.0, 1.0, 1.0];
pub const YELLOW: [f32; 4] = [1.0, 0.92, 0.016, 1.0];
pub const MAGENTA: [f32; 4] = [1.0, 0.0, 1.0, 1.0];

/// Ordered material slots of a rendered mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshRenderer {
    pub materials: Vec<Material>,
}

impl MeshRenderer {
    /// Material for submesh `index`; slots repeat when there are fewer
    /// materials than submeshes.
    pub fn material_for_submesh(&self, index: usize) -> Option<&Material> {
        if self.materials.is_empty() {
            None
        } else {
            self.materials.get(index % self.materials.len())
        }
    }
}

pub trait MaterialAssigner {
    fn add_materials(&self, renderer: &mut MeshRenderer);
}

/// One white specular material for every submesh.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhiteSpecular;

impl MaterialAssigner for WhiteSpecular {
    fn add_materials(&self, renderer: &mut MeshRenderer) {
        renderer.materials = vec![Material::specular(WHITE)];
    }
}

/// A fixed list of specular colours, one per slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    pub colors: Vec<[f32; 4]>,
}

impl Palette {
    pub fn new(colors: Vec<[f32; 4]>) -> Self {
        Self { colors }
    }

    /// Red, green, blue, yellow, magenta.
    pub fn primaries() -> Self {
        Self::new(vec![RED, GREEN, BLUE, YELLOW, MAGENTA])
    }
}

impl MaterialAssigner for Palette {
    fn add_materials(&self, renderer: &mut MeshRenderer) {
        renderer.materials = self.colors.iter().copied().map(Material::specular).collect();
    }
}

/// Scheme names accepted in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialScheme {
    #[default]
    White,
    Primaries,
}

impl MaterialScheme {
    pub fn assigner(self) -> Box<dyn MaterialAssigner> {
        match self {
            MaterialScheme::White => Box::new(WhiteSpecular),
            MaterialScheme::Primaries => Box::new(Palette::primaries()),
        }
    }
}
