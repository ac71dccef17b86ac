// ============================================================================
// Generator Configuration: every knob of every pass, loadable from TOML
//
// Per-pass parameter structs live next to the pass that uses them; this
// module gathers them with the pass toggles and the terrain dimensions.
// ============================================================================

use std::path::{Path, PathBuf};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TerrainError};
use crate::heightmap::SamplerParams;
use crate::mesh::MaterialScheme;
use crate::placement::{TreeParams, TreeSpeciesDef, WaterDef};
use crate::scene::{MazeParams, PlayerSpawn};
use crate::splat::{SplatParams, TextureBand, TextureMode};
use crate::synth::NoiseMode;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainSettings {
    pub resolution: usize,
    pub size:       Vec3,
    pub origin:     Vec3,
}

impl Default for TerrainSettings {
    fn default() -> Self {
        Self {
            resolution: 513,
            size:       Vec3::new(1000.0, 600.0, 1000.0),
            origin:     Vec3::ZERO,
        }
    }
}

/// Which passes run on `regenerate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PassToggles {
    pub load_heightmap: bool,
    pub perlin_noise:   bool,
    pub flatten:        bool,
    pub add_texture:    bool,
    pub remove_texture: bool,
    pub add_trees:      bool,
    pub add_water:      bool,
}

impl Default for PassToggles {
    fn default() -> Self {
        Self {
            load_heightmap: false,
            perlin_noise:   true,
            flatten:        false,
            add_texture:    true,
            remove_texture: false,
            add_trees:      true,
            add_water:      true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HeightmapSettings {
    /// Source image; required when `load_heightmap` is on.
    pub image:   Option<PathBuf>,
    pub sampler: SamplerParams,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseSettings {
    pub width_scale:  f64,
    pub height_scale: f64,
    pub seed:         u32,
}

impl Default for NoiseSettings {
    fn default() -> Self {
        Self {
            width_scale:  0.01,
            height_scale: 0.01,
            seed:         0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextureSettings {
    pub bands: Vec<TextureBand>,
    pub splat: SplatParams,
}

impl Default for TextureSettings {
    fn default() -> Self {
        Self {
            bands: vec![
                TextureBand::new("textures/sand.png",  0.0,  0.35),
                TextureBand::new("textures/grass.png", 0.35, 0.6),
                TextureBand::new("textures/rock.png",  0.6,  0.8),
                TextureBand::new("textures/snow.png",  0.8,  1.0),
            ],
            splat: SplatParams::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeSettings {
    pub species: Vec<TreeSpeciesDef>,
    pub params:  TreeParams,
}

impl Default for TreeSettings {
    fn default() -> Self {
        Self {
            species: vec![
                TreeSpeciesDef::new("trees/palm", 0.3,  0.45),
                TreeSpeciesDef::new("trees/oak",  0.45, 0.6),
                TreeSpeciesDef::new("trees/pine", 0.6,  0.75),
            ],
            params: TreeParams::default(),
        }
    }
}

/// The tessellated plane built alongside the terrain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaneSettings {
    pub width:     usize,
    pub height:    usize,
    pub cell_size: f32,
    pub submeshes: usize,
    pub materials: MaterialScheme,
}

impl Default for PlaneSettings {
    fn default() -> Self {
        Self {
            width:     100,
            height:    100,
            cell_size: 2.0,
            submeshes: 6,
            materials: MaterialScheme::White,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub terrain:   TerrainSettings,
    pub passes:    PassToggles,
    pub heightmap: HeightmapSettings,
    pub noise:     NoiseSettings,
    pub textures:  TextureSettings,
    pub trees:     TreeSettings,
    pub water:     WaterDef,
    pub plane:     PlaneSettings,
    pub maze:      MazeParams,
    pub player:    PlayerSpawn,
}

impl GeneratorConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }

    /// Reject combinations no pass can honour.
    pub fn validate(&self) -> Result<()> {
        if self.terrain.resolution < 2 {
            return Err(TerrainError::invalid("terrain resolution must be at least 2"));
        }
        if self.terrain.size.min_element() <= 0.0 {
            return Err(TerrainError::invalid("terrain size must be positive on every axis"));
        }
        self.noise_mode()?;
        if self.passes.load_heightmap && !self.passes.flatten && self.heightmap.image.is_none() {
            return Err(TerrainError::invalid("load_heightmap is on but no heightmap image is set"));
        }
        if self.passes.add_trees {
            self.trees.params.validate()?;
        }
        if self.plane.submeshes == 0 {
            return Err(TerrainError::invalid("plane needs at least one submesh"));
        }
        Ok(())
    }

    /// Noise pass to run, if any.
    pub fn noise_mode(&self) -> Result<Option<NoiseMode>> {
        NoiseMode::from_flags(
            self.passes.flatten,
            self.passes.perlin_noise,
            self.noise.width_scale,
            self.noise.height_scale,
            self.noise.seed,
        )
    }

    /// Add wins when both texture toggles are on.
    pub fn texture_mode(&self) -> Option<TextureMode> {
        if self.passes.add_texture {
            Some(TextureMode::Add)
        } else if self.passes.remove_texture {
            Some(TextureMode::Remove)
        } else {
            None
        }
    }

    /// Flatten switches heightmap loading off.
    pub fn loads_heightmap(&self) -> bool {
        self.passes.load_heightmap && !self.passes.flatten
    }
}
