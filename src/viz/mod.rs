//! Visualization: renders generated maps to PNGs.
//!
//! - **Heightmap**: grayscale, or the elevation ramp below
//! - **Splatmap**: first three layer weights as RGB, or a dominant-layer palette
//!
//! Also reads source heightmap images for the sampler.

use image::{GrayImage, Luma, Rgb, RgbImage, RgbaImage};
use std::path::Path;
use tracing::info;

use crate::error::Result;
use crate::heightmap::HeightGrid;
use crate::splat::Splatmap;

// ---------------------------------------------------------------------------
// Color maps
// ---------------------------------------------------------------------------

fn elevation_color(t: f32) -> Rgb<u8> {
    let t = t.clamp(0.0, 1.0);
    if t < 0.1 {
        // Water: deep blue → light blue
        let s = t / 0.1;
        Rgb([(30.0 + 40.0 * s) as u8, (60.0 + 80.0 * s) as u8, (120.0 + 100.0 * s) as u8])
    } else if t < 0.35 {
        // Low: sand
        let s = (t - 0.1) / 0.25;
        Rgb([(210.0 - 30.0 * s) as u8, (190.0 - 20.0 * s) as u8, (130.0 - 30.0 * s) as u8])
    } else if t < 0.6 {
        // Mid: green
        let s = (t - 0.35) / 0.25;
        Rgb([(50.0 + 30.0 * s) as u8, (140.0 + 40.0 * s) as u8, (40.0 + 20.0 * s) as u8])
    } else if t < 0.8 {
        // High: grey rock
        let s = (t - 0.6) / 0.2;
        Rgb([(120.0 + 60.0 * s) as u8, (110.0 + 60.0 * s) as u8, (100.0 + 60.0 * s) as u8])
    } else {
        // Peak: white snow
        let s = (t - 0.8) / 0.2;
        Rgb([(220.0 + 35.0 * s) as u8, (225.0 + 30.0 * s) as u8, (230.0 + 25.0 * s) as u8])
    }
}

const LAYER_PALETTE: [Rgb<u8>; 6] = [
    Rgb([210, 190, 130]),
    Rgb([60, 150, 50]),
    Rgb([130, 120, 110]),
    Rgb([240, 245, 250]),
    Rgb([40, 90, 170]),
    Rgb([150, 60, 150]),
];

fn to_byte(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

// ---------------------------------------------------------------------------
// Renders
// ---------------------------------------------------------------------------

pub fn heightmap_image(grid: &HeightGrid) -> GrayImage {
    GrayImage::from_fn(grid.width as u32, grid.height as u32, |x, y| {
        Luma([to_byte(grid.get(x as usize, y as usize))])
    })
}

pub fn elevation_image(grid: &HeightGrid) -> RgbImage {
    RgbImage::from_fn(grid.width as u32, grid.height as u32, |x, y| {
        elevation_color(grid.get(x as usize, y as usize))
    })
}

/// Up to three layers map straight to R, G and B; more than three use
/// the dominant layer's palette colour.
pub fn splatmap_image(splat: &Splatmap) -> RgbImage {
    RgbImage::from_fn(splat.width as u32, splat.height as u32, |x, y| {
        let (x, y) = (x as usize, y as usize);
        if splat.layers <= 3 {
            let cell = splat.cell(x, y);
            let channel = |i: usize| cell.get(i).copied().map_or(0, to_byte);
            Rgb([channel(0), channel(1), channel(2)])
        } else {
            LAYER_PALETTE[splat.dominant_layer(x, y) % LAYER_PALETTE.len()]
        }
    })
}

pub fn write_heightmap_png(grid: &HeightGrid, path: &Path) -> Result<()> {
    heightmap_image(grid).save(path)?;
    info!(path = %path.display(), "wrote heightmap");
    Ok(())
}

pub fn write_elevation_png(grid: &HeightGrid, path: &Path) -> Result<()> {
    elevation_image(grid).save(path)?;
    info!(path = %path.display(), "wrote elevation render");
    Ok(())
}

pub fn write_splatmap_png(splat: &Splatmap, path: &Path) -> Result<()> {
    splatmap_image(splat).save(path)?;
    info!(path = %path.display(), layers = splat.layers, "wrote splatmap");
    Ok(())
}

/// Read a heightmap source image from disk.
pub fn load_heightmap_image(path: &Path) -> Result<RgbaImage> {
    let img = image::open(path)?.to_rgba8();
    info!(path = %path.display(), width = img.width(), height = img.height(), "loaded heightmap image");
    Ok(img)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heightmap::{sample_heightmap, SamplerParams};
    use crate::splat::{build_splatmap, SplatParams, TextureBand};

    fn ramp(res: usize) -> HeightGrid {
        let mut g = HeightGrid::square(res);
        g.par_map_rows(|x, _, _| x as f32 / (res - 1) as f32);
        g
    }

    #[test]
    fn test_heightmap_image_bytes() {
        let img = heightmap_image(&ramp(5));
        assert_eq!(img.get_pixel(0, 2).0, [0]);
        assert_eq!(img.get_pixel(4, 0).0, [255]);
        assert_eq!(img.get_pixel(2, 3).0, [128]);
    }

    #[test]
    fn test_splatmap_rgb_channels() {
        let bands = vec![TextureBand::new("a", 0.0, 0.5), TextureBand::new("b", 0.5, 1.0)];
        let params = SplatParams { blend_offset: 0.0, ..Default::default() };
        let splat = build_splatmap(&ramp(5), &bands, &params).unwrap();
        let img = splatmap_image(&splat);
        assert_eq!(img.get_pixel(0, 0).0, [255, 0, 0]);
        assert_eq!(img.get_pixel(2, 0).0, [128, 128, 0]);
        assert_eq!(img.get_pixel(4, 0).0, [0, 255, 0]);
    }

    #[test]
    fn test_png_round_trip_through_sampler() {
        let dir = std::env::temp_dir().join(format!("proc-terrain-viz-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("height.png");

        let grid = ramp(9);
        write_heightmap_png(&grid, &path).unwrap();
        let img = load_heightmap_image(&path).unwrap();
        assert_eq!(img.dimensions(), (9, 9));

        let back = sample_heightmap(&img, 9, &SamplerParams::default()).unwrap();
        for x in 0..9 {
            assert!((back.get(x, 4) - grid.get(x, 4)).abs() < 1.0 / 255.0 + 1e-4);
        }
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_image_is_error() {
        assert!(load_heightmap_image(Path::new("/nonexistent/height.png")).is_err());
    }
}
