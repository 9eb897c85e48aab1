use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
use imageproc::distance_transform::Norm;
use imageproc::morphology;
use thiserror::Error;

use crate::config::{CleanConfig, DenoisePass};

#[derive(Debug, Error)]
pub enum CleanError {
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
}

/// Decode raw image bytes and run the cleaning pipeline.
pub fn clean_bytes(data: &[u8], cfg: &CleanConfig) -> Result<GrayImage, CleanError> {
    let img = image::load_from_memory(data)?;
    Ok(clean(&img, cfg))
}

/// Reduce a raw CAPTCHA image to a binarized glyph mask.
///
/// Stage order is a design invariant: grayscale, the configured denoise
/// passes in sequence, inverted binary threshold, morphological close.
/// Deterministic — identical input bytes produce identical output.
pub fn clean(img: &DynamicImage, cfg: &CleanConfig) -> GrayImage {
    let mut gray = img.to_luma8();

    for pass in &cfg.denoise {
        gray = nl_means_denoise(&gray, pass);
    }

    let binary = threshold_inverted(&gray, cfg.threshold_cutoff);

    // Reconnects strokes broken by thresholding without merging adjacent
    // glyphs; LInf norm gives a square structuring element.
    morphology::close(&binary, Norm::LInf, cfg.closing_radius)
}

/// Inverted binary threshold: pixels at or below `cutoff` become foreground
/// (255), brighter pixels become background (0).
fn threshold_inverted(gray: &GrayImage, cutoff: u8) -> GrayImage {
    ImageBuffer::from_fn(gray.width(), gray.height(), |x, y| {
        if gray.get_pixel(x, y)[0] > cutoff {
            Luma([0u8])
        } else {
            Luma([255u8])
        }
    })
}

/// Non-local-means denoising over a grayscale image.
///
/// Each output pixel is a weighted average of the pixels in its search
/// window; a candidate's weight falls off exponentially with the mean
/// squared difference between the patches around the two pixels. Borders
/// are handled by clamping sample coordinates.
fn nl_means_denoise(src: &GrayImage, pass: &DenoisePass) -> GrayImage {
    let patch_radius = (pass.template_window / 2) as i64;
    let search_radius = (pass.search_window / 2) as i64;
    let h2 = pass.strength * pass.strength;

    ImageBuffer::from_fn(src.width(), src.height(), |x, y| {
        let (x, y) = (x as i64, y as i64);
        let mut acc = 0.0f32;
        let mut weight_sum = 0.0f32;

        for dy in -search_radius..=search_radius {
            for dx in -search_radius..=search_radius {
                let d2 = patch_distance(src, x, y, x + dx, y + dy, patch_radius);
                let w = (-d2 / h2).exp();
                acc += w * sample_clamped(src, x + dx, y + dy);
                weight_sum += w;
            }
        }

        Luma([(acc / weight_sum).round().clamp(0.0, 255.0) as u8])
    })
}

/// Mean squared difference between the patches centered at (ax, ay) and
/// (bx, by).
fn patch_distance(src: &GrayImage, ax: i64, ay: i64, bx: i64, by: i64, radius: i64) -> f32 {
    let mut sum = 0.0f32;
    for oy in -radius..=radius {
        for ox in -radius..=radius {
            let d = sample_clamped(src, ax + ox, ay + oy) - sample_clamped(src, bx + ox, by + oy);
            sum += d * d;
        }
    }
    let side = (2 * radius + 1) as f32;
    sum / (side * side)
}

fn sample_clamped(src: &GrayImage, x: i64, y: i64) -> f32 {
    let x = x.clamp(0, src.width() as i64 - 1) as u32;
    let y = y.clamp(0, src.height() as i64 - 1) as u32;
    src.get_pixel(x, y)[0] as f32
}
