use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Parameters for one non-local-means denoise pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DenoisePass {
    /// Filter strength `h` — larger values remove more noise but wash out
    /// thin glyph strokes.
    pub strength: f32,
    /// Side length of the patch compared around each pixel.
    pub template_window: u32,
    /// Side length of the window searched for similar patches.
    pub search_window: u32,
}

/// Parameters for the cleaning pipeline. Stage order is fixed; only the
/// per-stage constants are configurable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanConfig {
    /// Luminance cutoff for the inverted binary threshold: pixels at or
    /// below the cutoff become foreground (255), the rest background (0).
    pub threshold_cutoff: u8,
    /// Radius of the square structuring element used for morphological
    /// closing; radius 1 is a 3×3 element.
    pub closing_radius: u8,
    /// Denoise passes, applied in sequence between grayscale conversion and
    /// thresholding.
    pub denoise: Vec<DenoisePass>,
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self {
            threshold_cutoff: 128,
            closing_radius: 1,
            denoise: vec![
                // Pass 1: fine pixel-level noise, preserve thin strokes.
                DenoisePass { strength: 10.0, template_window: 4, search_window: 21 },
                // Pass 2: larger blotches from background texture.
                DenoisePass { strength: 31.0, template_window: 12, search_window: 21 },
                // Pass 3: final smoothing before thresholding.
                DenoisePass { strength: 10.0, template_window: 6, search_window: 21 },
            ],
        }
    }
}

/// What the worker does when an item fails with a non-recoverable error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop the worker permanently on the first failing item.
    #[default]
    Halt,
    /// Log the failing item and continue with the rest of the batch.
    Isolate,
}

/// Top-level configuration for the drain pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory polled for candidate images.
    pub input_dir: PathBuf,
    /// Directory receiving relocated results; created on demand.
    pub output_dir: PathBuf,
    /// Pause between polls of the input directory.
    pub poll_interval_secs: u64,
    pub failure_policy: FailurePolicy,
    pub clean: CleanConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("Inp_images"),
            output_dir: PathBuf::from("Captcha"),
            poll_interval_secs: 2,
            failure_policy: FailurePolicy::Halt,
            clean: CleanConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_original_constants() {
        let cfg = PipelineConfig::default();
        assert_eq!(cfg.input_dir, PathBuf::from("Inp_images"));
        assert_eq!(cfg.output_dir, PathBuf::from("Captcha"));
        assert_eq!(cfg.poll_interval(), Duration::from_secs(2));
        assert_eq!(cfg.failure_policy, FailurePolicy::Halt);
        assert_eq!(cfg.clean.denoise.len(), 3);
        assert_eq!(cfg.clean.threshold_cutoff, 128);
        assert_eq!(cfg.clean.closing_radius, 1);
    }

    #[test]
    fn toml_roundtrip() {
        let cfg = PipelineConfig {
            poll_interval_secs: 5,
            failure_policy: FailurePolicy::Isolate,
            ..PipelineConfig::default()
        };
        let text = toml::to_string(&cfg).unwrap();
        let back: PipelineConfig = toml::from_str(&text).unwrap();
        assert_eq!(back, cfg);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let cfg: PipelineConfig = toml::from_str("input_dir = \"queue\"").unwrap();
        assert_eq!(cfg.input_dir, PathBuf::from("queue"));
        assert_eq!(cfg.output_dir, PathBuf::from("Captcha"));
        assert_eq!(cfg.failure_policy, FailurePolicy::Halt);
    }
}
