//! Scene file handling
//!
//! A scene names one motion to simulate. Scenes are TOML or JSON; the
//! `kind` field selects the motion:
//!
//! ```toml
//! name = "card-press"
//!
//! [motion]
//! kind = "spring"
//! preset = "bouncy"
//! from = { scale = 1.0 }
//! to = { scale = 0.95 }
//! ```

use anyhow::{Context, Result};
use kinesis_animation::{
    KeyframeConfig, KeyframeOptions, PropertyValues, SequenceItem, SequenceOptions,
    SpringConfig, SpringPreset, StaggerConfig, TimelineConfig,
};
use kinesis_core::events::TouchEvent;
use kinesis_gesture::PinchZoomOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::CliError;

/// Top-level scene file
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Scene {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub motion: MotionConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum MotionConfig {
    Spring(SpringScene),
    Keyframes(KeyframeScene),
    Stagger(StaggerScene),
    Timeline(TimelineConfig),
    Sequence(SequenceScene),
    Pinch(PinchScene),
}

impl MotionConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            MotionConfig::Spring(_) => "spring",
            MotionConfig::Keyframes(_) => "keyframes",
            MotionConfig::Stagger(_) => "stagger",
            MotionConfig::Timeline(_) => "timeline",
            MotionConfig::Sequence(_) => "sequence",
            MotionConfig::Pinch(_) => "pinch",
        }
    }
}

/// Spring from `from` to `to`. An explicit `config` wins over `preset`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SpringScene {
    #[serde(default)]
    pub preset: Option<SpringPreset>,
    #[serde(default)]
    pub config: Option<SpringConfig>,
    #[serde(default)]
    pub from: PropertyValues,
    pub to: PropertyValues,
}

impl SpringScene {
    pub fn spring_config(&self) -> SpringConfig {
        self.config
            .or_else(|| self.preset.map(SpringConfig::from))
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct KeyframeScene {
    pub keyframes: KeyframeConfig,
    #[serde(default)]
    pub options: KeyframeOptions,
}

/// `count` elements, each springing its `item-N` property from `from` to `to`
/// when the stagger activates it
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StaggerScene {
    pub count: usize,
    #[serde(default)]
    pub stagger: StaggerConfig,
    #[serde(default)]
    pub spring: Option<SpringPreset>,
    #[serde(default)]
    pub from: f64,
    #[serde(default = "default_stagger_to")]
    pub to: f64,
}

fn default_stagger_to() -> f64 {
    1.0
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SequenceScene {
    pub items: Vec<SequenceItem>,
    #[serde(default)]
    pub options: SequenceOptions,
}

/// Recorded touch events replayed at their timestamps
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PinchScene {
    #[serde(default)]
    pub options: PinchZoomOptions,
    pub events: Vec<TouchEvent>,
}

impl Scene {
    /// Load a scene from a `.toml` or `.json` file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let scene = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml(&content),
            Some("json") => Self::from_json(&content),
            _ => return Err(CliError::UnsupportedFormat(path.to_path_buf()).into()),
        }
        .with_context(|| format!("Failed to parse {}", path.display()))?;

        scene.validate()?;
        Ok(scene)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Invalid TOML scene")
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Invalid JSON scene")
    }

    /// Reject scenes that parse but have nothing to animate
    pub fn validate(&self) -> std::result::Result<(), CliError> {
        let empty = match &self.motion {
            MotionConfig::Spring(spring) => spring.to.is_empty(),
            MotionConfig::Keyframes(keyframes) => keyframes.keyframes.is_empty(),
            MotionConfig::Stagger(stagger) => stagger.count == 0,
            MotionConfig::Timeline(timeline) => {
                if timeline.duration <= 0.0 {
                    return Err(CliError::InvalidValue {
                        what: "timeline duration",
                        value: timeline.duration,
                    });
                }
                false
            }
            MotionConfig::Sequence(sequence) => sequence.items.is_empty(),
            MotionConfig::Pinch(pinch) => pinch.events.is_empty(),
        };

        if empty {
            return Err(CliError::EmptyMotion {
                scene: self.name.clone(),
                kind: self.motion.kind(),
            });
        }
        Ok(())
    }

    /// Human readable summary lines for `kinesis check`
    pub fn summary(&self) -> Vec<String> {
        let mut lines = vec![format!("scene: {}", self.name)];
        if let Some(description) = &self.description {
            lines.push(format!("description: {description}"));
        }
        lines.push(format!("kind: {}", self.motion.kind()));

        match &self.motion {
            MotionConfig::Spring(spring) => {
                let config = spring.spring_config();
                lines.push(format!(
                    "spring: stiffness {} damping {} mass {} (ratio {:.2}, {})",
                    config.stiffness,
                    config.damping,
                    config.mass,
                    config.damping_ratio(),
                    damping_regime(&config)
                ));
                lines.push(format!("properties: {}", join_keys(spring.to.keys())));
            }
            MotionConfig::Keyframes(keyframes) => {
                lines.push(format!("duration: {} ms", keyframes.options.duration_ms));
                for (property, frames) in keyframes.keyframes.iter() {
                    lines.push(format!("  {property}: {} frames", frames.len()));
                }
            }
            MotionConfig::Stagger(stagger) => {
                lines.push(format!(
                    "elements: {} every {} s ({:?})",
                    stagger.count, stagger.stagger.delay, stagger.stagger.direction
                ));
            }
            MotionConfig::Timeline(timeline) => {
                lines.push(format!("duration: {} ms", timeline.duration));
                lines.push(format!("segments: {}", timeline.segments.len()));
                if let Some(repeat) = timeline.repeat {
                    lines.push(format!("repeat: {repeat:?}"));
                }
            }
            MotionConfig::Sequence(sequence) => {
                let total: f64 = sequence
                    .items
                    .iter()
                    .map(|item| item.duration.max(0.0) + item.delay.max(0.0))
                    .sum();
                lines.push(format!("items: {} over {total:.2} s", sequence.items.len()));
                lines.push(format!("repeat: {:?}", sequence.options.repeat));
            }
            MotionConfig::Pinch(pinch) => {
                lines.push(format!("events: {}", pinch.events.len()));
                lines.push(format!(
                    "scale range: {} - {}{}",
                    pinch.options.min_scale,
                    pinch.options.max_scale,
                    if pinch.options.momentum { " with momentum" } else { "" }
                ));
            }
        }
        lines
    }
}

pub fn damping_regime(config: &SpringConfig) -> &'static str {
    if config.is_critically_damped() {
        "critically damped"
    } else if config.is_underdamped() {
        "underdamped"
    } else {
        "overdamped"
    }
}

fn join_keys<'a>(keys: impl Iterator<Item = &'a String>) -> String {
    keys.map(String::as_str).collect::<Vec<_>>().join(", ")
}
