//! Kinesis Animation System
//!
//! Spring physics, keyframe interpolation, and stagger/timeline orchestration.
//!
//! # Features
//!
//! - **Spring Physics**: Semi-implicit Euler springs with stiffness, damping, mass
//! - **Keyframe Animations**: Property arrays sampled over a duration with easing
//! - **Stagger**: Per-element activation delays over a shared clock
//! - **Timelines and Sequences**: Segment activation, repeats and ordered playback
//!
//! Every controller is a pure step function advanced once per frame, either
//! directly by the caller or through an [`AnimationScheduler`].

use indexmap::IndexMap;

pub mod easing;
pub mod keyframe;
pub mod scheduler;
pub mod sequence;
pub mod spring;
pub mod stagger;
pub mod timeline;

pub use easing::Easing;
pub use keyframe::{
    KeyframeAnimation, KeyframeConfig, KeyframeEasing, KeyframeOptions, KeyframeSegment,
    KeyframeTimeline, KeyframeValue, KeyframeValues,
};
pub use scheduler::{AnimationId, AnimationScheduler};
pub use sequence::{RepeatType, SequenceController, SequenceItem, SequenceOptions, SequenceRepeat};
pub use spring::{
    spring_progress, MultiSpring, Spring, SpringAnimation, SpringConfig, SpringPreset, SpringUpdate,
};
pub use stagger::{
    stagger_delay, stagger_index, StaggerConfig, StaggerDirection, StaggerScheduler, StaggerState,
};
pub use timeline::{Repeat, TimelineConfig, TimelineScheduler, TimelineSegment, TimelineState};

/// Flat `{property: number}` record handed to presentation sinks
pub type PropertyValues = IndexMap<String, f64>;
