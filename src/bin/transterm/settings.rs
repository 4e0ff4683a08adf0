//! Settings item metadata so the controls panel renders and dispatches from one schema.

/// Whisper model choices offered by the backend, coarsest first.
pub(crate) const MODEL_CHOICES: &[(&str, &str)] = &[
    ("small", "Small (CPU)"),
    ("medium", "Medium (GPU recommended)"),
    ("large", "Large (GPU strongly recommended)"),
];

pub(crate) const SAMPLE_RATE_MIN: u32 = 8_000;
pub(crate) const SAMPLE_RATE_MAX: u32 = 48_000;
pub(crate) const SAMPLE_RATE_STEP: u32 = 100;

pub(crate) const CHUNK_DURATION_MIN: f64 = 0.1;
pub(crate) const CHUNK_DURATION_MAX: f64 = 5.0;
pub(crate) const CHUNK_DURATION_STEP: f64 = 0.1;

pub(crate) const VOLUME_THRESHOLD_MIN: f64 = 0.01;
pub(crate) const VOLUME_THRESHOLD_MAX: f64 = 0.5;
pub(crate) const VOLUME_THRESHOLD_STEP: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SettingsItem {
    Model,
    UseGpu,
    Microphone,
    SampleRate,
    ChunkDuration,
    VolumeThreshold,
}

pub(crate) const SETTINGS_ITEMS: &[SettingsItem] = &[
    SettingsItem::Model,
    SettingsItem::UseGpu,
    SettingsItem::Microphone,
    SettingsItem::SampleRate,
    SettingsItem::ChunkDuration,
    SettingsItem::VolumeThreshold,
];

impl SettingsItem {
    pub(crate) fn label(self) -> &'static str {
        match self {
            Self::Model => "Whisper model",
            Self::UseGpu => "GPU acceleration",
            Self::Microphone => "Microphone",
            Self::SampleRate => "Sample rate",
            Self::ChunkDuration => "Chunk duration",
            Self::VolumeThreshold => "Volume threshold",
        }
    }
}

pub(crate) fn model_label(key: &str) -> &str {
    MODEL_CHOICES
        .iter()
        .find(|(k, _)| *k == key)
        .map_or(key, |(_, label)| label)
}

/// Next model key in the given direction, wrapping at both ends.
pub(crate) fn cycle_model(current: &str, forward: bool) -> &'static str {
    let idx = MODEL_CHOICES
        .iter()
        .position(|(key, _)| *key == current)
        .unwrap_or(0);
    let len = MODEL_CHOICES.len();
    let next = if forward {
        (idx + 1) % len
    } else {
        (idx + len - 1) % len
    };
    MODEL_CHOICES[next].0
}

pub(crate) fn step_sample_rate(current: u32, forward: bool) -> u32 {
    if forward {
        current
            .saturating_add(SAMPLE_RATE_STEP)
            .min(SAMPLE_RATE_MAX)
    } else {
        current
            .saturating_sub(SAMPLE_RATE_STEP)
            .max(SAMPLE_RATE_MIN)
    }
}

pub(crate) fn step_chunk_duration(current: f64, forward: bool) -> f64 {
    let next = if forward {
        current + CHUNK_DURATION_STEP
    } else {
        current - CHUNK_DURATION_STEP
    };
    // One-decimal quantization keeps repeated float steps from drifting.
    (next.clamp(CHUNK_DURATION_MIN, CHUNK_DURATION_MAX) * 10.0).round() / 10.0
}

pub(crate) fn step_volume_threshold(current: f64, forward: bool) -> f64 {
    let next = if forward {
        current + VOLUME_THRESHOLD_STEP
    } else {
        current - VOLUME_THRESHOLD_STEP
    };
    (next.clamp(VOLUME_THRESHOLD_MIN, VOLUME_THRESHOLD_MAX) * 100.0).round() / 100.0
}
