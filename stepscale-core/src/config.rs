// StepScale core: system configuration and per-variant presets.

use std::time::Duration;

use crate::power::{SleepKind, SleepPolicy};
use crate::sensor::HandshakePolicy;

// ---------------------------------------------------------------------------
// Shared thresholds
// ---------------------------------------------------------------------------

/// Below this absolute weight (grams) the insole is considered unloaded.
pub const NO_LOAD_THRESHOLD_G: f32 = 5.0;

/// Pitch must stay strictly inside ±this many degrees for good posture.
pub const POSTURE_PITCH_LIMIT_DEG: f32 = 10.0;

/// The only command the write characteristic acts on.
pub const MEASURE_COMMAND: &[u8] = b"measure";

// ---------------------------------------------------------------------------
// Defaults recovered from the field firmware
// ---------------------------------------------------------------------------

pub const DEFAULT_CALIBRATION_FACTOR: f32 = 420.0; // raw counts per gram
pub const DEFAULT_WEIGHT_SAMPLES: usize = 10;
pub const DEFAULT_TARE_SAMPLES: usize = 10;
pub const HANDSHAKE_RETRY_INTERVAL: Duration = Duration::from_secs(1);
pub const HANDSHAKE_MAX_ATTEMPTS: u32 = 10;
pub const DEEP_SLEEP_DURATION: Duration = Duration::from_secs(30);
pub const LIGHT_SLEEP_DURATION: Duration = Duration::from_millis(300);
pub const FAST_POLL_INTERVAL: Duration = Duration::from_millis(100);
pub const SLOW_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Whether a sample needs an inbound `measure` command first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplingMode {
    /// Sample only while connected AND a command is latched.
    Gated,
    /// Sample on every tick while connected.
    Continuous,
}

/// The firmware builds that used to live in separate source trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// Two-terminal scale that notifies every second while connected.
    NotifyOnly,
    /// Left-foot scale, measures on command, deep-sleeps when unloaded.
    Latched,
    /// Left-foot scale with IMU tilt and posture evaluation.
    Fused,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SystemConfig {
    pub sampling_mode: SamplingMode,
    pub poll_interval: Duration,
    pub weight_samples: usize,
    pub tare_samples: usize,
    pub calibration_factor: f32,
    pub tilt_enabled: bool,
    pub sleep: SleepPolicy,
    pub handshake: HandshakePolicy,
}

impl SystemConfig {
    pub fn preset(variant: Variant) -> Self {
        let base = Self {
            sampling_mode: SamplingMode::Continuous,
            poll_interval: FAST_POLL_INTERVAL,
            weight_samples: DEFAULT_WEIGHT_SAMPLES,
            tare_samples: DEFAULT_TARE_SAMPLES,
            calibration_factor: DEFAULT_CALIBRATION_FACTOR,
            tilt_enabled: false,
            sleep: SleepPolicy::Never,
            handshake: HandshakePolicy::Bounded {
                attempts: HANDSHAKE_MAX_ATTEMPTS,
                interval: HANDSHAKE_RETRY_INTERVAL,
            },
        };

        match variant {
            Variant::NotifyOnly => Self {
                poll_interval: SLOW_POLL_INTERVAL,
                handshake: HandshakePolicy::Forever {
                    interval: HANDSHAKE_RETRY_INTERVAL,
                },
                ..base
            },
            Variant::Latched => Self {
                sampling_mode: SamplingMode::Gated,
                sleep: SleepPolicy::BelowThreshold {
                    threshold_g: NO_LOAD_THRESHOLD_G,
                    kind: SleepKind::Deep,
                    duration: DEEP_SLEEP_DURATION,
                },
                ..base
            },
            Variant::Fused => Self {
                tilt_enabled: true,
                sleep: SleepPolicy::BelowThreshold {
                    threshold_g: NO_LOAD_THRESHOLD_G,
                    kind: SleepKind::Light,
                    duration: LIGHT_SLEEP_DURATION,
                },
                ..base
            },
        }
    }

    pub fn with_sampling_mode(mut self, mode: SamplingMode) -> Self {
        self.sampling_mode = mode;
        self
    }

    /// Fall back to weight-only records when no IMU is attached, so every
    /// payload of a session (the seeded value included) has one shape.
    pub fn with_tilt_available(mut self, available: bool) -> Self {
        self.tilt_enabled &= available;
        self
    }
}
