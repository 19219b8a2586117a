// StepScale core: sensor reading model and the notification wire format.
//
// Record layout (little-endian):
//   [0..4]  weight, grams, f32
//   [4..8]  pitch, degrees, f32      (tilt-enabled builds only)
//   [8]     posture, 1 = good, 0 = bad (tilt-enabled builds only)

use core::fmt;

pub const WEIGHT_RECORD_LEN: usize = 4;
pub const FUSED_RECORD_LEN: usize = 9;

/// Raw accelerometer vector. Any consistent unit works for pitch.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Acceleration {
    pub ax: f32,
    pub ay: f32,
    pub az: f32,
}

/// Forward/backward tilt in degrees from the gravity vector.
pub fn pitch_degrees(accel: Acceleration) -> f32 {
    let Acceleration { ax, ay, az } = accel;
    ax.atan2((ay * ay + az * az).sqrt()).to_degrees()
}

/// Tilt part of a fused reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tilt {
    pub pitch: f32,
    pub good_posture: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    /// Signed grams after tare and calibration.
    pub weight: f32,
    pub tilt: Option<Tilt>,
}

impl Reading {
    pub fn weight_only(weight: f32) -> Self {
        Self { weight, tilt: None }
    }

    pub fn fused(weight: f32, pitch: f32, good_posture: bool) -> Self {
        Self {
            weight,
            tilt: Some(Tilt { pitch, good_posture }),
        }
    }

    /// Placeholder value published before the first sample.
    pub fn zero(tilt_enabled: bool) -> Self {
        if tilt_enabled {
            Self::fused(0.0, 0.0, false)
        } else {
            Self::weight_only(0.0)
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(FUSED_RECORD_LEN);
        buf.extend_from_slice(&self.weight.to_le_bytes());
        if let Some(tilt) = self.tilt {
            buf.extend_from_slice(&tilt.pitch.to_le_bytes());
            buf.push(u8::from(tilt.good_posture));
        }
        buf
    }

    pub fn decode(bytes: &[u8]) -> anyhow::Result<Self> {
        let f32_at = |at: usize| f32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]]);

        match bytes.len() {
            WEIGHT_RECORD_LEN => Ok(Self::weight_only(f32_at(0))),
            FUSED_RECORD_LEN => match bytes[8] {
                0 | 1 => Ok(Self::fused(f32_at(0), f32_at(4), bytes[8] == 1)),
                other => anyhow::bail!("invalid posture byte {other:#04x}"),
            },
            len => anyhow::bail!("reading record must be 4 or 9 bytes, got {len}"),
        }
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} g", self.weight)?;
        if let Some(tilt) = self.tilt {
            let posture = if tilt.good_posture { "good" } else { "bad" };
            write!(f, ", pitch {:.2}°, posture {}", tilt.pitch, posture)?;
        }
        Ok(())
    }
}
