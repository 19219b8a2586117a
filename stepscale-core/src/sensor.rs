// StepScale core: sensor seams, scale arithmetic and the boot handshake.

use std::time::Duration;

use crate::config::SystemConfig;
use crate::power::Sleeper;
use crate::reading::{pitch_degrees, Acceleration};

/// Raw load-cell amplifier (HX711 class).
pub trait LoadCell {
    /// True when a conversion is ready to be clocked out.
    fn is_ready(&mut self) -> bool;

    /// Block until the next conversion and return the signed raw count.
    fn read_raw(&mut self) -> anyhow::Result<i32>;
}

/// Accelerometer used for tilt.
pub trait TiltSensor {
    fn read_acceleration(&mut self) -> anyhow::Result<Acceleration>;

    /// Pitch in degrees.
    fn read_tilt(&mut self) -> anyhow::Result<f32> {
        self.read_acceleration().map(pitch_degrees)
    }
}

/// Converts raw counts to grams: `(mean(raw) - offset) / calibration_factor`.
pub struct Scale<C> {
    cell: C,
    offset: f64,
    calibration_factor: f32,
}

impl<C: LoadCell> Scale<C> {
    pub fn new(cell: C, calibration_factor: f32) -> Self {
        Self {
            cell,
            offset: 0.0,
            calibration_factor,
        }
    }

    #[cfg(test)]
    pub(crate) fn cell_mut(&mut self) -> &mut C {
        &mut self.cell
    }

    #[cfg(test)]
    pub(crate) fn offset(&self) -> f64 {
        self.offset
    }

    fn read_average(&mut self, samples: usize) -> anyhow::Result<f64> {
        let samples = samples.max(1);
        let mut sum: i64 = 0;
        for _ in 0..samples {
            sum += i64::from(self.cell.read_raw()?);
        }
        Ok(sum as f64 / samples as f64)
    }

    /// Record the current load as zero.
    pub fn tare(&mut self, samples: usize) -> anyhow::Result<()> {
        self.offset = self.read_average(samples)?;
        log::info!("Tare offset = {:.1}", self.offset);
        Ok(())
    }

    /// Mean of `samples` conversions in grams.
    pub fn read_weight(&mut self, samples: usize) -> anyhow::Result<f32> {
        let tared = self.read_average(samples)? - self.offset;
        Ok((tared / f64::from(self.calibration_factor)) as f32)
    }
}

/// How long boot waits for the load cell to report ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakePolicy {
    Forever { interval: Duration },
    Bounded { attempts: u32, interval: Duration },
}

/// Poll `cell` until ready. Returns `false` only when a bounded policy ran
/// out; the caller is expected to carry on regardless.
pub fn await_ready<C, S>(cell: &mut C, policy: HandshakePolicy, sleeper: &mut S) -> bool
where
    C: LoadCell + ?Sized,
    S: Sleeper + ?Sized,
{
    let (limit, interval) = match policy {
        HandshakePolicy::Forever { interval } => (None, interval),
        HandshakePolicy::Bounded { attempts, interval } => (Some(attempts), interval),
    };

    let mut failures: u32 = 0;
    loop {
        if cell.is_ready() {
            return true;
        }
        if let Some(limit) = limit {
            if failures >= limit {
                log::warn!("Load cell not ready after {} attempts, continuing anyway", failures);
                return false;
            }
        }
        log::warn!("Load cell not ready, check wiring");
        sleeper.delay(interval);
        failures += 1;
    }
}

/// Boot-time sensor bring-up: handshake, then tare with the configured
/// calibration. Runs again from scratch after every deep-sleep wake.
pub fn prepare_scale<C, S>(mut cell: C, config: &SystemConfig, sleeper: &mut S) -> anyhow::Result<Scale<C>>
where
    C: LoadCell,
    S: Sleeper + ?Sized,
{
    log::info!("Starting HX711 load cell");
    if await_ready(&mut cell, config.handshake, sleeper) {
        log::info!("Load cell ready");
    }

    let mut scale = Scale::new(cell, config.calibration_factor);
    scale.tare(config.tare_samples)?;
    log::info!("Scale initialised ({:.1} counts/g)", config.calibration_factor);
    Ok(scale)
}
