// StepScale core: the connection-gated sampling loop.
//
// One tick:
//   1. Drain link events and command writes.
//   2. Gate: connected, plus a latched command in `Gated` mode.
//   3. Sample weight (and tilt), classify posture.
//   4. Publish the encoded reading.
//   5. Clear the latch, then apply the sleep rule.
//
// Publishing always precedes the sleep decision. A deep sleep ends the
// session; the caller powers down and the next boot starts from scratch.

use std::time::Duration;

use crate::config::{SamplingMode, SystemConfig};
use crate::events::EventInbox;
use crate::link::{CommandLatch, ConnectionState, Link, LinkAction};
use crate::posture::evaluate_posture;
use crate::power::{SleepKind, SleepRequest, Sleeper};
use crate::reading::Reading;
use crate::sensor::{LoadCell, Scale, TiltSensor};

/// Everything the callbacks used to mutate behind the loop's back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AppState {
    pub connection: ConnectionState,
    pub latch: CommandLatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Sampling,
    Publishing,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Gate closed; nothing sampled.
    Idle,
    /// A sensor read failed; the latch is kept for the next tick.
    SampleFailed,
    Published {
        reading: Reading,
        delivered: bool,
        light_slept: bool,
    },
    /// Reading published, then the session must end in deep sleep.
    DeepSleep { reading: Reading, duration: Duration },
}

pub type BoxedTilt = Box<dyn TiltSensor + Send>;

pub struct Sampler<C, L, S> {
    config: SystemConfig,
    scale: Scale<C>,
    tilt: Option<BoxedTilt>,
    link: L,
    sleeper: S,
    inbox: EventInbox,
    state: AppState,
    phase: Phase,
}

impl<C, L, S> Sampler<C, L, S>
where
    C: LoadCell,
    L: Link,
    S: Sleeper,
{
    pub fn new(
        config: SystemConfig,
        scale: Scale<C>,
        tilt: Option<BoxedTilt>,
        link: L,
        sleeper: S,
        inbox: EventInbox,
    ) -> Self {
        let effective = config.with_tilt_available(tilt.is_some());
        if effective.tilt_enabled != config.tilt_enabled {
            log::warn!("Tilt enabled but no IMU attached, publishing weight only");
        }
        Self {
            config: effective,
            scale,
            tilt,
            link,
            sleeper,
            inbox,
            state: AppState::default(),
            phase: Phase::Idle,
        }
    }

    pub fn state(&self) -> AppState {
        self.state
    }

    /// Furthest phase the last tick reached.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[cfg(test)]
    pub(crate) fn link(&self) -> &L {
        &self.link
    }

    #[cfg(test)]
    pub(crate) fn sleeper(&self) -> &S {
        &self.sleeper
    }

    pub fn tick(&mut self) -> TickOutcome {
        self.phase = Phase::Idle;
        self.apply_pending_events();

        if !self.gate_open() {
            if !self.state.connection.is_connected() {
                log::debug!("Waiting for BLE client");
            }
            return TickOutcome::Idle;
        }

        self.phase = Phase::Sampling;
        let reading = match self.sample() {
            Ok(reading) => reading,
            Err(e) => {
                log::warn!("Sample failed: {:#}", e);
                return TickOutcome::SampleFailed;
            }
        };
        log::info!("Weight: {}", reading);

        self.phase = Phase::Publishing;
        let delivered = match self.link.publish(&reading.encode()) {
            Ok(()) => {
                log::info!("Reading sent");
                true
            }
            Err(e) => {
                log::warn!("Notify failed: {:#}", e);
                false
            }
        };
        self.state.latch = self.state.latch.clear();

        match self.config.sleep.decide(reading.weight) {
            Some(SleepRequest { kind: SleepKind::Deep, duration }) => {
                log::info!("No load, entering deep sleep for {:?}", duration);
                TickOutcome::DeepSleep { reading, duration }
            }
            Some(SleepRequest { kind: SleepKind::Light, duration }) => {
                log::info!("No load, light sleep for {:?}", duration);
                self.sleeper.light_sleep(duration);
                TickOutcome::Published { reading, delivered, light_slept: true }
            }
            None => TickOutcome::Published { reading, delivered, light_slept: false },
        }
    }

    /// Tick forever, pausing `poll_interval` between ticks, until a deep
    /// sleep is requested. Returns its duration; the session state is
    /// dropped with `self`.
    pub fn run_until_deep_sleep(mut self) -> Duration {
        loop {
            if let TickOutcome::DeepSleep { duration, .. } = self.tick() {
                return duration;
            }
            self.sleeper.delay(self.config.poll_interval);
        }
    }

    fn gate_open(&self) -> bool {
        self.state.connection.is_connected()
            && match self.config.sampling_mode {
                SamplingMode::Continuous => true,
                SamplingMode::Gated => self.state.latch.is_set(),
            }
    }

    fn apply_pending_events(&mut self) {
        for event in self.inbox.drain_link() {
            let (next, action) = self.state.connection.on_event(event);
            if next != self.state.connection {
                log::info!("BLE client {:?}", next);
            }
            self.state.connection = next;

            if let Some(LinkAction::Advertise) = action {
                if let Err(e) = self.link.start_advertising() {
                    log::warn!("Failed to restart advertising: {:#}", e);
                }
            }
        }

        for payload in self.inbox.drain_writes() {
            let next = self.state.latch.on_write(&payload);
            if next != self.state.latch {
                log::info!("Measure command received");
            } else {
                log::debug!("Write of {} bytes left latch unchanged", payload.len());
            }
            self.state.latch = next;
        }
    }

    fn sample(&mut self) -> anyhow::Result<Reading> {
        let weight = self.scale.read_weight(self.config.weight_samples)?;

        match self.tilt.as_mut() {
            Some(imu) if self.config.tilt_enabled => {
                let pitch = imu.read_tilt()?;
                Ok(Reading::fused(weight, pitch, evaluate_posture(weight, pitch)))
            }
            _ => Ok(Reading::weight_only(weight)),
        }
    }
}
