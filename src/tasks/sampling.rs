// StepScale: sampling task
//
// Owns the sensors and the BLE link for one session. A session lasts until
// the sampler asks for deep sleep; the chip then powers down and the next
// session starts from `main` after the wake-up reset.

use stepscale_core::sensor::prepare_scale;
use stepscale_core::{events, BoxedTilt, Reading, Sampler, SystemConfig};

use crate::drivers::ble::BleScale;
use crate::drivers::hx711::Hx711;
use crate::drivers::imu::Mpu6050;
use crate::tasks::power::{self, EspSleeper};

pub fn sampling_task(config: SystemConfig, hx711: Hx711<'static>, imu: Option<Mpu6050>) -> anyhow::Result<()> {
    log::info!("Sampling task started ({:?} mode, {:?} poll)", config.sampling_mode, config.poll_interval);

    // A fused build whose IMU failed to probe publishes weight-only records.
    let config = config.with_tilt_available(imu.is_some());

    let mut sleeper = EspSleeper;
    let scale = prepare_scale(hx711, &config, &mut sleeper)?;

    let (events, inbox) = events::channel();
    let link = BleScale::start(events, &Reading::zero(config.tilt_enabled).encode())?;

    let tilt = imu.map(|imu| Box::new(imu) as BoxedTilt);
    let sampler = Sampler::new(config, scale, tilt, link, sleeper, inbox);

    let duration = sampler.run_until_deep_sleep();
    power::enter_deep_sleep(duration)
}
