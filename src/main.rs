// StepScale: firmware entry point
//
// Boot sequence:
//   1. Log the wake-up cause (cold boot or end of a deep-sleep cycle).
//   2. Bring up the HX711 pins and, in the fused build, the MPU6050.
//   3. Spawn the sampling task: handshake, tare, BLE server, sampling loop.
//
// Deep sleep resets the chip, so every wake re-runs this whole sequence
// with fresh state; nothing from the previous session survives.

mod config;
mod drivers;
mod tasks;

use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use esp_idf_hal::gpio::{InputPin, OutputPin, PinDriver};
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::prelude::*;

use crate::config::*;
use crate::drivers::hx711::Hx711;
use crate::drivers::imu::Mpu6050;

fn main() -> anyhow::Result<()> {
    // Link esp-idf-sys runtime patches and initialise logging.
    esp_idf_svc::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();
    log::info!("StepScale firmware starting ({:?} build)", VARIANT);
    tasks::power::log_wake_cause();

    let system = system_config();

    // ---- Peripherals ------------------------------------------------------
    let peripherals = Peripherals::take()?;

    // ---- HX711 -------------------------------------------------------------
    let sck = PinDriver::output(peripherals.pins.gpio21.downgrade_output())?;
    let dout = PinDriver::input(peripherals.pins.gpio20.downgrade_input())?;
    let hx711 = Hx711::new(sck, dout)?;
    log::info!("HX711 on DOUT=GPIO{} SCK=GPIO{}", PIN_HX711_DOUT, PIN_HX711_SCK);

    // ---- MPU6050 (fused build only) -----------------------------------------
    let imu = if system.tilt_enabled {
        let i2c_config = I2cConfig::new().baudrate(I2C_BAUDRATE_KHZ.kHz().into());
        let i2c = I2cDriver::new(
            peripherals.i2c0,
            peripherals.pins.gpio8, // SDA
            peripherals.pins.gpio9, // SCL
            &i2c_config,
        )?;
        let i2c_bus: &'static Mutex<I2cDriver<'static>> = Box::leak(Box::new(Mutex::new(i2c)));

        let imu = Mpu6050::new(i2c_bus);
        if imu.is_connected() {
            imu.init()?;
            Some(imu)
        } else {
            log::error!("MPU6050 not found on I2C (SDA=GPIO{} SCL=GPIO{})", PIN_I2C_SDA, PIN_I2C_SCL);
            // Continue anyway so weight still reaches the companion app.
            None
        }
    } else {
        None
    };

    // ---- Spawn sampling task (FreeRTOS task via std::thread) ----------------
    thread::Builder::new()
        .name("sampler".into())
        .stack_size(STACK_SAMPLER)
        .spawn(move || {
            if let Err(e) = tasks::sampling::sampling_task(system, hx711, imu) {
                log::error!("Sampling task failed: {:#}", e);
            }
        })?;

    // Main thread has nothing left to do, park it forever.
    loop {
        thread::sleep(Duration::from_secs(60));
    }
}
