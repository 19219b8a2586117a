// StepScale: MPU6050 IMU driver
//
// Register-level driver over a shared I2C bus. Only the accelerometer is
// used; pitch comes from the gravity vector.

use std::sync::Mutex;

use esp_idf_hal::i2c::I2cDriver;

use stepscale_core::{Acceleration, TiltSensor};

use crate::config::*;

/// Thread-safe handle to a shared I2C bus.
pub type SharedBus = &'static Mutex<I2cDriver<'static>>;

// MPU6050 register addresses
const REG_PWR_MGMT_1: u8 = 0x6B;
const REG_CONFIG: u8 = 0x1A;
const REG_ACCEL_CONFIG: u8 = 0x1C;
const REG_ACCEL_XOUT_H: u8 = 0x3B; // Start of 6-byte accel burst
const REG_WHO_AM_I: u8 = 0x75;
const WHO_AM_I_EXPECTED: u8 = 0x68;

pub struct Mpu6050 {
    bus: SharedBus,
}

impl Mpu6050 {
    pub fn new(bus: SharedBus) -> Self {
        Self { bus }
    }

    fn with_bus<R>(&self, f: impl FnOnce(&mut I2cDriver<'static>) -> anyhow::Result<R>) -> anyhow::Result<R> {
        let mut bus = self
            .bus
            .lock()
            .map_err(|_| anyhow::anyhow!("I2C bus mutex poisoned"))?;
        f(&mut bus)
    }

    /// Verify the device is reachable on the I2C bus.
    pub fn is_connected(&self) -> bool {
        let mut buf = [0u8; 1];
        self.with_bus(|bus| {
            bus.write_read(I2C_ADDR_MPU6050, &[REG_WHO_AM_I], &mut buf, I2C_TIMEOUT_TICKS)?;
            Ok(())
        })
        .map(|()| buf[0] == WHO_AM_I_EXPECTED)
        .unwrap_or(false)
    }

    /// Wake the sensor and configure accel (±8 g), DLPF 21 Hz.
    pub fn init(&self) -> anyhow::Result<()> {
        self.with_bus(|bus| {
            // Wake up (clear SLEEP bit)
            bus.write(I2C_ADDR_MPU6050, &[REG_PWR_MGMT_1, 0x00], I2C_TIMEOUT_TICKS)?;

            // DLPF bandwidth 21 Hz
            bus.write(I2C_ADDR_MPU6050, &[REG_CONFIG, 0x04], I2C_TIMEOUT_TICKS)?;

            // Accelerometer: ±8 g
            bus.write(I2C_ADDR_MPU6050, &[REG_ACCEL_CONFIG, 0x10], I2C_TIMEOUT_TICKS)?;
            Ok(())
        })?;

        log::info!("MPU6050 initialised (±8g, DLPF 21Hz)");
        Ok(())
    }
}

impl TiltSensor for Mpu6050 {
    fn read_acceleration(&mut self) -> anyhow::Result<Acceleration> {
        let mut raw = [0u8; 6];
        self.with_bus(|bus| {
            bus.write_read(I2C_ADDR_MPU6050, &[REG_ACCEL_XOUT_H], &mut raw, I2C_TIMEOUT_TICKS)?;
            Ok(())
        })?;

        Ok(Acceleration {
            ax: i16::from_be_bytes([raw[0], raw[1]]) as f32 / ACCEL_SCALE_8G,
            ay: i16::from_be_bytes([raw[2], raw[3]]) as f32 / ACCEL_SCALE_8G,
            az: i16::from_be_bytes([raw[4], raw[5]]) as f32 / ACCEL_SCALE_8G,
        })
    }
}
