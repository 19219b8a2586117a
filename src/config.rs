// StepScale: hardware & system configuration
// Target: ESP32-S3 (Xtensa)

use stepscale_core::{SamplingMode, SystemConfig, Variant};

// ---------------------------------------------------------------------------
// GPIO Pin Definitions
// ---------------------------------------------------------------------------
pub const PIN_HX711_DOUT: i32 = 20; // HX711 data out
pub const PIN_HX711_SCK: i32 = 21;  // HX711 serial clock / power-down
pub const PIN_I2C_SDA: i32 = 8;     // MPU6050 (fused build only)
pub const PIN_I2C_SCL: i32 = 9;

// ---------------------------------------------------------------------------
// I2C Bus
// ---------------------------------------------------------------------------
pub const I2C_ADDR_MPU6050: u8 = 0x68;
pub const I2C_TIMEOUT_TICKS: u32 = 1000; // FreeRTOS ticks
pub const I2C_BAUDRATE_KHZ: u32 = 400;

// ---------------------------------------------------------------------------
// BLE
// ---------------------------------------------------------------------------
pub const BLE_DEVICE_NAME: &str = "ESP32-S3 BLE Scale";

// ---------------------------------------------------------------------------
// Task Stack Sizes (bytes)
// ---------------------------------------------------------------------------
pub const STACK_SAMPLER: usize = 8192;

// ---------------------------------------------------------------------------
// HX711 timing (microseconds)
// ---------------------------------------------------------------------------
pub const HX711_CLK_HALF_PERIOD_US: u32 = 1;
pub const HX711_POWER_UP_US: u32 = 60;
pub const HX711_READY_POLL_MS: u32 = 1;

// ---------------------------------------------------------------------------
// MPU6050 Sensor Scale Factors
// ---------------------------------------------------------------------------
pub const ACCEL_SCALE_8G: f32 = 4096.0; // LSB/g at ±8 g

// ---------------------------------------------------------------------------
// Variant selection (cargo features)
// ---------------------------------------------------------------------------
#[cfg(feature = "fused")]
pub const VARIANT: Variant = Variant::Fused;
#[cfg(all(feature = "notify-only", not(feature = "fused")))]
pub const VARIANT: Variant = Variant::NotifyOnly;
#[cfg(not(any(feature = "fused", feature = "notify-only")))]
pub const VARIANT: Variant = Variant::Latched;

pub fn system_config() -> SystemConfig {
    let config = SystemConfig::preset(VARIANT);
    if cfg!(feature = "gated") {
        config.with_sampling_mode(SamplingMode::Gated)
    } else {
        config
    }
}
