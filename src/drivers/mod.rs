pub mod ble;
pub mod hx711;
pub mod imu;
