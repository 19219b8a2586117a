// StepScale: power management
//
// Timer-bounded light and deep sleep on top of the raw ESP-IDF sleep API.
// Light sleep keeps RAM and returns; deep sleep restarts the chip through
// the bootloader, so `main` runs again from the top on wake.

use std::thread;
use std::time::Duration;

use stepscale_core::Sleeper;

pub struct EspSleeper;

impl Sleeper for EspSleeper {
    fn delay(&mut self, duration: Duration) {
        thread::sleep(duration);
    }

    fn light_sleep(&mut self, duration: Duration) {
        let result = unsafe {
            esp_idf_sys::esp!(esp_idf_sys::esp_sleep_enable_timer_wakeup(duration.as_micros() as u64))
                .and_then(|()| esp_idf_sys::esp!(esp_idf_sys::esp_light_sleep_start()))
        };
        if let Err(e) = result {
            // Sleep was rejected; fall back to an ordinary pause of the same length.
            log::warn!("Light sleep failed ({}), delaying instead", e);
            thread::sleep(duration);
        }
    }
}

/// Arm the wake-up timer and power down. This function does not return.
pub fn enter_deep_sleep(duration: Duration) -> ! {
    unsafe {
        esp_idf_sys::esp_sleep_enable_timer_wakeup(duration.as_micros() as u64);
        esp_idf_sys::esp_deep_sleep_start();
    }
}

/// Log why we booted; a timer wake means a deep-sleep cycle just ended.
pub fn log_wake_cause() {
    let cause = unsafe { esp_idf_sys::esp_sleep_get_wakeup_cause() };
    if cause == esp_idf_sys::esp_sleep_source_t_ESP_SLEEP_WAKEUP_TIMER {
        log::info!("Woke from deep sleep (timer), starting a fresh session");
    } else {
        log::info!("Cold boot (wake cause {})", cause);
    }
}
