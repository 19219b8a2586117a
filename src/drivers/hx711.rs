// StepScale: HX711 load-cell amplifier driver
//
// Bit-banged over two GPIOs. Channel A at gain 128 (25 clocks per read).
// The shift-out runs with interrupts masked: holding SCK high for more
// than 60 µs powers the chip down mid-read.

use esp_idf_hal::delay::{Ets, FreeRtos};
use esp_idf_hal::gpio::{AnyInputPin, AnyOutputPin, Input, Output, PinDriver};
use esp_idf_hal::interrupt;

use stepscale_core::LoadCell;

use crate::config::*;

const DATA_BITS: u32 = 24;
const GAIN_128_EXTRA_CLOCKS: u32 = 1;

pub struct Hx711<'d> {
    sck: PinDriver<'d, AnyOutputPin, Output>,
    dout: PinDriver<'d, AnyInputPin, Input>,
}

impl<'d> Hx711<'d> {
    pub fn new(
        sck: PinDriver<'d, AnyOutputPin, Output>,
        dout: PinDriver<'d, AnyInputPin, Input>,
    ) -> anyhow::Result<Self> {
        let mut hx = Self { sck, dout };
        hx.power_up()?;
        Ok(hx)
    }

    pub fn power_up(&mut self) -> anyhow::Result<()> {
        self.sck.set_low()?;
        Ets::delay_us(HX711_POWER_UP_US);
        Ok(())
    }

    fn pulse(&mut self) -> anyhow::Result<bool> {
        self.sck.set_high()?;
        Ets::delay_us(HX711_CLK_HALF_PERIOD_US);
        let bit = self.dout.is_high();
        self.sck.set_low()?;
        Ets::delay_us(HX711_CLK_HALF_PERIOD_US);
        Ok(bit)
    }

    fn shift_in(&mut self) -> anyhow::Result<u32> {
        let mut data: u32 = 0;
        for _ in 0..DATA_BITS {
            data = (data << 1) | u32::from(self.pulse()?);
        }
        for _ in 0..GAIN_128_EXTRA_CLOCKS {
            self.pulse()?;
        }
        Ok(data)
    }
}

impl LoadCell for Hx711<'_> {
    /// DOUT goes low when a conversion is ready.
    fn is_ready(&mut self) -> bool {
        self.dout.is_low()
    }

    // Waits without a timeout: a dead amplifier stalls the caller.
    fn read_raw(&mut self) -> anyhow::Result<i32> {
        while !self.is_ready() {
            FreeRtos::delay_ms(HX711_READY_POLL_MS);
        }
        let raw = interrupt::free(|| self.shift_in())?;
        Ok(sign_extend_24(raw))
    }
}

fn sign_extend_24(raw: u32) -> i32 {
    ((raw << 8) as i32) >> 8
}
