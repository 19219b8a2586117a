// Test doubles for the hardware seams. Handles share state with the copy
// moved into the code under test so assertions can be made afterwards.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::link::Link;
use crate::power::Sleeper;
use crate::reading::Acceleration;
use crate::sensor::{LoadCell, TiltSensor};

/// Observable side effects, in the order they happened.
#[derive(Debug, Clone, PartialEq)]
pub enum Trace {
    Published(Vec<u8>),
    Advertised,
    LightSleep(Duration),
    Delay(Duration),
}

pub type TraceLog = Rc<RefCell<Vec<Trace>>>;

#[derive(Debug, Default)]
struct CellInner {
    raw: i32,
    queued: VecDeque<i32>,
    reads: usize,
    not_ready_checks: u32,
    fail: bool,
}

#[derive(Debug, Clone, Default)]
pub struct FakeCell {
    inner: Rc<RefCell<CellInner>>,
}

impl FakeCell {
    pub fn constant(raw: i32) -> Self {
        let cell = Self::default();
        cell.set_raw(raw);
        cell
    }

    pub fn set_raw(&self, raw: i32) {
        self.inner.borrow_mut().raw = raw;
    }

    /// Values returned ahead of the constant reading.
    pub fn queue(&self, raws: &[i32]) {
        self.inner.borrow_mut().queued.extend(raws.iter().copied());
    }

    /// Report not-ready for the next `checks` readiness polls.
    pub fn ready_after(&self, checks: u32) {
        self.inner.borrow_mut().not_ready_checks = checks;
    }

    pub fn fail_reads(&self, fail: bool) {
        self.inner.borrow_mut().fail = fail;
    }

    pub fn reads(&self) -> usize {
        self.inner.borrow().reads
    }
}

impl LoadCell for FakeCell {
    fn is_ready(&mut self) -> bool {
        let mut inner = self.inner.borrow_mut();
        if inner.not_ready_checks == 0 {
            true
        } else {
            inner.not_ready_checks -= 1;
            false
        }
    }

    fn read_raw(&mut self) -> anyhow::Result<i32> {
        let mut inner = self.inner.borrow_mut();
        if inner.fail {
            anyhow::bail!("load cell timed out");
        }
        inner.reads += 1;
        Ok(inner.queued.pop_front().unwrap_or(inner.raw))
    }
}

#[derive(Debug, Clone)]
pub struct FakeImu {
    accel: Arc<Mutex<Acceleration>>,
}

impl FakeImu {
    pub fn new(accel: Acceleration) -> Self {
        Self {
            accel: Arc::new(Mutex::new(accel)),
        }
    }

    pub fn set(&self, accel: Acceleration) {
        *self.accel.lock().unwrap() = accel;
    }
}

impl TiltSensor for FakeImu {
    fn read_acceleration(&mut self) -> anyhow::Result<Acceleration> {
        Ok(*self.accel.lock().unwrap())
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakeClock {
    log: TraceLog,
}

impl FakeClock {
    pub fn with_log(log: &TraceLog) -> Self {
        Self { log: Rc::clone(log) }
    }

    pub fn delays(&self) -> Vec<Duration> {
        self.log
            .borrow()
            .iter()
            .filter_map(|t| match t {
                Trace::Delay(d) => Some(*d),
                _ => None,
            })
            .collect()
    }

    pub fn light_sleeps(&self) -> Vec<Duration> {
        self.log
            .borrow()
            .iter()
            .filter_map(|t| match t {
                Trace::LightSleep(d) => Some(*d),
                _ => None,
            })
            .collect()
    }
}

impl Sleeper for FakeClock {
    fn delay(&mut self, duration: Duration) {
        self.log.borrow_mut().push(Trace::Delay(duration));
    }

    fn light_sleep(&mut self, duration: Duration) {
        self.log.borrow_mut().push(Trace::LightSleep(duration));
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakeLink {
    log: TraceLog,
    fail_publish: Rc<RefCell<bool>>,
}

impl FakeLink {
    pub fn with_log(log: &TraceLog) -> Self {
        Self {
            log: Rc::clone(log),
            fail_publish: Rc::default(),
        }
    }

    pub fn fail_publish(&self, fail: bool) {
        *self.fail_publish.borrow_mut() = fail;
    }

    pub fn published(&self) -> Vec<Vec<u8>> {
        self.log
            .borrow()
            .iter()
            .filter_map(|t| match t {
                Trace::Published(p) => Some(p.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn advertise_count(&self) -> usize {
        self.log
            .borrow()
            .iter()
            .filter(|t| matches!(t, Trace::Advertised))
            .count()
    }
}

impl Link for FakeLink {
    fn publish(&mut self, payload: &[u8]) -> anyhow::Result<()> {
        if *self.fail_publish.borrow() {
            anyhow::bail!("notify rejected");
        }
        self.log.borrow_mut().push(Trace::Published(payload.to_vec()));
        Ok(())
    }

    fn start_advertising(&mut self) -> anyhow::Result<()> {
        self.log.borrow_mut().push(Trace::Advertised);
        Ok(())
    }
}
