// StepScale core: low-power rule and the timing seam.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SleepKind {
    /// Timer-bounded suspend; RAM and the session survive.
    Light,
    /// Timer-bounded power-down; the chip reboots on wake and every bit of
    /// volatile state is gone.
    Deep,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SleepPolicy {
    Never,
    BelowThreshold {
        threshold_g: f32,
        kind: SleepKind,
        duration: Duration,
    },
}

/// A sleep the loop has decided to take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SleepRequest {
    pub kind: SleepKind,
    pub duration: Duration,
}

impl SleepPolicy {
    /// Evaluated after each weight sample, independently of previous ticks.
    pub fn decide(&self, weight: f32) -> Option<SleepRequest> {
        match *self {
            SleepPolicy::Never => None,
            SleepPolicy::BelowThreshold { threshold_g, kind, duration } => {
                (weight.abs() < threshold_g).then_some(SleepRequest { kind, duration })
            }
        }
    }
}

/// Blocking waits. Deep sleep is deliberately absent: it never returns, so
/// the firmware enters it only after the session loop has handed back.
pub trait Sleeper {
    /// Plain delay between polls and handshake attempts.
    fn delay(&mut self, duration: Duration);

    /// Low-power suspend that resumes in place.
    fn light_sleep(&mut self, duration: Duration);
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEEP: SleepPolicy = SleepPolicy::BelowThreshold {
        threshold_g: 5.0,
        kind: SleepKind::Deep,
        duration: Duration::from_secs(30),
    };

    #[test]
    fn test_never_policy() {
        assert_eq!(SleepPolicy::Never.decide(0.0), None);
    }

    #[test]
    fn test_below_threshold_sleeps() {
        let request = DEEP.decide(3.0).unwrap();
        assert_eq!(request.kind, SleepKind::Deep);
        assert_eq!(request.duration, Duration::from_secs(30));
        assert!(DEEP.decide(-4.99).is_some());
    }

    #[test]
    fn test_threshold_is_exclusive() {
        assert_eq!(DEEP.decide(5.0), None);
        assert_eq!(DEEP.decide(-5.0), None);
        assert_eq!(DEEP.decide(120.0), None);
    }

    #[test]
    fn test_decision_has_no_memory() {
        for _ in 0..5 {
            assert!(DEEP.decide(1.0).is_some());
        }
    }
}
