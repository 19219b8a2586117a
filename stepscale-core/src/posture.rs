// StepScale core: posture classifier.

use crate::config::{NO_LOAD_THRESHOLD_G, POSTURE_PITCH_LIMIT_DEG};

/// Good posture needs a loaded foot and a pitch strictly inside ±10°.
///
/// An unloaded insole (`|weight| < 5 g`) is always classified bad, since
/// pitch carries no meaning without a foot on the sensor.
pub fn evaluate_posture(weight: f32, pitch: f32) -> bool {
    if weight.abs() < NO_LOAD_THRESHOLD_G {
        return false;
    }
    pitch > -POSTURE_PITCH_LIMIT_DEG && pitch < POSTURE_PITCH_LIMIT_DEG
}
