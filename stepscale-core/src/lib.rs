// StepScale core: board-agnostic logic shared by every firmware variant.
//
// Nothing in here touches ESP-IDF. Hardware is reached through the
// `LoadCell`, `TiltSensor`, `Link` and `Sleeper` traits so the whole
// sampling loop runs on the host under `cargo test`.

pub mod config;
pub mod events;
pub mod link;
pub mod posture;
pub mod power;
pub mod reading;
pub mod sampler;
pub mod sensor;

#[cfg(test)]
mod mock;

pub use config::{SamplingMode, SystemConfig, Variant};
pub use events::{EventInbox, EventSender};
pub use link::{CommandLatch, ConnectionState, Link, LinkAction, LinkEvent};
pub use posture::evaluate_posture;
pub use power::{SleepKind, SleepPolicy, SleepRequest, Sleeper};
pub use reading::{pitch_degrees, Acceleration, Reading};
pub use sampler::{AppState, BoxedTilt, Phase, Sampler, TickOutcome};
pub use sensor::{await_ready, prepare_scale, HandshakePolicy, LoadCell, Scale, TiltSensor};
