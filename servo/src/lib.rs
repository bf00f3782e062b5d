/*!
# ferroservo-servo

Frame-paced visual servoing loop of the ferrofluid manipulator.

The [ServoLoop] polls the operator [inputs](InputSource), reads the particle
position from the [PositionSensor], selects the coils to energize and writes
the [activation mask](ferroservo_clients_io::ActivationMask) to the [CoilDriver],
once per frame of the [FramePacer].

# Example

```ignore
use ferroservo_servo::{ChannelSensor, ServoConfig, ServoLoop};

let (positions, sensor) = ChannelSensor::new();
let report = ServoLoop::new(ServoConfig::from_path("servo.toml")?)
    .sensor(sensor)
    .driver(driver)
    .check()?
    .run()?
    .report();
```
*/

mod collaborators;
pub mod config;
mod control;
pub mod events;
mod pacing;
mod state;

pub use collaborators::{
    ChannelInput, ChannelSensor, CoilDriver, DriverError, FrameClock, InputSource, NoInput,
    PositionSensor, SystemClock,
};
pub use config::{ConfigError, ExperimentConfig, ServoConfig, SolverConfig, SolverKind};
pub use control::{Completed, CycleReport, LoopReport, Ready, ServoLoop, Unknown};
pub use events::{EdgeDetector, Events, InputState, Signal};
pub use pacing::{FramePacer, FrameReport};
pub use state::{Command, ControlMode, ControlState, TargetSource};

#[derive(Debug, thiserror::Error)]
pub enum ServoError {
    #[error("{0} is missing from the servo loop")]
    Missing(&'static str),
    #[error("coil actuation failed, servo loop halted")]
    Actuator(#[from] DriverError),
    #[error("servo loop configuration failed")]
    Config(#[from] ConfigError),
    #[error("the servo loop rig is detached")]
    Detached,
}

pub type Result<T> = std::result::Result<T, ServoError>;
