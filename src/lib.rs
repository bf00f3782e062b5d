/*!
# ferroservo

Visual servoing of a ferrofluid particle with an 8-coil electromagnetic manipulator.

A camera tracks the particle, and at each frame the servo loop picks the set
of coils to energize so that the particle moves towards its commanded
position. The commanded position comes from a clicked target, a
trajectory generator or an experiment sequencer.

The crate re-exports the members of the workspace:
 - [interface]: client interface
 - [clients_io]: rig data types and identifiers
 - [clients]: coil selection, trajectories, experiments, recording and the simulated particle
 - [servo]: the frame-paced control loop

# Example

A closed loop on the simulated rig:
```
use ferroservo::prelude::*;
use ferroservo_demos::{ManualClock, ScriptedInput, SimRig};
# fn main() -> Result<(), Box<dyn std::error::Error>> {
let config = ServoConfig::default();
let rig = SimRig::new(Particle::new(Point2D::new(430., 560.), config.frame_period()));
let target = Point2D::new(520., 580.);
let report = ServoLoop::new(config)
    .sensor(rig.sensor())
    .driver(rig.driver())
    .clock(ManualClock::new())
    .input(
        ScriptedInput::new()
            .at(0, InputState::new().hold(Signal::ModeToggle))
            .at(1, InputState::new().click(target)),
    )
    .max_cycles(300)
    .check()?
    .run()?
    .report();
assert_eq!(report.cycles, 300);
assert!(rig.position().is_some_and(|p| p.within(&target, 3.)));
# Ok(())
# }
```
*/

pub use ferroservo_clients as clients;
pub use ferroservo_clients_io as clients_io;
pub use ferroservo_servo as servo;
pub use interface;

pub mod prelude {
    pub use ferroservo_clients::{
        CoilSelector, Experiment, ExperimentKind, MemoryLog, ModelParams, Particle,
        RecordSink, Selection, Shape, TextLog, Trajectories, Trajectory, TrajectoryConfig,
    };
    pub use ferroservo_clients_io::{ActivationMask, CoilGeometry, Point2D};
    pub use ferroservo_servo::{
        CoilDriver, ControlMode, FrameClock, InputSource, InputState, PositionSensor,
        ServoConfig, ServoError, ServoLoop, Signal, TargetSource,
    };
    pub use interface::{Data, Read, UniqueIdentifier, Update, Write, UID};
}
