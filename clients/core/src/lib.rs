/*!
# Ferroservo clients

The algorithms of the servo loop:
 - the [coil response](CoilResponse) model and the [coil selector](CoilSelector),
 - the [tuning](TuningEditor) of the selection weights,
 - the [trajectory] generators,
 - the [experiment] sequencer,
 - the [manual] keypad control,
 - the cycle [records](logging),
 - a simulated [particle](Particle) for closed loop simulations.
*/

pub mod experiment;
pub mod logging;
pub mod manual;
pub mod optimizer;
mod params;
mod plant;
mod response;
pub mod trajectory;

pub use experiment::{Experiment, ExperimentKind, ExperimentStep, ExperimentTable, Recording};
pub use logging::{CycleRecord, MemoryLog, RecordSink, TextLog};
pub use optimizer::{BranchAndBound, CoilSelector, Selection, Separable, Solver};
pub use params::{ModelParams, TuningEditor, TuningVariable};
pub use plant::Particle;
pub use response::{coil_force, CoilResponse, FORCE_EXPONENT, FORCE_GAIN};
pub use trajectory::{
    Axis, PointToPoint, Shape, SkipLevel, StepTrajectory, Trajectories, Trajectory,
    TrajectoryConfig,
};
