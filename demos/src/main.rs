use std::{path::PathBuf, time::Instant};

use clap::{Parser, ValueEnum};
use ferroservo_clients::{ExperimentKind, Particle, Shape};
use ferroservo_clients_io::Point2D;
use ferroservo_demos::{ManualClock, ScriptedInput, SimRig};
use ferroservo_servo::{InputSource, InputState, ServoConfig, ServoLoop, Signal};
use indicatif::{ProgressBar, ProgressStyle};

/// Ferrofluid particle visual servoing on a simulated rig
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// frame rate [Hz]
    #[arg(long)]
    fps: Option<f64>,
    /// number of control cycles
    #[arg(short = 'n', long, default_value_t = 600)]
    cycles: usize,
    /// draws a shape, the particle is moved to a clicked target otherwise
    #[arg(long, value_enum)]
    shape: Option<ShapeArg>,
    /// runs a characterisation experiment
    #[arg(long, value_enum, conflicts_with = "shape")]
    experiment: Option<ExperimentArg>,
    /// recordings directory
    #[arg(long)]
    record_dir: Option<PathBuf>,
    /// paces the loop on the wall clock
    #[arg(long)]
    realtime: bool,
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
enum ShapeArg {
    VerticalLines,
    A,
    L,
    T,
    S,
    E,
    O,
    I,
    U,
    D,
    HorizontalLines,
    Square,
    Circle,
    Spiral,
    HorizontalLinesOpposite,
    VerticalLinesOpposite,
}
impl From<ShapeArg> for Shape {
    fn from(shape: ShapeArg) -> Self {
        match shape {
            ShapeArg::VerticalLines => Shape::VerticalLines,
            ShapeArg::A => Shape::LetterA,
            ShapeArg::L => Shape::LetterL,
            ShapeArg::T => Shape::LetterT,
            ShapeArg::S => Shape::LetterS,
            ShapeArg::E => Shape::Lettere,
            ShapeArg::O => Shape::LetterO,
            ShapeArg::I => Shape::LetterI,
            ShapeArg::U => Shape::LetterU,
            ShapeArg::D => Shape::Letterd,
            ShapeArg::HorizontalLines => Shape::HorizontalLines,
            ShapeArg::Square => Shape::Square,
            ShapeArg::Circle => Shape::Circle,
            ShapeArg::Spiral => Shape::Spiral,
            ShapeArg::HorizontalLinesOpposite => Shape::HorizontalLinesOpposite,
            ShapeArg::VerticalLinesOpposite => Shape::VerticalLinesOpposite,
        }
    }
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
enum ExperimentArg {
    DistanceSweep,
    VoltageSweep,
    CombinationSweep,
    ClosedLoopPositioning,
    Infinity,
}
impl From<ExperimentArg> for ExperimentKind {
    fn from(experiment: ExperimentArg) -> Self {
        match experiment {
            ExperimentArg::DistanceSweep => ExperimentKind::DistanceSweep,
            ExperimentArg::VoltageSweep => ExperimentKind::VoltageSweep,
            ExperimentArg::CombinationSweep => ExperimentKind::CombinationSweep,
            ExperimentArg::ClosedLoopPositioning => ExperimentKind::ClosedLoopPositioning,
            ExperimentArg::Infinity => ExperimentKind::Infinity,
        }
    }
}

/// Ticks a progress bar at each poll of the operator inputs
struct Progress<I> {
    input: I,
    bar: ProgressBar,
}
impl<I: InputSource> InputSource for Progress<I> {
    fn poll(&mut self) -> InputState {
        self.bar.inc(1);
        self.input.poll()
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = args
        .config
        .as_ref()
        .map(ServoConfig::from_path)
        .transpose()?
        .unwrap_or_default();
    if let Some(fps) = args.fps {
        config.fps = fps;
    }
    if let Some(shape) = args.shape {
        config.trajectory.shape = shape.into();
    }
    if let Some(experiment) = args.experiment {
        config.experiment.kind = experiment.into();
    }
    if args.record_dir.is_some() {
        config.record_dir = args.record_dir.clone();
    }
    config.max_cycles = Some(args.cycles);
    let config = config.validate()?;

    let centre = config.trajectory.layout.centre;
    log::info!(
        "simulated rig: {} cycles @ {:.1}fps, {}",
        args.cycles,
        config.fps,
        if args.realtime { "wall clock" } else { "manual clock" }
    );
    let rig = SimRig::new(
        Particle::new(centre + Point2D::new(-40., 30.), config.frame_period())
            .coils(config.coils.clone())
            .params(config.params),
    );

    let script = ScriptedInput::new().at(0, InputState::new().hold(Signal::ModeToggle));
    let script = if args.experiment.is_some() {
        script.at(2, InputState::new().hold(Signal::OpenLoopToggle))
    } else if args.shape.is_some() {
        script.at(2, InputState::new().hold(Signal::TrajectoryToggle))
    } else {
        script
            .at(2, InputState::new().click(centre + Point2D::new(50., 48.)))
            .at(3, InputState::new().hold(Signal::RecordingToggle))
    };

    let bar = ProgressBar::new(args.cycles as u64);
    bar.set_style(ProgressStyle::with_template(
        "{msg} [{eta_precise}] {bar:50.cyan/blue} {percent:>3}%",
    )?);
    bar.set_message("servoing");

    let servo = ServoLoop::new(config)
        .sensor(rig.sensor())
        .driver(rig.driver())
        .input(Progress {
            input: script,
            bar: bar.clone(),
        });
    let servo = if args.realtime {
        servo
    } else {
        servo.clock(ManualClock::new())
    };

    let now = Instant::now();
    let servo = servo.check()?.run()?;
    bar.finish();

    println!("{servo}");
    if let Some(position) = rig.position() {
        println!(
            "particle @ {position}, last command: {} ({:.1}px)",
            servo.command(),
            position.distance(&servo.command())
        );
    }
    println!(
        "elapsed: {}",
        humantime::format_duration(now.elapsed())
    );
    Ok(())
}
