use std::{fmt, time::Duration};

use ferroservo_clients_io::{linspace_points, ActivationMask, CoilGeometry, Point2D};
use serde::{Deserialize, Serialize};

use super::{Actuation, Exit, ExperimentTable, Phase, PhaseKind};

/// Characterisation experiments of the rig
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExperimentKind {
    /// Velocity vs distance to coil #3
    #[default]
    DistanceSweep,
    /// Velocity vs coil voltage
    VoltageSweep,
    /// Velocity vs coil combinations
    CombinationSweep,
    /// Positioning accuracy of the closed loop
    ClosedLoopPositioning,
    /// Repeated open loop pulls from the same point
    Infinity,
}

impl ExperimentKind {
    pub const ALL: [ExperimentKind; 5] = [
        ExperimentKind::DistanceSweep,
        ExperimentKind::VoltageSweep,
        ExperimentKind::CombinationSweep,
        ExperimentKind::ClosedLoopPositioning,
        ExperimentKind::Infinity,
    ];
    /// Transition table of the experiment around the workspace `centre`
    pub fn table(&self, centre: Point2D, coils: &CoilGeometry) -> ExperimentTable {
        let Point2D { u: cx, v: cy } = centre;
        let second = Duration::from_secs(1);
        let pull = ActivationMask::new(0b0000_1000);
        let move_to_point = Phase::new(PhaseKind::MoveToPoint, Actuation::Servo, Exit::Arrived);
        let cooldown = Phase::new(PhaseKind::Cooldown, Actuation::Off, Exit::Elapsed(second));
        match self {
            ExperimentKind::DistanceSweep => ExperimentTable {
                name: self.to_string(),
                centre,
                targets: linspace_points(
                    Point2D::new(coils[3].u, cy + 100.),
                    Point2D::new(cx, cy - 100.),
                    5,
                ),
                patterns: vec![pull],
                phases: vec![
                    move_to_point,
                    Phase::new(PhaseKind::Settle, Actuation::Servo, Exit::Elapsed(second)),
                    cooldown,
                    Phase::new(
                        PhaseKind::Record,
                        Actuation::Pattern,
                        Exit::ElapsedOrEscaped(10 * second, 140.),
                    ),
                ],
                iterations: 6,
            },
            ExperimentKind::VoltageSweep => {
                let centre = centre - Point2D::new(20., 0.);
                ExperimentTable {
                    name: self.to_string(),
                    centre,
                    targets: vec![centre + Point2D::new(0., 80.)],
                    patterns: vec![pull],
                    phases: vec![
                        move_to_point,
                        cooldown,
                        Phase::new(
                            PhaseKind::Record,
                            Actuation::Pattern,
                            Exit::ElapsedOrEscaped(10 * second, 120.),
                        ),
                    ],
                    iterations: 6,
                }
            }
            ExperimentKind::CombinationSweep => ExperimentTable {
                name: self.to_string(),
                centre,
                targets: vec![centre],
                patterns: [0b0000_1000, 0b0000_0100, 0b0000_1100, 0b0001_1100, 0b0000_1110]
                    .into_iter()
                    .map(ActivationMask::new)
                    .collect(),
                phases: vec![
                    move_to_point,
                    Phase::new(PhaseKind::Settle, Actuation::Servo, Exit::Elapsed(second)),
                    cooldown,
                    Phase::new(
                        PhaseKind::Record,
                        Actuation::Pattern,
                        Exit::ElapsedOrEscaped(10 * second, 120.),
                    ),
                ],
                iterations: 7,
            },
            ExperimentKind::ClosedLoopPositioning => ExperimentTable {
                name: self.to_string(),
                centre,
                targets: linspace_points(
                    Point2D::new(cx - 9., cy + 10.),
                    Point2D::new(cx + 9., cy - 10.),
                    3,
                ),
                patterns: vec![],
                phases: vec![
                    move_to_point,
                    Phase::new(PhaseKind::Settle, Actuation::Servo, Exit::Elapsed(2 * second)),
                    Phase::new(PhaseKind::Record, Actuation::Servo, Exit::Elapsed(60 * second)),
                ],
                iterations: 1,
            },
            ExperimentKind::Infinity => ExperimentTable {
                name: self.to_string(),
                centre,
                targets: vec![centre + Point2D::new(0., 80.)],
                patterns: vec![pull],
                phases: vec![
                    move_to_point,
                    Phase::new(PhaseKind::Settle, Actuation::Hold, Exit::Elapsed(second)),
                    Phase::new(PhaseKind::Record, Actuation::Pattern, Exit::Elapsed(10 * second)),
                ],
                iterations: 6,
            },
        }
    }
}

impl fmt::Display for ExperimentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExperimentKind::DistanceSweep => write!(f, "distance sweep"),
            ExperimentKind::VoltageSweep => write!(f, "voltage sweep"),
            ExperimentKind::CombinationSweep => write!(f, "combination sweep"),
            ExperimentKind::ClosedLoopPositioning => write!(f, "closed-loop positioning"),
            ExperimentKind::Infinity => write!(f, "infinity loop"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_tables() {
        let centre = Point2D::new(470., 532.);
        let coils = CoilGeometry::default();
        for kind in ExperimentKind::ALL {
            let table = kind.table(centre, &coils);
            assert!(!table.targets.is_empty(), "{kind}");
            assert!(table.iterations > 0, "{kind}");
            assert_eq!(table.phases[0].kind, PhaseKind::MoveToPoint, "{kind}");
            assert_eq!(
                table.phases.iter().filter(|p| p.kind == PhaseKind::Record).count(),
                1,
                "{kind}"
            );
            if table
                .phases
                .iter()
                .any(|p| p.actuation == Actuation::Pattern)
            {
                assert!(!table.patterns.is_empty(), "{kind}");
            }
        }
    }

    #[test]
    fn distance_sweep_targets() {
        let table = ExperimentKind::DistanceSweep
            .table(Point2D::new(470., 532.), &CoilGeometry::default());
        assert_eq!(table.targets.len(), 5);
        assert_eq!(table.targets[0], Point2D::new(441., 632.));
        assert_eq!(table.targets[4], Point2D::new(470., 432.));
        assert_eq!(table.sweep_len(), 5);
    }

    #[test]
    fn voltage_sweep_centre() {
        let table = ExperimentKind::VoltageSweep
            .table(Point2D::new(470., 532.), &CoilGeometry::default());
        assert_eq!(table.centre, Point2D::new(450., 532.));
        assert_eq!(table.targets, vec![Point2D::new(450., 612.)]);
    }
}
