/*!
# Ferroservo I/O

Data types exchanged between the servo loop and its clients, and the
unique identifiers ([UID]) tagging them.

The image plane is the reference frame: `u` runs along the image columns and
`v` along the image rows, both in pixels.

[UID]: interface::UID
*/

mod coils;
mod geometry;

pub use coils::{ActivationMask, CoilGeometry, NUMBER_OF_COILS};
pub use geometry::{linspace, linspace_points, Point2D};

use interface::UID;

/// Measured position of the particle (tracker center of gravity)
#[derive(UID)]
#[uid(data = Point2D)]
pub enum ParticlePosition {}

/// Commanded position of the particle
#[derive(UID)]
#[uid(data = Point2D)]
pub enum TargetPosition {}

/// Coils energized during the current cycle
#[derive(UID)]
#[uid(data = ActivationMask)]
pub enum CoilActivation {}
