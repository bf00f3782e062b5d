use std::{fmt, ops::Index};

use serde::{Deserialize, Serialize};

use crate::Point2D;

/// Number of electromagnets around the workspace
pub const NUMBER_OF_COILS: usize = 8;

/// Coil activation pattern
///
/// Bit `i` set means coil `i` (0-indexed) is energized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivationMask(u8);

impl ActivationMask {
    /// All coils off
    pub const OFF: Self = Self(0);

    pub const fn new(bits: u8) -> Self {
        Self(bits)
    }
    /// Single coil pattern, `None` if `coil` is not less than [NUMBER_OF_COILS]
    pub fn single(coil: usize) -> Option<Self> {
        (coil < NUMBER_OF_COILS).then(|| Self(1 << coil))
    }
    pub const fn bits(&self) -> u8 {
        self.0
    }
    pub fn is_off(&self) -> bool {
        self.0 == 0
    }
    pub fn is_set(&self, coil: usize) -> bool {
        coil < NUMBER_OF_COILS && self.0 & (1 << coil) != 0
    }
    /// Energizes `coil`, out of range coils are ignored
    pub fn set(&mut self, coil: usize) -> &mut Self {
        if coil < NUMBER_OF_COILS {
            self.0 |= 1 << coil;
        }
        self
    }
    /// Number of energized coils
    pub fn count(&self) -> u32 {
        self.0.count_ones()
    }
    /// Iterator over the indices of the energized coils
    pub fn active(&self) -> impl Iterator<Item = usize> + '_ {
        (0..NUMBER_OF_COILS).filter(|&i| self.is_set(i))
    }
}

impl FromIterator<usize> for ActivationMask {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        iter.into_iter().fold(Self::OFF, |mut mask, i| {
            mask.set(i);
            mask
        })
    }
}
impl From<u8> for ActivationMask {
    fn from(value: u8) -> Self {
        Self(value)
    }
}
impl From<ActivationMask> for u8 {
    fn from(value: ActivationMask) -> Self {
        value.0
    }
}
impl fmt::Display for ActivationMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010b}", self.0)
    }
}

/// Location of the coil tips in the image
///
/// The geometry is fixed once the camera and the coils are mounted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoilGeometry([Point2D; NUMBER_OF_COILS]);

impl Default for CoilGeometry {
    /// Tips of the rig coils as seen by the camera
    fn default() -> Self {
        Self([
            Point2D::new(621., 355.),
            Point2D::new(705., 513.),
            Point2D::new(625., 693.),
            Point2D::new(441., 763.),
            Point2D::new(293., 682.),
            Point2D::new(222., 507.),
            Point2D::new(297., 360.),
            Point2D::new(485., 281.),
        ])
    }
}

impl CoilGeometry {
    pub fn new(tips: [Point2D; NUMBER_OF_COILS]) -> Self {
        Self(tips)
    }
    pub fn tips(&self) -> &[Point2D; NUMBER_OF_COILS] {
        &self.0
    }
    pub fn iter(&self) -> impl Iterator<Item = &Point2D> {
        self.0.iter()
    }
}

impl Index<usize> for CoilGeometry {
    type Output = Point2D;
    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}
