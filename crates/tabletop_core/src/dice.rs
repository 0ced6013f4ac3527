//! Dice throwing and reading
//!
//! Faces are numbered in box-face order: +X, -X, +Y, -Y, +Z, -Z carry
//! 1 through 6, matching the face textures `one.png` .. `six.png`.

use glam::{Quat, Vec3};

/// Tag carried by every die entity
pub const DIE_TAG: &str = "die";

/// Face textures in box-face order
pub const DIE_FACE_TEXTURES: [&str; 6] = [
    "one.png", "two.png", "three.png", "four.png", "five.png", "six.png",
];

/// Local face normals in box-face order
const FACE_NORMALS: [Vec3; 6] = [
    Vec3::X,
    Vec3::NEG_X,
    Vec3::Y,
    Vec3::NEG_Y,
    Vec3::Z,
    Vec3::NEG_Z,
];

/// Deterministic source of roll randomness
///
/// SplitMix64; the same seed always throws the same dice.
#[derive(Clone, Debug)]
pub struct RollGenerator {
    state: u64,
}

impl RollGenerator {
    /// Create a generator from a seed
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Next raw 64-bit value
    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Next value in `[0, 1)`
    pub fn next_unit(&mut self) -> f32 {
        // 24 bits fill an f32 mantissa exactly
        (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32
    }
}

/// Velocities given to a die when it is thrown
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RollImpulse {
    /// Linear velocity: sideways in [-5, 5), upward in [5, 10)
    pub linear: Vec3,
    /// Angular velocity: each axis in [0, 10)
    pub angular: Vec3,
}

/// Draw a throw for one die
pub fn roll_impulse(rng: &mut RollGenerator) -> RollImpulse {
    let linear = Vec3::new(
        (rng.next_unit() - 0.5) * 10.0,
        rng.next_unit() * 5.0 + 5.0,
        (rng.next_unit() - 0.5) * 10.0,
    );
    let angular = Vec3::new(
        rng.next_unit() * 10.0,
        rng.next_unit() * 10.0,
        rng.next_unit() * 10.0,
    );
    RollImpulse { linear, angular }
}

/// Value (1-6) of the face pointing most upward
pub fn top_face(orientation: Quat) -> u8 {
    let mut best = (f32::NEG_INFINITY, 1u8);
    for (value, normal) in (1u8..).zip(FACE_NORMALS) {
        let up = (orientation * normal).y;
        if up > best.0 {
            best = (up, value);
        }
    }
    best.1
}
