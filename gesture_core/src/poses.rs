//! Synthetic right-hand poses in normalized image coordinates.
//!
//! Used by the tests, the simulated landmark source and anyone who needs a
//! plausible hand without a camera.  Each pose is upright, palm toward the
//! sensor, wrist near the bottom of the frame.

use crate::landmark::Landmark;

type Raw = [[f32; 3]; 21];

// Shared palm: wrist, thumb base and the four MCP knuckles.
const WRIST:  [f32; 3] = [0.50, 0.80, 0.0];
const THUMB1: [f32; 3] = [0.44, 0.76, 0.0];
const THUMB2: [f32; 3] = [0.40, 0.71, 0.0];
const MCP_I:  [f32; 3] = [0.45, 0.62, 0.0];
const MCP_M:  [f32; 3] = [0.50, 0.61, 0.0];
const MCP_R:  [f32; 3] = [0.55, 0.62, 0.0];
const MCP_P:  [f32; 3] = [0.59, 0.65, 0.0];

/// All four fingers straight up, thumb out to the side.
const OPEN_PALM: Raw = [
    WRIST, THUMB1, THUMB2, [0.37, 0.66, 0.0], [0.35, 0.62, 0.0],
    MCP_I, [0.44, 0.54, 0.0], [0.435, 0.49, 0.0], [0.43, 0.45, 0.0],
    MCP_M, [0.50, 0.52, 0.0], [0.50, 0.47, 0.0], [0.50, 0.42, 0.0],
    MCP_R, [0.56, 0.54, 0.0], [0.565, 0.49, 0.0], [0.57, 0.45, 0.0],
    MCP_P, [0.61, 0.59, 0.0], [0.62, 0.55, 0.0], [0.63, 0.52, 0.0],
];

/// Fingers curled back below their PIP joints, tips close to the wrist.
const FIST: Raw = [
    WRIST, THUMB1, THUMB2, [0.40, 0.69, 0.0], [0.42, 0.68, 0.0],
    MCP_I, [0.45, 0.58, 0.0], [0.44, 0.65, 0.0], [0.46, 0.68, 0.0],
    MCP_M, [0.50, 0.57, 0.0], [0.50, 0.65, 0.0], [0.50, 0.68, 0.0],
    MCP_R, [0.55, 0.58, 0.0], [0.55, 0.66, 0.0], [0.54, 0.69, 0.0],
    MCP_P, [0.59, 0.61, 0.0], [0.58, 0.68, 0.0], [0.57, 0.71, 0.0],
];

/// Thumb tip touching the index tip, tilted toward the sensor.  Middle, ring
/// and pinky stay extended, so the open-palm rule matches as well.
const PINCH: Raw = [
    WRIST, THUMB1, THUMB2, [0.40, 0.56, -0.03], [0.44, 0.46, -0.05],
    MCP_I, [0.44, 0.54, -0.01], [0.435, 0.49, -0.02], [0.43, 0.45, -0.03],
    MCP_M, [0.50, 0.52, 0.0], [0.50, 0.47, 0.0], [0.50, 0.42, 0.0],
    MCP_R, [0.56, 0.54, 0.0], [0.565, 0.49, 0.0], [0.57, 0.45, 0.0],
    MCP_P, [0.61, 0.59, 0.0], [0.62, 0.55, 0.0], [0.63, 0.52, 0.0],
];

/// Loosely bent fingers: tips barely above the PIPs, nowhere near the palm.
/// Matches no gesture.
const RELAXED: Raw = [
    WRIST, THUMB1, THUMB2, [0.37, 0.66, 0.0], [0.35, 0.62, 0.0],
    MCP_I, [0.44, 0.54, 0.0], [0.435, 0.535, 0.0], [0.43, 0.53, 0.0],
    MCP_M, [0.50, 0.52, 0.0], [0.50, 0.515, 0.0], [0.50, 0.51, 0.0],
    MCP_R, [0.56, 0.54, 0.0], [0.565, 0.535, 0.0], [0.57, 0.53, 0.0],
    MCP_P, [0.61, 0.59, 0.0], [0.615, 0.585, 0.0], [0.62, 0.58, 0.0],
];

fn build(raw: &Raw) -> Vec<Landmark> {
    raw.iter().copied().map(Landmark::from).collect()
}

pub fn open_palm() -> Vec<Landmark> { build(&OPEN_PALM) }
pub fn fist() -> Vec<Landmark> { build(&FIST) }
pub fn pinch() -> Vec<Landmark> { build(&PINCH) }
pub fn relaxed() -> Vec<Landmark> { build(&RELAXED) }

/// The pinch pose with every depth flattened to zero.  Thumb and index still
/// overlap in the image, but the hand is not tilted toward the sensor.
pub fn flat_pinch() -> Vec<Landmark> {
    build(&PINCH).into_iter().map(|p| Landmark { z: 0.0, ..p }).collect()
}

/// Shift every point in the image plane.
pub fn translate(points: &[Landmark], dx: f32, dy: f32) -> Vec<Landmark> {
    points.iter().map(|p| Landmark::new(p.x + dx, p.y + dy, p.z)).collect()
}

/// Scale every point about `(cx, cy)` in the image plane; depth is untouched.
pub fn scale(points: &[Landmark], cx: f32, cy: f32, factor: f32) -> Vec<Landmark> {
    points.iter()
        .map(|p| Landmark::new(cx + (p.x - cx) * factor, cy + (p.y - cy) * factor, p.z))
        .collect()
}
