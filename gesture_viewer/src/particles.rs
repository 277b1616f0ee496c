//! Particle-cloud animation state.
//!
//! The cloud is a fixed set of points laid out on a sunflower spiral around
//! a centre that eases toward the hand.  Colour and scale follow the
//! pipeline's [`VisualState`]; the renderer only reads this struct.

use gesture_core::VisualState;

// ════════════════════════════════════════════════════════════════════════════
// Palette
// ════════════════════════════════════════════════════════════════════════════

/// ARGB colour for each visual state.
pub fn state_color(state: VisualState) -> u32 {
    let rgb = match state {
        VisualState::Idle     => 0x00ffff,
        VisualState::Detected => 0x3399ff,
        VisualState::Stable   => 0xaa00ff,
        VisualState::Gesture  => 0xaa00ff,
        VisualState::Executed => 0x00ff88,
        VisualState::Error    => 0xff0033,
    };
    0xFF000000 | rgb
}

/// Scale the cloud settles at in each state.
fn rest_scale(state: VisualState) -> f32 {
    match state {
        VisualState::Stable | VisualState::Gesture => EXPANDED_SCALE,
        _ => 1.0,
    }
}

pub const EXPANDED_SCALE: f32 = 1.4;
pub const BURST_SCALE:    f32 = 2.0;
/// Frames a burst holds before easing back (~200 ms at 60 fps).
pub const BURST_FRAMES:   u32 = 12;

const GOLDEN_ANGLE: f32 = 2.399_963;
const FOLLOW_RATE:  f32 = 0.18;
const SCALE_RATE:   f32 = 0.2;
const SPIN_PER_TICK: f32 = 0.01;

// ════════════════════════════════════════════════════════════════════════════
// Particle
// ════════════════════════════════════════════════════════════════════════════

/// One point of the cloud, in polar form around the cloud centre.
#[derive(Clone, Copy, Debug)]
pub struct Particle {
    /// 0.0–1.0, fraction of the cloud radius.
    pub radius: f32,
    pub angle:  f32,
}

// ════════════════════════════════════════════════════════════════════════════
// ParticleCloud
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug)]
pub struct ParticleCloud {
    pub particles: Vec<Particle>,
    pub color:     u32,
    /// Current scale; eases toward the state's rest scale.
    pub scale:     f32,
    /// Centre in normalised image coordinates.
    pub center:    (f32, f32),
    state:         VisualState,
    burst_left:    u32,
    spin:          f32,
}

impl ParticleCloud {
    pub fn new(count: usize) -> Self {
        let n = count.max(1) as f32;
        let particles = (0..count)
            .map(|i| Particle {
                radius: ((i as f32 + 0.5) / n).sqrt(),
                angle:  i as f32 * GOLDEN_ANGLE,
            })
            .collect();

        ParticleCloud {
            particles,
            color:      state_color(VisualState::Idle),
            scale:      1.0,
            center:     (0.5, 0.5),
            state:      VisualState::Idle,
            burst_left: 0,
            spin:       0.0,
        }
    }

    pub fn state(&self) -> VisualState { self.state }

    pub fn is_bursting(&self) -> bool { self.burst_left > 0 }

    /// React to a visual-state change.
    pub fn set_state(&mut self, state: VisualState) {
        self.state = state;
        self.color = state_color(state);
        match state {
            VisualState::Executed => {
                self.scale = BURST_SCALE;
                self.burst_left = BURST_FRAMES;
            }
            VisualState::Idle => {
                self.scale = 1.0;
                self.burst_left = 0;
            }
            _ => {}
        }
    }

    /// Ease toward the hand centroid; drift back to the middle without one.
    pub fn follow(&mut self, target: Option<(f32, f32)>) {
        let (tx, ty) = target.unwrap_or((0.5, 0.5));
        self.center.0 += (tx - self.center.0) * FOLLOW_RATE;
        self.center.1 += (ty - self.center.1) * FOLLOW_RATE;
    }

    /// Advance the animation by one frame.
    pub fn tick(&mut self) {
        self.spin = (self.spin + SPIN_PER_TICK) % std::f32::consts::TAU;

        if self.burst_left > 0 {
            self.burst_left -= 1;
            return;
        }
        let target = rest_scale(self.state);
        self.scale += (target - self.scale) * SCALE_RATE;
        if (self.scale - target).abs() < 1e-3 {
            self.scale = target;
        }
    }

    /// Particle positions in pixels for a `w`×`h` canvas, where `radius` is
    /// the unscaled cloud radius in pixels.
    pub fn screen_points(&self, w: usize, h: usize, radius: f32) -> impl Iterator<Item = (isize, isize)> + '_ {
        let cx = self.center.0 * w as f32;
        let cy = self.center.1 * h as f32;
        let r  = radius * self.scale;
        self.particles.iter().map(move |p| {
            let a = p.angle + self.spin;
            let x = cx + a.cos() * p.radius * r;
            let y = cy + a.sin() * p.radius * r;
            (x.round() as isize, y.round() as isize)
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
