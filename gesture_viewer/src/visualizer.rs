//! Software-rendered viewer using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────────────┬──────────────┐
//! │ STATE badge            pose / last label     │  COMMANDS    │
//! │                                              │              │
//! │        particle cloud + hand skeleton        │  /wake  ok   │
//! │                                              │  /sleep ok   │
//! │                                              │              │
//! │ [ notification toast ]                       │  backend: on │
//! ├──────────────────────────────────────────────┴──────────────┤
//! │ key legend                                                  │
//! └─────────────────────────────────────────────────────────────┘
//! ```

use std::sync::mpsc::Sender;
use std::time::Duration;

use anyhow::Context;
use minifb::{Key, KeyRepeat, Window, WindowOptions};

use gesture_core::landmark::Landmark;

use crate::app::AppState;
use crate::particles::state_color;
use crate::source::{SimInput, SimPose};

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

pub const WIN_W:     usize = 960;
pub const WIN_H:     usize = 600;
const PANEL_W:       usize = 240;
const CANVAS_W:      usize = WIN_W - PANEL_W;
const LEGEND_H:      usize = 28;
const CANVAS_H:      usize = WIN_H - LEGEND_H;
const CLOUD_RADIUS:  f32   = 110.0;
const TEXT_SCALE:    usize = 2;
const BG_COLOR:      u32   = 0xFF0B0F1A;
const PANEL_BG:      u32   = 0xFF111827;
const LEGEND_BG:     u32   = 0xFF0A0A12;
const BONE_COLOR:    u32   = 0xFFE5E7EB;
const JOINT_COLOR:   u32   = 0xFFFFFFFF;
const TOAST_BG:      u32   = 0xFF7F1D1D;
const OK_COLOR:      u32   = 0xFF22C55E;
const FAIL_COLOR:    u32   = 0xFFEF4444;
const DIM_TEXT:      u32   = 0xFF9CA3AF;

/// Pairs of landmark indices joined when drawing the hand skeleton.
const BONES: [(usize, usize); 21] = [
    (0, 1), (1, 2), (2, 3), (3, 4),
    (0, 5), (5, 6), (6, 7), (7, 8),
    (5, 9), (9, 10), (10, 11), (11, 12),
    (9, 13), (13, 14), (14, 15), (15, 16),
    (13, 17), (17, 18), (18, 19), (19, 20),
    (0, 17),
];

/// Normalised distance moved per arrow-key press.
const NUDGE: f32 = 0.02;

// ════════════════════════════════════════════════════════════════════════════
// Window input
// ════════════════════════════════════════════════════════════════════════════

/// Window-level actions from one poll; pose keys go straight to the source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameInput {
    pub quit:           bool,
    pub toggle_backend: bool,
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window: Window,
    buf:    Vec<u32>,
    sim_tx: Sender<SimInput>,
    pose:   SimPose,
}

impl Visualizer {
    pub fn new(sim_tx: Sender<SimInput>) -> anyhow::Result<Self> {
        let mut window = Window::new(
            "Gesture Viewer",
            WIN_W, WIN_H,
            WindowOptions { resize: false, ..WindowOptions::default() },
        ).context("opening viewer window")?;

        window.limit_update_rate(Some(Duration::from_millis(16)));

        Ok(Visualizer {
            window,
            buf: vec![BG_COLOR; WIN_W * WIN_H],
            sim_tx,
            pose: SimPose::Hidden,
        })
    }

    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Poll the keyboard.  Pose and movement keys are forwarded to the
    /// simulated source; everything else is returned to the caller.
    pub fn poll_input(&mut self) -> FrameInput {
        let mut input = FrameInput::default();
        if !self.window.is_open() {
            input.quit = true;
            return input;
        }

        let pressed = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);
        let held    = |k: Key| self.window.is_key_pressed(k, KeyRepeat::Yes);

        if pressed(Key::Q) || pressed(Key::Escape) {
            let _ = self.sim_tx.send(SimInput::Quit);
            input.quit = true;
            return input;
        }
        input.toggle_backend = pressed(Key::B);

        let pose = if pressed(Key::Key1) {
            Some(SimPose::OpenPalm)
        } else if pressed(Key::Key2) {
            Some(SimPose::Fist)
        } else if pressed(Key::Key3) {
            Some(SimPose::Pinch)
        } else if pressed(Key::Key4) {
            Some(SimPose::Relaxed)
        } else if pressed(Key::Key0) || pressed(Key::H) {
            Some(SimPose::Hidden)
        } else {
            None
        };
        if let Some(pose) = pose {
            self.pose = pose;
            let _ = self.sim_tx.send(SimInput::Pose(pose));
        }

        let mut dx = 0.0;
        let mut dy = 0.0;
        if held(Key::Left)  { dx -= NUDGE; }
        if held(Key::Right) { dx += NUDGE; }
        if held(Key::Up)    { dy -= NUDGE; }
        if held(Key::Down)  { dy += NUDGE; }
        if dx != 0.0 || dy != 0.0 {
            let _ = self.sim_tx.send(SimInput::Nudge { dx, dy });
        }

        input
    }

    /// Render one frame.
    pub fn render(&mut self, app: &AppState) {
        self.buf.fill(BG_COLOR);
        let state = app.visual_state();
        let accent = state_color(state);

        // ── particles ─────────────────────────────────────────────────────
        let cloud = app.particles();
        for (x, y) in cloud.screen_points(CANVAS_W, CANVAS_H, CLOUD_RADIUS) {
            self.plot(x, y, cloud.color);
            self.plot(x + 1, y, cloud.color);
        }

        // ── hand skeleton ─────────────────────────────────────────────────
        if let Some(points) = app.hand() {
            self.draw_hand(points);
        }

        // ── state badge ───────────────────────────────────────────────────
        self.fill_rect(12, 12, 14, 14, accent);
        self.draw_text(state.as_str(), 34, 14, accent);
        let pose_line = format!("pose: {}  label: {}", self.pose.name(), app.last_label());
        self.draw_text(&pose_line, 12, 40, DIM_TEXT);
        self.draw_text(&app.status, 12, 58, DIM_TEXT);

        // ── notification toast ────────────────────────────────────────────
        if let Some(message) = app.notification() {
            let w = (text_width(message) + 24).min(CANVAS_W - 24);
            self.fill_rect(12, CANVAS_H - 44, w, 30, TOAST_BG);
            self.draw_text(message, 24, CANVAS_H - 36, JOINT_COLOR);
        }

        // ── command log panel ─────────────────────────────────────────────
        self.fill_rect(CANVAS_W, 0, PANEL_W, CANVAS_H, PANEL_BG);
        self.draw_text("commands", CANVAS_W + 12, 14, JOINT_COLOR);
        let mut y = 44;
        for entry in app.log().iter().rev() {
            let color = if entry.ok { OK_COLOR } else { FAIL_COLOR };
            self.draw_text(&entry.to_string(), CANVAS_W + 12, y, color);
            y += 18;
        }
        let backend = if app.backend_online() { "backend: online" } else { "backend: offline" };
        let color   = if app.backend_online() { OK_COLOR } else { FAIL_COLOR };
        self.draw_text(backend, CANVAS_W + 12, CANVAS_H - 24, color);

        // ── key legend ────────────────────────────────────────────────────
        self.fill_rect(0, CANVAS_H, WIN_W, LEGEND_H, LEGEND_BG);
        self.draw_text(
            "1=palm 2=fist 3=pinch 4=relaxed 0=hide  arrows=move  b=backend  q=quit",
            12, CANVAS_H + 8, DIM_TEXT,
        );

        self.window.update_with_buffer(&self.buf, WIN_W, WIN_H).ok();
    }

    // ── hand ──────────────────────────────────────────────────────────────

    fn draw_hand(&mut self, points: &[Landmark]) {
        let to_px = |p: &Landmark| {
            ((p.x * CANVAS_W as f32) as isize, (p.y * CANVAS_H as f32) as isize)
        };
        for &(a, b) in BONES.iter() {
            if let (Some(pa), Some(pb)) = (points.get(a), points.get(b)) {
                let (x0, y0) = to_px(pa);
                let (x1, y1) = to_px(pb);
                self.draw_line(x0, y0, x1, y1, BONE_COLOR);
            }
        }
        for p in points {
            let (x, y) = to_px(p);
            for dy in -2..=2 {
                for dx in -2..=2 {
                    self.plot(x + dx, y + dy, JOINT_COLOR);
                }
            }
        }
    }

    // ── primitives ────────────────────────────────────────────────────────

    fn plot(&mut self, x: isize, y: isize, color: u32) {
        if x >= 0 && y >= 0 && (x as usize) < WIN_W && (y as usize) < WIN_H {
            self.buf[y as usize * WIN_W + x as usize] = color;
        }
    }

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y + h).min(WIN_H) {
            let start = row * WIN_W;
            for col in x..(x + w).min(WIN_W) {
                self.buf[start + col] = color;
            }
        }
    }

    fn draw_line(&mut self, x0: isize, y0: isize, x1: isize, y1: isize, color: u32) {
        let steps = (x1 - x0).abs().max((y1 - y0).abs()).max(1);
        for i in 0..=steps {
            let x = x0 + (x1 - x0) * i / steps;
            let y = y0 + (y1 - y0) * i / steps;
            self.plot(x, y, color);
        }
    }

    fn draw_text(&mut self, text: &str, x: usize, y: usize, color: u32) {
        let mut cx = x;
        for ch in text.chars() {
            if let Some(rows) = glyph(ch) {
                for (r, row) in rows.iter().enumerate() {
                    for (c, cell) in row.bytes().enumerate() {
                        if cell == b'#' {
                            self.fill_rect(
                                cx + c * TEXT_SCALE, y + r * TEXT_SCALE,
                                TEXT_SCALE, TEXT_SCALE, color,
                            );
                        }
                    }
                }
            }
            cx += GLYPH_ADVANCE;
            if cx + GLYPH_ADVANCE > WIN_W { break; }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// 3×5 block font
// ────────────────────────────────────────────────────────────────────────────

const GLYPH_ADVANCE: usize = 4 * TEXT_SCALE;

fn text_width(text: &str) -> usize {
    text.chars().count() * GLYPH_ADVANCE
}

/// Rows of a glyph, `#` lit.  Letters are case-folded; unknown characters
/// render as a centred dot and space as nothing.
fn glyph(c: char) -> Option<[&'static str; 5]> {
    let rows = match c.to_ascii_lowercase() {
        ' ' => return None,
        'a' => ["###", "#.#", "###", "#.#", "#.#"],
        'b' => ["##.", "#.#", "##.", "#.#", "##."],
        'c' => ["###", "#..", "#..", "#..", "###"],
        'd' => ["##.", "#.#", "#.#", "#.#", "##."],
        'e' => ["###", "#..", "##.", "#..", "###"],
        'f' => ["###", "#..", "##.", "#..", "#.."],
        'g' => ["###", "#..", "#.#", "#.#", "###"],
        'h' => ["#.#", "#.#", "###", "#.#", "#.#"],
        'i' => ["###", ".#.", ".#.", ".#.", "###"],
        'j' => ["..#", "..#", "..#", "#.#", "###"],
        'k' => ["#.#", "#.#", "##.", "#.#", "#.#"],
        'l' => ["#..", "#..", "#..", "#..", "###"],
        'm' => ["#.#", "###", "###", "#.#", "#.#"],
        'n' => ["##.", "#.#", "#.#", "#.#", "#.#"],
        'o' => ["###", "#.#", "#.#", "#.#", "###"],
        'p' => ["###", "#.#", "###", "#..", "#.."],
        'q' => ["###", "#.#", "#.#", "###", "..#"],
        'r' => ["##.", "#.#", "##.", "#.#", "#.#"],
        's' => ["###", "#..", "###", "..#", "###"],
        't' => ["###", ".#.", ".#.", ".#.", ".#."],
        'u' => ["#.#", "#.#", "#.#", "#.#", "###"],
        'v' => ["#.#", "#.#", "#.#", "#.#", ".#."],
        'w' => ["#.#", "#.#", "###", "###", "#.#"],
        'x' => ["#.#", "#.#", ".#.", "#.#", "#.#"],
        'y' => ["#.#", "#.#", ".#.", ".#.", ".#."],
        'z' => ["###", "..#", ".#.", "#..", "###"],
        '0' => ["###", "#.#", "#.#", "#.#", "###"],
        '1' => [".#.", "##.", ".#.", ".#.", "###"],
        '2' => ["###", "..#", "###", "#..", "###"],
        '3' => ["###", "..#", ".##", "..#", "###"],
        '4' => ["#.#", "#.#", "###", "..#", "..#"],
        '5' => ["###", "#..", "###", "..#", "###"],
        '6' => ["###", "#..", "###", "#.#", "###"],
        '7' => ["###", "..#", ".#.", ".#.", ".#."],
        '8' => ["###", "#.#", "###", "#.#", "###"],
        '9' => ["###", "#.#", "###", "..#", "###"],
        '/' => ["..#", "..#", ".#.", "#..", "#.."],
        '-' => ["...", "...", "###", "...", "..."],
        '_' => ["...", "...", "...", "...", "###"],
        '>' => ["#..", ".#.", "..#", ".#.", "#.."],
        ':' => ["...", ".#.", "...", ".#.", "..."],
        '=' => ["...", "###", "...", "###", "..."],
        '.' => ["...", "...", "...", "...", ".#."],
        ',' => ["...", "...", "...", ".#.", "#.."],
        '(' => [".#.", "#..", "#..", "#..", ".#."],
        ')' => [".#.", "..#", "..#", "..#", ".#."],
        _   => ["...", "...", ".#.", "...", "..."],
    };
    Some(rows)
}
