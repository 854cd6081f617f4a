//! Software-rendered visualizer using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                                                                  │
//! │      ○──────●  label          scene, projected through the       │
//! │       \    /                  host camera, far nodes first       │
//! │        ○──○                                                      │
//! │                     ✋  hand overlay (tips yellow when pinched)    │
//! │                                                                  │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  status bar                                                      │
//! │  key legend                                                      │
//! └──────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::mpsc::Sender;

use graph_camera::camera::ndc_to_display;
use graph_camera::{LabelLod, PerspectiveCamera, RenderHandles, SceneHost};
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

use crate::app::HandOverlay;
use crate::source::SimInput;

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

pub const WIN_W:       usize = 1000;
pub const WIN_H:       usize = 680;
const STATUS_H:        usize = 40;
const VIEW_H:          usize = WIN_H - STATUS_H;
const STATUS_Y:        usize = VIEW_H;
const BG_COLOR:        u32   = 0xFF1A1A2E;
const TEXT_BG:         u32   = 0xFF0F3460;
const LINK_COLOR:      u32   = 0xFF3A4A6E;
const NODE_COLOR:      u32   = 0xFF4FA3FF;
const CENTRAL_COLOR:   u32   = 0xFFFFD700;  // gold
const HIGHLIGHT_COLOR: u32   = 0xFF32CD32;  // lime
const LABEL_COLOR:     u32   = 0xFFEEEEEE;
const HAND_COLOR:      u32   = 0xFF66CCCC;
const PINCH_COLOR:     u32   = 0xFFFFFF00;
const TWO_HAND_COLOR:  u32   = 0xFFFF8844;

/// What the window asks of the app, apart from simulated hands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindowCommand {
    None,
    FitView,
    Quit,
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window: Window,
    buf:    Vec<u32>,
    /// Pointer samples for the mouse simulator; `None` with replay or
    /// hardware sources.
    sim_tx: Option<Sender<SimInput>>,
}

impl Visualizer {
    pub fn new(sim_tx: Option<Sender<SimInput>>) -> Result<Self, String> {
        let mut window = Window::new(
            "Leap Glaze: Hands-free Graph Explorer",
            WIN_W, WIN_H,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        ).map_err(|e| e.to_string())?;

        window.limit_update_rate(Some(std::time::Duration::from_millis(16))); // ~60fps

        Ok(Visualizer {
            window,
            buf: vec![BG_COLOR; WIN_W * WIN_H],
            sim_tx,
        })
    }

    /// Returns false when the window should close.
    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Width / height of the scene viewport.
    pub fn aspect(&self) -> f32 { WIN_W as f32 / VIEW_H as f32 }

    /// Poll keyboard and mouse. Keys are answered directly; the pointer is
    /// forwarded to the simulator, if there is one.
    pub fn poll_input(&mut self) -> WindowCommand {
        if !self.window.is_open() { return WindowCommand::Quit; }

        if self.window.is_key_pressed(Key::Q, KeyRepeat::No)
            || self.window.is_key_pressed(Key::Escape, KeyRepeat::No)
        {
            return WindowCommand::Quit;
        }

        if let Some(tx) = &self.sim_tx {
            let position = self.window.get_mouse_pos(MouseMode::Discard)
                .filter(|&(_, my)| my < VIEW_H as f32)
                .map(|(mx, my)| (mx / WIN_W as f32, my / VIEW_H as f32));
            let _ = tx.send(SimInput {
                position,
                left:  self.window.get_mouse_down(MouseButton::Left),
                right: self.window.get_mouse_down(MouseButton::Right),
                fist:  self.window.is_key_down(Key::F),
            });
        }

        if self.window.is_key_pressed(Key::R, KeyRepeat::No) {
            return WindowCommand::FitView;
        }
        WindowCommand::None
    }

    /// Render one frame.
    pub fn render(
        &mut self,
        host:      &SceneHost,
        labels:    &LabelLod,
        highlight: Option<&str>,
        hands:     &[HandOverlay],
        status:    &str,
        two_hand:  bool,
    ) {
        // Clear
        self.buf.fill(BG_COLOR);

        // ── Scene ─────────────────────────────────────────────────────────
        match host.camera() {
            Some(cam) => self.draw_scene(host, cam, labels, highlight),
            None => self.draw_label("waiting for camera", 10, 10, 2, LABEL_COLOR),
        }

        // ── Hands ─────────────────────────────────────────────────────────
        for hand in hands {
            self.draw_hand(hand, two_hand);
        }

        // ── Status bar ────────────────────────────────────────────────────
        self.fill_rect(0, STATUS_Y, WIN_W, STATUS_H, TEXT_BG);
        self.draw_label(status, 10, STATUS_Y + 8, 2, LABEL_COLOR);

        // ── Key legend ────────────────────────────────────────────────────
        self.draw_label(
            "left drag=pinch  right drag=two hands  f=fist  r=fit view  q=quit",
            10, WIN_H - 10, 1, 0xFF888888,
        );

        self.window.update_with_buffer(&self.buf, WIN_W, WIN_H).ok();
    }

    // ── Scene ─────────────────────────────────────────────────────────────

    fn draw_scene(
        &mut self,
        host:      &SceneHost,
        cam:       &PerspectiveCamera,
        labels:    &LabelLod,
        highlight: Option<&str>,
    ) {
        let Some(scene) = host.scene() else { return; };

        // ── links ─────────────────────────────────────────────────────────
        for link in scene.links() {
            let Some((a, b)) = scene.link_ends(link) else { continue; };
            if let (Some(pa), Some(pb)) = (to_pixel(cam, a.position), to_pixel(cam, b.position)) {
                self.draw_line(pa.0, pa.1, pb.0, pb.1, LINK_COLOR);
            }
        }

        // ── nodes, far to near ────────────────────────────────────────────
        let mut visible: Vec<_> = scene.nodes().iter()
            .filter_map(|n| cam.project(n.position).map(|p| (n, p)))
            .collect();
        visible.sort_by(|a, b| b.1.depth.total_cmp(&a.1.depth));

        let cam_dist = cam.position.coords.norm();
        for (node, proj) in visible {
            let d = ndc_to_display(proj.ndc_x, proj.ndc_y);
            let (x, y) = (d.x * WIN_W as f32, d.y * VIEW_H as f32);
            let px_per_unit = cam.screen_scale(proj.depth) * VIEW_H as f32;
            let r = (node.pick_radius() * px_per_unit).max(2.0);

            let color = if highlight == Some(node.id.as_str()) {
                HIGHLIGHT_COLOR
            } else if node.central {
                CENTRAL_COLOR
            } else {
                blend(BG_COLOR, NODE_COLOR, 0.4 + 0.6 * node.weight)
            };
            self.fill_circle(x, y, r, color);

            let style = labels.style(cam_dist, node);
            if style.visible {
                // Bitmap glyphs are 5 px tall at scale 1.
                let scale = ((style.text_height * px_per_unit) / 5.0).round().clamp(1.0, 4.0) as usize;
                if x >= 0.0 && y >= 0.0 {
                    let lx = (x + r + 3.0) as usize;
                    let ly = (y as usize).saturating_sub(scale * 5 / 2);
                    self.draw_label(&node.id, lx, ly, scale, color);
                }
            }
        }
    }

    // ── Hands ─────────────────────────────────────────────────────────────

    fn draw_hand(&mut self, hand: &HandOverlay, two_hand: bool) {
        for &(x, y) in &hand.points {
            self.fill_circle(x * WIN_W as f32, y * VIEW_H as f32, 2.0, HAND_COLOR);
        }
        let tip_color = match (hand.pinched, two_hand) {
            (true, true)  => TWO_HAND_COLOR,
            (true, false) => PINCH_COLOR,
            _             => HAND_COLOR,
        };
        for (x, y) in [hand.thumb_tip(), hand.index_tip()] {
            self.fill_circle(x * WIN_W as f32, y * VIEW_H as f32, 5.0, tip_color);
        }
    }

    // ── Primitive drawing helpers ─────────────────────────────────────────

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y+h).min(WIN_H) {
            for col in x..(x+w).min(WIN_W) {
                self.buf[row * WIN_W + col] = color;
            }
        }
    }

    fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        if x < WIN_W && y < VIEW_H {
            self.buf[y * WIN_W + x] = color;
        }
    }

    fn set_pixel_i(&mut self, x: isize, y: isize, color: u32) {
        if x >= 0 && y >= 0 {
            self.set_pixel(x as usize, y as usize, color);
        }
    }

    fn fill_circle(&mut self, cx: f32, cy: f32, r: f32, color: u32) {
        let ri = r.ceil() as isize;
        let (cxi, cyi) = (cx.round() as isize, cy.round() as isize);
        let r2 = r * r;
        for dy in -ri..=ri {
            for dx in -ri..=ri {
                if (dx * dx + dy * dy) as f32 <= r2 {
                    self.set_pixel_i(cxi + dx, cyi + dy, color);
                }
            }
        }
    }

    /// Bresenham line, clipped to the viewport.
    fn draw_line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, color: u32) {
        const LIMIT: f32 = 4.0 * WIN_W as f32;
        if [x0, y0, x1, y1].iter().any(|v| !v.is_finite() || v.abs() > LIMIT) { return; }

        let (mut x, mut y) = (x0.round() as isize, y0.round() as isize);
        let (xe, ye) = (x1.round() as isize, y1.round() as isize);
        let dx = (xe - x).abs();
        let dy = -(ye - y).abs();
        let sx = if x < xe { 1 } else { -1 };
        let sy = if y < ye { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.set_pixel_i(x, y, color);
            if x == xe && y == ye { break; }
            let e2 = 2 * err;
            if e2 >= dy { err += dy; x += sx; }
            if e2 <= dx { err += dx; y += sy; }
        }
    }

    /// Minimal bitmap font: 3×5 characters, drawn `scale` pixels per dot.
    fn draw_label(&mut self, text: &str, x: usize, y: usize, scale: usize, color: u32) {
        let mut cx = x;
        for ch in text.chars() {
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        for sy in 0..scale {
                            for sx in 0..scale {
                                self.put_text_pixel(cx + col * scale + sx, y + row * scale + sy, color);
                            }
                        }
                    }
                }
            }
            cx += 4 * scale; // 3 wide + 1 gap
            if cx + 4 * scale > WIN_W { break; }
        }
    }

    /// Text may sit on the status bar, so it is clipped to the window only.
    fn put_text_pixel(&mut self, x: usize, y: usize, color: u32) {
        if x < WIN_W && y < WIN_H {
            self.buf[y * WIN_W + x] = color;
        }
    }
}

/// Window pixel for a world point, if it is in front of the camera.
fn to_pixel(cam: &PerspectiveCamera, p: nalgebra::Point3<f32>) -> Option<(f32, f32)> {
    let proj = cam.project(p)?;
    let d = ndc_to_display(proj.ndc_x, proj.ndc_y);
    Some((d.x * WIN_W as f32, d.y * VIEW_H as f32))
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '"' => [0b101, 0b101, 0b000, 0b000, 0b000],
        '(' => [0b010, 0b100, 0b100, 0b100, 0b010],
        ')' => [0b010, 0b001, 0b001, 0b001, 0b010],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}

/// Alpha-blend two ARGB colors. `t` = 0.0 → all `a`, `t` = 1.0 → all `b`.
fn blend(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let lerp = |ca: u32, cb: u32| (ca as f32 * (1.0-t) + cb as f32 * t) as u32;
    let ar = (a >> 16) & 0xFF; let br = (b >> 16) & 0xFF;
    let ag = (a >>  8) & 0xFF; let bg = (b >>  8) & 0xFF;
    let ab =  a        & 0xFF; let bb =  b        & 0xFF;
    0xFF000000 | (lerp(ar,br) << 16) | (lerp(ag,bg) << 8) | lerp(ab,bb)
}
