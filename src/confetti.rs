// File: ./src/confetti.rs
// Frame-driven confetti: no physics, no pooling.
use crate::color_utils::{self, Rgb};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const PALETTE: [&str; 8] = [
    "#ef4444", // red
    "#f97316", // orange
    "#eab308", // yellow
    "#22c55e", // green
    "#3b82f6", // blue
    "#a855f7", // purple
    "#ec4899", // pink
    "#fbbf24", // gold
];

pub const SMALL_BURST: usize = 30;
pub const LARGE_BURST: usize = 150;
/// Opacity lost per frame.
pub const FADE_PER_FRAME: f64 = 0.005;
/// Particles start this far above the top edge.
const SPAWN_Y: f64 = -10.0;

/// Where the engine draws. `y` grows downwards; angles are in degrees.
pub trait Surface {
    fn clear(&mut self);
    /// Fills a `width × height` rectangle centred on (`cx`, `cy`), rotated by `angle`.
    #[allow(clippy::too_many_arguments)]
    fn fill_rect(
        &mut self,
        cx: f64,
        cy: f64,
        width: f64,
        height: f64,
        angle: f64,
        color: Rgb,
        opacity: f64,
    );
}

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub vx: f64,
    pub vy: f64,
    pub color: Rgb,
    pub rotation: f64,
    pub spin: f64,
    pub opacity: f64,
}

impl Particle {
    fn spawn<R: Rng>(rng: &mut R, width: f64) -> Self {
        let hex = PALETTE[rng.random_range(0..PALETTE.len())];
        Self {
            x: rng.random_range(0.0..width.max(1.0)),
            y: SPAWN_Y,
            size: rng.random_range(4.0..12.0),
            vx: rng.random_range(-1.0..1.0),
            vy: rng.random_range(2.0..5.0),
            color: color_utils::parse_hex(hex).unwrap_or((255, 255, 255)),
            rotation: rng.random_range(0.0..360.0),
            spin: rng.random_range(-5.0..5.0),
            opacity: 1.0,
        }
    }

    /// Advances one frame. `false` once the particle should be retired.
    fn update(&mut self, bottom: f64) -> bool {
        self.x += self.vx;
        self.y += self.vy;
        self.rotation += self.spin;
        self.opacity -= FADE_PER_FRAME;
        self.y <= bottom && self.opacity > 0.0
    }

    fn draw<S: Surface + ?Sized>(&self, surface: &mut S) {
        surface.fill_rect(
            self.x,
            self.y,
            self.size,
            self.size / 2.0,
            self.rotation,
            self.color,
            self.opacity,
        );
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationState {
    Idle,
    Running,
}

pub struct Confetti<R = StdRng> {
    particles: Vec<Particle>,
    state: AnimationState,
    width: f64,
    height: f64,
    rng: R,
}

impl Confetti<StdRng> {
    pub fn new(width: f64, height: f64) -> Self {
        Self::with_rng(width, height, StdRng::from_os_rng())
    }
}

impl<R: Rng> Confetti<R> {
    pub fn with_rng(width: f64, height: f64, rng: R) -> Self {
        Self {
            particles: Vec::new(),
            state: AnimationState::Idle,
            width,
            height,
            rng,
        }
    }

    /// The host calls this whenever its drawing area changes.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn state(&self) -> AnimationState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == AnimationState::Running
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn burst(&mut self, count: usize) {
        let width = self.width;
        let rng = &mut self.rng;
        self.particles
            .extend((0..count).map(|_| Particle::spawn(rng, width)));
        if count > 0 {
            self.state = AnimationState::Running;
        }
    }

    pub fn burst_small(&mut self) {
        self.burst(SMALL_BURST);
    }

    pub fn burst_large(&mut self) {
        self.burst(LARGE_BURST);
    }

    /// One display-refresh tick. Does nothing while idle.
    pub fn frame<S: Surface + ?Sized>(&mut self, surface: &mut S) -> AnimationState {
        if self.state == AnimationState::Idle {
            return self.state;
        }

        surface.clear();
        let bottom = self.height;
        self.particles.retain_mut(|p| p.update(bottom));
        for particle in &self.particles {
            particle.draw(surface);
        }

        if self.particles.is_empty() {
            self.stop(surface);
        }
        self.state
    }

    pub fn stop<S: Surface + ?Sized>(&mut self, surface: &mut S) {
        self.particles.clear();
        self.state = AnimationState::Idle;
        surface.clear();
    }
}
