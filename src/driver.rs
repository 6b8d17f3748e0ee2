//! Frame driver
//!
//! Owns the scene, framebuffer and config. `Idle -> Running -> Idle`:
//! `start` arms the driver, every `tick` renders and presents one frame, and
//! `request_stop` is only observed at the top of the next tick, so a frame in
//! flight always completes. `benchmark` renders back-to-back without a
//! display and reports throughput.

use std::time::{Duration, Instant};

use crate::config::{ConfigError, RenderConfig};
use crate::error::RenderError;
use crate::rasterizer::{render_scene, Axis, DisplaySurface, FrameStats, Framebuffer, Mat4};
use crate::scene::{Camera, Scene};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Idle,
    Running,
}

#[derive(Debug, Clone, Copy)]
pub struct BenchmarkReport {
    pub frames: u32,
    pub elapsed: Duration,
    pub frames_per_second: f64,
    pub last_stats: FrameStats,
}

pub struct FrameDriver {
    scene: Scene,
    config: RenderConfig,
    framebuffer: Framebuffer,
    projection: Mat4,
    state: DriverState,
    stop_requested: bool,
    frames_rendered: u64,
}

impl FrameDriver {
    pub fn new(scene: Scene, config: RenderConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        log::info!(
            "Frame driver: {}x{}, {:?} shading, {} models / {} triangles",
            config.width,
            config.height,
            config.raster.shading,
            scene.models.len(),
            scene.triangle_count()
        );

        Ok(Self {
            framebuffer: Framebuffer::new(config.width, config.height),
            projection: config.projection(),
            scene,
            config,
            state: DriverState::Idle,
            stop_requested: false,
            frames_rendered: 0,
        })
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn start(&mut self) {
        if self.state == DriverState::Idle {
            log::debug!("frame driver started");
        }
        self.state = DriverState::Running;
        self.stop_requested = false;
    }

    /// Ask the loop to stop; takes effect at the next tick
    pub fn request_stop(&mut self) {
        self.stop_requested = true;
    }

    /// One scheduled iteration. Returns `None` once the driver is idle.
    pub fn tick<S: DisplaySurface + ?Sized>(
        &mut self,
        sim_time: f32,
        surface: &mut S,
    ) -> Result<Option<FrameStats>, RenderError> {
        if self.state == DriverState::Idle {
            return Ok(None);
        }
        if self.stop_requested {
            self.stop_requested = false;
            self.state = DriverState::Idle;
            log::debug!("frame driver stopped after {} frames", self.frames_rendered);
            return Ok(None);
        }

        let stats = self.render_frame(sim_time);
        self.framebuffer.present(surface)?;
        Ok(Some(stats))
    }

    /// Clear, then draw the whole scene at simulation time `sim_time` (seconds)
    pub fn render_frame(&mut self, sim_time: f32) -> FrameStats {
        self.framebuffer.clear(self.config.clear_color);
        self.framebuffer.clear_depth();

        let spin = Mat4::rotation(Axis::Y, sim_time * self.config.spin_speed);
        let stats = render_scene(
            &mut self.framebuffer,
            &self.scene,
            &self.config.raster,
            &self.projection,
            &spin,
        );

        self.frames_rendered += 1;
        log::trace!("frame {}: {:?}", self.frames_rendered, stats);
        stats
    }

    /// Render `iterations` frames back-to-back, advancing simulation time by
    /// `time_step` each frame. Nothing is presented.
    pub fn benchmark(
        &mut self,
        iterations: u32,
        time_step: f32,
        mut on_frame: impl FnMut(u32, &FrameStats),
    ) -> BenchmarkReport {
        if iterations == 0 {
            log::warn!("benchmark requested with zero iterations");
        }

        let start = Instant::now();
        let mut last_stats = FrameStats::default();
        for i in 0..iterations {
            last_stats = self.render_frame(i as f32 * time_step);
            on_frame(i, &last_stats);
        }
        let elapsed = start.elapsed();

        let secs = elapsed.as_secs_f64();
        let frames_per_second = if secs > 0.0 { iterations as f64 / secs } else { 0.0 };
        log::info!(
            "benchmark: {} frames in {:.3}s ({:.1} fps)",
            iterations,
            secs,
            frames_per_second
        );

        BenchmarkReport {
            frames: iterations,
            elapsed,
            frames_per_second,
            last_stats,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// Camera handle for input handling between frames
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.scene.camera
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }
}
