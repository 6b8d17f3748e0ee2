//! scanline-renderer: spinning-model viewer for the software rasterizer
//!
//! Usage: scanline-renderer [--config FILE] [--bench N] [--screenshot FILE] [MODEL.obj ...]
//!
//! With no models a default cube is shown. `--bench` and `--screenshot` run
//! headless; otherwise a window opens at 3x the framebuffer resolution.

mod display;

use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use macroquad::window::Conf;

use scanline_renderer::rasterizer::{Color, PngSurface};
use scanline_renderer::scene::{load_obj, Material, Mesh, Model, Scene};
use scanline_renderer::{load_config, FrameDriver, RenderConfig, VERSION};

const USAGE: &str = "Usage: scanline-renderer [--config FILE] [--bench N] [--screenshot FILE] [MODEL.obj ...]";

/// Window size multiplier over the framebuffer
const WINDOW_SCALE: i32 = 3;

/// Simulated seconds per benchmark frame
const BENCH_TIME_STEP: f32 = 1.0 / 60.0;

#[derive(Debug, Default)]
struct CliOptions {
    config: Option<PathBuf>,
    bench: Option<u32>,
    screenshot: Option<PathBuf>,
    models: Vec<PathBuf>,
}

impl CliOptions {
    fn parse() -> Result<Self> {
        Self::parse_from(env::args().skip(1))
    }

    fn parse_from(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut options = Self::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            let mut value = |flag: &str| args.next().ok_or_else(|| anyhow!("{flag} needs a value\n{USAGE}"));
            match arg.as_str() {
                "--config" => options.config = Some(PathBuf::from(value("--config")?)),
                "--screenshot" => options.screenshot = Some(PathBuf::from(value("--screenshot")?)),
                "--bench" => {
                    let raw = value("--bench")?;
                    let frames = raw
                        .parse()
                        .with_context(|| format!("--bench expects a frame count, got {raw}"))?;
                    options.bench = Some(frames);
                }
                other if other.starts_with("--") => {
                    return Err(anyhow!("Unknown argument: {other}\n{USAGE}"));
                }
                model => options.models.push(PathBuf::from(model)),
            }
        }

        Ok(options)
    }
}

fn default_model() -> Model {
    Model::new("cube", vec![Mesh::cube(1.0).with_name("cube").with_material(0)])
        .with_material(Material::new("clay", Color::new(220, 130, 70)))
}

fn build_driver(options: &CliOptions) -> Result<FrameDriver> {
    let config = match &options.config {
        Some(path) => load_config(path).with_context(|| format!("failed to load config {}", path.display()))?,
        None => RenderConfig::default(),
    };

    let mut builder = Scene::builder()
        .camera(config.build_camera())
        .light(config.build_light());

    if options.models.is_empty() {
        builder = builder.model(default_model());
    }
    for path in &options.models {
        let model = load_obj(path).with_context(|| format!("failed to load model {}", path.display()))?;
        builder = builder.model(model);
    }

    let scene = builder.build().context("failed to build scene")?;
    Ok(FrameDriver::new(scene, config)?)
}

#[cfg(not(target_arch = "wasm32"))]
fn run_benchmark(driver: &mut FrameDriver, frames: u32) {
    let progress = indicatif::ProgressBar::new(frames as u64);
    let report = driver.benchmark(frames, BENCH_TIME_STEP, |_, _| progress.inc(1));
    progress.finish_and_clear();
    print_report(&report);
}

#[cfg(target_arch = "wasm32")]
fn run_benchmark(driver: &mut FrameDriver, frames: u32) {
    let report = driver.benchmark(frames, BENCH_TIME_STEP, |_, _| {});
    print_report(&report);
}

fn print_report(report: &scanline_renderer::BenchmarkReport) {
    println!(
        "{} frames in {:.3}s: {:.1} fps ({} of {} triangles drawn in the last frame)",
        report.frames,
        report.elapsed.as_secs_f64(),
        report.frames_per_second,
        report.last_stats.drawn,
        report.last_stats.triangles
    );
}

fn window_conf(config: &RenderConfig) -> Conf {
    Conf {
        window_title: format!("Scanline Renderer v{}", VERSION),
        window_width: config.width as i32 * WINDOW_SCALE,
        window_height: config.height as i32 * WINDOW_SCALE,
        window_resizable: true,
        ..Default::default()
    }
}

fn run() -> Result<()> {
    let options = CliOptions::parse()?;
    let mut driver = build_driver(&options)?;

    if let Some(frames) = options.bench {
        run_benchmark(&mut driver, frames);
        return Ok(());
    }

    if let Some(path) = &options.screenshot {
        let mut surface = PngSurface::new(path);
        driver.start();
        driver
            .tick(0.0, &mut surface)
            .with_context(|| format!("failed to write screenshot {}", path.display()))?;
        println!("Wrote {}", surface.path().display());
        return Ok(());
    }

    let conf = window_conf(driver.config());
    macroquad::Window::from_config(conf, display::run_window(driver));
    Ok(())
}

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_flags_and_models() {
        let options = CliOptions::parse_from(args(&["--bench", "10", "a.obj", "--config", "c.ron", "b.obj"])).unwrap();
        assert_eq!(options.bench, Some(10));
        assert_eq!(options.config, Some(PathBuf::from("c.ron")));
        assert_eq!(options.models, vec![PathBuf::from("a.obj"), PathBuf::from("b.obj")]);
        assert!(options.screenshot.is_none());
    }

    #[test]
    fn test_parse_errors() {
        assert!(CliOptions::parse_from(args(&["--bench"])).is_err());
        assert!(CliOptions::parse_from(args(&["--bench", "many"])).is_err());
        assert!(CliOptions::parse_from(args(&["--fullscreen"])).is_err());
    }

    #[test]
    fn test_default_scene_has_cube() {
        let driver = build_driver(&CliOptions::default()).unwrap();
        assert_eq!(driver.scene().triangle_count(), 12);
    }
}
