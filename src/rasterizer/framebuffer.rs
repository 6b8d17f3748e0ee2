//! Framebuffer and depth buffer
//!
//! Pixels are stored packed as one `u32` per pixel. The packing is chosen at
//! construction from the host byte order so that the raw bytes of the pixel
//! store always read R, G, B, A in memory, which is what display surfaces take.

use std::path::{Path, PathBuf};

use super::types::Color;
use crate::error::RenderError;

/// Host byte order, detected once per framebuffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    pub fn detect() -> Self {
        if u32::from_ne_bytes([0x11, 0x22, 0x33, 0x44]) == 0x4433_2211 {
            ByteOrder::Little
        } else {
            ByteOrder::Big
        }
    }

    /// Pack a color so its in-memory bytes are `[r, g, b, a]`
    pub fn pack(self, c: Color) -> u32 {
        match self {
            ByteOrder::Little => {
                (c.a as u32) << 24 | (c.b as u32) << 16 | (c.g as u32) << 8 | c.r as u32
            }
            ByteOrder::Big => {
                (c.r as u32) << 24 | (c.g as u32) << 16 | (c.b as u32) << 8 | c.a as u32
            }
        }
    }

    pub fn unpack(self, p: u32) -> Color {
        let b = |shift: u32| ((p >> shift) & 0xff) as u8;
        match self {
            ByteOrder::Little => Color::with_alpha(b(0), b(8), b(16), b(24)),
            ByteOrder::Big => Color::with_alpha(b(24), b(16), b(8), b(0)),
        }
    }
}

/// Per-pixel nearest depth so far, reset to +infinity every frame
#[derive(Debug, Clone)]
pub struct DepthBuffer {
    values: Vec<f32>,
    pub width: usize,
    pub height: usize,
}

impl DepthBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            values: vec![f32::INFINITY; width * height],
            width,
            height,
        }
    }

    pub fn clear(&mut self) {
        self.values.fill(f32::INFINITY);
    }

    pub fn get(&self, x: usize, y: usize) -> Option<f32> {
        if x < self.width && y < self.height {
            Some(self.values[y * self.width + x])
        } else {
            None
        }
    }

    /// Store `z` if it is strictly nearer than the current value.
    /// Out-of-range coordinates and NaN depths always fail.
    pub fn test_and_set(&mut self, x: usize, y: usize, z: f32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let idx = y * self.width + x;
        if z < self.values[idx] {
            self.values[idx] = z;
            true
        } else {
            false
        }
    }
}

/// Receives one finished frame as packed RGBA bytes
pub trait DisplaySurface {
    fn present(&mut self, width: usize, height: usize, rgba: &[u8]) -> Result<(), RenderError>;
}

/// Headless surface that writes each presented frame to a PNG file
pub struct PngSurface {
    path: PathBuf,
    pub frames_written: usize,
}

impl PngSurface {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            frames_written: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DisplaySurface for PngSurface {
    fn present(&mut self, width: usize, height: usize, rgba: &[u8]) -> Result<(), RenderError> {
        image::save_buffer(
            &self.path,
            rgba,
            width as u32,
            height as u32,
            image::ColorType::Rgba8,
        )?;
        self.frames_written += 1;
        Ok(())
    }
}

/// Framebuffer for software rendering
pub struct Framebuffer {
    pub pixels: Vec<u32>,    // Packed RGBA, see ByteOrder
    pub depth: DepthBuffer,
    pub width: usize,
    pub height: usize,
    byte_order: ByteOrder,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        let byte_order = ByteOrder::detect();
        Self {
            pixels: vec![byte_order.pack(Color::BLACK); width * height],
            depth: DepthBuffer::new(width, height),
            width,
            height,
            byte_order,
        }
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// Fill every pixel with `color` (depth is left alone)
    pub fn clear(&mut self, color: Color) {
        let packed = self.byte_order.pack(color);
        self.pixels.fill(packed);
    }

    pub fn clear_depth(&mut self) {
        self.depth.clear();
    }

    /// Depth test that commits on success. Call once per pixel, before `set_pixel`.
    pub fn depth_test(&mut self, x: usize, y: usize, z: f32) -> bool {
        self.depth.test_and_set(x, y, z)
    }

    /// Bounds-checked write; out-of-range pixels are ignored
    pub fn set_pixel(&mut self, x: usize, y: usize, color: Color) {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x] = self.byte_order.pack(color);
        }
    }

    pub fn get_pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x < self.width && y < self.height {
            Some(self.byte_order.unpack(self.pixels[y * self.width + x]))
        } else {
            None
        }
    }

    /// Raw pixel bytes, R G B A per pixel
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Hand the finished frame to the display surface
    pub fn present<S: DisplaySurface + ?Sized>(&self, surface: &mut S) -> Result<(), RenderError> {
        surface.present(self.width, self.height, self.as_bytes())
    }

    /// Draw a line from (x0, y0) to (x1, y1) using Bresenham's algorithm.
    /// Steps every point of the line, so callers clip long lines first.
    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
        let (x0, y0, x1, y1) = (x0 as i64, y0 as i64, x1 as i64, y1 as i64);
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let mut x = x0;
        let mut y = y0;

        loop {
            if x >= 0 && y >= 0 {
                self.set_pixel(x as usize, y as usize, color);
            }

            if x == x1 && y == y1 {
                break;
            }

            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Number of pixels that differ from `background`
    pub fn count_pixels_not(&self, background: Color) -> usize {
        let packed = self.byte_order.pack(background);
        self.pixels.iter().filter(|&&p| p != packed).count()
    }
}
