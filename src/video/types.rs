use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{ImageBuffer, ImageResult, Rgb, RgbImage};

/// Represents a single video frame
///
/// A thin wrapper around an RGB image buffer. Frames travel to and from
/// ffmpeg as tightly packed `rgb24` bytes, so the raw-byte conversions here
/// are the hot path.
#[derive(Clone, Debug)]
pub struct Frame {
    buffer: RgbImage,
}

impl Frame {
    /// Create a new frame from an RGB image buffer
    pub fn new(buffer: RgbImage) -> Self {
        Self { buffer }
    }

    /// Create a new frame with the given dimensions filled with the specified color
    pub fn new_filled(width: u32, height: u32, color: [u8; 3]) -> Self {
        let buffer = ImageBuffer::from_fn(width, height, |_, _| {
            Rgb(color)
        });
        Self { buffer }
    }

    /// Decode an image file into a frame
    pub fn open<P: AsRef<Path>>(path: P) -> ImageResult<Self> {
        let image = image::open(path)?;
        let rgb_image = match image {
            image::DynamicImage::ImageRgb8(img) => img,
            other => other.to_rgb8(),
        };
        Ok(Self::new(rgb_image))
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    /// (width, height)
    pub fn dimensions(&self) -> (u32, u32) {
        self.buffer.dimensions()
    }

    /// Set a pixel at the given coordinates
    pub fn set_pixel(&mut self, x: u32, y: u32, color: [u8; 3]) {
        self.buffer.put_pixel(x, y, Rgb(color));
    }

    /// Borrow the packed RGB bytes
    pub fn as_rgb_bytes(&self) -> &[u8] {
        self.buffer.as_raw()
    }

    /// Create a frame from raw RGB bytes
    ///
    /// Returns `None` when `data` is not exactly `width * height * 3` bytes.
    pub fn from_rgb_bytes(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        ImageBuffer::from_raw(width, height, data)
            .map(|buffer| Self { buffer })
    }

    /// Resize to the given dimensions using a Lanczos3 filter
    pub fn resized(&self, width: u32, height: u32) -> Self {
        let resized = image::imageops::resize(
            &self.buffer,
            width,
            height,
            FilterType::Lanczos3,
        );
        Self::new(resized)
    }

    /// Save the frame as a JPEG file with the given quality (1-100)
    pub fn save_jpeg<P: AsRef<Path>>(&self, path: P, quality: u8) -> ImageResult<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        let mut encoder = JpegEncoder::new_with_quality(&mut writer, quality);
        encoder.encode_image(&self.buffer)
    }

    /// Save the frame, picking the format from the file extension
    pub fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        self.buffer.save(path)
    }

    /// Mean absolute per-channel difference against another frame of the same size
    pub fn mean_abs_diff(&self, other: &Frame) -> Option<f64> {
        if self.dimensions() != other.dimensions() {
            return None;
        }

        let a = self.as_rgb_bytes();
        let b = other.as_rgb_bytes();
        if a.is_empty() {
            return Some(0.0);
        }

        let total: u64 = a
            .iter()
            .zip(b.iter())
            .map(|(&x, &y)| (x as i16 - y as i16).unsigned_abs() as u64)
            .sum();
        Some(total as f64 / a.len() as f64)
    }
}
