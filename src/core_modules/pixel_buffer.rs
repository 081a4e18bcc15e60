// THEORY:
// The `PixelBuffer` module is the validated doorway between the caller's raw
// bytes and the analysis stack. Every stage assumes a row-major RGBA layout
// whose length matches the declared dimensions, so that contract is checked
// exactly once, here, and never again downstream.
//
// Key architectural principles:
// 1.  **Borrowed View**: `PixelBuffer` borrows the caller's bytes instead of
//     copying them. A full camera frame is megabytes; the pipeline only ever
//     reads it.
// 2.  **Empty Is Valid**: a 0x0 buffer is a legal input. Degenerate frames
//     flow through the stages and come out as a zero-confidence descriptor
//     rather than an error.
// 3.  **Resolution Bound**: `downsample` produces an `OwnedFrame` copy when a
//     frame exceeds the configured maximum dimension, keeping per-image work
//     bounded no matter what the camera delivers.

use crate::core_modules::pixel::{CHANNELS, Pixel};
use thiserror::Error;

/// Errors raised when raw bytes cannot be interpreted as a frame.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error(
        "frame data length {actual} does not match {width}x{height} RGBA dimensions (expected {expected})"
    )]
    DimensionMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

/// A validated, immutable view over a row-major RGBA frame.
#[derive(Debug, Clone, Copy)]
pub struct PixelBuffer<'a> {
    width: u32,
    height: u32,
    data: &'a [u8],
}

impl<'a> PixelBuffer<'a> {
    /// Wraps raw RGBA bytes, checking that the length matches the declared
    /// dimensions. A 0x0 buffer with an empty slice is accepted.
    pub fn new(width: u32, height: u32, data: &'a [u8]) -> Result<Self, FrameError> {
        let expected = width as usize * height as usize * CHANNELS;
        if data.len() != expected {
            return Err(FrameError::DimensionMismatch {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Total number of pixels in the frame.
    pub fn len(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads the pixel at `(x, y)`. Callers keep coordinates in bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Pixel {
        let offset = (y as usize * self.width as usize + x as usize) * CHANNELS;
        Pixel::from(&self.data[offset..offset + CHANNELS])
    }

    /// Grayscale luminance for every pixel, row-major. Shared by the edge
    /// and texture stages so both see the same plane.
    pub fn luminance_plane(&self) -> Vec<f64> {
        let mut plane = Vec::with_capacity(self.len());
        for y in 0..self.height {
            for x in 0..self.width {
                plane.push(self.pixel(x, y).luminance());
            }
        }
        plane
    }

    /// Produces a nearest-neighbor downsampled copy when the longest side
    /// exceeds `max_dim`, or `None` when the frame is already within bounds.
    pub fn downsample(&self, max_dim: u32) -> Option<OwnedFrame> {
        let longest = self.width.max(self.height);
        if longest <= max_dim || self.is_empty() || max_dim == 0 {
            return None;
        }

        let step = longest.div_ceil(max_dim);
        let new_width = self.width.div_ceil(step);
        let new_height = self.height.div_ceil(step);

        let mut data = Vec::with_capacity(new_width as usize * new_height as usize * CHANNELS);
        for y in 0..new_height {
            for x in 0..new_width {
                let pixel = self.pixel(x * step, y * step);
                data.extend_from_slice(&[pixel.red, pixel.green, pixel.blue, pixel.alpha]);
            }
        }

        Some(OwnedFrame {
            width: new_width,
            height: new_height,
            data,
        })
    }
}

/// An owned RGBA frame, used where the pipeline needs its own copy: the
/// downsampling path, and handing frames across tasks in the worker pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedFrame {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl OwnedFrame {
    /// Takes ownership of raw RGBA bytes after the same validation as
    /// [`PixelBuffer::new`].
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self, FrameError> {
        let expected = width as usize * height as usize * CHANNELS;
        if data.len() != expected {
            return Err(FrameError::DimensionMismatch {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Borrows the frame as a `PixelBuffer` view. Infallible since the
    /// length invariant was checked at construction.
    pub fn view(&self) -> PixelBuffer<'_> {
        PixelBuffer {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }
}
