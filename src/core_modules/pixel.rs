// THEORY:
// The `Pixel` module is the atomic unit of the entire analysis stack. Every
// downstream stage (clustering, edge detection, texture analysis) ultimately
// reduces to questions asked of individual RGBA pixels, so this module owns
// the two per-pixel conversions the stages share:
//
// 1.  **Luminance**: the grayscale value used by the edge and texture stages.
//     It is the plain mean of the three color channels, NOT a perceptual
//     Rec. 601 weighting. The heuristic thresholds further up the stack were
//     tuned against the mean, so the formula is part of the contract.
// 2.  **HSV**: the color space used for naming colors. Hue separates foliage
//     greens from bloom colors far more reliably than raw RGB distances.
//
// Like the other data containers in `core_modules`, `Pixel` is "dumb": it
// holds channel values and answers questions about itself. It never looks at
// its neighbors.

/// Number of bytes per pixel in a raw RGBA frame.
pub const CHANNELS: usize = 4;

/// A single RGBA pixel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pixel {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

impl Pixel {
    pub fn new(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Grayscale value as the mean of the color channels, in `[0, 255]`.
    ///
    /// Intentionally not a perceptual weighting; the edge and texture
    /// thresholds are calibrated against this mean.
    pub fn luminance(&self) -> f64 {
        (self.red as f64 + self.green as f64 + self.blue as f64) / 3.0
    }

    /// Converts to HSV with hue in `[0, 360)`, saturation in `[0, 100]` and
    /// value in `[0, 255]`.
    pub fn to_hsv(&self) -> (f64, f64, f64) {
        let r = self.red as f64 / 255.0;
        let g = self.green as f64 / 255.0;
        let b = self.blue as f64 / 255.0;

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;

        let hue = if delta.abs() < f64::EPSILON {
            0.0
        } else if (max - r).abs() < f64::EPSILON {
            60.0 * ((g - b) / delta).rem_euclid(6.0)
        } else if (max - g).abs() < f64::EPSILON {
            60.0 * ((b - r) / delta + 2.0)
        } else {
            60.0 * ((r - g) / delta + 4.0)
        };

        let saturation = if max.abs() < f64::EPSILON {
            0.0
        } else {
            (delta / max) * 100.0
        };

        (hue, saturation, max * 255.0)
    }
}

impl From<&[u8]> for Pixel {
    /// Interprets a 4-byte RGBA slice as a pixel.
    ///
    /// Callers hand in exact `CHANNELS`-sized slices carved out of a
    /// validated frame; anything else is a programming error.
    fn from(bytes: &[u8]) -> Self {
        assert_eq!(
            bytes.len(),
            CHANNELS,
            "a pixel is exactly {CHANNELS} bytes"
        );
        Pixel::new(bytes[0], bytes[1], bytes[2], bytes[3])
    }
}
