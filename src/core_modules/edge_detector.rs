// THEORY:
// The `edge_detector` turns the frame into structural evidence. A plant with
// many small leaves produces a busy gradient field; a succulent or a flat
// background produces almost none. The stage convolves the shared luminance
// plane with the two 3x3 Sobel kernels and reports, per pixel, the gradient
// magnitude plus a boolean "strong" mask thresholded by the config.
//
// The summary number the aggregator consumes is `density`: the fraction of
// pixels whose magnitude clears the threshold. The full mask feeds the
// contour tracer, which groups strong pixels into connected regions.
//
// Border pixels are assigned zero magnitude rather than reflecting or
// clamping the kernel. The one-pixel frame edge carries no botanical
// information and skipping it keeps the convolution branch-free.

use crate::core_modules::pixel_buffer::PixelBuffer;
use crate::pipeline::PipelineConfig;

type Kernel3 = [[f64; 3]; 3];

const SOBEL_KERNEL_X: Kernel3 = [[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]];
const SOBEL_KERNEL_Y: Kernel3 = [[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]];

/// Per-pixel gradient field for one frame.
#[derive(Debug, Clone)]
pub struct EdgeMap {
    pub width: u32,
    pub height: u32,
    /// Gradient magnitude per pixel, row-major. Border pixels are zero.
    pub magnitudes: Vec<f64>,
    /// Pixels whose magnitude reaches the configured threshold.
    pub strong: Vec<bool>,
    /// Fraction of pixels marked strong, in `[0, 1]`.
    pub density: f64,
}

/// Runs the Sobel operator over the frame's luminance plane.
///
/// Frames smaller than the 3x3 kernel produce an all-zero map with density
/// zero.
pub fn detect_edges(frame: &PixelBuffer, config: &PipelineConfig) -> EdgeMap {
    let width = frame.width() as usize;
    let height = frame.height() as usize;
    let total = width * height;

    let mut magnitudes = vec![0.0f64; total];
    let mut strong = vec![false; total];

    if width >= 3 && height >= 3 {
        let plane = frame.luminance_plane();
        for y in 1..height - 1 {
            for x in 1..width - 1 {
                let mut gx = 0.0;
                let mut gy = 0.0;
                for ky in 0..3 {
                    for kx in 0..3 {
                        let sample = plane[(y + ky - 1) * width + (x + kx - 1)];
                        gx += sample * SOBEL_KERNEL_X[ky][kx];
                        gy += sample * SOBEL_KERNEL_Y[ky][kx];
                    }
                }
                let magnitude = (gx * gx + gy * gy).sqrt();
                let idx = y * width + x;
                magnitudes[idx] = magnitude;
                strong[idx] = magnitude >= config.edge_threshold;
            }
        }
    }

    let strong_count = strong.iter().filter(|&&s| s).count();
    let density = if total == 0 {
        0.0
    } else {
        strong_count as f64 / total as f64
    };

    EdgeMap {
        width: frame.width(),
        height: frame.height(),
        magnitudes,
        strong,
        density,
    }
}
