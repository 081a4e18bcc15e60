// THEORY:
// The `texture_analyzer` captures micro-structure that clustering and edge
// density both miss. Two leaves can share a color and an outline while one
// is waxy-smooth and the other fuzzy; the difference lives in how each pixel
// relates to its immediate neighborhood.
//
// The stage computes a classic 8-bit local binary pattern (LBP): for every
// interior pixel, each of the 8 neighbors contributes one bit, set when the
// neighbor's luminance is at least the center's. The 256-bin histogram of
// those codes summarizes the surface. A flat surface concentrates nearly all
// mass in one code (every neighbor equal, so every bit set), while a noisy
// surface spreads mass across many codes. `uniformity`, the share of the
// dominant bin, is the scalar the aggregator consumes.

use crate::core_modules::pixel_buffer::PixelBuffer;

/// Neighbor offsets in bit order: NW, N, NE, W, E, SW, S, SE.
const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Local binary pattern summary for one frame.
#[derive(Debug, Clone)]
pub struct TextureMetrics {
    /// Count of interior pixels per 8-bit pattern code.
    pub histogram: [u32; 256],
    /// Share of the dominant bin, in `[0, 1]`. Zero when the frame has no
    /// interior pixels.
    pub uniformity: f64,
    /// The dominant pattern code; ties go to the lowest code.
    pub dominant_pattern: u8,
}

/// Computes the LBP histogram over all interior pixels.
pub fn analyze_texture(frame: &PixelBuffer) -> TextureMetrics {
    let width = frame.width() as usize;
    let height = frame.height() as usize;

    let mut histogram = [0u32; 256];
    let mut total = 0u64;

    if width >= 3 && height >= 3 {
        let plane = frame.luminance_plane();
        for y in 1..height - 1 {
            for x in 1..width - 1 {
                let center = plane[y * width + x];
                let mut code = 0u8;
                for (bit, (dx, dy)) in NEIGHBOR_OFFSETS.iter().enumerate() {
                    let nx = (x as i32 + dx) as usize;
                    let ny = (y as i32 + dy) as usize;
                    if plane[ny * width + nx] >= center {
                        code |= 1 << bit;
                    }
                }
                histogram[code as usize] += 1;
                total += 1;
            }
        }
    }

    let (dominant_pattern, max_count) = histogram
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(&a.0)))
        .map(|(code, &count)| (code as u8, count))
        .unwrap_or((0, 0));

    let uniformity = if total == 0 {
        0.0
    } else {
        max_count as f64 / total as f64
    };

    TextureMetrics {
        histogram,
        uniformity,
        dominant_pattern,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::pixel::CHANNELS;

    fn gray_frame(width: u32, height: u32, value_at: impl Fn(u32, u32) -> u8) -> Vec<u8> {
        let mut data = Vec::with_capacity(width as usize * height as usize * CHANNELS);
        for y in 0..height {
            for x in 0..width {
                let v = value_at(x, y);
                data.extend_from_slice(&[v, v, v, 255]);
            }
        }
        data
    }

    #[test]
    fn flat_frame_is_maximally_uniform() {
        let data = gray_frame(10, 10, |_, _| 120);
        let frame = PixelBuffer::new(10, 10, &data).unwrap();
        let metrics = analyze_texture(&frame);

        // Every neighbor equals the center, so every bit is set.
        assert_eq!(metrics.dominant_pattern, 0xFF);
        assert!((metrics.uniformity - 1.0).abs() < 1e-9);
        assert_eq!(metrics.histogram[0xFF], 64);
    }

    #[test]
    fn horizontal_ramp_has_a_single_directional_code() {
        // Strictly increasing along x: E, NE, SE are greater, N and S equal,
        // W-side neighbors smaller.
        let data = gray_frame(20, 10, |x, _| (x * 8) as u8);
        let frame = PixelBuffer::new(20, 10, &data).unwrap();
        let metrics = analyze_texture(&frame);

        let expected = (1 << 1) | (1 << 2) | (1 << 4) | (1 << 6) | (1 << 7);
        assert_eq!(metrics.dominant_pattern, expected as u8);
        assert!((metrics.uniformity - 1.0).abs() < 1e-9);
    }

    #[test]
    fn noise_spreads_the_histogram() {
        // A deterministic pseudo-random surface.
        let data = gray_frame(24, 24, |x, y| ((x * 31 + y * 47) % 251) as u8);
        let frame = PixelBuffer::new(24, 24, &data).unwrap();
        let metrics = analyze_texture(&frame);

        assert!(metrics.uniformity < 0.5);
    }

    #[test]
    fn tiny_frames_have_no_texture() {
        let data = gray_frame(2, 2, |_, _| 200);
        let frame = PixelBuffer::new(2, 2, &data).unwrap();
        let metrics = analyze_texture(&frame);

        assert_eq!(metrics.uniformity, 0.0);
        assert!(metrics.histogram.iter().all(|&c| c == 0));
    }
}
