// THEORY:
// The `color_clusterizer` is the first analysis stage. It reduces the frame's
// millions of colors to a handful of weighted representatives using k-means
// in RGB space, and those representatives drive everything color-related
// downstream (dominant colors, bloom detection, stem inference, quality).
//
// Key architectural principles:
// 1.  **Stride Sampling**: clustering every pixel of a frame buys nothing
//     over clustering a regular subsample. Sampling every Nth pixel in both
//     axes keeps the stage linear in the sample count, not the frame size.
// 2.  **Seeded Determinism**: centroid initialization draws from an explicit
//     `StdRng::seed_from_u64` seed carried in the config. The same frame and
//     config always produce the same clusters, which makes reports
//     reproducible and the stage testable.
// 3.  **Fixed Iteration Budget**: Lloyd's algorithm runs a fixed number of
//     rounds instead of iterating to convergence. The downstream thresholds
//     only need stable coarse structure, and a fixed budget keeps the stage's
//     cost predictable.
// 4.  **Stateless Utility**: like the other stages, this is a free function
//     over its inputs. It has no memory between frames.

use crate::core_modules::pixel_buffer::PixelBuffer;
use crate::core_modules::vocabulary::ColorLabel;
use crate::pipeline::PipelineConfig;
use rand::prelude::*;
use std::cmp::Ordering;

/// One weighted color found in the frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorCluster {
    /// Centroid in RGB space, each channel in `[0, 255]`.
    pub center: [f64; 3],
    /// Share of sampled pixels assigned to this centroid, in `[0, 1]`.
    pub weight: f64,
    /// Name of the centroid color.
    pub label: ColorLabel,
}

impl ColorCluster {
    /// Saturation of the centroid color, in `[0, 100]`.
    pub fn saturation(&self) -> f64 {
        let pixel = crate::core_modules::pixel::Pixel::new(
            self.center[0].round().clamp(0.0, 255.0) as u8,
            self.center[1].round().clamp(0.0, 255.0) as u8,
            self.center[2].round().clamp(0.0, 255.0) as u8,
            255,
        );
        pixel.to_hsv().1
    }
}

/// Clusters the frame's colors. Returns clusters sorted by weight,
/// heaviest first; zero-weight centroids are dropped. An empty sample set
/// (degenerate frame) yields an empty vec.
pub fn find_clusters(frame: &PixelBuffer, config: &PipelineConfig) -> Vec<ColorCluster> {
    // --- 1. Stride Sampling ---
    let stride = config.sample_stride.max(1);
    let mut samples: Vec<[f64; 3]> = Vec::new();
    let mut y = 0;
    while y < frame.height() {
        let mut x = 0;
        while x < frame.width() {
            let pixel = frame.pixel(x, y);
            samples.push([pixel.red as f64, pixel.green as f64, pixel.blue as f64]);
            x += stride;
        }
        y += stride;
    }
    if samples.is_empty() {
        return Vec::new();
    }

    // --- 2. Seeded Initialization ---
    let k = config.cluster_count.max(1);
    let mut rng = StdRng::seed_from_u64(config.kmeans_seed);
    let mut centroids: Vec<[f64; 3]> = (0..k)
        .map(|_| samples[rng.gen_range(0..samples.len())])
        .collect();

    // --- 3. Lloyd Iterations ---
    let mut assignments = vec![0usize; samples.len()];
    for _ in 0..config.kmeans_iterations {
        for (i, sample) in samples.iter().enumerate() {
            assignments[i] = nearest_centroid(&centroids, sample);
        }

        let mut sums = vec![[0.0f64; 3]; k];
        let mut counts = vec![0usize; k];
        for (i, sample) in samples.iter().enumerate() {
            let c = assignments[i];
            sums[c][0] += sample[0];
            sums[c][1] += sample[1];
            sums[c][2] += sample[2];
            counts[c] += 1;
        }
        for c in 0..k {
            // A centroid that attracted no samples keeps its position.
            if counts[c] > 0 {
                let n = counts[c] as f64;
                centroids[c] = [sums[c][0] / n, sums[c][1] / n, sums[c][2] / n];
            }
        }
    }

    // Final assignment pass so weights reflect the updated centroids.
    let mut counts = vec![0usize; k];
    for sample in samples.iter() {
        counts[nearest_centroid(&centroids, sample)] += 1;
    }

    // --- 4. Weighting & Labeling ---
    let total = samples.len() as f64;
    let mut clusters: Vec<ColorCluster> = centroids
        .iter()
        .zip(counts.iter())
        .filter(|&(_, &count)| count > 0)
        .map(|(center, &count)| {
            let label = ColorLabel::classify(
                center[0].round().clamp(0.0, 255.0) as u8,
                center[1].round().clamp(0.0, 255.0) as u8,
                center[2].round().clamp(0.0, 255.0) as u8,
            );
            ColorCluster {
                center: *center,
                weight: count as f64 / total,
                label,
            }
        })
        .collect();

    // Stable sort keeps centroid order for equal weights.
    clusters.sort_by(|a, b| b.weight.partial_cmp(&a.weight).unwrap_or(Ordering::Equal));
    clusters
}

/// Index of the closest centroid by squared distance; ties go to the lowest
/// index.
fn nearest_centroid(centroids: &[[f64; 3]], sample: &[f64; 3]) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (i, centroid) in centroids.iter().enumerate() {
        let dr = centroid[0] - sample[0];
        let dg = centroid[1] - sample[1];
        let db = centroid[2] - sample[2];
        let dist = dr * dr + dg * dg + db * db;
        if dist < best_dist {
            best_dist = dist;
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::pixel::CHANNELS;

    fn solid_frame(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
        let mut data = Vec::with_capacity(width as usize * height as usize * CHANNELS);
        for _ in 0..width * height {
            data.extend_from_slice(&[rgb[0], rgb[1], rgb[2], 255]);
        }
        data
    }

    fn split_frame(width: u32, height: u32, top: [u8; 3], bottom: [u8; 3]) -> Vec<u8> {
        let mut data = Vec::with_capacity(width as usize * height as usize * CHANNELS);
        for y in 0..height {
            let rgb = if y < height / 2 { top } else { bottom };
            for _ in 0..width {
                data.extend_from_slice(&[rgb[0], rgb[1], rgb[2], 255]);
            }
        }
        data
    }

    #[test]
    fn uniform_frame_collapses_to_one_cluster() {
        let data = solid_frame(64, 64, [34, 139, 34]);
        let frame = PixelBuffer::new(64, 64, &data).unwrap();
        let clusters = find_clusters(&frame, &PipelineConfig::default());

        assert_eq!(clusters.len(), 1);
        assert!((clusters[0].weight - 1.0).abs() < 1e-9);
        assert_eq!(clusters[0].label, ColorLabel::Green);
    }

    #[test]
    fn two_tone_frame_finds_both_colors() {
        let data = split_frame(64, 64, [255, 255, 0], [34, 139, 34]);
        let frame = PixelBuffer::new(64, 64, &data).unwrap();
        let clusters = find_clusters(&frame, &PipelineConfig::default());

        let labels: Vec<ColorLabel> = clusters.iter().map(|c| c.label).collect();
        assert!(labels.contains(&ColorLabel::Yellow));
        assert!(labels.contains(&ColorLabel::Green));

        let total: f64 = clusters.iter().map(|c| c.weight).sum();
        assert!((total - 1.0).abs() < 1e-9);
        for pair in clusters.windows(2) {
            assert!(pair[0].weight >= pair[1].weight);
        }
    }

    #[test]
    fn same_seed_is_deterministic() {
        let data = split_frame(48, 48, [200, 30, 40], [20, 120, 30]);
        let frame = PixelBuffer::new(48, 48, &data).unwrap();
        let config = PipelineConfig::default();

        let first = find_clusters(&frame, &config);
        let second = find_clusters(&frame, &config);
        assert_eq!(first, second);
    }

    #[test]
    fn empty_frame_yields_no_clusters() {
        let frame = PixelBuffer::new(0, 0, &[]).unwrap();
        assert!(find_clusters(&frame, &PipelineConfig::default()).is_empty());
    }

    #[test]
    fn fewer_samples_than_centroids_drops_empty_ones() {
        let data = solid_frame(2, 2, [10, 10, 200]);
        let frame = PixelBuffer::new(2, 2, &data).unwrap();
        // Stride 4 leaves a single sample for five requested centroids.
        let clusters = find_clusters(&frame, &PipelineConfig::default());

        assert_eq!(clusters.len(), 1);
        assert!((clusters[0].weight - 1.0).abs() < 1e-9);
    }
}
