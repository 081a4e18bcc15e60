// THEORY:
// The `contour_tracer` is the spatial grouping layer. It takes the boolean
// strong-edge mask from the edge detector and grows connected regions out of
// it, so the aggregator can reason about coherent structures ("a serrated
// leaf outline") instead of isolated hot pixels.
//
// Key architectural principles & algorithm steps:
// 1.  **Seed Scan**: the mask is scanned row-major; every strong pixel that
//     has not been visited yet seeds a new region.
// 2.  **Region Growing**: from each seed, an iterative stack-based flood
//     fill expands across the 8-connected strong neighbors. Visited marking
//     happens at push time, so no pixel is ever enqueued twice.
// 3.  **Growth Cap**: a region stops growing once it reaches the configured
//     maximum point count. Pixels already on the stack were marked visited
//     and are simply consumed, so a capped component never re-seeds from
//     them; pixels it never reached may still seed further (also capped)
//     regions.
// 4.  **Noise Filter**: regions below the configured minimum size are
//     discarded after tracing. Their pixels stay visited, so sensor noise
//     cannot seed the same speck twice.
// 5.  **Shape Summary**: each surviving region carries a perimeter (its
//     point count), a shoelace area over the visit-ordered points, and a
//     complexity ratio of the two. Thin strands have near-zero area and
//     therefore high complexity; compact blobs sit low.

use crate::core_modules::edge_detector::EdgeMap;
use crate::pipeline::PipelineConfig;
use log::trace;

const NEIGHBORS_8: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// One connected region of strong-edge pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    /// Member pixels in flood-fill visit order.
    pub points: Vec<(u32, u32)>,
    /// Absolute shoelace area over the visit-ordered points.
    pub area: f64,
    /// Point count.
    pub perimeter: f64,
    /// `perimeter / sqrt(max(area, 1))`.
    pub complexity: f64,
}

/// Aggregate shape statistics over all traced contours.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapeMetrics {
    pub contour_count: usize,
    /// Mean point count, 0.0 when no contours survived.
    pub mean_size: f64,
    /// Mean complexity, 0.0 when no contours survived.
    pub mean_complexity: f64,
    /// True when at least one region hit the growth cap.
    pub capped: bool,
}

/// Traces all connected strong-edge regions in the map.
pub fn trace_contours(edges: &EdgeMap, config: &PipelineConfig) -> (Vec<Contour>, ShapeMetrics) {
    let width = edges.width as usize;
    let height = edges.height as usize;

    let mut visited = vec![false; width * height];
    let mut contours: Vec<Contour> = Vec::new();
    let mut capped = false;

    for y in 0..height {
        for x in 0..width {
            let idx = y * width + x;
            if !edges.strong[idx] || visited[idx] {
                continue;
            }

            // --- Region Growing ---
            visited[idx] = true;
            let mut stack = vec![(x, y)];
            let mut points: Vec<(u32, u32)> = Vec::new();

            while let Some((cx, cy)) = stack.pop() {
                points.push((cx as u32, cy as u32));
                if points.len() >= config.max_contour_size {
                    capped = true;
                    break;
                }

                for (dx, dy) in NEIGHBORS_8 {
                    let nx = cx as i32 + dx;
                    let ny = cy as i32 + dy;
                    if nx < 0 || ny < 0 || nx >= width as i32 || ny >= height as i32 {
                        continue;
                    }
                    let nidx = ny as usize * width + nx as usize;
                    if edges.strong[nidx] && !visited[nidx] {
                        visited[nidx] = true;
                        stack.push((nx as usize, ny as usize));
                    }
                }
            }

            if points.len() < config.min_contour_size {
                continue;
            }

            let area = shoelace_area(&points);
            let perimeter = points.len() as f64;
            let complexity = perimeter / area.max(1.0).sqrt();
            trace!(
                "ContourTracer: region of {} points, area {:.1}, complexity {:.2}",
                points.len(),
                area,
                complexity
            );
            contours.push(Contour {
                points,
                area,
                perimeter,
                complexity,
            });
        }
    }

    let metrics = summarize(&contours, capped);
    (contours, metrics)
}

fn summarize(contours: &[Contour], capped: bool) -> ShapeMetrics {
    if contours.is_empty() {
        return ShapeMetrics {
            capped,
            ..ShapeMetrics::default()
        };
    }
    let count = contours.len() as f64;
    ShapeMetrics {
        contour_count: contours.len(),
        mean_size: contours.iter().map(|c| c.perimeter).sum::<f64>() / count,
        mean_complexity: contours.iter().map(|c| c.complexity).sum::<f64>() / count,
        capped,
    }
}

/// Absolute polygon area over the point sequence, closing back to the first
/// point. Fewer than three points span no area.
fn shoelace_area(points: &[(u32, u32)]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..points.len() {
        let (x1, y1) = points[i];
        let (x2, y2) = points[(i + 1) % points.len()];
        sum += x1 as f64 * y2 as f64 - x2 as f64 * y1 as f64;
    }
    (sum / 2.0).abs()
}
