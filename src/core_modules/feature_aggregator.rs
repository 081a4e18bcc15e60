// THEORY:
// The `feature_aggregator` is the fusion layer. The stages below it each
// answer one narrow question (what colors, how busy, what regions, what
// surface); this module combines their numbers into a single categorical
// `FeatureDescriptor` that the matcher can compare against reference plants.
//
// Key architectural principles:
// 1.  **Ordered Rule Tables**: every categorical decision (leaf shape,
//     margin, texture, growth pattern, stem type) is a const table of rows
//     scanned top to bottom, first match wins. The tables ARE the behavior;
//     tuning a decision means editing a row, not re-nesting conditionals.
//     Each table ends in a catch-all row.
// 2.  **Graceful Degradation**: missing evidence lowers scores instead of
//     raising errors. An empty cluster list, a zero-contour frame or a flat
//     texture all flow through and surface as low confidence and quality.
// 3.  **Two Meta-Scores**: `confidence` says how much evidence the stages
//     produced; `quality` says how plant-like the frame looks. The matcher
//     gates on quality, callers gate on confidence.

use crate::core_modules::color_clusterizer::ColorCluster;
use crate::core_modules::contour_tracer::ShapeMetrics;
use crate::core_modules::edge_detector::EdgeMap;
use crate::core_modules::texture_analyzer::TextureMetrics;
use crate::core_modules::vocabulary::{
    ColorLabel, GrowthPattern, LeafMargin, LeafShape, LeafSize, LeafTexture, PlantHeight,
    StemType,
};
use serde::{Deserialize, Serialize};

/// Clusters lighter than this never become dominant colors.
const MIN_DOMINANT_WEIGHT: f64 = 0.05;
/// At most this many dominant colors are kept.
const MAX_DOMINANT_COLORS: usize = 3;
/// Minimum cluster weight for a bloom signal.
const FLOWER_MIN_WEIGHT: f64 = 0.08;
/// White needs a higher bar; washed-out backgrounds read as white.
const WHITE_FLOWER_MIN_WEIGHT: f64 = 0.15;
/// Minimum centroid saturation for a non-white bloom signal.
const FLOWER_MIN_SATURATION: f64 = 25.0;
/// Green share at which the frame counts as containing foliage.
const GREEN_PRESENCE_SHARE: f64 = 0.10;
/// Quality never drops below this when foliage is present.
const GREEN_QUALITY_FLOOR: f64 = 0.25;

// Confidence contributions per evidence signal.
const CONFIDENCE_CLUSTERS: f64 = 0.3;
const CONFIDENCE_CONTOURS: f64 = 0.2;
const CONFIDENCE_EDGE_BAND: f64 = 0.2;
const CONFIDENCE_TEXTURE: f64 = 0.15;
const CONFIDENCE_GREEN: f64 = 0.15;
/// Edge densities inside this band look organic; outside it, the frame is
/// either featureless or noise.
const PLAUSIBLE_EDGE_BAND: (f64, f64) = (0.01, 0.6);

// Quality term weights.
const QUALITY_GREEN: f64 = 0.45;
const QUALITY_EDGES: f64 = 0.25;
const QUALITY_VARIETY: f64 = 0.15;
const QUALITY_CONTOURS: f64 = 0.15;
const QUALITY_EDGE_SCALE: f64 = 0.15;
const QUALITY_CONTOUR_SCALE: f64 = 6.0;

/// One row of an ordered decision table over two measurements. Bounds are
/// half-open `[lo, hi)`.
struct Rule2<T: Copy> {
    lo_a: f64,
    hi_a: f64,
    lo_b: f64,
    hi_b: f64,
    label: T,
}

impl<T: Copy> Rule2<T> {
    const fn new(lo_a: f64, hi_a: f64, lo_b: f64, hi_b: f64, label: T) -> Self {
        Self {
            lo_a,
            hi_a,
            lo_b,
            hi_b,
            label,
        }
    }

    fn matches(&self, a: f64, b: f64) -> bool {
        a >= self.lo_a && a < self.hi_a && b >= self.lo_b && b < self.hi_b
    }
}

fn first_match<T: Copy>(rules: &[Rule2<T>], a: f64, b: f64) -> T {
    for rule in rules {
        if rule.matches(a, b) {
            return rule.label;
        }
    }
    // The final row of every table is a catch-all.
    rules[rules.len() - 1].label
}

const INF: f64 = f64::INFINITY;

/// Leaf shape over (edge density, mean contour complexity).
const LEAF_SHAPE_RULES: [Rule2<LeafShape>; 7] = [
    Rule2::new(0.25, INF, 0.0, INF, LeafShape::Compound),
    Rule2::new(0.0, INF, 35.0, INF, LeafShape::Linear),
    Rule2::new(0.0, INF, 18.0, INF, LeafShape::Lobed),
    Rule2::new(0.12, INF, 0.0, INF, LeafShape::Lanceolate),
    Rule2::new(0.0, 0.03, 0.0, 8.0, LeafShape::Round),
    Rule2::new(0.0, INF, 0.0, 12.0, LeafShape::Oval),
    Rule2::new(0.0, INF, 0.0, INF, LeafShape::Lanceolate),
];

/// Leaf margin over (edge density, mean contour complexity).
const LEAF_MARGIN_RULES: [Rule2<LeafMargin>; 4] = [
    Rule2::new(0.0, INF, 28.0, INF, LeafMargin::Serrate),
    Rule2::new(0.0, 0.05, 0.0, INF, LeafMargin::Entire),
    Rule2::new(0.20, INF, 0.0, INF, LeafMargin::Dentate),
    Rule2::new(0.0, INF, 0.0, INF, LeafMargin::Undulate),
];

/// Growth pattern over (edge density, green share).
const GROWTH_RULES: [Rule2<GrowthPattern>; 5] = [
    Rule2::new(0.22, INF, 0.5, INF, GrowthPattern::Bushy),
    Rule2::new(0.22, INF, 0.0, INF, GrowthPattern::Climbing),
    Rule2::new(0.0, INF, 0.6, INF, GrowthPattern::Upright),
    Rule2::new(0.0, INF, 0.3, INF, GrowthPattern::Trailing),
    Rule2::new(0.0, INF, 0.0, INF, GrowthPattern::Rosette),
];

/// One row of the leaf texture table, over LBP uniformity and, when
/// `flat_pattern_only` is set, a flat dominant code (0x00 or 0xFF).
struct TextureRule {
    min_uniformity: f64,
    flat_pattern_only: bool,
    label: LeafTexture,
}

const LEAF_TEXTURE_RULES: [TextureRule; 5] = [
    TextureRule { min_uniformity: 0.30, flat_pattern_only: true, label: LeafTexture::Smooth },
    TextureRule { min_uniformity: 0.30, flat_pattern_only: false, label: LeafTexture::Glossy },
    TextureRule { min_uniformity: 0.15, flat_pattern_only: false, label: LeafTexture::Veined },
    TextureRule { min_uniformity: 0.08, flat_pattern_only: false, label: LeafTexture::Rough },
    TextureRule { min_uniformity: 0.0, flat_pattern_only: false, label: LeafTexture::Fuzzy },
];

/// One row of the stem table; every minimum must hold.
struct StemRule {
    min_brown: f64,
    min_green: f64,
    min_uniformity: f64,
    min_density: f64,
    label: StemType,
}

const STEM_RULES: [StemRule; 4] = [
    StemRule { min_brown: 0.15, min_green: 0.0, min_uniformity: 0.0, min_density: 0.0, label: StemType::Woody },
    StemRule { min_brown: 0.0, min_green: 0.4, min_uniformity: 0.30, min_density: 0.0, label: StemType::Succulent },
    StemRule { min_brown: 0.0, min_green: 0.3, min_uniformity: 0.0, min_density: 0.25, label: StemType::Vine },
    StemRule { min_brown: 0.0, min_green: 0.0, min_uniformity: 0.0, min_density: 0.0, label: StemType::Herbaceous },
];

/// Leaf size thresholds over mean contour point count, largest first.
const LEAF_SIZE_RULES: [(f64, LeafSize); 4] = [
    (600.0, LeafSize::Large),
    (250.0, LeafSize::Medium),
    (60.0, LeafSize::Small),
    (0.0, LeafSize::Tiny),
];

/// Plant height thresholds over the analyzed frame height, tallest first.
const PLANT_HEIGHT_RULES: [(f64, PlantHeight); 3] = [
    (700.0, PlantHeight::Tall),
    (300.0, PlantHeight::Medium),
    (0.0, PlantHeight::Low),
];

/// Everything the pipeline extracted from one frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureDescriptor {
    /// Up to three cluster labels by weight, deduplicated.
    pub dominant_colors: Vec<ColorLabel>,
    pub has_flowers: bool,
    pub flower_colors: Vec<ColorLabel>,
    pub leaf_shape: LeafShape,
    pub leaf_margin: LeafMargin,
    pub leaf_texture: LeafTexture,
    pub leaf_size: LeafSize,
    pub plant_height: PlantHeight,
    pub growth_pattern: GrowthPattern,
    pub stem_type: StemType,
    /// Combined weight of green-family clusters, in `[0, 1]`.
    pub green_share: f64,
    pub edge_density: f64,
    pub shape_complexity: f64,
    /// How much evidence the stages produced, in `[0, 1]`.
    pub confidence: f64,
    /// How plant-like the frame looks, in `[0, 1]`.
    pub quality: f64,
}

/// Fuses the stage outputs into a descriptor. A frame with no samples at
/// all comes out as the all-default descriptor with zero confidence and
/// quality.
pub fn aggregate(
    clusters: &[ColorCluster],
    shape: &ShapeMetrics,
    edges: &EdgeMap,
    texture: &TextureMetrics,
    frame_height: u32,
) -> FeatureDescriptor {
    if clusters.is_empty() && (edges.width == 0 || edges.height == 0) {
        return FeatureDescriptor::default();
    }

    // --- 1. Color Evidence ---
    let mut dominant_colors: Vec<ColorLabel> = Vec::new();
    for cluster in clusters {
        if cluster.weight < MIN_DOMINANT_WEIGHT {
            continue;
        }
        if !dominant_colors.contains(&cluster.label) {
            dominant_colors.push(cluster.label);
        }
        if dominant_colors.len() == MAX_DOMINANT_COLORS {
            break;
        }
    }

    let green_share: f64 = clusters
        .iter()
        .filter(|c| c.label.is_green_family())
        .map(|c| c.weight)
        .sum();
    let brown_share: f64 = clusters
        .iter()
        .filter(|c| c.label == ColorLabel::Brown)
        .map(|c| c.weight)
        .sum();

    // --- 2. Bloom Detection ---
    let mut flower_colors: Vec<ColorLabel> = Vec::new();
    for cluster in clusters {
        if !cluster.label.is_flower_color() {
            continue;
        }
        let is_signal = if cluster.label == ColorLabel::White {
            cluster.weight >= WHITE_FLOWER_MIN_WEIGHT
        } else {
            cluster.weight >= FLOWER_MIN_WEIGHT
                && cluster.saturation() >= FLOWER_MIN_SATURATION
        };
        if is_signal && !flower_colors.contains(&cluster.label) {
            flower_colors.push(cluster.label);
        }
    }
    let has_flowers = !flower_colors.is_empty();

    // --- 3. Categorical Tables ---
    let density = edges.density;
    let complexity = shape.mean_complexity;
    let leaf_shape = first_match(&LEAF_SHAPE_RULES, density, complexity);
    let leaf_margin = first_match(&LEAF_MARGIN_RULES, density, complexity);
    let growth_pattern = first_match(&GROWTH_RULES, density, green_share);
    let leaf_texture = texture_label(texture);
    let stem_type = stem_label(brown_share, green_share, texture.uniformity, density);
    let leaf_size = leaf_size_label(shape);
    let plant_height = threshold_label(&PLANT_HEIGHT_RULES, frame_height as f64);

    // --- 4. Meta-Scores ---
    let mut confidence = 0.0;
    if !clusters.is_empty() {
        confidence += CONFIDENCE_CLUSTERS;
    }
    if shape.contour_count > 0 {
        confidence += CONFIDENCE_CONTOURS;
    }
    if density >= PLAUSIBLE_EDGE_BAND.0 && density <= PLAUSIBLE_EDGE_BAND.1 {
        confidence += CONFIDENCE_EDGE_BAND;
    }
    if texture.uniformity >= 0.05 {
        confidence += CONFIDENCE_TEXTURE;
    }
    if green_share >= GREEN_PRESENCE_SHARE {
        confidence += CONFIDENCE_GREEN;
    }
    let confidence = confidence.clamp(0.0, 1.0);

    let variety = if dominant_colors.len() >= 2 { 1.0 } else { 0.0 };
    let mut quality = QUALITY_GREEN * (green_share * 1.5).min(1.0)
        + QUALITY_EDGES * (density / QUALITY_EDGE_SCALE).min(1.0)
        + QUALITY_VARIETY * variety
        + QUALITY_CONTOURS * (shape.contour_count as f64 / QUALITY_CONTOUR_SCALE).min(1.0);
    if green_share >= GREEN_PRESENCE_SHARE {
        quality = quality.max(GREEN_QUALITY_FLOOR);
    }
    let quality = quality.clamp(0.0, 1.0);

    FeatureDescriptor {
        dominant_colors,
        has_flowers,
        flower_colors,
        leaf_shape,
        leaf_margin,
        leaf_texture,
        leaf_size,
        plant_height,
        growth_pattern,
        stem_type,
        green_share,
        edge_density: density,
        shape_complexity: complexity,
        confidence,
        quality,
    }
}

fn texture_label(texture: &TextureMetrics) -> LeafTexture {
    let flat = texture.dominant_pattern == 0x00 || texture.dominant_pattern == 0xFF;
    for rule in &LEAF_TEXTURE_RULES {
        if texture.uniformity >= rule.min_uniformity && (!rule.flat_pattern_only || flat) {
            return rule.label;
        }
    }
    LeafTexture::Fuzzy
}

fn stem_label(brown: f64, green: f64, uniformity: f64, density: f64) -> StemType {
    for rule in &STEM_RULES {
        if brown >= rule.min_brown
            && green >= rule.min_green
            && uniformity >= rule.min_uniformity
            && density >= rule.min_density
        {
            return rule.label;
        }
    }
    StemType::Herbaceous
}

fn leaf_size_label(shape: &ShapeMetrics) -> LeafSize {
    if shape.contour_count == 0 {
        return LeafSize::Medium;
    }
    threshold_label(&LEAF_SIZE_RULES, shape.mean_size)
}

/// Scans a descending threshold table and returns the first label whose
/// threshold the value reaches.
fn threshold_label<T: Copy>(rules: &[(f64, T)], value: f64) -> T {
    for (threshold, label) in rules {
        if value >= *threshold {
            return *label;
        }
    }
    rules[rules.len() - 1].1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cluster(label: ColorLabel, center: [f64; 3], weight: f64) -> ColorCluster {
        ColorCluster {
            center,
            weight,
            label,
        }
    }

    fn flat_texture() -> TextureMetrics {
        let mut histogram = [0u32; 256];
        histogram[0xFF] = 100;
        TextureMetrics {
            histogram,
            uniformity: 1.0,
            dominant_pattern: 0xFF,
        }
    }

    fn edge_map(width: u32, height: u32, density: f64) -> EdgeMap {
        let total = width as usize * height as usize;
        EdgeMap {
            width,
            height,
            magnitudes: vec![0.0; total],
            strong: vec![false; total],
            density,
        }
    }

    #[test]
    fn uniform_green_frame_reads_as_smooth_foliage() {
        let clusters = vec![cluster(ColorLabel::Green, [34.0, 139.0, 34.0], 1.0)];
        let shape = ShapeMetrics::default();
        let edges = edge_map(400, 400, 0.0);
        let descriptor = aggregate(&clusters, &shape, &edges, &flat_texture(), 400);

        assert_eq!(descriptor.dominant_colors, vec![ColorLabel::Green]);
        assert!(!descriptor.has_flowers);
        assert_eq!(descriptor.leaf_shape, LeafShape::Round);
        assert_eq!(descriptor.leaf_margin, LeafMargin::Entire);
        assert_eq!(descriptor.leaf_texture, LeafTexture::Smooth);
        assert_eq!(descriptor.growth_pattern, GrowthPattern::Upright);
        assert_eq!(descriptor.stem_type, StemType::Succulent);
        assert_eq!(descriptor.plant_height, PlantHeight::Medium);
        assert!((descriptor.green_share - 1.0).abs() < 1e-9);
        assert!((descriptor.quality - 0.45).abs() < 1e-9);
        assert!((descriptor.confidence - 0.6).abs() < 1e-9);
    }

    #[test]
    fn saturated_yellow_cluster_is_a_bloom() {
        let clusters = vec![
            cluster(ColorLabel::Yellow, [255.0, 255.0, 0.0], 0.5),
            cluster(ColorLabel::Green, [34.0, 139.0, 34.0], 0.5),
        ];
        let shape = ShapeMetrics::default();
        let edges = edge_map(100, 100, 0.005);
        let descriptor = aggregate(&clusters, &shape, &edges, &flat_texture(), 100);

        assert!(descriptor.has_flowers);
        assert_eq!(descriptor.flower_colors, vec![ColorLabel::Yellow]);
    }

    #[test]
    fn white_needs_more_weight_to_count_as_bloom() {
        let faint = vec![
            cluster(ColorLabel::White, [250.0, 250.0, 250.0], 0.10),
            cluster(ColorLabel::Green, [34.0, 139.0, 34.0], 0.90),
        ];
        let edges = edge_map(100, 100, 0.0);
        let descriptor = aggregate(&faint, &ShapeMetrics::default(), &edges, &flat_texture(), 100);
        assert!(!descriptor.has_flowers);

        let heavy = vec![
            cluster(ColorLabel::White, [250.0, 250.0, 250.0], 0.20),
            cluster(ColorLabel::Green, [34.0, 139.0, 34.0], 0.80),
        ];
        let descriptor = aggregate(&heavy, &ShapeMetrics::default(), &edges, &flat_texture(), 100);
        assert!(descriptor.has_flowers);
        assert_eq!(descriptor.flower_colors, vec![ColorLabel::White]);
    }

    #[test]
    fn desaturated_warm_clusters_are_not_blooms() {
        // A heavy but washed-out reddish cluster, saturation below the bar.
        let clusters = vec![
            cluster(ColorLabel::Red, [150.0, 120.0, 120.0], 0.4),
            cluster(ColorLabel::Green, [34.0, 139.0, 34.0], 0.6),
        ];
        let edges = edge_map(100, 100, 0.0);
        let descriptor = aggregate(&clusters, &ShapeMetrics::default(), &edges, &flat_texture(), 100);

        assert!(!descriptor.has_flowers);
    }

    #[test]
    fn busy_edges_read_as_compound_foliage() {
        let clusters = vec![cluster(ColorLabel::Green, [34.0, 139.0, 34.0], 0.8)];
        let shape = ShapeMetrics {
            contour_count: 12,
            mean_size: 80.0,
            mean_complexity: 9.0,
            capped: false,
        };
        let edges = edge_map(200, 200, 0.3);
        let descriptor = aggregate(&clusters, &shape, &edges, &flat_texture(), 200);

        assert_eq!(descriptor.leaf_shape, LeafShape::Compound);
        assert_eq!(descriptor.leaf_margin, LeafMargin::Dentate);
        assert_eq!(descriptor.growth_pattern, GrowthPattern::Bushy);
        assert_eq!(descriptor.leaf_size, LeafSize::Small);
    }

    #[test]
    fn thin_strands_read_as_linear_leaves() {
        let clusters = vec![cluster(ColorLabel::Green, [40.0, 160.0, 40.0], 0.9)];
        let shape = ShapeMetrics {
            contour_count: 3,
            mean_size: 120.0,
            mean_complexity: 60.0,
            capped: false,
        };
        let edges = edge_map(200, 200, 0.04);
        let descriptor = aggregate(&clusters, &shape, &edges, &flat_texture(), 200);

        assert_eq!(descriptor.leaf_shape, LeafShape::Linear);
        assert_eq!(descriptor.leaf_margin, LeafMargin::Serrate);
    }

    #[test]
    fn woody_color_wins_the_stem_table() {
        let clusters = vec![
            cluster(ColorLabel::Brown, [120.0, 80.0, 40.0], 0.3),
            cluster(ColorLabel::Green, [34.0, 139.0, 34.0], 0.7),
        ];
        let edges = edge_map(100, 100, 0.05);
        let descriptor = aggregate(&clusters, &ShapeMetrics::default(), &edges, &flat_texture(), 100);

        assert_eq!(descriptor.stem_type, StemType::Woody);
    }

    #[test]
    fn black_frame_scores_zero_quality() {
        let clusters = vec![cluster(ColorLabel::Black, [0.0, 0.0, 0.0], 1.0)];
        let edges = edge_map(16, 16, 0.0);
        let descriptor = aggregate(&clusters, &ShapeMetrics::default(), &edges, &flat_texture(), 16);

        assert_eq!(descriptor.quality, 0.0);
        assert!(descriptor.confidence > 0.0);
        assert!(!descriptor.has_flowers);
    }

    #[test]
    fn green_presence_floors_the_quality() {
        // Barely any evidence beyond a sliver of foliage.
        let clusters = vec![
            cluster(ColorLabel::Gray, [120.0, 120.0, 120.0], 0.88),
            cluster(ColorLabel::Green, [34.0, 139.0, 34.0], 0.12),
        ];
        let edges = edge_map(64, 64, 0.0);
        let descriptor = aggregate(&clusters, &ShapeMetrics::default(), &edges, &flat_texture(), 64);

        assert!(descriptor.quality >= GREEN_QUALITY_FLOOR);
    }

    #[test]
    fn empty_input_is_the_default_descriptor() {
        let edges = edge_map(0, 0, 0.0);
        let descriptor = aggregate(&[], &ShapeMetrics::default(), &edges, &empty_texture(), 0);

        assert_eq!(descriptor, FeatureDescriptor::default());
        assert_eq!(descriptor.confidence, 0.0);
        assert_eq!(descriptor.quality, 0.0);
    }

    #[test]
    fn zero_width_or_height_input_is_still_the_default_descriptor() {
        // One zero axis means zero pixels; the rule tables must not run.
        let zero_width =
            aggregate(&[], &ShapeMetrics::default(), &edge_map(0, 5, 0.0), &empty_texture(), 5);
        assert_eq!(zero_width, FeatureDescriptor::default());

        let zero_height =
            aggregate(&[], &ShapeMetrics::default(), &edge_map(5, 0, 0.0), &empty_texture(), 0);
        assert_eq!(zero_height, FeatureDescriptor::default());
    }

    fn empty_texture() -> TextureMetrics {
        TextureMetrics {
            histogram: [0u32; 256],
            uniformity: 0.0,
            dominant_pattern: 0,
        }
    }

    #[test]
    fn plant_height_follows_the_analyzed_height() {
        let clusters = vec![cluster(ColorLabel::Green, [34.0, 139.0, 34.0], 1.0)];
        let edges = edge_map(100, 100, 0.0);
        let low = aggregate(&clusters, &ShapeMetrics::default(), &edges, &flat_texture(), 200);
        let tall = aggregate(&clusters, &ShapeMetrics::default(), &edges, &flat_texture(), 800);

        assert_eq!(low.plant_height, PlantHeight::Low);
        assert_eq!(tall.plant_height, PlantHeight::Tall);
    }
}
