// THEORY:
// The `matcher` is the decision layer: a pure function from one extracted
// `FeatureDescriptor` and one `PlantDatabase` to a ranked list of
// `MatchResult`s. It holds no state, performs no I/O and draws no
// randomness, so the same inputs always produce the same ranking.
//
// Key architectural principles:
// 1.  **Weighted Factors**: each candidate is scored on four independent
//     factors. Color overlap carries the most weight because color survives
//     bad framing and focus better than any structural cue; leaf details
//     carry the least because they sit furthest downstream of noisy
//     heuristics.
// 2.  **Fixed Normalization**: the factor total is divided by the fixed
//     maximum achievable score, so confidences are comparable across frames
//     and databases.
// 3.  **Floor & Boosts**: any candidate that is scored at all gets at least
//     the floor confidence; agreeing blooms and shared foliage greens earn
//     small additive boosts on top of the normalized score.
// 4.  **Deterministic Ties**: sorting is stable and candidates enter in
//     database order, so equal confidences rank by insertion order.
// 5.  **Cue-Based Defaults**: when nothing clears the confidence bar, the
//     ranker can substitute a single default drawn from the strongest single
//     cue (bloom color, bloom presence, foliage). The substitution is
//     config-switchable and never outranks a real match.

use crate::core_modules::feature_aggregator::FeatureDescriptor;
use crate::core_modules::plant_database::{PlantDatabase, PlantDescriptor};
use crate::core_modules::vocabulary::{ColorLabel, PlantCategory};
use crate::pipeline::PipelineConfig;
use log::debug;
use serde::Serialize;
use std::cmp::Ordering;

const COLOR_WEIGHT: f64 = 4.0;
const FLOWER_WEIGHT: f64 = 3.0;
const STRUCTURE_WEIGHT: f64 = 2.0;
const LEAF_WEIGHT: f64 = 1.5;
const MAX_FACTOR_SCORE: f64 = COLOR_WEIGHT + FLOWER_WEIGHT + STRUCTURE_WEIGHT + LEAF_WEIGHT;

/// Descriptors below this quality produce no matches at all.
pub const MIN_QUALITY: f64 = 0.1;
/// Scored candidates never fall below this confidence.
const CONFIDENCE_FLOOR: f64 = 0.35;
/// Additive boost when both sides flower in an agreeing color.
const FLOWER_MATCH_BOOST: f64 = 0.10;
/// Additive boost when a green-family dominant color appears in the
/// candidate's foliage.
const GREEN_FAMILY_BOOST: f64 = 0.05;
/// Confidence assigned to a cue-based default.
const FALLBACK_CONFIDENCE: f64 = 0.40;
/// Green share above which the foliage cue may pick a default.
const GREEN_CUE_SHARE: f64 = 0.10;

/// One ranked recognition candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub plant: PlantDescriptor,
    /// Overall confidence in `[0, 1]`.
    pub confidence: f64,
    /// Short factor notes explaining the score, strongest first.
    pub reasons: Vec<String>,
}

/// Ranks the database against an extracted descriptor.
///
/// Returns at most `config.max_matches` results sorted by descending
/// confidence, breaking ties by database insertion order. Low-quality
/// descriptors short-circuit to an empty list.
pub fn rank(
    descriptor: &FeatureDescriptor,
    database: &PlantDatabase,
    config: &PipelineConfig,
) -> Vec<MatchResult> {
    if descriptor.quality < MIN_QUALITY {
        debug!(
            "Matcher: quality {:.2} below gate, no candidates scored",
            descriptor.quality
        );
        return Vec::new();
    }

    let mut results: Vec<MatchResult> = database
        .iter()
        .map(|plant| score_candidate(descriptor, plant))
        .filter(|m| m.confidence >= config.min_match_confidence)
        .collect();

    // Stable sort; candidates entered in database order.
    results.sort_by(|a, b| b.confidence.partial_cmp(&a.confidence).unwrap_or(Ordering::Equal));
    results.truncate(config.max_matches);

    if results.is_empty() && config.smart_defaults {
        debug!("Matcher: no candidate cleared {:.2}, using cue defaults", config.min_match_confidence);
        return smart_defaults(descriptor, database);
    }

    debug!("Matcher: {} candidates ranked", results.len());
    results
}

fn score_candidate(descriptor: &FeatureDescriptor, plant: &PlantDescriptor) -> MatchResult {
    let mut reasons = Vec::new();

    // --- 1. Color Overlap ---
    let overlap = descriptor
        .dominant_colors
        .iter()
        .filter(|c| plant.leaf_colors.contains(c) || plant.stem_colors.contains(c))
        .count();
    let color_factor = overlap as f64 / descriptor.dominant_colors.len().max(1) as f64;
    if color_factor >= 0.5 {
        reasons.push("dominant colors match the foliage".to_string());
    }

    // --- 2. Flower Agreement ---
    let flags_agree = descriptor.has_flowers == plant.has_flowers;
    let flower_color_match = descriptor.has_flowers
        && plant.has_flowers
        && descriptor
            .flower_colors
            .iter()
            .any(|c| plant.flower_colors.contains(c));
    let mut flower_factor = 0.0;
    if flags_agree {
        flower_factor += 0.4;
    }
    if flower_color_match {
        flower_factor += 0.6;
        reasons.push("flower colors agree".to_string());
    }

    // --- 3. Structure ---
    let mut structure_factor = 0.0;
    if descriptor.stem_type == plant.stem_type {
        structure_factor += 0.5;
        reasons.push("stem type matches".to_string());
    }
    if descriptor.growth_pattern == plant.growth_pattern {
        structure_factor += 0.5;
        reasons.push("growth habit matches".to_string());
    }

    // --- 4. Leaf Agreement ---
    let mut leaf_factor = 0.0;
    if descriptor.leaf_shape == plant.leaf_shape {
        leaf_factor += 0.4;
        reasons.push("leaf shape matches".to_string());
    }
    if descriptor.leaf_margin == plant.leaf_margin {
        leaf_factor += 0.2;
    }
    if descriptor.leaf_texture == plant.leaf_texture {
        leaf_factor += 0.2;
    }
    if descriptor.leaf_size == plant.leaf_size {
        leaf_factor += 0.2;
    }

    let raw = COLOR_WEIGHT * color_factor
        + FLOWER_WEIGHT * flower_factor
        + STRUCTURE_WEIGHT * structure_factor
        + LEAF_WEIGHT * leaf_factor;
    let mut confidence = raw / MAX_FACTOR_SCORE;

    if flower_color_match {
        confidence += FLOWER_MATCH_BOOST;
    }
    let shares_green = descriptor
        .dominant_colors
        .iter()
        .any(|c| c.is_green_family() && plant.leaf_colors.contains(c));
    if shares_green {
        confidence += GREEN_FAMILY_BOOST;
    }

    let confidence = confidence.max(CONFIDENCE_FLOOR).min(1.0);
    reasons.truncate(3);

    MatchResult {
        plant: plant.clone(),
        confidence,
        reasons,
    }
}

/// Picks one default candidate from the strongest single cue.
fn smart_defaults(descriptor: &FeatureDescriptor, database: &PlantDatabase) -> Vec<MatchResult> {
    let warm_bloom = descriptor
        .flower_colors
        .iter()
        .any(|c| matches!(c, ColorLabel::Yellow | ColorLabel::Orange));

    let (plant, cue) = if warm_bloom {
        let pick = database.iter().find(|p| {
            p.flower_colors.contains(&ColorLabel::Yellow)
                || p.flower_colors.contains(&ColorLabel::Orange)
        });
        (pick, "defaulted from a warm bloom cue")
    } else if descriptor.has_flowers {
        (
            database.iter().find(|p| p.has_flowers),
            "defaulted from a bloom cue",
        )
    } else if descriptor.green_share >= GREEN_CUE_SHARE {
        (
            database.iter().find(|p| p.category == PlantCategory::Herb),
            "defaulted from a foliage cue",
        )
    } else {
        (None, "defaulted from database order")
    };

    let plant = match plant.or_else(|| database.iter().next()) {
        Some(p) => p.clone(),
        None => return Vec::new(),
    };

    vec![MatchResult {
        plant,
        confidence: FALLBACK_CONFIDENCE,
        reasons: vec!["fallback".to_string(), cue.to_string()],
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::vocabulary::{
        GrowthPattern, LeafMargin, LeafShape, LeafSize, LeafTexture, PlantCategory, PlantHeight,
        StemType,
    };

    fn foliage_descriptor() -> FeatureDescriptor {
        FeatureDescriptor {
            dominant_colors: vec![ColorLabel::Green],
            has_flowers: false,
            flower_colors: vec![],
            leaf_shape: LeafShape::Oval,
            leaf_margin: LeafMargin::Entire,
            leaf_texture: LeafTexture::Glossy,
            leaf_size: LeafSize::Small,
            plant_height: PlantHeight::Low,
            growth_pattern: GrowthPattern::Upright,
            stem_type: StemType::Herbaceous,
            green_share: 0.9,
            edge_density: 0.05,
            shape_complexity: 5.0,
            confidence: 0.8,
            quality: 0.6,
        }
    }

    fn config_with(min_confidence: f64, smart_defaults: bool) -> PipelineConfig {
        PipelineConfig {
            min_match_confidence: min_confidence,
            smart_defaults,
            ..PipelineConfig::default()
        }
    }

    #[test]
    fn perfect_foliage_match_scores_near_the_top() {
        let descriptor = foliage_descriptor();
        let db = PlantDatabase::builtin();
        let results = rank(&descriptor, &db, &PipelineConfig::default());

        assert!(!results.is_empty());
        // Basil shares every scored attribute except bloom color.
        assert_eq!(results[0].plant.id, "basil");
        assert!(results[0].confidence > 0.85);
        assert!(
            results[0]
                .reasons
                .contains(&"dominant colors match the foliage".to_string())
        );
        assert!(results[0].reasons.len() <= 3);
    }

    #[test]
    fn confidences_are_bounded_and_sorted() {
        let descriptor = foliage_descriptor();
        let db = PlantDatabase::builtin();
        let results = rank(&descriptor, &db, &config_with(0.0, true));

        assert!(!results.is_empty());
        for result in &results {
            assert!(result.confidence >= CONFIDENCE_FLOOR);
            assert!(result.confidence <= 1.0);
        }
        for pair in results.windows(2) {
            assert!(pair[0].confidence >= pair[1].confidence);
        }
    }

    #[test]
    fn ranking_is_idempotent() {
        let descriptor = foliage_descriptor();
        let db = PlantDatabase::builtin();
        let config = PipelineConfig::default();

        let first = rank(&descriptor, &db, &config);
        let second = rank(&descriptor, &db, &config);
        assert_eq!(first, second);
    }

    #[test]
    fn equal_scores_keep_database_order() {
        let template = PlantDatabase::builtin().plants()[0].clone();
        let mut twin_a = template.clone();
        twin_a.id = "twin-a".into();
        let mut twin_b = template;
        twin_b.id = "twin-b".into();
        let db = PlantDatabase::new("twins".into(), vec![twin_a, twin_b]).unwrap();

        let results = rank(&foliage_descriptor(), &db, &config_with(0.0, false));
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].confidence, results[1].confidence);
        assert_eq!(results[0].plant.id, "twin-a");
        assert_eq!(results[1].plant.id, "twin-b");
    }

    #[test]
    fn low_quality_descriptors_match_nothing() {
        let mut descriptor = foliage_descriptor();
        descriptor.quality = 0.05;
        let db = PlantDatabase::builtin();

        let results = rank(&descriptor, &db, &config_with(0.45, true));
        assert!(results.is_empty());
    }

    #[test]
    fn warm_bloom_cue_drives_the_default() {
        let mut descriptor = foliage_descriptor();
        descriptor.dominant_colors = vec![ColorLabel::Yellow];
        descriptor.has_flowers = true;
        descriptor.flower_colors = vec![ColorLabel::Yellow];
        descriptor.green_share = 0.0;
        let db = PlantDatabase::builtin();

        let results = rank(&descriptor, &db, &config_with(0.99, true));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].plant.id, "sunflower");
        assert!((results[0].confidence - FALLBACK_CONFIDENCE).abs() < 1e-9);
        assert_eq!(results[0].reasons[0], "fallback");
    }

    #[test]
    fn foliage_cue_defaults_to_a_herb() {
        let mut descriptor = foliage_descriptor();
        descriptor.dominant_colors = vec![ColorLabel::Blue];
        descriptor.green_share = 0.4;
        let db = PlantDatabase::builtin();

        let results = rank(&descriptor, &db, &config_with(0.99, true));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].plant.category, PlantCategory::Herb);
    }

    #[test]
    fn defaults_can_be_switched_off() {
        let mut descriptor = foliage_descriptor();
        descriptor.dominant_colors = vec![ColorLabel::Blue];
        descriptor.green_share = 0.0;
        let db = PlantDatabase::builtin();

        let results = rank(&descriptor, &db, &config_with(0.99, false));
        assert!(results.is_empty());
    }

    #[test]
    fn result_count_respects_the_configured_cap() {
        let descriptor = foliage_descriptor();
        let db = PlantDatabase::builtin();
        let results = rank(&descriptor, &db, &config_with(0.0, false));

        assert_eq!(results.len(), PipelineConfig::default().max_matches);
    }
}
