// THEORY:
// The `plant_database` is the reference side of recognition: a versioned,
// ordered repository of `PlantDescriptor` records expressed in the same
// closed vocabulary the extractor emits. The matcher receives the repository
// as an explicit argument, so alternative databases (a test fixture, a
// region-specific set loaded from JSON) drop in without touching any global
// state.
//
// Ordering is part of the contract: when two candidates score identically,
// the ranker breaks the tie by database insertion order, so loading must
// preserve the order the records were authored in.

use crate::core_modules::vocabulary::{
    ColorLabel, FlowerShape, FlowerSize, GrowthPattern, LeafMargin, LeafShape, LeafSize,
    LeafTexture, PlantCategory, PlantHeight, StemType,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

/// Version tag of the compiled-in reference set.
pub const BUILTIN_VERSION: &str = "builtin-2026.08";

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("failed to read plant database: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse plant database: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("plant database contains no entries")]
    Empty,
    #[error("duplicate plant id `{0}`")]
    DuplicateId(String),
}

/// One reference plant, fully described in the shared vocabulary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantDescriptor {
    pub id: String,
    pub common_name: String,
    pub scientific_name: String,
    pub category: PlantCategory,
    pub leaf_colors: Vec<ColorLabel>,
    pub stem_colors: Vec<ColorLabel>,
    pub has_flowers: bool,
    pub flower_colors: Vec<ColorLabel>,
    pub flower_shape: Option<FlowerShape>,
    pub flower_size: Option<FlowerSize>,
    pub leaf_shape: LeafShape,
    pub leaf_margin: LeafMargin,
    pub leaf_texture: LeafTexture,
    pub leaf_size: LeafSize,
    pub plant_height: PlantHeight,
    pub growth_pattern: GrowthPattern,
    pub stem_type: StemType,
}

/// An ordered, versioned set of reference plants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlantDatabase {
    version: String,
    plants: Vec<PlantDescriptor>,
}

impl PlantDatabase {
    /// Builds a database from parts, rejecting empty sets and duplicate ids.
    pub fn new(version: String, plants: Vec<PlantDescriptor>) -> Result<Self, DatabaseError> {
        if plants.is_empty() {
            return Err(DatabaseError::Empty);
        }
        let mut seen = HashSet::new();
        for plant in &plants {
            if !seen.insert(plant.id.clone()) {
                return Err(DatabaseError::DuplicateId(plant.id.clone()));
            }
        }
        Ok(Self { version, plants })
    }

    /// Parses a database from its JSON form, preserving record order.
    pub fn from_json_str(json: &str) -> Result<Self, DatabaseError> {
        let parsed: PlantDatabase = serde_json::from_str(json)?;
        Self::new(parsed.version, parsed.plants)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, DatabaseError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn plants(&self) -> &[PlantDescriptor] {
        &self.plants
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlantDescriptor> {
        self.plants.iter()
    }

    pub fn len(&self) -> usize {
        self.plants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plants.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&PlantDescriptor> {
        self.plants.iter().find(|p| p.id == id)
    }

    /// The compiled-in reference set: common garden and houseplant species
    /// covering every category, authored in ranking tie-break order.
    pub fn builtin() -> Self {
        let plants = vec![
            PlantDescriptor {
                id: "basil".into(),
                common_name: "Basil".into(),
                scientific_name: "Ocimum basilicum".into(),
                category: PlantCategory::Herb,
                leaf_colors: vec![ColorLabel::Green, ColorLabel::LightGreen],
                stem_colors: vec![ColorLabel::Green],
                has_flowers: false,
                flower_colors: vec![],
                flower_shape: None,
                flower_size: None,
                leaf_shape: LeafShape::Oval,
                leaf_margin: LeafMargin::Entire,
                leaf_texture: LeafTexture::Glossy,
                leaf_size: LeafSize::Small,
                plant_height: PlantHeight::Low,
                growth_pattern: GrowthPattern::Upright,
                stem_type: StemType::Herbaceous,
            },
            PlantDescriptor {
                id: "mint".into(),
                common_name: "Mint".into(),
                scientific_name: "Mentha spicata".into(),
                category: PlantCategory::Herb,
                leaf_colors: vec![ColorLabel::Green],
                stem_colors: vec![ColorLabel::Green],
                has_flowers: false,
                flower_colors: vec![],
                flower_shape: None,
                flower_size: None,
                leaf_shape: LeafShape::Oval,
                leaf_margin: LeafMargin::Serrate,
                leaf_texture: LeafTexture::Veined,
                leaf_size: LeafSize::Small,
                plant_height: PlantHeight::Low,
                growth_pattern: GrowthPattern::Bushy,
                stem_type: StemType::Herbaceous,
            },
            PlantDescriptor {
                id: "rose".into(),
                common_name: "Rose".into(),
                scientific_name: "Rosa chinensis".into(),
                category: PlantCategory::Shrub,
                leaf_colors: vec![ColorLabel::DarkGreen, ColorLabel::Green],
                stem_colors: vec![ColorLabel::Green, ColorLabel::Brown],
                has_flowers: true,
                flower_colors: vec![ColorLabel::Red, ColorLabel::Pink, ColorLabel::White],
                flower_shape: Some(FlowerShape::Star),
                flower_size: Some(FlowerSize::Medium),
                leaf_shape: LeafShape::Oval,
                leaf_margin: LeafMargin::Serrate,
                leaf_texture: LeafTexture::Glossy,
                leaf_size: LeafSize::Medium,
                plant_height: PlantHeight::Medium,
                growth_pattern: GrowthPattern::Bushy,
                stem_type: StemType::Woody,
            },
            PlantDescriptor {
                id: "sunflower".into(),
                common_name: "Sunflower".into(),
                scientific_name: "Helianthus annuus".into(),
                category: PlantCategory::Flower,
                leaf_colors: vec![ColorLabel::Green, ColorLabel::DarkGreen],
                stem_colors: vec![ColorLabel::Green],
                has_flowers: true,
                flower_colors: vec![ColorLabel::Yellow],
                flower_shape: Some(FlowerShape::Composite),
                flower_size: Some(FlowerSize::Large),
                leaf_shape: LeafShape::HeartShaped,
                leaf_margin: LeafMargin::Dentate,
                leaf_texture: LeafTexture::Rough,
                leaf_size: LeafSize::Large,
                plant_height: PlantHeight::Tall,
                growth_pattern: GrowthPattern::Upright,
                stem_type: StemType::Herbaceous,
            },
            PlantDescriptor {
                id: "marigold".into(),
                common_name: "Marigold".into(),
                scientific_name: "Tagetes erecta".into(),
                category: PlantCategory::Flower,
                leaf_colors: vec![ColorLabel::Green, ColorLabel::DarkGreen],
                stem_colors: vec![ColorLabel::Green],
                has_flowers: true,
                flower_colors: vec![ColorLabel::Yellow, ColorLabel::Orange],
                flower_shape: Some(FlowerShape::Composite),
                flower_size: Some(FlowerSize::Small),
                leaf_shape: LeafShape::Compound,
                leaf_margin: LeafMargin::Serrate,
                leaf_texture: LeafTexture::Rough,
                leaf_size: LeafSize::Small,
                plant_height: PlantHeight::Low,
                growth_pattern: GrowthPattern::Bushy,
                stem_type: StemType::Herbaceous,
            },
            PlantDescriptor {
                id: "lavender".into(),
                common_name: "Lavender".into(),
                scientific_name: "Lavandula angustifolia".into(),
                category: PlantCategory::Shrub,
                leaf_colors: vec![ColorLabel::LightGreen, ColorLabel::Gray],
                stem_colors: vec![ColorLabel::Green, ColorLabel::Brown],
                has_flowers: true,
                flower_colors: vec![ColorLabel::Purple],
                flower_shape: Some(FlowerShape::Cluster),
                flower_size: Some(FlowerSize::Small),
                leaf_shape: LeafShape::Linear,
                leaf_margin: LeafMargin::Entire,
                leaf_texture: LeafTexture::Fuzzy,
                leaf_size: LeafSize::Tiny,
                plant_height: PlantHeight::Medium,
                growth_pattern: GrowthPattern::Bushy,
                stem_type: StemType::Woody,
            },
            PlantDescriptor {
                id: "snake-plant".into(),
                common_name: "Snake Plant".into(),
                scientific_name: "Dracaena trifasciata".into(),
                category: PlantCategory::Succulent,
                leaf_colors: vec![
                    ColorLabel::DarkGreen,
                    ColorLabel::YellowGreen,
                    ColorLabel::Yellow,
                ],
                stem_colors: vec![ColorLabel::DarkGreen],
                has_flowers: false,
                flower_colors: vec![],
                flower_shape: None,
                flower_size: None,
                leaf_shape: LeafShape::Linear,
                leaf_margin: LeafMargin::Entire,
                leaf_texture: LeafTexture::Smooth,
                leaf_size: LeafSize::Large,
                plant_height: PlantHeight::Medium,
                growth_pattern: GrowthPattern::Upright,
                stem_type: StemType::Succulent,
            },
            PlantDescriptor {
                id: "aloe-vera".into(),
                common_name: "Aloe Vera".into(),
                scientific_name: "Aloe vera".into(),
                category: PlantCategory::Succulent,
                leaf_colors: vec![ColorLabel::Green, ColorLabel::LightGreen],
                stem_colors: vec![ColorLabel::Green],
                has_flowers: false,
                flower_colors: vec![],
                flower_shape: None,
                flower_size: None,
                leaf_shape: LeafShape::Lanceolate,
                leaf_margin: LeafMargin::Serrate,
                leaf_texture: LeafTexture::Smooth,
                leaf_size: LeafSize::Large,
                plant_height: PlantHeight::Low,
                growth_pattern: GrowthPattern::Rosette,
                stem_type: StemType::Succulent,
            },
            PlantDescriptor {
                id: "golden-pothos".into(),
                common_name: "Golden Pothos".into(),
                scientific_name: "Epipremnum aureum".into(),
                category: PlantCategory::Vine,
                leaf_colors: vec![ColorLabel::Green, ColorLabel::YellowGreen],
                stem_colors: vec![ColorLabel::Green],
                has_flowers: false,
                flower_colors: vec![],
                flower_shape: None,
                flower_size: None,
                leaf_shape: LeafShape::HeartShaped,
                leaf_margin: LeafMargin::Entire,
                leaf_texture: LeafTexture::Glossy,
                leaf_size: LeafSize::Medium,
                plant_height: PlantHeight::Medium,
                growth_pattern: GrowthPattern::Trailing,
                stem_type: StemType::Vine,
            },
            PlantDescriptor {
                id: "boston-fern".into(),
                common_name: "Boston Fern".into(),
                scientific_name: "Nephrolepis exaltata".into(),
                category: PlantCategory::Fern,
                leaf_colors: vec![ColorLabel::Green, ColorLabel::LightGreen],
                stem_colors: vec![ColorLabel::Brown, ColorLabel::Green],
                has_flowers: false,
                flower_colors: vec![],
                flower_shape: None,
                flower_size: None,
                leaf_shape: LeafShape::Compound,
                leaf_margin: LeafMargin::Serrate,
                leaf_texture: LeafTexture::Veined,
                leaf_size: LeafSize::Large,
                plant_height: PlantHeight::Medium,
                growth_pattern: GrowthPattern::Bushy,
                stem_type: StemType::Herbaceous,
            },
            PlantDescriptor {
                id: "tulip".into(),
                common_name: "Tulip".into(),
                scientific_name: "Tulipa gesneriana".into(),
                category: PlantCategory::Flower,
                leaf_colors: vec![ColorLabel::Green, ColorLabel::LightGreen],
                stem_colors: vec![ColorLabel::Green],
                has_flowers: true,
                flower_colors: vec![ColorLabel::Red, ColorLabel::Pink, ColorLabel::Yellow],
                flower_shape: Some(FlowerShape::Bell),
                flower_size: Some(FlowerSize::Medium),
                leaf_shape: LeafShape::Linear,
                leaf_margin: LeafMargin::Entire,
                leaf_texture: LeafTexture::Smooth,
                leaf_size: LeafSize::Medium,
                plant_height: PlantHeight::Medium,
                growth_pattern: GrowthPattern::Upright,
                stem_type: StemType::Herbaceous,
            },
            PlantDescriptor {
                id: "weeping-fig".into(),
                common_name: "Weeping Fig".into(),
                scientific_name: "Ficus benjamina".into(),
                category: PlantCategory::Tree,
                leaf_colors: vec![ColorLabel::Green, ColorLabel::DarkGreen],
                stem_colors: vec![ColorLabel::Brown, ColorLabel::Gray],
                has_flowers: false,
                flower_colors: vec![],
                flower_shape: None,
                flower_size: None,
                leaf_shape: LeafShape::Oval,
                leaf_margin: LeafMargin::Undulate,
                leaf_texture: LeafTexture::Glossy,
                leaf_size: LeafSize::Medium,
                plant_height: PlantHeight::Tall,
                growth_pattern: GrowthPattern::Upright,
                stem_type: StemType::Woody,
            },
            PlantDescriptor {
                id: "lemongrass".into(),
                common_name: "Lemongrass".into(),
                scientific_name: "Cymbopogon citratus".into(),
                category: PlantCategory::Grass,
                leaf_colors: vec![ColorLabel::Green, ColorLabel::YellowGreen],
                stem_colors: vec![ColorLabel::LightGreen],
                has_flowers: false,
                flower_colors: vec![],
                flower_shape: None,
                flower_size: None,
                leaf_shape: LeafShape::Linear,
                leaf_margin: LeafMargin::Entire,
                leaf_texture: LeafTexture::Rough,
                leaf_size: LeafSize::Large,
                plant_height: PlantHeight::Medium,
                growth_pattern: GrowthPattern::Upright,
                stem_type: StemType::Herbaceous,
            },
        ];

        Self {
            version: BUILTIN_VERSION.to_string(),
            plants,
        }
    }
}
