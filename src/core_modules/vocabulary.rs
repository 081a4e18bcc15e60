// THEORY:
// The `vocabulary` module defines the closed set of categorical labels shared
// by the extraction side (`FeatureDescriptor`) and the reference side
// (`PlantDescriptor`). Both sides speaking the same enums is what lets the
// matcher compare attributes with plain equality instead of string fuzziness,
// and it makes an out-of-vocabulary label a compile error rather than a
// silent scoring miss.
//
// The only logic here is `ColorLabel::classify`, which names an RGB color by
// thresholding its HSV form: achromatic guards first (black, white, gray),
// then hue bands, with value/saturation refinements inside the green and
// orange bands where foliage needs finer distinctions.

use crate::core_modules::pixel::Pixel;
use serde::{Deserialize, Serialize};

/// Named colors used for foliage, stems and blooms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorLabel {
    DarkGreen,
    Green,
    LightGreen,
    YellowGreen,
    Yellow,
    Orange,
    Red,
    Pink,
    Purple,
    Blue,
    White,
    Gray,
    Brown,
    Black,
}

impl ColorLabel {
    /// Names an RGB color. Achromatic guards run first, then hue bands.
    pub fn classify(red: u8, green: u8, blue: u8) -> Self {
        let (hue, saturation, value) = Pixel::new(red, green, blue, 255).to_hsv();

        if value < 40.0 {
            return ColorLabel::Black;
        }
        if saturation < 12.0 {
            return if value >= 200.0 {
                ColorLabel::White
            } else {
                ColorLabel::Gray
            };
        }

        match hue {
            h if h < 20.0 => ColorLabel::Red,
            h if h < 45.0 => {
                if value < 140.0 {
                    ColorLabel::Brown
                } else {
                    ColorLabel::Orange
                }
            }
            h if h < 70.0 => ColorLabel::Yellow,
            h if h < 95.0 => ColorLabel::YellowGreen,
            h if h < 190.0 => {
                if value < 90.0 {
                    ColorLabel::DarkGreen
                } else if value >= 180.0 && saturation < 60.0 {
                    ColorLabel::LightGreen
                } else {
                    ColorLabel::Green
                }
            }
            h if h < 260.0 => ColorLabel::Blue,
            h if h < 320.0 => ColorLabel::Purple,
            h if h < 345.0 => ColorLabel::Pink,
            _ => ColorLabel::Red,
        }
    }

    /// True for the foliage greens.
    pub fn is_green_family(&self) -> bool {
        matches!(
            self,
            ColorLabel::DarkGreen
                | ColorLabel::Green
                | ColorLabel::LightGreen
                | ColorLabel::YellowGreen
        )
    }

    /// True for colors that can plausibly belong to a bloom.
    pub fn is_flower_color(&self) -> bool {
        matches!(
            self,
            ColorLabel::Yellow
                | ColorLabel::Orange
                | ColorLabel::Red
                | ColorLabel::Pink
                | ColorLabel::Purple
                | ColorLabel::Blue
                | ColorLabel::White
        )
    }
}

/// Overall leaf silhouette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeafShape {
    Round,
    #[default]
    Oval,
    Linear,
    Lobed,
    Compound,
    Lanceolate,
    /// Reference-data only; the extractor has no cue that isolates it.
    HeartShaped,
}

/// Leaf edge character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeafMargin {
    #[default]
    Entire,
    Undulate,
    Serrate,
    Dentate,
}

/// Leaf surface character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeafTexture {
    #[default]
    Smooth,
    Glossy,
    Veined,
    Rough,
    Fuzzy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeafSize {
    Tiny,
    Small,
    #[default]
    Medium,
    Large,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlantHeight {
    Low,
    #[default]
    Medium,
    Tall,
}

/// How the plant occupies space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthPattern {
    #[default]
    Upright,
    Bushy,
    Climbing,
    Trailing,
    Rosette,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StemType {
    #[default]
    Herbaceous,
    Woody,
    Succulent,
    Vine,
}

/// Bloom silhouette, carried by reference data for display and curation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowerShape {
    Star,
    Bell,
    Tubular,
    Composite,
    Cluster,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowerSize {
    Small,
    Medium,
    Large,
}

/// Broad category a reference plant belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlantCategory {
    Herb,
    Shrub,
    Tree,
    Succulent,
    Flower,
    Fern,
    Vine,
    Grass,
}
