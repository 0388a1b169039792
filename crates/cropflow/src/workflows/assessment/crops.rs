use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical crop categories the scoring tables are keyed by. Free-text crop
/// names are normalized onto one of these; anything unrecognized falls back
/// to [`CropCategory::Tomato`], the most common category in the target
/// markets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CropCategory {
    Tomato,
    Onion,
    Mango,
    Potato,
    Carrot,
    Cucumber,
    LeafyGreens,
}

/// Storage tolerances and spoilage characteristics for one category.
#[derive(Debug, Clone, Copy)]
pub struct CropProfile {
    pub optimal_temperature: (f64, f64),
    pub optimal_humidity: (f64, f64),
    pub shelf_life_days: f64,
    /// Multiplier applied to the weather degradation base rate (0.4 for the
    /// most resistant crops up to 1.5 for the most sensitive).
    pub weather_sensitivity: f64,
}

const TOMATO: CropProfile = CropProfile {
    optimal_temperature: (15.0, 25.0),
    optimal_humidity: (85.0, 95.0),
    shelf_life_days: 7.0,
    weather_sensitivity: 1.2,
};

const ONION: CropProfile = CropProfile {
    optimal_temperature: (0.0, 10.0),
    optimal_humidity: (55.0, 65.0),
    shelf_life_days: 60.0,
    weather_sensitivity: 0.4,
};

const MANGO: CropProfile = CropProfile {
    optimal_temperature: (13.0, 18.0),
    optimal_humidity: (80.0, 90.0),
    shelf_life_days: 14.0,
    weather_sensitivity: 0.8,
};

const POTATO: CropProfile = CropProfile {
    optimal_temperature: (4.0, 10.0),
    optimal_humidity: (85.0, 95.0),
    shelf_life_days: 90.0,
    weather_sensitivity: 0.5,
};

const CARROT: CropProfile = CropProfile {
    optimal_temperature: (0.0, 4.0),
    optimal_humidity: (90.0, 95.0),
    shelf_life_days: 60.0,
    weather_sensitivity: 0.6,
};

const CUCUMBER: CropProfile = CropProfile {
    optimal_temperature: (10.0, 15.0),
    optimal_humidity: (85.0, 90.0),
    shelf_life_days: 5.0,
    weather_sensitivity: 1.0,
};

const LEAFY_GREENS: CropProfile = CropProfile {
    optimal_temperature: (0.0, 5.0),
    optimal_humidity: (90.0, 95.0),
    shelf_life_days: 3.0,
    weather_sensitivity: 1.5,
};

/// Substring aliases, including the vernacular names sellers actually type.
const ALIASES: &[(&str, CropCategory)] = &[
    ("tomato", CropCategory::Tomato),
    ("tamatar", CropCategory::Tomato),
    ("onion", CropCategory::Onion),
    ("pyaz", CropCategory::Onion),
    ("kanda", CropCategory::Onion),
    ("mango", CropCategory::Mango),
    ("aam", CropCategory::Mango),
    ("hapus", CropCategory::Mango),
    ("potato", CropCategory::Potato),
    ("aloo", CropCategory::Potato),
    ("batata", CropCategory::Potato),
    ("carrot", CropCategory::Carrot),
    ("gajar", CropCategory::Carrot),
    ("cucumber", CropCategory::Cucumber),
    ("kheera", CropCategory::Cucumber),
    ("kakdi", CropCategory::Cucumber),
    ("lettuce", CropCategory::LeafyGreens),
    ("spinach", CropCategory::LeafyGreens),
    ("palak", CropCategory::LeafyGreens),
    ("kale", CropCategory::LeafyGreens),
    ("leafy", CropCategory::LeafyGreens),
];

impl CropCategory {
    /// Normalize a free-text crop name. Matching is fuzzy by substring on
    /// purpose (sellers type "cherry tomato", "desi aloo"); unmatched names
    /// use the default category rather than guessing further.
    pub fn from_name(name: &str) -> Self {
        let lowered = name.trim().to_ascii_lowercase();
        for (alias, category) in ALIASES {
            if lowered.contains(alias) {
                return *category;
            }
        }
        Self::Tomato
    }

    pub const fn profile(self) -> &'static CropProfile {
        match self {
            Self::Tomato => &TOMATO,
            Self::Onion => &ONION,
            Self::Mango => &MANGO,
            Self::Potato => &POTATO,
            Self::Carrot => &CARROT,
            Self::Cucumber => &CUCUMBER,
            Self::LeafyGreens => &LEAFY_GREENS,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Tomato => "tomato",
            Self::Onion => "onion",
            Self::Mango => "mango",
            Self::Potato => "potato",
            Self::Carrot => "carrot",
            Self::Cucumber => "cucumber",
            Self::LeafyGreens => "leafy_greens",
        }
    }
}

impl fmt::Display for CropCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
