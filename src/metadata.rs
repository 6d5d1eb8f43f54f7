//! Static option catalogs served by the metadata endpoints.
//!
//! Enumerated profile fields derive their catalog from the enum itself, so the
//! ids listed here are exactly the values the profile endpoints accept. The
//! free-text suggestion lists (challenges, activities, health conditions) are
//! plain static tables. Each list exists once and is shared by every domain
//! that exposes it.

use serde::Serialize;

/// One selectable option: wire id, display name, short description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OptionEntry {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

/// Closed enumeration with a catalog entry per variant.
pub trait CatalogOption: Copy + 'static {
    const ALL: &'static [Self];

    fn entry(self) -> OptionEntry;

    fn id(self) -> &'static str {
        self.entry().id
    }

    fn name(self) -> &'static str {
        self.entry().name
    }
}

/// Every option of `T` in declaration order.
pub fn catalog<T: CatalogOption>() -> Vec<OptionEntry> {
    T::ALL.iter().map(|option| option.entry()).collect()
}

/// Named lists exposed under `/api/v1/metadata`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogKind {
    FitnessLevels,
    Equipment,
    FitnessGoals,
    DietaryPreferences,
    ActivityLevels,
    NutritionGoals,
    Challenges,
    Activities,
    HealthConditions,
    TipsDomains,
    TipsFormats,
}

impl CatalogKind {
    /// Key wrapping the list in the response body.
    pub fn list_name(self) -> &'static str {
        match self {
            Self::FitnessLevels => "fitness_levels",
            Self::Equipment => "equipment_options",
            Self::FitnessGoals | Self::NutritionGoals => "goals",
            Self::DietaryPreferences => "dietary_preferences",
            Self::ActivityLevels => "activity_levels",
            Self::Challenges => "challenges",
            Self::Activities => "activities",
            Self::HealthConditions => "health_conditions",
            Self::TipsDomains => "domains",
            Self::TipsFormats => "formats",
        }
    }

    pub fn entries(self) -> Vec<OptionEntry> {
        use crate::models::*;

        match self {
            Self::FitnessLevels => catalog::<FitnessLevel>(),
            Self::Equipment => catalog::<Equipment>(),
            Self::FitnessGoals => catalog::<FitnessGoal>(),
            Self::DietaryPreferences => catalog::<DietaryRestriction>(),
            Self::ActivityLevels => catalog::<ActivityLevel>(),
            Self::NutritionGoals => catalog::<NutritionGoal>(),
            Self::Challenges => CHALLENGES.to_vec(),
            Self::Activities => ACTIVITIES.to_vec(),
            Self::HealthConditions => HEALTH_CONDITIONS.to_vec(),
            Self::TipsDomains => catalog::<TipsDomain>(),
            Self::TipsFormats => catalog::<TipsFormat>(),
        }
    }

    /// `{ "<list_name>": [ {id, name, description}, ... ] }`
    pub fn to_json(self) -> serde_json::Value {
        let mut body = serde_json::Map::new();
        body.insert(
            self.list_name().to_string(),
            serde_json::to_value(self.entries()).unwrap_or_default(),
        );
        serde_json::Value::Object(body)
    }
}

pub static CHALLENGES: &[OptionEntry] = &[
    OptionEntry {
        id: "lack_of_motivation",
        name: "Lack of Motivation",
        description: "Struggling to start or stay consistent",
    },
    OptionEntry {
        id: "time_constraints",
        name: "Time Constraints",
        description: "Busy schedule leaves little time for health",
    },
    OptionEntry {
        id: "budget_limitations",
        name: "Budget Limitations",
        description: "Limited money for gym, equipment or food",
    },
    OptionEntry {
        id: "lack_of_knowledge",
        name: "Lack of Knowledge",
        description: "Unsure what to do or how to do it",
    },
    OptionEntry {
        id: "plateau",
        name: "Plateau",
        description: "Progress has stalled despite effort",
    },
    OptionEntry {
        id: "lack_of_energy",
        name: "Lack of Energy",
        description: "Feeling tired or drained during the day",
    },
    OptionEntry {
        id: "stress",
        name: "Stress",
        description: "High stress affecting habits and recovery",
    },
    OptionEntry {
        id: "poor_sleep",
        name: "Poor Sleep",
        description: "Difficulty falling or staying asleep",
    },
];

pub static ACTIVITIES: &[OptionEntry] = &[
    OptionEntry {
        id: "running",
        name: "Running",
        description: "Road, trail or treadmill running",
    },
    OptionEntry {
        id: "strength_training",
        name: "Strength Training",
        description: "Free weights, machines or bodyweight resistance",
    },
    OptionEntry {
        id: "yoga",
        name: "Yoga",
        description: "Flexibility, balance and breathing practice",
    },
    OptionEntry {
        id: "cycling",
        name: "Cycling",
        description: "Outdoor or stationary cycling",
    },
    OptionEntry {
        id: "swimming",
        name: "Swimming",
        description: "Low-impact full body conditioning",
    },
    OptionEntry {
        id: "walking",
        name: "Walking",
        description: "Daily steps and brisk walks",
    },
    OptionEntry {
        id: "team_sports",
        name: "Team Sports",
        description: "Football, basketball and similar sports",
    },
    OptionEntry {
        id: "hiit",
        name: "HIIT",
        description: "High intensity interval training",
    },
];

pub static HEALTH_CONDITIONS: &[OptionEntry] = &[
    OptionEntry {
        id: "diabetes",
        name: "Diabetes",
        description: "Blood sugar regulation needs attention",
    },
    OptionEntry {
        id: "hypertension",
        name: "Hypertension",
        description: "High blood pressure",
    },
    OptionEntry {
        id: "back_pain",
        name: "Back Pain",
        description: "Chronic or recurring back discomfort",
    },
    OptionEntry {
        id: "knee_problems",
        name: "Knee Problems",
        description: "Joint pain or previous knee injury",
    },
    OptionEntry {
        id: "asthma",
        name: "Asthma",
        description: "Breathing restrictions during exertion",
    },
    OptionEntry {
        id: "heart_condition",
        name: "Heart Condition",
        description: "Cardiovascular condition requiring medical clearance",
    },
    OptionEntry {
        id: "pregnancy",
        name: "Pregnancy",
        description: "Pre or postnatal considerations",
    },
];
