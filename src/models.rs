use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::metadata::{CatalogOption, OptionEntry};
use crate::validation::{FieldIssue, Issues, Validate};

// ============ Shared bounds ============

pub const AGE_MIN: u32 = 13;
pub const AGE_MAX: u32 = 100;
pub const WEIGHT_MIN_KG: f64 = 30.0;
pub const WEIGHT_MAX_KG: f64 = 300.0;
pub const HEIGHT_MIN_CM: f64 = 100.0;
pub const HEIGHT_MAX_CM: f64 = 250.0;

fn check_body(issues: &mut Issues, age: u32, weight: f64, height: f64) {
    issues.check_range("age", age, AGE_MIN, AGE_MAX);
    issues.check_measure("weight", weight, WEIGHT_MIN_KG, WEIGHT_MAX_KG);
    issues.check_measure("height", height, HEIGHT_MIN_CM, HEIGHT_MAX_CM);
}

const fn entry(id: &'static str, name: &'static str, description: &'static str) -> OptionEntry {
    OptionEntry {
        id,
        name,
        description,
    }
}

// ============ Enumerations ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Gender {
    #[serde(rename = "M", alias = "male")]
    Male,
    #[serde(rename = "F", alias = "female")]
    Female,
    #[serde(rename = "other")]
    Other,
}

impl CatalogOption for Gender {
    const ALL: &'static [Self] = &[Self::Male, Self::Female, Self::Other];

    fn entry(self) -> OptionEntry {
        match self {
            Self::Male => entry("M", "Male", "Male physiology constants"),
            Self::Female => entry("F", "Female", "Female physiology constants"),
            Self::Other => entry("other", "Other", "Averaged physiology constants"),
        }
    }
}

/// Training experience. Also used as the experience level of tips requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FitnessLevel {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl CatalogOption for FitnessLevel {
    const ALL: &'static [Self] = &[
        Self::Beginner,
        Self::Intermediate,
        Self::Advanced,
        Self::Expert,
    ];

    fn entry(self) -> OptionEntry {
        match self {
            Self::Beginner => entry(
                "beginner",
                "Beginner",
                "New to structured training or returning after a long break",
            ),
            Self::Intermediate => entry(
                "intermediate",
                "Intermediate",
                "Trains regularly and knows the fundamental movements",
            ),
            Self::Advanced => entry(
                "advanced",
                "Advanced",
                "Several years of consistent training with solid technique",
            ),
            Self::Expert => entry(
                "expert",
                "Expert",
                "Competitive or coaching-level experience",
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FitnessGoal {
    WeightLoss,
    MuscleGain,
    Strength,
    Endurance,
    GeneralFitness,
    AthleticPerformance,
    Flexibility,
}

impl CatalogOption for FitnessGoal {
    const ALL: &'static [Self] = &[
        Self::WeightLoss,
        Self::MuscleGain,
        Self::Strength,
        Self::Endurance,
        Self::GeneralFitness,
        Self::AthleticPerformance,
        Self::Flexibility,
    ];

    fn entry(self) -> OptionEntry {
        match self {
            Self::WeightLoss => entry(
                "weight_loss",
                "Weight Loss",
                "Reduce body fat while preserving lean mass",
            ),
            Self::MuscleGain => entry(
                "muscle_gain",
                "Muscle Gain",
                "Build muscle size through hypertrophy training",
            ),
            Self::Strength => entry(
                "strength",
                "Strength",
                "Increase maximal force on compound lifts",
            ),
            Self::Endurance => entry(
                "endurance",
                "Endurance",
                "Improve cardiovascular and muscular stamina",
            ),
            Self::GeneralFitness => entry(
                "general_fitness",
                "General Fitness",
                "Balanced health, mobility and conditioning",
            ),
            Self::AthleticPerformance => entry(
                "athletic_performance",
                "Athletic Performance",
                "Power, speed and agility for sport",
            ),
            Self::Flexibility => entry(
                "flexibility",
                "Flexibility",
                "Range of motion and joint mobility",
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Equipment {
    Bodyweight,
    HomeBasic,
    HomeAdvanced,
    FullGym,
    Outdoor,
}

impl CatalogOption for Equipment {
    const ALL: &'static [Self] = &[
        Self::Bodyweight,
        Self::HomeBasic,
        Self::HomeAdvanced,
        Self::FullGym,
        Self::Outdoor,
    ];

    fn entry(self) -> OptionEntry {
        match self {
            Self::Bodyweight => entry("bodyweight", "Bodyweight Only", "No equipment required"),
            Self::HomeBasic => entry(
                "home_basic",
                "Basic Home Equipment",
                "Dumbbells, resistance bands and a mat",
            ),
            Self::HomeAdvanced => entry(
                "home_advanced",
                "Advanced Home Gym",
                "Adjustable dumbbells, bench, pull-up bar and kettlebells",
            ),
            Self::FullGym => entry(
                "full_gym",
                "Full Gym",
                "Barbells, racks, machines and cable stations",
            ),
            Self::Outdoor => entry(
                "outdoor",
                "Outdoor",
                "Parks, tracks, stairs and playground structures",
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    LightlyActive,
    ModeratelyActive,
    VeryActive,
    ExtraActive,
}

impl ActivityLevel {
    /// TDEE multiplier applied to BMR.
    pub fn multiplier(self) -> f64 {
        match self {
            Self::Sedentary => 1.2,
            Self::LightlyActive => 1.375,
            Self::ModeratelyActive => 1.55,
            Self::VeryActive => 1.725,
            Self::ExtraActive => 1.9,
        }
    }
}

impl CatalogOption for ActivityLevel {
    const ALL: &'static [Self] = &[
        Self::Sedentary,
        Self::LightlyActive,
        Self::ModeratelyActive,
        Self::VeryActive,
        Self::ExtraActive,
    ];

    fn entry(self) -> OptionEntry {
        match self {
            Self::Sedentary => entry("sedentary", "Sedentary", "Little or no exercise, desk job"),
            Self::LightlyActive => entry(
                "lightly_active",
                "Lightly Active",
                "Light exercise 1-3 days per week",
            ),
            Self::ModeratelyActive => entry(
                "moderately_active",
                "Moderately Active",
                "Moderate exercise 3-5 days per week",
            ),
            Self::VeryActive => entry(
                "very_active",
                "Very Active",
                "Hard exercise 6-7 days per week",
            ),
            Self::ExtraActive => entry(
                "extra_active",
                "Extra Active",
                "Physical job or training twice a day",
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NutritionGoal {
    WeightLoss,
    MuscleGain,
    Maintenance,
    Performance,
    Health,
}

impl CatalogOption for NutritionGoal {
    const ALL: &'static [Self] = &[
        Self::WeightLoss,
        Self::MuscleGain,
        Self::Maintenance,
        Self::Performance,
        Self::Health,
    ];

    fn entry(self) -> OptionEntry {
        match self {
            Self::WeightLoss => entry(
                "weight_loss",
                "Weight Loss",
                "Moderate calorie deficit with high protein",
            ),
            Self::MuscleGain => entry(
                "muscle_gain",
                "Muscle Gain",
                "Lean calorie surplus to support hypertrophy",
            ),
            Self::Maintenance => entry(
                "maintenance",
                "Maintenance",
                "Hold current weight with balanced macros",
            ),
            Self::Performance => entry(
                "performance",
                "Performance",
                "Fuel training volume and recovery",
            ),
            Self::Health => entry(
                "health",
                "General Health",
                "Whole-food focus and micronutrient coverage",
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DietaryRestriction {
    Vegetarian,
    Vegan,
    Pescatarian,
    GlutenFree,
    DairyFree,
    Keto,
    Paleo,
    Halal,
    Kosher,
    LowCarb,
}

impl CatalogOption for DietaryRestriction {
    const ALL: &'static [Self] = &[
        Self::Vegetarian,
        Self::Vegan,
        Self::Pescatarian,
        Self::GlutenFree,
        Self::DairyFree,
        Self::Keto,
        Self::Paleo,
        Self::Halal,
        Self::Kosher,
        Self::LowCarb,
    ];

    fn entry(self) -> OptionEntry {
        match self {
            Self::Vegetarian => entry("vegetarian", "Vegetarian", "No meat or fish"),
            Self::Vegan => entry("vegan", "Vegan", "No animal products"),
            Self::Pescatarian => entry("pescatarian", "Pescatarian", "Fish but no other meat"),
            Self::GlutenFree => entry("gluten_free", "Gluten Free", "No wheat, barley or rye"),
            Self::DairyFree => entry("dairy_free", "Dairy Free", "No milk-based products"),
            Self::Keto => entry("keto", "Ketogenic", "Very low carbohydrate, high fat"),
            Self::Paleo => entry("paleo", "Paleo", "Unprocessed foods, no grains or legumes"),
            Self::Halal => entry("halal", "Halal", "Prepared according to Islamic law"),
            Self::Kosher => entry("kosher", "Kosher", "Prepared according to Jewish law"),
            Self::LowCarb => entry("low_carb", "Low Carb", "Reduced carbohydrate intake"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TipsDomain {
    Fitness,
    Nutrition,
    MentalHealth,
    Recovery,
    Sleep,
    Motivation,
    Lifestyle,
}

impl CatalogOption for TipsDomain {
    const ALL: &'static [Self] = &[
        Self::Fitness,
        Self::Nutrition,
        Self::MentalHealth,
        Self::Recovery,
        Self::Sleep,
        Self::Motivation,
        Self::Lifestyle,
    ];

    fn entry(self) -> OptionEntry {
        match self {
            Self::Fitness => entry("fitness", "Fitness", "Training, movement and exercise habits"),
            Self::Nutrition => entry("nutrition", "Nutrition", "Eating habits and food choices"),
            Self::MentalHealth => entry(
                "mental_health",
                "Mental Health",
                "Stress management and emotional wellbeing",
            ),
            Self::Recovery => entry("recovery", "Recovery", "Rest, mobility and regeneration"),
            Self::Sleep => entry("sleep", "Sleep", "Sleep quality and routines"),
            Self::Motivation => entry(
                "motivation",
                "Motivation",
                "Consistency, mindset and goal setting",
            ),
            Self::Lifestyle => entry("lifestyle", "Lifestyle", "Daily routines and environment"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TipsFormat {
    QuickTips,
    DetailedGuide,
    StepByStep,
    ScienceBased,
    PracticalHacks,
}

impl CatalogOption for TipsFormat {
    const ALL: &'static [Self] = &[
        Self::QuickTips,
        Self::DetailedGuide,
        Self::StepByStep,
        Self::ScienceBased,
        Self::PracticalHacks,
    ];

    fn entry(self) -> OptionEntry {
        match self {
            Self::QuickTips => entry("quick_tips", "Quick Tips", "Short, immediately usable advice"),
            Self::DetailedGuide => entry(
                "detailed_guide",
                "Detailed Guide",
                "In-depth explanations with context",
            ),
            Self::StepByStep => entry(
                "step_by_step",
                "Step by Step",
                "Ordered actions to follow one at a time",
            ),
            Self::ScienceBased => entry(
                "science_based",
                "Science Based",
                "Advice backed by research rationale",
            ),
            Self::PracticalHacks => entry(
                "practical_hacks",
                "Practical Hacks",
                "Low-effort tricks that fit a busy day",
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    Simple,
    Moderate,
    Complex,
}

impl Complexity {
    pub fn label(self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Moderate => "moderate",
            Self::Complex => "complex",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AgeRange {
    Teen,
    YoungAdult,
    Adult,
    MiddleAged,
    Senior,
}

impl AgeRange {
    pub fn label(self) -> &'static str {
        match self {
            Self::Teen => "teen (13-17)",
            Self::YoungAdult => "young adult (18-29)",
            Self::Adult => "adult (30-44)",
            Self::MiddleAged => "middle-aged (45-64)",
            Self::Senior => "senior (65+)",
        }
    }
}

// ============ Profiles ============

fn default_session_duration() -> u32 {
    60
}

fn default_cooking_time() -> u32 {
    30
}

fn default_meals_per_day() -> u32 {
    3
}

/// Input for `POST /api/v1/fitness/workout`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WorkoutProfile {
    /// Age in years (13-100).
    pub age: u32,
    pub gender: Gender,
    /// Body weight in kilograms.
    pub weight: f64,
    /// Height in centimetres.
    pub height: f64,
    pub fitness_level: FitnessLevel,
    pub primary_goal: FitnessGoal,
    pub available_equipment: Equipment,
    /// Training sessions per week (1-7).
    pub sessions_per_week: u32,
    /// Minutes per session (15-180).
    #[serde(default = "default_session_duration")]
    pub session_duration: u32,
    #[serde(default)]
    pub injuries_limitations: Vec<String>,
    #[serde(default)]
    pub experience_years: Option<u32>,
}

impl Validate for WorkoutProfile {
    const REQUIRED_FIELDS: &'static [&'static str] = &[
        "age",
        "gender",
        "weight",
        "height",
        "fitness_level",
        "primary_goal",
        "available_equipment",
        "sessions_per_week",
    ];

    fn validate(&self) -> Result<(), Vec<FieldIssue>> {
        let mut issues = Issues::new();
        check_body(&mut issues, self.age, self.weight, self.height);
        issues.check_range("sessions_per_week", self.sessions_per_week, 1, 7);
        issues.check_range("session_duration", self.session_duration, 15, 180);
        issues.check_text_list("injuries_limitations", &self.injuries_limitations);

        if let Some(years) = self.experience_years {
            issues.check_range("experience_years", years, 0, 60);
            if years > self.age.saturating_sub(10) {
                issues.push(
                    "experience_years",
                    format!("cannot exceed age minus 10 ({})", self.age.saturating_sub(10)),
                );
            }
            if self.fitness_level == FitnessLevel::Expert && years < 3 {
                issues.push(
                    "fitness_level",
                    "expert level requires at least 3 years of experience",
                );
            }
        }

        issues.finish()
    }
}

/// Input for `POST /api/v1/nutrition/plan`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NutritionProfile {
    pub age: u32,
    pub gender: Gender,
    pub weight: f64,
    pub height: f64,
    #[serde(default)]
    pub target_weight: Option<f64>,
    pub activity_level: ActivityLevel,
    pub nutrition_goal: NutritionGoal,
    #[serde(default)]
    pub dietary_restrictions: Vec<DietaryRestriction>,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub health_conditions: Vec<String>,
    /// Minutes available for cooking per day (10-180).
    #[serde(default = "default_cooking_time")]
    pub cooking_time_available: u32,
    #[serde(default = "default_meals_per_day")]
    pub meals_per_day: u32,
}

impl NutritionProfile {
    pub fn has_restriction(&self, restriction: DietaryRestriction) -> bool {
        self.dietary_restrictions.contains(&restriction)
    }
}

impl Validate for NutritionProfile {
    const REQUIRED_FIELDS: &'static [&'static str] = &[
        "age",
        "gender",
        "weight",
        "height",
        "activity_level",
        "nutrition_goal",
    ];

    fn validate(&self) -> Result<(), Vec<FieldIssue>> {
        let mut issues = Issues::new();
        check_body(&mut issues, self.age, self.weight, self.height);
        issues.check_range("cooking_time_available", self.cooking_time_available, 10, 180);
        issues.check_range("meals_per_day", self.meals_per_day, 2, 6);
        issues.check_text_list("allergies", &self.allergies);
        issues.check_text_list("health_conditions", &self.health_conditions);

        if let Some(target) = self.target_weight {
            issues.check_measure("target_weight", target, WEIGHT_MIN_KG, WEIGHT_MAX_KG);
            match self.nutrition_goal {
                NutritionGoal::WeightLoss if target >= self.weight => issues.push(
                    "target_weight",
                    "must be below current weight for a weight_loss goal",
                ),
                NutritionGoal::MuscleGain if target <= self.weight => issues.push(
                    "target_weight",
                    "must be above current weight for a muscle_gain goal",
                ),
                _ => {}
            }
        }

        let restrictions = &self.dietary_restrictions;
        for (idx, restriction) in restrictions.iter().enumerate() {
            if restrictions[..idx].contains(restriction) {
                issues.push(
                    &format!("dietary_restrictions[{}]", idx),
                    format!("duplicate restriction '{}'", restriction.id()),
                );
            }
        }
        let conflicts = [
            (DietaryRestriction::Vegan, DietaryRestriction::Pescatarian),
            (DietaryRestriction::Vegan, DietaryRestriction::Keto),
        ];
        for (a, b) in conflicts {
            if self.has_restriction(a) && self.has_restriction(b) {
                issues.push(
                    "dietary_restrictions",
                    format!("'{}' cannot be combined with '{}'", a.id(), b.id()),
                );
            }
        }

        issues.finish()
    }
}

/// Input for `POST /api/v1/tips/generate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TipsProfile {
    pub domain: TipsDomain,
    #[serde(default)]
    pub secondary_domains: Vec<TipsDomain>,
    pub experience_level: FitnessLevel,
    pub format_preference: TipsFormat,
    /// Minutes per day the person can dedicate (5-180).
    #[serde(default)]
    pub time_constraints: Option<u32>,
    #[serde(default)]
    pub current_challenges: Vec<String>,
    #[serde(default)]
    pub specific_goals: Vec<String>,
    #[serde(default)]
    pub lifestyle_factors: Vec<String>,
    #[serde(default)]
    pub preferred_complexity: Option<Complexity>,
    #[serde(default)]
    pub age_range: Option<AgeRange>,
}

impl Validate for TipsProfile {
    const REQUIRED_FIELDS: &'static [&'static str] =
        &["domain", "experience_level", "format_preference"];

    fn validate(&self) -> Result<(), Vec<FieldIssue>> {
        let mut issues = Issues::new();

        if let Some(minutes) = self.time_constraints {
            issues.check_range("time_constraints", minutes, 5, 180);
        }
        if self.secondary_domains.len() > 3 {
            issues.push("secondary_domains", "must contain at most 3 entries");
        }
        if self.secondary_domains.contains(&self.domain) {
            issues.push(
                "secondary_domains",
                format!("must not repeat the primary domain '{}'", self.domain.id()),
            );
        }
        issues.check_text_list("current_challenges", &self.current_challenges);
        issues.check_text_list("specific_goals", &self.specific_goals);
        issues.check_text_list("lifestyle_factors", &self.lifestyle_factors);

        issues.finish()
    }
}
