//! Derived physiology values inlined into prompts.
//!
//! BMR uses the Mifflin–St Jeor equation; TDEE multiplies it by an activity
//! factor. All functions are pure.

use crate::models::{ActivityLevel, Gender, NutritionGoal};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            Self::Underweight
        } else if bmi < 25.0 {
            Self::Normal
        } else if bmi < 30.0 {
            Self::Overweight
        } else {
            Self::Obese
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Underweight => "underweight",
            Self::Normal => "normal weight",
            Self::Overweight => "overweight",
            Self::Obese => "obese",
        }
    }
}

pub fn bmi(weight_kg: f64, height_cm: f64) -> f64 {
    let meters = height_cm / 100.0;
    weight_kg / (meters * meters)
}

/// Mifflin–St Jeor: `10w + 6.25h - 5a + s`, s = +5 (male), -161 (female).
/// `Other` uses the midpoint of the two offsets.
pub fn bmr_mifflin_st_jeor(weight_kg: f64, height_cm: f64, age: u32, gender: Gender) -> f64 {
    let offset = match gender {
        Gender::Male => 5.0,
        Gender::Female => -161.0,
        Gender::Other => -78.0,
    };
    10.0 * weight_kg + 6.25 * height_cm - 5.0 * f64::from(age) + offset
}

/// Activity factor inferred from weekly training sessions.
pub fn sessions_multiplier(sessions_per_week: u32) -> f64 {
    match sessions_per_week {
        0..=1 => ActivityLevel::Sedentary.multiplier(),
        2..=3 => ActivityLevel::LightlyActive.multiplier(),
        4..=5 => ActivityLevel::ModeratelyActive.multiplier(),
        6 => ActivityLevel::VeryActive.multiplier(),
        _ => ActivityLevel::ExtraActive.multiplier(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyMetrics {
    pub bmi: f64,
    pub bmi_category: BmiCategory,
    pub bmr: f64,
    pub tdee: f64,
}

impl BodyMetrics {
    pub fn compute(weight_kg: f64, height_cm: f64, age: u32, gender: Gender, multiplier: f64) -> Self {
        let bmi = bmi(weight_kg, height_cm);
        let bmr = bmr_mifflin_st_jeor(weight_kg, height_cm, age, gender);
        Self {
            bmi,
            bmi_category: BmiCategory::from_bmi(bmi),
            bmr,
            tdee: bmr * multiplier,
        }
    }
}

/// Daily calorie floor below which plans are not generated.
pub fn calorie_floor(gender: Gender) -> f64 {
    match gender {
        Gender::Male => 1500.0,
        Gender::Female => 1200.0,
        Gender::Other => 1350.0,
    }
}

pub fn calorie_target(tdee: f64, goal: NutritionGoal, gender: Gender) -> f64 {
    let adjusted = match goal {
        NutritionGoal::WeightLoss => tdee - 500.0,
        NutritionGoal::MuscleGain => tdee + 300.0,
        NutritionGoal::Performance => tdee + 250.0,
        NutritionGoal::Maintenance | NutritionGoal::Health => tdee,
    };
    adjusted.max(calorie_floor(gender)).round()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacroTargets {
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
}

/// Protein scales with body weight, fat takes a fixed share of calories and
/// carbohydrates fill the remainder. Ketogenic plans cap carbs at 30 g and move
/// the rest of the energy to fat.
pub fn macro_targets(calories: f64, weight_kg: f64, goal: NutritionGoal, ketogenic: bool) -> MacroTargets {
    let protein_per_kg = match goal {
        NutritionGoal::WeightLoss | NutritionGoal::MuscleGain => 2.0,
        NutritionGoal::Performance => 1.8,
        NutritionGoal::Maintenance => 1.6,
        NutritionGoal::Health => 1.4,
    };
    let protein_g = (weight_kg * protein_per_kg).round();
    let protein_kcal = protein_g * 4.0;

    let (carbs_g, fat_g) = if ketogenic {
        let carbs_g: f64 = 30.0;
        let fat_kcal = (calories - protein_kcal - carbs_g * 4.0).max(0.0);
        (carbs_g, (fat_kcal / 9.0).round())
    } else {
        let fat_g = (calories * 0.25 / 9.0).round();
        let carbs_kcal = (calories - protein_kcal - fat_g * 9.0).max(0.0);
        ((carbs_kcal / 4.0).round(), fat_g)
    };

    MacroTargets {
        calories,
        protein_g,
        carbs_g,
        fat_g,
    }
}
