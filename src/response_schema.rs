//! Per-domain description of what the model must return.
//!
//! A schema lists the required top-level keys checked by the response
//! validator, carries the invocation limits for its domain, and renders the
//! JSON example embedded in the prompt.

use serde_json::{json, Value};

use crate::llm_client::InvokeOptions;

/// A list-shaped key that must hold at least `min` entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListMinimum {
    pub key: &'static str,
    pub min: usize,
}

#[derive(Debug)]
pub struct ResponseSchema {
    /// Human label used in logs and error messages.
    pub domain: &'static str,
    pub required_keys: &'static [&'static str],
    pub min_items: Option<ListMinimum>,
    pub max_output_tokens: u32,
    pub retry_budget: u32,
    pub strict_json: bool,
    example: fn() -> Value,
}

impl ResponseSchema {
    pub fn invoke_options(&self) -> InvokeOptions {
        InvokeOptions {
            max_output_tokens: self.max_output_tokens,
            retry_budget: self.retry_budget,
            strict_json: self.strict_json,
        }
    }

    pub fn example(&self) -> Value {
        (self.example)()
    }

    /// Single-line JSON example. Serialization escapes embedded newlines, so
    /// the result never spans more than one line.
    pub fn example_text(&self) -> String {
        self.example().to_string()
    }
}

pub static WORKOUT_SCHEMA: ResponseSchema = ResponseSchema {
    domain: "workout plan",
    required_keys: &["warmup", "main_workout", "cooldown", "workout_summary"],
    min_items: None,
    max_output_tokens: 2500,
    retry_budget: 2,
    strict_json: true,
    example: workout_example,
};

pub static NUTRITION_SCHEMA: ResponseSchema = ResponseSchema {
    domain: "nutrition plan",
    required_keys: &[
        "daily_calories",
        "daily_macros",
        "meals",
        "weekly_meal_prep",
        "shopping_list",
    ],
    min_items: None,
    max_output_tokens: 3000,
    retry_budget: 2,
    strict_json: true,
    example: nutrition_example,
};

pub static TIPS_SCHEMA: ResponseSchema = ResponseSchema {
    domain: "tips list",
    required_keys: &["tips", "implementation_strategy", "priority_order"],
    min_items: Some(ListMinimum { key: "tips", min: 3 }),
    max_output_tokens: 2000,
    retry_budget: 2,
    strict_json: true,
    example: tips_example,
};

fn exercise_example(name: &str, muscle: &str) -> Value {
    json!({
        "name": name,
        "muscle_groups": [muscle],
        "sets": 3,
        "reps": "8-12",
        "rest_time": "60 seconds",
        "intensity": "moderate",
        "technique_tips": ["tip 1", "tip 2"]
    })
}

fn workout_example() -> Value {
    json!({
        "warmup": {
            "duration": "10 minutes",
            "exercises": [exercise_example("Exercise name", "shoulders")],
            "instructions": ["instruction"]
        },
        "main_workout": {
            "duration": "40 minutes",
            "exercises": [exercise_example("Exercise name", "chest")],
            "instructions": ["instruction"]
        },
        "cooldown": {
            "duration": "10 minutes",
            "exercises": [exercise_example("Stretch name", "full_body")],
            "instructions": ["instruction"]
        },
        "workout_summary": {
            "total_time": "60 minutes",
            "difficulty": "intermediate",
            "focus": "hypertrophy",
            "estimated_calories": 400
        },
        "progression_notes": ["note"],
        "nutrition_tips": [{
            "category": "pre_workout",
            "recommendation": "recommendation",
            "timing": "30 minutes before"
        }],
        "recovery_recommendations": ["recommendation"],
        "weekly_schedule_suggestion": {"monday": "Upper body", "tuesday": "Rest"}
    })
}

fn macros_example(calories: u32, protein: u32, carbs: u32, fat: u32) -> Value {
    json!({
        "calories": calories,
        "protein_g": protein,
        "carbs_g": carbs,
        "fat_g": fat
    })
}

fn nutrition_example() -> Value {
    json!({
        "daily_calories": 2200,
        "daily_macros": macros_example(2200, 165, 247, 73),
        "meals": [{
            "name": "Breakfast",
            "time": "7:00 AM",
            "calories": 450,
            "macros": macros_example(450, 25, 55, 12),
            "ingredients": ["ingredient"],
            "preparation_time": 10,
            "instructions": ["step"],
            "tips": ["tip"]
        }],
        "weekly_meal_prep": {"sunday": ["task"]},
        "shopping_list": ["item"],
        "recommended_supplements": [{
            "name": "Vitamin D3",
            "dosage": "1000 IU daily",
            "timing": "With breakfast",
            "purpose": "purpose",
            "interactions": ["interaction"]
        }],
        "key_micronutrients": {"vitamin_d_mcg": 15, "iron_mg": 18, "calcium_mg": 1000},
        "nutrition_education": ["point"],
        "hydration_guidelines": {
            "daily_water_liters": 2.5,
            "timing_recommendations": ["recommendation"]
        },
        "progress_metrics": ["metric"],
        "adjustment_guidelines": ["guideline"]
    })
}

fn tips_example() -> Value {
    json!({
        "tips": [{
            "title": "Short title",
            "category": "fitness",
            "difficulty": "easy",
            "time_required": "5 minutes",
            "description": "description",
            "action_steps": ["step 1", "step 2", "step 3"],
            "benefits": ["benefit"],
            "common_mistakes": ["mistake"],
            "scientific_rationale": "rationale",
            "progression_tips": ["tip"]
        }],
        "implementation_strategy": {
            "start_with": "first action",
            "timeline": "timeline",
            "key_principles": ["principle"]
        },
        "priority_order": ["Short title"],
        "tracking_methods": ["method"],
        "success_indicators": ["indicator"],
        "related_concepts": ["concept"],
        "advanced_techniques": ["technique"],
        "common_obstacles": ["obstacle"],
        "motivation_strategies": ["strategy"]
    })
}
