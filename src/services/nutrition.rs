use serde::Serialize;

/// Share of the daily calorie target per meal, in eighths.
const MEAL_SPLIT: [(&str, u32); 5] = [
    ("Breakfast", 2),
    ("Morning Snack", 1),
    ("Lunch", 2),
    ("Evening Snack", 1),
    ("Dinner", 2),
];

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MealTarget {
    pub name: &'static str,
    pub calories: i32,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FastingProgress {
    pub hours_fasted: f64,
    pub target_hours: f64,
    pub progress: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NutritionPlan {
    pub calorie_goal: i32,
    pub calories_consumed: i32,
    pub meals: Vec<MealTarget>,
    pub fasting: FastingProgress,
}

pub fn meal_targets(calorie_goal: i32) -> Vec<MealTarget> {
    let goal = calorie_goal.max(0);
    MEAL_SPLIT
        .iter()
        .map(|&(name, eighths)| MealTarget {
            name,
            calories: goal * eighths as i32 / 8,
        })
        .collect()
}

pub fn fasting_progress(hours_fasted: f64, target_hours: f64) -> FastingProgress {
    let hours_fasted = if hours_fasted.is_finite() { hours_fasted.max(0.0) } else { 0.0 };
    let progress = if target_hours > 0.0 {
        (hours_fasted / target_hours * 100.0).min(100.0)
    } else {
        0.0
    };
    FastingProgress {
        hours_fasted,
        target_hours,
        progress,
    }
}

pub fn build_plan(calorie_goal: i32, calories_consumed: i32, hours_fasted: f64, target_hours: f64) -> NutritionPlan {
    NutritionPlan {
        calorie_goal,
        calories_consumed,
        meals: meal_targets(calorie_goal),
        fasting: fasting_progress(hours_fasted, target_hours),
    }
}
