use serde::Serialize;

use crate::models::user_stats::UserStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Stable,
    Down,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgressCard {
    pub title: &'static str,
    pub value: String,
    pub subtitle: String,
    pub progress: f64,
    pub trend: Trend,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatTile {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub stats: UserStats,
    pub cards: Vec<ProgressCard>,
    pub tiles: Vec<StatTile>,
}

fn percent(part: i32, whole: i32) -> f64 {
    if whole <= 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}

pub fn build_dashboard(stats: UserStats) -> Dashboard {
    let workout_progress = percent(stats.weekly_workout_completed, stats.weekly_workout_goal);
    let calorie_progress = percent(stats.calories_consumed, stats.calories_goal);
    let task_progress = percent(stats.fitness_tasks_completed, stats.fitness_tasks_total);

    let cards = vec![
        ProgressCard {
            title: "Weekly Workout Goal",
            value: format!("{}/{}", stats.weekly_workout_completed, stats.weekly_workout_goal),
            subtitle: "workouts completed".into(),
            progress: workout_progress,
            trend: if workout_progress > 50.0 { Trend::Up } else { Trend::Stable },
        },
        ProgressCard {
            title: "Calorie Goal",
            value: stats.calories_consumed.to_string(),
            subtitle: format!("of {} kcal", stats.calories_goal),
            progress: calorie_progress.min(100.0),
            trend: if calorie_progress > 80.0 {
                Trend::Up
            } else if calorie_progress > 50.0 {
                Trend::Stable
            } else {
                Trend::Down
            },
        },
        ProgressCard {
            title: "Tasks Done",
            value: format!("{}/{}", stats.fitness_tasks_completed, stats.fitness_tasks_total),
            subtitle: "fitness tasks".into(),
            progress: task_progress,
            trend: if task_progress > 70.0 { Trend::Up } else { Trend::Stable },
        },
    ];

    let tiles = vec![
        StatTile {
            label: "Steps Today",
            value: stats.steps_today.to_string(),
        },
        StatTile {
            label: "Calories Burned",
            value: stats.calories_burned.to_string(),
        },
        StatTile {
            label: "Goal Progress",
            value: format!("{}%", stats.goal_progress),
        },
        StatTile {
            label: "Streak Days",
            value: stats.streak_days.to_string(),
        },
    ];

    Dashboard { stats, cards, tiles }
}
