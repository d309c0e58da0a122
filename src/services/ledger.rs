//! In-memory set ledger for a workout session.
//!
//! Exercises and their sets are kept in insertion order; a set's index plus
//! one is the set number shown to the user. Sets are only ever appended or
//! edited, never removed, and every operation is total: unknown ids are a
//! no-op rather than an error.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

pub const PLACEHOLDER_EXERCISE_NAME: &str = "New Exercise";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkoutSet {
    pub id: Uuid,
    pub weight: u32,
    pub reps: u32,
    pub completed: bool,
    pub previous: String,
}

impl WorkoutSet {
    fn zeroed() -> Self {
        Self {
            id: Uuid::new_v4(),
            weight: 0,
            reps: 0,
            completed: false,
            previous: previous_label(None),
        }
    }

    fn following(last: &WorkoutSet) -> Self {
        Self {
            id: Uuid::new_v4(),
            weight: last.weight,
            reps: last.reps,
            completed: false,
            previous: previous_label(Some(last)),
        }
    }
}

fn previous_label(last: Option<&WorkoutSet>) -> String {
    match last {
        Some(set) => format!("{}kg x {}", set.weight, set.reps),
        None => "0kg x 0".to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExerciseLog {
    pub id: Uuid,
    pub name: String,
    pub image_url: Option<String>,
    pub notes: String,
    pub sets: Vec<WorkoutSet>,
    pub rest_timer_active: bool,
}

impl ExerciseLog {
    fn new(id: Uuid, name: String, image_url: Option<String>) -> Self {
        Self {
            id,
            name,
            image_url,
            notes: String::new(),
            sets: vec![WorkoutSet::zeroed()],
            rest_timer_active: false,
        }
    }
}

/// One entry of the routine a session is started from.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoutineExercise {
    pub id: Option<Uuid>,
    pub name: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SetField {
    Weight,
    Reps,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Ledger {
    exercises: Vec<ExerciseLog>,
}

impl Ledger {
    /// Seed a ledger from a routine. Entries without a usable name are
    /// skipped; duplicate or missing ids get a fresh one.
    pub fn from_routine(routine: &[RoutineExercise]) -> Self {
        let mut ledger = Self::default();
        for entry in routine {
            let name = match entry.name.as_deref().map(str::trim) {
                Some(name) if !name.is_empty() => name.to_string(),
                _ => continue,
            };
            let id = match entry.id {
                Some(id) if ledger.exercise(id).is_none() => id,
                _ => Uuid::new_v4(),
            };
            ledger
                .exercises
                .push(ExerciseLog::new(id, name, entry.image_url.clone()));
        }
        ledger
    }

    pub fn exercises(&self) -> &[ExerciseLog] {
        &self.exercises
    }

    pub fn exercise(&self, exercise_id: Uuid) -> Option<&ExerciseLog> {
        self.exercises.iter().find(|e| e.id == exercise_id)
    }

    fn exercise_mut(&mut self, exercise_id: Uuid) -> Option<&mut ExerciseLog> {
        self.exercises.iter_mut().find(|e| e.id == exercise_id)
    }

    fn set_mut(&mut self, exercise_id: Uuid, set_id: Uuid) -> Option<&mut WorkoutSet> {
        self.exercise_mut(exercise_id)?
            .sets
            .iter_mut()
            .find(|s| s.id == set_id)
    }

    pub fn add_exercise(&mut self, name: Option<&str>) -> Uuid {
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(PLACEHOLDER_EXERCISE_NAME)
            .to_string();
        let id = Uuid::new_v4();
        self.exercises.push(ExerciseLog::new(id, name, None));
        id
    }

    /// Append a set that copies the last set's weight and reps. Returns the
    /// new set id, or `None` when the exercise does not exist.
    pub fn add_set(&mut self, exercise_id: Uuid) -> Option<Uuid> {
        let exercise = self.exercise_mut(exercise_id)?;
        let set = match exercise.sets.last() {
            Some(last) => WorkoutSet::following(last),
            None => WorkoutSet::zeroed(),
        };
        let id = set.id;
        exercise.sets.push(set);
        Some(id)
    }

    pub fn update_set(&mut self, exercise_id: Uuid, set_id: Uuid, field: SetField, value: &Value) {
        let value = coerce_count(value);
        if let Some(set) = self.set_mut(exercise_id, set_id) {
            match field {
                SetField::Weight => set.weight = value,
                SetField::Reps => set.reps = value,
            }
        }
    }

    pub fn toggle_set_complete(&mut self, exercise_id: Uuid, set_id: Uuid) {
        if let Some(set) = self.set_mut(exercise_id, set_id) {
            set.completed = !set.completed;
        }
    }

    pub fn update_notes(&mut self, exercise_id: Uuid, notes: &str) {
        if let Some(exercise) = self.exercise_mut(exercise_id) {
            exercise.notes = notes.to_string();
        }
    }

    pub fn toggle_rest_timer(&mut self, exercise_id: Uuid) {
        if let Some(exercise) = self.exercise_mut(exercise_id) {
            exercise.rest_timer_active = !exercise.rest_timer_active;
        }
    }
}

/// Coerce raw input into a non-negative count. Anything that does not start
/// with a non-negative integer becomes zero; fractional input is truncated.
pub fn coerce_count(value: &Value) -> u32 {
    match value {
        Value::Number(n) => {
            if let Some(v) = n.as_u64() {
                v.min(u32::MAX as u64) as u32
            } else {
                match n.as_f64() {
                    Some(f) if f.is_finite() && f >= 0.0 => f.trunc().min(u32::MAX as f64) as u32,
                    _ => 0,
                }
            }
        }
        Value::String(s) => parse_leading_count(s),
        _ => 0,
    }
}

fn parse_leading_count(raw: &str) -> u32 {
    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if negative || end == 0 {
        return 0;
    }
    digits[..end]
        .parse::<u64>()
        .map(|v| v.min(u32::MAX as u64) as u32)
        .unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ledger_with_one_exercise() -> (Ledger, Uuid) {
        let mut ledger = Ledger::default();
        let id = ledger.add_exercise(Some("Bench Press"));
        (ledger, id)
    }

    fn first_set(ledger: &Ledger, exercise_id: Uuid) -> Uuid {
        ledger.exercise(exercise_id).unwrap().sets[0].id
    }

    #[test]
    fn test_add_exercise_starts_with_one_zero_set() {
        let (ledger, id) = ledger_with_one_exercise();
        let exercise = ledger.exercise(id).unwrap();
        assert_eq!(exercise.name, "Bench Press");
        assert_eq!(exercise.sets.len(), 1);
        assert_eq!(exercise.sets[0].weight, 0);
        assert_eq!(exercise.sets[0].reps, 0);
        assert_eq!(exercise.sets[0].previous, "0kg x 0");
        assert!(!exercise.rest_timer_active);
    }

    #[test]
    fn test_add_exercise_without_name_uses_placeholder() {
        let mut ledger = Ledger::default();
        let a = ledger.add_exercise(None);
        let b = ledger.add_exercise(Some("   "));
        assert_eq!(ledger.exercise(a).unwrap().name, PLACEHOLDER_EXERCISE_NAME);
        assert_eq!(ledger.exercise(b).unwrap().name, PLACEHOLDER_EXERCISE_NAME);
        assert_ne!(a, b);
    }

    #[test]
    fn test_add_set_copies_last_set() {
        let (mut ledger, ex) = ledger_with_one_exercise();
        let set = first_set(&ledger, ex);
        ledger.update_set(ex, set, SetField::Weight, &json!(20));
        ledger.update_set(ex, set, SetField::Reps, &json!(10));

        let new_id = ledger.add_set(ex).unwrap();
        let exercise = ledger.exercise(ex).unwrap();
        let new_set = exercise.sets.iter().find(|s| s.id == new_id).unwrap();
        assert_eq!(exercise.sets.len(), 2);
        assert_eq!(new_set.weight, 20);
        assert_eq!(new_set.reps, 10);
        assert_eq!(new_set.previous, "20kg x 10");
        assert!(!new_set.completed);
    }

    #[test]
    fn test_previous_label_is_fixed_at_creation() {
        let (mut ledger, ex) = ledger_with_one_exercise();
        let set = first_set(&ledger, ex);
        ledger.update_set(ex, set, SetField::Weight, &json!(40));
        let second = ledger.add_set(ex).unwrap();
        ledger.update_set(ex, set, SetField::Weight, &json!(90));

        let exercise = ledger.exercise(ex).unwrap();
        let second = exercise.sets.iter().find(|s| s.id == second).unwrap();
        assert_eq!(second.previous, "40kg x 0");
    }

    #[test]
    fn test_add_set_unknown_exercise_is_noop() {
        let (mut ledger, _) = ledger_with_one_exercise();
        let before = ledger.clone();
        assert!(ledger.add_set(Uuid::new_v4()).is_none());
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_update_set_unknown_ids_is_noop() {
        let (mut ledger, ex) = ledger_with_one_exercise();
        let before = ledger.clone();
        ledger.update_set(ex, Uuid::new_v4(), SetField::Reps, &json!(5));
        ledger.update_set(Uuid::new_v4(), Uuid::new_v4(), SetField::Reps, &json!(5));
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_toggle_twice_restores_flag() {
        let (mut ledger, ex) = ledger_with_one_exercise();
        let set = first_set(&ledger, ex);
        ledger.toggle_set_complete(ex, set);
        assert!(ledger.exercise(ex).unwrap().sets[0].completed);
        ledger.toggle_set_complete(ex, set);
        assert!(!ledger.exercise(ex).unwrap().sets[0].completed);
    }

    #[test]
    fn test_notes_and_rest_timer() {
        let (mut ledger, ex) = ledger_with_one_exercise();
        ledger.update_notes(ex, "keep elbows tucked");
        ledger.toggle_rest_timer(ex);
        let exercise = ledger.exercise(ex).unwrap();
        assert_eq!(exercise.notes, "keep elbows tucked");
        assert!(exercise.rest_timer_active);
        ledger.toggle_rest_timer(ex);
        assert!(!ledger.exercise(ex).unwrap().rest_timer_active);
    }

    #[test]
    fn test_from_routine_skips_unnamed_and_dedupes_ids() {
        let shared = Uuid::new_v4();
        let routine = vec![
            RoutineExercise {
                id: Some(shared),
                name: Some("Squat".into()),
                image_url: Some("https://img/squat.png".into()),
            },
            RoutineExercise {
                id: None,
                name: None,
                image_url: None,
            },
            RoutineExercise {
                id: Some(shared),
                name: Some("Deadlift".into()),
                image_url: None,
            },
        ];
        let ledger = Ledger::from_routine(&routine);
        assert_eq!(ledger.exercises().len(), 2);
        assert_eq!(ledger.exercises()[0].id, shared);
        assert_eq!(ledger.exercises()[0].image_url.as_deref(), Some("https://img/squat.png"));
        assert_ne!(ledger.exercises()[1].id, shared);
        assert!(ledger.exercises().iter().all(|e| e.sets.len() == 1));
    }

    #[test]
    fn test_coerce_count() {
        assert_eq!(coerce_count(&json!(12)), 12);
        assert_eq!(coerce_count(&json!(12.9)), 12);
        assert_eq!(coerce_count(&json!(-4)), 0);
        assert_eq!(coerce_count(&json!("15")), 15);
        assert_eq!(coerce_count(&json!(" 42kg")), 42);
        assert_eq!(coerce_count(&json!("-3")), 0);
        assert_eq!(coerce_count(&json!("abc")), 0);
        assert_eq!(coerce_count(&json!("")), 0);
        assert_eq!(coerce_count(&json!(null)), 0);
        assert_eq!(coerce_count(&json!(true)), 0);
    }
}
