//src/catalog.rs
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use strum_macros::{Display, EnumString};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Exercise not found: ID {0}")]
    ExerciseNotFound(i64),
    #[error("Exercise name cannot be empty.")]
    EmptyExerciseName,
}

impl CatalogError {
    /// Short notification suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            Self::ExerciseNotFound(id) => format!("No exercise with ID {id} in the library."),
            Self::EmptyExerciseName => "Please enter an exercise name.".to_string(),
        }
    }
}

/// Which measurable dimensions are relevant for an exercise.
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum CountingMethod {
    #[default]
    WeightReps,
    WeightTime,
    TimeOnly,
    RepsOnly,
    DistanceTime,
}

impl CountingMethod {
    pub const fn uses_weight(self) -> bool {
        matches!(self, Self::WeightReps | Self::WeightTime)
    }

    pub const fn uses_reps(self) -> bool {
        matches!(self, Self::WeightReps | Self::RepsOnly)
    }

    pub const fn uses_time(self) -> bool {
        matches!(self, Self::WeightTime | Self::TimeOnly | Self::DistanceTime)
    }

    pub const fn uses_distance(self) -> bool {
        matches!(self, Self::DistanceTime)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub equipment: String,
    #[serde(default)]
    pub counting_method: CountingMethod,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_custom: bool,
}

/// Read-only exercise lookup consumed by the session state machine.
pub trait ExerciseCatalog {
    fn lookup(&self, id: i64) -> Option<Exercise>;
    fn list_all(&self) -> Vec<Exercise>;
}

#[derive(Default, Debug)]
pub struct ExerciseFilters<'a> {
    pub search: Option<&'a str>,   // Case-insensitive substring of the name
    pub category: Option<&'a str>, // Exact category match
}

// (id, name, category, equipment, counting method)
const BUILTIN_EXERCISES: &[(i64, &str, &str, &str, CountingMethod)] = &[
    (1, "Bench Press", "Chest", "Barbell", CountingMethod::WeightReps),
    (2, "Squat", "Legs & Glutes", "Barbell", CountingMethod::WeightReps),
    (3, "Plank", "Core", "Bodyweight", CountingMethod::TimeOnly),
    (4, "Deadlift", "Back", "Barbell", CountingMethod::WeightReps),
    (5, "Overhead Press", "Shoulders", "Barbell", CountingMethod::WeightReps),
    (6, "Barbell Row", "Back", "Barbell", CountingMethod::WeightReps),
    (7, "Incline Dumbbell Press", "Chest", "Dumbbell", CountingMethod::WeightReps),
    (8, "Pull-up", "Back", "Bodyweight", CountingMethod::RepsOnly),
    (9, "Push-up", "Chest", "Bodyweight", CountingMethod::RepsOnly),
    (10, "Romanian Deadlift", "Legs & Glutes", "Barbell", CountingMethod::WeightReps),
    (11, "Lunge", "Legs & Glutes", "Dumbbell", CountingMethod::WeightReps),
    (12, "Leg Press", "Legs & Glutes", "Machine", CountingMethod::WeightReps),
    (13, "Lateral Raise", "Shoulders", "Dumbbell", CountingMethod::WeightReps),
    (14, "Bicep Curl", "Arms", "Dumbbell", CountingMethod::WeightReps),
    (15, "Tricep Pushdown", "Arms", "Cable", CountingMethod::WeightReps),
    (16, "Farmer's Carry", "Full Body", "Dumbbell", CountingMethod::WeightTime),
    (17, "Dead Hang", "Back", "Bodyweight", CountingMethod::TimeOnly),
    (18, "Hanging Leg Raise", "Core", "Bodyweight", CountingMethod::RepsOnly),
    (19, "Running", "Cardio", "None", CountingMethod::DistanceTime),
    (20, "Rowing Machine", "Cardio", "Machine", CountingMethod::DistanceTime),
];

/// The built-in exercise directory plus any exercises the user created.
#[derive(Debug, Clone)]
pub struct ExerciseLibrary {
    builtin: Vec<Exercise>,
    custom: Vec<Exercise>,
}

impl Default for ExerciseLibrary {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl ExerciseLibrary {
    pub fn new(custom: Vec<Exercise>) -> Self {
        let builtin = BUILTIN_EXERCISES
            .iter()
            .map(|&(id, name, category, equipment, counting_method)| Exercise {
                id,
                name: name.to_string(),
                category: category.to_string(),
                equipment: equipment.to_string(),
                counting_method,
                is_custom: false,
            })
            .collect();
        Self { builtin, custom }
    }

    pub fn custom_exercises(&self) -> &[Exercise] {
        &self.custom
    }

    /// Adds a user-defined exercise. `id` must not collide with an existing one;
    /// the next free id at or above it is used.
    pub fn add_custom(
        &mut self,
        id: i64,
        name: &str,
        category: &str,
        equipment: &str,
        counting_method: CountingMethod,
    ) -> Result<Exercise, CatalogError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(CatalogError::EmptyExerciseName);
        }
        let max_id = self.iter().map(|e| e.id).max().unwrap_or(0);
        let exercise = Exercise {
            id: id.max(max_id + 1),
            name: trimmed.to_string(),
            category: non_empty_or(category, "Custom"),
            equipment: non_empty_or(equipment, "Other"),
            counting_method,
            is_custom: true,
        };
        self.custom.push(exercise.clone());
        Ok(exercise)
    }

    pub fn get(&self, id: i64) -> Result<Exercise, CatalogError> {
        self.lookup(id).ok_or(CatalogError::ExerciseNotFound(id))
    }

    pub fn search(&self, filters: &ExerciseFilters) -> Vec<Exercise> {
        let needle = filters.search.map(str::to_lowercase);
        self.iter()
            .filter(|e| {
                needle
                    .as_deref()
                    .map_or(true, |n| e.name.to_lowercase().contains(n))
            })
            .filter(|e| filters.category.map_or(true, |c| e.category == c))
            .cloned()
            .collect()
    }

    /// Distinct categories, sorted.
    pub fn categories(&self) -> Vec<String> {
        self.iter()
            .map(|e| e.category.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn iter(&self) -> impl Iterator<Item = &Exercise> {
        self.builtin.iter().chain(self.custom.iter())
    }
}

impl ExerciseCatalog for ExerciseLibrary {
    fn lookup(&self, id: i64) -> Option<Exercise> {
        self.iter().find(|e| e.id == id).cloned()
    }

    fn list_all(&self) -> Vec<Exercise> {
        self.iter().cloned().collect()
    }
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}
