//src/template.rs
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::session::WeightUnit;

pub const DEFAULT_TEMPLATE_SETS: u32 = 3;
pub const DEFAULT_TEMPLATE_REPS: &str = "8-10";
/// Upper bound on planned sets per exercise.
pub const MAX_PLANNED_SETS: u32 = 50;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("Template name cannot be empty.")]
    EmptyTemplateName,
    #[error("Exercise {0} is already in this template.")]
    DuplicateExerciseInTemplate(i64),
    #[error("Template not found: ID {0}")]
    TemplateNotFound(i64),
    #[error("Template not found: '{0}'")]
    TemplateNameNotFound(String),
    #[error("Exercise {0} is not part of this template.")]
    ExerciseNotInTemplate(i64),
    #[error("{sets} sets planned for exercise {exercise_id}; at most {} allowed.", MAX_PLANNED_SETS)]
    TooManySets { exercise_id: i64, sets: u32 },
}

impl TemplateError {
    /// Short notification suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            Self::EmptyTemplateName => "Please enter a template name.".into(),
            Self::DuplicateExerciseInTemplate(_) => {
                "That exercise is already in this template.".into()
            }
            Self::TemplateNotFound(_) | Self::TemplateNameNotFound(_) => {
                "That template no longer exists.".into()
            }
            Self::ExerciseNotInTemplate(_) => "That exercise is not in this template.".into(),
            Self::TooManySets { .. } => {
                format!("Plan at most {MAX_PLANNED_SETS} sets per exercise.")
            }
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TemplateExercise {
    pub exercise_id: i64,
    pub sets: u32,
    pub reps: String,
    #[serde(default)]
    pub weight_unit: WeightUnit,
}

impl TemplateExercise {
    pub fn new(exercise_id: i64, sets: u32, reps: impl Into<String>, weight_unit: WeightUnit) -> Self {
        Self {
            exercise_id,
            sets,
            reps: reps.into(),
            weight_unit,
        }
    }
}

/// One field of a planned exercise, with its new value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateExerciseField {
    Sets(u32),
    Reps(String),
    WeightUnit(WeightUnit),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutTemplate {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub exercises: Vec<TemplateExercise>,
}

impl WorkoutTemplate {
    pub fn contains(&self, exercise_id: i64) -> bool {
        self.exercises.iter().any(|e| e.exercise_id == exercise_id)
    }

    /// Appends `exercise_id` with 3 sets of "8-10" in kg.
    pub fn add_exercise(&mut self, exercise_id: i64) -> Result<&TemplateExercise, TemplateError> {
        if self.contains(exercise_id) {
            return Err(TemplateError::DuplicateExerciseInTemplate(exercise_id));
        }
        self.exercises.push(TemplateExercise::new(
            exercise_id,
            DEFAULT_TEMPLATE_SETS,
            DEFAULT_TEMPLATE_REPS,
            WeightUnit::Kg,
        ));
        Ok(&self.exercises[self.exercises.len() - 1])
    }

    pub fn remove_exercise(&mut self, exercise_id: i64) -> Result<TemplateExercise, TemplateError> {
        let pos = self
            .exercises
            .iter()
            .position(|e| e.exercise_id == exercise_id)
            .ok_or(TemplateError::ExerciseNotInTemplate(exercise_id))?;
        Ok(self.exercises.remove(pos))
    }

    pub fn update_exercise_field(
        &mut self,
        exercise_id: i64,
        field: TemplateExerciseField,
    ) -> Result<(), TemplateError> {
        let entry = self
            .exercises
            .iter_mut()
            .find(|e| e.exercise_id == exercise_id)
            .ok_or(TemplateError::ExerciseNotInTemplate(exercise_id))?;
        match field {
            TemplateExerciseField::Sets(sets) => {
                check_sets(exercise_id, sets)?;
                entry.sets = sets;
            }
            TemplateExerciseField::Reps(reps) => entry.reps = reps,
            TemplateExerciseField::WeightUnit(unit) => entry.weight_unit = unit,
        }
        Ok(())
    }
}

fn check_sets(exercise_id: i64, sets: u32) -> Result<(), TemplateError> {
    if sets > MAX_PLANNED_SETS {
        return Err(TemplateError::TooManySets { exercise_id, sets });
    }
    Ok(())
}

/// The saved template collection. Edits go through a draft copy that is only
/// written back by [`TemplateManager::save`].
#[derive(Debug, Clone, Default)]
pub struct TemplateManager {
    templates: Vec<WorkoutTemplate>,
}

impl TemplateManager {
    pub fn new(templates: Vec<WorkoutTemplate>) -> Self {
        Self { templates }
    }

    pub fn templates(&self) -> &[WorkoutTemplate] {
        &self.templates
    }

    pub fn get(&self, id: i64) -> Result<&WorkoutTemplate, TemplateError> {
        self.templates
            .iter()
            .find(|t| t.id == id)
            .ok_or(TemplateError::TemplateNotFound(id))
    }

    /// Resolves an id or a (case-insensitive) name.
    pub fn resolve(&self, identifier: &str) -> Result<&WorkoutTemplate, TemplateError> {
        let trimmed = identifier.trim();
        if let Ok(id) = trimmed.parse::<i64>() {
            if let Ok(template) = self.get(id) {
                return Ok(template);
            }
        }
        self.templates
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| TemplateError::TemplateNameNotFound(trimmed.to_string()))
    }

    /// Creates an empty template. `now` seeds the id, bumped past existing ids if needed.
    pub fn create(&mut self, name: &str, now: i64) -> Result<&WorkoutTemplate, TemplateError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(TemplateError::EmptyTemplateName);
        }
        let max_id = self.templates.iter().map(|t| t.id).max().unwrap_or(0);
        let template = WorkoutTemplate {
            id: now.max(max_id + 1),
            name: trimmed.to_string(),
            exercises: Vec::new(),
        };
        info!(id = template.id, name = %template.name, "Template created");
        self.templates.push(template);
        Ok(&self.templates[self.templates.len() - 1])
    }

    /// Returns a working copy of the template for editing.
    pub fn edit(&self, id: i64) -> Result<WorkoutTemplate, TemplateError> {
        self.get(id).cloned()
    }

    /// Commits a draft over the template with the same id.
    pub fn save(&mut self, mut draft: WorkoutTemplate) -> Result<(), TemplateError> {
        let trimmed = draft.name.trim();
        if trimmed.is_empty() {
            return Err(TemplateError::EmptyTemplateName);
        }
        draft.name = trimmed.to_string();
        for entry in &draft.exercises {
            check_sets(entry.exercise_id, entry.sets)?;
        }
        let slot = self
            .templates
            .iter_mut()
            .find(|t| t.id == draft.id)
            .ok_or(TemplateError::TemplateNotFound(draft.id))?;
        *slot = draft;
        Ok(())
    }

    pub fn delete(&mut self, id: i64) -> Result<WorkoutTemplate, TemplateError> {
        let pos = self
            .templates
            .iter()
            .position(|t| t.id == id)
            .ok_or(TemplateError::TemplateNotFound(id))?;
        info!(id, "Template deleted");
        Ok(self.templates.remove(pos))
    }
}
