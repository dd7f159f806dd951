//src/session.rs
//! The active workout and the commands that mutate it.
//!
//! A [`WorkoutSession`] is only changed through [`SessionCommand`]s. Each command
//! is validated against the current session first and then applied to an owned
//! value, so a rejected command never leaves a partially updated session behind.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::catalog::{Exercise, ExerciseCatalog};
use crate::stats::WorkoutRecord;
use crate::template::{WorkoutTemplate, MAX_PLANNED_SETS};

pub const DEFAULT_RIR: &str = "3";
pub const DEFAULT_ADDED_SETS: u32 = 3;
pub const DEFAULT_ADDED_REPS: &str = "10";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Template has no exercises to start a workout from.")]
    EmptyTemplateExercises,
    #[error("A workout session is already active.")]
    SessionAlreadyActive,
    #[error("No workout session is active.")]
    NoActiveSession,
    #[error("Cannot finish a workout with no completed sets.")]
    NoCompletedSets,
    #[error("{what} index {index} out of range (length {len})")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },
    #[error("Unknown set field: '{0}'")]
    UnknownSetField(String),
    #[error("Unknown set type: '{0}'")]
    UnknownSetType(String),
}

impl SessionError {
    /// Short notification suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            Self::EmptyTemplateExercises => {
                "This template has no exercises. Please edit it first to add exercises.".into()
            }
            Self::SessionAlreadyActive => {
                "A workout is already in progress. Finish or cancel it first.".into()
            }
            Self::NoActiveSession => "No workout in progress. Start one from a template.".into(),
            Self::NoCompletedSets => {
                "Complete at least one set before finishing your workout!".into()
            }
            Self::UnknownSetField(name) => format!(
                "'{name}' is not a set field (use one of: {}).",
                join_names(SetField::iter())
            ),
            Self::UnknownSetType(name) => format!(
                "'{name}' is not a known set type (use one of: {}).",
                join_names(SetType::iter())
            ),
            // A malformed index is a defect in the caller; show everything we know.
            Self::IndexOutOfRange { .. } => self.to_string(),
        }
    }
}

fn join_names<T: fmt::Display>(values: impl Iterator<Item = T>) -> String {
    values.map(|v| v.to_string()).collect::<Vec<_>>().join(", ")
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum WeightUnit {
    #[default]
    Kg,
    Lbs,
}

impl WeightUnit {
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Kg => Self::Lbs,
            Self::Lbs => Self::Kg,
        }
    }
}

impl fmt::Display for WeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeightUnit::Kg => write!(f, "kg"),
            WeightUnit::Lbs => write!(f, "lbs"),
        }
    }
}

/// Descriptive tag for a set. Has no effect on statistics.
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SetType {
    #[default]
    Normal,
    Warmup,
    Drop,
    Super,
    Failure,
    RestPause,
}

impl SetType {
    pub fn parse(value: &str) -> Result<Self, SessionError> {
        Self::from_str(value.trim()).map_err(|_| SessionError::UnknownSetType(value.to_string()))
    }
}

/// The free-text fields of a set that `UpdateSetField` may replace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SetField {
    Weight,
    Reps,
    Time,
    Distance,
    Rir,
}

impl SetField {
    pub fn parse(value: &str) -> Result<Self, SessionError> {
        Self::from_str(value.trim()).map_err(|_| SessionError::UnknownSetField(value.to_string()))
    }
}

/// One logged set. Numeric-looking fields stay as typed text; they are only
/// parsed when statistics are computed.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SetEntry {
    #[serde(default)]
    pub weight: String,
    #[serde(default)]
    pub reps: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub distance: String,
    #[serde(default = "default_rir")]
    pub rir: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub set_type: SetType,
}

fn default_rir() -> String {
    DEFAULT_RIR.to_string()
}

impl Default for SetEntry {
    fn default() -> Self {
        Self {
            weight: String::new(),
            reps: String::new(),
            time: String::new(),
            distance: String::new(),
            rir: default_rir(),
            completed: false,
            set_type: SetType::Normal,
        }
    }
}

impl SetEntry {
    pub fn field(&self, field: SetField) -> &str {
        match field {
            SetField::Weight => &self.weight,
            SetField::Reps => &self.reps,
            SetField::Time => &self.time,
            SetField::Distance => &self.distance,
            SetField::Rir => &self.rir,
        }
    }

    fn field_mut(&mut self, field: SetField) -> &mut String {
        match field {
            SetField::Weight => &mut self.weight,
            SetField::Reps => &mut self.reps,
            SetField::Time => &mut self.time,
            SetField::Distance => &mut self.distance,
            SetField::Rir => &mut self.rir,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutExercise {
    #[serde(flatten)]
    pub exercise: Exercise,
    pub planned_sets: u32,
    pub planned_reps: String,
    #[serde(default)]
    pub weight_unit: WeightUnit,
    #[serde(default)]
    pub actual_sets: Vec<SetEntry>,
}

impl WorkoutExercise {
    /// Copies `exercise` into a session entry with `planned_sets` empty sets,
    /// capped at [`MAX_PLANNED_SETS`].
    pub fn planned(
        exercise: Exercise,
        planned_sets: u32,
        planned_reps: impl Into<String>,
        weight_unit: WeightUnit,
    ) -> Self {
        let planned_sets = planned_sets.min(MAX_PLANNED_SETS);
        Self {
            exercise,
            planned_sets,
            planned_reps: planned_reps.into(),
            weight_unit,
            actual_sets: vec![SetEntry::default(); planned_sets as usize],
        }
    }

    /// Entry used when an exercise is added mid-workout.
    pub fn with_defaults(exercise: Exercise) -> Self {
        Self::planned(exercise, DEFAULT_ADDED_SETS, DEFAULT_ADDED_REPS, WeightUnit::Kg)
    }

    pub fn name(&self) -> &str {
        &self.exercise.name
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSession {
    pub id: i64,
    pub template_name: String,
    #[serde(default)]
    pub exercises: Vec<WorkoutExercise>,
    pub start_time: i64, // Milliseconds since the Unix epoch
}

/// Mutations accepted by an active session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    UpdateSetField {
        exercise: usize,
        set: usize,
        field: SetField,
        value: String,
    },
    AddSet {
        exercise: usize,
    },
    /// No minimum is enforced; an exercise may end up with zero sets.
    RemoveSet {
        exercise: usize,
        set: usize,
    },
    /// Flips kg/lbs for one exercise. Weights already entered are NOT converted.
    ToggleWeightUnit {
        exercise: usize,
    },
    /// Toggles the `completed` flag.
    CompleteSet {
        exercise: usize,
        set: usize,
    },
    SetType {
        exercise: usize,
        set: usize,
        set_type: SetType,
    },
    AddExercise {
        exercise: Exercise,
    },
    RemoveExercise {
        exercise: usize,
    },
    /// Removes the exercise at `from` and reinserts it at `to`.
    ReorderExercise {
        from: usize,
        to: usize,
    },
}

impl WorkoutSession {
    /// Builds a session from `template`, copying exercises out of `catalog`.
    ///
    /// Template entries whose exercise id is not in the catalog are dropped with a
    /// warning. Fails when the template (or what is left of it) has no exercises.
    pub fn from_template(
        template: &WorkoutTemplate,
        catalog: &dyn ExerciseCatalog,
        now: i64,
    ) -> Result<Self, SessionError> {
        if template.exercises.is_empty() {
            return Err(SessionError::EmptyTemplateExercises);
        }

        let exercises: Vec<WorkoutExercise> = template
            .exercises
            .iter()
            .filter_map(|planned| match catalog.lookup(planned.exercise_id) {
                Some(exercise) => Some(WorkoutExercise::planned(
                    exercise,
                    planned.sets,
                    planned.reps.clone(),
                    planned.weight_unit,
                )),
                None => {
                    warn!(
                        template = %template.name,
                        exercise_id = planned.exercise_id,
                        "Exercise missing from catalog, leaving it out of the workout"
                    );
                    None
                }
            })
            .collect();

        if exercises.is_empty() {
            return Err(SessionError::EmptyTemplateExercises);
        }

        Ok(Self {
            id: now,
            template_name: template.name.clone(),
            exercises,
            start_time: now,
        })
    }

    pub fn total_sets(&self) -> usize {
        self.exercises.iter().map(|e| e.actual_sets.len()).sum()
    }

    /// Checks every index `command` refers to without changing anything.
    pub fn validate(&self, command: &SessionCommand) -> Result<(), SessionError> {
        match *command {
            SessionCommand::UpdateSetField { exercise, set, .. }
            | SessionCommand::RemoveSet { exercise, set }
            | SessionCommand::CompleteSet { exercise, set }
            | SessionCommand::SetType { exercise, set, .. } => {
                self.check_set(exercise, set)?;
            }
            SessionCommand::AddSet { exercise }
            | SessionCommand::ToggleWeightUnit { exercise }
            | SessionCommand::RemoveExercise { exercise } => {
                self.check_exercise(exercise)?;
            }
            SessionCommand::ReorderExercise { from, to } => {
                self.check_exercise(from)?;
                self.check_exercise(to)?;
            }
            SessionCommand::AddExercise { .. } => {}
        }
        Ok(())
    }

    /// Validates and applies `command`, returning the next session.
    pub fn apply(self, command: SessionCommand) -> Result<Self, SessionError> {
        self.validate(&command)?;
        Ok(self.transition(command))
    }

    // Callers must have validated `command` against `self`.
    fn transition(mut self, command: SessionCommand) -> Self {
        debug!(?command, "Applying session command");
        match command {
            SessionCommand::UpdateSetField {
                exercise,
                set,
                field,
                value,
            } => {
                *self.exercises[exercise].actual_sets[set].field_mut(field) = value;
            }
            SessionCommand::AddSet { exercise } => {
                self.exercises[exercise]
                    .actual_sets
                    .push(SetEntry::default());
            }
            SessionCommand::RemoveSet { exercise, set } => {
                self.exercises[exercise].actual_sets.remove(set);
            }
            SessionCommand::ToggleWeightUnit { exercise } => {
                let entry = &mut self.exercises[exercise];
                entry.weight_unit = entry.weight_unit.toggled();
            }
            SessionCommand::CompleteSet { exercise, set } => {
                let entry = &mut self.exercises[exercise].actual_sets[set];
                entry.completed = !entry.completed;
            }
            SessionCommand::SetType {
                exercise,
                set,
                set_type,
            } => {
                self.exercises[exercise].actual_sets[set].set_type = set_type;
            }
            SessionCommand::AddExercise { exercise } => {
                self.exercises.push(WorkoutExercise::with_defaults(exercise));
            }
            SessionCommand::RemoveExercise { exercise } => {
                self.exercises.remove(exercise);
            }
            SessionCommand::ReorderExercise { from, to } => {
                if from != to {
                    let moved = self.exercises.remove(from);
                    self.exercises.insert(to, moved);
                }
            }
        }
        self
    }

    fn check_exercise(&self, index: usize) -> Result<&WorkoutExercise, SessionError> {
        self.exercises
            .get(index)
            .ok_or(SessionError::IndexOutOfRange {
                what: "exercise",
                index,
                len: self.exercises.len(),
            })
    }

    fn check_set(&self, exercise: usize, set: usize) -> Result<(), SessionError> {
        let entry = self.check_exercise(exercise)?;
        if set >= entry.actual_sets.len() {
            return Err(SessionError::IndexOutOfRange {
                what: "set",
                index: set,
                len: entry.actual_sets.len(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Active,
}

/// Holds at most one active workout and moves it between `Idle` and `Active`.
#[derive(Debug, Clone, Default)]
pub struct SessionMachine {
    active: Option<WorkoutSession>,
}

impl SessionMachine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores a machine from a previously persisted session snapshot.
    pub fn resume(active: Option<WorkoutSession>) -> Self {
        Self { active }
    }

    pub const fn state(&self) -> SessionState {
        if self.active.is_some() {
            SessionState::Active
        } else {
            SessionState::Idle
        }
    }

    pub fn active(&self) -> Option<&WorkoutSession> {
        self.active.as_ref()
    }

    /// Starts a workout from `template`. Never replaces a session that is already active.
    pub fn start(
        &mut self,
        template: &WorkoutTemplate,
        catalog: &dyn ExerciseCatalog,
        now: i64,
    ) -> Result<&WorkoutSession, SessionError> {
        if self.active.is_some() {
            return Err(SessionError::SessionAlreadyActive);
        }
        let session = WorkoutSession::from_template(template, catalog, now)?;
        info!(
            template = %session.template_name,
            exercises = session.exercises.len(),
            "Workout started"
        );
        Ok(&*self.active.insert(session))
    }

    pub fn dispatch(&mut self, command: SessionCommand) -> Result<&WorkoutSession, SessionError> {
        let session = self.active.take().ok_or(SessionError::NoActiveSession)?;
        if let Err(e) = session.validate(&command) {
            self.active = Some(session);
            return Err(e);
        }
        Ok(&*self.active.insert(session.transition(command)))
    }

    /// Finalizes the active workout. The session stays active if nothing was completed.
    pub fn finish(&mut self, now: i64) -> Result<WorkoutRecord, SessionError> {
        let session = self.active.as_ref().ok_or(SessionError::NoActiveSession)?;
        let stats = crate::stats::compute_stats(session);
        if stats.completed_sets == 0 {
            return Err(SessionError::NoCompletedSets);
        }
        let session = self.active.take().ok_or(SessionError::NoActiveSession)?;
        let record = WorkoutRecord::finalize(session, stats, now);
        info!(
            template = %record.session.template_name,
            completed_sets = stats.completed_sets,
            total_volume = stats.total_volume,
            "Workout finished"
        );
        Ok(record)
    }

    /// Discards the active workout. Confirming with the user is the caller's job.
    pub fn cancel(&mut self) -> Result<WorkoutSession, SessionError> {
        let session = self.active.take().ok_or(SessionError::NoActiveSession)?;
        info!(template = %session.template_name, "Workout cancelled");
        Ok(session)
    }
}

