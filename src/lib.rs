// src/lib.rs
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

// --- Declare modules ---
pub mod catalog;
mod config;
pub mod db;
pub mod measurement;
pub mod session;
pub mod stats;
pub mod template;

// --- Expose public types ---
pub use catalog::{
    CatalogError, CountingMethod, Exercise, ExerciseCatalog, ExerciseFilters, ExerciseLibrary,
};
pub use config::{
    get_config_path as get_config_path_util, load as load_config_util, parse_color,
    save as save_config_util, Config, ConfigError, StandardColor, Theme, Units,
};
pub use db::{get_db_path as get_db_path_util, DbError};
pub use measurement::{Measurement, MeasurementError, MeasurementLog};
pub use session::{
    SessionCommand, SessionError, SessionMachine, SessionState, SetEntry, SetField, SetType,
    WeightUnit, WorkoutExercise, WorkoutSession,
};
pub use stats::{
    compute_stats, elapsed_seconds, format_duration, previous_performance, PreviousPerformance,
    WorkoutRecord, WorkoutStats, LBS_PER_KG,
};
pub use template::{
    TemplateError, TemplateExercise, TemplateExerciseField, TemplateManager, WorkoutTemplate,
};

/// Current wall-clock time in milliseconds, the timestamp unit used for ids and times.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Converts a kg volume for display in the configured units.
pub fn volume_for_display(volume_kg: i64, units: Units) -> (f64, &'static str) {
    match units {
        Units::Metric => (volume_kg as f64, "kg"),
        Units::Imperial => (volume_kg as f64 * LBS_PER_KG, "lbs"),
    }
}

/// Maps an error coming out of `AppService` to a short user-facing message.
pub fn user_message(err: &anyhow::Error) -> String {
    if let Some(e) = err.downcast_ref::<SessionError>() {
        e.user_message()
    } else if let Some(e) = err.downcast_ref::<TemplateError>() {
        e.user_message()
    } else if let Some(e) = err.downcast_ref::<CatalogError>() {
        e.user_message()
    } else if let Some(e) = err.downcast_ref::<MeasurementError>() {
        e.user_message()
    } else {
        format!("{err:#}")
    }
}

/// A write that failed. The in-memory state is kept; the caller decides how to tell the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistenceWarning {
    pub key: &'static str,
    pub message: String,
}

impl fmt::Display for PersistenceWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Could not save {}: {}", self.key, self.message)
    }
}

pub struct AppService {
    pub config: Config,
    pub conn: Connection,
    pub db_path: PathBuf,
    pub config_path: PathBuf,
    library: ExerciseLibrary,
    templates: TemplateManager,
    machine: SessionMachine,
    history: Vec<WorkoutRecord>, // Newest first
    measurements: MeasurementLog,
    warnings: Vec<PersistenceWarning>,
}

impl AppService {
    /// Initializes the application service from the config file and database on disk.
    /// # Errors
    /// Returns `anyhow::Error` if config/db path determination, loading, or initialization fails.
    pub fn initialize() -> Result<Self> {
        let config_path =
            config::get_config_path().context("Failed to determine configuration file path")?;
        let config = config::load(&config_path)
            .with_context(|| format!("Failed to load config from {config_path:?}"))?;

        let db_path = db::get_db_path().context("Failed to determine database path")?;
        let conn = db::open_db(&db_path)
            .with_context(|| format!("Failed to open database at {db_path:?}"))?;

        Self::with_connection(config, conn, db_path, config_path)
    }

    /// Builds the service over an already open connection and loads all stored state.
    /// Stored values that cannot be read are logged and replaced by empty defaults.
    /// # Errors
    /// Returns `anyhow::Error` if the schema cannot be created.
    pub fn with_connection(
        config: Config,
        conn: Connection,
        db_path: PathBuf,
        config_path: PathBuf,
    ) -> Result<Self> {
        db::init_db(&conn).context("Failed to initialize database schema")?;

        let templates: Vec<WorkoutTemplate> = db::load_or_default(&conn, db::KEY_TEMPLATES);
        let history: Vec<WorkoutRecord> = db::load_or_default(&conn, db::KEY_HISTORY);
        let measurements: Vec<Measurement> = db::load_or_default(&conn, db::KEY_MEASUREMENTS);
        let custom: Vec<Exercise> = db::load_or_default(&conn, db::KEY_CUSTOM_EXERCISES);
        let active = load_active_session(&conn);

        info!(
            templates = templates.len(),
            history = history.len(),
            active_session = active.is_some(),
            "Loaded stored state"
        );

        Ok(Self {
            config,
            conn,
            db_path,
            config_path,
            library: ExerciseLibrary::new(custom),
            templates: TemplateManager::new(templates),
            machine: SessionMachine::resume(active),
            history,
            measurements: MeasurementLog::new(measurements),
            warnings: Vec::new(),
        })
    }

    pub fn get_config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn get_db_path(&self) -> &Path {
        &self.db_path
    }

    /// Drains the persistence warnings collected since the last call.
    pub fn take_warnings(&mut self) -> Vec<PersistenceWarning> {
        std::mem::take(&mut self.warnings)
    }

    // --- Configuration ---

    /// # Errors
    /// Returns `ConfigError` if saving fails.
    pub fn save_config(&self) -> Result<(), ConfigError> {
        config::save(&self.config_path, &self.config)
    }

    /// # Errors
    /// `ConfigError::InvalidHistoryLimit` for 0, or a save failure.
    pub fn set_history_limit(&mut self, limit: u32) -> Result<(), ConfigError> {
        if limit == 0 {
            return Err(ConfigError::InvalidHistoryLimit);
        }
        self.config.history_limit = limit;
        self.save_config()
    }

    /// # Errors
    /// Returns `ConfigError` variants if saving fails.
    pub fn set_volume_units(&mut self, units: Units) -> Result<(), ConfigError> {
        self.config.volume_units = units;
        self.save_config()
    }

    /// # Errors
    /// `ConfigError::InvalidColor` for unknown names, or a save failure.
    pub fn set_header_color(&mut self, color: &str) -> Result<(), ConfigError> {
        parse_color(color)?;
        self.config.theme.header_color = color.trim().to_string();
        self.save_config()
    }

    // --- Exercise library ---

    pub fn list_exercises(&self, filters: &ExerciseFilters) -> Vec<Exercise> {
        self.library.search(filters)
    }

    pub fn exercise_categories(&self) -> Vec<String> {
        self.library.categories()
    }

    /// # Errors
    /// `CatalogError::ExerciseNotFound` if no exercise has this id.
    pub fn get_exercise(&self, id: i64) -> Result<Exercise> {
        Ok(self.library.get(id)?)
    }

    /// Adds a custom exercise to the library.
    /// # Errors
    /// `CatalogError::EmptyExerciseName` if the name is blank.
    pub fn create_custom_exercise(
        &mut self,
        name: &str,
        category: &str,
        equipment: &str,
        counting_method: CountingMethod,
    ) -> Result<Exercise> {
        let exercise =
            self.library
                .add_custom(now_millis(), name, category, equipment, counting_method)?;
        info!(id = exercise.id, name = %exercise.name, "Custom exercise created");
        let result = db::save(
            &self.conn,
            db::KEY_CUSTOM_EXERCISES,
            self.library.custom_exercises(),
        );
        self.record_write(db::KEY_CUSTOM_EXERCISES, result);
        Ok(exercise)
    }

    // --- Templates ---

    pub fn list_templates(&self) -> &[WorkoutTemplate] {
        self.templates.templates()
    }

    /// Looks a template up by id or name.
    /// # Errors
    /// `TemplateError` if nothing matches.
    pub fn get_template(&self, identifier: &str) -> Result<&WorkoutTemplate> {
        Ok(self.templates.resolve(identifier)?)
    }

    /// # Errors
    /// `TemplateError::EmptyTemplateName` if the name is blank.
    pub fn create_template(&mut self, name: &str) -> Result<WorkoutTemplate> {
        let template = self.templates.create(name, now_millis())?.clone();
        self.persist_templates();
        Ok(template)
    }

    /// Returns an editable copy of a template. Changes are kept only after `save_template`.
    /// # Errors
    /// `TemplateError::TemplateNotFound` for an unknown id.
    pub fn edit_template(&self, id: i64) -> Result<WorkoutTemplate> {
        Ok(self.templates.edit(id)?)
    }

    /// # Errors
    /// `TemplateError::EmptyTemplateName` or `TemplateError::TemplateNotFound`.
    pub fn save_template(&mut self, draft: WorkoutTemplate) -> Result<()> {
        self.templates.save(draft)?;
        self.persist_templates();
        Ok(())
    }

    /// # Errors
    /// `TemplateError` if the template is missing or the new name is blank.
    pub fn rename_template(&mut self, id: i64, new_name: &str) -> Result<()> {
        let mut draft = self.edit_template(id)?;
        draft.name = new_name.to_string();
        self.save_template(draft)
    }

    /// # Errors
    /// `TemplateError::TemplateNotFound` for an unknown id.
    pub fn delete_template(&mut self, id: i64) -> Result<WorkoutTemplate> {
        let removed = self.templates.delete(id)?;
        self.persist_templates();
        Ok(removed)
    }

    /// Adds a library exercise to a template with the default plan (3 x "8-10", kg).
    /// # Errors
    /// `CatalogError::ExerciseNotFound`, `TemplateError::TemplateNotFound` or
    /// `TemplateError::DuplicateExerciseInTemplate`.
    pub fn add_exercise_to_template(
        &mut self,
        template_id: i64,
        exercise_id: i64,
    ) -> Result<TemplateExercise> {
        self.library.get(exercise_id)?;
        let mut draft = self.edit_template(template_id)?;
        let entry = draft.add_exercise(exercise_id)?.clone();
        self.save_template(draft)?;
        Ok(entry)
    }

    /// # Errors
    /// `TemplateError` if the template or the exercise entry does not exist.
    pub fn remove_exercise_from_template(
        &mut self,
        template_id: i64,
        exercise_id: i64,
    ) -> Result<TemplateExercise> {
        let mut draft = self.edit_template(template_id)?;
        let removed = draft.remove_exercise(exercise_id)?;
        self.save_template(draft)?;
        Ok(removed)
    }

    /// # Errors
    /// `TemplateError` if the template or the exercise entry does not exist.
    pub fn update_template_exercise(
        &mut self,
        template_id: i64,
        exercise_id: i64,
        field: TemplateExerciseField,
    ) -> Result<()> {
        let mut draft = self.edit_template(template_id)?;
        draft.update_exercise_field(exercise_id, field)?;
        self.save_template(draft)
    }

    // --- Active workout ---

    pub const fn session_state(&self) -> SessionState {
        self.machine.state()
    }

    pub fn active_workout(&self) -> Option<&WorkoutSession> {
        self.machine.active()
    }

    pub fn current_stats(&self) -> Option<WorkoutStats> {
        self.machine.active().map(compute_stats)
    }

    /// Seconds since the active workout started. A derived read; nothing is mutated.
    pub fn elapsed_seconds(&self, now: i64) -> Option<u64> {
        self.machine
            .active()
            .map(|s| elapsed_seconds(s.start_time, now))
    }

    /// Starts a workout from the template matching `identifier` (id or name).
    ///
    /// With `replace`, an active workout is discarded first; otherwise an active
    /// workout makes this fail with `SessionError::SessionAlreadyActive`.
    /// # Errors
    /// `TemplateError`, `SessionError::SessionAlreadyActive` or
    /// `SessionError::EmptyTemplateExercises`.
    pub fn start_workout(&mut self, identifier: &str, replace: bool) -> Result<WorkoutSession> {
        self.start_workout_at(identifier, replace, now_millis())
    }

    /// `start_workout` with an explicit clock reading.
    /// # Errors
    /// See [`AppService::start_workout`].
    pub fn start_workout_at(
        &mut self,
        identifier: &str,
        replace: bool,
        now: i64,
    ) -> Result<WorkoutSession> {
        let template = self.templates.resolve(identifier)?.clone();
        if self.machine.state() == SessionState::Active {
            if !replace {
                bail!(SessionError::SessionAlreadyActive);
            }
            // Building the new session must succeed before the old one is dropped.
            WorkoutSession::from_template(&template, &self.library, now)?;
            self.machine.cancel()?;
        }
        let session = self.machine.start(&template, &self.library, now)?.clone();
        self.persist_session();
        Ok(session)
    }

    /// Applies one command to the active workout and stores the result.
    /// # Errors
    /// `SessionError::NoActiveSession` or `SessionError::IndexOutOfRange`.
    pub fn apply(&mut self, command: SessionCommand) -> Result<WorkoutSession> {
        let session = self.machine.dispatch(command)?.clone();
        self.persist_session();
        Ok(session)
    }

    /// Appends a library exercise (3 sets, 10 reps, kg) to the active workout.
    /// # Errors
    /// `CatalogError::ExerciseNotFound` or `SessionError::NoActiveSession`.
    pub fn add_exercise_to_workout(&mut self, exercise_id: i64) -> Result<WorkoutSession> {
        let exercise = self.library.get(exercise_id)?;
        self.apply(SessionCommand::AddExercise { exercise })
    }

    /// # Errors
    /// `SessionError::NoActiveSession` or `SessionError::NoCompletedSets`.
    pub fn finish_workout(&mut self) -> Result<WorkoutRecord> {
        self.finish_workout_at(now_millis())
    }

    /// Finishes the active workout and records it at the top of the history.
    ///
    /// The stored in-progress snapshot is only cleared once the history write
    /// succeeds; otherwise it stays in the store and the workout comes back as
    /// active on the next start.
    /// # Errors
    /// See [`AppService::finish_workout`].
    pub fn finish_workout_at(&mut self, now: i64) -> Result<WorkoutRecord> {
        let record = self.machine.finish(now)?;
        self.history.insert(0, record.clone());
        let result = db::save(&self.conn, db::KEY_HISTORY, &self.history);
        if result.is_ok() {
            self.persist_session();
        } else {
            warn!(
                template = %record.session.template_name,
                "History not saved, keeping the stored workout so it can be finished again"
            );
        }
        self.record_write(db::KEY_HISTORY, result);
        Ok(record)
    }

    /// Discards the active workout without recording it.
    /// # Errors
    /// `SessionError::NoActiveSession`.
    pub fn cancel_workout(&mut self) -> Result<WorkoutSession> {
        let session = self.machine.cancel()?;
        self.persist_session();
        Ok(session)
    }

    // --- History ---

    pub fn history(&self) -> &[WorkoutRecord] {
        &self.history
    }

    /// The most recent `config.history_limit` workouts.
    pub fn recent_history(&self) -> &[WorkoutRecord] {
        let limit = (self.config.history_limit as usize).min(self.history.len());
        &self.history[..limit]
    }

    /// # Errors
    /// Fails if there is no workout at `index` (0 = most recent).
    pub fn history_entry(&self, index: usize) -> Result<&WorkoutRecord> {
        match self.history.get(index) {
            Some(record) => Ok(record),
            None => bail!(
                "No workout at position {} (history has {} entries)",
                index + 1,
                self.history.len()
            ),
        }
    }

    pub fn previous_performance(&self, exercise_name: &str) -> Option<PreviousPerformance> {
        previous_performance(exercise_name, &self.history)
    }

    // --- Measurements ---

    /// # Errors
    /// `MeasurementError` for a blank type or a non-positive value.
    pub fn add_measurement(&mut self, kind: &str, value: f64) -> Result<Measurement> {
        self.add_measurement_at(kind, value, Utc::now())
    }

    /// # Errors
    /// See [`AppService::add_measurement`].
    pub fn add_measurement_at(
        &mut self,
        kind: &str,
        value: f64,
        date: DateTime<Utc>,
    ) -> Result<Measurement> {
        let entry = self.measurements.record(kind, value, date)?.clone();
        let result = db::save(&self.conn, db::KEY_MEASUREMENTS, self.measurements.entries());
        self.record_write(db::KEY_MEASUREMENTS, result);
        Ok(entry)
    }

    pub fn list_measurements(&self, kind: Option<&str>) -> Vec<Measurement> {
        self.measurements.list(kind).into_iter().cloned().collect()
    }

    // --- Persistence (best effort) ---

    fn persist_templates(&mut self) {
        let result = db::save(&self.conn, db::KEY_TEMPLATES, self.templates.templates());
        self.record_write(db::KEY_TEMPLATES, result);
    }

    fn persist_session(&mut self) {
        let result = match self.machine.active() {
            Some(session) => db::save(&self.conn, db::KEY_CURRENT_WORKOUT, session)
                .and_then(|()| {
                    db::set_raw(
                        &self.conn,
                        db::KEY_WORKOUT_START_TIME,
                        &session.start_time.to_string(),
                    )
                }),
            None => db::remove(&self.conn, db::KEY_CURRENT_WORKOUT)
                .and_then(|()| db::remove(&self.conn, db::KEY_WORKOUT_START_TIME)),
        };
        self.record_write(db::KEY_CURRENT_WORKOUT, result);
    }

    fn record_write(&mut self, key: &'static str, result: Result<(), DbError>) {
        if let Err(e) = result {
            warn!(key, error = %e, "Failed to persist, keeping in-memory state");
            self.warnings.push(PersistenceWarning {
                key,
                message: e.to_string(),
            });
        }
    }
}

/// Restores the in-progress workout, preferring the separately stored start time.
fn load_active_session(conn: &Connection) -> Option<WorkoutSession> {
    let mut session: WorkoutSession =
        db::load_or_default::<Option<WorkoutSession>>(conn, db::KEY_CURRENT_WORKOUT)?;
    match db::get_raw(conn, db::KEY_WORKOUT_START_TIME) {
        Ok(Some(raw)) => match raw.trim().parse::<i64>() {
            Ok(start) => session.start_time = start,
            Err(_) => warn!(value = %raw, "Ignoring unparseable workout start time"),
        },
        Ok(None) => {}
        Err(e) => warn!(error = %e, "Could not read workout start time"),
    }
    Some(session)
}
