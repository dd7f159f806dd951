use anyhow::Result;
use workout_logger_lib::stats::{parse_leading_float, parse_leading_int, set_volume_kg};
use workout_logger_lib::{
    compute_stats, elapsed_seconds, format_duration, Exercise, ExerciseCatalog, ExerciseLibrary,
    SessionCommand, SessionError, SessionMachine, SessionState, SetEntry, SetField, SetType,
    TemplateExercise, WeightUnit, WorkoutExercise, WorkoutSession, WorkoutTemplate,
};
use workout_logger_lib::template::MAX_PLANNED_SETS;

// A catalog with only the exercises a test hands it.
struct FixedCatalog(Vec<Exercise>);

impl ExerciseCatalog for FixedCatalog {
    fn lookup(&self, id: i64) -> Option<Exercise> {
        self.0.iter().find(|e| e.id == id).cloned()
    }

    fn list_all(&self) -> Vec<Exercise> {
        self.0.clone()
    }
}

fn template(name: &str, ids: &[i64]) -> WorkoutTemplate {
    WorkoutTemplate {
        id: 1,
        name: name.to_string(),
        exercises: ids
            .iter()
            .map(|&id| TemplateExercise::new(id, 3, "8-10", WeightUnit::Kg))
            .collect(),
    }
}

fn three_exercise_session() -> Result<WorkoutSession> {
    let library = ExerciseLibrary::default();
    Ok(WorkoutSession::from_template(
        &template("Full Body", &[1, 2, 4]),
        &library,
        1_000,
    )?)
}

fn names(session: &WorkoutSession) -> Vec<&str> {
    session.exercises.iter().map(|e| e.name()).collect()
}

#[test]
fn test_from_template_copies_the_plan() -> Result<()> {
    let session = three_exercise_session()?;
    assert_eq!(session.id, 1_000);
    assert_eq!(session.start_time, 1_000);
    assert_eq!(session.template_name, "Full Body");
    assert_eq!(names(&session), vec!["Bench Press", "Squat", "Deadlift"]);
    for exercise in &session.exercises {
        assert_eq!(exercise.planned_sets, 3);
        assert_eq!(exercise.planned_reps, "8-10");
        assert_eq!(exercise.actual_sets, vec![SetEntry::default(); 3]);
    }
    assert_eq!(session.total_sets(), 9);
    Ok(())
}

#[test]
fn test_from_template_uses_any_catalog() -> Result<()> {
    let catalog = FixedCatalog(vec![Exercise {
        id: 7,
        name: "Zercher Squat".into(),
        category: "Legs & Glutes".into(),
        equipment: "Barbell".into(),
        counting_method: Default::default(),
        is_custom: true,
    }]);
    assert_eq!(catalog.list_all().len(), 1);

    let session = WorkoutSession::from_template(&template("Odd", &[1, 7]), &catalog, 0)?;
    assert_eq!(names(&session), vec!["Zercher Squat"]);
    Ok(())
}

#[test]
fn test_reorder_moves_exercise() -> Result<()> {
    let session = three_exercise_session()?;

    let moved = session
        .clone()
        .apply(SessionCommand::ReorderExercise { from: 0, to: 2 })?;
    assert_eq!(names(&moved), vec!["Squat", "Deadlift", "Bench Press"]);

    let back = moved.apply(SessionCommand::ReorderExercise { from: 2, to: 0 })?;
    assert_eq!(back, session);
    Ok(())
}

#[test]
fn test_out_of_range_indices_are_rejected() -> Result<()> {
    let session = three_exercise_session()?;

    let err = session
        .validate(&SessionCommand::CompleteSet {
            exercise: 0,
            set: 3,
        })
        .unwrap_err();
    assert_eq!(
        err,
        SessionError::IndexOutOfRange {
            what: "set",
            index: 3,
            len: 3,
        }
    );

    let err = session
        .validate(&SessionCommand::ReorderExercise { from: 0, to: 3 })
        .unwrap_err();
    assert!(matches!(
        err,
        SessionError::IndexOutOfRange {
            what: "exercise",
            index: 3,
            ..
        }
    ));
    assert_eq!(err.to_string(), "exercise index 3 out of range (length 3)");

    // Adding an exercise has no index to check
    assert!(session
        .validate(&SessionCommand::AddExercise {
            exercise: ExerciseLibrary::default().get(3)?,
        })
        .is_ok());
    Ok(())
}

#[test]
fn test_remove_set_has_no_floor() -> Result<()> {
    let mut session = three_exercise_session()?;
    for _ in 0..3 {
        session = session.apply(SessionCommand::RemoveSet {
            exercise: 1,
            set: 0,
        })?;
    }
    assert!(session.exercises[1].actual_sets.is_empty());
    assert_eq!(session.total_sets(), 6);

    let result = session.clone().apply(SessionCommand::RemoveSet {
        exercise: 1,
        set: 0,
    });
    assert!(result.is_err());

    // An exercise with no sets can grow again
    let session = session.apply(SessionCommand::AddSet { exercise: 1 })?;
    assert_eq!(session.exercises[1].actual_sets.len(), 1);
    Ok(())
}

#[test]
fn test_set_type_and_fields() -> Result<()> {
    let session = three_exercise_session()?
        .apply(SessionCommand::SetType {
            exercise: 0,
            set: 0,
            set_type: SetType::Warmup,
        })?
        .apply(SessionCommand::UpdateSetField {
            exercise: 0,
            set: 0,
            field: SetField::Rir,
            value: "1".into(),
        })?;
    let set = &session.exercises[0].actual_sets[0];
    assert_eq!(set.set_type, SetType::Warmup);
    assert_eq!(set.field(SetField::Rir), "1");
    assert_eq!(set.field(SetField::Weight), "");

    // Set type is descriptive only
    let session = session
        .apply(SessionCommand::UpdateSetField {
            exercise: 0,
            set: 0,
            field: SetField::Weight,
            value: "40".into(),
        })?
        .apply(SessionCommand::UpdateSetField {
            exercise: 0,
            set: 0,
            field: SetField::Reps,
            value: "10".into(),
        })?
        .apply(SessionCommand::CompleteSet {
            exercise: 0,
            set: 0,
        })?;
    assert_eq!(compute_stats(&session).total_volume, 400);
    Ok(())
}

#[test]
fn test_parse_field_and_type_names() {
    assert_eq!(SetField::parse("weight"), Ok(SetField::Weight));
    assert_eq!(SetField::parse(" RIR "), Ok(SetField::Rir));
    assert_eq!(
        SetField::parse("tempo"),
        Err(SessionError::UnknownSetField("tempo".into()))
    );

    assert_eq!(SetType::parse("rest_pause"), Ok(SetType::RestPause));
    assert_eq!(SetType::parse("Drop"), Ok(SetType::Drop));
    assert!(matches!(
        SetType::parse("giant"),
        Err(SessionError::UnknownSetType(_))
    ));
}

#[test]
fn test_machine_lifecycle() -> Result<()> {
    let library = ExerciseLibrary::default();
    let push = template("Push Day", &[1]);
    let mut machine = SessionMachine::new();
    assert_eq!(machine.state(), SessionState::Idle);
    assert_eq!(machine.cancel(), Err(SessionError::NoActiveSession));
    assert_eq!(
        machine.dispatch(SessionCommand::AddSet { exercise: 0 }).err(),
        Some(SessionError::NoActiveSession)
    );

    machine.start(&push, &library, 0)?;
    assert_eq!(machine.state(), SessionState::Active);
    assert_eq!(
        machine.start(&push, &library, 1).err(),
        Some(SessionError::SessionAlreadyActive)
    );

    assert_eq!(machine.finish(5_000).err(), Some(SessionError::NoCompletedSets));
    assert_eq!(machine.state(), SessionState::Active);

    machine.dispatch(SessionCommand::CompleteSet {
        exercise: 0,
        set: 2,
    })?;
    let record = machine.finish(5_000)?;
    assert_eq!(record.duration, 5);
    assert_eq!(record.end_time, 5_000);
    assert_eq!(record.stats.map(|s| s.completed_sets), Some(1));
    assert_eq!(machine.state(), SessionState::Idle);
    Ok(())
}

#[test]
fn test_rejected_dispatch_keeps_session() -> Result<()> {
    let library = ExerciseLibrary::default();
    let mut machine = SessionMachine::new();
    let before = machine
        .start(&template("Push Day", &[1, 2]), &library, 0)?
        .clone();

    let result = machine.dispatch(SessionCommand::RemoveExercise { exercise: 5 });
    assert!(result.is_err());
    assert_eq!(machine.active(), Some(&before));
    Ok(())
}

#[test]
fn test_numeric_prefix_parsing() {
    assert_eq!(parse_leading_float("62.5kg"), 62.5);
    assert_eq!(parse_leading_float("  80"), 80.0);
    assert_eq!(parse_leading_float(".5"), 0.5);
    assert_eq!(parse_leading_float("1e2"), 100.0);
    assert_eq!(parse_leading_float("3e"), 3.0);
    assert_eq!(parse_leading_float("-"), 0.0);
    assert_eq!(parse_leading_float("heavy"), 0.0);
    assert_eq!(parse_leading_float(""), 0.0);

    assert_eq!(parse_leading_int("8.5"), 8);
    assert_eq!(parse_leading_int("10 reps"), 10);
    assert_eq!(parse_leading_int("+4"), 4);
    assert_eq!(parse_leading_int("x5"), 0);
}

#[test]
fn test_set_volume() {
    let set = SetEntry {
        weight: "100".into(),
        reps: "10".into(),
        ..SetEntry::default()
    };
    assert_eq!(set_volume_kg(&set, WeightUnit::Kg), 1000.0);
    assert!((set_volume_kg(&set, WeightUnit::Lbs) - 1000.0 / 2.205).abs() < 1e-9);

    let no_reps = SetEntry {
        weight: "100".into(),
        ..SetEntry::default()
    };
    assert_eq!(set_volume_kg(&no_reps, WeightUnit::Kg), 0.0);
}

#[test]
fn test_duration_formatting() {
    assert_eq!(format_duration(0), "0:00");
    assert_eq!(format_duration(59), "0:59");
    assert_eq!(format_duration(60), "1:00");
    assert_eq!(format_duration(3599), "59:59");
    assert_eq!(format_duration(3600), "1:00:00");
    assert_eq!(format_duration(3661), "1:01:01");

    assert_eq!(elapsed_seconds(1_000, 62_999), 61);
    assert_eq!(elapsed_seconds(5_000, 1_000), 0);
}

#[test]
fn test_weight_unit_toggle() {
    assert_eq!(WeightUnit::Kg.toggled(), WeightUnit::Lbs);
    assert_eq!(WeightUnit::Lbs.toggled().to_string(), "kg");
}

#[test]
fn test_unknown_name_messages_list_valid_choices() {
    let message = SetField::parse("tempo").unwrap_err().user_message();
    assert!(message.contains("weight, reps, time, distance, rir"));

    let message = SetType::parse("giant").unwrap_err().user_message();
    assert!(message.contains("normal, warmup, drop, super, failure, rest_pause"));
}

#[test]
fn test_stored_set_without_rir_gets_default() -> Result<()> {
    let set: SetEntry = serde_json::from_str(r#"{"weight":"60","reps":"8","completed":true}"#)?;
    assert_eq!(set.rir, "3");
    assert_eq!(set.rir, SetEntry::default().rir);
    assert_eq!(set.set_type, SetType::Normal);

    let blank: SetEntry = serde_json::from_str(r#"{"rir":""}"#)?;
    assert_eq!(blank.rir, "");
    Ok(())
}

#[test]
fn test_planned_sets_are_capped() -> Result<()> {
    let exercise = ExerciseLibrary::default().get(1)?;
    let entry = WorkoutExercise::planned(exercise, u32::MAX, "5", WeightUnit::Kg);
    assert_eq!(entry.planned_sets, MAX_PLANNED_SETS);
    assert_eq!(entry.actual_sets.len(), MAX_PLANNED_SETS as usize);
    Ok(())
}
