//src/main.rs
mod cli;

use anyhow::{bail, Context, Result};
use chrono::{Local, TimeZone, Utc};
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};
use std::io::{self, stdin, stdout, Write};
use std::thread;
use std::time::Duration as StdDuration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use workout_logger_lib::{
    format_duration, now_millis, user_message, volume_for_display, AppService, CountingMethod,
    Exercise, ExerciseFilters, Measurement, PreviousPerformance, SessionCommand, SessionError,
    SetEntry, SetField, SetType,
    TemplateExerciseField, Units, WeightUnit, WorkoutRecord, WorkoutSession, WorkoutStats,
    WorkoutTemplate,
};

fn main() -> Result<()> {
    let cli_args = cli::parse_args();
    let export_csv = cli_args.export_csv;

    if let cli::Commands::GenerateCompletion { shell } = cli_args.command {
        let mut cmd = cli::build_cli_command();
        let bin_name = cmd.get_name().to_string();
        eprintln!("Generating completion script for {shell}...");
        clap_complete::generate(shell, &mut cmd, bin_name, &mut stdout());
        return Ok(());
    }

    init_logging();

    let mut service =
        AppService::initialize().context("Failed to initialize application service")?;

    let result = run(&mut service, cli_args.command, export_csv);

    // Saving is best effort; tell the user but carry on.
    for warning in service.take_warnings() {
        eprintln!("Warning: {warning}");
    }

    if let Err(e) = result {
        eprintln!("Error: {}", user_message(&e));
        std::process::exit(1);
    }
    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn run(service: &mut AppService, command: cli::Commands, export_csv: bool) -> Result<()> {
    let header_color = service.config.header_color();

    match command {
        cli::Commands::GenerateCompletion { .. } => {
            unreachable!("Completion generation should have exited already");
        }

        // --- Templates ---
        cli::Commands::Template(sub) => run_template(service, sub, header_color)?,

        // --- Active workout ---
        cli::Commands::Start { template, replace } => {
            let session = service.start_workout(&template, replace)?;
            println!("Started {} workout!", session.template_name);
            print_session(service, &session, header_color);
        }
        cli::Commands::Status { watch } => {
            let session = service
                .active_workout()
                .cloned()
                .ok_or(SessionError::NoActiveSession)?;
            print_session(service, &session, header_color);
            if watch {
                watch_elapsed(service)?;
            }
        }
        cli::Commands::Set {
            exercise,
            set,
            weight,
            reps,
            time,
            distance,
            rir,
        } => {
            let exercise = to_index(exercise, "Exercise")?;
            let set = to_index(set, "Set")?;
            let updates: Vec<(SetField, String)> = [
                (SetField::Weight, weight),
                (SetField::Reps, reps),
                (SetField::Time, time),
                (SetField::Distance, distance),
                (SetField::Rir, rir),
            ]
            .into_iter()
            .filter_map(|(field, value)| value.map(|v| (field, v)))
            .collect();
            if updates.is_empty() {
                bail!("Nothing to update. Pass at least one of --weight, --reps, --time, --distance, --rir.");
            }
            let mut session = None;
            for (field, value) in updates {
                session = Some(service.apply(SessionCommand::UpdateSetField {
                    exercise,
                    set,
                    field,
                    value,
                })?);
            }
            if let Some(session) = session {
                print_session(service, &session, header_color);
            }
        }
        cli::Commands::Complete { exercise, set } => {
            let (exercise, set) = (to_index(exercise, "Exercise")?, to_index(set, "Set")?);
            let session = service.apply(SessionCommand::CompleteSet { exercise, set })?;
            let done = session.exercises[exercise].actual_sets[set].completed;
            println!(
                "Set {} of {} marked {}.",
                set + 1,
                session.exercises[exercise].name(),
                if done { "done" } else { "not done" }
            );
            print_session(service, &session, header_color);
        }
        cli::Commands::AddSet { exercise } => {
            let exercise = to_index(exercise, "Exercise")?;
            let session = service.apply(SessionCommand::AddSet { exercise })?;
            print_session(service, &session, header_color);
        }
        cli::Commands::RemoveSet { exercise, set } => {
            let (exercise, set) = (to_index(exercise, "Exercise")?, to_index(set, "Set")?);
            let session = service.apply(SessionCommand::RemoveSet { exercise, set })?;
            print_session(service, &session, header_color);
        }
        cli::Commands::ToggleUnit { exercise } => {
            let exercise = to_index(exercise, "Exercise")?;
            let session = service.apply(SessionCommand::ToggleWeightUnit { exercise })?;
            let entry = &session.exercises[exercise];
            println!(
                "{} now uses {}. Weights already entered were not converted.",
                entry.name(),
                entry.weight_unit
            );
        }
        cli::Commands::SetType {
            exercise,
            set,
            set_type,
        } => {
            let (exercise, set) = (to_index(exercise, "Exercise")?, to_index(set, "Set")?);
            let session = service.apply(SessionCommand::SetType {
                exercise,
                set,
                set_type: cli_set_type(set_type),
            })?;
            print_session(service, &session, header_color);
        }
        cli::Commands::AddExercise { exercise_id } => {
            let session = service.add_exercise_to_workout(exercise_id)?;
            if let Some(added) = session.exercises.last() {
                println!("Added {} to workout!", added.name());
            }
            print_session(service, &session, header_color);
        }
        cli::Commands::RemoveExercise { exercise } => {
            let exercise = to_index(exercise, "Exercise")?;
            service.apply(SessionCommand::RemoveExercise { exercise })?;
            println!("Exercise removed from workout.");
        }
        cli::Commands::Move { from, to } => {
            let (from, to) = (to_index(from, "Exercise")?, to_index(to, "Exercise")?);
            let session = service.apply(SessionCommand::ReorderExercise { from, to })?;
            print_session(service, &session, header_color);
        }
        cli::Commands::Finish => {
            let record = service.finish_workout()?;
            let stats = record.stats_or_compute();
            println!(
                "Workout completed! {} sets finished in {}.",
                stats.completed_sets,
                format_duration(record.duration)
            );
        }
        cli::Commands::Cancel { yes } => {
            if service.active_workout().is_none() {
                bail!(SessionError::NoActiveSession);
            }
            if service.config.confirm_cancel
                && !yes
                && !prompt_yes_no(
                    "Are you sure you want to cancel this workout? All progress will be lost.",
                )?
            {
                println!("Workout kept.");
                return Ok(());
            }
            let session = service.cancel_workout()?;
            println!("{} workout cancelled.", session.template_name);
        }

        // --- History ---
        cli::Commands::History(cli::HistoryCommands::List { limit }) => {
            let records: Vec<WorkoutRecord> = match limit {
                Some(n) => service.history().iter().take(n as usize).cloned().collect(),
                None => service.recent_history().to_vec(),
            };
            if export_csv {
                print_history_csv(&records, service.config.volume_units)?;
            } else if records.is_empty() {
                println!("No workouts recorded yet.");
            } else {
                print_history_table(&records, header_color, service.config.volume_units);
            }
        }
        cli::Commands::History(cli::HistoryCommands::Show { position }) => {
            let record = service.history_entry(to_index(position, "Position")?)?.clone();
            print_history_detail(&record, header_color, service.config.volume_units);
        }
        cli::Commands::Last { exercise_name } => {
            match service.previous_performance(exercise_name.trim()) {
                Some(previous) => print_previous(exercise_name.trim(), &previous),
                None => println!("No previous data for '{}'.", exercise_name.trim()),
            }
        }

        // --- Exercise library ---
        cli::Commands::Exercises { search, category } => {
            let exercises = service.list_exercises(&ExerciseFilters {
                search: search.as_deref(),
                category: category.as_deref(),
            });
            if export_csv {
                print_exercise_csv(&exercises)?;
            } else if exercises.is_empty() {
                println!("No exercises found matching the criteria.");
            } else {
                print_exercise_table(&exercises, header_color);
            }
        }
        cli::Commands::Categories => {
            for category in service.exercise_categories() {
                println!("{category}");
            }
        }
        cli::Commands::CreateExercise {
            name,
            category,
            equipment,
            counting_method,
        } => {
            let exercise = service.create_custom_exercise(
                &name,
                &category,
                &equipment,
                cli_counting_method(counting_method),
            )?;
            println!(
                "Exercise created: '{}' ({} / {}, {}) ID: {}",
                exercise.name,
                exercise.category,
                exercise.equipment,
                exercise.counting_method,
                exercise.id
            );
        }

        // --- Measurements ---
        cli::Commands::Measure(cli::MeasureCommands::Add { kind, value }) => {
            let entry = service.add_measurement(&kind, value)?;
            println!("Logged {} = {} (ID: {}).", entry.kind, entry.value, entry.id);
        }
        cli::Commands::Measure(cli::MeasureCommands::List { kind }) => {
            let entries = service.list_measurements(kind.as_deref());
            if export_csv {
                print_measurement_csv(&entries)?;
            } else if entries.is_empty() {
                println!("No measurements logged.");
            } else {
                print_measurement_table(&entries, header_color);
            }
        }

        // --- Settings ---
        cli::Commands::Config(sub) => match sub {
            cli::ConfigCommands::Path => println!("{}", service.get_config_path().display()),
            cli::ConfigCommands::Show => {
                println!("{}", toml::to_string_pretty(&service.config)?);
            }
            cli::ConfigCommands::SetHistoryLimit { limit } => {
                service.set_history_limit(limit)?;
                println!("History limit set to {limit}.");
            }
            cli::ConfigCommands::SetUnits { units } => {
                let units = match units {
                    cli::UnitsCli::Metric => Units::Metric,
                    cli::UnitsCli::Imperial => Units::Imperial,
                };
                service.set_volume_units(units)?;
                println!("Volume will be shown in {units:?} units.");
            }
            cli::ConfigCommands::SetHeaderColor { color } => {
                service.set_header_color(&color)?;
                println!("Header color set to {color}.");
            }
        },
        cli::Commands::DbPath => println!("{}", service.get_db_path().display()),
    }
    Ok(())
}

fn run_template(
    service: &mut AppService,
    command: cli::TemplateCommands,
    header_color: Color,
) -> Result<()> {
    match command {
        cli::TemplateCommands::Create { name } => {
            let template = service.create_template(&name)?;
            println!(
                "Template '{}' created (ID: {}). Add exercises with 'template add-exercise'.",
                template.name, template.id
            );
        }
        cli::TemplateCommands::List => {
            let templates = service.list_templates().to_vec();
            if templates.is_empty() {
                println!("No templates yet. Create one with 'template create <name>'.");
            } else {
                print_template_list(service, &templates, header_color);
            }
        }
        cli::TemplateCommands::Show { template } => {
            let template = service.get_template(&template)?.clone();
            print_template_detail(service, &template, header_color);
        }
        cli::TemplateCommands::Rename { template, new_name } => {
            let id = service.get_template(&template)?.id;
            service.rename_template(id, &new_name)?;
            println!("Template renamed to '{}'.", new_name.trim());
        }
        cli::TemplateCommands::Delete { template, yes } => {
            let template = service.get_template(&template)?.clone();
            if !yes && !prompt_yes_no(&format!("Delete template '{}'?", template.name))? {
                println!("Template kept.");
                return Ok(());
            }
            service.delete_template(template.id)?;
            println!("Template '{}' deleted.", template.name);
        }
        cli::TemplateCommands::AddExercise {
            template,
            exercise_id,
        } => {
            let id = service.get_template(&template)?.id;
            let entry = service.add_exercise_to_template(id, exercise_id)?;
            let name = service.get_exercise(exercise_id)?.name;
            println!(
                "Added {} ({} x {}, {}).",
                name, entry.sets, entry.reps, entry.weight_unit
            );
        }
        cli::TemplateCommands::RemoveExercise {
            template,
            exercise_id,
        } => {
            let id = service.get_template(&template)?.id;
            service.remove_exercise_from_template(id, exercise_id)?;
            println!("Exercise {exercise_id} removed from template.");
        }
        cli::TemplateCommands::SetExercise(args) => {
            let id = service.get_template(&args.template)?.id;
            let mut fields = Vec::new();
            if let Some(sets) = args.sets {
                fields.push(TemplateExerciseField::Sets(sets));
            }
            if let Some(reps) = args.reps {
                fields.push(TemplateExerciseField::Reps(reps));
            }
            if let Some(unit) = args.unit {
                fields.push(TemplateExerciseField::WeightUnit(match unit {
                    cli::WeightUnitCli::Kg => WeightUnit::Kg,
                    cli::WeightUnitCli::Lbs => WeightUnit::Lbs,
                }));
            }
            if fields.is_empty() {
                bail!("Nothing to update. Pass --sets, --reps or --unit.");
            }
            for field in fields {
                service.update_template_exercise(id, args.exercise_id, field)?;
            }
            let template = service.get_template(&id.to_string())?.clone();
            print_template_detail(service, &template, header_color);
        }
    }
    Ok(())
}

/// Converts a 1-based number typed by the user into an index.
fn to_index(number: usize, what: &str) -> Result<usize> {
    match number.checked_sub(1) {
        Some(index) => Ok(index),
        None => bail!("{what} numbers start at 1."),
    }
}

const fn cli_set_type(set_type: cli::SetTypeCli) -> SetType {
    match set_type {
        cli::SetTypeCli::Normal => SetType::Normal,
        cli::SetTypeCli::Warmup => SetType::Warmup,
        cli::SetTypeCli::Drop => SetType::Drop,
        cli::SetTypeCli::Super => SetType::Super,
        cli::SetTypeCli::Failure => SetType::Failure,
        cli::SetTypeCli::RestPause => SetType::RestPause,
    }
}

const fn cli_counting_method(method: cli::CountingMethodCli) -> CountingMethod {
    match method {
        cli::CountingMethodCli::WeightReps => CountingMethod::WeightReps,
        cli::CountingMethodCli::WeightTime => CountingMethod::WeightTime,
        cli::CountingMethodCli::TimeOnly => CountingMethod::TimeOnly,
        cli::CountingMethodCli::RepsOnly => CountingMethod::RepsOnly,
        cli::CountingMethodCli::DistanceTime => CountingMethod::DistanceTime,
    }
}

fn prompt_yes_no(question: &str) -> Result<bool> {
    print!("{question} [y/N]: ");
    stdout().flush()?;
    let mut input = String::new();
    stdin().read_line(&mut input)?;
    Ok(matches!(input.trim().to_lowercase().as_str(), "y" | "yes"))
}

/// Redraws the elapsed time once per second. Reads only; the session is never touched.
fn watch_elapsed(service: &AppService) -> Result<()> {
    loop {
        let Some(elapsed) = service.elapsed_seconds(now_millis()) else {
            return Ok(());
        };
        print!("\rElapsed: {:>8}", format_duration(elapsed));
        stdout().flush()?;
        thread::sleep(StdDuration::from_secs(1));
    }
}

fn format_timestamp(millis: i64) -> String {
    Utc.timestamp_millis_opt(millis)
        .single()
        .map_or_else(
            || "-".to_string(),
            |dt| dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
        )
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}

fn print_stats_line(stats: &WorkoutStats, units: Units) {
    let (volume, unit) = volume_for_display(stats.total_volume, units);
    println!(
        "Sets: {}/{} completed | Volume: {:.0} {}",
        stats.completed_sets, stats.total_sets, volume, unit
    );
}

/// Prints the workout in progress, one table per exercise.
fn print_session(service: &AppService, session: &WorkoutSession, header_color: Color) {
    let elapsed = service.elapsed_seconds(now_millis()).unwrap_or(0);
    println!(
        "\n=== {} === started {} | elapsed {}",
        session.template_name,
        format_timestamp(session.start_time),
        format_duration(elapsed)
    );
    print_stats_line(
        &workout_logger_lib::compute_stats(session),
        service.config.volume_units,
    );

    for (i, exercise) in session.exercises.iter().enumerate() {
        let method = exercise.exercise.counting_method;
        println!(
            "\n{}. {} ({}, {}) plan: {} x {} [{}]",
            i + 1,
            exercise.name(),
            exercise.exercise.category,
            exercise.exercise.equipment,
            exercise.planned_sets,
            exercise.planned_reps,
            exercise.weight_unit
        );

        let mut header = vec![Cell::new("Set").fg(header_color), Cell::new("Type").fg(header_color)];
        let mut columns = Vec::new();
        if method.uses_weight() {
            header.push(Cell::new(format!("Weight ({})", exercise.weight_unit)).fg(header_color));
            columns.push(SetField::Weight);
        }
        if method.uses_reps() {
            header.push(Cell::new("Reps").fg(header_color));
            columns.push(SetField::Reps);
        }
        if method.uses_distance() {
            header.push(Cell::new("Distance").fg(header_color));
            columns.push(SetField::Distance);
        }
        if method.uses_time() {
            header.push(Cell::new("Time").fg(header_color));
            columns.push(SetField::Time);
        }
        header.push(Cell::new("RIR").fg(header_color));
        header.push(Cell::new("Done").fg(header_color));

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(header);

        for (j, set) in exercise.actual_sets.iter().enumerate() {
            let mut row = vec![Cell::new(j + 1), Cell::new(set.set_type.to_string())];
            row.extend(columns.iter().map(|&f| Cell::new(or_dash(set.field(f)))));
            row.push(Cell::new(or_dash(&set.rir)));
            row.push(if set.completed {
                Cell::new("✓").fg(Color::Green).add_attribute(Attribute::Bold)
            } else {
                Cell::new("")
            });
            table.add_row(row);
        }
        println!("{table}");

        if let Some(previous) = service.previous_performance(exercise.name()) {
            print_previous(exercise.name(), &previous);
        }
    }
}

fn describe_set(set: &SetEntry, unit: WeightUnit) -> String {
    let mut parts = Vec::new();
    match (set.weight.is_empty(), set.reps.is_empty()) {
        (false, false) => parts.push(format!("{}{} x {} reps", set.weight, unit, set.reps)),
        (false, true) => parts.push(format!("{}{}", set.weight, unit)),
        (true, false) => parts.push(format!("{} reps", set.reps)),
        (true, true) => {}
    }
    if !set.distance.is_empty() {
        parts.push(set.distance.clone());
    }
    if !set.time.is_empty() {
        parts.push(set.time.clone());
    }
    let mut text = parts.join(" ");
    if !set.rir.is_empty() {
        text.push_str(&format!(" @ {} RIR", set.rir));
    }
    text.trim().to_string()
}

fn print_previous(exercise_name: &str, previous: &PreviousPerformance) {
    println!(
        "  Last time for {} ({}):",
        exercise_name,
        format_timestamp(previous.date)
    );
    for (i, set) in previous.sets.iter().take(3).enumerate() {
        println!("    {}. {}", i + 1, describe_set(set, previous.weight_unit));
    }
    if previous.sets.len() > 3 {
        println!("    +{} more sets", previous.sets.len() - 3);
    }
}

fn exercise_name_or_missing(service: &AppService, id: i64) -> String {
    service
        .get_exercise(id)
        .map_or_else(|_| format!("<unknown exercise {id}>"), |e| e.name)
}

fn print_template_list(service: &AppService, templates: &[WorkoutTemplate], header_color: Color) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").fg(header_color),
            Cell::new("Name").fg(header_color),
            Cell::new("Exercises").fg(header_color),
        ]);
    for template in templates {
        let names: Vec<String> = template
            .exercises
            .iter()
            .map(|e| exercise_name_or_missing(service, e.exercise_id))
            .collect();
        table.add_row(vec![
            Cell::new(template.id),
            Cell::new(&template.name),
            Cell::new(if names.is_empty() {
                "(empty)".to_string()
            } else {
                names.join(", ")
            }),
        ]);
    }
    println!("{table}");
}

fn print_template_detail(service: &AppService, template: &WorkoutTemplate, header_color: Color) {
    println!("\n--- Template '{}' (ID: {}) ---", template.name, template.id);
    if template.exercises.is_empty() {
        println!("This template has no exercises yet.");
        return;
    }
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Exercise ID").fg(header_color),
            Cell::new("Exercise").fg(header_color),
            Cell::new("Sets").fg(header_color),
            Cell::new("Reps").fg(header_color),
            Cell::new("Unit").fg(header_color),
        ]);
    for entry in &template.exercises {
        table.add_row(vec![
            Cell::new(entry.exercise_id),
            Cell::new(exercise_name_or_missing(service, entry.exercise_id)),
            Cell::new(entry.sets),
            Cell::new(&entry.reps),
            Cell::new(entry.weight_unit.to_string()),
        ]);
    }
    println!("{table}");
}

fn print_history_table(records: &[WorkoutRecord], header_color: Color, units: Units) {
    let unit_label = volume_for_display(0, units).1;
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("#").fg(header_color),
            Cell::new("Date (Local)").fg(header_color),
            Cell::new("Workout").fg(header_color),
            Cell::new("Duration").fg(header_color),
            Cell::new("Sets Done").fg(header_color),
            Cell::new(format!("Volume ({unit_label})")).fg(header_color),
        ]);
    for (i, record) in records.iter().enumerate() {
        let stats = record.stats_or_compute();
        let (volume, _) = volume_for_display(stats.total_volume, units);
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(format_timestamp(record.session.start_time)),
            Cell::new(&record.session.template_name),
            Cell::new(format_duration(record.duration)),
            Cell::new(format!("{}/{}", stats.completed_sets, stats.total_sets)),
            Cell::new(format!("{volume:.0}")),
        ]);
    }
    println!("{table}");
}

fn print_history_detail(record: &WorkoutRecord, header_color: Color, units: Units) {
    println!(
        "\n--- {} on {} ({}) ---",
        record.session.template_name,
        format_timestamp(record.session.start_time),
        format_duration(record.duration)
    );
    print_stats_line(&record.stats_or_compute(), units);

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Exercise").fg(header_color),
            Cell::new("Set").fg(header_color),
            Cell::new("Type").fg(header_color),
            Cell::new("Performed").fg(header_color),
            Cell::new("Done").fg(header_color),
        ]);
    for exercise in &record.session.exercises {
        for (j, set) in exercise.actual_sets.iter().enumerate() {
            table.add_row(vec![
                Cell::new(if j == 0 { exercise.name() } else { "" }),
                Cell::new(j + 1),
                Cell::new(set.set_type.to_string()),
                Cell::new(or_dash(&describe_set(set, exercise.weight_unit))),
                Cell::new(if set.completed { "✓" } else { "" }),
            ]);
        }
    }
    println!("{table}");
}

fn print_history_csv(records: &[WorkoutRecord], units: Units) -> Result<()> {
    let mut writer = csv::Writer::from_writer(io::stdout());
    let volume_header = format!("Volume_{}", volume_for_display(0, units).1);
    writer.write_record([
        "Id",
        "Workout",
        "Start_Local",
        "End_Local",
        "Duration_Seconds",
        "Total_Sets",
        "Completed_Sets",
        volume_header.as_str(),
    ])?;
    for record in records {
        let stats = record.stats_or_compute();
        let (volume, _) = volume_for_display(stats.total_volume, units);
        writer.write_record([
            record.session.id.to_string(),
            record.session.template_name.clone(),
            format_timestamp(record.session.start_time),
            format_timestamp(record.end_time),
            record.duration.to_string(),
            stats.total_sets.to_string(),
            stats.completed_sets.to_string(),
            format!("{volume:.0}"),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn print_exercise_table(exercises: &[Exercise], header_color: Color) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").fg(header_color),
            Cell::new("Name").fg(header_color),
            Cell::new("Category").fg(header_color),
            Cell::new("Equipment").fg(header_color),
            Cell::new("Tracks").fg(header_color),
        ]);
    for exercise in exercises {
        let name = if exercise.is_custom {
            format!("{} (custom)", exercise.name)
        } else {
            exercise.name.clone()
        };
        table.add_row(vec![
            Cell::new(exercise.id),
            Cell::new(name),
            Cell::new(&exercise.category),
            Cell::new(&exercise.equipment),
            Cell::new(exercise.counting_method.to_string()),
        ]);
    }
    println!("{table}");
}

fn print_exercise_csv(exercises: &[Exercise]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(io::stdout());
    writer.write_record(["Id", "Name", "Category", "Equipment", "Counting_Method", "Custom"])?;
    for exercise in exercises {
        writer.write_record([
            exercise.id.to_string(),
            exercise.name.clone(),
            exercise.category.clone(),
            exercise.equipment.clone(),
            exercise.counting_method.to_string(),
            exercise.is_custom.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn print_measurement_table(entries: &[Measurement], header_color: Color) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").fg(header_color),
            Cell::new("Date (Local)").fg(header_color),
            Cell::new("Type").fg(header_color),
            Cell::new("Value").fg(header_color),
        ]);
    for entry in entries {
        table.add_row(vec![
            Cell::new(entry.id),
            Cell::new(entry.date.with_timezone(&Local).format("%Y-%m-%d %H:%M")),
            Cell::new(&entry.kind),
            Cell::new(format!("{:.2}", entry.value)),
        ]);
    }
    println!("{table}");
}

fn print_measurement_csv(entries: &[Measurement]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(io::stdout());
    writer.write_record(["Id", "Timestamp_Local", "Type", "Value"])?;
    for entry in entries {
        writer.write_record([
            entry.id.to_string(),
            entry.date.with_timezone(&Local).to_rfc3339(),
            entry.kind.clone(),
            format!("{:.2}", entry.value),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
