// src/cli.rs
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

#[derive(Parser, Debug)]
#[command(author, version, about = "Log workouts from templates and review your history", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Print tables as CSV instead
    #[arg(long, global = true)]
    pub export_csv: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum CountingMethodCli {
    WeightReps,
    WeightTime,
    TimeOnly,
    RepsOnly,
    DistanceTime,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SetTypeCli {
    Normal,
    Warmup,
    Drop,
    Super,
    Failure,
    RestPause,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum WeightUnitCli {
    Kg,
    Lbs,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnitsCli {
    Metric,
    Imperial,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage workout templates
    #[command(subcommand)]
    Template(TemplateCommands),

    /// Start a workout from a template (ID or name)
    Start {
        template: String,
        /// Discard the workout in progress, if any
        #[arg(long)]
        replace: bool,
    },
    /// Show the workout in progress
    Status {
        /// Keep refreshing the elapsed time every second (Ctrl-C to stop)
        #[arg(long)]
        watch: bool,
    },
    /// Fill in set fields. Exercise and set numbers start at 1
    Set {
        exercise: usize,
        set: usize,
        #[arg(short, long)]
        weight: Option<String>,
        #[arg(short, long)]
        reps: Option<String>,
        #[arg(short, long)]
        time: Option<String>,
        #[arg(short, long)]
        distance: Option<String>,
        /// Reps in reserve
        #[arg(long)]
        rir: Option<String>,
    },
    /// Toggle a set between done and not done
    Complete { exercise: usize, set: usize },
    /// Append an empty set to an exercise
    AddSet { exercise: usize },
    RemoveSet { exercise: usize, set: usize },
    /// Switch an exercise between kg and lbs (entered weights are not converted)
    ToggleUnit { exercise: usize },
    SetType {
        exercise: usize,
        set: usize,
        #[arg(value_enum)]
        set_type: SetTypeCli,
    },
    /// Add a library exercise (by ID) to the workout in progress
    AddExercise { exercise_id: i64 },
    RemoveExercise { exercise: usize },
    /// Move an exercise to a new position
    Move { from: usize, to: usize },
    /// Finish and record the workout in progress
    Finish,
    /// Discard the workout in progress
    Cancel {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Review completed workouts
    #[command(subcommand)]
    History(HistoryCommands),
    /// Show what you did last time for an exercise
    Last { exercise_name: String },

    /// Browse the exercise library
    Exercises {
        /// Case-insensitive part of the name
        #[arg(short, long)]
        search: Option<String>,
        #[arg(short, long)]
        category: Option<String>,
    },
    /// List exercise categories
    Categories,
    /// Add your own exercise to the library
    CreateExercise {
        #[arg(short, long)]
        name: String,
        #[arg(short, long, default_value = "Custom")]
        category: String,
        #[arg(short, long, default_value = "Other")]
        equipment: String,
        #[arg(short = 'm', long, value_enum, default_value_t = CountingMethodCli::WeightReps)]
        counting_method: CountingMethodCli,
    },

    /// Body measurements log
    #[command(subcommand)]
    Measure(MeasureCommands),

    /// Show or change settings
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Show the path to the database file
    DbPath,
    /// Generate shell completion script
    GenerateCompletion {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum TemplateCommands {
    Create { name: String },
    List,
    Show { template: String },
    Rename { template: String, new_name: String },
    Delete {
        template: String,
        #[arg(short, long)]
        yes: bool,
    },
    /// Add a library exercise by ID (3 sets of 8-10, kg)
    AddExercise { template: String, exercise_id: i64 },
    RemoveExercise { template: String, exercise_id: i64 },
    /// Change the planned sets, reps or unit of a template exercise
    SetExercise(SetTemplateExerciseArgs),
}

#[derive(Args, Debug)]
pub struct SetTemplateExerciseArgs {
    pub template: String,
    pub exercise_id: i64,
    #[arg(short, long)]
    pub sets: Option<u32>,
    #[arg(short, long)]
    pub reps: Option<String>,
    #[arg(short, long, value_enum)]
    pub unit: Option<WeightUnitCli>,
}

#[derive(Subcommand, Debug)]
pub enum HistoryCommands {
    /// List recent workouts (newest first)
    List {
        #[arg(short, long)]
        limit: Option<u32>,
    },
    /// Show one workout; 1 is the most recent
    Show { position: usize },
}

#[derive(Subcommand, Debug)]
pub enum MeasureCommands {
    Add { kind: String, value: f64 },
    List {
        #[arg(short, long)]
        kind: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    Path,
    Show,
    SetHistoryLimit { limit: u32 },
    SetUnits {
        #[arg(value_enum)]
        units: UnitsCli,
    },
    SetHeaderColor { color: String },
}

pub fn parse_args() -> Cli {
    Cli::parse()
}

pub fn build_cli_command() -> clap::Command {
    Cli::command()
}
