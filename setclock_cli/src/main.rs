use clap::{Parser, Subcommand};
use setclock_core::plan::format_mmss;
use setclock_core::progression::exercise_seconds;
use setclock_core::*;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Sender};
use std::thread;

#[derive(Parser)]
#[command(name = "setclock")]
#[command(about = "Interval workout timer with audio cues", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a workout plan (default: the built-in demo)
    Run {
        /// Plan file (.toml or .json)
        plan: Option<PathBuf>,

        /// Start with audio cues off
        #[arg(long)]
        mute: bool,

        /// Tick without waiting (for testing) - no audio, no input
        #[arg(long)]
        instant: bool,

        /// Do not record the workout in history
        #[arg(long)]
        no_log: bool,
    },

    /// Show a plan with resolved set durations
    Plan {
        /// Plan file (.toml or .json)
        plan: Option<PathBuf>,
    },

    /// List recently completed workouts
    History {
        /// How many days back to look
        #[arg(
            long,
            default_value_t = 7,
            value_parser = clap::value_parser!(i64).range(0..=36500)
        )]
        days: i64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose { "debug" } else { "warn" };
    setclock_core::logging::init_with_level(level);

    // Determine data directory
    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());

    match cli.command {
        Some(Commands::Run {
            plan,
            mute,
            instant,
            no_log,
        }) => cmd_run(&data_dir, plan.as_deref(), mute, instant, no_log, &config),
        Some(Commands::Plan { plan }) => cmd_plan(plan.as_deref(), &config),
        Some(Commands::History { days }) => cmd_history(&data_dir, days),
        None => {
            // Default to running the demo
            cmd_run(&data_dir, None, false, false, false, &config)
        }
    }
}

fn load_plan(path: Option<&Path>) -> Result<WorkoutPlan> {
    match path {
        Some(path) => WorkoutPlan::load_from(path),
        None => Ok(demo_plan()),
    }
}

fn cmd_run(
    data_dir: &Path,
    plan_path: Option<&Path>,
    mute: bool,
    instant: bool,
    no_log: bool,
    config: &Config,
) -> Result<()> {
    let plan = load_plan(plan_path)?;
    let timing = config.timing();

    let synth = if instant {
        ToneSynth::silent()
    } else {
        ToneSynth::new(open_default_output(), config.sound.enabled && !mute)
    };

    display_header(&plan, &timing);

    let observer = ConsolePrinter::new(plan.exercises.clone(), timing, !instant);
    let mut session = WorkoutSession::new(
        plan.title.clone(),
        plan.exercises.clone(),
        synth,
        Box::new(observer),
        timing,
    )?;

    session.start();
    print_set_line(session.state(), session.exercises(), &timing);

    let outcome = if instant {
        Scheduler::new(InstantTicks::new()).run(&mut session)
    } else {
        display_controls();
        let (tx, rx) = mpsc::channel();
        spawn_command_reader(tx);
        Scheduler::new(IntervalTicks::new(rx)).run(&mut session)
    };

    match outcome {
        Outcome::Completed(stats) => {
            // Let the final cue finish before the output is dropped
            if session.sound_enabled() {
                thread::sleep(Cue::WorkoutComplete.beep().total_duration());
            }

            println!("  Time: {}", format_mmss(stats.total_time));
            println!(
                "  Exercises: {}/{}",
                stats.exercises_completed, stats.total_exercises
            );

            if !no_log {
                let mut history = JsonlHistory::new(Config::history_path(data_dir));
                history.append(&WorkoutRecord::from_stats(&plan.title, &stats))?;
                println!("\n✓ Workout logged!");
            }
        }
        Outcome::Abandoned(state) => {
            println!(
                "\nWorkout stopped after {} ({}/{} exercises done).",
                format_mmss(state.total_elapsed_seconds),
                state.completed_exercises.len(),
                plan.exercises.len()
            );
        }
    }

    Ok(())
}

fn cmd_plan(plan_path: Option<&Path>, config: &Config) -> Result<()> {
    let plan = load_plan(plan_path)?;
    let timing = config.timing();

    println!("{}", plan.title);
    for (i, exercise) in plan.exercises.iter().enumerate() {
        println!(
            "  {}. {} - {} × {} ({})",
            i + 1,
            exercise.name,
            exercise.sets,
            format_mmss(exercise_seconds(exercise, &timing)),
            exercise.reps
        );
    }
    println!();
    println!(
        "Estimated total: {}",
        format_mmss(plan.estimated_seconds(&timing))
    );

    Ok(())
}

fn cmd_history(data_dir: &Path, days: i64) -> Result<()> {
    let records = load_recent_records(&Config::history_path(data_dir), days)?;

    if records.is_empty() {
        println!("No workouts in the last {} days.", days);
        return Ok(());
    }

    for record in records {
        println!(
            "{}  {}  {}  {}/{} exercises",
            record
                .completed_at
                .with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M"),
            record.title,
            format_mmss(record.total_time_seconds),
            record.exercises_completed,
            record.total_exercises
        );
    }

    Ok(())
}

fn display_header(plan: &WorkoutPlan, timing: &Timing) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  {}", plan.title);
    println!("╰─────────────────────────────────────────╯");
    println!(
        "  {} exercises, about {}",
        plan.exercises.len(),
        format_mmss(plan.estimated_seconds(timing))
    );
}

fn display_controls() {
    println!("─────────────────────────────────────────");
    println!("Enter or 'p' to pause/resume");
    println!("  's' skip exercise   'r' reset");
    println!("  'm' toggle sound    'q' quit");
}

fn print_set_line(state: &SessionState, exercises: &[Exercise], timing: &Timing) {
    let exercise = &exercises[state.current_exercise_index];
    println!(
        "  Set {}/{} - {}",
        state.current_set,
        exercise.sets,
        format_mmss(exercise_seconds(exercise, timing))
    );
}

/// Reads control keys from stdin and forwards them to the scheduler
fn spawn_command_reader(tx: Sender<SessionCommand>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else {
                break;
            };

            let command = match line.trim().to_lowercase().as_str() {
                "" | "p" => SessionCommand::TogglePause,
                "s" => SessionCommand::Skip,
                "r" => SessionCommand::Reset,
                "m" => SessionCommand::ToggleSound,
                "q" => SessionCommand::Quit,
                other => {
                    eprintln!("Unknown command: {}", other);
                    continue;
                }
            };

            if tx.send(command).is_err() {
                break;
            }
        }
        tracing::debug!("stdin closed");
    });
}

/// Prints session events to the terminal
struct ConsolePrinter {
    exercises: Vec<Exercise>,
    timing: Timing,
    live: bool,
    last_phase: Phase,
}

impl ConsolePrinter {
    fn new(exercises: Vec<Exercise>, timing: Timing, live: bool) -> Self {
        Self {
            exercises,
            timing,
            live,
            last_phase: Phase::Active,
        }
    }

    fn show_phase(&mut self, state: &SessionState) {
        if self.live {
            println!();
        }
        match state.phase {
            Phase::Active => print_set_line(state, &self.exercises, &self.timing),
            Phase::RestingBetweenSets => {
                println!("  Rest {}", format_mmss(state.time_remaining))
            }
            Phase::RestingBetweenExercises => println!(
                "  Rest {} before the next exercise",
                format_mmss(state.time_remaining)
            ),
            Phase::Completed => {}
        }
        self.last_phase = state.phase;
    }
}

impl SessionObserver for ConsolePrinter {
    fn on_exercise_change(&mut self, index: usize) {
        let exercise = &self.exercises[index];
        println!(
            "\n▶ {}/{}: {} ({} sets, {})",
            index + 1,
            self.exercises.len(),
            exercise.name,
            exercise.sets,
            exercise.reps
        );
    }

    fn on_complete(&mut self, _stats: &WorkoutStats) {
        println!("\n✓ Workout complete!");
    }

    fn on_tick(&mut self, state: &SessionState) {
        if state.phase != self.last_phase {
            self.show_phase(state);
        }

        if self.live && !state.is_completed() {
            print!(
                "\r  {:<8} {}   total {}   ",
                state.phase.label(),
                format_mmss(state.time_remaining),
                format_mmss(state.total_elapsed_seconds)
            );
            let _ = io::stdout().flush();
        }
    }

    fn on_state_change(&mut self, state: &SessionState) {
        if !state.is_completed() {
            self.show_phase(state);
        }
    }
}
