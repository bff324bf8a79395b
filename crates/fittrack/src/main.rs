use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use std::process;

use fittrack::form::{self, FormInput, Gender, SessionRecord, BODY_TEMP_RANGE};
use fittrack::pipeline::Pipeline;
use fittrack::presenter;
use fittrack::Config;

#[derive(Parser)]
#[command(name = "fittrack")]
#[command(about = "Fittrack - Personal Fitness Tracker\nPredict kilocalories burned and keep a local history")]
#[command(version)]
struct Cli {
  /// Configuration file (defaults to fittrack.json in the current directory)
  #[arg(long, global = true, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Exercise dataset CSV
  #[arg(long, global = true, env = "FITTRACK_EXERCISE_CSV", value_name = "FILE")]
  exercise: Option<PathBuf>,

  /// Calories dataset CSV
  #[arg(long, global = true, env = "FITTRACK_CALORIES_CSV", value_name = "FILE")]
  calories: Option<PathBuf>,

  /// SQLite file holding past submissions
  #[arg(long, global = true, env = "FITTRACK_DATABASE", value_name = "FILE")]
  database: Option<PathBuf>,

  /// Enable debug logging
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Predict calories burned for one workout and store it
  Predict {
    #[command(flatten)]
    form: FormArgs,
  },
  /// Show every stored submission
  History,
}

/// Workout form fields
#[derive(Args)]
struct FormArgs {
  /// Age in years (10-100)
  #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u32).range(10..=100))]
  age: u32,

  /// Height in cm (140-200)
  #[arg(long, default_value_t = 170, value_parser = clap::value_parser!(u32).range(140..=200))]
  height: u32,

  /// Weight in kg (40-120)
  #[arg(long, default_value_t = 70, value_parser = clap::value_parser!(u32).range(40..=120))]
  weight: u32,

  /// Workout duration in minutes (0-60)
  #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u32).range(0..=60))]
  duration: u32,

  /// Heart rate in bpm (50-150)
  #[arg(long, default_value_t = 80, value_parser = clap::value_parser!(u32).range(50..=150))]
  heart_rate: u32,

  /// Body temperature in °C (35-42)
  #[arg(long, default_value_t = 37.0, value_parser = parse_body_temp)]
  body_temp: f64,

  #[arg(long, value_enum, default_value_t = Gender::Male)]
  gender: Gender,

  /// Fill the form interactively, using the other flags as defaults
  #[arg(short, long)]
  interactive: bool,
}

impl FormArgs {
  fn input(&self) -> FormInput {
    FormInput {
      age: self.age,
      height_cm: self.height,
      weight_kg: self.weight,
      duration_min: self.duration,
      heart_rate_bpm: self.heart_rate,
      body_temp_c: self.body_temp,
      gender: self.gender,
    }
  }

  fn record(&self) -> Result<SessionRecord> {
    if self.interactive && console::user_attended() {
      Ok(form::prompt(&self.input())?)
    } else {
      if self.interactive {
        herald::warn("Not attached to a terminal, using the flag values instead of prompting");
      }
      Ok(SessionRecord::new(self.input()))
    }
  }
}

fn parse_body_temp(value: &str) -> std::result::Result<f64, String> {
  let celsius: f64 = value.parse().map_err(|_| format!("'{value}' is not a number"))?;
  if BODY_TEMP_RANGE.contains(&celsius) {
    Ok(celsius)
  } else {
    Err(format!("{celsius} is not in {}..={}", BODY_TEMP_RANGE.start(), BODY_TEMP_RANGE.end()))
  }
}

fn main() {
  let cli = Cli::parse();
  herald::init_tracing("fittrack", cli.verbose);

  if let Err(e) = run(cli) {
    herald::error(&format!("{e}"));
    process::exit(1);
  }
}

fn load_config(cli: &Cli) -> Result<Config> {
  let mut config = match &cli.config {
    Some(path) => Config::load_from_file(path)?,
    None => Config::load()?,
  };

  if let Some(path) = &cli.exercise {
    config.data.exercise = path.clone();
  }
  if let Some(path) = &cli.calories {
    config.data.calories = path.clone();
  }
  if let Some(path) = &cli.database {
    config.data.database = path.clone();
  }
  Ok(config)
}

fn run(cli: Cli) -> Result<()> {
  let pipeline = Pipeline::new(load_config(&cli)?);
  let mut stdout = io::stdout();

  match &cli.command {
    Commands::Predict { form } => {
      let record = form.record()?;
      herald::announce("Fittrack - Personal Fitness Tracker");
      let paths = pipeline.cache().paths();
      herald::info(&format!(
        "Exercise data: {}\nCalories data: {}",
        paths.exercise.display(),
        paths.calories.display()
      ));

      let outcome = pipeline.submit(&record)?;
      pipeline.report(&record, &outcome, presenter::terminal_chart_size(), &mut stdout)?;
      println!();
      herald::flourish(&format!("Saved submission #{}: {:.2} kcal", outcome.id, outcome.prediction));
    }
    Commands::History => {
      let count = pipeline.history(&mut stdout)?;
      herald::success(&format!("{count} stored submission(s)"));
    }
  }

  Ok(())
}
