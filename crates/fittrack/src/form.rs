//! Input form
//!
//! Six bounded numeric fields plus a binary gender choice, collected either
//! from command-line flags or from an interactive prompt.

use clap::ValueEnum;
use dialoguer::{theme::ColorfulTheme, Input, Select};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use crate::error::Result;

pub const AGE_RANGE: RangeInclusive<u32> = 10..=100;
pub const HEIGHT_RANGE: RangeInclusive<u32> = 140..=200;
pub const WEIGHT_RANGE: RangeInclusive<u32> = 40..=120;
pub const DURATION_RANGE: RangeInclusive<u32> = 0..=60;
pub const HEART_RATE_RANGE: RangeInclusive<u32> = 50..=150;
pub const BODY_TEMP_RANGE: RangeInclusive<f64> = 35.0..=42.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Gender {
  Male,
  Female,
}

impl Gender {
  pub const ALL: [Gender; 2] = [Gender::Male, Gender::Female];

  /// Binary encoding used by the model: Male = 1, Female = 0
  pub fn as_flag(self) -> u8 {
    match self {
      Gender::Male => 1,
      Gender::Female => 0,
    }
  }

  pub fn from_flag(flag: u8) -> Option<Self> {
    match flag {
      1 => Some(Gender::Male),
      0 => Some(Gender::Female),
      _ => None,
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Gender::Male => "Male",
      Gender::Female => "Female",
    }
  }
}

impl fmt::Display for Gender {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

impl FromStr for Gender {
  type Err = String;

  fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
    Gender::ALL
      .into_iter()
      .find(|g| g.label().eq_ignore_ascii_case(s.trim()))
      .ok_or_else(|| format!("unknown gender '{s}', expected Male or Female"))
  }
}

/// Raw form values before clamping
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormInput {
  pub age: u32,
  pub height_cm: u32,
  pub weight_kg: u32,
  pub duration_min: u32,
  pub heart_rate_bpm: u32,
  pub body_temp_c: f64,
  pub gender: Gender,
}

impl Default for FormInput {
  fn default() -> Self {
    Self {
      age: 30,
      height_cm: 170,
      weight_kg: 70,
      duration_min: 30,
      heart_rate_bpm: 80,
      body_temp_c: 37.0,
      gender: Gender::Male,
    }
  }
}

/// One submission. Values are clamped into the form bounds and BMI is
/// derived at construction; the record is read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
  age: u32,
  height_cm: u32,
  weight_kg: u32,
  bmi: f64,
  duration_min: u32,
  heart_rate_bpm: u32,
  body_temp_c: f64,
  gender: Gender,
}

fn clamp_to<T: PartialOrd + Copy>(value: T, range: &RangeInclusive<T>) -> T {
  if value < *range.start() {
    *range.start()
  } else if value > *range.end() {
    *range.end()
  } else {
    value
  }
}

/// Round to two decimal places
pub fn round2(value: f64) -> f64 {
  (value * 100.0).round() / 100.0
}

impl SessionRecord {
  pub fn new(input: FormInput) -> Self {
    let height_cm = clamp_to(input.height_cm, &HEIGHT_RANGE);
    let weight_kg = clamp_to(input.weight_kg, &WEIGHT_RANGE);
    let body_temp_c = if input.body_temp_c.is_nan() {
      FormInput::default().body_temp_c
    } else {
      clamp_to(input.body_temp_c, &BODY_TEMP_RANGE)
    };

    Self {
      age: clamp_to(input.age, &AGE_RANGE),
      height_cm,
      weight_kg,
      bmi: round2(crate::encoder::bmi(f64::from(weight_kg), f64::from(height_cm))),
      duration_min: clamp_to(input.duration_min, &DURATION_RANGE),
      heart_rate_bpm: clamp_to(input.heart_rate_bpm, &HEART_RATE_RANGE),
      body_temp_c,
      gender: input.gender,
    }
  }

  pub fn age(&self) -> u32 {
    self.age
  }

  pub fn height_cm(&self) -> u32 {
    self.height_cm
  }

  pub fn weight_kg(&self) -> u32 {
    self.weight_kg
  }

  /// BMI rounded to two decimals
  pub fn bmi(&self) -> f64 {
    self.bmi
  }

  pub fn duration_min(&self) -> u32 {
    self.duration_min
  }

  pub fn heart_rate_bpm(&self) -> u32 {
    self.heart_rate_bpm
  }

  pub fn body_temp_c(&self) -> f64 {
    self.body_temp_c
  }

  pub fn gender(&self) -> Gender {
    self.gender
  }
}

fn prompt_u32(theme: &ColorfulTheme, label: &str, range: RangeInclusive<u32>, default: u32) -> Result<u32> {
  let value = Input::<u32>::with_theme(theme)
    .with_prompt(format!("{label} ({}-{})", range.start(), range.end()))
    .default(default)
    .validate_with(move |v: &u32| -> std::result::Result<(), String> {
      if range.contains(v) {
        Ok(())
      } else {
        Err(format!("must be between {} and {}", range.start(), range.end()))
      }
    })
    .interact_text()?;
  Ok(value)
}

/// Ask for every field on the terminal, starting from `defaults`
pub fn prompt(defaults: &FormInput) -> Result<SessionRecord> {
  let theme = ColorfulTheme::default();

  let age = prompt_u32(&theme, "Age", AGE_RANGE, defaults.age)?;
  let height_cm = prompt_u32(&theme, "Height (cm)", HEIGHT_RANGE, defaults.height_cm)?;
  let weight_kg = prompt_u32(&theme, "Weight (kg)", WEIGHT_RANGE, defaults.weight_kg)?;
  let duration_min = prompt_u32(&theme, "Workout Duration (min)", DURATION_RANGE, defaults.duration_min)?;
  let heart_rate_bpm = prompt_u32(&theme, "Heart Rate (bpm)", HEART_RATE_RANGE, defaults.heart_rate_bpm)?;

  let body_temp_c = Input::<f64>::with_theme(&theme)
    .with_prompt("Body Temperature (°C) (35-42)")
    .default(defaults.body_temp_c)
    .validate_with(|v: &f64| -> std::result::Result<(), String> {
      if BODY_TEMP_RANGE.contains(v) {
        Ok(())
      } else {
        Err("must be between 35 and 42".to_string())
      }
    })
    .interact_text()?;

  let labels: Vec<&str> = Gender::ALL.iter().map(|g| g.label()).collect();
  let selected = Select::with_theme(&theme)
    .with_prompt("Gender")
    .items(&labels)
    .default(Gender::ALL.iter().position(|g| *g == defaults.gender).unwrap_or(0))
    .interact()?;

  Ok(SessionRecord::new(FormInput {
    age,
    height_cm,
    weight_kg,
    duration_min,
    heart_rate_bpm,
    body_temp_c,
    gender: Gender::ALL[selected],
  }))
}
