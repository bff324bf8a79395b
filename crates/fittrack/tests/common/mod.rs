use assert_cmd::prelude::*;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use std::process::Command;

/// Write a small exercise/calories pair into `dir`
pub fn write_dataset(dir: &TempDir, rows: usize) {
  let mut exercise = String::from("User_ID,Gender,Age,Height,Weight,Duration,Heart_Rate,Body_Temp\n");
  let mut calories = String::from("User_ID,Calories\n");

  for i in 0..rows {
    let gender = if i % 2 == 0 { "male" } else { "female" };
    let age = 20 + (i * 7) % 50;
    let height = 150 + (i * 11) % 45;
    let weight = 50 + (i * 13) % 60;
    let duration = 1 + (i * 17) % 29;
    let heart_rate = 75 + (i * 5) % 30;
    let body_temp = 38.0 + ((i * 3) % 20) as f64 / 10.0;
    let kcal = duration as f64 * (0.5 + heart_rate as f64 * 0.04) + age as f64 * 0.05;

    exercise.push_str(&format!(
      "{},{gender},{age},{height},{weight},{duration},{heart_rate},{body_temp:.1}\n",
      20_000 + i
    ));
    calories.push_str(&format!("{},{kcal:.1}\n", 20_000 + i));
  }

  dir.child("exercise.csv").write_str(&exercise).unwrap();
  dir.child("calories.csv").write_str(&calories).unwrap();
}

/// Config with a quick model so CLI runs stay fast
pub fn write_config(dir: &TempDir) {
  dir
    .child("fittrack.json")
    .write_str(r#"{ "model": { "n_estimators": 40, "learning_rate": 0.1, "max_depth": 3 } }"#)
    .unwrap();
}

/// `fittrack` running inside `dir`, with no dataset overrides leaking in
pub fn fittrack_cmd(dir: &TempDir) -> Command {
  let mut cmd = Command::cargo_bin("fittrack").expect("binary exists");
  cmd
    .current_dir(dir.path())
    .env_remove("FITTRACK_EXERCISE_CSV")
    .env_remove("FITTRACK_CALORIES_CSV")
    .env_remove("FITTRACK_DATABASE")
    .env_remove("RUST_LOG")
    .env("NO_COLOR", "1");
  cmd
}
