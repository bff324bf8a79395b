//! Health advisory
//!
//! Fixed, rule-based commentary chosen by threshold bands on the submitted
//! BMI, heart rate and body temperature.

use crate::form::SessionRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
  Good,
  Caution,
  Alert,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advisory {
  pub severity: Severity,
  pub headline: &'static str,
  pub detail: &'static str,
  pub tips_heading: &'static str,
  pub tips: &'static [&'static str],
}

pub const BMI_UNDERWEIGHT_BELOW: f64 = 18.5;
pub const BMI_OVERWEIGHT_FROM: f64 = 25.0;
pub const HEART_RATE_HIGH_ABOVE: u32 = 100;
pub const HEART_RATE_LOW_BELOW: u32 = 60;
pub const BODY_TEMP_HIGH_ABOVE: f64 = 37.5;
pub const BODY_TEMP_LOW_BELOW: f64 = 35.0;

const BMI_LOW: Advisory = Advisory {
  severity: Severity::Alert,
  headline: "🚨 Alert: Your BMI is critically low!",
  detail: "Being underweight can weaken your immune system, increase fatigue, and lead to deficiencies.",
  tips_heading: "🌟 Here's what you can do:",
  tips: &[
    "🍔 Eat energy-dense meals like nuts, dried fruits, and avocados.",
    "🥚 Incorporate proteins like eggs, fish, and dairy to help rebuild muscle.",
    "🩺 Consult a doctor to check for underlying causes.",
  ],
};

const BMI_HEALTHY: Advisory = Advisory {
  severity: Severity::Good,
  headline: "🎉 Fantastic News! Your BMI is in the healthy range!",
  detail: "A healthy BMI reduces your risk of chronic diseases like diabetes and hypertension.",
  tips_heading: "✨ Keep it up with these habits:",
  tips: &[
    "🥗 Maintain a balance of proteins, carbs, and fats in your diet.",
    "🚴 Keep up with regular exercise like 30 minutes of walking or cycling daily.",
    "🍰 Celebrate with cheat meals occasionally, but don't overdo it!",
  ],
};

const BMI_HIGH: Advisory = Advisory {
  severity: Severity::Caution,
  headline: "⚠️ Caution: Your BMI indicates you're overweight.",
  detail: "This increases the risk of heart disease, diabetes, and joint problems.",
  tips_heading: "🌟 Make these changes starting today:",
  tips: &[
    "🥤 Swap sugary drinks for water or green tea.",
    "🥬 Include more fiber-rich foods like vegetables, oats, and legumes.",
    "🏃 Get at least 150 minutes of moderate physical activity weekly (e.g., brisk walking or swimming).",
  ],
};

const HEART_RATE_HIGH: Advisory = Advisory {
  severity: Severity::Alert,
  headline: "💓 Warning: High Heart Rate Detected!",
  detail: "A consistently elevated heart rate can indicate stress, dehydration, or cardiovascular issues.",
  tips_heading: "🌟 Suggestions for a calmer heart:",
  tips: &[
    "🧘 Take deep breaths for 5 minutes to activate relaxation.",
    "💧 Stay hydrated and avoid caffeine for the day.",
    "🩺 If your heart rate remains high, seek medical attention.",
  ],
};

const HEART_RATE_LOW: Advisory = Advisory {
  severity: Severity::Caution,
  headline: "💓 Low Heart Rate Alert:",
  detail: "Your heart rate is lower than normal, which could lead to dizziness or fatigue.",
  tips_heading: "🌟 Suggestions to energize:",
  tips: &[
    "🏃 Get up and stretch to boost circulation.",
    "🍎 Eat a light snack to maintain energy levels.",
    "🩺 Monitor for prolonged low heart rate and consult a physician if needed.",
  ],
};

const BODY_TEMP_HIGH: Advisory = Advisory {
  severity: Severity::Alert,
  headline: "🌡️ Alert: Elevated Body Temperature Detected!",
  detail: "This could signal fever, dehydration, or an infection.",
  tips_heading: "🌟 Immediate actions to take:",
  tips: &[
    "💧 Drink plenty of fluids to reduce dehydration.",
    "🛌 Rest in a cool, well-ventilated environment.",
    "🩺 If your fever persists, visit a doctor promptly.",
  ],
};

const BODY_TEMP_LOW: Advisory = Advisory {
  severity: Severity::Caution,
  headline: "🌡️ Caution: Low Body Temperature!",
  detail: "Prolonged exposure to cold or poor circulation might be causing this.",
  tips_heading: "🌟 Here's how you can warm up:",
  tips: &[
    "🧣 Layer up with warm clothing or blankets.",
    "☕ Drink warm liquids like herbal tea or soup.",
    "🩺 Monitor closely and seek help if symptoms persist.",
  ],
};

/// Shown to everyone after the banded advice
pub const GENERAL_TIPS: [(&str, &str); 4] = [
  (
    "💧 Stay Hydrated:",
    "Dehydration can cause headaches, fatigue, and low focus. Drink at least 8 glasses of water daily!",
  ),
  (
    "🍽️ Healthy Eating Reminder:",
    "Skipping meals can slow down your metabolism. Eat on time to fuel your body and mind effectively!",
  ),
  ("🌙 Sleep Matters:", "Aim for 7-8 hours of quality sleep. Your body needs rest to repair itself and stay energized."),
  ("🚶 Move It:", "Sitting too long can harm your health. Take a 5-minute break every hour to stretch or walk!"),
];

pub fn bmi_advice(bmi: f64) -> Advisory {
  if bmi < BMI_UNDERWEIGHT_BELOW {
    BMI_LOW
  } else if bmi < BMI_OVERWEIGHT_FROM {
    BMI_HEALTHY
  } else {
    BMI_HIGH
  }
}

pub fn heart_rate_advice(bpm: u32) -> Option<Advisory> {
  if bpm > HEART_RATE_HIGH_ABOVE {
    Some(HEART_RATE_HIGH)
  } else if bpm < HEART_RATE_LOW_BELOW {
    Some(HEART_RATE_LOW)
  } else {
    None
  }
}

pub fn body_temp_advice(celsius: f64) -> Option<Advisory> {
  if celsius > BODY_TEMP_HIGH_ABOVE {
    Some(BODY_TEMP_HIGH)
  } else if celsius < BODY_TEMP_LOW_BELOW {
    Some(BODY_TEMP_LOW)
  } else {
    None
  }
}

/// Banded advice for one submission: BMI always, then heart rate and body
/// temperature when they leave the normal band
pub fn advise(record: &SessionRecord) -> Vec<Advisory> {
  let mut advice = vec![bmi_advice(record.bmi())];
  advice.extend(heart_rate_advice(record.heart_rate_bpm()));
  advice.extend(body_temp_advice(record.body_temp_c()));
  advice
}
