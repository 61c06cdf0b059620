//! Domain records as they travel between the app and the backend

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Catalog exercise (read-only reference data)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Exercise {
    pub id: String,
    pub name: String,
    pub category: String,
}

/// Logged workout entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkoutRecord {
    pub id: String,
    #[serde(rename = "user_id")]
    pub owner: String,
    pub exercise_name: String,
    pub weight: f64,
    pub reps: u32,
    pub sets: u32,
    pub created_at: DateTime<Utc>,
}

/// Validated workout ready to be inserted. The owner comes from the session.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewWorkout {
    pub exercise_name: String,
    pub weight: f64,
    pub reps: u32,
    pub sets: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BodyMeasurement {
    pub id: String,
    #[serde(rename = "user_id")]
    pub owner: String,
    pub weight: f64,
    #[serde(rename = "body_fat")]
    pub body_fat_percent: Option<f64>,
    pub muscle_mass: Option<f64>,
    #[serde(rename = "notes")]
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Validated body measurement ready to be inserted
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewBodyMeasurement {
    pub weight: f64,
    #[serde(rename = "body_fat")]
    pub body_fat_percent: Option<f64>,
    pub muscle_mass: Option<f64>,
    #[serde(rename = "notes")]
    pub note: Option<String>,
}

/// Plan difficulty; unknown labels are kept verbatim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
    Other(String),
}

impl Difficulty {
    pub fn label(&self) -> &str {
        match self {
            Difficulty::Beginner => "Beginner",
            Difficulty::Intermediate => "Intermediate",
            Difficulty::Advanced => "Advanced",
            Difficulty::Other(raw) => raw,
        }
    }
}

impl From<String> for Difficulty {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "beginner" => Difficulty::Beginner,
            "intermediate" => Difficulty::Intermediate,
            "advanced" => Difficulty::Advanced,
            _ => Difficulty::Other(raw),
        }
    }
}

impl From<Difficulty> for String {
    fn from(d: Difficulty) -> Self {
        match d {
            Difficulty::Beginner => "beginner".into(),
            Difficulty::Intermediate => "intermediate".into(),
            Difficulty::Advanced => "advanced".into(),
            Difficulty::Other(raw) => raw,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One day of a plan
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanDay {
    #[serde(rename = "day")]
    pub day_number: u32,
    #[serde(rename = "exercises", default)]
    pub exercise_names: Vec<String>,
}

/// Predefined multi-day plan
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkoutPlan {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub difficulty: Difficulty,
    pub duration_weeks: Option<u32>,
    #[serde(rename = "exercises", default, deserialize_with = "lenient_days")]
    pub days: Vec<PlanDay>,
}

/// Plan day JSON is free-form in the store; anything that is not a list of
/// well-formed days is read as "no days".
fn lenient_days<'de, D>(deserializer: D) -> Result<Vec<PlanDay>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(parse_plan_days(value))
}

pub(crate) fn parse_plan_days(value: serde_json::Value) -> Vec<PlanDay> {
    match value {
        serde_json::Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    }
}

/// Authenticated principal
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identity {
    pub id: String,
    #[serde(default)]
    pub email: String,
}

/// Credential issued by the identity service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthSession {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub user: Identity,
}

/// Result of a sign-up call. `session` is absent when the service still
/// waits for the email address to be confirmed.
#[derive(Debug, Clone, PartialEq)]
pub struct SignUpResponse {
    pub user: Identity,
    pub session: Option<AuthSession>,
}
