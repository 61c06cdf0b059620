//! Form validation - text input to validated records
//!
//! Checks run required -> parse -> lower bound -> upper bound and stop at the
//! first failure, so a rejected submission always carries exactly one message.

use thiserror::Error;

use crate::models::{NewBodyMeasurement, NewWorkout};

pub const MAX_WORKOUT_WEIGHT: f64 = 1000.0;
pub const MAX_BODY_WEIGHT: f64 = 500.0;
pub const MAX_REPS: u32 = 1000;
pub const MAX_SETS: u32 = 100;
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Please select an exercise")]
    ExerciseRequired,
    #[error("Please enter a valid weight (must be greater than 0)")]
    InvalidWeight,
    #[error("Weight cannot exceed {0}kg")]
    WeightTooHigh(f64),
    #[error("Please enter a valid number of reps (must be greater than 0)")]
    InvalidReps,
    #[error("Reps cannot exceed {0}")]
    RepsTooHigh(u32),
    #[error("Please enter a valid number of sets (must be greater than 0)")]
    InvalidSets,
    #[error("Sets cannot exceed {0}")]
    SetsTooHigh(u32),
    #[error("Please enter a valid body weight (must be greater than 0)")]
    InvalidBodyWeight,
    #[error("Body weight cannot exceed {0}kg")]
    BodyWeightTooHigh(f64),
    #[error("Body fat must be between 0 and 100%")]
    BodyFatOutOfRange,
    #[error("Muscle mass must be greater than 0")]
    InvalidMuscleMass,
    #[error("Please enter a valid email address")]
    InvalidEmail,
    #[error("Password must be at least {0} characters")]
    PasswordTooShort(usize),
}

/// Raw workout form as typed by the user
#[derive(Debug, Clone, Default)]
pub struct WorkoutForm {
    pub exercise: String,
    pub weight: String,
    pub reps: String,
    pub sets: String,
}

impl WorkoutForm {
    pub fn validate(&self) -> Result<NewWorkout, ValidationError> {
        let exercise = self.exercise.trim();
        if exercise.is_empty() {
            return Err(ValidationError::ExerciseRequired);
        }

        let weight = bounded_decimal(
            &self.weight,
            MAX_WORKOUT_WEIGHT,
            ValidationError::InvalidWeight,
            ValidationError::WeightTooHigh(MAX_WORKOUT_WEIGHT),
        )?;
        let reps = bounded_count(
            &self.reps,
            MAX_REPS,
            ValidationError::InvalidReps,
            ValidationError::RepsTooHigh(MAX_REPS),
        )?;
        let sets = bounded_count(
            &self.sets,
            MAX_SETS,
            ValidationError::InvalidSets,
            ValidationError::SetsTooHigh(MAX_SETS),
        )?;

        Ok(NewWorkout {
            exercise_name: exercise.to_string(),
            weight,
            reps,
            sets,
        })
    }
}

/// Raw body measurement form. Optional fields are `None` when left out.
#[derive(Debug, Clone, Default)]
pub struct BodyForm {
    pub weight: String,
    pub body_fat_percent: Option<String>,
    pub muscle_mass: Option<String>,
    pub note: Option<String>,
}

impl BodyForm {
    pub fn validate(&self) -> Result<NewBodyMeasurement, ValidationError> {
        let weight = bounded_decimal(
            &self.weight,
            MAX_BODY_WEIGHT,
            ValidationError::InvalidBodyWeight,
            ValidationError::BodyWeightTooHigh(MAX_BODY_WEIGHT),
        )?;

        let body_fat_percent = match provided(self.body_fat_percent.as_deref()) {
            Some(text) => match parse_decimal(text) {
                Some(v) if (0.0..=100.0).contains(&v) => Some(v),
                _ => return Err(ValidationError::BodyFatOutOfRange),
            },
            None => None,
        };

        let muscle_mass = match provided(self.muscle_mass.as_deref()) {
            Some(text) => match parse_decimal(text) {
                Some(v) if v > 0.0 => Some(v),
                _ => return Err(ValidationError::InvalidMuscleMass),
            },
            None => None,
        };

        Ok(NewBodyMeasurement {
            weight,
            body_fat_percent,
            muscle_mass,
            note: provided(self.note.as_deref()).map(str::to_string),
        })
    }
}

/// Check credentials before they reach the identity service
pub fn validate_credentials(email: &str, password: &str) -> Result<(), ValidationError> {
    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(ValidationError::InvalidEmail);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort(MIN_PASSWORD_LEN));
    }
    Ok(())
}

/// Blank optional input counts as not provided
fn provided(input: Option<&str>) -> Option<&str> {
    input.map(str::trim).filter(|s| !s.is_empty())
}

fn parse_decimal(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn bounded_decimal(
    text: &str,
    max: f64,
    invalid: ValidationError,
    too_high: ValidationError,
) -> Result<f64, ValidationError> {
    let value = provided(Some(text))
        .and_then(parse_decimal)
        .filter(|v| *v > 0.0)
        .ok_or(invalid)?;
    if value > max {
        return Err(too_high);
    }
    Ok(value)
}

fn bounded_count(
    text: &str,
    max: u32,
    invalid: ValidationError,
    too_high: ValidationError,
) -> Result<u32, ValidationError> {
    // Parse wide so "5000000000" reports "too high" rather than "invalid".
    let value = provided(Some(text))
        .and_then(|t| t.parse::<i64>().ok())
        .filter(|v| *v > 0)
        .ok_or(invalid)?;
    if value > i64::from(max) {
        return Err(too_high);
    }
    Ok(value as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workout(exercise: &str, weight: &str, reps: &str, sets: &str) -> WorkoutForm {
        WorkoutForm {
            exercise: exercise.into(),
            weight: weight.into(),
            reps: reps.into(),
            sets: sets.into(),
        }
    }

    fn body(weight: &str, fat: Option<&str>, muscle: Option<&str>) -> BodyForm {
        BodyForm {
            weight: weight.into(),
            body_fat_percent: fat.map(Into::into),
            muscle_mass: muscle.map(Into::into),
            note: None,
        }
    }

    #[test]
    fn test_valid_workout() {
        let w = workout("Bench Press", "80", "10", "4").validate().unwrap();
        assert_eq!(w.exercise_name, "Bench Press");
        assert_eq!(w.weight, 80.0);
        assert_eq!((w.reps, w.sets), (10, 4));
    }

    #[test]
    fn test_exercise_required_first() {
        // Every other field is broken too; only the first rule reports.
        let err = workout("  ", "", "", "").validate().unwrap_err();
        assert_eq!(err, ValidationError::ExerciseRequired);
    }

    #[test]
    fn test_workout_weight_bounds() {
        for w in ["0.5", "1", "999.9", "1000"] {
            assert!(workout("Squat", w, "5", "1").validate().is_ok(), "weight {}", w);
        }
        for w in ["", "abc", "0", "-5", "NaN", "inf"] {
            assert_eq!(
                workout("Squat", w, "5", "1").validate().unwrap_err(),
                ValidationError::InvalidWeight,
                "weight {:?}",
                w
            );
        }
        assert_eq!(
            workout("Squat", "1000.1", "5", "1").validate().unwrap_err(),
            ValidationError::WeightTooHigh(1000.0)
        );
    }

    #[test]
    fn test_reps_bounds() {
        assert!(workout("Squat", "100", "1000", "1").validate().is_ok());
        assert_eq!(
            workout("Squat", "100", "1001", "1").validate().unwrap_err(),
            ValidationError::RepsTooHigh(1000)
        );
        for r in ["0", "-1", "2.5", "ten", ""] {
            assert_eq!(
                workout("Squat", "100", r, "1").validate().unwrap_err(),
                ValidationError::InvalidReps,
                "reps {:?}",
                r
            );
        }
    }

    #[test]
    fn test_sets_bounds() {
        assert!(workout("Squat", "100", "5", "100").validate().is_ok());
        assert_eq!(
            workout("Squat", "100", "5", "101").validate().unwrap_err(),
            ValidationError::SetsTooHigh(100)
        );
        assert_eq!(
            workout("Squat", "100", "5", "0").validate().unwrap_err(),
            ValidationError::InvalidSets
        );
    }

    #[test]
    fn test_huge_count_is_too_high() {
        assert_eq!(
            workout("Squat", "100", "5000000000", "1").validate().unwrap_err(),
            ValidationError::RepsTooHigh(1000)
        );
    }

    #[test]
    fn test_body_weight_bound_is_500() {
        assert!(body("500", None, None).validate().is_ok());
        assert_eq!(
            body("500.5", None, None).validate().unwrap_err(),
            ValidationError::BodyWeightTooHigh(500.0)
        );
        assert_eq!(
            body("", None, None).validate().unwrap_err(),
            ValidationError::InvalidBodyWeight
        );
    }

    #[test]
    fn test_body_fat_optional_range() {
        let m = body("70", Some(""), None).validate().unwrap();
        assert_eq!(m.body_fat_percent, None);

        for b in ["0", "15.5", "100"] {
            assert!(body("70", Some(b), None).validate().is_ok(), "fat {}", b);
        }
        for b in ["-0.1", "100.1", "lots"] {
            assert_eq!(
                body("70", Some(b), None).validate().unwrap_err(),
                ValidationError::BodyFatOutOfRange
            );
        }
    }

    #[test]
    fn test_muscle_mass_positive() {
        assert_eq!(
            body("70", None, Some("55")).validate().unwrap().muscle_mass,
            Some(55.0)
        );
        assert_eq!(
            body("70", None, Some("0")).validate().unwrap_err(),
            ValidationError::InvalidMuscleMass
        );
    }

    #[test]
    fn test_blank_note_dropped() {
        let mut form = body("70", None, None);
        form.note = Some("   ".into());
        assert_eq!(form.validate().unwrap().note, None);
        form.note = Some("after cardio".into());
        assert_eq!(form.validate().unwrap().note.as_deref(), Some("after cardio"));
    }

    #[test]
    fn test_credentials() {
        assert!(validate_credentials("a@b.c", "secret").is_ok());
        assert_eq!(validate_credentials("nope", "secret"), Err(ValidationError::InvalidEmail));
        assert_eq!(
            validate_credentials("a@b.c", "12345"),
            Err(ValidationError::PasswordTooShort(6))
        );
    }
}
