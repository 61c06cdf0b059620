//! Built-in exercise catalog and starter plans
//!
//! The embedded backend seeds its `exercises` and `workout_plans` tables from
//! here. A hosted backend ships its own catalog.

use url::Url;

use crate::models::PlanDay;

/// Catalog categories, stored as their lowercase label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Legs,
    Chest,
    Back,
    Shoulders,
    Arms,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::Legs => "legs",
            Category::Chest => "chest",
            Category::Back => "back",
            Category::Shoulders => "shoulders",
            Category::Arms => "arms",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CatalogExercise {
    pub id: &'static str,
    pub name: &'static str,
    pub category: Category,
}

pub const BASE_EXERCISES: &[CatalogExercise] = &[
    // Legs
    CatalogExercise { id: "squat", name: "Squat", category: Category::Legs },
    CatalogExercise { id: "front_squat", name: "Front Squat", category: Category::Legs },
    CatalogExercise { id: "deadlift", name: "Deadlift", category: Category::Legs },
    CatalogExercise { id: "romanian_deadlift", name: "Romanian Deadlift", category: Category::Legs },
    CatalogExercise { id: "leg_press", name: "Leg Press", category: Category::Legs },
    CatalogExercise { id: "lunge", name: "Lunge", category: Category::Legs },
    // Chest
    CatalogExercise { id: "bench_press", name: "Bench Press", category: Category::Chest },
    CatalogExercise { id: "incline_bench_press", name: "Incline Bench Press", category: Category::Chest },
    CatalogExercise { id: "dumbbell_bench_press", name: "Dumbbell Bench Press", category: Category::Chest },
    CatalogExercise { id: "push_up", name: "Push Up", category: Category::Chest },
    // Back
    CatalogExercise { id: "pull_up", name: "Pull Up", category: Category::Back },
    CatalogExercise { id: "lat_pulldown", name: "Lat Pulldown", category: Category::Back },
    CatalogExercise { id: "barbell_row", name: "Barbell Row", category: Category::Back },
    CatalogExercise { id: "seated_row", name: "Seated Row", category: Category::Back },
    // Shoulders
    CatalogExercise { id: "overhead_press", name: "Overhead Press", category: Category::Shoulders },
    CatalogExercise { id: "lateral_raise", name: "Lateral Raise", category: Category::Shoulders },
    CatalogExercise { id: "face_pull", name: "Face Pull", category: Category::Shoulders },
    // Arms
    CatalogExercise { id: "bicep_curl", name: "Bicep Curl", category: Category::Arms },
    CatalogExercise { id: "tricep_pushdown", name: "Tricep Pushdown", category: Category::Arms },
    CatalogExercise { id: "hammer_curl", name: "Hammer Curl", category: Category::Arms },
];

/// Starter plan. `days` holds (day number, exercise names).
pub struct PlanTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub difficulty: &'static str,
    pub duration_weeks: u32,
    pub days: &'static [(u32, &'static [&'static str])],
}

impl PlanTemplate {
    pub fn plan_days(&self) -> Vec<PlanDay> {
        self.days
            .iter()
            .map(|(day, names)| PlanDay {
                day_number: *day,
                exercise_names: names.iter().map(|n| n.to_string()).collect(),
            })
            .collect()
    }
}

pub const DEFAULT_PLANS: &[PlanTemplate] = &[
    PlanTemplate {
        id: "full_body_starter",
        name: "Full Body Starter",
        description: "Three full-body sessions a week to learn the main lifts",
        difficulty: "beginner",
        duration_weeks: 4,
        days: &[
            (1, &["Squat", "Bench Press", "Barbell Row"]),
            (2, &["Deadlift", "Overhead Press", "Lat Pulldown"]),
            (3, &["Leg Press", "Dumbbell Bench Press", "Seated Row"]),
        ],
    },
    PlanTemplate {
        id: "upper_lower",
        name: "Upper / Lower Split",
        description: "Four days alternating upper and lower body",
        difficulty: "intermediate",
        duration_weeks: 8,
        days: &[
            (1, &["Bench Press", "Barbell Row", "Overhead Press", "Bicep Curl"]),
            (2, &["Squat", "Romanian Deadlift", "Lunge"]),
            (3, &["Incline Bench Press", "Pull Up", "Lateral Raise", "Tricep Pushdown"]),
            (4, &["Deadlift", "Front Squat", "Leg Press"]),
        ],
    },
    PlanTemplate {
        id: "push_pull_legs",
        name: "Push Pull Legs",
        description: "Six-day rotation for experienced lifters",
        difficulty: "advanced",
        duration_weeks: 12,
        days: &[
            (1, &["Bench Press", "Overhead Press", "Incline Bench Press", "Tricep Pushdown"]),
            (2, &["Deadlift", "Pull Up", "Barbell Row", "Face Pull", "Hammer Curl"]),
            (3, &["Squat", "Leg Press", "Romanian Deadlift", "Lunge"]),
            (4, &["Dumbbell Bench Press", "Lateral Raise", "Push Up"]),
            (5, &["Lat Pulldown", "Seated Row", "Bicep Curl"]),
            (6, &["Front Squat", "Deadlift", "Leg Press"]),
        ],
    },
];

/// Find a catalog exercise by name (case-insensitive)
pub fn find_exercise(name: &str) -> Option<&'static CatalogExercise> {
    BASE_EXERCISES
        .iter()
        .find(|e| e.name.eq_ignore_ascii_case(name.trim()))
}

/// Video tutorial search link for an exercise
pub fn tutorial_url(exercise_name: &str) -> Option<Url> {
    let query = format!("{} tutorial", exercise_name.trim());
    Url::parse_with_params("https://www.youtube.com/results", &[("search_query", query)]).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_ids_unique() {
        let mut ids: Vec<_> = BASE_EXERCISES.iter().map(|e| e.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), BASE_EXERCISES.len());
    }

    #[test]
    fn test_plans_only_use_catalog_exercises() {
        for plan in DEFAULT_PLANS {
            for day in plan.plan_days() {
                for name in &day.exercise_names {
                    assert!(find_exercise(name).is_some(), "{} in {}", name, plan.name);
                }
            }
        }
    }

    #[test]
    fn test_find_exercise_ignores_case() {
        assert_eq!(find_exercise("bench press").unwrap().id, "bench_press");
        assert!(find_exercise("Underwater Basket Weaving").is_none());
    }

    #[test]
    fn test_tutorial_url_encodes_name() {
        let url = tutorial_url("Bench Press").unwrap();
        assert_eq!(url.host_str(), Some("www.youtube.com"));
        let (_, q) = url.query_pairs().next().unwrap();
        assert_eq!(q, "Bench Press tutorial");
    }
}
