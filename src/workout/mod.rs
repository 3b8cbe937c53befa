mod extract;
mod repair;
mod zwo;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{Result, SyncError};
use crate::schedule::Sport;

pub use extract::{extract, tree_from_value, IntervalTree};
pub use repair::repair;
pub use zwo::{WorkoutDocument, NO_DATA_MARKER};

/// The parts of a SYSTM workout the pipeline uses.
#[derive(Debug, Clone)]
pub struct WorkoutDetail {
    pub id: Option<String>,
    pub name: Option<String>,
    pub sport: Sport,
    pub triggers: IntervalTree,
}

#[derive(Debug, Deserialize)]
struct RawWorkout {
    id: Option<String>,
    name: Option<String>,
    sport: Option<String>,
    #[serde(default)]
    triggers: Value,
}

impl WorkoutDetail {
    /// Repairs and parses a raw `GetWorkouts` response body.
    ///
    /// # Errors
    ///
    /// - `SyncError::Repair` if the repaired text is still not valid JSON
    /// - `SyncError::GraphQL` if the response reports errors
    /// - `SyncError::Extraction` if the workout or its interval tree is malformed
    pub fn parse(raw: &str) -> Result<Self> {
        let repaired = repair(raw);
        let body: Value = serde_json::from_str(&repaired).map_err(SyncError::Repair)?;

        if let Some(errors) = body.get("errors").and_then(Value::as_array) {
            return Err(SyncError::GraphQL {
                operation: "GetWorkouts".to_string(),
                errors: errors
                    .iter()
                    .filter_map(|e| e.get("message").and_then(Value::as_str))
                    .collect::<Vec<_>>()
                    .join(", "),
            });
        }

        let workout = body
            .pointer("/data/workouts/0")
            .cloned()
            .ok_or_else(|| SyncError::Extraction("response contains no workout".to_string()))?;

        let raw_workout: RawWorkout = serde_json::from_value(workout)
            .map_err(|e| SyncError::Extraction(format!("invalid workout: {e}")))?;

        let triggers = match raw_workout.triggers {
            Value::Null => Vec::new(),
            Value::String(s) if s.is_empty() => Vec::new(),
            value => tree_from_value(value).ok_or_else(|| {
                SyncError::Extraction("triggers is not an interval list".to_string())
            })?,
        };

        Ok(Self {
            id: raw_workout.id,
            name: raw_workout.name,
            sport: raw_workout
                .sport
                .as_deref()
                .map(Sport::from_label)
                .unwrap_or(Sport::Other),
            triggers,
        })
    }

    /// Runs extraction and wraps the segments into a document.
    pub fn into_document(self) -> WorkoutDocument {
        let segments = extract(&self.triggers);
        WorkoutDocument::new(self.sport, segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAW_WORKOUT: &str = r#"{"data":{"workouts":[{"id":"abc123","sortOrder":1,"sport":"Cycling","details":"Nine "hammers" of doom","shortDescription":"Ouch","level":null,"durationSeconds":60,"name":"Nine Hammers","triggers":"[{\"tracks\":[{\"objects\":[{\"size\":60000,\"type\":\"power\",\"parameters\":{\"ftp\":{\"value\":200},\"rpm\":{\"value\":90}}}]}]}]","featuredRaces":[]}]}}"#;

    #[test]
    fn test_parse_raw_workout() {
        let detail = WorkoutDetail::parse(RAW_WORKOUT).unwrap();

        assert_eq!(detail.id.as_deref(), Some("abc123"));
        assert_eq!(detail.name.as_deref(), Some("Nine Hammers"));
        assert_eq!(detail.sport, Sport::Ride);
        assert_eq!(detail.triggers.len(), 1);
    }

    #[test]
    fn test_into_document() {
        let document = WorkoutDetail::parse(RAW_WORKOUT).unwrap().into_document();
        let xml = document.render().unwrap();

        assert_eq!(xml.matches("<SteadyState").count(), 1);
        assert!(xml.contains(r#"Cadence="90" Power="200" Duration="60""#));
    }

    #[test]
    fn test_parse_null_triggers() {
        let raw = r#"{"data":{"workouts":[{"sport":"Yoga","name":"Stretch","triggers":null}]}}"#;
        let detail = WorkoutDetail::parse(raw).unwrap();

        assert_eq!(detail.sport, Sport::Yoga);
        assert!(detail.triggers.is_empty());
    }

    #[test]
    fn test_parse_empty_quoted_triggers() {
        let raw = r#"{"data":{"workouts":[{"sport":"Cycling","triggers":"","featuredRaces":[]}]}}"#;
        let detail = WorkoutDetail::parse(raw).unwrap();
        assert!(detail.into_document().is_empty());
    }

    #[test]
    fn test_parse_rejects_unrepairable_payload() {
        let err = WorkoutDetail::parse(r#"{"data":{"workouts":[{"name": }]}}"#).unwrap_err();
        assert!(matches!(err, SyncError::Repair(_)));
    }

    #[test]
    fn test_parse_reports_graphql_errors() {
        let raw = r#"{"errors":[{"message":"Workout not found"}],"data":null}"#;
        let err = WorkoutDetail::parse(raw).unwrap_err();
        assert!(err.to_string().contains("Workout not found"));
    }

    #[test]
    fn test_parse_without_workouts() {
        let err = WorkoutDetail::parse(r#"{"data":{"workouts":[]}}"#).unwrap_err();
        assert!(matches!(err, SyncError::Extraction(_)));
    }

    #[test]
    fn test_parse_non_list_triggers() {
        let raw = r#"{"data":{"workouts":[{"sport":"Cycling","triggers":42,"featuredRaces":[]}]}}"#;
        let err = WorkoutDetail::parse(raw).unwrap_err();
        assert!(matches!(err, SyncError::Extraction(_)));
    }

    #[test]
    fn test_parse_keeps_segments_next_to_odd_objects() {
        let raw = r#"{"data":{"workouts":[{"sport":"Cycling","triggers":"[{\"tracks\":[{\"objects\":[{\"size\":5000,\"parameters\":null},{\"size\":-5},{\"size\":60000.0,\"parameters\":{\"text\":\"Go\",\"ftp\":{\"value\":0.9}}}]},{\"objects\":null}]}]","featuredRaces":[]}]}}"#;

        let document = WorkoutDetail::parse(raw).unwrap().into_document();
        let xml = document.render().unwrap();

        assert_eq!(xml.matches("<SteadyState").count(), 1);
        assert!(xml.contains(r#"Power="0.9" Duration="60""#));
    }
}
