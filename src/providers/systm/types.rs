use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::schedule::{PlannedSession, Sport};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppInformation {
    pub platform: &'static str,
    pub version: &'static str,
    pub install_id: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginVariables<'a> {
    pub app_information: AppInformation,
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
    pub login_user: Option<LoginUser>,
}

#[derive(Debug, Deserialize)]
pub struct LoginUser {
    pub status: Option<String>,
    pub message: Option<String>,
    pub token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct QueryParams {
    pub limit: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRangeVariables {
    pub start_date: String,
    pub end_date: String,
    pub query_params: QueryParams,
}

impl PlanRangeVariables {
    /// Covers the whole of both calendar days.
    pub fn new(start: NaiveDate, end: NaiveDate, limit: usize) -> Self {
        Self {
            start_date: format!("{}T00:00:00.000Z", start.format("%Y-%m-%d")),
            end_date: format!("{}T23:59:59.999Z", end.format("%Y-%m-%d")),
            query_params: QueryParams { limit },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRangeData {
    #[serde(default)]
    pub user_plan: Option<Vec<UserPlanItem>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPlanItem {
    pub planned_date: Option<DateTime<Utc>>,
    pub applied_time_zone: Option<String>,
    #[serde(default)]
    pub prospects: Option<Vec<Prospect>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prospect {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub name: Option<String>,
    pub workout_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WorkoutVariables<'a> {
    pub id: &'a str,
}

impl From<UserPlanItem> for PlannedSession {
    fn from(item: UserPlanItem) -> Self {
        // Only the first prospect is the scheduled workout.
        let prospect = item.prospects.and_then(|p| p.into_iter().next());
        let (name, workout_id, kind) = match prospect {
            Some(p) => (p.name, p.workout_id, p.kind),
            None => (None, None, None),
        };

        PlannedSession {
            planned_date: item.planned_date,
            applied_time_zone: item.applied_time_zone,
            display_name: name.unwrap_or_default(),
            workout_id,
            sport: kind.as_deref().map(Sport::from_label).unwrap_or(Sport::Other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_item_to_session() {
        let item: UserPlanItem = serde_json::from_str(
            r#"{
                "day": 5,
                "plannedDate": "2021-11-05T06:00:00.000Z",
                "appliedTimeZone": "America/New_York",
                "prospects": [
                    {"type": "Cycling", "name": "Nine Hammers", "workoutId": "w9"},
                    {"type": "Yoga", "name": "Ignored", "workoutId": "w0"}
                ]
            }"#,
        )
        .unwrap();

        let session = PlannedSession::from(item);
        assert_eq!(session.display_name, "Nine Hammers");
        assert_eq!(session.workout_id.as_deref(), Some("w9"));
        assert_eq!(session.sport, Sport::Ride);
        assert_eq!(
            session.local_date(),
            NaiveDate::from_ymd_opt(2021, 11, 5)
        );
    }

    #[test]
    fn test_plan_item_without_date_or_prospects() {
        let item: UserPlanItem =
            serde_json::from_str(r#"{"plannedDate": null, "prospects": null}"#).unwrap();

        let session = PlannedSession::from(item);
        assert!(session.planned_date.is_none());
        assert!(session.workout_id.is_none());
        assert_eq!(session.sport, Sport::Other);
    }

    #[test]
    fn test_plan_range_variables() {
        let vars = PlanRangeVariables::new(
            NaiveDate::from_ymd_opt(2021, 11, 1).unwrap(),
            NaiveDate::from_ymd_opt(2021, 12, 31).unwrap(),
            1000,
        );
        let json = serde_json::to_value(&vars).unwrap();

        assert_eq!(json["startDate"], "2021-11-01T00:00:00.000Z");
        assert_eq!(json["endDate"], "2021-12-31T23:59:59.999Z");
        assert_eq!(json["queryParams"]["limit"], 1000);
    }
}
