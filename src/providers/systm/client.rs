use chrono::NaiveDate;
use graphql_client::{QueryBody, Response as GraphQLResponse};
use log::{debug, info};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::auth::Token;
use crate::error::{Result, SyncError};
use crate::schedule::PlannedSession;
use crate::sync::PlanSource;

use super::types::{
    AppInformation, LoginData, LoginVariables, PlanRangeData, PlanRangeVariables, WorkoutVariables,
};

pub const DEFAULT_GRAPHQL_URL: &str = "https://api.thesufferfest.com/graphql";

const LOGIN_QUERY: &str = include_str!("../../../graphql/login.graphql");
const PLAN_RANGE_QUERY: &str = include_str!("../../../graphql/user_plans_range.graphql");
const WORKOUTS_QUERY: &str = include_str!("../../../graphql/workouts.graphql");

const APP_INFORMATION: AppInformation = AppInformation {
    platform: "web",
    version: "7.12.0-web.2141",
    install_id: "F215B34567B35AC815329A53A2B696E5",
};

/// Client for the Wahoo SYSTM GraphQL API.
pub struct SystmClient {
    client: Client,
    graphql_url: Url,
    token: Option<Token>,
}

impl SystmClient {
    pub fn new(graphql_url: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("suffersync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SyncError::Config(format!("Failed to create HTTP client: {e}")))?;

        let graphql_url = Url::parse(graphql_url)
            .map_err(|e| SyncError::Config(format!("Invalid SYSTM URL: {e}")))?;

        Ok(Self {
            client,
            graphql_url,
            token: None,
        })
    }

    fn auth_request(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(token) = &self.token {
            request.bearer_auth(token.as_str())
        } else {
            request
        }
    }

    async fn post<V: Serialize>(&self, body: &QueryBody<V>) -> Result<reqwest::Response> {
        let request = self.auth_request(self.client.post(self.graphql_url.clone()).json(body));
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(SyncError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }

    /// Execute a GraphQL request and return its data after checking for errors.
    ///
    /// The source reports failures with HTTP 200 and an `errors` array, so both
    /// the status and the body are checked.
    async fn execute_graphql_request<V, T>(&self, body: &QueryBody<V>) -> Result<T>
    where
        V: Serialize,
        T: DeserializeOwned,
    {
        let response_body: GraphQLResponse<T> = self.post(body).await?.json().await?;

        if let Some(errors) = response_body.errors {
            return Err(SyncError::GraphQL {
                operation: body.operation_name.to_string(),
                errors: errors
                    .iter()
                    .map(|e| e.message.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            });
        }

        response_body.data.ok_or(SyncError::NoResponseData)
    }

    /// Logs in and keeps the session token for later requests.
    ///
    /// # Errors
    ///
    /// Every failure is reported as `SyncError::Auth`.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<()> {
        let body = QueryBody {
            variables: LoginVariables {
                app_information: APP_INFORMATION,
                username,
                password,
            },
            query: LOGIN_QUERY,
            operation_name: "Login",
        };

        let data: LoginData = self
            .execute_graphql_request(&body)
            .await
            .map_err(|e| SyncError::Auth(e.to_string()))?;

        let login = data
            .login_user
            .ok_or_else(|| SyncError::Auth("empty login response".to_string()))?;

        match login.token {
            Some(token) if !token.is_empty() => {
                info!("Logged in to SYSTM as {username}");
                self.token = Some(Token::from(token));
                Ok(())
            }
            _ => Err(SyncError::Auth(format!(
                "no token returned (status: {}, message: {})",
                login.status.as_deref().unwrap_or("unknown"),
                login.message.as_deref().unwrap_or("none"),
            ))),
        }
    }

    /// Fetches the planned sessions between two calendar dates (inclusive).
    pub async fn fetch_plan(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        limit: usize,
    ) -> Result<Vec<PlannedSession>> {
        let body = QueryBody {
            variables: PlanRangeVariables::new(start, end, limit),
            query: PLAN_RANGE_QUERY,
            operation_name: "GetUserPlansRange",
        };

        let data: PlanRangeData = self.execute_graphql_request(&body).await?;
        let sessions: Vec<PlannedSession> = data
            .user_plan
            .unwrap_or_default()
            .into_iter()
            .map(PlannedSession::from)
            .collect();

        info!("Fetched {} planned sessions from {start} to {end}", sessions.len());
        Ok(sessions)
    }

    /// Fetches one workout. The body is returned as text: it is not valid JSON
    /// until repaired.
    pub async fn fetch_workout(&self, workout_id: &str) -> Result<String> {
        let body = QueryBody {
            variables: WorkoutVariables { id: workout_id },
            query: WORKOUTS_QUERY,
            operation_name: "GetWorkouts",
        };

        let text = self.post(&body).await?.text().await?;
        debug!("Fetched workout {workout_id} ({} bytes)", text.len());
        Ok(text)
    }
}

impl PlanSource for SystmClient {
    async fn fetch_plan(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        limit: usize,
    ) -> Result<Vec<PlannedSession>> {
        SystmClient::fetch_plan(self, start, end, limit).await
    }

    async fn fetch_workout(&self, workout_id: &str) -> Result<String> {
        SystmClient::fetch_workout(self, workout_id).await
    }
}
