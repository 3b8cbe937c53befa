use std::path::PathBuf;

use chrono::NaiveDate;
use indicatif::ProgressBar;
use log::{debug, info, warn};

use crate::artifacts::ArtifactStore;
use crate::config::SyncConfig;
use crate::error::{Result, SyncError};
use crate::schedule::{PlannedSession, ScheduleFilter, SkipReason};
use crate::workout::WorkoutDetail;

/// Where planned sessions and their workouts come from.
#[allow(async_fn_in_trait)]
pub trait PlanSource {
    async fn fetch_plan(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        limit: usize,
    ) -> Result<Vec<PlannedSession>>;

    /// Raw, unrepaired workout payload.
    async fn fetch_workout(&self, workout_id: &str) -> Result<String>;
}

/// Where rendered workouts are sent.
#[allow(async_fn_in_trait)]
pub trait UploadSink {
    async fn upload(&self, upload: &WorkoutUpload) -> Result<()>;
}

/// One rendered workout ready to be put on the calendar.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutUpload {
    /// Local calendar date; the event starts at local midnight.
    pub date: NaiveDate,
    pub filename: String,
    pub contents: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionStatus {
    Uploaded(PathBuf),
    /// Written locally but not uploaded (past session or dry run).
    Written(PathBuf),
    Skipped(SkipReason),
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct SessionOutcome {
    pub name: String,
    pub date: Option<NaiveDate>,
    pub status: SessionStatus,
}

#[derive(Debug, Default)]
pub struct SyncReport {
    pub outcomes: Vec<SessionOutcome>,
}

impl SyncReport {
    fn record(&mut self, session: &PlannedSession, status: SessionStatus) {
        self.outcomes.push(SessionOutcome {
            name: session.display_name.clone(),
            date: session.local_date(),
            status,
        });
    }

    fn count(&self, predicate: impl Fn(&SessionStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| predicate(&o.status)).count()
    }

    pub fn uploaded(&self) -> usize {
        self.count(|s| matches!(s, SessionStatus::Uploaded(_)))
    }

    pub fn written(&self) -> usize {
        self.count(|s| matches!(s, SessionStatus::Written(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, SessionStatus::Skipped(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, SessionStatus::Failed(_)))
    }
}

/// Runs the SYSTM → `.zwo` → intervals.icu pipeline over a date range.
///
/// Sessions are handled one at a time. A failure while handling one session is
/// recorded in the report and the run moves on; only plan fetch failures and
/// run-level errors (configuration, authentication) abort.
pub struct SyncJob<S, U> {
    source: S,
    sink: U,
    config: SyncConfig,
    filter: ScheduleFilter,
    store: ArtifactStore,
    progress: ProgressBar,
}

impl<S: PlanSource, U: UploadSink> SyncJob<S, U> {
    pub fn new(source: S, sink: U, config: SyncConfig) -> Self {
        let filter = ScheduleFilter::new(config.upload_past_workouts, config.upload_yoga_workouts);
        let store = ArtifactStore::new(&config.output_dir);

        Self {
            source,
            sink,
            config,
            filter,
            store,
            progress: ProgressBar::hidden(),
        }
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub async fn run(&self, today: NaiveDate) -> Result<SyncReport> {
        let (start, end) = self.config.date_range(today);
        info!("Syncing planned workouts from {start} to {end}");

        let sessions = self
            .source
            .fetch_plan(start, end, self.config.limit)
            .await?;

        let (dated, undated): (Vec<_>, Vec<_>) = sessions
            .into_iter()
            .partition(|s| s.planned_date.is_some());
        if !undated.is_empty() {
            debug!("Ignoring {} plan entries without a planned date", undated.len());
        }

        self.progress.set_length(dated.len() as u64);
        let mut report = SyncReport::default();

        for session in &dated {
            self.progress
                .set_message(format!("Processing {}", session.display_name));

            match self.process_session(session, today).await {
                Ok(status) => report.record(session, status),
                Err(e) if e.is_session_recoverable() => {
                    warn!("Something went wrong with '{}': {e}", session.display_name);
                    report.record(session, SessionStatus::Failed(e.to_string()));
                }
                Err(e) => {
                    self.progress.abandon();
                    return Err(e);
                }
            }

            self.progress.inc(1);
        }

        self.progress.finish_and_clear();
        info!(
            "Sync finished: {} uploaded, {} written, {} skipped, {} failed",
            report.uploaded(),
            report.written(),
            report.skipped(),
            report.failed()
        );

        Ok(report)
    }

    async fn process_session(
        &self,
        session: &PlannedSession,
        today: NaiveDate,
    ) -> Result<SessionStatus> {
        if let Err(reason) = self.filter.should_process(session) {
            debug!("Skipping '{}': {reason}", session.display_name);
            return Ok(SessionStatus::Skipped(reason));
        }

        let (Some(local_date), Some(filename)) = (session.local_date(), session.filename()) else {
            return Ok(SessionStatus::Skipped(SkipReason::NoPlannedDate));
        };

        let workout_id = session
            .workout_id
            .as_deref()
            .ok_or_else(|| SyncError::MissingWorkoutId(session.display_name.clone()))?;

        let raw = self.source.fetch_workout(workout_id).await?;
        let detail = WorkoutDetail::parse(&raw)?;
        debug!(
            "Workout {} '{}' for session '{}'",
            detail.id.as_deref().unwrap_or("?"),
            detail.name.as_deref().unwrap_or_default(),
            session.display_name
        );

        // The plan entry does not always carry a type; the workout itself does.
        if let Err(reason) = self.filter.check_sport(detail.sport) {
            debug!("Skipping '{}': {reason}", session.display_name);
            return Ok(SessionStatus::Skipped(reason));
        }

        let document = detail.into_document();
        if document.is_empty() {
            debug!("'{}' ({}) has no power segments", session.display_name, document.sport);
        }

        let contents = document.render()?;
        let path = self.store.write(&filename, &contents)?;

        if self.config.dry_run || !self.filter.is_upload_due(local_date, today) {
            debug!("Not uploading '{}' ({local_date})", session.display_name);
            return Ok(SessionStatus::Written(path));
        }

        let upload = WorkoutUpload {
            date: local_date,
            filename: session.upload_filename(),
            contents,
        };
        self.sink.upload(&upload).await?;
        info!("Uploaded {} for {}", upload.filename, upload.date);

        Ok(SessionStatus::Uploaded(path))
    }
}
