use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use log::info;
use std::path::{Path, PathBuf};

use crate::auth::Token;
use crate::config::Config;
use crate::output;
use crate::providers::{IntervalsClient, SystmClient};
use crate::schedule::ScheduleFilter;
use crate::sync::SyncJob;
use crate::workout::WorkoutDetail;

#[derive(Parser)]
#[command(name = "suffersync")]
#[command(author, version, about = "Sync Wahoo SYSTM training plans to intervals.icu", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ./suffersync.toml and friends)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Args)]
struct SystmArgs {
    #[arg(long, env = "SYSTM_USERNAME")]
    username: Option<String>,

    #[arg(long, env = "SYSTM_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

#[derive(Args)]
struct RangeArgs {
    /// First day to sync (YYYY-MM-DD)
    #[arg(short, long)]
    start: Option<NaiveDate>,

    /// Last day to sync (YYYY-MM-DD)
    #[arg(short, long)]
    end: Option<NaiveDate>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert planned workouts to .zwo files and upload them to intervals.icu
    Sync {
        #[command(flatten)]
        systm: SystmArgs,

        #[command(flatten)]
        range: RangeArgs,

        #[arg(long, env = "INTERVALS_ICU_ID")]
        athlete_id: Option<String>,

        #[arg(long, env = "INTERVALS_ICU_APIKEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Also sync yoga sessions
        #[arg(long)]
        upload_yoga: bool,

        /// Upload sessions dated today or earlier
        #[arg(long)]
        upload_past: bool,

        /// Directory for the generated .zwo files
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Write .zwo files without uploading
        #[arg(long)]
        dry_run: bool,
    },
    /// List planned sessions and whether they would be uploaded
    List {
        #[command(flatten)]
        systm: SystmArgs,

        #[command(flatten)]
        range: RangeArgs,
    },
    /// Convert a saved raw workout response into a .zwo file
    Convert {
        /// File holding the raw GetWorkouts response body
        input: PathBuf,

        /// Output path (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl SystmArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(username) = &self.username {
            config.systm.username = Some(username.clone());
        }
        if let Some(password) = &self.password {
            config.systm.password = Some(password.clone());
        }
    }
}

impl RangeArgs {
    fn apply(&self, config: &mut Config) {
        if self.start.is_some() {
            config.sync.start_date = self.start;
        }
        if self.end.is_some() {
            config.sync.end_date = self.end;
        }
    }
}

async fn systm_login(config: &Config) -> Result<SystmClient> {
    let mut client = SystmClient::new(&config.systm.base_url)?;
    client
        .login(
            config.systm.username.as_deref().unwrap_or_default(),
            config.systm.password.as_deref().unwrap_or_default(),
        )
        .await?;
    Ok(client)
}

impl Cli {
    fn load_config(&self) -> Result<Config> {
        Config::load(self.config.as_deref())
    }

    #[allow(clippy::too_many_arguments)]
    async fn execute_sync(
        &self,
        systm: &SystmArgs,
        range: &RangeArgs,
        athlete_id: &Option<String>,
        api_key: &Option<String>,
        upload_yoga: bool,
        upload_past: bool,
        output_dir: &Option<PathBuf>,
        dry_run: bool,
    ) -> Result<()> {
        let mut config = self.load_config()?;
        systm.apply(&mut config);
        range.apply(&mut config);
        if let Some(id) = athlete_id {
            config.intervals.athlete_id = Some(id.clone());
        }
        if let Some(key) = api_key {
            config.intervals.api_key = Some(key.clone());
        }
        if let Some(dir) = output_dir {
            config.sync.output_dir = dir.clone();
        }
        config.sync.upload_yoga_workouts |= upload_yoga;
        config.sync.upload_past_workouts |= upload_past;
        config.sync.dry_run |= dry_run;
        config.validate()?;

        let source = systm_login(&config).await?;

        // A dry run never calls the sink, so the account may be absent.
        let sink = IntervalsClient::new(
            &config.intervals.base_url,
            config.intervals.athlete_id.as_deref().unwrap_or_default(),
            Token::from(config.intervals.api_key.clone().unwrap_or_default()),
        )?;

        let output_dir = config.sync.output_dir.clone();
        let today = Local::now().date_naive();

        let job = SyncJob::new(source, sink, config.sync).with_progress(output::session_progress());
        let report = job.run(today).await?;

        output::print_report(&report, &output_dir);
        Ok(())
    }

    async fn execute_list(&self, systm: &SystmArgs, range: &RangeArgs) -> Result<()> {
        let mut config = self.load_config()?;
        systm.apply(&mut config);
        range.apply(&mut config);
        // Listing never uploads.
        config.sync.dry_run = true;
        config.validate()?;

        let client = systm_login(&config).await?;

        let today = Local::now().date_naive();
        let (start, end) = config.sync.date_range(today);
        let sessions = client.fetch_plan(start, end, config.sync.limit).await?;

        let filter = ScheduleFilter::new(
            config.sync.upload_past_workouts,
            config.sync.upload_yoga_workouts,
        );
        output::print_plan(&sessions, &filter, today);
        Ok(())
    }

    fn execute_convert(&self, input: &Path, output_path: Option<&Path>) -> Result<()> {
        let raw = std::fs::read_to_string(input)
            .with_context(|| format!("Failed to read workout file: {}", input.display()))?;

        let document = WorkoutDetail::parse(&raw)
            .with_context(|| format!("Failed to convert {}", input.display()))?
            .into_document();
        let zwo = document.render()?;

        if let Some(path) = output_path {
            std::fs::write(path, zwo)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Workout written to: {}", path.display());
        } else {
            println!("{zwo}");
        }

        Ok(())
    }

    pub async fn execute(&self) -> Result<()> {
        match &self.command {
            Commands::Sync {
                systm,
                range,
                athlete_id,
                api_key,
                upload_yoga,
                upload_past,
                output_dir,
                dry_run,
            } => {
                self.execute_sync(
                    systm,
                    range,
                    athlete_id,
                    api_key,
                    *upload_yoga,
                    *upload_past,
                    output_dir,
                    *dry_run,
                )
                .await
            }
            Commands::List { systm, range } => self.execute_list(systm, range).await,
            Commands::Convert { input, output } => self.execute_convert(input, output.as_deref()),
        }
    }
}
