// ── Run controller ──
//
// Drives one full pass over a list of credential sets, strictly one
// set at a time: login → enumerate → fetch → aggregate → report →
// logout. A failing set is recorded and the run moves on; logout is
// attempted whatever happened.

use std::sync::Arc;

use futures_util::StreamExt;
use tracing::{Instrument, error, info, info_span, warn};

use solarsync_api::NetEcoClient;

use crate::aggregate::aggregate;
use crate::clock::{Clock, Sleeper, SystemClock, TokioSleeper};
use crate::config::{CredentialSet, RunSettings};
use crate::enumerate::{Enumerator, Hierarchy};
use crate::error::CoreError;
use crate::fetch::Fetcher;
use crate::model::Reading;
use crate::report::{ReportSummary, Reporter};
use crate::session::SessionManager;

// ── RunState ─────────────────────────────────────────────────────────

/// Progress of one credential set through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    NotStarted,
    LoggedIn,
    Enumerated,
    Fetched,
    Reported,
    LoggedOut,
    Failed,
}

// ── Outcomes ─────────────────────────────────────────────────────────

/// Counts for one successfully processed credential set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetSummary {
    pub plants: usize,
    pub devices: usize,
    pub loggers: usize,
    /// Device readings fetched.
    pub readings: usize,
    /// Logger totals produced by aggregation.
    pub aggregated: usize,
    /// Plant and device registrations.
    pub registrations: ReportSummary,
    /// Generation posts.
    pub reports: ReportSummary,
    pub unmapped_device_ids: usize,
}

#[derive(Debug)]
pub struct SetOutcome {
    pub host: String,
    /// `LoggedOut` on a clean pass (even if the logout call itself was
    /// rejected), `Failed` otherwise.
    pub state: RunState,
    /// Last state reached before the failure.
    pub failed_at: Option<RunState>,
    pub result: Result<SetSummary, CoreError>,
}

impl SetOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// One outcome per credential set, in input order.
#[derive(Debug, Default)]
pub struct RunReport {
    pub outcomes: Vec<SetOutcome>,
}

impl RunReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

// ── RunController ────────────────────────────────────────────────────

/// Entry point for a run. Holds no per-set state between sets.
pub struct RunController {
    settings: RunSettings,
    reporter: Reporter,
    clock: Arc<dyn Clock>,
    sleeper: Arc<dyn Sleeper>,
}

impl RunController {
    /// Build a controller using wall-clock time. Fails only if the
    /// ingestion client cannot be constructed.
    pub fn new(settings: RunSettings) -> Result<Self, CoreError> {
        let reporter = Reporter::new(settings.report.clone(), &settings.http)?;
        Ok(Self {
            settings,
            reporter,
            clock: Arc::new(SystemClock),
            sleeper: Arc::new(TokioSleeper),
        })
    }

    /// Replace the time sources.
    pub fn with_time(mut self, clock: Arc<dyn Clock>, sleeper: Arc<dyn Sleeper>) -> Self {
        self.clock = clock;
        self.sleeper = sleeper;
        self
    }

    pub fn settings(&self) -> &RunSettings {
        &self.settings
    }

    /// Process every credential set in order. Never short-circuits.
    pub async fn run(&self, sets: &[CredentialSet]) -> RunReport {
        let mut report = RunReport::default();
        for set in sets {
            let outcome = self
                .run_set(set)
                .instrument(info_span!("credential_set", host = %set.host))
                .await;
            report.outcomes.push(outcome);
        }
        info!(
            sets = report.outcomes.len(),
            succeeded = report.succeeded(),
            failed = report.failed(),
            "run complete"
        );
        report
    }

    /// Process a single credential set end to end.
    pub async fn run_set(&self, set: &CredentialSet) -> SetOutcome {
        let session = match self.session_for(set) {
            Ok(session) => session,
            Err(e) => {
                error!(host = %set.host, error = %e, "cannot build vendor client");
                return SetOutcome {
                    host: set.host.clone(),
                    state: RunState::Failed,
                    failed_at: Some(RunState::NotStarted),
                    result: Err(e),
                };
            }
        };

        let mut state = RunState::NotStarted;
        let result = self.pipeline(&session, &mut state).await;

        let failed_at = match &result {
            Ok(_) => None,
            Err(e) => {
                error!(host = %set.host, state = ?state, error = %e, "credential set failed");
                Some(state)
            }
        };

        // Best effort: a rejected logout does not fail a clean pass.
        if let Err(e) = session.logout().await {
            warn!(host = %set.host, error = %e, "logout failed");
        }
        state = if failed_at.is_some() {
            RunState::Failed
        } else {
            RunState::LoggedOut
        };

        SetOutcome {
            host: set.host.clone(),
            state,
            failed_at,
            result,
        }
    }

    /// Log in, enumerate, log out. No fetch, no report.
    pub async fn discover(&self, set: &CredentialSet) -> Result<Hierarchy, CoreError> {
        let session = self.session_for(set)?;
        session.login().await?;
        let result = Enumerator::new(&session).enumerate().await;
        if let Err(e) = session.logout().await {
            warn!(host = %set.host, error = %e, "logout failed");
        }
        result
    }

    fn session_for(&self, set: &CredentialSet) -> Result<SessionManager, CoreError> {
        let client = NetEcoClient::new(set.base_url.clone(), &self.settings.http.transport())?;
        Ok(SessionManager::new(
            client,
            set.clone(),
            self.settings.auth,
            Arc::clone(&self.clock),
            Arc::clone(&self.sleeper),
        ))
    }

    async fn pipeline(
        &self,
        session: &SessionManager,
        state: &mut RunState,
    ) -> Result<SetSummary, CoreError> {
        session.login().await?;
        *state = RunState::LoggedIn;

        let hierarchy = Enumerator::new(session).enumerate().await?;
        *state = RunState::Enumerated;

        let mut summary = SetSummary {
            plants: hierarchy.plants.len(),
            devices: hierarchy.devices.len(),
            loggers: hierarchy.logger_count(),
            ..SetSummary::default()
        };
        summary.registrations = self.reporter.report_plants(&hierarchy.plants).await;
        summary.registrations += self.reporter.report_devices(&hierarchy).await;

        let plant_ids = hierarchy.plant_ids();
        let fetcher = Fetcher::new(session, self.settings.fetch, Arc::clone(&self.sleeper));
        let readings: Vec<Reading> = fetcher.fetch_readings(&plant_ids).collect().await;
        summary.readings = readings.len();
        *state = RunState::Fetched;

        let aggregation = aggregate(&hierarchy.logger_index(), readings);
        summary.aggregated = aggregation.readings.len();
        summary.unmapped_device_ids = aggregation.unmapped_device_ids.len();

        summary.reports = self.reporter.report_readings(&aggregation.readings).await;
        *state = RunState::Reported;

        info!(
            host = %session.host(),
            plants = summary.plants,
            devices = summary.devices,
            loggers = summary.aggregated,
            posted = summary.reports.posted,
            skipped = summary.reports.skipped,
            failed = summary.reports.failed,
            unmapped = summary.unmapped_device_ids,
            "credential set complete"
        );
        Ok(summary)
    }
}
