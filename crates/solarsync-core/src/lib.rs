// solarsync-core: session handling, hierarchy discovery, batched fetch,
// aggregation, and reporting for one ingestion run.
//
// `RunController` is the entry point. It owns nothing across credential
// sets: each set gets a fresh `SessionManager`, and the pipeline runs
// strictly sequentially.

pub mod aggregate;
pub mod batch;
pub mod clock;
pub mod config;
pub mod controller;
pub mod convert;
pub mod enumerate;
pub mod error;
pub mod fetch;
pub mod model;
pub mod report;
pub mod session;

// ── Primary re-exports ──
pub use aggregate::{Aggregation, aggregate};
pub use batch::{BatchStrategy, partition};
pub use clock::{Clock, ManualClock, RecordingSleeper, Sleeper, SystemClock, TokioSleeper};
pub use config::{
    AuthPolicy, CredentialSet, FetchSettings, HttpSettings, IngestTarget, ReportSettings,
    RetryPolicy, RunSettings, TlsVerification,
};
pub use controller::{RunController, RunReport, RunState, SetOutcome, SetSummary};
pub use enumerate::{Enumerator, Hierarchy};
pub use error::CoreError;
pub use fetch::Fetcher;
pub use report::{ReportSummary, Reporter};
pub use session::{Session, SessionManager};

// ── Model re-exports ──
pub use model::{AggregatedLoggerReading, Device, Plant, Reading};
