// ── Batched generation fetcher ──
//
// Yields one `Reading` per device per plant as a lazy stream. Plants are
// fetched serially in batches, with a pause between batches (never
// inside a batch, never after the last one). A failing plant is logged
// and contributes nothing.

use std::sync::Arc;

use futures_util::Stream;
use tracing::{debug, warn};

use crate::batch::partition;
use crate::clock::Sleeper;
use crate::config::FetchSettings;
use crate::convert::reading_from_raw;
use crate::error::CoreError;
use crate::model::Reading;
use crate::session::SessionManager;

pub struct Fetcher<'a> {
    session: &'a SessionManager,
    settings: FetchSettings,
    sleeper: Arc<dyn Sleeper>,
}

impl<'a> Fetcher<'a> {
    pub fn new(session: &'a SessionManager, settings: FetchSettings, sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            session,
            settings,
            sleeper,
        }
    }

    /// Stream readings for every plant in `plant_ids`.
    ///
    /// Finite. Nothing is requested until the stream is polled.
    pub fn fetch_readings<'s>(
        &'s self,
        plant_ids: &'s [String],
    ) -> impl Stream<Item = Reading> + 's {
        async_stream::stream! {
            let batches = partition(plant_ids, self.settings.strategy);
            let total = batches.len();

            for (index, batch) in batches.into_iter().enumerate() {
                if index > 0 {
                    debug!(
                        batch = index + 1,
                        of = total,
                        pause_secs = self.settings.pause.as_secs(),
                        "pausing between batches"
                    );
                    self.sleeper.sleep(self.settings.pause).await;
                }

                for plant_id in batch {
                    match self.fetch_plant(plant_id).await {
                        Ok(readings) => {
                            for reading in readings {
                                yield reading;
                            }
                        }
                        Err(e) => {
                            warn!(
                                host = %self.session.host(),
                                plant_id = %plant_id,
                                error = %e,
                                "generation fetch failed"
                            );
                        }
                    }
                }
            }
        }
    }

    async fn fetch_plant(&self, plant_id: &str) -> Result<Vec<Reading>, CoreError> {
        let client = self.session.client();
        let rows = self
            .session
            .authorized(|s| async move { client.query_device_detail(s.token(), plant_id).await })
            .await?;

        if rows.is_empty() {
            debug!(plant_id, "no generation data");
        }

        Ok(rows
            .into_iter()
            .filter_map(|row| match reading_from_raw(row) {
                Ok(reading) => Some(reading),
                Err(missing) => {
                    warn!(plant_id, %missing, "dropping generation row");
                    None
                }
            })
            .collect())
    }
}
