// Ingestion controller - Reconciles the historical batch and the live stream
use crate::application::render_surface::RenderSurface;
use crate::application::sample_sources::{HistoricalSource, LiveEvent, LiveSource};
use crate::application::summary_deriver::{SummaryDeriver, SummaryRow};
use crate::domain::connection::ConnectionState;
use crate::domain::sample::SampleRow;
use crate::domain::sample_buffer::SampleBuffer;
use futures::StreamExt;
use std::sync::Arc;

/// Everything the controller owns for the lifetime of the session.
pub struct DashboardContext {
    pub buffer: SampleBuffer,
    pub connection: ConnectionState,
    pub latest: Option<SummaryRow>,
    pub deriver: SummaryDeriver,
    pub surface: Box<dyn RenderSurface>,
}

impl DashboardContext {
    pub fn new(deriver: SummaryDeriver, surface: Box<dyn RenderSurface>) -> Self {
        Self {
            buffer: SampleBuffer::new(),
            connection: ConnectionState::Disconnected,
            latest: None,
            deriver,
            surface,
        }
    }
}

pub struct IngestionController {
    historical: Arc<dyn HistoricalSource>,
    live: Arc<dyn LiveSource>,
    context: DashboardContext,
}

impl IngestionController {
    pub fn new(
        historical: Arc<dyn HistoricalSource>,
        live: Arc<dyn LiveSource>,
        context: DashboardContext,
    ) -> Self {
        Self {
            historical,
            live,
            context,
        }
    }

    #[cfg(test)]
    pub fn context(&self) -> &DashboardContext {
        &self.context
    }

    /// Load history, then follow the live channel until it closes. The live
    /// channel is only opened once the historical load has finished.
    pub async fn run(&mut self) {
        self.context
            .surface
            .set_connection_state(self.context.connection);
        self.load_historical().await;
        self.start_live_stream().await;
    }

    pub async fn load_historical(&mut self) {
        let columns = match self.historical.fetch_batch().await {
            Ok(columns) => columns,
            Err(e) => {
                tracing::error!("Historical batch unavailable, starting empty: {}", e);
                return;
            }
        };

        match self.context.buffer.replace(columns) {
            Ok(_) if self.context.buffer.is_empty() => {
                tracing::info!("Historical batch is empty");
                self.publish_buffer();
            }
            Ok(trimmed) => {
                tracing::info!(
                    "Loaded {} historical samples ({} trimmed to fit capacity {})",
                    self.context.buffer.len(),
                    trimmed,
                    self.context.buffer.capacity()
                );
                self.publish_buffer();
            }
            Err(e) => {
                tracing::error!("Rejected historical batch: {}", e);
            }
        }
    }

    pub async fn start_live_stream(&mut self) {
        self.set_connection(ConnectionState::Connecting);

        let mut events = self.live.subscribe();
        while let Some(event) = events.next().await {
            self.handle_event(event);
        }

        if self.context.connection != ConnectionState::Disconnected {
            tracing::info!("Live stream ended without a close notification");
            self.set_connection(ConnectionState::Disconnected);
        }
    }

    pub fn handle_event(&mut self, event: LiveEvent) {
        match event {
            LiveEvent::Opened => {
                tracing::info!("Live channel connected");
                self.set_connection(ConnectionState::Connected);
            }
            LiveEvent::Sample(row) => self.ingest(row),
            LiveEvent::Malformed { reason } => {
                tracing::warn!("Dropping malformed live frame: {}", reason);
            }
            LiveEvent::Error { reason } => {
                tracing::error!("Live channel error: {}", reason);
            }
            LiveEvent::Closed => {
                tracing::info!("Live channel closed");
                self.set_connection(ConnectionState::Disconnected);
            }
        }
    }

    fn ingest(&mut self, row: SampleRow) {
        tracing::debug!(
            "Live sample at {}: download={:?} upload={:?} ping={}",
            row.timestamp,
            row.download,
            row.upload,
            row.ping
        );

        let outcome = self.context.buffer.append(row);
        if outcome.out_of_order {
            tracing::debug!("Out-of-order sample stored at index {}", self.context.buffer.len() - 1);
        }
        if outcome.trimmed > 0 {
            tracing::debug!("Trimmed {} oldest samples", outcome.trimmed);
        }
        self.publish_buffer();
    }

    fn publish_buffer(&mut self) {
        let context = &mut self.context;
        context.latest = context.deriver.latest_summary(&context.buffer);
        context.surface.publish(&context.buffer, context.latest.as_ref());
    }

    fn set_connection(&mut self, state: ConnectionState) {
        if self.context.connection == state {
            return;
        }
        self.context.connection = state;
        self.context.surface.set_connection_state(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::sample_sources::TransportError;
    use crate::application::summary_deriver::{DisplayZone, PingOutcome};
    use crate::domain::sample::{reading_from_batch, reading_from_live, SampleColumns};
    use async_trait::async_trait;
    use chrono::FixedOffset;
    use futures::stream::{self, BoxStream};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorded {
        lengths: Vec<usize>,
        latest: Vec<Option<SummaryRow>>,
        states: Vec<ConnectionState>,
    }

    struct RecordingSurface(Arc<Mutex<Recorded>>);

    impl RenderSurface for RecordingSurface {
        fn publish(&mut self, buffer: &SampleBuffer, latest: Option<&SummaryRow>) {
            let mut recorded = self.0.lock().unwrap();
            recorded.lengths.push(buffer.len());
            recorded.latest.push(latest.cloned());
        }

        fn set_connection_state(&mut self, state: ConnectionState) {
            self.0.lock().unwrap().states.push(state);
        }
    }

    struct FakeHistorical {
        batch: Option<SampleColumns>,
        calls: Arc<Mutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl HistoricalSource for FakeHistorical {
        async fn fetch_batch(&self) -> Result<SampleColumns, TransportError> {
            self.calls.lock().unwrap().push("fetch");
            self.batch.clone().ok_or(TransportError::Status {
                status: 503,
                body: "unavailable".to_string(),
            })
        }
    }

    struct FakeLive {
        events: Vec<LiveEvent>,
        calls: Arc<Mutex<Vec<&'static str>>>,
    }

    impl LiveSource for FakeLive {
        fn subscribe(&self) -> BoxStream<'static, LiveEvent> {
            self.calls.lock().unwrap().push("subscribe");
            stream::iter(self.events.clone()).boxed()
        }
    }

    fn build_controller(
        batch: Option<SampleColumns>,
        events: Vec<LiveEvent>,
    ) -> (IngestionController, Arc<Mutex<Recorded>>, Arc<Mutex<Vec<&'static str>>>) {
        let recorded = Arc::new(Mutex::new(Recorded::default()));
        let calls = Arc::new(Mutex::new(Vec::new()));
        let deriver = SummaryDeriver::new(DisplayZone::Fixed(FixedOffset::west_opt(7 * 3600).unwrap()));
        let context = DashboardContext::new(deriver, Box::new(RecordingSurface(recorded.clone())));
        let controller = IngestionController::new(
            Arc::new(FakeHistorical {
                batch,
                calls: calls.clone(),
            }),
            Arc::new(FakeLive {
                events,
                calls: calls.clone(),
            }),
            context,
        );
        (controller, recorded, calls)
    }

    /// Batch as the history endpoint sends it, with 0 meaning "no reading".
    fn batch(timestamps: Vec<i64>, download: Vec<f64>, upload: Vec<f64>, ping: Vec<bool>) -> SampleColumns {
        SampleColumns {
            timestamps,
            download: download.into_iter().map(|v| reading_from_batch(Some(v))).collect(),
            upload: upload.into_iter().map(|v| reading_from_batch(Some(v))).collect(),
            ping,
        }
    }

    fn live(timestamp: i64, download: f64, upload: f64, ping: bool) -> LiveEvent {
        LiveEvent::Sample(SampleRow::new(
            timestamp,
            reading_from_live(Some(download)),
            reading_from_live(Some(upload)),
            ping,
        ))
    }

    #[tokio::test]
    async fn test_batch_then_live_sample_end_to_end() {
        let (mut controller, recorded, _) = build_controller(
            Some(batch(
                vec![1, 2, 3],
                vec![0.0, 50.0, 0.0],
                vec![10.0, 0.0, 30.0],
                vec![true, false, true],
            )),
            vec![LiveEvent::Opened, live(4, -1.0, 20.0, false), LiveEvent::Closed],
        );

        controller.run().await;

        let context = controller.context();
        assert_eq!(context.buffer.len(), 4);
        let latest = context.latest.clone().unwrap();
        assert_eq!(latest.download, Some(50));
        assert_eq!(latest.upload, Some(20));
        assert_eq!(latest.ping, Some(PingOutcome::Failure));
        assert_eq!(context.connection, ConnectionState::Disconnected);

        let recorded = recorded.lock().unwrap();
        assert_eq!(recorded.lengths, vec![3, 4]);
        assert_eq!(recorded.latest.len(), 2);
        assert_eq!(
            recorded.states,
            vec![
                ConnectionState::Disconnected,
                ConnectionState::Connecting,
                ConnectionState::Connected,
                ConnectionState::Disconnected,
            ]
        );
    }

    #[tokio::test]
    async fn test_history_loads_before_live_channel_opens() {
        let (mut controller, _, calls) = build_controller(Some(SampleColumns::default()), vec![]);

        controller.run().await;

        assert_eq!(*calls.lock().unwrap(), vec!["fetch", "subscribe"]);
    }

    #[tokio::test]
    async fn test_failed_history_still_starts_live_stream() {
        let (mut controller, recorded, calls) = build_controller(
            None,
            vec![LiveEvent::Opened, live(100, 80.0, -1.0, true)],
        );

        controller.run().await;

        assert_eq!(*calls.lock().unwrap(), vec!["fetch", "subscribe"]);
        let context = controller.context();
        assert_eq!(context.buffer.len(), 1);
        let latest = context.latest.clone().unwrap();
        assert_eq!(latest.download, Some(80));
        assert_eq!(latest.upload, None);
        assert_eq!(recorded.lock().unwrap().lengths, vec![1]);
        // The stream ended without a close event.
        assert_eq!(context.connection, ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_mismatched_history_leaves_buffer_empty() {
        let mut columns = batch(vec![1, 2], vec![1.0, 2.0], vec![1.0, 2.0], vec![true, true]);
        columns.ping.pop();
        let (mut controller, recorded, _) = build_controller(Some(columns), vec![]);

        controller.load_historical().await;

        assert!(controller.context().buffer.is_empty());
        assert!(controller.context().latest.is_none());
        assert!(recorded.lock().unwrap().lengths.is_empty());
    }

    #[tokio::test]
    async fn test_errors_and_malformed_frames_do_not_mutate() {
        let (mut controller, _, _) = build_controller(
            Some(batch(vec![1], vec![5.0], vec![6.0], vec![true])),
            vec![
                LiveEvent::Opened,
                LiveEvent::Malformed {
                    reason: "expected value at line 1 column 1".to_string(),
                },
                LiveEvent::Error {
                    reason: "connection reset".to_string(),
                },
            ],
        );

        controller.load_historical().await;
        let mut events = controller.live.subscribe();
        while let Some(event) = events.next().await {
            controller.handle_event(event);
        }

        // An error alone does not change state; the close handler does.
        assert_eq!(controller.context().connection, ConnectionState::Connected);
        assert_eq!(controller.context().buffer.len(), 1);

        controller.handle_event(LiveEvent::Closed);
        assert_eq!(controller.context().connection, ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_live_appends_respect_capacity() {
        let events = (1..=10_001).map(|ts| live(ts, ts as f64, 1.0, true)).collect();
        let (mut controller, _, _) = build_controller(Some(SampleColumns::default()), events);

        controller.run().await;

        let buffer = &controller.context().buffer;
        assert_eq!(buffer.len(), 10_000);
        assert_eq!(buffer.timestamps().front(), Some(&2));
        assert_eq!(buffer.timestamps().back(), Some(&10_001));
    }
}
