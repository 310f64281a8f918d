// Application state for HTTP handlers
use crate::application::summary_deriver::SummaryDeriver;
use crate::infrastructure::dashboard_feed::SnapshotReceiver;

#[derive(Clone)]
pub struct AppState {
    pub feed: SnapshotReceiver,
    pub deriver: SummaryDeriver,
}
