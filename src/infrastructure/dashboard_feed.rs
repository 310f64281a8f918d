// Watch-channel rendering surface feeding the HTTP layer
use crate::application::render_surface::RenderSurface;
use crate::application::summary_deriver::SummaryRow;
use crate::domain::connection::ConnectionState;
use crate::domain::sample_buffer::SampleBuffer;
use std::sync::Arc;
use tokio::sync::watch;

/// Immutable view of the dashboard published after each controller event.
#[derive(Debug, Clone, Default)]
pub struct DashboardSnapshot {
    pub series: SampleBuffer,
    pub latest: Option<SummaryRow>,
    pub connection: ConnectionState,
}

pub type SnapshotReceiver = watch::Receiver<Arc<DashboardSnapshot>>;

pub struct WatchSurface {
    tx: watch::Sender<Arc<DashboardSnapshot>>,
}

impl WatchSurface {
    pub fn new() -> (Self, SnapshotReceiver) {
        let (tx, rx) = watch::channel(Arc::new(DashboardSnapshot::default()));
        (Self { tx }, rx)
    }

    fn update(&self, apply: impl FnOnce(&mut DashboardSnapshot)) {
        self.tx.send_modify(|snapshot| apply(Arc::make_mut(snapshot)));
    }
}

impl RenderSurface for WatchSurface {
    fn publish(&mut self, buffer: &SampleBuffer, latest: Option<&SummaryRow>) {
        self.update(|snapshot| {
            snapshot.series = buffer.clone();
            snapshot.latest = latest.cloned();
        });
    }

    fn set_connection_state(&mut self, state: ConnectionState) {
        self.update(|snapshot| snapshot.connection = state);
    }
}
