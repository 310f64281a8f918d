// HTTP request handlers
use crate::application::summary_deriver::{CursorIndices, SummaryRow};
use crate::domain::connection::ConnectionState;
use crate::infrastructure::dashboard_feed::DashboardSnapshot;
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Query, State},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    Json,
};
use futures::stream::Stream;
use futures::StreamExt;
use serde::Serialize;
use std::sync::Arc;
use tokio_stream::wrappers::WatchStream;

#[derive(Debug, Serialize)]
pub struct StatusView {
    pub connection: ConnectionState,
    pub connection_label: &'static str,
    pub indicator: &'static str,
    pub latest: Option<SummaryRow>,
}

impl From<&DashboardSnapshot> for StatusView {
    fn from(snapshot: &DashboardSnapshot) -> Self {
        Self {
            connection: snapshot.connection,
            connection_label: snapshot.connection.label(),
            indicator: snapshot.connection.indicator(),
            latest: snapshot.latest.clone(),
        }
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Plot arrays for the chart
pub async fn get_series(State(state): State<Arc<AppState>>) -> Response {
    let snapshot = state.feed.borrow().clone();
    Json(&snapshot.series).into_response()
}

/// Status panel: connection state and the latest summary
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<StatusView> {
    let snapshot = state.feed.borrow().clone();
    Json(StatusView::from(snapshot.as_ref()))
}

/// Hover legend at the chart cursor; `null` hides the legend
pub async fn get_legend(
    Query(cursor): Query<CursorIndices>,
    State(state): State<Arc<AppState>>,
) -> Json<Option<SummaryRow>> {
    let snapshot = state.feed.borrow().clone();
    Json(state.deriver.hover_summary(&snapshot.series, &cursor))
}

/// Server-sent status updates, one per published snapshot
pub async fn stream_status(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let updates = WatchStream::new(state.feed.clone())
        .map(|snapshot| Event::default().event("status").json_data(StatusView::from(snapshot.as_ref())));

    Sse::new(updates).keep_alive(KeepAlive::default())
}
