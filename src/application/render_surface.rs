// Rendering surface - the consumer redrawn after every controller event
use crate::application::summary_deriver::SummaryRow;
use crate::domain::connection::ConnectionState;
use crate::domain::sample_buffer::SampleBuffer;

pub trait RenderSurface: Send {
    /// Redraw with the buffer and the latest summary derived from it, as one update.
    fn publish(&mut self, buffer: &SampleBuffer, latest: Option<&SummaryRow>);

    fn set_connection_state(&mut self, state: ConnectionState);
}
