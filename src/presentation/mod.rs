// Presentation layer - HTTP surface read by the browser chart
pub mod app_state;
pub mod handlers;
