// Infrastructure layer - External dependencies and adapters
pub mod batch_client;
pub mod config;
pub mod dashboard_feed;
pub mod live_socket;
pub mod wire;
