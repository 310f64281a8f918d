// Application layer - Ingestion, summaries and the seams to external collaborators
pub mod ingestion_controller;
pub mod render_surface;
pub mod sample_sources;
pub mod summary_deriver;
