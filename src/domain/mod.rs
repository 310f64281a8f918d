// Domain layer - Samples, the bounded buffer and connection state
pub mod connection;
pub mod sample;
pub mod sample_buffer;
