pub mod extract;
pub mod report;
pub mod net;

// API service (axum) — used by the `rootlens-server` binary and the tests
pub mod config;
pub mod server;

// Desktop client state (the egui shell lives in main.rs / src/app)
pub mod app;
