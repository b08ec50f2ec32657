//! Application layer - Use cases and orchestration

pub mod controller;

pub use controller::JournalController;
