pub mod commands;
pub mod controller;
pub mod state;

pub use controller::RecorderController;
pub use state::{RecorderCore, RecorderOverview, RecorderStatus};
