//! Entry points for the host bridge. Errors cross the boundary as strings.

use std::path::PathBuf;

use crate::{
    models::Snapshot,
    sensing::AdapterState,
    AppState,
};

use super::{RecorderController, RecorderOverview};

const ENABLE_LOGS: bool = true;

use crate::log_error;

fn controller_from_state(state: &AppState) -> RecorderController {
    state.recorder.clone()
}

pub async fn start_logging(state: &AppState) -> Result<(), String> {
    let controller = controller_from_state(state);
    controller.start_logging().await.map_err(|e| e.to_string())
}

pub async fn stop_logging(state: &AppState) -> Result<(), String> {
    let controller = controller_from_state(state);
    controller.stop_logging().await.map_err(|e| e.to_string())
}

pub async fn set_label(state: &AppState, label: String) -> Result<Snapshot, String> {
    let controller = controller_from_state(state);
    Ok(controller.set_label(label).await)
}

/// `None` when the file could not be written; the cause is logged.
pub async fn export_csv(state: &AppState) -> Option<PathBuf> {
    let controller = controller_from_state(state);
    match controller.export_csv().await {
        Ok(path) => Some(path),
        Err(err) => {
            log_error!("{err:#}");
            None
        }
    }
}

pub async fn clear_log(state: &AppState) -> Result<(), String> {
    let controller = controller_from_state(state);
    controller.clear_log().await;
    Ok(())
}

pub async fn get_readings(state: &AppState) -> Result<AdapterState, String> {
    let controller = controller_from_state(state);
    Ok(controller.readings().await)
}

pub async fn get_snapshots(state: &AppState) -> Result<Vec<Snapshot>, String> {
    let controller = controller_from_state(state);
    Ok(controller.snapshots().await)
}

pub async fn get_overview(state: &AppState) -> Result<RecorderOverview, String> {
    let controller = controller_from_state(state);
    Ok(controller.overview().await)
}
