pub mod export;
pub mod snapshot_log;
pub mod store;

pub use export::{export_csv, render_csv, CSV_HEADER};
pub use snapshot_log::SnapshotLog;
pub use store::SnapshotStore;
