pub mod error;
pub mod storage;
pub mod types;

pub use error::StoreError;
pub use storage::{backup_file_name, get_data_path, snapshot_to_json, RatingStore};
pub use types::{ImportReport, Rating, Snapshot, META_IDX, SNAPSHOT_VERSION};
