pub mod download_coordinator;

pub use download_coordinator::{DownloadCoordinator, DownloadEvent, SavedDownload};
