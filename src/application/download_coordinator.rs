use std::path::{Path, PathBuf};

use bytes::Bytes;
use futures::{stream::BoxStream, StreamExt};

use crate::{
    api::{ApiClient, ApiError, ConvertRequest, PendingDownload},
    domain::{AppError, RequestIntent},
    utils::{sanitize_filename, validate_media_url},
};

/// Progress of one download operation, in order of emission.
#[derive(Debug, Clone)]
pub enum DownloadEvent {
    /// The backend accepted the request; the body is being fetched.
    Requested,
    Saved(SavedDownload),
    Failed(AppError),
}

/// A payload that has been written to disk.
#[derive(Debug, Clone)]
pub struct SavedDownload {
    pub path: PathBuf,
    pub filename: String,
    pub payload: Bytes,
}

#[derive(Clone)]
pub struct DownloadCoordinator {
    api_client: ApiClient,
    save_dir: PathBuf,
}

impl DownloadCoordinator {
    pub fn new(api_client: ApiClient, save_dir: PathBuf) -> Self {
        Self {
            api_client,
            save_dir,
        }
    }

    /// Drives one request from submission to a file on disk. The stream
    /// yields `Requested` once the backend has answered, then either
    /// `Saved` or `Failed`, and finishes.
    pub fn download_stream(&self, intent: RequestIntent) -> BoxStream<'static, DownloadEvent> {
        futures::stream::unfold(
            RunState::Start {
                coordinator: self.clone(),
                intent,
            },
            |state| async move {
                match state {
                    RunState::Start {
                        coordinator,
                        intent,
                    } => {
                        // Invalid intents must never reach the network.
                        if let Err(reason) = validate_media_url(&intent.url) {
                            return Some((
                                DownloadEvent::Failed(AppError::Input(reason)),
                                RunState::Finished,
                            ));
                        }

                        let request = ConvertRequest {
                            url: intent.url,
                            format: intent.format,
                        };
                        match coordinator.api_client.request_conversion(&request).await {
                            Ok(pending) => Some((
                                DownloadEvent::Requested,
                                RunState::Receive {
                                    coordinator,
                                    pending,
                                },
                            )),
                            Err(e) => {
                                Some((DownloadEvent::Failed(map_api_error(e)), RunState::Finished))
                            }
                        }
                    }
                    RunState::Receive {
                        coordinator,
                        pending,
                    } => {
                        let result = match pending.into_payload().await {
                            Ok(result) => result,
                            Err(e) => {
                                return Some((
                                    DownloadEvent::Failed(map_api_error(e)),
                                    RunState::Finished,
                                ));
                            }
                        };

                        match coordinator
                            .write_payload(&result.filename, &result.payload)
                            .await
                        {
                            Ok(path) => {
                                tracing::info!(
                                    path = %path.display(),
                                    content_type = result.content_type.as_deref().unwrap_or("unknown"),
                                    "saved download"
                                );
                                Some((
                                    DownloadEvent::Saved(SavedDownload {
                                        path,
                                        filename: result.filename,
                                        payload: result.payload,
                                    }),
                                    RunState::Finished,
                                ))
                            }
                            Err(e) => Some((DownloadEvent::Failed(e), RunState::Finished)),
                        }
                    }
                    RunState::Finished => None,
                }
            },
        )
        .boxed()
    }

    /// Writes a retained payload to a location the user picks in a save
    /// dialog. `None` means the dialog was dismissed.
    pub async fn save_copy(
        &self,
        filename: String,
        payload: Bytes,
    ) -> Result<Option<PathBuf>, AppError> {
        let Some(handle) = rfd::AsyncFileDialog::new()
            .set_file_name(&filename)
            .save_file()
            .await
        else {
            return Ok(None);
        };

        let path = handle.path().to_path_buf();
        tokio::fs::write(&path, &payload)
            .await
            .map_err(|e| AppError::Io(e.to_string()))?;
        Ok(Some(path))
    }

    async fn write_payload(&self, filename: &str, payload: &Bytes) -> Result<PathBuf, AppError> {
        let safe_name = sanitize_filename(filename)
            .trim_matches(|c| c == '.' || c == ' ')
            .to_string();

        tokio::fs::create_dir_all(&self.save_dir)
            .await
            .map_err(|e| AppError::Io(e.to_string()))?;

        let path = unique_path(&self.save_dir, &safe_name).await;
        tokio::fs::write(&path, payload)
            .await
            .map_err(|e| AppError::Io(e.to_string()))?;
        Ok(path)
    }
}

enum RunState {
    Start {
        coordinator: DownloadCoordinator,
        intent: RequestIntent,
    },
    Receive {
        coordinator: DownloadCoordinator,
        pending: PendingDownload,
    },
    Finished,
}

fn map_api_error(err: ApiError) -> AppError {
    match err {
        ApiError::Rejected(message) => AppError::Backend(message),
        ApiError::Request(source) => {
            tracing::warn!(error = %source, "transport failure");
            AppError::Transport
        }
        ApiError::BadBaseUrl(detail) => {
            tracing::warn!(detail, "invalid backend address");
            AppError::Transport
        }
    }
}

/// First free path for `filename` inside `dir`, adding " (n)" before the
/// extension when the name is already taken.
async fn unique_path(dir: &Path, filename: &str) -> PathBuf {
    let direct = dir.join(filename);
    if !tokio::fs::try_exists(&direct).await.unwrap_or(false) {
        return direct;
    }

    let name = Path::new(filename);
    let stem = name
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("download");
    let extension = name.extension().and_then(|s| s.to_str());

    for n in 1u32.. {
        let candidate = match extension {
            Some(ext) => dir.join(format!("{stem} ({n}).{ext}")),
            None => dir.join(format!("{stem} ({n})")),
        };
        if !tokio::fs::try_exists(&candidate).await.unwrap_or(false) {
            return candidate;
        }
    }
    direct
}
