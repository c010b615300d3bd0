use std::path::PathBuf;
use std::time::Duration;

use futures::StreamExt;
use iced::Task;

use crate::api::{ApiClient, ApiConfig};
use crate::application::{DownloadCoordinator, DownloadEvent};
use crate::domain::{AppError, OperationPhase, RequestIntent, RetainedPayload};
use crate::ui::{DownloadMessage, DownloadView};
use crate::utils::validate_media_url;

/// How long a finished download's payload and status line stick around.
const RETENTION_PERIOD: Duration = Duration::from_secs(3);

pub struct DownloadApp {
    view: DownloadView,
    coordinator: DownloadCoordinator,
    retained: Option<RetainedPayload>,
    // Bumped per submit; stale retention timers carry an older value.
    attempt: u64,
}

impl Default for DownloadApp {
    fn default() -> Self {
        Self::new()
    }
}

impl DownloadApp {
    pub fn new() -> Self {
        let api_client = ApiClient::new(ApiConfig::from_env());
        let save_dir = dirs::download_dir().unwrap_or_else(std::env::temp_dir);
        let coordinator = DownloadCoordinator::new(api_client, save_dir);

        Self {
            view: DownloadView::default(),
            coordinator,
            retained: None,
            attempt: 0,
        }
    }

    fn release_retained(&mut self) {
        if let Some(mut payload) = self.retained.take() {
            payload.release();
        }
        self.view.can_save_copy = false;
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    UiMessage(DownloadMessage),
    DownloadEvent(DownloadEvent),
    /// Result of writing a retained payload through the save dialog.
    CopySaved(Result<Option<PathBuf>, AppError>),
    /// Grace period over for the tagged attempt.
    RetentionExpired(u64),
}

pub fn update(app: &mut DownloadApp, message: Message) -> Task<Message> {
    match message {
        Message::UiMessage(ui_msg) => {
            app.view.update(ui_msg.clone());
            match ui_msg {
                DownloadMessage::ConvertPressed => start_download(app),
                DownloadMessage::SaveCopyPressed => save_copy(app),
                _ => Task::none(),
            }
        }
        Message::DownloadEvent(event) => handle_download_event(app, event),
        Message::CopySaved(result) => {
            match result {
                Ok(Some(path)) => {
                    app.view.status_message = format!("Copy saved to {}", path.display());
                }
                Ok(None) => {
                    // Dialog dismissed, nothing to report
                }
                Err(e) => {
                    app.view.error_message = e.to_string();
                }
            }
            Task::none()
        }
        Message::RetentionExpired(attempt) => {
            if attempt == app.attempt {
                app.release_retained();
                if app.view.phase == OperationPhase::Success {
                    app.view.phase = OperationPhase::Idle;
                    app.view.status_message.clear();
                }
            }
            Task::none()
        }
    }
}

fn start_download(app: &mut DownloadApp) -> Task<Message> {
    // One request at a time; a submit while busy is a no-op.
    if app.view.phase == OperationPhase::InFlight {
        return Task::none();
    }

    app.release_retained();
    app.view.status_message.clear();
    app.view.error_message.clear();

    app.view.phase = OperationPhase::Validating;
    if let Err(reason) = validate_media_url(&app.view.url) {
        tracing::debug!(%reason, "rejected input");
        app.view.phase = OperationPhase::Failed;
        app.view.error_message = reason.to_string();
        return Task::none();
    }

    let intent = RequestIntent {
        url: app.view.url.trim().to_string(),
        format: app.view.format,
    };

    app.view.phase = OperationPhase::InFlight;
    app.view.status_message = "Preparing download...".to_string();
    app.attempt += 1;

    Task::stream(
        app.coordinator
            .download_stream(intent)
            .map(Message::DownloadEvent),
    )
}

fn handle_download_event(app: &mut DownloadApp, event: DownloadEvent) -> Task<Message> {
    match event {
        DownloadEvent::Requested => {
            app.view.status_message = "Download starting...".to_string();
            Task::none()
        }
        DownloadEvent::Saved(saved) => {
            app.view.phase = OperationPhase::Success;
            app.view.status_message = "Download completed!".to_string();
            app.retained = Some(RetainedPayload::new(saved.payload, saved.filename));
            app.view.can_save_copy = true;

            let attempt = app.attempt;
            Task::perform(tokio::time::sleep(RETENTION_PERIOD), move |_| {
                Message::RetentionExpired(attempt)
            })
        }
        DownloadEvent::Failed(e) => {
            app.release_retained();
            app.view.phase = OperationPhase::Failed;
            app.view.status_message.clear();
            app.view.error_message = e.to_string();
            Task::none()
        }
    }
}

fn save_copy(app: &mut DownloadApp) -> Task<Message> {
    let Some(retained) = app.retained.as_ref() else {
        return Task::none();
    };
    let Some(payload) = retained.bytes().cloned() else {
        return Task::none();
    };
    let filename = retained.filename().to_string();
    let coordinator = app.coordinator.clone();

    Task::perform(
        async move { coordinator.save_copy(filename, payload).await },
        Message::CopySaved,
    )
}

pub fn view(app: &DownloadApp) -> iced::Element<'_, Message> {
    app.view.view().map(Message::UiMessage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn submit(app: &mut DownloadApp) -> Task<Message> {
        update(
            app,
            Message::UiMessage(DownloadMessage::ConvertPressed),
        )
    }

    #[test]
    fn test_empty_url_fails_without_dispatch() {
        let mut app = DownloadApp::new();
        let _ = submit(&mut app);

        assert_eq!(app.view.phase, OperationPhase::Failed);
        assert_eq!(app.view.error_message, "Please enter a YouTube URL");
        assert_eq!(app.attempt, 0);
    }

    #[test]
    fn test_malformed_url_fails_without_dispatch() {
        let mut app = DownloadApp::new();
        app.view.url = "https://vimeo.com/12345".to_string();
        let _ = submit(&mut app);

        assert_eq!(app.view.phase, OperationPhase::Failed);
        assert_eq!(app.view.error_message, "Please enter a valid YouTube URL");
        assert_eq!(app.attempt, 0);
    }

    #[test]
    fn test_valid_url_goes_in_flight() {
        let mut app = DownloadApp::new();
        app.view.url = "https://youtu.be/dQw4w9WgXcQ".to_string();
        let _ = submit(&mut app);

        assert_eq!(app.view.phase, OperationPhase::InFlight);
        assert_eq!(app.view.status_message, "Preparing download...");
        assert_eq!(app.attempt, 1);
    }

    #[test]
    fn test_submit_while_in_flight_is_noop() {
        let mut app = DownloadApp::new();
        app.view.url = "https://youtu.be/dQw4w9WgXcQ".to_string();
        let _ = submit(&mut app);
        let _ = submit(&mut app);

        assert_eq!(app.attempt, 1);
        assert_eq!(app.view.status_message, "Preparing download...");
    }

    #[test]
    fn test_success_retains_payload_until_timer() {
        let mut app = DownloadApp::new();
        app.view.url = "https://youtu.be/dQw4w9WgXcQ".to_string();
        let _ = submit(&mut app);

        let _ = update(
            &mut app,
            Message::DownloadEvent(DownloadEvent::Saved(crate::application::SavedDownload {
                path: PathBuf::from("/tmp/clip.mp3"),
                filename: "clip.mp3".to_string(),
                payload: Bytes::from_static(b"abc"),
            })),
        );
        assert_eq!(app.view.phase, OperationPhase::Success);
        assert_eq!(app.view.status_message, "Download completed!");
        assert!(app.view.can_save_copy);
        assert!(app.retained.is_some());

        let _ = update(&mut app, Message::RetentionExpired(app.attempt));
        assert_eq!(app.view.phase, OperationPhase::Idle);
        assert!(app.view.status_message.is_empty());
        assert!(!app.view.can_save_copy);
        assert!(app.retained.is_none());
    }

    #[test]
    fn test_stale_timer_is_ignored() {
        let mut app = DownloadApp::new();
        app.view.url = "https://youtu.be/dQw4w9WgXcQ".to_string();
        let _ = submit(&mut app);
        let stale = app.attempt;

        // A fresh submit supersedes the first attempt.
        let _ = update(
            &mut app,
            Message::DownloadEvent(DownloadEvent::Failed(AppError::Transport)),
        );
        app.view.url = "https://youtu.be/other".to_string();
        let _ = submit(&mut app);

        let _ = update(&mut app, Message::RetentionExpired(stale));
        assert_eq!(app.view.phase, OperationPhase::InFlight);
        assert_eq!(app.view.status_message, "Preparing download...");
    }

    #[test]
    fn test_failure_clears_retained_payload() {
        let mut app = DownloadApp::new();
        app.view.url = "https://youtu.be/dQw4w9WgXcQ".to_string();
        let _ = submit(&mut app);
        app.retained = Some(RetainedPayload::new(
            Bytes::from_static(b"abc"),
            "old.mp3".to_string(),
        ));
        app.view.can_save_copy = true;

        let _ = update(
            &mut app,
            Message::DownloadEvent(DownloadEvent::Failed(AppError::Backend(
                "video unavailable".to_string(),
            ))),
        );
        assert_eq!(app.view.phase, OperationPhase::Failed);
        assert_eq!(app.view.error_message, "video unavailable");
        assert!(app.retained.is_none());
        assert!(!app.view.can_save_copy);
    }

    #[test]
    fn test_save_copy_without_payload_is_noop() {
        let mut app = DownloadApp::new();
        let _ = update(
            &mut app,
            Message::UiMessage(DownloadMessage::SaveCopyPressed),
        );
        assert!(app.retained.is_none());
    }
}
