use iced::{
    widget::{button, column, radio, row, text, text_input, Space},
    Element, Length,
};

use crate::domain::{MediaFormat, OperationPhase};

/// Main view state
pub struct DownloadView {
    pub url: String,
    pub format: MediaFormat,
    pub status_message: String,
    pub error_message: String,
    pub phase: OperationPhase,
    pub can_save_copy: bool,
}

impl Default for DownloadView {
    fn default() -> Self {
        Self {
            url: String::new(),
            format: MediaFormat::Mp3,
            status_message: String::new(),
            error_message: String::new(),
            phase: OperationPhase::Idle,
            can_save_copy: false,
        }
    }
}

#[derive(Debug, Clone)]
pub enum DownloadMessage {
    UrlChanged(String),
    FormatSelected(MediaFormat),
    ConvertPressed,
    SaveCopyPressed,
}

impl DownloadView {
    pub fn update(&mut self, message: DownloadMessage) {
        match message {
            DownloadMessage::UrlChanged(url) => {
                self.url = url;
                self.clear_failure();
            }
            DownloadMessage::FormatSelected(format) => {
                self.format = format;
                self.clear_failure();
            }
            DownloadMessage::ConvertPressed | DownloadMessage::SaveCopyPressed => {
                // Handled by the app
            }
        }
    }

    // A failed attempt goes back to idle as soon as the user edits the form.
    fn clear_failure(&mut self) {
        if self.phase == OperationPhase::Failed {
            self.phase = OperationPhase::Idle;
            self.error_message.clear();
        }
    }

    pub fn view(&self) -> Element<'_, DownloadMessage> {
        let busy = self.phase == OperationPhase::InFlight;

        column![
            text("YouTube to MP3 & MP4").size(32),
            Space::new().height(Length::Fixed(20.0)),
            text_input("Paste YouTube URL here...", &self.url)
                .on_input(DownloadMessage::UrlChanged)
                .padding(10),
            Space::new().height(Length::Fixed(10.0)),
            row![
                radio(
                    "MP3 audio",
                    MediaFormat::Mp3,
                    Some(self.format),
                    DownloadMessage::FormatSelected
                ),
                radio(
                    "MP4 video",
                    MediaFormat::Mp4,
                    Some(self.format),
                    DownloadMessage::FormatSelected
                ),
            ]
            .spacing(20),
            Space::new().height(Length::Fixed(20.0)),
            button(if busy { "Converting..." } else { "Convert & Download" })
                .on_press_maybe((!busy).then_some(DownloadMessage::ConvertPressed))
                .padding([10, 20]),
            button("Save a copy...")
                .on_press_maybe(self.can_save_copy.then_some(DownloadMessage::SaveCopyPressed)),
            Space::new().height(Length::Fixed(10.0)),
            text(&self.status_message).size(14),
            text(&self.error_message).size(14),
        ]
        .padding(20)
        .spacing(10)
        .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_clears_failed_phase() {
        let mut view = DownloadView {
            phase: OperationPhase::Failed,
            error_message: "Please enter a valid YouTube URL".to_string(),
            ..Default::default()
        };
        view.update(DownloadMessage::UrlChanged("youtu.be/x".to_string()));
        assert_eq!(view.phase, OperationPhase::Idle);
        assert!(view.error_message.is_empty());
    }

    #[test]
    fn test_format_change_clears_failed_phase() {
        let mut view = DownloadView {
            phase: OperationPhase::Failed,
            error_message: "Download failed".to_string(),
            ..Default::default()
        };
        view.update(DownloadMessage::FormatSelected(MediaFormat::Mp4));
        assert_eq!(view.format, MediaFormat::Mp4);
        assert_eq!(view.phase, OperationPhase::Idle);
        assert!(view.error_message.is_empty());
    }

    #[test]
    fn test_edit_keeps_success_phase() {
        let mut view = DownloadView {
            phase: OperationPhase::Success,
            status_message: "Download completed!".to_string(),
            ..Default::default()
        };
        view.update(DownloadMessage::UrlChanged("youtu.be/y".to_string()));
        assert_eq!(view.phase, OperationPhase::Success);
        assert_eq!(view.status_message, "Download completed!");
    }
}
