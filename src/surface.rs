//! 终端显示层：把 `ViewDescriptor` 渲染成纯文本。

use crate::session::{Surface, Tab, ViewDescriptor};

/// 渲染整个视图，逐行拼接。
pub fn render_view(view: &ViewDescriptor) -> String {
    let mut lines: Vec<String> = Vec::new();

    let (upload, camera) = match view.tab {
        Tab::Upload => ("[Upload]", " Camera "),
        Tab::Camera => (" Upload ", "[Camera]"),
    };
    lines.push(format!("{upload} {camera}    mode: {}", view.mode));

    if let Some(notice) = &view.notice {
        lines.push(format!("! {}", notice.message));
    }

    match view.primary {
        Surface::Upload => lines.push("Choose an image file (pick <path>).".to_string()),
        Surface::Camera if view.camera_live => {
            lines.push("Camera is live. Take a snapshot (snap).".to_string())
        }
        Surface::Camera => lines.push("Camera is not active.".to_string()),
        Surface::Preview => {}
        Surface::Loading => lines.push("Analyzing image...".to_string()),
        Surface::Result | Surface::Error => {
            if let Some(outcome) = &view.outcome {
                lines.push(outcome.to_string().trim_end().to_string());
            }
        }
    }

    if let Some(preview) = &view.preview {
        lines.push(format!(
            "Preview: {} ({}, {}x{}, {} chars)",
            preview.file_name,
            preview.origin,
            preview.width,
            preview.height,
            preview.data_url.len()
        ));
    }

    let mut actions = Vec::new();
    if view.controls.switch_enabled {
        actions.push("upload");
        actions.push("camera");
    }
    if view.controls.pick_enabled {
        actions.push("pick <path>");
    }
    if view.controls.snapshot_enabled {
        actions.push("snap");
    }
    if view.controls.submit_enabled {
        actions.push("submit");
    }
    if !actions.is_empty() {
        lines.push(format!("> {}", actions.join(" | ")));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::failure::FailureOutcome;
    use crate::render::RenderedOutcome;
    use crate::session::{Controls, Mode, Notice};

    fn view(mode: Mode) -> ViewDescriptor {
        ViewDescriptor {
            mode,
            tab: Tab::Upload,
            primary: mode.primary_surface(),
            companion_preview: false,
            preview: None,
            outcome: None,
            notice: None,
            controls: Controls::default(),
            camera_live: false,
        }
    }

    #[test]
    fn loading_view_has_no_actions() {
        let text = render_view(&view(Mode::Submitting));

        assert!(text.contains("Analyzing image..."));
        assert!(!text.contains('>'));
    }

    #[test]
    fn notice_and_error_are_rendered() {
        let failure = FailureOutcome::ServerRejected("model unavailable".into());
        let mut error_view = view(Mode::ErrorReady);
        error_view.outcome = Some(RenderedOutcome::from_failure(&failure));
        error_view.notice = Some(Notice::from(&FailureOutcome::no_image()));

        let text = render_view(&error_view);

        assert!(text.contains("! Please upload an image first."));
        assert!(text.contains("model unavailable"));
    }

    #[test]
    fn lines_are_ordered_header_notice_body_actions() {
        let mut upload_view = view(Mode::UploadIdle);
        upload_view.notice = Some(Notice::from(&FailureOutcome::no_image()));
        upload_view.controls.pick_enabled = true;

        let text = render_view(&upload_view);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("[Upload]"));
        assert_eq!(lines[1], "! Please upload an image first.");
        assert_eq!(lines[2], "Choose an image file (pick <path>).");
        assert_eq!(lines[3], "> pick <path>");
    }
}
