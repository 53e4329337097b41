//! Markdown transcript rendering.

use chrono::DateTime;

use crate::media::AnnotatedMessage;

/// Render the annotated thread as one markdown document.
///
/// One section per message, in thread order, separated by dividers. Message
/// text is interpolated as-is; this is a transcript, not a sanitizer.
#[must_use]
pub fn render_document(entries: &[AnnotatedMessage]) -> String {
    if entries.is_empty() {
        return String::new();
    }

    let sections: Vec<String> = entries.iter().map(render_section).collect();
    let mut document = sections.join("\n\n---\n\n");
    document.push('\n');
    document
}

fn render_section(entry: &AnnotatedMessage) -> String {
    let message = &entry.message;
    let author = if message.user.is_empty() {
        "unknown"
    } else {
        &message.user
    };

    let mut section = format!("### [{}] {author}\n\n", format_timestamp(&message.ts));

    if message.text.is_empty() {
        section.push_str("_(no text)_");
    } else {
        section.push_str(&message.text);
    }

    for media in &entry.media {
        let name = if media.original_name.is_empty() {
            &media.local_file_name
        } else {
            &media.original_name
        };
        section.push_str(&format!(
            "\n\n- [{name}]({path})\n\n  ![{name}]({path})",
            path = media.relative_path
        ));
    }

    section
}

/// Human-readable UTC form of a `seconds.microseconds` timestamp. A `ts`
/// that does not parse renders raw; presentation never fails the run.
fn format_timestamp(ts: &str) -> String {
    ts.split('.')
        .next()
        .and_then(|seconds| seconds.parse::<i64>().ok())
        .and_then(|seconds| DateTime::from_timestamp(seconds, 0))
        .map_or_else(
            || ts.to_string(),
            |dt| dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        )
}
