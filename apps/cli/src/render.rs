use console::style;
use vidintel_core::{
    NO_RESULTS_MESSAGE, SessionState, SessionStatus, description_or_fallback, format_score,
    format_time_label,
};

pub fn header() -> String {
    format!(
        "\n{}  {}\n{}\n",
        style("vidintel").cyan().bold(),
        style("Video Intelligence Agent").dim(),
        style("Upload a video and ask complex questions using AI.").dim()
    )
}

pub fn status_line(state: &SessionState) -> Option<String> {
    let message = state.status_message()?;
    let line = match state.status {
        SessionStatus::UploadError => format!("{} {}", style("✗").red().bold(), message),
        SessionStatus::Ready => format!("{} {}", style("✓").green().bold(), message),
        _ => format!("{}", style(message).blue()),
    };
    Some(line)
}

/// Results top-to-bottom, or the no-results message when it applies. Empty when neither.
pub fn results_block(state: &SessionState) -> String {
    if state.show_no_results() {
        return format!("{}", style(NO_RESULTS_MESSAGE).dim());
    }

    state
        .results
        .iter()
        .map(|res| {
            format!(
                "{} {}\n   {}  {}",
                style("◷").blue(),
                style(format_time_label(res)).cyan().bold(),
                description_or_fallback(res),
                style(format!("Match Score: {}", format_score(res.score))).dim()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn full_view(state: &SessionState) -> String {
    let mut output = String::new();

    let file = match &state.file {
        Some(file) => file.path.display().to_string(),
        None => "none".to_string(),
    };
    output.push_str(&format!("{} {}\n", style("File:").dim(), file));
    if let Some(status) = status_line(state) {
        output.push_str(&status);
        output.push('\n');
    }
    if !state.query.is_empty() {
        output.push_str(&format!("{} {}\n", style("Query:").dim(), state.query));
    }
    if state.busy {
        output.push_str(&format!("{}\n", style("(request in flight)").yellow()));
    } else if !state.searched {
        output.push_str(&format!("{}\n", style("(not searched yet)").dim()));
    }

    let results = results_block(state);
    if !results.is_empty() {
        output.push_str(&style("─".repeat(60)).dim().to_string());
        output.push('\n');
        output.push_str(&results);
        output.push('\n');
    }
    output
}
