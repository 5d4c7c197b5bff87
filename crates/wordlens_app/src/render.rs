use wordlens_core::{
    AppViewModel, InspectionBody, InspectionView, JobPhase, JobState, PageButton, PageView,
    Segment, TermRow,
};

/// Renders the view model as plain text lines.
pub fn render(view: &AppViewModel) -> Vec<String> {
    let mut lines = vec![format!("[{:>3}%] {}", view.progress, view.status_text)];

    let finished = view
        .job
        .as_ref()
        .is_some_and(|job| job.phase == JobPhase::Tracking(JobState::Done));
    if finished {
        lines.push(view.summary());
        lines.push(query_line(view));
        lines.extend(view.page.rows.iter().map(term_line));
        if view.page.total_pages > 1 {
            lines.push(pager_line(&view.page));
        }
    }

    if let Some(inspection) = &view.inspection {
        lines.extend(inspection_lines(inspection));
    }

    if let Some(words) = &view.words {
        if words.is_empty() {
            lines.push("dictionary is empty".to_string());
        } else {
            lines.push(format!(
                "dictionary ({} words): {}",
                words.len(),
                words.join(", ")
            ));
        }
    }
    if let Some(word) = &view.pending_removal {
        lines.push(format!("remove '{word}' from the dictionary? (yes/no)"));
    }
    if let Some(notice) = &view.notice {
        lines.push(format!("note: {}", notice.text()));
    }
    if let Some(alert) = &view.alert {
        lines.push(format!("error: {alert}"));
    }
    lines
}

fn query_line(view: &AppViewModel) -> String {
    let query = if view.query.trim().is_empty() {
        "(none)".to_string()
    } else {
        format!("\"{}\"", view.query.trim())
    };
    format!(
        "query: {query}  sort: {}  min length: {}",
        view.sort, view.min_length
    )
}

fn term_line(row: &TermRow) -> String {
    let mut line = format!("  {}  x{}", row.text, row.count);
    if row.in_dictionary {
        line.push_str("  [dict]");
    }
    if row.flagged_suspect {
        line.push_str("  [suspect]");
    }
    line
}

fn pager_line(page: &PageView) -> String {
    let buttons: Vec<String> = page
        .buttons
        .iter()
        .map(|button| match button {
            PageButton::Page(n) if *n == page.page => format!("[{n}]"),
            PageButton::Page(n) => n.to_string(),
            PageButton::Ellipsis => "...".to_string(),
        })
        .collect();
    format!("pages: {}", buttons.join(" "))
}

fn inspection_lines(inspection: &InspectionView) -> Vec<String> {
    let header = match inspection.count {
        Some(count) => format!("== {} ({count} occurrences) ==", inspection.term),
        None => format!("== {} ==", inspection.term),
    };
    let mut lines = vec![header];
    match &inspection.body {
        InspectionBody::Loading => lines.push("  loading occurrences...".to_string()),
        InspectionBody::Failed(message) => {
            lines.push(format!("  could not load occurrences: {message}"))
        }
        InspectionBody::Loaded(rows) if rows.is_empty() => {
            lines.push("  no occurrences".to_string())
        }
        InspectionBody::Loaded(rows) => {
            for (position, row) in rows.iter().enumerate() {
                let sentence: String = row
                    .segments
                    .iter()
                    .map(|segment| match segment {
                        Segment::Plain(text) => text.clone(),
                        Segment::Hit(text) => format!("*{text}*"),
                    })
                    .collect();
                lines.push(format!(
                    "  {:>2}. [{}] p{} l{}: {}",
                    position + 1,
                    if row.marked { "x" } else { " " },
                    row.page,
                    row.line,
                    sentence
                ));
            }
        }
    }
    if let Some(error) = &inspection.error {
        lines.push(format!("  error: {error}"));
    }
    lines
}
