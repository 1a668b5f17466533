// Formatting helpers for the review screen

use crate::domain::SessionState;

/// Formats a byte count as a human readable size
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} {}", size, UNITS[unit])
    }
}

/// Fraction of the session decided so far, in `[0, 1]`
pub fn calculate_progress(processed: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (processed as f64 / total as f64).min(1.0)
}

/// The "N of M" counter, or a summary once nothing is left to show
pub fn position_label(state: &SessionState) -> String {
    match state.current_position() {
        Some(position) => format!("{} of {}", position, state.display_total()),
        None if state.is_loading => "Loading…".to_string(),
        None if state.working_set.is_empty() => "No photos".to_string(),
        None => format!("Done ({} left)", state.display_total()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DeleteMode, Item, SortOrder};

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(512), "512 B");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(5 * 1024 * 1024), "5.0 MB");
        assert_eq!(format_file_size(3 * 1024 * 1024 * 1024), "3.0 GB");
    }

    #[test]
    fn test_calculate_progress() {
        assert_eq!(calculate_progress(0, 0), 0.0);
        assert_eq!(calculate_progress(1, 4), 0.25);
        assert_eq!(calculate_progress(5, 4), 1.0);
    }

    #[test]
    fn test_position_label() {
        let mut state = SessionState::new(SortOrder::NewestFirst, DeleteMode::Immediate);
        assert_eq!(position_label(&state), "No photos");

        state.is_loading = true;
        assert_eq!(position_label(&state), "Loading…");

        state.is_loading = false;
        state.working_set = vec![Item::new(1, "a.jpg", None), Item::new(2, "b.jpg", None)];
        state.total_count = 2;
        assert_eq!(position_label(&state), "1 of 2");

        state.cursor = 2;
        assert_eq!(position_label(&state), "Done (2 left)");
    }
}
