//! Console report for rehearsal runs.
//!
//! This is user output, so it goes to stdout rather than through `tracing`.

use meshquake_core::entities::processed_record::ProcessedRecord;
use meshquake_core::processors::AlertMessage;
use meshquake_core::utils::local_time;

/// One stored record as `YYYY-MM-DD HH:MM:SS | message`, in Pacific time.
pub fn history_line(record: &ProcessedRecord) -> String {
    let stamp = local_time::long_stamp(local_time::from_epoch_seconds(record.timestamp));
    format!("{stamp} | {}", record.message)
}

pub fn render_rehearsal(alert: &AlertMessage, history: &[ProcessedRecord]) -> String {
    let mut out = String::from("[REHEARSAL]\nMost recent matching message (not sent):\n");
    out.push_str(&alert.full_text);
    out.push_str("\n\nAll stored messages (rehearsal table):\n\n");
    for record in history {
        out.push_str(&history_line(record));
        out.push('\n');
    }
    out
}

pub fn print_rehearsal(alert: &AlertMessage, history: &[ProcessedRecord]) {
    print!("{}", render_rehearsal(alert, history));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, message: &str, timestamp: i64) -> ProcessedRecord {
        ProcessedRecord {
            id: id.to_string(),
            message: message.to_string(),
            timestamp,
        }
    }

    fn alert(full_text: &str) -> AlertMessage {
        AlertMessage {
            summary: String::new(),
            place: String::new(),
            datetime_text: String::new(),
            full_text: full_text.to_string(),
        }
    }

    #[test]
    fn test_history_line_uses_pacific_time() {
        // 2024-07-04 19:05:09 UTC
        let line = history_line(&record("nc1", "M3.1 12mi from SJ: x", 1_720_119_909));
        assert_eq!(line, "2024-07-04 12:05:09 | M3.1 12mi from SJ: x");
    }

    #[test]
    fn test_render_lists_candidate_then_history_in_order() {
        let history = vec![
            record("b", "second", 1_720_119_909),
            record("a", "first", 1_720_119_849),
        ];
        let out = render_rehearsal(&alert("candidate text"), &history);

        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "[REHEARSAL]");
        assert_eq!(lines[2], "candidate text");
        assert_eq!(lines[lines.len() - 2], "2024-07-04 12:05:09 | second");
        assert_eq!(lines[lines.len() - 1], "2024-07-04 12:04:09 | first");
    }

    #[test]
    fn test_render_with_empty_history() {
        let out = render_rehearsal(&alert("only"), &[]);
        assert!(out.ends_with("(rehearsal table):\n\n"));
    }
}
