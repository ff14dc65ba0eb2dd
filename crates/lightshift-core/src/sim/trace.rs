// Lightshift Trace Parser
// Reads timed key events: `<ms> <down|up> <row>,<col>`

use std::sync::OnceLock;

use regex::Regex;

use crate::record::KeyPos;

/// One physical event from a trace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceEvent {
    /// Milliseconds since the start of the trace
    pub time: u32,
    pub pressed: bool,
    pub key: KeyPos,
}

/// Errors that can occur when parsing a trace
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TraceError {
    #[error("line {line}: expected `<ms> <down|up> <row>,<col>`, got '{text}'")]
    Syntax { line: usize, text: String },

    #[error("line {line}: number out of range: '{text}'")]
    OutOfRange { line: usize, text: String },

    #[error("line {line}: time {time} is before the previous event at {previous}")]
    TimeWentBackwards { line: usize, time: u32, previous: u32 },
}

fn event_regex() -> &'static Regex {
    static EVENT: OnceLock<Regex> = OnceLock::new();
    EVENT.get_or_init(|| {
        Regex::new(r"^(\d+)\s+(down|up)\s+(\d+)\s*,\s*(\d+)$").expect("trace event pattern is valid")
    })
}

/// Parse a whole trace. Blank lines and `#` comments are skipped; times must
/// never decrease.
pub fn parse_trace(text: &str) -> Result<Vec<TraceEvent>, TraceError> {
    let mut events = Vec::new();
    let mut previous = 0u32;

    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        let content = raw.split('#').next().unwrap_or("").trim();
        if content.is_empty() {
            continue;
        }

        let caps = event_regex().captures(content).ok_or_else(|| TraceError::Syntax {
            line,
            text: content.to_string(),
        })?;
        let out_of_range = |text: &str| TraceError::OutOfRange {
            line,
            text: text.to_string(),
        };

        let time: u32 = caps[1].parse().map_err(|_| out_of_range(&caps[1]))?;
        let row: u8 = caps[3].parse().map_err(|_| out_of_range(&caps[3]))?;
        let col: u8 = caps[4].parse().map_err(|_| out_of_range(&caps[4]))?;

        if time < previous {
            return Err(TraceError::TimeWentBackwards { line, time, previous });
        }
        previous = time;

        events.push(TraceEvent {
            time,
            pressed: &caps[2] == "down",
            key: KeyPos::new(row, col),
        });
    }

    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trace() {
        let text = "# s-i roll\n0 down 1,3\n40 down 1,9   # i\n\n90 up 1,3\n120 up 1,9\n";
        let events = parse_trace(text).unwrap();
        assert_eq!(events.len(), 4);
        assert_eq!(
            events[1],
            TraceEvent {
                time: 40,
                pressed: true,
                key: KeyPos::new(1, 9)
            }
        );
        assert!(!events[2].pressed);
    }

    #[test]
    fn test_syntax_error_reports_line() {
        let err = parse_trace("0 down 1,3\n10 sideways 1,3\n").unwrap_err();
        assert_eq!(
            err,
            TraceError::Syntax {
                line: 2,
                text: "10 sideways 1,3".to_string()
            }
        );
    }

    #[test]
    fn test_time_must_not_decrease() {
        let err = parse_trace("50 down 0,0\n40 up 0,0\n").unwrap_err();
        assert_eq!(
            err,
            TraceError::TimeWentBackwards {
                line: 2,
                time: 40,
                previous: 50
            }
        );
        assert!(parse_trace("50 down 0,0\n50 up 0,0\n").is_ok());
    }

    #[test]
    fn test_out_of_range() {
        let err = parse_trace("0 down 300,1\n").unwrap_err();
        assert!(matches!(err, TraceError::OutOfRange { line: 1, .. }));
    }
}
