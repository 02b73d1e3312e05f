use crate::error::Error;

const KEY_POINTS_MARKER: &str = "**Key Points:**";
const SUMMARY_LABEL: &str = "**Summary**";

/// Summary paragraph plus ordered key points, ready for rendering
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryResult {
    pub summary: String,
    pub key_points: Vec<String>,
}

impl SummaryResult {
    /// Render an upstream failure in place of the summary body
    pub fn from_error(err: &Error) -> Self {
        Self {
            summary: err.to_string(),
            key_points: Vec::new(),
        }
    }
}

/// Turns raw model output into a [`SummaryResult`]
pub trait ResponseFormatter: Send + Sync {
    fn format(&self, raw: &str) -> SummaryResult;
}

/// Splits model output on the `**Key Points:**` marker and `*` bullets.
///
/// Output that does not contain exactly one marker is returned untouched as the
/// summary with no key points.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkerFormatter;

impl ResponseFormatter for MarkerFormatter {
    fn format(&self, raw: &str) -> SummaryResult {
        let parts: Vec<&str> = raw.split(KEY_POINTS_MARKER).collect();
        let [summary, points] = parts.as_slice() else {
            return SummaryResult {
                summary: raw.to_string(),
                key_points: Vec::new(),
            };
        };

        let summary = strip(&summary.replace(SUMMARY_LABEL, "")).to_string();

        let key_points = points
            .split('*')
            .skip(1)
            .map(strip)
            .filter(|p| !p.is_empty())
            .map(|p| strip(&p.replace("**", "")).to_string())
            .collect();

        SummaryResult { summary, key_points }
    }
}

/// Unicode whitespace plus the ASCII file/group/record/unit separators,
/// which model output occasionally carries and which count as blank here
fn strip(s: &str) -> &str {
    s.trim_matches(|c: char| c.is_whitespace() || ('\x1c'..='\x1f').contains(&c))
}
