use std::sync::Arc;

use log::{debug, info, warn};

use crate::error::Result;
use crate::format::{ResponseFormatter, SummaryResult};
use crate::summarize::{ModelClient, build_prompt};
use crate::youtube::TranscriptFetcher;
use crate::{VideoId, extract_video_id};

pub const INVALID_URL_MESSAGE: &str = "Invalid YouTube URL";

/// Everything the page template needs for one response.
///
/// The default value is the empty form shown on GET.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageView {
    pub error: Option<String>,
    pub video_id: Option<VideoId>,
    pub summary: Option<String>,
    pub key_points: Vec<String>,
}

impl PageView {
    pub fn invalid_url() -> Self {
        Self {
            error: Some(INVALID_URL_MESSAGE.to_string()),
            ..Self::default()
        }
    }

    pub fn rendered(video_id: VideoId, result: SummaryResult) -> Self {
        Self {
            error: None,
            video_id: Some(video_id),
            summary: Some(result.summary),
            key_points: result.key_points,
        }
    }
}

/// Transcript -> prompt -> model -> formatter, one submission at a time
pub struct Pipeline {
    transcripts: Arc<dyn TranscriptFetcher>,
    model: Arc<dyn ModelClient>,
    formatter: Arc<dyn ResponseFormatter>,
}

impl Pipeline {
    pub fn new(
        transcripts: Arc<dyn TranscriptFetcher>,
        model: Arc<dyn ModelClient>,
        formatter: Arc<dyn ResponseFormatter>,
    ) -> Self {
        Self {
            transcripts,
            model,
            formatter,
        }
    }

    /// Summarize a video, keeping the failure kind intact
    pub async fn summarize(&self, video_id: &VideoId) -> Result<SummaryResult> {
        let transcript = self.transcripts.fetch(video_id).await?;
        debug!(
            "Fetched transcript for {video_id}: title={:?} lang={} segments={}",
            transcript.title,
            transcript.language,
            transcript.segments.len()
        );

        let prompt = build_prompt(&transcript.text());
        let raw = self.model.generate(&prompt).await?;
        debug!("Model returned {} bytes for {video_id}", raw.len());

        Ok(self.formatter.format(&raw))
    }

    /// Handle one form submission. Upstream failures are shown as the summary body.
    pub async fn handle_submission(&self, url: &str) -> PageView {
        let Some(video_id) = extract_video_id(url) else {
            info!("Rejected submission, no video ID in {url:?}");
            return PageView::invalid_url();
        };

        info!("Summarizing video {video_id}");
        let result = match self.summarize(&video_id).await {
            Ok(result) => result,
            Err(e) => {
                warn!("Summarizing {video_id} failed ({}): {e}", e.kind());
                SummaryResult::from_error(&e)
            }
        };

        PageView::rendered(video_id, result)
    }
}
