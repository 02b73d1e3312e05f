use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Every way a summarization request can fail once a video ID is known.
#[derive(Debug, Error)]
pub enum Error {
    #[error("no captions available for video {0}")]
    NoCaptions(String),

    #[error("video {video_id} is unavailable: {reason}")]
    VideoUnavailable { video_id: String, reason: String },

    #[error("could not extract InnerTube API key from watch page")]
    MissingApiKey,

    #[error("error parsing caption XML: {0}")]
    CaptionXml(#[from] quick_xml::Error),

    #[error("model quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("model API returned {status}: {body}")]
    ModelStatus { status: reqwest::StatusCode, body: String },

    #[error("unexpected model API response format")]
    EmptyCompletion,

    #[error("upstream request timed out: {0}")]
    Timeout(reqwest::Error),

    #[error("upstream request failed: {0}")]
    Http(reqwest::Error),
}

impl Error {
    /// Short, stable label for log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::NoCaptions(_) => "no_captions",
            Error::VideoUnavailable { .. } => "video_unavailable",
            Error::MissingApiKey => "missing_api_key",
            Error::CaptionXml(_) => "caption_xml",
            Error::QuotaExceeded(_) => "quota_exceeded",
            Error::ModelStatus { .. } => "model_status",
            Error::EmptyCompletion => "empty_completion",
            Error::Timeout(_) => "timeout",
            Error::Http(_) => "http",
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() { Error::Timeout(e) } else { Error::Http(e) }
    }
}
