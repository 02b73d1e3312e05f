use std::sync::LazyLock;

use async_trait::async_trait;
use log::debug;
use regex::Regex;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::{Segment, Transcript, VideoId};

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

static INNERTUBE_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""INNERTUBE_API_KEY"\s*:\s*"([^"]+)""#).expect("valid pattern"));

static INNERTUBE_KEY_FALLBACK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"innertubeApiKey\s*[=:]\s*"([^"]+)""#).expect("valid pattern"));

/// Source of timed transcript segments for a video
#[async_trait]
pub trait TranscriptFetcher: Send + Sync {
    async fn fetch(&self, video_id: &VideoId) -> Result<Transcript>;
}

#[derive(Debug, Deserialize)]
struct InnerTubePlayerResponse {
    #[serde(rename = "playabilityStatus")]
    playability_status: Option<PlayabilityStatus>,
    captions: Option<CaptionsData>,
    #[serde(rename = "videoDetails")]
    video_details: Option<VideoDetails>,
}

#[derive(Debug, Deserialize)]
struct PlayabilityStatus {
    status: String,
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideoDetails {
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CaptionsData {
    #[serde(rename = "playerCaptionsTracklistRenderer")]
    player_captions_tracklist_renderer: Option<CaptionTracklistRenderer>,
}

#[derive(Debug, Deserialize)]
struct CaptionTracklistRenderer {
    #[serde(rename = "captionTracks")]
    caption_tracks: Option<Vec<CaptionTrack>>,
}

#[derive(Debug, Deserialize)]
struct CaptionTrack {
    #[serde(rename = "baseUrl")]
    base_url: String,
    #[serde(rename = "languageCode")]
    language_code: String,
}

/// Captions scraped through YouTube's InnerTube API
pub struct YouTubeCaptions {
    client: reqwest::Client,
    lang: String,
}

impl YouTubeCaptions {
    pub fn new(client: reqwest::Client, lang: impl Into<String>) -> Self {
        Self {
            client,
            lang: lang.into(),
        }
    }
}

#[async_trait]
impl TranscriptFetcher for YouTubeCaptions {
    async fn fetch(&self, video_id: &VideoId) -> Result<Transcript> {
        fetch_captions(&self.client, video_id, &self.lang).await
    }
}

/// Fetch transcript from YouTube's built-in captions via the InnerTube API
pub async fn fetch_captions(client: &reqwest::Client, video_id: &VideoId, lang: &str) -> Result<Transcript> {
    // Step 1: Fetch the watch page to get the InnerTube API key
    let watch_url = video_id.watch_url();
    debug!("Fetching watch page: {watch_url}");

    let page_html = client
        .get(&watch_url)
        .header("User-Agent", USER_AGENT)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;

    let api_key = extract_api_key(&page_html)?;
    debug!("Extracted InnerTube API key");

    // Step 2: Call InnerTube player endpoint
    let player_url = format!("https://www.youtube.com/youtubei/v1/player?key={api_key}&prettyPrint=false");

    let body = serde_json::json!({
        "context": {
            "client": {
                "hl": lang,
                "gl": "US",
                "clientName": "WEB",
                "clientVersion": "2.20241126.01.00"
            }
        },
        "videoId": video_id.as_str()
    });

    let resp: InnerTubePlayerResponse = client
        .post(&player_url)
        .header("User-Agent", USER_AGENT)
        .header("Content-Type", "application/json")
        .json(&body)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    let (title, track) = select_track(resp, video_id.as_str(), lang)?;
    debug!("Using caption track: lang={}", track.language_code);

    // Step 3: Fetch the caption XML
    let caption_xml = client
        .get(&track.base_url)
        .header("User-Agent", USER_AGENT)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;

    let segments = parse_caption_xml(&caption_xml)?;
    debug!("Parsed {} caption segments for {video_id}", segments.len());

    Ok(Transcript {
        video_id: video_id.to_string(),
        title,
        language: track.language_code,
        segments,
    })
}

/// Check playability, then pick the requested language track or the first available
fn select_track(resp: InnerTubePlayerResponse, video_id: &str, lang: &str) -> Result<(String, CaptionTrack)> {
    match resp.playability_status {
        Some(status) if status.status != "OK" => {
            return Err(Error::VideoUnavailable {
                video_id: video_id.to_string(),
                reason: status.reason.unwrap_or(status.status),
            });
        }
        _ => {}
    }

    let title = resp.video_details.and_then(|vd| vd.title).unwrap_or_default();

    let mut tracks = resp
        .captions
        .and_then(|c| c.player_captions_tracklist_renderer)
        .and_then(|r| r.caption_tracks)
        .unwrap_or_default();

    let index = tracks.iter().position(|t| t.language_code == lang).unwrap_or(0);
    if index >= tracks.len() {
        return Err(Error::NoCaptions(video_id.to_string()));
    }

    Ok((title, tracks.swap_remove(index)))
}

fn extract_api_key(html: &str) -> Result<String> {
    // Older pages use the first form, newer ones the second
    [&*INNERTUBE_KEY, &*INNERTUBE_KEY_FALLBACK]
        .iter()
        .find_map(|re| re.captures(html).map(|caps| caps[1].to_string()))
        .ok_or(Error::MissingApiKey)
}

fn parse_caption_xml(xml: &str) -> Result<Vec<Segment>> {
    use quick_xml::Reader;
    use quick_xml::events::Event;

    let mut reader = Reader::from_str(xml);
    let mut segments = Vec::new();
    let mut current_start: Option<f64> = None;
    let mut current_dur: Option<f64> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"text" => {
                let mut start = None;
                let mut dur = None;
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"start" => {
                            start = String::from_utf8_lossy(&attr.value).parse::<f64>().ok();
                        }
                        b"dur" => {
                            dur = String::from_utf8_lossy(&attr.value).parse::<f64>().ok();
                        }
                        _ => {}
                    }
                }
                current_start = start;
                current_dur = dur;
            }
            Ok(Event::Text(ref e)) => {
                if let (Some(start), Some(dur)) = (current_start.take(), current_dur.take()) {
                    let raw_text = e.unescape().unwrap_or_default().to_string();
                    let text = html_escape::decode_html_entities(&raw_text).to_string();
                    if !text.is_empty() {
                        segments.push(Segment {
                            text,
                            start,
                            duration: dur,
                        });
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::CaptionXml(e)),
            _ => {}
        }
    }

    Ok(segments)
}
