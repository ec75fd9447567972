//! Timestamped-lyrics API client
//!
//! The endpoint answers a task/audio id pair with an envelope:
//! {"code": 200, "msg": "success", "data": {"alignedWords": [...], ...}}

use anyhow::Context;
use serde::Deserialize;

use crate::alignment::AlignedWord;

/// Response envelope. `code` mirrors an HTTP status; anything but 200 means
/// the request failed even when the transport succeeded.
#[derive(Debug, Deserialize)]
pub struct TimestampedLyricsResponse {
    pub code: i64,
    #[serde(default)]
    pub msg: String,
    pub data: Option<TimestampedLyrics>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimestampedLyrics {
    pub aligned_words: Vec<AlignedWord>,
    #[allow(dead_code)]
    #[serde(default)]
    pub is_streamed: bool,
    #[allow(dead_code)]
    #[serde(default)]
    pub hoot_cer: f64,
    #[allow(dead_code)]
    #[serde(default)]
    pub waveform_data: Vec<f64>,
}

impl TimestampedLyricsResponse {
    pub fn into_data(self) -> anyhow::Result<TimestampedLyrics> {
        if self.code != 200 {
            anyhow::bail!("alignment API error {}: {}", self.code, self.msg);
        }
        self.data.context("alignment API response missing data")
    }
}

pub struct SunoClient {
    client: reqwest::Client,
    base_url: String,
    api_token: Option<String>,
}

impl SunoClient {
    const USER_AGENT: &'static str = "melodia/0.1.0 (https://github.com/melodia)";

    pub fn new(base_url: &str, api_token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(Self::USER_AGENT)
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("failed to create reqwest client"),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token,
        }
    }

    /// Fetch and decode the aligned-word payload for one song variant.
    pub async fn get_timestamped_lyrics(
        &self,
        task_id: &str,
        audio_id: &str,
    ) -> anyhow::Result<TimestampedLyrics> {
        let raw = self.get_timestamped_lyrics_raw(task_id, audio_id).await?;
        let parsed: TimestampedLyricsResponse =
            serde_json::from_value(raw).context("decode timestamped lyrics response")?;
        parsed.into_data()
    }

    /// Fetch the raw response JSON, undecoded, for caching and debugging.
    pub async fn get_timestamped_lyrics_raw(
        &self,
        task_id: &str,
        audio_id: &str,
    ) -> anyhow::Result<serde_json::Value> {
        let url = format!("{}/api/v1/generate/get-timestamped-lyrics", self.base_url);
        let body = serde_json::json!({
            "taskId": task_id,
            "audioId": audio_id,
        });

        let mut req = self.client.post(&url).json(&body);
        if let Some(token) = &self.api_token {
            req = req.bearer_auth(token);
        }

        let response = req.send().await.context("request timestamped lyrics")?;
        if !response.status().is_success() {
            anyhow::bail!("alignment API error: {}", response.status());
        }
        response
            .json::<serde_json::Value>()
            .await
            .context("read timestamped lyrics body")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_success_envelope() {
        let raw = r#"{
            "code": 200,
            "msg": "success",
            "data": {
                "alignedWords": [
                    {"word": "Hello ", "startS": 1.0, "endS": 1.5, "success": true, "palign": 0}
                ],
                "isStreamed": false,
                "hootCer": 0.12,
                "waveformData": [0.0, 0.5, 1.0]
            }
        }"#;
        let parsed: TimestampedLyricsResponse = serde_json::from_str(raw).unwrap();
        let data = parsed.into_data().unwrap();
        assert_eq!(data.aligned_words.len(), 1);
        assert_eq!(data.aligned_words[0].word, "Hello ");
        assert!(!data.is_streamed);
        assert_eq!(data.waveform_data.len(), 3);
    }

    #[test]
    fn error_envelope_becomes_an_error() {
        let raw = r#"{"code": 404, "msg": "record not found", "data": null}"#;
        let parsed: TimestampedLyricsResponse = serde_json::from_str(raw).unwrap();
        let err = parsed.into_data().unwrap_err();
        assert!(err.to_string().contains("record not found"));
    }

    #[test]
    fn missing_data_on_success_is_an_error() {
        let raw = r#"{"code": 200, "msg": "success"}"#;
        let parsed: TimestampedLyricsResponse = serde_json::from_str(raw).unwrap();
        assert!(parsed.into_data().is_err());
    }
}
