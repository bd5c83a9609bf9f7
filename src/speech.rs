use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::SpeechConfig;
use crate::error::{SiteError, SiteResult};

/// The provider rejects `q` values longer than this many characters.
const MAX_CHUNK_CHARS: usize = 100;

/// Text-to-speech backend. Implementations return raw MP3 bytes.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn speak(&self, text: &str) -> SiteResult<Vec<u8>>;
}

/// Synthesized audio, base64-encoded for embedding in a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpeechClip {
    pub base64: String,
}

impl SpeechClip {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            base64: BASE64_STANDARD.encode(bytes),
        }
    }

    pub fn data_uri(&self) -> String {
        format!("data:audio/mpeg;base64,{}", self.base64)
    }

    #[allow(dead_code)]
    pub fn decode(&self) -> SiteResult<Vec<u8>> {
        BASE64_STANDARD
            .decode(&self.base64)
            .map_err(|e| SiteError::MalformedData {
                origin: "speech clip".to_string(),
                message: e.to_string(),
            })
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.base64.is_empty()
    }
}

/// Speak `text` and encode the result. Audio is kept in memory only.
pub async fn synthesize(synth: &dyn SpeechSynthesizer, text: &str) -> SiteResult<SpeechClip> {
    let bytes = synth.speak(text).await?;
    Ok(SpeechClip::from_bytes(&bytes))
}

/// True for an ID3 tag or a bare MPEG audio frame sync.
pub fn looks_like_mp3(bytes: &[u8]) -> bool {
    bytes.starts_with(b"ID3") || (bytes.len() >= 2 && bytes[0] == 0xFF && bytes[1] & 0xE0 == 0xE0)
}

/// Google Translate's TTS endpoint.
pub struct GoogleTts {
    client: reqwest::Client,
    config: SpeechConfig,
}

impl GoogleTts {
    pub fn new(config: SpeechConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    async fn fetch_chunk(&self, chunk: &str) -> SiteResult<Vec<u8>> {
        let url = format!(
            "{}/translate_tts",
            self.config.base_url.trim_end_matches('/')
        );
        let speed = if self.config.slow { "0.3" } else { "1" };

        debug!("Requesting speech for {} chars from {}", chunk.len(), url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("ie", "UTF-8"),
                ("client", "tw-ob"),
                ("tl", self.config.language.as_str()),
                ("q", chunk),
                ("ttsspeed", speed),
            ])
            .send()
            .await
            .map_err(SiteError::speech)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SiteError::speech(format!("HTTP {}: {}", status, body)));
        }

        let bytes = response.bytes().await.map_err(SiteError::speech)?;
        if bytes.is_empty() {
            return Err(SiteError::speech("empty audio response"));
        }
        if !looks_like_mp3(&bytes) {
            warn!("Speech provider returned {} bytes without an MP3 header", bytes.len());
        }
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl SpeechSynthesizer for GoogleTts {
    async fn speak(&self, text: &str) -> SiteResult<Vec<u8>> {
        let chunks = split_for_provider(text, MAX_CHUNK_CHARS);
        if chunks.is_empty() {
            return Err(SiteError::speech("no text to speak"));
        }

        let mut audio = Vec::new();
        for chunk in &chunks {
            audio.extend(self.fetch_chunk(chunk).await?);
        }
        debug!(
            "Synthesized {} bytes of audio in {} request(s)",
            audio.len(),
            chunks.len()
        );
        Ok(audio)
    }
}

/// Pack words into chunks of at most `max_chars` characters.
/// A single word longer than the limit is hard-split.
fn split_for_provider(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if word_len > max_chars {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let chars: Vec<char> = word.chars().collect();
            for piece in chars.chunks(max_chars) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }

        let needed = if current.is_empty() {
            word_len
        } else {
            current_len + 1 + word_len
        };
        if needed > max_chars {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if !current.is_empty() {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    pub const STUB_MP3: &[u8] = b"ID3\x04\x00\x00\x00\x00\x00\x00stub-frame";

    /// Records every text it is asked to speak and answers with a tiny MP3.
    #[derive(Default)]
    pub struct StubSynthesizer {
        pub spoken: Mutex<Vec<String>>,
    }

    impl StubSynthesizer {
        pub fn spoken(&self) -> Vec<String> {
            self.spoken.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SpeechSynthesizer for StubSynthesizer {
        async fn speak(&self, text: &str) -> SiteResult<Vec<u8>> {
            self.spoken.lock().unwrap().push(text.to_string());
            Ok(STUB_MP3.to_vec())
        }
    }

    pub struct FailingSynthesizer;

    #[async_trait]
    impl SpeechSynthesizer for FailingSynthesizer {
        async fn speak(&self, _text: &str) -> SiteResult<Vec<u8>> {
            Err(SiteError::speech("provider unreachable"))
        }
    }
}
