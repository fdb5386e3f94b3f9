use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    config::OpenAiSettings,
    error::{Error, Result},
    types::{GeneratedPlaylist, Song},
};

const FUNCTION_NAME: &str = "SpotifyPlaylistGenerator";
const MAX_NAME_WORDS: usize = 10;

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<ToolCall>,
}

#[derive(Debug, Deserialize)]
struct ToolCall {
    function: FunctionCall,
}

#[derive(Debug, Deserialize)]
struct FunctionCall {
    name: String,
    arguments: String,
}

pub struct OpenAiClient {
    http: Client,
    settings: OpenAiSettings,
}

impl OpenAiClient {
    pub fn new(settings: OpenAiSettings) -> Self {
        OpenAiClient {
            http: Client::new(),
            settings,
        }
    }

    async fn chat(&self, body: Value) -> Result<ChatResponse> {
        let response = self
            .http
            .post(format!("{}/chat/completions", self.settings.api_url))
            .bearer_auth(&self.settings.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
                .unwrap_or(text);
            return Err(Error::Generator(format!("{}: {}", status.as_u16(), message)));
        }

        Ok(response.json::<ChatResponse>().await?)
    }

    /// Up to `count` songs for `prompt`, in the model's order.
    pub async fn generate_songs(&self, prompt: &str, count: usize) -> Result<Vec<Song>> {
        let body = json!({
            "model": self.settings.model,
            "max_tokens": 1000,
            "messages": [
                {
                    "role": "system",
                    "content": "You are a helpful playlist generating assistant. You should generate a list of songs and their artists according to a text prompt."
                },
                {
                    "role": "user",
                    "content": format!("Generate a playlist of {} songs based on the prompt: ###{}###", count, prompt)
                }
            ],
            "tools": [{
                "type": "function",
                "function": {
                    "name": FUNCTION_NAME,
                    "parameters": playlist_schema(),
                }
            }],
            "tool_choice": { "type": "function", "function": { "name": FUNCTION_NAME } },
        });

        let response = self.chat(body).await?;
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::Generator("model returned no choices".to_string()))?;

        let call = choice
            .message
            .tool_calls
            .into_iter()
            .find(|c| c.function.name == FUNCTION_NAME)
            .ok_or_else(|| {
                Error::Generator(format!(
                    "model did not call {} (finish reason {})",
                    FUNCTION_NAME,
                    choice.finish_reason.as_deref().unwrap_or("unknown")
                ))
            })?;

        parse_playlist_arguments(&call.function.arguments, count)
    }

    /// A short name for the playlist. Falls back to `prompt` when the model
    /// call fails.
    pub async fn generate_playlist_name(&self, prompt: &str, songs: &[Song]) -> String {
        let listing = serde_json::to_string_pretty(&GeneratedPlaylist {
            playlist: songs.to_vec(),
        })
        .unwrap_or_default();

        let body = json!({
            "model": self.settings.model,
            "max_tokens": 60,
            "temperature": 1.0,
            "messages": [
                {
                    "role": "system",
                    "content": format!("You are a helpful playlist naming assistant. You name accurate and artistic Spotify playlists from the prompt that inspired the playlist and the playlist itself. The name must not be over {} words.", MAX_NAME_WORDS)
                },
                {
                    "role": "user",
                    "content": format!("Generate a Spotify playlist name based on the prompt: ###{}###, and the generated playlist below\n{}\nOutput only the playlist name itself.", prompt, listing)
                }
            ],
        });

        let content = match self.chat(body).await {
            Ok(response) => response
                .choices
                .into_iter()
                .next()
                .filter(|c| c.finish_reason.as_deref().is_none_or(|r| r == "stop"))
                .and_then(|c| c.message.content),
            Err(e) => {
                tracing::warn!(error = %e, "playlist naming failed");
                None
            }
        };

        content
            .and_then(|name| clean_playlist_name(&name))
            .unwrap_or_else(|| prompt.trim().to_string())
    }
}

fn playlist_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "playlist": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "song": { "type": "string", "description": "song title" },
                        "artist": { "type": "string", "description": "artist or group name" }
                    },
                    "required": ["song", "artist"]
                }
            }
        },
        "required": ["playlist"]
    })
}

/// Decodes the function-call arguments into at most `count` songs.
pub fn parse_playlist_arguments(arguments: &str, count: usize) -> Result<Vec<Song>> {
    let generated: GeneratedPlaylist = serde_json::from_str(arguments)
        .map_err(|e| Error::Generator(format!("cannot decode playlist: {}", e)))?;

    Ok(generated
        .playlist
        .into_iter()
        .map(|s| Song::new(s.title.trim(), s.artist.trim()))
        .filter(|s| !s.title.is_empty() && !s.artist.is_empty())
        .take(count)
        .collect())
}

/// Trims quotes and whitespace and caps the name at ten words.
pub fn clean_playlist_name(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_matches(|c| c == '"' || c == '\'' || c == '#').trim();
    if trimmed.is_empty() {
        return None;
    }

    Some(
        trimmed
            .split_whitespace()
            .take(MAX_NAME_WORDS)
            .collect::<Vec<_>>()
            .join(" "),
    )
}
