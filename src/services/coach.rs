use std::path::Path;

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::database::queries;
use crate::error::{AppError, AppResult};
use crate::models::{AiSettings, ChatMessage, CoachMessage};

/// Shown as the opening assistant message of an empty conversation.
pub const COACH_GREETING: &str = "Hey! I'm your AI Coach. I'm here to help you achieve your \
                                  goals, build better habits, and unlock your potential. \
                                  What's on your mind today?";

const COACH_SYSTEM_PROMPT: &str = r#"You are the AI coach inside Ascend, a personal growth app.
The user tracks long-term visions, milestone paths, daily habits with streaks, and daily
mindfulness check-ins.

Coach them the way a good human coach would: warm, direct, practical. Prefer one concrete
next step over a list of options. Keep answers short - a few sentences unless the user asks
for more. Never invent data about their habits or streaks; if you need specifics, ask.
Plain text only, no markdown."#;

// How much stored conversation rides along as context.
const MAX_CONTEXT_MESSAGES: u32 = 12;

// ─── Wire types ───

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Deserialize)]
struct ChatStreamResponse {
    choices: Vec<ChatStreamChoice>,
}

#[derive(Deserialize)]
struct ChatStreamChoice {
    delta: ChatStreamDelta,
}

#[derive(Deserialize)]
struct ChatStreamDelta {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: String,
}

// ─── Conversation ───

/// The stored conversation, oldest first. An empty history gets the fixed
/// greeting (not persisted) so the coach always speaks first.
pub fn conversation(conn: &Connection, user_id: &str, limit: u32) -> AppResult<Vec<CoachMessage>> {
    let mut messages = queries::coach_messages(conn, user_id, limit)?;
    if messages.is_empty() {
        messages.push(CoachMessage {
            id: 0,
            user_id: user_id.to_string(),
            role: "assistant".to_string(),
            content: COACH_GREETING.to_string(),
            created_at: 0,
        });
    }
    Ok(messages)
}

/// Stores the user message, produces a reply (streamed from the chat
/// endpoint, or scripted when AI is off), and persists the assistant row
/// only after the reply fully arrived. A failed stream therefore leaves no
/// half-written assistant message behind.
pub async fn send_message<F>(
    db_path: &Path,
    ai: &AiSettings,
    api_key: &str,
    user_id: &str,
    text: &str,
    mut on_token: F,
) -> AppResult<CoachMessage>
where
    F: FnMut(&str),
{
    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::validation("message", "cannot be empty"));
    }

    // Load context before inserting this message, then store the user row.
    let history = {
        let conn = Connection::open(db_path).map_err(AppError::from)?;
        let history = queries::coach_messages(&conn, user_id, MAX_CONTEXT_MESSAGES)?;
        queries::insert_coach_message(&conn, user_id, "user", text)?;
        history
    };

    let reply = if ai.enabled && !api_key.is_empty() {
        let mut messages = vec![ChatMessage {
            role: "system".to_string(),
            content: COACH_SYSTEM_PROMPT.to_string(),
        }];
        for msg in &history {
            if msg.content.trim().is_empty() {
                continue;
            }
            messages.push(ChatMessage {
                role: msg.role.clone(),
                content: msg.content.clone(),
            });
        }
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: text.to_string(),
        });

        stream_completion(ai, api_key, &messages, &mut on_token).await?
    } else {
        let reply = scripted_reply(text);
        on_token(reply);
        reply.to_string()
    };

    let conn = Connection::open(db_path).map_err(AppError::from)?;
    let message = queries::insert_coach_message(&conn, user_id, "assistant", &reply)?;
    Ok(message)
}

// ─── Streaming LLM call ───

async fn stream_completion<F>(
    ai: &AiSettings,
    api_key: &str,
    messages: &[ChatMessage],
    on_token: &mut F,
) -> AppResult<String>
where
    F: FnMut(&str),
{
    let client = reqwest::Client::new();

    let request = ChatRequest {
        model: ai.model.clone(),
        messages: messages.to_vec(),
        temperature: ai.temperature,
        max_tokens: ai.max_tokens,
        stream: true,
    };

    let mut response = client
        .post(&ai.endpoint)
        .header("Authorization", format!("Bearer {}", api_key))
        .header("Content-Type", "application/json")
        .json(&request)
        .send()
        .await
        .map_err(|e| AppError::Coach(format!("request failed: {}", e)))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        // The endpoint reports failures as {"error": "..."}.
        let message = serde_json::from_str::<ApiErrorBody>(&body)
            .map(|b| b.error)
            .unwrap_or(body);
        return Err(AppError::Coach(format!("{}: {}", status, message)));
    }

    // Process the SSE stream line by line, carrying partial lines across
    // chunk boundaries. Malformed JSON events are skipped, not fatal.
    let mut full = String::new();
    let mut buffer = String::new();

    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| AppError::Coach(format!("stream error: {}", e)))?
    {
        buffer.push_str(&String::from_utf8_lossy(&chunk));

        while let Some(newline) = buffer.find('\n') {
            let line = buffer[..newline].trim().to_string();
            buffer.drain(..=newline);

            let Some(data) = line.strip_prefix("data: ") else {
                continue;
            };
            if data == "[DONE]" {
                return Ok(full);
            }

            if let Ok(event) = serde_json::from_str::<ChatStreamResponse>(data) {
                if let Some(content) = event
                    .choices
                    .first()
                    .and_then(|c| c.delta.content.as_deref())
                {
                    full.push_str(content);
                    on_token(content);
                }
            }
        }
    }

    Ok(full)
}

// ─── Scripted fallback ───

/// Deterministic replies used when AI is disabled or no key resolves, so
/// the coach always answers.
fn scripted_reply(input: &str) -> &'static str {
    let lower = input.to_lowercase();

    if lower.contains("streak") || lower.contains("habit") {
        "Streaks are built one unremarkable day at a time. Pick the habit that matters most, \
         make today's version of it almost too small to skip, and check it off before anything \
         else gets your attention."
    } else if lower.contains("vision") || lower.contains("goal") {
        "A vision only moves when it has a next step. Choose one of your paths, name the very \
         next action it needs, and give it a spot on your calendar this week."
    } else if lower.contains("stress") || lower.contains("anxious") || lower.contains("overwhelm") {
        "That sounds heavy. Try a short reset: one slow breath, then write down the single \
         smallest thing you can finish today. Momentum is a better cure for overwhelm than \
         planning is."
    } else if lower.contains("motivat") || lower.contains("stuck") {
        "Motivation follows action more often than it precedes it. Do two minutes of the thing \
         you're avoiding and see how you feel on the other side."
    } else {
        "Tell me a bit more about what you're working toward right now - a habit you're \
         building, a vision you're chasing, or something that's in the way - and we'll find \
         the next step together."
    }
}
