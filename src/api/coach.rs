use crate::auth::AppContext;
use crate::error::AppResult;
use crate::models::CoachMessage;
use crate::services::coach;
use crate::utils::config;

const CONVERSATION_LIMIT: u32 = 50;

/// The stored conversation, oldest first; an empty one opens with the
/// coach's greeting.
pub fn conversation(ctx: &AppContext) -> AppResult<Vec<CoachMessage>> {
    let user_id = ctx.require_user()?;
    let conn = ctx.connect()?;
    coach::conversation(&conn, user_id, CONVERSATION_LIMIT)
}

/// Sends a message to the coach. Reply tokens stream through `on_token`
/// as they arrive; the returned row is the fully assembled assistant
/// message.
pub async fn send_message<F>(ctx: &AppContext, text: &str, on_token: F) -> AppResult<CoachMessage>
where
    F: FnMut(&str),
{
    let user_id = ctx.require_user()?.to_string();
    let ai = ctx.settings().ai.clone();
    let api_key = config::resolve_api_key(&ai.api_key);

    coach::send_message(ctx.db_path(), &ai, &api_key, &user_id, text, on_token).await
}
