use crate::auth::AppContext;
use crate::database::queries;
use crate::error::{AppError, AppResult};
use crate::models::Insight;
use crate::services::insight_engine;

/// The user-facing feed: dismissed insights are always filtered out.
pub fn active_insights(ctx: &AppContext) -> AppResult<Vec<Insight>> {
    let user_id = ctx.require_user()?;
    let conn = ctx.connect()?;
    Ok(queries::active_insights(&conn, user_id)?)
}

/// Hides an insight from the feed. The row is kept, never deleted, and the
/// flag never reverts.
pub fn dismiss_insight(ctx: &AppContext, insight_id: &str) -> AppResult<()> {
    let user_id = ctx.require_user()?;
    let conn = ctx.connect()?;

    if queries::dismiss_insight(&conn, user_id, insight_id)? {
        Ok(())
    } else {
        Err(AppError::NotFound("insight"))
    }
}

/// Opportunistic generation pass, run when a relevant screen loads. Safe
/// alongside the background engine; duplicates are keyed away.
pub fn generate_now(ctx: &AppContext) -> AppResult<usize> {
    let user_id = ctx.require_user()?;
    let conn = ctx.connect()?;
    insight_engine::generate_insights(&conn, user_id, ctx.today())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database;
    use crate::models::Settings;

    #[test]
    fn dismissed_insights_leave_the_feed_but_not_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("ascend.db");
        database::init_database(&db_path).unwrap();
        let ctx = AppContext::authenticated(&db_path, Settings::default(), "user-1").unwrap();

        let conn = ctx.connect().unwrap();
        queries::insert_insight(
            &conn,
            "user-1",
            crate::models::InsightKind::Celebration,
            "7-day streak!",
            "Keep going.",
            "celebration:h1:7",
        )
        .unwrap();

        let feed = active_insights(&ctx).unwrap();
        assert_eq!(feed.len(), 1);

        dismiss_insight(&ctx, &feed[0].id).unwrap();
        assert!(active_insights(&ctx).unwrap().is_empty());

        let total: i64 = conn
            .query_row("SELECT COUNT(*) FROM insights", [], |r| r.get(0))
            .unwrap();
        assert_eq!(total, 1);
    }
}
