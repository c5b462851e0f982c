use std::collections::HashSet;

use crate::auth::AppContext;
use crate::database::queries;
use crate::error::{AppError, AppResult};
use crate::models::{Lesson, LessonItem, LessonProgress};

/// The library list with the caller's completion flags.
pub fn list_lessons(ctx: &AppContext) -> AppResult<Vec<LessonItem>> {
    let user_id = ctx.require_user()?;
    let conn = ctx.connect()?;

    let completed: HashSet<String> =
        queries::completed_lesson_ids(&conn, user_id)?.into_iter().collect();

    let items = queries::list_lessons(&conn)?
        .into_iter()
        .map(|lesson| LessonItem {
            completed: completed.contains(&lesson.id),
            id: lesson.id,
            title: lesson.title,
            category: lesson.category,
            read_time: lesson.read_time,
        })
        .collect();

    Ok(items)
}

pub fn lesson_detail(ctx: &AppContext, lesson_id: &str) -> AppResult<Lesson> {
    ctx.require_user()?;
    let conn = ctx.connect()?;
    queries::get_lesson(&conn, lesson_id)?.ok_or(AppError::NotFound("lesson"))
}

/// Idempotent; completing an already-completed lesson is a no-op.
pub fn complete_lesson(ctx: &AppContext, lesson_id: &str) -> AppResult<()> {
    let user_id = ctx.require_user()?;
    let conn = ctx.connect()?;

    queries::get_lesson(&conn, lesson_id)?.ok_or(AppError::NotFound("lesson"))?;
    queries::complete_lesson(&conn, user_id, lesson_id)?;
    Ok(())
}

pub fn lesson_progress(ctx: &AppContext) -> AppResult<LessonProgress> {
    let items = list_lessons(ctx)?;
    Ok(LessonProgress {
        total: items.len() as u32,
        completed: items.iter().filter(|l| l.completed).count() as u32,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database;
    use crate::models::Settings;

    #[test]
    fn completing_a_lesson_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("ascend.db");
        database::init_database(&db_path).unwrap();
        let ctx = AppContext::authenticated(&db_path, Settings::default(), "user-1").unwrap();

        let items = list_lessons(&ctx).unwrap();
        assert!(!items.is_empty());
        assert!(items.iter().all(|l| !l.completed));

        complete_lesson(&ctx, &items[0].id).unwrap();
        complete_lesson(&ctx, &items[0].id).unwrap();

        let progress = lesson_progress(&ctx).unwrap();
        assert_eq!(progress.completed, 1);
    }
}
