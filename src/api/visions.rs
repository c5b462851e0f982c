use chrono::Utc;
use uuid::Uuid;

use crate::auth::AppContext;
use crate::database::queries;
use crate::error::{AppError, AppResult};
use crate::models::{
    CreatePathRequest, CreateVisionRequest, Path, PathStatus, Vision, VisionDetail,
};

pub fn create_vision(ctx: &AppContext, request: &CreateVisionRequest) -> AppResult<Vision> {
    let user_id = ctx.require_user()?;

    let title = request.title.trim();
    if title.is_empty() {
        return Err(AppError::validation("title", "cannot be empty"));
    }

    let vision = Vision {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        title: title.to_string(),
        description: request.description.clone(),
        category: request.category,
        color: request.color.clone(),
        health_score: 50,
        archived: false,
        created_at: Utc::now().timestamp(),
    };

    let conn = ctx.connect()?;
    queries::insert_vision(&conn, &vision)?;
    Ok(vision)
}

pub fn list_visions(ctx: &AppContext) -> AppResult<Vec<Vision>> {
    let user_id = ctx.require_user()?;
    let conn = ctx.connect()?;
    Ok(queries::list_active_visions(&conn, user_id)?)
}

/// The vision screen: the vision, its paths in order, linked habits, and
/// progress as completed paths over total (0 with no paths).
pub fn vision_detail(ctx: &AppContext, vision_id: &str) -> AppResult<VisionDetail> {
    let user_id = ctx.require_user()?;
    let conn = ctx.connect()?;

    let vision =
        queries::get_vision(&conn, user_id, vision_id)?.ok_or(AppError::NotFound("vision"))?;
    let paths = queries::list_paths(&conn, vision_id)?;
    let habits = queries::habits_linked_to_vision(&conn, vision_id)?;

    let completed = paths.iter().filter(|p| p.status == PathStatus::Completed).count();
    let progress = if paths.is_empty() {
        0
    } else {
        (completed as f64 / paths.len() as f64 * 100.0).round() as u32
    };

    Ok(VisionDetail {
        vision,
        paths,
        habits,
        progress,
    })
}

pub fn archive_vision(ctx: &AppContext, vision_id: &str) -> AppResult<()> {
    let user_id = ctx.require_user()?;
    let conn = ctx.connect()?;

    if queries::set_vision_archived(&conn, user_id, vision_id, true)? {
        Ok(())
    } else {
        Err(AppError::NotFound("vision"))
    }
}

/// Deletes the vision and its paths; linked habits survive with the link
/// cleared.
pub fn delete_vision(ctx: &AppContext, vision_id: &str) -> AppResult<()> {
    let user_id = ctx.require_user()?;
    let conn = ctx.connect()?;

    if queries::delete_vision(&conn, user_id, vision_id)? {
        Ok(())
    } else {
        Err(AppError::NotFound("vision"))
    }
}

pub fn create_path(ctx: &AppContext, request: &CreatePathRequest) -> AppResult<Path> {
    let user_id = ctx.require_user()?;

    let name = request.name.trim();
    if name.is_empty() {
        return Err(AppError::validation("name", "cannot be empty"));
    }

    let conn = ctx.connect()?;
    // The parent vision must exist and belong to the caller.
    queries::get_vision(&conn, user_id, &request.vision_id)?
        .ok_or(AppError::NotFound("vision"))?;

    if let Some(dep) = &request.depends_on_path_id {
        queries::get_path(&conn, dep)?.ok_or(AppError::NotFound("path"))?;
    }

    let path = Path {
        id: Uuid::new_v4().to_string(),
        vision_id: request.vision_id.clone(),
        name: name.to_string(),
        description: request.description.clone(),
        status: PathStatus::NotStarted,
        order_index: queries::next_path_order_index(&conn, &request.vision_id)?,
        depends_on_path_id: request.depends_on_path_id.clone(),
        deadline: request.deadline,
        completed_at: None,
        created_at: Utc::now().timestamp(),
    };

    queries::insert_path(&conn, &path)?;
    Ok(path)
}

/// Moves a path through not-started / in-progress / completed, stamping
/// `completed_at` on completion.
pub fn update_path_status(ctx: &AppContext, path_id: &str, status: PathStatus) -> AppResult<()> {
    let user_id = ctx.require_user()?;
    let conn = ctx.connect()?;

    let path = queries::get_path(&conn, path_id)?.ok_or(AppError::NotFound("path"))?;
    // Ownership check runs through the parent vision.
    queries::get_vision(&conn, user_id, &path.vision_id)?.ok_or(AppError::NotFound("path"))?;

    let completed_at = match status {
        PathStatus::Completed => Some(Utc::now().timestamp()),
        _ => None,
    };

    queries::update_path_status(&conn, path_id, &status, completed_at)?;
    Ok(())
}

/// Moves a path to a new slot in its vision's ordering.
pub fn reorder_path(ctx: &AppContext, path_id: &str, order_index: u32) -> AppResult<()> {
    let user_id = ctx.require_user()?;
    let conn = ctx.connect()?;

    let path = queries::get_path(&conn, path_id)?.ok_or(AppError::NotFound("path"))?;
    queries::get_vision(&conn, user_id, &path.vision_id)?.ok_or(AppError::NotFound("path"))?;

    queries::set_path_order(&conn, path_id, order_index)?;
    Ok(())
}
