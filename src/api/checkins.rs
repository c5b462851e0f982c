use crate::auth::AppContext;
use crate::database::queries;
use crate::error::AppResult;
use crate::models::{CheckIn, CheckInRequest, TrendSummary};
use crate::services::mindfulness;

/// Stores today's check-in; re-submitting the same day overwrites it.
pub fn submit_check_in(ctx: &AppContext, request: &CheckInRequest) -> AppResult<CheckIn> {
    let user_id = ctx.require_user()?;
    let conn = ctx.connect()?;
    mindfulness::submit_check_in(&conn, user_id, request, ctx.today())
}

pub fn today_check_in(ctx: &AppContext) -> AppResult<Option<CheckIn>> {
    let user_id = ctx.require_user()?;
    let conn = ctx.connect()?;
    Ok(queries::get_check_in(&conn, user_id, ctx.today())?)
}

pub fn check_in_streak(ctx: &AppContext) -> AppResult<u32> {
    let user_id = ctx.require_user()?;
    let conn = ctx.connect()?;
    mindfulness::check_in_streak(&conn, user_id, ctx.today())
}

pub fn total_check_ins(ctx: &AppContext) -> AppResult<u32> {
    let user_id = ctx.require_user()?;
    let conn = ctx.connect()?;
    Ok(queries::count_check_ins(&conn, user_id)?)
}

/// Mood/energy series for the trends chart; `range_days` is 7 or 30.
pub fn mood_energy_trends(ctx: &AppContext, range_days: u32) -> AppResult<TrendSummary> {
    let user_id = ctx.require_user()?;
    let conn = ctx.connect()?;
    mindfulness::mood_energy_trends(&conn, user_id, range_days, ctx.today())
}
