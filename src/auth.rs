use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use rusqlite::Connection;

use crate::error::{AppError, AppResult};
use crate::models::Settings;

/// Everything an operation needs: the store, settings, and the identity of
/// the signed-in user (if any). One context per request, like one command
/// invocation per user action.
#[derive(Debug, Clone)]
pub struct AppContext {
    db_path: PathBuf,
    settings: Settings,
    user_id: Option<String>,
}

impl AppContext {
    /// A context with no session. Every user-scoped operation on it fails
    /// closed with `AppError::NotAuthenticated`.
    pub fn anonymous(db_path: impl Into<PathBuf>, settings: Settings) -> Self {
        Self {
            db_path: db_path.into(),
            settings,
            user_id: None,
        }
    }

    /// A context for an authenticated user. Provisions the profile row on
    /// first use so "days on Ascend" has an anchor.
    pub fn authenticated(
        db_path: impl Into<PathBuf>,
        settings: Settings,
        user_id: impl Into<String>,
    ) -> AppResult<Self> {
        let ctx = Self {
            db_path: db_path.into(),
            settings,
            user_id: Some(user_id.into()),
        };
        let conn = ctx.connect()?;
        ensure_profile(&conn, ctx.user_id.as_deref().unwrap_or_default())?;
        Ok(ctx)
    }

    pub fn connect(&self) -> AppResult<Connection> {
        Ok(Connection::open(&self.db_path)?)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The stable user identifier, or `NotAuthenticated`.
    pub fn require_user(&self) -> AppResult<&str> {
        self.user_id.as_deref().ok_or(AppError::NotAuthenticated)
    }

    /// Today's calendar date under the configured timezone. Falls back to
    /// UTC when the configured zone name does not parse.
    pub fn today(&self) -> NaiveDate {
        let now = Utc::now();
        match self.settings.general.timezone.parse::<chrono_tz::Tz>() {
            Ok(tz) => now.with_timezone(&tz).date_naive(),
            Err(_) => now.date_naive(),
        }
    }
}

/// Inserts the profile row for `user_id` if it does not exist yet.
pub fn ensure_profile(conn: &Connection, user_id: &str) -> AppResult<()> {
    let now = Utc::now().timestamp();
    conn.execute(
        "INSERT OR IGNORE INTO profiles (id, created_at, updated_at) VALUES (?1, ?2, ?2)",
        rusqlite::params![user_id, now],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database;

    #[test]
    fn anonymous_context_fails_closed() {
        let ctx = AppContext::anonymous(":memory:", Settings::default());
        assert!(matches!(
            ctx.require_user(),
            Err(AppError::NotAuthenticated)
        ));
    }

    #[test]
    fn authenticated_context_provisions_profile() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("ascend.db");
        database::init_database(&db_path).unwrap();

        let ctx =
            AppContext::authenticated(&db_path, Settings::default(), "user-1").unwrap();
        assert_eq!(ctx.require_user().unwrap(), "user-1");

        let conn = ctx.connect().unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM profiles WHERE id = 'user-1'", [], |r| {
                r.get(0)
            })
            .unwrap();
        assert_eq!(count, 1);
    }
}
