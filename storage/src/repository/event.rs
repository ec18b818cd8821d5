use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::Event;

/// Read accessors over events and their module flags. Events are owned by
/// the surrounding CRUD app; this engine never mutates them.
pub struct EventRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> EventRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a non-deleted event by ID.
    pub async fn find_by_id(&self, event_id: Uuid) -> Result<Event> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            SELECT event_id, name, slug, is_active, allow_vote_changes, created_at, deleted_at
            FROM events
            WHERE event_id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(event_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(event)
    }

    /// Whether a feature module is enabled for the event. Modules with no
    /// row are treated as enabled; only an explicit row can switch one off.
    pub async fn module_enabled(&self, event_id: Uuid, module_key: &str) -> Result<bool> {
        let enabled = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT COALESCE(
                (SELECT is_enabled FROM event_modules WHERE event_id = $1 AND module_key = $2),
                TRUE
            )
            "#,
        )
        .bind(event_id)
        .bind(module_key)
        .fetch_one(self.pool)
        .await?;

        Ok(enabled)
    }
}
