use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::entry::EntryRef;
use crate::error::Result;

pub struct EntryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> EntryRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All entries of an event with the membership axes and owning user
    /// the validator needs.
    pub async fn list_refs(&self, event_id: Uuid) -> Result<Vec<EntryRef>> {
        let refs = sqlx::query_as::<_, EntryRef>(
            r#"
            SELECT e.entry_id, e.event_id, e.division_id, e.category_id,
                   e.entry_number, p.user_id AS owner_user_id
            FROM entries e
            LEFT JOIN participants p ON e.participant_id = p.participant_id
            WHERE e.event_id = $1
            ORDER BY e.entry_number
            "#,
        )
        .bind(event_id)
        .fetch_all(self.pool)
        .await?;

        Ok(refs)
    }
}
