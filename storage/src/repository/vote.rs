use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::vote::MyVoteRow;
use crate::error::{Result, StorageError};
use crate::models::{SummaryKey, Vote};

pub struct VoteRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> VoteRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn has_live_ballot(&self, event_id: Uuid, user_id: Uuid) -> Result<bool> {
        let has_voted = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM votes
                WHERE event_id = $1 AND user_id = $2 AND status = 'live'
            )
            "#,
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;

        Ok(has_voted)
    }

    /// The caller's live ballot rows, labeled with the entry they point at.
    pub async fn live_ballot_rows(&self, event_id: Uuid, user_id: Uuid) -> Result<Vec<MyVoteRow>> {
        let rows = sqlx::query_as::<_, MyVoteRow>(
            r#"
            SELECT v.vote_id, v.ballot_id, v.entry_id, e.entry_number,
                   e.title AS entry_title, v.place, v.rating, v.base_points,
                   v.weight_multiplier, v.final_points, v.created_at
            FROM votes v
            INNER JOIN entries e ON v.entry_id = e.entry_id
            WHERE v.event_id = $1 AND v.user_id = $2 AND v.status = 'live'
            ORDER BY v.place NULLS LAST, e.entry_number
            "#,
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn find_by_id(&self, event_id: Uuid, vote_id: Uuid) -> Result<Vote> {
        let vote = sqlx::query_as::<_, Vote>(
            r#"
            SELECT vote_id, ballot_id, event_id, user_id, entry_id, division_id,
                   category_id, place, rating, base_points, weight_multiplier,
                   final_points, status, removed_reason, removed_by, voter_ip,
                   voter_fingerprint, created_at
            FROM votes
            WHERE event_id = $1 AND vote_id = $2
            "#,
        )
        .bind(event_id)
        .bind(vote_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(vote)
    }

    /// Tombstones a single live vote with an audit reason and acting user.
    /// Returns the summary key vacated by the removal.
    pub async fn remove_vote(
        &self,
        event_id: Uuid,
        vote_id: Uuid,
        reason: &str,
        removed_by: Uuid,
    ) -> Result<SummaryKey> {
        let key = sqlx::query_as::<_, SummaryKey>(
            r#"
            UPDATE votes
            SET status = 'removed', removed_reason = $3, removed_by = $4
            WHERE event_id = $1 AND vote_id = $2 AND status = 'live'
            RETURNING event_id, entry_id, division_id, category_id
            "#,
        )
        .bind(event_id)
        .bind(vote_id)
        .bind(reason)
        .bind(removed_by)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(key)
    }
}
