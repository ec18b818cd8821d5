use sqlx::{PgPool, QueryBuilder};
use uuid::Uuid;

use crate::dto::results::{EventSummaryResponse, StandingRow};
use crate::error::Result;
use crate::models::{SummaryKey, SummaryTotals, VoteFact};

/// Store access for the denormalized summaries. Writes go through the
/// summary aggregator only; every other component reads.
pub struct SummaryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SummaryRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Live vote facts for one summary key, the aggregator's sole input.
    pub async fn live_vote_facts(&self, key: &SummaryKey) -> Result<Vec<VoteFact>> {
        let facts = sqlx::query_as::<_, VoteFact>(
            r#"
            SELECT place, rating, final_points
            FROM votes
            WHERE event_id = $1 AND entry_id = $2
              AND division_id IS NOT DISTINCT FROM $3
              AND category_id IS NOT DISTINCT FROM $4
              AND status = 'live'
            "#,
        )
        .bind(key.event_id)
        .bind(key.entry_id)
        .bind(key.division_id)
        .bind(key.category_id)
        .fetch_all(self.pool)
        .await?;

        Ok(facts)
    }

    /// Replaces the stored totals for a key. Inserting and overwriting the
    /// same values is a no-op, which keeps recomputation idempotent.
    pub async fn upsert(&self, key: &SummaryKey, totals: &SummaryTotals) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO vote_summaries (
                event_id, entry_id, division_id, category_id,
                total_points, vote_count, first_place_count,
                second_place_count, third_place_count, average_rating,
                computed_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, NOW())
            ON CONFLICT ON CONSTRAINT vote_summaries_key DO UPDATE SET
                total_points = EXCLUDED.total_points,
                vote_count = EXCLUDED.vote_count,
                first_place_count = EXCLUDED.first_place_count,
                second_place_count = EXCLUDED.second_place_count,
                third_place_count = EXCLUDED.third_place_count,
                average_rating = EXCLUDED.average_rating,
                computed_at = EXCLUDED.computed_at
            "#,
        )
        .bind(key.event_id)
        .bind(key.entry_id)
        .bind(key.division_id)
        .bind(key.category_id)
        .bind(totals.total_points)
        .bind(totals.vote_count)
        .bind(totals.first_place_count)
        .bind(totals.second_place_count)
        .bind(totals.third_place_count)
        .bind(totals.average_rating)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Refreshes the cached per-event rankings in one statement, using the
    /// same total order as the results query: points, then first places,
    /// then vote count, then entry number. Partitioned per
    /// (division, category) cohort.
    pub async fn refresh_rankings(&self, event_id: Uuid) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE vote_summaries vs
            SET ranking = ranked.rnk
            FROM (
                SELECT s.vote_summary_id,
                       ROW_NUMBER() OVER (
                           PARTITION BY s.division_id, s.category_id
                           ORDER BY s.total_points DESC, s.first_place_count DESC,
                                    s.vote_count DESC, e.entry_number ASC
                       ) AS rnk
                FROM vote_summaries s
                INNER JOIN entries e ON s.entry_id = e.entry_id
                WHERE s.event_id = $1
            ) ranked
            WHERE vs.vote_summary_id = ranked.vote_summary_id
            "#,
        )
        .bind(event_id)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Every summary key an event can have: one per entry, on the entry's
    /// own axes. Drives the from-scratch rebuild.
    pub async fn keys_for_event(&self, event_id: Uuid) -> Result<Vec<SummaryKey>> {
        let keys = sqlx::query_as::<_, SummaryKey>(
            r#"
            SELECT event_id, entry_id, division_id, category_id
            FROM entries
            WHERE event_id = $1
            ORDER BY entry_number
            "#,
        )
        .bind(event_id)
        .fetch_all(self.pool)
        .await?;

        Ok(keys)
    }

    pub async fn delete_for_event(&self, event_id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM vote_summaries WHERE event_id = $1")
            .bind(event_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Standings for an event, optionally scoped to a division or a
    /// division type, pre-ordered by the ranking total order so a limit
    /// takes the true top-N.
    pub async fn fetch_standings(
        &self,
        event_id: Uuid,
        division_id: Option<Uuid>,
        division_type: Option<&str>,
        limit: Option<i64>,
    ) -> Result<Vec<StandingRow>> {
        let mut query = QueryBuilder::new(
            r#"
            SELECT e.entry_id, e.entry_number, e.title,
                   s.division_id, d.name AS division_name, d.division_type,
                   s.category_id, s.total_points, s.vote_count,
                   s.first_place_count, s.second_place_count, s.third_place_count,
                   s.average_rating
            FROM vote_summaries s
            INNER JOIN entries e ON s.entry_id = e.entry_id
            LEFT JOIN divisions d ON s.division_id = d.division_id
            WHERE s.event_id =
            "#,
        );
        query.push_bind(event_id);

        if let Some(division_id) = division_id {
            query.push(" AND s.division_id = ");
            query.push_bind(division_id);
        }

        if let Some(division_type) = division_type {
            query.push(" AND d.division_type = ");
            query.push_bind(division_type);
        }

        query.push(
            r#"
            ORDER BY s.total_points DESC, s.first_place_count DESC,
                     s.vote_count DESC, e.entry_number ASC
            "#,
        );

        if let Some(limit) = limit {
            query.push(" LIMIT ");
            query.push_bind(limit);
        }

        let rows = query.build_query_as().fetch_all(self.pool).await?;

        Ok(rows)
    }

    /// Cheap change detector for the polling endpoint.
    pub async fn live_vote_count(&self, event_id: Uuid) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM votes WHERE event_id = $1 AND status = 'live'",
        )
        .bind(event_id)
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }

    pub async fn event_summary(&self, event_id: Uuid) -> Result<EventSummaryResponse> {
        let summary = sqlx::query_as::<_, EventSummaryResponse>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM votes WHERE event_id = $1 AND status = 'live') AS total_votes,
                (SELECT COUNT(*) FROM entries WHERE event_id = $1) AS total_entries,
                (SELECT COUNT(*) FROM participants WHERE event_id = $1) AS total_participants,
                (SELECT COUNT(*) FROM divisions WHERE event_id = $1) AS total_divisions
            "#,
        )
        .bind(event_id)
        .fetch_one(self.pool)
        .await?;

        Ok(summary)
    }
}
