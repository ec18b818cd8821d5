use sqlx::FromRow;
use uuid::Uuid;

/// Lookup view of an entry used by ballot validation: membership axes plus
/// the owning user (via the participant link) for the self-voting check.
#[derive(Debug, Clone, FromRow)]
pub struct EntryRef {
    pub entry_id: Uuid,
    pub event_id: Uuid,
    pub division_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub entry_number: i32,
    pub owner_user_id: Option<Uuid>,
}
