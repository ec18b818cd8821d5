use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Persistence conflict: {0}")]
    PersistenceConflict(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

impl StorageError {
    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            StorageError::Database(sqlx::Error::Database(e))
                if e.code().as_deref() == Some("23505")
        )
    }

    pub fn is_foreign_key_violation(&self) -> bool {
        matches!(
            self,
            StorageError::Database(sqlx::Error::Database(e))
                if e.code().as_deref() == Some("23503")
        )
    }
}

/// Misconfigured voting setup. Surfaced to the organizer, never retried.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Event has no active voting configuration")]
    MissingConfig,

    #[error("Place override references place {place} absent from the base configuration")]
    UnknownOverridePlace { place: i32 },

    #[error("Place numbering must be contiguous from 1")]
    NonContiguousPlaces,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// A single ballot rule violation. Violations are collected per submission
/// and returned together, keyed by `field()`, so the client can surface
/// every problem at once.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VoteError {
    #[error("Voting is not open for this event")]
    VotingClosed,

    #[error("Entry {entry} is not a valid selection for this event")]
    InvalidEntry { entry: String },

    #[error("Entry {entry} is selected more than once")]
    DuplicateSelection { entry: String },

    #[error("Place {place} is not valid for this voting type")]
    InvalidPlace { place: i32 },

    #[error("Place {place} is used more than once")]
    DuplicatePlace { place: i32 },

    #[error("You cannot vote for your own entry")]
    SelfVote { entry: String },

    #[error("You have already voted in this event")]
    AlreadyVoted,

    #[error("Rating {value} is outside the allowed range")]
    RatingOutOfRange { value: String },

    #[error("Too many selections: at most {max} allowed")]
    TooManySelections { max: i32 },

    #[error("Point allocation exceeds the allowed maximum")]
    AllocationExceeded,

    #[error("Ballot is malformed: {0}")]
    MalformedBallot(String),
}

impl VoteError {
    /// Stable key the web layer groups error messages under.
    pub fn field(&self) -> &'static str {
        match self {
            Self::VotingClosed => "window",
            Self::InvalidEntry { .. } | Self::DuplicateSelection { .. } => "entries",
            Self::InvalidPlace { .. } | Self::DuplicatePlace { .. } => "places",
            Self::SelfVote { .. } => "self_vote",
            Self::AlreadyVoted => "ballot",
            Self::RatingOutOfRange { .. } => "rating",
            Self::TooManySelections { .. } | Self::AllocationExceeded => "selections",
            Self::MalformedBallot(_) => "ballot",
        }
    }
}

/// Failure of a whole ballot submission.
#[derive(Debug, Error)]
pub enum CastError {
    #[error("Ballot validation failed")]
    Invalid(Vec<VoteError>),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Storage(StorageError),
}

impl From<StorageError> for CastError {
    fn from(error: StorageError) -> Self {
        // A write-time unique violation is the same condition as a
        // pre-validated duplicate ballot, just observed late.
        if error.is_unique_violation() {
            Self::Invalid(vec![VoteError::AlreadyVoted])
        } else {
            Self::Storage(error)
        }
    }
}

impl From<Vec<VoteError>> for CastError {
    fn from(errors: Vec<VoteError>) -> Self {
        Self::Invalid(errors)
    }
}
