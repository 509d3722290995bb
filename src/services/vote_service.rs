use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::duel::{VoteSink, VoteSinkError};
use crate::models::outfit::OutfitStatus;
use crate::models::vote::Vote;
use crate::repositories::RepositoryError;
use crate::repositories::vote_repository::{CastOutcome, VoteRepository};

/// Vote service errors
#[derive(Debug, thiserror::Error)]
pub enum VoteError {
    #[error("Outfit not found")]
    OutfitNotFound,

    #[error("Voter no longer exists")]
    VoterNotFound,

    #[error("Outfit is {} and not accepting votes", .0.as_str())]
    NotAcceptingVotes(OutfitStatus),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<RepositoryError> for VoteError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => VoteError::VoterNotFound,
            RepositoryError::ConstraintViolation(msg) | RepositoryError::DatabaseError(msg) => {
                VoteError::DatabaseError(msg)
            }
        }
    }
}

/// Trait defining vote service operations
#[async_trait]
pub trait VoteService: Send + Sync {
    /// Add one vote from `voter_id` to an outfit in voting
    async fn cast_vote(&self, voter_id: Uuid, outfit_id: Uuid) -> Result<Vote, VoteError>;
}

/// Implementation of VoteService
pub struct VoteServiceImpl {
    vote_repository: Arc<dyn VoteRepository>,
}

impl VoteServiceImpl {
    pub fn new(vote_repository: Arc<dyn VoteRepository>) -> Self {
        Self { vote_repository }
    }
}

#[async_trait]
impl VoteService for VoteServiceImpl {
    async fn cast_vote(&self, voter_id: Uuid, outfit_id: Uuid) -> Result<Vote, VoteError> {
        match self.vote_repository.cast(voter_id, outfit_id).await? {
            CastOutcome::Recorded(vote) => {
                info!(%voter_id, %outfit_id, outfit_votes = vote.outfit_votes, "Recorded vote");
                Ok(vote)
            }
            CastOutcome::Closed(status) => {
                debug!(%outfit_id, status = status.as_str(), "Rejected vote");
                Err(VoteError::NotAcceptingVotes(status))
            }
            CastOutcome::OutfitMissing => Err(VoteError::OutfitNotFound),
        }
    }
}

#[async_trait]
impl VoteSink for VoteServiceImpl {
    async fn record_winner(&self, voter_id: Uuid, outfit_id: Uuid) -> Result<(), VoteSinkError> {
        self.cast_vote(voter_id, outfit_id)
            .await
            .map(|_| ())
            .map_err(|e| VoteSinkError(e.to_string()))
    }
}
