use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::outfit::OutfitStatus;
use crate::models::user::{POINTS_PER_VOTE_RECEIVED, level_for_points};
use crate::models::vote::Vote;
use crate::repositories::RepositoryError;

/// Result of an attempt to record a vote
#[derive(Debug, Clone, PartialEq)]
pub enum CastOutcome {
    Recorded(Vote),
    /// The outfit exists but is not in voting
    Closed(OutfitStatus),
    OutfitMissing,
}

/// Trait defining vote log operations
#[async_trait]
pub trait VoteRepository: Send + Sync {
    /// Record one vote as a single unit of work: the outfit's counter, the
    /// vote log, the voter's votes-given and the creator's points all change
    /// together or not at all.
    ///
    /// Fails with `NotFound` when the voter does not exist.
    async fn cast(&self, voter_id: Uuid, outfit_id: Uuid) -> Result<CastOutcome, RepositoryError>;
}

/// PostgreSQL implementation of VoteRepository
pub struct PostgresVoteRepository {
    pool: PgPool,
}

impl PostgresVoteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn db_error(e: sqlx::Error) -> RepositoryError {
    RepositoryError::DatabaseError(e.to_string())
}

#[async_trait]
impl VoteRepository for PostgresVoteRepository {
    async fn cast(&self, voter_id: Uuid, outfit_id: Uuid) -> Result<CastOutcome, RepositoryError> {
        // Dropping the transaction without commit rolls every step back
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let counted = sqlx::query_as::<_, (i64, Uuid)>(
            "UPDATE outfits SET votes = votes + 1 \
             WHERE id = $1 AND status = 'voting' \
             RETURNING votes, user_id",
        )
        .bind(outfit_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error)?;

        let Some((outfit_votes, creator_id)) = counted else {
            let status = sqlx::query_scalar::<_, OutfitStatus>(
                "SELECT status FROM outfits WHERE id = $1",
            )
            .bind(outfit_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_error)?;
            return Ok(status.map_or(CastOutcome::OutfitMissing, CastOutcome::Closed));
        };

        let voter = sqlx::query("UPDATE users SET votes_given = votes_given + 1 WHERE id = $1")
            .bind(voter_id)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;
        if voter.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        let vote = Vote {
            id: Uuid::new_v4(),
            voter_id,
            outfit_id,
            outfit_votes,
            created_at: Utc::now(),
        };
        sqlx::query(
            "INSERT INTO votes (id, voter_id, outfit_id, created_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(vote.id)
        .bind(vote.voter_id)
        .bind(vote.outfit_id)
        .bind(vote.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_sqlx(e, "Vote already recorded"))?;

        let points = sqlx::query_scalar::<_, i64>(
            "UPDATE users SET points = points + $2 WHERE id = $1 RETURNING points",
        )
        .bind(creator_id)
        .bind(POINTS_PER_VOTE_RECEIVED)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error)?;
        if let Some(points) = points {
            sqlx::query("UPDATE users SET level = $2 WHERE id = $1")
                .bind(creator_id)
                .bind(level_for_points(points))
                .execute(&mut *tx)
                .await
                .map_err(db_error)?;
        }

        tx.commit().await.map_err(db_error)?;
        Ok(CastOutcome::Recorded(vote))
    }
}
