use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::duel::{DuelPair, DuelSampler, DuelSession, ExhaustionPolicy, VoteRejected, VoteSink};
use crate::models::outfit::{OutfitDetail, OutfitFilters, OutfitStatus};
use crate::repositories::RepositoryError;
use crate::repositories::outfit_repository::OutfitRepository;
use crate::services::outfit_service::OutfitDetailLoader;

/// Idle time after which a session is dropped
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 60);

/// Duel service errors
#[derive(Debug, thiserror::Error)]
pub enum DuelError {
    #[error("No duel session started")]
    SessionNotFound,

    #[error("No duel pair is being shown")]
    NoActivePair,

    #[error("Outfit {0} is not part of the current duel")]
    WinnerNotInPair(Uuid),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<VoteRejected> for DuelError {
    fn from(e: VoteRejected) -> Self {
        match e {
            VoteRejected::NoActivePair => DuelError::NoActivePair,
            VoteRejected::WinnerNotInPair(id) => DuelError::WinnerNotInPair(id),
        }
    }
}

impl From<RepositoryError> for DuelError {
    fn from(e: RepositoryError) -> Self {
        DuelError::DatabaseError(e.to_string())
    }
}

/// How duel sessions pace, exhaust and expire
#[derive(Debug, Clone, Copy)]
pub struct DuelSettings {
    pub feedback_delay: Duration,
    pub policy: ExhaustionPolicy,
    pub session_ttl: Duration,
}

impl Default for DuelSettings {
    fn default() -> Self {
        Self {
            feedback_delay: Duration::ZERO,
            policy: ExhaustionPolicy::default(),
            session_ttl: DEFAULT_SESSION_TTL,
        }
    }
}

/// The two outfits currently shown
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DuelView {
    pub left: OutfitDetail,
    pub right: OutfitDetail,
}

/// State of a viewer's duel session
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DuelState {
    pub theme_id: Option<String>,
    pub pool_size: usize,
    /// Absent when fewer than two outfits are in voting or a shown outfit
    /// has since been deleted
    pub duel: Option<DuelView>,
    pub votes_cast: u64,
}

/// Trait defining duel service operations
#[async_trait]
pub trait DuelService: Send + Sync {
    /// Start (or restart) the caller's session over outfits in voting
    async fn start(&self, voter_id: Uuid, theme_id: Option<String>)
    -> Result<DuelState, DuelError>;

    /// Current pair and tally of the caller's session
    async fn current(&self, voter_id: Uuid) -> Result<DuelState, DuelError>;

    /// Pick `winner` from the current pair and move on
    async fn vote(&self, voter_id: Uuid, winner: Uuid) -> Result<DuelState, DuelError>;

    /// Move on without judging the current pair
    async fn skip(&self, voter_id: Uuid) -> Result<DuelState, DuelError>;

    /// Drop the caller's session
    async fn end(&self, voter_id: Uuid) -> Result<(), DuelError>;
}

/// A session and the theme it was started for. Outfits are held by id only.
struct DuelEntry {
    session: DuelSession,
    theme_id: Option<String>,
}

/// Session state captured under the entry lock
struct Snapshot {
    theme_id: Option<String>,
    pool_size: usize,
    pair: Option<DuelPair>,
    votes_cast: u64,
}

impl DuelEntry {
    fn snapshot(&self) -> Snapshot {
        let round = self.session.round();
        Snapshot {
            theme_id: self.theme_id.clone(),
            pool_size: self.session.sampler().pool().len(),
            pair: round.pair,
            votes_cast: round.votes_cast,
        }
    }
}

type SharedEntry = Arc<tokio::sync::Mutex<DuelEntry>>;

struct Slot {
    entry: SharedEntry,
    last_seen: Instant,
}

impl Slot {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.last_seen.elapsed() >= ttl
    }
}

/// Implementation of DuelService keeping one session per user in memory.
///
/// Sessions idle for longer than the configured TTL are dropped: lazily when
/// their owner comes back, and in a sweep whenever any session starts.
pub struct DuelServiceImpl {
    outfit_repository: Arc<dyn OutfitRepository>,
    details: OutfitDetailLoader,
    sink: Arc<dyn VoteSink>,
    settings: DuelSettings,
    sessions: Mutex<HashMap<Uuid, Slot>>,
}

impl DuelServiceImpl {
    pub fn new(
        outfit_repository: Arc<dyn OutfitRepository>,
        details: OutfitDetailLoader,
        sink: Arc<dyn VoteSink>,
        settings: DuelSettings,
    ) -> Self {
        Self {
            outfit_repository,
            details,
            sink,
            settings,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    fn registry(&self) -> Result<std::sync::MutexGuard<'_, HashMap<Uuid, Slot>>, DuelError> {
        self.sessions
            .lock()
            .map_err(|_| DuelError::DatabaseError("Duel registry poisoned".to_string()))
    }

    /// Live session of `voter_id`, refreshing its idle timer
    fn entry(&self, voter_id: Uuid) -> Result<SharedEntry, DuelError> {
        let ttl = self.settings.session_ttl;
        let mut sessions = self.registry()?;
        match sessions.get_mut(&voter_id) {
            Some(slot) if !slot.is_expired(ttl) => {
                slot.last_seen = Instant::now();
                Ok(Arc::clone(&slot.entry))
            }
            Some(_) => {
                sessions.remove(&voter_id);
                debug!(%voter_id, "Duel session expired");
                Err(DuelError::SessionNotFound)
            }
            None => Err(DuelError::SessionNotFound),
        }
    }

    /// Loads the shown outfits with their items and creators
    async fn state(&self, snapshot: Snapshot) -> Result<DuelState, DuelError> {
        let duel = match snapshot.pair {
            Some(pair) => self.view(pair).await?,
            None => None,
        };
        Ok(DuelState {
            theme_id: snapshot.theme_id,
            pool_size: snapshot.pool_size,
            duel,
            votes_cast: snapshot.votes_cast,
        })
    }

    async fn view(&self, pair: DuelPair) -> Result<Option<DuelView>, DuelError> {
        let left = self.outfit_repository.find_by_id(pair.left).await?;
        let right = self.outfit_repository.find_by_id(pair.right).await?;
        let (Some(left), Some(right)) = (left, right) else {
            debug!(left = %pair.left, right = %pair.right, "Duel outfit no longer exists");
            return Ok(None);
        };

        let mut loaded = self.details.load(vec![left, right]).await?.into_iter();
        Ok(match (loaded.next(), loaded.next()) {
            (Some(left), Some(right)) => Some(DuelView { left, right }),
            _ => None,
        })
    }
}

#[async_trait]
impl DuelService for DuelServiceImpl {
    async fn start(
        &self,
        voter_id: Uuid,
        theme_id: Option<String>,
    ) -> Result<DuelState, DuelError> {
        let filters = OutfitFilters {
            status: Some(OutfitStatus::Voting),
            theme_id: theme_id.clone(),
            ..Default::default()
        };
        let pool: Vec<Uuid> = self
            .outfit_repository
            .find(&filters)
            .await?
            .into_iter()
            .map(|o| o.id)
            .collect();

        let sampler = DuelSampler::new(pool, self.settings.policy);
        let mut session = DuelSession::new(
            voter_id,
            sampler,
            Arc::clone(&self.sink),
            self.settings.feedback_delay,
        );
        session.start();

        let entry = DuelEntry { session, theme_id };
        let snapshot = entry.snapshot();

        let ttl = self.settings.session_ttl;
        let live = {
            let mut sessions = self.registry()?;
            sessions.retain(|_, slot| !slot.is_expired(ttl));
            sessions.insert(
                voter_id,
                Slot {
                    entry: Arc::new(tokio::sync::Mutex::new(entry)),
                    last_seen: Instant::now(),
                },
            );
            sessions.len()
        };

        info!(
            %voter_id,
            pool_size = snapshot.pool_size,
            policy = ?self.settings.policy,
            live_sessions = live,
            "Started duel session"
        );
        self.state(snapshot).await
    }

    async fn current(&self, voter_id: Uuid) -> Result<DuelState, DuelError> {
        let entry = self.entry(voter_id)?;
        let snapshot = entry.lock().await.snapshot();
        self.state(snapshot).await
    }

    async fn vote(&self, voter_id: Uuid, winner: Uuid) -> Result<DuelState, DuelError> {
        let entry = self.entry(voter_id)?;
        let snapshot = {
            let mut entry = entry.lock().await;
            entry.session.vote(winner).await?;
            entry.snapshot()
        };
        self.state(snapshot).await
    }

    async fn skip(&self, voter_id: Uuid) -> Result<DuelState, DuelError> {
        let entry = self.entry(voter_id)?;
        let snapshot = {
            let mut entry = entry.lock().await;
            entry.session.skip();
            entry.snapshot()
        };
        self.state(snapshot).await
    }

    async fn end(&self, voter_id: Uuid) -> Result<(), DuelError> {
        let ttl = self.settings.session_ttl;
        let removed = self.registry()?.remove(&voter_id);
        match removed {
            Some(slot) if !slot.is_expired(ttl) => {
                info!(%voter_id, "Ended duel session");
                Ok(())
            }
            _ => Err(DuelError::SessionNotFound),
        }
    }
}
