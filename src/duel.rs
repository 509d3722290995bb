//! Pairwise outfit duels.
//!
//! [`DuelSampler`] draws pairs of outfits from a fixed pool and remembers which
//! pairs were already judged. [`DuelSession`] wraps a sampler for one viewer,
//! forwards every winner to a [`VoteSink`] without waiting on it, and keeps
//! the session tally.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use utoipa::ToSchema;
use uuid::Uuid;

/// Random draws tried before falling back to enumerating the remaining pairs
const MAX_SAMPLING_ATTEMPTS: usize = 64;

/// Two distinct outfits shown side by side
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DuelPair {
    pub left: Uuid,
    pub right: Uuid,
}

impl DuelPair {
    pub fn new(left: Uuid, right: Uuid) -> Self {
        Self { left, right }
    }

    /// Order-independent identity of the pair
    pub fn key(&self) -> PairKey {
        PairKey::new(self.left, self.right)
    }

    pub fn contains(&self, outfit_id: Uuid) -> bool {
        self.left == outfit_id || self.right == outfit_id
    }
}

/// Canonical key of an unordered pair: the smaller id always comes first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PairKey(Uuid, Uuid);

impl PairKey {
    pub fn new(a: Uuid, b: Uuid) -> Self {
        if a <= b { Self(a, b) } else { Self(b, a) }
    }

    pub fn contains(&self, outfit_id: Uuid) -> bool {
        self.0 == outfit_id || self.1 == outfit_id
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.0, self.1)
    }
}

/// What becomes ineligible once a pair has been judged
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ExhaustionPolicy {
    /// Both outfits of a judged pair sit out until the pool is reset
    #[default]
    PerOutfit,
    /// Only the exact judged pair is withheld
    PerPair,
}

impl FromStr for ExhaustionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "per-outfit" | "per_outfit" | "outfit" => Ok(ExhaustionPolicy::PerOutfit),
            "per-pair" | "per_pair" | "pair" => Ok(ExhaustionPolicy::PerPair),
            other => Err(format!("unknown exhaustion policy '{}'", other)),
        }
    }
}

/// Produces duel pairs from a finite pool of outfit ids
#[derive(Debug, Clone)]
pub struct DuelSampler {
    pool: Vec<Uuid>,
    served: HashSet<PairKey>,
    votes_cast: u64,
    policy: ExhaustionPolicy,
    current: Option<DuelPair>,
    rng: StdRng,
}

impl DuelSampler {
    pub fn new(pool: Vec<Uuid>, policy: ExhaustionPolicy) -> Self {
        Self::with_rng(pool, policy, StdRng::from_entropy())
    }

    /// Deterministic sampler for reproducible sessions
    pub fn with_seed(pool: Vec<Uuid>, policy: ExhaustionPolicy, seed: u64) -> Self {
        Self::with_rng(pool, policy, StdRng::seed_from_u64(seed))
    }

    fn with_rng(pool: Vec<Uuid>, policy: ExhaustionPolicy, rng: StdRng) -> Self {
        // Duplicate ids would let a pair contain the same outfit twice
        let mut seen = HashSet::new();
        let pool = pool.into_iter().filter(|id| seen.insert(*id)).collect();

        Self {
            pool,
            served: HashSet::new(),
            votes_cast: 0,
            policy,
            current: None,
            rng,
        }
    }

    pub fn pool(&self) -> &[Uuid] {
        &self.pool
    }

    pub fn policy(&self) -> ExhaustionPolicy {
        self.policy
    }

    pub fn current(&self) -> Option<DuelPair> {
        self.current
    }

    pub fn votes_cast(&self) -> u64 {
        self.votes_cast
    }

    pub fn is_served(&self, pair: &DuelPair) -> bool {
        self.served.contains(&pair.key())
    }

    pub fn served_count(&self) -> usize {
        self.served.len()
    }

    /// Draws the next pair and makes it current.
    ///
    /// Returns `None` only when the pool holds fewer than two outfits. When
    /// the eligible candidates run out, judged pairs are forgotten and the
    /// first two pool members are served.
    pub fn next_pair(&mut self) -> Option<DuelPair> {
        if self.pool.len() < 2 {
            self.current = None;
            return None;
        }

        let drawn = match self.policy {
            ExhaustionPolicy::PerOutfit => self.draw_fresh_outfits(),
            ExhaustionPolicy::PerPair => self.draw_fresh_pair(),
        };

        let pair = drawn.unwrap_or_else(|| {
            debug!(
                served = self.served.len(),
                pool = self.pool.len(),
                "Duel pool exhausted, resetting"
            );
            self.served.clear();
            DuelPair::new(self.pool[0], self.pool[1])
        });

        self.current = Some(pair);
        Some(pair)
    }

    /// Marks the pair as judged and bumps the tally. The winner itself does
    /// not matter to the sampler.
    pub fn record(&mut self, pair: &DuelPair) {
        self.served.insert(pair.key());
        self.votes_cast += 1;
    }

    /// Moves on without judging the current pair
    pub fn skip(&mut self) -> Option<DuelPair> {
        self.next_pair()
    }

    fn draw_fresh_outfits(&mut self) -> Option<DuelPair> {
        let judged: HashSet<Uuid> = self.served.iter().flat_map(|key| [key.0, key.1]).collect();
        let eligible: Vec<Uuid> = self
            .pool
            .iter()
            .copied()
            .filter(|id| !judged.contains(id))
            .collect();

        let mut drawn = eligible.choose_multiple(&mut self.rng, 2).copied();
        match (drawn.next(), drawn.next()) {
            (Some(left), Some(right)) => Some(DuelPair::new(left, right)),
            _ => None,
        }
    }

    fn draw_fresh_pair(&mut self) -> Option<DuelPair> {
        let n = self.pool.len();
        let total_pairs = n.saturating_mul(n - 1) / 2;

        // While most pairs are fresh, random draws find one quickly
        if self.served.len().saturating_mul(2) <= total_pairs {
            for _ in 0..MAX_SAMPLING_ATTEMPTS {
                let i = self.rng.gen_range(0..n);
                let mut j = self.rng.gen_range(0..n - 1);
                if j >= i {
                    j += 1;
                }
                let pair = DuelPair::new(self.pool[i], self.pool[j]);
                if !self.served.contains(&pair.key()) {
                    return Some(pair);
                }
            }
        }

        self.enumerate_fresh_pair()
    }

    fn enumerate_fresh_pair(&mut self) -> Option<DuelPair> {
        let mut candidates = Vec::new();
        for (i, &left) in self.pool.iter().enumerate() {
            for &right in &self.pool[i + 1..] {
                if !self.served.contains(&PairKey::new(left, right)) {
                    candidates.push(DuelPair::new(left, right));
                }
            }
        }

        let mut pair = *candidates.choose(&mut self.rng)?;
        // Either side may be shown first
        if self.rng.gen_bool(0.5) {
            pair = DuelPair::new(pair.right, pair.left);
        }
        Some(pair)
    }
}

/// Error from the collaborator that persists duel winners
#[derive(Debug, thiserror::Error)]
#[error("Vote could not be recorded: {0}")]
pub struct VoteSinkError(pub String);

/// Receives the winner of every judged duel
#[async_trait]
pub trait VoteSink: Send + Sync {
    async fn record_winner(&self, voter_id: Uuid, outfit_id: Uuid) -> Result<(), VoteSinkError>;
}

/// Why a duel vote was refused
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VoteRejected {
    #[error("No duel pair is being shown")]
    NoActivePair,

    #[error("Outfit {0} is not part of the current duel")]
    WinnerNotInPair(Uuid),
}

/// Outcome of advancing a duel session
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DuelRound {
    pub pair: Option<DuelPair>,
    pub votes_cast: u64,
}

/// One viewer's duel session
pub struct DuelSession {
    voter_id: Uuid,
    sampler: DuelSampler,
    sink: Arc<dyn VoteSink>,
    feedback_delay: Duration,
}

impl DuelSession {
    pub fn new(
        voter_id: Uuid,
        sampler: DuelSampler,
        sink: Arc<dyn VoteSink>,
        feedback_delay: Duration,
    ) -> Self {
        Self {
            voter_id,
            sampler,
            sink,
            feedback_delay,
        }
    }

    pub fn voter_id(&self) -> Uuid {
        self.voter_id
    }

    pub fn sampler(&self) -> &DuelSampler {
        &self.sampler
    }

    pub fn round(&self) -> DuelRound {
        DuelRound {
            pair: self.sampler.current(),
            votes_cast: self.sampler.votes_cast(),
        }
    }

    /// Draws the opening pair
    pub fn start(&mut self) -> DuelRound {
        self.sampler.next_pair();
        self.round()
    }

    /// Judges the current pair in favor of `winner` and advances.
    ///
    /// The winner is handed to the sink on a background task; the tally and
    /// the next pair do not depend on that write succeeding.
    pub async fn vote(&mut self, winner: Uuid) -> Result<DuelRound, VoteRejected> {
        let pair = self.sampler.current().ok_or(VoteRejected::NoActivePair)?;
        if !pair.contains(winner) {
            return Err(VoteRejected::WinnerNotInPair(winner));
        }

        self.sampler.record(&pair);

        let sink = Arc::clone(&self.sink);
        let voter_id = self.voter_id;
        tokio::spawn(async move {
            if let Err(e) = sink.record_winner(voter_id, winner).await {
                warn!(%voter_id, outfit_id = %winner, error = %e, "Failed to persist duel vote");
            }
        });

        if !self.feedback_delay.is_zero() {
            tokio::time::sleep(self.feedback_delay).await;
        }

        self.sampler.next_pair();
        Ok(self.round())
    }

    pub fn skip(&mut self) -> DuelRound {
        self.sampler.skip();
        self.round()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn ids(n: usize) -> Vec<Uuid> {
        (0..n).map(|_| Uuid::new_v4()).collect()
    }

    struct RecordingSink {
        winners: Mutex<Vec<(Uuid, Uuid)>>,
        should_fail: bool,
    }

    impl RecordingSink {
        fn new() -> Self {
            Self {
                winners: Mutex::new(Vec::new()),
                should_fail: false,
            }
        }

        fn with_failure() -> Self {
            Self {
                winners: Mutex::new(Vec::new()),
                should_fail: true,
            }
        }
    }

    #[async_trait]
    impl VoteSink for RecordingSink {
        async fn record_winner(
            &self,
            voter_id: Uuid,
            outfit_id: Uuid,
        ) -> Result<(), VoteSinkError> {
            if self.should_fail {
                return Err(VoteSinkError("storage offline".to_string()));
            }
            self.winners.lock().unwrap().push((voter_id, outfit_id));
            Ok(())
        }
    }

    #[test]
    fn test_pair_key_is_order_independent() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        assert_eq!(PairKey::new(a, b), PairKey::new(b, a));
        assert_eq!(DuelPair::new(a, b).key(), DuelPair::new(b, a).key());
    }

    #[test]
    fn test_next_pair_never_repeats_an_outfit() {
        for policy in [ExhaustionPolicy::PerOutfit, ExhaustionPolicy::PerPair] {
            let mut sampler = DuelSampler::with_seed(ids(6), policy, 7);
            for _ in 0..200 {
                let pair = sampler.next_pair().unwrap();
                assert_ne!(pair.left, pair.right);
                sampler.record(&pair);
            }
        }
    }

    #[test]
    fn test_pool_with_duplicates_is_deduplicated() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let mut sampler =
            DuelSampler::with_seed(vec![a, a, a, b], ExhaustionPolicy::PerOutfit, 1);
        assert_eq!(sampler.pool(), &[a, b]);
        let pair = sampler.next_pair().unwrap();
        assert_eq!(pair.key(), PairKey::new(a, b));
    }

    #[test]
    fn test_small_pool_yields_no_pair() {
        let mut empty = DuelSampler::with_seed(vec![], ExhaustionPolicy::PerOutfit, 1);
        assert!(empty.next_pair().is_none());

        let mut single = DuelSampler::with_seed(ids(1), ExhaustionPolicy::PerPair, 1);
        assert!(single.next_pair().is_none());
        assert!(single.current().is_none());
    }

    #[test]
    fn test_vote_counter_counts_recorded_pairs() {
        let mut sampler = DuelSampler::with_seed(ids(10), ExhaustionPolicy::PerOutfit, 3);
        for _ in 0..4 {
            let pair = sampler.next_pair().unwrap();
            sampler.record(&pair);
        }
        assert_eq!(sampler.votes_cast(), 4);
        assert_eq!(sampler.served_count(), 4);
    }

    #[test]
    fn test_per_outfit_excludes_judged_outfits() {
        let pool = ids(6);
        let mut sampler = DuelSampler::with_seed(pool, ExhaustionPolicy::PerOutfit, 11);

        let first = sampler.next_pair().unwrap();
        sampler.record(&first);
        let second = sampler.next_pair().unwrap();

        assert!(!second.contains(first.left));
        assert!(!second.contains(first.right));
    }

    #[test]
    fn test_exhaustion_resets_and_serves_fallback() {
        let pool = ids(3);
        let mut sampler = DuelSampler::with_seed(pool.clone(), ExhaustionPolicy::PerOutfit, 5);

        let pair = DuelPair::new(pool[0], pool[1]);
        sampler.record(&pair);
        assert_eq!(sampler.served_count(), 1);

        // Only the third outfit is still eligible
        let next = sampler.next_pair().unwrap();
        assert_eq!(next, DuelPair::new(pool[0], pool[1]));
        assert_eq!(sampler.served_count(), 0);

        let after_reset = sampler.next_pair().unwrap();
        assert_ne!(after_reset.left, after_reset.right);
    }

    #[test]
    fn test_skip_does_not_count() {
        let mut sampler = DuelSampler::with_seed(ids(4), ExhaustionPolicy::PerOutfit, 9);
        sampler.next_pair();
        sampler.skip();
        sampler.skip();
        assert_eq!(sampler.votes_cast(), 0);
        assert_eq!(sampler.served_count(), 0);
    }

    #[test]
    fn test_per_pair_serves_every_pair_before_reset() {
        let pool = ids(4);
        let mut sampler = DuelSampler::with_seed(pool, ExhaustionPolicy::PerPair, 21);
        let mut seen = HashSet::new();

        // 4 outfits form 6 distinct pairs
        for _ in 0..6 {
            let pair = sampler.next_pair().unwrap();
            assert!(seen.insert(pair.key()), "pair {} served twice", pair.key());
            sampler.record(&pair);
        }
        assert_eq!(sampler.served_count(), 6);

        sampler.next_pair().unwrap();
        assert_eq!(sampler.served_count(), 0);
    }

    #[test]
    fn test_per_pair_covers_a_larger_pool() {
        let pool = ids(12);
        let mut sampler = DuelSampler::with_seed(pool.clone(), ExhaustionPolicy::PerPair, 33);
        let mut seen = HashSet::new();

        // 12 outfits form 66 distinct pairs
        for _ in 0..66 {
            let pair = sampler.next_pair().unwrap();
            assert!(pool.contains(&pair.left) && pool.contains(&pair.right));
            assert!(seen.insert(pair.key()), "pair {} served twice", pair.key());
            sampler.record(&pair);
        }
        assert_eq!(sampler.served_count(), 66);

        sampler.next_pair().unwrap();
        assert_eq!(sampler.served_count(), 0);
    }

    #[test]
    fn test_large_pools_draw_without_enumerating() {
        for policy in [ExhaustionPolicy::PerPair, ExhaustionPolicy::PerOutfit] {
            let mut sampler = DuelSampler::with_seed(ids(5000), policy, 17);
            let mut seen = HashSet::new();
            for _ in 0..500 {
                let pair = sampler.next_pair().unwrap();
                assert_ne!(pair.left, pair.right);
                assert!(seen.insert(pair.key()));
                sampler.record(&pair);
            }
            assert_eq!(sampler.served_count(), 500);
        }
    }

    #[test]
    fn test_exhaustion_policy_from_str() {
        assert_eq!(
            "per-outfit".parse::<ExhaustionPolicy>(),
            Ok(ExhaustionPolicy::PerOutfit)
        );
        assert_eq!(
            "PER_PAIR".parse::<ExhaustionPolicy>(),
            Ok(ExhaustionPolicy::PerPair)
        );
        assert!("random".parse::<ExhaustionPolicy>().is_err());
    }

    #[tokio::test]
    async fn test_session_vote_forwards_winner_and_advances() {
        let sink = Arc::new(RecordingSink::new());
        let voter = Uuid::new_v4();
        let sampler = DuelSampler::with_seed(ids(6), ExhaustionPolicy::PerOutfit, 2);
        let mut session = DuelSession::new(voter, sampler, sink.clone(), Duration::ZERO);

        let opening = session.start();
        let pair = opening.pair.unwrap();
        assert_eq!(opening.votes_cast, 0);

        let round = session.vote(pair.left).await.unwrap();
        assert_eq!(round.votes_cast, 1);
        let next = round.pair.unwrap();
        assert!(!next.contains(pair.left));
        assert!(!next.contains(pair.right));

        // Let the background write land
        for _ in 0..50 {
            if !sink.winners.lock().unwrap().is_empty() {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(sink.winners.lock().unwrap().as_slice(), &[(voter, pair.left)]);
    }

    #[tokio::test]
    async fn test_session_vote_survives_sink_failure() {
        let sink = Arc::new(RecordingSink::with_failure());
        let sampler = DuelSampler::with_seed(ids(4), ExhaustionPolicy::PerOutfit, 4);
        let mut session = DuelSession::new(Uuid::new_v4(), sampler, sink, Duration::ZERO);

        let pair = session.start().pair.unwrap();
        let round = session.vote(pair.right).await.unwrap();
        assert_eq!(round.votes_cast, 1);
        assert!(round.pair.is_some());
    }

    #[tokio::test]
    async fn test_session_rejects_outsider_winner() {
        let sampler = DuelSampler::with_seed(ids(4), ExhaustionPolicy::PerOutfit, 4);
        let mut session = DuelSession::new(
            Uuid::new_v4(),
            sampler,
            Arc::new(RecordingSink::new()),
            Duration::ZERO,
        );

        let outsider = Uuid::new_v4();
        assert_eq!(
            session.vote(outsider).await,
            Err(VoteRejected::NoActivePair)
        );

        session.start();
        assert_eq!(
            session.vote(outsider).await,
            Err(VoteRejected::WinnerNotInPair(outsider))
        );
        assert_eq!(session.round().votes_cast, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_waits_feedback_delay() {
        let sampler = DuelSampler::with_seed(ids(4), ExhaustionPolicy::PerOutfit, 8);
        let mut session = DuelSession::new(
            Uuid::new_v4(),
            sampler,
            Arc::new(RecordingSink::new()),
            Duration::from_millis(500),
        );
        let pair = session.start().pair.unwrap();

        let started = tokio::time::Instant::now();
        session.vote(pair.left).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(500));
    }
}
