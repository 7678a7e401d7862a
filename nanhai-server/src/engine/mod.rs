//! Game engine
//!
//! Owns the authoritative game state operations: registration, dives and
//! snapshot reads.
//!
//! **Concurrency:**
//! - Mutating operations run inside a single-writer critical section (a
//!   `tokio::sync::Mutex` that also owns the random number generator) spanning
//!   load → mutate → save → broadcast.
//! - The critical section runs on its own task. Dropping the caller's future
//!   (a client hanging up mid-request) does not abandon an admitted write.
//! - Saves are conditioned on the version that was loaded. A conflicting write
//!   from outside this process is retried transparently.
//! - Reads load the stored document without taking the writer lock.

pub mod dive;

pub use dive::{DiveOutcome, COMPLETION_BONUS, RESET_MESSAGE};

use nanhai_common::db::DocumentStore;
use nanhai_common::events::{EventBus, GameEvent};
use nanhai_common::{ArtifactCatalog, Error, GameDocument, Player, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Attempts at a read-modify-write span before giving up on conflicts
pub const MAX_CONFLICT_RETRIES: usize = 8;

/// Result of a dive as seen by the caller
#[derive(Debug, Clone)]
pub struct DiveReport {
    pub outcome: DiveOutcome,
    /// Leaderboard after the dive was committed
    pub players: Vec<Player>,
}

/// Value produced inside the critical section plus the events to publish once saved
struct Committed<T> {
    value: T,
    events: Vec<GameEvent>,
}

/// Cheap to clone; clones share the store, the bus and the writer lock
#[derive(Clone)]
pub struct GameEngine {
    inner: Arc<EngineState>,
}

struct EngineState {
    store: DocumentStore,
    catalog: ArtifactCatalog,
    events: Arc<EventBus>,
    writer: Mutex<StdRng>,
}

impl GameEngine {
    /// Create the engine and make sure a game document exists
    pub async fn start(
        store: DocumentStore,
        catalog: ArtifactCatalog,
        events: Arc<EventBus>,
    ) -> Result<Self> {
        store.load_or_init(&catalog).await?;
        info!(
            "Game engine ready ({} artifacts, {} fragments per generation)",
            catalog.len(),
            catalog.fragment_count()
        );

        Ok(Self {
            inner: Arc::new(EngineState {
                store,
                catalog,
                events,
                writer: Mutex::new(StdRng::from_entropy()),
            }),
        })
    }

    /// Replace the random source with a seeded one (deterministic draws)
    ///
    /// Meant to be called right after [`GameEngine::start`], before any write.
    pub fn with_seed(self, seed: u64) -> Self {
        match self.inner.writer.try_lock() {
            Ok(mut rng) => *rng = StdRng::seed_from_u64(seed),
            Err(_) => warn!("Writer busy, keeping the current random source"),
        }
        self
    }

    pub fn catalog(&self) -> &ArtifactCatalog {
        &self.inner.catalog
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.inner.events
    }

    /// Register `name`, or leave an existing player untouched
    ///
    /// Returns the leaderboard after the write.
    pub async fn register(&self, name: &str) -> Result<Vec<Player>> {
        let name = require_name(name)?.to_string();

        self.commit(move |doc, _catalog, _rng| {
            let created = !doc.players.contains(&name);
            doc.players.find_or_create(&name);
            if created {
                info!("Registered player '{}'", name);
            }

            let players = doc.players.all().to_vec();
            Ok(Committed {
                events: vec![GameEvent::leaderboard(&players)],
                value: players,
            })
        })
        .await
    }

    /// Claim a random fragment for `name`, or reset an exhausted pool
    pub async fn dive(&self, name: &str) -> Result<DiveReport> {
        let name = require_name(name)?.to_string();

        self.commit(move |doc, catalog, rng| {
            let outcome = dive::dive(doc, catalog, &name, rng)?;
            let players = doc.players.all().to_vec();

            let events = match &outcome {
                DiveOutcome::Claimed { fragment, .. } => vec![
                    GameEvent::FragmentFound {
                        fragment: Some(fragment.clone()),
                    },
                    GameEvent::leaderboard(&players),
                ],
                DiveOutcome::Reset => vec![
                    GameEvent::leaderboard(&players),
                    GameEvent::FragmentFound { fragment: None },
                ],
            };

            Ok(Committed {
                value: DiveReport { outcome, players },
                events,
            })
        })
        .await
    }

    /// Current document as stored
    pub async fn snapshot(&self) -> Result<GameDocument> {
        self.inner.snapshot().await
    }

    /// Current leaderboard as stored
    pub async fn leaderboard(&self) -> Result<Vec<Player>> {
        Ok(self.snapshot().await?.players.all().to_vec())
    }

    /// Run a write span on a detached task and wait for its result
    ///
    /// The task owns everything it touches, so it commits and broadcasts even
    /// if this future is dropped while waiting.
    async fn commit<T, F>(&self, apply: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnMut(&mut GameDocument, &ArtifactCatalog, &mut StdRng) -> Result<Committed<T>>
            + Send
            + 'static,
    {
        let state = self.inner.clone();
        tokio::spawn(async move { state.transact(apply).await })
            .await
            .map_err(|e| Error::Internal(format!("write task failed: {}", e)))?
    }
}

impl EngineState {
    async fn snapshot(&self) -> Result<GameDocument> {
        self.store
            .load()
            .await?
            .map(|current| current.document)
            .ok_or_else(|| Error::Internal("game document missing from store".to_string()))
    }

    /// Run one read-modify-write span under the writer lock
    ///
    /// `apply` may run more than once when a save conflicts; each run gets a
    /// freshly loaded document. Events are published only after a successful
    /// save and before the lock is released, so subscribers see them in
    /// commit order.
    async fn transact<T, F>(&self, mut apply: F) -> Result<T>
    where
        F: FnMut(&mut GameDocument, &ArtifactCatalog, &mut StdRng) -> Result<Committed<T>>,
    {
        let mut rng = self.writer.lock().await;

        for attempt in 1..=MAX_CONFLICT_RETRIES {
            let mut current = self
                .store
                .load()
                .await?
                .ok_or_else(|| Error::Internal("game document missing from store".to_string()))?;

            let committed = apply(&mut current.document, &self.catalog, &mut *rng)?;

            match self.store.save(&current.document, current.version).await {
                Ok(version) => {
                    debug!("Committed game document v{}", version);
                    for event in committed.events {
                        self.events.emit_lossy(event);
                    }
                    return Ok(committed.value);
                }
                Err(Error::Conflict { expected }) => {
                    warn!(
                        "Write conflict at v{} (attempt {}/{}), retrying",
                        expected, attempt, MAX_CONFLICT_RETRIES
                    );
                }
                Err(e) => return Err(e),
            }
        }

        Err(Error::Internal(format!(
            "gave up after {} conflicting writes",
            MAX_CONFLICT_RETRIES
        )))
    }
}

fn require_name(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::InvalidInput("player name is empty".to_string()));
    }
    Ok(name)
}
