//! Service implementation for the in-memory relation store plugin.

use std::collections::{BTreeSet, HashMap};
use std::ops::Bound;
use std::time::Duration;

use anyhow::{Context, bail};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use jimm_names::{Kind, Relation};
use parking_lot::{Mutex, RwLock};
use relation_store_sdk::{
    MAX_PAGE_SIZE, ReadPage, RelationStoreError, Tuple, TupleFilter, schema,
};

use crate::config::InMemoryRelationStoreConfig;

/// Store operations that can be made to fail on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Check,
    Read,
    /// Both `add_relations` and `remove_relations`.
    Write,
}

/// In-memory relation store.
///
/// Tuples live in an ordered set behind a `RwLock`, which gives reads a
/// deterministic order and makes every batch write all-or-nothing. Check
/// resolves relation implication from [`schema::implied_by`] and one level
/// of group membership (groups only contain users).
pub struct Service {
    tuples: RwLock<BTreeSet<Tuple>>,
    faults: Mutex<HashMap<Operation, String>>,
    max_page_size: u32,
    latency: Duration,
}

impl Default for Service {
    fn default() -> Self {
        Self {
            tuples: RwLock::new(BTreeSet::new()),
            faults: Mutex::new(HashMap::new()),
            max_page_size: MAX_PAGE_SIZE,
            latency: Duration::ZERO,
        }
    }
}

impl Service {
    /// Create an empty store with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a service from plugin configuration.
    ///
    /// # Errors
    ///
    /// Fails if `max_page_size` is out of range or a seed tuple does not
    /// parse or does not fit the authorization model.
    pub fn from_config(cfg: &InMemoryRelationStoreConfig) -> anyhow::Result<Self> {
        if cfg.max_page_size == 0 || cfg.max_page_size > MAX_PAGE_SIZE {
            bail!(
                "max_page_size must be between 1 and {MAX_PAGE_SIZE}, got {}",
                cfg.max_page_size
            );
        }

        let mut tuples = BTreeSet::new();
        for (i, entry) in cfg.tuples.iter().enumerate() {
            let tuple = Tuple::new(
                entry
                    .object
                    .parse()
                    .with_context(|| format!("tuples[{i}]: invalid object"))?,
                entry
                    .relation
                    .parse()
                    .with_context(|| format!("tuples[{i}]: invalid relation"))?,
                entry
                    .target
                    .parse()
                    .with_context(|| format!("tuples[{i}]: invalid target"))?,
            );
            schema::validate(&tuple).with_context(|| format!("tuples[{i}]: {tuple}"))?;
            tuples.insert(tuple);
        }

        tracing::info!(
            tuples = tuples.len(),
            max_page_size = cfg.max_page_size,
            "in-memory relation store initialized"
        );

        Ok(Self {
            tuples: RwLock::new(tuples),
            faults: Mutex::new(HashMap::new()),
            max_page_size: cfg.max_page_size,
            latency: Duration::from_millis(cfg.latency_ms),
        })
    }

    /// Make every subsequent `op` fail with `RequestFailed(message)`.
    pub fn fail(&self, op: Operation, message: impl Into<String>) {
        self.faults.lock().insert(op, message.into());
    }

    /// Undo [`fail`](Self::fail) for `op`.
    pub fn recover(&self, op: Operation) {
        self.faults.lock().remove(&op);
    }

    pub(crate) fn injected_fault(&self, op: Operation) -> Result<(), RelationStoreError> {
        match self.faults.lock().get(&op) {
            Some(message) => Err(RelationStoreError::RequestFailed(message.clone())),
            None => Ok(()),
        }
    }

    pub(crate) async fn delay(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    /// Whether `tuple` holds directly, through a stronger relation, or
    /// through membership of a group holding it.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` if the relation is not defined on the
    /// target's kind.
    pub fn check(&self, tuple: &Tuple, trace: bool) -> Result<bool, RelationStoreError> {
        let implied = schema::implied_by(tuple.target.kind(), tuple.relation);
        if implied.is_empty() {
            return Err(RelationStoreError::InvalidRequest(format!(
                "relation {} is not defined on {}",
                tuple.relation,
                tuple.target.kind()
            )));
        }

        let tuples = self.tuples.read();
        for &relation in implied {
            let direct = Tuple::new(tuple.object.clone(), relation, tuple.target.clone());
            if tuples.contains(&direct) {
                if trace {
                    tracing::debug!(%tuple, via = %direct, "check allowed");
                }
                return Ok(true);
            }

            if tuple.object.kind() != Kind::User {
                continue;
            }
            let via_group = tuples
                .iter()
                .filter(|t| {
                    t.relation == relation
                        && t.target == tuple.target
                        && t.object.relation() == Some(Relation::Member)
                })
                .find(|t| {
                    let membership = Tuple::new(
                        tuple.object.clone(),
                        Relation::Member,
                        t.object.clone().without_relation(),
                    );
                    tuples.contains(&membership)
                });
            if let Some(grant) = via_group {
                if trace {
                    tracing::debug!(%tuple, via = %grant, "check allowed through group membership");
                }
                return Ok(true);
            }
        }

        if trace {
            tracing::debug!(%tuple, "check denied");
        }
        Ok(false)
    }

    /// Insert every tuple, or none if any fails validation.
    ///
    /// # Errors
    ///
    /// Returns `SchemaViolation` for the first tuple outside the model.
    pub fn add(&self, batch: &[Tuple]) -> Result<(), RelationStoreError> {
        for tuple in batch {
            schema::validate(tuple)?;
        }

        let mut tuples = self.tuples.write();
        let before = tuples.len();
        tuples.extend(batch.iter().cloned());
        tracing::debug!(
            requested = batch.len(),
            inserted = tuples.len() - before,
            "relations added"
        );
        Ok(())
    }

    /// Delete every tuple in `batch`; absent tuples are ignored.
    pub fn remove(&self, batch: &[Tuple]) {
        let mut tuples = self.tuples.write();
        let removed = batch.iter().filter(|t| tuples.remove(*t)).count();
        tracing::debug!(requested = batch.len(), removed, "relations removed");
    }

    /// One page of direct tuples matching `filter`, in tuple order.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` for a limit outside `1..=MAX_PAGE_SIZE` or
    /// a cursor this store did not issue. Limits above the store's own page
    /// size are clamped to it.
    pub fn read(
        &self,
        filter: &TupleFilter,
        limit: u32,
        cursor: Option<&str>,
    ) -> Result<ReadPage, RelationStoreError> {
        if limit == 0 || limit > MAX_PAGE_SIZE {
            return Err(RelationStoreError::InvalidRequest(format!(
                "limit must be between 1 and {MAX_PAGE_SIZE}, got {limit}"
            )));
        }
        let after = cursor.map(decode_cursor).transpose()?;
        let limit = limit.min(self.max_page_size) as usize;

        let tuples = self.tuples.read();
        let lower = after.as_ref().map_or(Bound::Unbounded, Bound::Excluded);
        let mut page: Vec<Tuple> = tuples
            .range::<Tuple, _>((lower, Bound::Unbounded))
            .filter(|t| filter.matches(t))
            .take(limit + 1)
            .cloned()
            .collect();

        let next_cursor = if page.len() > limit {
            page.truncate(limit);
            page.last().map(encode_cursor)
        } else {
            None
        };

        Ok(ReadPage {
            tuples: page,
            next_cursor,
        })
    }

    /// Every stored tuple, in order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Tuple> {
        self.tuples.read().iter().cloned().collect()
    }

    #[must_use]
    pub fn contains(&self, tuple: &Tuple) -> bool {
        self.tuples.read().contains(tuple)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tuples.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tuples.read().is_empty()
    }
}

fn encode_cursor(last: &Tuple) -> String {
    URL_SAFE_NO_PAD.encode(last.to_string())
}

fn decode_cursor(cursor: &str) -> Result<Tuple, RelationStoreError> {
    let invalid = || RelationStoreError::InvalidRequest(format!("malformed cursor {cursor:?}"));

    let bytes = URL_SAFE_NO_PAD.decode(cursor).map_err(|_| invalid())?;
    let text = String::from_utf8(bytes).map_err(|_| invalid())?;
    text.parse().map_err(|_| invalid())
}
