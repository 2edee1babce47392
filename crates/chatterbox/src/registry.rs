//! Per-intent model registry.
//!
//! Each label owns one [`PairChain`] behind its own reader-writer lock and
//! its own random generator, so neither training nor generation for one
//! label ever waits on another. The map itself is a [`DashMap`]; creating a
//! missing entry happens under the shard lock, so two racing first writers
//! for a new label both end up with the same model.

use std::sync::Arc;

use dashmap::DashMap;
use pair_chain::PairChain;
use parking_lot::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use rand::{Rng, SeedableRng};

/// One label's chain together with the generator its replies draw from.
#[derive(Debug)]
pub struct LabelModel<R> {
    chain: RwLock<PairChain>,
    rng: Mutex<R>,
}

impl<R> LabelModel<R> {
    fn new(rng: R) -> Self {
        LabelModel {
            chain: RwLock::new(PairChain::new()),
            rng: Mutex::new(rng),
        }
    }

    /// Shared access to the chain, for generation and inspection.
    pub fn read(&self) -> RwLockReadGuard<'_, PairChain> {
        self.chain.read()
    }

    /// Exclusive access to the chain, for training.
    pub fn write(&self) -> RwLockWriteGuard<'_, PairChain> {
        self.chain.write()
    }

    /// This label's generator. Take it after [`read`](Self::read).
    pub fn rng(&self) -> MutexGuard<'_, R> {
        self.rng.lock()
    }
}

/// Shared handle to one label's model.
///
/// Never hold its locks across an `.await`.
pub type ModelHandle<R> = Arc<LabelModel<R>>;

/// Label → model table. Entries are created lazily and never removed.
///
/// New entries get a generator seeded from the registry's own, so a seeded
/// registry hands out the same generators for the same creation order.
#[derive(Debug)]
pub struct ModelRegistry<R> {
    models: DashMap<String, ModelHandle<R>>,
    seeder: Mutex<R>,
}

impl<R: Rng + SeedableRng> ModelRegistry<R> {
    pub fn new(seeder: R) -> Self {
        ModelRegistry {
            models: DashMap::new(),
            seeder: Mutex::new(seeder),
        }
    }

    /// Return the model for `label`, creating an empty one on first use.
    pub fn get_or_create(&self, label: &str) -> ModelHandle<R> {
        if let Some(model) = self.models.get(label) {
            return Arc::clone(model.value());
        }
        let entry = self.models.entry(label.to_string()).or_insert_with(|| {
            log::debug!("creating model for label '{label}'");
            let rng = R::from_rng(&mut *self.seeder.lock());
            Arc::new(LabelModel::new(rng))
        });
        Arc::clone(entry.value())
    }

    /// Return the model for `label` without creating it.
    pub fn get(&self, label: &str) -> Option<ModelHandle<R>> {
        self.models.get(label).map(|model| Arc::clone(model.value()))
    }

    /// Train `label`'s model on the given messages under its write lock.
    pub fn train<I>(&self, label: &str, messages: I)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let model = self.get_or_create(label);
        model.write().train(messages);
    }

    /// All labels seen so far, sorted.
    pub fn labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self.models.iter().map(|entry| entry.key().clone()).collect();
        labels.sort();
        labels
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
