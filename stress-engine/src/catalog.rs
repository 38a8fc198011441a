//! Read-only endpoint catalog and per-worker selection

use crate::error::{EngineError, EngineResult};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use stress_config::{SelectionMode, TargetsConfig};
use stress_http::Endpoint;

/// How a worker picks its next endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionStrategy {
    /// Uniformly at random. With a seed, worker `i` uses `seed + i` so runs
    /// are reproducible per worker.
    Random { seed: Option<u64> },
    /// In catalog order, worker `i` starting at index `i`
    RoundRobin,
}

impl Default for SelectionStrategy {
    fn default() -> Self {
        SelectionStrategy::Random { seed: None }
    }
}

impl SelectionStrategy {
    pub fn from_config(config: &TargetsConfig) -> Self {
        match config.selection {
            SelectionMode::Random => SelectionStrategy::Random { seed: config.seed },
            SelectionMode::RoundRobin => SelectionStrategy::RoundRobin,
        }
    }
}

/// Immutable, non-empty list of targets shared by every worker
#[derive(Debug, Clone)]
pub struct EndpointCatalog {
    endpoints: Arc<[Endpoint]>,
    strategy: SelectionStrategy,
}

impl EndpointCatalog {
    /// Build a catalog; fails on an empty list
    pub fn new(endpoints: Vec<Endpoint>, strategy: SelectionStrategy) -> EngineResult<Self> {
        if endpoints.is_empty() {
            return Err(EngineError::EmptyCatalog);
        }

        Ok(Self {
            endpoints: endpoints.into(),
            strategy,
        })
    }

    /// Build a catalog from target configuration
    pub fn from_config(config: &TargetsConfig) -> EngineResult<Self> {
        let endpoints = config
            .endpoints
            .iter()
            .map(Endpoint::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(endpoints, SelectionStrategy::from_config(config))
    }

    /// The built-in public targets with random selection
    pub fn default_targets() -> EngineResult<Self> {
        Self::from_config(&TargetsConfig::default())
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    pub fn strategy(&self) -> SelectionStrategy {
        self.strategy
    }

    /// Selection state for one worker. Pickers never share state.
    pub fn picker(&self, worker_index: usize) -> EndpointPicker {
        let cursor = match self.strategy {
            SelectionStrategy::Random { seed: Some(seed) } => {
                Cursor::Random(StdRng::seed_from_u64(seed.wrapping_add(worker_index as u64)))
            }
            SelectionStrategy::Random { seed: None } => Cursor::Random(StdRng::from_os_rng()),
            SelectionStrategy::RoundRobin => Cursor::RoundRobin {
                next: worker_index % self.endpoints.len(),
            },
        };

        EndpointPicker {
            endpoints: Arc::clone(&self.endpoints),
            cursor,
        }
    }
}

#[derive(Debug)]
enum Cursor {
    Random(StdRng),
    RoundRobin { next: usize },
}

/// Per-worker endpoint selector
#[derive(Debug)]
pub struct EndpointPicker {
    endpoints: Arc<[Endpoint]>,
    cursor: Cursor,
}

impl EndpointPicker {
    /// Next endpoint for this worker
    pub fn pick(&mut self) -> &Endpoint {
        let index = match &mut self.cursor {
            Cursor::Random(rng) => rng.random_range(0..self.endpoints.len()),
            Cursor::RoundRobin { next } => {
                let index = *next;
                *next = (index + 1) % self.endpoints.len();
                index
            }
        };

        &self.endpoints[index]
    }
}
