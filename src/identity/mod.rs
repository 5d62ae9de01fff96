//! Identifier allocation for sensors and other registered components

pub mod allocator;

pub use allocator::{Identifier, IdentifierAllocator, DOMAIN_SIZE, DOMAIN_WIDTH};

use ahash::AHashMap;

/// Allocation strategies an [`AllocatorFactory`] can build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AllocatorKind {
    /// Uniform sampling with retry over the whole domain
    Random,
}

impl AllocatorKind {
    pub const ALL: [AllocatorKind; 1] = [AllocatorKind::Random];
}

/// Builds allocators and keeps per-kind creation statistics
#[derive(Debug)]
pub struct AllocatorFactory {
    created: AHashMap<AllocatorKind, usize>,
    seed: Option<u64>,
}

impl Default for AllocatorFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl AllocatorFactory {
    pub fn new() -> Self {
        Self {
            created: AllocatorKind::ALL.iter().map(|&k| (k, 0)).collect(),
            seed: None,
        }
    }

    /// Every allocator built by this factory derives its seed from `seed`
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::new()
        }
    }

    pub fn create(&mut self, kind: AllocatorKind, label: &str) -> IdentifierAllocator {
        let count = self.created.entry(kind).or_insert(0);
        *count += 1;

        match (kind, self.seed) {
            (AllocatorKind::Random, Some(seed)) => {
                IdentifierAllocator::with_seed(label, seed.wrapping_add(*count as u64))
            }
            (AllocatorKind::Random, None) => IdentifierAllocator::new(label),
        }
    }

    /// (kind, allocators created) for every kind, in a stable order
    pub fn statistics(&self) -> Vec<(AllocatorKind, usize)> {
        let mut stats: Vec<_> = self.created.iter().map(|(&k, &n)| (k, n)).collect();
        stats.sort();
        stats
    }
}
