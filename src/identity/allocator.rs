//! Bounded unique identifier allocation
//!
//! Identifiers are drawn uniformly at random from `[0, 65535]` and rendered
//! zero-padded to the width of the domain maximum ("00042").

use std::fmt;

use ahash::AHashSet;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::core::error::{Result, SimError};

/// Smallest identifier value
pub const DOMAIN_MIN: u16 = u16::MIN;
/// Largest identifier value
pub const DOMAIN_MAX: u16 = u16::MAX;
/// Number of distinct identifiers one allocator can hand out
pub const DOMAIN_SIZE: usize = DOMAIN_MAX as usize - DOMAIN_MIN as usize + 1;
/// Digits of `DOMAIN_MAX`, the padded width of every token
pub const DOMAIN_WIDTH: usize = 5;

/// A token issued by an [`IdentifierAllocator`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier(u16);

impl Identifier {
    pub fn value(&self) -> u16 {
        self.0
    }

    /// Zero-padded textual form
    pub fn token(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:0width$}", self.0, width = DOMAIN_WIDTH)
    }
}

/// Issues identifiers that are unique among the currently live ones
#[derive(Debug)]
pub struct IdentifierAllocator {
    label: String,
    rng: ChaCha8Rng,
    live: AHashSet<u16>,
    /// Every value ever handed out, used to tell misuse cases apart
    issued: AHashSet<u16>,
}

impl IdentifierAllocator {
    /// Allocator seeded from OS entropy
    pub fn new(label: impl Into<String>) -> Self {
        Self::from_rng(label, ChaCha8Rng::from_entropy())
    }

    /// Allocator with a reproducible draw sequence
    pub fn with_seed(label: impl Into<String>, seed: u64) -> Self {
        Self::from_rng(label, ChaCha8Rng::seed_from_u64(seed))
    }

    fn from_rng(label: impl Into<String>, rng: ChaCha8Rng) -> Self {
        Self {
            label: label.into(),
            rng,
            live: AHashSet::new(),
            issued: AHashSet::new(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Draw a fresh identifier
    ///
    /// Samples uniformly until an unused value comes up. Fails once every
    /// value of the domain is live.
    pub fn take(&mut self) -> Result<Identifier> {
        if self.live.len() >= DOMAIN_SIZE {
            return Err(SimError::IdentifierDomainExhausted {
                capacity: DOMAIN_SIZE,
            });
        }

        let value = loop {
            let candidate = self.rng.gen_range(DOMAIN_MIN..=DOMAIN_MAX);
            if !self.live.contains(&candidate) {
                break candidate;
            }
        };

        self.live.insert(value);
        self.issued.insert(value);
        Ok(Identifier(value))
    }

    /// Return an identifier to the pool; no-op if it is not live
    pub fn release(&mut self, id: &Identifier) -> bool {
        self.live.remove(&id.0)
    }

    /// Strict variant of [`release`](Self::release) that reports misuse
    pub fn give_back(&mut self, id: &Identifier) -> Result<()> {
        if self.live.remove(&id.0) {
            return Ok(());
        }
        if self.issued.contains(&id.0) {
            Err(SimError::IdentifierMisuse(format!(
                "{} was already released by allocator '{}'",
                id, self.label
            )))
        } else {
            Err(SimError::IdentifierMisuse(format!(
                "{} was never issued by allocator '{}'",
                id, self.label
            )))
        }
    }

    pub fn is_live(&self, id: &Identifier) -> bool {
        self.live.contains(&id.0)
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_token_is_zero_padded() {
        assert_eq!(Identifier(42).token(), "00042");
        assert_eq!(Identifier(0).token(), "00000");
        assert_eq!(Identifier(65535).token(), "65535");
    }

    #[test]
    fn test_release_allows_reissue() {
        let mut alloc = IdentifierAllocator::with_seed("test", 7);
        let id = alloc.take().unwrap();
        assert!(alloc.is_live(&id));
        assert!(alloc.release(&id));
        assert!(!alloc.is_live(&id));
        assert!(!alloc.release(&id), "second release is a no-op");
        assert_eq!(alloc.live_count(), 0);
    }

    #[test]
    fn test_give_back_reports_misuse() {
        let mut alloc = IdentifierAllocator::with_seed("test", 7);
        let id = alloc.take().unwrap();
        assert!(alloc.give_back(&id).is_ok());

        let again = alloc.give_back(&id).unwrap_err();
        assert!(again.to_string().contains("already released"));

        let stranger = Identifier(if id.value() == 1 { 2 } else { 1 });
        let never = alloc.give_back(&stranger).unwrap_err();
        assert!(never.to_string().contains("never issued"));
    }

    #[test]
    fn test_exhausts_after_full_domain() {
        let mut alloc = IdentifierAllocator::with_seed("full", 99);
        let mut seen = AHashSet::new();
        for _ in 0..DOMAIN_SIZE {
            let id = alloc.take().unwrap();
            assert!(seen.insert(id.value()), "duplicate live identifier {}", id);
        }
        assert!(matches!(
            alloc.take(),
            Err(SimError::IdentifierDomainExhausted { capacity: DOMAIN_SIZE })
        ));

        // Freeing one slot makes exactly that value available again
        let freed = Identifier(1234);
        alloc.release(&freed);
        assert_eq!(alloc.take().unwrap(), freed);
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = IdentifierAllocator::with_seed("a", 3);
        let mut b = IdentifierAllocator::with_seed("b", 3);
        for _ in 0..10 {
            assert_eq!(a.take().unwrap(), b.take().unwrap());
        }
    }

    proptest! {
        #[test]
        fn prop_takes_are_pairwise_distinct(seed in any::<u64>(), k in 1usize..2000) {
            let mut alloc = IdentifierAllocator::with_seed("prop", seed);
            let mut seen = AHashSet::new();
            for _ in 0..k {
                let id = alloc.take().unwrap();
                prop_assert!(seen.insert(id));
            }
            prop_assert_eq!(alloc.live_count(), k);
        }
    }
}
