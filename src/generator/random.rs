use rand::rngs::OsRng;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha12Rng;
use tracing::warn;

use super::RandSource;

/// Random source chosen once, at construction.
///
/// The insecure fallback exists only for hosts without an operating-system source; it is seeded
/// deterministically and reports [`RandSource::is_secure`] as `false`.
#[derive(Clone, Debug)]
pub enum RandomSource {
    /// The operating-system CSPRNG.
    Secure(OsRng),
    /// A seeded ChaCha stream. Predictable to anyone who knows the seed.
    InsecureFallback(ChaCha12Rng),
}

/// The operating-system random source could not be read.
#[derive(Debug, thiserror::Error)]
#[error("secure random source unavailable: {0}")]
pub struct RandomUnavailable(String);

impl RandomSource {
    /// Returns the operating-system source after checking that it can be read.
    pub fn secure() -> Result<Self, RandomUnavailable> {
        let mut probe = [0u8; 16];
        OsRng
            .try_fill_bytes(&mut probe)
            .map_err(|err| RandomUnavailable(err.to_string()))?;
        Ok(Self::Secure(OsRng))
    }

    /// Returns a deterministic source seeded with `seed`. Not for production use.
    pub fn insecure_fallback(seed: u64) -> Self {
        warn!(seed, "using insecure fallback random source; identifiers are predictable");
        Self::InsecureFallback(ChaCha12Rng::seed_from_u64(seed))
    }

    /// Returns the secure source when available, otherwise the fallback seeded from the clock.
    pub fn detect() -> Self {
        match Self::secure() {
            Ok(source) => source,
            Err(err) => {
                warn!(%err, "falling back to insecure random source");
                let seed = std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .map(|d| d.as_nanos() as u64)
                    .unwrap_or_default();
                Self::insecure_fallback(seed)
            }
        }
    }
}

impl RandSource for RandomSource {
    fn fill_bytes(&mut self, dest: &mut [u8]) {
        match self {
            Self::Secure(rng) => rng.fill_bytes(dest),
            Self::InsecureFallback(rng) => rng.fill_bytes(dest),
        }
    }

    fn is_secure(&self) -> bool {
        matches!(self, Self::Secure(_))
    }
}
