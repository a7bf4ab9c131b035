//! Integration with `rand` (v0.8) crate.

use super::{Generator, RandSource};
use rand::{CryptoRng, RngCore};

/// An adapter that implements [`RandSource`] for cryptographically secure [`RngCore`] types.
///
/// [`RandSource::is_secure`] reports `true` for every wrapped type because it only reflects the
/// [`CryptoRng`] marker. A [`CryptoRng`] seeded from a known value is still predictable; wrap it
/// in [`RandomSource::insecure_fallback`](super::RandomSource::insecure_fallback) or a custom
/// [`RandSource`] when that matters.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct Adapter<T>(/** The wrapped [`RngCore`] type. */ pub T);

impl<T: RngCore + CryptoRng> RandSource for Adapter<T> {
    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.0.fill_bytes(dest)
    }

    /// Returns `true` as the [`CryptoRng`] bound carries no information about the seed.
    fn is_secure(&self) -> bool {
        true
    }
}

impl<T: RngCore + CryptoRng> Generator<Adapter<T>> {
    /// Creates a generator object with a specified random number generator that implements
    /// [`RngCore`] and [`CryptoRng`] from `rand` (v0.8) crate.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use uuidkit::Generator;
    ///
    /// let mut g = Generator::with_rand08(rand::rngs::OsRng);
    /// println!("{}", g.generate_v4());
    /// ```
    pub const fn with_rand08(rng: T) -> Self {
        Self::new(Adapter(rng))
    }
}
