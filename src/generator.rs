//! Identifier generator and related types.

use serde::{Deserialize, Serialize};

use crate::{namespace, Error, GenerationMethod, Result, Uuid, Version, GREGORIAN_OFFSET_MS};

mod name_based;
pub use name_based::{hash_v3, hash_v5};

mod random;
pub use random::{RandomSource, RandomUnavailable};

pub mod with_rand08;


/// A trait that defines the minimum random number generator interface for [`Generator`].
pub trait RandSource {
    /// Fills `dest` with random data.
    fn fill_bytes(&mut self, dest: &mut [u8]);

    /// Returns `false` if the output is predictable and unfit for production use.
    fn is_secure(&self) -> bool;
}

/// A trait that defines the minimum system clock interface for [`Generator`].
pub trait TimeSource {
    /// Returns the current Unix timestamp in milliseconds.
    fn unix_ts_ms(&mut self) -> u64;
}

/// [`TimeSource`] backed by [`std::time::SystemTime`].
#[derive(Clone, Copy, Eq, PartialEq, Debug, Default)]
pub struct StdSystemTime;

impl TimeSource for StdSystemTime {
    fn unix_ts_ms(&mut self) -> u64 {
        use std::time;
        // a clock set before 1970 is treated as the epoch itself
        time::SystemTime::now()
            .duration_since(time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default()
    }
}

/// Per-call inputs to [`Generator::generate`].
#[derive(Clone, Eq, PartialEq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateOptions {
    /// Standard namespace name (`DNS`, `URL`, `OID`, `X500`) or an identifier in any format.
    pub namespace: Option<String>,
    pub name: Option<String>,
    /// 12 hexadecimal digits, optionally separated by `:` or `-`.
    pub node: Option<String>,
    /// Never repeat or regress the encoded timestamp of time-based versions.
    #[serde(default)]
    pub sequential: bool,
}

/// How a value was produced.
#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationMetadata {
    pub method: GenerationMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// The caller-supplied node, or `"random"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clock_sequence: Option<u16>,
    /// Bits an outside observer cannot predict.
    pub entropy_bits: u32,
}

/// Represents a generator of v1, v3, v4, v5, v6, and v7 identifiers.
///
/// The generator owns its random and time sources, so independent generators never share
/// state. It remembers the last timestamp encoded by time-based versions to support
/// [`GenerateOptions::sequential`].
///
/// # Examples
///
/// ```rust
/// use uuidkit::{GenerateOptions, Generator, RandomSource, Version};
///
/// let mut g = Generator::new(RandomSource::secure()?);
/// let (uuid, _) = g.generate(Version::V4, &GenerateOptions::default())?;
/// assert_eq!(uuid.version(), 4);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct Generator<R, T = StdSystemTime> {
    last_ticks: u64,
    last_unix_ts_ms: u64,

    /// The random number generator used by the generator.
    rng: R,

    /// The system clock used by the generator.
    time_source: T,
}

impl<R: RandSource> Generator<R> {
    /// Creates a generator with the system clock.
    pub const fn new(rng: R) -> Self {
        Self::with_rand_and_time_sources(rng, StdSystemTime)
    }
}

impl<R: RandSource, T: TimeSource> Generator<R, T> {
    /// Creates a generator with a random number generator and a system clock.
    pub const fn with_rand_and_time_sources(rng: R, time_source: T) -> Self {
        Self {
            last_ticks: 0,
            last_unix_ts_ms: 0,
            rng,
            time_source,
        }
    }

    /// Returns whether the underlying random source is fit for production use.
    pub fn is_secure(&self) -> bool {
        self.rng.is_secure()
    }

    /// Generates a new identifier of `version`.
    ///
    /// Name-based versions require both `options.namespace` and `options.name`.
    pub fn generate(
        &mut self,
        version: Version,
        options: &GenerateOptions,
    ) -> Result<(Uuid, GenerationMetadata)> {
        match version {
            Version::V4 => Ok((
                self.generate_v4(),
                GenerationMetadata::new(GenerationMethod::Random, 122),
            )),
            Version::V7 => Ok((
                self.generate_v7(options.sequential),
                GenerationMetadata::new(GenerationMethod::TimeBased, 74),
            )),
            Version::V1 | Version::V6 => self.generate_time_based(version, options),
            Version::V3 | Version::V5 => {
                let (Some(ns), Some(name)) = (&options.namespace, &options.name) else {
                    return Err(Error::InvalidArgument(format!(
                        "namespace and name are required for {version} UUID"
                    )));
                };
                let ns_uuid = namespace::resolve(ns)?;
                let uuid = if version == Version::V3 {
                    hash_v3(&ns_uuid, name.as_bytes())
                } else {
                    hash_v5(&ns_uuid, name.as_bytes())
                };
                let mut metadata = GenerationMetadata::new(GenerationMethod::NameBased, 0);
                metadata.namespace = Some(ns.clone());
                metadata.name = Some(name.clone());
                Ok((uuid, metadata))
            }
        }
    }

    /// Generates a new UUIDv4 object.
    pub fn generate_v4(&mut self) -> Uuid {
        let mut bytes = [0u8; 16];
        self.rng.fill_bytes(&mut bytes);
        Uuid::with_version_bits(bytes, 4)
    }

    /// Generates a new UUIDv7 object.
    pub fn generate_v7(&mut self, sequential: bool) -> Uuid {
        const MAX_UNIX_TS_MS: u64 = (1 << 48) - 1;
        let mut unix_ts_ms = self.time_source.unix_ts_ms() & MAX_UNIX_TS_MS;
        if sequential && unix_ts_ms <= self.last_unix_ts_ms {
            // the field saturates instead of wrapping to the epoch
            unix_ts_ms = (self.last_unix_ts_ms + 1).min(MAX_UNIX_TS_MS);
        }
        self.last_unix_ts_ms = unix_ts_ms;

        let mut bytes = [0u8; 10];
        self.rng.fill_bytes(&mut bytes);
        let rand_a = u16::from_be_bytes([bytes[0], bytes[1]]) & 0x0fff;
        let rand_b = u64::from_be_bytes([
            bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7], bytes[8], bytes[9],
        ]) & ((1 << 62) - 1);
        Uuid::from_fields_v7(unix_ts_ms, rand_a, rand_b)
    }

    fn generate_time_based(
        &mut self,
        version: Version,
        options: &GenerateOptions,
    ) -> Result<(Uuid, GenerationMetadata)> {
        let node = match &options.node {
            Some(text) => parse_node(text)?,
            None => {
                let mut node = [0u8; 6];
                self.rng.fill_bytes(&mut node);
                // multicast bit marks a node that is not a real MAC address
                node[0] |= 0x01;
                node
            }
        };

        let mut cs = [0u8; 2];
        self.rng.fill_bytes(&mut cs);
        let clock_seq = u16::from_be_bytes(cs) & 0x3fff;

        const MAX_TICKS: u64 = (1 << 60) - 1;
        let mut ticks = self
            .time_source
            .unix_ts_ms()
            .saturating_add(GREGORIAN_OFFSET_MS)
            .saturating_mul(10_000)
            & MAX_TICKS;
        if options.sequential && ticks <= self.last_ticks {
            ticks = (self.last_ticks + 1).min(MAX_TICKS);
        }
        self.last_ticks = ticks;

        let uuid = if version == Version::V6 {
            Uuid::from_fields_v6(ticks, clock_seq, node)
        } else {
            Uuid::from_fields_v1(ticks, clock_seq, node)
        };

        // a fixed node leaves only the clock sequence unpredictable
        let entropy_bits = if options.node.is_some() { 14 } else { 47 };
        let mut metadata = GenerationMetadata::new(GenerationMethod::TimeBased, entropy_bits);
        metadata.clock_sequence = Some(clock_seq);
        metadata.node = Some(options.node.clone().unwrap_or_else(|| "random".to_owned()));
        Ok((uuid, metadata))
    }
}

impl GenerationMetadata {
    fn new(method: GenerationMethod, entropy_bits: u32) -> Self {
        Self {
            method,
            namespace: None,
            name: None,
            node: None,
            clock_sequence: None,
            entropy_bits,
        }
    }
}

/// Parses a 48-bit node from 12 hexadecimal digits, ignoring `:` and `-` separators.
pub fn parse_node(text: &str) -> Result<[u8; 6]> {
    let digits: Vec<u8> = text
        .bytes()
        .filter(|c| *c != b':' && *c != b'-')
        .map(|c| (c as char).to_digit(16).map(|d| d as u8))
        .collect::<Option<_>>()
        .ok_or_else(|| Error::InvalidArgument(format!("node '{text}' is not hexadecimal")))?;
    if digits.len() != 12 {
        return Err(Error::InvalidArgument(format!(
            "node '{text}' must have 12 hexadecimal digits"
        )));
    }

    let mut node = [0u8; 6];
    for (e, pair) in node.iter_mut().zip(digits.chunks(2)) {
        *e = (pair[0] << 4) | pair[1];
    }
    Ok(node)
}
