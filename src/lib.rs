//! Generation, conversion, validation, and analysis of UUIDs
//!
//! ```rust
//! use uuidkit::{Engine, GenerateRequest, Version};
//!
//! let mut engine = Engine::detect();
//! let item = engine.generate(&GenerateRequest::new(Version::V7))?;
//! println!("{}", item.value); // e.g. "01809424-3e59-7c05-9219-566f82fff672"
//!
//! let analysis = engine.analyze(&item.value)?;
//! println!("{:?}", analysis.security.predictability); // Medium
//! # Ok::<(), uuidkit::Error>(())
//! ```
//!
//! See [RFC 9562](https://www.rfc-editor.org/rfc/rfc9562).
//!
//! # Field and bit layout
//!
//! Every identifier is 16 big-endian bytes split into five canonical groups:
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                           time_low                            |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |           time_mid            |  ver  |        time_hi        |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |var|        clock_seq          |             node              |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                             node                              |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! Where:
//!
//! - The 4-bit `ver` field holds the version number, 1 to 7.
//! - The 2-bit `var` field is set at `10` by every generator in this crate.
//! - Version 1 stores the 60-bit count of 100-nanosecond intervals since 1582-10-15 low field
//!   first across `time_low`, `time_mid`, and `time_hi`, followed by a 14-bit clock sequence
//!   and a 48-bit node.
//! - Version 6 stores the same timestamp most significant bits first so that the string form
//!   sorts by creation time.
//! - Version 7 stores a 48-bit Unix timestamp in milliseconds in the first six bytes and
//!   fills the remaining 74 bits with random data.
//! - Versions 3 and 5 keep 122 bits of an MD5 or SHA-1 digest of a namespace and a name.
//! - Version 4 fills all 122 non-constant bits with random data.
//!
//! # Formats
//!
//! [`Format`] lists the nine representations [`convert_uuid`] writes and
//! [`validate_uuid`] reads back: standard, no-hyphens, uppercase, braces, parentheses,
//! `urn:uuid:`, base64, `0x` hex, and 128-digit binary.
//!
//! # Randomness
//!
//! [`RandomSource::secure`] reads the operating system and fails if it cannot. The seeded
//! [`RandomSource::insecure_fallback`] exists for hosts without one and reports itself as
//! insecure through [`Engine::is_randomness_secure`].

mod id;
pub use id::{Components, ParseError, Uuid, Variant, GREGORIAN_OFFSET_MS};

mod error;
pub use error::{Error, Result};

mod version;
pub use version::{GenerationMethod, Version};

pub mod namespace;
pub use namespace::Namespace;

pub mod generator;
pub use generator::{
    hash_v3, hash_v5, parse_node, GenerateOptions, GenerationMetadata, Generator, RandSource,
    RandomSource, RandomUnavailable, StdSystemTime, TimeSource,
};

mod format;
pub use format::{convert_uuid, detect_format, format_uuid, normalize_uuid, ConvertOptions, Format};

mod validate;
pub use validate::{validate_uuid, ValidationMetadata, ValidationResult};

pub mod analysis;
#[doc(inline)]
pub use analysis::{analyze_uuid, estimate_collision_probability, AnalysisResult, TimingInfo};

mod settings;
pub use settings::{Settings, SettingsPatch};

mod export;
pub use export::{export_uuids, Export, ExportFormat};

pub mod history;
pub mod store;
pub mod telemetry;

mod engine;
pub use engine::{BulkOptions, Engine, GenerateRequest, GeneratedIdentifier, GENERATED_CAPACITY};
