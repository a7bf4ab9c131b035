use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;

use super::*;
use crate::generator::with_rand08::Adapter;
use crate::store::FileStore;
use crate::telemetry::TelemetryError;
use crate::{hash_v5, SettingsPatch};

type TestEngine = Engine<Adapter<ChaCha12Rng>>;

fn engine() -> TestEngine {
    Engine::new(Generator::with_rand08(ChaCha12Rng::seed_from_u64(42)))
}

/// A store whose contents stay inspectable after it moves into an engine.
#[derive(Clone, Default)]
struct SharedStore(Rc<RefCell<MemoryStore>>);

impl Store for SharedStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.0.borrow().get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.0.borrow_mut().set(key, value)
    }

    fn clear(&mut self, key: &str) -> Result<(), StoreError> {
        self.0.borrow_mut().clear(key)
    }
}

struct FailingStore;

impl Store for FailingStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::Unavailable("quota exceeded".into()))
    }

    fn set(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("quota exceeded".into()))
    }

    fn clear(&mut self, _key: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("quota exceeded".into()))
    }
}

#[derive(Clone, Default)]
struct RecordingSink(Rc<RefCell<Vec<(String, Properties)>>>);

impl RecordingSink {
    fn names(&self) -> Vec<String> {
        self.0.borrow().iter().map(|(name, _)| name.clone()).collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &str, properties: &Properties) -> Result<(), TelemetryError> {
        self.0
            .borrow_mut()
            .push((event.to_owned(), properties.clone()));
        Ok(())
    }
}

struct FailingSink;

impl EventSink for FailingSink {
    fn emit(&mut self, event: &str, _properties: &Properties) -> Result<(), TelemetryError> {
        Err(TelemetryError {
            event: event.to_owned(),
            reason: "collector offline".to_owned(),
        })
    }
}

/// Generates distinct valid values in bulk
#[test]
fn generates_distinct_valid_values_in_bulk() {
    let mut e = engine();
    let items = e
        .generate_bulk(&BulkOptions {
            count: Some(5),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(items.len(), 5);
    let distinct: HashSet<_> = items.iter().map(|e| e.uuid).collect();
    assert_eq!(distinct.len(), 5);
    for item in &items {
        assert!(item.is_valid);
        assert!(validate_uuid(&item.value).is_valid);
        assert_eq!(item.version, Version::V4);
        assert_eq!(item.format, Format::Standard);
    }

    // five item records plus one aggregate
    assert_eq!(e.history().len(), 6);
    let aggregate = e.history().iter().next().unwrap();
    assert_eq!(aggregate.count, 5);
    assert_eq!(
        aggregate.output,
        Output::Many(items.iter().map(|e| e.value.clone()).collect())
    );
    assert_eq!(e.generated().count(), 5);
}

/// Refuses bulk requests above the cap before generating anything
#[test]
fn refuses_bulk_requests_above_the_cap_before_generating_anything() {
    let mut e = engine();
    let result = e.generate_bulk(&BulkOptions {
        count: Some(1001),
        ..Default::default()
    });
    assert_eq!(
        result.unwrap_err(),
        Error::LimitExceeded {
            requested: 1001,
            limit: 1000
        }
    );
    assert_eq!(e.generated().count(), 0);
    assert_eq!(e.history().len(), 1);
    assert!(!e.history().iter().next().unwrap().success);
    assert!(e.last_error().is_some());

    e.clear_error();
    assert!(e.last_error().is_none());
    assert_eq!(
        e.generate_bulk(&BulkOptions {
            count: Some(1000),
            ..Default::default()
        })
        .unwrap()
        .len(),
        1000
    );
}

/// Refuses bulk requests for zero values
#[test]
fn refuses_bulk_requests_for_zero_values() {
    let mut e = engine();
    let result = e.generate_bulk(&BulkOptions {
        count: Some(0),
        ..Default::default()
    });
    assert!(matches!(result, Err(Error::InvalidArgument(_))));
    assert_eq!(e.generated().count(), 0);
    assert_eq!(e.history().len(), 1);
    let record = e.history().iter().next().unwrap();
    assert!(!record.success);
    assert_eq!(record.count, 0);
    assert!(e.last_error().is_some());
}

/// Names bulk name-based items after the prefix
#[test]
fn names_bulk_name_based_items_after_the_prefix() {
    let mut e = engine();
    let items = e
        .generate_bulk(&BulkOptions {
            count: Some(3),
            version: Some(Version::V5),
            namespace: Some("DNS".into()),
            name_prefix: Some("host".into()),
            ..Default::default()
        })
        .unwrap();
    for (i, item) in items.iter().enumerate() {
        let name = format!("host_{}", i + 1);
        assert_eq!(item.uuid, hash_v5(&namespace::DNS.uuid, name.as_bytes()));
        assert_eq!(item.metadata.name.as_deref(), Some(name.as_str()));
    }
}

/// Stops bulk generation at the first failure
#[test]
fn stops_bulk_generation_at_the_first_failure() {
    let mut e = engine();
    let result = e.generate_bulk(&BulkOptions {
        count: Some(3),
        version: Some(Version::V3),
        namespace: Some("DNS".into()),
        ..Default::default()
    });
    assert!(matches!(result, Err(Error::InvalidArgument(_))));
    assert_eq!(e.generated().count(), 0);
    assert_eq!(e.history().len(), 1);
}

/// Fills unset request fields from the settings
#[test]
fn fills_unset_request_fields_from_the_settings() {
    let mut e = engine();
    e.update_settings(&SettingsPatch {
        default_version: Some(Version::V1),
        default_format: Some(Format::Urn),
        custom_node: Some("00:c0:4f:d4:30:c8".into()),
        show_metadata: Some(false),
        include_timestamp: Some(false),
        ..Default::default()
    })
    .unwrap();

    let item = e.generate(&GenerateRequest::default()).unwrap();
    assert_eq!(item.version, Version::V1);
    assert_eq!(item.format, Format::Urn);
    assert!(item.value.starts_with("urn:uuid:"));
    assert!(item.value.ends_with("-00c04fd430c8"));
    assert!(item.is_valid);
    assert!(item.components.is_none());
    assert!(item.timestamp.is_none());

    let item = e
        .generate(&GenerateRequest {
            format: Some(Format::Braces),
            node: Some("0123456789ab".into()),
            ..Default::default()
        })
        .unwrap();
    assert!(item.value.ends_with("-0123456789ab}"));
}

/// Keeps the newest hundred generated values
#[test]
fn keeps_the_newest_hundred_generated_values() {
    let mut e = engine();
    let mut last = None;
    for _ in 0..150 {
        last = Some(e.generate(&GenerateRequest::new(Version::V7)).unwrap());
    }
    assert_eq!(e.generated().count(), GENERATED_CAPACITY);
    assert_eq!(e.generated().next(), last.as_ref());
    let ids: HashSet<_> = e.generated().map(|e| e.id.clone()).collect();
    assert_eq!(ids.len(), GENERATED_CAPACITY);
}

/// Caps history at the configured limit
#[test]
fn caps_history_at_the_configured_limit() {
    let mut e = engine();
    e.update_settings(&SettingsPatch {
        history_limit: Some(3),
        ..Default::default()
    })
    .unwrap();
    for _ in 0..5 {
        e.generate(&GenerateRequest::default()).unwrap();
    }
    assert_eq!(e.history().len(), 3);

    e.clear_history();
    assert!(e.history().is_empty());
}

/// Persists the trimmed history when the limit shrinks
#[test]
fn persists_the_trimmed_history_when_the_limit_shrinks() {
    let store = SharedStore::default();
    let mut e = engine().with_store(store.clone());
    for _ in 0..5 {
        e.generate(&GenerateRequest::default()).unwrap();
    }
    e.update_settings(&SettingsPatch {
        history_limit: Some(2),
        ..Default::default()
    })
    .unwrap();

    let stored = store.get(HISTORY_KEY).unwrap().unwrap();
    let records: Vec<HistoryRecord> = serde_json::from_str(&stored).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records, e.history().iter().cloned().collect::<Vec<_>>());
}

/// Records validation, conversion, and analysis
#[test]
fn records_validation_conversion_and_analysis() {
    let mut e = engine();
    let valid = e.validate("{6BA7B810-9DAD-11D1-80B4-00C04FD430C8}");
    assert!(valid.is_valid);
    let record = e.history().iter().next().unwrap().clone();
    assert_eq!(record.operation, Operation::Validate);
    assert_eq!(record.output, Output::One("Valid v1 UUID".into()));
    assert_eq!(record.format, Some(Format::Braces));
    assert!(record.success);

    let invalid = e.validate("nope");
    assert!(!invalid.is_valid);
    let record = e.history().iter().next().unwrap().clone();
    assert!(!record.success);
    assert_eq!(record.error.as_deref(), Some("Invalid UUID format"));

    let converted = e
        .convert(
            "6ba7b810-9dad-11d1-80b4-00c04fd430c8",
            &ConvertOptions::new(Format::Hex),
        )
        .unwrap();
    assert_eq!(converted, "0x6ba7b8109dad11d180b400c04fd430c8");
    assert_eq!(
        e.history().iter().next().unwrap().operation,
        Operation::Convert
    );

    let analysis = e.analyze(&converted).unwrap();
    assert_eq!(analysis.version, 1);
    assert_eq!(e.history().len(), 4);
}

/// Records failed conversions and analyses
#[test]
fn records_failed_conversions_and_analyses() {
    let mut e = engine();
    let err = e
        .convert("garbage", &ConvertOptions::new(Format::Urn))
        .unwrap_err();
    assert!(matches!(err, Error::InvalidIdentifier(_)));
    let record = e.history().iter().next().unwrap().clone();
    assert_eq!(record.operation, Operation::Convert);
    assert_eq!(record.input.as_deref(), Some("garbage"));
    assert!(!record.success);
    assert_eq!(record.error, Some(err.to_string()));
    assert_eq!(e.last_error(), Some(err.to_string().as_str()));

    assert!(e.analyze("").is_err());
    assert_eq!(
        e.history().iter().next().unwrap().operation,
        Operation::Analyze
    );
}

/// De-duplicates favorites by canonical value
#[test]
fn deduplicates_favorites_by_canonical_value() {
    let mut e = engine();
    assert!(e.add_favorite("6ba7b810-9dad-11d1-80b4-00c04fd430c8").unwrap());
    assert!(!e.add_favorite("{6BA7B810-9DAD-11D1-80B4-00C04FD430C8}").unwrap());
    assert!(!e.add_favorite("a6e4EJ2tEdGAtADAT9QwyA==").unwrap());
    assert!(e.add_favorite("urn:uuid:886313e1-3b8a-5372-9b90-0c9aee199e5d").unwrap());
    assert_eq!(
        e.favorites(),
        [
            "6ba7b810-9dad-11d1-80b4-00c04fd430c8",
            "886313e1-3b8a-5372-9b90-0c9aee199e5d"
        ]
    );

    assert!(e.remove_favorite("0x6ba7b8109dad11d180b400c04fd430c8").unwrap());
    assert!(!e.remove_favorite("6ba7b810-9dad-11d1-80b4-00c04fd430c8").unwrap());
    assert_eq!(e.favorites().len(), 1);

    assert!(matches!(e.add_favorite("nope"), Err(Error::InvalidIdentifier(_))));
}

/// Restores settings, history, and favorites from the store
#[test]
fn restores_settings_history_and_favorites_from_the_store() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut e = engine().with_store(FileStore::new(dir.path()));
        e.update_settings(&SettingsPatch {
            default_version: Some(Version::V6),
            export_format: Some(ExportFormat::Txt),
            history_limit: Some(2),
            ..Default::default()
        })
        .unwrap();
        for _ in 0..3 {
            e.generate(&GenerateRequest::default()).unwrap();
        }
        e.add_favorite("886313e1-3b8a-5372-9b90-0c9aee199e5d").unwrap();
        assert!(e.last_error().is_none());
    }

    let mut e = engine().with_store(FileStore::new(dir.path()));
    e.load();
    assert_eq!(e.settings().default_version, Version::V6);
    assert_eq!(e.settings().export_format, ExportFormat::Txt);
    assert_eq!(e.history().len(), 2);
    assert_eq!(e.favorites(), ["886313e1-3b8a-5372-9b90-0c9aee199e5d"]);
    assert!(e.last_error().is_none());

    let item = e.generate(&GenerateRequest::default()).unwrap();
    assert_eq!(item.version, Version::V6);
}

/// Ignores unreadable stored state
#[test]
fn ignores_unreadable_stored_state() {
    let store = SharedStore::default();
    let mut writer = store.clone();
    writer.set(SETTINGS_KEY, "{not json").unwrap();
    writer.set(FAVORITES_KEY, "[\"886313e1-3b8a-5372-9b90-0c9aee199e5d\"]").unwrap();

    let mut e = engine().with_store(store);
    e.load();
    assert_eq!(*e.settings(), Settings::default());
    assert_eq!(e.favorites().len(), 1);
    assert!(e.last_error().unwrap().contains(SETTINGS_KEY));
}

/// Survives store failures and reports them through the status
#[test]
fn survives_store_failures_and_reports_them_through_the_status() {
    let mut e = engine().with_store(FailingStore);
    e.load();
    assert!(e.last_error().is_some());
    e.clear_error();

    let item = e.generate(&GenerateRequest::default()).unwrap();
    assert!(item.is_valid);
    assert_eq!(e.history().len(), 1);
    assert!(e.last_error().unwrap().contains("quota exceeded"));

    e.clear_error();
    assert!(e.add_favorite(&item.value).unwrap());
    assert!(e.last_error().is_some());
}

/// Emits one event per public operation
#[test]
fn emits_one_event_per_public_operation() {
    let sink = RecordingSink::default();
    let mut e = engine().with_sink(sink.clone());
    let item = e.generate(&GenerateRequest::new(Version::V4)).unwrap();
    e.generate_bulk(&BulkOptions {
        count: Some(2),
        ..Default::default()
    })
    .unwrap();
    e.validate(&item.value);
    e.convert(&item.value, &ConvertOptions::new(Format::Base64)).unwrap();
    e.analyze(&item.value).unwrap();
    e.add_favorite(&item.value).unwrap();
    e.remove_favorite(&item.value).unwrap();
    e.export(&[item.value.clone()], None).unwrap();
    e.update_settings(&SettingsPatch {
        auto_validate: Some(false),
        ..Default::default()
    })
    .unwrap();
    e.clear_history();

    assert_eq!(
        sink.names(),
        [
            "uuid_generated",
            "uuid_generated",
            "uuid_generated",
            "bulk_uuid_generated",
            "uuid_validated",
            "uuid_converted",
            "uuid_analyzed",
            "uuid_favorited",
            "uuid_unfavorited",
            "uuids_exported",
            "settings_updated",
            "history_cleared",
        ]
    );

    let events = sink.0.borrow();
    assert_eq!(events[0].1["version"], 4);
    assert_eq!(events[0].1["method"], "random");
    assert_eq!(events[3].1["count"], 2);
    assert_eq!(events[5].1["targetFormat"], "base64");
    assert_eq!(events[9].1["format"], "json");
    assert_eq!(events[10].1["changes"], serde_json::json!(["autoValidate"]));
}

/// Survives sink failures and reports them through the status
#[test]
fn survives_sink_failures_and_reports_them_through_the_status() {
    let mut e = engine().with_sink(FailingSink);
    assert!(e.generate(&GenerateRequest::default()).is_ok());
    assert!(e.last_error().unwrap().contains("collector offline"));
}

/// Exports in the configured format by default
#[test]
fn exports_in_the_configured_format_by_default() {
    let mut e = engine();
    let values = vec!["6ba7b810-9dad-11d1-80b4-00c04fd430c8".to_owned()];
    assert_eq!(e.export(&values, None).unwrap().format, ExportFormat::Json);
    e.update_settings(&SettingsPatch {
        export_format: Some(ExportFormat::Csv),
        ..Default::default()
    })
    .unwrap();
    let export = e.export(&values, None).unwrap();
    assert_eq!(export.content, "UUID\n6ba7b810-9dad-11d1-80b4-00c04fd430c8");
    assert_eq!(
        e.export(&values, Some(ExportFormat::Txt)).unwrap().content,
        values[0]
    );
}

/// Rejects invalid settings without changing anything
#[test]
fn rejects_invalid_settings_without_changing_anything() {
    let mut e = engine();
    let err = e
        .update_settings(&SettingsPatch {
            max_bulk_generation: Some(0),
            ..Default::default()
        })
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
    assert_eq!(*e.settings(), Settings::default());
}

/// Reports the security of the random source
#[test]
fn reports_the_security_of_the_random_source() {
    assert!(engine().is_randomness_secure());
    let insecure = Engine::new(Generator::new(RandomSource::insecure_fallback(9)));
    assert!(!insecure.is_randomness_secure());
    assert_eq!(insecure.standard_namespaces().len(), 4);
    assert_eq!(insecure.standard_namespaces()[0].name, "DNS");
}
