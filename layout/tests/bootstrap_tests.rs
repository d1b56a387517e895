//! End-to-end layout resolution against the in-memory container.

use blobstate_layout::{
    ensure_meta, Corruption, LayoutMeta, ResolutionSource, ResolvedStore, StoreConfig,
    LEGACY_LAYOUT_ENV_VAR, META_KEY,
};
use blobstate_nullables::{NullContainer, NullEnv, Op};
use blobstate_store::{BlobContainer, CancelFlag, StoreError};
use std::time::{Duration, Instant};

struct Case {
    desc: &'static str,
    give: &'static [(&'static str, &'static str)],
    env: &'static [(&'static str, &'static str)],
    want: u64,
}

fn container(blobs: &[(&str, &str)]) -> NullContainer {
    blobs
        .iter()
        .fold(NullContainer::new(), |c, (key, body)| c.with_blob(key, body))
}

fn env(vars: &[(&str, &str)]) -> NullEnv {
    vars.iter().copied().collect()
}

#[test]
fn resolves_layout_version() {
    let cases = [
        // An empty container starts on the current version.
        Case {
            desc: "empty",
            give: &[],
            env: &[],
            want: 1,
        },
        Case {
            desc: "empty/legacy",
            give: &[],
            env: &[(LEGACY_LAYOUT_ENV_VAR, "1")],
            want: 0,
        },
        Case {
            desc: "empty/legacy/true",
            give: &[],
            env: &[(LEGACY_LAYOUT_ENV_VAR, "true")],
            want: 0,
        },
        // "false" is the same as not setting the variable.
        Case {
            desc: "empty/legacy/false",
            give: &[],
            env: &[(LEGACY_LAYOUT_ENV_VAR, "false")],
            want: 1,
        },
        // Existing contents without a record stay on the legacy layout.
        Case {
            desc: "legacy",
            give: &[(".blobstate/stacks/a.json", "{}")],
            env: &[],
            want: 0,
        },
        Case {
            desc: "version 0",
            give: &[(META_KEY, "version: 0")],
            env: &[],
            want: 0,
        },
        Case {
            desc: "version 1",
            give: &[(META_KEY, "version: 1")],
            env: &[],
            want: 1,
        },
        Case {
            desc: "future version",
            give: &[(META_KEY, "version: 42")],
            env: &[],
            want: 42,
        },
        // The record wins over the override.
        Case {
            desc: "version 1/legacy env",
            give: &[(META_KEY, "version: 1")],
            env: &[(LEGACY_LAYOUT_ENV_VAR, "1")],
            want: 1,
        },
        Case {
            desc: "version 42/other keys/legacy env",
            give: &[(META_KEY, "version: 42"), ("other", "x")],
            env: &[(LEGACY_LAYOUT_ENV_VAR, "true")],
            want: 42,
        },
    ];

    for case in cases {
        let c = container(case.give);
        let got = ensure_meta(&c, &env(case.env))
            .unwrap_or_else(|e| panic!("{}: {e}", case.desc));
        assert_eq!(got, LayoutMeta::new(case.want), "{}", case.desc);
        assert!(c.writes().is_empty(), "{}: resolution wrote", case.desc);
    }
}

#[test]
fn corrupt_record_is_reported() {
    let cases = [
        ("empty", "", Corruption::MissingVersion),
        ("other fields", "foo: bar", Corruption::MissingVersion),
        ("corrupt version", "version: foo", Corruption::UnmarshalFailure),
    ];

    for (desc, body, kind) in cases {
        let c = NullContainer::new().with_blob(META_KEY, body);
        let err = ensure_meta(&c, &NullEnv::new()).unwrap_err();
        assert_eq!(err.corruption(), Some(kind), "{desc}");
        assert_eq!(err.key(), Some(META_KEY), "{desc}");
        assert!(
            err.to_string().contains(r#"".blobstate/meta.yaml""#),
            "{desc}: {err}"
        );
    }
}

#[test]
fn corrupt_record_wins_over_legacy_override() {
    let c = NullContainer::new().with_blob(META_KEY, "version: foo");
    let env = NullEnv::new().with(LEGACY_LAYOUT_ENV_VAR, "1");
    let err = ensure_meta(&c, &env).unwrap_err();
    assert_eq!(err.corruption(), Some(Corruption::UnmarshalFailure));
}

#[test]
fn persisted_document_round_trips() {
    for version in [0, 1, 42] {
        // Never empty, so resolution can't pick the current version by itself.
        let c = NullContainer::new().with_blob(".blobstate/foo", "bar");
        let meta = LayoutMeta::new(version);
        meta.write_to(&c).unwrap();

        let got = ensure_meta(&c, &NullEnv::new()).unwrap();
        assert_eq!(got, meta, "version {version}");
    }
}

#[test]
fn persisting_version_zero_writes_nothing() {
    let c = NullContainer::new();
    LayoutMeta::legacy().write_to(&c).unwrap();
    assert!(c.writes().is_empty());
    assert!(!c.exists(META_KEY).unwrap());
}

#[test]
fn persist_overwrites_existing_record() {
    let c = NullContainer::new().with_blob(META_KEY, "version: 1");
    LayoutMeta::new(2).write_to(&c).unwrap();
    assert_eq!(c.read_all(META_KEY).unwrap(), b"version: 2\n");
}

#[test]
fn opening_non_empty_container_does_not_create_record() {
    let c = NullContainer::new().with_blob(".blobstate/foo", "bar");
    let store = ResolvedStore::open(c, &NullEnv::new()).unwrap();
    assert_eq!(store.version(), 0);
    assert_eq!(store.source(), ResolutionSource::ExistingContents);
    assert!(store.container().writes().is_empty());
    assert!(!store.container().exists(META_KEY).unwrap());

    // An explicit persist of the legacy layout is still a no-op.
    store.persist_meta().unwrap();
    assert!(store.container().writes().is_empty());
}

#[test]
fn explicit_persist_makes_layout_sticky() {
    let store = ResolvedStore::open(NullContainer::new(), &NullEnv::new()).unwrap();
    assert_eq!(store.version(), 1);
    store.persist_meta().unwrap();

    let c = store.into_inner();
    c.write_all(".blobstate/stacks/web/dev.json", b"{}").unwrap();
    let env = NullEnv::new().with(LEGACY_LAYOUT_ENV_VAR, "1");
    let reopened = ResolvedStore::open(c, &env).unwrap();
    assert_eq!(reopened.version(), 1);
    assert_eq!(reopened.source(), ResolutionSource::Record);
}

#[test]
fn read_failure_propagates() {
    let c = NullContainer::new();
    c.fail_on(Op::Read);
    let err = ensure_meta(&c, &NullEnv::new()).unwrap_err();
    assert!(err.corruption().is_none());
    assert!(matches!(
        err,
        blobstate_layout::LayoutError::Store(StoreError::Backend(_))
    ));
}

#[test]
fn list_failure_propagates_instead_of_guessing() {
    let c = NullContainer::new();
    c.fail_on(Op::List);
    assert!(ensure_meta(&c, &NullEnv::new()).is_err());

    // The override path never lists, so it still succeeds.
    let env = NullEnv::new().with(LEGACY_LAYOUT_ENV_VAR, "1");
    assert_eq!(ensure_meta(&c, &env).unwrap(), LayoutMeta::legacy());
}

#[test]
fn write_failure_propagates() {
    let c = NullContainer::new();
    c.fail_on(Op::Write);
    assert!(LayoutMeta::current().write_to(&c).is_err());
}

#[test]
fn cancelled_open_fails() {
    let flag = CancelFlag::new();
    flag.cancel();
    let config = StoreConfig {
        cancel: Some(flag),
        ..Default::default()
    };
    let result = ResolvedStore::open_with(NullContainer::new(), &NullEnv::new(), &config);
    assert!(matches!(
        result,
        Err(blobstate_layout::LayoutError::Store(StoreError::Cancelled))
    ));
}

#[test]
fn expired_timeout_fails_open() {
    let config = StoreConfig {
        resolve_timeout_ms: Some(0),
        ..Default::default()
    };
    let c = NullContainer::new().with_blob(".blobstate/foo", "bar");
    let result = ResolvedStore::open_with(c, &NullEnv::new(), &config);
    assert!(matches!(
        result,
        Err(blobstate_layout::LayoutError::Store(StoreError::DeadlineExceeded))
    ));
}

/// A container whose listing blocks for a fixed time.
struct SlowList {
    inner: NullContainer,
    delay: Duration,
}

impl BlobContainer for SlowList {
    fn exists(&self, key: &str) -> Result<bool, StoreError> {
        self.inner.exists(key)
    }

    fn read_all(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        self.inner.read_all(key)
    }

    fn write_all(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        self.inner.write_all(key, bytes)
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        std::thread::sleep(self.delay);
        self.inner.list(prefix)
    }
}

#[test]
fn deadline_passing_during_listing_fails_open() {
    let slow = SlowList {
        inner: NullContainer::new(),
        delay: Duration::from_millis(200),
    };
    let config = StoreConfig {
        resolve_timeout_ms: Some(20),
        ..Default::default()
    };

    let started = Instant::now();
    let result = ResolvedStore::open_with(slow, &NullEnv::new(), &config);
    assert!(started.elapsed() >= Duration::from_millis(200));
    assert!(matches!(
        result,
        Err(blobstate_layout::LayoutError::Store(StoreError::DeadlineExceeded))
    ));
}

#[test]
fn slow_listing_within_deadline_succeeds() {
    let slow = SlowList {
        inner: NullContainer::new(),
        delay: Duration::from_millis(5),
    };
    let config = StoreConfig {
        resolve_timeout_ms: Some(10_000),
        ..Default::default()
    };
    let store = ResolvedStore::open_with(slow, &NullEnv::new(), &config).unwrap();
    assert_eq!(store.meta(), LayoutMeta::current());
}
