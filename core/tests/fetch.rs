#![allow(missing_docs)]

use std::{collections::HashSet, fs};

use slackmoji::{
    AssetFetcher, AssetSource, EmojiRecord, FetchOutcome, Size,
    errors::{FetchError, SlackmojiError},
};

const PNG: &[u8] = b"\x89PNG\r\n\x1a\n";

/// Serves a fixed body for every URL, except the ones told to fail.
#[derive(Debug, Default)]
struct MockSource {
    requests: Vec<String>,
    failing: HashSet<String>,
}

impl MockSource {
    fn failing(urls: impl IntoIterator<Item = String>) -> Self {
        MockSource {
            requests: Vec::new(),
            failing: urls.into_iter().collect(),
        }
    }
}

impl AssetSource for MockSource {
    fn fetch(&mut self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.requests.push(url.to_owned());
        if self.failing.contains(url) {
            Err(FetchError::transport(url, "simulated network error"))
        } else {
            Ok(PNG.to_vec())
        }
    }
}

fn records() -> Vec<EmojiRecord> {
    vec![
        EmojiRecord::new("snail", "1F40C"),
        EmojiRecord::new("flag-ad", "1F1E6-1F1E9"),
    ]
}

#[test]
fn fetches_everything_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let mut source = MockSource::default();

    let report = AssetFetcher::new(&mut source, dir.path())
        .run(&records())
        .unwrap();

    assert_eq!(report.fetched(), 4);
    assert_eq!(report.skipped(), 0);
    assert_eq!(report.failed(), 0);
    assert_eq!(source.requests, [
        "https://a.slack-edge.com/production-standard-emoji-assets/13.0/google-medium/1f40c.png",
        "https://a.slack-edge.com/production-standard-emoji-assets/13.0/google-large/1f40c.png",
        "https://a.slack-edge.com/production-standard-emoji-assets/13.0/google-medium/1f1e6-1f1e9.png",
        "https://a.slack-edge.com/production-standard-emoji-assets/13.0/google-large/1f1e6-1f1e9.png",
    ]);
    for size in ["medium", "large"] {
        for unified in ["1F40C", "1F1E6-1F1E9"] {
            let path = dir.path().join(size).join(format!("{unified}.png"));
            assert_eq!(fs::read(&path).unwrap(), PNG, "{}", path.display());
        }
    }
}

#[test]
fn second_pass_makes_no_requests() {
    let dir = tempfile::tempdir().unwrap();
    let records = records();

    let mut first = AssetFetcher::new(MockSource::default(), dir.path());
    let report = first.run(&records).unwrap();
    assert_eq!(report.fetched(), 4);

    let mut second = AssetFetcher::new(MockSource::default(), dir.path());
    let report = second.run(&records).unwrap();
    assert_eq!(report.fetched(), 0);
    assert_eq!(report.skipped(), 4);
    assert!(second.into_source().requests.is_empty());
}

#[test]
fn one_failure_does_not_stop_the_rest() {
    let dir = tempfile::tempdir().unwrap();
    let probe = AssetFetcher::new(MockSource::default(), dir.path());
    let snail_medium = probe.target("1F40C", Size::Medium);

    let mut source = MockSource::failing([snail_medium.url.clone()]);
    let report = AssetFetcher::new(&mut source, dir.path())
        .run(&records())
        .unwrap();

    // Every asset was still attempted
    assert_eq!(source.requests.len(), 4);
    assert_eq!(report.fetched(), 3);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.failures()[0].0, snail_medium);
    assert!(!snail_medium.path.exists());
    assert!(dir.path().join("large").join("1F40C.png").is_file());
    assert!(dir.path().join("medium").join("1F1E6-1F1E9.png").is_file());
}

#[test]
fn failed_assets_are_retried_next_pass() {
    let dir = tempfile::tempdir().unwrap();
    let probe = AssetFetcher::new(MockSource::default(), dir.path());
    let snail_large = probe.target("1F40C", Size::Large);

    let source = MockSource::failing([snail_large.url.clone()]);
    AssetFetcher::new(source, dir.path())
        .run(&records())
        .unwrap();

    let mut retry = AssetFetcher::new(MockSource::default(), dir.path());
    let report = retry.run(&records()).unwrap();
    assert_eq!(report.fetched(), 1);
    assert_eq!(report.skipped(), 3);
    assert_eq!(retry.into_source().requests, [snail_large.url]);
}

#[test]
fn bad_unified_fails_only_its_own_assets() {
    let dir = tempfile::tempdir().unwrap();
    let records = [
        EmojiRecord::new("grinning", "1F600"),
        EmojiRecord::new("odd", "1F600 "),
        EmojiRecord::new("snail", "1F40C"),
    ];

    let mut source = MockSource::default();
    let report = AssetFetcher::new(&mut source, dir.path())
        .run(&records)
        .unwrap();

    assert_eq!(report.fetched(), 4);
    assert_eq!(report.failed(), 2);
    assert_eq!(source.requests.len(), 4);
    assert!(source.requests.iter().all(|url| !url.contains(' ')));
    for (target, err) in report.failures() {
        assert_eq!(target.unified, "1F600 ");
        assert!(matches!(err, FetchError::InvalidTarget(_)));
    }
    for size in ["medium", "large"] {
        assert!(dir.path().join(size).join("1F600.png").is_file());
        assert!(dir.path().join(size).join("1F40C.png").is_file());
    }
}

#[test]
fn existing_file_is_skipped_without_request() {
    let dir = tempfile::tempdir().unwrap();
    let mut fetcher = AssetFetcher::new(MockSource::default(), dir.path());
    let target = fetcher.target("1F40C", Size::Medium);
    fs::create_dir_all(target.path.parent().unwrap()).unwrap();
    fs::write(&target.path, b"already here").unwrap();

    let outcome = fetcher.fetch_one(&target).unwrap();
    assert_eq!(outcome, FetchOutcome::Skipped(target.path.clone()));
    assert_eq!(fs::read(&target.path).unwrap(), b"already here");
    assert!(fetcher.into_source().requests.is_empty());
}

#[test]
fn write_failure_is_a_fetch_error() {
    let dir = tempfile::tempdir().unwrap();
    // The size directory doesn't exist and fetch_one doesn't create it
    let mut fetcher = AssetFetcher::new(MockSource::default(), dir.path());
    let target = fetcher.target("1F40C", Size::Medium);

    let err = fetcher.fetch_one(&target).unwrap_err();
    assert!(matches!(err, FetchError::Write { .. }));
    assert!(!target.path.exists());
    assert!(!target.path.with_extension("png.part").exists());
}

#[test]
fn missing_unified_is_fatal_before_any_request() {
    let dir = tempfile::tempdir().unwrap();
    let mut records = records();
    records.push(serde_json::from_str(r#"{"short_name": "nothing"}"#).unwrap());

    let mut source = MockSource::default();
    let result = AssetFetcher::new(&mut source, dir.path()).run(&records);

    assert!(matches!(result, Err(SlackmojiError::MissingField(_))));
    assert!(source.requests.is_empty());
}
