use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
};

use log::{debug, info, warn};

use crate::{
    EmojiRecord, Size, codepoints,
    errors::{FetchError, SlackmojiError, WriteError},
    record::UNIFIED,
};

/// Where Slack serves its standard emoji artwork from. Images live at
/// `<base>/google-<size>/<unified, lowercased>.png`.
pub const DEFAULT_BASE_URL: &str =
    "https://a.slack-edge.com/production-standard-emoji-assets/13.0";

/// Something that can download an asset.
///
/// [`HttpSource`] is the real thing; tests can supply their own.
pub trait AssetSource {
    /// Download `url`, returning the response body.
    ///
    /// Anything other than a successful (2xx) response must be an error.
    fn fetch(&mut self, url: &str) -> Result<Vec<u8>, FetchError>;
}

impl<S: AssetSource + ?Sized> AssetSource for &mut S {
    fn fetch(&mut self, url: &str) -> Result<Vec<u8>, FetchError> {
        (**self).fetch(url)
    }
}

/// Downloads assets over HTTP(S) with [`minreq`], one blocking request at a
/// time.
#[cfg(feature = "http")]
#[cfg_attr(docsrs, doc(cfg(feature = "http")))]
#[derive(Debug, Clone)]
pub struct HttpSource {
    timeout_secs: u64,
}

#[cfg(feature = "http")]
impl HttpSource {
    /// How long a request may take before it counts as failed.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Create a source with the default timeout.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_timeout(Self::DEFAULT_TIMEOUT_SECS)
    }

    /// Create a source with a custom per-request timeout, in seconds.
    #[must_use]
    pub const fn with_timeout(timeout_secs: u64) -> Self {
        HttpSource { timeout_secs }
    }
}

#[cfg(feature = "http")]
impl Default for HttpSource {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "http")]
impl AssetSource for HttpSource {
    fn fetch(&mut self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = minreq::get(url)
            .with_timeout(self.timeout_secs)
            .send()
            .map_err(|err| FetchError::transport(url, err))?;
        if !(200..300).contains(&response.status_code) {
            return Err(FetchError::Status {
                url: url.to_owned(),
                status: response.status_code,
            });
        }
        Ok(response.into_bytes())
    }
}

/// One image the fetcher is responsible for.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct AssetTarget {
    /// Which size set it belongs to.
    pub size: Size,
    /// The record's `unified` value, as written in the input.
    pub unified: String,
    /// Where it's saved: `<out_dir>/<size>/<unified>.png`.
    pub path: PathBuf,
    /// Where it's downloaded from.
    pub url: String,
}

/// What happened to an [`AssetTarget`] that didn't fail.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum FetchOutcome {
    /// The file was already there, no request was made.
    Skipped(PathBuf),
    /// The file was downloaded and saved.
    Fetched(PathBuf),
}

impl FetchOutcome {
    /// The local path of the asset.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            FetchOutcome::Skipped(path) | FetchOutcome::Fetched(path) => path,
        }
    }
}

/// Summary of a fetch pass.
#[derive(Debug, Default)]
pub struct FetchReport {
    fetched: usize,
    skipped: usize,
    failures: Vec<(AssetTarget, FetchError)>,
}

impl FetchReport {
    /// How many assets were downloaded.
    #[inline]
    #[must_use]
    pub const fn fetched(&self) -> usize {
        self.fetched
    }

    /// How many assets already existed.
    #[inline]
    #[must_use]
    pub const fn skipped(&self) -> usize {
        self.skipped
    }

    /// How many assets couldn't be fetched.
    #[inline]
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Every asset that couldn't be fetched, and why, in the order they were
    /// attempted.
    #[inline]
    #[must_use]
    pub fn failures(&self) -> &[(AssetTarget, FetchError)] {
        &self.failures
    }

    /// How many assets the pass covered.
    #[inline]
    #[must_use]
    pub fn total(&self) -> usize {
        self.fetched + self.skipped + self.failed()
    }

    fn push(
        &mut self,
        target: AssetTarget,
        result: Result<FetchOutcome, FetchError>,
    ) {
        match result {
            Ok(FetchOutcome::Fetched(_)) => self.fetched += 1,
            Ok(FetchOutcome::Skipped(_)) => self.skipped += 1,
            Err(err) => {
                warn!("failed to download {}: {err}", target.url);
                self.failures.push((target, err));
            },
        }
    }
}

impl fmt::Display for FetchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} assets: {} fetched, {} already present, {} failed",
            self.total(),
            self.fetched,
            self.skipped,
            self.failed(),
        )
    }
}

/// Makes sure every emoji has a local image in every [`Size`], downloading
/// whatever is missing.
///
/// Assets that already exist are never requested again, so an interrupted or
/// partially failed pass can simply be re-run. Requests are made one at a
/// time, in input order (each record's medium image, then its large one).
#[derive(Debug)]
pub struct AssetFetcher<S> {
    source: S,
    out_dir: PathBuf,
    base_url: String,
}

impl<S: AssetSource> AssetFetcher<S> {
    /// Create a fetcher saving into `<out_dir>/<size>/`, downloading from
    /// [`DEFAULT_BASE_URL`].
    pub fn new(source: S, out_dir: impl Into<PathBuf>) -> Self {
        AssetFetcher {
            source,
            out_dir: out_dir.into(),
            base_url: DEFAULT_BASE_URL.to_owned(),
        }
    }

    /// Download from somewhere other than [`DEFAULT_BASE_URL`].
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        self.base_url = base_url.trim_end_matches('/').to_owned();
        self
    }

    /// Give back the [`AssetSource`].
    pub fn into_source(self) -> S {
        self.source
    }

    /// Work out where the `size` image for `unified` lives, locally and
    /// remotely.
    pub fn target(&self, unified: &str, size: Size) -> AssetTarget {
        AssetTarget {
            size,
            unified: unified.to_owned(),
            path: self
                .out_dir
                .join(size.as_str())
                .join(format!("{unified}.png")),
            url: format!(
                "{}/google-{size}/{}.png",
                self.base_url,
                unified.to_lowercase(),
            ),
        }
    }

    /// List every asset for `records`, in the order they'd be fetched.
    ///
    /// Fails if any record lacks `unified`. Whether each `unified` is usable
    /// as a file name is checked per asset by [`AssetFetcher::fetch_one`].
    pub fn plan<'r>(
        &self,
        records: impl IntoIterator<Item = &'r EmojiRecord>,
    ) -> Result<Vec<AssetTarget>, SlackmojiError> {
        records
            .into_iter()
            .enumerate()
            .try_fold(
                Vec::new(),
                |mut targets, (position, record)| -> Result<_, SlackmojiError> {
                    let unified = record.require(UNIFIED, position)?;
                    targets.extend(
                        Size::ALL
                            .iter()
                            .map(|&size| self.target(unified, size)),
                    );
                    Ok(targets)
                },
            )
    }

    /// Make sure a single asset exists, downloading it if it doesn't.
    ///
    /// The download is written next to its destination first and renamed
    /// into place, so a failed write never leaves a truncated image behind
    /// for the next pass to skip.
    ///
    /// A `unified` that isn't hyphen-separated hex is refused with
    /// [`FetchError::InvalidTarget`] before the filesystem or the network is
    /// touched, as it's used as a file name.
    pub fn fetch_one(
        &mut self,
        target: &AssetTarget,
    ) -> Result<FetchOutcome, FetchError> {
        codepoints::validate(&target.unified)?;

        if target.path.is_file() {
            debug!("{} already present", target.path.display());
            return Ok(FetchOutcome::Skipped(target.path.clone()));
        }

        info!("{}", target.url);
        let bytes = self.source.fetch(&target.url)?;

        let partial = target.path.with_extension("png.part");
        fs::write(&partial, &bytes)
            .and_then(|()| fs::rename(&partial, &target.path))
            .map_err(|source| {
                if let Err(cleanup) = fs::remove_file(&partial)
                    && cleanup.kind() != io::ErrorKind::NotFound
                {
                    debug!(
                        "failed to remove {}: {cleanup}",
                        partial.display(),
                    );
                }
                FetchError::Write {
                    path: target.path.clone(),
                    source,
                }
            })?;
        Ok(FetchOutcome::Fetched(target.path.clone()))
    }

    /// Fetch everything missing for `records`.
    ///
    /// Only a record without `unified` or an uncreatable output directory
    /// stops the pass. Any other failure (a bad `unified`, a failed download
    /// or write) is logged and recorded in the [`FetchReport`], and the pass
    /// moves on to the next asset.
    pub fn run<'r>(
        &mut self,
        records: impl IntoIterator<Item = &'r EmojiRecord>,
    ) -> Result<FetchReport, SlackmojiError> {
        let targets = self.plan(records)?;

        Size::ALL.iter().try_for_each(|size| {
            let dir = self.out_dir.join(size.as_str());
            fs::create_dir_all(&dir).map_err(|io_err| WriteError(dir, io_err))
        })?;

        let report = targets.into_iter().fold(
            FetchReport::default(),
            |mut report, target| {
                let result = self.fetch_one(&target);
                report.push(target, result);
                report
            },
        );
        info!("{report}");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Offline;

    impl AssetSource for Offline {
        fn fetch(&mut self, url: &str) -> Result<Vec<u8>, FetchError> {
            Err(FetchError::transport(url, "offline"))
        }
    }

    #[test]
    fn urls_are_lowercase_paths_are_not() {
        let fetcher = AssetFetcher::new(Offline, "out");
        let target = fetcher.target("1F1E6-1F1FF", Size::Large);
        assert_eq!(
            target.url,
            "https://a.slack-edge.com/production-standard-emoji-assets/13.0/\
             google-large/1f1e6-1f1ff.png",
        );
        assert_eq!(
            target.path,
            Path::new("out").join("large").join("1F1E6-1F1FF.png"),
        );
    }

    #[test]
    fn base_url_trailing_slash_is_ignored() {
        let fetcher = AssetFetcher::new(Offline, "out")
            .with_base_url("http://localhost:8080/emoji/");
        assert_eq!(
            fetcher.target("1F600", Size::Medium).url,
            "http://localhost:8080/emoji/google-medium/1f600.png",
        );
    }

    #[test]
    fn plan_is_record_major() {
        let records =
            [EmojiRecord::new("a", "1F600"), EmojiRecord::new("b", "1F601")];
        let fetcher = AssetFetcher::new(Offline, "out");
        let plan: Vec<_> = fetcher
            .plan(&records)
            .unwrap()
            .into_iter()
            .map(|target| (target.unified, target.size))
            .collect();
        assert_eq!(plan, [
            ("1F600".to_owned(), Size::Medium),
            ("1F600".to_owned(), Size::Large),
            ("1F601".to_owned(), Size::Medium),
            ("1F601".to_owned(), Size::Large),
        ]);
    }

    #[test]
    fn path_like_unified_is_refused_without_touching_anything() {
        let dir = tempfile::tempdir().unwrap();
        let records = [EmojiRecord::new("evil", "../../etc/passwd")];
        let mut fetcher = AssetFetcher::new(Offline, dir.path());
        let targets = fetcher.plan(&records).unwrap();
        assert_eq!(targets.len(), 2);

        // Offline would report a transport error if it were ever asked
        for target in &targets {
            assert!(matches!(
                fetcher.fetch_one(target),
                Err(FetchError::InvalidTarget(err))
                    if err.token() == "../../etc/passwd"
            ));
        }
    }

    #[test]
    fn report_summary() {
        let mut report = FetchReport::default();
        let fetcher = AssetFetcher::new(Offline, "out");
        let target = fetcher.target("1F600", Size::Medium);
        report.push(
            target.clone(),
            Ok(FetchOutcome::Fetched(target.path.clone())),
        );
        report.push(
            target.clone(),
            Ok(FetchOutcome::Skipped(target.path.clone())),
        );
        report.push(
            target.clone(),
            Err(FetchError::transport(&target.url, "offline")),
        );
        assert_eq!(
            report.to_string(),
            "3 assets: 1 fetched, 1 already present, 1 failed",
        );
        assert_eq!(report.failures()[0].0, target);
    }
}
