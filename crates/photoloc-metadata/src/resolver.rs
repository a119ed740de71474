// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Metadata resolver: decide how to reach the bytes behind an
// `ImageReference` and parse them.
//
// Strategies run in order until one parses. A strategy that does not apply
// to the reference, or that fails, is recorded and skipped. Only when all
// of them fail is the image reported as unreadable.

use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::sync::Arc;

use photoloc_bridge::{NativeContentResolver, RowSelection};
use photoloc_core::config::ResolverConfig;
use photoloc_core::error::{PhotolocError, ResolutionError, StrategyAttempt};
use photoloc_core::types::{ExifMetadata, ImageReference};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::exif;

/// Prefix and suffix of the scratch copy made by [`TempCopy`].
pub const TEMP_PREFIX: &str = "temp_image_";
pub const TEMP_SUFFIX: &str = ".jpg";

/// Why a single strategy produced nothing. Never fatal on its own.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StrategyError {
    #[error("not applicable to this reference")]
    NotApplicable,

    #[error("{0}")]
    Failed(String),
}

impl From<PhotolocError> for StrategyError {
    fn from(err: PhotolocError) -> Self {
        Self::Failed(err.to_string())
    }
}

impl From<io::Error> for StrategyError {
    fn from(err: io::Error) -> Self {
        Self::Failed(err.to_string())
    }
}

/// One way of getting at an image's metadata.
pub trait ResolveStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn attempt(&self, reference: &ImageReference) -> Result<ExifMetadata, StrategyError>;
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Ordered strategy chain.
pub struct MetadataResolver {
    strategies: Vec<Box<dyn ResolveStrategy>>,
}

impl MetadataResolver {
    pub fn new(strategies: Vec<Box<dyn ResolveStrategy>>) -> Self {
        Self { strategies }
    }

    /// Direct path, provider path, temporary copy, in-memory stream.
    pub fn with_default_strategies<C>(content: Arc<C>, temp_dir: PathBuf, max_stream_bytes: u64) -> Self
    where
        C: ?Sized + NativeContentResolver + Send + Sync + 'static,
    {
        Self::new(vec![
            Box::new(DirectPath),
            Box::new(ProviderPath::new(Arc::clone(&content))),
            Box::new(TempCopy::new(Arc::clone(&content), temp_dir, max_stream_bytes)),
            Box::new(Stream::new(content, max_stream_bytes)),
        ])
    }

    /// Default chain; `config.temp_dir` overrides the platform cache dir.
    pub fn from_config<C>(content: Arc<C>, config: &ResolverConfig, cache_dir: PathBuf) -> Self
    where
        C: ?Sized + NativeContentResolver + Send + Sync + 'static,
    {
        let temp_dir = config.temp_dir.clone().unwrap_or(cache_dir);
        Self::with_default_strategies(content, temp_dir, config.max_stream_bytes)
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Run the chain. A readable photo without GPS is `Ok` with no location.
    #[instrument(skip_all, fields(reference = %reference))]
    pub fn resolve(&self, reference: &ImageReference) -> Result<ExifMetadata, ResolutionError> {
        let mut attempts = Vec::with_capacity(self.strategies.len());

        for strategy in &self.strategies {
            match strategy.attempt(reference) {
                Ok(metadata) => {
                    info!(
                        strategy = strategy.name(),
                        has_location = metadata.has_location(),
                        "metadata resolved"
                    );
                    return Ok(metadata);
                }
                Err(StrategyError::NotApplicable) => {
                    debug!(strategy = strategy.name(), "strategy not applicable");
                    attempts.push(StrategyAttempt {
                        strategy: strategy.name(),
                        reason: StrategyError::NotApplicable.to_string(),
                    });
                }
                Err(StrategyError::Failed(reason)) => {
                    warn!(strategy = strategy.name(), %reason, "strategy failed");
                    attempts.push(StrategyAttempt {
                        strategy: strategy.name(),
                        reason,
                    });
                }
            }
        }

        warn!(attempts = attempts.len(), "image unreadable");
        Err(ResolutionError::Unreadable { attempts })
    }
}

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

/// `file://` references: parse the local path.
pub struct DirectPath;

impl ResolveStrategy for DirectPath {
    fn name(&self) -> &'static str {
        "direct-path"
    }

    fn attempt(&self, reference: &ImageReference) -> Result<ExifMetadata, StrategyError> {
        if !reference.is_file() {
            return Err(StrategyError::NotApplicable);
        }
        let path = reference
            .to_file_path()
            .ok_or_else(|| StrategyError::Failed("file reference has no local path".into()))?;
        Ok(exif::read_from_path(path)?)
    }
}

/// `content://` references: ask the provider for the backing file path.
pub struct ProviderPath<C: ?Sized> {
    content: Arc<C>,
}

impl<C: ?Sized + NativeContentResolver> ProviderPath<C> {
    pub fn new(content: Arc<C>) -> Self {
        Self { content }
    }

    /// `_data` for the reference itself, then for its media-table row if it
    /// is a document reference.
    fn filesystem_path(&self, reference: &ImageReference) -> Option<String> {
        match self.content.query_data_path(reference.as_str(), None) {
            Ok(Some(path)) if !path.is_empty() => return Some(path),
            Ok(_) => {}
            Err(e) => debug!(error = %e, "provider path query failed"),
        }

        let document = reference.document_id()?;
        let Some(table) = document.media_table() else {
            debug!(kind = %document.kind, "document kind has no media table");
            return None;
        };
        debug!(kind = %document.kind, id = %document.id, "re-querying media table");

        let selection = RowSelection::by_id(document.id);
        match self
            .content
            .query_data_path(table.content_uri(), Some(&selection))
        {
            Ok(path) => path.filter(|p| !p.is_empty()),
            Err(e) => {
                debug!(error = %e, "media table query failed");
                None
            }
        }
    }
}

impl<C: ?Sized + NativeContentResolver + Send + Sync> ResolveStrategy for ProviderPath<C> {
    fn name(&self) -> &'static str {
        "provider-path"
    }

    fn attempt(&self, reference: &ImageReference) -> Result<ExifMetadata, StrategyError> {
        if !reference.is_content() {
            return Err(StrategyError::NotApplicable);
        }
        let path = self
            .filesystem_path(reference)
            .ok_or_else(|| StrategyError::Failed("provider exposes no filesystem path".into()))?;
        debug!(%path, "provider path resolved");
        Ok(exif::read_from_path(path)?)
    }
}

/// Copy the stream into a scratch file and parse that.
///
/// The copy is a `NamedTempFile`, removed when it goes out of scope on
/// every exit path. Copies larger than `max_bytes` are abandoned.
pub struct TempCopy<C: ?Sized> {
    content: Arc<C>,
    temp_dir: PathBuf,
    max_bytes: u64,
}

impl<C: ?Sized + NativeContentResolver> TempCopy<C> {
    pub fn new(content: Arc<C>, temp_dir: PathBuf, max_bytes: u64) -> Self {
        Self {
            content,
            temp_dir,
            max_bytes,
        }
    }
}

impl<C: ?Sized + NativeContentResolver + Send + Sync> ResolveStrategy for TempCopy<C> {
    fn name(&self) -> &'static str {
        "temp-copy"
    }

    fn attempt(&self, reference: &ImageReference) -> Result<ExifMetadata, StrategyError> {
        let input = self.content.open_input_stream(reference.as_str())?;
        let mut temp = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(TEMP_SUFFIX)
            .tempfile_in(&self.temp_dir)?;

        let copied = io::copy(
            &mut input.take(self.max_bytes.saturating_add(1)),
            temp.as_file_mut(),
        )?;
        if copied > self.max_bytes {
            return Err(StrategyError::Failed(format!(
                "stream exceeds {} bytes",
                self.max_bytes
            )));
        }
        temp.as_file_mut().flush()?;
        debug!(bytes = copied, path = %temp.path().display(), "stream copied");

        let result = exif::read_from_path(temp.path());
        if let Err(e) = temp.close() {
            warn!(error = %e, "could not remove temporary copy");
        }
        Ok(result?)
    }
}

/// Read the stream into memory and parse from there.
pub struct Stream<C: ?Sized> {
    content: Arc<C>,
    max_bytes: u64,
}

impl<C: ?Sized + NativeContentResolver> Stream<C> {
    pub fn new(content: Arc<C>, max_bytes: u64) -> Self {
        Self { content, max_bytes }
    }
}

impl<C: ?Sized + NativeContentResolver + Send + Sync> ResolveStrategy for Stream<C> {
    fn name(&self) -> &'static str {
        "stream"
    }

    fn attempt(&self, reference: &ImageReference) -> Result<ExifMetadata, StrategyError> {
        let input = self.content.open_input_stream(reference.as_str())?;
        let mut buffer = Vec::new();
        input
            .take(self.max_bytes.saturating_add(1))
            .read_to_end(&mut buffer)?;
        if buffer.len() as u64 > self.max_bytes {
            return Err(StrategyError::Failed(format!(
                "stream exceeds {} bytes",
                self.max_bytes
            )));
        }
        Ok(exif::read_from_bytes(&buffer)?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use photoloc_bridge::fake::FakeBridge;

    use super::*;
    use crate::fixtures::*;

    const MEDIA_URI: &str = "content://media/external/images/media/42";

    fn reference(uri: &str) -> ImageReference {
        ImageReference::parse(uri).unwrap()
    }

    fn default_resolver(bridge: Arc<FakeBridge>, temp_dir: PathBuf) -> MetadataResolver {
        MetadataResolver::with_default_strategies(bridge, temp_dir, 1024 * 1024)
    }

    fn leftover_files(dir: &std::path::Path) -> Vec<PathBuf> {
        std::fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect()
    }

    /// Scripted strategy that records how often it ran.
    struct Scripted {
        name: &'static str,
        outcome: Result<ExifMetadata, StrategyError>,
        calls: Arc<Mutex<Vec<&'static str>>>,
    }

    impl ResolveStrategy for Scripted {
        fn name(&self) -> &'static str {
            self.name
        }

        fn attempt(&self, _reference: &ImageReference) -> Result<ExifMetadata, StrategyError> {
            self.calls.lock().unwrap().push(self.name);
            self.outcome.clone()
        }
    }

    #[test]
    fn first_successful_strategy_wins() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let expected = ExifMetadata {
            make: Some("Nikon".into()),
            ..Default::default()
        };
        let scripted = |name: &'static str,
                        outcome: Result<ExifMetadata, StrategyError>|
         -> Box<dyn ResolveStrategy> {
            Box::new(Scripted {
                name,
                outcome,
                calls: Arc::clone(&calls),
            })
        };
        let resolver = MetadataResolver::new(vec![
            scripted("one", Err(StrategyError::NotApplicable)),
            scripted("two", Err(StrategyError::Failed("boom".into()))),
            scripted("three", Ok(expected.clone())),
            scripted("four", Ok(ExifMetadata::default())),
        ]);

        let metadata = resolver.resolve(&reference(MEDIA_URI)).unwrap();
        assert_eq!(metadata, expected);
        assert_eq!(*calls.lock().unwrap(), vec!["one", "two", "three"]);
    }

    #[test]
    fn all_failures_are_reported_in_order() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let resolver = MetadataResolver::new(vec![
            Box::new(Scripted {
                name: "one",
                outcome: Err(StrategyError::NotApplicable),
                calls: Arc::clone(&calls),
            }),
            Box::new(Scripted {
                name: "two",
                outcome: Err(StrategyError::Failed("revoked".into())),
                calls,
            }),
        ]);

        let ResolutionError::Unreadable { attempts } =
            resolver.resolve(&reference(MEDIA_URI)).unwrap_err();
        assert_eq!(attempts.len(), 2);
        assert_eq!(attempts[0].strategy, "one");
        assert_eq!(attempts[1].reason, "revoked");
    }

    #[test]
    fn default_chain_order() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = default_resolver(Arc::new(FakeBridge::new()), dir.path().into());
        assert_eq!(
            resolver.strategy_names(),
            vec!["direct-path", "provider-path", "temp-copy", "stream"]
        );
    }

    #[test]
    fn file_reference_reads_directly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.jpg");
        std::fs::write(&path, tagged_jpeg(48.8584, 2.2945)).unwrap();
        let bridge = Arc::new(FakeBridge::new());

        let resolver = default_resolver(Arc::clone(&bridge), dir.path().into());
        let metadata = resolver
            .resolve(&ImageReference::from_file_path(&path).unwrap())
            .unwrap();

        assert!(metadata.has_location());
        assert!(bridge.stream_opens().is_empty());
    }

    #[test]
    fn provider_path_avoids_streaming() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("IMG_0042.jpg");
        std::fs::write(&path, tagged_jpeg(35.6762, 139.6503)).unwrap();
        let bridge = Arc::new(FakeBridge::new().with_data_path(
            MEDIA_URI,
            None,
            path.to_string_lossy(),
        ));

        let resolver = default_resolver(Arc::clone(&bridge), dir.path().into());
        let metadata = resolver.resolve(&reference(MEDIA_URI)).unwrap();

        assert_eq!(metadata.make.as_deref(), Some(FIXTURE_MAKE));
        assert!(bridge.stream_opens().is_empty());
    }

    #[test]
    fn document_reference_requeries_media_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("IMG_1234.jpg");
        std::fs::write(&path, tagged_jpeg(-22.9068, -43.1729)).unwrap();
        let document = "content://com.android.providers.media.documents/document/image%3A1234";
        let bridge = Arc::new(FakeBridge::new().with_data_path(
            "content://media/external/images/media",
            Some(RowSelection::by_id("1234")),
            path.to_string_lossy(),
        ));

        let resolver = default_resolver(Arc::clone(&bridge), dir.path().into());
        let metadata = resolver.resolve(&reference(document)).unwrap();

        assert!(metadata.latitude().unwrap() < 0.0);
        assert!(bridge.stream_opens().is_empty());
    }

    #[test]
    fn failing_provider_query_falls_through_to_temp_copy() {
        let cache = tempfile::tempdir().unwrap();
        let bridge = Arc::new(
            FakeBridge::new()
                .with_failing_query(MEDIA_URI)
                .with_stream(MEDIA_URI, tagged_jpeg(1.0, 1.0)),
        );

        let resolver = default_resolver(Arc::clone(&bridge), cache.path().into());
        let metadata = resolver.resolve(&reference(MEDIA_URI)).unwrap();

        assert!(metadata.has_location());
        assert_eq!(bridge.stream_opens(), vec![MEDIA_URI.to_string()]);
    }

    #[test]
    fn temp_copy_is_removed_after_success() {
        let cache = tempfile::tempdir().unwrap();
        let bridge = Arc::new(FakeBridge::new().with_stream(MEDIA_URI, tagged_jpeg(10.0, 20.0)));

        let resolver = default_resolver(bridge, cache.path().into());
        resolver.resolve(&reference(MEDIA_URI)).unwrap();

        assert!(leftover_files(cache.path()).is_empty());
    }

    #[test]
    fn temp_copy_is_removed_after_parse_failure() {
        let cache = tempfile::tempdir().unwrap();
        let bridge =
            Arc::new(FakeBridge::new().with_stream(MEDIA_URI, b"not an image at all".to_vec()));

        let resolver = default_resolver(bridge, cache.path().into());
        assert!(resolver.resolve(&reference(MEDIA_URI)).is_err());

        assert!(leftover_files(cache.path()).is_empty());
    }

    #[test]
    fn temp_copy_is_removed_when_stream_breaks_mid_copy() {
        let cache = tempfile::tempdir().unwrap();
        let bridge =
            Arc::new(FakeBridge::new().with_broken_stream(MEDIA_URI, tagged_jpeg(1.0, 2.0), 64));

        let resolver = default_resolver(bridge, cache.path().into());
        let ResolutionError::Unreadable { attempts } =
            resolver.resolve(&reference(MEDIA_URI)).unwrap_err();

        assert_eq!(attempts.len(), 4);
        assert!(leftover_files(cache.path()).is_empty());
    }

    #[test]
    fn stream_strategy_covers_unusable_cache_dir() {
        let cache = tempfile::tempdir().unwrap();
        let missing = cache.path().join("does-not-exist");
        let bridge = Arc::new(FakeBridge::new().with_stream(MEDIA_URI, tagged_jpeg(5.0, 6.0)));

        let resolver = default_resolver(Arc::clone(&bridge), missing);
        let metadata = resolver.resolve(&reference(MEDIA_URI)).unwrap();

        assert!(metadata.has_location());
        // temp-copy opened it once, stream opened it again
        assert_eq!(bridge.stream_opens().len(), 2);
    }

    #[test]
    fn oversized_stream_is_refused() {
        let bridge = Arc::new(FakeBridge::new().with_stream(MEDIA_URI, tagged_jpeg(5.0, 6.0)));
        let stream = Stream::new(bridge, 16);
        assert!(matches!(
            stream.attempt(&reference(MEDIA_URI)),
            Err(StrategyError::Failed(reason)) if reason.contains("exceeds")
        ));
    }

    #[test]
    fn endless_stream_is_cut_off_at_the_limit() {
        let cache = tempfile::tempdir().unwrap();
        let bridge = Arc::new(FakeBridge::new().with_endless_stream(MEDIA_URI));

        let resolver = MetadataResolver::with_default_strategies(bridge, cache.path().into(), 64 * 1024);
        let ResolutionError::Unreadable { attempts } = resolver.resolve(&reference(MEDIA_URI)).unwrap_err();

        let capped: Vec<_> = attempts
            .iter()
            .filter(|a| a.reason.contains("exceeds 65536 bytes"))
            .map(|a| a.strategy)
            .collect();
        assert_eq!(capped, vec!["temp-copy", "stream"]);
        assert!(leftover_files(cache.path()).is_empty());
    }

    #[test]
    fn readable_photo_without_gps_is_ok() {
        let cache = tempfile::tempdir().unwrap();
        let bridge = Arc::new(FakeBridge::new().with_stream(MEDIA_URI, untagged_location_jpeg()));

        let resolver = default_resolver(bridge, cache.path().into());
        let metadata = resolver.resolve(&reference(MEDIA_URI)).unwrap();

        assert!(metadata.location.is_none());
        assert_eq!(metadata.datetime.as_deref(), Some(FIXTURE_DATETIME));
    }

    #[test]
    fn config_temp_dir_overrides_cache_dir() {
        let cache = tempfile::tempdir().unwrap();
        let override_dir = tempfile::tempdir().unwrap();
        let config = ResolverConfig {
            temp_dir: Some(override_dir.path().to_path_buf()),
            ..Default::default()
        };
        let bridge = Arc::new(FakeBridge::new().with_stream(MEDIA_URI, plain_jpeg()));

        let resolver =
            MetadataResolver::from_config(Arc::clone(&bridge), &config, cache.path().join("missing"));
        resolver.resolve(&reference(MEDIA_URI)).unwrap();

        // temp-copy succeeded in the override dir, so the stream fallback never ran
        assert_eq!(bridge.stream_opens().len(), 1);
        assert!(leftover_files(override_dir.path()).is_empty());
    }
}
