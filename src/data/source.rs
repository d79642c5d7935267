//! Where intro track geometries come from.

use crate::animation::path::PathTrack;
use crate::data::geojson::parse_track;
use crate::prelude::HashMap;
use crate::{Error, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

#[async_trait]
pub trait TrackSource: Send + Sync {
    /// Fetches and parses the named track. Any failure is an [`Error::AssetLoad`].
    async fn fetch(&self, name: &str) -> Result<PathTrack>;
}

fn asset_error(name: &str, reason: impl ToString) -> Error {
    Error::AssetLoad {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

/// Tracks held in memory
#[derive(Debug, Clone, Default)]
pub struct StaticTrackSource {
    tracks: HashMap<String, Arc<PathTrack>>,
}

impl StaticTrackSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_track(mut self, track: PathTrack) -> Self {
        self.insert(track);
        self
    }

    pub fn insert(&mut self, track: PathTrack) {
        self.tracks.insert(track.name().to_string(), Arc::new(track));
    }
}

#[async_trait]
impl TrackSource for StaticTrackSource {
    async fn fetch(&self, name: &str) -> Result<PathTrack> {
        self.tracks
            .get(name)
            .map(|track| track.as_ref().clone())
            .ok_or_else(|| asset_error(name, "no such track"))
    }
}

/// Reads `<dir>/<name>.geojson`
#[derive(Debug, Clone)]
pub struct FileTrackSource {
    dir: PathBuf,
}

impl FileTrackSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.geojson", name))
    }
}

#[async_trait]
impl TrackSource for FileTrackSource {
    async fn fetch(&self, name: &str) -> Result<PathTrack> {
        let path = self.path_for(name);
        log::debug!("reading track '{}' from {}", name, path.display());
        let json = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| asset_error(name, format!("{}: {}", path.display(), e)))?;
        parse_track(name, &json).map_err(|e| asset_error(name, e))
    }
}

/// Downloads `<base_url>/<name>.geojson`
#[cfg(feature = "http")]
#[derive(Debug, Clone)]
pub struct HttpTrackSource {
    base_url: String,
    client: reqwest::Client,
}

#[cfg(feature = "http")]
impl HttpTrackSource {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("torchmap/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(30))
            .build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn url_for(&self, name: &str) -> String {
        format!("{}/{}.geojson", self.base_url, name)
    }
}

#[cfg(feature = "http")]
#[async_trait]
impl TrackSource for HttpTrackSource {
    async fn fetch(&self, name: &str) -> Result<PathTrack> {
        let url = self.url_for(name);
        log::debug!("downloading track '{}' from {}", name, url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| asset_error(name, e))?;
        let json = response.text().await.map_err(|e| asset_error(name, e))?;
        parse_track(name, &json).map_err(|e| asset_error(name, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::LatLng;

    #[tokio::test]
    async fn test_static_source() {
        let track = PathTrack::new(
            "greek-line",
            vec![LatLng::new(37.6, 21.6), LatLng::new(38.0, 23.7)],
        )
        .unwrap();
        let source = StaticTrackSource::new().with_track(track.clone());

        assert_eq!(source.fetch("greek-line").await.unwrap(), track);
        assert!(matches!(
            source.fetch("french-line-1").await,
            Err(Error::AssetLoad { .. })
        ));
    }

    #[tokio::test]
    async fn test_file_source_reports_missing_file() {
        let source = FileTrackSource::new("/definitely/not/here");
        assert_eq!(
            source.path_for("greek-line"),
            PathBuf::from("/definitely/not/here/greek-line.geojson")
        );
        match source.fetch("greek-line").await {
            Err(Error::AssetLoad { name, .. }) => assert_eq!(name, "greek-line"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_file_source_reads_geojson() {
        let dir = std::env::temp_dir().join(format!("torchmap-tracks-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("french-line-1.geojson"),
            r#"{ "type": "LineString", "coordinates": [[5.36, 43.29], [9.45, 42.69]] }"#,
        )
        .unwrap();

        let track = FileTrackSource::new(&dir)
            .fetch("french-line-1")
            .await
            .unwrap();
        assert_eq!(track.vertices().len(), 2);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[cfg(feature = "http")]
    #[test]
    fn test_http_urls() {
        let source = HttpTrackSource::new("https://example.org/data/").unwrap();
        assert_eq!(
            source.url_for("greek-line"),
            "https://example.org/data/greek-line.geojson"
        );
    }
}
