//! Feed client for the earthquake and plate boundary GeoJSON documents.
//!
//! Provides async HTTP access via reqwest with rustls for TLS.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::errors::QuakemapError;
use crate::models::FeatureCollection;

/// User agent string for feed requests.
const USER_AGENT: &str = concat!("quakemap/", env!("CARGO_PKG_VERSION"));

/// USGS base URL for earthquake feeds.
const USGS_BASE_URL: &str = "https://earthquake.usgs.gov";

/// PB2002 plate boundaries (Bird, 2003) as GeoJSON.
pub const DEFAULT_PLATES_URL: &str =
    "https://raw.githubusercontent.com/fraxen/tectonicplates/master/GeoJSON/PB2002_boundaries.json";

/// Available feed types for summary feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedType {
    AllHour,
    AllDay,
    #[default]
    AllWeek,
    AllMonth,
    Mag1Hour,
    Mag1Day,
    Mag1Week,
    Mag1Month,
    Mag25Hour,
    Mag25Day,
    Mag25Week,
    Mag25Month,
    Mag45Hour,
    Mag45Day,
    Mag45Week,
    Mag45Month,
    SignificantHour,
    SignificantDay,
    SignificantWeek,
    SignificantMonth,
}

impl FeedType {
    /// Get the URL path segment for this feed type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AllHour => "all_hour",
            Self::AllDay => "all_day",
            Self::AllWeek => "all_week",
            Self::AllMonth => "all_month",
            Self::Mag1Hour => "1.0_hour",
            Self::Mag1Day => "1.0_day",
            Self::Mag1Week => "1.0_week",
            Self::Mag1Month => "1.0_month",
            Self::Mag25Hour => "2.5_hour",
            Self::Mag25Day => "2.5_day",
            Self::Mag25Week => "2.5_week",
            Self::Mag25Month => "2.5_month",
            Self::Mag45Hour => "4.5_hour",
            Self::Mag45Day => "4.5_day",
            Self::Mag45Week => "4.5_week",
            Self::Mag45Month => "4.5_month",
            Self::SignificantHour => "significant_hour",
            Self::SignificantDay => "significant_day",
            Self::SignificantWeek => "significant_week",
            Self::SignificantMonth => "significant_month",
        }
    }

    /// Full GeoJSON summary URL for this feed.
    #[must_use]
    pub fn url(self) -> String {
        format!(
            "{USGS_BASE_URL}/earthquakes/feed/v1.0/summary/{}.geojson",
            self.as_str()
        )
    }
}

impl std::str::FromStr for FeedType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all_hour" => Ok(Self::AllHour),
            "all_day" => Ok(Self::AllDay),
            "all_week" => Ok(Self::AllWeek),
            "all_month" => Ok(Self::AllMonth),
            "1.0_hour" => Ok(Self::Mag1Hour),
            "1.0_day" => Ok(Self::Mag1Day),
            "1.0_week" => Ok(Self::Mag1Week),
            "1.0_month" => Ok(Self::Mag1Month),
            "2.5_hour" => Ok(Self::Mag25Hour),
            "2.5_day" => Ok(Self::Mag25Day),
            "2.5_week" => Ok(Self::Mag25Week),
            "2.5_month" => Ok(Self::Mag25Month),
            "4.5_hour" => Ok(Self::Mag45Hour),
            "4.5_day" => Ok(Self::Mag45Day),
            "4.5_week" => Ok(Self::Mag45Week),
            "4.5_month" => Ok(Self::Mag45Month),
            "significant_hour" => Ok(Self::SignificantHour),
            "significant_day" => Ok(Self::SignificantDay),
            "significant_week" => Ok(Self::SignificantWeek),
            "significant_month" => Ok(Self::SignificantMonth),
            _ => Err(format!("unknown feed type: {s}")),
        }
    }
}

/// Source of the two GeoJSON documents the pipeline consumes.
pub trait FeedSource {
    /// Fetch and structurally validate the earthquake feed.
    fn fetch_earthquakes(&self) -> impl Future<Output = Result<FeatureCollection, QuakemapError>>;

    /// Fetch the plate boundary document. The content is not inspected.
    fn fetch_plates(&self) -> impl Future<Output = Result<Value, QuakemapError>>;
}

/// HTTP client for the feed endpoints.
pub struct FeedClient {
    client: Client,
    earthquake_url: String,
    plates_url: String,
}

impl FeedClient {
    /// Create a new feed client.
    ///
    /// Without a `timeout` requests wait as long as the server keeps the
    /// connection open.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(
        earthquake_url: impl Into<String>,
        plates_url: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, QuakemapError> {
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            earthquake_url: earthquake_url.into(),
            plates_url: plates_url.into(),
        })
    }

    /// GET a URL and decode the body as JSON.
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, QuakemapError> {
        debug!("fetching {}", url);

        let response = self.client.get(url).send().await?;

        // Check status before parsing
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(QuakemapError::Api {
                url: url.to_string(),
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

impl FeedSource for FeedClient {
    #[instrument(skip(self), fields(url = %self.earthquake_url))]
    async fn fetch_earthquakes(&self) -> Result<FeatureCollection, QuakemapError> {
        let feed: FeatureCollection = self.get_json(&self.earthquake_url).await?;

        // Validate response structure
        feed.validate()?;

        if let Some(metadata) = &feed.metadata {
            debug!(
                title = metadata.title.as_deref().unwrap_or("untitled"),
                generated = ?metadata.generated_at(),
                count = ?metadata.count,
                "feed metadata"
            );
        }
        debug!("fetched {} features", feed.features.len());
        Ok(feed)
    }

    #[instrument(skip(self), fields(url = %self.plates_url))]
    async fn fetch_plates(&self) -> Result<Value, QuakemapError> {
        let plates: Value = self.get_json(&self.plates_url).await?;
        debug!("fetched plate boundaries");
        Ok(plates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response on a local port and return its URL.
    async fn serve_once(response: String) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.expect("accept");
            let mut request = [0u8; 4096];
            let _ = socket.read(&mut request).await;
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        });
        format!("http://{addr}/feed.geojson")
    }

    fn http_response(status: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
    }

    fn client_for(url: &str) -> FeedClient {
        FeedClient::new(url, url, Some(Duration::from_secs(5))).expect("client")
    }

    #[test]
    fn test_feed_type_round_trip() {
        let types = [
            FeedType::AllWeek,
            FeedType::Mag25Day,
            FeedType::SignificantWeek,
        ];

        for feed_type in types {
            let s = feed_type.as_str();
            let parsed: FeedType = s.parse().expect("failed to parse");
            assert_eq!(parsed, feed_type);
        }
        assert!("all_year".parse::<FeedType>().is_err());
    }

    #[test]
    fn test_default_feed_url() {
        assert_eq!(
            FeedType::default().url(),
            "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/all_week.geojson"
        );
    }

    #[tokio::test]
    async fn test_unreachable_host_is_http_error() {
        // Port 9 (discard) on localhost is not expected to serve HTTP.
        let client = FeedClient::new(
            "http://127.0.0.1:9/feed.geojson",
            DEFAULT_PLATES_URL,
            Some(Duration::from_secs(2)),
        )
        .expect("client");
        let err = client.fetch_earthquakes().await.unwrap_err();
        assert!(matches!(err, QuakemapError::Http(_)));
    }

    #[tokio::test]
    async fn test_error_status_is_api_error() {
        let url = serve_once(http_response("503 Service Unavailable", "busy")).await;
        let err = client_for(&url).fetch_earthquakes().await.unwrap_err();
        match err {
            QuakemapError::Api { status, message, .. } => {
                assert_eq!(status, 503);
                assert_eq!(message, "busy");
            }
            other => panic!("expected API error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_json_body_is_parse_error() {
        let url = serve_once(http_response("200 OK", "not json")).await;
        let err = client_for(&url).fetch_plates().await.unwrap_err();
        assert!(matches!(err, QuakemapError::Parse(_)));
    }

    #[tokio::test]
    async fn test_fetches_feed_over_http() {
        let body = r#"{"type": "FeatureCollection", "features": [
            {"id": 17, "properties": {"mag": 2.5}, "geometry": {"coordinates": [1, 2, 3]}}
        ]}"#;
        let url = serve_once(http_response("200 OK", body)).await;
        let feed = client_for(&url).fetch_earthquakes().await.expect("feed");
        assert_eq!(feed.features.len(), 1);
        assert_eq!(feed.events().next().expect("event").expect("valid").id, "17");
    }
}
