//! vrijeme.hr current-conditions feed: document model and HTTP source.

use serde::Deserialize;
use std::future::Future;
use std::time::Duration;

use crate::error::{NodeError, RefreshError};

/// Current conditions for all Croatian stations.
pub const CROATIA_URL: &str = "https://vrijeme.hr/hrvatska_n.xml";

/// Upper bound on a single fetch.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!(
    env!("CARGO_PKG_NAME"),
    "/",
    env!("CARGO_PKG_VERSION")
);

// ── Document model ──────────────────────────────────────────────────

/// Parsed `<Hrvatska>` document.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedDocument {
    #[serde(rename = "Grad", default)]
    pub cities: Vec<CityRecord>,
}

/// One `<Grad>` record.
#[derive(Debug, Clone, Deserialize)]
pub struct CityRecord {
    #[serde(rename = "GradIme")]
    pub name: String,
    #[serde(rename = "Lat", default)]
    pub latitude: Option<String>,
    #[serde(rename = "Lon", default)]
    pub longitude: Option<String>,
    /// Absent on some stations; only the matched record must carry it.
    #[serde(rename = "Podatci", default)]
    pub data: Option<CityData>,
}

impl CityRecord {
    /// The `<Podatci>` block, or a malformed-document error naming the city.
    pub fn data(&self) -> Result<&CityData, RefreshError> {
        self.data.as_ref().ok_or_else(|| {
            RefreshError::Malformed(format!("{} has no Podatci block", self.name))
        })
    }
}

/// Raw `<Podatci>` sub-fields, untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CityData {
    #[serde(rename = "Temp")]
    pub temperature: Option<String>,
    #[serde(rename = "Vlaga")]
    pub humidity: Option<String>,
    #[serde(rename = "Tlak")]
    pub pressure: Option<String>,
    #[serde(rename = "TlakTend")]
    pub pressure_tendency: Option<String>,
    #[serde(rename = "VjetarSmjer")]
    pub wind_direction: Option<String>,
    #[serde(rename = "VjetarBrzina")]
    pub wind_speed: Option<String>,
    #[serde(rename = "Vrijeme")]
    pub condition: Option<String>,
}

/// Parse a feed body.
///
/// A document without any `<Grad>` record is treated as malformed rather
/// than as a feed that merely lacks the configured city.
pub fn parse_document(xml: &str) -> Result<FeedDocument, RefreshError> {
    let document: FeedDocument = quick_xml::de::from_str(xml)?;
    if document.cities.is_empty() {
        return Err(RefreshError::Malformed(
            "document contains no Grad records".to_string(),
        ));
    }
    Ok(document)
}

impl FeedDocument {
    /// Exact, case-sensitive lookup by upstream city name.
    pub fn find_city(&self, name: &str) -> Option<&CityRecord> {
        self.cities.iter().find(|c| c.name == name)
    }

    /// All city names, sorted and de-duplicated.
    pub fn city_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.cities.iter().map(|c| c.name.clone()).collect();
        names.sort();
        names.dedup();
        names
    }
}

// ── Sources ─────────────────────────────────────────────────────────

/// Where the raw feed body comes from.
///
/// The coordinator talks to this trait rather than to reqwest directly so
/// it can be driven by a mock in tests.
pub trait FeedSource: Send + Sync + 'static {
    fn fetch(&self) -> impl Future<Output = Result<String, RefreshError>> + Send;
}

/// Production source: HTTP GET with a bounded timeout.
#[derive(Debug, Clone)]
pub struct HttpFeed {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl HttpFeed {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, NodeError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| NodeError::Init(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.into(),
            timeout,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn map_error(&self, err: reqwest::Error) -> RefreshError {
        if err.is_timeout() {
            RefreshError::Timeout(self.timeout)
        } else {
            RefreshError::Transport(err.to_string())
        }
    }
}

impl FeedSource for HttpFeed {
    async fn fetch(&self) -> Result<String, RefreshError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| self.map_error(e))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(RefreshError::Status(status.as_u16()));
        }

        response.text().await.map_err(|e| self.map_error(e))
    }
}

/// Fetch the feed once and list the city names it carries.
pub async fn available_cities<S: FeedSource>(source: &S) -> Result<Vec<String>, RefreshError> {
    let body = source.fetch().await?;
    let document = parse_document(&body)?;
    log::debug!("Found {} cities in feed", document.cities.len());
    Ok(document.city_names())
}

// ── MockFeed for testing ────────────────────────────────────────────
