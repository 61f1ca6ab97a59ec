//! Dataset fetching for the education and topology payloads.

use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, error, info};

use crate::data::topology::Topology;
use crate::domain::{DataSource, EducationRecord};
use crate::error::AppError;

pub const DEFAULT_EDUCATION_URL: &str =
    "https://cdn.freecodecamp.org/testable-projects-fcc/data/choropleth_map/for_user_education.json";
pub const DEFAULT_TOPOLOGY_URL: &str =
    "https://cdn.freecodecamp.org/testable-projects-fcc/data/choropleth_map/counties.json";

const ENV_EDUCATION: &str = "CHORO_EDUCATION_URL";
const ENV_TOPOLOGY: &str = "CHORO_TOPOLOGY_URL";

/// Both sources, resolved from CLI flags, environment, or built-in defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sources {
    pub education: DataSource,
    pub topology: DataSource,
}

impl Sources {
    /// Resolve sources: explicit flag > env var (`.env` honored) > default URL.
    pub fn resolve(education: Option<&str>, topology: Option<&str>) -> Self {
        dotenvy::dotenv().ok();
        Self {
            education: pick_source(education, std::env::var(ENV_EDUCATION).ok(), DEFAULT_EDUCATION_URL),
            topology: pick_source(topology, std::env::var(ENV_TOPOLOGY).ok(), DEFAULT_TOPOLOGY_URL),
        }
    }
}

fn pick_source(flag: Option<&str>, env: Option<String>, default: &str) -> DataSource {
    let raw = flag
        .map(str::to_string)
        .or_else(|| env.filter(|v| !v.trim().is_empty()))
        .unwrap_or_else(|| default.to_string());
    DataSource::parse(&raw)
}

/// The two payloads the renderer needs.
#[derive(Debug, Clone)]
pub struct Payloads {
    pub records: Vec<EducationRecord>,
    pub topology: Topology,
}

pub struct DatasetClient {
    client: Client,
}

impl Default for DatasetClient {
    fn default() -> Self {
        Self::new()
    }
}

impl DatasetClient {
    pub fn new() -> Self {
        Self { client: Client::new() }
    }

    pub fn fetch_education(&self, source: &DataSource) -> Result<Vec<EducationRecord>, AppError> {
        let records: Vec<EducationRecord> = self.fetch_json(source, "education")?;
        info!(count = records.len(), %source, "loaded education records");
        Ok(records)
    }

    pub fn fetch_topology(&self, source: &DataSource) -> Result<Topology, AppError> {
        let topology: Topology = self.fetch_json(source, "topology")?;
        info!(arcs = topology.arcs.len(), objects = topology.objects.len(), %source, "loaded topology");
        Ok(topology)
    }

    /// Fetch both payloads concurrently; succeeds only when both do.
    pub fn fetch_all(&self, sources: &Sources) -> Result<Payloads, AppError> {
        let (records, topology) = rayon::join(
            || self.fetch_education(&sources.education),
            || self.fetch_topology(&sources.topology),
        );
        Ok(Payloads {
            records: records?,
            topology: topology?,
        })
    }

    fn fetch_json<T: DeserializeOwned>(&self, source: &DataSource, label: &str) -> Result<T, AppError> {
        let result = match source {
            DataSource::Remote(url) => self.fetch_remote(url, label),
            DataSource::Local(path) => {
                debug!(path = %path.display(), "reading {label} from disk");
                std::fs::read_to_string(path)
                    .map_err(|e| AppError::fetch(format!("Failed to read {label} file '{}': {e}", path.display())))
                    .and_then(|body| parse_json(&body, label))
            }
        };
        if let Err(err) = &result {
            error!(%source, "{label} fetch failed: {err}");
        }
        result
    }

    fn fetch_remote<T: DeserializeOwned>(&self, url: &str, label: &str) -> Result<T, AppError> {
        debug!(url, "requesting {label}");
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| AppError::fetch(format!("{label} request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::fetch(format!(
                "{label} request failed with status {}.",
                resp.status()
            )));
        }

        resp.json()
            .map_err(|e| AppError::fetch(format!("Failed to parse {label} response: {e}")))
    }
}

/// Parse a JSON payload, mapping failures to `FetchFailure`.
pub fn parse_json<T: DeserializeOwned>(body: &str, label: &str) -> Result<T, AppError> {
    serde_json::from_str(body).map_err(|e| AppError::fetch(format!("Invalid {label} JSON: {e}")))
}
