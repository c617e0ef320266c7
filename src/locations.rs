//! Location lookup against the IBGE localidades REST API.
//!
//! Resolves a state to its municipality list. One round trip per call:
//! no caching, no retry — callers decide whether a failed lookup is
//! worth repeating.

use crate::error::LookupError;
use serde::Deserialize;
use std::time::Duration;

/// Default base URL of the localidades API.
pub const DEFAULT_LOOKUP_URL: &str = "https://servicodados.ibge.gov.br/api/v1/localidades";

/// Environment override for the lookup base URL.
pub const LOOKUP_URL_ENV: &str = "CIDADES_LOOKUP_URL";

/// One federative unit, as returned by `/estados/`.
#[derive(Debug, Clone, Deserialize)]
pub struct StateRecord {
    pub id: u32,
    #[serde(rename = "nome")]
    pub name: String,
    /// Two-letter state code ("RO", "SP", ...).
    #[serde(rename = "sigla")]
    pub abbreviation: String,
}

/// One municipality, as returned by `/estados/{uf}/municipios`.
/// Upstream sends more fields; only the name is needed.
#[derive(Debug, Clone, Deserialize)]
pub struct MunicipalityRecord {
    #[serde(rename = "nome")]
    pub name: String,
}

/// Client for the location lookup service.
#[derive(Clone)]
pub struct LocationDirectory {
    client: reqwest::Client,
    base_url: String,
}

impl LocationDirectory {
    /// Create a directory against the given base URL (no trailing slash).
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(concat!("cidades-harvest/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Create a directory using `CIDADES_LOOKUP_URL` or the IBGE default.
    pub fn from_env() -> Self {
        let base = std::env::var(LOOKUP_URL_ENV).unwrap_or_else(|_| DEFAULT_LOOKUP_URL.to_string());
        Self::new(base)
    }

    /// All Brazilian states, in upstream order.
    pub async fn list_states(&self) -> Result<Vec<StateRecord>, LookupError> {
        let url = format!("{}/estados/", self.base_url);
        self.get_json(&url).await
    }

    /// All municipalities of one state, in upstream order.
    pub async fn list_municipalities(
        &self,
        abbreviation: &str,
    ) -> Result<Vec<MunicipalityRecord>, LookupError> {
        let url = format!("{}/estados/{}/municipios", self.base_url, abbreviation);
        self.get_json(&url).await
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, LookupError> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| LookupError::Unavailable(format!("request to {url} failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(LookupError::Unavailable(format!(
                "{url} answered HTTP {status}"
            )));
        }

        resp.json::<T>()
            .await
            .map_err(|e| LookupError::Unavailable(format!("{url} returned unusable data: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn lists_states_from_upstream_records() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/estados/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "id": 11, "nome": "Rondônia", "sigla": "RO" },
                { "id": 12, "nome": "Acre", "sigla": "AC" }
            ])))
            .mount(&server)
            .await;

        let dir = LocationDirectory::new(server.uri());
        let states = dir.list_states().await.unwrap();

        assert_eq!(states.len(), 2);
        assert_eq!(states[0].id, 11);
        assert_eq!(states[0].name, "Rondônia");
        assert_eq!(states[0].abbreviation, "RO");
    }

    #[tokio::test]
    async fn lists_municipalities_ignoring_extra_fields() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/estados/RO/municipios"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "id": 1100205, "nome": "Porto Velho", "microrregiao": { "id": 11006 } },
                { "id": 1100122, "nome": "Ji-Paraná" }
            ])))
            .mount(&server)
            .await;

        let dir = LocationDirectory::new(server.uri());
        let munis = dir.list_municipalities("RO").await.unwrap();

        let names: Vec<_> = munis.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["Porto Velho", "Ji-Paraná"]);
    }

    #[tokio::test]
    async fn http_error_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/estados/"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let dir = LocationDirectory::new(server.uri());
        let err = dir.list_states().await.unwrap_err();
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn malformed_body_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/estados/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let dir = LocationDirectory::new(server.uri());
        assert!(dir.list_states().await.is_err());
    }
}
