//! REST Countries fetcher.
//!
//! One GET per country (`/alpha/{iso3}`) answering with a single-element
//! array of country objects. There is no time dimension: indicator-style
//! reads lift a numeric field (population, area) into a year-less record,
//! and the profile endpoint gets the full fact sheet.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::instrument;

use crate::config::Config;
use crate::error::SourceError;
use crate::indicator::{CountryProfile, IndicatorRecord, SourceId, YearRange};
use crate::normalize::normalize;

use super::{get_json, IndicatorSource, ProfileFetcher};

/// Fetcher for the REST Countries API.
#[derive(Debug, Clone)]
pub struct RestCountriesSource {
    base_url: String,
    country: String,
    timeout: Duration,
}

impl RestCountriesSource {
    /// Create a fetcher from configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            base_url: config.rest_countries_base_url.trim_end_matches('/').to_string(),
            country: config.country_code.clone(),
            timeout: Duration::from_secs(config.http_timeout_secs),
        }
    }

    fn country_object(body: &Value) -> Result<&Value, SourceError> {
        body.as_array()
            .and_then(|arr| arr.first())
            .filter(|v| v.is_object())
            .ok_or_else(|| SourceError::MalformedPayload {
                source_id: SourceId::RestCountries,
                reason: "expected a single-element country array".to_string(),
            })
    }

    /// Extract the profile fact sheet from one country object.
    fn parse_profile(body: &Value) -> Result<CountryProfile, SourceError> {
        let country = Self::country_object(body)?;

        let name = country
            .get("name")
            .and_then(|n| n.get("common"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let capital = country
            .get("capital")
            .and_then(Value::as_array)
            .and_then(|c| c.first())
            .and_then(Value::as_str)
            .map(str::to_string);

        let languages = country
            .get("languages")
            .and_then(Value::as_object)
            .map(|langs| {
                langs
                    .values()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let currencies = country
            .get("currencies")
            .and_then(Value::as_object)
            .map(|currs| {
                currs
                    .values()
                    .filter_map(|c| c.get("name").and_then(Value::as_str))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(CountryProfile {
            name,
            capital,
            region: country.get("region").and_then(Value::as_str).map(str::to_string),
            subregion: country
                .get("subregion")
                .and_then(Value::as_str)
                .map(str::to_string),
            population: country.get("population").and_then(Value::as_f64),
            area_km2: country.get("area").and_then(Value::as_f64),
            languages,
            currencies,
            flag: country.get("flag").and_then(Value::as_str).map(str::to_string),
        })
    }
}

#[async_trait]
impl IndicatorSource for RestCountriesSource {
    fn id(&self) -> SourceId {
        SourceId::RestCountries
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    #[instrument(skip(self, client), fields(source = "rest_countries"))]
    async fn fetch_indicator(
        &self,
        client: &reqwest::Client,
        code: &str,
        _range: YearRange,
    ) -> Result<Vec<IndicatorRecord>, SourceError> {
        let url = format!("{}/alpha/{}", self.base_url, self.country);
        let body = get_json(client, &url, &[], SourceId::RestCountries, code).await?;

        let country = Self::country_object(&body)?;
        Ok(normalize(code, country, SourceId::RestCountries)
            .into_iter()
            .collect())
    }
}

#[async_trait]
impl ProfileFetcher for RestCountriesSource {
    async fn fetch_profile(&self) -> Result<CountryProfile, SourceError> {
        let client = self.make_client()?;
        let url = format!("{}/alpha/{}", self.base_url, self.country);
        let body = get_json(&client, &url, &[], SourceId::RestCountries, "profile").await?;
        Self::parse_profile(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn uganda_body() -> Value {
        json!([{
            "name": { "common": "Uganda", "official": "Republic of Uganda" },
            "capital": ["Kampala"],
            "region": "Africa",
            "subregion": "Eastern Africa",
            "population": 45741007,
            "area": 241550.0,
            "languages": { "eng": "English", "swa": "Swahili" },
            "currencies": { "UGX": { "name": "Ugandan shilling", "symbol": "Sh" } },
            "flag": "\u{1F1FA}\u{1F1EC}"
        }])
    }

    #[test]
    fn parses_profile() {
        let profile = RestCountriesSource::parse_profile(&uganda_body()).unwrap();
        assert_eq!(profile.name, "Uganda");
        assert_eq!(profile.capital.as_deref(), Some("Kampala"));
        assert_eq!(profile.population, Some(45_741_007.0));
        assert_eq!(profile.area_km2, Some(241_550.0));
        assert_eq!(profile.languages.len(), 2);
        assert_eq!(profile.currencies, vec!["Ugandan shilling".to_string()]);
    }

    #[test]
    fn empty_array_is_malformed() {
        let err = RestCountriesSource::parse_profile(&json!([])).unwrap_err();
        assert!(matches!(err, SourceError::MalformedPayload { .. }));
    }

    #[test]
    fn missing_optional_facts_stay_none() {
        let body = json!([{ "name": { "common": "Uganda" } }]);
        let profile = RestCountriesSource::parse_profile(&body).unwrap();
        assert_eq!(profile.capital, None);
        assert_eq!(profile.population, None);
        assert!(profile.languages.is_empty());
    }
}
