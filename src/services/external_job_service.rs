use reqwest::Client;
use serde::{Deserialize, Deserializer};
use serde_json::json;

use crate::dto::job_dto::{ExternalJob, ExternalJobQuery};
use crate::error::{Error, Result};

const JOOBLE_API: &str = "https://jooble.org/api";

/// Jooble sends some text fields as numbers or null.
fn deserialize_text_flexible<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TextOrNumber {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Option::<TextOrNumber>::deserialize(deserializer)? {
        Some(TextOrNumber::Text(s)) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Some(TextOrNumber::Int(i)) => Some(i.to_string()),
        Some(TextOrNumber::Float(f)) => Some(f.to_string()),
        None => None,
    })
}

#[derive(Debug, Clone, Deserialize)]
struct JoobleResponse {
    #[serde(default)]
    jobs: Vec<JoobleJob>,
}

#[derive(Debug, Clone, Deserialize)]
struct JoobleJob {
    title: String,
    #[serde(default, deserialize_with = "deserialize_text_flexible")]
    company: Option<String>,
    #[serde(default, deserialize_with = "deserialize_text_flexible")]
    location: Option<String>,
    #[serde(default, deserialize_with = "deserialize_text_flexible")]
    salary: Option<String>,
    #[serde(default, deserialize_with = "deserialize_text_flexible")]
    snippet: Option<String>,
    link: String,
    #[serde(default, deserialize_with = "deserialize_text_flexible")]
    updated: Option<String>,
}

impl From<JoobleJob> for ExternalJob {
    fn from(job: JoobleJob) -> Self {
        Self {
            title: job.title,
            company: job.company,
            location: job.location,
            salary: job.salary,
            snippet: job.snippet,
            link: job.link,
            updated: job.updated,
            source: "jooble".to_string(),
        }
    }
}

#[derive(Clone)]
pub struct ExternalJobService {
    client: Client,
    api_key: Option<String>,
}

impl ExternalJobService {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
        }
    }

    pub async fn search(&self, query: ExternalJobQuery) -> Result<Vec<ExternalJob>> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| Error::ServiceUnavailable("External job search is not configured".into()))?;

        let body = json!({
            "keywords": query.keywords.unwrap_or_default(),
            "location": query.location.unwrap_or_default(),
            "page": query.page.unwrap_or(1).max(1).to_string(),
        });
        let response = self
            .client
            .post(format!("{}/{}", JOOBLE_API, key))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::warn!(%status, "external job search failed");
            return Err(Error::Upstream(format!("job search returned {}", status)));
        }

        let parsed: JoobleResponse = response
            .json()
            .await
            .map_err(|e| Error::Upstream(format!("unreadable job search response: {}", e)))?;
        Ok(parsed.jobs.into_iter().map(ExternalJob::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jooble_payload_maps_to_external_jobs() {
        let raw = r#"{
            "totalCount": 1,
            "jobs": [{
                "title": "Rust Engineer",
                "location": "Berlin",
                "snippet": "Build services",
                "salary": "",
                "source": "example.com",
                "type": "Full-time",
                "link": "https://jooble.org/desc/1",
                "company": "Acme",
                "updated": "2026-10-01T00:00:00.0000000",
                "id": 42
            }]
        }"#;
        let parsed: JoobleResponse = serde_json::from_str(raw).unwrap();
        let jobs: Vec<ExternalJob> = parsed.jobs.into_iter().map(ExternalJob::from).collect();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].company.as_deref(), Some("Acme"));
        assert_eq!(jobs[0].salary, None);
        assert_eq!(jobs[0].source, "jooble");
    }

    #[tokio::test]
    async fn missing_key_is_unavailable() {
        let err = ExternalJobService::new(None)
            .search(ExternalJobQuery::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ServiceUnavailable(_)));
    }
}
