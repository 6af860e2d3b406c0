use std::future::Future;
use std::time::Duration;

use reqwest::multipart::Form;
use tracing::instrument;

use super::{FqeError, SearchQuery, TimeControl};
use crate::config::FqeSettings;

/// Outbound calls to the FQE member pages.
///
/// Both calls hand back the raw body; decoding and scraping happen in the resolver.
pub trait FqeApi {
    /// Posts the member search form and returns the HTML result page.
    fn search_members(
        &self,
        query: &SearchQuery,
    ) -> impl Future<Output = Result<String, FqeError>> + Send;

    /// Fetches the JSON rating history of a member for one time control.
    fn rating_payload(
        &self,
        member_id: u32,
        time_control: TimeControl,
    ) -> impl Future<Output = Result<String, FqeError>> + Send;
}

pub struct FqeClient {
    http: reqwest::Client,
    base_url: String,
}

impl FqeClient {
    pub fn new(settings: &FqeSettings) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn search_url(&self) -> String {
        format!("{}/membres/list-membres.php?c=Qui", self.base_url)
    }

    fn rating_url(&self, member_id: u32, time_control: TimeControl) -> String {
        format!(
            "{}/membres/json-cote.php?id={}&c={}",
            self.base_url,
            member_id,
            time_control.code()
        )
    }
}

async fn read_body(response: reqwest::Response) -> Result<String, FqeError> {
    response
        .text()
        .await
        .map_err(|source| FqeError::ResponseBody { source })
}

impl FqeApi for FqeClient {
    #[instrument(skip(self))]
    async fn search_members(&self, query: &SearchQuery) -> Result<String, FqeError> {
        let form = query
            .form_fields()
            .into_iter()
            .fold(Form::new(), |form, (name, value)| form.text(name, value));

        let response = self
            .http
            .post(self.search_url())
            .multipart(form)
            .send()
            .await
            .map_err(|source| FqeError::Request { source })?;

        tracing::debug!(status = %response.status(), "member search answered");
        read_body(response).await
    }

    #[instrument(skip(self))]
    async fn rating_payload(
        &self,
        member_id: u32,
        time_control: TimeControl,
    ) -> Result<String, FqeError> {
        let response = self
            .http
            .get(self.rating_url(member_id, time_control))
            .send()
            .await
            .map_err(|source| FqeError::Request { source })?;

        tracing::debug!(status = %response.status(), "rating endpoint answered");
        read_body(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> FqeClient {
        let settings = FqeSettings {
            base_url: base_url.to_string(),
            ..FqeSettings::default()
        };
        FqeClient::new(&settings).unwrap()
    }

    #[test]
    fn test_rating_url() {
        let client = client("https://www.fqechecs.qc.ca/");
        assert_eq!(
            client.rating_url(42, TimeControl::SemiRapide),
            "https://www.fqechecs.qc.ca/membres/json-cote.php?id=42&c=2"
        );
    }

    #[test]
    fn test_search_url() {
        let client = client("http://localhost:8080");
        assert_eq!(
            client.search_url(),
            "http://localhost:8080/membres/list-membres.php?c=Qui"
        );
    }
}
