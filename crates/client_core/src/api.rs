//! HTTP access to the allocation server.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::Submission,
    error::ApiError,
    protocol::{
        Acknowledgement, CalculateBody, SubmissionsResponse, SubmitRequest, CALCULATE_ROUTE,
        RESET_ROUTE, SUBMISSIONS_ROUTE, SUBMIT_ROUTE,
    },
};
use tracing::debug;
use url::Url;

use crate::error::ClientError;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[async_trait]
pub trait RentApi: Send + Sync {
    async fn list_submissions(&self) -> Result<Vec<Submission>, ClientError>;
    async fn submit(&self, request: &SubmitRequest) -> Result<(), ClientError>;
    /// Any 2xx body in one of the known shapes; interpreting it is up to the caller.
    async fn calculate(&self) -> Result<CalculateBody, ClientError>;
    async fn reset(&self) -> Result<(), ClientError>;
}

pub struct HttpRentApi {
    http: Client,
    base_url: Url,
}

impl HttpRentApi {
    pub fn new(server_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let mut base_url = Url::parse(server_url.trim())?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| ClientError::Transport {
                endpoint: "http client",
                source,
            })?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, route: &str) -> Result<Url, ClientError> {
        Ok(self.base_url.join(route.trim_start_matches('/'))?)
    }

    async fn acknowledge(
        &self,
        route: &'static str,
        response: Response,
    ) -> Result<(), ClientError> {
        let ack: Acknowledgement = read_json(route, response).await?;
        if ack.is_success() {
            Ok(())
        } else {
            Err(ClientError::Rejected {
                endpoint: route,
                status: None,
                message: ack.into_error().user_message().map(str::to_owned),
            })
        }
    }
}

#[async_trait]
impl RentApi for HttpRentApi {
    async fn list_submissions(&self) -> Result<Vec<Submission>, ClientError> {
        let url = self.endpoint(SUBMISSIONS_ROUTE)?;
        debug!(%url, "fetching submissions");
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| transport(SUBMISSIONS_ROUTE, source))?;
        let body: SubmissionsResponse = read_json(SUBMISSIONS_ROUTE, response).await?;
        Ok(body.into_submissions())
    }

    async fn submit(&self, request: &SubmitRequest) -> Result<(), ClientError> {
        let url = self.endpoint(SUBMIT_ROUTE)?;
        debug!(%url, name = %request.name, "posting valuations");
        let response = self
            .http
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|source| transport(SUBMIT_ROUTE, source))?;
        self.acknowledge(SUBMIT_ROUTE, response).await
    }

    async fn calculate(&self) -> Result<CalculateBody, ClientError> {
        let url = self.endpoint(CALCULATE_ROUTE)?;
        debug!(%url, "requesting allocation");
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| transport(CALCULATE_ROUTE, source))?;
        read_json(CALCULATE_ROUTE, response).await
    }

    async fn reset(&self) -> Result<(), ClientError> {
        let url = self.endpoint(RESET_ROUTE)?;
        debug!(%url, "resetting submissions");
        let response = self
            .http
            .post(url)
            .send()
            .await
            .map_err(|source| transport(RESET_ROUTE, source))?;
        self.acknowledge(RESET_ROUTE, response).await
    }
}

fn transport(endpoint: &'static str, source: reqwest::Error) -> ClientError {
    ClientError::Transport { endpoint, source }
}

/// Reads a JSON body, turning non-2xx statuses into [`ClientError::Rejected`]
/// carrying whatever message the server put in the body.
async fn read_json<T: DeserializeOwned>(
    endpoint: &'static str,
    response: Response,
) -> Result<T, ClientError> {
    let status = response.status();
    let bytes = response
        .bytes()
        .await
        .map_err(|source| transport(endpoint, source))?;

    if !status.is_success() {
        let body: ApiError = serde_json::from_slice(&bytes).unwrap_or_default();
        return Err(ClientError::Rejected {
            endpoint,
            status: Some(status.as_u16()),
            message: body.user_message().map(str::to_owned),
        });
    }

    serde_json::from_slice(&bytes).map_err(|err| ClientError::Malformed {
        endpoint,
        reason: err.to_string(),
    })
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
