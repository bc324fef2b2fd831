//! HTTP transport for the classification and provider-directory endpoints.
//!
//! Each call makes exactly one attempt. A non-2xx status or a blank body is
//! surfaced as a typed [`ClientError`] whose `Display` is the short message
//! shown to the user.

use std::time::Duration;

use dermascan_core::{ClientConfig, Coordinate, ProviderRecord};
use image::DynamicImage;
use reqwest::{Client, Response, Url};

use crate::directory::parse_providers;
use crate::error::{ClientError, Endpoint};
use crate::prediction::summarize_prediction;
use crate::request::{ClassifyRequest, DirectoryRequest};

/// Client for the skin-classification service and the Overpass directory.
///
/// Cheap to clone: the underlying `reqwest::Client` shares its connection
/// pool across clones.
#[derive(Debug, Clone)]
pub struct DermascanClient {
    client: Client,
    predict_url: Url,
    directory_url: Url,
}

impl DermascanClient {
    /// Creates a client from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        Self::build(
            config.predict_url.clone(),
            config.directory_url.clone(),
            config.request_timeout_secs,
            &config.user_agent,
        )
    }

    /// Creates a client with explicit endpoints (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`ClientError::InvalidUrl`] if either
    /// endpoint does not parse.
    pub fn with_endpoints(
        predict_url: &str,
        directory_url: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, ClientError> {
        Self::build(
            parse_endpoint(predict_url)?,
            parse_endpoint(directory_url)?,
            timeout_secs,
            user_agent,
        )
    }

    fn build(
        predict_url: Url,
        directory_url: Url,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            predict_url,
            directory_url,
        })
    }

    /// Uploads `image` for classification and returns the display line.
    ///
    /// The response body is summarized with [`summarize_prediction`], which
    /// never fails: an unexpected payload comes back verbatim.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Encode`] if the image cannot be re-encoded.
    /// - [`ClientError::Status`] on a non-2xx status.
    /// - [`ClientError::EmptyResponse`] if the body is blank.
    /// - [`ClientError::Http`] on network failure.
    pub async fn classify(&self, image: &DynamicImage) -> Result<String, ClientError> {
        let request = ClassifyRequest::from_image(image)?;
        let body = self.send_classify(&request).await?;
        Ok(summarize_prediction(&body))
    }

    /// Queries providers within the search radius of `user`, nearest first.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Status`] on a non-2xx status.
    /// - [`ClientError::EmptyResponse`] if the body is blank.
    /// - [`ClientError::Http`] on network failure.
    pub async fn nearby_providers(
        &self,
        user: Coordinate,
    ) -> Result<Vec<ProviderRecord>, ClientError> {
        let request = DirectoryRequest::near(user);
        let body = self.send_directory(&request).await?;
        Ok(parse_providers(&body, user))
    }

    /// Posts a prepared upload as `multipart/form-data` and returns the raw
    /// response body.
    ///
    /// # Errors
    ///
    /// See [`DermascanClient::classify`].
    pub async fn send_classify(&self, request: &ClassifyRequest) -> Result<String, ClientError> {
        let form = request.multipart_form()?;
        tracing::debug!(
            url = %self.predict_url,
            jpeg_bytes = request.jpeg_bytes().len(),
            "sending classification request"
        );
        let response = self
            .client
            .post(self.predict_url.clone())
            .multipart(form)
            .send()
            .await?;
        read_body(Endpoint::Classification, response).await
    }

    /// Posts a prepared Overpass query as a urlencoded form and returns the
    /// raw response body.
    ///
    /// # Errors
    ///
    /// See [`DermascanClient::nearby_providers`].
    pub async fn send_directory(&self, request: &DirectoryRequest) -> Result<String, ClientError> {
        tracing::debug!(url = %self.directory_url, "sending directory query");
        let response = self
            .client
            .post(self.directory_url.clone())
            .form(&request.form_fields())
            .send()
            .await?;
        read_body(Endpoint::Directory, response).await
    }
}

fn parse_endpoint(raw: &str) -> Result<Url, ClientError> {
    Url::parse(raw).map_err(|e| ClientError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })
}

/// Asserts a 2xx status and a non-blank body.
async fn read_body(endpoint: Endpoint, response: Response) -> Result<String, ClientError> {
    let status = response.status();
    if !status.is_success() {
        tracing::warn!(%endpoint, status = status.as_u16(), url = %response.url(), "request failed");
        return Err(ClientError::Status {
            endpoint,
            status: status.as_u16(),
        });
    }

    let body = response.text().await?;
    if body.trim().is_empty() {
        tracing::warn!(%endpoint, "empty response body");
        return Err(ClientError::EmptyResponse { endpoint });
    }
    Ok(body)
}
