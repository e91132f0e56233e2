use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::errors::ActionError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    Multipart(Vec<(String, String)>),
    UrlEncoded(Vec<(String, String)>),
}

/// Header carrying the CSRF token of a mutating request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrfHeader {
    pub name: String,
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub body: String,
}

impl Reply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decodes the body whatever the status: the backend reports
    /// validation failures as JSON with a 4xx status.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ActionError> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Body of a 2xx reply, or a status error.
    pub fn into_success_body(self) -> Result<String, ActionError> {
        if self.is_success() {
            Ok(self.body)
        } else {
            Err(ActionError::Status { status: self.status })
        }
    }
}

#[async_trait(?Send)]
pub trait Transport {
    async fn get(&self, url: &str) -> Result<Reply, ActionError>;

    async fn post(
        &self,
        url: &str,
        body: RequestBody,
        csrf: Option<CsrfHeader>,
    ) -> Result<Reply, ActionError>;
}

/// `reqwest`-backed transport. Relative URLs resolve against `base`, which is
/// the page origin in the browser.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base: Url,
}

impl HttpTransport {
    pub fn new(base: &str) -> Result<Self, ActionError> {
        let base = Url::parse(base).map_err(|err| ActionError::invalid_url(base, err))?;
        Ok(Self {
            client: Client::new(),
            base,
        })
    }

    pub fn with_client(client: Client, base: &str) -> Result<Self, ActionError> {
        let mut transport = Self::new(base)?;
        transport.client = client;
        Ok(transport)
    }

    pub fn resolve(&self, url: &str) -> Result<Url, ActionError> {
        self.base
            .join(url)
            .map_err(|err| ActionError::invalid_url(url, err))
    }

    async fn read(response: reqwest::Response) -> Result<Reply, ActionError> {
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(Reply { status, body })
    }
}

#[async_trait(?Send)]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<Reply, ActionError> {
        let url = self.resolve(url)?;
        debug!(%url, "GET");
        let response = self.client.get(url).send().await?;
        Self::read(response).await
    }

    async fn post(
        &self,
        url: &str,
        body: RequestBody,
        csrf: Option<CsrfHeader>,
    ) -> Result<Reply, ActionError> {
        let url = self.resolve(url)?;
        debug!(%url, "POST");

        let mut request = self.client.post(url);
        if let Some(csrf) = csrf {
            request = request.header(csrf.name, csrf.token);
        }
        request = match body {
            RequestBody::Multipart(fields) => {
                let form = fields
                    .into_iter()
                    .fold(reqwest::multipart::Form::new(), |form, (name, value)| {
                        form.text(name, value)
                    });
                request.multipart(form)
            }
            RequestBody::UrlEncoded(fields) => request.form(&fields),
        };

        let response = request.send().await?;
        Self::read(response).await
    }
}
