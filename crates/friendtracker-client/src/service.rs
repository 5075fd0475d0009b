//! The remote contact service as seen from the client.
//!
//! [`ContactService`] is the async CRUD contract the contact store consumes.
//! [`HttpContactService`] speaks it to a `friendtracker-server` instance.

use std::rc::Rc;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;

use friendtracker_shared::{Contact, ContactFilter, ContactPatch, NewContact};

use crate::config::ClientConfig;
use crate::error::ServiceError;

/// Async CRUD over the remote `contact` collection.  Every call may fail.
#[async_trait(?Send)]
pub trait ContactService {
    async fn select(&self, filter: &ContactFilter) -> Result<Vec<Contact>, ServiceError>;

    async fn insert(&self, contact: &NewContact) -> Result<Contact, ServiceError>;

    async fn update(&self, id: i64, patch: &ContactPatch) -> Result<Contact, ServiceError>;

    async fn delete(&self, id: i64) -> Result<(), ServiceError>;
}

#[async_trait(?Send)]
impl<S: ContactService + ?Sized> ContactService for Rc<S> {
    async fn select(&self, filter: &ContactFilter) -> Result<Vec<Contact>, ServiceError> {
        (**self).select(filter).await
    }

    async fn insert(&self, contact: &NewContact) -> Result<Contact, ServiceError> {
        (**self).insert(contact).await
    }

    async fn update(&self, id: i64, patch: &ContactPatch) -> Result<Contact, ServiceError> {
        (**self).update(id, patch).await
    }

    async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        (**self).delete(id).await
    }
}

// ---------------------------------------------------------------------------
// HTTP implementation
// ---------------------------------------------------------------------------

pub struct HttpContactService {
    client: reqwest::Client,
    base_url: String,
    access_token: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

impl HttpContactService {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token: None,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        let service = Self::new(config.server_url.clone());
        match &config.access_token {
            Some(token) => service.with_access_token(token.clone()),
            None => service,
        }
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        match &self.access_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}

/// Turn non-2xx responses into [`ServiceError`]s, keeping the server's message.
async fn check(response: Response) -> Result<Response, ServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::UNAUTHORIZED {
        return Err(ServiceError::Unauthenticated);
    }

    let message = response
        .json::<ErrorBody>()
        .await
        .map(|body| body.error)
        .unwrap_or_else(|_| status.to_string());

    Err(ServiceError::Rejected {
        status: status.as_u16(),
        message,
    })
}

#[async_trait(?Send)]
impl ContactService for HttpContactService {
    async fn select(&self, filter: &ContactFilter) -> Result<Vec<Contact>, ServiceError> {
        let response = self
            .request(Method::GET, "/contacts")
            .query(filter)
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    async fn insert(&self, contact: &NewContact) -> Result<Contact, ServiceError> {
        let response = self
            .request(Method::POST, "/contacts")
            .json(contact)
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    async fn update(&self, id: i64, patch: &ContactPatch) -> Result<Contact, ServiceError> {
        let response = self
            .request(Method::PATCH, &format!("/contacts/{id}"))
            .json(patch)
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        let response = self
            .request(Method::DELETE, &format!("/contacts/{id}"))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}
