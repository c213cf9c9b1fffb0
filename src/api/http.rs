//! Implements the `Backend` trait over HTTP using `reqwest`.

use crate::api::wire::{
    CategoryList, CategoryReportBody, CreatedCategory, CreatedTransaction, Credentials, ErrorBody,
    LoginResponse, TransactionList,
};
use crate::api::{category_report_endpoint, Backend, TransactionQuery};
use crate::error::{typed, ErrorType, IntoResult};
use crate::model::{Category, NewCategory, NewTransaction, Transaction, TransactionKind};
use crate::report::{CategoryReport, Resolved};
use crate::session::Session;
use crate::Result;
use anyhow::{anyhow, Context};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, trace};
use url::Url;

const NETWORK_ERROR: &str = "Terjadi kesalahan jaringan";
const GENERIC_ERROR: &str = "Terjadi kesalahan";
const LOGIN_FAILED: &str = "Login gagal";
const REGISTER_FAILED: &str = "Gagal daftar";

/// Talks to the CuanBook REST backend.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    base: Url,
    client: reqwest::Client,
}

impl HttpBackend {
    /// Creates a client for the backend at `base`, e.g. `http://localhost:3000/api`. Every request
    /// is abandoned after `timeout`.
    pub fn new(base: Url, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Unable to build the HTTP client")
            .pub_result(ErrorType::Config)?;
        Ok(Self { base, client })
    }

    /// Appends `path` to the base URL's path.
    fn endpoint(&self, path: &str) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("The API URL '{}' cannot be used as a base", self.base))
            .pub_result(ErrorType::Config)?
            .pop_if_empty()
            .extend(path.split('/'));
        Ok(url)
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        session: Option<&Session>,
    ) -> Result<RequestBuilder> {
        let url = self.endpoint(path)?;
        debug!("{method} {url}");
        let builder = self.client.request(method, url);
        Ok(match session {
            Some(session) => builder.bearer_auth(session.token()),
            None => builder,
        })
    }

    /// Sends `request` and returns the body of a successful response.
    ///
    /// Non-success responses become errors carrying the body's `message`, or `fallback` when there
    /// is none. `401 Unauthorized` is an `ErrorType::Auth` error, everything else
    /// `ErrorType::Backend`.
    async fn send_raw(&self, request: RequestBuilder, fallback: &str) -> Result<Vec<u8>> {
        let response = request
            .send()
            .await
            .context(NETWORK_ERROR)
            .pub_result(ErrorType::Backend)?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .context(NETWORK_ERROR)
            .pub_result(ErrorType::Backend)?;
        trace!("HTTP {status}, {} bytes", body.len());

        if status.is_success() {
            return Ok(body.to_vec());
        }
        let message = serde_json::from_slice::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| fallback.to_string());
        debug!("Request failed with HTTP {status}: {message}");
        let error_type = if status == StatusCode::UNAUTHORIZED {
            ErrorType::Auth
        } else {
            ErrorType::Backend
        };
        Err(typed(
            error_type,
            format!("{message} (HTTP {})", status.as_u16()),
        ))
    }

    async fn send<T>(&self, request: RequestBuilder, fallback: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let body = self.send_raw(request, fallback).await?;
        serde_json::from_slice(&body)
            .context("Unexpected response from the backend")
            .pub_result(ErrorType::Backend)
    }
}

#[async_trait::async_trait]
impl Backend for HttpBackend {
    async fn login(&self, email: &str, password: &str) -> Result<String> {
        let request = self
            .request(Method::POST, "auth/login", None)?
            .json(&Credentials { email, password });
        let response: LoginResponse = self.send(request, LOGIN_FAILED).await?;
        response
            .token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| typed(ErrorType::Backend, LOGIN_FAILED))
    }

    async fn register(&self, email: &str, password: &str) -> Result<()> {
        let request = self
            .request(Method::POST, "auth/register", None)?
            .json(&Credentials { email, password });
        self.send_raw(request, REGISTER_FAILED).await?;
        Ok(())
    }

    async fn transactions(
        &self,
        session: &Session,
        query: &TransactionQuery,
    ) -> Result<Vec<Transaction>> {
        let request = self
            .request(Method::GET, "transactions", Some(session))?
            .query(&query.to_pairs());
        let list: TransactionList = self.send(request, GENERIC_ERROR).await?;
        Ok(list.into())
    }

    async fn create_transaction(
        &self,
        session: &Session,
        transaction: &NewTransaction,
    ) -> Result<Transaction> {
        let request = self
            .request(Method::POST, "transactions", Some(session))?
            .json(transaction);
        let created: CreatedTransaction = self.send(request, GENERIC_ERROR).await?;
        Ok(created.into())
    }

    async fn categories(
        &self,
        session: &Session,
        kind: Option<TransactionKind>,
    ) -> Result<Vec<Category>> {
        let mut request = self.request(Method::GET, "categories", Some(session))?;
        if let Some(kind) = kind {
            request = request.query(&[("type", kind.as_wire_str())]);
        }
        let list: CategoryList = self.send(request, GENERIC_ERROR).await?;
        Ok(list.categories)
    }

    async fn create_category(
        &self,
        session: &Session,
        category: &NewCategory,
    ) -> Result<Category> {
        let request = self
            .request(Method::POST, "categories", Some(session))?
            .json(category);
        let created: CreatedCategory = self.send(request, GENERIC_ERROR).await?;
        Ok(created.into())
    }

    async fn category_report(
        &self,
        session: &Session,
        resolved: &Resolved,
    ) -> Result<CategoryReport> {
        let Some((path, pairs)) = category_report_endpoint(resolved) else {
            debug!(
                "No {} category report on the backend, computing it from transactions",
                resolved.period()
            );
            let query = TransactionQuery::new().range(resolved.range());
            let transactions = self.transactions(session, &query).await?;
            return Ok(CategoryReport::from_transactions(
                &transactions,
                resolved.range(),
            ));
        };
        let request = self
            .request(Method::GET, path, Some(session))?
            .query(&pairs);
        let body: CategoryReportBody = self.send(request, GENERIC_ERROR).await?;
        Ok(body.into())
    }
}
