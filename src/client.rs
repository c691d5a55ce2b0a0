// File: ./src/client.rs
// PostgREST (Supabase REST) client for the `star_events` table.
use crate::config::RemoteCredentials;
use crate::error::{StoreError, StoreResult};
use crate::model::{Child, NewStarEvent, StarEvent};
use chrono::NaiveDate;
use http::{HeaderValue, Method, Request, StatusCode, Uri, header};
use http_body_util::BodyExt;
use hyper_rustls::HttpsConnectorBuilder;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use serde::Deserialize;
use tower::ServiceExt;
use tower_http::auth::AddAuthorization;

type HttpsClient = AddAuthorization<Client<hyper_rustls::HttpsConnector<HttpConnector>, String>>;

pub const TABLE_PATH: &str = "/rest/v1/star_events";

// PostgREST / Postgres codes meaning "the table is not there yet".
const NOT_PROVISIONED_CODES: &[&str] = &["PGRST116", "PGRST205", "42P01"];

#[derive(Debug, Deserialize, Default)]
struct PostgrestError {
    code: Option<String>,
    message: Option<String>,
}

#[derive(Clone, Debug)]
pub struct RemoteClient {
    http: HttpsClient,
    base_url: String,
    key: HeaderValue,
}

impl RemoteClient {
    pub fn new(credentials: &RemoteCredentials) -> StoreResult<Self> {
        let uri: Uri = credentials
            .url
            .parse()
            .map_err(|e: http::uri::InvalidUri| StoreError::RemoteUnavailable(e.to_string()))?;
        let key = HeaderValue::from_str(&credentials.key)
            .map_err(|_| StoreError::RemoteUnavailable("access key is not a valid header".into()))?;

        let mut root_store = rustls::RootCertStore::empty();
        let result = rustls_native_certs::load_native_certs();
        root_store.add_parsable_certificates(result.certs);

        // Plain http endpoints (local dev servers) do not need a trust store.
        if root_store.is_empty() && uri.scheme_str() == Some("https") {
            return Err(StoreError::RemoteUnavailable(
                "No valid system certificates found.".to_string(),
            ));
        }

        let tls_config = rustls::ClientConfig::builder()
            .with_root_certificates(root_store)
            .with_no_client_auth();

        let https_connector = HttpsConnectorBuilder::new()
            .with_tls_config(tls_config)
            .https_or_http()
            .enable_http1()
            .build();

        let http_client = Client::builder(TokioExecutor::new()).build(https_connector);
        let http = AddAuthorization::bearer(http_client, &credentials.key);

        Ok(Self {
            http,
            base_url: credentials.url.trim_end_matches('/').to_string(),
            key,
        })
    }

    /// Cheapest possible read; only the status matters.
    pub async fn probe(&self) -> StoreResult<()> {
        let query = format!("{TABLE_PATH}?select=id&limit=1");
        self.send(Method::GET, &query, String::new(), None).await?;
        Ok(())
    }

    /// All rows, oldest first.
    pub async fn list(&self) -> StoreResult<Vec<StarEvent>> {
        let query = format!("{TABLE_PATH}?select=*&order=created_at.asc");
        let body = self.send(Method::GET, &query, String::new(), None).await?;
        StarEvent::list_from_json(&body)
            .map_err(|e| StoreError::RemoteUnavailable(format!("undecodable rows: {e}")))
    }

    pub async fn insert(&self, child: Child, local_date: NaiveDate) -> StoreResult<StarEvent> {
        let payload = NewStarEvent::new(child, local_date).to_json()?;
        let body = self
            .send(
                Method::POST,
                TABLE_PATH,
                payload,
                Some("return=representation"),
            )
            .await?;
        StarEvent::created_from_json(&body)
            .map_err(|e| StoreError::RemoteUnavailable(format!("undecodable row: {e}")))?
            .ok_or_else(|| StoreError::RemoteUnavailable("insert returned no row".to_string()))
    }

    pub async fn delete(&self, id: i64) -> StoreResult<()> {
        let query = format!("{TABLE_PATH}?id=eq.{id}");
        self.send(Method::DELETE, &query, String::new(), None).await?;
        Ok(())
    }

    /// PostgREST refuses an unfiltered DELETE, so match every positive id.
    pub async fn delete_all(&self) -> StoreResult<()> {
        let query = format!("{TABLE_PATH}?id=neq.0");
        self.send(Method::DELETE, &query, String::new(), None).await?;
        Ok(())
    }

    async fn send(
        &self,
        method: Method,
        path_and_query: &str,
        body: String,
        prefer: Option<&str>,
    ) -> StoreResult<Vec<u8>> {
        let mut builder = Request::builder()
            .method(method)
            .uri(format!("{}{}", self.base_url, path_and_query))
            .header("apikey", self.key.clone())
            .header(header::ACCEPT, "application/json")
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(prefer) = prefer {
            builder = builder.header("Prefer", prefer);
        }
        let request = builder
            .body(body)
            .map_err(|e| StoreError::RemoteUnavailable(e.to_string()))?;

        let response = self
            .http
            .clone()
            .oneshot(request)
            .await
            .map_err(|e| StoreError::RemoteUnavailable(format!("{e:?}")))?;

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .map_err(|e| StoreError::RemoteUnavailable(e.to_string()))?
            .to_bytes();

        check_status(status, &bytes)?;
        Ok(bytes.to_vec())
    }
}

fn check_status(status: StatusCode, body: &[u8]) -> StoreResult<()> {
    if status.is_success() {
        return Ok(());
    }

    let detail: PostgrestError = serde_json::from_slice(body).unwrap_or_default();
    let message = detail
        .message
        .unwrap_or_else(|| String::from_utf8_lossy(body).into_owned());

    if let Some(code) = detail.code.as_deref()
        && NOT_PROVISIONED_CODES.contains(&code)
    {
        return Err(StoreError::SchemaNotProvisioned(format!("{code}: {message}")));
    }

    Err(StoreError::RemoteUnavailable(format!(
        "HTTP {}: {}",
        status.as_u16(),
        message
    )))
}
