use chrono::NaiveDate;
use finsight_core::{Account, Transaction};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::fmt;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::error::{AggregationError, Result};
use crate::fastlink::{self, FastLinkOptions};
use crate::models::{
    map_account, map_transaction, AccessTokensResponse, AccountsResponse, TokenResponse,
    TransactionsResponse, UserResponse,
};

const API_VERSION: &str = "1.1";
const FASTLINK_APP_IDS: &str = "10003600";
/// Tokens are refreshed this long before the provider says they expire.
const TOKEN_EXPIRY_MARGIN_SECS: i64 = 300;

#[derive(Clone, Deserialize)]
pub struct YodleeConfig {
    pub api_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub fastlink_url: String,
}

impl YodleeConfig {
    pub fn is_sandbox(&self) -> bool {
        self.api_url.contains("sandbox")
    }
}

impl fmt::Debug for YodleeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("YodleeConfig")
            .field("api_url", &self.api_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("fastlink_url", &self.fastlink_url)
            .finish()
    }
}

struct CachedToken {
    value: String,
    expires_at: Instant,
}

#[derive(Debug, Clone, Default)]
pub struct SyncResult {
    pub accounts: Vec<Account>,
    pub transactions: Vec<Transaction>,
}

pub struct YodleeClient {
    http: Client,
    config: YodleeConfig,
    token: Mutex<Option<CachedToken>>,
}

impl YodleeClient {
    pub fn new(config: YodleeConfig) -> Self {
        Self {
            http: Client::new(),
            config: YodleeConfig {
                api_url: config.api_url.trim_end_matches('/').to_string(),
                ..config
            },
            token: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &YodleeConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_url, path)
    }

    /// Client-credentials token, reused until shortly before it expires.
    pub async fn access_token(&self) -> Result<String> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.expires_at {
                return Ok(token.value.clone());
            }
        }

        let response = self
            .http
            .post(self.url("/auth/token"))
            .header("Api-Version", API_VERSION)
            .form(&[
                ("clientId", self.config.client_id.as_str()),
                ("secret", self.config.client_secret.as_str()),
            ])
            .send()
            .await?;
        let body: TokenResponse = parse(check("get token", response).await?).await?;

        let lifetime = (body.token.expires_in - TOKEN_EXPIRY_MARGIN_SECS).max(0) as u64;
        tracing::debug!(lifetime_secs = lifetime, "fetched aggregation access token");

        let value = body.token.access_token;
        *cached = Some(CachedToken {
            value: value.clone(),
            expires_at: Instant::now() + Duration::from_secs(lifetime),
        });
        Ok(value)
    }

    async fn authorized(&self, builder: RequestBuilder) -> Result<RequestBuilder> {
        let token = self.access_token().await?;
        Ok(builder
            .header("Api-Version", API_VERSION)
            .bearer_auth(token))
    }

    pub async fn register_user(&self, login_name: &str, email: Option<&str>) -> Result<UserResponse> {
        let request = self
            .authorized(self.http.post(self.url("/user/register")))
            .await?
            .json(&json!({ "user": { "loginName": login_name, "email": email } }));
        let response = request.send().await?;
        parse(check("register user", response).await?).await
    }

    pub async fn get_user(&self, login_name: &str) -> Result<UserResponse> {
        let request = self
            .authorized(self.http.get(self.url("/user")))
            .await?
            .query(&[("loginName", login_name)]);
        let response = request.send().await?;
        parse(check("get user", response).await?).await
    }

    /// Token for the FastLink widget. Sandbox environments accept the API
    /// access token directly.
    pub async fn fastlink_token(&self, login_name: &str) -> Result<String> {
        if self.config.is_sandbox() {
            tracing::debug!(login_name, "sandbox environment, reusing access token for FastLink");
            return self.access_token().await;
        }

        let request = self
            .authorized(self.http.post(self.url("/user/accessTokens")))
            .await?
            .query(&[("appIds", FASTLINK_APP_IDS)])
            .header("loginName", login_name);
        let response = request.send().await?;
        let body: AccessTokensResponse = parse(check("get FastLink token", response).await?).await?;

        body.user
            .access_tokens
            .into_iter()
            .next()
            .map(|t| t.value)
            .ok_or_else(|| AggregationError::InvalidResponse("no FastLink access token".to_string()))
    }

    pub fn fastlink_config(&self, login_name: &str, token: &str, options: &FastLinkOptions) -> Value {
        fastlink::fastlink_config(&self.config.fastlink_url, login_name, token, options)
    }

    pub async fn accounts(&self, login_name: &str, today: NaiveDate) -> Result<Vec<Account>> {
        let request = self
            .authorized(self.http.get(self.url("/accounts")))
            .await?
            .header("loginName", login_name);
        let response = request.send().await?;
        let body: AccountsResponse = parse(check("get accounts", response).await?).await?;

        Ok(body
            .account
            .into_iter()
            .map(|a| map_account(a, today))
            .collect())
    }

    pub async fn transactions(
        &self,
        login_name: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Transaction>> {
        let request = self
            .authorized(self.http.get(self.url("/transactions")))
            .await?
            .query(&[
                ("fromDate", from.format("%Y-%m-%d").to_string()),
                ("toDate", to.format("%Y-%m-%d").to_string()),
            ])
            .header("loginName", login_name);
        let response = request.send().await?;
        let body: TransactionsResponse = parse(check("get transactions", response).await?).await?;

        body.transaction.into_iter().map(map_transaction).collect()
    }

    /// Accounts plus transactions in `[from, to]` for one user.
    pub async fn sync(&self, login_name: &str, from: NaiveDate, to: NaiveDate, today: NaiveDate) -> Result<SyncResult> {
        let accounts = self.accounts(login_name, today).await?;
        let transactions = self.transactions(login_name, from, to).await?;
        tracing::info!(
            login_name,
            accounts = accounts.len(),
            transactions = transactions.len(),
            "aggregation sync fetched"
        );
        Ok(SyncResult {
            accounts,
            transactions,
        })
    }
}

async fn check(operation: &'static str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    tracing::warn!(operation, %status, body = %body, "aggregation request failed");
    Err(AggregationError::Status { operation, status })
}

async fn parse<T: DeserializeOwned>(response: Response) -> Result<T> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| AggregationError::InvalidResponse(e.to_string()))
}
