//! REST gateway client (form-encoded requests, basic-auth secret key)

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde_json::Value;

use super::{GatewayClient, GatewayError, GatewaySession, GatewayStatus, OrderLookup};

/// Connection settings for one gateway account
#[derive(Debug, Clone)]
pub struct HttpGatewayConfig {
    /// Short name for logs ("wallet", "card")
    pub name: String,
    /// API root, e.g. `https://api.gateway.example`
    pub base_url: String,
    pub secret_key: String,
    /// Where the gateway sends the customer after paying
    pub success_url: String,
    /// Where the gateway sends the customer after abandoning checkout
    pub cancel_url: String,
}

/// Gateway client over the gateway's REST API
pub struct HttpGateway {
    config: HttpGatewayConfig,
    client: reqwest::Client,
}

impl HttpGateway {
    pub fn new(config: HttpGatewayConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// Append `segments` to the base URL, percent-encoding each one
    fn url(&self, segments: &[&str]) -> Result<Url, GatewayError> {
        let mut url = Url::parse(&self.config.base_url)
            .map_err(|e| GatewayError::InvalidUrl(format!("{}: {e}", self.config.base_url)))?;
        url.path_segments_mut()
            .map_err(|_| GatewayError::InvalidUrl(self.config.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

/// Decode a JSON body, turning non-2xx answers into [`GatewayError::Rejected`]
async fn read_json(resp: reqwest::Response) -> Result<Value, GatewayError> {
    let status = resp.status();
    let body: Value = resp.json().await.unwrap_or(Value::Null);
    if status.is_success() {
        return Ok(body);
    }
    let message = body["error"]["message"]
        .as_str()
        .map(String::from)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("gateway error").to_string());
    Err(GatewayError::Rejected {
        status: status.as_u16(),
        message,
    })
}

fn required_str(body: &Value, field: &str) -> Result<String, GatewayError> {
    body[field]
        .as_str()
        .map(String::from)
        .ok_or_else(|| GatewayError::InvalidResponse(format!("missing `{field}` in {body}")))
}

#[async_trait]
impl GatewayClient for HttpGateway {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn lookup_order(&self, order_code: &str) -> Result<OrderLookup, GatewayError> {
        let resp = self
            .client
            .get(self.url(&["v1", "orders", order_code])?)
            .basic_auth(&self.config.secret_key, None::<&str>)
            .send()
            .await?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(OrderLookup::Unknown);
        }
        let body = read_json(resp).await?;
        match body["status"].as_str() {
            Some("paid" | "settled" | "complete") => Ok(OrderLookup::Settled),
            Some(_) => Ok(OrderLookup::Payable),
            None => Err(GatewayError::InvalidResponse(format!(
                "missing `status` in {body}"
            ))),
        }
    }

    async fn create_session(
        &self,
        order_code: &str,
        amount_minor: i64,
        currency: &str,
    ) -> Result<GatewaySession, GatewayError> {
        let amount = amount_minor.to_string();
        let currency = currency.to_ascii_lowercase();
        let resp = self
            .client
            .post(self.url(&["v1", "checkout", "sessions"])?)
            .basic_auth(&self.config.secret_key, None::<&str>)
            .form(&[
                ("client_reference_id", order_code),
                ("amount", amount.as_str()),
                ("currency", currency.as_str()),
                ("success_url", self.config.success_url.as_str()),
                ("cancel_url", self.config.cancel_url.as_str()),
            ])
            .send()
            .await?;

        let body = read_json(resp).await?;
        Ok(GatewaySession {
            correlation_id: required_str(&body, "id")?,
            redirect_url: required_str(&body, "url")?,
        })
    }

    async fn query_status(&self, correlation_id: &str) -> Result<GatewayStatus, GatewayError> {
        let resp = self
            .client
            .get(self.url(&["v1", "checkout", "sessions", correlation_id])?)
            .basic_auth(&self.config.secret_key, None::<&str>)
            .send()
            .await?;

        let body = read_json(resp).await?;
        let amount_minor = body["amount_total"].as_i64().ok_or_else(|| {
            GatewayError::InvalidResponse(format!("missing `amount_total` in {body}"))
        })?;
        Ok(GatewayStatus {
            paid: body["payment_status"].as_str() == Some("paid"),
            amount_minor,
        })
    }
}
