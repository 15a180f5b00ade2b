use std::sync::Arc;

use log::*;
use reqwest::{Client, StatusCode};

use crate::{
    config::AccrualConfig,
    data_objects::{AccrualResponse, AccrualResult},
    rate_limit::{parse_retry_after, RateLimitGate},
    AccrualApiError,
};

/// Anything that can tell the reconciliation worker what an order is worth.
#[allow(async_fn_in_trait)]
pub trait AccrualSource {
    async fn fetch_accrual(&self, number: &str) -> Result<AccrualResult, AccrualApiError>;
}

#[derive(Clone)]
pub struct AccrualApi {
    config: AccrualConfig,
    client: Arc<Client>,
    gate: RateLimitGate,
}

impl AccrualApi {
    pub fn new(config: AccrualConfig) -> Result<Self, AccrualApiError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AccrualApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client), gate: RateLimitGate::new() })
    }

    pub fn url(&self, number: &str) -> String {
        format!("{}/api/orders/{number}", self.config.base_url.trim_end_matches('/'))
    }

    pub fn gate(&self) -> &RateLimitGate {
        &self.gate
    }

    /// Queries the accrual authority for `number`.
    ///
    /// Waits for any rate-limit cooldown to expire first. Transport failures are retried `max_attempts` times,
    /// `retry_delay` apart. A 429 response closes the shared gate and is reported as
    /// [`AccrualResult::RateLimited`] rather than as an error.
    pub async fn fetch(&self, number: &str) -> Result<AccrualResult, AccrualApiError> {
        self.gate.wait().await;
        let url = self.url(number);
        let mut attempt = 0;
        let response = loop {
            attempt += 1;
            trace!("🌐️ GET {url} (attempt {attempt})");
            match self.client.get(&url).send().await {
                Ok(response) => break response,
                Err(e) if attempt < self.config.max_attempts => {
                    warn!("🌐️ Accrual system request for {number} failed. Retrying in {:?}. {e}", self.config.retry_delay);
                    tokio::time::sleep(self.config.retry_delay).await;
                },
                Err(e) => {
                    error!("🌐️ Accrual system is unreachable after {attempt} attempts. {e}");
                    return Err(AccrualApiError::Unavailable { attempts: attempt, reason: e.to_string() });
                },
            }
        };
        match response.status() {
            StatusCode::OK => {
                let body =
                    response.json::<AccrualResponse>().await.map_err(|e| AccrualApiError::JsonError(e.to_string()))?;
                if body.order != number {
                    warn!("🌐️ Asked the accrual system about {number}, but the reply is for {}", body.order);
                }
                let result = AccrualResult::try_from(body)?;
                debug!("🌐️ Accrual system says {number} is {result:?}");
                Ok(result)
            },
            StatusCode::NO_CONTENT | StatusCode::NOT_FOUND => {
                debug!("🌐️ Order {number} is not yet known to the accrual system");
                Ok(AccrualResult::Registered)
            },
            StatusCode::TOO_MANY_REQUESTS => {
                let cooldown = parse_retry_after(response.headers()).unwrap_or(self.config.default_cooldown);
                warn!("🌐️ Rate limited by the accrual system. Backing off for {cooldown:?}");
                self.gate.pause_for(cooldown).await;
                Ok(AccrualResult::RateLimited(cooldown))
            },
            status => {
                let message = response.text().await.unwrap_or_default();
                Err(AccrualApiError::UnexpectedStatus { status: status.as_u16(), message })
            },
        }
    }
}

impl AccrualSource for AccrualApi {
    async fn fetch_accrual(&self, number: &str) -> Result<AccrualResult, AccrualApiError> {
        self.fetch(number).await
    }
}
