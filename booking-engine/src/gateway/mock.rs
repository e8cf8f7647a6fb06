//! Scripted in-process gateway for tests

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;

use super::{GatewayClient, GatewayError, GatewaySession, GatewayStatus, OrderLookup};

#[derive(Default)]
struct MockState {
    orders: HashMap<String, OrderLookup>,
    statuses: HashMap<String, GatewayStatus>,
    create_failure: Option<String>,
    lookup_failure: Option<String>,
}

/// Gateway double: every order code is payable unless scripted otherwise,
/// sessions are numbered `{name}_sess_{n}`, and statuses default to unpaid.
pub struct MockGateway {
    name: String,
    state: Mutex<MockState>,
    sessions_created: AtomicU32,
    status_queries: AtomicU32,
}

impl MockGateway {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            state: Mutex::new(MockState::default()),
            sessions_created: AtomicU32::new(0),
            status_queries: AtomicU32::new(0),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn set_order(&self, order_code: &str, lookup: OrderLookup) {
        self.state().orders.insert(order_code.to_string(), lookup);
    }

    /// Make `create_session` fail with the given gateway message
    pub fn fail_create_session(&self, message: &str) {
        self.state().create_failure = Some(message.to_string());
    }

    /// Make `lookup_order` fail with the given gateway message
    pub fn fail_lookup(&self, message: &str) {
        self.state().lookup_failure = Some(message.to_string());
    }

    pub fn set_status(&self, correlation_id: &str, paid: bool, amount_minor: i64) {
        self.state()
            .statuses
            .insert(correlation_id.to_string(), GatewayStatus { paid, amount_minor });
    }

    pub fn sessions_created(&self) -> u32 {
        self.sessions_created.load(Ordering::SeqCst)
    }

    pub fn status_queries(&self) -> u32 {
        self.status_queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GatewayClient for MockGateway {
    fn name(&self) -> &str {
        &self.name
    }

    async fn lookup_order(&self, order_code: &str) -> Result<OrderLookup, GatewayError> {
        let state = self.state();
        if let Some(message) = &state.lookup_failure {
            return Err(GatewayError::Rejected {
                status: 503,
                message: message.clone(),
            });
        }
        Ok(state
            .orders
            .get(order_code)
            .copied()
            .unwrap_or(OrderLookup::Payable))
    }

    async fn create_session(
        &self,
        order_code: &str,
        _amount_minor: i64,
        _currency: &str,
    ) -> Result<GatewaySession, GatewayError> {
        if let Some(message) = &self.state().create_failure {
            return Err(GatewayError::Rejected {
                status: 402,
                message: message.clone(),
            });
        }
        let n = self.sessions_created.fetch_add(1, Ordering::SeqCst) + 1;
        let correlation_id = format!("{}_sess_{n}", self.name);
        Ok(GatewaySession {
            redirect_url: format!("https://{}.pay.example/{order_code}/{correlation_id}", self.name),
            correlation_id,
        })
    }

    async fn query_status(&self, correlation_id: &str) -> Result<GatewayStatus, GatewayError> {
        self.status_queries.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .state()
            .statuses
            .get(correlation_id)
            .copied()
            .unwrap_or(GatewayStatus {
                paid: false,
                amount_minor: 0,
            }))
    }
}
