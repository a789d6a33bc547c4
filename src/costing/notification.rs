// Price increase notifications
//
// Fire-and-forget delivery of applied auto-increases. A notifier that fails
// logs the problem and never blocks the price change.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Mutex;
use utoipa::ToSchema;
use uuid::Uuid;

/// Emitted whenever the auto-increase applies a new plan price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PriceIncreaseEvent {
    pub event_id: Uuid,
    pub plan_id: String,
    pub plan_name: String,
    pub previous_price: Decimal,
    pub new_price: Decimal,
    pub applied_on: NaiveDate,
}

impl PriceIncreaseEvent {
    pub fn new(
        plan_id: impl Into<String>,
        plan_name: impl Into<String>,
        previous_price: Decimal,
        new_price: Decimal,
        applied_on: NaiveDate,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            plan_id: plan_id.into(),
            plan_name: plan_name.into(),
            previous_price,
            new_price,
            applied_on,
        }
    }
}

/// Receiver of price increase events
pub trait PriceIncreaseNotifier: Send + Sync {
    /// Deliver an event; implementations must not panic or block on failure
    fn notify(&self, event: &PriceIncreaseEvent);
}

/// Events kept by a default outbox
pub const DEFAULT_OUTBOX_LIMIT: usize = 500;

/// Notifier that logs each event and keeps the most recent ones for inspection
#[derive(Debug)]
pub struct NotificationOutbox {
    events: Mutex<VecDeque<PriceIncreaseEvent>>,
    limit: usize,
}

impl Default for NotificationOutbox {
    fn default() -> Self {
        Self::with_limit(DEFAULT_OUTBOX_LIMIT)
    }
}

impl NotificationOutbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Outbox keeping at most `limit` events; older ones are dropped first
    pub fn with_limit(limit: usize) -> Self {
        Self {
            events: Mutex::new(VecDeque::new()),
            limit: limit.max(1),
        }
    }

    /// Retained events, oldest first
    pub fn events(&self) -> Vec<PriceIncreaseEvent> {
        match self.events.lock() {
            Ok(events) => events.iter().cloned().collect(),
            Err(poisoned) => poisoned.into_inner().iter().cloned().collect(),
        }
    }
}

impl PriceIncreaseNotifier for NotificationOutbox {
    fn notify(&self, event: &PriceIncreaseEvent) {
        tracing::info!(
            event_id = %event.event_id,
            plan_id = %event.plan_id,
            "Plan {} price increased from {} to {}",
            event.plan_name,
            event.previous_price,
            event.new_price
        );

        match self.events.lock() {
            Ok(mut events) => {
                if events.len() >= self.limit {
                    events.pop_front();
                }
                events.push_back(event.clone());
            }
            Err(e) => tracing::error!("Failed to record price increase event {}: {}", event.event_id, e),
        }
    }
}
