use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

use crate::error::AppError;
use crate::models::order::OrderStatus;

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub orders_created_total: IntCounter,
    pub order_transitions_total: IntCounterVec,
    pub driver_applications_total: IntCounterVec,
    pub driver_roster_changes_total: IntCounterVec,
    pub operation_errors_total: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let orders_created_total =
            IntCounter::new("orders_created_total", "Total orders placed by customers")
                .expect("valid orders_created_total metric");

        let order_transitions_total = IntCounterVec::new(
            Opts::new(
                "order_transitions_total",
                "Order status changes by target status",
            ),
            &["status"],
        )
        .expect("valid order_transitions_total metric");

        let driver_applications_total = IntCounterVec::new(
            Opts::new(
                "driver_applications_total",
                "Driver applications by outcome",
            ),
            &["outcome"],
        )
        .expect("valid driver_applications_total metric");

        let driver_roster_changes_total = IntCounterVec::new(
            Opts::new(
                "driver_roster_changes_total",
                "Driver dismissals and restorations",
            ),
            &["action"],
        )
        .expect("valid driver_roster_changes_total metric");

        let operation_errors_total = IntCounterVec::new(
            Opts::new("operation_errors_total", "Failed operations by error kind"),
            &["kind"],
        )
        .expect("valid operation_errors_total metric");

        registry
            .register(Box::new(orders_created_total.clone()))
            .expect("register orders_created_total");
        registry
            .register(Box::new(order_transitions_total.clone()))
            .expect("register order_transitions_total");
        registry
            .register(Box::new(driver_applications_total.clone()))
            .expect("register driver_applications_total");
        registry
            .register(Box::new(driver_roster_changes_total.clone()))
            .expect("register driver_roster_changes_total");
        registry
            .register(Box::new(operation_errors_total.clone()))
            .expect("register operation_errors_total");

        Self {
            registry,
            orders_created_total,
            order_transitions_total,
            driver_applications_total,
            driver_roster_changes_total,
            operation_errors_total,
        }
    }

    pub fn record_transition(&self, status: OrderStatus) {
        self.order_transitions_total
            .with_label_values(&[status.as_str()])
            .inc();
    }

    pub fn record_error(&self, err: &AppError) {
        self.operation_errors_total
            .with_label_values(&[err.kind()])
            .inc();
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
