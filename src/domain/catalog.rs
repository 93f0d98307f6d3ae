//! Static template data the synthesizers draw from.

/// Entry point of every trace.
pub const GATEWAY_SERVICE: &str = "api-gateway";

/// Services and the endpoints each one exposes. The gateway comes first.
pub const SERVICES: &[(&str, &[&str])] = &[
    (
        GATEWAY_SERVICE,
        &[
            "/api/v1/users",
            "/api/v1/orders",
            "/api/v1/products",
            "/api/v1/payments",
        ],
    ),
    (
        "user-service",
        &["/users", "/users/{id}", "/users/auth", "/users/profile"],
    ),
    (
        "order-service",
        &["/orders", "/orders/{id}", "/orders/status", "/orders/history"],
    ),
    (
        "payment-service",
        &[
            "/payments",
            "/payments/process",
            "/payments/refund",
            "/payments/verify",
        ],
    ),
    (
        "inventory-service",
        &["/inventory", "/inventory/check", "/inventory/reserve"],
    ),
    (
        "notification-service",
        &["/notify/email", "/notify/sms", "/notify/push"],
    ),
];

pub const HTTP_METHODS: &[&str] = &["GET", "POST", "PUT", "DELETE"];

/// HTTP status codes with relative weights.
pub const HTTP_STATUS_WEIGHTS: &[(u16, u32)] = &[
    (200, 60),
    (201, 10),
    (400, 5),
    (401, 3),
    (404, 7),
    (500, 10),
    (503, 5),
];

pub const ERROR_MESSAGES: &[&str] = &[
    "Connection timeout",
    "Database pool exhausted",
    "Auth token expired",
    "Rate limit exceeded",
    "Service unavailable",
    "Invalid payload",
];

pub const INFO_MESSAGES: &[&str] = &[
    "Request processed",
    "User authenticated",
    "Order created",
    "Payment processed",
    "Cache hit",
    "Query executed",
];

/// User recorded as acknowledging incidents.
pub const DEMO_USER_EMAIL: &str = "demo@observex.io";

pub const API_BASE_URL: &str = "https://api.example.com";

/// Endpoints of a service, empty if the service is unknown.
#[must_use]
pub fn endpoints_of(service: &str) -> &'static [&'static str] {
    SERVICES
        .iter()
        .find(|(name, _)| *name == service)
        .map_or(&[], |(_, endpoints)| endpoints)
}

/// All service names, gateway included.
pub fn service_names() -> impl Iterator<Item = &'static str> {
    SERVICES.iter().map(|(name, _)| *name)
}

/// Services a gateway request can fan out to.
#[must_use]
pub fn downstream_services() -> Vec<&'static str> {
    service_names().filter(|name| *name != GATEWAY_SERVICE).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_has_endpoints_and_is_not_downstream() {
        assert_eq!(endpoints_of(GATEWAY_SERVICE).len(), 4);
        assert!(!downstream_services().contains(&GATEWAY_SERVICE));
        assert_eq!(downstream_services().len(), 5);
    }

    #[test]
    fn unknown_service_has_no_endpoints() {
        assert!(endpoints_of("billing-service").is_empty());
    }
}
