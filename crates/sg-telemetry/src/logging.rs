//! Structured log macros.
//!
//! Every line carries a `component` field so JSON output can be filtered
//! per subsystem; order and peer events add `order_id` / `peer`.

/// Log with a component field.
///
/// ```rust,ignore
/// sg_telemetry::log_event!(info, "runtime", "node started", node = "alice");
/// ```
#[macro_export]
macro_rules! log_event {
    ($level:ident, $component:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            component = $component,
            $($($field)*,)?
            $msg
        )
    };
}

/// Log an order-related event with standard fields.
#[macro_export]
macro_rules! log_order_event {
    ($level:ident, $component:expr, $msg:expr, $order_id:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            component = $component,
            order_id = %$order_id,
            $($($field)*,)?
            $msg
        )
    };
}

/// Log a peer-related event with standard fields.
#[macro_export]
macro_rules! log_peer_event {
    ($level:ident, $component:expr, $msg:expr, $peer:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            component = $component,
            peer = %$peer,
            $($($field)*,)?
            $msg
        )
    };
}
