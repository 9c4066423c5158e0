//! Metric definitions

use metrics::describe_counter;

/// Register metric descriptions with whatever recorder the host installed.
pub fn describe_metrics() {
    describe_counter!(
        "farmgate_decisions_total",
        "Authorization decisions by outcome (allow/deny) and denial reason"
    );
    describe_counter!(
        "farmgate_malformed_bindings_total",
        "Role bindings dropped while building a principal context, by problem kind"
    );
    describe_counter!(
        "farmgate_custom_role_cache_total",
        "Custom role resolution cache lookups by result (hit/miss)"
    );
}
