//! Per-section validators.

use crate::schema::DuetConfig;

use super::helpers::{validate_non_blank, validate_range};

pub(crate) fn validate_server(errors: &mut Vec<String>, config: &DuetConfig) {
    validate_non_blank(errors, "server.host", &config.server.host);
    validate_range(errors, "server.port", config.server.port, 1024, 65535);
    validate_range(
        errors,
        "server.join_timeout_secs",
        config.server.join_timeout_secs,
        1,
        300,
    );
}

pub(crate) fn validate_matching(errors: &mut Vec<String>, config: &DuetConfig) {
    validate_range(
        errors,
        "matching.sweep_interval_ms",
        config.matching.sweep_interval_ms,
        100,
        10_000,
    );
    validate_range(
        errors,
        "matching.outbox_capacity",
        config.matching.outbox_capacity,
        16,
        65_536,
    );
    validate_range(
        errors,
        "matching.stats_interval_secs",
        config.matching.stats_interval_secs,
        5,
        3600,
    );
}

pub(crate) fn validate_profile(errors: &mut Vec<String>, config: &DuetConfig) {
    validate_non_blank(
        errors,
        "profile.default_name_prefix",
        &config.profile.default_name_prefix,
    );
    validate_non_blank(
        errors,
        "profile.default_location",
        &config.profile.default_location,
    );
    validate_range(
        errors,
        "profile.max_name_length",
        config.profile.max_name_length,
        1,
        128,
    );
    validate_range(
        errors,
        "profile.max_location_length",
        config.profile.max_location_length,
        1,
        256,
    );
}

pub(crate) fn validate_relay(errors: &mut Vec<String>, config: &DuetConfig) {
    validate_range(
        errors,
        "relay.max_message_length",
        config.relay.max_message_length,
        1,
        65_536,
    );
    validate_range(
        errors,
        "relay.rate_per_sec",
        config.relay.rate_per_sec,
        1,
        1000,
    );
    validate_range(errors, "relay.burst", config.relay.burst, 1, 10_000);
}

pub(crate) fn validate_logging(errors: &mut Vec<String>, config: &DuetConfig) {
    validate_non_blank(errors, "logging.filter", &config.logging.filter);
}
