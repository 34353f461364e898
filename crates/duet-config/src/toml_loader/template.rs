//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> String {
    r##"# duet-relay configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.

[server]
# host = "0.0.0.0"
# port = 3001                 # 1024-65535
# join_timeout_secs = 10      # 1-300

[matching]
# sweep_interval_ms = 1000    # 100-10000
# outbox_capacity = 256       # 16-65536
# stats_interval_secs = 60    # 5-3600

[profile]
# default_name_prefix = "User"
# default_location = "Unknown"
# max_name_length = 32        # 1-128
# max_location_length = 64    # 1-256

[relay]
# max_message_length = 2000   # 1-65536
# rate_per_sec = 20           # 1-1000, chat + signal frames per connection
# burst = 60                  # 1-10000

[logging]
# filter = "duet_relay=info"
"##
    .to_string()
}
