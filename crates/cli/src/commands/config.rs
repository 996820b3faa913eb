use presence_core::config::{AppConfig, LoadOptions};
use secrecy::ExposeSecret;

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let schema_script = config
        .database
        .schema_script
        .as_ref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "(embedded)".to_string());

    let lines = [
        "effective config (source precedence: overrides > env > file > default):".to_string(),
        render_line("database.url", &config.database.url),
        render_line("database.max_connections", &config.database.max_connections.to_string()),
        render_line("database.timeout_secs", &config.database.timeout_secs.to_string()),
        render_line("database.schema_script", &schema_script),
        render_line(
            "telegram.bot_token",
            &redact_token(config.telegram.bot_token.expose_secret()),
        ),
        render_line("telegram.admin_id", &config.telegram.admin_id.to_string()),
        render_line("telegram.admin_handle", &config.telegram.admin_handle),
        render_line(
            "telegram.poll_timeout_secs",
            &config.telegram.poll_timeout_secs.to_string(),
        ),
        render_line("server.bind_address", &config.server.bind_address),
        render_line("server.health_check_port", &config.server.health_check_port.to_string()),
        render_line("logging.level", &config.logging.level),
        render_line("logging.format", &format!("{:?}", config.logging.format).to_lowercase()),
    ];

    lines.join("\n")
}

fn render_line(key: &str, value: &str) -> String {
    format!("  {key} = {value}")
}

/// Keeps the numeric bot id visible for correlation, masks the secret part.
fn redact_token(token: &str) -> String {
    if token.is_empty() {
        return "(unset)".to_string();
    }
    match token.split_once(':') {
        Some((bot_id, _)) => format!("{bot_id}:***"),
        None => "***".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::redact_token;

    #[test]
    fn token_secret_part_is_masked() {
        assert_eq!(redact_token("123456:abcdef"), "123456:***");
        assert_eq!(redact_token("no-separator"), "***");
        assert_eq!(redact_token(""), "(unset)");
    }
}
