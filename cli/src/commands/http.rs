use std::collections::HashMap;

use nekobend_core::config::AppConfig;
use nekobend_core::error::CliError;
use nekobend_plugins::HttpHelper;

use super::cli::HttpCommand;

/// Parse `Name: value` pairs; the first ':' separates name from value.
pub fn parse_headers(raw: &[String]) -> Result<HashMap<String, String>, CliError> {
    raw.iter()
        .map(|h| {
            let (name, value) = h
                .split_once(':')
                .ok_or_else(|| CliError::Command(format!("header `{h}` must be `Name: value`")))?;
            Ok((name.trim().to_string(), value.trim().to_string()))
        })
        .collect()
}

pub async fn run_http(cmd: HttpCommand, cfg: &AppConfig) -> Result<i32, CliError> {
    let helper = HttpHelper::new(&cfg.http)?;

    let body = match cmd {
        HttpCommand::Get { url, headers } => helper.get(&url, &parse_headers(&headers)?).await,
        HttpCommand::Post { url, headers, body } => {
            let json: serde_json::Value = serde_json::from_str(&body)
                .map_err(|e| CliError::Command(format!("--body is not JSON: {e}")))?;
            helper.post(&url, &parse_headers(&headers)?, &json).await
        }
    };

    match body {
        Some(text) => {
            println!("{text}");
            Ok(0)
        }
        None => Ok(1),
    }
}
