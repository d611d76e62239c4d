use reqwest::Client;

use crate::error::{AiError, Result};

const DISABLE_SYSTEM_PROXY_ENV: &str = "RECALLFLOW_DISABLE_SYSTEM_PROXY";

pub(crate) fn build_http_client() -> Result<Client> {
    if should_disable_system_proxy() {
        Client::builder()
            .no_proxy()
            .build()
            .map_err(|e| AiError::Config(format!("Failed to build HTTP client: {e}")))
    } else {
        Ok(Client::new())
    }
}

fn should_disable_system_proxy() -> bool {
    if std::env::var_os(DISABLE_SYSTEM_PROXY_ENV).is_some() {
        return true;
    }

    cfg!(test)
}
