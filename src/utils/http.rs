use anyhow::Result;
use reqwest::{Client, ClientBuilder};

use crate::config::Config;

/// Client shared by every navigation of one session; keeps the portal's cookies.
///
/// Each request is bounded by the page-level timeout.
pub fn create_client(config: &Config) -> Result<Client> {
    let client = ClientBuilder::new()
        .user_agent(&config.user_agent)
        .cookie_store(true)
        .timeout(config.page_timeout())
        .build()?;

    Ok(client)
}
