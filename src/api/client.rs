use std::time::Duration;

use reqwest::Client;

use crate::prelude::*;

/// Build a client with the fetch timeout.
pub fn try_new(timeout: Duration) -> Result<Client> {
    Ok(Client::builder().user_agent("pvtally").timeout(timeout).build()?)
}
