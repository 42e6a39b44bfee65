use crate::config::HttpConfig;
use anyhow::{Context, Result, bail};
use reqwest::blocking::{Client, ClientBuilder, RequestBuilder};
use reqwest::cookie::Jar;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

pub fn client_builder(http: &HttpConfig) -> ClientBuilder {
    Client::builder()
        .timeout(Duration::from_secs(http.timeout_secs))
        .user_agent(http.user_agent.clone())
}

pub fn build_client(http: &HttpConfig) -> Result<Client> {
    client_builder(http)
        .build()
        .context("failed to build reqwest client")
}

pub fn build_session_client(http: &HttpConfig) -> Result<Client> {
    client_builder(http)
        .cookie_store(true)
        .build()
        .context("failed to build session client")
}

pub fn build_client_with_cookies(http: &HttpConfig, url: &Url, cookies: &[String]) -> Result<Client> {
    let jar = Jar::default();
    for cookie in cookies {
        jar.add_cookie_str(cookie, url);
    }

    client_builder(http)
        .cookie_provider(Arc::new(jar))
        .build()
        .context("failed to build client with cookies")
}

pub fn get_text(client: &Client, url: &str) -> Result<String> {
    send_for_text(client.get(url), "GET", url)
}

pub fn post_form_text(client: &Client, url: &str, form: &[(&str, String)]) -> Result<String> {
    send_for_text(client.post(url).form(form), "POST", url)
}

fn send_for_text(request: RequestBuilder, method: &str, url: &str) -> Result<String> {
    let response = request
        .send()
        .with_context(|| format!("{method} {url} failed"))?;

    let status = response.status();
    if !status.is_success() {
        bail!("{method} {url} failed with status {status}");
    }

    let body = response
        .text()
        .with_context(|| format!("failed to read response body from {url}"))?;
    debug!(%url, method, bytes = body.len(), "fetched page");
    Ok(body)
}
