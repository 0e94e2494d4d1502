//! Raw request command implementation.

use anyhow::{Context as _, Result, bail};
use clap::Args;
use colored::Colorize;

use storefront_core::{ApiRequest, Method};

use crate::context::Context;
use crate::output;

#[derive(Args, Debug)]
pub struct RequestArgs {
    /// HTTP method (GET, POST, PUT, PATCH, DELETE)
    pub method: Method,

    /// Path relative to the backend URL, e.g. /orders
    pub path: String,

    /// JSON request body
    #[arg(long)]
    pub data: Option<String>,

    /// Query parameter as key=value (repeatable)
    #[arg(long = "query", value_parser = parse_key_val)]
    pub query: Vec<(String, String)>,

    /// Extra header as name:value (repeatable)
    #[arg(long = "header", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{s}'"))?;
    Ok((key.to_string(), value.to_string()))
}

fn parse_header(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once(':')
        .ok_or_else(|| format!("expected name:value, got '{s}'"))?;
    Ok((name.trim().to_string(), value.trim().to_string()))
}

pub async fn run(args: RequestArgs, ctx: &Context) -> Result<()> {
    let mut request = ApiRequest::new(args.method, &args.path);
    for (key, value) in args.query {
        request = request.query(key, value);
    }
    for (name, value) in args.headers {
        request = request
            .header(&name, value)
            .with_context(|| format!("Invalid header '{name}'"))?;
    }
    if let Some(data) = &args.data {
        let body: serde_json::Value = serde_json::from_str(data).context("--data is not valid JSON")?;
        request = request.json(&body)?;
    }

    let client = ctx.client().await?;
    let response = client.send(request).await.context("Request failed")?;

    eprintln!("{}", format!("HTTP {}", response.status()).dimmed());
    output::body(response.bytes());

    if !response.is_success() {
        bail!("{}", response.to_api_error());
    }
    Ok(())
}
