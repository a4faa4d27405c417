// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use costbook_app::ProductRecord;
use reqwest::StatusCode;
use reqwest::blocking::{Client as HttpClient, Response};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use url::Url;

pub const SUPPLIER_SEARCH_PATH: &str = "/api/suppliers/search";
pub const PRODUCT_SEARCH_PATH: &str = "/api/products/search";

/// Blocking client for the costing search endpoints.
#[derive(Debug, Clone)]
pub struct Client {
    base_url: String,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_owned();
        if base_url.is_empty() {
            bail!("api.base_url must not be empty");
        }
        Url::parse(&base_url)
            .with_context(|| format!("api.base_url {base_url:?} is not a valid URL"))?;

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn search_url(&self, path: &str, query: &str) -> Result<Url> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, path))
            .with_context(|| format!("build search URL for {path}"))?;
        url.query_pairs_mut().append_pair("query", query);
        Ok(url)
    }

    pub fn search_suppliers(&self, query: &str) -> Result<Vec<String>> {
        let response = self.get(SUPPLIER_SEARCH_PATH, query)?;
        response.json().context("decode supplier list")
    }

    pub fn search_products(&self, query: &str) -> Result<Vec<ProductRecord>> {
        let response = self.get(PRODUCT_SEARCH_PATH, query)?;
        let rows: Vec<WireProduct> = response.json().context("decode product list")?;
        Ok(rows.into_iter().map(WireProduct::into_record).collect())
    }

    fn get(&self, path: &str, query: &str) -> Result<Response> {
        let url = self.search_url(path, query)?;
        debug!(%url, "sending search request");
        let response = self
            .http
            .get(url)
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(clean_error_response(status, &body));
        }
        Ok(response)
    }
}

fn connection_error(base_url: &str, error: reqwest::Error) -> anyhow::Error {
    if error.is_timeout() {
        return anyhow!("request to {base_url} timed out ({error})");
    }
    anyhow!(
        "cannot reach {} -- check [api].base_url and that the costing server is running ({})",
        base_url,
        error
    )
}

fn clean_error_response(status: StatusCode, body: &str) -> anyhow::Error {
    if let Ok(parsed) = serde_json::from_str::<ErrorEnvelope>(body)
        && let Some(error) = parsed.error
        && !error.is_empty()
    {
        return anyhow!("server error ({}): {}", status.as_u16(), error);
    }

    if let Ok(parsed) = serde_json::from_str::<MessageEnvelope>(body)
        && let Some(message) = parsed.message
        && !message.is_empty()
    {
        return anyhow!("server error ({}): {}", status.as_u16(), message);
    }

    if !body.is_empty() && body.len() < 100 && !body.contains('{') && !body.contains('<') {
        return anyhow!("server error ({}): {}", status.as_u16(), body.trim());
    }

    anyhow!("server returned {}", status.as_u16())
}

/// Renders a product field the way the costing page fills its inputs: falsy
/// values (`null`, `false`, `0`, `""`) leave the input blank.
fn display_text(value: &Value) -> String {
    match value {
        Value::Null | Value::Bool(false) => String::new(),
        Value::Bool(true) => "true".to_owned(),
        Value::String(text) => text.clone(),
        Value::Number(number) => {
            if let Some(int) = number.as_i64() {
                return if int == 0 {
                    String::new()
                } else {
                    int.to_string()
                };
            }
            if let Some(uint) = number.as_u64() {
                return uint.to_string();
            }
            match number.as_f64() {
                Some(float) if float == 0.0 => String::new(),
                Some(float) if float.fract() == 0.0 && float.abs() < 1e15 => {
                    format!("{}", float as i64)
                }
                Some(float) => format!("{float}"),
                None => number.to_string(),
            }
        }
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

#[derive(Debug, Deserialize)]
struct WireProduct {
    #[serde(rename = "SUPPLIER", default)]
    supplier: Value,
    #[serde(rename = "INGREDIENT", default)]
    ingredient: Value,
    #[serde(rename = "UNIT", default)]
    unit: Value,
    #[serde(rename = "UNIT_COST", default)]
    unit_cost: Value,
    #[serde(rename = "RUC", default)]
    reference_unit_cost: Value,
}

impl WireProduct {
    fn into_record(self) -> ProductRecord {
        ProductRecord {
            supplier: display_text(&self.supplier),
            ingredient: display_text(&self.ingredient),
            unit: display_text(&self.unit),
            unit_cost: display_text(&self.unit_cost),
            reference_unit_cost: display_text(&self.reference_unit_cost),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessageEnvelope {
    message: Option<String>,
}
