use actix_web::client::Client;
use color_eyre::Result;
use eyre::eyre;
use lazy_static::lazy_static;
use log::{error, warn};
use regex::Regex;
use serde_json::Value;
use crate::config::Config;

pub mod query;
pub mod types;
mod fallback;

pub use fallback::{FallbackProvider, StaticFallback};
use query::ContentQuery;

// Responses bigger than this are considered broken. The
// store pages everything we ask for, a listing should
// never get anywhere close.
const MAX_RESPONSE_SIZE: usize = 2_097_152;

// Project ids are lowercase alphanumerics and dashes,
// anything else means the store is not configured:
lazy_static! {
  static ref PROJECT_ID_REGEX: Regex = Regex::new(
    r"^[a-z0-9-]+$"
  ).unwrap();
}

#[derive(Debug, Clone)]
pub struct StoreSettings {
  pub project_id: String,
  pub dataset: String,
  pub api_version: String,
  // Normally derived from the project id; an explicit
  // root takes precedence (useful for tests and proxies):
  pub api_root: String
}

impl From<&Config> for StoreSettings {
  fn from(config: &Config) -> Self {
    Self {
      project_id: config.content_project_id.clone(),
      dataset: config.content_dataset.clone(),
      api_version: config.content_api_version.clone(),
      api_root: config.content_api_root.clone()
    }
  }
}

// The single choke point every content store query goes
// through. Owns its fallback data provider; the page
// rendering paths use execute_or_fallback to stay
// renderable when the store is down, the JSON API routes
// use execute and surface a 500 instead.
pub struct ContentGateway {
  settings: StoreSettings,
  fallback: Box<dyn FallbackProvider>
}

impl ContentGateway {

  pub fn new(
    settings: StoreSettings,
    fallback: Box<dyn FallbackProvider>
  ) -> Self {
    Self { settings, fallback }
  }

  pub fn from_config(config: &Config) -> Self {
    Self::new(StoreSettings::from(config), Box::new(StaticFallback))
  }

  pub fn is_configured(&self) -> bool {
    !self.settings.project_id.is_empty()
      && PROJECT_ID_REGEX.is_match(&self.settings.project_id)
  }

  // The store exposes queries over GET with the query text
  // and its named parameters in the query string. Parameter
  // values are JSON-encoded.
  fn query_url(&self, content_query: &ContentQuery) -> String {
    let root = if self.settings.api_root.is_empty() {
      format!("https://{}.api.sanity.io", self.settings.project_id)
    } else {
      self.settings.api_root.clone()
    };
    let mut url = format!(
      "{}/v{}/data/query/{}?query={}",
      root,
      self.settings.api_version,
      self.settings.dataset,
      urlencoding::encode(&content_query.groq)
    );
    for (name, value) in &content_query.params {
      url.push_str(&format!(
        "&{}={}",
        urlencoding::encode(&format!("${}", name)),
        urlencoding::encode(&value.to_string())
      ));
    }
    url
  }

  // Raw execution: any transport or decoding problem comes
  // back as an error for the caller to map.
  pub async fn execute(&self, content_query: &ContentQuery) -> Result<Value> {
    if !self.is_configured() {
      return Err(eyre!("Content store is not configured"));
    }
    let client = Client::default();
    let mut response = client
      .get(self.query_url(content_query))
      .header("Accept", "application/json")
      .send()
      .await
      .map_err(|e| eyre!("Content store request failed - {}", e))?;
    if !response.status().is_success() {
      return Err(eyre!(
        "Content store responded with status {}",
        response.status()
      ));
    }
    let body: Value = response
      .json()
      .limit(MAX_RESPONSE_SIZE)
      .await
      .map_err(|e| eyre!("Could not decode content store response - {}", e))?;
    // Query responses wrap the actual data in "result":
    Ok(body.get("result").cloned().unwrap_or(Value::Null))
  }

  // Page data path: never fails, degrades to the fallback
  // provider instead. The error still gets logged so a
  // misconfigured production store is visible.
  pub async fn execute_or_fallback(&self, content_query: &ContentQuery) -> Value {
    if !self.is_configured() {
      warn!(
        "Using fallback data for {:?}: no valid content store project id",
        content_query.intent
      );
      return self.fallback.fallback(&content_query.intent);
    }
    match self.execute(content_query).await {
      Ok(result) => result,
      Err(e) => {
        error!(
          "Content store query {:?} failed, substituting fallback data - {}",
          content_query.intent, e
        );
        self.fallback.fallback(&content_query.intent)
      }
    }
  }

}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn gateway_with_project(project_id: &str) -> ContentGateway {
    ContentGateway::new(
      StoreSettings {
        project_id: project_id.to_string(),
        dataset: "production".to_string(),
        api_version: "2023-05-03".to_string(),
        api_root: String::new()
      },
      Box::new(StaticFallback)
    )
  }

  #[test]
  fn empty_or_invalid_project_id_is_unconfigured() {
    assert!(!gateway_with_project("").is_configured());
    assert!(!gateway_with_project("Bad_Project!").is_configured());
    assert!(gateway_with_project("my-project-1").is_configured());
  }

  #[test]
  fn query_url_encodes_query_and_params() {
    let gateway = gateway_with_project("my-project");
    let content_query = query::category_by_slug("web-dev");
    let url = gateway.query_url(&content_query);
    assert!(url.starts_with(
      "https://my-project.api.sanity.io/v2023-05-03/data/query/production?query="
    ));
    // The $slug parameter is sent JSON-encoded:
    assert!(url.contains("%24slug=%22web-dev%22"));
    // Spaces in the GROQ text must be percent-encoded:
    assert!(!url.contains(' '));
  }

  #[test]
  fn explicit_api_root_takes_precedence() {
    let gateway = ContentGateway::new(
      StoreSettings {
        project_id: "my-project".to_string(),
        dataset: "production".to_string(),
        api_version: "2023-05-03".to_string(),
        api_root: "http://127.0.0.1:9999".to_string()
      },
      Box::new(StaticFallback)
    );
    let url = gateway.query_url(&query::category_list());
    assert!(url.starts_with("http://127.0.0.1:9999/v2023-05-03/"));
  }

  #[actix_rt::test]
  async fn unconfigured_store_serves_fallback_data() {
    let gateway = gateway_with_project("");
    let result = gateway
      .execute_or_fallback(&query::latest_articles(6))
      .await;
    assert_eq!(result.as_array().unwrap().len(), 6);
  }

  #[actix_rt::test]
  async fn unconfigured_store_errors_on_the_raw_path() {
    let gateway = gateway_with_project("");
    assert!(gateway.execute(&query::latest_articles(6)).await.is_err());
  }

  struct CannedFallback;
  impl FallbackProvider for CannedFallback {
    fn fallback(&self, _intent: &query::QueryIntent) -> Value {
      json!("canned")
    }
  }

  #[actix_rt::test]
  async fn injected_fallback_provider_is_used() {
    let gateway = ContentGateway::new(
      StoreSettings {
        project_id: String::new(),
        dataset: "production".to_string(),
        api_version: "2023-05-03".to_string(),
        api_root: String::new()
      },
      Box::new(CannedFallback)
    );
    let result = gateway
      .execute_or_fallback(&query::featured_article())
      .await;
    assert_eq!(result, json!("canned"));
  }
}
