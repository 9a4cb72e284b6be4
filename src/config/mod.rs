// Adding the context method to errors:
use eyre::WrapErr;
use color_eyre::Result;
use serde::Deserialize;
use std::convert::From;

#[derive(Debug, Deserialize)]
pub struct Config {
  pub db_path: String,
  pub bind_address: String,
  // Content store (headless CMS) settings:
  pub content_project_id: String,
  pub content_dataset: String,
  pub content_api_version: String,
  // Normally derived from the project id, can be
  // overridden to point at a different store:
  pub content_api_root: String,
  // How long statically renderable page data stays
  // fresh, in seconds. Sent as a cache hint and used
  // by whatever sits in front of us:
  pub revalidate_interval: u32,
  // Optional webhook receiving path invalidations
  // when admin content changes. Empty means log only.
  pub revalidate_webhook: String,
  pub articles_per_page: usize,
  pub admin_articles_per_page: usize,
  pub search_max_results: usize
}

// The config struct stays private to startup, the parts
// the handlers need travel in this smaller struct inside
// the app state. Keeps possible sensible info out of the
// request path.
#[derive(Debug, Clone)]
pub struct ApiSettings {
  pub revalidate_interval: u32,
  pub revalidate_webhook: String,
  pub articles_per_page: usize,
  pub admin_articles_per_page: usize,
  pub search_max_results: usize
}

impl From<&Config> for ApiSettings {
  fn from(config: &Config) -> Self {
    Self {
      revalidate_interval: config.revalidate_interval,
      revalidate_webhook: config.revalidate_webhook.clone(),
      articles_per_page: config.articles_per_page,
      admin_articles_per_page: config.admin_articles_per_page,
      search_max_results: config.search_max_results
    }
  }
}

impl Config {

  pub fn from_env() -> Result<Config> {
    let mut c = config::Config::new();
    // RUST_LOG is already set in main.rs if it
    // was absent.
    // You have to use lowercase here when compared
    // to what's in the .env file.
    c.set_default("db_path", "./techpulse.db")?;
    c.set_default("bind_address", "127.0.0.1:8080")?;
    // An empty project id means the content store is
    // unconfigured and the gateway serves fallback data
    // on the page rendering paths:
    c.set_default("content_project_id", "")?;
    c.set_default("content_dataset", "production")?;
    c.set_default("content_api_version", "2023-05-03")?;
    c.set_default("content_api_root", "")?;
    c.set_default("revalidate_interval", 60)?;
    c.set_default("revalidate_webhook", "")?;
    // Page sizes match what the site pages request:
    c.set_default("articles_per_page", 9)?;
    c.set_default("admin_articles_per_page", 10)?;
    c.set_default("search_max_results", 12)?;

    c.merge(config::Environment::default())?;
    // The error has to be given a context for
    // color_eyre to work here:
    c.try_into()
      .context("Loading configuration from env")
  }

}
