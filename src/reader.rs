#![allow(dead_code)]
mod config;
mod content;
mod feed;
mod utils;

use std::env;
use actix_web::client::Client;
use color_eyre::Result;
use dotenv::dotenv;
use eyre::eyre;
use getopts::Options;
use log::debug;
use serde_json::Value;
use crate::content::types::ContentArticle;
use crate::feed::{ArticleFeed, SearchFlow};

// Terminal client that walks the public API the way the
// web frontend does: initial page data, then the "load
// more" protocol until the listing is exhausted. Mostly
// useful to poke at a running server.

const DEFAULT_SERVER: &str = "http://127.0.0.1:8080";
// Same response size limit as the server's own content
// store client:
const RESPONSE_LIMIT: usize = 2_097_152;

// Copy pasted this from getopts doc.
fn print_usage(program: &str, opts: Options) {
  let brief = format!("Usage: {} [options]", program);
  print!("{}", opts.usage(&brief));
}

async fn get_json(url: &str) -> Result<Value> {
  let client = Client::default();
  let mut response = client.get(url)
    .send()
    .await
    .map_err(|e| eyre!("Request to {} failed - {}", url, e))?;
  if !response.status().is_success() {
    return Err(eyre!("{} responded with status {}", url, response.status()));
  }
  response.json::<Value>()
    .limit(RESPONSE_LIMIT)
    .await
    .map_err(|e| eyre!("Could not parse response from {} - {}", url, e))
}

fn decode_articles(value: &Value) -> Vec<ContentArticle> {
  serde_json::from_value(value.clone()).unwrap_or_default()
}

fn print_articles(articles: &[ContentArticle], from: usize) {
  for (i, article) in articles.iter().enumerate() {
    println!(
      "{:>3}. {} [{}]",
      from + i + 1,
      article.title,
      article.slug.as_deref().unwrap_or("-")
    );
  }
}

async fn run_feed(server: &str, category: Option<&str>) -> Result<()> {
  let filter = match category {
    Some(c) => format!("?category={}", urlencoding::encode(c)),
    None => String::new()
  };

  // Page 1 plus the total come from the page data
  // endpoint, same as the server-rendered listing:
  let page_data = get_json(
    &format!("{}/api/articles/page-data{}", server, filter)
  ).await?;
  let total = page_data["totalArticles"].as_u64().unwrap_or(0) as usize;
  let initial = decode_articles(&page_data["articles"]);
  let per_page = initial.len().max(1);

  let mut article_feed = ArticleFeed::new(initial, total, per_page);
  println!("{} articles total", article_feed.total());
  print_articles(article_feed.items(), 0);

  while let Some(page) = article_feed.begin_load() {
    debug!("Loading page {}", page);
    let separator = if filter.is_empty() { "?" } else { "&" };
    let url = format!(
      "{}/api/articles{}{}page={}&limit={}",
      server, filter, separator, page, article_feed.per_page()
    );
    match get_json(&url).await {
      Ok(body) => {
        let batch = decode_articles(&body["articles"]);
        if batch.is_empty() {
          // Stale total, the server has fewer articles
          // than page 1 claimed. Stop here.
          article_feed.fail_load();
          break;
        }
        let loaded = article_feed.items().len();
        print_articles(&batch, loaded);
        article_feed.complete_load(batch);
      },
      Err(e) => {
        article_feed.fail_load();
        return Err(e);
      }
    }
  }

  Ok(())
}

async fn run_search(server: &str, text: &str) -> Result<()> {
  let mut search_flow: SearchFlow<ContentArticle> = SearchFlow::new();
  let query = match search_flow.submit(text) {
    Some(q) => q,
    // Blank input never issues a request:
    None => return Ok(())
  };

  let url = format!(
    "{}/api/search?q={}",
    server,
    urlencoding::encode(&query)
  );
  match get_json(&url).await {
    Ok(body) => search_flow.complete(decode_articles(&body["articles"])),
    Err(e) => {
      search_flow.fail();
      return Err(e);
    }
  }

  if search_flow.is_empty_result() {
    println!("No articles found for \"{}\"", search_flow.query());
  } else {
    println!(
      "{} result(s) for \"{}\":",
      search_flow.results().len(),
      search_flow.query()
    );
    print_articles(search_flow.results(), 0);
  }

  Ok(())
}

#[actix_web::main]
async fn main() -> Result<()> {
  dotenv().ok();
  env_logger::init();

  let args: Vec<String> = env::args().collect();
  let program = args[0].clone();
  let mut opts = Options::new();
  opts.optopt("s", "server", "Server base URL", "URL");
  opts.optopt("c", "category", "Only list articles from this category slug", "SLUG");
  opts.optopt("q", "query", "Run a search instead of listing articles", "TEXT");
  opts.optflag("h", "help", "Program usage");
  let opt_matches = opts.parse(args)?;
  if opt_matches.opt_present("h") {
    print_usage(&program, opts);
    return Ok(());
  }

  let server = opt_matches.opt_str("s")
    .unwrap_or_else(|| DEFAULT_SERVER.to_string());

  if let Some(text) = opt_matches.opt_str("q") {
    return run_search(&server, &text).await;
  }
  run_feed(&server, opt_matches.opt_str("c").as_deref()).await
}
