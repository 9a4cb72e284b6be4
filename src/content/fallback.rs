use serde_json::{json, Value};
use super::query::QueryIntent;
use crate::utils::time_utils;

// Static substitute content served when the content store
// is unreachable or not configured, so the site keeps
// rendering during development. The gateway picks the data
// through the query intent, never by inspecting the query
// text.
pub trait FallbackProvider: Send + Sync {
  fn fallback(&self, intent: &QueryIntent) -> Value;
}

pub struct StaticFallback;

// The fallback listing always contains this many articles.
// The count fallback has to agree with it or the "load
// more" control would offer pages that don't exist.
const MOCK_ARTICLE_COUNT: usize = 6;

impl FallbackProvider for StaticFallback {

  fn fallback(&self, intent: &QueryIntent) -> Value {
    match intent {
      QueryIntent::FeaturedArticle => json!({
        "_id": "mock-featured-1",
        "title": "The Future of AI in Web Development",
        "slug": "future-of-ai-in-web-development",
        "excerpt": "Exploring how artificial intelligence is changing \
          the way we build websites and web applications.",
        "mainImage": "https://via.placeholder.com/1200x600?text=AI+in+Web+Dev",
        "publishedAt": time_utils::timestamp_to_rfc3339(
          time_utils::current_timestamp()
        ),
        "readTime": 8,
        "category": { "title": "AI", "slug": "ai" },
        "author": {
          "name": "John Doe",
          "image": "https://via.placeholder.com/80x80?text=JD"
        }
      }),
      QueryIntent::LatestArticles | QueryIntent::ArticleList => {
        let articles: Vec<Value> = (0..MOCK_ARTICLE_COUNT)
          .map(|i| json!({
            "_id": format!("mock-article-{}", i),
            "title": format!("Sample Article {}", i + 1),
            "slug": format!("sample-article-{}", i + 1),
            "excerpt": "This is a mock article for development purposes.",
            "mainImage": format!(
              "https://via.placeholder.com/600x400?text=Article+{}", i + 1
            ),
            "publishedAt": time_utils::timestamp_to_rfc3339(
              time_utils::current_timestamp()
            ),
            "readTime": 5,
            "category": { "title": "Technology", "slug": "technology" },
            "author": { "name": "Jane Smith" }
          }))
          .collect();
        json!(articles)
      },
      QueryIntent::ArticleCount => json!(MOCK_ARTICLE_COUNT),
      QueryIntent::CategoryList => json!([
        { "_id": "cat-1", "title": "Technology", "slug": "technology" },
        { "_id": "cat-2", "title": "Programming", "slug": "programming" },
        { "_id": "cat-3", "title": "AI", "slug": "ai" },
        { "_id": "cat-4", "title": "Web Dev", "slug": "web-dev" }
      ]),
      // Single-document lookups have no sensible substitute,
      // the caller turns null into its not-found state:
      QueryIntent::Article | QueryIntent::Category => Value::Null,
      QueryIntent::Search => json!([])
    }
  }

}
