use serde::{Deserialize, Serialize};
use serde_json::Value;

// Deserialized content store documents, matching the
// projections in the query module. The store is lenient
// about missing fields so most of these are optional.

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ContentArticle {
  #[serde(rename = "_id")]
  pub id: String,
  pub title: String,
  pub slug: Option<String>,
  pub excerpt: Option<String>,
  // The body is rich text (an array of blocks), we never
  // interpret it server-side:
  #[serde(skip_serializing_if = "Option::is_none")]
  pub body: Option<Value>,
  // Either an image reference object or a plain URL in
  // the fallback data, resolved by the presentation layer:
  pub main_image: Option<Value>,
  pub published_at: Option<String>,
  pub read_time: Option<i32>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub is_featured: Option<bool>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub tags: Option<Vec<String>>,
  pub category: Option<ContentCategoryRef>,
  pub author: Option<ContentAuthorRef>
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ContentCategoryRef {
  pub title: String,
  pub slug: Option<String>
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ContentAuthorRef {
  pub name: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub image: Option<Value>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub bio: Option<String>
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ContentCategory {
  #[serde(rename = "_id")]
  pub id: String,
  pub title: String,
  pub slug: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn article_deserializes_from_store_shape() {
    let raw = serde_json::json!({
      "_id": "abc123",
      "title": "Testing in Rust",
      "slug": "testing-in-rust",
      "excerpt": "A short excerpt.",
      "mainImage": "https://example.com/image.png",
      "publishedAt": "2024-01-01T00:00:00Z",
      "readTime": 5,
      "category": { "title": "Programming", "slug": "programming" },
      "author": { "name": "Jane Smith" }
    });
    let article: ContentArticle = serde_json::from_value(raw).unwrap();
    assert_eq!(article.id, "abc123");
    assert_eq!(article.slug.as_deref(), Some("testing-in-rust"));
    assert_eq!(article.category.unwrap().title, "Programming");
    assert!(article.tags.is_none());
  }
}
