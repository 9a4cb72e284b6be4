use serde::{Deserialize, Serialize};

// Simple datatypes that fit naturally into SQLite.
// Booleans are integers, timestamps are unix seconds.
// The DTO module converts these into the JSON shapes
// the admin API exposes.

#[derive(Debug, Serialize, Deserialize)]
pub struct Article {
  pub id: i32,
  pub title: String,
  pub slug: String,
  pub excerpt: String,
  pub content: String,
  pub featured_image: Option<String>,
  pub author_id: i32,
  pub category_id: i32,
  pub published_at: i64,
  pub is_featured: i32,
  pub read_time: i32,
  // Joined display fields, populated by the list and
  // get queries, left empty on the insert path:
  pub author_name: String,
  pub author_image: Option<String>,
  pub category_name: String,
  pub category_slug: String,
  pub tags: Vec<Tag>
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Category {
  pub id: i32,
  pub name: String,
  pub slug: String,
  pub description: Option<String>,
  // Derived by counting referencing articles, never stored:
  pub article_count: i64
}

#[derive(Debug, Serialize, Deserialize)]
pub struct User {
  pub id: i32,
  pub name: String,
  pub email: String,
  // One of "reader", "author", "admin":
  pub role: String,
  pub image: Option<String>,
  pub bio: Option<String>,
  pub created_at: i64
}

impl User {
  pub fn is_admin(&self) -> bool {
    self.role == "admin"
  }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Tag {
  pub id: i32,
  pub name: String,
  pub slug: String
}
