use serde::{Deserialize, Serialize};
use crate::content::types::{ContentArticle, ContentCategory};
use crate::db::entities::*;
use crate::utils::{self, serde_utils, text_utils, time_utils};

// Entity to DTO conversions through the From trait, same
// as everywhere else in this codebase. Timestamps become
// RFC 3339 strings, integer booleans become booleans.

// The TagDto is exactly the Tag entity:
pub use crate::db::entities::Tag as TagDto;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleDto {
  pub id: i32,
  pub title: String,
  pub slug: String,
  pub excerpt: String,
  pub content: String,
  pub featured_image: Option<String>,
  pub published_at: String,
  pub is_featured: bool,
  pub read_time: i32,
  pub author: AuthorRefDto,
  pub category: CategoryRefDto,
  pub tags: Vec<TagDto>
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthorRefDto {
  pub name: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub image: Option<String>
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryRefDto {
  pub name: String,
  pub slug: String
}

impl From<Article> for ArticleDto {
  fn from(article: Article) -> Self {
    Self {
      id: article.id,
      title: article.title,
      slug: article.slug,
      excerpt: article.excerpt,
      content: article.content,
      featured_image: article.featured_image,
      published_at: time_utils::timestamp_to_rfc3339(article.published_at),
      is_featured: utils::i32_to_bool(article.is_featured),
      read_time: article.read_time,
      author: AuthorRefDto {
        name: article.author_name,
        image: article.author_image
      },
      category: CategoryRefDto {
        name: article.category_name,
        slug: article.category_slug
      },
      tags: article.tags
    }
  }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDto {
  pub id: i32,
  pub name: String,
  pub slug: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  pub article_count: i64
}

impl From<Category> for CategoryDto {
  fn from(category: Category) -> Self {
    Self {
      id: category.id,
      name: category.name,
      slug: category.slug,
      description: category.description,
      article_count: category.article_count
    }
  }
}

// Never carries the password digest.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
  pub id: i32,
  pub name: String,
  pub email: String,
  pub role: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub image: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub bio: Option<String>,
  pub created_at: String
}

impl From<User> for UserDto {
  fn from(user: User) -> Self {
    Self {
      id: user.id,
      name: user.name,
      email: user.email,
      role: user.role,
      image: user.image,
      bio: user.bio,
      created_at: time_utils::timestamp_to_rfc3339(user.created_at)
    }
  }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PaginationDto {
  pub total: i64,
  pub page: usize,
  pub limit: usize,
  pub pages: i64
}

impl PaginationDto {
  pub fn new(total: i64, page: usize, limit: usize) -> Self {
    Self {
      total,
      page,
      limit,
      // Ceiling division, limit is always >= 1:
      pages: (total + limit as i64 - 1) / limit as i64
    }
  }
}

/* --- Response bodies --- */

#[derive(Debug, Serialize, Deserialize)]
pub struct ArticlesResponse {
  pub articles: Vec<ContentArticle>
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDataResponse {
  pub articles: Vec<ContentArticle>,
  pub total_articles: u64
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeResponse {
  pub featured_article: Option<ContentArticle>,
  pub latest_articles: Vec<ContentArticle>,
  pub categories: Vec<ContentCategory>
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CategoriesResponse {
  pub categories: Vec<ContentCategory>
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPageResponse {
  pub category: ContentCategory,
  pub articles: Vec<ContentArticle>,
  pub total_articles: u64
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AdminArticlesResponse {
  pub articles: Vec<ArticleDto>,
  pub pagination: PaginationDto
}

/* --- Request bodies --- */

// Everything is optional at the serde level so a missing
// required field becomes a field-level validation error
// instead of an opaque deserialization failure.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ArticlePayload {
  pub title: Option<String>,
  pub slug: Option<String>,
  pub excerpt: Option<String>,
  pub content: Option<String>,
  pub category: Option<i32>,
  pub featured_image: Option<String>,
  pub is_featured: Option<bool>,
  pub read_time: Option<i32>,
  pub tags: Option<Vec<i32>>
}

impl ArticlePayload {

  // Builds the entity to validate and persist. The slug is
  // derived from the title when absent, the caller becomes
  // the author.
  pub fn into_article(self, author_id: i32) -> (Article, Vec<i32>) {
    let title = self.title.unwrap_or_default();
    let slug = serde_utils::empty_string_to_none(self.slug)
      .unwrap_or_else(|| text_utils::slugify(&title));
    let article = Article {
      id: -1,
      title,
      slug,
      excerpt: self.excerpt.unwrap_or_default(),
      content: self.content.unwrap_or_default(),
      featured_image: serde_utils::empty_string_to_none(self.featured_image),
      author_id,
      category_id: self.category.unwrap_or(-1),
      published_at: time_utils::current_timestamp(),
      is_featured: utils::option_bool_to_i32(self.is_featured),
      read_time: self.read_time.unwrap_or(5),
      author_name: String::new(),
      author_image: None,
      category_name: String::new(),
      category_slug: String::new(),
      tags: Vec::new()
    };
    (article, self.tags.unwrap_or_default())
  }

}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPayload {
  pub name: Option<String>,
  pub slug: Option<String>,
  pub description: Option<String>
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
  pub name: Option<String>,
  pub email: Option<String>,
  pub password: Option<String>,
  pub role: Option<String>,
  pub image: Option<String>,
  pub bio: Option<String>
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn pagination_pages_is_ceiling_of_total_over_limit() {
    assert_eq!(PaginationDto::new(20, 1, 10).pages, 2);
    assert_eq!(PaginationDto::new(21, 1, 10).pages, 3);
    assert_eq!(PaginationDto::new(0, 1, 10).pages, 0);
    assert_eq!(PaginationDto::new(9, 2, 9).pages, 1);
  }

  #[test]
  fn payload_derives_slug_from_title_when_missing() {
    let payload = ArticlePayload {
      title: Some("Hello, World! 2024".to_string()),
      slug: None,
      excerpt: Some("e".to_string()),
      content: Some("c".to_string()),
      category: Some(1),
      featured_image: Some(String::new()),
      is_featured: None,
      read_time: None,
      tags: Some(vec![1, 2])
    };
    let (article, tags) = payload.into_article(7);
    assert_eq!(article.slug, "hello-world-2024");
    assert_eq!(article.author_id, 7);
    assert_eq!(article.is_featured, 0);
    assert_eq!(article.read_time, 5);
    // Empty strings submitted by the form become None:
    assert_eq!(article.featured_image, None);
    assert_eq!(tags, vec![1, 2]);
  }

  #[test]
  fn explicit_slug_wins_over_derivation() {
    let payload = ArticlePayload {
      title: Some("Some Title".to_string()),
      slug: Some("custom-slug".to_string()),
      excerpt: None,
      content: None,
      category: None,
      featured_image: None,
      is_featured: Some(true),
      read_time: Some(8),
      tags: None
    };
    let (article, tags) = payload.into_article(1);
    assert_eq!(article.slug, "custom-slug");
    assert_eq!(article.is_featured, 1);
    assert_eq!(article.read_time, 8);
    assert!(tags.is_empty());
  }

  #[test]
  fn article_dto_conversion_renders_time_and_booleans() {
    let article = Article {
      id: 3,
      title: "T".to_string(),
      slug: "t".to_string(),
      excerpt: "E".to_string(),
      content: "C".to_string(),
      featured_image: None,
      author_id: 1,
      category_id: 2,
      published_at: 1615150740,
      is_featured: 1,
      read_time: 4,
      author_name: "Jane".to_string(),
      author_image: None,
      category_name: "Tech".to_string(),
      category_slug: "tech".to_string(),
      tags: Vec::new()
    };
    let dto = ArticleDto::from(article);
    assert_eq!(dto.published_at, "2021-03-07T20:59:00+00:00");
    assert!(dto.is_featured);
    assert_eq!(dto.category.slug, "tech");
  }
}
