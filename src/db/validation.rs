use std::collections::BTreeMap;
use crate::utils::text_utils;
use super::entities::{Article, Category, User};

// Field level validation for everything the admin surface
// persists. Errors are collected into a field -> message
// map which the API returns as a structured 400 response,
// distinct from generic 500 failures.

pub type ValidationErrors = BTreeMap<String, String>;

// Length caps enforced at the persistence layer:
pub const MAX_TITLE_LENGTH: usize = 100;
pub const MAX_EXCERPT_LENGTH: usize = 250;
pub const MAX_CATEGORY_NAME_LENGTH: usize = 50;
pub const MAX_CATEGORY_DESCRIPTION_LENGTH: usize = 200;
pub const MAX_USER_NAME_LENGTH: usize = 60;
pub const MAX_BIO_LENGTH: usize = 500;

pub const USER_ROLES: [&str; 3] = ["reader", "author", "admin"];

pub fn validate_article(article: &Article) -> ValidationErrors {
  let mut errors = ValidationErrors::new();
  if article.title.trim().is_empty() {
    errors.insert(
      "title".to_string(),
      "Please provide a title".to_string()
    );
  } else if text_utils::char_count(&article.title) > MAX_TITLE_LENGTH {
    errors.insert(
      "title".to_string(),
      format!("Title cannot be more than {} characters", MAX_TITLE_LENGTH)
    );
  }
  if article.slug.trim().is_empty() {
    errors.insert(
      "slug".to_string(),
      "Please provide a slug".to_string()
    );
  }
  if article.excerpt.trim().is_empty() {
    errors.insert(
      "excerpt".to_string(),
      "Please provide an excerpt".to_string()
    );
  } else if text_utils::char_count(&article.excerpt) > MAX_EXCERPT_LENGTH {
    errors.insert(
      "excerpt".to_string(),
      format!("Excerpt cannot be more than {} characters", MAX_EXCERPT_LENGTH)
    );
  }
  if article.content.trim().is_empty() {
    errors.insert(
      "content".to_string(),
      "Please provide content".to_string()
    );
  }
  if article.category_id <= 0 {
    errors.insert(
      "category".to_string(),
      "Please provide a category".to_string()
    );
  }
  errors
}

pub fn validate_category(category: &Category) -> ValidationErrors {
  let mut errors = ValidationErrors::new();
  if category.name.trim().is_empty() {
    errors.insert(
      "name".to_string(),
      "Please provide a category name".to_string()
    );
  } else if text_utils::char_count(&category.name) > MAX_CATEGORY_NAME_LENGTH {
    errors.insert(
      "name".to_string(),
      format!(
        "Category name cannot be more than {} characters",
        MAX_CATEGORY_NAME_LENGTH
      )
    );
  }
  if category.slug.trim().is_empty() {
    errors.insert(
      "slug".to_string(),
      "Please provide a slug".to_string()
    );
  }
  if let Some(description) = &category.description {
    if text_utils::char_count(description) > MAX_CATEGORY_DESCRIPTION_LENGTH {
      errors.insert(
        "description".to_string(),
        format!(
          "Description cannot be more than {} characters",
          MAX_CATEGORY_DESCRIPTION_LENGTH
        )
      );
    }
  }
  errors
}

// Password presence is checked separately since the digest
// never travels inside the entity.
pub fn validate_user(user: &User, password: &str) -> ValidationErrors {
  let mut errors = ValidationErrors::new();
  if user.name.trim().is_empty() {
    errors.insert(
      "name".to_string(),
      "Please provide a name".to_string()
    );
  } else if text_utils::char_count(&user.name) > MAX_USER_NAME_LENGTH {
    errors.insert(
      "name".to_string(),
      format!("Name cannot be more than {} characters", MAX_USER_NAME_LENGTH)
    );
  }
  if user.email.trim().is_empty() {
    errors.insert(
      "email".to_string(),
      "Please provide an email".to_string()
    );
  }
  if password.is_empty() {
    errors.insert(
      "password".to_string(),
      "Please provide a password".to_string()
    );
  }
  if !USER_ROLES.contains(&user.role.as_str()) {
    errors.insert(
      "role".to_string(),
      "Role must be one of: reader, author, admin".to_string()
    );
  }
  if let Some(bio) = &user.bio {
    if text_utils::char_count(bio) > MAX_BIO_LENGTH {
      errors.insert(
        "bio".to_string(),
        format!("Bio cannot be more than {} characters", MAX_BIO_LENGTH)
      );
    }
  }
  errors
}

#[cfg(test)]
mod tests {
  use super::*;

  fn valid_article() -> Article {
    Article {
      id: -1,
      title: "A valid title".to_string(),
      slug: "a-valid-title".to_string(),
      excerpt: "A valid excerpt".to_string(),
      content: "Some content".to_string(),
      featured_image: None,
      author_id: 1,
      category_id: 1,
      published_at: 0,
      is_featured: 0,
      read_time: 5,
      author_name: String::new(),
      author_image: None,
      category_name: String::new(),
      category_slug: String::new(),
      tags: Vec::new()
    }
  }

  #[test]
  fn valid_article_passes() {
    assert!(validate_article(&valid_article()).is_empty());
  }

  #[test]
  fn title_over_100_characters_is_rejected() {
    let mut article = valid_article();
    article.title = "x".repeat(101);
    let errors = validate_article(&article);
    assert_eq!(
      errors.get("title").unwrap(),
      "Title cannot be more than 100 characters"
    );
  }

  #[test]
  fn title_of_exactly_100_characters_is_accepted() {
    let mut article = valid_article();
    article.title = "x".repeat(100);
    assert!(validate_article(&article).get("title").is_none());
  }

  #[test]
  fn length_caps_count_characters_not_bytes() {
    let mut article = valid_article();
    // 100 two-byte characters, still within the cap:
    article.title = "é".repeat(100);
    assert!(validate_article(&article).get("title").is_none());
  }

  #[test]
  fn missing_required_fields_are_all_reported() {
    let article = Article {
      title: String::new(),
      excerpt: String::new(),
      content: String::new(),
      slug: String::new(),
      category_id: 0,
      ..valid_article()
    };
    let errors = validate_article(&article);
    assert_eq!(errors.len(), 5);
    assert_eq!(errors.get("title").unwrap(), "Please provide a title");
    assert_eq!(errors.get("category").unwrap(), "Please provide a category");
  }

  #[test]
  fn unknown_user_role_is_rejected() {
    let user = User {
      id: -1,
      name: "Jane".to_string(),
      email: "jane@example.com".to_string(),
      role: "superuser".to_string(),
      image: None,
      bio: None,
      created_at: 0
    };
    let errors = validate_user(&user, "secret");
    assert!(errors.contains_key("role"));
  }

  #[test]
  fn category_description_cap_applies() {
    let category = Category {
      id: -1,
      name: "Tech".to_string(),
      slug: "tech".to_string(),
      description: Some("x".repeat(201)),
      article_count: 0
    };
    assert!(validate_category(&category).contains_key("description"));
  }
}
