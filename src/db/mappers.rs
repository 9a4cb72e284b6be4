use super::entities::*;
use rusqlite::{Row, Error};

// Column order has to match the SELECT lists in mod.rs.

pub fn map_article(row: &Row) -> Result<Article, Error> {
  Ok(Article {
    id: row.get(0)?,
    title: row.get(1)?,
    slug: row.get(2)?,
    excerpt: row.get(3)?,
    content: row.get(4)?,
    featured_image: row.get(5)?,
    author_id: row.get(6)?,
    category_id: row.get(7)?,
    published_at: row.get(8)?,
    is_featured: row.get(9)?,
    read_time: row.get(10)?,
    author_name: row.get(11)?,
    author_image: row.get(12)?,
    category_name: row.get(13)?,
    category_slug: row.get(14)?,
    // Filled in with a second query:
    tags: Vec::new()
  })
}

pub fn map_category(row: &Row) -> Result<Category, Error> {
  Ok(Category {
    id: row.get(0)?,
    name: row.get(1)?,
    slug: row.get(2)?,
    description: row.get(3)?,
    article_count: row.get(4)?
  })
}

pub fn map_user(row: &Row) -> Result<User, Error> {
  Ok(User {
    id: row.get(0)?,
    name: row.get(1)?,
    email: row.get(2)?,
    role: row.get(3)?,
    image: row.get(4)?,
    bio: row.get(5)?,
    created_at: row.get(6)?
  })
}

pub fn map_tag(row: &Row) -> Result<Tag, Error> {
  Ok(Tag {
    id: row.get(0)?,
    name: row.get(1)?,
    slug: row.get(2)?
  })
}
