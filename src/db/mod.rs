use rusqlite::{params, Row, ToSql, NO_PARAMS, OptionalExtension};
use eyre::WrapErr;
use color_eyre::Result;
use sha1::{Digest, Sha1};

pub mod entities;
pub mod validation;
mod mappers;

use entities::*;
use mappers::*;
use crate::utils::time_utils;

// Type alias to make function signatures much clearer:
pub type Pool = r2d2::Pool<r2d2_sqlite::SqliteConnectionManager>;

// Joined select list every article query shares. Column
// order matters, see mappers::map_article.
const ARTICLE_SELECT: &str =
  "SELECT a.id, a.title, a.slug, a.excerpt, a.content, \
  a.featured_image, a.author_id, a.category_id, a.published_at, \
  a.is_featured, a.read_time, u.name, u.image, c.name, c.slug \
  FROM articles a \
  JOIN users u ON u.id = a.author_id \
  JOIN categories c ON c.id = a.category_id";

const CATEGORY_SELECT: &str =
  "SELECT c.id, c.name, c.slug, c.description, \
  (SELECT count(*) FROM articles a WHERE a.category_id = c.id) \
  FROM categories c";

// The whole admin write path lives in SQLite; the schema
// gets created on startup so a fresh deployment works with
// just a writable directory.
pub fn init_schema(pool: &Pool) -> Result<()> {
  let conn = pool.clone().get()?;
  conn.execute_batch(
    "CREATE TABLE IF NOT EXISTS users (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      name TEXT NOT NULL,
      email TEXT NOT NULL UNIQUE,
      password TEXT NOT NULL,
      role TEXT NOT NULL DEFAULT 'reader',
      image TEXT,
      bio TEXT,
      created_at INTEGER NOT NULL
    );
    CREATE TABLE IF NOT EXISTS categories (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      name TEXT NOT NULL,
      slug TEXT NOT NULL UNIQUE,
      description TEXT
    );
    CREATE TABLE IF NOT EXISTS tags (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      name TEXT NOT NULL,
      slug TEXT NOT NULL UNIQUE
    );
    CREATE TABLE IF NOT EXISTS articles (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      title TEXT NOT NULL,
      slug TEXT NOT NULL UNIQUE,
      excerpt TEXT NOT NULL,
      content TEXT NOT NULL,
      featured_image TEXT,
      author_id INTEGER NOT NULL REFERENCES users(id),
      category_id INTEGER NOT NULL REFERENCES categories(id),
      published_at INTEGER NOT NULL,
      is_featured INTEGER NOT NULL DEFAULT 0,
      read_time INTEGER NOT NULL DEFAULT 5
    );
    CREATE TABLE IF NOT EXISTS article_tags (
      article_id INTEGER NOT NULL REFERENCES articles(id),
      tag_id INTEGER NOT NULL REFERENCES tags(id),
      PRIMARY KEY (article_id, tag_id)
    );
    CREATE TABLE IF NOT EXISTS sessions (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      token TEXT NOT NULL UNIQUE,
      user_id INTEGER NOT NULL REFERENCES users(id),
      expires_at INTEGER NOT NULL
    );"
  ).context("Creating database schema")?;
  Ok(())
}

// Generic select helper, signature mostly stolen from the
// rusqlite doc.
fn select_many<T, P, F>(
  pool: &Pool,
  query: &str,
  params: P,
  mapper: F
) -> Result<Vec<T>>
  where
    P: IntoIterator,
    P::Item: ToSql,
    F: FnMut(&Row<'_>) -> Result<T, rusqlite::Error>,
{
  let conn = pool.clone().get()?;
  let mut stmt = conn.prepare(query)?;
  stmt.query_map(params, mapper)
    .and_then(Iterator::collect)
    .context("Generic select_many query")
}

/* --- Articles (admin write path) --- */

// Paginated admin listing. Free text search matches title
// or excerpt case-insensitively, category filters by id,
// newest first. Two out of four filter combinations need
// different parameter arities so this is an explicit match
// rather than something clever.
pub fn admin_articles(
  pool: &Pool,
  search: &Option<String>,
  category_id: Option<i32>,
  offset: usize,
  limit: usize
) -> Result<Vec<Article>> {
  let tail = "ORDER BY a.published_at DESC LIMIT ? OFFSET ?";
  let search_clause =
    "(a.title LIKE ? COLLATE NOCASE OR a.excerpt LIKE ? COLLATE NOCASE)";
  let limit = limit as i64;
  let offset = offset as i64;

  let mut articles = match (search, category_id) {
    (Some(text), Some(cat)) => {
      let pattern = format!("%{}%", text);
      select_many(
        pool,
        &format!(
          "{} WHERE {} AND a.category_id = ? {}",
          ARTICLE_SELECT, search_clause, tail
        ),
        params![pattern, pattern, cat, limit, offset],
        map_article
      )?
    },
    (Some(text), None) => {
      let pattern = format!("%{}%", text);
      select_many(
        pool,
        &format!("{} WHERE {} {}", ARTICLE_SELECT, search_clause, tail),
        params![pattern, pattern, limit, offset],
        map_article
      )?
    },
    (None, Some(cat)) => select_many(
      pool,
      &format!("{} WHERE a.category_id = ? {}", ARTICLE_SELECT, tail),
      params![cat, limit, offset],
      map_article
    )?,
    (None, None) => select_many(
      pool,
      &format!("{} {}", ARTICLE_SELECT, tail),
      params![limit, offset],
      map_article
    )?
  };
  attach_tags(pool, &mut articles)?;
  Ok(articles)
}

// Total for the pagination descriptor, same filters as the
// listing above.
pub fn admin_article_count(
  pool: &Pool,
  search: &Option<String>,
  category_id: Option<i32>
) -> Result<i64> {
  let conn = pool.clone().get()?;
  let search_clause =
    "(title LIKE ? COLLATE NOCASE OR excerpt LIKE ? COLLATE NOCASE)";
  let count: i64 = match (search, category_id) {
    (Some(text), Some(cat)) => {
      let pattern = format!("%{}%", text);
      conn.query_row(
        &format!(
          "SELECT count(*) FROM articles WHERE {} AND category_id = ?",
          search_clause
        ),
        params![pattern, pattern, cat],
        |row| row.get(0)
      )?
    },
    (Some(text), None) => {
      let pattern = format!("%{}%", text);
      conn.query_row(
        &format!("SELECT count(*) FROM articles WHERE {}", search_clause),
        params![pattern, pattern],
        |row| row.get(0)
      )?
    },
    (None, Some(cat)) => conn.query_row(
      "SELECT count(*) FROM articles WHERE category_id = ?",
      params![cat],
      |row| row.get(0)
    )?,
    (None, None) => conn.query_row(
      "SELECT count(*) FROM articles",
      NO_PARAMS,
      |row| row.get(0)
    )?
  };
  Ok(count)
}

pub fn article_by_id(pool: &Pool, id: i32) -> Result<Option<Article>> {
  let mut articles = select_many(
    pool,
    &format!("{} WHERE a.id = ?", ARTICLE_SELECT),
    params![id],
    map_article
  )?;
  attach_tags(pool, &mut articles)?;
  Ok(articles.pop())
}

pub fn slug_exists(
  pool: &Pool,
  slug: &str,
  exclude_id: Option<i32>
) -> Result<bool> {
  let conn = pool.clone().get()?;
  let count: i64 = match exclude_id {
    Some(id) => conn.query_row(
      "SELECT count(*) FROM articles WHERE slug = ? AND id != ?",
      params![slug, id],
      |row| row.get(0)
    )?,
    None => conn.query_row(
      "SELECT count(*) FROM articles WHERE slug = ?",
      params![slug],
      |row| row.get(0)
    )?
  };
  Ok(count > 0)
}

// Inserts the article and its tag associations in one
// transaction, then sets the generated id on the entity.
pub fn insert_article(
  pool: &Pool,
  article: &mut Article,
  tag_ids: &[i32]
) -> Result<()> {
  let mut conn = pool.clone().get()?;
  let tx = conn.transaction()?;
  tx.execute(
    "INSERT INTO articles (title, slug, excerpt, content, featured_image, \
    author_id, category_id, published_at, is_featured, read_time) \
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    params![
      article.title,
      article.slug,
      article.excerpt,
      article.content,
      article.featured_image,
      article.author_id,
      article.category_id,
      article.published_at,
      article.is_featured,
      article.read_time
    ]
  )?;
  article.id = tx.last_insert_rowid() as i32;
  for tag_id in tag_ids {
    tx.execute(
      "INSERT OR IGNORE INTO article_tags (article_id, tag_id) VALUES (?, ?)",
      params![article.id, tag_id]
    )?;
  }
  tx.commit().context("Inserting article")
}

// Full update of the editable fields. Returns false when
// the id doesn't exist. Tag associations are replaced
// wholesale, same transaction.
pub fn update_article(
  pool: &Pool,
  article: &Article,
  tag_ids: &[i32]
) -> Result<bool> {
  let mut conn = pool.clone().get()?;
  let tx = conn.transaction()?;
  let changed = tx.execute(
    "UPDATE articles SET title = ?, slug = ?, excerpt = ?, content = ?, \
    featured_image = ?, category_id = ?, is_featured = ?, read_time = ? \
    WHERE id = ?",
    params![
      article.title,
      article.slug,
      article.excerpt,
      article.content,
      article.featured_image,
      article.category_id,
      article.is_featured,
      article.read_time,
      article.id
    ]
  )?;
  if changed == 0 {
    return Ok(false);
  }
  tx.execute(
    "DELETE FROM article_tags WHERE article_id = ?",
    params![article.id]
  )?;
  for tag_id in tag_ids {
    tx.execute(
      "INSERT OR IGNORE INTO article_tags (article_id, tag_id) VALUES (?, ?)",
      params![article.id, tag_id]
    )?;
  }
  tx.commit().context("Updating article")?;
  Ok(true)
}

fn attach_tags(pool: &Pool, articles: &mut Vec<Article>) -> Result<()> {
  for article in articles.iter_mut() {
    article.tags = tags_for_article(pool, article.id)?;
  }
  Ok(())
}

pub fn tags_for_article(pool: &Pool, article_id: i32) -> Result<Vec<Tag>> {
  select_many(
    pool,
    "SELECT tags.id, tags.name, tags.slug
    FROM article_tags, tags WHERE
    article_tags.article_id = ?
    AND article_tags.tag_id = tags.id",
    params![article_id],
    map_tag
  )
}

/* --- Categories --- */

pub fn all_categories(pool: &Pool) -> Result<Vec<Category>> {
  select_many(
    pool,
    &format!("{} ORDER BY c.name ASC", CATEGORY_SELECT),
    NO_PARAMS,
    map_category
  )
}

pub fn category_by_id(pool: &Pool, id: i32) -> Result<Option<Category>> {
  let mut categories = select_many(
    pool,
    &format!("{} WHERE c.id = ?", CATEGORY_SELECT),
    params![id],
    map_category
  )?;
  Ok(categories.pop())
}

pub fn category_slug_exists(pool: &Pool, slug: &str) -> Result<bool> {
  let conn = pool.clone().get()?;
  let count: i64 = conn.query_row(
    "SELECT count(*) FROM categories WHERE slug = ?",
    params![slug],
    |row| row.get(0)
  )?;
  Ok(count > 0)
}

pub fn insert_category(pool: &Pool, category: &mut Category) -> Result<()> {
  let conn = pool.clone().get()?;
  conn.execute(
    "INSERT INTO categories (name, slug, description) VALUES (?, ?, ?)",
    params![category.name, category.slug, category.description]
  )?;
  category.id = conn.last_insert_rowid() as i32;
  Ok(())
}

/* --- Tags --- */

pub fn all_tags(pool: &Pool) -> Result<Vec<Tag>> {
  select_many(
    pool,
    "SELECT id, name, slug FROM tags ORDER BY name ASC",
    NO_PARAMS,
    map_tag
  )
}

pub fn insert_tag(pool: &Pool, tag: &mut Tag) -> Result<()> {
  let conn = pool.clone().get()?;
  conn.execute(
    "INSERT INTO tags (name, slug) VALUES (?, ?)",
    params![tag.name, tag.slug]
  )?;
  tag.id = conn.last_insert_rowid() as i32;
  Ok(())
}

/* --- Users & sessions --- */

const USER_SELECT: &str =
  "SELECT id, name, email, role, image, bio, created_at FROM users";

pub fn all_users(pool: &Pool) -> Result<Vec<User>> {
  select_many(
    pool,
    &format!("{} ORDER BY name ASC", USER_SELECT),
    NO_PARAMS,
    map_user
  )
}

pub fn email_exists(pool: &Pool, email: &str) -> Result<bool> {
  let conn = pool.clone().get()?;
  let count: i64 = conn.query_row(
    "SELECT count(*) FROM users WHERE email = ?",
    params![email],
    |row| row.get(0)
  )?;
  Ok(count > 0)
}

pub fn insert_user(
  pool: &Pool,
  user: &mut User,
  password_digest: &str
) -> Result<()> {
  let conn = pool.clone().get()?;
  conn.execute(
    "INSERT INTO users (name, email, password, role, image, bio, created_at) \
    VALUES (?, ?, ?, ?, ?, ?, ?)",
    params![
      user.name,
      user.email,
      password_digest,
      user.role,
      user.image,
      user.bio,
      user.created_at
    ]
  )?;
  user.id = conn.last_insert_rowid() as i32;
  Ok(())
}

// Session issuance happens outside this system; we only
// resolve tokens someone else put in the table.
pub fn user_by_session_token(
  pool: &Pool,
  token: &str
) -> Result<Option<User>> {
  let conn = pool.clone().get()?;
  let user = conn.query_row(
    "SELECT u.id, u.name, u.email, u.role, u.image, u.bio, u.created_at \
    FROM users u JOIN sessions s ON s.user_id = u.id \
    WHERE s.token = ? AND s.expires_at > ?",
    params![token, time_utils::current_timestamp()],
    map_user
  ).optional()?;
  Ok(user)
}

pub fn insert_session(
  pool: &Pool,
  user_id: i32,
  token: &str,
  expires_at: i64
) -> Result<()> {
  let conn = pool.clone().get()?;
  conn.execute(
    "INSERT INTO sessions (token, user_id, expires_at) VALUES (?, ?, ?)",
    params![token, user_id, expires_at]
  )?;
  Ok(())
}

pub fn password_digest(password: &str) -> String {
  let mut hasher = Sha1::new();
  hasher.update(password.as_bytes());
  hasher.finalize()
    .iter()
    .map(|b| format!("{:02x}", b))
    .collect()
}

#[cfg(test)]
pub mod test_support {
  use super::*;
  use r2d2_sqlite::SqliteConnectionManager;

  // In-memory SQLite: the pool is capped at one connection
  // because every connection would otherwise get its own
  // private database.
  pub fn memory_pool() -> Pool {
    let manager = SqliteConnectionManager::memory();
    let pool = r2d2::Pool::builder()
      .max_size(1)
      .build(manager)
      .expect("Could not build in-memory pool");
    init_schema(&pool).expect("Could not create schema");
    pool
  }

  pub fn seed_admin(pool: &Pool) -> User {
    let mut user = User {
      id: -1,
      name: "Admin".to_string(),
      email: "admin@techpulse.example".to_string(),
      role: "admin".to_string(),
      image: None,
      bio: None,
      created_at: time_utils::current_timestamp()
    };
    insert_user(pool, &mut user, &password_digest("secret")).unwrap();
    user
  }

  pub fn seed_category(pool: &Pool, name: &str, slug: &str) -> Category {
    let mut category = Category {
      id: -1,
      name: name.to_string(),
      slug: slug.to_string(),
      description: None,
      article_count: 0
    };
    insert_category(pool, &mut category).unwrap();
    category
  }

  pub fn seed_article(
    pool: &Pool,
    title: &str,
    slug: &str,
    author_id: i32,
    category_id: i32,
    published_at: i64
  ) -> Article {
    let mut article = Article {
      id: -1,
      title: title.to_string(),
      slug: slug.to_string(),
      excerpt: format!("Excerpt for {}", title),
      content: "Some content".to_string(),
      featured_image: None,
      author_id,
      category_id,
      published_at,
      is_featured: 0,
      read_time: 5,
      author_name: String::new(),
      author_image: None,
      category_name: String::new(),
      category_slug: String::new(),
      tags: Vec::new()
    };
    insert_article(pool, &mut article, &[]).unwrap();
    article
  }
}
