use actix_web::{web, HttpRequest, HttpResponse, Result};
use futures::join;
use log::error;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use crate::content::query::{self, ArticleFilters, PageParams};
use crate::content::types::{ContentArticle, ContentCategory};
use crate::db::{self, validation};
use crate::utils::serde_utils;
use super::dtos::*;
use super::error::{map_db_error, Error};
use super::helpers;
use super::AppState;

/* --- Request query objects --- */
// Everything is an Option<String> on purpose: malformed
// page/limit values fall back to defaults instead of
// producing a 400.
#[derive(Serialize, Deserialize)]
pub struct ArticlesQuery {
  pub category: Option<String>,
  pub tag: Option<String>,
  pub author: Option<String>,
  pub search: Option<String>,
  pub page: Option<String>,
  pub limit: Option<String>
}

#[derive(Serialize, Deserialize)]
pub struct SearchQuery {
  pub q: Option<String>
}

#[derive(Serialize, Deserialize)]
pub struct AdminArticlesQuery {
  pub page: Option<String>,
  pub limit: Option<String>,
  pub search: Option<String>,
  pub category: Option<String>
}
/* --- End request query objects --- */

fn filters_from_query(query: &ArticlesQuery) -> ArticleFilters {
  ArticleFilters {
    category: serde_utils::empty_string_to_none(query.category.clone()),
    tag: serde_utils::empty_string_to_none(query.tag.clone()),
    author: serde_utils::empty_string_to_none(query.author.clone()),
    search: serde_utils::empty_string_to_none(query.search.clone())
  }
}

// The store returns null for empty single results and we
// sometimes get null instead of [] for lists too.
fn decode_articles(value: Value) -> Result<Vec<ContentArticle>, Error> {
  if value.is_null() {
    return Ok(Vec::new());
  }
  serde_json::from_value(value).map_err(|e| {
    error!("Could not decode articles from content store - {}", e);
    Error::InternalServerError("Unexpected content store response".to_string())
  })
}

fn decode_categories(value: Value) -> Result<Vec<ContentCategory>, Error> {
  if value.is_null() {
    return Ok(Vec::new());
  }
  serde_json::from_value(value).map_err(|e| {
    error!("Could not decode categories from content store - {}", e);
    Error::InternalServerError("Unexpected content store response".to_string())
  })
}

pub async fn index() -> HttpResponse {
  HttpResponse::Ok().body("TechPulse API")
}

// Default response when no route matched the request:
pub async fn not_found() -> Result<HttpResponse, Error> {
  Err(Error::NotFound(String::from("Endpoint doesn't exist")))
}

/* --- Public read API --- */

// Listing endpoint backing the "load more" control. Raw
// gateway path: when the store is unreachable this is a
// 500, not mock data.
pub async fn articles(
  app_state: web::Data<AppState>,
  query_params: web::Query<ArticlesQuery>
) -> Result<HttpResponse, Error> {
  let filters = filters_from_query(&query_params);
  let page = PageParams::from_raw(
    query_params.page.as_deref(),
    query_params.limit.as_deref(),
    app_state.settings.articles_per_page
  );
  let content_query = query::article_list(&filters, &page);
  let result = app_state.gateway
    .execute(&content_query)
    .await
    .map_err(|e| {
      error!("Error fetching articles - {}", e);
      Error::InternalServerError("Error fetching articles".to_string())
    })?;
  Ok(HttpResponse::Ok().json(ArticlesResponse {
    articles: decode_articles(result)?
  }))
}

pub async fn article_by_slug(
  app_state: web::Data<AppState>,
  path: web::Path<(String,)>
) -> Result<HttpResponse, Error> {
  let slug = path.into_inner().0;
  let result = app_state.gateway
    .execute_or_fallback(&query::article_by_slug(&slug))
    .await;
  if result.is_null() {
    return Err(Error::NotFound("Article does not exist".to_string()));
  }
  let article: ContentArticle = serde_json::from_value(result)
    .map_err(|e| {
      error!("Could not decode article {} - {}", slug, e);
      Error::InternalServerError(
        "Unexpected content store response".to_string()
      )
    })?;
  Ok(
    HttpResponse::Ok()
      .header("Cache-Control", helpers::cache_header(&app_state.settings))
      .json(article)
  )
}

// Dedicated search flow: free text against title, excerpt
// and body, capped, no pagination. A missing or blank q is
// a 400.
pub async fn search(
  app_state: web::Data<AppState>,
  query_params: web::Query<SearchQuery>
) -> Result<HttpResponse, Error> {
  let text = query_params.q.as_deref().unwrap_or("").trim().to_string();
  if text.is_empty() {
    return Err(Error::BadRequest("Search query is required".to_string()));
  }
  let content_query = query::search(&text, app_state.settings.search_max_results);
  let result = app_state.gateway
    .execute(&content_query)
    .await
    .map_err(|e| {
      error!("Error searching articles - {}", e);
      Error::InternalServerError("Error searching articles".to_string())
    })?;
  Ok(HttpResponse::Ok().json(ArticlesResponse {
    articles: decode_articles(result)?
  }))
}

// Server-side data for page 1 of a listing: first page and
// total count fetched concurrently, both through the
// fallback path so the page always renders.
pub async fn articles_page_data(
  app_state: web::Data<AppState>,
  query_params: web::Query<ArticlesQuery>
) -> Result<HttpResponse, Error> {
  let filters = filters_from_query(&query_params);
  let page = PageParams {
    page: 1,
    limit: app_state.settings.articles_per_page
  };
  let list_query = query::article_list(&filters, &page);
  let count_query = query::article_count(&filters);
  let (list_result, count_result) = join!(
    app_state.gateway.execute_or_fallback(&list_query),
    app_state.gateway.execute_or_fallback(&count_query)
  );
  Ok(
    HttpResponse::Ok()
      .header("Cache-Control", helpers::cache_header(&app_state.settings))
      .json(PageDataResponse {
        articles: decode_articles(list_result)?,
        total_articles: count_result.as_u64().unwrap_or(0)
      })
  )
}

// Home page data: featured article, latest articles and
// the category list, all three fetched concurrently.
pub async fn home(
  app_state: web::Data<AppState>
) -> Result<HttpResponse, Error> {
  let featured_query = query::featured_article();
  let latest_query = query::latest_articles(6);
  let categories_query = query::category_list();
  let (featured, latest, categories) = join!(
    app_state.gateway.execute_or_fallback(&featured_query),
    app_state.gateway.execute_or_fallback(&latest_query),
    app_state.gateway.execute_or_fallback(&categories_query)
  );
  let featured_article = if featured.is_null() {
    None
  } else {
    serde_json::from_value(featured).ok()
  };
  Ok(
    HttpResponse::Ok()
      .header("Cache-Control", helpers::cache_header(&app_state.settings))
      .json(HomeResponse {
        featured_article,
        latest_articles: decode_articles(latest)?,
        categories: decode_categories(categories)?
      })
  )
}

pub async fn categories(
  app_state: web::Data<AppState>
) -> Result<HttpResponse, Error> {
  let result = app_state.gateway
    .execute_or_fallback(&query::category_list())
    .await;
  Ok(
    HttpResponse::Ok()
      .header("Cache-Control", helpers::cache_header(&app_state.settings))
      .json(CategoriesResponse {
        categories: decode_categories(result)?
      })
  )
}

// Category page data: the category itself plus page 1 of
// its articles and the total, fetched concurrently.
pub async fn category_page(
  app_state: web::Data<AppState>,
  path: web::Path<(String,)>
) -> Result<HttpResponse, Error> {
  let slug = path.into_inner().0;
  let filters = ArticleFilters {
    category: Some(slug.clone()),
    ..Default::default()
  };
  let page = PageParams {
    page: 1,
    limit: app_state.settings.articles_per_page
  };
  let category_query = query::category_by_slug(&slug);
  let list_query = query::article_list(&filters, &page);
  let count_query = query::article_count(&filters);
  let (category_result, list_result, count_result) = join!(
    app_state.gateway.execute_or_fallback(&category_query),
    app_state.gateway.execute_or_fallback(&list_query),
    app_state.gateway.execute_or_fallback(&count_query)
  );
  if category_result.is_null() {
    return Err(Error::NotFound("Category does not exist".to_string()));
  }
  let category: ContentCategory = serde_json::from_value(category_result)
    .map_err(|e| {
      error!("Could not decode category {} - {}", slug, e);
      Error::InternalServerError(
        "Unexpected content store response".to_string()
      )
    })?;
  Ok(
    HttpResponse::Ok()
      .header("Cache-Control", helpers::cache_header(&app_state.settings))
      .json(CategoryPageResponse {
        category,
        articles: decode_articles(list_result)?,
        total_articles: count_result.as_u64().unwrap_or(0)
      })
  )
}

/* --- Admin CRUD --- */

pub async fn admin_articles(
  app_state: web::Data<AppState>,
  query_params: web::Query<AdminArticlesQuery>,
  req: HttpRequest
) -> Result<HttpResponse, Error> {
  helpers::admin_session(&req, &app_state.pool)?;

  let page = PageParams::from_raw(
    query_params.page.as_deref(),
    query_params.limit.as_deref(),
    app_state.settings.admin_articles_per_page
  );
  let search = serde_utils::empty_string_to_none(query_params.search.clone());
  let category_id = query_params.category.as_deref()
    .and_then(|c| c.parse::<i32>().ok());

  let articles = db::admin_articles(
    &app_state.pool,
    &search,
    category_id,
    page.offset(),
    page.limit
  ).map_err(map_db_error)?;
  let total = db::admin_article_count(&app_state.pool, &search, category_id)
    .map_err(map_db_error)?;

  Ok(HttpResponse::Ok().json(AdminArticlesResponse {
    articles: articles.into_iter().map(ArticleDto::from).collect(),
    pagination: PaginationDto::new(total, page.page, page.limit)
  }))
}

// Shared by create and update: field validation plus the
// referential checks that need the database.
fn check_article(
  pool: &db::Pool,
  article: &db::entities::Article,
  exclude_id: Option<i32>
) -> Result<(), Error> {
  let mut errors = validation::validate_article(article);
  if article.category_id > 0 {
    let category = db::category_by_id(pool, article.category_id)
      .map_err(map_db_error)?;
    if category.is_none() {
      errors.insert(
        "category".to_string(),
        "Category does not exist".to_string()
      );
    }
  }
  if !article.slug.trim().is_empty()
    && db::slug_exists(pool, &article.slug, exclude_id).map_err(map_db_error)?
  {
    errors.insert(
      "slug".to_string(),
      "An article with this slug already exists".to_string()
    );
  }
  if errors.is_empty() {
    Ok(())
  } else {
    Err(Error::ValidationFailed(errors))
  }
}

pub async fn admin_create_article(
  app_state: web::Data<AppState>,
  payload: web::Json<ArticlePayload>,
  req: HttpRequest
) -> Result<HttpResponse, Error> {
  let user = helpers::admin_session(&req, &app_state.pool)?;

  // The calling user becomes the author:
  let (mut article, tag_ids) = payload.into_inner().into_article(user.id);
  check_article(&app_state.pool, &article, None)?;

  db::insert_article(&app_state.pool, &mut article, &tag_ids)
    .map_err(map_db_error)?;
  // Re-fetch to get the joined author and category fields:
  let created = db::article_by_id(&app_state.pool, article.id)
    .map_err(map_db_error)?
    .ok_or_else(|| Error::InternalServerError(
      "Article vanished right after insertion".to_string()
    ))?;

  helpers::signal_revalidation(
    &app_state.settings,
    &[
      "/".to_string(),
      "/articles".to_string(),
      format!("/categories/{}", created.category_slug)
    ]
  ).await;

  Ok(HttpResponse::Created().json(ArticleDto::from(created)))
}

pub async fn admin_update_article(
  app_state: web::Data<AppState>,
  path: web::Path<(i32,)>,
  payload: web::Json<ArticlePayload>,
  req: HttpRequest
) -> Result<HttpResponse, Error> {
  helpers::admin_session(&req, &app_state.pool)?;

  let article_id = path.into_inner().0;
  let existing = db::article_by_id(&app_state.pool, article_id)
    .map_err(map_db_error)?
    .ok_or_else(|| Error::NotFound("Article does not exist".to_string()))?;

  // The author never changes on update:
  let (mut article, tag_ids) =
    payload.into_inner().into_article(existing.author_id);
  article.id = existing.id;
  article.published_at = existing.published_at;
  check_article(&app_state.pool, &article, Some(existing.id))?;

  if !db::update_article(&app_state.pool, &article, &tag_ids)
    .map_err(map_db_error)?
  {
    return Err(Error::NotFound("Article does not exist".to_string()));
  }
  let updated = db::article_by_id(&app_state.pool, article.id)
    .map_err(map_db_error)?
    .ok_or_else(|| Error::InternalServerError(
      "Article vanished right after update".to_string()
    ))?;

  helpers::signal_revalidation(
    &app_state.settings,
    &[
      "/".to_string(),
      "/articles".to_string(),
      format!("/articles/{}", updated.slug),
      format!("/categories/{}", updated.category_slug)
    ]
  ).await;

  Ok(HttpResponse::Ok().json(ArticleDto::from(updated)))
}

pub async fn admin_categories(
  app_state: web::Data<AppState>,
  req: HttpRequest
) -> Result<HttpResponse, Error> {
  helpers::admin_session(&req, &app_state.pool)?;
  let categories = db::all_categories(&app_state.pool)
    .map_err(map_db_error)?;
  Ok(HttpResponse::Ok().json(
    categories.into_iter().map(CategoryDto::from).collect::<Vec<_>>()
  ))
}

pub async fn admin_create_category(
  app_state: web::Data<AppState>,
  payload: web::Json<CategoryPayload>,
  req: HttpRequest
) -> Result<HttpResponse, Error> {
  helpers::admin_session(&req, &app_state.pool)?;

  let payload = payload.into_inner();
  let name = payload.name.unwrap_or_default();
  let slug = serde_utils::empty_string_to_none(payload.slug)
    .unwrap_or_else(|| crate::utils::text_utils::slugify(&name));
  let mut category = db::entities::Category {
    id: -1,
    name,
    slug,
    description: serde_utils::empty_string_to_none(payload.description),
    article_count: 0
  };

  let mut errors = validation::validate_category(&category);
  if !category.slug.trim().is_empty()
    && db::category_slug_exists(&app_state.pool, &category.slug)
      .map_err(map_db_error)?
  {
    errors.insert(
      "slug".to_string(),
      "A category with this slug already exists".to_string()
    );
  }
  if !errors.is_empty() {
    return Err(Error::ValidationFailed(errors));
  }

  db::insert_category(&app_state.pool, &mut category)
    .map_err(map_db_error)?;
  Ok(HttpResponse::Created().json(CategoryDto::from(category)))
}

pub async fn admin_users(
  app_state: web::Data<AppState>,
  req: HttpRequest
) -> Result<HttpResponse, Error> {
  helpers::admin_session(&req, &app_state.pool)?;
  let users = db::all_users(&app_state.pool).map_err(map_db_error)?;
  Ok(HttpResponse::Ok().json(
    users.into_iter().map(UserDto::from).collect::<Vec<_>>()
  ))
}

pub async fn admin_create_user(
  app_state: web::Data<AppState>,
  payload: web::Json<UserPayload>,
  req: HttpRequest
) -> Result<HttpResponse, Error> {
  helpers::admin_session(&req, &app_state.pool)?;

  let payload = payload.into_inner();
  let password = payload.password.unwrap_or_default();
  let mut user = db::entities::User {
    id: -1,
    name: payload.name.unwrap_or_default(),
    email: payload.email.unwrap_or_default(),
    role: payload.role.unwrap_or_else(|| "reader".to_string()),
    image: serde_utils::empty_string_to_none(payload.image),
    bio: serde_utils::empty_string_to_none(payload.bio),
    created_at: crate::utils::time_utils::current_timestamp()
  };

  let mut errors = validation::validate_user(&user, &password);
  if !user.email.trim().is_empty()
    && db::email_exists(&app_state.pool, &user.email).map_err(map_db_error)?
  {
    errors.insert(
      "email".to_string(),
      "Email already in use".to_string()
    );
  }
  if !errors.is_empty() {
    return Err(Error::ValidationFailed(errors));
  }

  db::insert_user(&app_state.pool, &mut user, &db::password_digest(&password))
    .map_err(map_db_error)?;
  Ok(HttpResponse::Created().json(UserDto::from(user)))
}

pub async fn admin_tags(
  app_state: web::Data<AppState>,
  req: HttpRequest
) -> Result<HttpResponse, Error> {
  helpers::admin_session(&req, &app_state.pool)?;
  let tags = db::all_tags(&app_state.pool).map_err(map_db_error)?;
  Ok(HttpResponse::Ok().json(tags))
}
