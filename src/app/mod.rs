use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use r2d2_sqlite::{self, SqliteConnectionManager};
use color_eyre::Result;
use eyre::WrapErr;
use log::{debug, info};
// Have to add crate here because of the other crate
// named "config" that we use as a dependency.
use crate::config::{ApiSettings, Config};
use crate::content::ContentGateway;
use crate::db::{self, Pool};
mod handlers;
mod dtos;
mod error;
mod helpers;

// Shared state for all the workers. The content gateway
// only holds settings and the fallback provider, HTTP
// clients get created per request since they can't be
// shared across threads.
pub struct AppState {
  pub pool: Pool,
  pub gateway: ContentGateway,
  pub settings: ApiSettings
}

// Function to start the server. Async because of the
// .await at the end, the #[actix_web::main] decorator
// lives in main.rs.
pub async fn run() -> Result<()> {
  let config = Config::from_env()
    .expect("Configuration (environment or .env file) is missing");
  debug!("Current config: {:?}", config);
  let manager = SqliteConnectionManager::file(&config.db_path);
  let pool = Pool::new(manager)
    .expect("Database connection failed");
  db::init_schema(&pool)
    .expect("Could not initialize the database schema");

  let gateway = ContentGateway::from_config(&config);
  if !gateway.is_configured() {
    info!(
      "No content store project configured, page data endpoints \
      will serve built-in sample content"
    );
  }

  // Got to save the bind_address for later because we'll
  // be destroying "config" by moving parts of it into
  // app_state:
  let bind_address = config.bind_address.clone();

  let app_state = web::Data::new(
    AppState {
      pool,
      gateway,
      settings: ApiSettings::from(&config)
    }
  );

  HttpServer::new(move|| {
    App::new()
      .app_data(app_state.clone())
      .app_data(web::PathConfig::default().error_handler(|_, _| {
        actix_web::error::ErrorBadRequest("Invalid path arguments")
      }))
      .app_data(web::QueryConfig::default().error_handler(|_, _| {
        actix_web::error::ErrorBadRequest("Invalid query string arguments")
      }))
      .app_data(web::JsonConfig::default().error_handler(|_, _| {
        actix_web::error::ErrorBadRequest("Invalid JSON body")
      }))
      // The frontend gets served from another origin:
      .wrap(
        Cors::default()
          .allow_any_origin()
          .allow_any_method()
          .allow_any_header()
      )
      .wrap(middleware::Logger::default())
      .configure(base_endpoints_config)
      .default_service(web::route().to(handlers::not_found))
  })
  .bind(bind_address)?
  .run()
  .await
  .context("Start Actix web server")

}

// Route configuration. Order matters for the articles
// scope: "page-data" has to be registered before the
// "{slug}" catch-all.
fn base_endpoints_config(cfg: &mut web::ServiceConfig) {
  cfg.route("/", web::get().to(handlers::index))
    .route("/api/articles/page-data", web::get().to(handlers::articles_page_data))
    .route("/api/articles", web::get().to(handlers::articles))
    .route("/api/articles/{slug}", web::get().to(handlers::article_by_slug))
    .route("/api/search", web::get().to(handlers::search))
    .route("/api/home", web::get().to(handlers::home))
    .route("/api/categories", web::get().to(handlers::categories))
    .route("/api/categories/{slug}", web::get().to(handlers::category_page))
    .route("/api/admin/articles", web::get().to(handlers::admin_articles))
    .route("/api/admin/articles", web::post().to(handlers::admin_create_article))
    .route("/api/admin/articles/{id}", web::put().to(handlers::admin_update_article))
    .route("/api/admin/categories", web::get().to(handlers::admin_categories))
    .route("/api/admin/categories", web::post().to(handlers::admin_create_category))
    .route("/api/admin/users", web::get().to(handlers::admin_users))
    .route("/api/admin/users", web::post().to(handlers::admin_create_user))
    .route("/api/admin/tags", web::get().to(handlers::admin_tags));
}
