use actix_web::client::Client;
use actix_web::HttpRequest;
use log::{debug, warn};
use serde_json::json;
use crate::config::ApiSettings;
use crate::db::{self, entities::User, Pool};
use super::error::{map_db_error, Error};

// Session tokens travel as a bearer Authorization header.
// Extracting Actix header values is kinda convoluted.
fn bearer_token(req: &HttpRequest) -> Option<String> {
  req.headers().get("authorization")
    .and_then(|h| h.to_str().ok())
    .and_then(|value| {
      if value.len() > 7 && value[..7].eq_ignore_ascii_case("bearer ") {
        Some(value[7..].trim().to_string())
      } else {
        None
      }
    })
}

// Resolves the caller's session and requires the admin
// role. Session issuance itself happens outside this
// system, we only look tokens up.
pub fn admin_session(req: &HttpRequest, pool: &Pool) -> Result<User, Error> {
  let token = bearer_token(req).ok_or(Error::Unauthorized)?;
  let user = db::user_by_session_token(pool, &token)
    .map_err(map_db_error)?
    .ok_or(Error::Unauthorized)?;
  if !user.is_admin() {
    return Err(Error::Unauthorized);
  }
  Ok(user)
}

// Cache hint for the statically renderable page data; the
// revalidation layer in front of us honors s-maxage.
pub fn cache_header(settings: &ApiSettings) -> String {
  format!("public, s-maxage={}", settings.revalidate_interval)
}

// Signals downstream cache invalidation after admin writes.
// Fire and forget: with no webhook configured this only
// logs, and webhook failures never fail the write that
// triggered them.
pub async fn signal_revalidation(settings: &ApiSettings, paths: &[String]) {
  if settings.revalidate_webhook.is_empty() {
    debug!("Revalidation signal (no webhook configured): {:?}", paths);
    return;
  }
  let client = Client::default();
  let result = client
    .post(&settings.revalidate_webhook)
    .send_json(&json!({ "paths": paths }))
    .await;
  match result {
    Ok(response) if response.status().is_success() => {
      debug!("Revalidation signal sent for {:?}", paths);
    },
    Ok(response) => warn!(
      "Revalidation webhook responded with status {} for {:?}",
      response.status(), paths
    ),
    Err(e) => warn!("Could not reach revalidation webhook - {}", e)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use actix_web::test::TestRequest;

  #[test]
  fn bearer_token_extraction() {
    let req = TestRequest::default()
      .header("Authorization", "Bearer abc123")
      .to_http_request();
    assert_eq!(bearer_token(&req), Some("abc123".to_string()));

    let req = TestRequest::default()
      .header("Authorization", "Basic abc123")
      .to_http_request();
    assert_eq!(bearer_token(&req), None);

    let req = TestRequest::default().to_http_request();
    assert_eq!(bearer_token(&req), None);
  }
}
