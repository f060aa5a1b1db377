//! OpenAPI schema and Swagger UI.

use super::{admin, auth, messages, threads, users};
use axum::response::{Html, IntoResponse};
use axum::Json;
use threads_core::config::AppConfig;
use threads_core::{MessageRead, ThreadRead, TokenPair, UserSummary};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::obtain_token,
        auth::refresh_token,
        threads::list_threads,
        threads::create_thread,
        threads::delete_thread,
        messages::list_messages,
        messages::create_message,
        messages::mark_all_read,
        messages::mark_message_read,
        users::user_threads,
        users::unread_messages_count,
        admin::set_read_flag,
    ),
    components(schemas(
        UserSummary,
        ThreadRead,
        MessageRead,
        TokenPair,
        auth::TokenObtain,
        auth::TokenRefresh,
        auth::AccessToken,
        threads::ThreadCreate,
        messages::MessageCreate,
        users::UnreadCount,
        admin::ReadFlagUpdate,
        admin::ReadFlagUpdated,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "auth", description = "JWT token endpoints"),
        (name = "threads", description = "Private threads of the current user"),
        (name = "messages", description = "Messages within a thread"),
        (name = "users", description = "Per-user views"),
        (name = "admin", description = "Staff actions"),
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// The generated document with its info block taken from [`AppConfig`].
pub fn api_doc() -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    doc.info.title = AppConfig::API_TITLE.to_string();
    doc.info.version = AppConfig::API_VERSION.to_string();
    doc.info.description = Some(AppConfig::API_DESCRIPTION.to_string());
    doc
}

/// The OpenAPI document as JSON.
pub async fn openapi_json() -> impl IntoResponse {
    Json(api_doc())
}

/// Swagger UI page backed by the schema endpoint.
pub async fn swagger_ui() -> Html<String> {
    Html(format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <title>{title}</title>
  <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css" />
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js" crossorigin></script>
  <script>
    window.onload = () => {{
      window.ui = SwaggerUIBundle({{
        url: "{prefix}/schema/",
        dom_id: "#swagger-ui",
        persistAuthorization: true,
      }});
    }};
  </script>
</body>
</html>"##,
        title = AppConfig::API_TITLE,
        prefix = AppConfig::API_PREFIX,
    ))
}
