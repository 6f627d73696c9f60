use actix_web::dev::ServiceResponse;
use actix_web::http::{StatusCode, header};
use actix_web::middleware::{ErrorHandlerResponse, ErrorHandlers};
use actix_web::{HttpResponse, web};
use actix_web_flash_messages::{IncomingFlashMessages, Level};
use chrono::NaiveDateTime;
use serde::Deserialize;
use tera::{Context, Tera};

use crate::auth::current_user;
use crate::domain::auth::AuthenticatedUser;
use crate::models::config::ServerConfig;
use crate::services::ServiceError;
use crate::urls;

pub mod admin;
pub mod auth;
pub mod categories;
pub mod comments;
pub mod main;
pub mod posts;
pub mod profiles;

/// `?page=` of paginated listings. Anything unparsable means the first
/// page, `last` means the last one.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    page: Option<String>,
}

impl PageQuery {
    pub fn number(&self) -> usize {
        match self.page.as_deref().map(str::trim) {
            Some("last") => usize::MAX,
            Some(value) => value.parse().unwrap_or(1),
            None => 1,
        }
    }
}

pub fn now() -> NaiveDateTime {
    chrono::Utc::now().naive_utc()
}

pub fn alert_level_to_str(level: &Level) -> &'static str {
    match level {
        Level::Error => "danger",
        Level::Warning => "warning",
        Level::Success => "success",
        _ => "info",
    }
}

pub fn render_template(tera: &Tera, template: &str, context: &Context) -> HttpResponse {
    match tera.render(template, context) {
        Ok(body) => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(body),
        Err(e) => {
            log::error!("Failed to render template '{template}': {e:?}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

pub fn base_context(
    flash_messages: &IncomingFlashMessages,
    user: Option<&AuthenticatedUser>,
    current_page: &str,
    server_config: &ServerConfig,
) -> Context {
    let alerts = flash_messages
        .iter()
        .map(|f| (f.content(), alert_level_to_str(&f.level())))
        .collect::<Vec<_>>();

    let mut context = Context::new();
    context.insert("alerts", &alerts);
    context.insert("current_user", &user);
    context.insert("current_page", current_page);
    context.insert("static_url", &server_config.static_url);
    context.insert("media_url", &server_config.media_url);
    context
}

/// Response for service errors a handler does not treat specially.
///
/// Error statuses come back without a body; the [`error_pages`] middleware
/// renders them.
pub fn error_response(err: ServiceError, current_path: &str) -> HttpResponse {
    match err {
        ServiceError::Unauthorized => redirect(&urls::login(current_path)),
        ServiceError::Forbidden { redirect_to } => redirect(&redirect_to),
        ServiceError::NotFound => HttpResponse::NotFound().finish(),
        ServiceError::Form(_) | ServiceError::TypeConstraint(_) | ServiceError::Conflict(_) => {
            HttpResponse::BadRequest().finish()
        }
        ServiceError::Internal => HttpResponse::InternalServerError().finish(),
    }
}

fn render_error_page<B>(
    res: ServiceResponse<B>,
    template: &str,
) -> actix_web::Result<ErrorHandlerResponse<B>> {
    let request = res.request();

    let status_ok = request
        .app_data::<web::Data<ServerConfig>>()
        .is_some_and(|config| config.error_pages_status_ok);

    let mut context = Context::new();
    context.insert("current_user", &current_user(request));
    context.insert("alerts", &Vec::<(String, String)>::new());
    if let Some(config) = request.app_data::<web::Data<ServerConfig>>() {
        context.insert("static_url", &config.static_url);
        context.insert("media_url", &config.media_url);
    }

    let body = request
        .app_data::<web::Data<Tera>>()
        .and_then(|tera| match tera.render(template, &context) {
            Ok(body) => Some(body),
            Err(e) => {
                log::error!("Failed to render error page '{template}': {e:?}");
                None
            }
        });

    let Some(body) = body else {
        return Ok(ErrorHandlerResponse::Response(res.map_into_left_body()));
    };

    let status = if status_ok {
        StatusCode::OK
    } else {
        res.status()
    };
    let (request, _) = res.into_parts();
    let response = HttpResponse::build(status)
        .content_type("text/html; charset=utf-8")
        .body(body);

    Ok(ErrorHandlerResponse::Response(
        ServiceResponse::new(request, response).map_into_right_body(),
    ))
}

fn not_found<B>(res: ServiceResponse<B>) -> actix_web::Result<ErrorHandlerResponse<B>> {
    render_error_page(res, "pages/404.html")
}

fn forbidden<B>(res: ServiceResponse<B>) -> actix_web::Result<ErrorHandlerResponse<B>> {
    render_error_page(res, "pages/403csrf.html")
}

fn server_error<B>(res: ServiceResponse<B>) -> actix_web::Result<ErrorHandlerResponse<B>> {
    render_error_page(res, "pages/500.html")
}

/// Custom pages for 404, 403 and 500 responses.
pub fn error_pages<B: 'static>() -> ErrorHandlers<B> {
    ErrorHandlers::new()
        .handler(StatusCode::NOT_FOUND, not_found)
        .handler(StatusCode::FORBIDDEN, forbidden)
        .handler(StatusCode::INTERNAL_SERVER_ERROR, server_error)
}

/// Register every blog handler.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(main::index)
        .service(main::about)
        .service(main::rules)
        .service(posts::create_post_page)
        .service(posts::create_post)
        .service(posts::post_detail)
        .service(posts::edit_post_page)
        .service(posts::edit_post)
        .service(posts::delete_post_page)
        .service(posts::delete_post)
        .service(comments::add_comment)
        .service(comments::edit_comment_page)
        .service(comments::edit_comment)
        .service(comments::delete_comment_page)
        .service(comments::delete_comment)
        .service(categories::category_posts)
        .service(profiles::profile)
        .service(profiles::edit_profile_page)
        .service(profiles::edit_profile)
        .service(auth::registration_page)
        .service(auth::register)
        .service(auth::login_page)
        .service(auth::login)
        .service(auth::logout)
        .service(admin::add_category)
        .service(admin::add_location)
        .service(admin::toggle_published)
        .service(admin::delete_entry)
        .service(admin::index)
        .service(admin::model_listing);
}
