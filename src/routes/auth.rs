use actix_identity::Identity;
use actix_web::{HttpRequest, HttpResponse, Responder, get, post, route, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use serde::Deserialize;
use tera::Tera;

use crate::auth;
use crate::domain::auth::AuthenticatedUser;
use crate::forms::users::{
    LoginForm, LoginFormPayload, RegistrationForm, RegistrationFormPayload, date_joined_now,
};
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{base_context, error_response, redirect, render_template};
use crate::services::ServiceError;
use crate::services::auth::{login as login_service, register as register_service};
use crate::urls;

#[derive(Debug, Deserialize)]
pub struct NextQuery {
    next: Option<String>,
}

fn sign_in(request: &HttpRequest, claims: &AuthenticatedUser, next: &str) -> HttpResponse {
    match auth::login(request, claims) {
        Ok(()) => redirect(next),
        Err(e) => {
            log::error!("Failed to log in user {}: {e}", claims.id);
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/auth/registration/")]
pub async fn registration_page(
    user: Option<AuthenticatedUser>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let mut context =
        base_context(&flash_messages, user.as_ref(), "registration", &server_config);
    context.insert("form", &RegistrationForm::default());
    render_template(&tera, "registration/registration_form.html", &context)
}

#[post("/auth/registration/")]
pub async fn register(
    request: HttpRequest,
    flash_messages: IncomingFlashMessages,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
    web::Form(form): web::Form<RegistrationForm>,
) -> impl Responder {
    let rerender = |message: String| {
        let mut context = base_context(&flash_messages, None, "registration", &server_config);
        context.insert("form", &form);
        context.insert("error", &message);
        render_template(&tera, "registration/registration_form.html", &context)
    };

    let payload: RegistrationFormPayload = match form.clone().try_into() {
        Ok(payload) => payload,
        Err(e) => return rerender(ServiceError::from(e).to_string()),
    };

    match register_service(payload, date_joined_now(), repo.get_ref()) {
        Ok(claims) => {
            FlashMessage::success("Регистрация прошла успешно.").send();
            sign_in(&request, &claims, urls::INDEX)
        }
        Err(ServiceError::Conflict(message)) => rerender(message),
        Err(err) => error_response(err, request.path()),
    }
}

#[get("/auth/login/")]
pub async fn login_page(
    user: Option<AuthenticatedUser>,
    flash_messages: IncomingFlashMessages,
    query: web::Query<NextQuery>,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let mut context = base_context(&flash_messages, user.as_ref(), "login", &server_config);
    let form = LoginForm {
        next: query.into_inner().next,
        ..Default::default()
    };
    context.insert("form", &form);
    render_template(&tera, "registration/login.html", &context)
}

#[post("/auth/login/")]
pub async fn login(
    request: HttpRequest,
    flash_messages: IncomingFlashMessages,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
    web::Form(form): web::Form<LoginForm>,
) -> impl Responder {
    let next = urls::safe_next(form.next.as_deref()).to_string();
    let rerender = |message: String| {
        let mut context = base_context(&flash_messages, None, "login", &server_config);
        context.insert("form", &form);
        context.insert("error", &message);
        render_template(&tera, "registration/login.html", &context)
    };

    let payload: LoginFormPayload = match form.clone().try_into() {
        Ok(payload) => payload,
        Err(e) => return rerender(ServiceError::from(e).to_string()),
    };

    match login_service(payload, repo.get_ref()) {
        Ok(claims) => {
            log::info!("User '{}' logged in", claims.username);
            sign_in(&request, &claims, &next)
        }
        Err(ServiceError::Form(message)) => rerender(message),
        Err(err) => error_response(err, request.path()),
    }
}

#[route("/auth/logout/", method = "GET", method = "POST")]
pub async fn logout(identity: Option<Identity>) -> impl Responder {
    if let Some(identity) = identity {
        identity.logout();
    }
    redirect(urls::INDEX)
}
