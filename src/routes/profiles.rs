use actix_web::{HttpRequest, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::auth;
use crate::domain::auth::AuthenticatedUser;
use crate::forms::users::ProfileForm;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{
    PageQuery, base_context, error_response, now, redirect, render_template,
};
use crate::services::ServiceError;
use crate::services::profiles::{
    profile_for_edit, profile_page, update_profile as update_profile_service,
};
use crate::urls;

#[get("/profile/{username}/")]
pub async fn profile(
    request: HttpRequest,
    username: web::Path<String>,
    user: Option<AuthenticatedUser>,
    flash_messages: IncomingFlashMessages,
    query: web::Query<PageQuery>,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match profile_page(
        &username,
        user.as_ref(),
        query.number(),
        server_config.posts_per_page,
        server_config.profile_visibility,
        now(),
        repo.get_ref(),
    ) {
        Ok(page) => {
            let mut context =
                base_context(&flash_messages, user.as_ref(), "profile", &server_config);
            context.insert("profile", &page.profile);
            context.insert("page_obj", &page.posts);
            context.insert("is_owner", &page.is_owner);
            render_template(&tera, "blog/profile.html", &context)
        }
        Err(err) => error_response(err, request.path()),
    }
}

#[get("/profile/{username}/edit_profile/")]
pub async fn edit_profile_page(
    request: HttpRequest,
    user: AuthenticatedUser,
    flash_messages: IncomingFlashMessages,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match profile_for_edit(&user, repo.get_ref()) {
        Ok(target) => {
            let mut context =
                base_context(&flash_messages, Some(&user), "edit_profile", &server_config);
            context.insert("form", &ProfileForm::from(&target));
            render_template(&tera, "blog/user.html", &context)
        }
        Err(err) => error_response(err, request.path()),
    }
}

#[post("/profile/{username}/edit_profile/")]
pub async fn edit_profile(
    request: HttpRequest,
    user: AuthenticatedUser,
    flash_messages: IncomingFlashMessages,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
    web::Form(form): web::Form<ProfileForm>,
) -> impl Responder {
    match update_profile_service(form.clone(), &user, repo.get_ref()) {
        Ok(claims) => {
            if let Err(e) = auth::login(&request, &claims) {
                log::error!("Failed to refresh identity of user {}: {e}", claims.id);
            }
            FlashMessage::success("Профиль обновлён.").send();
            redirect(urls::INDEX)
        }
        Err(ServiceError::Form(message) | ServiceError::Conflict(message)) => {
            let mut context =
                base_context(&flash_messages, Some(&user), "edit_profile", &server_config);
            context.insert("form", &form);
            context.insert("error", &message);
            render_template(&tera, "blog/user.html", &context)
        }
        Err(err) => error_response(err, request.path()),
    }
}
