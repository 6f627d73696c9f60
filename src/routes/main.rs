use actix_web::{HttpRequest, Responder, get, web};
use actix_web_flash_messages::IncomingFlashMessages;
use tera::Tera;

use crate::domain::auth::AuthenticatedUser;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{PageQuery, base_context, error_response, now, render_template};
use crate::services::posts::home_page;

#[get("/")]
pub async fn index(
    request: HttpRequest,
    user: Option<AuthenticatedUser>,
    flash_messages: IncomingFlashMessages,
    query: web::Query<PageQuery>,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match home_page(
        query.number(),
        server_config.posts_per_page,
        now(),
        repo.get_ref(),
    ) {
        Ok(page_obj) => {
            let mut context =
                base_context(&flash_messages, user.as_ref(), "index", &server_config);
            context.insert("page_obj", &page_obj);
            render_template(&tera, "blog/index.html", &context)
        }
        Err(err) => error_response(err, request.path()),
    }
}

#[get("/pages/about/")]
pub async fn about(
    user: Option<AuthenticatedUser>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let context = base_context(&flash_messages, user.as_ref(), "about", &server_config);
    render_template(&tera, "pages/about.html", &context)
}

#[get("/pages/rules/")]
pub async fn rules(
    user: Option<AuthenticatedUser>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let context = base_context(&flash_messages, user.as_ref(), "rules", &server_config);
    render_template(&tera, "pages/rules.html", &context)
}
