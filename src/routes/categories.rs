use actix_web::{HttpRequest, Responder, get, web};
use actix_web_flash_messages::IncomingFlashMessages;
use tera::Tera;

use crate::domain::auth::AuthenticatedUser;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{PageQuery, base_context, error_response, now, render_template};
use crate::services::categories::category_page;

#[get("/category/{slug}/")]
pub async fn category_posts(
    request: HttpRequest,
    slug: web::Path<String>,
    user: Option<AuthenticatedUser>,
    flash_messages: IncomingFlashMessages,
    query: web::Query<PageQuery>,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match category_page(
        &slug,
        query.number(),
        server_config.posts_per_page,
        now(),
        repo.get_ref(),
    ) {
        Ok(page) => {
            let mut context =
                base_context(&flash_messages, user.as_ref(), "category", &server_config);
            context.insert("category", &page.category);
            context.insert("page_obj", &page.posts);
            render_template(&tera, "blog/category.html", &context)
        }
        Err(err) => error_response(err, request.path()),
    }
}
