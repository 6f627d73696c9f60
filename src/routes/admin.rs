use actix_web::{HttpRequest, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::admin::EMPTY_VALUE_DISPLAY;
use crate::domain::auth::AuthenticatedUser;
use crate::forms::admin::{AddCategoryForm, AddLocationForm};
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{PageQuery, base_context, error_response, redirect, render_template};
use crate::services::ServiceError;
use crate::services::admin::{
    add_category as add_category_service, add_location as add_location_service, admin_index,
    delete_entry as delete_entry_service, model_listing as model_listing_service,
    toggle_published as toggle_published_service,
};

fn listing_url(model: &str) -> String {
    format!("/admin/{model}/")
}

#[get("/admin/")]
pub async fn index(
    request: HttpRequest,
    user: AuthenticatedUser,
    flash_messages: IncomingFlashMessages,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match admin_index(&user, repo.get_ref()) {
        Ok(models) => {
            let mut context = base_context(&flash_messages, Some(&user), "admin", &server_config);
            context.insert("models", &models);
            render_template(&tera, "admin/index.html", &context)
        }
        Err(err) => error_response(err, request.path()),
    }
}

#[get("/admin/{model}/")]
pub async fn model_listing(
    request: HttpRequest,
    model: web::Path<String>,
    user: AuthenticatedUser,
    flash_messages: IncomingFlashMessages,
    query: web::Query<PageQuery>,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match model_listing_service(
        &model,
        query.number(),
        server_config.posts_per_page,
        &user,
        repo.get_ref(),
    ) {
        Ok(listing) => {
            let mut context = base_context(&flash_messages, Some(&user), "admin", &server_config);
            context.insert("model", &listing.model);
            context.insert("page_obj", &listing.rows);
            context.insert("empty_value_display", EMPTY_VALUE_DISPLAY);
            render_template(&tera, "admin/list.html", &context)
        }
        Err(err) => error_response(err, request.path()),
    }
}

#[post("/admin/categories/")]
pub async fn add_category(
    request: HttpRequest,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<AddCategoryForm>,
) -> impl Responder {
    match add_category_service(form, &user, repo.get_ref()) {
        Ok(category) => FlashMessage::success(format!("Категория «{}» добавлена.", category.title))
            .send(),
        Err(ServiceError::Form(message) | ServiceError::Conflict(message)) => {
            FlashMessage::error(message).send()
        }
        Err(err) => return error_response(err, request.path()),
    }

    redirect(&listing_url("categories"))
}

#[post("/admin/locations/")]
pub async fn add_location(
    request: HttpRequest,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<AddLocationForm>,
) -> impl Responder {
    match add_location_service(form, &user, repo.get_ref()) {
        Ok(location) => {
            FlashMessage::success(format!("Местоположение «{}» добавлено.", location.name)).send()
        }
        Err(ServiceError::Form(message)) => FlashMessage::error(message).send(),
        Err(err) => return error_response(err, request.path()),
    }

    redirect(&listing_url("locations"))
}

#[post("/admin/{model}/{id}/toggle/")]
pub async fn toggle_published(
    request: HttpRequest,
    path: web::Path<(String, i32)>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let (model, id) = path.into_inner();

    match toggle_published_service(&model, id, &user, repo.get_ref()) {
        Ok(true) => FlashMessage::success("Запись опубликована.").send(),
        Ok(false) => FlashMessage::success("Запись снята с публикации.").send(),
        Err(err) => return error_response(err, request.path()),
    }

    redirect(&listing_url(&model))
}

#[post("/admin/{model}/{id}/delete/")]
pub async fn delete_entry(
    request: HttpRequest,
    path: web::Path<(String, i32)>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let (model, id) = path.into_inner();

    match delete_entry_service(&model, id, &user, repo.get_ref()) {
        Ok(()) => FlashMessage::success("Запись удалена.").send(),
        Err(ServiceError::NotFound) => FlashMessage::error("Запись не найдена.").send(),
        Err(err) => return error_response(err, request.path()),
    }

    redirect(&listing_url(&model))
}
