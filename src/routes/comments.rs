use actix_web::{HttpRequest, HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::IncomingFlashMessages;
use tera::Tera;

use crate::domain::auth::AuthenticatedUser;
use crate::domain::types::{CommentId, PostId};
use crate::forms::comments::CommentForm;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{base_context, error_response, now, redirect, render_template};
use crate::services::ServiceError;
use crate::services::comments::{
    add_comment as add_comment_service, delete_comment as delete_comment_service,
    owned_comment, update_comment as update_comment_service,
};
use crate::urls;

/// `/posts/{id}/.../{comment_id}/` path segments.
fn comment_path(path: (i32, i32)) -> Option<(PostId, CommentId)> {
    let post_id = PostId::new(path.0).ok()?;
    let comment_id = CommentId::new(path.1).ok()?;
    Some((post_id, comment_id))
}

#[post("/posts/{id}/comment/")]
pub async fn add_comment(
    request: HttpRequest,
    id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<CommentForm>,
) -> impl Responder {
    let Ok(post_id) = PostId::new(id.into_inner()) else {
        return HttpResponse::NotFound().finish();
    };

    match add_comment_service(post_id, form, &user, now(), repo.get_ref()) {
        Ok(_) => redirect(&urls::post_detail(post_id)),
        Err(err) => error_response(err, request.path()),
    }
}

#[get("/posts/{id}/edit_comment/{comment_id}/")]
pub async fn edit_comment_page(
    request: HttpRequest,
    path: web::Path<(i32, i32)>,
    user: AuthenticatedUser,
    flash_messages: IncomingFlashMessages,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let Some((_, comment_id)) = comment_path(path.into_inner()) else {
        return HttpResponse::NotFound().finish();
    };

    match owned_comment(
        comment_id,
        &user,
        server_config.comment_denied_redirect,
        repo.get_ref(),
    ) {
        Ok(comment) => {
            let mut context =
                base_context(&flash_messages, Some(&user), "comment", &server_config);
            let form = CommentForm {
                text: comment.text.to_string(),
            };
            context.insert("form", &form);
            context.insert("comment", &comment);
            context.insert("mode", "edit");
            render_template(&tera, "blog/comment.html", &context)
        }
        Err(err) => error_response(err, request.path()),
    }
}

#[post("/posts/{id}/edit_comment/{comment_id}/")]
pub async fn edit_comment(
    request: HttpRequest,
    path: web::Path<(i32, i32)>,
    user: AuthenticatedUser,
    flash_messages: IncomingFlashMessages,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
    web::Form(form): web::Form<CommentForm>,
) -> impl Responder {
    let Some((_, comment_id)) = comment_path(path.into_inner()) else {
        return HttpResponse::NotFound().finish();
    };

    match update_comment_service(
        comment_id,
        form.clone(),
        &user,
        server_config.comment_denied_redirect,
        repo.get_ref(),
    ) {
        Ok(post_id) => redirect(&urls::post_detail(post_id)),
        Err(ServiceError::Form(message)) => {
            let mut context =
                base_context(&flash_messages, Some(&user), "comment", &server_config);
            context.insert("form", &form);
            context.insert("error", &message);
            context.insert("mode", "edit");
            render_template(&tera, "blog/comment.html", &context)
        }
        Err(err) => error_response(err, request.path()),
    }
}

#[get("/posts/{id}/delete_comment/{comment_id}/")]
pub async fn delete_comment_page(
    request: HttpRequest,
    path: web::Path<(i32, i32)>,
    user: AuthenticatedUser,
    flash_messages: IncomingFlashMessages,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let Some((_, comment_id)) = comment_path(path.into_inner()) else {
        return HttpResponse::NotFound().finish();
    };

    match owned_comment(
        comment_id,
        &user,
        server_config.comment_denied_redirect,
        repo.get_ref(),
    ) {
        Ok(comment) => {
            let mut context =
                base_context(&flash_messages, Some(&user), "comment", &server_config);
            context.insert("comment", &comment);
            context.insert("mode", "delete");
            render_template(&tera, "blog/comment.html", &context)
        }
        Err(err) => error_response(err, request.path()),
    }
}

#[post("/posts/{id}/delete_comment/{comment_id}/")]
pub async fn delete_comment(
    request: HttpRequest,
    path: web::Path<(i32, i32)>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
) -> impl Responder {
    let Some((_, comment_id)) = comment_path(path.into_inner()) else {
        return HttpResponse::NotFound().finish();
    };

    match delete_comment_service(
        comment_id,
        &user,
        server_config.comment_denied_redirect,
        repo.get_ref(),
    ) {
        Ok(post_id) => redirect(&urls::post_detail(post_id)),
        Err(err) => error_response(err, request.path()),
    }
}
