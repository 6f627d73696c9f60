use actix_multipart::form::MultipartForm;
use actix_multipart::form::tempfile::TempFile;
use actix_web::{HttpRequest, HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::IncomingFlashMessages;
use tera::{Context, Tera};

use crate::domain::auth::AuthenticatedUser;
use crate::domain::types::PostId;
use crate::forms::comments::CommentForm;
use crate::forms::posts::{PostForm, PostFormData, PostFormPayload};
use crate::media::{MediaError, remove_post_image, store_post_image};
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{base_context, error_response, now, redirect, render_template};
use crate::services::ServiceError;
use crate::services::posts::{
    create_post as create_post_service, delete_post as delete_post_service,
    post_detail as post_detail_service, post_for_delete, post_for_edit, post_form_choices,
    update_post as update_post_service,
};
use crate::urls;

/// State of the shared create/edit/delete template.
struct PostFormPage<'a> {
    /// One of `create`, `edit`, `delete`.
    mode: &'a str,
    post_id: Option<PostId>,
    form: &'a PostFormData,
    image: Option<&'a str>,
    error: Option<String>,
}

fn render_post_form(
    tera: &Tera,
    mut context: Context,
    page: PostFormPage<'_>,
    repo: &DieselRepository,
) -> HttpResponse {
    let choices = match post_form_choices(repo) {
        Ok(choices) => choices,
        Err(err) => return error_response(err, "/"),
    };

    context.insert("mode", page.mode);
    context.insert("post_id", &page.post_id);
    context.insert("form", page.form);
    context.insert("image", &page.image);
    context.insert("error", &page.error);
    context.insert("categories", &choices.categories);
    context.insert("locations", &choices.locations);
    render_template(tera, "blog/create.html", &context)
}

enum Upload {
    Stored(Option<String>),
    /// The file was refused; the message goes back to the form.
    Rejected(String),
    Failed,
}

fn store_upload(upload: Option<TempFile>, media_root: &str) -> Upload {
    match upload.map(|file| store_post_image(media_root, file)).transpose() {
        Ok(image) => Upload::Stored(image),
        Err(e @ MediaError::NotAnImage) => Upload::Rejected(e.to_string()),
        Err(e) => {
            log::error!("{e}");
            Upload::Failed
        }
    }
}

#[get("/posts/create/")]
pub async fn create_post_page(
    user: AuthenticatedUser,
    flash_messages: IncomingFlashMessages,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let context = base_context(&flash_messages, Some(&user), "create", &server_config);
    let form = PostFormData::default();
    let page = PostFormPage {
        mode: "create",
        post_id: None,
        form: &form,
        image: None,
        error: None,
    };
    render_post_form(&tera, context, page, repo.get_ref())
}

#[post("/posts/create/")]
pub async fn create_post(
    request: HttpRequest,
    user: AuthenticatedUser,
    flash_messages: IncomingFlashMessages,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
    MultipartForm(form): MultipartForm<PostForm>,
) -> impl Responder {
    let context = base_context(&flash_messages, Some(&user), "create", &server_config);
    let (data, upload) = form.into_parts();
    let rerender = |context: Context, error: String| {
        let page = PostFormPage {
            mode: "create",
            post_id: None,
            form: &data,
            image: None,
            error: Some(error),
        };
        render_post_form(&tera, context, page, repo.get_ref())
    };

    let payload: PostFormPayload = match data.clone().try_into() {
        Ok(payload) => payload,
        Err(e) => return rerender(context, ServiceError::from(e).to_string()),
    };

    let image = match store_upload(upload, &server_config.media_root) {
        Upload::Stored(image) => image,
        Upload::Rejected(message) => return rerender(context, message),
        Upload::Failed => return HttpResponse::InternalServerError().finish(),
    };

    match create_post_service(payload, image.clone(), &user, now(), repo.get_ref()) {
        Ok(post) => {
            log::info!("User '{}' created post {}", user.username, post.id);
            redirect(&urls::profile(user.username.as_str()))
        }
        Err(err) => {
            if let Some(image) = &image {
                remove_post_image(&server_config.media_root, image);
            }
            match err {
                ServiceError::Form(message) => rerender(context, message),
                err => error_response(err, request.path()),
            }
        }
    }
}

#[get("/posts/{id}/")]
pub async fn post_detail(
    request: HttpRequest,
    id: web::Path<i32>,
    user: Option<AuthenticatedUser>,
    flash_messages: IncomingFlashMessages,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let Ok(id) = PostId::new(id.into_inner()) else {
        return HttpResponse::NotFound().finish();
    };

    match post_detail_service(id, now(), repo.get_ref()) {
        Ok(detail) => {
            let mut context =
                base_context(&flash_messages, user.as_ref(), "detail", &server_config);
            context.insert("post", &detail.entry);
            context.insert("comments", &detail.comments);
            context.insert("form", &CommentForm::default());
            render_template(&tera, "blog/detail.html", &context)
        }
        Err(err) => error_response(err, request.path()),
    }
}

#[get("/posts/{id}/edit/")]
pub async fn edit_post_page(
    request: HttpRequest,
    id: web::Path<i32>,
    user: AuthenticatedUser,
    flash_messages: IncomingFlashMessages,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let Ok(id) = PostId::new(id.into_inner()) else {
        return HttpResponse::NotFound().finish();
    };

    match post_for_edit(id, &user, repo.get_ref()) {
        Ok(post) => {
            let context = base_context(&flash_messages, Some(&user), "edit", &server_config);
            let form = PostFormData::from(&post);
            let page = PostFormPage {
                mode: "edit",
                post_id: Some(post.id),
                form: &form,
                image: post.image.as_deref(),
                error: None,
            };
            render_post_form(&tera, context, page, repo.get_ref())
        }
        Err(err) => error_response(err, request.path()),
    }
}

#[post("/posts/{id}/edit/")]
pub async fn edit_post(
    request: HttpRequest,
    id: web::Path<i32>,
    user: AuthenticatedUser,
    flash_messages: IncomingFlashMessages,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
    MultipartForm(form): MultipartForm<PostForm>,
) -> impl Responder {
    let Ok(id) = PostId::new(id.into_inner()) else {
        return HttpResponse::NotFound().finish();
    };

    // Ownership is checked before anything from the upload touches the disk.
    let post = match post_for_edit(id, &user, repo.get_ref()) {
        Ok(post) => post,
        Err(err) => return error_response(err, request.path()),
    };

    let context = base_context(&flash_messages, Some(&user), "edit", &server_config);
    let (data, upload) = form.into_parts();
    let rerender = |context: Context, error: String| {
        let page = PostFormPage {
            mode: "edit",
            post_id: Some(id),
            form: &data,
            image: post.image.as_deref(),
            error: Some(error),
        };
        render_post_form(&tera, context, page, repo.get_ref())
    };

    let payload: PostFormPayload = match data.clone().try_into() {
        Ok(payload) => payload,
        Err(e) => return rerender(context, ServiceError::from(e).to_string()),
    };

    let image = match store_upload(upload, &server_config.media_root) {
        Upload::Stored(image) => image,
        Upload::Rejected(message) => return rerender(context, message),
        Upload::Failed => return HttpResponse::InternalServerError().finish(),
    };

    match update_post_service(id, payload, image.clone(), &user, repo.get_ref()) {
        Ok(updated) => {
            if let Some(stale) = &updated.stale_image {
                remove_post_image(&server_config.media_root, stale);
            }
            redirect(&urls::post_detail(updated.id))
        }
        Err(err) => {
            if let Some(image) = &image {
                remove_post_image(&server_config.media_root, image);
            }
            match err {
                ServiceError::Form(message) => rerender(context, message),
                err => error_response(err, request.path()),
            }
        }
    }
}

#[get("/posts/{id}/delete/")]
pub async fn delete_post_page(
    request: HttpRequest,
    id: web::Path<i32>,
    user: AuthenticatedUser,
    flash_messages: IncomingFlashMessages,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let Ok(id) = PostId::new(id.into_inner()) else {
        return HttpResponse::NotFound().finish();
    };

    match post_for_delete(id, &user, repo.get_ref()) {
        Ok(post) => {
            let context = base_context(&flash_messages, Some(&user), "delete", &server_config);
            let form = PostFormData::from(&post);
            let page = PostFormPage {
                mode: "delete",
                post_id: Some(post.id),
                form: &form,
                image: post.image.as_deref(),
                error: None,
            };
            render_post_form(&tera, context, page, repo.get_ref())
        }
        Err(err) => error_response(err, request.path()),
    }
}

#[post("/posts/{id}/delete/")]
pub async fn delete_post(
    request: HttpRequest,
    id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
) -> impl Responder {
    let Ok(id) = PostId::new(id.into_inner()) else {
        return HttpResponse::NotFound().finish();
    };

    match delete_post_service(id, &user, repo.get_ref()) {
        Ok(image) => {
            if let Some(image) = image {
                remove_post_image(&server_config.media_root, &image);
            }
            log::info!("User '{}' deleted post {id}", user.username);
            redirect(urls::INDEX)
        }
        Err(err) => error_response(err, request.path()),
    }
}
