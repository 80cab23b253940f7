//! Post handlers - CRUD, photo upload, and radius search.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use bartr_core::domain::Post;
use bartr_core::ports::GeoQuery;
use bartr_shared::ApiResponse;
use bartr_shared::dto::{CreatePostRequest, GeoSearchQuery, PhotoUploadResponse};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/posts
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    // Validate before any side-effecting call.
    if req.title.trim().is_empty() {
        return Err(AppError::BadRequest("Post must have a title".to_string()));
    }
    if req.description.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Post must have a description".to_string(),
        ));
    }
    if !(-90.0..=90.0).contains(&req.location.lat) || !(-180.0..=180.0).contains(&req.location.lng)
    {
        return Err(AppError::BadRequest(
            "Post location is out of range".to_string(),
        ));
    }

    let post = Post::new(
        identity.user_id,
        req.title,
        req.description,
        req.tags,
        req.location,
    );
    let saved = state.store.save_post(post).await?;

    // Indexing is best effort; the post exists either way.
    if let Err(e) = state.search.index_post(&saved).await {
        tracing::warn!(post_id = %saved.id, "failed to index post: {}", e);
    }

    Ok(HttpResponse::Created().json(ApiResponse::ok(saved)))
}

/// GET /api/posts
pub async fn list(state: web::Data<AppState>, _identity: Identity) -> AppResult<HttpResponse> {
    let posts = state.store.list_posts().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(posts)))
}

/// GET /api/posts/{post_id}
pub async fn get(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = state.store.get_post(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(post)))
}

/// DELETE /api/posts/{post_id}
///
/// Owner-only. Removes the post, its stored images, and its index entry.
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();

    let post = state.store.get_post(post_id).await?;
    if post.user_id != identity.user_id {
        return Err(AppError::Forbidden);
    }

    state.store.delete_post(post_id).await?;

    // The row is gone; image and index cleanup are best effort.
    if let Err(e) = state.media.delete_post_images(post_id).await {
        tracing::warn!(%post_id, "failed to delete post images: {}", e);
    }
    if let Err(e) = state.search.remove_post(post_id).await {
        tracing::warn!(%post_id, "failed to deindex post: {}", e);
    }

    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(post_id, "Delete succeeded")))
}

/// PUT /api/posts/{post_id}/photos/{filename}
///
/// Raw image bytes in the body. The extension allow list is enforced by
/// the object store; the returned URL is appended to the post.
pub async fn upload_photo(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<(Uuid, String)>,
    bytes: web::Bytes,
) -> AppResult<HttpResponse> {
    let (post_id, filename) = path.into_inner();

    let mut post = state.store.get_post(post_id).await?;
    if post.user_id != identity.user_id {
        return Err(AppError::Forbidden);
    }

    let url = state
        .media
        .put_post_image(post_id, &filename, bytes.to_vec())
        .await?;

    post.photo_urls.push(url.clone());
    post.updated_at = chrono::Utc::now();
    state.store.save_post(post).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(PhotoUploadResponse { url })))
}

/// GET /api/posts/geo?lat=..&lng=..&radius=..
///
/// Typed query extraction rejects malformed parameters before this body
/// runs; the remaining range checks happen before the search call, and
/// exactly one response goes out per request.
pub async fn geo_search(
    state: web::Data<AppState>,
    _identity: Identity,
    query: web::Query<GeoSearchQuery>,
) -> AppResult<HttpResponse> {
    let query = query.into_inner();

    if !query.radius.is_finite() || query.radius <= 0.0 {
        return Err(AppError::BadRequest(
            "Radius must be a positive number".to_string(),
        ));
    }
    if !(-90.0..=90.0).contains(&query.lat) {
        return Err(AppError::BadRequest("Latitude must be a number in [-90, 90]".to_string()));
    }
    if !(-180.0..=180.0).contains(&query.lng) {
        return Err(AppError::BadRequest(
            "Longitude must be a number in [-180, 180]".to_string(),
        ));
    }

    let hits = state
        .search
        .search_radius(GeoQuery {
            lat: query.lat,
            lng: query.lng,
            radius_m: query.radius,
        })
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(hits)))
}
