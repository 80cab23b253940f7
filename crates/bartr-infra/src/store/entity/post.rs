//! Post entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use bartr_core::domain::{GeoPoint, Post, PostState};
use bartr_core::error::StoreError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub photo_urls: Json,
    pub tags: Json,
    pub state: String,
    pub lat: f64,
    pub lng: f64,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to domain Post. Fails on rows whose state
/// string is outside the lifecycle enum.
impl TryFrom<Model> for Post {
    type Error = StoreError;

    fn try_from(model: Model) -> Result<Self, StoreError> {
        let state = PostState::parse(&model.state).ok_or_else(|| {
            StoreError::Query(format!("post {} has unknown state {}", model.id, model.state))
        })?;
        let photo_urls: Vec<String> = serde_json::from_value(model.photo_urls)
            .map_err(|e| StoreError::Query(format!("post {} photo_urls: {}", model.id, e)))?;
        let tags: Vec<String> = serde_json::from_value(model.tags)
            .map_err(|e| StoreError::Query(format!("post {} tags: {}", model.id, e)))?;

        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            title: model.title,
            description: model.description,
            photo_urls,
            tags,
            state,
            location: GeoPoint {
                lat: model.lat,
                lng: model.lng,
            },
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        })
    }
}

/// Conversion from domain Post to SeaORM ActiveModel.
impl From<Post> for ActiveModel {
    fn from(post: Post) -> Self {
        Self {
            id: Set(post.id),
            user_id: Set(post.user_id),
            title: Set(post.title),
            description: Set(post.description),
            photo_urls: Set(serde_json::json!(post.photo_urls)),
            tags: Set(serde_json::json!(post.tags)),
            state: Set(post.state.as_str().to_string()),
            lat: Set(post.location.lat),
            lng: Set(post.location.lng),
            created_at: Set(post.created_at.into()),
            updated_at: Set(post.updated_at.into()),
        }
    }
}
