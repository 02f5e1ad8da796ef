use foodgram_domain::user::UserRole;
use foodgram_domain::validate::{MAX_TITLE_LEN, validate_hex_color, validate_slug, validate_text};

use crate::domain::repository::TagRepository;
use crate::domain::types::{NewTag, Tag};
use crate::error::ApiError;

// ── ListTags ─────────────────────────────────────────────────────────────────

pub struct ListTagsUseCase<R: TagRepository> {
    pub repo: R,
}

impl<R: TagRepository> ListTagsUseCase<R> {
    pub async fn execute(&self) -> Result<Vec<Tag>, ApiError> {
        self.repo.list().await
    }
}

// ── GetTag ───────────────────────────────────────────────────────────────────

pub struct GetTagUseCase<R: TagRepository> {
    pub repo: R,
}

impl<R: TagRepository> GetTagUseCase<R> {
    pub async fn execute(&self, id: i32) -> Result<Tag, ApiError> {
        self.repo.find_by_id(id).await?.ok_or(ApiError::TagNotFound)
    }
}

// ── CreateTag ────────────────────────────────────────────────────────────────

pub struct CreateTagInput {
    pub name: String,
    pub color: Option<String>,
    pub slug: String,
}

pub struct CreateTagUseCase<R: TagRepository> {
    pub repo: R,
}

impl<R: TagRepository> CreateTagUseCase<R> {
    pub async fn execute(&self, role: UserRole, input: CreateTagInput) -> Result<Tag, ApiError> {
        if !role.can_manage_catalog() {
            return Err(ApiError::Forbidden);
        }
        let name = input.name.trim().to_owned();
        if !validate_text(&name, MAX_TITLE_LEN) {
            return Err(ApiError::InvalidName);
        }
        let color = input.color.map(|c| c.trim().to_owned());
        if color.as_deref().is_some_and(|c| !validate_hex_color(c)) {
            return Err(ApiError::InvalidColor);
        }
        if !validate_slug(&input.slug) {
            return Err(ApiError::InvalidSlug);
        }
        let tag = self
            .repo
            .create(&NewTag {
                name,
                color,
                slug: input.slug,
            })
            .await?
            .ok_or(ApiError::TagAlreadyExists)?;
        tracing::info!(tag_id = tag.id, slug = %tag.slug, "tag created");
        Ok(tag)
    }
}
