//! Tag and preference taxonomy service
//!
//! Owns the controlled vocabularies and the user selections the suggestion
//! score is computed from.

use std::collections::BTreeSet;
use tracing::{debug, info};
use uuid::Uuid;
use crate::database::DatabaseService;
use crate::models::tag::{CreateTagRequest, Tag, TagKind, UserTag, PREFERENCE_LEVEL_MAX, PREFERENCE_LEVEL_MIN};
use crate::utils::errors::{Result, TripBuddyError};
use crate::utils::helpers::{is_valid_tag_code, normalize_whitespace};

#[derive(Clone, Debug)]
pub struct TaxonomyService {
    db: DatabaseService,
}

/// Sorted, deduplicated copy of `ids`
fn unique_ids(ids: &[i64]) -> Vec<i64> {
    ids.iter().copied().collect::<BTreeSet<_>>().into_iter().collect()
}

/// Check that every requested id resolved to an active tag, of `kind` when given
fn ensure_resolved(requested: &[i64], resolved: &[Tag], kind: Option<TagKind>) -> Result<()> {
    let unknown: Vec<String> = requested
        .iter()
        .filter(|id| {
            !resolved
                .iter()
                .any(|tag| tag.id == **id && kind.map_or(true, |k| tag.kind == k))
        })
        .map(|id| id.to_string())
        .collect();

    if unknown.is_empty() {
        Ok(())
    } else {
        let label = kind.map(|k| k.as_str()).unwrap_or("tag");
        Err(TripBuddyError::invalid(format!("unknown or inactive {} ids: {}", label, unknown.join(", "))))
    }
}

fn validate_level(level: i16) -> Result<()> {
    if !(PREFERENCE_LEVEL_MIN..=PREFERENCE_LEVEL_MAX).contains(&level) {
        return Err(TripBuddyError::invalid(format!(
            "preference level must be between {} and {}",
            PREFERENCE_LEVEL_MIN, PREFERENCE_LEVEL_MAX
        )));
    }
    Ok(())
}

/// Kinds users pick as a plain set
fn is_user_selectable(kind: TagKind) -> bool {
    matches!(kind, TagKind::Interest | TagKind::TravelStyle | TagKind::Category | TagKind::Generic)
}

impl TaxonomyService {
    pub fn new(db: DatabaseService) -> Self {
        Self { db }
    }

    pub async fn list_tags(&self, kind: Option<TagKind>) -> Result<Vec<Tag>> {
        self.db.tags.list(kind).await
    }

    /// Look up active tags by id; unknown ids are simply absent from the result
    pub async fn resolve_active(&self, ids: &[i64]) -> Result<Vec<Tag>> {
        self.db.tags.resolve_active(&unique_ids(ids)).await
    }

    /// Resolve the tag set of an event: categories must be `category` tags, free tags any kind
    pub async fn resolve_event_tags(&self, category_ids: &[i64], tag_ids: &[i64]) -> Result<Vec<i64>> {
        let categories = unique_ids(category_ids);
        let free = unique_ids(tag_ids);

        let mut all: Vec<i64> = categories.iter().chain(free.iter()).copied().collect();
        all = unique_ids(&all);
        let resolved = self.db.tags.resolve_active(&all).await?;

        ensure_resolved(&categories, &resolved, Some(TagKind::Category))?;
        ensure_resolved(&free, &resolved, None)?;
        Ok(all)
    }

    pub async fn get_user_tags(&self, user_id: Uuid, kind: TagKind) -> Result<Vec<UserTag>> {
        self.db.tags.user_tags(user_id, Some(kind)).await
    }

    /// Replace the user's selection of one plain kind (every kind but food)
    pub async fn set_user_tags(&self, user_id: Uuid, kind: TagKind, tag_ids: &[i64]) -> Result<Vec<UserTag>> {
        if !is_user_selectable(kind) {
            return Err(TripBuddyError::invalid(format!("{} tags cannot be selected as a set", kind)));
        }
        self.db.require_user(user_id).await?;

        let ids = unique_ids(tag_ids);
        let resolved = self.db.tags.resolve_active(&ids).await?;
        ensure_resolved(&ids, &resolved, Some(kind))?;

        self.db.tags.replace_user_tags(user_id, kind, &ids).await?;
        info!(user_id = %user_id, kind = %kind, count = ids.len(), "User tags replaced");

        self.get_user_tags(user_id, kind).await
    }

    pub async fn get_food_preferences(&self, user_id: Uuid) -> Result<Vec<UserTag>> {
        self.db.tags.user_tags(user_id, Some(TagKind::Food)).await
    }

    /// Set how much the user likes one food category
    pub async fn update_food_preference(&self, user_id: Uuid, code: &str, level: i16) -> Result<UserTag> {
        validate_level(level)?;

        let tag = self
            .db
            .tags
            .find_active_by_code(TagKind::Food, code)
            .await?
            .ok_or_else(|| TripBuddyError::invalid(format!("unknown food category: {}", code)))?;
        self.db.require_user(user_id).await?;

        self.db.tags.upsert_level(user_id, tag.id, level).await?;
        debug!(user_id = %user_id, code = code, level = level, "Food preference updated");

        self.get_food_preferences(user_id)
            .await?
            .into_iter()
            .find(|pref| pref.tag_id == tag.id)
            .ok_or_else(|| TripBuddyError::TagNotFound(code.to_string()))
    }

    /// Returns false when the user had no preference for `code`
    pub async fn remove_food_preference(&self, user_id: Uuid, code: &str) -> Result<bool> {
        let tag = self
            .db
            .tags
            .find_active_by_code(TagKind::Food, code)
            .await?
            .ok_or_else(|| TripBuddyError::invalid(format!("unknown food category: {}", code)))?;

        self.db.tags.remove_user_tag(user_id, tag.id).await
    }

    /// Add a vocabulary entry
    pub async fn create_tag(&self, mut request: CreateTagRequest) -> Result<Tag> {
        if !is_valid_tag_code(&request.code) {
            return Err(TripBuddyError::invalid(format!("invalid tag code: {}", request.code)));
        }
        request.name = normalize_whitespace(&request.name);
        if request.name.is_empty() {
            return Err(TripBuddyError::invalid("tag name must not be empty"));
        }

        let tag = self.db.tags.create(request).await?;
        info!(tag_id = tag.id, kind = %tag.kind, code = %tag.code, "Tag created");
        Ok(tag)
    }

    pub async fn set_tag_active(&self, tag_id: i64, is_active: bool) -> Result<Tag> {
        let tag = self
            .db
            .tags
            .set_active(tag_id, is_active)
            .await?
            .ok_or_else(|| TripBuddyError::TagNotFound(tag_id.to_string()))?;

        info!(tag_id = tag_id, is_active = is_active, "Tag activation changed");
        Ok(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crate::utils::errors::ErrorKind;

    fn tag(id: i64, kind: TagKind) -> Tag {
        Tag {
            id,
            kind,
            code: format!("t{}", id),
            name: format!("T{}", id),
            icon: None,
            sort_order: 0,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_unique_ids() {
        assert_eq!(unique_ids(&[3, 1, 3, 2]), vec![1, 2, 3]);
        assert!(unique_ids(&[]).is_empty());
    }

    #[test]
    fn test_ensure_resolved_reports_unknown_ids() {
        let resolved = vec![tag(1, TagKind::Category), tag(2, TagKind::Interest)];
        assert!(ensure_resolved(&[1], &resolved, Some(TagKind::Category)).is_ok());
        assert!(ensure_resolved(&[1, 2], &resolved, None).is_ok());

        let wrong_kind = ensure_resolved(&[2], &resolved, Some(TagKind::Category)).unwrap_err();
        assert_eq!(wrong_kind.kind(), ErrorKind::Validation);

        let missing = ensure_resolved(&[1, 99], &resolved, None).unwrap_err();
        assert!(missing.to_string().contains("99"));
    }

    #[test]
    fn test_level_bounds() {
        assert!(validate_level(1).is_ok());
        assert!(validate_level(3).is_ok());
        assert!(validate_level(0).is_err());
        assert!(validate_level(4).is_err());
    }

    #[test]
    fn test_selectable_kinds() {
        assert!(is_user_selectable(TagKind::Interest));
        assert!(is_user_selectable(TagKind::Generic));
        assert!(!is_user_selectable(TagKind::Food));
        assert!(is_user_selectable(TagKind::Category));
    }
}
