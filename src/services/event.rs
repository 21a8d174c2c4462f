//! Event service implementation
//!
//! Event CRUD for creators, the public read side, and cover/gallery images.
//! Membership transitions live in [`super::membership`].

use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;
use crate::config::{EventRulesConfig, Settings};
use crate::database::DatabaseService;
use crate::models::event::{CreateEventRequest, Event, EventDetails, EventFilter, EventStatus, UpdateEventRequest};
use crate::models::pagination::{Page, PageRequest};
use crate::models::tag::TagKind;
use crate::services::storage::{event_image_key, check_upload_size, ObjectStorage};
use crate::services::taxonomy::TaxonomyService;
use crate::utils::errors::{Result, TripBuddyError};
use crate::utils::helpers::is_http_url;
use crate::utils::logging::{log_api_error, log_event_action, log_rejection};

/// Field values an event will hold after a create or update
struct EventShape<'a> {
    title: &'a str,
    description: Option<&'a str>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    start_at: Option<chrono::DateTime<chrono::Utc>>,
    end_at: Option<chrono::DateTime<chrono::Utc>>,
    max_participants: Option<i32>,
    budget_min: Option<i32>,
    budget_max: Option<i32>,
    cover_image_url: Option<&'a str>,
    photo_urls: &'a [String],
}

fn validate_shape(shape: &EventShape<'_>, rules: &EventRulesConfig) -> Result<()> {
    let title_length = shape.title.trim().chars().count();
    if title_length == 0 {
        return Err(TripBuddyError::invalid("title must not be empty"));
    }
    if title_length > rules.max_title_length {
        return Err(TripBuddyError::invalid(format!(
            "title must be at most {} characters",
            rules.max_title_length
        )));
    }

    if let Some(description) = shape.description {
        if description.chars().count() > rules.max_description_length {
            return Err(TripBuddyError::invalid(format!(
                "description must be at most {} characters",
                rules.max_description_length
            )));
        }
    }

    if let Some(latitude) = shape.latitude {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(TripBuddyError::invalid("latitude must be between -90 and 90"));
        }
    }
    if let Some(longitude) = shape.longitude {
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(TripBuddyError::invalid("longitude must be between -180 and 180"));
        }
    }

    if let (Some(start), Some(end)) = (shape.start_at, shape.end_at) {
        if end < start {
            return Err(TripBuddyError::invalid("end time must not be before start time"));
        }
    }

    if let Some(capacity) = shape.max_participants {
        if capacity < 1 {
            return Err(TripBuddyError::invalid("max participants must be at least 1"));
        }
    }

    if shape.budget_min.map_or(false, |v| v < 0) || shape.budget_max.map_or(false, |v| v < 0) {
        return Err(TripBuddyError::invalid("budget must not be negative"));
    }
    if let (Some(min), Some(max)) = (shape.budget_min, shape.budget_max) {
        if min > max {
            return Err(TripBuddyError::invalid("budget minimum must not exceed maximum"));
        }
    }

    if let Some(url) = shape.cover_image_url {
        if !is_http_url(url) {
            return Err(TripBuddyError::invalid(format!("invalid cover image url: {}", url)));
        }
    }
    if shape.photo_urls.len() > rules.max_gallery_photos {
        return Err(TripBuddyError::invalid(format!(
            "gallery holds at most {} photos",
            rules.max_gallery_photos
        )));
    }
    if let Some(url) = shape.photo_urls.iter().find(|url| !is_http_url(url)) {
        return Err(TripBuddyError::invalid(format!("invalid photo url: {}", url)));
    }

    Ok(())
}

/// Validate a create payload
pub fn validate_create(request: &CreateEventRequest, rules: &EventRulesConfig) -> Result<()> {
    if let Some(status) = request.status {
        if !matches!(status, EventStatus::Draft | EventStatus::Published) {
            return Err(TripBuddyError::invalid(format!("events cannot be created as {}", status)));
        }
    }

    validate_shape(
        &EventShape {
            title: &request.title,
            description: request.description.as_deref(),
            latitude: request.latitude,
            longitude: request.longitude,
            start_at: request.start_at,
            end_at: request.end_at,
            max_participants: request.max_participants,
            budget_min: request.budget_min,
            budget_max: request.budget_max,
            cover_image_url: request.cover_image_url.as_deref(),
            photo_urls: &request.photo_urls,
        },
        rules,
    )
}

/// Validate a patch against the values it would leave stored
pub fn validate_update(current: &Event, patch: &UpdateEventRequest, rules: &EventRulesConfig) -> Result<()> {
    validate_shape(
        &EventShape {
            title: patch.title.as_deref().unwrap_or(&current.title),
            description: patch.description.as_deref().or(current.description.as_deref()),
            latitude: patch.latitude.or(current.latitude),
            longitude: patch.longitude.or(current.longitude),
            start_at: patch.start_at.or(current.start_at),
            end_at: patch.end_at.or(current.end_at),
            max_participants: patch.max_participants.or(current.max_participants),
            budget_min: patch.budget_min.or(current.budget_min),
            budget_max: patch.budget_max.or(current.budget_max),
            cover_image_url: patch.cover_image_url.as_deref().or(current.cover_image_url.as_deref()),
            photo_urls: &current.photo_urls,
        },
        rules,
    )
}

#[derive(Clone, Debug)]
pub struct EventService {
    db: DatabaseService,
    taxonomy: TaxonomyService,
    storage: Arc<dyn ObjectStorage>,
    settings: Settings,
}

impl EventService {
    pub fn new(db: DatabaseService, taxonomy: TaxonomyService, storage: Arc<dyn ObjectStorage>, settings: Settings) -> Self {
        Self {
            db,
            taxonomy,
            storage,
            settings,
        }
    }

    /// Load a live event or fail with `EventNotFound`
    async fn load(&self, event_id: Uuid) -> Result<Event> {
        self.db
            .events
            .find_live(event_id)
            .await?
            .ok_or(TripBuddyError::EventNotFound { event_id })
    }

    /// Load a live event the caller created
    async fn load_owned(&self, caller_id: Uuid, event_id: Uuid, action: &str) -> Result<Event> {
        let event = self.load(event_id).await?;
        if !event.is_creator(caller_id) {
            let err = TripBuddyError::forbidden(format!("only the creator can {} this event", action));
            log_rejection(action, &err);
            return Err(err);
        }
        Ok(event)
    }

    pub async fn create(&self, creator_id: Uuid, mut request: CreateEventRequest) -> Result<Event> {
        debug!(creator_id = %creator_id, title = %request.title, "Creating event");

        validate_create(&request, &self.settings.events)?;
        request.title = request.title.trim().to_string();

        self.db.require_user(creator_id).await?;
        let tag_ids = self
            .taxonomy
            .resolve_event_tags(&request.category_ids, &request.tag_ids)
            .await?;

        let event = self.db.events.create(creator_id, request, &tag_ids).await?;
        log_event_action(event.id, "create", creator_id, Some(event.status.as_str()));

        Ok(event)
    }

    pub async fn update(&self, caller_id: Uuid, event_id: Uuid, mut patch: UpdateEventRequest) -> Result<Event> {
        let current = self.load_owned(caller_id, event_id, "update").await?;
        validate_update(&current, &patch, &self.settings.events)?;
        if let Some(title) = patch.title.as_mut() {
            *title = title.trim().to_string();
        }

        // A supplied list replaces its part of the tag set; the other part is kept as stored
        let tag_ids = if patch.category_ids.is_some() || patch.tag_ids.is_some() {
            let (stored_categories, stored_free): (Vec<_>, Vec<_>) = self
                .db
                .events
                .stored_tags(event_id)
                .await?
                .into_iter()
                .partition(|tag| tag.kind == TagKind::Category);

            let categories = patch.category_ids.take();
            let free = patch.tag_ids.take();
            let mut ids = self
                .taxonomy
                .resolve_event_tags(categories.as_deref().unwrap_or(&[]), free.as_deref().unwrap_or(&[]))
                .await?;
            if categories.is_none() {
                ids.extend(stored_categories.iter().map(|tag| tag.id));
            }
            if free.is_none() {
                ids.extend(stored_free.iter().map(|tag| tag.id));
            }
            ids.sort_unstable();
            ids.dedup();
            Some(ids)
        } else {
            None
        };

        let event = self
            .db
            .events
            .update(event_id, patch, tag_ids)
            .await
            .map_err(|err| {
                log_rejection("update", &err);
                err
            })?;

        log_event_action(event_id, "update", caller_id, Some(event.status.as_str()));
        Ok(event)
    }

    /// Soft delete; every later read reports the event as missing
    pub async fn delete(&self, caller_id: Uuid, event_id: Uuid) -> Result<()> {
        self.load_owned(caller_id, event_id, "delete").await?;

        if !self.db.events.soft_delete(event_id).await? {
            return Err(TripBuddyError::EventNotFound { event_id });
        }

        log_event_action(event_id, "delete", caller_id, None);
        Ok(())
    }

    /// Move a published event to `completed`
    pub async fn complete(&self, caller_id: Uuid, event_id: Uuid) -> Result<Event> {
        self.load_owned(caller_id, event_id, "complete").await?;

        let event = self.db.events.complete(event_id).await.map_err(|err| {
            log_rejection("complete", &err);
            err
        })?;

        log_event_action(event_id, "complete", caller_id, None);
        Ok(event)
    }

    pub async fn get(&self, event_id: Uuid) -> Result<Event> {
        self.load(event_id).await
    }

    pub async fn get_details(&self, event_id: Uuid) -> Result<EventDetails> {
        let event = self.load(event_id).await?;
        let tags = self
            .db
            .events
            .tags_for_events(&[event_id])
            .await?
            .into_iter()
            .map(|row| row.tag)
            .collect();
        let confirmed_count = self.db.events.confirmed_count(event_id).await?;

        Ok(EventDetails {
            event,
            tags,
            confirmed_count,
        })
    }

    /// Published events, newest first
    pub async fn list(&self, filter: &EventFilter, page: PageRequest) -> Result<Page<Event>> {
        page.validate(self.settings.matching.max_page_size)?;
        let (events, total) = self.db.events.list_published(filter, page).await?;
        Ok(Page::new(events, total, page))
    }

    /// Every live event the caller created, whatever its status
    pub async fn list_created(&self, caller_id: Uuid, page: PageRequest) -> Result<Page<Event>> {
        page.validate(self.settings.matching.max_page_size)?;
        let (events, total) = self.db.events.list_by_creator(caller_id, page).await?;
        Ok(Page::new(events, total, page))
    }

    pub async fn upload_cover_image(&self, caller_id: Uuid, event_id: Uuid, content_type: &str, bytes: Vec<u8>) -> Result<Event> {
        let current = self.load_owned(caller_id, event_id, "upload images for").await?;
        check_upload_size(bytes.len(), self.settings.storage.max_upload_bytes)?;

        let key = event_image_key(event_id, content_type)?;
        let stored = self.storage.put(&key, content_type, bytes).await?;

        let event = match self.db.events.set_cover_image(event_id, &stored.url).await? {
            Some(event) => event,
            None => {
                self.discard(&stored.key).await;
                return Err(TripBuddyError::EventNotFound { event_id });
            }
        };

        if let Some(previous) = current.cover_image_url.as_deref() {
            if let Some(previous_key) = self.storage.key_for_url(previous) {
                self.discard(&previous_key).await;
            }
        }

        log_event_action(event_id, "cover_image", caller_id, Some(&stored.key));
        Ok(event)
    }

    pub async fn add_gallery_photo(&self, caller_id: Uuid, event_id: Uuid, content_type: &str, bytes: Vec<u8>) -> Result<Event> {
        let current = self.load_owned(caller_id, event_id, "upload images for").await?;
        let max_photos = self.settings.events.max_gallery_photos;
        if current.photo_urls.len() >= max_photos {
            return Err(TripBuddyError::invalid(format!("gallery holds at most {} photos", max_photos)));
        }
        check_upload_size(bytes.len(), self.settings.storage.max_upload_bytes)?;

        let key = event_image_key(event_id, content_type)?;
        let stored = self.storage.put(&key, content_type, bytes).await?;

        match self.db.events.append_photo(event_id, &stored.url, max_photos).await? {
            Some(event) => {
                log_event_action(event_id, "gallery_add", caller_id, Some(&stored.key));
                Ok(event)
            }
            None => {
                // Lost a race with another upload or a delete
                self.discard(&stored.key).await;
                match self.db.events.find_live(event_id).await? {
                    Some(_) => Err(TripBuddyError::invalid(format!("gallery holds at most {} photos", max_photos))),
                    None => Err(TripBuddyError::EventNotFound { event_id }),
                }
            }
        }
    }

    pub async fn remove_gallery_photo(&self, caller_id: Uuid, event_id: Uuid, url: &str) -> Result<Event> {
        let current = self.load_owned(caller_id, event_id, "edit the gallery of").await?;
        if !current.photo_urls.iter().any(|photo| photo == url) {
            return Err(TripBuddyError::invalid(format!("photo is not part of the gallery: {}", url)));
        }

        let event = self
            .db
            .events
            .remove_photo(event_id, url)
            .await?
            .ok_or(TripBuddyError::EventNotFound { event_id })?;

        if let Some(key) = self.storage.key_for_url(url) {
            self.discard(&key).await;
        }

        log_event_action(event_id, "gallery_remove", caller_id, None);
        Ok(event)
    }

    /// Best-effort removal of an object nobody references any more
    async fn discard(&self, key: &str) {
        if let Err(e) = self.storage.delete(key).await {
            log_api_error("object_storage", &e.to_string(), Some(key));
        } else {
            info!(key = key, "Unreferenced object deleted");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use crate::models::event::EventType;
    use crate::utils::errors::ErrorKind;

    fn rules() -> EventRulesConfig {
        Settings::default().events
    }

    fn stored_event() -> Event {
        let now = Utc::now();
        Event {
            id: Uuid::new_v4(),
            creator_id: Uuid::new_v4(),
            title: "Ramen crawl".to_string(),
            description: None,
            event_type: EventType::Meal,
            location_name: Some("Shinjuku".to_string()),
            latitude: Some(35.69),
            longitude: Some(139.70),
            start_at: Some(now + Duration::days(2)),
            end_at: Some(now + Duration::days(2) + Duration::hours(3)),
            max_participants: Some(4),
            budget_min: Some(1000),
            budget_max: Some(3000),
            status: EventStatus::Published,
            cover_image_url: None,
            photo_urls: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn assert_validation(result: Result<()>) {
        assert_eq!(result.unwrap_err().kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_create_accepts_minimal_payload() {
        let request = CreateEventRequest::new("Sunrise hike", EventType::Activity);
        assert!(validate_create(&request, &rules()).is_ok());
    }

    #[test]
    fn test_create_rejects_bad_titles() {
        assert_validation(validate_create(&CreateEventRequest::new("   ", EventType::Meal), &rules()));
        let long = "x".repeat(121);
        assert_validation(validate_create(&CreateEventRequest::new(long, EventType::Meal), &rules()));
    }

    #[test]
    fn test_create_rejects_inconsistent_fields() {
        let now = Utc::now();

        let mut schedule = CreateEventRequest::new("Day trip", EventType::OneDayTrip);
        schedule.start_at = Some(now);
        schedule.end_at = Some(now - Duration::hours(1));
        assert_validation(validate_create(&schedule, &rules()));

        let mut budget = CreateEventRequest::new("Dinner", EventType::Meal);
        budget.budget_min = Some(50);
        budget.budget_max = Some(10);
        assert_validation(validate_create(&budget, &rules()));

        let mut capacity = CreateEventRequest::new("Dinner", EventType::Meal);
        capacity.max_participants = Some(0);
        assert_validation(validate_create(&capacity, &rules()));

        let mut geo = CreateEventRequest::new("Dinner", EventType::Meal);
        geo.latitude = Some(91.0);
        assert_validation(validate_create(&geo, &rules()));

        let mut cover = CreateEventRequest::new("Dinner", EventType::Meal);
        cover.cover_image_url = Some("not-a-url".to_string());
        assert_validation(validate_create(&cover, &rules()));
    }

    #[test]
    fn test_create_status_is_draft_or_published() {
        let mut request = CreateEventRequest::new("Dinner", EventType::Meal);
        request.status = Some(EventStatus::Draft);
        assert!(validate_create(&request, &rules()).is_ok());
        request.status = Some(EventStatus::Completed);
        assert_validation(validate_create(&request, &rules()));
    }

    #[test]
    fn test_update_checks_merged_values() {
        let current = stored_event();

        let keep_all = UpdateEventRequest::default();
        assert!(validate_update(&current, &keep_all, &rules()).is_ok());

        // Only the end moves, before the stored start
        let early_end = UpdateEventRequest {
            end_at: current.start_at.map(|start| start - Duration::hours(1)),
            ..Default::default()
        };
        assert_validation(validate_update(&current, &early_end, &rules()));

        let low_max = UpdateEventRequest {
            budget_max: Some(500),
            ..Default::default()
        };
        assert_validation(validate_update(&current, &low_max, &rules()));
    }
}
