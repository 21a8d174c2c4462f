//! Swipes and ranked event suggestions

use std::collections::HashMap;
use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;
use crate::config::MatchingConfig;
use crate::database::DatabaseService;
use crate::models::pagination::{Page, PageRequest};
use crate::models::suggestion::Suggestion;
use crate::models::swipe::{EventSwipe, SwipeDirection};
use crate::models::tag::Tag;
use crate::services::matching::{rank, MatchWeights, PreferenceProfile};
use crate::utils::errors::{Result, TripBuddyError};
use crate::utils::logging::log_swipe;

#[derive(Clone, Debug)]
pub struct SuggestionService {
    db: DatabaseService,
    weights: MatchWeights,
    config: MatchingConfig,
}

impl SuggestionService {
    pub fn new(db: DatabaseService, config: MatchingConfig) -> Self {
        Self {
            db,
            weights: MatchWeights::from(&config),
            config,
        }
    }

    /// Record interest in an event. Does not touch membership.
    pub async fn swipe(&self, user_id: Uuid, event_id: Uuid, direction: SwipeDirection) -> Result<EventSwipe> {
        if self.db.events.find_live(event_id).await?.is_none() {
            return Err(TripBuddyError::EventNotFound { event_id });
        }
        self.db.require_user(user_id).await?;

        let swipe = self.db.swipes.upsert(user_id, event_id, direction).await?;
        log_swipe(user_id, event_id, direction.as_str());
        Ok(swipe)
    }

    pub async fn list_swipes(&self, user_id: Uuid, direction: Option<SwipeDirection>) -> Result<Vec<EventSwipe>> {
        self.db.swipes.list_by_user(user_id, direction).await
    }

    /// Rank every candidate for the user, then cut the requested page
    pub async fn get_suggestions(&self, user_id: Uuid, page: PageRequest) -> Result<Page<Suggestion>> {
        page.validate(self.config.max_page_size)?;

        let user_tags = self.db.tags.user_tags(user_id, None).await?;
        let profile = PreferenceProfile::from_user_tags(&user_tags);

        let candidates = self
            .db
            .events
            .suggestion_candidates(user_id, Utc::now(), self.config.exclude_own_events)
            .await?;

        let event_ids: Vec<Uuid> = candidates.iter().map(|event| event.id).collect();
        let mut tags_by_event: HashMap<Uuid, Vec<Tag>> = HashMap::new();
        for row in self.db.events.tags_for_events(&event_ids).await? {
            tags_by_event.entry(row.event_id).or_default().push(row.tag);
        }

        debug!(
            user_id = %user_id,
            candidates = candidates.len(),
            profile_empty = profile.is_empty(),
            "Ranking suggestions"
        );

        let ranked = rank(&self.weights, &profile, candidates, &tags_by_event);
        let result = Page::from_ordered(ranked, page);

        info!(user_id = %user_id, total = result.total, page = page.page, returned = result.items.len(), "Suggestions served");
        Ok(result)
    }
}
