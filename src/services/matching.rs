//! Suggestion scoring and ranking
//!
//! Pure functions over already loaded rows. A candidate scores
//! `weight(kind) * level` for every active tag it shares with the user;
//! candidates are then ordered by score, recency, creation time and id so
//! that two calls over the same data always agree.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;
use crate::config::MatchingConfig;
use crate::models::event::Event;
use crate::models::suggestion::{MatchedTag, Suggestion};
use crate::models::tag::{Tag, TagKind, UserTag};

/// Per-kind score weights
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchWeights {
    pub interest: u32,
    pub food: u32,
    pub travel_style: u32,
    pub category: u32,
    pub generic: u32,
}

impl Default for MatchWeights {
    fn default() -> Self {
        Self {
            interest: 3,
            food: 2,
            travel_style: 2,
            category: 1,
            generic: 1,
        }
    }
}

impl From<&MatchingConfig> for MatchWeights {
    fn from(config: &MatchingConfig) -> Self {
        Self {
            interest: config.interest_weight,
            food: config.food_weight,
            travel_style: config.travel_style_weight,
            category: config.category_weight,
            generic: config.generic_weight,
        }
    }
}

impl MatchWeights {
    pub fn weight(&self, kind: TagKind) -> u32 {
        match kind {
            TagKind::Interest => self.interest,
            TagKind::Food => self.food,
            TagKind::TravelStyle => self.travel_style,
            TagKind::Category => self.category,
            TagKind::Generic => self.generic,
        }
    }
}

/// The user's tag selections keyed by tag id, with their effective level
#[derive(Debug, Clone, Default)]
pub struct PreferenceProfile {
    levels: HashMap<i64, u32>,
}

impl PreferenceProfile {
    pub fn from_user_tags(tags: &[UserTag]) -> Self {
        let levels = tags
            .iter()
            .map(|tag| {
                let level = if tag.kind.has_levels() { tag.level.max(1) as u32 } else { 1 };
                (tag.tag_id, level)
            })
            .collect();
        Self { levels }
    }

    pub fn level(&self, tag_id: i64) -> Option<u32> {
        self.levels.get(&tag_id).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

/// Score one event's tags against a profile
pub fn score_tags(weights: &MatchWeights, profile: &PreferenceProfile, event_tags: &[Tag]) -> (u32, Vec<MatchedTag>) {
    let mut seen = HashSet::new();
    let mut matched = Vec::new();
    let mut score = 0u32;

    for tag in event_tags.iter().filter(|tag| tag.is_active) {
        if !seen.insert(tag.id) {
            continue;
        }
        if let Some(level) = profile.level(tag.id) {
            let contribution = weights.weight(tag.kind).saturating_mul(level);
            score = score.saturating_add(contribution);
            matched.push(MatchedTag {
                tag_id: tag.id,
                kind: tag.kind,
                code: tag.code.clone(),
                name: tag.name.clone(),
                contribution,
            });
        }
    }

    matched.sort_by(|a, b| b.contribution.cmp(&a.contribution).then(a.tag_id.cmp(&b.tag_id)));
    (score, matched)
}

/// Total order used for suggestion lists
pub fn compare_suggestions(a: &Suggestion, b: &Suggestion) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| b.event.recency_key().cmp(&a.event.recency_key()))
        .then_with(|| b.event.created_at.cmp(&a.event.created_at))
        .then_with(|| a.event.id.cmp(&b.event.id))
}

/// Score and order every candidate. Candidates without overlap stay in the list at score 0.
pub fn rank(
    weights: &MatchWeights,
    profile: &PreferenceProfile,
    candidates: Vec<Event>,
    tags_by_event: &HashMap<Uuid, Vec<Tag>>,
) -> Vec<Suggestion> {
    let mut suggestions: Vec<Suggestion> = candidates
        .into_iter()
        .map(|event| {
            let tags = tags_by_event.get(&event.id).map(Vec::as_slice).unwrap_or(&[]);
            let (score, matched_tags) = score_tags(weights, profile, tags);
            Suggestion { event, score, matched_tags }
        })
        .collect();

    suggestions.sort_by(compare_suggestions);
    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use crate::models::event::{EventStatus, EventType};

    fn tag(id: i64, kind: TagKind) -> Tag {
        Tag {
            id,
            kind,
            code: format!("tag_{}", id),
            name: format!("Tag {}", id),
            icon: None,
            sort_order: 0,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    fn user_tag(tag_id: i64, kind: TagKind, level: i16) -> UserTag {
        UserTag {
            user_id: Uuid::nil(),
            tag_id,
            kind,
            code: format!("tag_{}", tag_id),
            name: format!("Tag {}", tag_id),
            level,
            updated_at: Utc::now(),
        }
    }

    fn event(id: u128, created_offset_hours: i64) -> Event {
        let created_at = Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap() + Duration::hours(created_offset_hours);
        Event {
            id: Uuid::from_u128(id),
            creator_id: Uuid::nil(),
            title: format!("Event {}", id),
            description: None,
            event_type: EventType::Meal,
            location_name: None,
            latitude: None,
            longitude: None,
            start_at: None,
            end_at: None,
            max_participants: None,
            budget_min: None,
            budget_max: None,
            status: EventStatus::Published,
            cover_image_url: None,
            photo_urls: Vec::new(),
            created_at,
            updated_at: created_at,
        }
    }

    #[test]
    fn test_weights_from_config() {
        let config = crate::config::Settings::default().matching;
        assert_eq!(MatchWeights::from(&config), MatchWeights::default());
    }

    #[test]
    fn test_food_level_multiplies_weight() {
        let weights = MatchWeights::default();
        let profile = PreferenceProfile::from_user_tags(&[
            user_tag(1, TagKind::Food, 3),
            user_tag(2, TagKind::Interest, 3),
        ]);

        let (score, matched) = score_tags(&weights, &profile, &[tag(1, TagKind::Food), tag(2, TagKind::Interest)]);
        // food 2 * 3, interest 3 * 1 (non-food levels do not scale)
        assert_eq!(score, 9);
        assert_eq!(matched.len(), 2);
        assert_eq!(matched[0].contribution, 6);
        assert_eq!(matched[0].tag_id, 1);
    }

    #[test]
    fn test_inactive_and_duplicate_tags_do_not_count() {
        let weights = MatchWeights::default();
        let profile = PreferenceProfile::from_user_tags(&[user_tag(5, TagKind::Generic, 1)]);
        let mut inactive = tag(6, TagKind::Generic);
        inactive.is_active = false;

        let (score, matched) = score_tags(&weights, &profile, &[tag(5, TagKind::Generic), tag(5, TagKind::Generic), inactive]);
        assert_eq!(score, 1);
        assert_eq!(matched.len(), 1);
    }

    #[test]
    fn test_rank_orders_by_score_then_recency_then_id() {
        let weights = MatchWeights::default();
        let profile = PreferenceProfile::from_user_tags(&[user_tag(1, TagKind::Interest, 1)]);

        let older = event(1, 0);
        let newer = event(2, 5);
        let tie_a = event(3, 2);
        let tie_b = event(4, 2);
        let tagged = event(5, -100);

        let mut tags = HashMap::new();
        tags.insert(tagged.id, vec![tag(1, TagKind::Interest)]);

        let ranked = rank(&weights, &profile, vec![older, tie_b, tagged, newer, tie_a], &tags);
        let ids: Vec<u128> = ranked.iter().map(|s| s.event.id.as_u128()).collect();
        assert_eq!(ids, vec![5, 2, 3, 4, 1]);
        assert_eq!(ranked[0].score, 3);
        assert!(ranked[1..].iter().all(|s| s.score == 0 && s.matched_tags.is_empty()));
    }

    #[test]
    fn test_start_time_drives_recency() {
        let weights = MatchWeights::default();
        let profile = PreferenceProfile::default();

        let mut later_start = event(1, 0);
        later_start.start_at = Some(later_start.created_at + Duration::days(30));
        let recent = event(2, 24);

        let ranked = rank(&weights, &profile, vec![recent, later_start], &HashMap::new());
        assert_eq!(ranked[0].event.id.as_u128(), 1);
    }

    #[test]
    fn test_rank_is_stable_across_input_orders() {
        let weights = MatchWeights::default();
        let profile = PreferenceProfile::default();
        let events: Vec<Event> = (1..=6).map(|i| event(i, (i as i64) % 2)).collect();

        let forward = rank(&weights, &profile, events.clone(), &HashMap::new());
        let backward = rank(&weights, &profile, events.into_iter().rev().collect(), &HashMap::new());
        let a: Vec<Uuid> = forward.iter().map(|s| s.event.id).collect();
        let b: Vec<Uuid> = backward.iter().map(|s| s.event.id).collect();
        assert_eq!(a, b);
    }
}
