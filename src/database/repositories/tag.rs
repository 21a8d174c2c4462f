//! Tag taxonomy and user preference repository

use sqlx::PgPool;
use chrono::Utc;
use uuid::Uuid;
use crate::models::tag::{CreateTagRequest, Tag, TagKind, UserTag};
use crate::utils::errors::TripBuddyError;

const TAG_COLUMNS: &str = "id, kind, code, name, icon, sort_order, is_active, created_at";

const USER_TAG_SELECT: &str = r#"
    SELECT ut.user_id, ut.tag_id, t.kind, t.code, t.name, ut.level, ut.updated_at
    FROM user_tags ut
    INNER JOIN tags t ON t.id = ut.tag_id
"#;

#[derive(Clone, Debug)]
pub struct TagRepository {
    pool: PgPool,
}

impl TagRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Active tags, optionally of one kind, in display order
    pub async fn list(&self, kind: Option<TagKind>) -> Result<Vec<Tag>, TripBuddyError> {
        let tags = sqlx::query_as::<_, Tag>(&format!(
            r#"
            SELECT {TAG_COLUMNS} FROM tags
            WHERE is_active AND ($1::TEXT IS NULL OR kind = $1)
            ORDER BY kind, sort_order, name, id
            "#
        ))
        .bind(kind)
        .fetch_all(&self.pool)
        .await?;

        Ok(tags)
    }

    /// The active subset of `ids`; callers compare lengths to find unknown ids
    pub async fn resolve_active(&self, ids: &[i64]) -> Result<Vec<Tag>, TripBuddyError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let tags = sqlx::query_as::<_, Tag>(&format!(
            "SELECT {TAG_COLUMNS} FROM tags WHERE id = ANY($1) AND is_active ORDER BY id"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(tags)
    }

    pub async fn find_active_by_code(&self, kind: TagKind, code: &str) -> Result<Option<Tag>, TripBuddyError> {
        let tag = sqlx::query_as::<_, Tag>(&format!(
            "SELECT {TAG_COLUMNS} FROM tags WHERE kind = $1 AND code = $2 AND is_active"
        ))
        .bind(kind)
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tag)
    }

    /// A user's selections of active tags
    pub async fn user_tags(&self, user_id: Uuid, kind: Option<TagKind>) -> Result<Vec<UserTag>, TripBuddyError> {
        let tags = sqlx::query_as::<_, UserTag>(&format!(
            r#"
            {USER_TAG_SELECT}
            WHERE ut.user_id = $1 AND t.is_active AND ($2::TEXT IS NULL OR t.kind = $2)
            ORDER BY t.kind, t.sort_order, t.name, t.id
            "#
        ))
        .bind(user_id)
        .bind(kind)
        .fetch_all(&self.pool)
        .await?;

        Ok(tags)
    }

    /// Replace the user's selections of one kind with `tag_ids` at level 1
    pub async fn replace_user_tags(&self, user_id: Uuid, kind: TagKind, tag_ids: &[i64]) -> Result<(), TripBuddyError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            DELETE FROM user_tags ut
            USING tags t
            WHERE t.id = ut.tag_id AND ut.user_id = $1 AND t.kind = $2
            "#
        )
        .bind(user_id)
        .bind(kind)
        .execute(&mut *tx)
        .await?;

        if !tag_ids.is_empty() {
            sqlx::query(
                r#"
                INSERT INTO user_tags (user_id, tag_id, level, created_at, updated_at)
                SELECT $1, UNNEST($2::BIGINT[]), 1, $3, $3
                ON CONFLICT DO NOTHING
                "#
            )
            .bind(user_id)
            .bind(tag_ids)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Insert or overwrite the strength of one preference
    pub async fn upsert_level(&self, user_id: Uuid, tag_id: i64, level: i16) -> Result<(), TripBuddyError> {
        sqlx::query(
            r#"
            INSERT INTO user_tags (user_id, tag_id, level, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            ON CONFLICT (user_id, tag_id) DO UPDATE
                SET level = EXCLUDED.level,
                    updated_at = EXCLUDED.updated_at
            "#
        )
        .bind(user_id)
        .bind(tag_id)
        .bind(level)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn remove_user_tag(&self, user_id: Uuid, tag_id: i64) -> Result<bool, TripBuddyError> {
        let result = sqlx::query("DELETE FROM user_tags WHERE user_id = $1 AND tag_id = $2")
            .bind(user_id)
            .bind(tag_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Add a vocabulary entry
    pub async fn create(&self, request: CreateTagRequest) -> Result<Tag, TripBuddyError> {
        let result = sqlx::query_as::<_, Tag>(&format!(
            r#"
            INSERT INTO tags (kind, code, name, icon, sort_order, is_active, created_at)
            VALUES ($1, $2, $3, $4, $5, TRUE, $6)
            RETURNING {TAG_COLUMNS}
            "#
        ))
        .bind(request.kind)
        .bind(&request.code)
        .bind(&request.name)
        .bind(&request.icon)
        .bind(request.sort_order)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(tag) => Ok(tag),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(TripBuddyError::DuplicateTag {
                    kind: request.kind.to_string(),
                    code: request.code,
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn set_active(&self, id: i64, is_active: bool) -> Result<Option<Tag>, TripBuddyError> {
        let tag = sqlx::query_as::<_, Tag>(&format!(
            "UPDATE tags SET is_active = $2 WHERE id = $1 RETURNING {TAG_COLUMNS}"
        ))
        .bind(id)
        .bind(is_active)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tag)
    }
}
