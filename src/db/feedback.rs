use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::SqlitePool;

use crate::error::{AppError, AppResult};
use crate::models::{Feedback, ItemKind, ItemMetadata, LikedItem, QueryRecord, VideoRecord};

/// Durable store for per-query and per-video feedback.
///
/// Two keyed collections, unique on query text and video id respectively.
/// Every mutation runs in its own transaction and is committed before the
/// call returns, so a read immediately after a write observes the write.
#[derive(Clone)]
pub struct FeedbackStore {
    pool: SqlitePool,
}

impl FeedbackStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Inserts or updates feedback for `key` in the `kind` collection.
    ///
    /// New rows take the supplied metadata, defaulting to empty strings.
    /// Existing rows get feedback and timestamp overwritten; stored non-empty
    /// title/url is kept when the incoming value is empty.
    pub async fn upsert(
        &self,
        key: &str,
        kind: ItemKind,
        feedback: Feedback,
        metadata: &ItemMetadata,
    ) -> AppResult<()> {
        match kind {
            ItemKind::Query => self.upsert_query(key, feedback).await,
            ItemKind::Video => self.upsert_video(key, feedback, metadata).await,
        }
    }

    /// Removes the row for `key` from the `kind` collection.
    ///
    /// A no-op when no such row exists.
    pub async fn clear(&self, key: &str, kind: ItemKind) -> AppResult<()> {
        let sql = match kind {
            ItemKind::Query => "DELETE FROM queries WHERE query = ?",
            ItemKind::Video => "DELETE FROM videos WHERE video_id = ?",
        };

        let result = sqlx::query(sql).bind(key).execute(&self.pool).await?;

        tracing::debug!(
            key = %key,
            kind = ?kind,
            deleted = result.rows_affected(),
            "Feedback cleared"
        );

        Ok(())
    }

    /// Returns all liked items: videos newest-first, then queries newest-first.
    pub async fn list_liked(&self) -> AppResult<Vec<LikedItem>> {
        let videos: Vec<(String, String, String)> = sqlx::query_as(
            r#"
            SELECT video_id, title, url FROM videos
            WHERE feedback = 'like'
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let queries: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT query FROM queries
            WHERE feedback = 'like'
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut items: Vec<LikedItem> = videos
            .into_iter()
            .map(|(video_id, title, url)| LikedItem::Video {
                video_id,
                title,
                url,
            })
            .collect();

        items.extend(
            queries
                .into_iter()
                .map(|(query,)| LikedItem::Query { query }),
        );

        Ok(items)
    }

    /// Point lookup into the `queries` collection
    pub async fn get_query(&self, key: &str) -> AppResult<Option<QueryRecord>> {
        let row: Option<(String, String)> =
            sqlx::query_as("SELECT feedback, created_at FROM queries WHERE query = ?")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        row.map(|(feedback, created_at)| {
            Ok(QueryRecord {
                query: key.to_string(),
                feedback: Feedback::try_from(feedback.as_str())?,
                created_at: parse_timestamp(&created_at)?,
            })
        })
        .transpose()
    }

    /// Point lookup into the `videos` collection
    pub async fn get_video(&self, key: &str) -> AppResult<Option<VideoRecord>> {
        let row: Option<(String, String, String, String)> =
            sqlx::query_as("SELECT title, url, feedback, created_at FROM videos WHERE video_id = ?")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        row.map(|(title, url, feedback, created_at)| {
            Ok(VideoRecord {
                video_id: key.to_string(),
                title,
                url,
                feedback: Feedback::try_from(feedback.as_str())?,
                created_at: parse_timestamp(&created_at)?,
            })
        })
        .transpose()
    }

    async fn upsert_query(&self, key: &str, feedback: Feedback) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let existing: Option<(i64,)> = sqlx::query_as("SELECT id FROM queries WHERE query = ?")
            .bind(key)
            .fetch_optional(&mut *tx)
            .await?;

        let now = format_timestamp(Utc::now());

        match existing {
            Some((id,)) => {
                sqlx::query("UPDATE queries SET feedback = ?, created_at = ? WHERE id = ?")
                    .bind(feedback.as_str())
                    .bind(&now)
                    .bind(id)
                    .execute(&mut *tx)
                    .await?;
            }
            None => {
                sqlx::query("INSERT INTO queries (query, feedback, created_at) VALUES (?, ?, ?)")
                    .bind(key)
                    .bind(feedback.as_str())
                    .bind(&now)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        tx.commit().await?;

        tracing::debug!(query = %key, feedback = %feedback, "Query feedback stored");

        Ok(())
    }

    async fn upsert_video(
        &self,
        key: &str,
        feedback: Feedback,
        metadata: &ItemMetadata,
    ) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let existing: Option<(i64, String, String)> =
            sqlx::query_as("SELECT id, title, url FROM videos WHERE video_id = ?")
                .bind(key)
                .fetch_optional(&mut *tx)
                .await?;

        let now = format_timestamp(Utc::now());

        match existing {
            Some((id, title, url)) => {
                // Stored non-empty metadata wins over an empty update.
                let title = if title.is_empty() {
                    metadata.title.as_str()
                } else {
                    title.as_str()
                }
                .to_string();
                let url = if url.is_empty() {
                    metadata.url.as_str()
                } else {
                    url.as_str()
                }
                .to_string();

                sqlx::query(
                    "UPDATE videos SET title = ?, url = ?, feedback = ?, created_at = ? WHERE id = ?",
                )
                .bind(&title)
                .bind(&url)
                .bind(feedback.as_str())
                .bind(&now)
                .bind(id)
                .execute(&mut *tx)
                .await?;
            }
            None => {
                sqlx::query(
                    "INSERT INTO videos (video_id, title, url, feedback, created_at) VALUES (?, ?, ?, ?, ?)",
                )
                .bind(key)
                .bind(&metadata.title)
                .bind(&metadata.url)
                .bind(feedback.as_str())
                .bind(&now)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;

        tracing::debug!(video_id = %key, feedback = %feedback, "Video feedback stored");

        Ok(())
    }
}

/// Fixed-width RFC 3339 UTC with microseconds, so lexicographic order in the
/// database matches chronological order.
fn format_timestamp(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(s: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| AppError::Internal(format!("Invalid stored timestamp {:?}: {}", s, e)))
}
