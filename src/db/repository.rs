//! Database repository for profile and conference records.
//!
//! Uses prepared statements and transactions for data integrity.

use async_trait::async_trait;
use sqlx::{Executor, Row, Sqlite, SqlitePool};

use super::IdAllocator;
use crate::errors::AppError;
use crate::models::{Conference, ConferenceKey, Profile, ProfileKey};

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ==================== PROFILE OPERATIONS ====================

    /// Load the profile stored under `key`.
    pub async fn get_profile(&self, key: &ProfileKey) -> Result<Option<Profile>, AppError> {
        let row = sqlx::query(
            "SELECT user_id, display_name, main_email, tee_shirt_size, conference_keys_to_attend FROM profiles WHERE user_id = ?"
        )
        .bind(key.user_id())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(profile_from_row).transpose()
    }

    /// Insert or update a profile.
    pub async fn save_profile(&self, profile: &Profile) -> Result<(), AppError> {
        upsert_profile(&self.pool, profile).await
    }

    // ==================== CONFERENCE OPERATIONS ====================

    /// Write a new conference in one transaction with its organizer's
    /// profile. The profile is only inserted when missing; an existing one is
    /// left exactly as stored.
    pub async fn save_profile_and_conference(
        &self,
        profile: &Profile,
        conference: &Conference,
    ) -> Result<(), AppError> {
        let topics_json = serde_json::to_string(&conference.topics)?;

        let mut tx = self.pool.begin().await?;

        insert_profile_if_missing(&mut *tx, profile).await?;

        sqlx::query(
            r#"INSERT INTO conferences (
                parent_user_id, id, organizer_user_id, name, description, topics, city,
                start_date, end_date, month, max_attendees, seats_available
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(conference.key.parent.user_id())
        .bind(conference.key.id)
        .bind(&conference.organizer_user_id)
        .bind(&conference.name)
        .bind(&conference.description)
        .bind(&topics_json)
        .bind(&conference.city)
        .bind(conference.start_date)
        .bind(conference.end_date)
        .bind(i64::from(conference.month))
        .bind(conference.max_attendees)
        .bind(conference.seats_available)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(())
    }

    /// List all conferences ordered by name.
    pub async fn list_conferences(&self) -> Result<Vec<Conference>, AppError> {
        let rows = sqlx::query(
            "SELECT parent_user_id, id, organizer_user_id, name, description, topics, city, start_date, end_date, month, max_attendees, seats_available FROM conferences ORDER BY name"
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(conference_from_row)
            .collect::<Result<Vec<_>, _>>()
    }
}

#[async_trait]
impl IdAllocator for Repository {
    async fn allocate_id(&self, parent: &ProfileKey) -> Result<i64, AppError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("INSERT INTO conference_ids DEFAULT VALUES RETURNING id")
            .fetch_one(&mut *tx)
            .await?;
        let id: i64 = row.get("id");

        // Only the AUTOINCREMENT counter matters; the row itself is dropped.
        sqlx::query("DELETE FROM conference_ids WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::debug!(parent = %parent, id, "Allocated conference id");
        Ok(id)
    }
}

/// Upsert a profile. Identity and email are fixed at first insert.
async fn upsert_profile<'e, E>(executor: E, profile: &Profile) -> Result<(), AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let keys_json = serde_json::to_string(&profile.conference_keys_to_attend)?;

    sqlx::query(
        r#"INSERT INTO profiles (user_id, display_name, main_email, tee_shirt_size, conference_keys_to_attend)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT(user_id) DO UPDATE SET
            display_name = excluded.display_name,
            tee_shirt_size = excluded.tee_shirt_size,
            conference_keys_to_attend = excluded.conference_keys_to_attend"#,
    )
    .bind(&profile.user_id)
    .bind(&profile.display_name)
    .bind(&profile.main_email)
    .bind(profile.tee_shirt_size.as_str())
    .bind(&keys_json)
    .execute(executor)
    .await?;

    Ok(())
}

/// Insert a profile unless one is already stored under its key.
async fn insert_profile_if_missing<'e, E>(executor: E, profile: &Profile) -> Result<(), AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let keys_json = serde_json::to_string(&profile.conference_keys_to_attend)?;

    sqlx::query(
        r#"INSERT INTO profiles (user_id, display_name, main_email, tee_shirt_size, conference_keys_to_attend)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT(user_id) DO NOTHING"#,
    )
    .bind(&profile.user_id)
    .bind(&profile.display_name)
    .bind(&profile.main_email)
    .bind(profile.tee_shirt_size.as_str())
    .bind(&keys_json)
    .execute(executor)
    .await?;

    Ok(())
}

// Helper functions for row conversion. Unreadable stored values are errors,
// never defaults, so a later upsert cannot overwrite them with guesses.

fn profile_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Profile, AppError> {
    let size_str: String = row.get("tee_shirt_size");
    let keys_str: String = row.get("conference_keys_to_attend");
    Ok(Profile {
        user_id: row.get("user_id"),
        display_name: row.get("display_name"),
        main_email: row.get("main_email"),
        tee_shirt_size: size_str.parse().map_err(AppError::Internal)?,
        conference_keys_to_attend: serde_json::from_str(&keys_str)?,
    })
}

fn conference_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Conference, AppError> {
    let parent_user_id: String = row.get("parent_user_id");
    let id: i64 = row.get("id");
    let topics_str: String = row.get("topics");
    let month: i64 = row.get("month");
    let month = u32::try_from(month)
        .map_err(|_| AppError::Internal(format!("Invalid stored month: {}", month)))?;

    Ok(Conference {
        key: ConferenceKey::new(ProfileKey::new(parent_user_id), id),
        id,
        organizer_user_id: row.get("organizer_user_id"),
        name: row.get("name"),
        description: row.get("description"),
        topics: serde_json::from_str(&topics_str)?,
        city: row.get("city"),
        start_date: row.get("start_date"),
        end_date: row.get("end_date"),
        month,
        max_attendees: row.get("max_attendees"),
        seats_available: row.get("seats_available"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use crate::models::{ConferenceForm, TeeShirtSize};
    use tempfile::TempDir;

    async fn repo() -> (Repository, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let pool = init_database(&temp_dir.path().join("test.sqlite"))
            .await
            .expect("Failed to init DB");
        (Repository::new(pool), temp_dir)
    }

    fn conference(owner: &str, id: i64, name: &str) -> Conference {
        let form = ConferenceForm {
            name: name.to_string(),
            topics: Some(vec!["Web".to_string()]),
            start_date: chrono::NaiveDate::from_ymd_opt(2026, 3, 14),
            max_attendees: 10,
            ..Default::default()
        };
        Conference::new(ConferenceKey::new(ProfileKey::new(owner), id), &form)
    }

    #[tokio::test]
    async fn test_profile_upsert_keeps_email() {
        let (repo, _dir) = repo().await;
        let key = ProfileKey::new("u1");
        assert!(repo.get_profile(&key).await.unwrap().is_none());

        let mut profile = Profile::new("u1", "u1", "u1@example.com", TeeShirtSize::NotSpecified);
        repo.save_profile(&profile).await.unwrap();

        profile.main_email = "other@example.com".to_string();
        profile.tee_shirt_size = TeeShirtSize::XL;
        repo.save_profile(&profile).await.unwrap();

        let stored = repo.get_profile(&key).await.unwrap().unwrap();
        assert_eq!(stored.main_email, "u1@example.com");
        assert_eq!(stored.tee_shirt_size, TeeShirtSize::XL);
    }

    #[tokio::test]
    async fn test_allocated_ids_are_unique_across_parents() {
        let (repo, _dir) = repo().await;
        let a = repo.allocate_id(&ProfileKey::new("u1")).await.unwrap();
        let b = repo.allocate_id(&ProfileKey::new("u1")).await.unwrap();
        let c = repo.allocate_id(&ProfileKey::new("u2")).await.unwrap();
        assert!(a < b && b < c);
    }

    #[tokio::test]
    async fn test_allocation_leaves_no_rows_behind() {
        let (repo, _dir) = repo().await;
        let first = repo.allocate_id(&ProfileKey::new("u1")).await.unwrap();
        let second = repo.allocate_id(&ProfileKey::new("u1")).await.unwrap();
        assert!(second > first);

        let remaining: i64 = sqlx::query("SELECT COUNT(*) AS n FROM conference_ids")
            .fetch_one(&repo.pool)
            .await
            .unwrap()
            .get("n");
        assert_eq!(remaining, 0);
    }

    #[tokio::test]
    async fn test_corrupt_profile_row_is_an_error() {
        let (repo, _dir) = repo().await;
        sqlx::query(
            "INSERT INTO profiles (user_id, display_name, main_email, tee_shirt_size, conference_keys_to_attend) VALUES ('u1', 'Una', 'u1@example.com', 'GIANT', '[]')",
        )
        .execute(&repo.pool)
        .await
        .unwrap();
        let err = repo.get_profile(&ProfileKey::new("u1")).await.unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));

        sqlx::query(
            "INSERT INTO profiles (user_id, display_name, main_email, tee_shirt_size, conference_keys_to_attend) VALUES ('u2', 'Dos', 'u2@example.com', 'M', '{not json')",
        )
        .execute(&repo.pool)
        .await
        .unwrap();
        let err = repo.get_profile(&ProfileKey::new("u2")).await.unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[tokio::test]
    async fn test_corrupt_conference_row_is_an_error() {
        let (repo, _dir) = repo().await;
        sqlx::query(
            "INSERT INTO conferences (parent_user_id, id, organizer_user_id, name, topics) VALUES ('u1', 1, 'u1', 'Broken', 'nope')",
        )
        .execute(&repo.pool)
        .await
        .unwrap();

        let err = repo.list_conferences().await.unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[tokio::test]
    async fn test_conference_write_leaves_existing_profile_alone() {
        let (repo, _dir) = repo().await;
        let stored = Profile::new("u1", "Una", "u1@example.com", TeeShirtSize::L);
        repo.save_profile(&stored).await.unwrap();

        // A stale copy read before a later profile save must not win.
        let stale = Profile::new("u1", "u1", "u1@example.com", TeeShirtSize::NotSpecified);
        repo.save_profile_and_conference(&stale, &conference("u1", 4, "RustConf"))
            .await
            .unwrap();

        let profile = repo.get_profile(&ProfileKey::new("u1")).await.unwrap().unwrap();
        assert_eq!(profile, stored);
    }

    #[tokio::test]
    async fn test_conference_round_trips_through_store() {
        let (repo, _dir) = repo().await;
        let profile = Profile::new("u1", "u1", "u1@example.com", TeeShirtSize::NotSpecified);
        let conference = conference("u1", 9, "Web Summit");

        repo.save_profile_and_conference(&profile, &conference)
            .await
            .unwrap();

        let listed = repo.list_conferences().await.unwrap();
        assert_eq!(listed, vec![conference]);
        assert!(repo.get_profile(&profile.key()).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_failed_conference_write_rolls_back_profile() {
        let (repo, _dir) = repo().await;
        let profile = Profile::new("u1", "u1", "u1@example.com", TeeShirtSize::NotSpecified);
        let first = conference("u1", 1, "First");
        repo.save_profile_and_conference(&profile, &first)
            .await
            .unwrap();

        // Same key again violates the primary key; the profile write in the
        // same transaction must not land either.
        let newcomer = Profile::new("u2", "u2", "u2@example.com", TeeShirtSize::NotSpecified);
        let mut duplicate = conference("u2", 1, "Duplicate");
        duplicate.key = first.key.clone();
        duplicate.organizer_user_id = "u1".to_string();
        let err = repo
            .save_profile_and_conference(&newcomer, &duplicate)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Store(_)));

        assert!(repo.get_profile(&newcomer.key()).await.unwrap().is_none());
        assert_eq!(repo.list_conferences().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_list_orders_by_name() {
        let (repo, _dir) = repo().await;
        let profile = Profile::new("u1", "u1", "u1@example.com", TeeShirtSize::NotSpecified);
        for (id, name) in [(1, "Beta"), (2, "Alpha"), (3, "Gamma")] {
            repo.save_profile_and_conference(&profile, &conference("u1", id, name))
                .await
                .unwrap();
        }

        let names: Vec<String> = repo
            .list_conferences()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Alpha", "Beta", "Gamma"]);
    }
}
