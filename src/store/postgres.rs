use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::user_stats::{StatsUpdate, UserStats};
use crate::models::workout::{NewWorkoutRecord, WorkoutRecord};
use crate::store::feed::{ChangeEvent, ChangeFeed, ChangeKind, Table};
use crate::store::{RecordStore, StoreResult};

pub struct PgRecordStore {
    db: PgPool,
    feed: ChangeFeed,
}

impl PgRecordStore {
    pub fn new(db: PgPool, feed: ChangeFeed) -> Self {
        Self { db, feed }
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn fetch_user_stats(&self, user_id: Uuid) -> StoreResult<Option<UserStats>> {
        let stats = sqlx::query_as::<_, UserStats>("SELECT * FROM user_stats WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?;
        Ok(stats)
    }

    async fn insert_user_stats(&self, stats: &UserStats) -> StoreResult<UserStats> {
        let row = sqlx::query_as::<_, UserStats>(
            r#"
            INSERT INTO user_stats (
                id, user_id, steps_today, calories_burned, calories_goal, calories_consumed,
                goal_progress, streak_days, weekly_workout_completed, weekly_workout_goal,
                fitness_tasks_completed, fitness_tasks_total
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(stats.id)
        .bind(stats.user_id)
        .bind(stats.steps_today)
        .bind(stats.calories_burned)
        .bind(stats.calories_goal)
        .bind(stats.calories_consumed)
        .bind(stats.goal_progress)
        .bind(stats.streak_days)
        .bind(stats.weekly_workout_completed)
        .bind(stats.weekly_workout_goal)
        .bind(stats.fitness_tasks_completed)
        .bind(stats.fitness_tasks_total)
        .fetch_one(&self.db)
        .await?;

        self.feed.publish(ChangeEvent::new(
            Table::UserStats,
            ChangeKind::Insert,
            row.user_id,
            &row,
        ));
        Ok(row)
    }

    async fn update_user_stats(&self, user_id: Uuid, update: &StatsUpdate) -> StoreResult<UserStats> {
        let row = sqlx::query_as::<_, UserStats>(
            r#"
            UPDATE user_stats SET
                weekly_workout_completed = $2,
                calories_burned = $3,
                streak_days = $4,
                fitness_tasks_completed = $5,
                goal_progress = $6,
                updated_at = NOW()
            WHERE user_id = $1
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(update.weekly_workout_completed)
        .bind(update.calories_burned)
        .bind(update.streak_days)
        .bind(update.fitness_tasks_completed)
        .bind(update.goal_progress)
        .fetch_one(&self.db)
        .await?;

        self.feed.publish(ChangeEvent::new(
            Table::UserStats,
            ChangeKind::Update,
            row.user_id,
            &row,
        ));
        Ok(row)
    }

    async fn insert_workout(&self, record: &NewWorkoutRecord) -> StoreResult<WorkoutRecord> {
        let row = sqlx::query_as::<_, WorkoutRecord>(
            r#"
            INSERT INTO workouts (id, user_id, name, type, duration_minutes, calories_burned, completed, completed_at, notes)
            VALUES ($1, $2, $3, $4, $5, $6, true, $7, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(record.user_id)
        .bind(&record.name)
        .bind(&record.workout_type)
        .bind(record.duration_minutes)
        .bind(record.calories_burned)
        .bind(record.completed_at)
        .bind(&record.notes)
        .fetch_one(&self.db)
        .await?;

        self.feed.publish(ChangeEvent::new(
            Table::Workouts,
            ChangeKind::Insert,
            row.user_id,
            &row,
        ));
        Ok(row)
    }

    async fn list_workouts(&self, user_id: Uuid, limit: i64) -> StoreResult<Vec<WorkoutRecord>> {
        let rows = sqlx::query_as::<_, WorkoutRecord>(
            r#"
            SELECT * FROM workouts
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }
}
