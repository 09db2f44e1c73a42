use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::appointments::models::{Department, SlotKey, TimeSlot};
use crate::features::appointments::schedule::ScheduleIndex;

/// Schedule index backed by `schedule_slots`, whose primary key is the
/// composite slot key
pub struct PgScheduleIndex {
    pool: PgPool,
}

impl PgScheduleIndex {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScheduleIndex for PgScheduleIndex {
    async fn reserve(&self, key: SlotKey, appointment_id: Uuid) -> Result<()> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO schedule_slots (department, slot_date, time_slot, appointment_id)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (department, slot_date, time_slot) DO NOTHING
            "#,
        )
        .bind(key.department)
        .bind(key.date)
        .bind(key.time)
        .bind(appointment_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to reserve slot {}: {:?}", key, e);
            AppError::Database(e)
        })?;

        if inserted.rows_affected() == 0 {
            tracing::warn!("Slot {} already taken (appointment={})", key, appointment_id);
            return Err(AppError::Conflict(format!(
                "The {} slot is already booked",
                key
            )));
        }

        tracing::debug!("Slot {} reserved for appointment {}", key, appointment_id);
        Ok(())
    }

    async fn release(&self, appointment_id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM schedule_slots WHERE appointment_id = $1")
            .bind(appointment_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(
                    "Failed to release slots of appointment {}: {:?}",
                    appointment_id,
                    e
                );
                AppError::Database(e)
            })?;

        Ok(())
    }

    async fn release_slot(&self, key: SlotKey, appointment_id: Uuid) -> Result<()> {
        sqlx::query(
            r#"
            DELETE FROM schedule_slots
            WHERE department = $1 AND slot_date = $2 AND time_slot = $3 AND appointment_id = $4
            "#,
        )
        .bind(key.department)
        .bind(key.date)
        .bind(key.time)
        .bind(appointment_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to release slot {}: {:?}", key, e);
            AppError::Database(e)
        })?;

        Ok(())
    }

    async fn reserved_slots(
        &self,
        department: Department,
        date: NaiveDate,
    ) -> Result<Vec<TimeSlot>> {
        sqlx::query_scalar::<_, TimeSlot>(
            r#"
            SELECT time_slot FROM schedule_slots
            WHERE department = $1 AND slot_date = $2
            ORDER BY time_slot
            "#,
        )
        .bind(department)
        .bind(date)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(
                "Failed to list reserved slots for {} on {}: {:?}",
                department,
                date,
                e
            );
            AppError::Database(e)
        })
    }
}
