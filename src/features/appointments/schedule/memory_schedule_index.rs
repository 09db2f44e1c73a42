use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::appointments::models::{Department, SlotKey, TimeSlot};
use crate::features::appointments::schedule::ScheduleIndex;

/// Schedule index held in process memory; the mutex makes reserve a single
/// compare-and-insert
#[derive(Default)]
pub struct InMemoryScheduleIndex {
    slots: Mutex<HashMap<SlotKey, Uuid>>,
}

impl InMemoryScheduleIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn is_available(&self, key: SlotKey) -> Result<bool> {
        Ok(!self.slots.lock().await.contains_key(&key))
    }

    pub async fn holder(&self, key: SlotKey) -> Option<Uuid> {
        self.slots.lock().await.get(&key).copied()
    }

    /// Every slot the appointment currently holds
    pub async fn held_by(&self, appointment_id: Uuid) -> Vec<SlotKey> {
        self.slots
            .lock()
            .await
            .iter()
            .filter(|(_, holder)| **holder == appointment_id)
            .map(|(key, _)| *key)
            .collect()
    }
}

#[async_trait]
impl ScheduleIndex for InMemoryScheduleIndex {
    async fn reserve(&self, key: SlotKey, appointment_id: Uuid) -> Result<()> {
        let mut slots = self.slots.lock().await;
        if slots.contains_key(&key) {
            return Err(AppError::Conflict(format!(
                "The {} slot is already booked",
                key
            )));
        }
        slots.insert(key, appointment_id);
        Ok(())
    }

    async fn release(&self, appointment_id: Uuid) -> Result<()> {
        self.slots
            .lock()
            .await
            .retain(|_, holder| *holder != appointment_id);
        Ok(())
    }

    async fn release_slot(&self, key: SlotKey, appointment_id: Uuid) -> Result<()> {
        let mut slots = self.slots.lock().await;
        if slots.get(&key) == Some(&appointment_id) {
            slots.remove(&key);
        }
        Ok(())
    }

    async fn reserved_slots(
        &self,
        department: Department,
        date: NaiveDate,
    ) -> Result<Vec<TimeSlot>> {
        let mut reserved: Vec<TimeSlot> = self
            .slots
            .lock()
            .await
            .keys()
            .filter(|key| key.department == department && key.date == date)
            .map(|key| key.time)
            .collect();
        reserved.sort();
        Ok(reserved)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::shared::validation::ClosedSet;

    fn key(time: TimeSlot) -> SlotKey {
        SlotKey::new(
            Department::Engineering,
            NaiveDate::from_ymd_opt(2025, 6, 21).unwrap(),
            time,
        )
    }

    #[tokio::test]
    async fn test_reserve_is_exclusive() {
        let index = InMemoryScheduleIndex::new();
        let first = Uuid::now_v7();

        index.reserve(key(TimeSlot::TenAm), first).await.unwrap();
        assert!(!index.is_available(key(TimeSlot::TenAm)).await.unwrap());

        let err = index
            .reserve(key(TimeSlot::TenAm), Uuid::now_v7())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(index.holder(key(TimeSlot::TenAm)).await, Some(first));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_reserve_has_one_winner() {
        let index = Arc::new(InMemoryScheduleIndex::new());

        let attempts: Vec<_> = (0..32)
            .map(|_| {
                let index = index.clone();
                tokio::spawn(async move { index.reserve(key(TimeSlot::TenAm), Uuid::now_v7()).await })
            })
            .collect();

        let mut wins = 0;
        let mut conflicts = 0;
        for attempt in attempts {
            match attempt.await.unwrap() {
                Ok(()) => wins += 1,
                Err(AppError::Conflict(_)) => conflicts += 1,
                Err(other) => panic!("unexpected error {:?}", other),
            }
        }
        assert_eq!((wins, conflicts), (1, 31));
    }

    #[tokio::test]
    async fn test_release_slot_checks_holder() {
        let index = InMemoryScheduleIndex::new();
        let holder = Uuid::now_v7();
        index.reserve(key(TimeSlot::NineAm), holder).await.unwrap();

        index
            .release_slot(key(TimeSlot::NineAm), Uuid::now_v7())
            .await
            .unwrap();
        assert_eq!(index.holder(key(TimeSlot::NineAm)).await, Some(holder));

        index.release(holder).await.unwrap();
        assert!(index.is_available(key(TimeSlot::NineAm)).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_available_subtracts_reserved() {
        let index = InMemoryScheduleIndex::new();
        index.reserve(key(TimeSlot::EightAm), Uuid::now_v7()).await.unwrap();
        index.reserve(key(TimeSlot::FivePm), Uuid::now_v7()).await.unwrap();

        let available = index
            .list_available(Department::Engineering, key(TimeSlot::EightAm).date)
            .await
            .unwrap();
        assert_eq!(available.len(), TimeSlot::ALL.len() - 2);
        assert!(!available.contains(&TimeSlot::EightAm));
        assert!(!available.contains(&TimeSlot::FivePm));

        let other_department = index
            .list_available(Department::Health, key(TimeSlot::EightAm).date)
            .await
            .unwrap();
        assert_eq!(other_department, TimeSlot::ALL.to_vec());
    }
}
