use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::tickets::models::{TicketCategory, TicketRecord};
use crate::features::tickets::repositories::{
    AppointmentStatusCount, StatusCategoryCount, TicketFilter, TicketRepository,
};

#[derive(Default)]
struct State {
    tickets: HashMap<Uuid, TicketRecord>,
    counters: HashMap<(TicketCategory, NaiveDate), i32>,
}

/// In-process ticket repository used by service and handler tests
#[derive(Default)]
pub struct InMemoryTicketRepository {
    state: RwLock<State>,
}

impl InMemoryTicketRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.tickets.len()
    }
}

#[async_trait]
impl TicketRepository for InMemoryTicketRepository {
    async fn next_ticket_sequence(&self, category: TicketCategory, day: NaiveDate) -> Result<i32> {
        let mut state = self.state.write().await;
        let counter = state.counters.entry((category, day)).or_insert(0);
        *counter += 1;
        Ok(*counter)
    }

    async fn insert(&self, record: &TicketRecord) -> Result<()> {
        let mut state = self.state.write().await;
        let number = &record.ticket().ticket_number;
        if state.tickets.contains_key(&record.id())
            || state
                .tickets
                .values()
                .any(|r| &r.ticket().ticket_number == number)
        {
            return Err(AppError::Conflict(
                "The ticket conflicts with an existing record".to_string(),
            ));
        }
        state.tickets.insert(record.id(), record.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<TicketRecord>> {
        Ok(self.state.read().await.tickets.get(&id).cloned())
    }

    async fn find_by_number(&self, ticket_number: &str) -> Result<Option<TicketRecord>> {
        Ok(self
            .state
            .read()
            .await
            .tickets
            .values()
            .find(|r| r.ticket().ticket_number == ticket_number)
            .cloned())
    }

    async fn find_by_appointment(&self, appointment_id: Uuid) -> Result<Option<TicketRecord>> {
        Ok(self
            .state
            .read()
            .await
            .tickets
            .values()
            .find(|r| r.appointment().is_some_and(|a| a.id == appointment_id))
            .cloned())
    }

    async fn list(
        &self,
        filter: TicketFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<TicketRecord>, i64)> {
        let state = self.state.read().await;
        let mut matching: Vec<&TicketRecord> = state
            .tickets
            .values()
            .filter(|r| filter.matches(r))
            .collect();
        matching.sort_by(|a, b| {
            (b.ticket().created_at, b.id()).cmp(&(a.ticket().created_at, a.id()))
        });

        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect();
        Ok((page, total))
    }

    async fn update(&self, record: &TicketRecord, expected_version: i32) -> Result<bool> {
        let mut state = self.state.write().await;
        match state.tickets.get_mut(&record.id()) {
            Some(stored) if stored.version() == expected_version => {
                *stored = record.clone();
                Ok(true)
            }
            Some(_) => Ok(false),
            None => Err(AppError::NotFound(format!(
                "Ticket '{}' not found",
                record.id()
            ))),
        }
    }

    async fn count_by_status_and_category(&self) -> Result<Vec<StatusCategoryCount>> {
        let state = self.state.read().await;
        let mut counts: HashMap<_, i64> = HashMap::new();
        for record in state.tickets.values() {
            *counts.entry((record.status(), record.category())).or_default() += 1;
        }
        Ok(counts
            .into_iter()
            .map(|((status, category), count)| StatusCategoryCount {
                status,
                category,
                count,
            })
            .collect())
    }

    async fn count_appointments_by_status(&self) -> Result<Vec<AppointmentStatusCount>> {
        let state = self.state.read().await;
        let mut counts: HashMap<_, i64> = HashMap::new();
        for appointment in state.tickets.values().filter_map(|r| r.appointment()) {
            *counts.entry(appointment.status).or_default() += 1;
        }
        Ok(counts
            .into_iter()
            .map(|(status, count)| AppointmentStatusCount { status, count })
            .collect())
    }
}
