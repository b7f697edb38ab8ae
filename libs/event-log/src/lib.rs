use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::RwLock;

use tracker_api::{
    Clock, EventQuery, EventRecord, EventStore, IdGenerator, NewEvent,
    RandomIds, SortOrder, StoreError, SystemClock,
};

// ═══════════════════════════════════════════════════════════════
//  EventLog
// ═══════════════════════════════════════════════════════════════

/// In-memory event log: упорядоченный по вставке список записей
/// под одним RwLock.
///
/// id и timestamp присваиваются внутри write-секции, поэтому порядок
/// в log совпадает с порядком завершения `append`, а timestamp'ы
/// не убывают вдоль log. Ничего не переживает рестарт процесса.
pub struct EventLog {
    records: RwLock<Vec<EventRecord>>,
    max_events: Option<usize>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl EventLog {
    /// Пустой неограниченный log с системными часами и UUID v4.
    pub fn new() -> Self {
        Self::with_sources(Arc::new(SystemClock), Arc::new(RandomIds))
    }

    pub fn with_sources(clock: Arc<dyn Clock>, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            max_events: None,
            clock,
            ids,
        }
    }

    /// Ограничить размер log. При достижении лимита `append`
    /// возвращает `StoreError::Full`; старые записи не вытесняются.
    pub fn with_max_events(mut self, max_events: Option<usize>) -> Self {
        self.max_events = max_events;
        self
    }

    async fn append_record(&self, event: NewEvent) -> Result<EventRecord, StoreError> {
        let mut records = self.records.write().await;
        if let Some(max) = self.max_events {
            if records.len() >= max {
                tracing::warn!(max_events = max, action = %event.action(), "event log full, rejecting");
                return Err(StoreError::Full(max));
            }
        }
        let record = event.into_record(self.ids.next_id(), self.clock.now());
        records.push(record.clone());
        tracing::debug!(event_id = %record.id, action = %record.action, total = records.len(), "event appended");
        Ok(record)
    }

    async fn select(&self, query: &EventQuery) -> Vec<EventRecord> {
        let records = self.records.read().await;
        let matching = records.iter().filter(|r| query.matches(r));
        let ordered: Box<dyn Iterator<Item = &EventRecord>> = match query.order {
            SortOrder::Asc => Box::new(matching),
            SortOrder::Desc => Box::new(matching.rev()),
        };
        ordered
            .skip(query.offset.unwrap_or(0))
            .take(query.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect()
    }

    async fn clear_all(&self) -> usize {
        let mut records = self.records.write().await;
        let removed = records.len();
        records.clear();
        tracing::info!(removed, "event log cleared");
        removed
    }
}

impl EventStore for EventLog {
    fn append(
        &self,
        event: NewEvent,
    ) -> Pin<Box<dyn Future<Output = Result<EventRecord, StoreError>> + Send + '_>> {
        Box::pin(self.append_record(event))
    }

    fn list(
        &self,
        query: &EventQuery,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<EventRecord>, StoreError>> + Send + '_>> {
        let query = query.clone();
        Box::pin(async move { Ok(self.select(&query).await) })
    }

    fn clear(&self) -> Pin<Box<dyn Future<Output = Result<usize, StoreError>> + Send + '_>> {
        Box::pin(async move { Ok(self.clear_all().await) })
    }

    fn count(&self) -> Pin<Box<dyn Future<Output = usize> + Send + '_>> {
        Box::pin(async move { self.records.read().await.len() })
    }
}
