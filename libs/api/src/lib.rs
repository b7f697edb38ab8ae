pub mod error;
pub mod time;

use std::future::Future;
use std::pin::Pin;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use error::StoreError;

/// Свойства события: произвольные JSON-значения по строковым ключам.
pub type Properties = serde_json::Map<String, serde_json::Value>;

// ════════════════════════════════════════════════════════════════
//  Event Types
// ════════════════════════════════════════════════════════════════

/// Одна зафиксированная запись в event log. Неизменяема после создания.
///
/// На проводе идентификатор называется `event_id`, `timestamp` —
/// RFC 3339 с явным смещением `+00:00`, `properties` присутствует всегда.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(rename = "event_id")]
    pub id: Uuid,
    #[serde(with = "time::rfc3339_utc")]
    pub timestamp: DateTime<Utc>,
    pub action: String,
    #[serde(default)]
    pub properties: Properties,
}

/// Провалидированный track-запрос, ещё без id и timestamp.
#[derive(Clone, Debug, PartialEq)]
pub struct NewEvent {
    action: String,
    properties: Properties,
}

impl NewEvent {
    /// Пустой `action` отклоняется, отсутствующие `properties`
    /// нормализуются в пустой map.
    pub fn new(action: impl Into<String>, properties: Option<Properties>) -> Result<Self, StoreError> {
        let action = action.into();
        if action.is_empty() {
            return Err(StoreError::EmptyAction);
        }
        Ok(Self {
            action,
            properties: properties.unwrap_or_default(),
        })
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    /// Превратить в запись, присвоив id и время создания.
    pub fn into_record(self, id: Uuid, timestamp: DateTime<Utc>) -> EventRecord {
        EventRecord {
            id,
            timestamp,
            action: self.action,
            properties: self.properties,
        }
    }
}

/// Порядок выдачи записей.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// В порядке вставки.
    #[default]
    Asc,
    /// Новые первыми.
    Desc,
}

/// Параметры чтения event log. `EventQuery::default()` = весь log
/// в порядке вставки.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventQuery {
    /// Фильтр по точному совпадению `action`.
    pub action: Option<String>,
    /// Пропустить первые N записей (после фильтра и сортировки).
    pub offset: Option<usize>,
    /// Максимальное количество записей.
    pub limit: Option<usize>,
    #[serde(default)]
    pub order: SortOrder,
}

impl EventQuery {
    pub fn matches(&self, record: &EventRecord) -> bool {
        match self.action {
            Some(ref action) => record.action == *action,
            None => true,
        }
    }
}

// ════════════════════════════════════════════════════════════════
//  Sources
// ════════════════════════════════════════════════════════════════

/// Источник текущего времени.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Источник уникальных идентификаторов записей.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> Uuid;
}

/// Системные часы в UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Случайные 128-битные UUID v4.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn next_id(&self) -> Uuid {
        Uuid::new_v4()
    }
}

// ════════════════════════════════════════════════════════════════
//  Event Store Trait
// ════════════════════════════════════════════════════════════════

/// Хранилище event log: append / read / clear.
///
/// Реализации обязаны сериализовать мутации: `append` и `clear`
/// взаимно исключают друг друга и чтение, порядок в log совпадает
/// с порядком завершения `append`.
pub trait EventStore: Send + Sync {
    /// Добавить событие в конец log. Возвращает созданную запись.
    fn append(&self, event: NewEvent)
        -> Pin<Box<dyn Future<Output = Result<EventRecord, StoreError>> + Send + '_>>;

    /// Прочитать записи по параметрам запроса.
    fn list(&self, query: &EventQuery)
        -> Pin<Box<dyn Future<Output = Result<Vec<EventRecord>, StoreError>> + Send + '_>>;

    /// Атомарно очистить log. Возвращает число удалённых записей.
    fn clear(&self) -> Pin<Box<dyn Future<Output = Result<usize, StoreError>> + Send + '_>>;

    /// Текущее число записей.
    fn count(&self) -> Pin<Box<dyn Future<Output = usize> + Send + '_>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn empty_action_is_rejected() {
        assert_eq!(NewEvent::new("", None), Err(StoreError::EmptyAction));
    }

    #[test]
    fn whitespace_action_is_kept_verbatim() {
        let event = NewEvent::new(" ", None).unwrap();
        assert_eq!(event.action(), " ");
    }

    #[test]
    fn missing_properties_become_empty_map() {
        let event = NewEvent::new("page_view", None).unwrap();
        assert_eq!(event.action(), "page_view");
        assert!(event.properties().is_empty());
    }

    #[test]
    fn record_wire_format_uses_event_id_and_offset() {
        let mut props = Properties::new();
        props.insert("page".into(), json!("checkout"));
        let id = Uuid::parse_str("6f1c2d9e-8a4b-4c3d-9e2f-1a2b3c4d5e6f").unwrap();
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        let record = NewEvent::new("button_click", Some(props)).unwrap().into_record(id, ts);

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            json!({
                "event_id": "6f1c2d9e-8a4b-4c3d-9e2f-1a2b3c4d5e6f",
                "timestamp": "2024-05-01T12:30:00.000000+00:00",
                "action": "button_click",
                "properties": {"page": "checkout"},
            })
        );

        let back: EventRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn query_filters_by_action() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let record = NewEvent::new("signup", None).unwrap().into_record(Uuid::nil(), ts);

        assert!(EventQuery::default().matches(&record));
        let query = EventQuery { action: Some("signup".into()), ..Default::default() };
        assert!(query.matches(&record));
        let query = EventQuery { action: Some("login".into()), ..Default::default() };
        assert!(!query.matches(&record));
    }
}
