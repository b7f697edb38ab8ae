/// Ошибка event store. Все варианты request-scoped: store после
/// ошибки остаётся в согласованном состоянии.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Track-запрос с пустым `action`.
    #[error("action must not be empty")]
    EmptyAction,

    /// Достигнут `max_events`; новая запись не добавлена.
    #[error("event log is full ({0} events)")]
    Full(usize),
}
