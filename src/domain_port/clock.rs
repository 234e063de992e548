use chrono::{DateTime, Utc};

/// Injectable time source so expiry logic is testable without sleeping.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
