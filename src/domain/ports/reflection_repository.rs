use crate::domain::entities::reflection::{ReflectionEntry, ReflectionLevel};
use crate::domain::error::DomainError;

pub trait ReflectionRepository: Send + Sync {
    fn insert(&self, entry: &ReflectionEntry) -> Result<i64, DomainError>;
    /// Newest first.
    fn latest(&self, level: ReflectionLevel, limit: usize) -> Result<Vec<ReflectionEntry>, DomainError>;
    /// Level-1 rows inserted after the newest level-2 row.
    fn count_since_last_cross_trial(&self) -> Result<usize, DomainError>;
    fn count(&self) -> Result<usize, DomainError>;
}
