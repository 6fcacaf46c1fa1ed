//! Conference id allocation.

use async_trait::async_trait;

use crate::errors::AppError;
use crate::models::ProfileKey;

/// Hands out conference ids scoped under a parent profile key.
///
/// Allocation happens before the conference write and is not part of its
/// transaction, so an id whose write later fails is simply never used.
#[async_trait]
pub trait IdAllocator: Send + Sync {
    /// Allocate one fresh id for a child of `parent`.
    async fn allocate_id(&self, parent: &ProfileKey) -> Result<i64, AppError>;
}
