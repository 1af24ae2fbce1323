use std::fmt;

use async_trait::async_trait;
use primitives::{Operation, ResourceKind};
use serde_json::Value;

use crate::Error;

/// The advertising platform, accepting one batch of `create` operations per [`ResourceKind`].
#[async_trait]
pub trait AdsPlatform: fmt::Debug + Send + Sync {
    /// Submits the batch and returns the platform response.
    ///
    /// An empty batch never reaches the platform and returns [`Value::Null`].
    /// A failed batch fails as a whole, there are no per-operation outcomes.
    async fn create(&self, kind: ResourceKind, operations: Vec<Operation>) -> Result<Value, Error>;
}
