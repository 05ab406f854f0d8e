//! Gateway seam between the reconciler and the cloud APIs

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

use alarm_model::AlarmDefinition;

/// Page size for listing calls and the ceiling for delete/disable batches
pub const PAGE_SIZE: i32 = 50;

/// Gateway error types.
///
/// Listing failures abort the run: no alarm decision is sound without a
/// full snapshot. Write failures are logged by the caller and the run
/// continues with the next item.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("failed to list volumes: {0}")]
    ListVolumes(String),

    #[error("failed to list alarms: {0}")]
    ListAlarms(String),

    #[error("failed to put alarm '{name}': {reason}")]
    Put { name: String, reason: String },

    #[error("failed to delete alarms: {0}")]
    Delete(String),

    #[error("failed to disable alarm actions: {0}")]
    Disable(String),

    /// An inventoried alarm is missing fields the reconciler relies on
    #[error("malformed alarm '{name}': {reason}")]
    Malformed { name: String, reason: String },
}

/// The operations the reconciler needs from the cloud provider.
///
/// Listing calls return every page merged. Delete/disable calls take one
/// pre-chunked batch of at most [`PAGE_SIZE`] names.
#[async_trait]
pub trait AlarmGateway {
    /// Enumerate every volume to monitor, in provider order
    async fn list_volumes(&self, page_size: i32) -> Result<Vec<String>, GatewayError>;

    /// Snapshot every existing alarm whose name carries the prefix
    async fn list_alarms(
        &self,
        name_prefix: &str,
        page_size: i32,
    ) -> Result<HashMap<String, AlarmDefinition>, GatewayError>;

    /// Create or overwrite one alarm; the same verb serves both cases
    async fn put_alarm(&self, alarm: &AlarmDefinition) -> Result<(), GatewayError>;

    async fn delete_alarms(&self, names: &[String]) -> Result<(), GatewayError>;

    async fn disable_alarm_actions(&self, names: &[String]) -> Result<(), GatewayError>;
}
