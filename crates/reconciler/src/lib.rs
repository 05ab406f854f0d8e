//! Alarm Reconciler
//!
//! Diffs the live alarm inventory against discovered volumes and the
//! desired configuration, then creates, updates, deletes, or disables
//! alarms through an [`AlarmGateway`] so monitoring matches desired state.

mod engine;
mod gateway;

pub use engine::Reconciler;
pub use gateway::{AlarmGateway, GatewayError, PAGE_SIZE};
