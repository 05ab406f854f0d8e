//! Alarm Domain Model
//!
//! Types shared by the reconciler and the CloudWatch gateway, plus the
//! pure builder that computes the desired alarm definition for a volume.

mod builder;
mod definition;
mod types;

pub use builder::build_definition;
pub use definition::{
    AlarmDefinition, MetricQuery, MetricQueryKind, EBS_NAMESPACE, VOLUME_DIMENSION,
};
pub use types::{
    alarm_name, AlarmType, AlarmTypeConfig, ComparisonOperator, TreatMissingData, UnknownValue,
    ALARM_NAME_PREFIX,
};
