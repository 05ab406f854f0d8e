//! Alarm definition as the reconciler sees it
//!
//! One struct serves both flavors: the desired definition computed fresh
//! from config, and the observed definition fetched from CloudWatch.

use serde::{Deserialize, Serialize};

use crate::types::{ComparisonOperator, TreatMissingData};

/// CloudWatch namespace for EBS volume metrics
pub const EBS_NAMESPACE: &str = "AWS/EBS";

/// Dimension name scoping a metric to one volume
pub const VOLUME_DIMENSION: &str = "VolumeId";

/// One entry of an alarm's metric math query list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricQuery {
    pub id: String,
    /// Whether this entry is the one the alarm evaluates
    pub return_data: bool,
    pub kind: MetricQueryKind,
}

/// Either a derived expression or a raw metric series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MetricQueryKind {
    Expression {
        expression: String,
        label: String,
    },
    Stat {
        namespace: String,
        metric_name: String,
        dimension_name: String,
        dimension_value: String,
        period: i32,
        stat: String,
    },
}

/// A complete alarm definition.
///
/// Observed definitions are mutated in place when an update is decided and
/// pushed back whole, so the original metric query list survives untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlarmDefinition {
    pub name: String,
    pub alarm_actions: Vec<String>,
    pub actions_enabled: bool,
    pub evaluation_periods: i32,
    pub datapoints_to_alarm: i32,
    pub threshold: f64,
    pub comparison_operator: ComparisonOperator,
    pub treat_missing_data: TreatMissingData,
    pub metrics: Vec<MetricQuery>,
}
