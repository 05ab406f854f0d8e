//! Desired-definition builder
//!
//! Pure function of (volume, alarm type, config): no I/O, no error path.

use crate::definition::{
    AlarmDefinition, MetricQuery, MetricQueryKind, EBS_NAMESPACE, VOLUME_DIMENSION,
};
use crate::types::{alarm_name, AlarmType, AlarmTypeConfig, ComparisonOperator};

/// Build the canonical desired definition for one (volume, alarm type)
/// pair.
///
/// The comparison operator is always pinned to
/// `GreaterThanOrEqualToThreshold` at creation time, whatever the config
/// resolved to. Drift detection still compares existing alarms against the
/// config value.
pub fn build_definition(
    volume_id: &str,
    alarm_type: AlarmType,
    config: &AlarmTypeConfig,
    sns_arn: &str,
) -> AlarmDefinition {
    AlarmDefinition {
        name: alarm_name(volume_id, alarm_type),
        alarm_actions: vec![sns_arn.to_string()],
        actions_enabled: true,
        evaluation_periods: config.evaluation_periods,
        datapoints_to_alarm: config.datapoints_to_alarm,
        threshold: config.threshold,
        comparison_operator: ComparisonOperator::GreaterThanOrEqualToThreshold,
        treat_missing_data: config.treat_missing_data,
        metrics: metric_recipe(volume_id, alarm_type),
    }
}

/// Metric math recipe per alarm type. The expression entry returns data;
/// the raw series feed it and do not.
fn metric_recipe(volume_id: &str, alarm_type: AlarmType) -> Vec<MetricQuery> {
    match alarm_type {
        AlarmType::ImpairedVolume => vec![
            expression("e1", "IF(m3>0 AND m1+m2==0, 1, 0)", "ImpairedVolume"),
            average("m3", "VolumeQueueLength", volume_id),
            average("m1", "VolumeReadOps", volume_id),
            average("m2", "VolumeWriteBytes", volume_id),
        ],
        AlarmType::ReadLatency => vec![
            expression("e1", "(m1/m2)*1000", "ReadLatency"),
            average("m1", "VolumeTotalReadTime", volume_id),
            average("m2", "VolumeReadOps", volume_id),
        ],
        AlarmType::WriteLatency => vec![
            expression("e1", "(m1/m2)*1000", "WriteLatency"),
            average("m1", "VolumeTotalWriteTime", volume_id),
            average("m2", "VolumeWriteOps", volume_id),
        ],
    }
}

fn expression(id: &str, expression: &str, label: &str) -> MetricQuery {
    MetricQuery {
        id: id.to_string(),
        return_data: true,
        kind: MetricQueryKind::Expression {
            expression: expression.to_string(),
            label: label.to_string(),
        },
    }
}

/// 60-second average series for one EBS metric of one volume
fn average(id: &str, metric_name: &str, volume_id: &str) -> MetricQuery {
    MetricQuery {
        id: id.to_string(),
        return_data: false,
        kind: MetricQueryKind::Stat {
            namespace: EBS_NAMESPACE.to_string(),
            metric_name: metric_name.to_string(),
            dimension_name: VOLUME_DIMENSION.to_string(),
            dimension_value: volume_id.to_string(),
            period: 60,
            stat: "Average".to_string(),
        },
    }
}
