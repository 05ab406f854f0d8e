//! Conversions between SDK alarm types and the domain model

use aws_sdk_cloudwatch::types::{Dimension, Metric, MetricAlarm, MetricDataQuery, MetricStat};

use alarm_model::{AlarmDefinition, MetricQuery, MetricQueryKind};
use reconciler::GatewayError;

fn malformed(name: &str, reason: impl Into<String>) -> GatewayError {
    GatewayError::Malformed {
        name: name.to_string(),
        reason: reason.into(),
    }
}

/// Map an inventoried `MetricAlarm` into the reconciler's model.
///
/// Scalar fields the change-detection predicate relies on must be present;
/// an alarm missing any of them is reported as malformed rather than
/// silently defaulted into a wrong decision.
pub(crate) fn alarm_from_sdk(alarm: MetricAlarm) -> Result<AlarmDefinition, GatewayError> {
    let name = alarm.alarm_name.unwrap_or_default();
    let evaluation_periods = alarm
        .evaluation_periods
        .ok_or_else(|| malformed(&name, "missing EvaluationPeriods"))?;
    let datapoints_to_alarm = alarm.datapoints_to_alarm.unwrap_or(evaluation_periods);
    let threshold = alarm
        .threshold
        .ok_or_else(|| malformed(&name, "missing Threshold"))?;
    let comparison_operator = alarm
        .comparison_operator
        .as_ref()
        .ok_or_else(|| malformed(&name, "missing ComparisonOperator"))?
        .as_str()
        .parse()
        .map_err(|err: alarm_model::UnknownValue| malformed(&name, err.to_string()))?;
    // CloudWatch omits the field when the alarm uses the default treatment
    let treat_missing_data = alarm
        .treat_missing_data
        .as_deref()
        .unwrap_or("missing")
        .parse()
        .map_err(|err: alarm_model::UnknownValue| malformed(&name, err.to_string()))?;
    let metrics = alarm
        .metrics
        .unwrap_or_default()
        .into_iter()
        .map(|query| query_from_sdk(query, &name))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(AlarmDefinition {
        alarm_actions: alarm.alarm_actions.unwrap_or_default(),
        actions_enabled: alarm.actions_enabled.unwrap_or(false),
        evaluation_periods,
        datapoints_to_alarm,
        threshold,
        comparison_operator,
        treat_missing_data,
        metrics,
        name,
    })
}

fn query_from_sdk(query: MetricDataQuery, alarm: &str) -> Result<MetricQuery, GatewayError> {
    let kind = if let Some(expression) = query.expression {
        MetricQueryKind::Expression {
            expression,
            label: query.label.unwrap_or_default(),
        }
    } else if let Some(stat) = query.metric_stat {
        let metric = stat
            .metric
            .ok_or_else(|| malformed(alarm, "metric stat without a metric"))?;
        let dimension = metric
            .dimensions
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| malformed(alarm, "metric series without a dimension"))?;
        MetricQueryKind::Stat {
            namespace: metric.namespace.unwrap_or_default(),
            metric_name: metric.metric_name.unwrap_or_default(),
            dimension_name: dimension.name.unwrap_or_default(),
            dimension_value: dimension.value.unwrap_or_default(),
            period: stat
                .period
                .ok_or_else(|| malformed(alarm, "metric stat without a period"))?,
            stat: stat
                .stat
                .ok_or_else(|| malformed(alarm, "metric stat without a statistic"))?,
        }
    } else {
        return Err(malformed(alarm, "metric query has neither expression nor stat"));
    };

    Ok(MetricQuery {
        id: query.id.unwrap_or_default(),
        return_data: query.return_data.unwrap_or(true),
        kind,
    })
}

/// Build the SDK query for a push. Build errors cannot occur for
/// definitions produced by the model, but they are surfaced rather than
/// unwrapped.
pub(crate) fn query_to_sdk(
    query: &MetricQuery,
    alarm: &str,
) -> Result<MetricDataQuery, GatewayError> {
    let builder = MetricDataQuery::builder()
        .id(query.id.clone())
        .return_data(query.return_data);
    let builder = match &query.kind {
        MetricQueryKind::Expression { expression, label } => {
            builder.expression(expression.clone()).label(label.clone())
        }
        MetricQueryKind::Stat {
            namespace,
            metric_name,
            dimension_name,
            dimension_value,
            period,
            stat,
        } => {
            let dimension = Dimension::builder()
                .name(dimension_name.clone())
                .value(dimension_value.clone())
                .build()
                .map_err(|err| malformed(alarm, err.to_string()))?;
            let metric = Metric::builder()
                .namespace(namespace.clone())
                .metric_name(metric_name.clone())
                .dimensions(dimension)
                .build();
            let metric_stat = MetricStat::builder()
                .metric(metric)
                .period(*period)
                .stat(stat.clone())
                .build()
                .map_err(|err| malformed(alarm, err.to_string()))?;
            builder.metric_stat(metric_stat)
        }
    };
    builder.build().map_err(|err| malformed(alarm, err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alarm_model::{ComparisonOperator, TreatMissingData, EBS_NAMESPACE, VOLUME_DIMENSION};
    use aws_sdk_cloudwatch::types::ComparisonOperator as SdkComparisonOperator;

    fn sdk_stat_query(id: &str, metric_name: &str) -> MetricDataQuery {
        MetricDataQuery::builder()
            .id(id)
            .return_data(false)
            .metric_stat(
                MetricStat::builder()
                    .metric(
                        Metric::builder()
                            .namespace(EBS_NAMESPACE)
                            .metric_name(metric_name)
                            .dimensions(
                                Dimension::builder()
                                    .name(VOLUME_DIMENSION)
                                    .value("vol-1")
                                    .build()
                                    .unwrap(),
                            )
                            .build(),
                    )
                    .period(60)
                    .stat("Average")
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn metric_alarm_maps_to_definition() {
        let metric_alarm = MetricAlarm::builder()
            .alarm_name("EBS_vol-1_ReadLatency")
            .alarm_actions("arn:aws:sns:us-east-1:123:alerts")
            .actions_enabled(true)
            .evaluation_periods(5)
            .datapoints_to_alarm(4)
            .threshold(100.0)
            .comparison_operator(SdkComparisonOperator::GreaterThanOrEqualToThreshold)
            .treat_missing_data("missing")
            .metrics(sdk_stat_query("m1", "VolumeTotalReadTime"))
            .build();

        let alarm = alarm_from_sdk(metric_alarm).unwrap();
        assert_eq!(alarm.name, "EBS_vol-1_ReadLatency");
        assert!(alarm.actions_enabled);
        assert_eq!(alarm.evaluation_periods, 5);
        assert_eq!(alarm.datapoints_to_alarm, 4);
        assert_eq!(alarm.threshold, 100.0);
        assert_eq!(
            alarm.comparison_operator,
            ComparisonOperator::GreaterThanOrEqualToThreshold
        );
        assert_eq!(alarm.treat_missing_data, TreatMissingData::Missing);
        assert_eq!(alarm.metrics.len(), 1);
        match &alarm.metrics[0].kind {
            MetricQueryKind::Stat { metric_name, dimension_value, period, .. } => {
                assert_eq!(metric_name, "VolumeTotalReadTime");
                assert_eq!(dimension_value, "vol-1");
                assert_eq!(*period, 60);
            }
            other => panic!("expected stat query, got {other:?}"),
        }
    }

    #[test]
    fn omitted_treatment_defaults_to_missing() {
        let metric_alarm = MetricAlarm::builder()
            .alarm_name("EBS_vol-1_ReadLatency")
            .evaluation_periods(5)
            .threshold(100.0)
            .comparison_operator(SdkComparisonOperator::GreaterThanOrEqualToThreshold)
            .build();
        let alarm = alarm_from_sdk(metric_alarm).unwrap();
        assert_eq!(alarm.treat_missing_data, TreatMissingData::Missing);
        // absent DatapointsToAlarm falls back to EvaluationPeriods
        assert_eq!(alarm.datapoints_to_alarm, 5);
        assert!(!alarm.actions_enabled);
    }

    #[test]
    fn alarm_without_threshold_is_malformed() {
        let metric_alarm = MetricAlarm::builder()
            .alarm_name("EBS_vol-1_ReadLatency")
            .evaluation_periods(5)
            .comparison_operator(SdkComparisonOperator::GreaterThanOrEqualToThreshold)
            .build();
        let err = alarm_from_sdk(metric_alarm).unwrap_err();
        assert!(matches!(err, GatewayError::Malformed { .. }));
    }

    #[test]
    fn queries_round_trip_through_sdk_types() {
        let expression = MetricQuery {
            id: "e1".to_string(),
            return_data: true,
            kind: MetricQueryKind::Expression {
                expression: "(m1/m2)*1000".to_string(),
                label: "ReadLatency".to_string(),
            },
        };
        let series = MetricQuery {
            id: "m1".to_string(),
            return_data: false,
            kind: MetricQueryKind::Stat {
                namespace: EBS_NAMESPACE.to_string(),
                metric_name: "VolumeReadOps".to_string(),
                dimension_name: VOLUME_DIMENSION.to_string(),
                dimension_value: "vol-1".to_string(),
                period: 60,
                stat: "Average".to_string(),
            },
        };
        for query in [expression, series] {
            let sdk = query_to_sdk(&query, "EBS_vol-1_ReadLatency").unwrap();
            let back = query_from_sdk(sdk, "EBS_vol-1_ReadLatency").unwrap();
            assert_eq!(back, query);
        }
    }
}
