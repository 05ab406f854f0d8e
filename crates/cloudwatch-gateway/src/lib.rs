//! CloudWatch Gateway
//!
//! Production [`AlarmGateway`] backed by the EC2 and CloudWatch SDKs:
//! paginated volume discovery, paginated alarm inventory filtered by name
//! prefix, and the put/delete/disable write calls.

mod convert;

use std::collections::HashMap;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_cloudwatch::error::DisplayErrorContext;
use aws_sdk_cloudwatch::types::ComparisonOperator as SdkComparisonOperator;
use tracing::debug;

use alarm_model::AlarmDefinition;
use reconciler::{AlarmGateway, GatewayError};

/// Gateway holding one EC2 and one CloudWatch client for the configured
/// region
pub struct CloudWatchGateway {
    ec2: aws_sdk_ec2::Client,
    cloudwatch: aws_sdk_cloudwatch::Client,
}

impl CloudWatchGateway {
    /// Build clients from the ambient credential chain and the given region
    pub async fn new(region: &str) -> Self {
        let shared = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;
        Self {
            ec2: aws_sdk_ec2::Client::new(&shared),
            cloudwatch: aws_sdk_cloudwatch::Client::new(&shared),
        }
    }
}

#[async_trait]
impl AlarmGateway for CloudWatchGateway {
    async fn list_volumes(&self, page_size: i32) -> Result<Vec<String>, GatewayError> {
        let mut pages = self
            .ec2
            .describe_volumes()
            .max_results(page_size)
            .into_paginator()
            .send();
        let mut volume_ids = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page
                .map_err(|err| GatewayError::ListVolumes(DisplayErrorContext(err).to_string()))?;
            for volume in page.volumes.unwrap_or_default() {
                if let Some(id) = volume.volume_id {
                    volume_ids.push(id);
                }
            }
        }
        debug!("discovered {} volumes", volume_ids.len());
        Ok(volume_ids)
    }

    async fn list_alarms(
        &self,
        name_prefix: &str,
        page_size: i32,
    ) -> Result<HashMap<String, AlarmDefinition>, GatewayError> {
        let mut pages = self
            .cloudwatch
            .describe_alarms()
            .alarm_name_prefix(name_prefix)
            .max_records(page_size)
            .into_paginator()
            .send();
        let mut alarms = HashMap::new();
        while let Some(page) = pages.next().await {
            let page =
                page.map_err(|err| GatewayError::ListAlarms(DisplayErrorContext(err).to_string()))?;
            for metric_alarm in page.metric_alarms.unwrap_or_default() {
                let alarm = convert::alarm_from_sdk(metric_alarm)?;
                alarms.insert(alarm.name.clone(), alarm);
            }
        }
        debug!("inventoried {} alarms with prefix {name_prefix}", alarms.len());
        Ok(alarms)
    }

    async fn put_alarm(&self, alarm: &AlarmDefinition) -> Result<(), GatewayError> {
        let metrics = alarm
            .metrics
            .iter()
            .map(|query| convert::query_to_sdk(query, &alarm.name))
            .collect::<Result<Vec<_>, _>>()?;
        self.cloudwatch
            .put_metric_alarm()
            .alarm_name(alarm.name.clone())
            .set_alarm_actions(Some(alarm.alarm_actions.clone()))
            .actions_enabled(alarm.actions_enabled)
            .evaluation_periods(alarm.evaluation_periods)
            .datapoints_to_alarm(alarm.datapoints_to_alarm)
            .threshold(alarm.threshold)
            .comparison_operator(SdkComparisonOperator::from(
                alarm.comparison_operator.as_str(),
            ))
            .treat_missing_data(alarm.treat_missing_data.as_str())
            .set_metrics(Some(metrics))
            .send()
            .await
            .map_err(|err| GatewayError::Put {
                name: alarm.name.clone(),
                reason: DisplayErrorContext(err).to_string(),
            })?;
        Ok(())
    }

    async fn delete_alarms(&self, names: &[String]) -> Result<(), GatewayError> {
        self.cloudwatch
            .delete_alarms()
            .set_alarm_names(Some(names.to_vec()))
            .send()
            .await
            .map_err(|err| GatewayError::Delete(DisplayErrorContext(err).to_string()))?;
        Ok(())
    }

    async fn disable_alarm_actions(&self, names: &[String]) -> Result<(), GatewayError> {
        self.cloudwatch
            .disable_alarm_actions()
            .set_alarm_names(Some(names.to_vec()))
            .send()
            .await
            .map_err(|err| GatewayError::Disable(DisplayErrorContext(err).to_string()))?;
        Ok(())
    }
}
