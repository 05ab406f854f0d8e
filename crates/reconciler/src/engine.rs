//! Reconciliation engine: one pass per run mode

use std::collections::HashMap;

use tracing::{error, info};

use alarm_config::AlarmSettings;
use alarm_model::{
    alarm_name, build_definition, AlarmDefinition, AlarmType, AlarmTypeConfig, ALARM_NAME_PREFIX,
};

use crate::gateway::{AlarmGateway, GatewayError, PAGE_SIZE};

/// Drives one batch run against the gateway.
///
/// Settings are resolved once at construction and frozen for the run.
pub struct Reconciler<G> {
    gateway: G,
    settings: AlarmSettings,
}

impl<G: AlarmGateway> Reconciler<G> {
    pub fn new(gateway: G, settings: AlarmSettings) -> Self {
        Self { gateway, settings }
    }

    /// Create/update mode.
    ///
    /// Takes one inventory snapshot, drains it while matching volumes, and
    /// deletes whatever names remain unconsumed: those belong to volumes
    /// that no longer exist. Listing failures abort the run; individual
    /// put failures are logged and skipped.
    pub async fn create(&self) -> Result<(), GatewayError> {
        let volumes = self.gateway.list_volumes(PAGE_SIZE).await?;
        let mut inventory = self
            .gateway
            .list_alarms(ALARM_NAME_PREFIX, PAGE_SIZE)
            .await?;
        info!(
            "reconciling {} volumes against {} existing alarms",
            volumes.len(),
            inventory.len()
        );

        for volume in &volumes {
            info!("working on alarms for volume {volume}");
            for alarm_type in AlarmType::ALL {
                self.reconcile_one(volume, alarm_type, &mut inventory).await;
            }
        }

        // Unconsumed names have no live volume behind them.
        let orphans: Vec<String> = inventory.into_keys().collect();
        self.delete_in_batches(orphans).await;
        Ok(())
    }

    /// One step of the per-(volume, alarm type) state machine: consume the
    /// matching inventory entry if present, then create or update.
    async fn reconcile_one(
        &self,
        volume: &str,
        alarm_type: AlarmType,
        inventory: &mut HashMap<String, AlarmDefinition>,
    ) {
        let name = alarm_name(volume, alarm_type);
        let config = self.settings.for_type(alarm_type);
        match inventory.remove(&name) {
            None => {
                let desired = build_definition(volume, alarm_type, config, &self.settings.sns_arn);
                self.push(desired).await;
            }
            Some(mut observed) => {
                if needs_update(&observed, config) {
                    apply_config(&mut observed, config);
                    self.push(observed).await;
                } else {
                    info!("alarm {name} is up to date");
                }
            }
        }
    }

    async fn push(&self, alarm: AlarmDefinition) {
        match self.gateway.put_alarm(&alarm).await {
            Ok(()) => info!("alarm '{}' updated/created", alarm.name),
            Err(err) => error!("skipping alarm '{}': {err}", alarm.name),
        }
    }

    /// Disable mode: turn actions off for every currently enabled alarm
    pub async fn disable(&self) -> Result<(), GatewayError> {
        let inventory = self
            .gateway
            .list_alarms(ALARM_NAME_PREFIX, PAGE_SIZE)
            .await?;
        let enabled: Vec<String> = inventory
            .into_iter()
            .filter(|(_, alarm)| alarm.actions_enabled)
            .map(|(name, _)| name)
            .collect();
        info!("disabling {} alarms", enabled.len());
        for batch in enabled.chunks(PAGE_SIZE as usize) {
            info!("disabling alarms {batch:?}");
            if let Err(err) = self.gateway.disable_alarm_actions(batch).await {
                error!("{err}");
            }
        }
        Ok(())
    }

    /// Delete mode: remove every inventoried alarm unconditionally
    pub async fn delete(&self) -> Result<(), GatewayError> {
        let inventory = self
            .gateway
            .list_alarms(ALARM_NAME_PREFIX, PAGE_SIZE)
            .await?;
        self.delete_in_batches(inventory.into_keys().collect()).await;
        Ok(())
    }

    async fn delete_in_batches(&self, names: Vec<String>) {
        for batch in names.chunks(PAGE_SIZE as usize) {
            info!("deleting alarms {batch:?}");
            if let Err(err) = self.gateway.delete_alarms(batch).await {
                error!("{err}");
            }
        }
    }
}

/// Change-detection predicate.
///
/// Compares the alarm's enabled state and the five scalar settings against
/// the resolved config. Metric definitions are deliberately not compared:
/// a stale recipe on an otherwise matching alarm is left untouched.
fn needs_update(alarm: &AlarmDefinition, config: &AlarmTypeConfig) -> bool {
    let name = &alarm.name;
    if !alarm.actions_enabled {
        info!("change in ActionsEnabled for alarm {name}: enabling");
        return true;
    }
    if alarm.evaluation_periods != config.evaluation_periods {
        info!(
            "change in EvaluationPeriods for alarm {name}: old {}, new {}",
            alarm.evaluation_periods, config.evaluation_periods
        );
        return true;
    }
    if alarm.datapoints_to_alarm != config.datapoints_to_alarm {
        info!(
            "change in DatapointsToAlarm for alarm {name}: old {}, new {}",
            alarm.datapoints_to_alarm, config.datapoints_to_alarm
        );
        return true;
    }
    if alarm.threshold != config.threshold {
        info!(
            "change in Threshold for alarm {name}: old {}, new {}",
            alarm.threshold, config.threshold
        );
        return true;
    }
    if alarm.comparison_operator != config.comparison_operator {
        info!(
            "change in ComparisonOperator for alarm {name}: old {}, new {}",
            alarm.comparison_operator, config.comparison_operator
        );
        return true;
    }
    if alarm.treat_missing_data != config.treat_missing_data {
        info!(
            "change in TreatMissingData for alarm {name}: old {}, new {}",
            alarm.treat_missing_data, config.treat_missing_data
        );
        return true;
    }
    false
}

/// Overwrite the scalar settings from config and re-enable actions. The
/// metric query list is left exactly as observed.
fn apply_config(alarm: &mut AlarmDefinition, config: &AlarmTypeConfig) {
    alarm.actions_enabled = true;
    alarm.evaluation_periods = config.evaluation_periods;
    alarm.datapoints_to_alarm = config.datapoints_to_alarm;
    alarm.threshold = config.threshold;
    alarm.comparison_operator = config.comparison_operator;
    alarm.treat_missing_data = config.treat_missing_data;
}
