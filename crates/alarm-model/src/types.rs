//! Alarm type enumeration, scalar settings, and the alarm naming contract

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Prefix shared by every alarm this tool manages. The inventory listing
/// filters on it, so nothing outside this prefix is ever touched.
pub const ALARM_NAME_PREFIX: &str = "EBS_";

/// A string that did not match any variant of a closed value set
#[derive(Debug, Clone, Error)]
#[error("unrecognized {kind} value: {value}")]
pub struct UnknownValue {
    pub kind: &'static str,
    pub value: String,
}

/// The three alarm kinds maintained per volume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlarmType {
    ImpairedVolume,
    ReadLatency,
    WriteLatency,
}

impl AlarmType {
    /// Processing order within one volume. The types are independent, so
    /// the order carries no semantics.
    pub const ALL: [AlarmType; 3] = [
        AlarmType::ImpairedVolume,
        AlarmType::ReadLatency,
        AlarmType::WriteLatency,
    ];

    /// Suffix encoded into the alarm name. `ImpairedAlarm` differs from
    /// the variant name; existing fleets carry that suffix, so it stays.
    pub fn name_suffix(self) -> &'static str {
        match self {
            AlarmType::ImpairedVolume => "ImpairedAlarm",
            AlarmType::ReadLatency => "ReadLatency",
            AlarmType::WriteLatency => "WriteLatency",
        }
    }

    /// Config file section holding this type's settings
    pub fn config_section(self) -> &'static str {
        match self {
            AlarmType::ImpairedVolume => "ImpairedVolume",
            AlarmType::ReadLatency => "ReadLatency",
            AlarmType::WriteLatency => "WriteLatency",
        }
    }
}

/// Deterministic alarm name for a (volume, alarm type) pair.
///
/// This is the sole join key between discovered volumes and inventoried
/// alarms; no other mapping is persisted anywhere.
pub fn alarm_name(volume_id: &str, alarm_type: AlarmType) -> String {
    format!("{ALARM_NAME_PREFIX}{volume_id}_{}", alarm_type.name_suffix())
}

/// CloudWatch comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComparisonOperator {
    GreaterThanOrEqualToThreshold,
    GreaterThanThreshold,
    LessThanThreshold,
    LessThanOrEqualToThreshold,
    GreaterThanUpperThreshold,
    LessThanLowerThreshold,
    LessThanLowerOrGreaterThanUpperThreshold,
}

impl ComparisonOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            ComparisonOperator::GreaterThanOrEqualToThreshold => "GreaterThanOrEqualToThreshold",
            ComparisonOperator::GreaterThanThreshold => "GreaterThanThreshold",
            ComparisonOperator::LessThanThreshold => "LessThanThreshold",
            ComparisonOperator::LessThanOrEqualToThreshold => "LessThanOrEqualToThreshold",
            ComparisonOperator::GreaterThanUpperThreshold => "GreaterThanUpperThreshold",
            ComparisonOperator::LessThanLowerThreshold => "LessThanLowerThreshold",
            ComparisonOperator::LessThanLowerOrGreaterThanUpperThreshold => {
                "LessThanLowerOrGreaterThanUpperThreshold"
            }
        }
    }
}

impl FromStr for ComparisonOperator {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GreaterThanOrEqualToThreshold" => Ok(Self::GreaterThanOrEqualToThreshold),
            "GreaterThanThreshold" => Ok(Self::GreaterThanThreshold),
            "LessThanThreshold" => Ok(Self::LessThanThreshold),
            "LessThanOrEqualToThreshold" => Ok(Self::LessThanOrEqualToThreshold),
            "GreaterThanUpperThreshold" => Ok(Self::GreaterThanUpperThreshold),
            "LessThanLowerThreshold" => Ok(Self::LessThanLowerThreshold),
            "LessThanLowerOrGreaterThanUpperThreshold" => {
                Ok(Self::LessThanLowerOrGreaterThanUpperThreshold)
            }
            other => Err(UnknownValue {
                kind: "comparison operator",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CloudWatch missing-data treatments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TreatMissingData {
    Missing,
    Ignore,
    Breaching,
    NotBreaching,
}

impl TreatMissingData {
    pub fn as_str(self) -> &'static str {
        match self {
            TreatMissingData::Missing => "missing",
            TreatMissingData::Ignore => "ignore",
            TreatMissingData::Breaching => "breaching",
            TreatMissingData::NotBreaching => "notBreaching",
        }
    }
}

impl FromStr for TreatMissingData {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "missing" => Ok(Self::Missing),
            "ignore" => Ok(Self::Ignore),
            "breaching" => Ok(Self::Breaching),
            "notBreaching" => Ok(Self::NotBreaching),
            other => Err(UnknownValue {
                kind: "missing-data treatment",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for TreatMissingData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scalar alarm settings for one alarm type.
///
/// Built once at startup from the config file and frozen for the whole
/// run; the reconciler never re-reads configuration mid-run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlarmTypeConfig {
    pub evaluation_periods: i32,
    pub datapoints_to_alarm: i32,
    pub threshold: f64,
    pub comparison_operator: ComparisonOperator,
    pub treat_missing_data: TreatMissingData,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alarm_names_encode_volume_and_type() {
        assert_eq!(
            alarm_name("vol-1", AlarmType::ImpairedVolume),
            "EBS_vol-1_ImpairedAlarm"
        );
        assert_eq!(
            alarm_name("vol-1", AlarmType::ReadLatency),
            "EBS_vol-1_ReadLatency"
        );
        assert_eq!(
            alarm_name("vol-1", AlarmType::WriteLatency),
            "EBS_vol-1_WriteLatency"
        );
    }

    #[test]
    fn comparison_operator_round_trips() {
        for s in [
            "GreaterThanOrEqualToThreshold",
            "GreaterThanThreshold",
            "LessThanThreshold",
            "LessThanOrEqualToThreshold",
        ] {
            let op: ComparisonOperator = s.parse().unwrap();
            assert_eq!(op.as_str(), s);
        }
        assert!("NotAnOperator".parse::<ComparisonOperator>().is_err());
    }

    #[test]
    fn treat_missing_data_round_trips() {
        for s in ["missing", "ignore", "breaching", "notBreaching"] {
            let t: TreatMissingData = s.parse().unwrap();
            assert_eq!(t.as_str(), s);
        }
        assert!("NotBreaching".parse::<TreatMissingData>().is_err());
    }
}
