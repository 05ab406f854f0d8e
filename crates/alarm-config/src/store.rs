//! Config store: INI sections to typed, immutable alarm settings

use std::collections::HashMap;
use std::str::FromStr;

use config::{Config, File, FileFormat};
use tracing::debug;

use alarm_model::{AlarmType, AlarmTypeConfig};

use crate::error::ConfigError;

/// Default location of the config file, next to the binary
pub const DEFAULT_CONFIG_PATH: &str = "ebs-alarm.config";

/// Raw key/value pairs of one config section
pub type SectionValues = HashMap<String, String>;

/// A recognized config key together with its hardcoded default.
///
/// Defaults apply independently per key: a section missing one key still
/// gets real values for the others. Key names are matched after ASCII
/// lowercasing, so the documented CamelCase file keys resolve here.
#[derive(Debug, Clone, Copy)]
pub struct ConfigKey {
    pub name: &'static str,
    pub default: &'static str,
}

const EVALUATION_PERIODS: ConfigKey = ConfigKey {
    name: "evaluationperiods",
    default: "5",
};
const DATAPOINTS_TO_ALARM: ConfigKey = ConfigKey {
    name: "datapointstoalarm",
    default: "5",
};
const THRESHOLD: ConfigKey = ConfigKey {
    name: "threshold",
    default: "100",
};
const COMPARISON_OPERATOR: ConfigKey = ConfigKey {
    name: "comparisonoperator",
    default: "GreaterThanOrEqualToThreshold",
};
const TREAT_MISSING_DATA: ConfigKey = ConfigKey {
    name: "treatmissingdata",
    default: "missing",
};

const DEFAULT_SECTION: &str = "default";
const SNS_ARN_KEY: &str = "sns_arn";
const AWS_REGION_KEY: &str = "aws_region";

/// Look up a key in a section, falling back to its hardcoded default
pub fn resolve<'a>(section: &'a SectionValues, key: &ConfigKey) -> &'a str {
    section.get(key.name).map(String::as_str).unwrap_or(key.default)
}

/// Everything the reconciler needs from configuration, resolved once at
/// startup and immutable for the duration of the run
#[derive(Debug, Clone)]
pub struct AlarmSettings {
    /// SNS topic attached as the sole alarm action
    pub sns_arn: String,
    /// Region the EC2 and CloudWatch clients operate in
    pub aws_region: String,
    pub impaired_volume: AlarmTypeConfig,
    pub read_latency: AlarmTypeConfig,
    pub write_latency: AlarmTypeConfig,
}

impl AlarmSettings {
    /// Load and resolve the config file.
    ///
    /// An unreadable or unparseable file is fatal; a missing alarm-type
    /// section just means all defaults for that type.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let parsed: HashMap<String, HashMap<String, String>> = Config::builder()
            .add_source(File::new(path, FileFormat::Ini))
            .build()?
            .try_deserialize()?;

        let sections: HashMap<String, SectionValues> = parsed
            .into_iter()
            .map(|(name, values)| {
                let values = values
                    .into_iter()
                    .map(|(k, v)| (k.to_ascii_lowercase(), v))
                    .collect();
                (name.to_ascii_lowercase(), values)
            })
            .collect();

        let empty = SectionValues::new();
        let defaults = sections.get(DEFAULT_SECTION).unwrap_or(&empty);
        let sns_arn = required(defaults, DEFAULT_SECTION, SNS_ARN_KEY)?;
        let aws_region = required(defaults, DEFAULT_SECTION, AWS_REGION_KEY)?;

        let type_section = |alarm_type: AlarmType| {
            sections
                .get(&alarm_type.config_section().to_ascii_lowercase())
                .unwrap_or(&empty)
        };

        let settings = Self {
            sns_arn,
            aws_region,
            impaired_volume: alarm_type_config(type_section(AlarmType::ImpairedVolume))?,
            read_latency: alarm_type_config(type_section(AlarmType::ReadLatency))?,
            write_latency: alarm_type_config(type_section(AlarmType::WriteLatency))?,
        };
        debug!("loaded alarm settings from {path}: {settings:?}");
        Ok(settings)
    }

    /// Resolved settings for one alarm type
    pub fn for_type(&self, alarm_type: AlarmType) -> &AlarmTypeConfig {
        match alarm_type {
            AlarmType::ImpairedVolume => &self.impaired_volume,
            AlarmType::ReadLatency => &self.read_latency,
            AlarmType::WriteLatency => &self.write_latency,
        }
    }
}

fn required(
    section: &SectionValues,
    section_name: &'static str,
    key: &'static str,
) -> Result<String, ConfigError> {
    section
        .get(key)
        .cloned()
        .ok_or(ConfigError::MissingKey {
            section: section_name,
            key,
        })
}

fn alarm_type_config(section: &SectionValues) -> Result<AlarmTypeConfig, ConfigError> {
    let config = AlarmTypeConfig {
        evaluation_periods: parse_i32(section, &EVALUATION_PERIODS)?,
        datapoints_to_alarm: parse_i32(section, &DATAPOINTS_TO_ALARM)?,
        threshold: parse_f64(section, &THRESHOLD)?,
        comparison_operator: parse_enum(section, &COMPARISON_OPERATOR)?,
        treat_missing_data: parse_enum(section, &TREAT_MISSING_DATA)?,
    };
    if config.evaluation_periods < 1 {
        return Err(ConfigError::InvalidValue {
            key: EVALUATION_PERIODS.name,
            value: config.evaluation_periods.to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    if config.datapoints_to_alarm < 1 || config.datapoints_to_alarm > config.evaluation_periods {
        return Err(ConfigError::InvalidValue {
            key: DATAPOINTS_TO_ALARM.name,
            value: config.datapoints_to_alarm.to_string(),
            reason: format!("must be within 1..={}", config.evaluation_periods),
        });
    }
    Ok(config)
}

fn parse_i32(section: &SectionValues, key: &ConfigKey) -> Result<i32, ConfigError> {
    let raw = resolve(section, key);
    raw.parse().map_err(|e: std::num::ParseIntError| {
        ConfigError::InvalidValue {
            key: key.name,
            value: raw.to_string(),
            reason: e.to_string(),
        }
    })
}

fn parse_f64(section: &SectionValues, key: &ConfigKey) -> Result<f64, ConfigError> {
    let raw = resolve(section, key);
    raw.parse().map_err(|e: std::num::ParseFloatError| {
        ConfigError::InvalidValue {
            key: key.name,
            value: raw.to_string(),
            reason: e.to_string(),
        }
    })
}

fn parse_enum<T>(section: &SectionValues, key: &ConfigKey) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = resolve(section, key);
    raw.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.name,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alarm_model::{ComparisonOperator, TreatMissingData};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn load(contents: &str) -> Result<AlarmSettings, ConfigError> {
        let file = write_config(contents);
        AlarmSettings::load(file.path().to_str().unwrap())
    }

    const MINIMAL: &str =
        "[default]\nsns_arn = arn:aws:sns:us-east-1:123:alerts\naws_region = us-east-1\n";

    #[test]
    fn camel_case_file_keys_are_accepted() {
        let settings = load(
            "[default]\n\
             sns_arn = arn:aws:sns:us-east-1:123:alerts\n\
             aws_region = us-east-1\n\
             [ReadLatency]\n\
             EvaluationPeriods = 10\n\
             DatapointsToAlarm = 7\n\
             Threshold = 42.5\n\
             ComparisonOperator = GreaterThanThreshold\n\
             TreatMissingData = notBreaching\n",
        )
        .unwrap();
        let read = settings.for_type(AlarmType::ReadLatency);
        assert_eq!(read.evaluation_periods, 10);
        assert_eq!(read.datapoints_to_alarm, 7);
        assert_eq!(read.threshold, 42.5);
        assert_eq!(read.comparison_operator, ComparisonOperator::GreaterThanThreshold);
        assert_eq!(read.treat_missing_data, TreatMissingData::NotBreaching);
    }

    #[test]
    fn missing_sections_resolve_to_all_defaults() {
        let settings = load(MINIMAL).unwrap();
        for alarm_type in AlarmType::ALL {
            let config = settings.for_type(alarm_type);
            assert_eq!(config.evaluation_periods, 5);
            assert_eq!(config.datapoints_to_alarm, 5);
            assert_eq!(config.threshold, 100.0);
            assert_eq!(
                config.comparison_operator,
                ComparisonOperator::GreaterThanOrEqualToThreshold
            );
            assert_eq!(config.treat_missing_data, TreatMissingData::Missing);
        }
    }

    #[test]
    fn defaults_apply_per_key_not_per_section() {
        let settings = load(&format!(
            "{MINIMAL}[WriteLatency]\nEvaluationPeriods = 8\nDatapointsToAlarm = 6\n"
        ))
        .unwrap();
        let write = settings.for_type(AlarmType::WriteLatency);
        assert_eq!(write.evaluation_periods, 8);
        assert_eq!(write.datapoints_to_alarm, 6);
        // keys absent from the section still resolve to real values
        assert_eq!(write.threshold, 100.0);
        assert_eq!(write.treat_missing_data, TreatMissingData::Missing);
    }

    #[test]
    fn resolve_falls_back_per_key() {
        let mut section = SectionValues::new();
        section.insert("evaluationperiods".to_string(), "9".to_string());
        assert_eq!(resolve(&section, &EVALUATION_PERIODS), "9");
        assert_eq!(resolve(&section, &THRESHOLD), "100");
    }

    #[test]
    fn missing_notification_target_is_fatal() {
        let err = load("[default]\naws_region = us-east-1\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingKey { section: "default", key: "sns_arn" }
        ));
    }

    #[test]
    fn invalid_values_are_fatal() {
        let err = load(&format!("{MINIMAL}[ReadLatency]\nEvaluationPeriods = soon\n")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "evaluationperiods", .. }));

        let err = load(&format!(
            "{MINIMAL}[ReadLatency]\nComparisonOperator = Sideways\n"
        ))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "comparisonoperator", .. }));
    }

    #[test]
    fn datapoints_cannot_exceed_evaluation_periods() {
        let err = load(&format!(
            "{MINIMAL}[ImpairedVolume]\nEvaluationPeriods = 3\nDatapointsToAlarm = 4\n"
        ))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "datapointstoalarm", .. }));
    }

    #[test]
    fn unreadable_config_is_fatal() {
        let err = AlarmSettings::load("/nonexistent/ebs-alarm.config").unwrap_err();
        assert!(matches!(err, ConfigError::Read(_)));
    }
}
