//! Control commands delivered to the stage by the event dispatch layer.

use crate::format::SampleFormat;
use serde::Deserialize;

/// Commands the stage accepts between chunks.
///
/// The wire form is a JSON record tagged with `"type"`; unknown keys inside
/// a command are ignored, unknown command types and unknown sample-format
/// names are deserialization errors.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StageCommand {
    /// Reconfigure the output format. Absent fields keep their current
    /// values.
    Configure(ConfigureParams),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigureParams {
    #[serde(default, rename = "sampleRate")]
    pub sample_rate: Option<u32>,
    #[serde(default)]
    pub channels: Option<u32>,
    #[serde(default, rename = "sampleFormat")]
    pub sample_format: Option<SampleFormat>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_configure_record() {
        let cmd: StageCommand = serde_json::from_str(
            r#"{"type":"configure","sampleRate":44100,"channels":1,"sampleFormat":"f32p"}"#,
        )
        .unwrap();
        let StageCommand::Configure(params) = cmd;
        assert_eq!(params.sample_rate, Some(44100));
        assert_eq!(params.channels, Some(1));
        assert_eq!(params.sample_format, Some(SampleFormat::F32Planar));
    }

    #[test]
    fn absent_fields_stay_unset_and_unknown_keys_are_ignored() {
        let cmd: StageCommand =
            serde_json::from_str(r#"{"type":"configure","channels":6,"bitrate":64000}"#).unwrap();
        let StageCommand::Configure(params) = cmd;
        assert_eq!(params.sample_rate, None);
        assert_eq!(params.channels, Some(6));
        assert_eq!(params.sample_format, None);
    }

    #[test]
    fn rejects_unknown_sample_format_name() {
        let result: Result<StageCommand, _> =
            serde_json::from_str(r#"{"type":"configure","sampleFormat":"dbl"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_unknown_command_type() {
        let result: Result<StageCommand, _> = serde_json::from_str(r#"{"type":"seek","to":12}"#);
        assert!(result.is_err());
    }
}
