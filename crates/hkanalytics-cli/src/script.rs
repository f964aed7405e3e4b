//! JSON-lines operation scripts
//!
//! One operation per line, e.g.
//! `{"op":"track","event":"purchase","parameters":{"item":"sku1"}}`.
//! Blank lines and lines starting with `#` are ignored.

use anyhow::{Context, Result};
use hkanalytics::config::PartialAnalyticsConfiguration;
use hkanalytics::{AnalyticsConfiguration, ParamMap, TelemetryClient};
use serde::Deserialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ScriptOp {
    /// Re-configure; unset keys fall back to the loaded configuration
    Configure {
        #[serde(default)]
        config: PartialAnalyticsConfiguration,
    },
    Track {
        event: String,
        parameters: Option<ParamMap>,
    },
    TrackScreen {
        screen: String,
        parameters: Option<ParamMap>,
    },
    TrackInteraction {
        interaction: String,
        element: String,
        screen: Option<String>,
        parameters: Option<ParamMap>,
    },
    TrackSelection {
        selection: String,
        value: String,
        screen: Option<String>,
        parameters: Option<ParamMap>,
    },
    SetUserId {
        id: String,
    },
    SetUserProperty {
        name: String,
        value: Option<String>,
    },
    SetUserContext {
        context: ParamMap,
    },
    AddBreadcrumb {
        message: String,
        data: Option<ParamMap>,
    },
    RecordError {
        message: String,
        additional_data: Option<ParamMap>,
    },
    SetCrashReportingEnabled {
        enabled: bool,
    },
    SetAnalyticsCollectionEnabled {
        enabled: bool,
    },
    SetDebugMode {
        enabled: bool,
    },
}

/// Error value handed to the client for `record_error` operations
#[derive(Debug)]
pub struct ScriptedError(pub String);

impl fmt::Display for ScriptedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ScriptedError {}

/// Parse a whole script; the first malformed line aborts with its line number.
pub fn parse_script(source: &str) -> Result<Vec<ScriptOp>> {
    source
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with('#')
        })
        .map(|(index, line)| {
            serde_json::from_str::<ScriptOp>(line)
                .with_context(|| format!("line {}: invalid operation", index + 1))
        })
        .collect()
}

/// Run `ops` in order. `base` is what `configure` operations are layered on.
pub fn run_script(client: &TelemetryClient, base: &AnalyticsConfiguration, ops: &[ScriptOp]) {
    for op in ops {
        tracing::debug!(?op, "replaying operation");
        match op {
            ScriptOp::Configure { config } => {
                let mut configuration = base.clone();
                config.apply_to(&mut configuration);
                client.configure(configuration);
            }
            ScriptOp::Track { event, parameters } => client.track(event, parameters.as_ref()),
            ScriptOp::TrackScreen { screen, parameters } => {
                client.track_screen(screen, parameters.as_ref())
            }
            ScriptOp::TrackInteraction {
                interaction,
                element,
                screen,
                parameters,
            } => client.track_interaction(
                interaction,
                element,
                screen.as_deref(),
                parameters.as_ref(),
            ),
            ScriptOp::TrackSelection {
                selection,
                value,
                screen,
                parameters,
            } => client.track_selection(selection, value, screen.as_deref(), parameters.as_ref()),
            ScriptOp::SetUserId { id } => client.set_user_id(id),
            ScriptOp::SetUserProperty { name, value } => {
                client.set_user_property(name, value.as_deref())
            }
            ScriptOp::SetUserContext { context } => client.set_user_context(context),
            ScriptOp::AddBreadcrumb { message, data } => {
                client.add_breadcrumb(message, data.as_ref())
            }
            ScriptOp::RecordError {
                message,
                additional_data,
            } => client.record_error(&ScriptedError(message.clone()), additional_data.as_ref()),
            ScriptOp::SetCrashReportingEnabled { enabled } => {
                client.set_crash_reporting_enabled(*enabled)
            }
            ScriptOp::SetAnalyticsCollectionEnabled { enabled } => {
                client.set_analytics_collection_enabled(*enabled)
            }
            ScriptOp::SetDebugMode { enabled } => client.set_debug_mode(*enabled),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hkanalytics::{params, MemoryBackend, ParamValue};
    use std::sync::Arc;

    #[test]
    fn test_parse_skips_blank_and_comment_lines() {
        let ops = parse_script(
            r#"
# warm up
{"op":"set_user_id","id":"u-1"}

{"op":"track","event":"purchase","parameters":{"item":"sku1","price":9.5}}
"#,
        )
        .unwrap();

        assert_eq!(
            ops,
            vec![
                ScriptOp::SetUserId {
                    id: "u-1".to_string()
                },
                ScriptOp::Track {
                    event: "purchase".to_string(),
                    parameters: Some(params! { "item" => "sku1", "price" => 9.5 }),
                },
            ]
        );
    }

    #[test]
    fn test_parse_reports_line_number() {
        let err = parse_script("{\"op\":\"track\",\"event\":\"a\"}\n{\"op\":\"launch\"}\n")
            .unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_configure_layers_on_base() {
        let ops = parse_script(r#"{"op":"configure","config":{"max_parameter_value_length":3}}"#)
            .unwrap();
        let backend = Arc::new(MemoryBackend::new());
        let client = TelemetryClient::new(backend.clone(), backend.clone());
        let base = AnalyticsConfiguration::debug();

        run_script(&client, &base, &ops);

        let config = client.configuration().unwrap();
        assert!(config.debug_mode);
        assert_eq!(config.max_parameter_value_length, 3);
    }

    #[test]
    fn test_run_script_drives_client() {
        let ops = parse_script(
            r#"{"op":"add_breadcrumb","message":"tapped","data":{"btn":"ok"}}
{"op":"record_error","message":"boom","additional_data":{"screen":"home"}}
{"op":"track_screen","screen":"Home"}"#,
        )
        .unwrap();
        let backend = Arc::new(MemoryBackend::new());
        let client = TelemetryClient::new(backend.clone(), backend.clone());

        run_script(&client, &AnalyticsConfiguration::default(), &ops);

        let errors = backend.errors();
        assert_eq!(errors[0].error, "boom");
        assert_eq!(errors[0].context["screen"], ParamValue::from("home"));
        assert_eq!(backend.events()[0].name, "screen_view");
    }
}
