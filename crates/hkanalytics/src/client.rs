//! Main telemetry client

use parking_lot::Mutex;
use std::error::Error;
use std::sync::{Arc, Once};

use crate::backend::{AnalyticsBackend, CrashBackend, NoopBackend};
use crate::breadcrumbs::{Breadcrumb, BreadcrumbLog};
use crate::config::AnalyticsConfiguration;
use crate::context::ContextStore;
use crate::gate::{Channel, ReportingGates};
use crate::logging::{self, LogLevel};
use crate::params::{merge, merge_into, ParamMap, ParamValue};
use crate::sanitizer::ParameterSanitizer;

/// Event name used for screen views
pub const SCREEN_VIEW_EVENT: &str = "screen_view";
pub const SCREEN_NAME_PARAM: &str = "screen_name";
pub const SCREEN_CLASS_PARAM: &str = "screen_class";

pub const USER_INTERACTION_EVENT: &str = "user_interaction";
pub const USER_SELECTION_EVENT: &str = "user_selection";

/// Error context key holding the breadcrumb trail
pub const BREADCRUMBS_KEY: &str = "breadcrumbs";

/// Everything the client mutates, guarded as one unit
#[derive(Debug)]
struct ClientState {
    configuration: Option<Arc<AnalyticsConfiguration>>,
    debug_mode: bool,
    gates: ReportingGates,
    context: ContextStore,
    breadcrumbs: BreadcrumbLog,
}

impl ClientState {
    fn sanitizer(&self) -> ParameterSanitizer {
        match &self.configuration {
            Some(config) => ParameterSanitizer::from_configuration(config),
            None => ParameterSanitizer::default(),
        }
    }
}

/// Main telemetry client
///
/// Create one at startup and pass it (usually as `Arc<TelemetryClient>`) to
/// every call site. None of the operations fail; malformed input is degraded,
/// not rejected.
///
/// The internal lock is only held while local state is read or updated and is
/// always released before a backend is called.
pub struct TelemetryClient {
    analytics: Arc<dyn AnalyticsBackend>,
    crash: Arc<dyn CrashBackend>,
    state: Mutex<ClientState>,
    backend_init: Once,
}

impl TelemetryClient {
    pub fn new(analytics: Arc<dyn AnalyticsBackend>, crash: Arc<dyn CrashBackend>) -> Self {
        Self {
            analytics,
            crash,
            state: Mutex::new(ClientState {
                configuration: None,
                debug_mode: false,
                gates: ReportingGates::default(),
                context: ContextStore::new(),
                breadcrumbs: BreadcrumbLog::new(),
            }),
            backend_init: Once::new(),
        }
    }

    /// Install `configuration` as the current configuration.
    ///
    /// Safe to call repeatedly: backend initialization only happens on the
    /// first call, while every call replaces the configuration, resets debug
    /// mode and both gates from it, and pushes the gate states to the
    /// backends.
    pub fn configure(&self, configuration: AnalyticsConfiguration) {
        let configuration = Arc::new(configuration);
        let gates = ReportingGates::from_configuration(&configuration);
        let debug_mode = configuration.debug_mode;

        {
            let mut state = self.state.lock();
            state.configuration = Some(Arc::clone(&configuration));
            state.debug_mode = debug_mode;
            state.gates = gates;
        }

        self.backend_init.call_once(|| {
            self.analytics.initialize();
            self.crash.initialize();
            tracing::debug!("telemetry backends initialized");
        });

        self.crash
            .set_collection_enabled(gates.is_enabled(Channel::Crash));
        self.analytics
            .set_analytics_collection_enabled(gates.is_enabled(Channel::Analytics));

        logging::log(
            debug_mode,
            LogLevel::Info,
            &format!(
                "Configured: analytics={}, crash_reporting={}, max_parameters={}, max_value_length={}",
                configuration.analytics_enabled,
                configuration.crash_reporting_enabled,
                configuration.max_parameters_per_event,
                configuration.max_parameter_value_length,
            ),
        );
    }

    /// Current configuration, `None` until [`configure`](Self::configure) runs
    pub fn configuration(&self) -> Option<Arc<AnalyticsConfiguration>> {
        self.state.lock().configuration.clone()
    }

    pub fn set_debug_mode(&self, enabled: bool) {
        self.state.lock().debug_mode = enabled;
    }

    pub fn is_debug_mode(&self) -> bool {
        self.state.lock().debug_mode
    }

    /// Sanitize `parameters` with the current limits and forward the event.
    ///
    /// Always forwards; whether the event is kept is up to the analytics
    /// backend's own collection flag.
    pub fn track(&self, event: &str, parameters: Option<&ParamMap>) {
        let (sanitized, debug_mode) = {
            let state = self.state.lock();
            (state.sanitizer().sanitize(parameters), state.debug_mode)
        };

        logging::log(debug_mode, LogLevel::Debug, &format!("Tracking event: {}", event));
        self.analytics.log_event(event, sanitized.as_ref());
    }

    /// Track a screen view. Caller parameters win over the screen keys, and
    /// the merged map is sanitized as a whole.
    pub fn track_screen(&self, screen_name: &str, parameters: Option<&ParamMap>) {
        let mut screen_parameters = ParamMap::new();
        screen_parameters.insert(SCREEN_NAME_PARAM.to_string(), screen_name.into());
        screen_parameters.insert(SCREEN_CLASS_PARAM.to_string(), screen_name.into());
        if let Some(parameters) = parameters {
            merge_into(&mut screen_parameters, parameters);
        }

        self.track(SCREEN_VIEW_EVENT, Some(&screen_parameters));
    }

    pub fn track_interaction(
        &self,
        interaction: &str,
        element: &str,
        screen: Option<&str>,
        parameters: Option<&ParamMap>,
    ) {
        let event_parameters = shaped_parameters(
            [("interaction_type", interaction), ("element", element)],
            screen,
            parameters,
        );
        self.track(USER_INTERACTION_EVENT, Some(&event_parameters));
    }

    pub fn track_selection(
        &self,
        selection: &str,
        value: &str,
        screen: Option<&str>,
        parameters: Option<&ParamMap>,
    ) {
        let event_parameters = shaped_parameters(
            [("selection_type", selection), ("selected_value", value)],
            screen,
            parameters,
        );
        self.track(USER_SELECTION_EVENT, Some(&event_parameters));
    }

    pub fn set_user_id(&self, user_id: &str) {
        self.state.lock().context.set_identity(user_id);
        self.analytics.set_user_id(user_id);
        self.crash.set_user_id(user_id);
    }

    pub fn set_user_property(&self, name: &str, value: Option<&str>) {
        self.analytics.set_user_property(name, value);
    }

    pub fn set_user_properties<'a, I>(&self, properties: I)
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for (name, value) in properties {
            self.set_user_property(name, Some(value));
        }
    }

    /// Merge `context` into the user context and mirror each entry to the
    /// crash backend as a custom value.
    pub fn set_user_context(&self, context: &ParamMap) {
        self.state.lock().context.merge(context);

        for (key, value) in context {
            let rendered = match value {
                ParamValue::String(s) => s.clone(),
                other => other.render(),
            };
            self.crash.set_custom_value(key, &rendered);
        }
    }

    /// Record a breadcrumb locally and send its log line to the crash
    /// backend. Both happen whatever the crash gate says.
    pub fn add_breadcrumb(&self, message: &str, data: Option<&ParamMap>) {
        let breadcrumb = self
            .state
            .lock()
            .breadcrumbs
            .append(message, data.cloned().unwrap_or_default());

        self.crash.log(&breadcrumb.log_line());
    }

    /// Forward `error` with the accumulated context and breadcrumb trail.
    ///
    /// Not forwarded while the crash gate is closed, and nothing is kept for
    /// later. The `Error recorded` debug line is logged either way.
    pub fn record_error(&self, error: &dyn Error, additional_data: Option<&ParamMap>) {
        let (context, debug_mode) = {
            let state = self.state.lock();
            if !state.gates.is_enabled(Channel::Crash) {
                logging::log(
                    state.debug_mode,
                    LogLevel::Error,
                    &format!("Error recorded: {}", error),
                );
                logging::log(
                    state.debug_mode,
                    LogLevel::Debug,
                    "Crash reporting disabled, error not forwarded",
                );
                return;
            }

            let mut context = match additional_data {
                Some(additional) => merge(&state.context.snapshot(), additional),
                None => state.context.snapshot(),
            };
            let trail: Vec<ParamValue> = state
                .breadcrumbs
                .descriptions()
                .into_iter()
                .map(ParamValue::String)
                .collect();
            context.insert(BREADCRUMBS_KEY.to_string(), ParamValue::List(trail));

            (context, state.debug_mode)
        };

        self.crash.record_error(error, &context);
        logging::log(debug_mode, LogLevel::Error, &format!("Error recorded: {}", error));
    }

    pub fn set_crash_reporting_enabled(&self, enabled: bool) {
        self.state.lock().gates.set(Channel::Crash, enabled);
        self.crash.set_collection_enabled(enabled);
    }

    pub fn set_analytics_collection_enabled(&self, enabled: bool) {
        self.state.lock().gates.set(Channel::Analytics, enabled);
        self.analytics.set_analytics_collection_enabled(enabled);
    }

    pub fn is_channel_enabled(&self, channel: Channel) -> bool {
        self.state.lock().gates.is_enabled(channel)
    }

    /// Breadcrumb trail, oldest first
    pub fn breadcrumbs(&self) -> Vec<Breadcrumb> {
        self.state.lock().breadcrumbs.snapshot()
    }

    pub fn user_context(&self) -> ParamMap {
        self.state.lock().context.snapshot()
    }
}

impl Default for TelemetryClient {
    /// A client whose backends discard everything
    fn default() -> Self {
        let backend = Arc::new(NoopBackend);
        Self::new(backend.clone(), backend)
    }
}

impl std::fmt::Debug for TelemetryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelemetryClient")
            .field("state", &*self.state.lock())
            .finish_non_exhaustive()
    }
}

/// Fixed keys, optional `screen`, then caller parameters on top
fn shaped_parameters<const N: usize>(
    fixed: [(&str, &str); N],
    screen: Option<&str>,
    parameters: Option<&ParamMap>,
) -> ParamMap {
    let mut event_parameters: ParamMap = fixed
        .into_iter()
        .map(|(k, v)| (k.to_string(), ParamValue::from(v)))
        .collect();

    if let Some(screen) = screen {
        event_parameters.insert("screen".to_string(), screen.into());
    }
    if let Some(parameters) = parameters {
        merge_into(&mut event_parameters, parameters);
    }

    event_parameters
}
