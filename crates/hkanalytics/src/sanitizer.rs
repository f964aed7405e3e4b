//! Event parameter sanitization
//!
//! Parameters are bounded before they leave the process: at most
//! `max_count` entries, and no value whose rendering is longer than
//! `max_length` characters. Oversized values are replaced by their truncated
//! rendering; the original typed value is not kept.

use crate::config::AnalyticsConfiguration;
use crate::params::{ParamMap, ParamValue};

/// Size limits applied to event parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterSanitizer {
    pub max_count: usize,
    pub max_length: usize,
}

impl ParameterSanitizer {
    pub fn new(max_count: usize, max_length: usize) -> Self {
        Self {
            max_count,
            max_length,
        }
    }

    /// Limits taken from a configuration
    pub fn from_configuration(config: &AnalyticsConfiguration) -> Self {
        Self::new(
            config.max_parameters_per_event,
            config.max_parameter_value_length,
        )
    }

    pub fn sanitize(&self, parameters: Option<&ParamMap>) -> Option<ParamMap> {
        sanitize_parameters(parameters, self.max_count, self.max_length)
    }
}

impl Default for ParameterSanitizer {
    fn default() -> Self {
        Self::from_configuration(&AnalyticsConfiguration::default())
    }
}

/// Sanitize a parameter map.
///
/// Returns `None` when the input is absent or nothing survives, so callers
/// can omit the field instead of sending an empty map. Which entries are
/// dropped when the map holds more than `max_count` follows map iteration
/// order and is not stable.
pub fn sanitize_parameters(
    parameters: Option<&ParamMap>,
    max_count: usize,
    max_length: usize,
) -> Option<ParamMap> {
    let parameters = parameters?;

    let sanitized: ParamMap = parameters
        .iter()
        .take(max_count)
        .map(|(key, value)| (key.clone(), sanitize_value(value, max_length)))
        .collect();

    if sanitized.is_empty() {
        None
    } else {
        Some(sanitized)
    }
}

/// Truncate a single value's rendering to `max_length` characters if needed.
pub fn sanitize_value(value: &ParamValue, max_length: usize) -> ParamValue {
    let rendered = value.render();
    if rendered.chars().count() > max_length {
        ParamValue::String(rendered.chars().take(max_length).collect())
    } else {
        value.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params;

    #[test]
    fn test_absent_input_is_absent() {
        assert_eq!(sanitize_parameters(None, 25, 100), None);
    }

    #[test]
    fn test_empty_input_is_absent() {
        let empty = ParamMap::new();
        assert_eq!(sanitize_parameters(Some(&empty), 25, 100), None);
    }

    #[test]
    fn test_zero_count_drops_everything() {
        let map = params! { "a" => 1 };
        assert_eq!(sanitize_parameters(Some(&map), 0, 100), None);
    }

    #[test]
    fn test_short_values_keep_their_type() {
        let map = params! { "item" => "sku1", "qty" => 3, "gift" => false };
        let sanitized = sanitize_parameters(Some(&map), 25, 100).unwrap();
        assert_eq!(sanitized, map);
    }

    #[test]
    fn test_long_value_truncated_to_exact_length() {
        let map = params! { "item" => "sku1", "price" => 9.999999 };
        let sanitized = sanitize_parameters(Some(&map), 25, 5).unwrap();

        assert_eq!(sanitized["item"], ParamValue::from("sku1"));
        assert_eq!(sanitized["price"], ParamValue::from("9.999"));
    }

    #[test]
    fn test_value_at_limit_untouched() {
        let map = params! { "v" => "abcde" };
        let sanitized = sanitize_parameters(Some(&map), 25, 5).unwrap();
        assert_eq!(sanitized["v"], ParamValue::from("abcde"));
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let map = params! { "v" => "ééééé" };
        let sanitized = sanitize_parameters(Some(&map), 25, 3).unwrap();
        assert_eq!(sanitized["v"], ParamValue::from("ééé"));
    }

    #[test]
    fn test_nested_value_becomes_truncated_string() {
        let map = params! { "tags" => vec!["alpha", "beta", "gamma"] };
        let sanitized = sanitize_parameters(Some(&map), 25, 8).unwrap();
        assert_eq!(sanitized["tags"], ParamValue::from("[alpha, "));
    }

    #[test]
    fn test_count_limit_enforced() {
        let map: ParamMap = (0..40)
            .map(|i| (format!("k{}", i), ParamValue::from(i)))
            .collect();
        let sanitized = sanitize_parameters(Some(&map), 25, 100).unwrap();
        assert_eq!(sanitized.len(), 25);
        for key in sanitized.keys() {
            assert!(map.contains_key(key));
        }
    }

    #[test]
    fn test_sanitizer_from_configuration() {
        let config = AnalyticsConfiguration {
            max_parameters_per_event: 2,
            max_parameter_value_length: 3,
            ..AnalyticsConfiguration::default()
        };
        let sanitizer = ParameterSanitizer::from_configuration(&config);
        assert_eq!(sanitizer, ParameterSanitizer::new(2, 3));

        let map = params! { "a" => "abcdef" };
        let sanitized = sanitizer.sanitize(Some(&map)).unwrap();
        assert_eq!(sanitized["a"], ParamValue::from("abc"));
    }
}
