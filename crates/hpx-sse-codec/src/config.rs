//! Codec configuration.

use bytes_utils::Str;

use crate::constants::{DEFAULT_WRITE_BUFFER_CAPACITY, MESSAGE_STR};

/// Configuration shared by [`Encoder`](crate::Encoder) and
/// [`Decoder`](crate::Decoder).
///
/// The defaults reproduce the plain SSE behaviour, so most callers never need
/// to build one and can use [`encode`](crate::encode) /
/// [`decode`](crate::decode) directly.
#[derive(Clone, Debug)]
pub struct CodecConfig {
    /// Event type given to decoded events that carry no `event` field.
    pub default_event_type: Str,
    /// Upper bound on the number of bytes drained from a decode source
    /// (None = unbounded).
    pub max_input_size: Option<usize>,
    /// Capacity of the encoder's buffered writer.
    pub write_buffer_capacity: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            default_event_type: MESSAGE_STR,
            max_input_size: None,
            write_buffer_capacity: DEFAULT_WRITE_BUFFER_CAPACITY,
        }
    }
}

impl CodecConfig {
    /// Create a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the event type applied to events without an `event` field.
    #[must_use]
    pub fn default_event_type(mut self, event_type: impl Into<Str>) -> Self {
        self.default_event_type = event_type.into();
        self
    }

    /// Set the maximum decode input size in bytes.
    #[must_use]
    pub fn max_input_size(mut self, limit: Option<usize>) -> Self {
        self.max_input_size = limit;
        self
    }

    /// Set the encoder's write buffer capacity.
    #[must_use]
    pub fn write_buffer_capacity(mut self, capacity: usize) -> Self {
        self.write_buffer_capacity = capacity;
        self
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error message string if any field has an invalid value.
    pub fn validate(&self) -> Result<(), String> {
        if self.default_event_type.is_empty() {
            return Err("Default event type cannot be empty".to_string());
        }
        if self.max_input_size == Some(0) {
            return Err("Max input size must be > 0".to_string());
        }
        if self.write_buffer_capacity == 0 {
            return Err("Write buffer capacity must be > 0".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CodecConfig::default();
        assert_eq!(&*config.default_event_type, "message");
        assert!(config.max_input_size.is_none());
        assert_eq!(config.write_buffer_capacity, 4096);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = CodecConfig::new()
            .default_event_type("update")
            .max_input_size(Some(1024))
            .write_buffer_capacity(64);

        assert_eq!(&*config.default_event_type, "update");
        assert_eq!(config.max_input_size, Some(1024));
        assert_eq!(config.write_buffer_capacity, 64);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_empty_event_type() {
        let config = CodecConfig::new().default_event_type("");
        assert_eq!(
            config.validate().expect_err("should fail"),
            "Default event type cannot be empty"
        );
    }

    #[test]
    fn test_validation_zero_input_limit() {
        let config = CodecConfig::new().max_input_size(Some(0));
        assert_eq!(
            config.validate().expect_err("should fail"),
            "Max input size must be > 0"
        );
    }

    #[test]
    fn test_validation_zero_buffer() {
        let config = CodecConfig::new().write_buffer_capacity(0);
        assert_eq!(
            config.validate().expect_err("should fail"),
            "Write buffer capacity must be > 0"
        );
    }

    #[test]
    fn test_validation_boundary_values() {
        let config = CodecConfig::new()
            .max_input_size(Some(1))
            .write_buffer_capacity(1);
        assert!(config.validate().is_ok());
    }
}
