//! Serializer configuration and per-call POST options.
//!
//! # Design
//! `SerializerOptions` is a small `Copy` value. The default instance is a
//! `const`, so there is nothing to initialise at startup and nothing to lock:
//! callers pass it (or an override) explicitly, and `JsonApiClient`
//! implementations return theirs from `serializer_options()`.
//!
//! The default omits null fields. That is a legacy wire convention kept for
//! servers that expect it, not something the codec needs; set
//! `ignore_null_values` to `false` to send explicit nulls.

/// How Rust field names map to JSON property names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NamingPolicy {
    /// `display_name` is written as `displayName` and read back the same way.
    #[default]
    CamelCase,
    /// Keys are written exactly as serde produces them.
    Preserve,
}

/// Settings applied by [`crate::json`] when encoding and decoding bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerializerOptions {
    pub naming_policy: NamingPolicy,
    pub ignore_null_values: bool,
}

impl SerializerOptions {
    /// Camel-case property names, null-valued properties omitted.
    pub const DEFAULT: SerializerOptions = SerializerOptions {
        naming_policy: NamingPolicy::CamelCase,
        ignore_null_values: true,
    };

    /// Fresh copy of [`SerializerOptions::DEFAULT`] for callers that want to
    /// tweak one field.
    pub const fn create_default() -> Self {
        Self::DEFAULT
    }

    pub const fn with_naming_policy(mut self, naming_policy: NamingPolicy) -> Self {
        self.naming_policy = naming_policy;
        self
    }

    pub const fn with_ignore_null_values(mut self, ignore_null_values: bool) -> Self {
        self.ignore_null_values = ignore_null_values;
        self
    }
}

impl Default for SerializerOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Optional parameters shared by every JSON POST helper.
///
/// Defaults: no charset on the content type, [`SerializerOptions::DEFAULT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PostJsonOptions {
    pub include_charset: bool,
    pub serializer: SerializerOptions,
}

impl PostJsonOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_charset(mut self, include_charset: bool) -> Self {
        self.include_charset = include_charset;
        self
    }

    pub fn with_serializer(mut self, serializer: SerializerOptions) -> Self {
        self.serializer = serializer;
        self
    }

    pub fn content_type(&self) -> &'static str {
        crate::http::json_content_type(self.include_charset)
    }
}

impl From<SerializerOptions> for PostJsonOptions {
    fn from(serializer: SerializerOptions) -> Self {
        Self::default().with_serializer(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_camel_case_without_nulls() {
        let options = SerializerOptions::default();
        assert_eq!(options.naming_policy, NamingPolicy::CamelCase);
        assert!(options.ignore_null_values);
        assert_eq!(options, SerializerOptions::create_default());
    }

    #[test]
    fn post_options_default_to_plain_json() {
        let options = PostJsonOptions::new();
        assert!(!options.include_charset);
        assert_eq!(options.serializer, SerializerOptions::DEFAULT);
        assert_eq!(options.content_type(), "application/json");
        assert_eq!(
            options.with_charset(true).content_type(),
            "application/json; charset=utf-8"
        );
    }

    #[test]
    fn builders_override_single_fields() {
        let serializer = SerializerOptions::create_default()
            .with_naming_policy(NamingPolicy::Preserve)
            .with_ignore_null_values(false);
        let options: PostJsonOptions = serializer.into();
        assert_eq!(options.serializer.naming_policy, NamingPolicy::Preserve);
        assert!(!options.serializer.ignore_null_values);
        assert!(!options.include_charset);
    }
}
