//! ValidationService: decides whether `data` conforms to `schema`. The dispatcher only consumes it.

/// External validation capability. Implementations own their failures: the
/// dispatcher treats the verdict as infallible and never retries.
pub trait ValidationService: Send + Sync {
    fn validate(&self, data: &str, schema: &str) -> bool;
}

impl<F> ValidationService for F
where
    F: Fn(&str, &str) -> bool + Send + Sync,
{
    fn validate(&self, data: &str, schema: &str) -> bool {
        self(data, schema)
    }
}
