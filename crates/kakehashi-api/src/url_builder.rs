use url::form_urlencoded;

/// Builds a request URL from a base and an ordered list of query parameters.
///
/// Parameters appear in the query string in insertion order; keys and values
/// are percent-encoded.
#[derive(Debug, Clone, Default)]
pub struct UrlBuilder {
    base: String,
    params: Vec<(String, String)>,
}

impl UrlBuilder {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            params: Vec::new(),
        }
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// The final URL: the base unchanged when no parameters were added,
    /// otherwise `base?k1=v1&k2=v2...`.
    pub fn build(&self) -> String {
        if self.params.is_empty() {
            return self.base.clone();
        }

        let mut query = form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.params {
            query.append_pair(key, value);
        }
        format!("{}?{}", self.base, query.finish())
    }
}
