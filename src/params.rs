use std::collections::BTreeMap;

use crate::{Result, ScraperError};

/// String-to-string mapping used for query parameters and headers.
///
/// Keys are case-sensitive. [`Params::merge`] is last-write-wins.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Params(BTreeMap<String, String>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites one entry.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Applies every entry of `overrides` on top of `self`.
    pub fn merge(&mut self, overrides: &Params) {
        for (key, value) in &overrides.0 {
            self.0.insert(key.clone(), value.clone());
        }
    }

    /// Returns a copy of `self` with `overrides` merged in.
    pub fn merged(&self, overrides: &Params) -> Params {
        let mut merged = self.clone();
        merged.merge(overrides);
        merged
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for Params
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

impl From<()> for Params {
    fn from(_: ()) -> Self {
        Self::default()
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for Params
where
    K: Into<String>,
    V: Into<String>,
{
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl From<Vec<(String, String)>> for Params {
    fn from(pairs: Vec<(String, String)>) -> Self {
        pairs.into_iter().collect()
    }
}

impl From<BTreeMap<String, String>> for Params {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

/// Device profile the remote service emulates.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DeviceType {
    Desktop,
    Mobile,
}

impl DeviceType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Desktop => "desktop",
            Self::Mobile => "mobile",
        }
    }
}

/// Typed builder for the scrape options the service recognizes.
///
/// Anything outside the recognized set goes through [`ScrapeParams::param`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScrapeParams {
    pub country_code: Option<String>,
    pub render: Option<bool>,
    pub premium: Option<bool>,
    pub session_number: Option<u64>,
    pub keep_headers: Option<bool>,
    pub device_type: Option<DeviceType>,
    pub autoparse: Option<bool>,
    extra: Params,
}

impl ScrapeParams {
    /// The recognized parameter names, in wire form.
    pub const KEYS: [&'static str; 7] = [
        "country_code",
        "render",
        "premium",
        "session_number",
        "keep_headers",
        "device_type",
        "autoparse",
    ];

    pub fn new() -> Self {
        Self::default()
    }

    pub fn country_code(mut self, value: impl Into<String>) -> Self {
        self.country_code = Some(value.into());
        self
    }

    pub fn render(mut self, value: bool) -> Self {
        self.render = Some(value);
        self
    }

    pub fn premium(mut self, value: bool) -> Self {
        self.premium = Some(value);
        self
    }

    pub fn session_number(mut self, value: u64) -> Self {
        self.session_number = Some(value);
        self
    }

    pub fn keep_headers(mut self, value: bool) -> Self {
        self.keep_headers = Some(value);
        self
    }

    pub fn device_type(mut self, value: DeviceType) -> Self {
        self.device_type = Some(value);
        self
    }

    pub fn autoparse(mut self, value: bool) -> Self {
        self.autoparse = Some(value);
        self
    }

    /// Sets any raw parameter, bypassing the recognized set.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key, value);
        self
    }

    /// Sets a recognized parameter by name.
    ///
    /// Accepts the wire name (`country_code`) or its camelCase form
    /// (`countryCode`). Unknown names and unparsable values fail with
    /// [`ScraperError::Configuration`].
    pub fn set(self, name: &str, value: &str) -> Result<Self> {
        let key = normalize_key(name);
        match key.as_str() {
            "country_code" => Ok(self.country_code(value)),
            "render" => Ok(self.render(parse_bool(&key, value)?)),
            "premium" => Ok(self.premium(parse_bool(&key, value)?)),
            "session_number" => {
                let number = value.trim().parse::<u64>().map_err(|_| {
                    ScraperError::Configuration(format!(
                        "session_number must be an unsigned integer, got '{value}'"
                    ))
                })?;
                Ok(self.session_number(number))
            }
            "keep_headers" => Ok(self.keep_headers(parse_bool(&key, value)?)),
            "device_type" => match value.trim().to_ascii_lowercase().as_str() {
                "desktop" => Ok(self.device_type(DeviceType::Desktop)),
                "mobile" => Ok(self.device_type(DeviceType::Mobile)),
                other => Err(ScraperError::Configuration(format!(
                    "device_type must be 'desktop' or 'mobile', got '{other}'"
                ))),
            },
            "autoparse" => Ok(self.autoparse(parse_bool(&key, value)?)),
            _ => Err(ScraperError::Configuration(format!(
                "unknown scrape parameter '{name}'"
            ))),
        }
    }
}

impl From<ScrapeParams> for Params {
    fn from(params: ScrapeParams) -> Self {
        let mut out = Params::new();
        if let Some(value) = params.country_code {
            out.insert("country_code", value);
        }
        if let Some(value) = params.render {
            out.insert("render", value.to_string());
        }
        if let Some(value) = params.premium {
            out.insert("premium", value.to_string());
        }
        if let Some(value) = params.session_number {
            out.insert("session_number", value.to_string());
        }
        if let Some(value) = params.keep_headers {
            out.insert("keep_headers", value.to_string());
        }
        if let Some(value) = params.device_type {
            out.insert("device_type", value.as_str());
        }
        if let Some(value) = params.autoparse {
            out.insert("autoparse", value.to_string());
        }
        out.merge(&params.extra);
        out
    }
}

fn normalize_key(name: &str) -> String {
    let mut key = String::with_capacity(name.len() + 4);
    for ch in name.trim().chars() {
        if ch.is_ascii_uppercase() {
            if !key.is_empty() {
                key.push('_');
            }
            key.push(ch.to_ascii_lowercase());
        } else {
            key.push(ch);
        }
    }
    key
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(ScraperError::Configuration(format!(
            "{key} must be a boolean, got '{value}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use crate::{DeviceType, Params, ScrapeParams, ScraperError};

    #[test]
    fn merge_is_override_wins() {
        let defaults = Params::from([("a", "1"), ("b", "2")]);
        let overrides = Params::from([("b", "3"), ("c", "4")]);
        let merged = defaults.merged(&overrides);
        assert_eq!(merged, Params::from([("a", "1"), ("b", "3"), ("c", "4")]));
        assert_eq!(merged.merged(&overrides), merged);
    }

    #[test]
    fn keys_are_case_sensitive() {
        let merged = Params::from([("Key", "1")]).merged(&Params::from([("key", "2")]));
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn scrape_params_render_recognized_keys() {
        let params: Params = ScrapeParams::new()
            .country_code("us")
            .render(true)
            .session_number(42)
            .device_type(DeviceType::Mobile)
            .param("wait_for_selector", "#main")
            .into();
        assert_eq!(params.get("country_code"), Some("us"));
        assert_eq!(params.get("render"), Some("true"));
        assert_eq!(params.get("session_number"), Some("42"));
        assert_eq!(params.get("device_type"), Some("mobile"));
        assert_eq!(params.get("wait_for_selector"), Some("#main"));
        assert!(!params.contains_key("premium"));
    }

    #[test]
    fn set_accepts_snake_and_camel_case() {
        let params = ScrapeParams::new()
            .set("countryCode", "de")
            .and_then(|p| p.set("keep_headers", "true"))
            .and_then(|p| p.set("deviceType", "Desktop"))
            .expect("recognized names must be accepted");
        assert_eq!(params.country_code.as_deref(), Some("de"));
        assert_eq!(params.keep_headers, Some(true));
        assert_eq!(params.device_type, Some(DeviceType::Desktop));
    }

    #[test]
    fn set_rejects_unknown_names_and_bad_values() {
        assert!(matches!(
            ScrapeParams::new().set("proxyPool", "x"),
            Err(ScraperError::Configuration(_))
        ));
        assert!(matches!(
            ScrapeParams::new().set("render", "maybe"),
            Err(ScraperError::Configuration(_))
        ));
        assert!(ScrapeParams::new().set("session_number", "-1").is_err());
    }

    #[test]
    fn recognized_key_list_matches_setters() {
        for key in ScrapeParams::KEYS {
            let value = match key {
                "country_code" => "us",
                "session_number" => "7",
                "device_type" => "mobile",
                _ => "true",
            };
            let params: Params = ScrapeParams::new()
                .set(key, value)
                .expect("every listed key must be settable")
                .into();
            assert_eq!(params.get(key), Some(value));
        }
    }
}
