use std::collections::HashMap;

/// Project properties, set with `-P KEY[=VALUE]`
#[derive(Debug, Default, clap::Args, Clone)]
pub struct ProjectProperties {
    /// Property flags
    #[clap(short = 'P', long = "project-property")]
    #[clap(value_parser(try_parse_property))]
    #[clap(value_name = "KEY[=VALUE]")]
    properties: Vec<(String, Option<String>)>,
}

const MISSING_VALUE: &str = "";

impl ProjectProperties {
    /// All properties. When a key is given more than once, the last value wins.
    pub fn properties(&self) -> HashMap<String, Option<String>> {
        self.properties.clone().into_iter().collect()
    }

    /// Get a property. A property given without a value is the empty string.
    pub fn property<S: AsRef<str>>(&self, prop: S) -> Option<&str> {
        let prop = prop.as_ref();
        self.properties
            .iter()
            .rev()
            .find(|(key, _)| key == prop)
            .map(|(_, value)| value.as_deref().unwrap_or(MISSING_VALUE))
    }
}

impl<K: AsRef<str>> FromIterator<(K, Option<String>)> for ProjectProperties {
    fn from_iter<T: IntoIterator<Item = (K, Option<String>)>>(iter: T) -> Self {
        Self {
            properties: iter
                .into_iter()
                .map(|(key, value)| (key.as_ref().to_string(), value))
                .collect(),
        }
    }
}

fn try_parse_property(prop: &str) -> Result<(String, Option<String>), String> {
    match prop.split_once('=') {
        Some(("", _)) => Err(format!("property {:?} has no key", prop)),
        Some((key, value)) => Ok((key.to_string(), Some(value.to_string()))),
        None if prop.is_empty() => Err("empty property".to_string()),
        None => Ok((prop.to_string(), None)),
    }
}
