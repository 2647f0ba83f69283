use anyhow::{bail, Context};
use serde::{de, ser::SerializeSeq, Deserialize, Serialize};
use std::{ops::AddAssign, str::FromStr};
use tracing_subscriber::{filter::Directive, EnvFilter};

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Filter directives, such as `INFO` or `apigeo_widget=DEBUG`, applied in
    /// order. `APIGEO_LOGGING__LEVELS` replaces the configured list.
    ///
    /// ```yaml
    /// logging:
    ///   levels:
    ///     - INFO
    ///     - apigeo_search=DEBUG
    ///     - reqwest=WARN
    /// ```
    pub levels: DirectiveWrapper,

    /// The format to output logs in.
    pub format: LogFormat,
}

/// Output format of log events.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Multi-line, colored output for reading at a terminal.
    Pretty,

    /// One JSON object per event.
    Json,

    /// One line per event.
    Compact,
}

/// A list of `EnvFilter` directives kept as strings, since `Directive` can
/// neither be cloned nor serialized.
///
/// Deserializes from `"INFO,apigeo_search=DEBUG"` as well as from
/// `["INFO", "apigeo_search=DEBUG"]`; environment variables only give the
/// former. Every entry parses as a `Directive`.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectiveWrapper(Vec<String>);

impl DirectiveWrapper {
    /// The directives, in the order they will be applied.
    pub fn directives(&self) -> &[String] {
        &self.0
    }

    /// These directives followed by the ones from `rust_log`, usually the
    /// value of `RUST_LOG`. Later directives win.
    ///
    /// # Errors
    /// If `rust_log` holds an invalid directive.
    pub fn with_rust_log(&self, rust_log: Option<&str>) -> anyhow::Result<Self> {
        let mut merged = self.clone();
        if let Some(rust_log) = rust_log {
            merged += rust_log
                .parse::<Self>()
                .context("RUST_LOG holds invalid directives")?;
        }
        Ok(merged)
    }
}

impl Serialize for DirectiveWrapper {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for directive in &self.0 {
            seq.serialize_element(&directive)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for DirectiveWrapper {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        /// Accepts a single string or a list of strings.
        struct Visitor;

        impl<'de> de::Visitor<'de> for Visitor {
            type Value = DirectiveWrapper;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(formatter, "directive or list of directives")
            }

            fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                s.parse().map_err(|_err| {
                    de::Error::invalid_value(de::Unexpected::Str(s), &"valid directive")
                })
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: de::SeqAccess<'de>,
            {
                let mut rv = DirectiveWrapper(vec![]);

                while let Some(item) = seq.next_element::<String>()? {
                    let parsed: DirectiveWrapper = item.parse().map_err(|err: anyhow::Error| {
                        de::Error::invalid_value(
                            de::Unexpected::Str(&item),
                            &err.to_string().as_str(),
                        )
                    })?;
                    rv += parsed;
                }

                Ok(rv)
            }
        }

        deserializer.deserialize_any(Visitor)
    }
}

impl FromStr for DirectiveWrapper {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<String> = s
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(ToString::to_string)
            .collect();

        if let Some(err) = parts.iter().find_map(|p| p.parse::<Directive>().err()) {
            return Err(err).context("valid syntax");
        }

        // crate names show up with underscores in targets
        if parts.iter().any(|p| p.contains('-')) {
            bail!("log targets must not include hyphens");
        }

        Ok(Self(parts))
    }
}

impl AddAssign for DirectiveWrapper {
    fn add_assign(&mut self, rhs: Self) {
        self.0.extend(rhs.0)
    }
}

impl From<&DirectiveWrapper> for EnvFilter {
    fn from(val: &DirectiveWrapper) -> Self {
        val.0
            .iter()
            .filter_map(|directive| directive.parse::<Directive>().ok())
            .fold(EnvFilter::default(), EnvFilter::add_directive)
    }
}

#[cfg(test)]
mod tests {
    use super::{DirectiveWrapper, LogFormat, LoggingSettings};
    use parameterized::parameterized;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[parameterized(input = {
        "INFO",
        "INFO,apigeo_widget=DEBUG",
        "WARN, apigeo_search=TRACE",
    })]
    fn valid_directives_parse(input: &str) {
        assert!(input.parse::<DirectiveWrapper>().is_ok());
    }

    #[parameterized(input = {
        "apigeo-widget=DEBUG",
        "apigeo_widget=LOUD",
    })]
    fn invalid_directives_are_rejected(input: &str) {
        assert!(input.parse::<DirectiveWrapper>().is_err());
    }

    #[test]
    fn directives_add_up() {
        let mut directives: DirectiveWrapper = "INFO".parse().expect("valid directive");
        directives += "apigeo_widget=DEBUG".parse().expect("valid directive");
        assert_eq!(
            directives.directives(),
            &["INFO".to_string(), "apigeo_widget=DEBUG".to_string()]
        );
    }

    #[test]
    fn rust_log_goes_last() {
        let configured: DirectiveWrapper = "INFO,reqwest=WARN".parse().expect("valid directive");

        let merged = configured
            .with_rust_log(Some("reqwest=TRACE"))
            .expect("valid RUST_LOG");
        assert_eq!(
            merged.directives(),
            &[
                "INFO".to_string(),
                "reqwest=WARN".to_string(),
                "reqwest=TRACE".to_string()
            ]
        );

        let untouched = configured.with_rust_log(None).expect("no RUST_LOG");
        assert_eq!(untouched, configured);

        assert!(configured.with_rust_log(Some("apigeo-search=DEBUG")).is_err());
    }

    #[test]
    fn logging_settings_from_list_or_string() {
        let from_list: LoggingSettings = serde_json::from_value(json!({
            "levels": ["INFO", "apigeo_search=DEBUG"],
            "format": "compact",
        }))
        .expect("valid settings");
        let from_string: LoggingSettings = serde_json::from_value(json!({
            "levels": "INFO,apigeo_search=DEBUG",
            "format": "json",
        }))
        .expect("valid settings");

        assert_eq!(from_list.levels, from_string.levels);
        assert!(matches!(from_list.format, LogFormat::Compact));
        assert!(matches!(from_string.format, LogFormat::Json));
    }
}
