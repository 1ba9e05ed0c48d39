use std::fmt;

/// A setting that could not be read into [`Config`](crate::Config).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvalidSetting {
    /// Dotted key of the setting, empty if the failure is not tied to one.
    pub key: String,
    /// The source that supplied the bad value, e.g. `TOML file wrap.toml`.
    pub origin: Option<String>,
    pub message: String,
}

impl InvalidSetting {
    fn from_figment(err: &figment::Error) -> Self {
        let origin = err.metadata.as_ref().map(|meta| match &meta.source {
            Some(source) => format!("{} {source}", meta.name),
            None => meta.name.to_string(),
        });
        Self { key: err.path.join("."), origin, message: err.kind.to_string() }
    }
}

impl fmt::Display for InvalidSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.key.is_empty() {
            write!(f, "`{}`: ", self.key)?;
        }
        f.write_str(&self.message)?;
        if let Some(origin) = &self.origin {
            write!(f, " (from {origin})")?;
        }
        Ok(())
    }
}

/// Loading the config failed; lists every distinct bad setting.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[error("invalid wrap config: {}", join(.settings))]
pub struct ExtractConfigError {
    settings: Vec<InvalidSetting>,
    #[source]
    error: figment::Error,
}

impl ExtractConfigError {
    pub fn new(error: figment::Error) -> Self {
        let mut settings: Vec<InvalidSetting> = Vec::new();
        for err in error.clone() {
            let setting = InvalidSetting::from_figment(&err);
            if !settings.contains(&setting) {
                settings.push(setting);
            }
        }
        Self { settings, error }
    }

    pub fn settings(&self) -> &[InvalidSetting] {
        &self.settings
    }
}

fn join(settings: &[InvalidSetting]) -> String {
    settings.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}
