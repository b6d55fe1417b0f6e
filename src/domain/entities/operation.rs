use crate::application::errors::ExtensionError;

/// A lifecycle operation an operator can request on an extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Load,
    Unload,
    Reload,
}

impl OpKind {
    /// Parse the slash-command choice value.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "load" => Some(OpKind::Load),
            "unload" => Some(OpKind::Unload),
            "reload" => Some(OpKind::Reload),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OpKind::Load => "load",
            OpKind::Unload => "unload",
            OpKind::Reload => "reload",
        }
    }

    /// Present-participle form used in progress messages ("loading x...").
    pub fn gerund(&self) -> &'static str {
        match self {
            OpKind::Load => "Loading",
            OpKind::Unload => "Unloading",
            OpKind::Reload => "Reloading",
        }
    }

    /// Capitalized verb used in prompt titles ("Load in progress").
    pub fn verb(&self) -> &'static str {
        match self {
            OpKind::Load => "Load",
            OpKind::Unload => "Unload",
            OpKind::Reload => "Reload",
        }
    }
}

impl std::fmt::Display for OpKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The typed result of one lifecycle operation, rendered to a user-facing
/// message and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Succeeded,
    AlreadyActive,
    NotFound,
    NotActive,
    NoEntryPoint,
    SetupFailed(String),
    Unexpected(String),
}

impl From<ExtensionError> for Outcome {
    fn from(err: ExtensionError) -> Self {
        match err {
            ExtensionError::AlreadyLoaded => Outcome::AlreadyActive,
            ExtensionError::NotLoaded => Outcome::NotActive,
            ExtensionError::NotFound => Outcome::NotFound,
            ExtensionError::NoEntryPoint => Outcome::NoEntryPoint,
            ExtensionError::Setup(detail) => Outcome::SetupFailed(detail),
            ExtensionError::Internal(detail) => Outcome::Unexpected(detail),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_actions() {
        assert_eq!(OpKind::parse("load"), Some(OpKind::Load));
        assert_eq!(OpKind::parse("unload"), Some(OpKind::Unload));
        assert_eq!(OpKind::parse("reload"), Some(OpKind::Reload));
        assert_eq!(OpKind::parse("restart"), None);
    }

    #[test]
    fn every_error_kind_maps_to_an_outcome() {
        let cases = [
            (ExtensionError::AlreadyLoaded, Outcome::AlreadyActive),
            (ExtensionError::NotLoaded, Outcome::NotActive),
            (ExtensionError::NotFound, Outcome::NotFound),
            (ExtensionError::NoEntryPoint, Outcome::NoEntryPoint),
            (
                ExtensionError::Setup("boom".into()),
                Outcome::SetupFailed("boom".into()),
            ),
            (
                ExtensionError::Internal("odd".into()),
                Outcome::Unexpected("odd".into()),
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(Outcome::from(err), expected);
        }
    }
}
