//! Environment override for the layout decision.

use blobstate_store::EnvLookup;
use serde::{Deserialize, Serialize};

/// Forces the legacy layout when set to `1` or `true`.
pub const LEGACY_LAYOUT_ENV_VAR: &str = "BLOBSTATE_LEGACY_LAYOUT";

/// Silences the legacy-layout warning when set to `1` or `true`.
pub const NO_LEGACY_WARNING_ENV_VAR: &str = "BLOBSTATE_NO_LEGACY_WARNING";

/// An outside request to use a particular layout.
///
/// The environment can only ever yield [`Unset`](LayoutSignal::Unset) or
/// [`ForceLegacy`](LayoutSignal::ForceLegacy). [`ForceVersioned`](LayoutSignal::ForceVersioned)
/// comes from explicit configuration only.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayoutSignal {
    #[default]
    #[serde(rename = "auto")]
    Unset,
    #[serde(rename = "legacy")]
    ForceLegacy,
    #[serde(rename = "versioned")]
    ForceVersioned,
}

impl LayoutSignal {
    /// Read [`LEGACY_LAYOUT_ENV_VAR`] from `env`.
    pub fn from_env<E: EnvLookup + ?Sized>(env: &E) -> Self {
        Self::from_value(env.get(LEGACY_LAYOUT_ENV_VAR).as_deref())
    }

    /// Interpret a raw variable value. Only the exact literals `1` and `true`
    /// force legacy; `false`, other spellings and absence mean no override.
    pub fn from_value(value: Option<&str>) -> Self {
        match value {
            Some(v) if is_truthy(v) => LayoutSignal::ForceLegacy,
            _ => LayoutSignal::Unset,
        }
    }

    pub fn is_set(self) -> bool {
        self != LayoutSignal::Unset
    }
}

/// Whether the legacy-layout warning has been silenced.
pub fn legacy_warning_suppressed<E: EnvLookup + ?Sized>(env: &E) -> bool {
    env.get(NO_LEGACY_WARNING_ENV_VAR)
        .as_deref()
        .is_some_and(is_truthy)
}

fn is_truthy(value: &str) -> bool {
    matches!(value, "1" | "true")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(value: &str) -> HashMap<String, String> {
        HashMap::from([(LEGACY_LAYOUT_ENV_VAR.to_string(), value.to_string())])
    }

    #[test]
    fn one_and_true_force_legacy() {
        assert_eq!(LayoutSignal::from_env(&env("1")), LayoutSignal::ForceLegacy);
        assert_eq!(LayoutSignal::from_env(&env("true")), LayoutSignal::ForceLegacy);
    }

    #[test]
    fn false_and_unset_mean_no_override() {
        assert_eq!(LayoutSignal::from_env(&env("false")), LayoutSignal::Unset);
        assert_eq!(
            LayoutSignal::from_env(&HashMap::<String, String>::new()),
            LayoutSignal::Unset
        );
    }

    #[test]
    fn other_spellings_are_ignored() {
        for value in ["TRUE", "True", "yes", "0", "2", " 1", ""] {
            assert_eq!(
                LayoutSignal::from_value(Some(value)),
                LayoutSignal::Unset,
                "{value:?}"
            );
        }
    }

    #[test]
    fn warning_suppression() {
        let mut vars = HashMap::new();
        assert!(!legacy_warning_suppressed(&vars));
        vars.insert(NO_LEGACY_WARNING_ENV_VAR.to_string(), "true".to_string());
        assert!(legacy_warning_suppressed(&vars));
    }
}
