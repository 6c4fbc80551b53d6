//! Three-way switch used by optional middleware settings

use serde::{Deserialize, Deserializer};

/// A feature that may be turned off, left on with defaults, or given an
/// explicit policy
///
/// Deserializes from `false`, `true` or a policy object.
#[derive(Debug, Clone, PartialEq)]
pub enum Toggle<T> {
    Disabled,
    Default,
    Custom(T),
}

impl<T> Default for Toggle<T> {
    fn default() -> Self {
        Toggle::Default
    }
}

impl<T: Clone + Default> Toggle<T> {
    /// The effective policy, or `None` when disabled
    pub fn resolve(&self) -> Option<T> {
        match self {
            Toggle::Disabled => None,
            Toggle::Default => Some(T::default()),
            Toggle::Custom(policy) => Some(policy.clone()),
        }
    }
}

impl<T> Toggle<T> {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Toggle::Disabled)
    }
}

impl<T> From<bool> for Toggle<T> {
    fn from(enabled: bool) -> Self {
        if enabled {
            Toggle::Default
        } else {
            Toggle::Disabled
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawToggle<T> {
    Flag(bool),
    Custom(T),
}

impl<'de, T> Deserialize<'de> for Toggle<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match RawToggle::deserialize(deserializer)? {
            RawToggle::Flag(flag) => flag.into(),
            RawToggle::Custom(policy) => Toggle::Custom(policy),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, Default, PartialEq, Deserialize)]
    struct Limit {
        #[serde(default)]
        max: u32,
    }

    #[test]
    fn test_toggle_from_bool() {
        assert_eq!(serde_json::from_str::<Toggle<Limit>>("false").unwrap(), Toggle::Disabled);
        assert_eq!(serde_json::from_str::<Toggle<Limit>>("true").unwrap(), Toggle::Default);
    }

    #[test]
    fn test_toggle_from_policy() {
        let toggle: Toggle<Limit> = serde_json::from_str(r#"{"max": 3}"#).unwrap();
        assert_eq!(toggle, Toggle::Custom(Limit { max: 3 }));
        assert_eq!(toggle.resolve(), Some(Limit { max: 3 }));
    }

    #[test]
    fn test_toggle_resolve() {
        assert_eq!(Toggle::<Limit>::Disabled.resolve(), None);
        assert_eq!(Toggle::<Limit>::Default.resolve(), Some(Limit::default()));
        assert!(!Toggle::<Limit>::Disabled.is_enabled());
    }
}
