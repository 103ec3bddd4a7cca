use serde::{Deserialize, Deserializer};

/// A boolean that remembers whether it was set at all.
///
/// Absent and `null` values decode to `Undefined`, so the driver can fall back
/// to its own default instead of an explicit `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OptBool {
    #[default]
    Undefined,
    True,
    False,
}

impl OptBool {
    pub fn is_defined(&self) -> bool {
        !matches!(self, Self::Undefined)
    }

    pub fn unwrap_or(self, default: bool) -> bool {
        match self {
            Self::Undefined => default,
            Self::True => true,
            Self::False => false,
        }
    }
}

impl From<bool> for OptBool {
    fn from(value: bool) -> Self {
        if value { Self::True } else { Self::False }
    }
}

impl From<Option<bool>> for OptBool {
    fn from(value: Option<bool>) -> Self {
        value.map_or(Self::Undefined, Self::from)
    }
}

impl<'de> Deserialize<'de> for OptBool {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<bool>::deserialize(deserializer).map(Self::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Wrapper {
        #[serde(default, rename = "OptBool")]
        opt_bool: OptBool,
    }

    #[test]
    fn decodes_json() {
        let w: Wrapper = serde_json::from_str(r#"{"OptBool": true}"#).unwrap();
        assert_eq!(w.opt_bool, OptBool::True);

        let w: Wrapper = serde_json::from_str(r#"{"OptBool": false}"#).unwrap();
        assert_eq!(w.opt_bool, OptBool::False);

        let w: Wrapper = serde_json::from_str("{}").unwrap();
        assert!(!w.opt_bool.is_defined());

        let w: Wrapper = serde_json::from_str(r#"{"OptBool": null}"#).unwrap();
        assert_eq!(w.opt_bool, OptBool::Undefined);

        assert!(serde_json::from_str::<Wrapper>(r#"{"OptBool": "notaboolean"}"#).is_err());
    }

    #[test]
    fn decodes_yaml() {
        let w: Wrapper = serde_yml::from_str("OptBool: true").unwrap();
        assert_eq!(w.opt_bool, OptBool::True);

        let w: Wrapper = serde_yml::from_str("OptBool: false").unwrap();
        assert_eq!(w.opt_bool, OptBool::False);

        let w: Wrapper = serde_yml::from_str("{}").unwrap();
        assert!(!w.opt_bool.is_defined());

        assert!(serde_yml::from_str::<Wrapper>("OptBool: notaboolean").is_err());
    }

    #[test]
    fn decodes_toml() {
        let w: Wrapper = toml::from_str("OptBool = true").unwrap();
        assert_eq!(w.opt_bool, OptBool::True);

        let w: Wrapper = toml::from_str("").unwrap();
        assert_eq!(w.opt_bool, OptBool::Undefined);

        assert!(toml::from_str::<Wrapper>("OptBool = \"yes\"").is_err());
    }

    #[test]
    fn unwrap_or_falls_back_only_when_undefined() {
        assert!(OptBool::Undefined.unwrap_or(true));
        assert!(!OptBool::False.unwrap_or(true));
        assert!(OptBool::True.unwrap_or(false));
    }
}
