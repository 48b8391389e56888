use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// Value of a parsed `--flag`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlagValue {
    /// `--flag` with no value after it
    Present,
    /// `--flag value`
    Value(String),
}

impl FlagValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FlagValue::Present => None,
            FlagValue::Value(v) => Some(v.as_str()),
        }
    }
}

impl Serialize for FlagValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FlagValue::Present => serializer.serialize_bool(true),
            FlagValue::Value(v) => serializer.serialize_str(v),
        }
    }
}

/// Positional arguments and flags of a statement's argument tail.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArgList {
    pub args: Vec<String>,
    /// Flag tokens as written, including the leading `--`
    pub flags: Vec<String>,
    #[serde(rename = "flagValues")]
    pub flag_values: BTreeMap<String, FlagValue>,
}

impl ArgList {
    /// Splits `tail` on whitespace. A `--flag` followed by a token that is not a flag takes
    /// that token as its value.
    pub fn parse(tail: &str) -> Self {
        let tokens: Vec<&str> = tail.split_whitespace().collect();
        let mut out = ArgList::default();

        let mut i = 0;
        while i < tokens.len() {
            let tok = tokens[i];
            if let Some(name) = tok.strip_prefix("--") {
                out.flags.push(tok.to_string());
                let value = match tokens.get(i + 1) {
                    Some(next) if !next.starts_with("--") => {
                        i += 1;
                        FlagValue::Value(next.to_string())
                    }
                    _ => FlagValue::Present,
                };
                out.flag_values.insert(name.to_string(), value);
            } else {
                out.args.push(tok.to_string());
            }
            i += 1;
        }

        out
    }

    pub fn has_flag(&self, name: &str) -> bool {
        self.flag_values.contains_key(name)
    }

    pub fn flag(&self, name: &str) -> Option<&FlagValue> {
        self.flag_values.get(name)
    }

    /// The value given to `--name`, if it had one.
    pub fn flag_str(&self, name: &str) -> Option<&str> {
        self.flag(name).and_then(FlagValue::as_str)
    }

    pub fn arg(&self, idx: usize) -> Option<&str> {
        self.args.get(idx).map(String::as_str)
    }

    /// Positional arguments from `idx` on, re-joined with single spaces.
    pub fn rest(&self, idx: usize) -> String {
        self.args.get(idx..).map(|a| a.join(" ")).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_only() {
        let a = ArgList::parse("  money   100000 ");
        assert_eq!(a.args, vec!["money", "100000"]);
        assert!(a.flags.is_empty());
    }

    #[test]
    fn flag_takes_following_value() {
        let a = ArgList::parse("settings --depth 3 theme");
        assert_eq!(a.args, vec!["settings", "theme"]);
        assert_eq!(a.flag_str("depth"), Some("3"));
        assert_eq!(a.flags, vec!["--depth"]);
    }

    #[test]
    fn flag_without_value_is_present() {
        let a = ArgList::parse("money --json --raw");
        assert_eq!(a.args, vec!["money"]);
        assert_eq!(a.flag("json"), Some(&FlagValue::Present));
        assert!(a.has_flag("raw"));
        assert!(!a.has_flag("all"));
        assert_eq!(a.flag_str("raw"), None);
    }

    #[test]
    fn empty_tail() {
        let a = ArgList::parse("");
        assert_eq!(a, ArgList::default());
        assert_eq!(a.rest(0), "");
    }

    #[test]
    fn rest_rejoins_free_text() {
        let a = ArgList::parse(r#"theme {"color":   "blue"}"#);
        assert_eq!(a.arg(0), Some("theme"));
        assert_eq!(a.rest(1), r#"{"color": "blue"}"#);
    }

    #[test]
    fn serializes_flag_values() {
        let a = ArgList::parse("x --json --depth 1");
        let v = serde_json::to_value(&a).unwrap();
        assert_eq!(
            v,
            serde_json::json!({
                "args": ["x"],
                "flags": ["--json", "--depth"],
                "flagValues": {"depth": "1", "json": true}
            })
        );
    }
}
