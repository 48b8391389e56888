use crate::state::input::Input;

/// A script line after interpolation and inline expansion, split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub modifier: Option<String>,
    pub command: String,
    /// Target after `self` / `replied` aliasing
    pub target: String,
    /// Everything after the target, unparsed
    pub tail: String,
}

/// The line had no `::`; carries the text that stood where the command name goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingSeparator(pub String);

impl Statement {
    pub fn parse(script: &str, input: &Input) -> Result<Self, MissingSeparator> {
        let Some((head, tail)) = script.split_once("::") else {
            return Err(MissingSeparator(script.trim().to_string()));
        };

        let words: Vec<&str> = head.split_whitespace().collect();
        let (modifier, command) = match words.as_slice() {
            [] => (None, String::new()),
            [cmd] => (None, cmd.to_string()),
            [m, cmd, ..] => (Some(m.to_string()), cmd.to_string()),
        };

        let (target, rest) = tail.split_once(' ').unwrap_or((tail, ""));
        let target = match target {
            "self" => input.sender_id.clone(),
            "replied" => input.detect_id.clone().unwrap_or_default(),
            other => other.to_string(),
        };

        Ok(Self {
            modifier,
            command,
            target,
            tail: rest.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> Input {
        Input::new("100").replying_to("200")
    }

    #[test]
    fn plain_statement() {
        let s = Statement::parse("uget::300 settings theme", &input()).unwrap();
        assert_eq!(s.modifier, None);
        assert_eq!(s.command, "uget");
        assert_eq!(s.target, "300");
        assert_eq!(s.tail, "settings theme");
    }

    #[test]
    fn modifier_and_aliases() {
        let s = Statement::parse("rise uincr::self money 5", &input()).unwrap();
        assert_eq!(s.modifier.as_deref(), Some("rise"));
        assert_eq!(s.command, "uincr");
        assert_eq!(s.target, "100");

        let s = Statement::parse("arg::replied", &input()).unwrap();
        assert_eq!(s.target, "200");
        assert_eq!(s.tail, "");
    }

    #[test]
    fn replied_without_reply_is_empty() {
        let s = Statement::parse("arg::replied", &Input::new("100")).unwrap();
        assert_eq!(s.target, "");
    }

    #[test]
    fn empty_target_keeps_tail() {
        let s = Statement::parse("num:: 5T", &input()).unwrap();
        assert_eq!(s.command, "num");
        assert_eq!(s.target, "");
        assert_eq!(s.tail, "5T");
    }

    #[test]
    fn only_first_separator_splits() {
        let s = Statement::parse("print::self a::b", &input()).unwrap();
        assert_eq!(s.tail, "a::b");
    }

    #[test]
    fn missing_separator() {
        assert_eq!(
            Statement::parse("help me", &input()),
            Err(MissingSeparator("help me".to_string()))
        );
    }
}
