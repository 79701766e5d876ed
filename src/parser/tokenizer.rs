//! Plain command-line tokenizer.
//!
//! Two independent passes over the input:
//! - the command name: the first run of word characters or `-` after any
//!   leading whitespace;
//! - the arguments: repeated `key=value` or `key="quoted value"` pairs,
//!   scanned left to right without overlap over whatever follows the name.
//!
//! Text between pairs is reported as bare tokens; what happens to them is
//! decided by [`BareTokenPolicy`].

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, trace};

use crate::command::{Arguments, Command, CommandRegistry};
use crate::config::BareTokenPolicy;
use crate::error::DispatchError;

/// Leading command name.
static FUNCTION_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([\w-]+)").expect("valid regex"));

/// `key = "quoted \" value"` or `key = unquoted`.
static ARG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([\w-]+)\s*=\s*(?:"((?:[^"\\]|\\.)*)"|(\S+))"#).expect("valid regex")
});

/// Whole-string identifier check.
static IDENTIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w-]+$").expect("valid regex"));

/// Returns `true` if `s` is a valid command or argument name.
#[must_use]
pub fn is_identifier(s: &str) -> bool {
    IDENTIFIER_RE.is_match(s)
}

/// A lexical token from the argument part of a command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    /// `key=value`; quoted values have their escapes resolved.
    Pair {
        /// Argument name
        key: &'a str,
        /// Argument value
        value: Cow<'a, str>,
    },
    /// A whitespace-separated word that is not part of any pair.
    Bare(&'a str),
}

/// Splits input into its leading command name and the remainder.
///
/// Returns `None` when the input does not start with a name.
#[must_use]
pub fn split_function_name(input: &str) -> Option<(&str, &str)> {
    let caps = FUNCTION_NAME_RE.captures(input)?;
    let name = caps.get(1)?;
    Some((name.as_str(), &input[name.end()..]))
}

/// Reads the command name and checks that it is registered.
///
/// On success returns the registered command and the unparsed remainder.
///
/// # Errors
///
/// - [`DispatchError::UnparseableInput`] when no name can be read.
/// - [`DispatchError::UnknownCommand`] when the name is not registered.
pub fn parse_function_name<'r, 'i>(
    input: &'i str,
    registry: &'r CommandRegistry,
) -> Result<(&'r Command, &'i str), DispatchError> {
    let Some((name, rest)) = split_function_name(input) else {
        return Err(DispatchError::UnparseableInput {
            input: input.to_string(),
        });
    };

    registry.lookup(name).map_or_else(
        || {
            Err(DispatchError::UnknownCommand {
                name: name.to_string(),
                suggestion: registry.suggest(name),
            })
        },
        |command| Ok((command, rest)),
    )
}

/// Scans `input` into pairs and bare tokens, in input order.
#[must_use]
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut last = 0;

    for caps in ARG_RE.captures_iter(input) {
        let Some(whole) = caps.get(0) else { continue };
        tokens.extend(input[last..whole.start()].split_whitespace().map(Token::Bare));
        last = whole.end();

        let Some(key) = caps.get(1) else { continue };
        let value = match (caps.get(2), caps.get(3)) {
            (Some(quoted), _) => unescape(quoted.as_str()),
            (None, Some(plain)) => Cow::Borrowed(plain.as_str()),
            (None, None) => Cow::Borrowed(""),
        };
        tokens.push(Token::Pair {
            key: key.as_str(),
            value,
        });
    }

    tokens.extend(input[last..].split_whitespace().map(Token::Bare));
    tokens
}

/// Extracts the arguments for `command` from the text after its name.
///
/// Every key must be declared by the command's scheme; a later duplicate
/// overwrites an earlier one. The returned mapping holds only the parsed
/// pairs; reserved keys are added by the dispatcher.
///
/// # Errors
///
/// - [`DispatchError::UnknownArgument`] for a key the command does not
///   declare; no partial mapping is returned.
/// - [`DispatchError::BareToken`] for a valueless token under
///   [`BareTokenPolicy::Reject`].
pub fn parse_args(
    command: &Command,
    rest: &str,
    policy: BareTokenPolicy,
) -> Result<Arguments, DispatchError> {
    let mut args = Arguments::new();

    for token in tokenize(rest) {
        match token {
            Token::Pair { key, value } => {
                if !command.arg_name_exists(key) {
                    return Err(DispatchError::UnknownArgument {
                        command: command.name().to_string(),
                        argument: key.to_string(),
                    });
                }
                trace!(command = command.name(), key, value = %value, "argument parsed");
                args.insert(key.to_string(), value.into_owned());
            }
            Token::Bare(word) => match policy {
                BareTokenPolicy::Ignore => {
                    debug!(command = command.name(), token = word, "ignoring valueless token");
                }
                BareTokenPolicy::Reject => {
                    return Err(DispatchError::BareToken {
                        command: command.name().to_string(),
                        token: word.to_string(),
                    });
                }
            },
        }
    }

    Ok(args)
}

/// Resolves backslash escapes: `\x` becomes `x`.
fn unescape(s: &str) -> Cow<'_, str> {
    if !s.contains('\\') {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(c);
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::ArgumentScheme;

    fn registry() -> CommandRegistry {
        let mut registry = CommandRegistry::new();
        registry.register("show", "", |_: &Arguments| {}, ArgumentScheme::new());
        registry.register(
            "call",
            "",
            |_: &Arguments| {},
            ArgumentScheme::new().required("sip-address"),
        );
        registry.register(
            "join-conference",
            "",
            |_: &Arguments| {},
            ArgumentScheme::new()
                .required("sip-address")
                .optional("conference-id"),
        );
        registry
    }

    fn pair<'a>(key: &'a str, value: &'a str) -> Token<'a> {
        Token::Pair {
            key,
            value: Cow::Borrowed(value),
        }
    }

    #[test]
    fn test_split_function_name() {
        assert_eq!(split_function_name("show"), Some(("show", "")));
        assert_eq!(split_function_name("  call a=b"), Some(("call", " a=b")));
        assert_eq!(
            split_function_name("join-conference x=1"),
            Some(("join-conference", " x=1"))
        );
        assert_eq!(split_function_name(""), None);
        assert_eq!(split_function_name("   "), None);
        assert_eq!(split_function_name("\"quoted\""), None);
    }

    #[test]
    fn test_parse_function_name_known() {
        let registry = registry();
        let (command, rest) = parse_function_name("call sip-address=x", &registry).unwrap();
        assert_eq!(command.name(), "call");
        assert_eq!(rest, " sip-address=x");
    }

    #[test]
    fn test_parse_function_name_unparseable() {
        let registry = registry();
        let err = parse_function_name("!!", &registry).unwrap_err();
        assert_eq!(
            err,
            DispatchError::UnparseableInput {
                input: "!!".to_string()
            }
        );
    }

    #[test]
    fn test_parse_function_name_unknown_with_suggestion() {
        let registry = registry();
        let err = parse_function_name("cal", &registry).unwrap_err();
        assert_eq!(
            err,
            DispatchError::UnknownCommand {
                name: "cal".to_string(),
                suggestion: Some("call".to_string()),
            }
        );
    }

    #[test]
    fn test_tokenize_quoted_and_unquoted() {
        let tokens = tokenize(r#" k1=v1 k2="v 2""#);
        assert_eq!(tokens, vec![pair("k1", "v1"), pair("k2", "v 2")]);
    }

    #[test]
    fn test_tokenize_spaces_around_equals() {
        let tokens = tokenize(r#"k1 = v1 k2 =  "x""#);
        assert_eq!(tokens, vec![pair("k1", "v1"), pair("k2", "x")]);
    }

    #[test]
    fn test_tokenize_escapes_in_quotes() {
        let tokens = tokenize(r#"k="say \"hi\" \\ there""#);
        assert_eq!(tokens, vec![pair("k", r#"say "hi" \ there"#)]);
    }

    #[test]
    fn test_tokenize_empty_quoted_value() {
        assert_eq!(tokenize(r#"k="""#), vec![pair("k", "")]);
    }

    #[test]
    fn test_tokenize_bare_tokens_in_order() {
        let tokens = tokenize("toto a=1 titi tutu b=2 tata");
        assert_eq!(
            tokens,
            vec![
                Token::Bare("toto"),
                pair("a", "1"),
                Token::Bare("titi"),
                Token::Bare("tutu"),
                pair("b", "2"),
                Token::Bare("tata"),
            ]
        );
    }

    #[test]
    fn test_tokenize_value_may_contain_equals_and_colons() {
        let tokens = tokenize("sip-address=sip:alice@example.org;transport=tls");
        assert_eq!(
            tokens,
            vec![pair("sip-address", "sip:alice@example.org;transport=tls")]
        );
    }

    #[test]
    fn test_tokenize_unterminated_quote_is_unquoted_value() {
        assert_eq!(tokenize(r#"k="abc"#), vec![pair("k", "\"abc")]);
    }

    #[test]
    fn test_tokenize_empty() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   ").is_empty());
    }

    #[test]
    fn test_parse_args_accepts_declared_keys() {
        let registry = registry();
        let command = registry.lookup("join-conference").unwrap();
        let args = parse_args(
            command,
            r#" sip-address=sip:conf@example.org conference-id="room 1""#,
            BareTokenPolicy::Ignore,
        )
        .unwrap();

        assert_eq!(args.len(), 2);
        assert_eq!(args["sip-address"], "sip:conf@example.org");
        assert_eq!(args["conference-id"], "room 1");
    }

    #[test]
    fn test_parse_args_rejects_unknown_key() {
        let registry = registry();
        let command = registry.lookup("call").unwrap();
        let err = parse_args(command, " sip-address=foo bogus=1", BareTokenPolicy::Ignore)
            .unwrap_err();
        assert_eq!(
            err,
            DispatchError::UnknownArgument {
                command: "call".to_string(),
                argument: "bogus".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_args_duplicate_key_last_wins() {
        let registry = registry();
        let command = registry.lookup("call").unwrap();
        let args = parse_args(command, " sip-address=a sip-address=b", BareTokenPolicy::Ignore)
            .unwrap();
        assert_eq!(args["sip-address"], "b");
    }

    #[test]
    fn test_parse_args_ignores_bare_tokens() {
        let registry = registry();
        let command = registry.lookup("call").unwrap();
        let args = parse_args(command, " toto sip-address=a", BareTokenPolicy::Ignore).unwrap();
        assert_eq!(args.len(), 1);
    }

    #[test]
    fn test_parse_args_rejects_bare_tokens() {
        let registry = registry();
        let command = registry.lookup("call").unwrap();
        let err = parse_args(command, " toto sip-address=a", BareTokenPolicy::Reject).unwrap_err();
        assert_eq!(
            err,
            DispatchError::BareToken {
                command: "call".to_string(),
                token: "toto".to_string(),
            }
        );
    }

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("call"));
        assert!(is_identifier("join-conference"));
        assert!(is_identifier("conference_id"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("two words"));
        assert!(!is_identifier("a=b"));
    }
}
