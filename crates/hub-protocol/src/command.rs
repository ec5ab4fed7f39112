//! Client-to-server chat commands.

use std::fmt;

/// One command from an active peer.
///
/// Parsing is deliberately lenient: anything that is not a well-formed
/// command yields `None` and the session drops the line without
/// closing the connection. Unknown prefixes are ignored the same way,
/// which keeps the protocol forward compatible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCommand {
    /// `BROADCAST <text>` - deliver to every admitted peer.
    Broadcast { text: String },

    /// `PRIVATE <r1,r2,...> <text>` - deliver only to the listed
    /// recipients. The first space after the recipient list separates
    /// recipients from text.
    Private {
        recipients: Vec<String>,
        text: String,
    },
}

impl ClientCommand {
    /// Parses one inbound line (without its terminator).
    ///
    /// Returns `None` for unknown prefixes and for malformed `PRIVATE`
    /// commands (no separating space, or an empty recipient list).
    pub fn parse(line: &str) -> Option<Self> {
        if let Some(text) = line.strip_prefix("BROADCAST ") {
            return Some(Self::Broadcast {
                text: text.to_string(),
            });
        }

        if let Some(rest) = line.strip_prefix("PRIVATE ") {
            let (recipient_list, text) = rest.split_once(' ')?;
            let recipients: Vec<String> = recipient_list
                .split(',')
                .filter(|r| !r.is_empty())
                .map(str::to_string)
                .collect();
            if recipients.is_empty() {
                return None;
            }
            return Some(Self::Private {
                recipients,
                text: text.to_string(),
            });
        }

        None
    }
}

impl fmt::Display for ClientCommand {
    /// Formats the command as one wire line, without the terminator.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Broadcast { text } => write!(f, "BROADCAST {text}"),
            Self::Private { recipients, text } => {
                write!(f, "PRIVATE {} {}", recipients.join(","), text)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_broadcast() {
        let cmd = ClientCommand::parse("BROADCAST hello world").expect("parses");
        assert_eq!(
            cmd,
            ClientCommand::Broadcast {
                text: "hello world".to_string()
            }
        );
    }

    #[test]
    fn test_parse_broadcast_empty_text() {
        // "BROADCAST " with nothing after the space delivers an empty line.
        let cmd = ClientCommand::parse("BROADCAST ").expect("parses");
        assert_eq!(
            cmd,
            ClientCommand::Broadcast {
                text: String::new()
            }
        );
    }

    #[test]
    fn test_parse_private() {
        let cmd = ClientCommand::parse("PRIVATE bob,carol hello there").expect("parses");
        assert_eq!(
            cmd,
            ClientCommand::Private {
                recipients: vec!["bob".to_string(), "carol".to_string()],
                text: "hello there".to_string()
            }
        );
    }

    #[test]
    fn test_parse_private_single_recipient() {
        let cmd = ClientCommand::parse("PRIVATE bob hi").expect("parses");
        assert_eq!(
            cmd,
            ClientCommand::Private {
                recipients: vec!["bob".to_string()],
                text: "hi".to_string()
            }
        );
    }

    #[test]
    fn test_private_without_separator_dropped() {
        // No space separating recipients from text.
        assert_eq!(ClientCommand::parse("PRIVATE bob"), None);
    }

    #[test]
    fn test_private_empty_recipient_list_dropped() {
        assert_eq!(ClientCommand::parse("PRIVATE  hello"), None);
        assert_eq!(ClientCommand::parse("PRIVATE , hello"), None);
    }

    #[test]
    fn test_unknown_prefix_dropped() {
        assert_eq!(ClientCommand::parse("SHOUT hello"), None);
        assert_eq!(ClientCommand::parse("PRIVATEnoSpace"), None);
        assert_eq!(ClientCommand::parse("BROADCASTnospace"), None);
        assert_eq!(ClientCommand::parse(""), None);
    }

    #[test]
    fn test_display_round_trip() {
        let cmd = ClientCommand::Private {
            recipients: vec!["bob".to_string(), "carol".to_string()],
            text: "see you at: noon".to_string(),
        };
        let line = cmd.to_string();
        assert_eq!(line, "PRIVATE bob,carol see you at: noon");
        assert_eq!(ClientCommand::parse(&line), Some(cmd));
    }
}
