//! # Operator Console
//!
//! Line-oriented commands read from stdin. A line starting with `{` is a
//! raw QR payload and goes to the scan session as camera input.

use shared_types::{OwnerRef, ScopeId, TicketId};
use thiserror::Error;
use tg_04_scan_session::ScanInput;

pub const HELP: &str = "\
commands:
  register <ticket> <scope> [owner]     add a ticket to the ledger
  transfer <ticket> <scope> <owner>     move a ticket to a new holder
  show <ticket> <scope>                 mint a rotating code and display it
  static <ticket> <scope>               mint a static (printed) code
  hide <ticket> <scope>                 stop displaying a ticket
  chain <ticket> <scope> <owner> [invalid]
                                        set what the chain reports
  oracle online|offline                 toggle the ownership oracle
  wallet <address>|none                 connect or disconnect a wallet
  signout [account]                     sign the operator out
  open                                  open a new scan session
  scan <payload>                        submit a payload by hand
  {...}                                 submit a payload as camera input
  metrics                               print Prometheus metrics
  help | quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeStyle {
    Rotating,
    Static,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Register {
        ticket_id: TicketId,
        scope_id: ScopeId,
        owner: Option<OwnerRef>,
    },
    Transfer {
        ticket_id: TicketId,
        scope_id: ScopeId,
        owner: OwnerRef,
    },
    Show {
        ticket_id: TicketId,
        scope_id: ScopeId,
        style: CodeStyle,
    },
    Hide {
        ticket_id: TicketId,
        scope_id: ScopeId,
    },
    Chain {
        ticket_id: TicketId,
        scope_id: ScopeId,
        owner: OwnerRef,
        valid: bool,
    },
    Oracle {
        online: bool,
    },
    Wallet(Option<OwnerRef>),
    /// `None` signs out the configured operator.
    SignOut(Option<String>),
    Scan(ScanInput),
    /// Start a fresh scan session for the operator.
    Open,
    Metrics,
    Help,
    Quit,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("empty line")]
    Empty,

    #[error("unknown command `{0}` (try `help`)")]
    Unknown(String),

    #[error("`{command}` needs <{argument}>")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    #[error("bad <{argument}>: {reason}")]
    InvalidArgument {
        argument: &'static str,
        reason: String,
    },
}

/// Parse one console line.
pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(CommandError::Empty);
    }
    if line.starts_with('{') {
        return Ok(Command::Scan(ScanInput::Camera(line.to_string())));
    }

    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(w, r)| (w, r.trim()));
    let mut args = rest.split_whitespace();

    match word.to_ascii_lowercase().as_str() {
        "register" => Ok(Command::Register {
            ticket_id: ticket(&mut args, "register")?,
            scope_id: scope(&mut args, "register")?,
            owner: args.next().map(OwnerRef::new),
        }),
        "transfer" => Ok(Command::Transfer {
            ticket_id: ticket(&mut args, "transfer")?,
            scope_id: scope(&mut args, "transfer")?,
            owner: OwnerRef::new(required(&mut args, "transfer", "owner")?),
        }),
        "show" | "static" => Ok(Command::Show {
            ticket_id: ticket(&mut args, "show")?,
            scope_id: scope(&mut args, "show")?,
            style: if word.eq_ignore_ascii_case("static") {
                CodeStyle::Static
            } else {
                CodeStyle::Rotating
            },
        }),
        "hide" => Ok(Command::Hide {
            ticket_id: ticket(&mut args, "hide")?,
            scope_id: scope(&mut args, "hide")?,
        }),
        "chain" => Ok(Command::Chain {
            ticket_id: ticket(&mut args, "chain")?,
            scope_id: scope(&mut args, "chain")?,
            owner: OwnerRef::new(required(&mut args, "chain", "owner")?),
            valid: !matches!(args.next(), Some(flag) if flag.eq_ignore_ascii_case("invalid")),
        }),
        "oracle" => match required(&mut args, "oracle", "online|offline")? {
            "online" => Ok(Command::Oracle { online: true }),
            "offline" => Ok(Command::Oracle { online: false }),
            other => Err(CommandError::InvalidArgument {
                argument: "online|offline",
                reason: format!("`{other}`"),
            }),
        },
        "wallet" => match required(&mut args, "wallet", "address")? {
            "none" => Ok(Command::Wallet(None)),
            address => Ok(Command::Wallet(Some(OwnerRef::new(address)))),
        },
        "signout" => Ok(Command::SignOut(args.next().map(str::to_string))),
        "scan" if rest.is_empty() => Err(CommandError::MissingArgument {
            command: "scan",
            argument: "payload",
        }),
        "scan" => Ok(Command::Scan(ScanInput::Manual(rest.to_string()))),
        "open" => Ok(Command::Open),
        "metrics" => Ok(Command::Metrics),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

fn required<'a>(
    args: &mut impl Iterator<Item = &'a str>,
    command: &'static str,
    argument: &'static str,
) -> Result<&'a str, CommandError> {
    args.next()
        .ok_or(CommandError::MissingArgument { command, argument })
}

fn ticket<'a>(
    args: &mut impl Iterator<Item = &'a str>,
    command: &'static str,
) -> Result<TicketId, CommandError> {
    required(args, command, "ticket")?
        .parse()
        .map_err(|e: shared_types::TicketIdError| CommandError::InvalidArgument {
            argument: "ticket",
            reason: e.to_string(),
        })
}

fn scope<'a>(
    args: &mut impl Iterator<Item = &'a str>,
    command: &'static str,
) -> Result<ScopeId, CommandError> {
    ScopeId::new(required(args, command, "scope")?).map_err(|e| CommandError::InvalidArgument {
        argument: "scope",
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event() -> ScopeId {
        ScopeId::new("event-1").unwrap()
    }

    #[test]
    fn test_json_lines_are_camera_scans() {
        let raw = r#"{"ticketId":"1","eventId":"event-1"}"#;
        assert_eq!(
            parse_command(raw).unwrap(),
            Command::Scan(ScanInput::Camera(raw.to_string()))
        );
    }

    #[test]
    fn test_scan_keeps_payload_verbatim() {
        assert_eq!(
            parse_command("scan  {\"a\": 1}").unwrap(),
            Command::Scan(ScanInput::Manual("{\"a\": 1}".to_string()))
        );
        assert_eq!(
            parse_command("scan"),
            Err(CommandError::MissingArgument {
                command: "scan",
                argument: "payload"
            })
        );
    }

    #[test]
    fn test_register_with_and_without_owner() {
        assert_eq!(
            parse_command("register 7 event-1 0xabc").unwrap(),
            Command::Register {
                ticket_id: TicketId(7),
                scope_id: event(),
                owner: Some(OwnerRef::new("0xabc")),
            }
        );
        assert_eq!(
            parse_command("REGISTER 7 event-1").unwrap(),
            Command::Register {
                ticket_id: TicketId(7),
                scope_id: event(),
                owner: None,
            }
        );
    }

    #[test]
    fn test_show_and_static() {
        assert_eq!(
            parse_command("static 3 event-1").unwrap(),
            Command::Show {
                ticket_id: TicketId(3),
                scope_id: event(),
                style: CodeStyle::Static,
            }
        );
        assert!(matches!(
            parse_command("show 3 event-1").unwrap(),
            Command::Show {
                style: CodeStyle::Rotating,
                ..
            }
        ));
    }

    #[test]
    fn test_chain_flag() {
        assert!(matches!(
            parse_command("chain 1 event-1 0xabc invalid").unwrap(),
            Command::Chain { valid: false, .. }
        ));
        assert!(matches!(
            parse_command("chain 1 event-1 0xabc").unwrap(),
            Command::Chain { valid: true, .. }
        ));
    }

    #[test]
    fn test_wallet_and_signout() {
        assert_eq!(parse_command("wallet none").unwrap(), Command::Wallet(None));
        assert_eq!(
            parse_command("signout gate-2").unwrap(),
            Command::SignOut(Some("gate-2".into()))
        );
        assert_eq!(parse_command("signout").unwrap(), Command::SignOut(None));
    }

    #[test]
    fn test_errors() {
        assert_eq!(parse_command("   "), Err(CommandError::Empty));
        assert!(matches!(parse_command("dance"), Err(CommandError::Unknown(_))));
        assert!(matches!(
            parse_command("register x event-1"),
            Err(CommandError::InvalidArgument { argument: "ticket", .. })
        ));
        assert!(matches!(
            parse_command("register 1 a:b"),
            Err(CommandError::InvalidArgument { argument: "scope", .. })
        ));
        assert!(matches!(
            parse_command("transfer 1 event-1"),
            Err(CommandError::MissingArgument { argument: "owner", .. })
        ));
        assert!(matches!(
            parse_command("oracle sideways"),
            Err(CommandError::InvalidArgument { .. })
        ));
    }
}
