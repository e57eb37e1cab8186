//! Operator command parsing.

use robolink_control::{StopReason, UnknownStopReason};
use robolink_core::{Actuator, CoreError, Direction, Endpoint};
use thiserror::Error;

/// Help text printed by `help`.
pub const HELP: &str = "\
commands:
  forward | backward | left | right   start moving
  release                             stop moving in the held direction
  stop                                emergency stop
  horn on|off, brake on|off           actuators
  reason red-light|stop-sign|none     record why the vehicle is stopped
  ack                                 clear the stop reason
  clear                               dismiss the error message
  connect <host> <port>               switch robots
  disconnect                          drop the session
  state                               print the control state as JSON
  help                                this text
  quit                                stop the robot and exit";

/// One parsed operator command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Press(Direction),
    Release,
    Stop,
    Actuator { actuator: Actuator, engage: bool },
    Reason(StopReason),
    Acknowledge,
    ClearError,
    Connect(Endpoint),
    Disconnect,
    State,
    Help,
    Quit,
}

/// Why a line could not be parsed.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("unknown command: {0} (try `help`)")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("invalid port: {0}")]
    Port(String),

    #[error(transparent)]
    Endpoint(#[from] CoreError),

    #[error(transparent)]
    Reason(#[from] UnknownStopReason),
}

/// Parse one line. Blank lines yield `None`.
pub fn parse(line: &str) -> Result<Option<Input>, ParseError> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let Some((&verb, rest)) = words.split_first() else {
        return Ok(None);
    };

    let input = match (verb.to_ascii_lowercase().as_str(), rest) {
        ("forward" | "w", []) => Input::Press(Direction::Forward),
        ("backward" | "s", []) => Input::Press(Direction::Backward),
        ("left" | "a", []) => Input::Press(Direction::Left),
        ("right" | "d", []) => Input::Press(Direction::Right),
        ("release", []) => Input::Release,
        ("stop" | "x", []) => Input::Stop,
        ("horn", [state]) => actuator(Actuator::Horn, state, "horn on|off")?,
        ("brake", [state]) => actuator(Actuator::Brake, state, "brake on|off")?,
        ("horn", _) => return Err(ParseError::Usage("horn on|off")),
        ("brake", _) => return Err(ParseError::Usage("brake on|off")),
        ("reason", [reason]) => Input::Reason(reason.parse()?),
        ("reason", _) => return Err(ParseError::Usage("reason red-light|stop-sign|none")),
        ("ack", []) => Input::Acknowledge,
        ("clear", []) => Input::ClearError,
        ("connect", [host, port]) => {
            let port = port
                .parse::<u16>()
                .map_err(|_| ParseError::Port((*port).to_string()))?;
            Input::Connect(Endpoint::new(*host, port)?)
        }
        ("connect", _) => return Err(ParseError::Usage("connect <host> <port>")),
        ("disconnect", []) => Input::Disconnect,
        ("state", []) => Input::State,
        ("help" | "?", []) => Input::Help,
        ("quit" | "exit" | "q", []) => Input::Quit,
        _ => return Err(ParseError::Unknown(line.trim().to_string())),
    };
    Ok(Some(input))
}

fn actuator(actuator: Actuator, state: &str, usage: &'static str) -> Result<Input, ParseError> {
    let engage = match state.to_ascii_lowercase().as_str() {
        "on" => true,
        "off" => false,
        _ => return Err(ParseError::Usage(usage)),
    };
    Ok(Input::Actuator { actuator, engage })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_directions_and_shortcuts() {
        assert_eq!(parse("forward").unwrap(), Some(Input::Press(Direction::Forward)));
        assert_eq!(parse("  LEFT ").unwrap(), Some(Input::Press(Direction::Left)));
        assert_eq!(parse("d").unwrap(), Some(Input::Press(Direction::Right)));
        assert_eq!(parse("stop").unwrap(), Some(Input::Stop));
    }

    #[test]
    fn blank_line_is_nothing() {
        assert_eq!(parse("   ").unwrap(), None);
    }

    #[test]
    fn parses_actuators() {
        assert_eq!(
            parse("horn on").unwrap(),
            Some(Input::Actuator {
                actuator: Actuator::Horn,
                engage: true
            })
        );
        assert_eq!(
            parse("brake OFF").unwrap(),
            Some(Input::Actuator {
                actuator: Actuator::Brake,
                engage: false
            })
        );
        assert!(matches!(parse("horn loud"), Err(ParseError::Usage(_))));
        assert!(matches!(parse("brake"), Err(ParseError::Usage(_))));
    }

    #[test]
    fn parses_stop_reasons() {
        assert_eq!(
            parse("reason red-light").unwrap(),
            Some(Input::Reason(StopReason::RedLight))
        );
        assert_eq!(parse("ack").unwrap(), Some(Input::Acknowledge));
        assert!(matches!(parse("reason yield"), Err(ParseError::Reason(_))));
    }

    #[test]
    fn parses_clear() {
        assert_eq!(parse("clear").unwrap(), Some(Input::ClearError));
        assert!(matches!(parse("clear all"), Err(ParseError::Unknown(_))));
    }

    #[test]
    fn parses_connect() {
        assert_eq!(
            parse("connect 10.0.0.5 6000").unwrap(),
            Some(Input::Connect(Endpoint::new("10.0.0.5", 6000).unwrap()))
        );
        assert!(matches!(parse("connect 10.0.0.5 http"), Err(ParseError::Port(_))));
        assert!(matches!(parse("connect 10.0.0.5 0"), Err(ParseError::Endpoint(_))));
        assert!(matches!(parse("connect"), Err(ParseError::Usage(_))));
    }

    #[test]
    fn rejects_unknown_commands() {
        assert!(matches!(parse("jump"), Err(ParseError::Unknown(_))));
        assert!(matches!(parse("forward fast"), Err(ParseError::Unknown(_))));
    }
}
