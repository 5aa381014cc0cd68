//! Relay protocol between the two players of a game
//!
//! The relay itself only forwards events between sessions. Each side runs its own [`Session`]
//! and applies the events in the order they arrive.

use crate::game::{EngineError, HpChess, Resolution};
use crate::types::{Color, Coord};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Event sent through the relay
///
/// Encoded as JSON, e.g. `{"type":"move","from":"e2","to":"e4","color":"w"}` or
/// `{"type":"reset"}`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RelayEvent {
    Move { from: Coord, to: Coord, color: Color },
    Reset,
}

impl RelayEvent {
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn decode(s: &str) -> Result<RelayEvent, serde_json::Error> {
        serde_json::from_str(s)
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("cannot decode event: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("{0:?} moved out of turn")]
    OutOfTurn(Color),
    #[error("spectators cannot move")]
    Spectator,
    #[error("piece on {0} doesn't belong to the player")]
    NotOwnPiece(Coord),
    #[error("move {from}{to} is not allowed")]
    NotAllowed { from: Coord, to: Coord },
    #[error("game is over")]
    GameOver,
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
}

/// One participant's view of a game
///
/// A session with no role is a spectator: it follows the game but can't move.
#[derive(Debug, Clone)]
pub struct Session {
    game: HpChess,
    role: Option<Color>,
}

impl Session {
    pub fn new(role: Option<Color>) -> Session {
        Session {
            game: HpChess::new(),
            role,
        }
    }

    #[inline]
    pub fn game(&self) -> &HpChess {
        &self.game
    }

    #[inline]
    pub fn role(&self) -> Option<Color> {
        self.role
    }

    /// Applies an event received from the relay
    ///
    /// Returns the resolution of the move, or `None` for a reset.
    pub fn apply(&mut self, event: RelayEvent) -> Result<Option<Resolution>, SessionError> {
        match event {
            RelayEvent::Reset => {
                debug!("game reset");
                self.game = HpChess::new();
                Ok(None)
            }
            RelayEvent::Move { from, to, color } => {
                if color != self.game.turn() {
                    return Err(SessionError::OutOfTurn(color));
                }
                let res = self.game.make_move(from, to)?;
                debug!(%from, %to, ?res, "applied remote move");
                Ok(Some(res))
            }
        }
    }

    /// Decodes and applies an event received from the relay
    pub fn receive(&mut self, payload: &str) -> Result<Option<Resolution>, SessionError> {
        self.apply(RelayEvent::decode(payload)?)
    }

    /// Makes a move on behalf of the local player
    ///
    /// The move must be one of [`HpChess::valid_moves()`]. Returns its resolution together with
    /// the encoded event to send through the relay.
    pub fn play_local(
        &mut self,
        from: Coord,
        to: Coord,
    ) -> Result<(Resolution, String), SessionError> {
        let color = self.role.ok_or(SessionError::Spectator)?;
        if self.game.is_game_over() {
            return Err(SessionError::GameOver);
        }
        if color != self.game.turn() {
            return Err(SessionError::OutOfTurn(color));
        }
        if self.game.position().get(from).color() != Some(color) {
            return Err(SessionError::NotOwnPiece(from));
        }
        if !self.game.destinations(from).contains(&to) {
            return Err(SessionError::NotAllowed { from, to });
        }
        let event = RelayEvent::Move { from, to, color }.encode()?;
        let res = self.game.make_move(from, to)?;
        Ok((res, event))
    }

    /// Resets the local game and returns the encoded event to send through the relay
    pub fn reset(&mut self) -> Result<String, SessionError> {
        let event = RelayEvent::Reset;
        self.apply(event)?;
        Ok(event.encode()?)
    }
}
