//! Maps inbound client payloads to outbound events.
//!
//! The transport hands every text payload to [`handle_message`] together with
//! the session, and delivers the returned events in order. Errors never
//! escape this boundary: any rejected or undecodable message becomes a
//! private `invalid` reply and the session is left as it was.

use crate::game::{GameSession, Transition};
use crate::rules::MoveRequest;
use log::warn;
use shared::ServerEvent;

/// Who an outbound event is addressed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Only the connection the message came from.
    Reply(ServerEvent),
    /// Every connected client, the sender included.
    Broadcast(ServerEvent),
}

/// Event sent privately to a connection as soon as it joins.
pub fn welcome(session: &GameSession) -> ServerEvent {
    ServerEvent::Init {
        state: session.snapshot(),
    }
}

/// Processes one raw payload against the session.
pub fn handle_message(session: &mut GameSession, raw: &str) -> Vec<Delivery> {
    let outcome = MoveRequest::parse(raw).and_then(|request| session.process_move(&request));

    match outcome {
        Ok(Transition::Advanced { .. }) => vec![Delivery::Broadcast(ServerEvent::Update {
            state: session.snapshot(),
        })],
        Ok(Transition::Terminal { winner }) => vec![
            Delivery::Broadcast(ServerEvent::GameOver { winner }),
            // The session has been reset; resynchronize everyone.
            Delivery::Broadcast(ServerEvent::Update {
                state: session.snapshot(),
            }),
        ],
        Err(err) => {
            warn!("Rejected move: {}", err);
            vec![Delivery::Reply(ServerEvent::Invalid)]
        }
    }
}
