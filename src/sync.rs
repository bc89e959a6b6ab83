//! Broadcast replication: one arrival order, many replicas.
//!
//! The [`Hub`] models the host's realtime transport as an explicit service:
//! each client holds a full replica of the card store, every write is
//! serialized into a single per-card arrival order, and delivery replays
//! that order against the other replicas. There is no merge and no conflict
//! surfacing — the last write to arrive for a key or list slot wins.
//!
//! Consistency contract: a writer observes its own writes immediately
//! (optimistic local apply); everyone else converges to the arrival-order
//! result once delivery catches up. Concurrent writes to the same key are
//! resolved silently, so a stale whole-list write can overwrite a fresher
//! slot update — an accepted limitation, not an error.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use crate::action::{self, Action};
use crate::card::Card;
use crate::store::{CardStore, WriteOp};

/// Index of a connected client.
pub type ClientId = usize;

/// In-memory replication hub over N client replicas of one card.
#[derive(Debug, Clone)]
pub struct Hub {
    replicas: Vec<CardStore>,
    in_flight: VecDeque<(ClientId, WriteOp)>,
}

impl Hub {
    /// Connect `clients` replicas, all starting from the same initial store.
    pub fn new(initial: CardStore, clients: usize) -> Self {
        Hub {
            replicas: vec![initial; clients],
            in_flight: VecDeque::new(),
        }
    }

    /// Number of connected clients.
    pub fn clients(&self) -> usize {
        self.replicas.len()
    }

    /// A client's current replica.
    pub fn replica(&self, client: ClientId) -> &CardStore {
        &self.replicas[client]
    }

    /// Typed read view of a client's replica.
    pub fn card(&self, client: ClientId) -> Card<'_> {
        Card::new(&self.replicas[client])
    }

    /// Dispatch an action from one client.
    ///
    /// The reducer runs against that client's replica, the resulting writes
    /// apply locally at once (read-your-writes), and each write joins the
    /// arrival order for later delivery to the other replicas. Returns the
    /// number of writes produced; zero means the action was a no-op.
    pub fn dispatch(&mut self, client: ClientId, action: &Action, now: DateTime<Utc>) -> usize {
        let ops = action::dispatch(&mut self.replicas[client], action, now);
        let count = ops.len();
        for op in ops {
            self.in_flight.push_back((client, op));
        }
        count
    }

    /// Writes queued but not yet delivered.
    pub fn pending(&self) -> usize {
        self.in_flight.len()
    }

    /// Deliver the next queued write to every replica except its origin.
    /// Returns `false` when nothing was pending.
    pub fn deliver_next(&mut self) -> bool {
        let Some((origin, op)) = self.in_flight.pop_front() else {
            return false;
        };
        for (id, replica) in self.replicas.iter_mut().enumerate() {
            if id != origin {
                replica.apply(&op);
            }
        }
        true
    }

    /// Drain the arrival order completely.
    pub fn deliver_all(&mut self) {
        while self.deliver_next() {}
    }
}
