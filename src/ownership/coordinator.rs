//=========================================================================
// Tab Ownership Coordinator
//=========================================================================
//
// Leader election among sibling tabs so that only one runs continuous
// animation/physics work at a time.
//
// Architecture:
//   set_visible() ──┐
//   bus messages ───┼──► state machine (Paused / Requesting / Owner)
//   poll() timer ───┘            │
//                                └──► should_pause_animations()
//
// The protocol is best-effort, not consensus-grade: it tolerates zero
// owners (until a timeout fires) and briefly two owners (two tabs made
// visible in the same instant), but never deadlocks with no tab able to
// become owner. Messages are fire-and-forget broadcasts; loss,
// duplication, and self-receipt are all tolerated.
//
// If the broadcast channel cannot be opened the coordinator fails open:
// the tab becomes permanent unconditional owner and the protocol is
// skipped, keeping animation alive at the cost of the optimization.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::{Duration, Instant};

use log::{debug, info, trace, warn};

//=== Internal Dependencies ===============================================

use super::message::{MessageKind, OwnershipMessage};
use super::tab_id::TabId;
use crate::bus::{BroadcastHub, BusChannel};

//=== Constants ===========================================================

/// Well-known channel name shared by all tabs of one origin.
pub const CHANNEL_NAME: &str = "governor.ownership";

/// Default window in which a request waits for a grant before the tab
/// claims ownership unilaterally.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(1000);

/// Bound on messages handled per poll, to keep frame cost predictable.
const MAX_MESSAGES_PER_POLL: usize = 32;

//=== OwnershipState ======================================================

/// Where this tab stands in the election.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnershipState {
    /// Not owner; animation work is gated off.
    Paused,

    /// Asked for ownership, waiting for a grant or the timeout.
    Requesting,

    /// Licensed to run continuous animation/physics work.
    Owner,
}

//=== TabOwnershipCoordinator =============================================

/// Per-tab election participant.
///
/// Single-threaded: the embedder pumps [`poll`] once per frame and feeds
/// visibility edges through [`set_visible`]; every handler runs to
/// completion, so no locking guards the coordinator's own state.
///
/// The one timing primitive is a single outstanding request deadline,
/// armed when a request is broadcast and cancelled by any grant, by
/// leaving `Requesting`, or by [`teardown`].
///
/// [`poll`]: TabOwnershipCoordinator::poll
/// [`set_visible`]: TabOwnershipCoordinator::set_visible
/// [`teardown`]: TabOwnershipCoordinator::teardown
pub struct TabOwnershipCoordinator {
    tab_id: TabId,
    hub: BroadcastHub,
    channel: Option<BusChannel>,
    state: OwnershipState,
    visible: bool,
    fail_open: bool,
    request_deadline: Option<Instant>,
    request_timeout: Duration,
}

impl TabOwnershipCoordinator {
    //--- Construction -----------------------------------------------------

    /// Creates a coordinator for `tab_id` on `hub`.
    ///
    /// The tab starts `Paused` and hidden; call [`initialize`] before the
    /// first frame.
    ///
    /// [`initialize`]: TabOwnershipCoordinator::initialize
    pub fn new(tab_id: TabId, hub: BroadcastHub, request_timeout: Duration) -> Self {
        Self {
            tab_id,
            hub,
            channel: None,
            state: OwnershipState::Paused,
            visible: false,
            fail_open: false,
            request_deadline: None,
            request_timeout,
        }
    }

    //--- Lifecycle --------------------------------------------------------

    /// Joins the ownership channel and, if the tab is already visible,
    /// begins an ownership request.
    ///
    /// Idempotent: a coordinator that already holds a channel does
    /// nothing. When the channel cannot be opened the coordinator fails
    /// open (permanent unconditional owner, protocol skipped); a later
    /// call may retry and, on success, resumes the protocol.
    pub fn initialize(&mut self) {
        if self.channel.is_some() {
            trace!(target: "governor::ownership", "{}: already initialized", self.tab_id);
            return;
        }

        match self.hub.channel(CHANNEL_NAME) {
            Ok(channel) => {
                self.channel = Some(channel);
                self.fail_open = false;
                self.state = OwnershipState::Paused;
                self.request_deadline = None;
                info!(target: "governor::ownership", "{}: joined '{}'", self.tab_id, CHANNEL_NAME);

                if self.visible {
                    self.begin_request(Instant::now());
                }
            }
            Err(err) => {
                warn!(
                    target: "governor::ownership",
                    "{}: broadcast unavailable ({}), failing open as permanent owner",
                    self.tab_id,
                    err
                );
                self.fail_open = true;
                self.state = OwnershipState::Owner;
                self.request_deadline = None;
            }
        }
    }

    /// Cancels the pending timer, leaves the channel, and returns to
    /// `Paused`. Safe to [`initialize`] again afterwards.
    ///
    /// [`initialize`]: TabOwnershipCoordinator::initialize
    pub fn teardown(&mut self) {
        self.request_deadline = None;
        self.channel = None;
        self.fail_open = false;
        self.state = OwnershipState::Paused;
        debug!(target: "governor::ownership", "{}: torn down", self.tab_id);
    }

    //--- Per-Frame API ----------------------------------------------------

    /// `true` whenever continuous animation/physics work must be skipped:
    /// the tab is not owner, or not visible. Two field reads; call every
    /// frame.
    pub fn should_pause_animations(&self) -> bool {
        self.state != OwnershipState::Owner || !self.visible
    }

    /// Pumps pending bus messages and the request timer; call once per
    /// frame before [`should_pause_animations`].
    ///
    /// [`should_pause_animations`]: TabOwnershipCoordinator::should_pause_animations
    pub fn poll(&mut self) {
        self.poll_at(Instant::now());
    }

    /// [`poll`] against a caller-supplied clock, for embedders (and
    /// tests) that drive time themselves.
    ///
    /// [`poll`]: TabOwnershipCoordinator::poll
    pub fn poll_at(&mut self, now: Instant) {
        if self.fail_open {
            return;
        }

        let mut drained = 0;
        while drained < MAX_MESSAGES_PER_POLL {
            let Some(payload) = self.channel.as_ref().and_then(BusChannel::try_recv) else {
                break;
            };
            if let Some(message) = OwnershipMessage::decode(&payload) {
                self.handle_message(message, now);
            }
            drained += 1;
        }
        if drained >= MAX_MESSAGES_PER_POLL {
            warn!(
                target: "governor::ownership",
                "{}: ownership channel backlog, drained {} messages this frame",
                self.tab_id,
                drained
            );
        }

        if self.state == OwnershipState::Requesting {
            if let Some(deadline) = self.request_deadline {
                if now >= deadline {
                    // No peer answered: assume we are alone or the prior
                    // owner died, and claim ownership unilaterally.
                    self.request_deadline = None;
                    self.state = OwnershipState::Owner;
                    debug!(
                        target: "governor::ownership",
                        "{}: request timed out, claiming ownership",
                        self.tab_id
                    );
                }
            }
        }
    }

    /// Feeds a visibility edge from the platform. Duplicate notifications
    /// of the same value are ignored.
    pub fn set_visible(&mut self, visible: bool) {
        if visible == self.visible {
            return;
        }
        self.visible = visible;
        debug!(
            target: "governor::ownership",
            "{}: became {}",
            self.tab_id,
            if visible { "visible" } else { "hidden" }
        );

        if self.fail_open {
            // Permanent owner; visibility still gates the pause query.
            return;
        }

        if visible {
            if self.state == OwnershipState::Paused && self.channel.is_some() {
                self.begin_request(Instant::now());
            }
        } else if self.state == OwnershipState::Owner {
            self.state = OwnershipState::Paused;
            self.broadcast(MessageKind::Relinquish, self.tab_id.clone());
        }
        // A hidden Requesting tab keeps its request outstanding; if it
        // times out into a hidden owner it hands off on the next foreign
        // request.
    }

    //--- Observation ------------------------------------------------------

    pub fn state(&self) -> OwnershipState {
        self.state
    }

    pub fn tab_id(&self) -> &TabId {
        &self.tab_id
    }

    /// Whether the coordinator is running as permanent owner because the
    /// broadcast channel was unavailable.
    pub fn is_fail_open(&self) -> bool {
        self.fail_open
    }

    //--- Protocol Internals -----------------------------------------------

    /// Broadcasts a request and arms the timeout.
    fn begin_request(&mut self, now: Instant) {
        self.state = OwnershipState::Requesting;
        self.request_deadline = Some(now + self.request_timeout);
        self.broadcast(MessageKind::RequestOwnership, self.tab_id.clone());
        debug!(target: "governor::ownership", "{}: requesting ownership", self.tab_id);
    }

    /// Applies one incoming message to the state machine.
    fn handle_message(&mut self, message: OwnershipMessage, now: Instant) {
        trace!(
            target: "governor::ownership",
            "{}: received {:?} for {}",
            self.tab_id,
            message.kind,
            message.tab_id
        );

        match message.kind {
            MessageKind::OwnershipGranted => {
                if message.tab_id == self.tab_id {
                    if self.state == OwnershipState::Requesting {
                        self.request_deadline = None;
                        self.state = OwnershipState::Owner;
                        debug!(target: "governor::ownership", "{}: granted ownership", self.tab_id);
                    }
                } else if matches!(
                    self.state,
                    OwnershipState::Requesting | OwnershipState::Owner
                ) {
                    self.request_deadline = None;
                    self.state = OwnershipState::Paused;
                    debug!(
                        target: "governor::ownership",
                        "{}: ownership went to {}, pausing",
                        self.tab_id,
                        message.tab_id
                    );
                }
            }
            MessageKind::RequestOwnership => {
                if message.tab_id == self.tab_id {
                    return;
                }
                // Only a hidden owner yields; a visible owner keeps
                // animating (accepted dual-ownership race).
                if self.state == OwnershipState::Owner && !self.visible {
                    self.state = OwnershipState::Paused;
                    self.broadcast(MessageKind::Relinquish, self.tab_id.clone());
                    self.broadcast(MessageKind::OwnershipGranted, message.tab_id.clone());
                    debug!(
                        target: "governor::ownership",
                        "{}: hidden owner handing off to {}",
                        self.tab_id,
                        message.tab_id
                    );
                }
            }
            MessageKind::Relinquish => {
                if message.tab_id == self.tab_id {
                    return;
                }
                if self.state == OwnershipState::Paused && self.visible {
                    self.begin_request(now);
                }
            }
            MessageKind::Unknown => {}
        }
    }

    /// Publishes one message, best-effort.
    fn broadcast(&self, kind: MessageKind, subject: TabId) {
        let Some(channel) = &self.channel else {
            return;
        };
        if let Some(payload) = OwnershipMessage::new(kind, subject).encode() {
            channel.publish(&payload);
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
