//=========================================================================
// Broadcast Hub
//=========================================================================
//
// Named-channel fan-out of string payloads between tabs of one process.
//
// Architecture:
//   BusChannel::publish ──► BroadcastHub ──► bounded queue per member
//        (sender)              │                  (capacity 64)
//                              ├─ skips the publishing member
//                              └─ prunes members whose queue is gone
//
// Contract: fire-and-forget. A payload may be dropped for a backlogged
// member (its queue is full) or for all members (nobody subscribed), and
// consumers must tolerate duplicates and self-receipt anyway. The hub
// never blocks and never fails a publish.
//
// A hub constructed with `disabled()` refuses to open channels; this is
// the capability-unsupported condition consumers fail open against.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use log::{debug, trace};

//=== Constants ===========================================================

/// Per-member queue capacity.
///
/// Ownership traffic is a handful of tiny control messages per visibility
/// change; 64 absorbs bursts without letting an unpolled member pin memory.
const MEMBER_QUEUE_CAPACITY: usize = 64;

//=== BusError ============================================================

/// Errors surfaced when joining the hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusError {
    /// Cross-tab messaging is not available in this environment.
    Unavailable,
}

impl std::fmt::Display for BusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable => write!(f, "broadcast channel unavailable"),
        }
    }
}

impl std::error::Error for BusError {}

//=== BroadcastHub ========================================================

/// One member of a named channel.
struct Member {
    id: u64,
    queue: Sender<String>,
}

/// All members of one named channel.
#[derive(Default)]
struct Topic {
    next_id: u64,
    members: Vec<Member>,
}

struct HubInner {
    enabled: bool,
    topics: Mutex<HashMap<String, Topic>>,
}

/// Process-wide broadcast registry, one per "origin".
///
/// Cloning is cheap (shared handle). The hub is `Send + Sync`, so one hub
/// can serve governor instances living on different threads; each member
/// still drains its own queue single-threaded.
#[derive(Clone)]
pub struct BroadcastHub {
    inner: Arc<HubInner>,
}

impl BroadcastHub {
    /// Creates a hub with cross-tab messaging available.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(HubInner {
                enabled: true,
                topics: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Creates a hub on which every `channel()` call fails.
    ///
    /// Models an environment without broadcast capability, so consumers can
    /// exercise their fail-open paths against it.
    pub fn disabled() -> Self {
        Self {
            inner: Arc::new(HubInner {
                enabled: false,
                topics: Mutex::new(HashMap::new()),
            }),
        }
    }

    //--- Membership -------------------------------------------------------

    /// Joins the named channel.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::Unavailable`] if the hub was constructed with
    /// [`BroadcastHub::disabled`].
    pub fn channel(&self, name: &str) -> Result<BusChannel, BusError> {
        if !self.inner.enabled {
            return Err(BusError::Unavailable);
        }

        let (tx, rx) = bounded(MEMBER_QUEUE_CAPACITY);

        let mut topics = self.lock_topics();
        let topic = topics.entry(name.to_owned()).or_default();
        let id = topic.next_id;
        topic.next_id += 1;
        topic.members.push(Member { id, queue: tx });

        debug!(target: "governor::bus", "member {} joined channel '{}'", id, name);

        Ok(BusChannel {
            name: name.to_owned(),
            member_id: id,
            receiver: rx,
            hub: self.clone(),
        })
    }

    //--- Internal Helpers -------------------------------------------------

    /// Fans `payload` out to every member of `name` except the sender.
    ///
    /// Members whose receiving side is gone are pruned here; members with a
    /// full queue simply lose this payload.
    fn publish(&self, name: &str, sender_id: u64, payload: &str) {
        let mut topics = self.lock_topics();
        let Some(topic) = topics.get_mut(name) else {
            return;
        };

        let mut dropped = 0usize;
        topic.members.retain(|member| {
            if member.id == sender_id {
                return true;
            }
            match member.queue.try_send(payload.to_owned()) {
                Ok(()) => true,
                Err(TrySendError::Full(_)) => {
                    dropped += 1;
                    true
                }
                Err(TrySendError::Disconnected(_)) => false,
            }
        });

        if dropped > 0 {
            trace!(
                target: "governor::bus",
                "channel '{}': dropped payload for {} backlogged member(s)",
                name,
                dropped
            );
        }
    }

    fn leave(&self, name: &str, member_id: u64) {
        let mut topics = self.lock_topics();
        if let Some(topic) = topics.get_mut(name) {
            topic.members.retain(|member| member.id != member_id);
            if topic.members.is_empty() {
                topics.remove(name);
            }
        }
        debug!(target: "governor::bus", "member {} left channel '{}'", member_id, name);
    }

    /// Locks the topic table, recovering from poisoning.
    ///
    /// A panic in one publisher must not take the whole bus down; the table
    /// holds only membership data and stays structurally valid.
    fn lock_topics(&self) -> std::sync::MutexGuard<'_, HashMap<String, Topic>> {
        self.inner
            .topics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    //--- Test Accessors ---------------------------------------------------

    #[cfg(test)]
    pub(crate) fn member_count(&self, name: &str) -> usize {
        self.lock_topics()
            .get(name)
            .map(|topic| topic.members.len())
            .unwrap_or(0)
    }
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::new()
    }
}

//=== BusChannel ==========================================================

/// One tab's handle onto a named broadcast channel.
///
/// Publishing never blocks and never fails; receiving is a non-blocking
/// drain. Dropping the handle leaves the channel.
pub struct BusChannel {
    name: String,
    member_id: u64,
    receiver: Receiver<String>,
    hub: BroadcastHub,
}

impl BusChannel {
    /// Sends `payload` to every other member of this channel, best-effort.
    pub fn publish(&self, payload: &str) {
        self.hub.publish(&self.name, self.member_id, payload);
    }

    /// Returns the next pending payload, if any.
    pub fn try_recv(&self) -> Option<String> {
        self.receiver.try_recv().ok()
    }

    /// The channel name this handle is joined to.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for BusChannel {
    fn drop(&mut self) {
        self.hub.leave(&self.name, self.member_id);
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
