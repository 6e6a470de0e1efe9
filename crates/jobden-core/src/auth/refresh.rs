//! Single-flight access-token refresh.
//!
//! Every request that fails with 401 joins a queue. The first one to join
//! while the coordinator is idle becomes the leader and must run the refresh;
//! the others wait. Completing the refresh drains the queue with either the
//! new access token or the failure, and returns the coordinator to idle.

use std::sync::Mutex;

use thiserror::Error;
use tokio::sync::oneshot;
use tracing::debug;

/// Why a refresh could not produce a new token. Cloned to every waiter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefreshError {
    #[error("No refresh token stored")]
    MissingRefreshToken,

    #[error("Refresh rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("Refresh request failed: {0}")]
    Transport(String),

    #[error("Invalid refresh response: {0}")]
    InvalidResponse(String),

    #[error("Could not persist refreshed tokens: {0}")]
    Storage(String),

    #[error("Refresh was abandoned before completing")]
    Abandoned,
}

/// Result of trying to join the refresh queue.
#[derive(Debug)]
pub enum Joined {
    /// The token the request was sent with has already been replaced.
    Rotated(String),
    Queued(Ticket, oneshot::Receiver<Result<String, RefreshError>>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshState {
    Idle,
    Refreshing,
}

/// Role handed out when joining the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ticket {
    /// Joined while idle: run the refresh and call `finish`.
    Leader,
    /// A refresh is already in flight: just wait.
    Follower,
}

/// The state machine and its waiting requests, independent of how waiters
/// are woken up.
#[derive(Debug)]
pub struct RefreshQueue<W> {
    state: RefreshState,
    waiters: Vec<W>,
}

impl<W> Default for RefreshQueue<W> {
    fn default() -> Self {
        Self {
            state: RefreshState::Idle,
            waiters: Vec::new(),
        }
    }
}

impl<W> RefreshQueue<W> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a waiter. Moves `Idle` to `Refreshing`.
    pub fn push(&mut self, waiter: W) -> Ticket {
        self.waiters.push(waiter);
        match self.state {
            RefreshState::Idle => {
                self.state = RefreshState::Refreshing;
                Ticket::Leader
            }
            RefreshState::Refreshing => Ticket::Follower,
        }
    }

    /// Take every waiter and return to `Idle`.
    pub fn drain(&mut self) -> Vec<W> {
        self.state = RefreshState::Idle;
        std::mem::take(&mut self.waiters)
    }

    pub fn state(&self) -> RefreshState {
        self.state
    }

    pub fn len(&self) -> usize {
        self.waiters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waiters.is_empty()
    }
}

type Outcome = Result<String, RefreshError>;

/// Thread-safe wrapper pairing the queue with one-shot channels.
#[derive(Default)]
pub struct RefreshCoordinator {
    queue: Mutex<RefreshQueue<oneshot::Sender<Outcome>>>,
}

impl RefreshCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Join the queue. The receiver resolves when the current refresh finishes.
    pub fn join(&self) -> (Ticket, oneshot::Receiver<Outcome>) {
        let (tx, rx) = oneshot::channel();
        let mut queue = self.queue.lock().unwrap_or_else(|p| p.into_inner());
        let ticket = queue.push(tx);
        debug!(?ticket, queued = queue.len(), "Request queued for token refresh");
        (ticket, rx)
    }

    /// Join the queue unless the caller's token generation is already stale.
    ///
    /// `rotated` runs under the queue lock, only while idle, and returns the
    /// current access token if it differs from the one the request used.
    /// Tokens are stored before `finish` takes the lock, so a request whose
    /// 401 arrives just after a refresh completes reuses the new token instead
    /// of starting a second refresh.
    pub fn join_unless_rotated(&self, rotated: impl FnOnce() -> Option<String>) -> Joined {
        let mut queue = self.queue.lock().unwrap_or_else(|p| p.into_inner());
        if queue.state() == RefreshState::Idle {
            if let Some(token) = rotated() {
                return Joined::Rotated(token);
            }
        }
        let (tx, rx) = oneshot::channel();
        let ticket = queue.push(tx);
        debug!(?ticket, queued = queue.len(), "Request queued for token refresh");
        Joined::Queued(ticket, rx)
    }

    /// Resolve every queued request with `outcome`. Returns how many were woken.
    pub fn finish(&self, outcome: Outcome) -> usize {
        let waiters = {
            let mut queue = self.queue.lock().unwrap_or_else(|p| p.into_inner());
            queue.drain()
        };
        let count = waiters.len();
        for waiter in waiters {
            // A dropped receiver means the caller went away; nothing to do
            let _ = waiter.send(outcome.clone());
        }
        count
    }

    pub fn state(&self) -> RefreshState {
        self.queue.lock().unwrap_or_else(|p| p.into_inner()).state()
    }

    pub fn pending(&self) -> usize {
        self.queue.lock().unwrap_or_else(|p| p.into_inner()).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_state_machine() {
        let mut queue: RefreshQueue<&str> = RefreshQueue::new();
        assert_eq!(queue.state(), RefreshState::Idle);

        assert_eq!(queue.push("a"), Ticket::Leader);
        assert_eq!(queue.state(), RefreshState::Refreshing);
        assert_eq!(queue.push("b"), Ticket::Follower);
        assert_eq!(queue.push("c"), Ticket::Follower);
        assert_eq!(queue.len(), 3);

        assert_eq!(queue.drain(), vec!["a", "b", "c"]);
        assert_eq!(queue.state(), RefreshState::Idle);
        assert!(queue.is_empty());

        // Next failure after draining starts a new refresh
        assert_eq!(queue.push("d"), Ticket::Leader);
    }

    #[tokio::test]
    async fn test_coordinator_fans_out_success() {
        let coordinator = RefreshCoordinator::new();
        let (t1, rx1) = coordinator.join();
        let (t2, rx2) = coordinator.join();
        assert_eq!(t1, Ticket::Leader);
        assert_eq!(t2, Ticket::Follower);
        assert_eq!(coordinator.state(), RefreshState::Refreshing);

        assert_eq!(coordinator.finish(Ok("new-token".to_string())), 2);
        assert_eq!(coordinator.state(), RefreshState::Idle);
        assert_eq!(rx1.await.expect("rx1"), Ok("new-token".to_string()));
        assert_eq!(rx2.await.expect("rx2"), Ok("new-token".to_string()));
    }

    #[test]
    fn test_join_reuses_rotated_token_only_when_idle() {
        let coordinator = RefreshCoordinator::new();
        match coordinator.join_unless_rotated(|| Some("fresh".to_string())) {
            Joined::Rotated(token) => assert_eq!(token, "fresh"),
            Joined::Queued(..) => panic!("Expected rotated token to be reused"),
        }
        assert_eq!(coordinator.pending(), 0);

        let (ticket, _rx) = coordinator.join();
        assert_eq!(ticket, Ticket::Leader);
        // While refreshing, everyone queues regardless of what the store holds
        match coordinator.join_unless_rotated(|| Some("fresh".to_string())) {
            Joined::Queued(ticket, _) => assert_eq!(ticket, Ticket::Follower),
            Joined::Rotated(_) => panic!("Expected to be queued behind the refresh"),
        }
        assert_eq!(coordinator.pending(), 2);
    }

    #[tokio::test]
    async fn test_coordinator_fans_out_failure() {
        let coordinator = RefreshCoordinator::new();
        let (_, rx1) = coordinator.join();
        let (_, rx2) = coordinator.join();
        drop(rx2);

        assert_eq!(coordinator.finish(Err(RefreshError::MissingRefreshToken)), 2);
        assert_eq!(rx1.await.expect("rx1"), Err(RefreshError::MissingRefreshToken));
        assert_eq!(coordinator.pending(), 0);
    }
}
