//! Worker lifecycle state machine.

use tokio::sync::watch;

/// Lifecycle of one workerize instance.
///
/// Transitions are one-directional: `Initializing → Ready → Exited`, or
/// straight to `Exited` if the worker dies early. A failed load phase never
/// produces an instance at all, so `Exited` is the only terminal state an
/// instance can reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Initializing,
    Ready,
    Exited,
}

/// Tracks the lifecycle state and notifies observers of the exit
/// transition. The state is owned here exclusively; the transition methods
/// are the only mutation path.
#[derive(Debug)]
pub struct Lifecycle {
    state: watch::Sender<LifecycleState>,
}

impl Lifecycle {
    pub fn new() -> Self {
        let (state, _) = watch::channel(LifecycleState::Initializing);
        Self { state }
    }

    /// Current state; the dispatcher's precondition read.
    pub fn state(&self) -> LifecycleState {
        *self.state.borrow()
    }

    pub fn is_exited(&self) -> bool {
        self.state() == LifecycleState::Exited
    }

    /// `Initializing → Ready`. Ignored from any other state.
    pub fn mark_ready(&self) {
        self.state.send_if_modified(|state| match state {
            LifecycleState::Initializing => {
                *state = LifecycleState::Ready;
                true
            }
            _ => false,
        });
    }

    /// Terminal transition, applied from any state. Irreversible.
    pub fn mark_exited(&self) {
        self.state.send_if_modified(|state| match state {
            LifecycleState::Exited => false,
            _ => {
                *state = LifecycleState::Exited;
                true
            }
        });
    }

    /// Suspend until the terminal `Exited` state.
    pub async fn exited(&self) {
        let mut observer = self.state.subscribe();
        while *observer.borrow_and_update() != LifecycleState::Exited {
            if observer.changed().await.is_err() {
                return;
            }
        }
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}
