//! Mount/unmount state machine for a background instance.
//!
//! ```text
//! Unmounted -> Initializing -> Running -> TearingDown -> Unmounted
//!                     \
//!                      -> Degraded (no rendering context) -> TearingDown
//! ```
//!
//! Teardown is idempotent: calling it on an instance that never finished
//! mounting, or that is already unmounted, does nothing.

use tracing::{debug, info, warn};

/// Where an instance is in its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountState {
    Unmounted,
    /// Allocating the rendering context and objects.
    Initializing,
    /// Producing frames.
    Running,
    /// Mounted, but the rendering context could not be acquired. Nothing is
    /// drawn or simulated.
    Degraded,
    /// Releasing resources.
    TearingDown,
}

/// Tracks transitions and rejects out-of-order ones.
#[derive(Debug)]
pub struct Lifecycle {
    state: MountState,
    mounts: u32,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            state: MountState::Unmounted,
            mounts: 0,
        }
    }

    pub fn state(&self) -> MountState {
        self.state
    }

    /// Number of times an instance has started mounting.
    pub fn mounts(&self) -> u32 {
        self.mounts
    }

    /// Whether frames should be simulated and rendered.
    pub fn is_running(&self) -> bool {
        self.state == MountState::Running
    }

    /// Whether resources are held that teardown must release.
    pub fn is_mounted(&self) -> bool {
        matches!(
            self.state,
            MountState::Initializing | MountState::Running | MountState::Degraded
        )
    }

    /// Start mounting. Returns `false` if already mounted.
    pub fn begin_mount(&mut self) -> bool {
        if self.state != MountState::Unmounted {
            debug!(state = ?self.state, "mount ignored");
            return false;
        }
        self.mounts += 1;
        self.transition(MountState::Initializing);
        true
    }

    /// Initialization succeeded; start producing frames.
    pub fn mounted(&mut self) {
        if self.state == MountState::Initializing {
            self.transition(MountState::Running);
        }
    }

    /// Initialization could not acquire a rendering context.
    pub fn degrade(&mut self) {
        if self.state == MountState::Initializing {
            warn!("rendering context unavailable, background disabled");
            self.transition(MountState::Degraded);
        }
    }

    /// Start teardown. Returns `false` when there is nothing to release.
    pub fn begin_teardown(&mut self) -> bool {
        if !self.is_mounted() {
            return false;
        }
        self.transition(MountState::TearingDown);
        true
    }

    /// Resources have been released.
    pub fn finish_teardown(&mut self) {
        if self.state == MountState::TearingDown {
            self.transition(MountState::Unmounted);
        }
    }

    fn transition(&mut self, next: MountState) {
        info!(from = ?self.state, to = ?next, "lifecycle");
        self.state = next;
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}
