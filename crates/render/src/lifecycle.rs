use tracing::debug;

/// Where a renderer is in its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    /// Resources exist, no frame updated yet.
    Initialized,
    /// At least one update has run; render is allowed.
    Running,
    ShutDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    #[error("renderer is not initialized")]
    NotInitialized,
    #[error("renderer is already initialized")]
    AlreadyInitialized,
    #[error("render called before the first update")]
    NotUpdated,
    #[error("renderer has been shut down")]
    ShutDown,
}

/// Guards the call order `init -> {update <-> render, resize} -> shutdown`.
#[derive(Debug, Clone)]
pub struct Lifecycle {
    phase: Phase,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self {
            phase: Phase::Uninitialized,
        }
    }
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lifecycle of a renderer whose init has already succeeded.
    pub fn ready() -> Self {
        Self {
            phase: Phase::Initialized,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_shut_down(&self) -> bool {
        self.phase == Phase::ShutDown
    }

    pub fn initialized(&mut self) -> Result<(), LifecycleError> {
        match self.phase {
            Phase::Uninitialized => {
                self.phase = Phase::Initialized;
                Ok(())
            }
            Phase::ShutDown => Err(LifecycleError::ShutDown),
            Phase::Initialized | Phase::Running => Err(LifecycleError::AlreadyInitialized),
        }
    }

    pub fn begin_update(&mut self) -> Result<(), LifecycleError> {
        self.ensure_live()?;
        self.phase = Phase::Running;
        Ok(())
    }

    pub fn begin_render(&self) -> Result<(), LifecycleError> {
        self.ensure_live()?;
        if self.phase == Phase::Initialized {
            return Err(LifecycleError::NotUpdated);
        }
        Ok(())
    }

    pub fn begin_resize(&self) -> Result<(), LifecycleError> {
        self.ensure_live()
    }

    /// Returns `true` on the call that actually shuts down; later calls are
    /// no-ops returning `false`.
    pub fn shutdown(&mut self) -> bool {
        if self.phase == Phase::ShutDown {
            debug!("shutdown called again, ignoring");
            return false;
        }
        self.phase = Phase::ShutDown;
        true
    }

    fn ensure_live(&self) -> Result<(), LifecycleError> {
        match self.phase {
            Phase::Uninitialized => Err(LifecycleError::NotInitialized),
            Phase::ShutDown => Err(LifecycleError::ShutDown),
            Phase::Initialized | Phase::Running => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_flow() {
        let mut lc = Lifecycle::new();
        assert_eq!(lc.begin_update(), Err(LifecycleError::NotInitialized));
        lc.initialized().unwrap();
        assert_eq!(lc.begin_render(), Err(LifecycleError::NotUpdated));
        lc.begin_resize().unwrap();
        lc.begin_update().unwrap();
        lc.begin_render().unwrap();
        lc.begin_update().unwrap();
        assert_eq!(lc.phase(), Phase::Running);
    }

    #[test]
    fn shutdown_is_idempotent_and_final() {
        let mut lc = Lifecycle::new();
        lc.initialized().unwrap();
        assert!(lc.shutdown());
        assert!(!lc.shutdown());
        assert_eq!(lc.begin_update(), Err(LifecycleError::ShutDown));
        assert_eq!(lc.begin_render(), Err(LifecycleError::ShutDown));
        assert_eq!(lc.begin_resize(), Err(LifecycleError::ShutDown));
        assert_eq!(lc.initialized(), Err(LifecycleError::ShutDown));
    }

    #[test]
    fn ready_skips_init() {
        let mut lc = Lifecycle::ready();
        assert_eq!(lc.phase(), Phase::Initialized);
        assert_eq!(lc.initialized(), Err(LifecycleError::AlreadyInitialized));
        lc.begin_update().unwrap();
    }

    #[test]
    fn double_init_is_rejected() {
        let mut lc = Lifecycle::new();
        lc.initialized().unwrap();
        assert_eq!(lc.initialized(), Err(LifecycleError::AlreadyInitialized));
    }
}
