use crate::runtime::TickScheduler;
use crate::session::{apply, Command, Phase, SessionState};
use crate::settings::{SettingError, SettingField, Settings};

/// Owns the timer state and the periodic tick source.
///
/// Every command goes through [`apply`]; after each one the tick source is
/// reconciled with `is_running`: a handle is acquired when the timer starts
/// and dropped on any exit from the running state.
pub struct SessionController<S: TickScheduler> {
    state: SessionState,
    scheduler: S,
    tick_handle: Option<S::Handle>,
    generation: u64,
}

impl<S: TickScheduler> SessionController<S> {
    pub fn new(settings: Settings, scheduler: S) -> Self {
        Self {
            state: SessionState::new(settings),
            scheduler,
            tick_handle: None,
            generation: 0,
        }
    }

    /// Read-only view for the renderer
    pub fn snapshot(&self) -> &SessionState {
        &self.state
    }

    pub fn is_ticking(&self) -> bool {
        self.tick_handle.is_some()
    }

    /// Generation of the live tick handle; ticks tagged otherwise are stale
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn tick(&mut self) {
        self.dispatch_infallible(Command::Tick);
    }

    /// Tick from the scheduler. Ticks from a released handle are dropped.
    pub fn on_tick(&mut self, generation: u64) {
        if self.tick_handle.is_none() || generation != self.generation {
            log::trace!(
                "dropping stale tick (gen {generation}, current {})",
                self.generation
            );
            return;
        }
        self.tick();
    }

    pub fn start_pause(&mut self) {
        self.dispatch_infallible(Command::StartPause);
    }

    pub fn reset(&mut self) {
        self.dispatch_infallible(Command::Reset);
    }

    /// Ignored while running
    pub fn set_mode(&mut self, phase: Phase) {
        self.dispatch_infallible(Command::SetMode(phase));
    }

    pub fn change_setting(&mut self, field: SettingField, value: u32) -> Result<(), SettingError> {
        self.dispatch(Command::ChangeSetting(field, value))
    }

    /// Release the tick source without touching the timer state
    pub fn shutdown(&mut self) {
        self.release_ticks();
    }

    fn dispatch_infallible(&mut self, command: Command) {
        if let Err(e) = self.dispatch(command) {
            // Only ChangeSetting can fail
            log::error!("unexpected rejection of {command:?}: {e}");
        }
    }

    fn dispatch(&mut self, command: Command) -> Result<(), SettingError> {
        let next = match apply(&self.state, command) {
            Ok(next) => next,
            Err(e) => {
                log::warn!("rejected {command:?}: {e}");
                return Err(e);
            }
        };

        if next.phase != self.state.phase && matches!(command, Command::Tick) {
            log::info!(
                "{} finished, starting {} ({} sessions completed)",
                self.state.phase,
                next.phase,
                next.completed_work_sessions
            );
        }

        self.state = next;
        self.sync_ticks();
        Ok(())
    }

    fn sync_ticks(&mut self) {
        match (self.state.is_running, self.tick_handle.is_some()) {
            (true, false) => {
                self.generation += 1;
                log::debug!("acquiring tick source (gen {})", self.generation);
                self.tick_handle = Some(self.scheduler.start(self.generation));
            }
            (false, true) => self.release_ticks(),
            _ => {}
        }
    }

    fn release_ticks(&mut self) {
        if self.tick_handle.take().is_some() {
            log::debug!("released tick source (gen {})", self.generation);
        }
    }
}

impl<S: TickScheduler> Drop for SessionController<S> {
    fn drop(&mut self) {
        self.release_ticks();
    }
}
