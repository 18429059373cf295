use crate::settings::{SettingError, SettingField, Settings};

/// Completed work sessions between long breaks
pub const SESSIONS_PER_LONG_BREAK: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum Phase {
    #[strum(serialize = "Work Time")]
    Work,
    #[strum(serialize = "Short Break")]
    ShortBreak,
    #[strum(serialize = "Long Break")]
    LongBreak,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::Work, Phase::ShortBreak, Phase::LongBreak];

    pub fn is_break(&self) -> bool {
        !matches!(self, Phase::Work)
    }
}

/// Inputs to the state machine: the one-second tick and the user commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Tick,
    StartPause,
    Reset,
    SetMode(Phase),
    ChangeSetting(SettingField, u32),
}

/// Snapshot of the whole timer. Transitions produce a new value, never a
/// partially updated one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionState {
    pub remaining_secs: u32,
    pub phase: Phase,
    pub is_running: bool,
    pub completed_work_sessions: u32,
    pub settings: Settings,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl SessionState {
    pub fn new(settings: Settings) -> Self {
        Self {
            remaining_secs: settings.seconds_for(Phase::Work),
            phase: Phase::Work,
            is_running: false,
            completed_work_sessions: 0,
            settings,
        }
    }

    /// Full length of the active phase in seconds
    pub fn phase_secs(&self) -> u32 {
        self.settings.seconds_for(self.phase)
    }

    /// Fraction of the active phase already elapsed, in [0, 1]
    pub fn progress(&self) -> f64 {
        let total = self.phase_secs();
        if total == 0 {
            return 1.0;
        }
        let elapsed = total.saturating_sub(self.remaining_secs);
        (elapsed as f64 / total as f64).clamp(0.0, 1.0)
    }
}

/// The break that follows a work phase, decided from the number of sessions
/// completed before the one that just ended.
pub fn next_break(completed_before: u32) -> Phase {
    if completed_before > 0 && completed_before % SESSIONS_PER_LONG_BREAK == 0 {
        Phase::LongBreak
    } else {
        Phase::ShortBreak
    }
}

/// Move to the phase after the one that just expired. Running state is kept.
fn advance_phase(state: &SessionState) -> SessionState {
    let mut next = *state;
    match state.phase {
        Phase::Work => {
            let phase = next_break(state.completed_work_sessions);
            next.completed_work_sessions += 1;
            next.phase = phase;
        }
        Phase::ShortBreak | Phase::LongBreak => {
            next.phase = Phase::Work;
        }
    }
    next.remaining_secs = next.settings.seconds_for(next.phase);
    next
}

/// Apply one command to a state and return the resulting state.
///
/// Only [`Command::ChangeSetting`] can fail; on failure no field changes.
pub fn apply(state: &SessionState, command: Command) -> Result<SessionState, SettingError> {
    let next = match command {
        Command::Tick => {
            if !state.is_running {
                return Ok(*state);
            }
            let mut next = *state;
            next.remaining_secs = next.remaining_secs.saturating_sub(1);
            if next.remaining_secs == 0 {
                advance_phase(&next)
            } else {
                next
            }
        }
        Command::StartPause => SessionState {
            is_running: !state.is_running,
            ..*state
        },
        Command::Reset => SessionState::new(state.settings),
        Command::SetMode(phase) => {
            if state.is_running {
                return Ok(*state);
            }
            SessionState {
                phase,
                remaining_secs: state.settings.seconds_for(phase),
                ..*state
            }
        }
        Command::ChangeSetting(field, value) => {
            let mut next = *state;
            next.settings.set(field, value)?;
            if !next.is_running && field.phase() == next.phase {
                next.remaining_secs = next.settings.seconds_for(next.phase);
            }
            next
        }
    };
    Ok(next)
}
