use std::ops::RangeInclusive;

use thiserror::Error;

use crate::session::Phase;

pub const WORK_MINUTES_RANGE: RangeInclusive<u32> = 1..=60;
pub const SHORT_BREAK_MINUTES_RANGE: RangeInclusive<u32> = 1..=15;
pub const LONG_BREAK_MINUTES_RANGE: RangeInclusive<u32> = 15..=30;

/// One of the three adjustable durations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum SettingField {
    #[strum(serialize = "Work Time")]
    WorkTime,
    #[strum(serialize = "Short Break")]
    ShortBreakTime,
    #[strum(serialize = "Long Break")]
    LongBreakTime,
}

impl SettingField {
    pub const ALL: [SettingField; 3] = [
        SettingField::WorkTime,
        SettingField::ShortBreakTime,
        SettingField::LongBreakTime,
    ];

    pub fn range(&self) -> RangeInclusive<u32> {
        match self {
            SettingField::WorkTime => WORK_MINUTES_RANGE,
            SettingField::ShortBreakTime => SHORT_BREAK_MINUTES_RANGE,
            SettingField::LongBreakTime => LONG_BREAK_MINUTES_RANGE,
        }
    }

    /// The phase whose countdown this field drives
    pub fn phase(&self) -> Phase {
        match self {
            SettingField::WorkTime => Phase::Work,
            SettingField::ShortBreakTime => Phase::ShortBreak,
            SettingField::LongBreakTime => Phase::LongBreak,
        }
    }

    /// Cycle through the fields in display order
    pub fn next(&self) -> SettingField {
        match self {
            SettingField::WorkTime => SettingField::ShortBreakTime,
            SettingField::ShortBreakTime => SettingField::LongBreakTime,
            SettingField::LongBreakTime => SettingField::WorkTime,
        }
    }

    pub fn previous(&self) -> SettingField {
        match self {
            SettingField::WorkTime => SettingField::LongBreakTime,
            SettingField::ShortBreakTime => SettingField::WorkTime,
            SettingField::LongBreakTime => SettingField::ShortBreakTime,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingError {
    #[error("{field} must be between {min} and {max} minutes, got {value}")]
    OutOfRange {
        field: SettingField,
        value: u32,
        min: u32,
        max: u32,
    },
}

/// Phase durations in whole minutes. Always within range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    work_minutes: u32,
    short_break_minutes: u32,
    long_break_minutes: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            work_minutes: 25,
            short_break_minutes: 5,
            long_break_minutes: 15,
        }
    }
}

impl Settings {
    pub fn new(
        work_minutes: u32,
        short_break_minutes: u32,
        long_break_minutes: u32,
    ) -> Result<Self, SettingError> {
        let mut settings = Settings::default();
        settings.set(SettingField::WorkTime, work_minutes)?;
        settings.set(SettingField::ShortBreakTime, short_break_minutes)?;
        settings.set(SettingField::LongBreakTime, long_break_minutes)?;
        Ok(settings)
    }

    pub fn work_minutes(&self) -> u32 {
        self.work_minutes
    }

    pub fn short_break_minutes(&self) -> u32 {
        self.short_break_minutes
    }

    pub fn long_break_minutes(&self) -> u32 {
        self.long_break_minutes
    }

    pub fn get(&self, field: SettingField) -> u32 {
        match field {
            SettingField::WorkTime => self.work_minutes,
            SettingField::ShortBreakTime => self.short_break_minutes,
            SettingField::LongBreakTime => self.long_break_minutes,
        }
    }

    /// Validate and apply; on error the value is left untouched.
    pub fn set(&mut self, field: SettingField, value: u32) -> Result<(), SettingError> {
        validate(field, value)?;
        match field {
            SettingField::WorkTime => self.work_minutes = value,
            SettingField::ShortBreakTime => self.short_break_minutes = value,
            SettingField::LongBreakTime => self.long_break_minutes = value,
        }
        Ok(())
    }

    pub fn minutes_for(&self, phase: Phase) -> u32 {
        match phase {
            Phase::Work => self.work_minutes,
            Phase::ShortBreak => self.short_break_minutes,
            Phase::LongBreak => self.long_break_minutes,
        }
    }

    pub fn seconds_for(&self, phase: Phase) -> u32 {
        self.minutes_for(phase) * 60
    }
}

pub fn validate(field: SettingField, value: u32) -> Result<(), SettingError> {
    let range = field.range();
    if range.contains(&value) {
        Ok(())
    } else {
        Err(SettingError::OutOfRange {
            field,
            value,
            min: *range.start(),
            max: *range.end(),
        })
    }
}
