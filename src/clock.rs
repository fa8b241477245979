use time::{error::IndeterminateOffset, Date, OffsetDateTime, UtcOffset};

/// Source of "today" for due-today checks and completion stamps.
pub trait Clock: Send + Sync {
    fn today(&self) -> Date;
}

#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    offset: UtcOffset,
}

impl SystemClock {
    /// Must run before the process spawns any threads; afterwards the
    /// local offset cannot be read safely and this fails.
    pub fn local() -> Result<Self, IndeterminateOffset> {
        UtcOffset::current_local_offset().map(Self::with_offset)
    }

    pub fn utc() -> Self {
        Self::with_offset(UtcOffset::UTC)
    }

    pub fn with_offset(offset: UtcOffset) -> Self {
        Self { offset }
    }
}

impl Clock for SystemClock {
    fn today(&self) -> Date {
        OffsetDateTime::now_utc().to_offset(self.offset).date()
    }
}

#[cfg(test)]
pub struct FixedClock(pub Date);

#[cfg(test)]
impl Clock for FixedClock {
    fn today(&self) -> Date {
        self.0
    }
}
