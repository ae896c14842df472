use energy_client::domain::Month;
use time::OffsetDateTime;

/// Calendar position the dataset is generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct AsOf {
    pub year: i32,
    pub month: Month,
}

pub trait Clock {
    fn as_of(&self) -> AsOf;
}

/// Reads the current UTC date.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn as_of(&self) -> AsOf {
        let now = OffsetDateTime::now_utc();
        AsOf {
            year: now.year(),
            month: now.month().into(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub AsOf);

impl FixedClock {
    pub fn new(year: i32, month: Month) -> Self {
        Self(AsOf { year, month })
    }
}

impl Clock for FixedClock {
    fn as_of(&self) -> AsOf {
        self.0
    }
}
