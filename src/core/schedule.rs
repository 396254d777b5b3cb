use crate::utils::error::{EtlError, Result};
use chrono::{DateTime, Duration, DurationRound, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    Hourly,
    Daily,
    Once,
}

impl Schedule {
    pub fn parse(preset: &str) -> Result<Self> {
        match preset.trim() {
            "@hourly" => Ok(Schedule::Hourly),
            "@daily" => Ok(Schedule::Daily),
            "@once" => Ok(Schedule::Once),
            other => Err(EtlError::DagError {
                message: format!("Unsupported schedule preset: {}", other),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Schedule::Hourly => "@hourly",
            Schedule::Daily => "@daily",
            Schedule::Once => "@once",
        }
    }

    fn interval(&self) -> Option<Duration> {
        match self {
            Schedule::Hourly => Some(Duration::hours(1)),
            Schedule::Daily => Some(Duration::days(1)),
            Schedule::Once => None,
        }
    }

    /// Logical date (interval start) of the most recently completed interval
    /// at `now`. Without catchup this is the only interval that gets a run.
    pub fn latest_logical_date(
        &self,
        now: DateTime<Utc>,
        start_date: DateTime<Utc>,
    ) -> Result<DateTime<Utc>> {
        let Some(interval) = self.interval() else {
            return Ok(start_date);
        };

        let floored = now.duration_trunc(interval).map_err(|e| EtlError::DagError {
            message: format!("Cannot align {} to {}: {}", now, self.as_str(), e),
        })?;
        let logical = floored - interval;

        if logical < start_date {
            return Err(EtlError::DagError {
                message: format!(
                    "No completed {} interval since start date {}",
                    self.as_str(),
                    start_date
                ),
            });
        }

        Ok(logical)
    }
}

impl std::fmt::Display for Schedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
