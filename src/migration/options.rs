use super::direction::Direction;
use super::types::MigrationError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Options in effect for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Options {
    pub direction: Direction,
    /// Run even if the unit is already in the direction's end state.
    #[serde(default)]
    pub forced: bool,
    /// Compute the schedule without executing anything.
    #[serde(default)]
    pub dry_run: bool,
}

impl Options {
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            forced: false,
            dry_run: false,
        }
    }

    pub fn up() -> Self {
        Self::new(Direction::Up)
    }

    pub fn down() -> Self {
        Self::new(Direction::Down)
    }

    pub fn with_direction(&self, direction: Direction) -> Self {
        Self {
            direction,
            ..self.clone()
        }
    }

    pub fn with_forced(mut self, forced: bool) -> Self {
        self.forced = forced;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// "current of total" counter for a pass. Bounds are checked on every
/// change: `total > 0` and `0 <= current <= total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    total: usize,
    current: usize,
}

impl Progress {
    pub fn new(total: usize, current: usize) -> Result<Self, MigrationError> {
        if total == 0 {
            return Err(MigrationError::InvalidArgument(
                "progress total must be greater than zero".to_string(),
            ));
        }
        Self::check_current(total, current)?;
        Ok(Self { total, current })
    }

    pub fn update(&mut self, current: usize) -> Result<(), MigrationError> {
        Self::check_current(self.total, current)?;
        self.current = current;
        Ok(())
    }

    fn check_current(total: usize, current: usize) -> Result<(), MigrationError> {
        if current > total {
            return Err(MigrationError::InvalidArgument(format!(
                "progress current {} is outside 0..={}",
                current, total
            )));
        }
        Ok(())
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn current(&self) -> usize {
        self.current
    }
}

/// Everything a listener needs to report on one unit of a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    /// Shared by every event of the same pass.
    pub run_id: Uuid,
    pub options: Options,
    pub progress: Progress,
}

impl RunContext {
    pub fn new(run_id: Uuid, options: Options, progress: Progress) -> Self {
        Self {
            run_id,
            options,
            progress,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_bounds() {
        assert!(Progress::new(0, 0).is_err());
        assert!(Progress::new(5, 6).is_err());
        assert!(Progress::new(5, 5).is_ok());
        assert!(Progress::new(5, 0).is_ok());
    }

    #[test]
    fn test_progress_update_revalidates() {
        let mut progress = Progress::new(3, 1).unwrap();
        progress.update(3).unwrap();
        assert_eq!(progress.current(), 3);

        assert!(progress.update(4).is_err());
        assert_eq!(progress.current(), 3);
        assert_eq!(progress.total(), 3);
    }

    #[test]
    fn test_options_builders() {
        let options = Options::up().with_forced(true).with_dry_run(true);
        assert!(options.forced);
        assert!(options.dry_run);

        let down = options.with_direction(Direction::Down);
        assert_eq!(down.direction, Direction::Down);
        assert!(down.forced);
        assert_eq!(options.direction, Direction::Up);
    }
}
