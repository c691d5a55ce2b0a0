// File: ./src/progress.rs
// Grid arithmetic and the household calendar day.
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

/// Stars needed to fill the chart.
pub const GOAL: usize = 60;
/// Stars per grid row; completing one fires the row effect.
pub const ROW_SIZE: usize = 6;
pub const ROWS: usize = GOAL / ROW_SIZE;

/// "Today" is a household-wide civil date, not the viewer's local one.
pub const HOUSEHOLD_TZ: Tz = chrono_tz::America::Los_Angeles;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub total: usize,
    pub fraction: f64,
    pub complete: bool,
}

impl Progress {
    /// `fraction` is not clamped; callers drawing a bar should clamp it.
    pub fn of(total: usize) -> Self {
        Self {
            total,
            fraction: total as f64 / GOAL as f64,
            complete: total >= GOAL,
        }
    }

    pub fn label(&self) -> String {
        format!("{} / {}", self.total, GOAL)
    }
}

/// Which celebrations an add from `previous` to `new` stars earns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Milestones {
    pub row: bool,
    pub finished: bool,
}

impl Milestones {
    pub fn between(previous: usize, new: usize) -> Self {
        Self {
            row: previous / ROW_SIZE < new / ROW_SIZE,
            finished: previous < GOAL && new >= GOAL,
        }
    }

    pub fn any(&self) -> bool {
        self.row || self.finished
    }
}

pub fn household_date(now: DateTime<Utc>) -> NaiveDate {
    now.with_timezone(&HOUSEHOLD_TZ).date_naive()
}

pub fn household_today() -> NaiveDate {
    household_date(Utc::now())
}

/// 1-based row label for a slot index, shown on the first slot of each row.
pub fn row_label(index: usize) -> Option<usize> {
    (index % ROW_SIZE == 0).then_some(index / ROW_SIZE + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn fraction_and_completion_over_whole_range() {
        for n in 0..GOAL {
            let p = Progress::of(n);
            assert_eq!(p.fraction, n as f64 / 60.0);
            assert!(!p.complete, "{n} stars must not complete the chart");
        }
        assert!(Progress::of(60).complete);
        assert_eq!(Progress::of(60).fraction, 1.0);
        let beyond = Progress::of(75);
        assert!(beyond.complete);
        assert!(beyond.fraction > 1.0);
        assert_eq!(beyond.label(), "75 / 60");
    }

    #[test]
    fn row_fires_only_when_crossing_a_multiple_of_six() {
        for prev in 0..80 {
            let m = Milestones::between(prev, prev + 1);
            assert_eq!(m.row, (prev + 1) % ROW_SIZE == 0, "prev={prev}");
        }
    }

    #[test]
    fn row_matches_floor_formula_for_larger_jumps() {
        for prev in 0..70 {
            for new in prev + 1..prev + 10 {
                let expected = prev / 6 != new / 6;
                assert_eq!(Milestones::between(prev, new).row, expected);
            }
        }
    }

    #[test]
    fn finish_fires_only_on_the_transition() {
        assert!(Milestones::between(59, 60).finished);
        assert!(Milestones::between(58, 61).finished);
        assert!(!Milestones::between(60, 61).finished);
        assert!(!Milestones::between(58, 59).finished);
        let m = Milestones::between(59, 60);
        assert!(m.row && m.finished);
    }

    #[test]
    fn household_date_is_pacific() {
        // 06:30 UTC on Jan 2 is still Jan 1 in Los Angeles (UTC-8).
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 6, 30, 0).unwrap();
        assert_eq!(household_date(now), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        // Summer time: UTC-7.
        let now = Utc.with_ymd_and_hms(2024, 7, 4, 7, 0, 0).unwrap();
        assert_eq!(household_date(now), NaiveDate::from_ymd_opt(2024, 7, 4).unwrap());
    }

    #[test]
    fn row_labels_mark_row_starts() {
        assert_eq!(row_label(0), Some(1));
        assert_eq!(row_label(5), None);
        assert_eq!(row_label(6), Some(2));
        assert_eq!(row_label(54), Some(10));
    }
}
