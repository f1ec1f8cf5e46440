//! Dashboard counters over fetched leave applications.

use chrono::{Datelike, Duration, NaiveDate};

use super::{LeaveApplication, LeaveStatus};

/// How far ahead "upcoming absences" look.
pub const UPCOMING_WINDOW_DAYS: i64 = 7;

/// Counters shown on the dashboard cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LeaveStats {
    /// Applications still awaiting a decision.
    pub pending_approvals: usize,
    /// Approved applications covering `today`.
    pub on_leave_today: usize,
    /// Approved applications starting after `today` and within the upcoming window.
    pub upcoming_absences: usize,
    /// Approved applications starting in the month of `today`.
    pub monthly_approved: usize,
}

impl LeaveStats {
    pub fn compute(apps: &[LeaveApplication], today: NaiveDate) -> Self {
        let horizon = today + Duration::days(UPCOMING_WINDOW_DAYS);
        let mut stats = LeaveStats::default();
        for app in apps {
            match app.status {
                LeaveStatus::Pending => stats.pending_approvals += 1,
                LeaveStatus::Approved => {
                    if app.covers(today) {
                        stats.on_leave_today += 1;
                    }
                    if app.start_date > today && app.start_date <= horizon {
                        stats.upcoming_absences += 1;
                    }
                    if app.start_date.year() == today.year() && app.start_date.month() == today.month() {
                        stats.monthly_approved += 1;
                    }
                }
                LeaveStatus::Rejected | LeaveStatus::Other(_) => {}
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app(start: &str, end: &str, status: LeaveStatus) -> LeaveApplication {
        LeaveApplication {
            employee_id: "E1".into(),
            employee_name: "Jane Doe".into(),
            leave_type: "Annual Leave".into(),
            start_date: start.parse().unwrap(),
            end_date: end.parse().unwrap(),
            status,
        }
    }

    #[test]
    fn counts_each_card() {
        let today: NaiveDate = "2024-05-10".parse().unwrap();
        let apps = vec![
            app("2024-05-09", "2024-05-11", LeaveStatus::Approved),
            app("2024-05-12", "2024-05-13", LeaveStatus::Approved),
            app("2024-05-17", "2024-05-18", LeaveStatus::Approved),
            app("2024-05-18", "2024-05-18", LeaveStatus::Approved),
            app("2024-06-01", "2024-06-02", LeaveStatus::Approved),
            app("2024-05-10", "2024-05-10", LeaveStatus::Pending),
            app("2024-05-10", "2024-05-10", LeaveStatus::Rejected),
        ];

        let stats = LeaveStats::compute(&apps, today);
        assert_eq!(stats.pending_approvals, 1);
        assert_eq!(stats.on_leave_today, 1);
        // 05-12 and 05-17 are within seven days; 05-18 is not
        assert_eq!(stats.upcoming_absences, 2);
        assert_eq!(stats.monthly_approved, 4);
    }
}
