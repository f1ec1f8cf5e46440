//! Month and year grids for the approved-leave calendar.
//!
//! The view date is explicit state in [`CalendarView`]; nothing here reads the clock.

use chrono::{Datelike, Duration, Months, NaiveDate};

use crate::leave::{LeaveApplication, LeaveStatus};

/// Cells in a month grid: six weeks of seven days.
pub const GRID_DAYS: usize = 42;

const WEEKDAY_LABELS: [&str; 7] = ["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"];

/// Short weekday labels, Sunday first.
pub fn weekday_labels() -> [&'static str; 7] {
    WEEKDAY_LABELS
}

/// First day of the month containing `date`.
pub fn start_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// The 42 days shown for the month of `date`, starting on the Sunday on or before the 1st.
pub fn month_grid(date: NaiveDate) -> Vec<NaiveDate> {
    let first = start_of_month(date);
    let back = i64::from(first.weekday().num_days_from_sunday());
    let start = first - Duration::days(back);
    start.iter_days().take(GRID_DAYS).collect()
}

/// Dot colour of a leave type on the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeaveColor {
    Default,
    Blue,
    Green,
    Pink,
    Purple,
}

/// Leave types with a fixed colour, in display order.
const TYPE_COLORS: [(&str, LeaveColor); 3] = [
    ("Annual Leave", LeaveColor::Blue),
    ("Medical Leave", LeaveColor::Green),
    ("Emergency Leave", LeaveColor::Pink),
];

pub fn color_for_leave_type(leave_type: &str) -> LeaveColor {
    TYPE_COLORS
        .iter()
        .find(|(t, _)| *t == leave_type)
        .map(|(_, c)| *c)
        .unwrap_or(LeaveColor::Default)
}

fn type_rank(leave_type: &str) -> usize {
    TYPE_COLORS
        .iter()
        .position(|(t, _)| *t == leave_type)
        .unwrap_or(TYPE_COLORS.len())
}

/// One person on leave on one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaveDay {
    pub date: NaiveDate,
    pub leave_type: String,
    pub employee_name: String,
}

/// One entry per calendar day of every approved application.
pub fn expand_approved(apps: &[LeaveApplication]) -> Vec<LeaveDay> {
    apps.iter()
        .filter(|a| a.status == LeaveStatus::Approved)
        .flat_map(|a| {
            a.days().map(move |date| LeaveDay {
                date,
                leave_type: a.leave_type.clone(),
                employee_name: a.employee_name.clone(),
            })
        })
        .collect()
}

/// People on one leave type on one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaveGroup {
    pub leave_type: String,
    pub color: LeaveColor,
    pub people: Vec<String>,
}

/// One cell of a month grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarCell {
    pub date: NaiveDate,
    /// `false` for the leading/trailing days of neighbouring months.
    pub in_month: bool,
    pub groups: Vec<LeaveGroup>,
}

/// A month of approved leave.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarMonth {
    pub month_start: NaiveDate,
    pub cells: Vec<CalendarCell>,
}

impl CalendarMonth {
    pub fn build(date: NaiveDate, apps: &[LeaveApplication]) -> Self {
        let month_start = start_of_month(date);
        let leave_days = expand_approved(apps);

        let cells = month_grid(date)
            .into_iter()
            .map(|day| {
                let mut groups: Vec<LeaveGroup> = Vec::new();
                for ld in leave_days.iter().filter(|ld| ld.date == day) {
                    match groups.iter_mut().find(|g| g.leave_type == ld.leave_type) {
                        Some(g) => g.people.push(ld.employee_name.clone()),
                        None => groups.push(LeaveGroup {
                            leave_type: ld.leave_type.clone(),
                            color: color_for_leave_type(&ld.leave_type),
                            people: vec![ld.employee_name.clone()],
                        }),
                    }
                }
                groups.sort_by(|a, b| {
                    type_rank(&a.leave_type)
                        .cmp(&type_rank(&b.leave_type))
                        .then_with(|| a.leave_type.cmp(&b.leave_type))
                });
                CalendarCell {
                    date: day,
                    in_month: day.year() == month_start.year() && day.month() == month_start.month(),
                    groups,
                }
            })
            .collect();

        Self { month_start, cells }
    }

    /// The cell for `date`, if it is on this grid.
    pub fn cell(&self, date: NaiveDate) -> Option<&CalendarCell> {
        self.cells.iter().find(|c| c.date == date)
    }
}

/// Calendar navigation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarView {
    pub date: NaiveDate,
    pub today: NaiveDate,
}

impl CalendarView {
    pub fn new(today: NaiveDate) -> Self {
        Self { date: today, today }
    }

    pub fn next_month(&mut self) {
        self.date = self.date.checked_add_months(Months::new(1)).unwrap_or(self.date);
    }

    pub fn previous_month(&mut self) {
        self.date = self.date.checked_sub_months(Months::new(1)).unwrap_or(self.date);
    }

    pub fn jump_to_today(&mut self) {
        self.date = self.today;
    }

    pub fn month(&self, apps: &[LeaveApplication]) -> CalendarMonth {
        CalendarMonth::build(self.date, apps)
    }

    /// Month grids for January..December of the viewed year.
    pub fn year_grids(&self) -> Vec<Vec<NaiveDate>> {
        (1..=12)
            .filter_map(|m| NaiveDate::from_ymd_opt(self.date.year(), m, 1))
            .map(month_grid)
            .collect()
    }
}
