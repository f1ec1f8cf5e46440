//! View state for the leave applications table: filter, sort, paginate.

use std::cmp::Ordering;

use super::LeaveApplication;

/// Rows per page.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Sortable table columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeaveColumn {
    EmployeeId,
    EmployeeName,
    LeaveType,
    StartDate,
    EndDate,
    Status,
}

impl LeaveColumn {
    /// Columns in display order.
    pub const ALL: [LeaveColumn; 6] = [
        LeaveColumn::EmployeeId,
        LeaveColumn::EmployeeName,
        LeaveColumn::LeaveType,
        LeaveColumn::StartDate,
        LeaveColumn::EndDate,
        LeaveColumn::Status,
    ];

    pub fn header(self) -> &'static str {
        match self {
            LeaveColumn::EmployeeId => "Employee ID",
            LeaveColumn::EmployeeName => "Employee Name",
            LeaveColumn::LeaveType => "Leave Type",
            LeaveColumn::StartDate => "Start Date",
            LeaveColumn::EndDate => "End Date",
            LeaveColumn::Status => "Status",
        }
    }

    fn compare(self, a: &LeaveApplication, b: &LeaveApplication) -> Ordering {
        match self {
            LeaveColumn::EmployeeId => a.employee_id.cmp(&b.employee_id),
            LeaveColumn::EmployeeName => a.employee_name.cmp(&b.employee_name),
            LeaveColumn::LeaveType => a.leave_type.cmp(&b.leave_type),
            LeaveColumn::StartDate => a.start_date.cmp(&b.start_date),
            LeaveColumn::EndDate => a.end_date.cmp(&b.end_date),
            LeaveColumn::Status => a.status.as_str().cmp(b.status.as_str()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Free-text filters. Each is a case-insensitive substring match; an empty filter matches all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeaveFilter {
    pub employee_id: String,
    pub start_date: String,
    pub end_date: String,
}

impl LeaveFilter {
    pub fn matches(&self, app: &LeaveApplication) -> bool {
        contains_ci(&app.employee_id, &self.employee_id)
            && contains_ci(&app.start_date.format("%Y-%m-%d").to_string(), &self.start_date)
            && contains_ci(&app.end_date.format("%Y-%m-%d").to_string(), &self.end_date)
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Applications table state.
#[derive(Debug, Clone)]
pub struct LeaveTable {
    rows: Vec<LeaveApplication>,
    filter: LeaveFilter,
    sort: Option<(LeaveColumn, SortDirection)>,
    page: usize,
    page_size: usize,
}

impl Default for LeaveTable {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl LeaveTable {
    pub fn new(rows: Vec<LeaveApplication>) -> Self {
        Self {
            rows,
            filter: LeaveFilter::default(),
            sort: None,
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Rows per page; zero is treated as one.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self.page = self.page.min(self.page_count().saturating_sub(1));
        self
    }

    /// Replace the data (e.g. after a refetch). Filter and sort are kept; the page is clamped.
    pub fn set_rows(&mut self, rows: Vec<LeaveApplication>) {
        self.rows = rows;
        self.page = self.page.min(self.page_count().saturating_sub(1));
    }

    pub fn filter(&self) -> &LeaveFilter {
        &self.filter
    }

    /// Replace the filter and go back to the first page.
    pub fn set_filter(&mut self, filter: LeaveFilter) {
        self.filter = filter;
        self.page = 0;
    }

    pub fn sort(&self) -> Option<(LeaveColumn, SortDirection)> {
        self.sort
    }

    pub fn sort_by(&mut self, column: LeaveColumn, direction: SortDirection) {
        self.sort = Some((column, direction));
    }

    pub fn clear_sort(&mut self) {
        self.sort = None;
    }

    /// Header click: unsorted -> ascending -> descending -> unsorted.
    pub fn toggle_sort(&mut self, column: LeaveColumn) {
        self.sort = match self.sort {
            Some((c, SortDirection::Ascending)) if c == column => Some((column, SortDirection::Descending)),
            Some((c, SortDirection::Descending)) if c == column => None,
            _ => Some((column, SortDirection::Ascending)),
        };
    }

    /// All rows passing the filter, in sort order.
    pub fn filtered_rows(&self) -> Vec<&LeaveApplication> {
        let mut out: Vec<&LeaveApplication> = self.rows.iter().filter(|r| self.filter.matches(r)).collect();
        if let Some((column, direction)) = self.sort {
            // stable, so equal keys keep fetch order
            out.sort_by(|a, b| match direction {
                SortDirection::Ascending => column.compare(a, b),
                SortDirection::Descending => column.compare(b, a),
            });
        }
        out
    }

    /// Rows of the current page.
    pub fn visible_rows(&self) -> Vec<&LeaveApplication> {
        self.filtered_rows()
            .into_iter()
            .skip(self.page * self.page_size)
            .take(self.page_size)
            .collect()
    }

    pub fn page(&self) -> usize {
        self.page
    }

    /// Number of pages; zero when nothing matches.
    pub fn page_count(&self) -> usize {
        let n = self.rows.iter().filter(|r| self.filter.matches(r)).count();
        n.div_ceil(self.page_size)
    }

    pub fn can_previous(&self) -> bool {
        self.page > 0
    }

    pub fn can_next(&self) -> bool {
        self.page + 1 < self.page_count()
    }

    pub fn next_page(&mut self) {
        if self.can_next() {
            self.page += 1;
        }
    }

    pub fn previous_page(&mut self) {
        if self.can_previous() {
            self.page -= 1;
        }
    }
}
