//! Month calendars, and how tasks are laid out on them

use std::fmt::{Display, Formatter};

use chrono::{Datelike, Duration, Local, Months, NaiveDate};

use crate::task::Task;
use crate::traits::TaskFilter;

/// Column headers of a calendar, weeks start on Sunday
pub const WEEKDAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];


/// A month of a given year
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Month {
    /// Always the 1st of the month
    first: NaiveDate,
}

impl Month {
    /// Returns `None` if `month` is not in `1..=12` or if the year is out of range
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|first| Self { first })
    }

    /// The month a date belongs to
    pub fn containing(date: NaiveDate) -> Self {
        Self { first: date - Duration::days(i64::from(date.day0())) }
    }

    pub fn year(&self) -> i32 { self.first.year() }
    pub fn month(&self) -> u32 { self.first.month() }
    pub fn first_day(&self) -> NaiveDate { self.first }

    pub fn days_in_month(&self) -> u32 {
        match self.first.month() {
            2 => if NaiveDate::from_ymd_opt(self.first.year(), 2, 29).is_some() { 29 } else { 28 },
            4 | 6 | 9 | 11 => 30,
            _ => 31,
        }
    }

    pub fn last_day(&self) -> NaiveDate {
        let offset = Duration::days(i64::from(self.days_in_month()) - 1);
        self.first.checked_add_signed(offset).unwrap_or(NaiveDate::MAX)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.first <= date && date <= self.last_day()
    }

    /// The previous month. Stays on this month at the lower end of the representable range
    pub fn previous(&self) -> Self {
        match self.first.checked_sub_months(Months::new(1)) {
            Some(first) => Self { first },
            None => *self,
        }
    }

    /// The next month. Stays on this month at the upper end of the representable range
    pub fn next(&self) -> Self {
        match self.first.checked_add_months(Months::new(1)) {
            Some(first) => Self { first },
            None => *self,
        }
    }

    /// Every day of this month, in order
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let first = self.first;
        (0..self.days_in_month()).filter_map(move |offset| first.checked_add_signed(Duration::days(i64::from(offset))))
    }

    /// e.g. "February 2024"
    pub fn label(&self) -> String {
        self.first.format("%B %Y").to_string()
    }

    /// The request filter for the tasks that are due this month
    pub fn due_filter(&self) -> TaskFilter {
        TaskFilter::DueBetween { start: self.first, end: self.last_day() }
    }
}

impl Display for Month {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}


/// The date a calendar is showing, and the moves between months
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CalendarCursor {
    reference: NaiveDate,
}

impl CalendarCursor {
    pub fn new(reference: NaiveDate) -> Self {
        Self { reference }
    }

    /// A cursor on the current (local) date
    pub fn today() -> Self {
        Self::new(Local::now().date_naive())
    }

    pub fn reference(&self) -> NaiveDate { self.reference }

    pub fn month(&self) -> Month {
        Month::containing(self.reference)
    }

    /// Move one month back.
    ///
    /// The day of the month is clamped to the length of the target month (March 31 goes to the end of February, not to early March)
    pub fn previous(&mut self) {
        if let Some(date) = self.reference.checked_sub_months(Months::new(1)) {
            self.reference = date;
        }
    }

    /// Move one month forward, clamping the day of the month like [`Self::previous`]
    pub fn next(&mut self) {
        if let Some(date) = self.reference.checked_add_months(Months::new(1)) {
            self.reference = date;
        }
    }

    /// Move by several months (backwards when `delta` is negative)
    pub fn shift(&mut self, delta: i32) {
        let months = Months::new(delta.unsigned_abs());
        let moved = if delta < 0 {
            self.reference.checked_sub_months(months)
        } else {
            self.reference.checked_add_months(months)
        };
        if let Some(date) = moved {
            self.reference = date;
        }
    }

    pub fn label(&self) -> String {
        self.month().label()
    }
}



/// A day of a [`MonthGrid`], with the tasks that are due on it
#[derive(Clone, Debug, PartialEq)]
pub struct CalendarDay<'a> {
    pub date: NaiveDate,
    /// Only used to highlight the current day
    pub is_today: bool,
    /// In the order they were given to [`MonthGrid::build`]
    pub tasks: Vec<&'a Task>,
}

/// Every day of a month, with tasks bucketed by due date.
///
/// The grid starts on the 1st and ends on the last day of the month. It is not padded with days of the adjacent months.
#[derive(Clone, Debug, PartialEq)]
pub struct MonthGrid<'a> {
    month: Month,
    days: Vec<CalendarDay<'a>>,
}

impl<'a> MonthGrid<'a> {
    /// Build the grid of the month `reference` belongs to.
    ///
    /// Tasks without a due date, or due in another month, are left out.
    pub fn build(reference: NaiveDate, tasks: &'a [Task], today: NaiveDate) -> Self {
        let month = Month::containing(reference);
        let mut days: Vec<CalendarDay<'a>> = month.days()
            .map(|date| CalendarDay { date, is_today: date == today, tasks: Vec::new() })
            .collect();

        for task in tasks {
            let due = match task.due_date() {
                None => continue,
                Some(d) => d,
            };
            if month.contains(due) == false {
                continue;
            }
            if let Some(day) = days.get_mut(due.day0() as usize) {
                day.tasks.push(task);
            }
        }

        Self { month, days }
    }

    pub fn month(&self) -> Month { self.month }
    pub fn days(&self) -> &[CalendarDay<'a>] { &self.days }

    pub fn day(&self, date: NaiveDate) -> Option<&CalendarDay<'a>> {
        if self.month.contains(date) == false {
            return None;
        }
        self.days.get(date.day0() as usize)
    }

    /// First and last day shown
    pub fn range(&self) -> (NaiveDate, NaiveDate) {
        (self.month.first_day(), self.month.last_day())
    }

    /// How many empty cells come before the 1st, so that it lands under its weekday column
    pub fn leading_blank_days(&self) -> usize {
        self.month.first_day().weekday().num_days_from_sunday() as usize
    }

    /// The days split into Sunday-first weeks. Cells outside the month are `None`
    pub fn weeks(&self) -> Vec<[Option<&CalendarDay<'a>>; 7]> {
        let mut weeks = Vec::new();
        let mut current: [Option<&CalendarDay<'a>>; 7] = [None; 7];
        let mut column = self.leading_blank_days();

        for day in &self.days {
            current[column] = Some(day);
            column += 1;
            if column == 7 {
                weeks.push(current);
                current = [None; 7];
                column = 0;
            }
        }
        if column != 0 {
            weeks.push(current);
        }
        weeks
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crate::task::{NewTask, Priority, TaskColor, TaskId, TaskStatus};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn task(id: &str, due: Option<NaiveDate>) -> Task {
        let fields = NewTask {
            title: format!("task {}", id),
            description: None,
            status: TaskStatus::Pending,
            priority: Priority::Medium,
            color: TaskColor::default(),
            due_date: due,
            created_by: "user-1".to_string(),
        };
        Task::from_new(TaskId::from(id), fields, Utc::now())
    }

    fn ids(day: &CalendarDay) -> Vec<String> {
        day.tasks.iter().map(|t| t.id().to_string()).collect()
    }

    #[test]
    fn grid_spans_exactly_the_month() {
        let mut month = Month::new(1999, 1).unwrap();
        while month.year() < 2031 {
            let grid = MonthGrid::build(month.first_day() + Duration::days(13), &[], date(2000, 1, 1));
            let days = grid.days();

            assert_eq!(days.len() as u32, month.days_in_month());
            assert_eq!(days[0].date.day(), 1);
            assert!(days.iter().all(|d| d.date.month() == month.month() && d.date.year() == month.year()));
            assert!(days.windows(2).all(|w| w[1].date == w[0].date + Duration::days(1)));
            // The day after the last one belongs to the next month
            assert_eq!(days[days.len() - 1].date + Duration::days(1), month.next().first_day());

            month = month.next();
        }
    }

    #[test]
    fn leap_february() {
        let grid = MonthGrid::build(date(2024, 2, 10), &[], date(2024, 2, 10));
        assert_eq!(grid.days().len(), 29);
        assert_eq!(grid.days()[0].date, date(2024, 2, 1));
        assert_eq!(grid.days()[28].date, date(2024, 2, 29));
        assert_eq!(grid.range(), (date(2024, 2, 1), date(2024, 2, 29)));

        assert_eq!(MonthGrid::build(date(2023, 2, 10), &[], date(2023, 2, 10)).days().len(), 28);
        assert_eq!(MonthGrid::build(date(1900, 2, 10), &[], date(1900, 2, 10)).days().len(), 28);
        assert_eq!(MonthGrid::build(date(2000, 2, 10), &[], date(2000, 2, 10)).days().len(), 29);
    }

    #[test]
    fn tasks_land_on_their_due_day_only() {
        let tasks = vec![task("a", Some(date(2024, 3, 5)))];
        let grid = MonthGrid::build(date(2024, 3, 20), &tasks, date(2024, 1, 1));

        for day in grid.days() {
            if day.date == date(2024, 3, 5) {
                assert_eq!(ids(day), vec!["a"]);
            } else {
                assert!(day.tasks.is_empty(), "{} should be empty", day.date);
            }
        }
    }

    #[test]
    fn buckets_keep_the_input_order_and_skip_undated_tasks() {
        let tasks = vec![
            task("late", Some(date(2024, 3, 12))),
            task("undated", None),
            task("other-month", Some(date(2024, 4, 12))),
            task("early", Some(date(2024, 3, 12))),
            task("first", Some(date(2024, 3, 1))),
            task("last", Some(date(2024, 3, 31))),
        ];
        let grid = MonthGrid::build(date(2024, 3, 1), &tasks, date(2024, 1, 1));

        assert_eq!(ids(grid.day(date(2024, 3, 12)).unwrap()), vec!["late", "early"]);
        assert_eq!(ids(grid.day(date(2024, 3, 1)).unwrap()), vec!["first"]);
        assert_eq!(ids(grid.day(date(2024, 3, 31)).unwrap()), vec!["last"]);
        assert!(grid.day(date(2024, 4, 12)).is_none());

        let shown: usize = grid.days().iter().map(|d| d.tasks.len()).sum();
        assert_eq!(shown, 4);
        assert!(grid.days().iter().flat_map(|d| d.tasks.iter()).all(|t| t.due_date().is_some()));
    }

    #[test]
    fn today_is_flagged() {
        let grid = MonthGrid::build(date(2024, 3, 1), &[], date(2024, 3, 14));
        let flagged: Vec<NaiveDate> = grid.days().iter().filter(|d| d.is_today).map(|d| d.date).collect();
        assert_eq!(flagged, vec![date(2024, 3, 14)]);

        let other_month = MonthGrid::build(date(2024, 4, 1), &[], date(2024, 3, 14));
        assert!(other_month.days().iter().all(|d| d.is_today == false));
    }

    #[test]
    fn previous_from_the_31st_does_not_skip_february() {
        let mut cursor = CalendarCursor::new(date(2024, 3, 31));
        cursor.previous();
        assert_eq!(cursor.reference(), date(2024, 2, 29));
        assert_eq!(cursor.label(), "February 2024");

        let grid = MonthGrid::build(cursor.reference(), &[], date(2024, 1, 1));
        assert_eq!(grid.days()[0].date, date(2024, 2, 1));
        assert_eq!(grid.days().len(), 29);

        let mut cursor = CalendarCursor::new(date(2023, 3, 31));
        cursor.previous();
        assert_eq!(cursor.reference(), date(2023, 2, 28));
    }

    #[test]
    fn navigation_across_years() {
        let mut cursor = CalendarCursor::new(date(2023, 12, 31));
        cursor.next();
        assert_eq!(cursor.label(), "January 2024");
        cursor.next();
        assert_eq!(cursor.reference(), date(2024, 2, 29));
        cursor.shift(-2);
        assert_eq!(cursor.label(), "December 2023");
        cursor.shift(13);
        assert_eq!(cursor.label(), "January 2025");

        assert_eq!(Month::new(2024, 1).unwrap().previous(), Month::new(2023, 12).unwrap());
        assert_eq!(Month::new(2024, 12).unwrap().next(), Month::new(2025, 1).unwrap());
        assert!(Month::new(2024, 13).is_none());
    }

    #[test]
    fn weeks_are_aligned_on_sundays() {
        // March 1st, 2024 is a Friday
        let grid = MonthGrid::build(date(2024, 3, 1), &[], date(2024, 1, 1));
        assert_eq!(grid.leading_blank_days(), 5);

        let weeks = grid.weeks();
        assert_eq!(weeks.len(), 6);
        assert!(weeks[0][..5].iter().all(Option::is_none));
        assert_eq!(weeks[0][5].map(|d| d.date), Some(date(2024, 3, 1)));
        assert_eq!(weeks[5][0].map(|d| d.date), Some(date(2024, 3, 31)));
        assert!(weeks[5][1..].iter().all(Option::is_none));

        let cells: usize = weeks.iter().map(|w| w.iter().filter(|c| c.is_some()).count()).sum();
        assert_eq!(cells, 31);
    }

    #[test]
    fn due_filter_covers_the_month() {
        assert_eq!(Month::new(2024, 2).unwrap().due_filter(), TaskFilter::DueBetween {
            start: date(2024, 2, 1),
            end: date(2024, 2, 29),
        });
    }
}
