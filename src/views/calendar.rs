use chrono::{Local, NaiveDate};

use crate::calendar::{CalendarCursor, MonthGrid, WEEKDAY_LABELS};
use crate::provider::Provider;
use crate::task::Task;
use crate::traits::TaskStore;
use crate::utils::{self, Palette};

use super::{Snapshot, ViewState};

/// Width of a day cell, in characters
const CELL_WIDTH: usize = 14;
/// How many task chips a cell shows before summarizing the rest
const MAX_CHIPS_PER_CELL: usize = 3;

/// A month grid with the tasks that are due on each day
pub struct CalendarView<S> {
    provider: Provider<S>,
    cursor: CalendarCursor,
    today: NaiveDate,
    tasks: Snapshot<Vec<Task>>,
}

impl<S: TaskStore + 'static> CalendarView<S> {
    /// Create the view on the current month and start fetching its tasks
    pub fn mount(provider: Provider<S>) -> Self {
        Self::mount_at(provider, CalendarCursor::today(), Local::now().date_naive())
    }

    /// Create the view on the month of `cursor`
    pub fn mount_at(provider: Provider<S>, cursor: CalendarCursor, today: NaiveDate) -> Self {
        let mut view = Self { provider, cursor, today, tasks: Snapshot::new() };
        view.start_fetch();
        view
    }

    fn start_fetch(&mut self) {
        let provider = self.provider.clone();
        let filter = self.cursor.month().due_filter();
        self.tasks.start(async move { provider.list_tasks(&filter).await });
    }

    /// Wait for the data requested by the last navigation
    pub async fn loaded(&mut self) {
        self.tasks.settle().await;
    }

    pub async fn refresh(&mut self) {
        self.start_fetch();
        self.tasks.settle().await;
    }

    /// Show the previous month
    pub async fn previous(&mut self) {
        self.cursor.previous();
        self.refresh().await;
    }

    /// Show the next month
    pub async fn next(&mut self) {
        self.cursor.next();
        self.refresh().await;
    }

    pub fn cursor(&self) -> &CalendarCursor {
        &self.cursor
    }

    pub fn state(&self) -> &ViewState<Vec<Task>> {
        self.tasks.state()
    }

    /// The grid of the current month, built from the latest snapshot
    pub fn grid(&self) -> Option<MonthGrid<'_>> {
        self.tasks.state().ready()
            .map(|tasks| MonthGrid::build(self.cursor.reference(), tasks, self.today))
    }

    pub fn render(&self, palette: &Palette) -> String {
        let mut out = format!("{}    ←  {}  →\n\n", palette.bold("Calendar"), palette.bold(&self.cursor.label()));

        let grid = match self.grid() {
            Some(g) => g,
            None => {
                if let Some(text) = self.tasks.state().placeholder(palette, "tasks") {
                    out.push_str(&text);
                    out.push('\n');
                }
                return out;
            },
        };

        let header: Vec<String> = WEEKDAY_LABELS.iter().map(|d| utils::pad(d, CELL_WIDTH)).collect();
        out.push_str(&header.join("|"));
        out.push('\n');

        for week in grid.weeks() {
            out.push_str(&"-".repeat((CELL_WIDTH + 1) * 7 - 1));
            out.push('\n');

            // One line for the day numbers, then one line per chip
            let mut lines: Vec<Vec<String>> = vec![Vec::new(); MAX_CHIPS_PER_CELL + 2];
            for cell in week.iter() {
                let mut cell_lines: Vec<String> = Vec::new();
                match cell {
                    None => {},
                    Some(day) => {
                        let number = day.date.format("%-d").to_string();
                        cell_lines.push(if day.is_today { palette.bold(&format!("*{}*", number)) } else { number });
                        for task in day.tasks.iter().take(MAX_CHIPS_PER_CELL) {
                            let title = utils::truncate(task.title(), CELL_WIDTH - 2);
                            cell_lines.push(palette.chip(task.color(), &title));
                        }
                        if day.tasks.len() > MAX_CHIPS_PER_CELL {
                            cell_lines.push(palette.muted(&format!("+{} more", day.tasks.len() - MAX_CHIPS_PER_CELL)));
                        }
                    },
                }
                for (i, line) in lines.iter_mut().enumerate() {
                    line.push(cell_lines.get(i).cloned().unwrap_or_default());
                }
            }

            for line in lines {
                if line.iter().all(String::is_empty) {
                    continue;
                }
                let cells: Vec<String> = line.iter().map(|c| pad_visible(c, CELL_WIDTH)).collect();
                out.push_str(cells.join("|").trim_end());
                out.push('\n');
            }
        }
        out
    }
}

/// Pad a cell that may contain escape codes, counting only the visible characters
fn pad_visible(text: &str, width: usize) -> String {
    let visible = strip_escapes(text).chars().count();
    if visible >= width {
        text.to_string()
    } else {
        format!("{}{}", text, " ".repeat(width - visible))
    }
}

fn strip_escapes(text: &str) -> String {
    let mut out = String::new();
    let mut in_escape = false;
    for c in text.chars() {
        match (in_escape, c) {
            (false, '\x1b') => in_escape = true,
            (true, 'm') => in_escape = false,
            (true, _) => {},
            (false, c) => out.push(c),
        }
    }
    out
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visible_width_ignores_escape_codes() {
        assert_eq!(strip_escapes("\x1b[1m12\x1b[0m"), "12");
        assert_eq!(pad_visible("\x1b[1m12\x1b[0m", 4), "\x1b[1m12\x1b[0m  ");
        assert_eq!(pad_visible("abc", 2), "abc");
    }
}
