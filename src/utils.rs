//! Some utility functions to render tasks in a terminal

use chrono::NaiveDate;

use crate::task::{Priority, Task, TaskColor, TaskStatus};

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const RED: &str = "\x1b[31m";
const DIM: &str = "\x1b[2m";


/// Whether to use ANSI colors, and how
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    enabled: bool,
}

impl Palette {
    pub fn colored() -> Self { Self { enabled: true } }
    pub fn plain() -> Self { Self { enabled: false } }

    /// A small dot in the task color
    pub fn dot(&self, color: &TaskColor) -> String {
        self.foreground(color, "●")
    }

    /// Some text, written on a light tint of the task color
    pub fn chip(&self, color: &TaskColor, text: &str) -> String {
        if !self.enabled {
            return format!("[{}]", text);
        }
        let (r, g, b) = tint(color.rgb(), 0.2);
        format!("\x1b[48;2;{};{};{}m\x1b[30m{}{}", r, g, b, text, RESET)
    }

    pub fn foreground(&self, color: &TaskColor, text: &str) -> String {
        if !self.enabled {
            return text.to_string();
        }
        let (r, g, b) = color.rgb();
        format!("\x1b[38;2;{};{};{}m{}{}", r, g, b, text, RESET)
    }

    pub fn bold(&self, text: &str) -> String {
        self.wrap(BOLD, text)
    }

    pub fn muted(&self, text: &str) -> String {
        self.wrap(DIM, text)
    }

    pub fn error(&self, text: &str) -> String {
        self.wrap(RED, text)
    }

    fn wrap(&self, code: &str, text: &str) -> String {
        if self.enabled {
            format!("{}{}{}", code, text, RESET)
        } else {
            text.to_string()
        }
    }
}

/// Blend a color over a white background, `alpha` being the opacity of the color
fn tint((r, g, b): (u8, u8, u8), alpha: f64) -> (u8, u8, u8) {
    let blend = |c: u8| (f64::from(c) * alpha + 255.0 * (1.0 - alpha)).round() as u8;
    (blend(r), blend(g), blend(b))
}


/// e.g. "3/5/2024", or "No due date"
pub fn format_due_date(due: Option<NaiveDate>) -> String {
    match due {
        None => "No due date".to_string(),
        Some(date) => date.format("%-m/%-d/%Y").to_string(),
    }
}

pub fn status_checkbox(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Completed => "[x]",
        TaskStatus::InProgress => "[~]",
        TaskStatus::Pending => "[ ]",
    }
}

pub fn priority_badge(palette: &Palette, priority: Priority) -> String {
    let label = format!("({})", priority);
    match priority {
        Priority::High => palette.error(&label),
        Priority::Medium => palette.bold(&label),
        Priority::Low => palette.muted(&label),
    }
}

/// One line describing a task
pub fn task_line(palette: &Palette, task: &Task) -> String {
    format!("{} {} {} {} {}  {}",
        status_checkbox(task.status()),
        palette.dot(task.color()),
        task.title(),
        priority_badge(palette, task.priority()),
        palette.muted(&format!("Due: {}", format_due_date(task.due_date()))),
        palette.muted(task.id().as_str()),
    )
}

/// Cut a text to at most `width` characters, marking the cut with an ellipsis
pub fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut cut: String = text.chars().take(width - 1).collect();
    cut.push('…');
    cut
}

/// Pad a text with spaces on the right, up to `width` characters
pub fn pad(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        text.to_string()
    } else {
        format!("{}{}", text, " ".repeat(width - len))
    }
}
