//! Some utility functions

use crate::task::{ReminderType, Task};

/// A debug utility that pretty-prints a task list
pub fn print_task_list(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("    (no tasks)");
    }
    for task in tasks {
        print_task(task);
    }
}

pub fn print_task(task: &Task) {
    println!("    {}", describe_task(task));
}

/// One line per task, e.g. `✓ Walk the dog  (push at 2024-05-01 10:00 UTC)  t1`
pub fn describe_task(task: &Task) -> String {
    let completion = if task.completed() { "✓" } else { " " };
    let reminder = match (task.reminder_at(), task.effective_reminder_type()) {
        (Some(at), Some(ReminderType::Email)) => format!("  (email at {})", at.format("%Y-%m-%d %H:%M UTC")),
        (Some(at), _) => format!("  (push at {})", at.format("%Y-%m-%d %H:%M UTC")),
        (None, _) => String::new(),
    };
    format!("{} {}{}\t{}", completion, task.text(), reminder, task.id())
}
