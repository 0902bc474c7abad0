use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::task::{Priority, Status, Task};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
}

impl StatusCounts {
    pub fn total(&self) -> usize {
        self.pending + self.in_progress + self.completed
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryCounts {
    pub personal: usize,
    pub study: usize,
    pub health: usize,
    pub other: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PriorityCounts {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekHistogram {
    // Indexed 0=Sunday..6=Saturday.
    pub counts: [usize; 7],
    pub max: usize,
}

pub fn counts_by_status(tasks: &[Task]) -> StatusCounts {
    let mut counts = StatusCounts::default();
    for task in tasks {
        match task.status {
            Status::Pending => counts.pending += 1,
            Status::InProgress => counts.in_progress += 1,
            Status::Completed => counts.completed += 1,
        }
    }
    counts
}

// Anything outside the three named display categories lands in
// `other`, including `uncategorized`.
pub fn counts_by_category(tasks: &[Task]) -> CategoryCounts {
    let mut counts = CategoryCounts::default();
    for task in tasks {
        match task.category.as_str() {
            "personal" => counts.personal += 1,
            "study" => counts.study += 1,
            "health" => counts.health += 1,
            _ => counts.other += 1,
        }
    }
    counts
}

pub fn counts_by_priority(tasks: &[Task]) -> PriorityCounts {
    let mut counts = PriorityCounts::default();
    for task in tasks {
        match task.priority {
            Priority::Low => counts.low += 1,
            Priority::Medium => counts.medium += 1,
            Priority::High => counts.high += 1,
        }
    }
    counts
}

pub fn completion_percentage(tasks: &[Task]) -> u32 {
    if tasks.is_empty() {
        return 0;
    }
    let completed = tasks
        .iter()
        .filter(|task| task.status == Status::Completed)
        .count();
    (completed as f64 / tasks.len() as f64 * 100.0).round() as u32
}

pub fn due_today_count(tasks: &[Task], today: NaiveDate) -> usize {
    let today = today.format(DATE_FORMAT).to_string();
    tasks.iter().filter(|task| task.date == today).count()
}

// Invalid dates are skipped; max has floor 1 so bar scaling never
// divides by zero.
pub fn weekly_distribution(tasks: &[Task]) -> WeekHistogram {
    let mut counts = [0usize; 7];
    for task in tasks {
        if let Ok(date) = NaiveDate::parse_from_str(&task.date, DATE_FORMAT) {
            counts[date.weekday().num_days_from_sunday() as usize] += 1;
        }
    }

    let max = counts.iter().copied().max().unwrap_or(0).max(1);
    WeekHistogram { counts, max }
}

pub fn group_by_date<'a>(tasks: &'a [Task]) -> BTreeMap<&'a str, Vec<&'a Task>> {
    let mut grouped: BTreeMap<&str, Vec<&Task>> = BTreeMap::new();
    for task in tasks {
        grouped.entry(task.date.as_str()).or_default().push(task);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskDraft;

    fn task(id: u64, date: &str) -> Task {
        Task::new_pending(
            id,
            TaskDraft {
                title: format!("task {id}"),
                date: date.to_string(),
                ..TaskDraft::default()
            },
        )
    }

    fn task_with_category(id: u64, category: &str) -> Task {
        let mut task = task(id, "2026-08-03");
        task.category = category.to_string();
        task
    }

    #[test]
    fn status_counts_cover_all_buckets() {
        let mut tasks = vec![task(1, "2026-08-03"), task(2, "2026-08-03"), task(3, "2026-08-03")];
        tasks[1].apply_percent(50);
        tasks[2].apply_percent(100);

        let counts = counts_by_status(&tasks);
        assert_eq!(counts.pending, 1);
        assert_eq!(counts.in_progress, 1);
        assert_eq!(counts.completed, 1);
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn unknown_categories_bucket_into_other() {
        let tasks = vec![
            task_with_category(1, "personal"),
            task_with_category(2, "bogus"),
            task_with_category(3, "uncategorized"),
        ];

        let counts = counts_by_category(&tasks);
        assert_eq!(counts.personal, 1);
        assert_eq!(counts.study, 0);
        assert_eq!(counts.health, 0);
        assert_eq!(counts.other, 2);
    }

    #[test]
    fn completion_percentage_rounds() {
        assert_eq!(completion_percentage(&[]), 0);

        let mut tasks = vec![task(1, "2026-08-03"), task(2, "2026-08-03")];
        tasks[0].apply_percent(100);
        assert_eq!(completion_percentage(&tasks), 50);

        tasks.push(task(3, "2026-08-03"));
        assert_eq!(completion_percentage(&tasks), 33);
    }

    #[test]
    fn due_today_matches_exact_date() {
        let tasks = vec![task(1, "2026-08-03"), task(2, "2026-08-04")];
        let today = NaiveDate::from_ymd_opt(2026, 8, 3).expect("valid date");
        assert_eq!(due_today_count(&tasks, today), 1);
    }

    #[test]
    fn weekly_distribution_buckets_by_weekday() {
        // Three different Mondays.
        let tasks = vec![task(1, "2026-08-03"), task(2, "2026-08-10"), task(3, "2026-08-17")];
        let histogram = weekly_distribution(&tasks);

        assert_eq!(histogram.counts[1], 3);
        let elsewhere: usize = histogram
            .counts
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != 1)
            .map(|(_, count)| count)
            .sum();
        assert_eq!(elsewhere, 0);
        assert_eq!(histogram.max, 3);
    }

    #[test]
    fn weekly_distribution_skips_invalid_dates() {
        let tasks = vec![task(1, "not-a-date"), task(2, "2026-13-40")];
        let histogram = weekly_distribution(&tasks);
        assert_eq!(histogram.counts, [0; 7]);
        assert_eq!(histogram.max, 1);
    }

    #[test]
    fn group_by_date_sorts_keys_ascending() {
        let tasks = vec![task(1, "2026-08-10"), task(2, "2026-08-03"), task(3, "2026-08-10")];
        let grouped = group_by_date(&tasks);

        let dates: Vec<&str> = grouped.keys().copied().collect();
        assert_eq!(dates, vec!["2026-08-03", "2026-08-10"]);
        assert_eq!(grouped["2026-08-10"].len(), 2);
    }
}
