use std::io::{self, IsTerminal, Write};

use anyhow::anyhow;
use chrono::NaiveDate;
use unicode_width::UnicodeWidthStr;

use crate::config::Config;
use crate::task::Task;
use crate::views::{CategoryCounts, PriorityCounts, StatusCounts, WeekHistogram};

const WEEKDAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
const BAR_WIDTH: usize = 30;

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        let color_cfg = cfg.get("color").unwrap_or_else(|| "on".to_string());
        let color = match color_cfg.to_ascii_lowercase().as_str() {
            "on" | "yes" | "true" | "1" => true,
            "off" | "no" | "false" | "0" => false,
            other => return Err(anyhow!("invalid color setting: {other}")),
        };

        Ok(Self { color })
    }

    #[tracing::instrument(skip(self, tasks, today))]
    pub fn print_task_table(&mut self, tasks: &[Task], today: NaiveDate) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();

        let headers = vec![
            "ID".to_string(),
            "Title".to_string(),
            "Due".to_string(),
            "Time".to_string(),
            "Category".to_string(),
            "Pri".to_string(),
            "Status".to_string(),
            "%".to_string(),
        ];

        let today = today.format("%Y-%m-%d").to_string();
        let mut rows = Vec::with_capacity(tasks.len());

        for task in tasks {
            let id = self.paint(&task.id.to_string(), "33");
            // ISO dates compare lexicographically.
            let due = if task.date < today {
                self.paint(&task.date, "31")
            } else {
                task.date.clone()
            };

            rows.push(vec![
                id,
                task.title.clone(),
                due,
                task.time.clone(),
                task.category.clone(),
                task.priority.label().to_string(),
                task.status.label().to_string(),
                task.effective_percent().to_string(),
            ]);
        }

        write_table(&mut out, headers, rows)?;
        Ok(())
    }

    #[tracing::instrument(skip(self, task))]
    pub fn print_task_detail(&mut self, task: &Task) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();

        writeln!(out, "id        {}", task.id)?;
        writeln!(out, "title     {}", task.title)?;
        if !task.description.is_empty() {
            writeln!(out, "desc      {}", task.description)?;
        }
        writeln!(out, "date      {}", task.date)?;
        if !task.time.is_empty() {
            writeln!(out, "time      {}", task.time)?;
        }
        writeln!(out, "category  {}", task.category)?;
        writeln!(out, "priority  {}", task.priority.label())?;
        writeln!(out, "status    {}", task.status.label())?;
        writeln!(out, "percent   {}", task.effective_percent())?;

        Ok(())
    }

    #[tracing::instrument(skip_all)]
    pub fn print_summary(
        &mut self,
        counts: &StatusCounts,
        due_today: usize,
        completion: u32,
    ) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();

        writeln!(out, "Total        {}", counts.total())?;
        writeln!(out, "Completed    {}", counts.completed)?;
        writeln!(out, "In Progress  {}", counts.in_progress)?;
        writeln!(out, "Pending      {}", counts.pending)?;
        writeln!(out, "Due today    {}", due_today)?;
        writeln!(out)?;
        writeln!(
            out,
            "Overall completed: {}",
            self.paint(&format!("{completion}%"), "32")
        )?;

        Ok(())
    }

    #[tracing::instrument(skip_all)]
    pub fn print_breakdown(
        &mut self,
        categories: &CategoryCounts,
        priorities: &PriorityCounts,
        statuses: &StatusCounts,
    ) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();

        writeln!(out, "By Category")?;
        writeln!(out, "  Personal     {}", categories.personal)?;
        writeln!(out, "  Study        {}", categories.study)?;
        writeln!(out, "  Health       {}", categories.health)?;
        writeln!(out, "  Other        {}", categories.other)?;
        writeln!(out)?;
        writeln!(out, "By Priority")?;
        writeln!(out, "  Low          {}", priorities.low)?;
        writeln!(out, "  Medium       {}", priorities.medium)?;
        writeln!(out, "  High         {}", priorities.high)?;
        writeln!(out)?;
        writeln!(out, "By Status")?;
        writeln!(out, "  Completed    {}", statuses.completed)?;
        writeln!(out, "  In Progress  {}", statuses.in_progress)?;
        writeln!(out, "  Pending      {}", statuses.pending)?;

        Ok(())
    }

    #[tracing::instrument(skip(self, histogram))]
    pub fn print_week(&mut self, histogram: &WeekHistogram) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();

        for (idx, count) in histogram.counts.iter().enumerate() {
            let width = count * BAR_WIDTH / histogram.max;
            let bar = self.paint(&"#".repeat(width), "36");
            writeln!(out, "{} {:>3}  {}", WEEKDAY_LABELS[idx], count, bar)?;
        }

        Ok(())
    }

    #[tracing::instrument(skip(self, grouped))]
    pub fn print_calendar(&mut self, grouped: &[(&str, Vec<&Task>)]) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();

        if grouped.is_empty() {
            writeln!(out, "No tasks scheduled.")?;
            return Ok(());
        }

        for (date, tasks) in grouped {
            let heading = NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .map(|parsed| parsed.format("%B %-d, %Y").to_string())
                .unwrap_or_else(|_| (*date).to_string());
            writeln!(out, "{}", self.paint(&heading, "1"))?;

            for task in tasks {
                let time = if task.time.is_empty() {
                    String::new()
                } else {
                    format!(" {}", task.time)
                };
                writeln!(out, "  {}{}  [{}]", task.title, time, task.status.label())?;
            }
            writeln!(out)?;
        }

        Ok(())
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color || !io::stdout().is_terminal() {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

fn write_table<W: Write>(
    mut writer: W,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let column_count = headers.len();
    let mut widths = vec![0usize; column_count];

    for (idx, header) in headers.iter().enumerate() {
        widths[idx] = widths[idx].max(UnicodeWidthStr::width(header.as_str()));
    }

    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(strip_ansi(cell).as_str()));
        }
    }

    for idx in 0..column_count {
        write!(writer, "{:width$} ", headers[idx], width = widths[idx])?;
    }
    writeln!(writer)?;

    for idx in 0..column_count {
        write!(writer, "{:-<width$} ", "", width = widths[idx])?;
    }
    writeln!(writer)?;

    for row in rows {
        for idx in 0..column_count {
            let cell = &row[idx];
            let visible_width = UnicodeWidthStr::width(strip_ansi(cell).as_str());
            let padding = widths[idx].saturating_sub(visible_width);
            write!(writer, "{}{} ", cell, " ".repeat(padding))?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}
