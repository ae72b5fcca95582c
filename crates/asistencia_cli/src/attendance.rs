use crate::context::{finish, CliError, Context};
use asistencia_core::{
    format_date, parse_date, parse_month_key, AttendanceCalendar, CalendarSnapshot, ToggleOutcome,
};
use chrono::Local;
use clap::Subcommand;

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Show the marks of one month (current month by default)
    Month {
        subject: String,
        /// Month as YYYY-MM
        month: Option<String>,
    },
    /// Cycle a day: unmarked -> presente -> ausente -> unmarked
    Toggle {
        subject: String,
        /// Day as YYYY-MM-DD
        date: String,
    },
    /// Show all-time totals
    Summary { subject: String },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Month { .. } => "attendance.month",
            Self::Toggle { .. } => "attendance.toggle",
            Self::Summary { .. } => "attendance.summary",
        }
    }
}

pub fn handle(ctx: &Context<'_>, cmd: &Command) -> Result<(), CliError> {
    match cmd {
        Command::Month { subject, month } => {
            let subject = ctx.owned_subject(subject)?;
            let anchor = match month {
                Some(raw) => {
                    parse_month_key(raw).map_err(|err| CliError::Usage(err.to_string()))?
                }
                None => Local::now().date_naive(),
            };
            let mut calendar =
                AttendanceCalendar::open(&ctx.attendance, &ctx.session, subject.id, anchor);
            let snapshot = calendar.snapshot();
            ctx.render(&snapshot, || print_month(&snapshot))?;
            finish(calendar.take_notices())
        }
        Command::Toggle { subject, date } => {
            let subject = ctx.owned_subject(subject)?;
            let date = parse_date(date).map_err(|err| CliError::Usage(err.to_string()))?;
            let mut calendar =
                AttendanceCalendar::open(&ctx.attendance, &ctx.session, subject.id, date);
            let outcome = calendar.click_day(&ctx.attendance, &ctx.session, date);
            if let ToggleOutcome::Saved(status) = outcome {
                let snapshot = calendar.snapshot();
                ctx.render(&snapshot, || {
                    let label = status.map_or("sin marcar", |status| status.as_str());
                    println!("{date}: {label}");
                    print_summary(&snapshot);
                })?;
            }
            finish(calendar.take_notices())
        }
        Command::Summary { subject } => {
            let subject = ctx.owned_subject(subject)?;
            let mut calendar = AttendanceCalendar::open(
                &ctx.attendance,
                &ctx.session,
                subject.id,
                Local::now().date_naive(),
            );
            let summary = calendar.summary();
            let snapshot = calendar.snapshot();
            ctx.render(&summary, || print_summary(&snapshot))?;
            finish(calendar.take_notices())
        }
    }
}

fn print_month(snapshot: &CalendarSnapshot) {
    println!("{}", snapshot.month);
    for mark in &snapshot.marks {
        println!("{}  {}", format_date(mark.date), mark.status.as_str());
    }
    print_summary(snapshot);
}

fn print_summary(snapshot: &CalendarSnapshot) {
    println!(
        "Presente: {}  Ausente: {}  Asistencia: {:.1}%",
        snapshot.summary.presente, snapshot.summary.ausente, snapshot.percentage
    );
}
