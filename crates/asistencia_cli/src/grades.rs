use crate::context::{finish, parse_id, CliError, Context};
use asistencia_core::{GradeAverage, GradeCalculatorView, GradeEntry};
use clap::Subcommand;
use serde::Serialize;

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List grades and the weighted average
    List { subject: String },
    /// Add a grade (score 0-10, weight in percent)
    Add {
        subject: String,
        label: String,
        score: f64,
        weight: f64,
    },
    /// Remove a grade
    Remove { subject: String, id: String },
}

#[derive(Serialize)]
struct GradesOutput<'a> {
    grades: &'a [GradeEntry],
    average: GradeAverage,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Self::List { .. } => "grades.list",
            Self::Add { .. } => "grades.add",
            Self::Remove { .. } => "grades.remove",
        }
    }
}

pub fn handle(ctx: &Context<'_>, cmd: &Command) -> Result<(), CliError> {
    match cmd {
        Command::List { subject } => {
            let subject = ctx.owned_subject(subject)?;
            let mut view = GradeCalculatorView::load(&ctx.session, &ctx.grades, subject.id);
            print_grades(ctx, &view)?;
            finish(view.take_notices())
        }
        Command::Add {
            subject,
            label,
            score,
            weight,
        } => {
            let subject = ctx.owned_subject(subject)?;
            let mut view = GradeCalculatorView::load(&ctx.session, &ctx.grades, subject.id);
            let added = view.add(&ctx.session, &ctx.grades, label, *score, *weight);
            if added.is_some() {
                print_grades(ctx, &view)?;
            }
            finish(view.take_notices())?;
            added.map(|_| ()).ok_or(CliError::Reported)
        }
        Command::Remove { subject, id } => {
            let subject = ctx.owned_subject(subject)?;
            let grade_id = parse_id(id)?;
            let mut view = GradeCalculatorView::load(&ctx.session, &ctx.grades, subject.id);
            view.remove(&ctx.session, &ctx.grades, grade_id);
            finish(view.take_notices())
        }
    }
}

fn print_grades(ctx: &Context<'_>, view: &GradeCalculatorView) -> Result<(), CliError> {
    let output = GradesOutput {
        grades: view.grades(),
        average: view.average(),
    };
    ctx.render(&output, || {
        for grade in output.grades {
            println!(
                "{}  {}  {:.2}  ({:.0}%)",
                grade.id, grade.label, grade.score, grade.weight
            );
        }
        match output.average.weighted_average {
            Some(average) => println!(
                "Media ponderada: {average:.2} sobre {:.0}% evaluado",
                output.average.total_weight
            ),
            None => println!("Sin notas."),
        }
    })
}
