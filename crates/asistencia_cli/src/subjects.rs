use crate::context::{finish, CliError, Context};
use asistencia_core::{delete_prompt, DashboardView};
use clap::Subcommand;
use std::io::{BufRead, Write};

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List subjects
    List,
    /// Add a new subject
    Add { name: String },
    /// Delete a subject and all its data
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Show one subject
    Show { id: String },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Self::List => "subjects.list",
            Self::Add { .. } => "subjects.add",
            Self::Delete { .. } => "subjects.delete",
            Self::Show { .. } => "subjects.show",
        }
    }
}

pub fn handle(ctx: &Context<'_>, cmd: &Command) -> Result<(), CliError> {
    match cmd {
        Command::List => {
            let mut view = DashboardView::loaded(&ctx.session, &ctx.subjects);
            let notices = view.take_notices();
            ctx.render(&view.subjects(), || {
                if let Some(placeholder) = view.empty_message() {
                    println!("{placeholder}");
                }
                for subject in view.subjects() {
                    println!("{}  {}", subject.id, subject.name);
                }
            })?;
            finish(notices)
        }
        Command::Add { name } => {
            let mut view = DashboardView::new();
            let created = view.add_subject(&ctx.session, &ctx.subjects, name);
            if let Some(subject) = &created {
                ctx.render(subject, || {})?;
            }
            finish(view.take_notices())?;
            created.map(|_| ()).ok_or(CliError::Reported)
        }
        Command::Delete { id, yes } => {
            let subject = ctx.owned_subject(id)?;
            let confirmed = *yes || confirm(&delete_prompt(&subject))?;
            if !confirmed {
                println!("Cancelado.");
                return Ok(());
            }
            let mut view = DashboardView::new();
            view.delete_subject(&ctx.session, &ctx.subjects, subject.id, true);
            finish(view.take_notices())
        }
        Command::Show { id } => {
            let subject = ctx.owned_subject(id)?;
            ctx.render(&subject, || println!("{}  {}", subject.id, subject.name))
        }
    }
}

fn confirm(prompt: &str) -> Result<bool, CliError> {
    print!("{prompt} [s/N] ");
    std::io::stdout()
        .flush()
        .map_err(|err| CliError::Usage(err.to_string()))?;
    let mut answer = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut answer)
        .map_err(|err| CliError::Usage(err.to_string()))?;
    Ok(matches!(
        answer.trim().to_lowercase().as_str(),
        "s" | "si" | "sí" | "y" | "yes"
    ))
}
