use crate::context::{CliError, Context};
use asistencia_core::{AuthProvider, DashboardView};

pub fn login(ctx: &Context<'_>, email: &str) -> Result<(), CliError> {
    let user = ctx.session.sign_in(email)?;
    ctx.render(&user, || println!("Sesión iniciada como {}", user.email))
}

pub fn logout(ctx: &Context<'_>) -> Result<(), CliError> {
    let route = DashboardView::new().logout(&ctx.session);
    ctx.render(&route, || println!("Sesión cerrada."))
}

pub fn whoami(ctx: &Context<'_>) -> Result<(), CliError> {
    let user = ctx.session.current_user()?;
    ctx.render(&user, || match &user {
        Some(user) => println!("{} ({})", user.email, user.id),
        None => println!("Sin sesión."),
    })
}
