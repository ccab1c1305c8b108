pub mod auth;
pub mod form;
pub mod sessions;
pub mod show;

use anyhow::{Result, anyhow, bail};
use colored::Colorize;

use sinoscript_application::flow::{ChangeOutcome, FlowError, ValidationReport};
use sinoscript_application::pages::RouteGuard;
use sinoscript_application::Portal;
use sinoscript_core::navigation::{Location, NavigationMode, Navigator, Route};

/// Checks sign-in for `route` without moving the stored location.
pub async fn authorize(portal: &Portal, route: Route) -> Result<()> {
    let requested = Location::new(route, portal.navigator.current().params);
    let landed = RouteGuard::new(portal.auth.as_ref()).resolve(requested).await;
    if landed.route == Route::Login {
        bail!("Not signed in. Run `sinoscript login <email>` first.");
    }
    Ok(())
}

/// Moves the stored location onto `route`, keeping the active session.
pub async fn enter(portal: &Portal, route: Route) -> Result<()> {
    authorize(portal, route).await?;

    let current = portal.navigator.current();
    if current.params.session_id.is_none() {
        bail!(
            "No active session. Run `sinoscript sessions new` or `sinoscript sessions resume <id>`."
        );
    }
    if current.route != route {
        portal
            .navigator
            .navigate(Location::new(route, current.params), NavigationMode::Push);
    }
    Ok(())
}

pub fn print_report(report: &ValidationReport) {
    if report.is_valid() {
        println!("{}", "✓ Step is complete".green());
        return;
    }
    println!("{}", "Needs attention:".yellow().bold());
    for error in &report.errors {
        println!("  {} {}: {}", "✗".red(), error.field.bold(), error.message);
    }
}

pub fn print_change(what: &str, outcome: &ChangeOutcome) {
    match outcome {
        ChangeOutcome::Unchanged => println!("{} {} unchanged", "·".dimmed(), what),
        ChangeOutcome::Applied { discarded } if discarded.is_empty() => {
            println!("{} {} set", "✓".green(), what)
        }
        ChangeOutcome::Applied { discarded } => println!(
            "{} {} set, cleared {} dependent value(s)",
            "✓".green(),
            what,
            discarded.fields.len() + discarded.keys.len()
        ),
        ChangeOutcome::Declined => println!("{} {} kept", "·".dimmed(), what),
    }
}

/// Reports a step move. A blocked move prints its report and fails.
pub fn finish_move(result: Result<Route, FlowError>) -> Result<()> {
    match result {
        Ok(route) => {
            println!("{} {}", "→".cyan(), route.path());
            Ok(())
        }
        Err(FlowError::ValidationBlocked(report)) => {
            print_report(&report);
            Err(anyhow!("Cannot continue until the step is complete"))
        }
        Err(e) => Err(e.into()),
    }
}
