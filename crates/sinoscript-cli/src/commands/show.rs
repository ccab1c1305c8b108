use anyhow::Result;
use colored::Colorize;

use sinoscript_application::Portal;
use sinoscript_application::flow::Step;
use sinoscript_core::navigation::Navigator;
use sinoscript_core::session::WorkflowField;

pub fn show(portal: &mut Portal) -> Result<()> {
    let location = portal.navigator.current();
    println!("{} {}", "Location:".bold(), location.href());
    println!(
        "{} {}",
        "Catalogue:".bold(),
        if portal.is_online() { "remote" } else { "offline" }
    );

    let Some(id) = location.params.session_id.as_deref() else {
        println!("No active session.");
        return Ok(());
    };
    let Some(session) = portal.store.get_session(id) else {
        println!("{} {}", "Active session is gone:".yellow(), id);
        return Ok(());
    };

    let furthest = Step::furthest(&session);
    println!();
    println!("{}  {}", session.name.bold(), session.id.dimmed());
    println!(
        "  created {} · updated {} · reachable up to step {} ({})",
        session.created_at.format("%Y-%m-%d %H:%M"),
        session.updated_at.format("%Y-%m-%d %H:%M"),
        furthest.number(),
        furthest.descriptor().title
    );
    for field in WorkflowField::ALL {
        let value = session.workflow_value(field);
        println!(
            "  {:<14} {}",
            field.to_string(),
            value.as_deref().unwrap_or("-").cyan()
        );
    }
    if !session.data.is_empty() {
        println!("  {}", "Data:".bold());
        for (key, value) in session.data.iter() {
            println!("    {:<22} {}", key, value);
        }
    }
    Ok(())
}
