use anyhow::Result;
use colored::Colorize;

use sinoscript_application::pages::sessions;
use sinoscript_application::{FlowError, Portal};
use sinoscript_core::navigation::{Navigator, Route};
use sinoscript_core::prompt::ConfirmationPrompt;

use super::{authorize, print_report};

pub async fn list(portal: &mut Portal) -> Result<()> {
    authorize(portal, Route::Sessions).await?;

    let summaries = sessions::list(&mut portal.store);
    if summaries.is_empty() {
        println!("No draft sessions. Start one with `sinoscript sessions new`.");
        return Ok(());
    }

    let active = portal.navigator.current().params.session_id;
    for summary in summaries {
        let marker = if active.as_deref() == Some(summary.id.as_str()) {
            "*".green().bold()
        } else {
            " ".normal()
        };
        println!(
            "{} {}  {}",
            marker,
            summary.name.bold(),
            summary.id.dimmed()
        );
        println!(
            "    step {}/4 {} · {} field(s) · updated {}",
            summary.progress.number(),
            summary.progress.descriptor().title,
            summary.field_count,
            summary.updated_at.format("%Y-%m-%d %H:%M")
        );
    }
    Ok(())
}

pub async fn new(portal: &mut Portal, prompt: &dyn ConfirmationPrompt) -> Result<()> {
    authorize(portal, Route::Sessions).await?;

    let mut ctx = portal.context(prompt);
    let id = sessions::start_new(&mut ctx)?;
    println!("{} Started session {}", "✓".green(), id.bold());
    Ok(())
}

pub async fn resume(portal: &mut Portal, prompt: &dyn ConfirmationPrompt, id: &str) -> Result<()> {
    authorize(portal, Route::Sessions).await?;

    let mut ctx = portal.context(prompt);
    sessions::resume(&mut ctx, id)?;
    println!("{} Resumed {}", "✓".green(), id.bold());
    Ok(())
}

pub async fn rename(
    portal: &mut Portal,
    prompt: &dyn ConfirmationPrompt,
    id: &str,
    name: &str,
) -> Result<()> {
    authorize(portal, Route::Sessions).await?;

    let mut ctx = portal.context(prompt);
    match sessions::rename(&mut ctx, id, name) {
        Ok(()) => {
            println!("{} Renamed to {}", "✓".green(), name.trim().bold());
            Ok(())
        }
        Err(FlowError::ValidationBlocked(report)) => {
            print_report(&report);
            anyhow::bail!("Invalid session name")
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn delete(portal: &mut Portal, prompt: &dyn ConfirmationPrompt, id: &str) -> Result<()> {
    authorize(portal, Route::Sessions).await?;

    let mut ctx = portal.context(prompt);
    if sessions::delete(&mut ctx, id)? {
        println!("{} Deleted {}", "✓".green(), id);
    } else {
        println!("Kept {}", id);
    }
    Ok(())
}
