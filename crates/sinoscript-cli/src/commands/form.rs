//! The four form steps.

use anyhow::{Result, anyhow};
use clap::Args;
use colored::Colorize;

use sinoscript_application::Portal;
use sinoscript_application::flow::{DependentResource, FetchStatus, FieldSpec};
use sinoscript_application::pages::{DetailKind, DetailPage, SelectAuthorPage, SelectTextPage};
use sinoscript_core::navigation::Route;
use sinoscript_core::prompt::ConfirmationPrompt;
use sinoscript_core::reference::LocalizedName;
use sinoscript_core::session::WorkflowAction;

use super::{enter, finish_move, print_change, print_report};

#[derive(Args)]
pub struct SelectTextArgs {
    /// Rename the session
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    region: Option<String>,
    /// Text id, from `--list`
    #[arg(long)]
    text: Option<String>,
    /// `edit` or `create`
    #[arg(long)]
    action: Option<WorkflowAction>,
    /// List regions and the region's texts
    #[arg(long)]
    list: bool,
    #[command(flatten)]
    moves: MoveArgs,
}

#[derive(Args)]
pub struct SelectAuthorArgs {
    /// Author id, from `--list`
    #[arg(long)]
    author: Option<String>,
    /// `edit` or `create`
    #[arg(long)]
    action: Option<WorkflowAction>,
    /// List authors
    #[arg(long)]
    list: bool,
    #[command(flatten)]
    moves: MoveArgs,
}

#[derive(Args)]
pub struct DetailArgs {
    /// Set a field, as `key=value`
    #[arg(long = "set", value_name = "KEY=VALUE")]
    set: Vec<String>,
    /// Restore a field to the edited record's value
    #[arg(long = "reset", value_name = "KEY")]
    reset: Vec<String>,
    #[command(flatten)]
    moves: MoveArgs,
}

#[derive(Args)]
struct MoveArgs {
    /// Continue to the next step
    #[arg(long, conflicts_with = "back")]
    next: bool,
    /// Return to the previous step
    #[arg(long)]
    back: bool,
}

#[derive(Clone, Copy)]
pub enum Detail {
    Text,
    Author,
}

impl Detail {
    fn kind(self) -> DetailKind {
        match self {
            Detail::Text => DetailKind::Text,
            Detail::Author => DetailKind::Author,
        }
    }

    fn route(self) -> Route {
        match self {
            Detail::Text => Route::TextInfo,
            Detail::Author => Route::AuthorInfo,
        }
    }
}

pub async fn select_text(
    portal: &mut Portal,
    prompt: &dyn ConfirmationPrompt,
    args: SelectTextArgs,
) -> Result<()> {
    enter(portal, Route::SelectText).await?;
    let source = portal.source.clone();
    let mut ctx = portal.context(prompt);
    let mut page = SelectTextPage::open(&mut ctx)?;

    if let Some(name) = &args.name {
        page.set_session_name(&mut ctx, name)?;
    }
    if let Some(region) = &args.region {
        print_change("region", &page.choose_region(&mut ctx, region)?);
    }
    if let Some(text) = &args.text {
        print_change("text", &page.choose_text(&mut ctx, Some(text.as_str()))?);
    }
    if let Some(action) = args.action {
        print_change("text action", &page.choose_text_action(&mut ctx, action)?);
    }

    let session = page.session(&mut ctx)?;
    println!(
        "{} {}",
        "Session:".bold(),
        page.session_name(&session)
    );
    if args.list {
        page.refresh(&mut ctx, source.as_ref()).await?;
        print_listing("Regions", page.regions(), |r| r.name.clone());
        print_listing("Texts", page.texts(), |t| {
            format!("{}  {}", t.id.dimmed(), display_name(&t.name))
        });
    }

    if args.moves.next {
        return finish_move(page.next(&mut ctx));
    }
    if args.moves.back {
        return finish_move(page.back(&mut ctx));
    }
    print_report(&page.validate(&mut ctx)?);
    Ok(())
}

pub async fn select_author(
    portal: &mut Portal,
    prompt: &dyn ConfirmationPrompt,
    args: SelectAuthorArgs,
) -> Result<()> {
    enter(portal, Route::SelectAuthor).await?;
    let source = portal.source.clone();
    let mut ctx = portal.context(prompt);
    let mut page = SelectAuthorPage::open(&mut ctx)?;

    if let Some(author) = &args.author {
        print_change("author", &page.choose_author(&mut ctx, Some(author.as_str()))?);
    }
    if let Some(action) = args.action {
        print_change("author action", &page.choose_author_action(&mut ctx, action)?);
    }

    if args.list {
        page.refresh(source.as_ref()).await;
        print_listing("Authors", page.authors(), |a| {
            format!("{}  {}", a.id.dimmed(), display_name(&a.name))
        });
    }

    if args.moves.next {
        return finish_move(page.next(&mut ctx));
    }
    if args.moves.back {
        return finish_move(page.back(&mut ctx));
    }
    print_report(&page.validate(&mut ctx)?);
    Ok(())
}

pub async fn detail(
    portal: &mut Portal,
    prompt: &dyn ConfirmationPrompt,
    which: Detail,
    args: DetailArgs,
) -> Result<()> {
    enter(portal, which.route()).await?;
    let source = portal.source.clone();
    let mut ctx = portal.context(prompt);
    let mut page = DetailPage::open(which.kind(), &mut ctx)?;

    if page.load_original(&mut ctx, source.as_ref()).await? {
        println!("{}", "Pre-filled from the catalogue record".dimmed());
    }
    for key in &args.reset {
        page.reset_field(&mut ctx, key)?;
    }
    for assignment in &args.set {
        let (key, value) = assignment
            .split_once('=')
            .ok_or_else(|| anyhow!("Expected KEY=VALUE, got '{}'", assignment))?;
        page.edit_field(&mut ctx, key.trim(), value)?;
    }

    let session = page.session(&mut ctx)?;
    for spec in page.fields() {
        print_field(spec, page.value(&session, spec.key));
    }

    if args.moves.next {
        return finish_move(page.next(&mut ctx));
    }
    if args.moves.back {
        return finish_move(page.back(&mut ctx));
    }
    print_report(&page.validate(&mut ctx)?);
    Ok(())
}

fn print_field(spec: &FieldSpec, value: Option<String>) {
    let marker = if spec.required { "*" } else { " " };
    let shown = match value {
        Some(v) if !v.trim().is_empty() => v.normal(),
        _ => "-".dimmed(),
    };
    println!(
        "{}{:<24} {}  {}",
        marker.red(),
        spec.label,
        shown,
        spec.key.dimmed()
    );
}

fn print_listing<K: Clone + PartialEq + std::fmt::Debug, T>(
    title: &str,
    resource: &DependentResource<K, Vec<T>>,
    line: impl Fn(&T) -> String,
) {
    println!("{}", title.bold());
    match resource.status() {
        FetchStatus::Idle => println!("  {}", "(nothing to load yet)".dimmed()),
        FetchStatus::Loading => println!("  {}", "loading...".dimmed()),
        FetchStatus::Degraded(reason) => println!("  {} {}", "unavailable:".yellow(), reason),
        FetchStatus::Ready if resource.value().is_empty() => {
            println!("  {}", "(none)".dimmed())
        }
        FetchStatus::Ready => {
            for item in resource.value() {
                println!("  {}", line(item));
            }
        }
    }
}

fn display_name(name: &LocalizedName) -> String {
    match &name.original {
        Some(original) => format!("{} ({})", name.english, original),
        None => name.english.clone(),
    }
}
