//! Select author page: author and author action.

use sinoscript_core::error::PortalError;
use sinoscript_core::navigation::Route;
use sinoscript_core::reference::{AuthorRecord, ReferenceSource};
use sinoscript_core::session::{DraftSession, WorkflowAction, WorkflowField};

use crate::flow::validation::{Selection, ValidationReport, validate_author_selection};
use crate::flow::{
    ChangeOutcome, DependentResource, FetchTicket, FlowContext, FlowError, Step, change_workflow,
    enter_page,
};
use crate::pages::{advance, load_session, retreat, upstream_report};

pub struct SelectAuthorPage {
    session_id: String,
    authors: DependentResource<(), Vec<AuthorRecord>>,
}

impl SelectAuthorPage {
    pub fn open(ctx: &mut FlowContext<'_>) -> Result<Self, FlowError> {
        let session = enter_page(ctx)?;
        Ok(Self {
            session_id: session.id,
            authors: DependentResource::new("Authors"),
        })
    }

    pub fn session(&self, ctx: &mut FlowContext<'_>) -> Result<DraftSession, FlowError> {
        load_session(ctx, &self.session_id)
    }

    pub fn authors(&self) -> &DependentResource<(), Vec<AuthorRecord>> {
        &self.authors
    }

    pub fn choose_author(
        &mut self,
        ctx: &mut FlowContext<'_>,
        author_id: Option<&str>,
    ) -> Result<ChangeOutcome, FlowError> {
        change_workflow(
            ctx,
            &self.session_id,
            WorkflowField::AuthorId,
            author_id.map(str::to_string),
        )
    }

    /// Sets the author action. `edit` is unavailable until an author is chosen.
    pub fn choose_author_action(
        &mut self,
        ctx: &mut FlowContext<'_>,
        action: WorkflowAction,
    ) -> Result<ChangeOutcome, FlowError> {
        let session = self.session(ctx)?;
        if action == WorkflowAction::Edit && session.author_id.is_none() {
            return Err(FlowError::unavailable("an author must be selected to edit it"));
        }
        change_workflow(
            ctx,
            &self.session_id,
            WorkflowField::AuthorAction,
            Some(action.to_string()),
        )
    }

    pub fn request_authors(&mut self) -> FetchTicket<()> {
        self.authors.begin(())
    }

    pub fn receive_authors(
        &mut self,
        ticket: FetchTicket<()>,
        result: Result<Vec<AuthorRecord>, PortalError>,
    ) -> bool {
        self.authors.complete(ticket, result)
    }

    pub async fn refresh(&mut self, source: &dyn ReferenceSource) {
        let ticket = self.request_authors();
        let authors = source.authors().await;
        self.receive_authors(ticket, authors);
    }

    pub fn validate(&self, ctx: &mut FlowContext<'_>) -> Result<ValidationReport, FlowError> {
        let session = self.session(ctx)?;
        let mut report = upstream_report(Step::SelectAuthor, &session);
        for error in validate_author_selection(&Selection::author_of(&session)).errors {
            if !report.has_error(&error.field) {
                report.errors.push(error);
            }
        }
        Ok(report)
    }

    pub fn next(&self, ctx: &mut FlowContext<'_>) -> Result<Route, FlowError> {
        let report = self.validate(ctx)?;
        let session = self.session(ctx)?;
        advance(ctx, Step::SelectAuthor, &session, report)
    }

    pub fn back(&self, ctx: &mut FlowContext<'_>) -> Result<Route, FlowError> {
        let session = self.session(ctx)?;
        Ok(retreat(ctx, Step::SelectAuthor, &session))
    }
}
