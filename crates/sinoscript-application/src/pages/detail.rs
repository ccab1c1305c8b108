//! Text info and author info pages.

use std::collections::BTreeMap;

use sinoscript_core::error::PortalError;
use sinoscript_core::navigation::Route;
use sinoscript_core::reference::ReferenceSource;
use sinoscript_core::session::{DataBag, DraftSession, FieldValue, WorkflowAction};

use crate::flow::fields::{AUTHOR_FIELDS, TEXT_FIELDS, author_prefill, find_field, text_prefill};
use crate::flow::validation::{Selection, ValidationReport, validate_fields};
use crate::flow::{
    DependentResource, FetchTicket, FieldSpec, FlowContext, FlowError, Step, enter_page,
};
use crate::pages::{advance, load_session, retreat, upstream_report};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailKind {
    Text,
    Author,
}

impl DetailKind {
    pub fn fields(&self) -> &'static [FieldSpec] {
        match self {
            DetailKind::Text => TEXT_FIELDS,
            DetailKind::Author => AUTHOR_FIELDS,
        }
    }

    pub fn step(&self) -> Step {
        match self {
            DetailKind::Text => Step::TextInfo,
            DetailKind::Author => Step::AuthorInfo,
        }
    }

    /// Id of the record being edited, when the session is in edit mode.
    pub fn editing(&self, session: &DraftSession) -> Option<String> {
        let (action, id) = match self {
            DetailKind::Text => (session.text_action, &session.text_id),
            DetailKind::Author => (session.author_action, &session.author_id),
        };
        match action {
            Some(WorkflowAction::Edit) => id.clone(),
            _ => None,
        }
    }
}

/// A detail field group.
///
/// Raw input is kept locally and wins over the saved value for display and
/// validation. Every edit is also saved: parsed when it parses, as text
/// otherwise.
pub struct DetailPage {
    kind: DetailKind,
    session_id: String,
    local: BTreeMap<String, String>,
    /// Field values of the record being edited, keyed by its id.
    original: DependentResource<String, Option<DataBag>>,
}

impl DetailPage {
    pub fn open(kind: DetailKind, ctx: &mut FlowContext<'_>) -> Result<Self, FlowError> {
        let session = enter_page(ctx)?;
        Ok(Self {
            kind,
            session_id: session.id,
            local: BTreeMap::new(),
            original: DependentResource::new(match kind {
                DetailKind::Text => "TextDetails",
                DetailKind::Author => "AuthorDetails",
            }),
        })
    }

    pub fn kind(&self) -> DetailKind {
        self.kind
    }

    pub fn fields(&self) -> &'static [FieldSpec] {
        self.kind.fields()
    }

    pub fn session(&self, ctx: &mut FlowContext<'_>) -> Result<DraftSession, FlowError> {
        load_session(ctx, &self.session_id)
    }

    fn spec(&self, key: &str) -> Result<FieldSpec, FlowError> {
        find_field(self.fields(), key).ok_or_else(|| FlowError::UnknownField(key.to_string()))
    }

    /// The value shown for `key`.
    pub fn value(&self, session: &DraftSession, key: &str) -> Option<String> {
        self.local
            .get(key)
            .cloned()
            .or_else(|| session.data.get(key).map(|v| v.to_string()))
    }

    pub fn edit_field(
        &mut self,
        ctx: &mut FlowContext<'_>,
        key: &str,
        raw: &str,
    ) -> Result<(), FlowError> {
        let spec = self.spec(key)?;
        let value = spec
            .kind
            .parse(raw)
            .unwrap_or_else(|_| FieldValue::Text(raw.to_string()));

        self.local.insert(key.to_string(), raw.to_string());
        if !ctx
            .store
            .update_session_data(&self.session_id, DataBag::new().with(key, value))
        {
            return Err(FlowError::SessionMissing(self.session_id.clone()));
        }
        Ok(())
    }

    /// Starts fetching the record being edited. `None` outside edit mode.
    pub fn request_original(&mut self, session: &DraftSession) -> Option<FetchTicket<String>> {
        match self.kind.editing(session) {
            Some(id) => Some(self.original.begin(id)),
            None => {
                self.original.reset();
                None
            }
        }
    }

    /// Applies a fetched record and fills every field the session lacks.
    ///
    /// Returns whether the record was applied; a response for a different
    /// record than the one now selected is dropped.
    pub fn receive_original(
        &mut self,
        ctx: &mut FlowContext<'_>,
        ticket: FetchTicket<String>,
        result: Result<Option<DataBag>, PortalError>,
    ) -> Result<bool, FlowError> {
        let session = self.session(ctx)?;
        if self.kind.editing(&session).as_ref() != Some(&ticket.dependency) {
            tracing::debug!(
                "[{:?}Page] Dropping details for {} (no longer selected)",
                self.kind,
                ticket.dependency
            );
            self.original.reset();
            return Ok(false);
        }

        let id = ticket.dependency.clone();
        let result = result.and_then(|record| {
            record
                .map(Some)
                .ok_or_else(|| PortalError::not_found(self.record_type(), id))
        });
        if !self.original.complete(ticket, result) {
            return Ok(false);
        }

        let Some(original) = self.original.value() else {
            return Ok(true);
        };
        let missing = original.subset(|k| !session.data.contains_key(k));
        if !missing.is_empty() {
            tracing::debug!(
                "[{:?}Page] Prefilling {} field(s) for session {}",
                self.kind,
                missing.len(),
                self.session_id
            );
            ctx.store.update_session_data(&self.session_id, missing);
        }
        Ok(true)
    }

    /// Fetches the edited record, if any, and prefills from it.
    pub async fn load_original(
        &mut self,
        ctx: &mut FlowContext<'_>,
        source: &dyn ReferenceSource,
    ) -> Result<bool, FlowError> {
        let session = self.session(ctx)?;
        let Some(ticket) = self.request_original(&session) else {
            return Ok(false);
        };

        let result = match self.kind {
            DetailKind::Text => source
                .text(&ticket.dependency)
                .await
                .map(|r| r.as_ref().map(text_prefill)),
            DetailKind::Author => source
                .author(&ticket.dependency)
                .await
                .map(|r| r.as_ref().map(author_prefill)),
        };
        self.receive_original(ctx, ticket, result)
    }

    /// Restores `key` to the edited record's value.
    pub fn reset_field(&mut self, ctx: &mut FlowContext<'_>, key: &str) -> Result<(), FlowError> {
        self.spec(key)?;
        let original = self
            .original
            .value()
            .as_ref()
            .and_then(|bag| bag.get(key))
            .cloned()
            .ok_or_else(|| FlowError::unavailable(format!("no original value for '{}'", key)))?;

        self.local.remove(key);
        if !ctx
            .store
            .update_session_data(&self.session_id, DataBag::new().with(key, original))
        {
            return Err(FlowError::SessionMissing(self.session_id.clone()));
        }
        Ok(())
    }

    pub fn validate(&self, ctx: &mut FlowContext<'_>) -> Result<ValidationReport, FlowError> {
        let session = self.session(ctx)?;
        let mut report = upstream_report(self.kind.step(), &session);
        let (selection, id_field, message) = match self.kind {
            DetailKind::Text => (
                Selection::text_of(&session),
                "text_id",
                "Select the text to edit",
            ),
            DetailKind::Author => (
                Selection::author_of(&session),
                "author_id",
                "Select the author to edit",
            ),
        };
        if selection.edits_nothing() {
            report.push(id_field, message);
        }
        report.extend(validate_fields(self.fields(), |key| self.value(&session, key)));
        Ok(report)
    }

    pub fn next(&self, ctx: &mut FlowContext<'_>) -> Result<Route, FlowError> {
        let report = self.validate(ctx)?;
        let session = self.session(ctx)?;
        advance(ctx, self.kind.step(), &session, report)
    }

    pub fn back(&self, ctx: &mut FlowContext<'_>) -> Result<Route, FlowError> {
        let session = self.session(ctx)?;
        Ok(retreat(ctx, self.kind.step(), &session))
    }

    fn record_type(&self) -> &'static str {
        match self.kind {
            DetailKind::Text => "text",
            DetailKind::Author => "author",
        }
    }
}
