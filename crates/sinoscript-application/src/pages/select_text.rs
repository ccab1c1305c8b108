//! Select text page: session name, region, text and text action.

use sinoscript_core::error::PortalError;
use sinoscript_core::navigation::Route;
use sinoscript_core::reference::{ReferenceSource, Region, TextRecord};
use sinoscript_core::session::{DraftSession, SessionPatch, WorkflowAction, WorkflowField};

use crate::flow::validation::{
    Selection, ValidationReport, validate_session_name, validate_text_selection,
};
use crate::flow::{
    ChangeOutcome, DependentResource, FetchTicket, FlowContext, FlowError, Step, change_workflow,
    enter_page,
};
use crate::pages::{advance, load_session, retreat};

pub struct SelectTextPage {
    session_id: String,
    /// Session name as typed, until it is saved.
    name_input: Option<String>,
    regions: DependentResource<(), Vec<Region>>,
    texts: DependentResource<String, Vec<TextRecord>>,
}

impl SelectTextPage {
    pub fn open(ctx: &mut FlowContext<'_>) -> Result<Self, FlowError> {
        let session = enter_page(ctx)?;
        Ok(Self {
            session_id: session.id,
            name_input: None,
            regions: DependentResource::new("Regions"),
            texts: DependentResource::new("Texts"),
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn session(&self, ctx: &mut FlowContext<'_>) -> Result<DraftSession, FlowError> {
        load_session(ctx, &self.session_id)
    }

    pub fn regions(&self) -> &DependentResource<(), Vec<Region>> {
        &self.regions
    }

    pub fn texts(&self) -> &DependentResource<String, Vec<TextRecord>> {
        &self.texts
    }

    /// Name shown in the input: local input first, then the saved name.
    pub fn session_name(&self, session: &DraftSession) -> String {
        self.name_input
            .clone()
            .unwrap_or_else(|| session.name.clone())
    }

    /// Saves the name as typed. Invalid names are kept and reported by
    /// [`validate`](Self::validate).
    pub fn set_session_name(&mut self, ctx: &mut FlowContext<'_>, name: &str) -> Result<(), FlowError> {
        self.name_input = Some(name.to_string());
        if !ctx
            .store
            .update_session(&self.session_id, SessionPatch::default().name(name))
        {
            return Err(FlowError::SessionMissing(self.session_id.clone()));
        }
        Ok(())
    }

    pub fn choose_region(
        &mut self,
        ctx: &mut FlowContext<'_>,
        region: &str,
    ) -> Result<ChangeOutcome, FlowError> {
        let outcome = change_workflow(
            ctx,
            &self.session_id,
            WorkflowField::Region,
            Some(region.to_string()),
        )?;
        if matches!(outcome, ChangeOutcome::Applied { .. }) {
            self.texts.reset();
        }
        Ok(outcome)
    }

    /// Picks a text. A text can only be chosen once a region is set.
    pub fn choose_text(
        &mut self,
        ctx: &mut FlowContext<'_>,
        text_id: Option<&str>,
    ) -> Result<ChangeOutcome, FlowError> {
        let session = self.session(ctx)?;
        if text_id.is_some() && session.region.is_none() {
            return Err(FlowError::unavailable("select a region before choosing a text"));
        }
        change_workflow(
            ctx,
            &self.session_id,
            WorkflowField::TextId,
            text_id.map(str::to_string),
        )
    }

    /// Sets the text action. `edit` is unavailable until a text is chosen.
    pub fn choose_text_action(
        &mut self,
        ctx: &mut FlowContext<'_>,
        action: WorkflowAction,
    ) -> Result<ChangeOutcome, FlowError> {
        let session = self.session(ctx)?;
        if action == WorkflowAction::Edit && session.text_id.is_none() {
            return Err(FlowError::unavailable("a text must be selected to edit it"));
        }
        change_workflow(
            ctx,
            &self.session_id,
            WorkflowField::TextAction,
            Some(action.to_string()),
        )
    }

    pub fn request_regions(&mut self) -> FetchTicket<()> {
        self.regions.begin(())
    }

    pub fn receive_regions(
        &mut self,
        ticket: FetchTicket<()>,
        result: Result<Vec<Region>, PortalError>,
    ) -> bool {
        self.regions.complete(ticket, result)
    }

    /// Starts a text fetch for the session's region. `None` without a region.
    pub fn request_texts(&mut self, session: &DraftSession) -> Option<FetchTicket<String>> {
        let region = session.region.clone()?;
        Some(self.texts.begin(region))
    }

    pub fn receive_texts(
        &mut self,
        ticket: FetchTicket<String>,
        result: Result<Vec<TextRecord>, PortalError>,
    ) -> bool {
        self.texts.complete(ticket, result)
    }

    /// Fetches regions and, when a region is set, its texts.
    pub async fn refresh(
        &mut self,
        ctx: &mut FlowContext<'_>,
        source: &dyn ReferenceSource,
    ) -> Result<(), FlowError> {
        let ticket = self.request_regions();
        let regions = source.regions().await;
        self.receive_regions(ticket, regions);

        let session = self.session(ctx)?;
        if let Some(ticket) = self.request_texts(&session) {
            let texts = source.texts_in_region(&ticket.dependency).await;
            self.receive_texts(ticket, texts);
        }
        Ok(())
    }

    pub fn validate(&self, ctx: &mut FlowContext<'_>) -> Result<ValidationReport, FlowError> {
        let session = self.session(ctx)?;
        let mut report = ValidationReport::new();
        validate_session_name(&self.session_name(&session), &mut report);
        report.extend(validate_text_selection(&Selection::text_of(&session)));
        Ok(report)
    }

    pub fn next(&self, ctx: &mut FlowContext<'_>) -> Result<Route, FlowError> {
        let report = self.validate(ctx)?;
        let session = self.session(ctx)?;
        advance(ctx, Step::SelectText, &session, report)
    }

    pub fn back(&self, ctx: &mut FlowContext<'_>) -> Result<Route, FlowError> {
        let session = self.session(ctx)?;
        Ok(retreat(ctx, Step::SelectText, &session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{navigator_at, session_store};
    use sinoscript_core::navigation::{Location, Navigator, RouteParams};
    use sinoscript_core::prompt::AlwaysConfirm;

    fn page_for(ctx: &mut FlowContext<'_>) -> SelectTextPage {
        SelectTextPage::open(ctx).unwrap()
    }

    #[test]
    fn test_edit_needs_a_text() {
        let mut store = session_store();
        let id = store.create_session(None);
        let navigator = navigator_at(Location::new(Route::SelectText, RouteParams::for_session(id)));
        let mut ctx = FlowContext::new(&mut store, &navigator, &AlwaysConfirm);
        let mut page = page_for(&mut ctx);

        let err = page
            .choose_text_action(&mut ctx, WorkflowAction::Edit)
            .unwrap_err();
        assert!(matches!(err, FlowError::ActionUnavailable(_)));

        let err = page.choose_text(&mut ctx, Some("t1")).unwrap_err();
        assert!(matches!(err, FlowError::ActionUnavailable(_)));

        page.choose_region(&mut ctx, "China").unwrap();
        page.choose_text(&mut ctx, Some("t1")).unwrap();
        page.choose_text_action(&mut ctx, WorkflowAction::Edit).unwrap();

        let session = page.session(&mut ctx).unwrap();
        assert_eq!(session.text_id.as_deref(), Some("t1"));
        assert_eq!(session.text_action, Some(WorkflowAction::Edit));
    }

    #[test]
    fn test_next_blocked_until_valid() {
        let mut store = session_store();
        let id = store.create_session(None);
        let navigator = navigator_at(Location::new(Route::SelectText, RouteParams::for_session(id)));
        let mut ctx = FlowContext::new(&mut store, &navigator, &AlwaysConfirm);
        let mut page = page_for(&mut ctx);

        let err = page.next(&mut ctx).unwrap_err();
        let report = err.report().unwrap();
        assert!(report.has_error("region"));
        assert!(report.has_error("text_action"));
        assert_eq!(navigator.current().route, Route::SelectText);

        page.choose_region(&mut ctx, "Vietnam").unwrap();
        page.choose_text_action(&mut ctx, WorkflowAction::Create).unwrap();
        assert_eq!(page.next(&mut ctx).unwrap(), Route::TextInfo);
        assert_eq!(navigator.current().route, Route::TextInfo);
    }

    #[test]
    fn test_invalid_name_is_saved_but_blocks_next() {
        let mut store = session_store();
        let id = store.create_session(None);
        let navigator =
            navigator_at(Location::new(Route::SelectText, RouteParams::for_session(id.clone())));
        let mut ctx = FlowContext::new(&mut store, &navigator, &AlwaysConfirm);
        let mut page = page_for(&mut ctx);

        page.set_session_name(&mut ctx, "").unwrap();
        page.choose_region(&mut ctx, "Korea").unwrap();
        page.choose_text_action(&mut ctx, WorkflowAction::Create).unwrap();

        let report = page.validate(&mut ctx).unwrap();
        assert!(report.has_error("name"));
        assert_eq!(page.session(&mut ctx).unwrap().name, "");
    }

    #[test]
    fn test_back_is_never_gated() {
        let mut store = session_store();
        let id = store.create_session(None);
        let navigator = navigator_at(Location::new(Route::SelectText, RouteParams::for_session(id)));
        let mut ctx = FlowContext::new(&mut store, &navigator, &AlwaysConfirm);
        let page = page_for(&mut ctx);

        assert_eq!(page.back(&mut ctx).unwrap(), Route::Sessions);
    }

    #[test]
    fn test_region_change_resets_text_list() {
        let mut store = session_store();
        let id = store.create_session(None);
        let navigator = navigator_at(Location::new(Route::SelectText, RouteParams::for_session(id)));
        let mut ctx = FlowContext::new(&mut store, &navigator, &AlwaysConfirm);
        let mut page = page_for(&mut ctx);

        page.choose_region(&mut ctx, "China").unwrap();
        let session = page.session(&mut ctx).unwrap();
        let ticket = page.request_texts(&session).unwrap();

        page.choose_region(&mut ctx, "Japan").unwrap();
        assert!(!page.receive_texts(ticket, Ok(Vec::new())));
    }
}
