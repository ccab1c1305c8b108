//! Ordered form steps and the dependency chain between selections.

use sinoscript_core::navigation::Route;
use sinoscript_core::session::{DraftSession, WorkflowField};

use crate::flow::fields::{AUTHOR_FIELDS, FieldSpec, TEXT_FIELDS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    SelectText,
    TextInfo,
    SelectAuthor,
    AuthorInfo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepDescriptor {
    pub step: Step,
    pub title: &'static str,
    pub route: Route,
    pub back: Option<Route>,
    pub next: Option<Route>,
    /// Workflow fields that must be set before this step can be completed.
    pub requires: &'static [WorkflowField],
}

pub const STEPS: [StepDescriptor; 4] = [
    StepDescriptor {
        step: Step::SelectText,
        title: "Select text",
        route: Route::SelectText,
        back: Some(Route::Sessions),
        next: Some(Route::TextInfo),
        requires: &[],
    },
    StepDescriptor {
        step: Step::TextInfo,
        title: "Text information",
        route: Route::TextInfo,
        back: Some(Route::SelectText),
        next: Some(Route::SelectAuthor),
        requires: &[WorkflowField::Region, WorkflowField::TextAction],
    },
    StepDescriptor {
        step: Step::SelectAuthor,
        title: "Select author",
        route: Route::SelectAuthor,
        back: Some(Route::TextInfo),
        next: Some(Route::AuthorInfo),
        requires: &[WorkflowField::Region, WorkflowField::TextAction],
    },
    StepDescriptor {
        step: Step::AuthorInfo,
        title: "Author information",
        route: Route::AuthorInfo,
        back: Some(Route::SelectAuthor),
        next: None,
        requires: &[WorkflowField::AuthorAction],
    },
];

impl Step {
    pub fn descriptor(&self) -> &'static StepDescriptor {
        match self {
            Step::SelectText => &STEPS[0],
            Step::TextInfo => &STEPS[1],
            Step::SelectAuthor => &STEPS[2],
            Step::AuthorInfo => &STEPS[3],
        }
    }

    pub fn from_route(route: Route) -> Option<Step> {
        STEPS.iter().find(|d| d.route == route).map(|d| d.step)
    }

    /// 1-based position for progress display.
    pub fn number(&self) -> usize {
        STEPS
            .iter()
            .position(|d| d.step == *self)
            .map(|i| i + 1)
            .unwrap_or(0)
    }

    /// Whether every workflow field this step depends on is set.
    pub fn is_reachable(&self, session: &DraftSession) -> bool {
        self.descriptor()
            .requires
            .iter()
            .all(|f| session.workflow_value(*f).is_some())
    }

    /// Upstream workflow fields still missing for this step.
    pub fn missing_upstream(&self, session: &DraftSession) -> Vec<WorkflowField> {
        self.descriptor()
            .requires
            .iter()
            .copied()
            .filter(|f| session.workflow_value(*f).is_none())
            .collect()
    }

    /// The last step the session can be resumed at.
    pub fn furthest(session: &DraftSession) -> Step {
        STEPS
            .iter()
            .rev()
            .find(|d| d.step.is_reachable(session))
            .map(|d| d.step)
            .unwrap_or(Step::SelectText)
    }
}

/// What a link of the dependency chain owns in the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOwner {
    Workflow(WorkflowField),
    Data(&'static [FieldSpec]),
}

/// One link of `region → text → text action → text details → author →
/// author action → author details`.
///
/// Changing a selection link (region, a record choice or an action)
/// invalidates everything after it. Detail edits only write their own keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChainLink {
    Region,
    TextSelection,
    TextAction,
    TextDetails,
    AuthorSelection,
    AuthorAction,
    AuthorDetails,
}

impl ChainLink {
    pub const ORDER: [ChainLink; 7] = [
        ChainLink::Region,
        ChainLink::TextSelection,
        ChainLink::TextAction,
        ChainLink::TextDetails,
        ChainLink::AuthorSelection,
        ChainLink::AuthorAction,
        ChainLink::AuthorDetails,
    ];

    pub fn owner(&self) -> LinkOwner {
        match self {
            ChainLink::Region => LinkOwner::Workflow(WorkflowField::Region),
            ChainLink::TextSelection => LinkOwner::Workflow(WorkflowField::TextId),
            ChainLink::TextAction => LinkOwner::Workflow(WorkflowField::TextAction),
            ChainLink::TextDetails => LinkOwner::Data(TEXT_FIELDS),
            ChainLink::AuthorSelection => LinkOwner::Workflow(WorkflowField::AuthorId),
            ChainLink::AuthorAction => LinkOwner::Workflow(WorkflowField::AuthorAction),
            ChainLink::AuthorDetails => LinkOwner::Data(AUTHOR_FIELDS),
        }
    }

    pub fn workflow_field(&self) -> Option<WorkflowField> {
        match self.owner() {
            LinkOwner::Workflow(field) => Some(field),
            LinkOwner::Data(_) => None,
        }
    }

    pub fn for_workflow(field: WorkflowField) -> ChainLink {
        match field {
            WorkflowField::Region => ChainLink::Region,
            WorkflowField::TextId => ChainLink::TextSelection,
            WorkflowField::TextAction => ChainLink::TextAction,
            WorkflowField::AuthorId => ChainLink::AuthorSelection,
            WorkflowField::AuthorAction => ChainLink::AuthorAction,
        }
    }

    pub fn upstream(&self) -> impl Iterator<Item = ChainLink> + '_ {
        Self::ORDER.into_iter().filter(move |l| l < self)
    }

    pub fn downstream(&self) -> impl Iterator<Item = ChainLink> + '_ {
        Self::ORDER.into_iter().filter(move |l| l > self)
    }

    /// Whether `key` is a data-bag key owned by a link before this one.
    pub fn upstream_owns_key(&self, key: &str) -> bool {
        self.upstream().any(|link| match link.owner() {
            LinkOwner::Data(fields) => fields.iter().any(|f| f.key == key),
            LinkOwner::Workflow(_) => false,
        })
    }
}
