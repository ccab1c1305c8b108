//! Routes, route parameters, and the navigation contract.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::session::model::{DraftSession, WorkflowField};

/// Every screen of the portal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Route {
    Home,
    Login,
    Sessions,
    SelectText,
    TextInfo,
    SelectAuthor,
    AuthorInfo,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Login => "/login",
            Route::Sessions => "/sessions",
            Route::SelectText => "/select_text",
            Route::TextInfo => "/text_info",
            Route::SelectAuthor => "/select_author",
            Route::AuthorInfo => "/author_info",
        }
    }

    pub fn from_path(path: &str) -> Option<Route> {
        let trimmed = path.trim_end_matches('/');
        if trimmed.is_empty() {
            return Some(Route::Home);
        }
        trimmed.trim_start_matches('/').parse().ok()
    }

    /// Routes that need an authenticated user.
    pub fn requires_auth(&self) -> bool {
        !matches!(self, Route::Login)
    }
}

/// Flat parameters carried alongside a route.
///
/// Shared by every form route; the session id identifies the single active
/// draft session for the navigation context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<String>,
}

impl RouteParams {
    pub fn for_session(session_id: impl Into<String>) -> Self {
        Self {
            session_id: Some(session_id.into()),
            ..Default::default()
        }
    }

    /// The route parameter mirroring a workflow field. Region has none.
    pub fn workflow(&self, field: WorkflowField) -> Option<&str> {
        match field {
            WorkflowField::Region => None,
            WorkflowField::TextId => self.text_id.as_deref(),
            WorkflowField::TextAction => self.text_action.as_deref(),
            WorkflowField::AuthorId => self.author_id.as_deref(),
            WorkflowField::AuthorAction => self.author_action.as_deref(),
        }
    }

    pub fn set_workflow(&mut self, field: WorkflowField, value: Option<String>) {
        match field {
            WorkflowField::Region => {}
            WorkflowField::TextId => self.text_id = value,
            WorkflowField::TextAction => self.text_action = value,
            WorkflowField::AuthorId => self.author_id = value,
            WorkflowField::AuthorAction => self.author_action = value,
        }
    }

    /// Parameters mirroring the persisted workflow fields of `session`.
    pub fn from_session(session: &DraftSession) -> Self {
        let mut params = Self::for_session(session.id.clone());
        for field in WorkflowField::ALL {
            params.set_workflow(field, session.workflow_value(field));
        }
        params
    }

    /// Renders as a query string (`?sessionId=..&textId=..`), empty when no
    /// parameter is set.
    pub fn to_query(&self) -> String {
        let pairs: Vec<String> = [
            ("sessionId", &self.session_id),
            ("textAction", &self.text_action),
            ("authorAction", &self.author_action),
            ("textId", &self.text_id),
            ("authorId", &self.author_id),
        ]
        .into_iter()
        .filter_map(|(k, v)| v.as_ref().map(|v| format!("{}={}", k, v)))
        .collect();

        if pairs.is_empty() {
            String::new()
        } else {
            format!("?{}", pairs.join("&"))
        }
    }
}

/// A route plus its parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub route: Route,
    #[serde(default)]
    pub params: RouteParams,
}

impl Location {
    pub fn new(route: Route, params: RouteParams) -> Self {
        Self { route, params }
    }

    pub fn bare(route: Route) -> Self {
        Self::new(route, RouteParams::default())
    }

    pub fn href(&self) -> String {
        format!("{}{}", self.route.path(), self.params.to_query())
    }
}

/// How a navigation affects history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationMode {
    /// Adds a new history entry.
    Push,
    /// Overwrites the current history entry.
    Replace,
}

/// The navigation service.
pub trait Navigator: Send + Sync {
    fn navigate(&self, location: Location, mode: NavigationMode);

    fn current(&self) -> Location;
}
