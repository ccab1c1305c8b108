//! Sign-in page and the route guard.

use sinoscript_core::auth::{AuthUser, Authenticator};
use sinoscript_core::error::{PortalError, Result};
use sinoscript_core::navigation::{Location, NavigationMode, Navigator, Route};

/// Redirects unauthenticated visits to the sign-in page.
pub struct RouteGuard<'a> {
    auth: &'a dyn Authenticator,
}

impl<'a> RouteGuard<'a> {
    pub fn new(auth: &'a dyn Authenticator) -> Self {
        Self { auth }
    }

    /// Where a visit to `requested` actually lands.
    pub async fn resolve(&self, requested: Location) -> Location {
        let user = self.auth.current_user().await;
        match (requested.route, user) {
            (route, None) if route.requires_auth() => {
                tracing::debug!("[RouteGuard] {} requires sign-in", route.path());
                Location::bare(Route::Login)
            }
            (Route::Login, Some(_)) => Location::bare(Route::Home),
            _ => requested,
        }
    }

    /// Resolves the navigator's current location, replacing it on redirect.
    pub async fn enforce(&self, navigator: &dyn Navigator) -> Location {
        let current = navigator.current();
        let resolved = self.resolve(current.clone()).await;
        if resolved != current {
            navigator.navigate(resolved.clone(), NavigationMode::Replace);
        }
        resolved
    }
}

pub struct LoginPage<'a> {
    auth: &'a dyn Authenticator,
    navigator: &'a dyn Navigator,
}

impl<'a> LoginPage<'a> {
    pub fn new(auth: &'a dyn Authenticator, navigator: &'a dyn Navigator) -> Self {
        Self { auth, navigator }
    }

    pub async fn submit(&self, email: &str, password: &str) -> Result<AuthUser> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(PortalError::validation("Email and password are required"));
        }

        let user = self.auth.sign_in(email.trim(), password).await?;
        tracing::info!("[LoginPage] Signed in as {}", user.id);
        self.navigator
            .navigate(Location::bare(Route::Home), NavigationMode::Replace);
        Ok(user)
    }

    pub async fn sign_out(&self) -> Result<()> {
        self.auth.sign_out().await?;
        self.navigator
            .navigate(Location::bare(Route::Login), NavigationMode::Replace);
        Ok(())
    }
}
