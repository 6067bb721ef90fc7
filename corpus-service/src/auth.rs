//! Auth gate in front of the admin screens.

use std::cell::Cell;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use parking_lot::ReentrantMutex;
use tokio::task::JoinHandle;

use corpus_store::{AuthProvider, AuthProviderError, User};

use crate::error::ServiceError;

// ---------------------------------------------------------------------------
// Routes
// ---------------------------------------------------------------------------

/// Screens of the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    About,
    Services,
    Plans,
    Registration,
    Contact,
    AdminLogin,
    AdminDashboard,
}

impl Route {
    pub const ALL: [Route; 8] = [
        Route::Home,
        Route::About,
        Route::Services,
        Route::Plans,
        Route::Registration,
        Route::Contact,
        Route::AdminLogin,
        Route::AdminDashboard,
    ];

    pub const fn path(self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::About => "/sobre",
            Route::Services => "/servicos",
            Route::Plans => "/planos",
            Route::Registration => "/matricula",
            Route::Contact => "/contato",
            Route::AdminLogin => "/admin",
            Route::AdminDashboard => "/admin/dashboard",
        }
    }

    /// Needs a signed-in admin.
    pub const fn is_gated(self) -> bool {
        matches!(self, Route::AdminDashboard)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for Route {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let path = match trimmed.trim_end_matches('/') {
            "" => "/",
            other => other,
        };
        Route::ALL
            .into_iter()
            .find(|route| route.path() == path)
            .ok_or_else(|| format!("unknown route '{trimmed}'"))
    }
}

/// Outcome of [`AuthGate::guard`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allow,
    Redirect(Route),
}

// ---------------------------------------------------------------------------
// Gate
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct AuthGate {
    provider: Arc<dyn AuthProvider>,
}

impl AuthGate {
    pub fn new(provider: Arc<dyn AuthProvider>) -> Self {
        Self { provider }
    }

    /// Bad credentials surface as `InvalidCredentials` whatever the
    /// provider said; any other provider failure as `Auth`.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<User, ServiceError> {
        match self.provider.sign_in(email, password).await {
            Ok(user) => Ok(user),
            Err(AuthProviderError::InvalidCredential) => {
                tracing::info!("sign-in rejected");
                Err(ServiceError::InvalidCredentials)
            }
            Err(err) => Err(ServiceError::Auth(err.to_string())),
        }
    }

    /// Never fails from the caller's point of view; provider errors are logged.
    pub async fn sign_out(&self) {
        match self.provider.sign_out().await {
            Ok(()) => tracing::info!("signed out"),
            Err(err) => tracing::warn!(error = %err, "sign-out failed at the provider"),
        }
    }

    pub fn current_user(&self) -> Option<User> {
        self.provider.current_user()
    }

    pub fn require_user(&self) -> Result<User, ServiceError> {
        self.current_user().ok_or(ServiceError::Unauthenticated)
    }

    /// Gated routes redirect to the login route when nobody is signed in.
    pub fn guard(&self, route: Route) -> Access {
        if route.is_gated() && self.current_user().is_none() {
            Access::Redirect(Route::AdminLogin)
        } else {
            Access::Allow
        }
    }

    /// Call `on_change` with the current session, then on every transition,
    /// until the returned handle is disposed. Must be called from within a
    /// tokio runtime.
    pub fn watch_session<F>(&self, mut on_change: F) -> SessionWatch
    where
        F: FnMut(Option<User>) + Send + 'static,
    {
        let mut rx = self.provider.watch();
        let active: Arc<ReentrantMutex<Cell<bool>>> = Arc::new(ReentrantMutex::new(Cell::new(true)));

        let task_active = Arc::clone(&active);
        let task = tokio::spawn(async move {
            loop {
                let user = rx.borrow_and_update().clone();
                {
                    let active = task_active.lock();
                    if !active.get() {
                        return;
                    }
                    on_change(user);
                }
                if rx.changed().await.is_err() {
                    return;
                }
            }
        });

        SessionWatch { active, task }
    }
}

/// Disposer returned by [`AuthGate::watch_session`]. Dropping it disposes.
#[derive(Debug)]
pub struct SessionWatch {
    active: Arc<ReentrantMutex<Cell<bool>>>,
    task: JoinHandle<()>,
}

impl SessionWatch {
    /// Stop delivering. Safe to call any number of times.
    pub fn dispose(&self) {
        self.active.lock().set(false);
        self.task.abort();
    }

    pub fn is_active(&self) -> bool {
        self.active.lock().get()
    }
}

impl Drop for SessionWatch {
    fn drop(&mut self) {
        self.dispose();
    }
}
