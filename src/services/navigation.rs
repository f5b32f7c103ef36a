use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

/// Screens owned by the surrounding application that these views link to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavTarget {
    Login,
    SetPassword,
    AdminUsers,
    AdminReports,
    AdminCategories,
    AdminSettings,
    Complaints,
    Complaint(i64),
}

impl NavTarget {
    pub fn path(&self) -> String {
        match self {
            NavTarget::Login => "/login".to_string(),
            NavTarget::SetPassword => "/set-password".to_string(),
            NavTarget::AdminUsers => "/admin/users".to_string(),
            NavTarget::AdminReports => "/admin/reports".to_string(),
            NavTarget::AdminCategories => "/admin/categories".to_string(),
            NavTarget::AdminSettings => "/admin/settings".to_string(),
            NavTarget::Complaints => "/complaints".to_string(),
            NavTarget::Complaint(id) => format!("/complaints/{id}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavMode {
    /// Full page reload.
    Hard,
    InApp,
}

#[cfg_attr(test, mockall::automock)]
pub trait Navigator: Send + Sync {
    fn navigate(&self, target: NavTarget, mode: NavMode);
}

/// Navigator for server-rendered pages. The browser performs the actual
/// move (links, `Refresh` headers); reaching this only leaves a trace.
pub struct ClientNavigator;

impl Navigator for ClientNavigator {
    fn navigate(&self, target: NavTarget, mode: NavMode) {
        debug!(path = %target.path(), ?mode, "navigation handed to the browser");
    }
}

/// A delayed navigation owned by a view. Dropping it cancels it.
pub struct ScheduledNavigation {
    target: NavTarget,
    delay: Duration,
    handle: JoinHandle<()>,
}

impl ScheduledNavigation {
    pub fn spawn(
        navigator: Arc<dyn Navigator>,
        target: NavTarget,
        mode: NavMode,
        delay: Duration,
    ) -> Self {
        let task_target = target.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            navigator.navigate(task_target, mode);
        });

        Self {
            target,
            delay,
            handle,
        }
    }

    pub fn target(&self) -> &NavTarget {
        &self.target
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for ScheduledNavigation {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
