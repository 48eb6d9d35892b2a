/// Pages the session adapter sends the user to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Navigation {
    /// Site root, after logout.
    Root,
    /// Login page, after a missing or rejected credential.
    Login,
}

impl Navigation {
    /// Site-relative path of the page.
    pub fn path(&self) -> &'static str {
        match self {
            Navigation::Root => "/",
            Navigation::Login => "/login.html",
        }
    }
}

/// Performs navigations on behalf of the session adapter.
///
/// Navigation is fire-and-forget: implementations report their own failures
/// and never block the caller on completion.
pub trait Navigator: Send + Sync {
    /// Send the user to `target`.
    fn navigate(&self, target: Navigation);
}
