//! Navigation port

/// Route of the login view.
pub const LOGIN_PATH: &str = "/login";

/// Port for the front end's current route.
pub trait Navigator: Send + Sync {
    /// Current route path.
    fn current_path(&self) -> String;

    /// Moves the front end to `path`.
    fn navigate(&self, path: &str);

    /// Sends the user to the login view unless they are already on it.
    /// Returns true if a navigation happened.
    fn redirect_to_login(&self) -> bool {
        if self.current_path() == LOGIN_PATH {
            return false;
        }
        self.navigate(LOGIN_PATH);
        true
    }
}
