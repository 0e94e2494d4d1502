//! Navigation signal raised when the session is torn down.

/// Receives the fire-and-forget instruction to show the login screen.
///
/// Implemented for any `Fn(&str) + Send + Sync`, so callers can register a
/// closure.
///
/// # Example
///
/// ```
/// use storefront_core::traits::Navigator;
///
/// let navigator = |path: &str| println!("redirecting to {path}");
/// navigator.navigate("/login");
/// ```
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

impl<F> Navigator for F
where
    F: Fn(&str) + Send + Sync,
{
    fn navigate(&self, path: &str) {
        self(path)
    }
}

/// A navigator that ignores the signal.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn navigate(&self, _path: &str) {}
}
