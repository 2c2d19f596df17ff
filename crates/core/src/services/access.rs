//! Who may see the full media of priced content.

/// Viewer context for access checks.
#[derive(Debug, Clone, Copy)]
pub struct Viewer<'a> {
    /// Session user id, if any.
    pub user_id: Option<&'a str>,
    /// Whether the viewer holds an unlock for the item.
    pub unlocked: bool,
}

impl<'a> Viewer<'a> {
    /// An anonymous viewer.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self {
            user_id: None,
            unlocked: false,
        }
    }

    /// A signed-in viewer.
    #[must_use]
    pub const fn user(user_id: &'a str, unlocked: bool) -> Self {
        Self {
            user_id: Some(user_id),
            unlocked,
        }
    }

    /// Whether the viewer owns an item.
    #[must_use]
    pub fn owns(&self, owner_id: &str) -> bool {
        self.user_id == Some(owner_id)
    }
}

/// Whether an item counts as free.
#[must_use]
pub fn is_free(price: f64) -> bool {
    price <= 0.0
}

/// Whether the viewer may see the full media of an item.
///
/// Free items are always unlocked.
#[must_use]
pub fn can_view(price: f64, owner_id: &str, viewer: Viewer<'_>) -> bool {
    is_free(price) || viewer.owns(owner_id) || (viewer.user_id.is_some() && viewer.unlocked)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_is_always_unlocked() {
        assert!(can_view(0.0, "owner", Viewer::anonymous()));
        assert!(can_view(0.0, "owner", Viewer::user("other", false)));
    }

    #[test]
    fn test_owner_sees_paid_content() {
        assert!(can_view(10.0, "owner", Viewer::user("owner", false)));
    }

    #[test]
    fn test_paid_content_requires_unlock() {
        assert!(!can_view(10.0, "owner", Viewer::anonymous()));
        assert!(!can_view(10.0, "owner", Viewer::user("buyer", false)));
        assert!(can_view(10.0, "owner", Viewer::user("buyer", true)));
    }
}
