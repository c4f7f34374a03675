//! The identity resolved for the current request.

/// Who is making a request. `user_id < 1` means anonymous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Caller {
  pub user_id: i64,
}

impl Caller {
  pub const ANONYMOUS: Caller = Caller { user_id: 0 };

  pub fn user(user_id: i64) -> Self { Self { user_id } }

  pub fn is_anonymous(&self) -> bool { self.user_id < 1 }
}
