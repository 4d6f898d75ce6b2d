use nix::unistd::{getuid, User};

/// Who is asking. Live statistics are only read for the job owner or root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user: String,
    pub privileged: bool,
}

impl Caller {
    pub fn new(user: impl Into<String>, privileged: bool) -> Self {
        Self {
            user: user.into(),
            privileged,
        }
    }

    /// The user running this process.
    pub fn current() -> Self {
        let uid = getuid();
        let user = match User::from_uid(uid) {
            Ok(Some(user)) => user.name,
            Ok(None) => uid.to_string(),
            Err(e) => {
                tracing::debug!(uid = %uid, error = %e, "User lookup failed");
                uid.to_string()
            }
        };
        Self {
            user,
            privileged: uid.is_root(),
        }
    }

    pub fn may_inspect(&self, owner: &str) -> bool {
        self.privileged || self.user == owner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_may_inspect() {
        let caller = Caller::new("alice", false);
        assert!(caller.may_inspect("alice"));
        assert!(!caller.may_inspect("bob"));
    }

    #[test]
    fn root_may_inspect_anyone() {
        let caller = Caller::new("root", true);
        assert!(caller.may_inspect("bob"));
    }

    #[test]
    fn current_caller_has_a_name() {
        assert!(!Caller::current().user.is_empty());
    }
}
