//! Registry of live connections

use dashmap::DashMap;
use uuid::Uuid;

use crate::game::state::Role;

/// Maps a connection identifier to the role it was assigned.
///
/// Seat ownership itself lives on the match state (each player body keeps a
/// back-reference to its connection); this registry tracks every live
/// connection, spectators included.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: DashMap<Uuid, Role>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// Record the role assigned to a new connection
    pub fn assign(&self, conn_id: Uuid, role: Role) {
        self.sessions.insert(conn_id, role);
    }

    /// Forget a connection, returning the role it held
    pub fn release(&self, conn_id: Uuid) -> Option<Role> {
        self.sessions.remove(&conn_id).map(|(_, role)| role)
    }

    /// Number of live connections
    pub fn connected(&self) -> usize {
        self.sessions.len()
    }

    pub fn spectators(&self) -> usize {
        self.sessions
            .iter()
            .filter(|entry| entry.value().seat().is_none())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assign_and_release() {
        let registry = SessionRegistry::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        registry.assign(a, Role::P1);
        registry.assign(b, Role::Spectator);
        assert_eq!(registry.connected(), 2);
        assert_eq!(registry.spectators(), 1);

        assert_eq!(registry.release(a), Some(Role::P1));
        assert_eq!(registry.release(a), None);
        assert_eq!(registry.connected(), 1);
    }
}
