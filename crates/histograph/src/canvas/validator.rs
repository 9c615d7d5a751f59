//! Connection validation for connect and reconnect gestures

use crate::core::Connection;

/// Decides whether a proposed edge may be created
pub trait ConnectionValidator: Send + Sync {
    fn is_valid_connection(&self, connection: &Connection) -> bool;
}

/// Rejects self-loops, accepts everything else
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSelfLoops;

impl ConnectionValidator for NoSelfLoops {
    fn is_valid_connection(&self, connection: &Connection) -> bool {
        connection.source != connection.target
    }
}

/// Check a connection against the default policy
pub fn is_valid_connection(connection: &Connection) -> bool {
    NoSelfLoops.is_valid_connection(connection)
}
