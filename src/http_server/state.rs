use std::sync::Arc;

use crate::database::Database;

pub struct AppState {
    pub db: Arc<Database>,
    /// Request header carrying the authenticated user id
    pub identity_header: String,
}
