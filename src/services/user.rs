use std::sync::Arc;

use sea_orm::EntityTrait;

use crate::database::Database;
use crate::entities;
use crate::entities::user::UserRole;
use crate::services::ServiceResult;

/// The authenticated user a request is made on behalf of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub id: i32,
    pub email: String,
    pub role: UserRole,
}

impl From<entities::user::Model> for Caller {
    fn from(user: entities::user::Model) -> Self {
        Self {
            id: user.id,
            email: user.email,
            role: user.role,
        }
    }
}

pub struct UserService {
    db: Arc<Database>,
}

impl UserService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub async fn find(&self, user_id: i32) -> ServiceResult<Option<entities::user::Model>> {
        let user = entities::user::Entity::find_by_id(user_id)
            .one(&self.db.conn)
            .await?;

        Ok(user)
    }

    /// Resolve the id attached by the authentication layer to a stored user.
    pub async fn find_caller(&self, user_id: i32) -> ServiceResult<Option<Caller>> {
        Ok(self.find(user_id).await?.map(Caller::from))
    }
}
