use sqlx::PgPool;

use super::ServiceError;
use crate::database::manager::DatabaseManager;
use crate::database::models::User;
use crate::middleware::auth::Identity;

pub struct UsersService {
    pool: PgPool,
}

impl UsersService {
    pub async fn new() -> Result<Self, ServiceError> {
        Ok(Self {
            pool: DatabaseManager::pool().await?,
        })
    }

    /// Insert-if-absent for the local user row. `ON CONFLICT DO NOTHING`
    /// keeps concurrent first requests from the same new identity from
    /// racing into a duplicate-key failure.
    pub async fn ensure_exists(&self, identity: &Identity) -> Result<(), ServiceError> {
        sqlx::query(
            "INSERT INTO users (id, org_id, email, first_name, last_name, image_url) \
             VALUES ($1, $2, $3, $4, $5, $6) ON CONFLICT (id) DO NOTHING",
        )
        .bind(&identity.user_id)
        .bind(identity.org_id)
        .bind(&identity.email)
        .bind(&identity.first_name)
        .bind(&identity.last_name)
        .bind(&identity.image_url)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn get_profile(&self, identity: &Identity) -> Result<Option<User>, ServiceError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(&identity.user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }
}
