use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, DatabaseConnection, EntityTrait, QueryOrder, QuerySelect,
};
use users_sdk::{NewUser, User, UserPatch};
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::repo::UsersRepository;

use super::db::db_err;
use super::entity::{self, Column, Entity as UserEntity};

pub struct SeaOrmUsersRepository {
    db: DatabaseConnection,
}

impl SeaOrmUsersRepository {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UsersRepository for SeaOrmUsersRepository {
    async fn find(&self, uuid: Uuid) -> Result<Option<User>, DomainError> {
        let found = UserEntity::find_by_id(uuid)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(found.map(Into::into))
    }

    async fn list(&self, offset: u64, limit: u64) -> Result<Vec<User>, DomainError> {
        // OFFSET and LIMIT are bound as signed 64-bit integers.
        if i64::try_from(offset).is_err() {
            return Ok(Vec::new());
        }
        let limit = limit.min(i64::MAX.unsigned_abs());

        let rows = UserEntity::find()
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Uuid)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn insert(&self, new_user: NewUser) -> Result<User, DomainError> {
        let now = Utc::now();
        let active_model = entity::ActiveModel {
            uuid: ActiveValue::Set(Uuid::new_v4()),
            tg_id: ActiveValue::Set(new_user.tg_id),
            first_name: ActiveValue::Set(new_user.first_name),
            last_name: ActiveValue::Set(new_user.last_name),
            user_name: ActiveValue::Set(new_user.user_name),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        };

        let model = active_model.insert(&self.db).await.map_err(db_err)?;
        Ok(model.into())
    }

    async fn update(&self, uuid: Uuid, patch: UserPatch) -> Result<User, DomainError> {
        let mut active_model = entity::ActiveModel {
            uuid: ActiveValue::Unchanged(uuid),
            updated_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        };

        if let Some(tg_id) = patch.tg_id {
            active_model.tg_id = ActiveValue::Set(tg_id);
        }
        if let Some(first_name) = patch.first_name {
            active_model.first_name = ActiveValue::Set(first_name);
        }
        if let Some(last_name) = patch.last_name {
            active_model.last_name = ActiveValue::Set(last_name);
        }
        if let Some(user_name) = patch.user_name {
            active_model.user_name = ActiveValue::Set(user_name);
        }

        // No matching row surfaces as RecordNotUpdated, mapped to not-found.
        let model = active_model.update(&self.db).await.map_err(db_err)?;
        Ok(model.into())
    }

    async fn delete(&self, uuid: Uuid) -> Result<Option<User>, DomainError> {
        let Some(existing) = UserEntity::find_by_id(uuid)
            .one(&self.db)
            .await
            .map_err(db_err)?
        else {
            return Ok(None);
        };

        let res = UserEntity::delete_by_id(uuid)
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if res.rows_affected == 0 {
            return Ok(None);
        }
        Ok(Some(existing.into()))
    }
}
