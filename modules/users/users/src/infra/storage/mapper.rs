use users_sdk::User;

use super::entity::Model;

impl From<Model> for User {
    fn from(m: Model) -> Self {
        Self {
            uuid: m.uuid,
            tg_id: m.tg_id,
            first_name: m.first_name,
            last_name: m.last_name,
            user_name: m.user_name,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
