/// Public (JSON) names of the user fields, as used in client-facing messages.
pub struct UserFields;

impl UserFields {
    pub const UUID: &'static str = "uuid";
    pub const TG_ID: &'static str = "tgId";
    pub const FIRST_NAME: &'static str = "firstName";
    pub const LAST_NAME: &'static str = "lastName";
    pub const USER_NAME: &'static str = "userName";
    pub const CREATED_AT: &'static str = "createdAt";
    pub const UPDATED_AT: &'static str = "updatedAt";

    pub const PAGE: &'static str = "page";
    pub const LIMIT: &'static str = "limit";

    /// Map a storage column name to its public field name.
    #[must_use]
    pub fn from_column(column: &str) -> &str {
        match column {
            "uuid" => Self::UUID,
            "tg_id" => Self::TG_ID,
            "first_name" => Self::FIRST_NAME,
            "last_name" => Self::LAST_NAME,
            "user_name" => Self::USER_NAME,
            "created_at" => Self::CREATED_AT,
            "updated_at" => Self::UPDATED_AT,
            other => other,
        }
    }
}
