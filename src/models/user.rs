use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,

    /// Opaque identifier issued by the identity provider. Unique, immutable,
    /// and the join key for every lookup coming in over the API.
    pub firebase_uid: String,

    pub username: String,
    pub email: String,
    pub profile_picture: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub username: String,
    pub email: String,
    pub profile_picture: Option<String>,
}

impl From<User> for UserDto {
    fn from(u: User) -> Self {
        UserDto {
            username: u.username,
            email: u.email,
            profile_picture: u.profile_picture,
        }
    }
}
