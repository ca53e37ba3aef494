use super::CourseId;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Golf course an event is played at
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Course {
    pub id: CourseId,
    pub name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub phone: String,
    pub cost: String,
}
