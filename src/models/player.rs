use super::{EventId, PlayerId};
use crate::error::{AppError, AppResult};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Player account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub username: String,
    pub created_at: NaiveDateTime,
}

/// Player with the ids of their friends and accepted events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProfile {
    #[serde(flatten)]
    pub player: Player,
    pub friends: Vec<PlayerId>,
    pub events: Vec<EventId>,
}

/// Profile creation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPlayer {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub username: String,
}

impl NewPlayer {
    /// Trim fields, lower-case the email and reject blanks
    pub fn normalized(self) -> AppResult<Self> {
        let player = Self {
            name: self.name.trim().to_string(),
            phone: self.phone.trim().to_string(),
            email: self.email.trim().to_lowercase(),
            username: self.username.trim().to_string(),
        };

        let required = [
            ("Name", &player.name),
            ("Phone", &player.phone),
            ("Email", &player.email),
            ("Username", &player.username),
        ];
        for (field, value) in required {
            if value.is_empty() {
                return Err(AppError::Validation(format!("{} can't be blank", field)));
            }
        }

        if !is_valid_email(&player.email) {
            return Err(AppError::Validation("Email is invalid".into()));
        }

        Ok(player)
    }
}

/// `local@domain.tld` with no whitespace and an alphabetic TLD of 2+ chars
fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || email.chars().any(char::is_whitespace) || domain.contains('@') {
        return false;
    }
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    !host.is_empty()
        && host.split('.').all(|label| {
            !label.is_empty() && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
        && tld.len() >= 2
        && tld.chars().all(|c| c.is_ascii_alphabetic())
}
