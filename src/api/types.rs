use serde::{Deserialize, Serialize};

use crate::entities::{guesses, session_drivers, sessions, users};
use crate::services::DriverStanding;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionDto {
    pub id: i32,
    pub name: String,
    pub session_type: String,
    pub country: Option<String>,
    pub date_start: String,
}

impl From<sessions::Model> for SessionDto {
    fn from(model: sessions::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            session_type: model.session_type,
            country: model.country,
            date_start: model.date_start,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionDriverDto {
    pub driver_number: i32,
    pub driver_name: String,
    pub nationality: Option<String>,
    pub team: Option<String>,
}

impl From<session_drivers::Model> for SessionDriverDto {
    fn from(model: session_drivers::Model) -> Self {
        Self {
            driver_number: model.driver_number,
            driver_name: model.driver_name,
            nationality: model.nationality,
            team: model.team,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GuessDto {
    pub session_id: i32,
    pub position_1_driver_number: i32,
    pub position_2_driver_number: i32,
    pub position_3_driver_number: i32,
}

impl From<guesses::Model> for GuessDto {
    fn from(model: guesses::Model) -> Self {
        Self {
            session_id: model.session_id,
            position_1_driver_number: model.position_1_driver_number,
            position_2_driver_number: model.position_2_driver_number,
            position_3_driver_number: model.position_3_driver_number,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WinnerDto {
    pub user_email: String,
    pub guess: GuessDto,
}

impl From<guesses::Model> for WinnerDto {
    fn from(model: guesses::Model) -> Self {
        Self {
            user_email: model.user_email.clone(),
            guess: model.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StandingDto {
    pub session_id: i32,
    pub standings: Vec<DriverStanding>,
}

#[derive(Debug, Serialize)]
pub struct UserDto {
    pub email: String,
    pub username: String,
}

impl From<users::Model> for UserDto {
    fn from(model: users::Model) -> Self {
        Self {
            email: model.email,
            username: model.username,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SignInDto {
    pub access_token: String,
    pub user: UserDto,
}

#[derive(Debug, Deserialize)]
pub struct GoogleSignInRequest {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct SubmitGuessRequest {
    pub session_id: i32,
    pub position_1_driver_number: i32,
    pub position_2_driver_number: i32,
    pub position_3_driver_number: i32,
}
