pub use super::guesses::Entity as Guesses;
pub use super::session_drivers::Entity as SessionDrivers;
pub use super::session_results::Entity as SessionResults;
pub use super::sessions::Entity as Sessions;
pub use super::users::Entity as Users;
