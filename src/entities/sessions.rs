use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "sessions")]
pub struct Model {
    /// Session key assigned by the external race-data provider.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,

    pub name: String,

    /// "Qualifying", "Race", "Sprint", ... Only allow-listed types are stored.
    pub session_type: String,

    pub country: Option<String>,

    /// RFC 3339 start time. Guess submissions are locked once this passes.
    pub date_start: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::session_drivers::Entity")]
    SessionDrivers,
    #[sea_orm(has_one = "super::session_results::Entity")]
    SessionResults,
    #[sea_orm(has_many = "super::guesses::Entity")]
    Guesses,
}

impl Related<super::session_drivers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SessionDrivers.def()
    }
}

impl Related<super::session_results::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SessionResults.def()
    }
}

impl Related<super::guesses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Guesses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
