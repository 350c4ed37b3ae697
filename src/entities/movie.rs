use sea_orm::entity::prelude::*;

/// A row of the `Movies` table. The table carries no key of its own; `Title`
/// stands in so the entity can be queried, it is not unique.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "Movies")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_name = "Title")]
    pub title: String,
    #[sea_orm(column_name = "Genre")]
    pub genre: String,
    #[sea_orm(column_name = "Rating")]
    pub rating: Option<f64>,
    #[sea_orm(column_name = "Votes")]
    pub votes: Option<i64>,
    /// `hours.minutes`, e.g. `2.15` is two hours fifteen minutes. Read through
    /// a cast so databases that kept it as text still decode.
    #[sea_orm(column_name = "Duration", select_as = "REAL")]
    pub duration: Option<f64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
