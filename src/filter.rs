use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Select,
    sea_query::Expr,
};
use serde::Deserialize;
use tracing::debug;

use crate::{
    entities::movie,
    error::AppResult,
    models::{DurationBucket, Genre, MinRating, SelectionError, VotesBucket},
};

/// Raw form values. Absent and empty fields both mean "not selected".
#[derive(Debug, Default, Deserialize)]
pub struct FilterParams {
    pub genre: Option<String>,
    pub min_rating: Option<String>,
    pub duration: Option<String>,
    pub votes: Option<String>,
}

fn selected(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl FilterParams {
    /// Validates the form. `Ok(None)` means one of genre, duration or votes
    /// is still unselected and nothing should be queried. The rating is only
    /// checked once the form is complete.
    pub fn selection(&self) -> Result<Option<MovieFilter>, SelectionError> {
        let genre = selected(&self.genre).map(str::parse::<Genre>).transpose()?;
        let duration = selected(&self.duration).map(str::parse::<DurationBucket>).transpose()?;
        let votes = selected(&self.votes).map(str::parse::<VotesBucket>).transpose()?;

        let (Some(genre), Some(duration), Some(votes)) = (genre, duration, votes) else {
            return Ok(None);
        };
        let min_rating = match selected(&self.min_rating) {
            Some(raw) => raw.parse()?,
            None => MinRating::DEFAULT,
        };
        Ok(Some(MovieFilter { genre, min_rating, duration, votes }))
    }

    pub fn min_rating_or_default(&self) -> MinRating {
        selected(&self.min_rating).and_then(|raw| raw.parse().ok()).unwrap_or(MinRating::DEFAULT)
    }

    pub fn is(&self, field: &Option<String>, param: &str) -> bool {
        selected(field) == Some(param)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MovieFilter {
    pub genre: Genre,
    pub min_rating: MinRating,
    pub duration: DurationBucket,
    pub votes: VotesBucket,
}

impl MovieFilter {
    /// All four predicates, conjoined. Every value is a bound parameter.
    pub fn select(&self) -> Select<movie::Entity> {
        movie::Entity::find()
            .filter(movie::Column::Genre.eq(self.genre.as_str()))
            .filter(movie::Column::Rating.gte(self.min_rating.value()))
            .filter(duration_condition(self.duration))
            .filter(votes_condition(self.votes))
            .order_by_desc(movie::Column::Rating)
            .order_by_desc(movie::Column::Votes)
    }

    pub async fn fetch(&self, db: &DatabaseConnection) -> AppResult<Vec<movie::Model>> {
        debug!(filter = ?self, "running movie filter");
        let rows = self.select().all(db).await?;
        debug!(matches = rows.len(), "movie filter finished");
        Ok(rows)
    }
}

// Cast so a `Duration` column stored as text still compares numerically.
fn duration_condition(bucket: DurationBucket) -> Condition {
    let (above, at_most) = bucket.bounds();
    let mut cond = Condition::all();
    if let Some(lo) = above {
        cond = cond.add(Expr::cust_with_values(r#"CAST("Duration" AS REAL) > ?"#, [lo]));
    }
    if let Some(hi) = at_most {
        cond = cond.add(Expr::cust_with_values(r#"CAST("Duration" AS REAL) <= ?"#, [hi]));
    }
    cond
}

fn votes_condition(bucket: VotesBucket) -> Condition {
    let (above, at_most) = bucket.bounds();
    let mut cond = Condition::all();
    if let Some(lo) = above {
        cond = cond.add(movie::Column::Votes.gt(lo));
    }
    if let Some(hi) = at_most {
        cond = cond.add(movie::Column::Votes.lte(hi));
    }
    cond
}

#[derive(Debug)]
pub enum FilterOutcome {
    /// No connection was made at startup.
    Disconnected,
    /// The form is incomplete; nothing ran.
    Idle,
    Empty,
    Matches { filter: MovieFilter, rows: Vec<movie::Model> },
    Failed(String),
}

pub async fn run(
    db: Option<&DatabaseConnection>,
    params: &FilterParams,
) -> Result<FilterOutcome, SelectionError> {
    let Some(db) = db else {
        return Ok(FilterOutcome::Disconnected);
    };
    let Some(filter) = params.selection()? else {
        return Ok(FilterOutcome::Idle);
    };

    Ok(match filter.fetch(db).await {
        Ok(rows) if rows.is_empty() => FilterOutcome::Empty,
        Ok(rows) => FilterOutcome::Matches { filter, rows },
        Err(err) => {
            tracing::warn!(error = %err, "movie filter query failed");
            FilterOutcome::Failed(err.to_string())
        },
    })
}

#[cfg(test)]
mod tests {
    use sea_orm::{DbBackend, QueryTrait, Value};

    use super::*;
    use crate::db::testing;

    fn params(genre: &str, min_rating: &str, duration: &str, votes: &str) -> FilterParams {
        let field = |s: &str| Some(s.to_string());
        FilterParams {
            genre: field(genre),
            min_rating: field(min_rating),
            duration: field(duration),
            votes: field(votes),
        }
    }

    fn titles(outcome: &FilterOutcome) -> Vec<&str> {
        match outcome {
            FilterOutcome::Matches { rows, .. } => rows.iter().map(|m| m.title.as_str()).collect(),
            other => panic!("expected matches, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn single_action_movie_matches_all_four_predicates() {
        let db = testing::with_schema().await;
        testing::insert(&db, "Heat Wave", "Action", Some(7.5), Some(5_000), Some(2.10)).await;

        let outcome = run(Some(&db), &params("Action", "7.0", "2-3h", "1001-10000")).await.unwrap();
        assert_eq!(titles(&outcome), vec!["Heat Wave"]);
        let FilterOutcome::Matches { rows, .. } = outcome else { unreachable!() };
        assert_eq!(rows[0].duration, Some(2.10));
    }

    #[tokio::test]
    async fn duration_decodes_from_real_and_text_columns() {
        for column_type in ["REAL", "TEXT"] {
            let db = testing::empty().await;
            let create = format!(
                "CREATE TABLE Movies (Title TEXT, Genre TEXT, Rating REAL, Votes INTEGER, Duration {column_type})"
            );
            sea_orm::ConnectionTrait::execute_unprepared(&db, &create).await.unwrap();
            testing::insert(&db, "Heat Wave", "Action", Some(7.5), Some(5_000), Some(2.10)).await;

            let outcome =
                run(Some(&db), &params("Action", "7.0", "2-3h", "1001-10000")).await.unwrap();
            assert_eq!(titles(&outcome), vec!["Heat Wave"], "{column_type}");
            let FilterOutcome::Matches { rows, .. } = outcome else { unreachable!() };
            assert_eq!(rows[0].duration, Some(2.10), "{column_type}");
        }
    }

    #[tokio::test]
    async fn exactly_three_hours_falls_in_the_two_to_three_bucket() {
        let db = testing::catalogue().await;

        let outcome =
            run(Some(&db), &params("Adventure", "5.0", "2-3h", "1001-10000")).await.unwrap();
        assert_eq!(titles(&outcome), vec!["Long Haul"]);

        let outcome =
            run(Some(&db), &params("Adventure", "5.0", "over-3h", "1001-10000")).await.unwrap();
        assert!(matches!(outcome, FilterOutcome::Empty), "{outcome:?}");
    }

    #[tokio::test]
    async fn bucket_edges_are_upper_inclusive() {
        let db = testing::catalogue().await;

        let outcome = run(Some(&db), &params("Action", "7.0", "2-3h", "1001-10000")).await.unwrap();
        assert_eq!(titles(&outcome), vec!["Heat Wave"]);

        let outcome =
            run(Some(&db), &params("Action", "7.0", "under-2h", "upto-1000")).await.unwrap();
        assert_eq!(titles(&outcome), vec!["Edge Case"]);

        let outcome = run(Some(&db), &params("Crime", "9.5", "2-3h", "1001-10000")).await.unwrap();
        assert_eq!(titles(&outcome), vec!["Cold Case"]);

        let outcome = run(Some(&db), &params("Action", "0", "over-3h", "over-10000")).await.unwrap();
        assert_eq!(titles(&outcome), vec!["Long Siege"]);
    }

    #[tokio::test]
    async fn matches_are_ordered_by_rating_then_votes() {
        let db = testing::catalogue().await;
        let outcome =
            run(Some(&db), &params("Comedy", "0.0", "under-2h", "over-10000")).await.unwrap();
        assert_eq!(titles(&outcome), vec!["Laugh Track", "Laugh Track"]);
        let FilterOutcome::Matches { rows, .. } = outcome else { unreachable!() };
        assert_eq!(rows[0].rating, Some(6.9));
    }

    #[tokio::test]
    async fn nothing_matching_is_empty() {
        let db = testing::catalogue().await;
        let outcome = run(Some(&db), &params("Comedy", "9.0", "2-3h", "over-10000")).await.unwrap();
        assert!(matches!(outcome, FilterOutcome::Empty));
    }

    #[tokio::test]
    async fn incomplete_selection_runs_nothing() {
        // No table at all: any query would fail, so Idle proves none ran.
        let db = testing::empty().await;
        for p in [
            params("", "7.0", "2-3h", "1001-10000"),
            params("Action", "7.0", "", "1001-10000"),
            params("Action", "7.0", "2-3h", ""),
            FilterParams::default(),
        ] {
            let outcome = run(Some(&db), &p).await.unwrap();
            assert!(matches!(outcome, FilterOutcome::Idle), "{p:?} gave {outcome:?}");
        }
    }

    #[tokio::test]
    async fn query_failures_are_reported_not_raised() {
        let db = testing::empty().await;
        let outcome = run(Some(&db), &params("Action", "7.0", "2-3h", "1001-10000")).await.unwrap();
        let FilterOutcome::Failed(msg) = outcome else { panic!("expected failure") };
        assert!(msg.contains("no such table"), "{msg}");
    }

    #[tokio::test]
    async fn without_a_connection_the_filter_is_disabled() {
        let outcome = run(None, &params("Action", "7.0", "2-3h", "1001-10000")).await.unwrap();
        assert!(matches!(outcome, FilterOutcome::Disconnected));
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            params("Western", "7.0", "2-3h", "upto-1000").selection(),
            Err(SelectionError::UnknownGenre(_))
        ));
        assert!(matches!(
            params("Action", "eleven", "2-3h", "upto-1000").selection(),
            Err(SelectionError::InvalidRating(_))
        ));
        assert!(matches!(
            params("Action", "7.0", "4h", "upto-1000").selection(),
            Err(SelectionError::UnknownDuration(_))
        ));
        assert!(matches!(
            params("Action", "7.0", "2-3h", "lots").selection(),
            Err(SelectionError::UnknownVotes(_))
        ));
    }

    #[test]
    fn a_bad_rating_does_not_matter_until_the_form_is_complete() {
        assert!(matches!(params("", "abc", "2-3h", "upto-1000").selection(), Ok(None)));
        assert!(matches!(params("Action", "abc", "", "upto-1000").selection(), Ok(None)));
        assert!(matches!(
            params("Action", "abc", "2-3h", "upto-1000").selection(),
            Err(SelectionError::InvalidRating(_))
        ));
    }

    #[test]
    fn missing_rating_defaults_to_five() {
        let p = FilterParams { min_rating: None, ..params("Crime", "", "2-3h", "upto-1000") };
        let filter = p.selection().unwrap().unwrap();
        assert_eq!(filter.min_rating, MinRating::DEFAULT);
        assert_eq!(p.min_rating_or_default().value(), 5.0);
    }

    #[test]
    fn selections_are_bound_not_interpolated() {
        let filter = params("Action", "7.0", "2-3h", "1001-10000").selection().unwrap().unwrap();
        let stmt = filter.select().build(DbBackend::Sqlite);

        assert!(!stmt.sql.contains("Action"), "{}", stmt.sql);
        assert!(!stmt.sql.contains("10000"), "{}", stmt.sql);
        let values = stmt.values.expect("bound values").0;
        assert!(values.contains(&Value::from("Action")));
        assert!(values.contains(&Value::from(7.0_f64)));
        assert!(values.contains(&Value::from(10_000_i64)));
    }
}
