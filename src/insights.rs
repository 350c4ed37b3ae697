use sea_orm::{ConnectionTrait, DatabaseConnection, FromQueryResult, Statement, Value};
use tracing::{debug, warn};

use crate::{
    error::AppResult,
    models::{
        BarChart, DataTable, Panel, RatingHistogram, ScatterPlot, Section, format_count,
        format_hours_minutes, format_opt,
    },
};

/// `hours.minutes` to minutes, in SQL. Must agree with `models::duration_minutes`.
const DURATION_MINUTES: &str = "CAST(Duration AS INTEGER) * 60 \
     + CAST(ROUND((CAST(Duration AS REAL) - CAST(Duration AS INTEGER)) * 100) AS INTEGER)";

struct Heading {
    title: &'static str,
    caption: &'static str,
}

const HEADINGS: [Heading; 10] = [
    Heading {
        title: "Top Movies by Rating and Voting Counts",
        caption: "Highest ratings and significant voting engagement",
    },
    Heading { title: "Genre Distribution", caption: "Movie count by genre" },
    Heading { title: "Average Duration of Movies", caption: "Average movie duration per genre" },
    Heading { title: "Voting Trends by Genre", caption: "Average voting counts per genre" },
    Heading { title: "Rating Distribution", caption: "Histogram of movie ratings" },
    Heading { title: "Genre-Based Rating Leaders", caption: "Top-rated movie for each genre" },
    Heading {
        title: "Most Popular Genres by Voting",
        caption: "Share of all votes cast, per genre",
    },
    Heading { title: "Duration Extremes", caption: "Shortest and longest movies" },
    Heading { title: "Ratings by Genre", caption: "Average rating across genres" },
    Heading {
        title: "Correlation Analysis",
        caption: "Relationship between ratings and voting counts",
    },
];

/// Runs every aggregate in order. A failing query only replaces its own
/// section with a warning.
pub async fn dashboard(db: Option<&DatabaseConnection>, top_movies_limit: u64) -> Vec<Section> {
    let Some(db) = db else {
        return HEADINGS
            .iter()
            .map(|h| section(h, Err("database connection is unavailable".to_string())))
            .collect();
    };

    let results: [AppResult<Vec<Panel>>; 10] = [
        top_movies(db, top_movies_limit).await,
        genre_distribution(db).await,
        average_duration(db).await,
        voting_trends(db).await,
        rating_distribution(db).await,
        rating_leaders(db).await,
        vote_share(db).await,
        duration_extremes(db).await,
        average_rating(db).await,
        rating_votes_correlation(db).await,
    ];

    HEADINGS
        .iter()
        .zip(results)
        .map(|(heading, result)| {
            let result = result.map_err(|err| {
                warn!(section = heading.title, error = %err, "aggregate query failed");
                err.to_string()
            });
            section(heading, result)
        })
        .collect()
}

fn section(heading: &Heading, body: Result<Vec<Panel>, String>) -> Section {
    Section { heading: heading.title, caption: heading.caption, body }
}

async fn fetch<T: FromQueryResult>(
    db: &DatabaseConnection,
    sql: &str,
    values: Vec<Value>,
) -> AppResult<Vec<T>> {
    let rows = T::find_by_statement(Statement::from_sql_and_values(
        db.get_database_backend(),
        sql,
        values,
    ))
    .all(db)
    .await?;
    debug!(rows = rows.len(), "aggregate fetched");
    Ok(rows)
}

#[derive(Debug, FromQueryResult)]
struct TopMovie {
    title: String,
    rating: Option<f64>,
    votes: Option<i64>,
}

async fn top_movies(db: &DatabaseConnection, limit: u64) -> AppResult<Vec<Panel>> {
    let sql = r#"
        WITH ranked AS (
            SELECT Title AS title, Rating AS rating, Votes AS votes,
                ROW_NUMBER() OVER (PARTITION BY Title ORDER BY Votes DESC, Rating DESC) AS rn
            FROM Movies
        )
        SELECT title, rating, votes FROM ranked
        WHERE rn = 1
        ORDER BY votes DESC, rating DESC
        LIMIT ?"#;
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    let rows: Vec<TopMovie> = fetch(db, sql, vec![limit.into()]).await?;

    Ok(vec![Panel::Table(DataTable {
        columns: vec!["Title", "Rating", "Votes"],
        rows: rows
            .into_iter()
            .map(|m| vec![m.title, format_opt(m.rating), m.votes.map(format_count).unwrap_or_default()])
            .collect(),
    })])
}

#[derive(Debug, FromQueryResult)]
struct GenreCount {
    genre: Option<String>,
    count: i64,
}

async fn genre_distribution(db: &DatabaseConnection) -> AppResult<Vec<Panel>> {
    let sql = r#"
        SELECT Genre AS genre, COUNT(*) AS count
        FROM Movies
        GROUP BY Genre
        ORDER BY count DESC, genre"#;
    let rows: Vec<GenreCount> = fetch(db, sql, vec![]).await?;

    let bars = rows.iter().map(|r| (format_opt(r.genre.as_ref()), r.count as f64)).collect();
    let table = DataTable {
        columns: vec!["Genre", "Count"],
        rows: rows.into_iter().map(|r| vec![format_opt(r.genre), r.count.to_string()]).collect(),
    };
    Ok(vec![Panel::Table(table), Panel::Bars(BarChart { y_label: "Movies", bars })])
}

#[derive(Debug, FromQueryResult)]
struct GenreAverage {
    genre: Option<String>,
    average: Option<f64>,
}

impl GenreAverage {
    fn panels(rows: Vec<Self>, column: &'static str, y_label: &'static str) -> Vec<Panel> {
        let bars = rows
            .iter()
            .filter_map(|r| Some((format_opt(r.genre.as_ref()), r.average?)))
            .collect();
        let table = DataTable {
            columns: vec!["Genre", column],
            rows: rows
                .into_iter()
                .map(|r| vec![format_opt(r.genre), format_opt(r.average)])
                .collect(),
        };
        vec![Panel::Table(table), Panel::Bars(BarChart { y_label, bars })]
    }
}

async fn average_duration(db: &DatabaseConnection) -> AppResult<Vec<Panel>> {
    let sql = format!(
        r#"
        WITH converted AS (
            SELECT Genre AS genre, {DURATION_MINUTES} AS minutes
            FROM Movies
            WHERE Duration IS NOT NULL AND TRIM(Duration) <> ''
        )
        SELECT genre, ROUND(AVG(minutes), 2) AS average
        FROM converted
        GROUP BY genre
        ORDER BY average, genre"#
    );
    let rows: Vec<GenreAverage> = fetch(db, &sql, vec![]).await?;
    Ok(GenreAverage::panels(rows, "Avg Duration (min)", "Minutes"))
}

async fn voting_trends(db: &DatabaseConnection) -> AppResult<Vec<Panel>> {
    let sql = r#"
        SELECT Genre AS genre, ROUND(SUM(Votes) * 1.0 / COUNT(Title), 2) AS average
        FROM Movies
        GROUP BY Genre
        ORDER BY average DESC, genre"#;
    let rows: Vec<GenreAverage> = fetch(db, sql, vec![]).await?;

    Ok(vec![Panel::Table(DataTable {
        columns: vec!["Genre", "Avg Votes Per Movie"],
        rows: rows.into_iter().map(|r| vec![format_opt(r.genre), format_opt(r.average)]).collect(),
    })])
}

#[derive(Debug, FromQueryResult)]
struct RatingRow {
    rating: f64,
}

async fn rating_distribution(db: &DatabaseConnection) -> AppResult<Vec<Panel>> {
    let sql = "SELECT Rating AS rating FROM Movies WHERE Rating IS NOT NULL";
    let rows: Vec<RatingRow> = fetch(db, sql, vec![]).await?;
    let fetched = rows.len();
    let hist = RatingHistogram::from_ratings(rows.into_iter().map(|r| r.rating));
    if hist.total() as usize != fetched {
        debug!(dropped = fetched - hist.total() as usize, "ratings outside 0..=10 left out of histogram");
    }

    let table = DataTable {
        columns: vec!["Bin Range", "Frequency"],
        rows: hist.bins().map(|(label, count)| vec![label, count.to_string()]).collect(),
    };
    let bars = hist.bins().map(|(label, count)| (label, count as f64)).collect();
    Ok(vec![Panel::Table(table), Panel::Bars(BarChart { y_label: "Movies", bars })])
}

#[derive(Debug, FromQueryResult)]
struct Leader {
    genre: Option<String>,
    title: String,
    rating: f64,
}

async fn rating_leaders(db: &DatabaseConnection) -> AppResult<Vec<Panel>> {
    let sql = r#"
        WITH ranked AS (
            SELECT Genre AS genre, Title AS title, Rating AS rating,
                RANK() OVER (PARTITION BY Genre ORDER BY Rating DESC) AS rnk
            FROM Movies
            WHERE Rating IS NOT NULL
        )
        SELECT genre, title, rating FROM ranked
        WHERE rnk = 1
        ORDER BY genre, title"#;
    let rows: Vec<Leader> = fetch(db, sql, vec![]).await?;

    Ok(vec![Panel::Table(DataTable {
        columns: vec!["Genre", "Title", "Rating"],
        rows: rows
            .into_iter()
            .map(|r| vec![format_opt(r.genre), r.title, r.rating.to_string()])
            .collect(),
    })])
}

#[derive(Debug, FromQueryResult)]
struct GenreShare {
    genre: Option<String>,
    total_votes: i64,
    percentage: Option<f64>,
}

async fn vote_share(db: &DatabaseConnection) -> AppResult<Vec<Panel>> {
    let sql = r#"
        WITH genre_votes AS (
            SELECT Genre AS genre, SUM(Votes) AS total_votes
            FROM Movies
            WHERE Votes IS NOT NULL
            GROUP BY Genre
        ),
        total AS (SELECT SUM(total_votes) AS grand_total FROM genre_votes)
        SELECT gv.genre AS genre, gv.total_votes AS total_votes,
            ROUND((gv.total_votes * 100.0) / t.grand_total, 1) AS percentage
        FROM genre_votes gv, total t
        ORDER BY gv.total_votes DESC, gv.genre"#;
    let rows: Vec<GenreShare> = fetch(db, sql, vec![]).await?;

    let bars = rows
        .iter()
        .filter_map(|r| Some((format_opt(r.genre.as_ref()), r.percentage?)))
        .collect();
    let table = DataTable {
        columns: vec!["Genre", "Total Votes", "Percentage (%)"],
        rows: rows
            .into_iter()
            .map(|r| vec![format_opt(r.genre), format_count(r.total_votes), format_opt(r.percentage)])
            .collect(),
    };
    Ok(vec![Panel::Table(table), Panel::Bars(BarChart { y_label: "% of votes", bars })])
}

#[derive(Debug, FromQueryResult)]
struct Extreme {
    label: String,
    title: String,
    genre: Option<String>,
    minutes: i64,
}

async fn duration_extremes(db: &DatabaseConnection) -> AppResult<Vec<Panel>> {
    let sql = format!(
        r#"
        WITH converted AS (
            SELECT Title AS title, Genre AS genre, {DURATION_MINUTES} AS minutes
            FROM Movies
            WHERE Duration IS NOT NULL AND TRIM(Duration) <> ''
        ),
        bounds AS (SELECT MIN(minutes) AS shortest, MAX(minutes) AS longest FROM converted)
        SELECT 'Shortest Movie' AS label, c.title AS title, c.genre AS genre, c.minutes AS minutes
        FROM converted c, bounds b WHERE c.minutes = b.shortest
        UNION ALL
        SELECT 'Longest Movie' AS label, c.title AS title, c.genre AS genre, c.minutes AS minutes
        FROM converted c, bounds b WHERE c.minutes = b.longest"#
    );
    let rows: Vec<Extreme> = fetch(db, &sql, vec![]).await?;

    Ok(vec![Panel::Table(DataTable {
        columns: vec!["Label", "Title", "Genre", "Duration"],
        rows: rows
            .into_iter()
            .map(|r| vec![r.label, r.title, format_opt(r.genre), format_hours_minutes(r.minutes)])
            .collect(),
    })])
}

async fn average_rating(db: &DatabaseConnection) -> AppResult<Vec<Panel>> {
    let sql = r#"
        SELECT Genre AS genre, ROUND(AVG(Rating), 2) AS average
        FROM Movies
        GROUP BY Genre
        ORDER BY average DESC, genre"#;
    let rows: Vec<GenreAverage> = fetch(db, sql, vec![]).await?;
    Ok(GenreAverage::panels(rows, "Avg Rating", "Rating"))
}

#[derive(Debug, FromQueryResult)]
struct RatingVotes {
    rating: f64,
    votes: i64,
}

async fn rating_votes_correlation(db: &DatabaseConnection) -> AppResult<Vec<Panel>> {
    let sql = r#"
        SELECT Rating AS rating, Votes AS votes
        FROM Movies
        WHERE Rating IS NOT NULL AND Votes IS NOT NULL
        ORDER BY Rating DESC, Votes DESC"#;
    let rows: Vec<RatingVotes> = fetch(db, sql, vec![]).await?;
    let points: Vec<(f64, f64)> = rows.into_iter().map(|r| (r.rating, r.votes as f64)).collect();

    Ok(vec![Panel::Scatter(ScatterPlot {
        x_label: "Movie Ratings",
        y_label: "Total Votes",
        correlation: pearson(&points),
        points,
    })])
}

/// Pearson's r, or `None` when it is undefined.
pub fn pearson(points: &[(f64, f64)]) -> Option<f64> {
    if points.len() < 2 {
        return None;
    }
    let n = points.len() as f64;
    let (mean_x, mean_y) = {
        let (sx, sy) = points.iter().fold((0.0, 0.0), |(sx, sy), &(x, y)| (sx + x, sy + y));
        (sx / n, sy / n)
    };
    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for &(x, y) in points {
        let (dx, dy) = (x - mean_x, y - mean_y);
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some(cov / (var_x.sqrt() * var_y.sqrt()))
}
