use std::{fmt, str::FromStr};

#[derive(Debug, thiserror::Error)]
pub enum SelectionError {
    #[error("unknown genre {0:?}")]
    UnknownGenre(String),
    #[error("unknown duration range {0:?}")]
    UnknownDuration(String),
    #[error("unknown votes range {0:?}")]
    UnknownVotes(String),
    #[error("minimum rating must be a number between 0.0 and 10.0, got {0:?}")]
    InvalidRating(String),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Genre {
    Action,
    Adventure,
    Animation,
    Comedy,
    Crime,
}

impl Genre {
    pub const ALL: [Genre; 5] =
        [Genre::Action, Genre::Adventure, Genre::Animation, Genre::Comedy, Genre::Crime];

    pub fn as_str(self) -> &'static str {
        match self {
            Genre::Action => "Action",
            Genre::Adventure => "Adventure",
            Genre::Animation => "Animation",
            Genre::Comedy => "Comedy",
            Genre::Crime => "Crime",
        }
    }
}

impl FromStr for Genre {
    type Err = SelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Genre::ALL
            .into_iter()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| SelectionError::UnknownGenre(s.to_string()))
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Duration ranges, compared against the raw `hours.minutes` value.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DurationBucket {
    UnderTwoHours,
    TwoToThreeHours,
    OverThreeHours,
}

impl DurationBucket {
    pub const ALL: [DurationBucket; 3] = [
        DurationBucket::UnderTwoHours,
        DurationBucket::TwoToThreeHours,
        DurationBucket::OverThreeHours,
    ];

    pub fn as_param(self) -> &'static str {
        match self {
            DurationBucket::UnderTwoHours => "under-2h",
            DurationBucket::TwoToThreeHours => "2-3h",
            DurationBucket::OverThreeHours => "over-3h",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DurationBucket::UnderTwoHours => "< 2 hrs",
            DurationBucket::TwoToThreeHours => "2 - 3 hrs",
            DurationBucket::OverThreeHours => "> 3 hrs",
        }
    }

    /// Exclusive lower and inclusive upper bound, in raw duration units.
    pub fn bounds(self) -> (Option<f64>, Option<f64>) {
        match self {
            DurationBucket::UnderTwoHours => (None, Some(2.0)),
            DurationBucket::TwoToThreeHours => (Some(2.0), Some(3.0)),
            DurationBucket::OverThreeHours => (Some(3.0), None),
        }
    }
}

impl FromStr for DurationBucket {
    type Err = SelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DurationBucket::ALL
            .into_iter()
            .find(|b| b.as_param() == s)
            .ok_or_else(|| SelectionError::UnknownDuration(s.to_string()))
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum VotesBucket {
    UpToThousand,
    ThousandToTenThousand,
    OverTenThousand,
}

impl VotesBucket {
    pub const ALL: [VotesBucket; 3] = [
        VotesBucket::UpToThousand,
        VotesBucket::ThousandToTenThousand,
        VotesBucket::OverTenThousand,
    ];

    pub fn as_param(self) -> &'static str {
        match self {
            VotesBucket::UpToThousand => "upto-1000",
            VotesBucket::ThousandToTenThousand => "1001-10000",
            VotesBucket::OverTenThousand => "over-10000",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            VotesBucket::UpToThousand => "≤ 1,000",
            VotesBucket::ThousandToTenThousand => "1,001 to 10,000",
            VotesBucket::OverTenThousand => "> 10,000",
        }
    }

    /// Exclusive lower and inclusive upper bound.
    pub fn bounds(self) -> (Option<i64>, Option<i64>) {
        match self {
            VotesBucket::UpToThousand => (None, Some(1_000)),
            VotesBucket::ThousandToTenThousand => (Some(1_000), Some(10_000)),
            VotesBucket::OverTenThousand => (Some(10_000), None),
        }
    }
}

impl FromStr for VotesBucket {
    type Err = SelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VotesBucket::ALL
            .into_iter()
            .find(|b| b.as_param() == s)
            .ok_or_else(|| SelectionError::UnknownVotes(s.to_string()))
    }
}

/// A minimum rating on the 0.0..=10.0 scale, snapped to one decimal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MinRating(f64);

impl MinRating {
    pub const DEFAULT: MinRating = MinRating(5.0);

    pub fn value(self) -> f64 {
        self.0
    }
}

impl FromStr for MinRating {
    type Err = SelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw: f64 = s.trim().parse().map_err(|_| SelectionError::InvalidRating(s.to_string()))?;
        if !raw.is_finite() || !(0.0..=10.0).contains(&raw) {
            return Err(SelectionError::InvalidRating(s.to_string()));
        }
        Ok(MinRating((raw * 10.0).round() / 10.0))
    }
}

impl fmt::Display for MinRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}

/// Converts an `hours.minutes` duration into minutes. The first two decimals
/// are the minute count, so `2.1` and `2.10` are both 130.
pub fn duration_minutes(value: f64) -> Option<u32> {
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    let text = format!("{value:.2}");
    let (hours, minutes) = text.split_once('.')?;
    let hours: u32 = hours.parse().ok()?;
    let minutes: u32 = minutes.parse().ok()?;
    hours.checked_mul(60)?.checked_add(minutes)
}

pub fn format_hours_minutes(minutes: i64) -> String {
    format!("{} hr {} min", minutes / 60, minutes % 60)
}

pub fn format_count(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

pub fn format_opt<T: fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Counts of ratings per integer bin over 0..=10.
///
/// Bins are right-closed, `(a, b]`, except the first which also takes 0.
/// Anything outside the scale is dropped.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RatingHistogram {
    counts: [u64; 10],
}

impl RatingHistogram {
    pub fn from_ratings(ratings: impl IntoIterator<Item = f64>) -> Self {
        let mut hist = Self::default();
        for rating in ratings {
            if let Some(bin) = Self::bin_of(rating) {
                hist.counts[bin] += 1;
            }
        }
        hist
    }

    pub fn bin_of(rating: f64) -> Option<usize> {
        if !(0.0..=10.0).contains(&rating) {
            return None;
        }
        if rating == 0.0 {
            return Some(0);
        }
        Some(rating.ceil() as usize - 1)
    }

    pub fn label(bin: usize) -> String {
        format!("{} - {}", bin, bin + 1)
    }

    pub fn bins(&self) -> impl Iterator<Item = (String, u64)> + '_ {
        self.counts.iter().enumerate().map(|(i, &c)| (Self::label(i), c))
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}

#[derive(Clone, Debug)]
pub struct DataTable {
    pub columns: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Clone, Debug)]
pub struct BarChart {
    pub y_label: &'static str,
    pub bars: Vec<(String, f64)>,
}

#[derive(Clone, Debug)]
pub struct ScatterPlot {
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub points: Vec<(f64, f64)>,
    pub correlation: Option<f64>,
}

#[derive(Clone, Debug)]
pub enum Panel {
    Table(DataTable),
    Bars(BarChart),
    Scatter(ScatterPlot),
}

/// One rendered aggregate: its panels, or the error that replaced them.
#[derive(Clone, Debug)]
pub struct Section {
    pub heading: &'static str,
    pub caption: &'static str,
    pub body: Result<Vec<Panel>, String>,
}
