use maud::{DOCTYPE, Markup, html};

use crate::{
    entities::movie,
    filter::{FilterOutcome, FilterParams},
    models::{
        BarChart, DataTable, DurationBucket, Genre, Panel, ScatterPlot, Section, VotesBucket,
        duration_minutes, format_count, format_opt,
    },
};

const TAILWIND_CDN: &str = "https://cdn.tailwindcss.com";

const CHART_WIDTH: f64 = 640.0;
const CHART_HEIGHT: f64 = 260.0;
const CHART_PAD: f64 = 40.0;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Page {
    Visualizations,
    Filter,
}

pub fn visualizations_page(sections: &[Section]) -> String {
    page(
        "Data Visualizations",
        Some(Page::Visualizations),
        html! {
            h1 class="text-3xl font-bold text-gray-900" { "Movie Ratings Dashboard" }
            div class="mt-8 space-y-8" {
                @for section in sections {
                    (section_card(section))
                }
            }
        },
    )
}

pub fn filter_page(params: &FilterParams, outcome: &FilterOutcome) -> String {
    page(
        "Data Filter",
        Some(Page::Filter),
        html! {
            h1 class="text-3xl font-bold text-gray-900" { "Filtering Page" }
            @if let FilterOutcome::Disconnected = outcome {
                (warning("Database connection is stopped"))
            } @else {
                (filter_form(params))
                div id="results" class="mt-8" {
                    (filter_results(outcome))
                }
            }
        },
    )
}

pub fn error_page(message: String) -> String {
    page(
        "Error",
        None,
        html! {
            div class="bg-white shadow rounded-lg p-8" {
                h1 class="text-2xl font-bold text-gray-900" { "Error" }
                p class="mt-4 text-gray-700" { (message) }
                a class="mt-6 inline-block text-blue-600 hover:text-blue-800" href="/filter" { "Back" }
            }
        },
    )
}

fn page(title: &str, active: Option<Page>, body: Markup) -> String {
    let nav = [("Data Visualizations", "/", Page::Visualizations), ("Data Filter", "/filter", Page::Filter)];

    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                script src=(TAILWIND_CDN) {}
            }
            body class="min-h-screen bg-gray-50" {
                div class="flex" {
                    nav class="w-56 shrink-0 min-h-screen bg-white border-r border-gray-200 p-6" {
                        h2 class="text-lg font-semibold text-gray-900" { "Page" }
                        ul class="mt-4 space-y-2" {
                            @for (label, href, target) in nav {
                                li {
                                    @if active == Some(target) {
                                        a class="block rounded-md bg-blue-50 px-3 py-2 font-medium text-blue-700" href=(href) { (label) }
                                    } @else {
                                        a class="block rounded-md px-3 py-2 text-gray-700 hover:bg-gray-100" href=(href) { (label) }
                                    }
                                }
                            }
                        }
                    }
                    main class="flex-1 max-w-5xl px-8 py-10" { (body) }
                }
            }
        }
    }
    .into_string()
}

fn warning(message: &str) -> Markup {
    html! {
        div class="mt-4 rounded-md border border-yellow-300 bg-yellow-50 px-4 py-3 text-sm text-yellow-800" role="alert" {
            (message)
        }
    }
}

fn section_card(section: &Section) -> Markup {
    html! {
        section class="bg-white shadow rounded-lg p-6" {
            h2 class="text-xl font-semibold text-gray-900" { (section.heading) }
            p class="mt-1 text-sm text-gray-500" { (section.caption) }
            @match &section.body {
                Ok(panels) => {
                    @for panel in panels {
                        div class="mt-4" { (render_panel(panel)) }
                    }
                },
                Err(message) => {
                    (warning(&format!("Error -> {message}")))
                },
            }
        }
    }
}

fn render_panel(panel: &Panel) -> Markup {
    match panel {
        Panel::Table(table) => data_table(table),
        Panel::Bars(chart) => bar_chart(chart),
        Panel::Scatter(plot) => scatter_plot(plot),
    }
}

fn data_table(table: &DataTable) -> Markup {
    html! {
        div class="overflow-x-auto" {
            table class="min-w-full divide-y divide-gray-200 text-sm" {
                thead class="bg-gray-50" {
                    tr {
                        @for column in &table.columns {
                            th class="px-3 py-2 text-left font-semibold text-gray-700" { (column) }
                        }
                    }
                }
                tbody class="divide-y divide-gray-100" {
                    @for row in &table.rows {
                        tr {
                            @for cell in row {
                                td class="px-3 py-2 text-gray-700" { (cell) }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn bar_chart(chart: &BarChart) -> Markup {
    let max = chart.bars.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);
    let plot_height = CHART_HEIGHT - 2.0 * CHART_PAD;
    let slot = (CHART_WIDTH - 2.0 * CHART_PAD) / chart.bars.len().max(1) as f64;

    html! {
        svg class="w-full" viewBox=(format!("0 0 {CHART_WIDTH} {CHART_HEIGHT}")) role="img" aria-label=(chart.y_label) {
            line x1=(fmt_px(CHART_PAD)) y1=(fmt_px(CHART_HEIGHT - CHART_PAD)) x2=(fmt_px(CHART_WIDTH - CHART_PAD)) y2=(fmt_px(CHART_HEIGHT - CHART_PAD)) stroke="#9ca3af" {}
            text x="8" y=(fmt_px(CHART_PAD - 16.0)) font-size="11" fill="#6b7280" { (chart.y_label) }
            @for (i, (label, value)) in chart.bars.iter().enumerate() {
                @let height = if max > 0.0 { value / max * plot_height } else { 0.0 };
                @let x = CHART_PAD + i as f64 * slot;
                rect x=(fmt_px(x + slot * 0.15)) y=(fmt_px(CHART_HEIGHT - CHART_PAD - height)) width=(fmt_px(slot * 0.7)) height=(fmt_px(height)) fill="#3b82f6" {
                    title { (label) ": " (value.to_string()) }
                }
                text x=(fmt_px(x + slot / 2.0)) y=(fmt_px(CHART_HEIGHT - CHART_PAD + 14.0)) font-size="10" text-anchor="middle" fill="#374151" { (label) }
            }
        }
    }
}

fn scatter_plot(plot: &ScatterPlot) -> Markup {
    let (min_x, max_x) = bounds(plot.points.iter().map(|p| p.0));
    let (min_y, max_y) = bounds(plot.points.iter().map(|p| p.1));
    let scale = |v: f64, lo: f64, hi: f64, span: f64| {
        if hi > lo { (v - lo) / (hi - lo) * span } else { span / 2.0 }
    };
    let span_x = CHART_WIDTH - 2.0 * CHART_PAD;
    let span_y = CHART_HEIGHT - 2.0 * CHART_PAD;

    html! {
        svg class="w-full" viewBox=(format!("0 0 {CHART_WIDTH} {CHART_HEIGHT}")) role="img" aria-label=(format!("{} vs {}", plot.x_label, plot.y_label)) {
            line x1=(fmt_px(CHART_PAD)) y1=(fmt_px(CHART_HEIGHT - CHART_PAD)) x2=(fmt_px(CHART_WIDTH - CHART_PAD)) y2=(fmt_px(CHART_HEIGHT - CHART_PAD)) stroke="#9ca3af" {}
            line x1=(fmt_px(CHART_PAD)) y1=(fmt_px(CHART_PAD)) x2=(fmt_px(CHART_PAD)) y2=(fmt_px(CHART_HEIGHT - CHART_PAD)) stroke="#9ca3af" {}
            text x=(fmt_px(CHART_WIDTH / 2.0)) y=(fmt_px(CHART_HEIGHT - 8.0)) font-size="11" text-anchor="middle" fill="#6b7280" { (plot.x_label) }
            text x="8" y=(fmt_px(CHART_PAD - 16.0)) font-size="11" fill="#6b7280" { (plot.y_label) }
            @for (x, y) in &plot.points {
                circle cx=(fmt_px(CHART_PAD + scale(*x, min_x, max_x, span_x))) cy=(fmt_px(CHART_HEIGHT - CHART_PAD - scale(*y, min_y, max_y, span_y))) r="3" fill="#4169e1" fill-opacity="0.6" stroke="#000" stroke-width="0.5" {}
            }
        }
        p class="mt-2 text-sm text-gray-600" {
            @match plot.correlation {
                Some(r) => {
                    "Pearson correlation: " (format!("{r:.3}")) " across " (plot.points.len()) " movies"
                },
                None => {
                    "Not enough data to compute a correlation."
                },
            }
        }
    }
}

fn bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)))
}

fn fmt_px(v: f64) -> String {
    format!("{v:.1}")
}

fn filter_form(params: &FilterParams) -> Markup {
    let rating = params.min_rating_or_default().to_string();

    html! {
        form class="mt-6 bg-white shadow rounded-lg p-6 space-y-6" method="get" action="/filter" onchange="this.submit()" {
            h2 class="text-xl font-semibold text-gray-900" { "Select Filters" }

            div {
                label class="block text-sm font-medium text-gray-700" for="duration" { "Select a Duration Range (Hours)" }
                select class="mt-2 w-full rounded-md border border-gray-300 px-3 py-2" name="duration" id="duration" {
                    option value="" { "click here to select range" }
                    @for bucket in DurationBucket::ALL {
                        option value=(bucket.as_param()) selected[params.is(&params.duration, bucket.as_param())] { (bucket.label()) }
                    }
                }
            }

            div {
                label class="block text-sm font-medium text-gray-700" for="min_rating" { "Select a minimum IMDb Rating" }
                div class="mt-2 flex items-center gap-4" {
                    input class="flex-1" type="range" name="min_rating" id="min_rating" min="0" max="10" step="0.1" value=(rating) oninput="this.nextElementSibling.textContent = Number(this.value).toFixed(1)";
                    output class="w-12 text-right font-mono text-gray-700" { (rating) }
                }
            }

            div {
                label class="block text-sm font-medium text-gray-700" for="votes" { "Select a Votes Range" }
                select class="mt-2 w-full rounded-md border border-gray-300 px-3 py-2" name="votes" id="votes" {
                    option value="" { "click here to select range" }
                    @for bucket in VotesBucket::ALL {
                        option value=(bucket.as_param()) selected[params.is(&params.votes, bucket.as_param())] { (bucket.label()) }
                    }
                }
            }

            fieldset {
                legend class="block text-sm font-medium text-gray-700" { "Select a Genre" }
                div class="mt-2 flex flex-wrap gap-4" {
                    @for genre in Genre::ALL {
                        label class="inline-flex items-center gap-2 text-gray-700" {
                            input type="radio" name="genre" value=(genre.as_str()) checked[params.is(&params.genre, genre.as_str())];
                            (genre.as_str())
                        }
                    }
                }
            }

            noscript {
                button class="rounded-md bg-blue-600 px-4 py-2 font-semibold text-white hover:bg-blue-700" type="submit" { "Apply" }
            }
        }
    }
}

fn filter_results(outcome: &FilterOutcome) -> Markup {
    match outcome {
        FilterOutcome::Disconnected | FilterOutcome::Idle => html! {},
        FilterOutcome::Empty => html! {
            p class="text-2xl font-bold text-gray-900" { "No Result Found" }
        },
        FilterOutcome::Failed(message) => warning(&format!("Error -> query part {message}")),
        FilterOutcome::Matches { filter, rows } => html! {
            p class="text-gray-700" {
                "Genre - " (filter.genre.as_str()) ", Rating - " (filter.min_rating.to_string()) " : 10.0, Duration - "
                (filter.duration.label()) ", Votes - " (filter.votes.label())
                " -> count - " (rows.len())
            }
            (data_table(&movie_table(rows)))
        },
    }
}

fn movie_table(rows: &[movie::Model]) -> DataTable {
    DataTable {
        columns: vec!["Title", "Genre", "Rating", "Votes", "Duration"],
        rows: rows
            .iter()
            .map(|m| {
                vec![
                    m.title.clone(),
                    m.genre.clone(),
                    format_opt(m.rating),
                    m.votes.map(format_count).unwrap_or_default(),
                    m.duration.map(display_duration).unwrap_or_default(),
                ]
            })
            .collect(),
    }
}

fn display_duration(value: f64) -> String {
    match duration_minutes(value) {
        Some(minutes) => format!("{value:.2} ({}h {}m)", minutes / 60, minutes % 60),
        None => value.to_string(),
    }
}
