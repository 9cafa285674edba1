use std::f64::consts::{FRAC_PI_2, TAU};

use chrono::{Datelike, NaiveDate};
use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoint, PlotPoints, Polygon, Text};

use crate::data::charts::CountryShare;
use crate::state::AppState;

const CHART_HEIGHT: f32 = 280.0;

// ---------------------------------------------------------------------------
// Chart grid (central panel)
// ---------------------------------------------------------------------------

/// Render the four charts in a 2×2 grid.
pub fn chart_grid(ui: &mut Ui, state: &AppState) {
    ui.columns(2, |cols: &mut [Ui]| {
        sales_over_time(&mut cols[0], state);
        top_individuals(&mut cols[1], state);
    });
    ui.add_space(8.0);
    ui.columns(2, |cols: &mut [Ui]| {
        amount_distribution(&mut cols[0], state);
        boxes_share(&mut cols[1], state);
    });
}

/// Line chart of total amount per day.
fn sales_over_time(ui: &mut Ui, state: &AppState) {
    ui.strong("Sales Over Time");
    let points: PlotPoints = state
        .summary
        .time_series
        .iter()
        .map(|(date, amount)| [date_to_x(*date), *amount])
        .collect();

    Plot::new("sales_over_time")
        .height(CHART_HEIGHT)
        .x_axis_label("Date")
        .y_axis_label("Amount")
        .x_axis_formatter(|mark, _range| x_to_label(mark.value))
        .label_formatter(|_name, point| {
            format!("{}\n{:.2}", x_to_label(point.x), point.y)
        })
        .show(ui, |plot_ui| {
            plot_ui.line(Line::new(points).name("Amount").width(1.5));
        });
}

/// Bar chart of the top sales people by boxes shipped.
fn top_individuals(ui: &mut Ui, state: &AppState) {
    ui.strong(format!(
        "Top {} Individuals (Boxes Sold)",
        state.chart_options.top_n
    ));
    let top = &state.summary.top_performers;
    let bars: Vec<Bar> = top
        .iter()
        .enumerate()
        .map(|(i, (person, boxes))| Bar::new(i as f64, *boxes as f64).name(person).width(0.7))
        .collect();
    let names: Vec<String> = top.iter().map(|(person, _)| person.clone()).collect();

    Plot::new("top_individuals")
        .height(CHART_HEIGHT)
        .y_axis_label("Boxes Shipped")
        .x_axis_formatter(move |mark, _range| category_label(&names, mark.value))
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(Color32::from_rgb(210, 105, 30)));
        });
}

/// Histogram of the raw sale amounts.
fn amount_distribution(ui: &mut Ui, state: &AppState) {
    ui.strong("Distribution of Sales");
    let bars: Vec<Bar> = state
        .summary
        .histogram
        .iter()
        .map(|b| {
            let width = if b.width() > 0.0 { b.width() } else { 1.0 };
            Bar::new(b.center(), b.count as f64)
                .width(width)
                .name(format!("{:.2} – {:.2}", b.lower, b.upper))
        })
        .collect();

    Plot::new("amount_distribution")
        .height(CHART_HEIGHT)
        .x_axis_label("Amount")
        .y_axis_label("Count")
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(Color32::from_rgb(100, 149, 237)));
        });
}

/// Pie of boxes shipped per country.
fn boxes_share(ui: &mut Ui, state: &AppState) {
    ui.strong("Proportion of Boxes Shipped");
    let slices = pie_slices(&state.summary.country_share);

    Plot::new("boxes_share")
        .height(CHART_HEIGHT)
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .legend(Legend::default())
        .show(ui, |plot_ui| {
            for (share, outline) in slices {
                let color = state.country_colors.color_for(&share.country);
                plot_ui.polygon(
                    Polygon::new(PlotPoints::new(outline.points))
                        .name(&share.country)
                        .fill_color(color.gamma_multiply(0.85)),
                );
                if share.share >= 0.04 {
                    plot_ui.text(Text::new(
                        PlotPoint::new(outline.label_at[0], outline.label_at[1]),
                        format!("{:.1}%", share.share * 100.0),
                    ));
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Geometry and axis helpers
// ---------------------------------------------------------------------------

/// One pie slice: its outline and where its percentage label goes.
#[derive(Debug, Clone, PartialEq)]
struct SliceOutline {
    points: Vec<[f64; 2]>,
    label_at: [f64; 2],
}

/// Unit-circle slices, clockwise from twelve o'clock, in input order.
fn pie_slices(shares: &[CountryShare]) -> Vec<(&CountryShare, SliceOutline)> {
    let mut start = 0.0;
    shares
        .iter()
        .filter(|s| s.share > 0.0)
        .map(|s| {
            let end = start + s.share;
            let steps = ((s.share * 96.0).ceil() as usize).max(2);
            let mut points = Vec::with_capacity(steps + 2);
            points.push([0.0, 0.0]);
            for k in 0..=steps {
                let frac = start + (end - start) * k as f64 / steps as f64;
                points.push(unit_point(frac, 1.0));
            }
            let label_at = unit_point((start + end) / 2.0, 0.65);
            start = end;
            (s, SliceOutline { points, label_at })
        })
        .collect()
}

/// Point on a circle of `radius` at `frac` of a full clockwise turn from the top.
fn unit_point(frac: f64, radius: f64) -> [f64; 2] {
    let angle = FRAC_PI_2 - frac * TAU;
    [radius * angle.cos(), radius * angle.sin()]
}

fn date_to_x(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

fn x_to_label(x: f64) -> String {
    NaiveDate::from_num_days_from_ce_opt(x.round() as i32)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Bar label for an integer position, blank between bars.
fn category_label(names: &[String], x: f64) -> String {
    let rounded = x.round();
    if (x - rounded).abs() > 1e-6 || rounded < 0.0 {
        return String::new();
    }
    names.get(rounded as usize).cloned().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn share(country: &str, share: f64) -> CountryShare {
        CountryShare {
            country: country.to_string(),
            boxes: 0,
            share,
        }
    }

    #[test]
    fn date_axis_round_trips() {
        let d = NaiveDate::from_ymd_opt(2022, 8, 31).unwrap();
        assert_eq!(x_to_label(date_to_x(d)), "2022-08-31");
    }

    #[test]
    fn category_labels_only_on_integers() {
        let names = vec!["Ann".to_string(), "Bo".to_string()];
        assert_eq!(category_label(&names, 1.0), "Bo");
        assert_eq!(category_label(&names, 0.5), "");
        assert_eq!(category_label(&names, 5.0), "");
        assert_eq!(category_label(&names, -1.0), "");
    }

    #[test]
    fn pie_slices_close_the_circle() {
        let shares = vec![share("CA", 0.25), share("NZ", 0.0), share("US", 0.75)];
        let slices = pie_slices(&shares);
        assert_eq!(slices.len(), 2);

        let first = &slices[0].1.points;
        assert_eq!(first[0], [0.0, 0.0]);
        // Starts at twelve o'clock, quarter turn ends at three o'clock.
        assert!((first[1][1] - 1.0).abs() < 1e-9);
        let last = first[first.len() - 1];
        assert!((last[0] - 1.0).abs() < 1e-9 && last[1].abs() < 1e-9);

        let second = &slices[1].1.points;
        let end = second[second.len() - 1];
        assert!(end[0].abs() < 1e-9 && (end[1] - 1.0).abs() < 1e-9);
    }
}
