use typesprint::history::AttemptRecord;

/// One point per saved attempt: (attempt number, wpm), oldest first.
pub fn history_points(records: &[AttemptRecord]) -> Vec<(f64, f64)> {
    records
        .iter()
        .enumerate()
        .map(|(i, r)| ((i + 1) as f64, r.wpm as f64))
        .collect()
}

/// Compute X (attempts) and Y (WPM) bounds for the progress chart
pub fn compute_chart_params(points: &[(f64, f64)]) -> (f64, f64) {
    let highest_wpm = points.iter().map(|&(_, wpm)| wpm).fold(0.0, f64::max);

    // a single attempt still needs a non-empty x range
    let attempts = points.last().map_or(1.0, |p| p.0).max(2.0);

    // keep a flat line off the top edge
    let y_max = if highest_wpm > 0.0 {
        (highest_wpm * 1.1).round()
    } else {
        10.0
    };

    (attempts, y_max)
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.2}")
    }
}
