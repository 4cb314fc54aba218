// core/src/pacing.rs
use serde::{Deserialize, Serialize};

/// Naismith's rule tuned for trail running.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NaismithRule {
    /// Flat speed (km/h).
    pub base_speed_kmh: f64,
    /// Minutes added per 100 m of D+.
    pub climb_min_per_100m: f64,
    /// Minutes credited per 100 m of D- on steep descents.
    pub descent_min_per_100m: f64,
    /// Average gradient (%) below which a segment counts as a steep descent.
    pub steep_descent_threshold_pct: f64,
}

impl Default for NaismithRule {
    fn default() -> Self {
        Self {
            base_speed_kmh: 12.0,
            climb_min_per_100m: 5.0,
            descent_min_per_100m: 5.0,
            steep_descent_threshold_pct: -12.0,
        }
    }
}

impl NaismithRule {
    fn climb_minutes(&self, gain: f64) -> f64 {
        gain / 100.0 * self.climb_min_per_100m
    }

    fn descent_credit(&self, loss: f64, avg_gradient_pct: f64) -> f64 {
        if avg_gradient_pct < self.steep_descent_threshold_pct {
            loss / 100.0 * self.descent_min_per_100m
        } else {
            0.0
        }
    }

    /// Estimated minutes for a segment, never negative.
    pub fn minutes(&self, distance_km: f64, gain: f64, loss: f64, avg_gradient_pct: f64) -> f64 {
        let base = distance_km / self.base_speed_kmh * 60.0;
        let total = base + self.climb_minutes(gain) - self.descent_credit(loss, avg_gradient_pct);
        total.max(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingOptions {
    pub use_naismith: bool,
    pub custom_pace_kmh: Option<f64>,
    pub naismith: NaismithRule,
}

impl Default for PacingOptions {
    fn default() -> Self {
        Self { use_naismith: true, custom_pace_kmh: None, naismith: NaismithRule::default() }
    }
}

impl PacingOptions {
    pub fn custom_pace(pace_kmh: f64) -> Self {
        Self { use_naismith: false, custom_pace_kmh: Some(pace_kmh), ..Self::default() }
    }
}

#[inline]
fn pace_minutes(distance_km: f64, pace_kmh: f64) -> f64 {
    if pace_kmh <= 0.0 {
        return 0.0;
    }
    distance_km / pace_kmh * 60.0
}

/// Segment time in minutes. Naismith wins over a custom pace; a custom pace
/// of zero counts as "no pace" and gives `None`.
pub fn estimate_segment_minutes(
    distance_km: f64,
    gain: f64,
    loss: f64,
    avg_gradient_pct: f64,
    opts: &PacingOptions,
) -> Option<f64> {
    if opts.use_naismith {
        return Some(opts.naismith.minutes(distance_km, gain, loss, avg_gradient_pct));
    }
    match opts.custom_pace_kmh {
        Some(pace) if pace != 0.0 => Some(pace_minutes(distance_km, pace)),
        _ => None,
    }
}

/// "2h 05min" above an hour, "45min" below.
pub fn format_duration_minutes(minutes: f64) -> String {
    let hours = (minutes / 60.0).floor() as i64;
    let mins = minutes.rem_euclid(60.0).floor() as i64;
    if hours > 0 {
        format!("{hours}h {mins:02}min")
    } else {
        format!("{mins}min")
    }
}

/// Running totals of `segment_minutes`, offset by `start_minutes`.
pub fn cumulative_minutes(segment_minutes: &[f64], start_minutes: f64) -> Vec<f64> {
    segment_minutes
        .iter()
        .scan(start_minutes, |acc, m| {
            *acc += m;
            Some(*acc)
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PaceEstimate {
    pub actual_pace_kmh: f64,
    pub flat_equivalent_pace_kmh: f64,
}

/// Reverse of the rule: actual pace and the flat pace it corresponds to once
/// the terrain penalties are removed. The flat time is floored at half the
/// actual time.
pub fn estimate_pace_from_time(
    rule: &NaismithRule,
    distance_km: f64,
    time_minutes: f64,
    gain: f64,
    loss: f64,
    avg_gradient_pct: f64,
) -> PaceEstimate {
    if time_minutes <= 0.0 || distance_km <= 0.0 {
        return PaceEstimate::default();
    }
    let actual = distance_km / (time_minutes / 60.0);
    let flat_time = (time_minutes - rule.climb_minutes(gain) + rule.descent_credit(loss, avg_gradient_pct))
        .max(time_minutes * 0.5);

    PaceEstimate { actual_pace_kmh: actual, flat_equivalent_pace_kmh: distance_km / (flat_time / 60.0) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steep_descent_credit_only_below_threshold() {
        let r = NaismithRule::default();
        // 1 km, 200 m D-: -20 % earns the credit, -10 % does not.
        assert_eq!(r.minutes(1.0, 0.0, 200.0, -20.0), 0.0);
        assert!((r.minutes(1.0, 0.0, 200.0, -10.0) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn zero_custom_pace_is_no_pace() {
        let opts = PacingOptions::custom_pace(0.0);
        assert_eq!(estimate_segment_minutes(1.0, 0.0, 0.0, 0.0, &opts), None);
        let opts = PacingOptions::custom_pace(-5.0);
        assert_eq!(estimate_segment_minutes(1.0, 0.0, 0.0, 0.0, &opts), Some(0.0));
    }
}
