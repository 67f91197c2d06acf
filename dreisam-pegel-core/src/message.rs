use crate::contract::{Snapshot, TIME_LAYOUT};

pub const WARNING_LINK: &str = "https://www.freiburg.de/pb/411886.html";
pub const BASE_TAGS: [&str; 2] = ["#freiburg", "#dreisam"];
pub const WARNING_TAGS: [&str; 2] = ["#fr1", "#hochwasser"];

/// Lower edges (cm) of closure levels 1, 2 and 3.
pub const LEVEL_THRESHOLDS: [i64; 3] = [105, 125, 145];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedMessage {
    pub text: String,
    pub is_warning: bool,
}

/// Sperrstufe for a gauge value: 0 below 105 cm, then 1 to 3.
pub fn closure_level(value: i64) -> u8 {
    LEVEL_THRESHOLDS
        .iter()
        .filter(|threshold| value >= **threshold)
        .count() as u8
}

fn trend_glyph(delta: i64) -> &'static str {
    match delta {
        d if d > 0 => "⬆️",
        d if d < 0 => "⬇️",
        _ => "⏺",
    }
}

pub fn trend_glyphs(trend: &[i64]) -> String {
    trend.iter().map(|d| trend_glyph(*d)).collect()
}

/// Render the status text for `snapshot`.
pub fn compose_message(snapshot: &Snapshot, station_label: &str) -> ComposedMessage {
    let current = &snapshot.current;
    let mut tags: Vec<&str> = BASE_TAGS.to_vec();

    let mut text = format!(
        "{station_label}: {}cm ({})\n",
        current.value,
        current.timestamp.format(TIME_LAYOUT)
    );

    if !snapshot.trend.is_empty() {
        text.push_str(&format!("Trend: {}\n", trend_glyphs(&snapshot.trend)));
    }

    let level = closure_level(current.value);
    if level > 0 {
        text.push_str(&format!(
            "\n⚠️ Achtung: Sperrstufe {level}\n{WARNING_LINK}"
        ));
        tags.extend(WARNING_TAGS);
    }

    text.push_str("\n\n");
    text.push_str(&tags.join(" "));

    ComposedMessage {
        text,
        is_warning: level > 0,
    }
}
