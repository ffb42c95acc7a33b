use std::fmt::Write as _;

use weather_core::{CurrentConditions, ForecastDay, HistoryEntry, WeatherReport};

fn icon_url(icon_id: &str) -> String {
    format!("https://openweathermap.org/img/wn/{icon_id}@2x.png")
}

fn degrees(celsius: f64) -> String {
    format!("{}°C", celsius.round() as i64)
}

pub fn current(c: &CurrentConditions) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Current Weather in {}", c.location_label);
    let _ = writeln!(
        out,
        "  {}  {} ({})",
        degrees(c.temperature_c),
        c.condition_main,
        c.condition_description
    );
    let _ = writeln!(out, "  Humidity:  {}%", c.humidity_pct);
    let _ = writeln!(out, "  Wind:      {} m/s", c.wind_speed_ms);
    let _ = writeln!(out, "  Min Temp:  {}", degrees(c.temp_min_c));
    let _ = writeln!(out, "  Max Temp:  {}", degrees(c.temp_max_c));
    let _ = writeln!(out, "  Latitude:  {}", c.lat);
    let _ = writeln!(out, "  Longitude: {}", c.lon);
    let _ = writeln!(out, "  Icon:      {}", icon_url(&c.icon_id));
    out
}

pub fn forecast(days: &[ForecastDay]) -> String {
    if days.is_empty() {
        return "No midday forecast available.\n".to_string();
    }

    let mut out = format!("{}-Day Forecast\n", days.len());
    for day in days {
        let _ = writeln!(
            out,
            "  {:<16} {:>6}  {:<14} humidity {:>3}%  {}",
            day.date.format("%a, %b %-d %Y").to_string(),
            degrees(day.temperature_c),
            day.condition_description,
            day.humidity_pct,
            day.condition_main,
        );
    }
    out
}

pub fn report(report: &WeatherReport) -> String {
    format!("{}\n{}", current(&report.current), forecast(&report.forecast))
}

pub fn history(entries: &[HistoryEntry]) -> String {
    if entries.is_empty() {
        return "No recent searches.\n".to_string();
    }

    let mut out = String::from("Recent Searches\n");
    for (idx, entry) in entries.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {:>2}. {:<28} ({:.4}, {:.4})  [{}]",
            idx + 1,
            entry.location_name,
            entry.lat,
            entry.lon,
            entry.id
        );
    }
    out
}
