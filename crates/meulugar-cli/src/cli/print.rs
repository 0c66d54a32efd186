use colored::{ColoredString, Colorize};
use meulugar::config::MeuLugarConfig;
use meulugar::query::PlaceStats;
use meulugar::{Emotion, Place};

const SHORT_ID_LEN: usize = 8;
const TITLE_WIDTH: usize = 32;

pub(super) fn print_success(message: &str) {
    println!("{}", message.green());
}

pub(super) fn print_info(message: &str) {
    println!("{}", message.dimmed());
}

pub(super) fn print_places(places: &[&Place]) {
    if places.is_empty() {
        println!("No places found.");
        return;
    }

    for place in places {
        let tags = if place.tags.is_empty() {
            String::new()
        } else {
            format!("#{}", place.tags.join(" #"))
        };
        println!(
            "{}  {}  {}  {}  {}",
            short_id(&place.id).yellow(),
            emotion_badge(place.emotion, 12),
            truncate(&place.title, TITLE_WIDTH),
            place.created_at.format("%Y-%m-%d").to_string().dimmed(),
            tags.cyan()
        );
    }
}

pub(super) fn print_place(place: &Place) {
    println!("{} {}", short_id(&place.id).yellow(), place.title.bold());
    println!("--------------------------------");
    println!("{:<14}{}", "id", place.id);
    println!("{:<14}{}", "emotion", emotion_badge(place.emotion, 0));
    if place.has_valid_coordinates() {
        println!("{:<14}{:.5}, {:.5}", "coordinates", place.lat, place.lng);
    } else {
        println!("{:<14}{}", "coordinates", "invalid".red());
    }
    println!(
        "{:<14}{}",
        "created",
        place.created_at.format("%Y-%m-%d %H:%M UTC")
    );
    if !place.tags.is_empty() {
        println!("{:<14}{}", "tags", place.tags.join(", "));
    }
    if let Some(key) = &place.photo_ref {
        println!("{:<14}{}", "photo", key);
    }
    if let Some(key) = &place.audio_ref {
        println!("{:<14}{}", "audio", key);
    }
    println!();
    println!("{}", place.description);

    let reflections = [
        ("What is wrong", place.critical_characteristics.as_deref()),
        ("What I would change", Some(place.what_would_change.as_str())),
        ("How it feels", place.space_perception.as_deref()),
    ];
    for (heading, text) in reflections {
        if let Some(text) = text.filter(|t| !t.is_empty()) {
            println!();
            println!("{}", heading.bold());
            println!("{}", text);
        }
    }
}

pub(super) fn print_tags(tags: &[(String, usize)]) {
    if tags.is_empty() {
        println!("No tags yet.");
        return;
    }
    for (tag, count) in tags {
        println!("{:<20}{}", format!("#{}", tag).cyan(), count);
    }
}

pub(super) fn print_stats(stats: &PlaceStats, per_emotion: &[(Emotion, usize)]) {
    println!(
        "{} places, {} emotions, {} tags",
        stats.places.to_string().bold(),
        stats.emotions.to_string().bold(),
        stats.tags.to_string().bold()
    );
    for (emotion, count) in per_emotion {
        println!("  {}{}", emotion_badge(*emotion, 14), count);
    }
}

pub(super) fn print_config(config: &MeuLugarConfig, data_dir: &str) {
    println!("{:<22}{}", "data_dir", data_dir);
    println!("{:<22}{}", "record_quota_bytes", config.record_quota_bytes);
    println!("{:<22}{}", "media_max_bytes", config.media_max_bytes);
    println!("{:<22}{}", "cascade_media_delete", config.cascade_media_delete);
    println!("{:<22}{}", "log_level", config.log_level);
}

/// Emotion label in its marker colour, padded to `width` before colouring.
fn emotion_badge(emotion: Emotion, width: usize) -> ColoredString {
    let label = format!("{:<width$}", emotion.label(), width = width);
    match hex_rgb(emotion.color()) {
        Some((r, g, b)) => label.truecolor(r, g, b),
        None => label.normal(),
    }
}

fn hex_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

pub(super) fn short_id(id: &str) -> String {
    id.chars().take(SHORT_ID_LEN).collect()
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return format!("{:<width$}", s, width = max_chars);
    }
    let mut out: String = s.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}
