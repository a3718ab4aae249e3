use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

const ADDRESS_LABEL_LIMIT: usize = 16;

pub fn truncate_address(id: &str) -> String {
    let count = id.chars().count();
    if count <= ADDRESS_LABEL_LIMIT {
        return id.to_string();
    }

    let head = id.chars().take(8).collect::<String>();
    let tail = id.chars().skip(count - 4).collect::<String>();
    format!("{head}...{tail}")
}

pub fn format_amount(value: f64) -> String {
    if value.abs() >= 1_000_000.0 {
        format!("{:.2}M", value / 1_000_000.0)
    } else if value.abs() >= 1_000.0 {
        format!("{:.2}K", value / 1_000.0)
    } else {
        format!("{value:.4}")
    }
}

pub fn stable_pair(id: &str) -> (f32, f32) {
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    let hash = hasher.finish();

    let x = ((hash & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    let y = (((hash >> 32) & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    ((x * 2.0) - 1.0, (y * 2.0) - 1.0)
}
