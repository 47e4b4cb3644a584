/// Suffixes marking extra images captured at the same moment as the base file.
const DISAMBIGUATORS: [&str; 3] = ["_1", "_2", "_3"];

/// Number of leading characters of a key that name its day (`YYYY-MM-DD`).
const DAY_LABEL_CHARS: usize = 10;

/// Derive the grouping key for a filename.
///
/// The final `.`-delimited extension is dropped, then a trailing `_1`, `_2`
/// or `_3` disambiguator if one is present:
///
/// - `2022-10-25_05-06-01_UTC.jpg` -> `2022-10-25_05-06-01_UTC`
/// - `2022-12-25_05-00-26_UTC_1.jpg` -> `2022-12-25_05-00-26_UTC`
pub fn extract_key(filename: &str) -> String {
    let name = match filename.rsplit_once('.') {
        Some((stem, _ext)) => stem,
        None => filename,
    };

    if DISAMBIGUATORS.iter().any(|suffix| name.ends_with(suffix))
        && let Some((base, _n)) = name.rsplit_once('_')
    {
        return base.to_string();
    }

    name.to_string()
}

pub fn day_label(key: &str) -> String {
    key.chars().take(DAY_LABEL_CHARS).collect()
}
