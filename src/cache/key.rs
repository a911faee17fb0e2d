use chrono::NaiveDateTime;

use crate::models::SearchInput;

/// Приводит название города к виду, пригодному для ключа:
/// транслитерация в ASCII, нижний регистр, всё остальное заменяется на `-`.
pub fn slugify_location(name: &str) -> String {
    slug::slugify(name)
}

/// ISO-8601 без часового пояса; дробная часть секунды пишется только если она есть.
pub fn departure_iso(departure: &NaiveDateTime) -> String {
    departure.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
}

/// Строит ключ кеша вида `<namespace>:journey:<origin>_<destination>_<departure>`.
///
/// Чистая функция: одинаковые (после нормализации) запросы дают одинаковый ключ.
pub fn derive_key(namespace: &str, input: &SearchInput) -> String {
    format!(
        "{}:journey:{}_{}_{}",
        namespace,
        slugify_location(input.origin()),
        slugify_location(input.destination()),
        departure_iso(&input.departure()),
    )
}
