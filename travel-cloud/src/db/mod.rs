//! Database access layer

pub mod announcements;
pub mod bookings;
pub mod categories;
pub mod reviews;
pub mod tours;
pub mod users;

/// Case-insensitive substring pattern for ILIKE; `None` for blank input.
/// `%`, `_` and `\` in the input match literally.
fn contains_pattern(search: Option<&str>) -> Option<String> {
    let term = search.map(str::trim).filter(|s| !s.is_empty())?;
    let mut out = String::with_capacity(term.len() + 2);
    out.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    Some(out)
}
