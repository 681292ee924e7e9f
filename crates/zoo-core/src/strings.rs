//! String helpers for aliases and teaser text.

/// Turns arbitrary text into a URL-safe alias.
///
/// The text is lowercased, `$` and `,` are dropped, and everything else is run
/// through [`slug::slugify`], which transliterates non-ASCII characters and
/// collapses separators into single dashes.
///
/// # Examples
///
/// ```
/// use zoo_core::sluggify;
///
/// assert_eq!(sluggify("Hello, World!"), "hello-world");
/// assert_eq!(sluggify("  Price $5  "), "price-5");
/// assert_eq!(sluggify("Crème Brûlée"), "creme-brulee");
/// ```
pub fn sluggify(text: &str) -> String {
	let cleaned: String = text
		.to_lowercase()
		.chars()
		.filter(|c| *c != '$' && *c != ',')
		.collect();
	slug::slugify(cleaned)
}

/// Returns true when `alias` is non-empty and already in sluggified form.
pub fn is_slug(alias: &str) -> bool {
	!alias.is_empty() && sluggify(alias) == alias
}

/// Shortens `text` to at most `length` characters, appending `suffix`.
///
/// The cut happens on a word boundary when the kept part contains whitespace.
/// Text that already fits is returned unchanged.
///
/// # Examples
///
/// ```
/// use zoo_core::truncate;
///
/// assert_eq!(truncate("The quick brown fox jumps", 15, "..."), "The quick...");
/// assert_eq!(truncate("short", 30, "..."), "short");
/// ```
pub fn truncate(text: &str, length: usize, suffix: &str) -> String {
	if text.chars().count() <= length {
		return text.to_string();
	}

	let keep = length - length.min(suffix.chars().count());
	let head: String = text.chars().take(keep + 1).collect();

	// Drop the trailing partial word together with the whitespace before it
	let trimmed = match head.rfind(char::is_whitespace) {
		Some(pos) => head[..pos].trim_end().to_string(),
		None => head,
	};

	let mut result: String = trimmed.chars().take(keep).collect();
	result.push_str(suffix);
	result
}
