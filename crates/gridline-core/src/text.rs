//! Text helpers shared by search matching and target resolution

/// Lower-cases text and strips the diacritics common in Spanish titles
///
/// # Examples
///
/// ```
/// use gridline_core::text::fold;
///
/// assert_eq!(fold("Vehículos"), "vehiculos");
/// assert_eq!(fold("AÑO"), "ano");
/// ```
pub fn fold(text: &str) -> String {
	text.to_lowercase().chars().map(strip_accent).collect()
}

fn strip_accent(ch: char) -> char {
	match ch {
		'á' | 'à' | 'ä' | 'â' | 'ã' => 'a',
		'é' | 'è' | 'ë' | 'ê' => 'e',
		'í' | 'ì' | 'ï' | 'î' => 'i',
		'ó' | 'ò' | 'ö' | 'ô' | 'õ' => 'o',
		'ú' | 'ù' | 'ü' | 'û' => 'u',
		'ñ' => 'n',
		'ç' => 'c',
		other => other,
	}
}

/// Case-insensitive substring test
///
/// An empty needle matches everything.
///
/// # Examples
///
/// ```
/// use gridline_core::text::contains_ignore_case;
///
/// assert!(contains_ignore_case("Juan Pérez", "PÉR"));
/// assert!(contains_ignore_case("anything", ""));
/// assert!(!contains_ignore_case("Juan", "pedro"));
/// ```
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
	if needle.is_empty() {
		return true;
	}
	haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Convert a title to a storage-friendly identifier
///
/// Accents are folded, every run of characters outside `[a-z0-9]` becomes a
/// single underscore, and leading/trailing separators are dropped.
///
/// # Examples
///
/// ```
/// use gridline_core::text::slugify;
///
/// assert_eq!(slugify("Vehículos"), "vehiculos");
/// assert_eq!(slugify("Pagos  de Nómina!"), "pagos_de_nomina");
/// assert_eq!(slugify("--"), "");
/// ```
pub fn slugify(text: &str) -> String {
	fold(text)
		.chars()
		.map(|ch| match ch {
			'a'..='z' | '0'..='9' => ch,
			_ => '_',
		})
		.collect::<String>()
		.split('_')
		.filter(|s| !s.is_empty())
		.collect::<Vec<_>>()
		.join("_")
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("Hello World", "hello_world")]
	#[case("Retenciones ISR", "retenciones_isr")]
	#[case("Gastos 2024", "gastos_2024")]
	#[case("  Ingresos  ", "ingresos")]
	#[case("Camión/Tráiler", "camion_trailer")]
	fn test_slugify(#[case] input: &str, #[case] expected: &str) {
		assert_eq!(slugify(input), expected);
	}

	#[rstest]
	fn test_contains_ignore_case_is_plain_lowercase() {
		// Accents are not folded for search, only case.
		assert!(!contains_ignore_case("Pérez", "perez"));
		assert!(contains_ignore_case("PÉREZ", "pérez"));
	}
}
