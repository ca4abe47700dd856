//! Delete-target resolution
//!
//! Bulk delete needs the storage collection behind a page, but the page only
//! supplies its display title. The caller injects an explicit
//! title-to-collection map; keyword matching and a slug of the title are last
//! resorts, and the slug path is logged at `warn` because it is a guess.

use gridline_core::text::{fold, slugify};
use gridline_core::{KeywordRule, TargetSettings};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// How a collection name was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolutionPath {
	/// Exact title in the explicit map
	Explicit,
	/// Keyword found in the title
	Keyword,
	/// Slug of the title; may not exist in the store
	SlugFallback,
}

impl fmt::Display for ResolutionPath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			ResolutionPath::Explicit => "explicit",
			ResolutionPath::Keyword => "keyword",
			ResolutionPath::SlugFallback => "slug-fallback",
		})
	}
}

/// Resolved delete target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
	/// Storage collection name
	pub collection: String,
	/// Path that produced it
	pub path: ResolutionPath,
}

/// Maps page titles to storage collections
///
/// # Examples
///
/// ```
/// use gridline_admin::resolver::{ResolutionPath, TargetResolver};
///
/// let resolver = TargetResolver::new()
///     .with_title("Pagos a Conductores", "pagos_conductores")
///     .with_keyword("viaje", "viajes");
///
/// let explicit = resolver.resolve("Pagos a Conductores").unwrap();
/// assert_eq!(explicit.collection, "pagos_conductores");
///
/// let keyword = resolver.resolve("Viajes del mes").unwrap();
/// assert_eq!(keyword.path, ResolutionPath::Keyword);
///
/// let guess = resolver.resolve("Bitácora de Mantenimiento").unwrap();
/// assert_eq!(guess.collection, "bitacora_de_mantenimiento");
/// assert_eq!(guess.path, ResolutionPath::SlugFallback);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetResolver {
	titles: BTreeMap<String, String>,
	keywords: Vec<KeywordRule>,
}

impl TargetResolver {
	/// Resolver with no map and no keywords; every title falls back to its slug
	pub fn new() -> Self {
		Self::default()
	}

	/// Resolver built from settings
	pub fn from_settings(settings: &TargetSettings) -> Self {
		Self {
			titles: settings.titles.clone(),
			keywords: settings.keywords.clone(),
		}
	}

	/// Map an exact title to a collection
	pub fn with_title(mut self, title: impl Into<String>, collection: impl Into<String>) -> Self {
		self.titles.insert(title.into(), collection.into());
		self
	}

	/// Append a keyword rule; earlier rules win
	pub fn with_keyword(mut self, keyword: &str, collection: impl Into<String>) -> Self {
		self.keywords.push(KeywordRule::new(keyword, collection));
		self
	}

	/// Resolve `title`
	///
	/// Returns `None` only when the title has no usable characters at all.
	pub fn resolve(&self, title: &str) -> Option<Resolution> {
		let title = title.trim();
		if let Some(collection) = self.titles.get(title) {
			tracing::debug!(title, collection = %collection, "delete target from explicit map");
			return Some(Resolution {
				collection: collection.clone(),
				path: ResolutionPath::Explicit,
			});
		}

		let folded = fold(title);
		if let Some(rule) = self
			.keywords
			.iter()
			.find(|rule| !rule.keyword.is_empty() && folded.contains(&rule.keyword))
		{
			tracing::info!(
				title,
				keyword = %rule.keyword,
				collection = %rule.collection,
				"delete target from keyword heuristic"
			);
			return Some(Resolution {
				collection: rule.collection.clone(),
				path: ResolutionPath::Keyword,
			});
		}

		let slug = slugify(title);
		if slug.is_empty() {
			tracing::warn!(title, "delete target could not be resolved");
			return None;
		}
		tracing::warn!(
			title,
			collection = %slug,
			"delete target guessed from slugified title; add it to the title map"
		);
		Some(Resolution {
			collection: slug,
			path: ResolutionPath::SlugFallback,
		})
	}
}
