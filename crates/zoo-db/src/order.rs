//! Item order resolution.
//!
//! An [`OrderSpec`] is a list of tokens: core item attributes (`_itemname`,
//! `_itemcreated`, ...), element identifiers and the directives `_random`,
//! `_reversed`, `_alphanumeric` and `_ignore_priority`. Resolving it yields a
//! [`ResolvedOrder`]: an optional join against the search table plus the sort
//! terms, which render to SQL for a given backend.
//!
//! ```
//! use zoo_db::order::OrderSpec;
//! use zoo_db::DatabaseBackend;
//!
//! let order = OrderSpec::new(["_itemname", "_reversed"]).resolve(false);
//! assert_eq!(order.to_sql(DatabaseBackend::MySql), "a.priority DESC, a.name DESC");
//! ```

use sea_query::{Alias, Expr, ExprTrait, JoinType, Order, SelectStatement};
use serde::{Deserialize, Serialize};

use crate::backend::DatabaseBackend;
use crate::schema::SEARCH;

pub const RANDOM: &str = "_random";
pub const REVERSED: &str = "_reversed";
pub const ALPHANUMERIC: &str = "_alphanumeric";
pub const IGNORE_PRIORITY: &str = "_ignore_priority";

/// Prefix of core attribute tokens.
pub const CORE_PREFIX: &str = "_item";

/// Ordering used when nothing orderable remains.
pub const DEFAULT_ATTRIBUTE: &str = "_itemname";

/// Item columns a core attribute token may address.
const CORE_COLUMNS: &[&str] = &[
	"id",
	"application_id",
	"type",
	"name",
	"alias",
	"created",
	"modified",
	"modified_by",
	"publish_up",
	"publish_down",
	"priority",
	"hits",
	"state",
	"access",
	"created_by",
	"created_by_alias",
	"searchable",
];

/// Ordered, deduplicated list of order tokens
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderSpec {
	tokens: Vec<String>,
}

impl OrderSpec {
	/// Trims tokens, drops empty ones and keeps the first of each duplicate.
	pub fn new<I, S>(tokens: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let mut unique: Vec<String> = Vec::new();
		for token in tokens {
			let token = token.as_ref().trim();
			if !token.is_empty() && !unique.iter().any(|t| t == token) {
				unique.push(token.to_string());
			}
		}
		Self { tokens: unique }
	}

	/// Converts a single order string.
	///
	/// The legacy keywords (`date`, `rdate`, `alpha`, `ralpha`, `hits`, `rhits`,
	/// `mdate`, `rmdate`, `random`, `priority`) map to their token lists;
	/// anything else is split on commas.
	pub fn parse(order: &str) -> Self {
		match order.trim() {
			"date" => Self::new(["_itemcreated"]),
			"rdate" => Self::new(["_itemcreated", REVERSED]),
			"alpha" => Self::new(["_itemname"]),
			"ralpha" => Self::new(["_itemname", REVERSED]),
			"hits" => Self::new(["_itemhits", REVERSED]),
			"rhits" => Self::new(["_itemhits"]),
			"mdate" => Self::new(["_itemmodified"]),
			"rmdate" => Self::new(["_itemmodified", REVERSED]),
			"random" => Self::new([RANDOM]),
			"priority" => Self::default(),
			other => Self::new(other.split(',')),
		}
	}

	pub fn tokens(&self) -> &[String] {
		&self.tokens
	}

	pub fn contains(&self, token: &str) -> bool {
		self.tokens.iter().any(|t| t == token)
	}

	pub fn is_empty(&self) -> bool {
		self.tokens.is_empty()
	}

	/// Resolves the order; `ignore_priority` has the same effect as the
	/// `_ignore_priority` directive.
	pub fn resolve(&self, ignore_priority: bool) -> ResolvedOrder {
		resolve_tokens(self.tokens.clone(), ignore_priority)
	}

	/// Resolves the order, letting `hooks` rewrite the tokens first and the
	/// result afterwards.
	pub fn resolve_with_hooks(
		&self,
		ignore_priority: bool,
		hooks: &[std::sync::Arc<dyn OrderHook>],
	) -> ResolvedOrder {
		let mut tokens = self.tokens.clone();
		for hook in hooks {
			hook.change_order(&mut tokens);
		}
		let tokens = Self::new(tokens).tokens;

		let mut resolved = resolve_tokens(tokens.clone(), ignore_priority);
		for hook in hooks {
			hook.order_query(&tokens, &mut resolved);
		}
		resolved
	}
}

impl<S: AsRef<str>> FromIterator<S> for OrderSpec {
	fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
		Self::new(iter)
	}
}

impl From<&str> for OrderSpec {
	fn from(order: &str) -> Self {
		Self::parse(order)
	}
}

/// Adjusts item ordering around resolution
///
/// Both methods default to doing nothing.
pub trait OrderHook: Send + Sync {
	/// Called with the raw tokens before they are resolved.
	fn change_order(&self, _tokens: &mut Vec<String>) {}

	/// Called with the resolved order before it is applied to a query.
	fn order_query(&self, _tokens: &[String], _order: &mut ResolvedOrder) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
	Asc,
	Desc,
}

impl Direction {
	fn order(self) -> Order {
		match self {
			Direction::Asc => Order::Asc,
			Direction::Desc => Order::Desc,
		}
	}

	fn suffix(self) -> &'static str {
		match self {
			Direction::Asc => "",
			Direction::Desc => " DESC",
		}
	}
}

/// What a sort term reads
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortColumn {
	/// A column of the item table (`a.<column>`)
	Item(String),
	/// The joined search value (`s.value`)
	SearchValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortKey {
	Random,
	/// The column as stored
	Value(SortColumn),
	/// The column coerced to a number, non-numeric text becoming 0
	Numeric(SortColumn),
	/// Whether the column coerces to a non-zero number
	NumericFlag(SortColumn),
	/// Whether the column is NULL
	Missing(SortColumn),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortTerm {
	pub key: SortKey,
	pub direction: Direction,
}

impl SortTerm {
	pub fn asc(key: SortKey) -> Self {
		Self {
			key,
			direction: Direction::Asc,
		}
	}

	pub fn desc(key: SortKey) -> Self {
		Self {
			key,
			direction: Direction::Desc,
		}
	}
}

/// LEFT JOIN against the search table restricted to some element ids
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementJoin {
	pub element_ids: Vec<String>,
}

/// Join descriptor and sort terms of a resolved [`OrderSpec`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOrder {
	pub join: Option<ElementJoin>,
	pub terms: Vec<SortTerm>,
}

impl ResolvedOrder {
	pub fn is_random(&self) -> bool {
		self.terms.first().is_some_and(|term| term.key == SortKey::Random)
	}

	/// Whether the first term is `a.priority DESC`.
	pub fn starts_with_priority(&self) -> bool {
		self.terms.first() == Some(&priority_term())
	}

	/// Renders the ORDER BY list without the keyword.
	///
	/// The search value is read directly; see [`ResolvedOrder::apply`] for the
	/// grouped form.
	pub fn to_sql(&self, backend: DatabaseBackend) -> String {
		self.terms
			.iter()
			.map(|term| format!("{}{}", render_key(&term.key, backend, false), term.direction.suffix()))
			.collect::<Vec<_>>()
			.join(", ")
	}

	/// Adds the join and ORDER BY terms to a statement selecting from the item
	/// table aliased `a`.
	///
	/// In a `grouped` statement the search value is read through `MIN(...)` so
	/// that it stays valid under `GROUP BY a.id`.
	pub fn apply(&self, stmt: &mut SelectStatement, backend: DatabaseBackend, grouped: bool) {
		if let Some(join) = &self.join {
			stmt.join_as(
				JoinType::LeftJoin,
				Alias::new(SEARCH),
				Alias::new("s"),
				Expr::col((Alias::new("a"), Alias::new("id")))
					.equals((Alias::new("s"), Alias::new("item_id")))
					.and(
						Expr::col((Alias::new("s"), Alias::new("element_id")))
							.is_in(join.element_ids.clone()),
					),
			);
		}
		for term in &self.terms {
			stmt.order_by_expr(
				Expr::cust(render_key(&term.key, backend, grouped)),
				term.direction.order(),
			);
		}
	}
}

fn priority_term() -> SortTerm {
	SortTerm::desc(SortKey::Value(SortColumn::Item("priority".to_string())))
}

fn resolve_tokens(mut tokens: Vec<String>, ignore_priority: bool) -> ResolvedOrder {
	if tokens.iter().any(|t| t == RANDOM) {
		return ResolvedOrder {
			join: None,
			terms: vec![SortTerm::asc(SortKey::Random)],
		};
	}

	let mut take = |directive: &str| {
		let found = tokens.iter().any(|t| t == directive);
		tokens.retain(|t| t != directive);
		found
	};
	let ignore_priority = take(IGNORE_PRIORITY) || ignore_priority;
	let direction = if take(REVERSED) {
		Direction::Desc
	} else {
		Direction::Asc
	};
	let alphanumeric = take(ALPHANUMERIC);

	if tokens.is_empty() {
		tokens.push(DEFAULT_ATTRIBUTE.to_string());
	}

	// Element identifiers win over core attributes once several criteria mix
	if tokens.len() > 1 {
		tokens.retain(|t| !t.contains(CORE_PREFIX));
	}

	let core = tokens
		.iter()
		.filter_map(|t| t.strip_prefix(CORE_PREFIX))
		.filter(|column| CORE_COLUMNS.contains(column))
		.next_back()
		.map(str::to_string);
	let elements: Vec<String> = tokens
		.iter()
		.filter(|t| !t.starts_with(CORE_PREFIX))
		.cloned()
		.collect();

	let (join, mut terms) = if let Some(column) = core {
		(None, column_terms(SortColumn::Item(column), direction, alphanumeric))
	} else if !elements.is_empty() {
		(
			Some(ElementJoin {
				element_ids: elements,
			}),
			column_terms(SortColumn::SearchValue, direction, alphanumeric),
		)
	} else {
		(
			None,
			column_terms(SortColumn::Item("name".to_string()), direction, alphanumeric),
		)
	};

	if !ignore_priority {
		terms.insert(0, priority_term());
	}

	ResolvedOrder { join, terms }
}

fn column_terms(column: SortColumn, direction: Direction, alphanumeric: bool) -> Vec<SortTerm> {
	if !alphanumeric {
		return vec![SortTerm {
			key: SortKey::Value(column),
			direction,
		}];
	}

	match direction {
		Direction::Asc => {
			let mut terms = Vec::with_capacity(4);
			if column == SortColumn::SearchValue {
				terms.push(SortTerm::asc(SortKey::Missing(column.clone())));
			}
			terms.push(SortTerm::desc(SortKey::NumericFlag(column.clone())));
			terms.push(SortTerm::asc(SortKey::Numeric(column.clone())));
			terms.push(SortTerm::asc(SortKey::Value(column)));
			terms
		}
		Direction::Desc => vec![
			SortTerm::asc(SortKey::NumericFlag(column.clone())),
			SortTerm::desc(SortKey::Numeric(column.clone())),
			SortTerm::desc(SortKey::Value(column)),
		],
	}
}

fn render_column(column: &SortColumn, grouped: bool) -> String {
	match column {
		SortColumn::Item(name) => format!("a.{name}"),
		SortColumn::SearchValue if grouped => "MIN(s.value)".to_string(),
		SortColumn::SearchValue => "s.value".to_string(),
	}
}

fn render_numeric(column: &str, backend: DatabaseBackend) -> String {
	match backend {
		DatabaseBackend::Postgres => format!(
			"(CASE WHEN CAST({column} AS TEXT) ~ '^\\s*-?[0-9]+(\\.[0-9]+)?\\s*$' \
			 THEN CAST(CAST({column} AS TEXT) AS DOUBLE PRECISION) ELSE 0 END)"
		),
		DatabaseBackend::MySql | DatabaseBackend::Sqlite => format!("{column}+0"),
	}
}

fn render_key(key: &SortKey, backend: DatabaseBackend, grouped: bool) -> String {
	match key {
		SortKey::Random => match backend {
			DatabaseBackend::MySql => "RAND()".to_string(),
			DatabaseBackend::Postgres | DatabaseBackend::Sqlite => "RANDOM()".to_string(),
		},
		SortKey::Value(column) => render_column(column, grouped),
		SortKey::Numeric(column) => render_numeric(&render_column(column, grouped), backend),
		SortKey::NumericFlag(column) => {
			format!("{}<>0", render_numeric(&render_column(column, grouped), backend))
		}
		SortKey::Missing(column) => match backend {
			DatabaseBackend::MySql => format!("ISNULL({})", render_column(column, grouped)),
			DatabaseBackend::Postgres | DatabaseBackend::Sqlite => {
				format!("{} IS NULL", render_column(column, grouped))
			}
		},
	}
}
