use sea_query::{Alias, Asterisk, Expr, ExprTrait, Order, Query};
use sqlx::any::AnyRow;
use zoo_core::{Application, Params};

use crate::backend::{Database, get_i64, get_string};
use crate::error::DbResult;
use crate::schema::APPLICATION;

fn application_from_row(row: &AnyRow) -> DbResult<Application> {
	Ok(Application {
		id: get_i64(row, "id")?,
		name: get_string(row, "name")?,
		alias: get_string(row, "alias")?,
		group: get_string(row, "application_group")?,
		params: Params::from_json(&get_string(row, "params")?),
	})
}

/// Application rows
#[derive(Clone)]
pub struct ApplicationRepository {
	db: Database,
}

impl ApplicationRepository {
	pub fn new(db: Database) -> Self {
		Self { db }
	}

	pub async fn get(&self, id: i64) -> DbResult<Option<Application>> {
		let stmt = Query::select()
			.column(Asterisk)
			.from(Alias::new(APPLICATION))
			.and_where(Expr::col(Alias::new("id")).eq(id))
			.to_owned();
		self.db
			.fetch_optional(&stmt)
			.await?
			.as_ref()
			.map(application_from_row)
			.transpose()
	}

	pub async fn exists(&self, id: i64) -> DbResult<bool> {
		let stmt = Query::select()
			.expr(Expr::cust("COUNT(*) AS count"))
			.from(Alias::new(APPLICATION))
			.and_where(Expr::col(Alias::new("id")).eq(id))
			.to_owned();
		Ok(self.db.fetch_count(&stmt).await? > 0)
	}

	pub async fn all(&self) -> DbResult<Vec<Application>> {
		let stmt = Query::select()
			.column(Asterisk)
			.from(Alias::new(APPLICATION))
			.order_by(Alias::new("name"), Order::Asc)
			.to_owned();
		let rows = self.db.fetch_all(&stmt).await?;
		rows.iter().map(application_from_row).collect()
	}

	/// Inserts or updates the application and sets its id.
	pub async fn save(&self, application: &mut Application) -> DbResult<()> {
		let values: [(&str, Expr); 4] = [
			("name", application.name.as_str().into()),
			("alias", application.alias.as_str().into()),
			("application_group", application.group.as_str().into()),
			("params", application.params.to_json().into()),
		];

		if application.id == 0 {
			let stmt = Query::insert()
				.into_table(Alias::new(APPLICATION))
				.columns(values.iter().map(|(column, _)| Alias::new(*column)))
				.values_panic(values.into_iter().map(|(_, value)| value))
				.to_owned();
			application.id = self.db.insert(&stmt, APPLICATION).await?;
		} else {
			let stmt = Query::update()
				.table(Alias::new(APPLICATION))
				.values(values.into_iter().map(|(column, value)| (Alias::new(column), value)))
				.and_where(Expr::col(Alias::new("id")).eq(application.id))
				.to_owned();
			self.db.execute(&stmt).await?;
		}

		tracing::debug!(id = application.id, name = %application.name, "saved application");
		Ok(())
	}
}
