//! Common test fixtures for gridline-tables tests

use gridline_core::{BaseColumn, BoxedColumn, Record, RecordId, Value};
use rstest::*;

/// Trip row used across the table tests
#[derive(Debug, Clone, PartialEq)]
pub struct Trip {
	pub id: i64,
	pub destino: String,
	pub monto: Option<f64>,
	pub fecha: String,
}

impl Record for Trip {
	fn id(&self) -> RecordId {
		RecordId::from(self.id)
	}

	fn field(&self, key: &str) -> Value {
		match key {
			"id" => Value::Int(self.id),
			"destino" => Value::from(&self.destino),
			"monto" => Value::from(self.monto),
			"fecha" => Value::from(&self.fecha),
			_ => Value::Null,
		}
	}
}

pub fn trip(id: i64, destino: &str, monto: Option<f64>, fecha: &str) -> Trip {
	Trip {
		id,
		destino: destino.to_string(),
		monto,
		fecha: fecha.to_string(),
	}
}

/// Twenty-five trips spread over 2024, every fifth one without an amount
#[fixture]
pub fn trips() -> Vec<Trip> {
	(1..=25)
		.map(|i| {
			let destino = if i % 2 == 0 { "Monterrey" } else { "Guadalajara" };
			let monto = (i % 5 != 0).then(|| (i * 37 % 11) as f64 * 100.0);
			let month = (i - 1) % 12 + 1;
			trip(i, destino, monto, &format!("2024-{month:02}-{:02}", i % 28 + 1))
		})
		.collect()
}

#[fixture]
pub fn trip_columns() -> Vec<BoxedColumn<Trip>> {
	vec![
		Box::new(BaseColumn::new("destino", "Destino", |t: &Trip| {
			Value::from(&t.destino)
		})),
		Box::new(BaseColumn::new("monto", "Monto", |t: &Trip| Value::from(t.monto))),
		Box::new(BaseColumn::new("fecha", "Fecha", |t: &Trip| Value::from(&t.fecha))),
	]
}

pub fn ids<R: Record>(rows: &[R]) -> Vec<RecordId> {
	rows.iter().map(|r| r.id()).collect()
}
