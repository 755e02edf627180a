//! Sale-to-service transactions

use crate::error::{BasketError, Result};
use rusqlite::{Connection, OpenFlags};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::info;

const SERVICES_QUERY: &str = "
    SELECT ss.sale_id, s.name
    FROM sales_services ss
    JOIN services s ON ss.service_id = s.id
    ORDER BY ss.sale_id";

/// One service attached to one sale
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceLine {
    pub sale_id: i64,
    pub service_name: String,
}

/// Services bought together, one basket per sale
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transactions {
    /// Sorted, deduplicated service names per sale, in sale id order
    baskets: Vec<Vec<String>>,
}

impl Transactions {
    /// Group `(sale_id, service)` pairs into baskets
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (i64, String)>,
    {
        let mut grouped: BTreeMap<i64, BTreeSet<String>> = BTreeMap::new();
        for (sale_id, service) in pairs {
            grouped.entry(sale_id).or_default().insert(service);
        }
        Self {
            baskets: grouped
                .into_values()
                .map(|items| items.into_iter().collect())
                .collect(),
        }
    }

    /// Read `sale_id,service_name` rows from a CSV file
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path)?;

        let headers = reader.headers()?.clone();
        let missing: Vec<&str> = ["sale_id", "service_name"]
            .into_iter()
            .filter(|name| !headers.iter().any(|h| h == *name))
            .collect();
        if !missing.is_empty() {
            return Err(BasketError::DataError(format!(
                "Missing required columns: {:?}",
                missing
            )));
        }

        let mut pairs = Vec::new();
        for (i, row) in reader.deserialize::<ServiceLine>().enumerate() {
            let line = row.map_err(|e| BasketError::ParseError {
                row: i + 1,
                message: e.to_string(),
            })?;
            pairs.push((line.sale_id, line.service_name));
        }

        let transactions = Self::from_pairs(pairs);
        info!(baskets = transactions.len(), "loaded baskets from file");
        Ok(transactions)
    }

    /// Read sale/service pairs from the SQLite booking database
    pub fn from_database<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(BasketError::DataError(format!(
                "database {} does not exist",
                path.display()
            )));
        }

        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        let mut stmt = conn.prepare(SERVICES_QUERY)?;
        let pairs = stmt
            .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let transactions = Self::from_pairs(pairs);
        info!(baskets = transactions.len(), "loaded baskets from database");
        Ok(transactions)
    }

    pub fn baskets(&self) -> &[Vec<String>] {
        &self.baskets
    }

    pub fn len(&self) -> usize {
        self.baskets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.baskets.is_empty()
    }
}
