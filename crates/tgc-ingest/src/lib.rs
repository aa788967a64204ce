//! tgc-ingest
//!
//! Reads a trade-history CSV export (Coinbase fills layout by default) into
//! [`Trade`] records, one row at a time. Columns are picked by header name;
//! any other columns are ignored.
//!
//! The side text is passed through untouched, padding included, so `" BUY"`
//! is an unknown side. Rejecting it is the matching engine's job, after the
//! trade's fee has been counted. Numeric fields tolerate surrounding spaces.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io;
use std::path::Path;

use tgc_ledger::{Side, Trade};

// ---------------------------------------------------------------------------
// Column mapping
// ---------------------------------------------------------------------------

/// Header names for each trade field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMap {
    pub trade_id: String,
    pub side: String,
    pub quantity: String,
    pub price: String,
    pub fee: String,
}

impl Default for ColumnMap {
    /// Coinbase fills export.
    fn default() -> Self {
        Self {
            trade_id: "trade id".to_string(),
            side: "side".to_string(),
            quantity: "size".to_string(),
            price: "price".to_string(),
            fee: "fee".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum IngestError {
    Io { path: String, source: io::Error },
    Csv(csv::Error),
    /// A required header is absent.
    MissingColumn { column: String },
    /// `row` is the 1-based data row (header excluded).
    InvalidField {
        row: u64,
        column: String,
        value: String,
        reason: &'static str,
    },
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "open trades csv {path}: {source}"),
            Self::Csv(e) => write!(f, "read trades csv: {e}"),
            Self::MissingColumn { column } => {
                write!(f, "trades csv is missing required column {column:?}")
            }
            Self::InvalidField {
                row,
                column,
                value,
                reason,
            } => write!(f, "row {row}: column {column:?} value {value:?} {reason}"),
        }
    }
}

impl std::error::Error for IngestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Csv(e) => Some(e),
            _ => None,
        }
    }
}

impl From<csv::Error> for IngestError {
    fn from(e: csv::Error) -> Self {
        IngestError::Csv(e)
    }
}

// ---------------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug)]
struct Positions {
    trade_id: usize,
    side: usize,
    quantity: usize,
    price: usize,
    fee: usize,
}

/// Lazy trade iterator over a CSV source.
pub struct TradeReader<R: io::Read> {
    records: csv::StringRecordsIntoIter<R>,
    columns: ColumnMap,
    positions: Positions,
    row: u64,
}

impl TradeReader<File> {
    pub fn from_path<P: AsRef<Path>>(path: P, columns: ColumnMap) -> Result<Self, IngestError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| IngestError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_reader(file, columns)
    }
}

impl<R: io::Read> TradeReader<R> {
    /// Reads the header row immediately; a missing column fails here.
    pub fn from_reader(rdr: R, columns: ColumnMap) -> Result<Self, IngestError> {
        let mut csv_rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .from_reader(rdr);
        let headers = csv_rdr.headers()?.clone();

        let find = |name: &str| -> Result<usize, IngestError> {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| IngestError::MissingColumn {
                    column: name.to_string(),
                })
        };

        let positions = Positions {
            trade_id: find(columns.trade_id.as_str())?,
            side: find(columns.side.as_str())?,
            quantity: find(columns.quantity.as_str())?,
            price: find(columns.price.as_str())?,
            fee: find(columns.fee.as_str())?,
        };

        Ok(Self {
            records: csv_rdr.into_records(),
            columns,
            positions,
            row: 0,
        })
    }

    fn parse_record(&self, rec: &csv::StringRecord) -> Result<Trade, IngestError> {
        let p = self.positions;
        let c = &self.columns;

        let raw_id = field(rec, p.trade_id).trim();
        let trade_id: u64 = raw_id
            .parse()
            .map_err(|_| self.invalid(&c.trade_id, raw_id, "is not a non-negative integer"))?;

        let quantity = self.parse_number(rec, p.quantity, &c.quantity)?;
        if quantity <= 0.0 {
            return Err(self.invalid(&c.quantity, field(rec, p.quantity).trim(), "must be > 0"));
        }
        let price = self.parse_number(rec, p.price, &c.price)?;
        let fee = self.parse_number(rec, p.fee, &c.fee)?;

        Ok(Trade {
            trade_id,
            side: Side::parse(field(rec, p.side)),
            quantity,
            price,
            fee,
        })
    }

    fn parse_number(
        &self,
        rec: &csv::StringRecord,
        pos: usize,
        column: &str,
    ) -> Result<f64, IngestError> {
        let raw = field(rec, pos).trim();
        match raw.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => Err(self.invalid(column, raw, "is not a finite number")),
        }
    }

    fn invalid(&self, column: &str, value: &str, reason: &'static str) -> IngestError {
        IngestError::InvalidField {
            row: self.row,
            column: column.to_string(),
            value: value.to_string(),
            reason,
        }
    }
}

fn field(rec: &csv::StringRecord, pos: usize) -> &str {
    rec.get(pos).unwrap_or("")
}

impl<R: io::Read> Iterator for TradeReader<R> {
    type Item = Result<Trade, IngestError>;

    fn next(&mut self) -> Option<Self::Item> {
        let rec = match self.records.next()? {
            Ok(rec) => rec,
            Err(e) => return Some(Err(e.into())),
        };
        self.row += 1;
        Some(self.parse_record(&rec))
    }
}

/// Read every trade in `path`, failing on the first bad row.
pub fn read_all<P: AsRef<Path>>(path: P, columns: ColumnMap) -> Result<Vec<Trade>, IngestError> {
    TradeReader::from_path(path, columns)?.collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const COINBASE: &str = "\
portfolio,trade id,product,side,created at,size,size unit,price,fee,total,price/fee/total unit
default,101,BTC-USD,BUY,2021-01-02T10:00:00.000Z,0.5,BTC,30000.00,7.50,-15007.50,USD
default,102,BTC-USD,SELL,2021-01-03T10:00:00.000Z,0.25,BTC,32000.00,4.00,7996.00,USD
";

    fn reader(csv: &str) -> TradeReader<&[u8]> {
        TradeReader::from_reader(csv.as_bytes(), ColumnMap::default()).unwrap()
    }

    #[test]
    fn reads_coinbase_layout_by_header_name() {
        let trades: Vec<Trade> = reader(COINBASE).map(|r| r.unwrap()).collect();
        assert_eq!(
            trades,
            vec![
                Trade::buy(101, 0.5, 30000.0, 7.5),
                Trade::sell(102, 0.25, 32000.0, 4.0),
            ]
        );
    }

    #[test]
    fn unknown_side_passes_through() {
        let csv = "trade id,side,size,price,fee\n1,HOLD,1,2,0.1\n";
        let t = reader(csv).next().unwrap().unwrap();
        assert_eq!(t.side, Side::Other("HOLD".to_string()));
    }

    #[test]
    fn padded_side_is_not_trimmed() {
        let csv = "trade id , side ,size,price,fee\n 1 , BUY, 2 ,3, 0.1\n";
        let t = reader(csv).next().unwrap().unwrap();
        assert_eq!(t.side, Side::Other(" BUY".to_string()));
        assert_eq!(t.trade_id, 1);
        assert_eq!(t.quantity, 2.0);
        assert_eq!(t.fee, 0.1);
    }

    #[test]
    fn missing_column_fails_at_open() {
        let csv = "trade id,side,size,price\n1,BUY,1,2\n";
        let err = TradeReader::from_reader(csv.as_bytes(), ColumnMap::default())
            .err()
            .unwrap();
        assert!(matches!(err, IngestError::MissingColumn { ref column } if column == "fee"));
    }

    #[test]
    fn bad_number_reports_row_and_column() {
        let csv = "trade id,side,size,price,fee\n1,BUY,1,2,0\n2,BUY,abc,2,0\n";
        let mut r = reader(csv);
        assert!(r.next().unwrap().is_ok());
        let err = r.next().unwrap().unwrap_err();
        assert_eq!(
            err.to_string(),
            "row 2: column \"size\" value \"abc\" is not a finite number"
        );
    }

    #[test]
    fn non_positive_quantity_rejected() {
        let csv = "trade id,side,size,price,fee\n1,BUY,0,2,0\n";
        let err = reader(csv).next().unwrap().unwrap_err();
        assert!(matches!(err, IngestError::InvalidField { row: 1, .. }));
    }

    #[test]
    fn negative_trade_id_rejected() {
        let csv = "trade id,side,size,price,fee\n-1,BUY,1,2,0\n";
        let err = reader(csv).next().unwrap().unwrap_err();
        assert!(err.to_string().contains("non-negative integer"));
    }

    #[test]
    fn custom_columns() {
        let csv = "id,dir,qty,px,commission\n7,SELL,3,4,0.5\n";
        let columns = ColumnMap {
            trade_id: "id".into(),
            side: "dir".into(),
            quantity: "qty".into(),
            price: "px".into(),
            fee: "commission".into(),
        };
        let t = TradeReader::from_reader(csv.as_bytes(), columns)
            .unwrap()
            .next()
            .unwrap()
            .unwrap();
        assert_eq!(t, Trade::sell(7, 3.0, 4.0, 0.5));
    }
}
