use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config;
use crate::error::{DashboardError, Result};

// ---------------------------------------------------------------------------
// Field — typed schema of a sales record
// ---------------------------------------------------------------------------

/// One column of the sales schema.
///
/// Variants are declared in wire order, so the derived `Ord` is the API
/// column order and a `BTreeSet<Field>` iterates in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Field {
    #[serde(rename = "Produto")]
    Product,
    #[serde(rename = "Categoria do Produto")]
    Category,
    #[serde(rename = "Preço")]
    Price,
    #[serde(rename = "Frete")]
    Freight,
    #[serde(rename = "Data da Compra")]
    PurchaseDate,
    #[serde(rename = "Vendedor")]
    Seller,
    #[serde(rename = "Local da compra")]
    Location,
    #[serde(rename = "Avaliação da compra")]
    Rating,
    #[serde(rename = "Tipo de pagamento")]
    PaymentType,
    #[serde(rename = "Quantidade de parcelas")]
    Installments,
    #[serde(rename = "lat")]
    Latitude,
    #[serde(rename = "lon")]
    Longitude,
}

/// Value domain of a [`Field`], deciding which constraints apply to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Integer,
    Date,
}

impl Field {
    pub const ALL: [Field; 12] = [
        Field::Product,
        Field::Category,
        Field::Price,
        Field::Freight,
        Field::PurchaseDate,
        Field::Seller,
        Field::Location,
        Field::Rating,
        Field::PaymentType,
        Field::Installments,
        Field::Latitude,
        Field::Longitude,
    ];

    /// Column name as it appears in the API payload and the CSV header.
    pub fn name(self) -> &'static str {
        match self {
            Field::Product => "Produto",
            Field::Category => "Categoria do Produto",
            Field::Price => "Preço",
            Field::Freight => "Frete",
            Field::PurchaseDate => "Data da Compra",
            Field::Seller => "Vendedor",
            Field::Location => "Local da compra",
            Field::Rating => "Avaliação da compra",
            Field::PaymentType => "Tipo de pagamento",
            Field::Installments => "Quantidade de parcelas",
            Field::Latitude => "lat",
            Field::Longitude => "lon",
        }
    }

    /// Parse an exported cell of this field back into its typed value.
    pub fn parse_cell(self, raw: &str) -> Result<Cell> {
        match self.kind() {
            FieldKind::Text => Ok(Cell::Text(raw.to_string())),
            FieldKind::Number => parse_number(self, raw).map(Cell::Number),
            FieldKind::Integer => {
                let n = parse_integer(self, raw)?;
                if self == Field::Rating {
                    check_rating(n)?;
                }
                Ok(Cell::Integer(n))
            }
            FieldKind::Date => {
                parse_date(self, raw, config::EXPORT_DATE_FORMAT).map(Cell::Date)
            }
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            Field::Product
            | Field::Category
            | Field::Seller
            | Field::Location
            | Field::PaymentType => FieldKind::Text,
            Field::Price | Field::Freight | Field::Latitude | Field::Longitude => {
                FieldKind::Number
            }
            Field::Rating | Field::Installments => FieldKind::Integer,
            Field::PurchaseDate => FieldKind::Date,
        }
    }

    /// Column of the DuckDB `sales` table holding this field.
    pub fn sql_column(self) -> &'static str {
        match self {
            Field::Product => "product",
            Field::Category => "category",
            Field::Price => "price",
            Field::Freight => "freight",
            Field::PurchaseDate => "purchase_date",
            Field::Seller => "seller",
            Field::Location => "location",
            Field::Rating => "rating",
            Field::PaymentType => "payment_type",
            Field::Installments => "installments",
            Field::Latitude => "lat",
            Field::Longitude => "lon",
        }
    }
}

impl FromStr for Field {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        Field::ALL
            .iter()
            .copied()
            .find(|f| f.name() == s)
            .ok_or_else(|| DashboardError::InvalidCriteria(format!("unknown field: {}", s)))
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Value — borrowed view of one cell
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value<'a> {
    Text(&'a str),
    Number(f64),
    Integer(i64),
    Date(NaiveDate),
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Number(n) => write!(f, "{}", n),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Date(d) => write!(f, "{}", d.format(config::EXPORT_DATE_FORMAT)),
        }
    }
}

/// Owned counterpart of [`Value`], as decoded from an exported file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Cell {
    Text(String),
    Number(f64),
    Integer(i64),
    Date(NaiveDate),
}

impl From<Value<'_>> for Cell {
    fn from(value: Value<'_>) -> Self {
        match value {
            Value::Text(s) => Cell::Text(s.to_string()),
            Value::Number(n) => Cell::Number(n),
            Value::Integer(n) => Cell::Integer(n),
            Value::Date(d) => Cell::Date(d),
        }
    }
}

// ---------------------------------------------------------------------------
// Record — one sale
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub product: String,
    pub category: String,
    pub price: f64,
    pub freight: f64,
    pub purchase_date: NaiveDate,
    pub seller: String,
    pub location: String,
    pub rating: i64,
    pub payment_type: String,
    pub installments: i64,
    pub latitude: f64,
    pub longitude: f64,
}

impl Record {
    pub fn value(&self, field: Field) -> Value<'_> {
        match field {
            Field::Product => Value::Text(&self.product),
            Field::Category => Value::Text(&self.category),
            Field::Price => Value::Number(self.price),
            Field::Freight => Value::Number(self.freight),
            Field::PurchaseDate => Value::Date(self.purchase_date),
            Field::Seller => Value::Text(&self.seller),
            Field::Location => Value::Text(&self.location),
            Field::Rating => Value::Integer(self.rating),
            Field::PaymentType => Value::Text(&self.payment_type),
            Field::Installments => Value::Integer(self.installments),
            Field::Latitude => Value::Number(self.latitude),
            Field::Longitude => Value::Number(self.longitude),
        }
    }
}

/// A record exactly as the API sends it.
#[derive(Debug, Deserialize)]
struct WireRecord {
    #[serde(rename = "Produto")]
    product: String,
    #[serde(rename = "Categoria do Produto")]
    category: String,
    #[serde(rename = "Preço")]
    price: f64,
    #[serde(rename = "Frete")]
    freight: f64,
    #[serde(rename = "Data da Compra")]
    purchase_date: String,
    #[serde(rename = "Vendedor")]
    seller: String,
    #[serde(rename = "Local da compra")]
    location: String,
    #[serde(rename = "Avaliação da compra")]
    rating: i64,
    #[serde(rename = "Tipo de pagamento")]
    payment_type: String,
    #[serde(rename = "Quantidade de parcelas")]
    installments: i64,
    lat: f64,
    lon: f64,
}

impl WireRecord {
    fn into_record(self) -> Result<Record> {
        let wire = self;
        let purchase_date = parse_date(
            Field::PurchaseDate,
            &wire.purchase_date,
            config::WIRE_DATE_FORMAT,
        )?;
        check_rating(wire.rating)?;
        Ok(Record {
            product: wire.product,
            category: wire.category,
            price: wire.price,
            freight: wire.freight,
            purchase_date,
            seller: wire.seller,
            location: wire.location,
            rating: wire.rating,
            payment_type: wire.payment_type,
            installments: wire.installments,
            latitude: wire.lat,
            longitude: wire.lon,
        })
    }
}

fn parse_date(field: Field, value: &str, format: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), format).map_err(|e| DashboardError::DataParse {
        field: field.name(),
        value: value.to_string(),
        message: e.to_string(),
    })
}

fn parse_number(field: Field, value: &str) -> Result<f64> {
    value.trim().parse().map_err(|e: std::num::ParseFloatError| DashboardError::DataParse {
        field: field.name(),
        value: value.to_string(),
        message: e.to_string(),
    })
}

fn parse_integer(field: Field, value: &str) -> Result<i64> {
    value.trim().parse().map_err(|e: std::num::ParseIntError| DashboardError::DataParse {
        field: field.name(),
        value: value.to_string(),
        message: e.to_string(),
    })
}

fn check_rating(rating: i64) -> Result<()> {
    if (1..=5).contains(&rating) {
        Ok(())
    } else {
        Err(DashboardError::DataParse {
            field: Field::Rating.name(),
            value: rating.to_string(),
            message: "rating must be between 1 and 5".to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// RecordCollection — one fetch worth of records plus its column projection
// ---------------------------------------------------------------------------

/// An ordered, immutable set of records and the columns currently exposed.
///
/// Records always carry every field; the projection only decides which of
/// them are shown and exported.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordCollection {
    columns: Vec<Field>,
    records: Vec<Record>,
}

impl RecordCollection {
    /// A collection exposing every schema column.
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            columns: Field::ALL.to_vec(),
            records,
        }
    }

    /// `columns` must already be deduplicated and in schema order.
    pub(crate) fn projected(records: Vec<Record>, columns: Vec<Field>) -> Self {
        Self { columns, records }
    }

    /// Decode an API response body: a JSON array of flat sale objects.
    ///
    /// A body that is not such an array is `MalformedResponse`; a record
    /// whose date does not parse aborts the whole decode with `DataParse`.
    pub fn from_json(body: &[u8]) -> Result<Self> {
        let wire: Vec<WireRecord> = serde_json::from_slice(body)
            .map_err(|e| DashboardError::MalformedResponse(e.to_string()))?;
        let records = wire
            .into_iter()
            .map(WireRecord::into_record)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(records))
    }

    pub fn columns(&self) -> &[Field] {
        &self.columns
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// The projected cells of every row, in column order.
    pub fn rows(&self) -> impl Iterator<Item = Vec<Value<'_>>> + '_ {
        self.records
            .iter()
            .map(move |r| self.columns.iter().map(|&f| r.value(f)).collect())
    }
}

impl<'a> IntoIterator for &'a RecordCollection {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
