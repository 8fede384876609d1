//! Feed query - filtered, ordered, cursor-paginated view of a collection

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

use crate::entities::Document;
use crate::value_objects::DocId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl FilterOp {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }

    fn holds(self, ord: Ordering) -> bool {
        match self {
            Self::Eq => ord == Ordering::Equal,
            Self::Ne => ord != Ordering::Equal,
            Self::Lt => ord == Ordering::Less,
            Self::Le => ord != Ordering::Greater,
            Self::Gt => ord == Ordering::Greater,
            Self::Ge => ord != Ordering::Less,
        }
    }
}

/// Predicate on a top-level field of the document data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldFilter {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

impl FieldFilter {
    pub fn new(field: impl Into<String>, op: FilterOp, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, FilterOp::Eq, value)
    }

    /// Documents missing the field never match
    pub fn matches(&self, doc: &Document) -> bool {
        match field_value(doc, &self.field) {
            Some(actual) => self.op.holds(compare_values(&actual, &self.value)),
            None => false,
        }
    }
}

/// Position after which the next page starts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedCursor {
    pub value: Value,
    pub id: DocId,
}

impl FeedCursor {
    pub fn from_document(doc: &Document, order_by: &str) -> Self {
        Self {
            value: field_value(doc, order_by).unwrap_or(Value::Null),
            id: doc.id.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedQuery {
    pub collection: String,
    pub filters: Vec<FieldFilter>,
    pub order_by: String,
    pub direction: SortDirection,
    pub limit: usize,
    pub start_after: Option<FeedCursor>,
}

impl FeedQuery {
    pub const DEFAULT_LIMIT: usize = 20;
    pub const MAX_LIMIT: usize = 100;

    /// Newest-first query over a collection
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            filters: Vec::new(),
            order_by: Document::CREATED_AT_FIELD.to_string(),
            direction: SortDirection::Desc,
            limit: Self::DEFAULT_LIMIT,
            start_after: None,
        }
    }

    pub fn filter(mut self, filter: FieldFilter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.order_by = field.into();
        self.direction = direction;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit.clamp(1, Self::MAX_LIMIT);
        self
    }

    pub fn start_after(mut self, cursor: Option<FeedCursor>) -> Self {
        self.start_after = cursor;
        self
    }

    pub fn matches(&self, doc: &Document) -> bool {
        doc.collection == self.collection && self.filters.iter().all(|f| f.matches(doc))
    }

    /// Ordering of two documents in this query's sort order; ties broken by id
    pub fn compare(&self, a: &Document, b: &Document) -> Ordering {
        let va = field_value(a, &self.order_by).unwrap_or(Value::Null);
        let vb = field_value(b, &self.order_by).unwrap_or(Value::Null);
        let ord = compare_values(&va, &vb).then_with(|| a.id.cmp(&b.id));
        match self.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    }

    fn is_after_cursor(&self, doc: &Document) -> bool {
        let Some(cursor) = &self.start_after else {
            return true;
        };
        let value = field_value(doc, &self.order_by).unwrap_or(Value::Null);
        let ord = compare_values(&value, &cursor.value).then_with(|| doc.id.cmp(&cursor.id));
        match self.direction {
            SortDirection::Asc => ord == Ordering::Greater,
            SortDirection::Desc => ord == Ordering::Less,
        }
    }

    /// Evaluate the query over an in-memory set of documents
    pub fn apply<I>(&self, docs: I) -> Vec<Document>
    where
        I: IntoIterator<Item = Document>,
    {
        let mut out: Vec<Document> = docs
            .into_iter()
            .filter(|d| self.matches(d) && self.is_after_cursor(d))
            .collect();
        out.sort_by(|a, b| self.compare(a, b));
        out.truncate(self.limit);
        out
    }
}

fn field_value(doc: &Document, field: &str) -> Option<Value> {
    match field {
        "id" => Some(Value::from(doc.id.as_str())),
        "ownerId" => doc.owner_id.as_ref().map(|o| Value::from(o.as_str())),
        _ => doc.field(field).cloned(),
    }
}

fn type_rank(v: &Value) -> u8 {
    // Matches PostgreSQL jsonb ordering across types
    match v {
        Value::Null => 0,
        Value::String(_) => 1,
        Value::Number(_) => 2,
        Value::Bool(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Total order over JSON values
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => {
            for (l, r) in x.iter().zip(y.iter()) {
                let ord = compare_values(l, r);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            x.len().cmp(&y.len())
        }
        (Value::Object(x), Value::Object(y)) => x.len().cmp(&y.len()),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}
