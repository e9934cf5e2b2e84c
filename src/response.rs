//! Response envelopes: `{ "data": row }` for one row, `{ "data": [rows], "meta": {..} }` for many.

use crate::codec::Instance;
use crate::sql::EntityFilter;
use axum::{http::StatusCode, Json};
use serde::Serialize;

#[derive(Serialize)]
pub struct RowBody {
    pub data: Instance,
}

#[derive(Serialize)]
pub struct RowsBody {
    pub data: Vec<Instance>,
    pub meta: RowsMeta,
}

/// Row count, plus the pagination window when the request asked for one.
#[derive(Debug, Default, PartialEq, Serialize)]
pub struct RowsMeta {
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<u32>,
}

pub type RowReply = (StatusCode, Json<RowBody>);
pub type RowsReply = (StatusCode, Json<RowsBody>);

pub fn created(data: Instance) -> RowReply {
    (StatusCode::CREATED, Json(RowBody { data }))
}

pub fn row(data: Instance) -> RowReply {
    (StatusCode::OK, Json(RowBody { data }))
}

pub fn rows(data: Vec<Instance>) -> RowsReply {
    let meta = RowsMeta {
        count: data.len(),
        ..RowsMeta::default()
    };
    (StatusCode::OK, Json(RowsBody { data, meta }))
}

/// Rows of a filtered listing; echoes the applied `first`/`skip`.
pub fn page(data: Vec<Instance>, filter: &EntityFilter) -> RowsReply {
    let meta = RowsMeta {
        count: data.len(),
        first: filter.first,
        skip: filter.skip,
    };
    (StatusCode::OK, Json(RowsBody { data, meta }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_meta_echoes_window() {
        let filter = EntityFilter::new().first(2).skip(4);
        let (status, Json(body)) = page(vec![Instance::new()], &filter);
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body.meta,
            RowsMeta {
                count: 1,
                first: Some(2),
                skip: Some(4)
            }
        );
        let json = serde_json::to_value(&rows(Vec::new()).1 .0).unwrap();
        assert_eq!(json, serde_json::json!({ "data": [], "meta": { "count": 0 } }));
    }
}
