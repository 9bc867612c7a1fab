use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::{extension::postgres::PgExpr, Expr},
    ActiveModelTrait,
    ActiveValue::NotSet,
    ColumnTrait, Condition, EntityTrait, ModelTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;
use utoipa::{IntoParams, ToSchema};

use crate::entities::{scholarship, Scholarship};
use crate::error::AppError;
use crate::AppState;

/// Payload for creating a scholarship. Name, description, amount and
/// deadline are required; everything else is optional.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ScholarshipCreate {
    pub name: String,
    pub description: String,
    /// Award amount with two fractional digits
    pub amount: Decimal,
    /// Application deadline (YYYY-MM-DD)
    pub deadline: NaiveDate,
    pub eligibility: Option<String>,
    pub application_url: Option<String>,
    /// Arbitrary structured eligibility criteria
    #[schema(value_type = Option<Object>)]
    pub eligibility_criteria: Option<JsonValue>,
    pub tags: Option<Vec<String>>,
}

impl ScholarshipCreate {
    fn into_active_model(self, now: DateTime<Utc>) -> scholarship::ActiveModel {
        scholarship::ActiveModel {
            id: NotSet,
            name: Set(self.name),
            description: Set(self.description),
            amount: Set(self.amount),
            deadline: Set(self.deadline),
            eligibility: Set(self.eligibility),
            application_url: Set(self.application_url),
            eligibility_criteria: Set(self.eligibility_criteria),
            tags: Set(self.tags),
            created_at: Set(now),
            updated_at: Set(None),
        }
    }
}

// Maps an explicit JSON null to Some(None) so it can be told apart from an
// absent field, which stays None.
fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(de).map(Some)
}

/// Partial-update payload. Only fields present in the JSON are applied;
/// nullable fields accept an explicit null to clear the stored value.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ScholarshipUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub amount: Option<Decimal>,
    pub deadline: Option<NaiveDate>,
    #[serde(default, deserialize_with = "double_option")]
    pub eligibility: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub application_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<Object>)]
    pub eligibility_criteria: Option<Option<JsonValue>>,
    #[serde(default, deserialize_with = "double_option")]
    pub tags: Option<Option<Vec<String>>>,
}

impl ScholarshipUpdate {
    /// Apply every supplied field onto the active model, leaving absent
    /// fields untouched.
    fn apply_to(self, active: &mut scholarship::ActiveModel) {
        if let Some(name) = self.name {
            active.name = Set(name);
        }
        if let Some(description) = self.description {
            active.description = Set(description);
        }
        if let Some(amount) = self.amount {
            active.amount = Set(amount);
        }
        if let Some(deadline) = self.deadline {
            active.deadline = Set(deadline);
        }
        if let Some(eligibility) = self.eligibility {
            active.eligibility = Set(eligibility);
        }
        if let Some(application_url) = self.application_url {
            active.application_url = Set(application_url);
        }
        if let Some(eligibility_criteria) = self.eligibility_criteria {
            active.eligibility_criteria = Set(eligibility_criteria);
        }
        if let Some(tags) = self.tags {
            active.tags = Set(tags);
        }
    }
}

/// A persisted scholarship, exactly as stored.
#[derive(Debug, Serialize, ToSchema)]
pub struct ScholarshipRead {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub amount: Decimal,
    pub deadline: NaiveDate,
    pub eligibility: Option<String>,
    pub application_url: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub eligibility_criteria: Option<JsonValue>,
    pub tags: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<scholarship::Model> for ScholarshipRead {
    fn from(model: scholarship::Model) -> Self {
        ScholarshipRead {
            id: model.id,
            name: model.name,
            description: model.description,
            amount: model.amount,
            deadline: model.deadline,
            eligibility: model.eligibility,
            application_url: model.application_url,
            eligibility_criteria: model.eligibility_criteria,
            tags: model.tags,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Number of records to skip. Defaults to 0.
    #[serde(default)]
    #[param(required = false)]
    pub skip: u64,
    /// Maximum number of records to return. Defaults to 100.
    #[serde(default = "default_limit")]
    #[param(required = false)]
    pub limit: u64,
    /// Only scholarships with a deadline on or before this date
    pub deadline_before: Option<NaiveDate>,
    /// Only scholarships with a deadline on or after this date
    pub deadline_after: Option<NaiveDate>,
    /// Only scholarships with an amount of at least this value
    pub min_amount: Option<Decimal>,
    /// Only scholarships with an amount of at most this value
    pub max_amount: Option<Decimal>,
    /// Case-insensitive match against name or description, or exact
    /// membership in the tags list
    pub search: Option<String>,
}

fn default_limit() -> u64 {
    100
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BulkSummary {
    pub created: usize,
    pub skipped: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SkippedScholarship {
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BulkCreateResponse {
    pub summary: BulkSummary,
    pub created_scholarships: Vec<ScholarshipRead>,
    pub skipped_scholarships: Vec<SkippedScholarship>,
}

/// Create a single scholarship
#[utoipa::path(
    post,
    path = "/scholarships/",
    request_body = ScholarshipCreate,
    responses(
        (status = 201, description = "Scholarship created", body = ScholarshipRead),
        (status = 409, description = "A scholarship with the same name already exists"),
    )
)]
#[tracing::instrument(skip(state, payload), fields(name = %payload.name))]
pub async fn create_scholarship(
    State(state): State<AppState>,
    Json(payload): Json<ScholarshipCreate>,
) -> Result<(StatusCode, Json<ScholarshipRead>), AppError> {
    let txn = state.db.begin().await?;
    let created = payload.into_active_model(Utc::now()).insert(&txn).await?;
    txn.commit().await?;

    tracing::info!(id = created.id, "created scholarship");
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// Create scholarships in bulk
///
/// Duplicate names are skipped per item and reported; the surviving items
/// are committed as a single unit, and any storage failure fails the whole
/// batch with nothing persisted.
#[utoipa::path(
    post,
    path = "/scholarships/bulk",
    request_body = Vec<ScholarshipCreate>,
    responses(
        (status = 201, description = "Batch processed", body = BulkCreateResponse),
        (status = 400, description = "Batch could not be committed"),
    )
)]
#[tracing::instrument(skip(state, payloads), fields(count = payloads.len()))]
pub async fn create_scholarships_bulk(
    State(state): State<AppState>,
    Json(payloads): Json<Vec<ScholarshipCreate>>,
) -> Result<(StatusCode, Json<BulkCreateResponse>), AppError> {
    let txn = state.db.begin().await?;

    let mut created: Vec<ScholarshipRead> = Vec::new();
    let mut skipped: Vec<SkippedScholarship> = Vec::new();

    for payload in payloads {
        // The lookup runs inside the batch transaction, so it also sees
        // rows inserted earlier in this same batch.
        let existing = Scholarship::find()
            .filter(scholarship::Column::Name.eq(payload.name.as_str()))
            .one(&txn)
            .await?;

        if existing.is_some() {
            tracing::warn!(name = %payload.name, "skipping scholarship: duplicate name");
            skipped.push(SkippedScholarship {
                name: payload.name,
                reason: "Duplicate name".to_string(),
            });
            continue;
        }

        match payload.into_active_model(Utc::now()).insert(&txn).await {
            Ok(model) => created.push(ScholarshipRead::from(model)),
            // A failed statement aborts the Postgres transaction, so any
            // insert error fails the batch as a whole.
            Err(e) => return Err(AppError::CommitError(e.to_string())),
        }
    }

    txn.commit()
        .await
        .map_err(|e| AppError::CommitError(e.to_string()))?;

    tracing::info!(
        created = created.len(),
        skipped = skipped.len(),
        "bulk create finished"
    );

    let response = BulkCreateResponse {
        summary: BulkSummary {
            created: created.len(),
            skipped: skipped.len(),
        },
        created_scholarships: created,
        skipped_scholarships: skipped,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// List scholarships with optional filters
#[utoipa::path(
    get,
    path = "/scholarships/",
    params(ListQuery),
    responses(
        (status = 200, description = "Matching scholarships", body = Vec<ScholarshipRead>),
    )
)]
#[tracing::instrument(skip(state, query))]
pub async fn list_scholarships(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<ScholarshipRead>>, AppError> {
    let mut cond = Condition::all();

    if let Some(deadline_before) = query.deadline_before {
        cond = cond.add(scholarship::Column::Deadline.lte(deadline_before));
    }
    if let Some(deadline_after) = query.deadline_after {
        cond = cond.add(scholarship::Column::Deadline.gte(deadline_after));
    }
    if let Some(min_amount) = query.min_amount {
        cond = cond.add(scholarship::Column::Amount.gte(min_amount));
    }
    if let Some(max_amount) = query.max_amount {
        cond = cond.add(scholarship::Column::Amount.lte(max_amount));
    }
    if let Some(search) = &query.search {
        let pattern = format!("%{}%", search);
        cond = cond.add(
            Condition::any()
                .add(Expr::col(scholarship::Column::Name).ilike(pattern.clone()))
                .add(Expr::col(scholarship::Column::Description).ilike(pattern))
                // Exact membership in the tags array, not a substring match
                .add(Expr::cust_with_values("$1 = ANY(tags)", [search.clone()])),
        );
    }

    let records = Scholarship::find()
        .filter(cond)
        .order_by_asc(scholarship::Column::Id)
        .offset(query.skip)
        .limit(query.limit)
        .all(state.db.as_ref())
        .await?;

    Ok(Json(records.into_iter().map(ScholarshipRead::from).collect()))
}

/// Fetch a scholarship by id
#[utoipa::path(
    get,
    path = "/scholarships/{id}",
    params(("id" = i32, Path, description = "Scholarship id")),
    responses(
        (status = 200, description = "The scholarship", body = ScholarshipRead),
        (status = 404, description = "No scholarship with that id"),
    )
)]
#[tracing::instrument(skip(state))]
pub async fn read_scholarship(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ScholarshipRead>, AppError> {
    let record = Scholarship::find_by_id(id)
        .one(state.db.as_ref())
        .await?
        .ok_or_else(|| AppError::NotFound("Scholarship not found".to_string()))?;

    Ok(Json(record.into()))
}

/// Update a scholarship by id, applying only the supplied fields
#[utoipa::path(
    put,
    path = "/scholarships/{id}",
    params(("id" = i32, Path, description = "Scholarship id")),
    request_body = ScholarshipUpdate,
    responses(
        (status = 200, description = "The updated scholarship", body = ScholarshipRead),
        (status = 404, description = "No scholarship with that id"),
        (status = 409, description = "A scholarship with the same name already exists"),
    )
)]
#[tracing::instrument(skip(state, payload))]
pub async fn update_scholarship(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<ScholarshipUpdate>,
) -> Result<Json<ScholarshipRead>, AppError> {
    let txn = state.db.begin().await?;

    let record = Scholarship::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Scholarship not found".to_string()))?;

    let mut active: scholarship::ActiveModel = record.into();
    payload.apply_to(&mut active);
    active.updated_at = Set(Some(Utc::now()));

    let updated = active.update(&txn).await?;
    txn.commit().await?;

    Ok(Json(updated.into()))
}

/// Delete a scholarship by id
#[utoipa::path(
    delete,
    path = "/scholarships/{id}",
    params(("id" = i32, Path, description = "Scholarship id")),
    responses(
        (status = 204, description = "Scholarship deleted"),
        (status = 404, description = "No scholarship with that id"),
    )
)]
#[tracing::instrument(skip(state))]
pub async fn delete_scholarship(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let txn = state.db.begin().await?;

    let record = Scholarship::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Scholarship not found".to_string()))?;

    record.delete(&txn).await?;
    txn.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::ActiveValue;

    fn sample_model() -> scholarship::Model {
        scholarship::Model {
            id: 1,
            name: "STEM Futures Grant".to_string(),
            description: "Annual grant for STEM undergraduates".to_string(),
            amount: Decimal::new(250000, 2),
            deadline: NaiveDate::from_ymd_opt(2026, 6, 30).unwrap(),
            eligibility: Some("Enrolled full-time".to_string()),
            application_url: None,
            eligibility_criteria: None,
            tags: Some(vec!["stem".to_string()]),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn apply_to_sets_only_supplied_fields() {
        let update = ScholarshipUpdate {
            amount: Some(Decimal::new(300000, 2)),
            ..Default::default()
        };

        let mut active: scholarship::ActiveModel = sample_model().into();
        update.apply_to(&mut active);

        assert_eq!(active.amount, Set(Decimal::new(300000, 2)));
        assert!(matches!(active.name, ActiveValue::Unchanged(_)));
        assert!(matches!(active.description, ActiveValue::Unchanged(_)));
        assert!(matches!(active.deadline, ActiveValue::Unchanged(_)));
        assert!(matches!(active.eligibility, ActiveValue::Unchanged(_)));
        assert!(matches!(active.tags, ActiveValue::Unchanged(_)));
    }

    #[test]
    fn apply_to_clears_nullable_field_on_explicit_null() {
        let update: ScholarshipUpdate =
            serde_json::from_str(r#"{"eligibility": null}"#).unwrap();
        assert_eq!(update.eligibility, Some(None));

        let mut active: scholarship::ActiveModel = sample_model().into();
        update.apply_to(&mut active);

        assert_eq!(active.eligibility, Set(None));
    }

    #[test]
    fn absent_fields_deserialize_as_untouched() {
        let update: ScholarshipUpdate = serde_json::from_str(r#"{}"#).unwrap();
        assert!(update.name.is_none());
        assert!(update.eligibility.is_none());
        assert!(update.tags.is_none());

        let mut active: scholarship::ActiveModel = sample_model().into();
        update.apply_to(&mut active);

        assert!(matches!(active.eligibility, ActiveValue::Unchanged(_)));
    }

    #[test]
    fn list_query_defaults() {
        let query: ListQuery = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(query.skip, 0);
        assert_eq!(query.limit, 100);
        assert!(query.search.is_none());
    }

    #[test]
    fn create_payload_maps_to_active_model() {
        let payload = ScholarshipCreate {
            name: "Arts Award".to_string(),
            description: "For visual arts students".to_string(),
            amount: Decimal::new(100000, 2),
            deadline: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            eligibility: None,
            application_url: Some("https://example.org/apply".to_string()),
            eligibility_criteria: None,
            tags: None,
        };

        let now = Utc::now();
        let active = payload.into_active_model(now);

        assert_eq!(active.id, NotSet);
        assert_eq!(active.name, Set("Arts Award".to_string()));
        assert_eq!(active.created_at, Set(now));
        assert_eq!(active.updated_at, Set(None));
    }
}
