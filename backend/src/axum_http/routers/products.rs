use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State, multipart::Field},
    routing::{get, post},
};
use offszn::{
    domain::{
        repositories::{
            products::ProductRepository, storage::AssetStorage,
            upload_intents::UploadIntentRepository,
        },
        value_objects::{
            enums::asset_slots::AssetSlot,
            products::{ProductDto, ProductPayload, ProductQuery},
            publish_wizard::SaveMode,
        },
    },
    infra::{
        db::{
            postgres::postgres_connection::PgPoolSquad,
            repositories::{products::ProductPostgres, upload_intents::UploadIntentPostgres},
        },
        storages::supabase_storage::SupabaseStorageClient,
    },
};
use serde_json::{Value, json};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    axum_http::error_responses::AppError,
    usecases::{
        asset_uploads::UploadedFile,
        products::ProductCatalogUseCase,
        publish_product::{ProductFiles, PublishProductUseCase},
    },
};

const PAYLOAD_FIELD: &str = "payload";

pub fn routes(db_pool: Arc<PgPoolSquad>, storage: Arc<SupabaseStorageClient>) -> Router {
    let product_repository = Arc::new(ProductPostgres::new(Arc::clone(&db_pool)));
    let upload_intent_repository = Arc::new(UploadIntentPostgres::new(Arc::clone(&db_pool)));

    let catalog_usecase = ProductCatalogUseCase::new(Arc::clone(&product_repository));
    let publish_usecase =
        PublishProductUseCase::new(product_repository, storage, upload_intent_repository);

    let catalog = Router::new()
        .route("/", get(list_products))
        .route("/:id/play", post(record_play))
        .with_state(Arc::new(catalog_usecase));

    let publishing = Router::new()
        .route("/publish", post(publish))
        .route("/draft", post(save_draft))
        .with_state(Arc::new(publish_usecase));

    catalog.merge(publishing)
}

pub async fn list_products<P>(
    State(usecase): State<Arc<ProductCatalogUseCase<P>>>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Vec<ProductDto>>, AppError>
where
    P: ProductRepository + Send + Sync + 'static,
{
    let products = usecase.list(query).await?;
    Ok(Json(products))
}

pub async fn record_play<P>(
    State(usecase): State<Arc<ProductCatalogUseCase<P>>>,
    Path(product_id): Path<Uuid>,
) -> Result<Json<Value>, AppError>
where
    P: ProductRepository + Send + Sync + 'static,
{
    let play_count = usecase.record_play(product_id).await?;
    Ok(Json(json!({ "play_count": play_count })))
}

pub async fn publish<P, S, U>(
    State(usecase): State<Arc<PublishProductUseCase<P, S, U>>>,
    AuthUser { user_id, .. }: AuthUser,
    multipart: Multipart,
) -> Result<Json<ProductDto>, AppError>
where
    P: ProductRepository + Send + Sync + 'static,
    S: AssetStorage + Send + Sync + 'static,
    U: UploadIntentRepository + Send + Sync + 'static,
{
    save(usecase, user_id, SaveMode::Publish, multipart).await
}

pub async fn save_draft<P, S, U>(
    State(usecase): State<Arc<PublishProductUseCase<P, S, U>>>,
    AuthUser { user_id, .. }: AuthUser,
    multipart: Multipart,
) -> Result<Json<ProductDto>, AppError>
where
    P: ProductRepository + Send + Sync + 'static,
    S: AssetStorage + Send + Sync + 'static,
    U: UploadIntentRepository + Send + Sync + 'static,
{
    save(usecase, user_id, SaveMode::Draft, multipart).await
}

async fn save<P, S, U>(
    usecase: Arc<PublishProductUseCase<P, S, U>>,
    user_id: Uuid,
    mode: SaveMode,
    multipart: Multipart,
) -> Result<Json<ProductDto>, AppError>
where
    P: ProductRepository + Send + Sync + 'static,
    S: AssetStorage + Send + Sync + 'static,
    U: UploadIntentRepository + Send + Sync + 'static,
{
    let (payload, files) = read_product_form(multipart).await?;
    info!(%user_id, ?mode, product_id = ?payload.id, "products: save request received");

    let product = usecase.save(user_id, mode, payload, files).await?;
    Ok(Json(product))
}

/// Splits the wizard form into the JSON metadata part and the file parts.
async fn read_product_form(mut multipart: Multipart) -> Result<(ProductPayload, ProductFiles), AppError> {
    let mut payload = None;
    let mut files = ProductFiles::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::bad_request(format!("Invalid form data: {err}")))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == PAYLOAD_FIELD {
            let raw = field
                .text()
                .await
                .map_err(|err| AppError::bad_request(format!("Invalid payload: {err}")))?;
            let parsed: ProductPayload = serde_json::from_str(&raw)
                .map_err(|err| AppError::bad_request(format!("Invalid payload: {err}")))?;
            payload = Some(parsed);
            continue;
        }

        match AssetSlot::from_field_name(&name) {
            Some(slot) => {
                let file = read_file(field, slot).await?;
                if !file.bytes.is_empty() {
                    files.insert(slot, file);
                }
            }
            None => warn!(field = %name, "products: ignoring unknown form field"),
        }
    }

    let payload = payload.ok_or_else(|| AppError::bad_request("Missing payload part"))?;
    Ok((payload, files))
}

async fn read_file(field: Field<'_>, slot: AssetSlot) -> Result<UploadedFile, AppError> {
    let file_name = field
        .file_name()
        .map(str::to_string)
        .unwrap_or_else(|| slot.to_string());
    let content_type = field.content_type().map(str::to_string);
    let bytes = field
        .bytes()
        .await
        .map_err(|err| AppError::bad_request(format!("Failed to read {slot} file: {err}")))?;

    Ok(UploadedFile {
        file_name,
        content_type,
        bytes: bytes.to_vec(),
    })
}
