use aws_sdk_dynamodb::Client as DynamoClient;
use aws_sdk_s3::Client as S3Client;
use book_tracker_shared::attachments::S3AttachmentStore;
use book_tracker_shared::books::BookService;
use book_tracker_shared::config::Config;
use book_tracker_shared::storage::DynamoBookStore;
use book_tracker_shared::AppState;
use lambda_http::{run, service_fn, tracing, Error, Request};
use std::sync::Arc;

mod http_handler;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();

    let config = Config::from_env()?;

    // Initialize AWS clients once at startup
    let aws_config = aws_config::load_from_env().await;

    // Endpoint overrides point at local DynamoDB / S3 stand-ins
    let dynamo_client = match &config.dynamodb_endpoint {
        Some(endpoint) => DynamoClient::from_conf(
            aws_sdk_dynamodb::config::Builder::from(&aws_config)
                .endpoint_url(endpoint)
                .build(),
        ),
        None => DynamoClient::new(&aws_config),
    };
    let s3_client = match &config.s3_endpoint {
        Some(endpoint) => S3Client::from_conf(
            aws_sdk_s3::config::Builder::from(&aws_config)
                .endpoint_url(endpoint)
                .force_path_style(true)
                .build(),
        ),
        None => S3Client::new(&aws_config),
    };

    tracing::info!(
        table = %config.table_name,
        index = %config.search_index,
        bucket = %config.bucket_name,
        "Books API starting"
    );

    let books = BookService::new(
        Arc::new(DynamoBookStore::new(
            dynamo_client,
            config.table_name.clone(),
            config.search_index.clone(),
        )),
        Arc::new(S3AttachmentStore::new(
            s3_client,
            config.bucket_name.clone(),
            config.url_expiration,
        )),
    );
    let state = AppState::new(books);

    run(service_fn(move |event: Request| {
        let state = Arc::clone(&state);
        async move { http_handler::function_handler(event, state).await }
    }))
    .await
}
