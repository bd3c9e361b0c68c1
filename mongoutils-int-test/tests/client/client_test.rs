use mongoutils::client::{Client, ClientConfig, Connection};
use mongoutils::errors::{ErrorKind, MongoUtilsError};
use mongoutils_int_test::test_util::{
    cleanup, run_test, server_configured, test_client_config, TestContext,
};

#[tokio::test]
async fn test_connect_and_ping() {
    run_test(|ctx| async move {
        ctx.client().ping().await?;
        assert_eq!(ctx.connection().timeout(), ctx.timeout());
        Ok::<(), MongoUtilsError>(())
    })
    .await
}

#[tokio::test]
async fn test_list_collections_of_new_database() {
    run_test(|ctx| async move {
        let names = ctx
            .client()
            .list_collection_names(ctx.database(), ctx.timeout())
            .await?;
        assert!(names.is_empty());
        Ok::<(), MongoUtilsError>(())
    })
    .await
}

#[tokio::test]
async fn test_connect_times_out_on_invalid_host() {
    if !server_configured() {
        return;
    }

    let mut builder = ClientConfig::builder()
        .host("invalid-conn-str:27017")
        .connect_timeout_ms(500);
    let config = test_client_config().unwrap();
    if let Some(username) = config.username() {
        builder = builder.username(username);
    }
    if let Some(password) = config.password() {
        builder = builder.password(password);
    }

    let result = Client::connect(builder.build().unwrap()).await;
    let err = match result {
        Ok(_) => panic!("connecting to an invalid host must fail"),
        Err(err) => err,
    };
    assert!(matches!(
        err.kind(),
        ErrorKind::Timeout | ErrorKind::ConnectionError
    ));
}

#[tokio::test]
async fn test_zero_resource_timeout_is_rejected() {
    let config = ClientConfig::builder()
        .host("localhost:27017")
        .build()
        .unwrap();
    let client = Client::lazy(config).unwrap();
    let result = Connection::new(client, 0);
    assert_eq!(
        result.err().map(|e| e.kind().clone()),
        Some(ErrorKind::InvalidConfiguration)
    );
}

#[tokio::test]
async fn test_cleanup_tolerates_unreachable_server() {
    let config = ClientConfig::builder()
        .host("127.0.0.1:1")
        .connect_timeout_ms(100)
        .build()
        .unwrap();
    let client = Client::lazy(config).unwrap();
    let connection = Connection::new(client.clone(), 100).unwrap();
    let ctx = TestContext::new(client, connection, "cleanup_db".to_string());
    assert!(cleanup(ctx).await.is_ok());
}
