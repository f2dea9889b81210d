use lambda_http::{run, service_fn, tracing, Error, Request};
use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};
use std::env;

mod http_handler;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();

    // One pool per process; connections open lazily on first use so a cold
    // start does not block on the database.
    let options = MySqlConnectOptions::new()
        .host(&env::var("DB_HOST").expect("DB_HOST must be set"))
        .username(&env::var("DB_USER").expect("DB_USER must be set"))
        .password(&env::var("DB_PASSWORD").expect("DB_PASSWORD must be set"))
        .database(&env::var("DB_NAME").expect("DB_NAME must be set"));

    let pool = MySqlPoolOptions::new()
        .max_connections(2)
        .connect_lazy_with(options);

    run(service_fn(move |event: Request| {
        let pool = pool.clone();
        async move { http_handler::function_handler(event, pool).await }
    }))
    .await
}
