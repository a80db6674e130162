use redis::{Client, aio::MultiplexedConnection};
use tracing::info;

#[derive(Clone)]
pub struct RedisService {
    client: Client,
}

impl RedisService {
    /// Opens the client and checks the server answers before handing it out.
    pub async fn new(connection_string: &str) -> Result<Self, redis::RedisError> {
        let service = Self {
            client: Client::open(connection_string)?,
        };
        service.ping().await?;

        info!("✅ Connected to Redis");
        Ok(service)
    }

    pub async fn get_conn(&self) -> Result<MultiplexedConnection, redis::RedisError> {
        self.client.get_multiplexed_async_connection().await
    }

    pub async fn ping(&self) -> Result<(), redis::RedisError> {
        let mut conn = self.get_conn().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}
