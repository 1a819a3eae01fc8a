use redis::{AsyncCommands, RedisResult};

#[derive(Clone)]
pub struct RedisClient {
    client: redis::Client,
}

impl RedisClient {
    pub async fn new(connection_string: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        Ok(Self { client })
    }

    pub async fn get_ride_availability(&self, ride_id: &str) -> RedisResult<Option<i32>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let key = format!("ride:{}:availability", ride_id);
        conn.get(key).await
    }

    pub async fn set_ride_availability(&self, ride_id: &str, count: i32) -> RedisResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let key = format!("ride:{}:availability", ride_id);
        conn.set(key, count).await
    }

    pub async fn delete_ride_availability(&self, ride_id: &str) -> RedisResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let key = format!("ride:{}:availability", ride_id);
        conn.del(key).await
    }

    /// Decrement the cached availability by `seats`, but only when the key is
    /// already seeded. A cache miss returns None and the next search re-seeds
    /// from the database, so we never plant negative counts.
    pub async fn decr_ride_availability(
        &self,
        ride_id: &str,
        seats: i64,
    ) -> RedisResult<Option<i64>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let key = format!("ride:{}:availability", ride_id);
        let script = redis::Script::new(
            r#"
            if redis.call("EXISTS", KEYS[1]) == 1 then
                return redis.call("DECRBY", KEYS[1], ARGV[1])
            else
                return nil
            end
        "#,
        );

        script.key(key).arg(seats).invoke_async(&mut conn).await
    }

    /// Fixed-window counter per key; true while under the limit.
    pub async fn check_rate_limit(
        &self,
        key: &str,
        limit: i64,
        window_seconds: i64,
    ) -> RedisResult<bool> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let (count,): (i64,) = redis::pipe()
            .atomic()
            .incr(key, 1)
            .expire(key, window_seconds)
            .query_async(&mut conn)
            .await?;

        Ok(count <= limit)
    }
}
