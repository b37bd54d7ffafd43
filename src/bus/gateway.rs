use async_trait::async_trait;
use reqwest::{Client, Url};

use crate::{
    bus::{StateBus, Value},
    prelude::*,
};

/// State bus client talking to a local HTTP gateway.
///
/// A bus path of a service maps onto `{base_url}/{service}/{path}`: `GET` reads the value and
/// `PUT` replaces it, both with a JSON-encoded [`Value`].
pub struct GatewayClient {
    client: Client,
    service_url: Url,
}

impl GatewayClient {
    pub fn new(base_url: &Url, service: &str) -> Result<Self> {
        let mut base_url = base_url.clone();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let service_url = base_url
            .join(&format!("{service}/"))
            .with_context(|| format!("`{service}` is an invalid service name"))?;
        Ok(Self { client: Client::builder().build()?, service_url })
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.service_url
            .join(path.trim_start_matches('/'))
            .with_context(|| format!("`{path}` is an invalid bus path"))
    }
}

#[async_trait]
impl StateBus for GatewayClient {
    #[instrument(skip_all, level = "debug", fields(path = path))]
    async fn get_value(&self, path: &str) -> Result<Value> {
        let value = self
            .client
            .get(self.url(path)?)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .with_context(|| format!("failed to deserialize `{path}`"))?;
        debug!(?value, "read");
        Ok(value)
    }

    #[instrument(skip_all, level = "debug", fields(path = path))]
    async fn set_value(&self, path: &str, value: Value) -> Result {
        self.client.put(self.url(path)?).json(&value).send().await?.error_for_status()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_ok() -> Result {
        let base_url = Url::parse("http://127.0.0.1:8088/bus")?;
        let client = GatewayClient::new(&base_url, "com.victronenergy.battery.socketcan_can0")?;
        assert_eq!(
            client.url("/Dc/0/Voltage")?.as_str(),
            "http://127.0.0.1:8088/bus/com.victronenergy.battery.socketcan_can0/Dc/0/Voltage",
        );
        assert_eq!(
            client.url("/History/ChargedEnergy")?.as_str(),
            "http://127.0.0.1:8088/bus/com.victronenergy.battery.socketcan_can0/History/ChargedEnergy",
        );
        Ok(())
    }
}
