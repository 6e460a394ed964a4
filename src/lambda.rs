#[cfg(feature = "lambda")]
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
#[cfg(feature = "lambda")]
use mg_dashboard::adapters::gateway::{GatewayEvent, GatewayResponse};
#[cfg(feature = "lambda")]
use mg_dashboard::config::ProxyConfig;
#[cfg(feature = "lambda")]
use mg_dashboard::core::proxy::EdgeProxy;
#[cfg(feature = "lambda")]
use mg_dashboard::utils::{logger, validation::Validate};

#[cfg(feature = "lambda")]
async fn function_handler(
    proxy: &EdgeProxy,
    event: LambdaEvent<GatewayEvent>,
) -> Result<GatewayResponse, Error> {
    let response = match event.payload.into_proxy_request() {
        Ok(request) => {
            tracing::debug!("Proxy request {} {}", request.method, request.path);
            proxy.forward(request).await
        }
        Err(rejected) => rejected,
    };
    Ok(GatewayResponse::from(response))
}

#[cfg(feature = "lambda")]
#[tokio::main]
async fn main() -> Result<(), Error> {
    logger::init_lambda_logger();

    // 每個函式實例只建立一次設定與 HTTP client
    let config = ProxyConfig::from_env()
        .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)?;
    config
        .validate()
        .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)?;
    tracing::info!("Starting edge proxy for {}", config.backend_origin);

    let proxy = EdgeProxy::new(config);
    let proxy = &proxy;

    run(service_fn(move |event: LambdaEvent<GatewayEvent>| async move {
        function_handler(proxy, event).await
    }))
    .await
}
