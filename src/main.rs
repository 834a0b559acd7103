use order_coordinator::config::Settings;
use order_coordinator::lifecycle::{setup_tracing, OrderSystem};
use order_coordinator::model::NewOrderItem;
use rust_decimal::Decimal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, Instrument};

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let settings = Settings::from_env().map_err(|e| e.to_string())?;
    info!("Starting order system");
    let system = OrderSystem::new(settings);
    let cancel = CancellationToken::new();

    let items = vec![
        NewOrderItem::new("PROD001", "Widget", 2, Decimal::new(1050, 2)),
        NewOrderItem::new("PROD002", "Gadget", 3, Decimal::new(2500, 2)),
    ];

    let span = tracing::info_span!("order_processing");
    let created = async { system.service.create_order(123, items, &cancel).await }
        .instrument(span)
        .await;

    match created {
        Ok(view) => {
            info!(order_id = %view.id, total = %view.total, items = view.items.len(), "Order created");

            let fetched = system
                .service
                .get_order(view.id, &cancel)
                .instrument(tracing::info_span!("order_lookup"))
                .await
                .map_err(|e| e.to_string())?;
            info!(order_id = %fetched.id, status = %fetched.status, "Order fetched");

            let events = system.broker.records(&system.settings.topic).await.map_err(|e| e.to_string())?;
            info!(topic = %system.settings.topic, count = events.len(), "Events on topic");
        }
        Err(e) => error!(error = %e, "Order creation failed"),
    }

    system.shutdown().await?;

    info!("Application completed successfully");
    Ok(())
}
