use async_trait::async_trait;
use futures::StreamExt;
use lapin::options::{
    BasicAckOptions, BasicConsumeOptions, BasicPublishOptions, ExchangeDeclareOptions,
    QueueBindOptions, QueueDeclareOptions,
};
use lapin::types::FieldTable;
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties, ExchangeKind};
use secrecy::ExposeSecret;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use crate::config::RabbitMQSettings;
use crate::errors::LiftAdapterResult;
use crate::models::{LiftRequestMessage, LiftState};
use crate::services::bus::publisher::LiftStatePublisher;

/// # RabbitMqBus
///
/// Bus adapter over a RabbitMQ topic exchange. Lift state goes out as JSON under
/// `state_routing_key`; lift requests come in on `request_queue`, bound to `request_routing_key`.
pub struct RabbitMqBus {
    _connection: Connection,
    channel: Channel,
    settings: RabbitMQSettings,
}

impl RabbitMqBus {
    /// Connects to the broker and declares the exchange.
    pub async fn connect(settings: &RabbitMQSettings) -> LiftAdapterResult<Self> {
        let uri = settings.connection_string()?;
        let connection = Connection::connect(uri.expose_secret(), ConnectionProperties::default()).await?;
        let channel = connection.create_channel().await?;

        channel.exchange_declare(
            &settings.exchange,
            ExchangeKind::Topic,
            ExchangeDeclareOptions { durable: true, ..ExchangeDeclareOptions::default() },
            FieldTable::default(),
        ).await?;

        info!("Connected to RabbitMQ {}:{}, exchange {}", settings.host, settings.port, settings.exchange);
        Ok(Self {
            _connection: connection,
            channel,
            settings: settings.clone(),
        })
    }

    /// Starts consuming lift requests.
    ///
    /// Decoded messages are forwarded into the returned channel. Payloads that are not valid request
    /// JSON are acknowledged and dropped.
    pub async fn subscribe_requests(&self, capacity: usize)
        -> LiftAdapterResult<(mpsc::Receiver<LiftRequestMessage>, JoinHandle<()>)>
    {
        let queue = &self.settings.request_queue;
        self.channel.queue_declare(queue, QueueDeclareOptions::default(), FieldTable::default()).await?;
        self.channel.queue_bind(
            queue,
            &self.settings.exchange,
            &self.settings.request_routing_key,
            QueueBindOptions::default(),
            FieldTable::default(),
        ).await?;

        let mut consumer = self.channel.basic_consume(
            queue,
            "lift-adapter",
            BasicConsumeOptions::default(),
            FieldTable::default(),
        ).await?;

        let (sender, receiver) = mpsc::channel(capacity);
        let handle = tokio::spawn(async move {
            while let Some(delivery) = consumer.next().await {
                let delivery = match delivery {
                    Ok(delivery) => delivery,
                    Err(e) => {
                        error!("Lift request consumer error: {}", e);
                        break;
                    }
                };

                let decoded = serde_json::from_slice::<LiftRequestMessage>(&delivery.data);
                if let Err(e) = delivery.ack(BasicAckOptions::default()).await {
                    warn!("Failed to ack lift request delivery: {}", e);
                }

                match decoded {
                    Ok(message) => {
                        debug!("Received lift request {:?}", message);
                        if sender.send(message).await.is_err() {
                            info!("Lift request receiver dropped, stopping consumer");
                            break;
                        }
                    }
                    Err(e) => warn!("Dropping undecodable lift request: {}", e),
                }
            }
        });

        Ok((receiver, handle))
    }
}

#[async_trait]
impl LiftStatePublisher for RabbitMqBus {
    async fn publish(&self, state: &LiftState) -> LiftAdapterResult<()> {
        let payload = serde_json::to_vec(state)?;
        self.channel.basic_publish(
            &self.settings.exchange,
            &self.settings.state_routing_key,
            BasicPublishOptions::default(),
            &payload,
            BasicProperties::default().with_content_type("application/json".into()),
        ).await?.await?;
        Ok(())
    }
}
