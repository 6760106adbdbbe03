use device_emulator::config::TransportConfig;
use device_emulator::error::Result;
use device_emulator::init_logger;
use device_emulator::transport::{Transport, ZenohTransport};
use device_emulator::wire::build_topic;
use log::LevelFilter;
use std::env;
use std::time::Duration;

fn env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logger(LevelFilter::Info);

    let sensor = env_or("SENSOR", "wheel_position");
    let value = env_or("VALUE", "30");
    let pub_prefix = env_or("PUB_TOPIC_PREFIX", "tractor/sensors");
    let sub_prefix = env_or("SUB_TOPIC_PREFIX", "tractor/commands");

    let transport_config = TransportConfig {
        mode: Some("peer".to_string()),
        connect: env::var("ZENOH_PEER").map(|peer| vec![peer]).unwrap_or_default(),
        connect_timeout: Some(5000),
        ..Default::default()
    };
    let transport = ZenohTransport::connect(&transport_config).await?;

    let telemetry_topic = build_topic(&pub_prefix, &sensor);
    let command_topic = build_topic(&sub_prefix, &sensor);

    transport.subscribe(&telemetry_topic).await?;
    println!("Listening for {} telemetry on {}", sensor, telemetry_topic);

    println!("Sending {} to {}", value, command_topic);
    transport.publish(&command_topic, value).await?;

    let messages = transport.messages();
    let deadline = tokio::time::sleep(Duration::from_secs(5));
    tokio::pin!(deadline);
    loop {
        tokio::select! {
            _ = &mut deadline => break,
            received = messages.recv_async() => match received {
                Ok(message) => println!(
                    "{}: {}",
                    message.topic,
                    String::from_utf8_lossy(&message.payload)
                ),
                Err(_) => break,
            },
        }
    }

    Ok(())
}
