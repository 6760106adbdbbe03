use device_emulator::config::{load_config, EmulatorConfig};
use device_emulator::plugins::SensorRegistry;
use device_emulator::simulator::SimulatorRegistry;
use device_emulator::transport::{MemoryTransport, Transport, ZenohTransport};
use device_emulator::{init_logger, DeviceEmulator, EmulatorError};
use log::LevelFilter;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

fn tractor_config() -> EmulatorConfig {
    EmulatorConfig::from_json(
        r#"{
            "mqtt": { "pubTopicPrefix": "tractor/out/", "subTopicPrefix": "/tractor//in" },
            "device": {
                "interval": 20,
                "sensors": {
                    "wheel_position": { "start": 5 },
                    "cab_door": { "type": "door" },
                    "speed": { "enabled": false },
                    "cab_temp": {
                        "type": "temp",
                        "temp": 18,
                        "simulator": { "type": "static" }
                    }
                }
            }
        }"#,
    )
    .unwrap()
}

async fn start_with(
    config: &EmulatorConfig,
    transport: Arc<dyn Transport>,
) -> device_emulator::Result<DeviceEmulator> {
    DeviceEmulator::start(
        config,
        transport,
        &SensorRegistry::new(),
        &SimulatorRegistry::new(),
    )
    .await
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn test_commands_flow_into_telemetry() -> device_emulator::Result<()> {
    init_logger(LevelFilter::Info);

    let transport = Arc::new(MemoryTransport::new());
    let emulator = Arc::new(start_with(&tractor_config(), transport.clone()).await?);
    assert_eq!(emulator.sensors().len(), 3);

    let cancel = CancellationToken::new();
    let handle = {
        let emulator = emulator.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move { emulator.run(cancel).await })
    };

    sleep(Duration::from_millis(100)).await;
    let readings = transport.published_to("tractor/out/wheel_position").await;
    assert!(!readings.is_empty());
    assert!(readings.iter().all(|r| r == "5"));

    assert!(transport.inject("tractor/in/wheel_position", b"-30").await);
    assert!(transport.inject("tractor/in/wheel_position", b"90").await);
    assert!(transport.inject("tractor/in/cab_door", b"8").await);
    assert!(transport.inject("tractor/in/cab_temp", b"40").await);
    assert!(!transport.inject("tractor/in/speed", b"10").await);

    sleep(Duration::from_millis(100)).await;
    assert_eq!(
        transport
            .published_to("tractor/out/wheel_position")
            .await
            .last()
            .map(String::as_str),
        Some("-30")
    );
    assert_eq!(
        transport
            .published_to("tractor/out/cab_door")
            .await
            .last()
            .map(String::as_str),
        Some("1")
    );
    assert_eq!(
        transport
            .published_to("tractor/out/cab_temp")
            .await
            .last()
            .map(String::as_str),
        Some("18")
    );
    assert!(transport.published_to("tractor/out/speed").await.is_empty());

    cancel.cancel();
    handle.await.unwrap()?;
    emulator.shutdown().await;
    sleep(Duration::from_millis(30)).await;

    let after_shutdown = transport.published().await.len();
    sleep(Duration::from_millis(60)).await;
    assert_eq!(transport.published().await.len(), after_shutdown);
    assert_eq!(
        emulator.sensor("wheel_position").unwrap().value().await,
        5.0
    );

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn test_no_sensors_started_exit_code() {
    init_logger(LevelFilter::Info);

    let config = EmulatorConfig::from_json(
        r#"{ "device": { "sensors": {
            "speed": { "enabled": false },
            "plow": {},
            "utils": {},
            "door": { "state": "open" }
        } } }"#,
    )
    .unwrap();
    let transport = Arc::new(MemoryTransport::new());
    let err = start_with(&config, transport.clone()).await.err().unwrap();

    assert!(matches!(err, EmulatorError::NoSensorsStarted));
    assert_eq!(err.exit_code(), 3);
    assert!(transport.published().await.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn test_yaml_config_from_disk() -> device_emulator::Result<()> {
    init_logger(LevelFilter::Info);

    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile()?;
    writeln!(
        file,
        "device:\n  interval: 10\n  topicPrefix:\n    publish: plant/readings\n    subscribe: plant/commands\n  sensors:\n    boiler:\n      type: thermostat\n      temp: 50\n      target: 50\n      simulator:\n        type: temp\n        step_interval: 5\n        decr_min: 1\n        incr_max: 1\n        seed: 3\n"
    )?;
    let config = load_config(file.path())?;

    let transport = Arc::new(MemoryTransport::new());
    let emulator = start_with(&config, transport.clone()).await?;
    emulator
        .dispatch(&device_emulator::transport::InboundMessage::new(
            "plant/commands/boiler",
            b"80".to_vec(),
        ))
        .await;

    sleep(Duration::from_millis(200)).await;
    emulator.shutdown().await;

    let readings: Vec<f64> = transport
        .published_to("plant/readings/boiler")
        .await
        .iter()
        .map(|r| r.parse().unwrap())
        .collect();
    assert!(readings.len() > 3);
    assert!(readings.windows(2).all(|w| w[1] >= w[0] - 1.0));
    assert!(*readings.last().unwrap() > 50.0);

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn test_zenoh_round_trip() -> device_emulator::Result<()> {
    init_logger(LevelFilter::Info);

    let config = EmulatorConfig::from_json(
        r#"{
            "transport": { "pubTopicPrefix": "test/emulator/out", "subTopicPrefix": "test/emulator/in" },
            "device": { "interval": 50, "sensors": { "wheel": { "min_position": -5, "max_position": 5 } } }
        }"#,
    )?;
    let transport = Arc::new(ZenohTransport::connect(&config.transport).await?);
    let emulator = Arc::new(start_with(&config, transport.clone()).await?);

    let cancel = CancellationToken::new();
    let handle = {
        let emulator = emulator.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move { emulator.run(cancel).await })
    };

    transport.publish("test/emulator/in/wheel", "4".to_string()).await?;

    let mut value = 0.0;
    for _ in 0..50 {
        value = emulator.sensor("wheel").unwrap().value().await;
        if value == 4.0 {
            break;
        }
        sleep(Duration::from_millis(100)).await;
    }
    assert_eq!(value, 4.0);

    cancel.cancel();
    handle.await.unwrap()?;
    emulator.shutdown().await;
    Ok(())
}
