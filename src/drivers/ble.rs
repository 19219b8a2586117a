// StepScale: BLE GATT server
//
// One primary service with a READ|NOTIFY reading characteristic and a
// WRITE command characteristic. Callbacks only forward events into the
// sampling loop's inbox; every decision is taken on the loop thread.

use std::sync::Arc;

use esp32_nimble::utilities::mutex::Mutex as NimbleMutex;
use esp32_nimble::utilities::BleUuid;
use esp32_nimble::{uuid128, BLEAdvertisementData, BLEAdvertising, BLECharacteristic, BLEDevice, NimbleProperties};

use stepscale_core::{EventSender, Link, LinkEvent};

use crate::config::*;

const SERVICE_UUID: BleUuid = uuid128!("12345678-1234-5678-1234-56789abcdef0");
const READING_UUID: BleUuid = uuid128!("abcdef01-1234-5678-1234-56789abcdef0");
const COMMAND_UUID: BleUuid = uuid128!("abcdef02-1234-5678-1234-56789abcdef0");

pub struct BleScale {
    reading: Arc<NimbleMutex<BLECharacteristic>>,
    advertising: &'static NimbleMutex<BLEAdvertising>,
}

impl BleScale {
    /// Build the GATT table, wire the callbacks to `events` and start
    /// advertising. `initial` is served until the first sample.
    pub fn start(events: EventSender, initial: &[u8]) -> anyhow::Result<Self> {
        let device = BLEDevice::take();
        BLEDevice::set_device_name(BLE_DEVICE_NAME)
            .map_err(|e| anyhow::anyhow!("BLE device name: {:?}", e))?;

        let server = device.get_server();
        // Re-advertising is driven by the sampling loop on disconnect.
        server.advertise_on_disconnect(false);

        let on_connect = events.clone();
        server.on_connect(move |_server, desc| {
            log::info!("BLE client connected: {:?}", desc.address());
            on_connect.link(LinkEvent::Connected);
        });

        let on_disconnect = events.clone();
        server.on_disconnect(move |_desc, reason| {
            log::info!("BLE client disconnected ({:?}), waiting...", reason);
            on_disconnect.link(LinkEvent::Disconnected);
        });

        let service = server.create_service(SERVICE_UUID);

        let reading = service
            .lock()
            .create_characteristic(READING_UUID, NimbleProperties::READ | NimbleProperties::NOTIFY);
        reading.lock().set_value(initial);

        let command = service
            .lock()
            .create_characteristic(COMMAND_UUID, NimbleProperties::WRITE);
        let on_write = events;
        command.lock().on_write(move |args| {
            on_write.write(args.recv_data());
        });

        let advertising = device.get_advertising();
        advertising
            .lock()
            .scan_response(true)
            .set_data(
                BLEAdvertisementData::new()
                    .name(BLE_DEVICE_NAME)
                    .add_service_uuid(SERVICE_UUID),
            )
            .map_err(|e| anyhow::anyhow!("BLE advertisement data: {:?}", e))?;

        let mut ble = Self { reading, advertising };
        ble.start_advertising()?;
        log::info!("BLE server started as \"{}\"", BLE_DEVICE_NAME);
        Ok(ble)
    }
}

impl Link for BleScale {
    fn publish(&mut self, payload: &[u8]) -> anyhow::Result<()> {
        self.reading.lock().set_value(payload).notify();
        Ok(())
    }

    fn start_advertising(&mut self) -> anyhow::Result<()> {
        self.advertising
            .lock()
            .start()
            .map_err(|e| anyhow::anyhow!("BLE advertising start: {:?}", e))
    }
}
