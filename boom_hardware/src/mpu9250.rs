//! MPU9250 accelerometer over Linux I2C (rppal).
//!
//! Only the accelerometer is used; gyro and magnetometer stay in their reset state.
use std::time::Duration;

use rppal::i2c::I2c;
use tracing::{debug, info, trace, warn};

use crate::accel_counts_to_ms2;
use crate::error::{HwError, Result};

pub const DEFAULT_ADDRESS: u16 = 0x68;

const REG_ACCEL_CONFIG: u8 = 0x1C;
const REG_ACCEL_XOUT_H: u8 = 0x3B;
const REG_PWR_MGMT_1: u8 = 0x6B;
const REG_WHO_AM_I: u8 = 0x75;

/// WHO_AM_I values of parts sharing the MPU9250 accelerometer register map.
const KNOWN_IDS: [u8; 3] = [0x71, 0x73, 0x70];

pub struct Mpu9250 {
    i2c: I2c,
}

impl Mpu9250 {
    /// Open the sensor on `bus` at `address`, verify its identity and select ±2 g.
    ///
    /// The bus clock is fixed by the kernel device tree; `bus_hz` is only checked.
    pub fn open(bus: u8, address: u16, bus_hz: u32) -> Result<Self> {
        let mut i2c = I2c::with_bus(bus)?;
        match i2c.clock_speed() {
            Ok(actual) if actual != bus_hz => {
                warn!(bus, expected = bus_hz, actual, "i2c clock differs from config");
            }
            Ok(_) => {}
            Err(e) => debug!(error = %e, "i2c clock speed unavailable"),
        }
        i2c.set_slave_address(address)?;

        let mut dev = Self { i2c };
        let who_am_i = dev.read_reg(REG_WHO_AM_I)?;
        if !KNOWN_IDS.contains(&who_am_i) {
            return Err(HwError::UnknownDevice { who_am_i });
        }
        // Wake from sleep, auto-select the best clock source.
        dev.i2c.smbus_write_byte(REG_PWR_MGMT_1, 0x01)?;
        std::thread::sleep(Duration::from_millis(100));
        dev.i2c.smbus_write_byte(REG_ACCEL_CONFIG, 0x00)?;
        info!(bus, address, who_am_i, "mpu9250 ready");
        Ok(dev)
    }

    fn read_reg(&mut self, reg: u8) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.i2c.write_read(&[reg], &mut buf)?;
        Ok(buf[0])
    }

    /// Burst-read the three accelerometer axes in m/s².
    pub fn read_accel(&mut self) -> Result<(f64, f64, f64)> {
        let mut buf = [0u8; 6];
        self.i2c.write_read(&[REG_ACCEL_XOUT_H], &mut buf)?;
        let x = i16::from_be_bytes([buf[0], buf[1]]);
        let y = i16::from_be_bytes([buf[2], buf[3]]);
        let z = i16::from_be_bytes([buf[4], buf[5]]);
        trace!(x, y, z, "mpu9250 raw read");
        Ok((
            accel_counts_to_ms2(x),
            accel_counts_to_ms2(y),
            accel_counts_to_ms2(z),
        ))
    }
}

impl boom_traits::AccelSensor for Mpu9250 {
    fn read_axes(&mut self) -> boom_traits::HwResult<(f64, f64, f64)> {
        self.read_accel().map_err(|e| {
            tracing::error!("accelerometer read error: {}", e);
            e.into()
        })
    }
}
