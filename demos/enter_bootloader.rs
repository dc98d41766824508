use ftdi_bitbang_serial::{reset, FtdiSerial, Result, SerialConfig};
use std::time::Duration;

const DEFAULT_PORT: &str = "/dev/ttyUSB0";
// ESP ROM bootloader SYNC command, SLIP framed.
const SYNC_FRAME: &[u8] = &[
    0xC0, 0x00, 0x08, 0x24, 0x00, 0x00, 0x00, 0x00, 0x00, 0x07, 0x07, 0x12, 0x20, 0x55, 0x55,
    0x55, 0x55, 0x55, 0x55, 0x55, 0x55, 0x55, 0x55, 0x55, 0x55, 0x55, 0x55, 0x55, 0x55, 0x55,
    0x55, 0x55, 0x55, 0x55, 0x55, 0x55, 0x55, 0x55, 0x55, 0x55, 0x55, 0x55, 0x55, 0xC0,
];

fn main() -> Result<()> {
    env_logger::init();
    let port_name = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_PORT.to_string());

    println!("Opening {}...", port_name);
    let config = SerialConfig::default()
        .baud_rate(115_200)
        .timeout(Duration::from_millis(100));
    let mut port = FtdiSerial::open_with_config(&port_name, config)?;
    println!("Opened at {:?}", port.location());

    for attempt in 1..=5 {
        reset::enter_bootloader(&mut port, reset::DEFAULT_BOOT_HOLD)?;
        port.flush_input()?;
        port.write(SYNC_FRAME)?;

        // The first byte of a reply is the SLIP frame delimiter.
        let reply = port.read(1)?;
        if reply == [0xC0] {
            println!("Bootloader answered on attempt {}", attempt);
            reset::hard_reset(&mut port)?;
            return Ok(());
        }
        println!("No answer on attempt {}", attempt);
    }

    println!("Target did not enter its bootloader. Check the RTS/CTS wiring.");
    port.close();
    Ok(())
}
